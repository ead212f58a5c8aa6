//! Recognition and resolution of informal EU legal citations.
//!
//! Finds references such as "Regulation 2016/679" or "Directive No 1049/2001"
//! in plain text segments and rewrites them into EUR-Lex links, resolving each
//! through a CELEX lookup table or by synthesising a sector-3 identifier.

pub mod config;
pub mod context;
pub mod engine;
mod error;
pub mod instrument;
pub mod lookup;
pub mod matcher;
pub mod resolver;
pub mod rewriter;
pub mod rules;

pub use config::EngineConfig;
pub use context::TypeContext;
pub use engine::{Annotator, DocumentPass, PassStats};
pub use error::ConfigError;
pub use instrument::InstrumentType;
pub use lookup::LookupTable;
pub use matcher::{CitationCandidate, MatchOrigin, ResolvedCitation, RuleMatches};
pub use resolver::{CelexSource, Resolution, Resolver, celex_url, normalize_year};
pub use rewriter::{Rewrite, wrap};
pub use rules::{CaptureRole, ComponentOrder, PatternRule, RuleSet, RuleSpec};
