//! Citation matching over a single text segment.
//!
//! Two strategies run in order:
//!
//! 1. **Rules**: every [`PatternRule`](crate::rules::PatternRule) in declared order, over the whole
//!    segment. Spans linked by an earlier rule are never matched again.
//! 2. **Token stream**: only when no rule matched anywhere in the segment and
//!    a type is in force. The segment is split into words, `digits/digits` pairs,
//!    whitespace and punctuation; `No 1049/2001` reads number-first and a
//!    bare `2016/679` reads year-first.

use std::ops::Range;
use std::sync::LazyLock;

use regex::Regex;
use serde::Serialize;
use tracing::debug;

use crate::context::TypeContext;
use crate::instrument::InstrumentType;
use crate::resolver::{Resolution, Resolver, is_numeric};
use crate::rules::{ComponentOrder, RuleSet};

/// A recognised but not yet resolved citation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CitationCandidate {
    /// Byte range of the citation within the segment.
    pub span: Range<usize>,
    pub raw_text: String,
    /// Raw year as written (2–4 digits, not yet expanded).
    pub year: String,
    pub number: String,
    pub instrument_type: Option<InstrumentType>,
    pub component_order: ComponentOrder,
}

/// How a citation was recognised.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "rule", rename_all = "snake_case")]
pub enum MatchOrigin {
    Rule(String),
    TokenStream,
}

/// A citation together with its resolved link target.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ResolvedCitation {
    pub candidate: CitationCandidate,
    pub resolution: Resolution,
    pub origin: MatchOrigin,
}

impl ResolvedCitation {
    pub fn raw_text(&self) -> &str {
        &self.candidate.raw_text
    }

    pub fn target_url(&self) -> &str {
        &self.resolution.url
    }

    pub fn span(&self) -> Range<usize> {
        self.candidate.span.clone()
    }
}

/// Resolve a candidate or report why it stays unlinked.
fn resolve_candidate(
    candidate: CitationCandidate,
    origin: MatchOrigin,
    resolver: &Resolver,
) -> Option<ResolvedCitation> {
    let resolution = resolver.resolve(
        &candidate.year,
        &candidate.number,
        candidate.instrument_type,
    );
    match resolution {
        Some(resolution) => Some(ResolvedCitation {
            candidate,
            resolution,
            origin,
        }),
        None => {
            if candidate.instrument_type.is_none() {
                debug!(
                    raw = %candidate.raw_text,
                    origin = ?origin,
                    "citation left unlinked: no instrument type in context"
                );
            } else {
                debug!(
                    raw = %candidate.raw_text,
                    year = %candidate.year,
                    number = %candidate.number,
                    "citation left unlinked: non-numeric component"
                );
            }
            None
        }
    }
}

fn overlaps(claimed: &[Range<usize>], span: &Range<usize>) -> bool {
    claimed
        .iter()
        .any(|c| c.start < span.end && span.start < c.end)
}

/// Outcome of the rule pass over one segment.
#[derive(Debug, Clone, Default)]
pub struct RuleMatches {
    /// Linked citations, ordered by position, never overlapping.
    pub citations: Vec<ResolvedCitation>,
    /// Regex hits, including those that did not resolve to a link.
    pub hits: usize,
}

impl RuleMatches {
    pub fn matched_any(&self) -> bool {
        self.hits > 0
    }
}

/// Run every rule over `text`, typing untyped rules with `context_type`.
pub fn match_rules(
    text: &str,
    rules: &RuleSet,
    context_type: Option<InstrumentType>,
    resolver: &Resolver,
) -> RuleMatches {
    let mut found: Vec<ResolvedCitation> = Vec::new();
    let mut claimed: Vec<Range<usize>> = Vec::new();
    let mut hits = 0;

    for rule in rules.iter() {
        for caps in rule.regex().captures_iter(text) {
            let Some(whole) = caps.get(0) else { continue };
            let span = whole.range();
            if span.is_empty() {
                continue;
            }
            hits += 1;
            if overlaps(&claimed, &span) {
                continue;
            }
            let Some((year, number)) = rule.components(&caps) else {
                continue;
            };

            let candidate = CitationCandidate {
                span: span.clone(),
                raw_text: whole.as_str().to_string(),
                year: year.to_string(),
                number: number.to_string(),
                instrument_type: rule.fixed_type().or(context_type),
                component_order: rule.component_order(),
            };
            let origin = MatchOrigin::Rule(rule.name().to_string());
            if let Some(resolved) = resolve_candidate(candidate, origin, resolver) {
                claimed.push(span);
                found.push(resolved);
            }
        }
    }

    found.sort_by_key(|c| c.candidate.span.start);
    RuleMatches {
        citations: found,
        hits,
    }
}

// ── Token stream ──

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum TokenKind {
    /// `digits/digits`
    Pair,
    Word,
    Space,
    Punct,
}

#[derive(Debug, Clone, Copy)]
struct Token<'t> {
    kind: TokenKind,
    text: &'t str,
    start: usize,
}

impl Token<'_> {
    fn end(&self) -> usize {
        self.start + self.text.len()
    }
}

// Alternatives cover every character, so tokens tile the input.
static TOKEN_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?P<pair>[0-9]+/[0-9]+\b)|(?P<word>\w+)|(?P<space>\s+)|[^\w\s]+")
        .expect("token regex is valid")
});

fn tokenize(text: &str) -> Vec<Token<'_>> {
    TOKEN_RE
        .captures_iter(text)
        .filter_map(|caps| {
            let m = caps.get(0)?;
            let kind = if caps.name("pair").is_some() {
                TokenKind::Pair
            } else if caps.name("word").is_some() {
                TokenKind::Word
            } else if caps.name("space").is_some() {
                TokenKind::Space
            } else {
                TokenKind::Punct
            };
            Some(Token {
                kind,
                text: m.as_str(),
                start: m.start(),
            })
        })
        .collect()
}

/// Split `left/right` when each side's digit count lies within its bounds.
fn split_pair(
    token: &str,
    left: (usize, usize),
    right: (usize, usize),
) -> Option<(&str, &str)> {
    let (l, r) = token.split_once('/')?;
    let fits = |s: &str, (min, max): (usize, usize)| is_numeric(s) && (min..=max).contains(&s.len());
    (fits(l, left) && fits(r, right)).then_some((l, r))
}

/// Citation-shaped token runs in `text`, typed from `entry_type` onwards.
///
/// Instrument keywords update the type for the tokens that follow them.
fn token_candidates(text: &str, entry_type: Option<InstrumentType>) -> Vec<CitationCandidate> {
    let tokens = tokenize(text);
    let mut found = Vec::new();
    let mut current = entry_type;
    let mut i = 0;

    while i < tokens.len() {
        let token = tokens[i];
        match token.kind {
            TokenKind::Word => {
                if let Some(ty) = InstrumentType::from_keyword(token.text) {
                    current = Some(ty);
                } else if token.text == "No" {
                    let mut j = i + 1;
                    while tokens.get(j).is_some_and(|t| t.kind == TokenKind::Space) {
                        j += 1;
                    }
                    if let Some(next) = tokens.get(j).filter(|t| t.kind == TokenKind::Pair) {
                        // A pair after "No" is never read year-first.
                        if let Some((number, year)) = split_pair(next.text, (1, 4), (2, 4)) {
                            found.push(CitationCandidate {
                                span: token.start..next.end(),
                                raw_text: text[token.start..next.end()].to_string(),
                                year: year.to_string(),
                                number: number.to_string(),
                                instrument_type: current,
                                component_order: ComponentOrder::NumberFirst,
                            });
                        }
                        i = j + 1;
                        continue;
                    }
                }
            }
            TokenKind::Pair => {
                if let Some((year, number)) = split_pair(token.text, (2, 4), (1, 4)) {
                    found.push(CitationCandidate {
                        span: token.start..token.end(),
                        raw_text: token.text.to_string(),
                        year: year.to_string(),
                        number: number.to_string(),
                        instrument_type: current,
                        component_order: ComponentOrder::YearFirst,
                    });
                }
            }
            TokenKind::Space | TokenKind::Punct => {}
        }
        i += 1;
    }

    found
}

/// Token-stream heuristic over `text`, starting from `entry_type`.
pub fn match_tokens(
    text: &str,
    entry_type: Option<InstrumentType>,
    resolver: &Resolver,
) -> Vec<ResolvedCitation> {
    token_candidates(text, entry_type)
        .into_iter()
        .filter_map(|candidate| resolve_candidate(candidate, MatchOrigin::TokenStream, resolver))
        .collect()
}

/// Log every citation-shaped token in `text` that has no type to resolve with.
///
/// Returns how many were reported.
fn report_untyped(text: &str) -> usize {
    let candidates = token_candidates(text, None);
    for candidate in &candidates {
        debug!(
            raw = %candidate.raw_text,
            "citation left unlinked: no instrument type in context"
        );
    }
    candidates.len()
}

/// Find and resolve every citation in one segment, updating `ctx`.
///
/// The context observes the whole segment before the rules run. The token
/// stream runs only when no rule matched at all, even unresolved, and then
/// replays keywords from the type in force at entry.
pub fn find_citations(
    text: &str,
    rules: &RuleSet,
    ctx: &mut TypeContext,
    resolver: &Resolver,
) -> Vec<ResolvedCitation> {
    let entry_type = ctx.current();
    ctx.observe(text);

    let matches = match_rules(text, rules, ctx.current(), resolver);
    if matches.matched_any() {
        return matches.citations;
    }
    if !ctx.is_active() {
        report_untyped(text);
        return Vec::new();
    }
    match_tokens(text, entry_type, resolver)
}
