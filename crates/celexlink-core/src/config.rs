//! Loading engine configuration from `celex-map.json` and `patterns.json` files.

use std::path::Path;

use tracing::info;

use crate::engine::Annotator;
use crate::error::ConfigError;
use crate::lookup::LookupTable;
use crate::rules::RuleSet;

fn read_to_string(path: &Path) -> Result<String, ConfigError> {
    std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
        path: path.to_path_buf(),
        source,
    })
}

/// Read a lookup table file.
pub fn read_lookup(path: &Path) -> Result<LookupTable, ConfigError> {
    let table = LookupTable::from_json_str(&read_to_string(path)?)?;
    info!(path = %path.display(), entries = table.len(), "loaded CELEX lookup table");
    Ok(table)
}

/// Read and compile a rule set file.
pub fn read_rules(path: &Path) -> Result<RuleSet, ConfigError> {
    let rules = RuleSet::from_json_str(&read_to_string(path)?)?;
    info!(path = %path.display(), rules = rules.len(), "loaded pattern rules");
    Ok(rules)
}

/// Everything the engine needs, already loaded.
#[derive(Debug, Clone, Default)]
pub struct EngineConfig {
    pub lookup: LookupTable,
    pub rules: RuleSet,
}

impl EngineConfig {
    /// Built-in rules and an empty lookup table.
    pub fn builtin() -> Self {
        Self {
            lookup: LookupTable::new(),
            rules: RuleSet::builtin(),
        }
    }

    /// Load configuration from optional files.
    ///
    /// Rules from `rules_path` run after the built-in rules when
    /// `include_builtin` is set, otherwise they replace them.
    pub fn load(
        lookup_path: Option<&Path>,
        rules_path: Option<&Path>,
        include_builtin: bool,
    ) -> Result<Self, ConfigError> {
        let lookup = match lookup_path {
            Some(path) => read_lookup(path)?,
            None => LookupTable::new(),
        };

        let mut rules = if include_builtin {
            RuleSet::builtin()
        } else {
            RuleSet::default()
        };
        if let Some(path) = rules_path {
            rules.extend(read_rules(path)?);
        }

        Ok(Self { lookup, rules })
    }

    pub fn into_annotator(self) -> Annotator {
        Annotator::new(self.rules, self.lookup)
    }
}
