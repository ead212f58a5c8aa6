//! Exact `year/number` → CELEX lookup table.
//!
//! Real CELEX assignments do not always follow the synthesised
//! `3 + year + type + number` scheme (corrigenda, Euratom acts, older
//! numbering), so a known mapping always takes precedence over synthesis.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

/// Normalise a lookup key: strip all whitespace and uppercase.
///
/// `" 2016 / 679 "` → `"2016/679"`.
pub fn normalize_key(key: &str) -> String {
    key.chars()
        .filter(|c| !c.is_whitespace())
        .flat_map(char::to_uppercase)
        .collect()
}

/// Immutable mapping from normalised `"<year>/<number>"` keys to CELEX identifiers.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "HashMap<String, String>", into = "HashMap<String, String>")]
pub struct LookupTable {
    entries: HashMap<String, String>,
}

impl LookupTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse the `celex-map.json` document: a flat JSON object of key → CELEX.
    pub fn from_json_str(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    /// Look up a raw key; the key is normalised before the lookup.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries.get(&normalize_key(key)).map(String::as_str)
    }

    /// Look up a citation by its normalised year and number.
    pub fn get_citation(&self, year: &str, number: &str) -> Option<&str> {
        self.get(&format!("{year}/{number}"))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }
}

impl From<HashMap<String, String>> for LookupTable {
    fn from(raw: HashMap<String, String>) -> Self {
        raw.into_iter().collect()
    }
}

impl From<LookupTable> for HashMap<String, String> {
    fn from(table: LookupTable) -> Self {
        table.entries
    }
}

impl<K: AsRef<str>, V: Into<String>> FromIterator<(K, V)> for LookupTable {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let entries = iter
            .into_iter()
            .map(|(k, v)| (normalize_key(k.as_ref()), v.into().trim().to_string()))
            .collect();
        Self { entries }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalize_strips_whitespace_and_uppercases() {
        assert_eq!(normalize_key(" 2016 / 679 "), "2016/679");
        assert_eq!(normalize_key("2019/1a"), "2019/1A");
        assert_eq!(normalize_key("\t1994/22\n"), "1994/22");
    }

    #[test]
    fn keys_are_normalised_on_load() {
        let table: LookupTable = [("2016 / 679", "32016R0679")].into_iter().collect();
        assert_eq!(table.get("2016/679"), Some("32016R0679"));
        assert_eq!(table.get_citation("2016", "679"), Some("32016R0679"));
    }

    #[test]
    fn missing_key_is_none() {
        let table = LookupTable::new();
        assert!(table.is_empty());
        assert_eq!(table.get_citation("2016", "679"), None);
    }

    #[test]
    fn parses_celex_map_json() {
        let table = LookupTable::from_json_str(
            r#"{
                "2016/679": "32016R0679",
                "2001/1049": "32001R1049",
                "1995/46": "31995L0046"
            }"#,
        )
        .unwrap();
        assert_eq!(table.len(), 3);
        assert_eq!(table.get_citation("1995", "46"), Some("31995L0046"));
    }

    #[test]
    fn rejects_non_string_values() {
        assert!(LookupTable::from_json_str(r#"{"2016/679": 1}"#).is_err());
    }
}
