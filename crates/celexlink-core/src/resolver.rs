//! Citation → EUR-Lex URL resolution.
//!
//! A citation resolves through the lookup table when the table knows its
//! `year/number` key, otherwise a sector-3 CELEX number is synthesised:
//!
//! ```text
//! 3 <year:4> <type letter> <number padded to 4>
//! 3 2016     R             0679                  → 32016R0679
//! ```

use serde::Serialize;
use tracing::debug;

use crate::instrument::InstrumentType;
use crate::lookup::LookupTable;

/// URL template; the CELEX identifier is appended.
pub const CELEX_URL_PREFIX: &str = "https://eur-lex.europa.eu/legal-content/EN/TXT/?uri=CELEX:";

/// Two-digit years above this belong to the 1900s, the rest to the 2000s.
pub const CENTURY_PIVOT: u32 = 30;

/// Where a resolved CELEX identifier came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CelexSource {
    Lookup,
    Synthesized,
}

impl CelexSource {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Lookup => "lookup",
            Self::Synthesized => "synthesized",
        }
    }
}

/// A resolved CELEX identifier and its EUR-Lex URL.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Resolution {
    pub celex: String,
    pub url: String,
    pub source: CelexSource,
}

/// Build the EUR-Lex URL for a CELEX identifier.
pub fn celex_url(celex: &str) -> String {
    format!("{CELEX_URL_PREFIX}{celex}")
}

/// True for a non-empty run of ASCII digits.
pub fn is_numeric(s: &str) -> bool {
    !s.is_empty() && s.bytes().all(|b| b.is_ascii_digit())
}

/// Expand a citation year to four digits.
///
/// Values of 100 and above are kept as they are. Two-digit values pivot on
/// [`CENTURY_PIVOT`] and are zero-padded, so `"05"` becomes `"2005"`.
///
/// ```
/// use celexlink_core::normalize_year;
/// assert_eq!(normalize_year("94").as_deref(), Some("1994"));
/// assert_eq!(normalize_year("13").as_deref(), Some("2013"));
/// assert_eq!(normalize_year("2016").as_deref(), Some("2016"));
/// assert_eq!(normalize_year("19x"), None);
/// ```
pub fn normalize_year(raw: &str) -> Option<String> {
    if !is_numeric(raw) {
        return None;
    }
    let value: u32 = raw.parse().ok()?;
    let year = if value >= 100 {
        value.to_string()
    } else if value > CENTURY_PIVOT {
        format!("19{value:02}")
    } else {
        format!("20{value:02}")
    };
    Some(year)
}

/// Synthesise a sector-3 CELEX identifier from an already-normalised year.
pub fn synthesize_celex(year: &str, ty: InstrumentType, number: &str) -> String {
    format!("3{year}{}{number:0>4}", ty.letter())
}

/// Resolves citations against a [`LookupTable`], falling back to synthesis.
#[derive(Debug, Clone, Default)]
pub struct Resolver {
    lookup: LookupTable,
}

impl Resolver {
    pub fn new(lookup: LookupTable) -> Self {
        Self { lookup }
    }

    pub fn lookup(&self) -> &LookupTable {
        &self.lookup
    }

    /// Resolve a raw `(year, number)` pair of a given instrument type.
    ///
    /// Returns `None` when either component is not purely numeric or when no
    /// type is known; the caller leaves the text unlinked.
    pub fn resolve(
        &self,
        year: &str,
        number: &str,
        ty: Option<InstrumentType>,
    ) -> Option<Resolution> {
        if !is_numeric(number) {
            return None;
        }
        let year = normalize_year(year)?;
        let ty = ty?;

        if let Some(celex) = self.lookup.get_citation(&year, number) {
            debug!(%year, number, celex, "resolved from lookup table");
            return Some(Resolution {
                url: celex_url(celex),
                celex: celex.to_string(),
                source: CelexSource::Lookup,
            });
        }

        let celex = synthesize_celex(&year, ty, number);
        debug!(%year, number, %celex, "synthesized CELEX identifier");
        Some(Resolution {
            url: celex_url(&celex),
            celex,
            source: CelexSource::Synthesized,
        })
    }

    /// Like [`resolve`](Self::resolve) but returns only the URL.
    pub fn resolve_url(&self, year: &str, number: &str, ty: Option<InstrumentType>) -> Option<String> {
        self.resolve(year, number, ty).map(|r| r.url)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn regulation() -> Option<InstrumentType> {
        Some(InstrumentType::Regulation)
    }

    #[test]
    fn two_digit_years_pivot_on_thirty() {
        assert_eq!(normalize_year("94").as_deref(), Some("1994"));
        assert_eq!(normalize_year("13").as_deref(), Some("2013"));
        assert_eq!(normalize_year("30").as_deref(), Some("2030"));
        assert_eq!(normalize_year("31").as_deref(), Some("1931"));
    }

    #[test]
    fn every_two_digit_year_lands_in_the_right_century() {
        for y in 10..100u32 {
            let normalized = normalize_year(&y.to_string()).unwrap();
            assert_eq!(normalized.len(), 4, "{y} -> {normalized}");
            if y > 30 {
                assert!(normalized.starts_with("19"), "{y} -> {normalized}");
            } else {
                assert!(normalized.starts_with("20"), "{y} -> {normalized}");
            }
        }
    }

    #[test]
    fn single_digit_years_are_zero_padded() {
        assert_eq!(normalize_year("05").as_deref(), Some("2005"));
        assert_eq!(normalize_year("00").as_deref(), Some("2000"));
    }

    #[test]
    fn four_digit_years_kept() {
        assert_eq!(normalize_year("2016").as_deref(), Some("2016"));
        assert_eq!(normalize_year("1957").as_deref(), Some("1957"));
    }

    #[test]
    fn non_numeric_years_rejected() {
        assert_eq!(normalize_year(""), None);
        assert_eq!(normalize_year("20a6"), None);
        assert_eq!(normalize_year("٢٠١٦"), None);
    }

    #[test]
    fn synthesizes_with_empty_lookup() {
        let resolver = Resolver::default();
        assert_eq!(
            resolver.resolve_url("2016", "679", regulation()).as_deref(),
            Some("https://eur-lex.europa.eu/legal-content/EN/TXT/?uri=CELEX:32016R0679")
        );
    }

    #[test]
    fn synthesis_pads_number_and_expands_year() {
        let resolver = Resolver::default();
        let r = resolver
            .resolve("95", "46", Some(InstrumentType::Directive))
            .unwrap();
        assert_eq!(r.celex, "31995L0046");
        assert_eq!(r.source, CelexSource::Synthesized);
    }

    #[test]
    fn lookup_takes_precedence_over_synthesis() {
        let lookup: LookupTable = [("2016/679", "32016R0679R(02)")].into_iter().collect();
        let resolver = Resolver::new(lookup);
        let r = resolver.resolve("2016", "679", regulation()).unwrap();
        assert_eq!(r.source, CelexSource::Lookup);
        assert_eq!(r.celex, "32016R0679R(02)");
        assert_eq!(
            r.url,
            "https://eur-lex.europa.eu/legal-content/EN/TXT/?uri=CELEX:32016R0679R(02)"
        );
    }

    #[test]
    fn lookup_uses_normalised_year() {
        let lookup: LookupTable = [("1994/22", "31994L0022")].into_iter().collect();
        let resolver = Resolver::new(lookup);
        let r = resolver
            .resolve("94", "22", Some(InstrumentType::Decision))
            .unwrap();
        assert_eq!(r.source, CelexSource::Lookup);
        assert_eq!(r.celex, "31994L0022");
    }

    #[test]
    fn resolution_is_idempotent() {
        let resolver = Resolver::default();
        let a = resolver.resolve("2013", "34", Some(InstrumentType::Directive));
        let b = resolver.resolve("2013", "34", Some(InstrumentType::Directive));
        assert_eq!(a, b);
    }

    #[test]
    fn unresolvable_inputs_return_none() {
        let resolver = Resolver::default();
        assert!(resolver.resolve("2016", "679", None).is_none());
        assert!(resolver.resolve("2016", "67a", regulation()).is_none());
        assert!(resolver.resolve("x016", "679", regulation()).is_none());
        assert!(resolver.resolve("2016", "", regulation()).is_none());
    }

    #[test]
    fn lookup_hit_still_requires_a_type() {
        let lookup: LookupTable = [("2016/679", "32016R0679")].into_iter().collect();
        let resolver = Resolver::new(lookup);
        assert!(resolver.resolve("2016", "679", None).is_none());
    }
}
