//! Plain-text rendering for `scan`, `rules` and `resolve` output.

use std::fmt;

use celexlink_core::{MatchOrigin, Resolution, ResolvedCitation, RuleSet};

const LABEL_WIDTH: usize = 12;

/// A citation found on a given line of an input.
pub struct Located<'a> {
    pub line: usize,
    pub citation: &'a ResolvedCitation,
}

/// The citations of one input, one card per citation.
pub struct CitationReport<'a> {
    pub source: &'a str,
    pub found: &'a [Located<'a>],
}

impl fmt::Display for CitationReport<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "=== {} ({} citations) ===", self.source, self.found.len())?;

        for Located { line, citation } in self.found {
            let c = &citation.candidate;
            writeln!(f)?;
            writeln!(f, "{}:{}  {}", line, c.span.start + 1, c.raw_text)?;
            row(f, "year", &c.year)?;
            row(f, "number", &c.number)?;
            if let Some(ty) = c.instrument_type {
                row(f, "type", &format!("{ty} ({})", ty.letter()))?;
            }
            row(f, "matched by", &origin_label(&citation.origin))?;
            resolution_rows(f, &citation.resolution)?;
        }
        Ok(())
    }
}

/// The effective rule set in precedence order.
pub struct RuleListing<'a>(pub &'a RuleSet);

impl fmt::Display for RuleListing<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let rules = self.0;
        writeln!(f, "=== {} rules ===", rules.len())?;
        for (i, rule) in rules.iter().enumerate() {
            writeln!(f)?;
            writeln!(f, "{:>2}. {}", i + 1, rule.name())?;
            row(f, "pattern", &rule.spec().pattern)?;
            row(f, "order", &format!("{:?}", rule.component_order()))?;
            let ty = rule
                .fixed_type()
                .map(|t| t.to_string())
                .unwrap_or_else(|| "(from context)".to_string());
            row(f, "type", &ty)?;
        }
        Ok(())
    }
}

/// A single resolution, as printed by `resolve`.
pub struct ResolutionCard<'a>(pub &'a Resolution);

impl fmt::Display for ResolutionCard<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        resolution_rows(f, self.0)
    }
}

fn resolution_rows(f: &mut fmt::Formatter<'_>, resolution: &Resolution) -> fmt::Result {
    row(f, "celex", &resolution.celex)?;
    row(f, "source", resolution.source.as_str())?;
    row(f, "url", &resolution.url)
}

fn origin_label(origin: &MatchOrigin) -> String {
    match origin {
        MatchOrigin::Rule(name) => format!("rule {name}"),
        MatchOrigin::TokenStream => "token stream".to_string(),
    }
}

fn row(f: &mut fmt::Formatter<'_>, label: &str, value: &str) -> fmt::Result {
    writeln!(f, "  {label:<width$} {value}", width = LABEL_WIDTH)
}

#[cfg(test)]
mod tests {
    use super::*;
    use celexlink_core::{Annotator, TypeContext};

    #[test]
    fn citation_card_lists_components_and_target() {
        let annotator = Annotator::builtin();
        let mut ctx = TypeContext::new();
        let found = annotator.scan("Regulation 2016/679 applies", &mut ctx);
        let located: Vec<_> = found
            .iter()
            .map(|citation| Located { line: 3, citation })
            .collect();

        let text = CitationReport {
            source: "gdpr.txt",
            found: &located,
        }
        .to_string();
        assert!(text.starts_with("=== gdpr.txt (1 citations) ==="));
        assert!(text.contains("3:12  2016/679"));
        assert!(text.contains("Regulation (R)"));
        assert!(text.contains("token stream"));
        assert!(text.contains("32016R0679"));
        assert!(text.contains("synthesized"));
    }

    #[test]
    fn rules_listing_marks_context_typed_rules() {
        let rules = RuleSet::builtin();
        let text = RuleListing(&rules).to_string();
        assert!(text.contains(" 1. regulation-numbered"));
        assert!(text.contains("(from context)"));
        assert!(text.contains("NumberFirst"));
    }
}
