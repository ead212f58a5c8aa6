//! Pattern rules: declarative regex forms for citation recognition.
//!
//! A rule is distributed as a [`RuleSpec`] (the `patterns.json` entry) and
//! compiled into a [`PatternRule`] once at load time. Patterns always run
//! case-insensitively.

use std::sync::LazyLock;

use regex::{Captures, Regex, RegexBuilder};
use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::instrument::InstrumentType;

/// Role of a capture group within a rule.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CaptureRole {
    Year,
    Number,
}

/// Which component comes first in the cited text.
///
/// Official style writes "No 1049/2001" (number first) but bare references
/// such as "2016/679" put the year first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum ComponentOrder {
    YearFirst,
    NumberFirst,
}

/// Serialisable rule definition, as found in a rule set document.
///
/// `captureOrder[i]` names the role of capture group `i + 1`. When absent the
/// first group is the year and the second the number.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RuleSpec {
    pub name: String,
    #[serde(alias = "regex")]
    pub pattern: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub capture_order: Option<Vec<CaptureRole>>,
    #[serde(default, alias = "type", skip_serializing_if = "Option::is_none")]
    pub fixed_type: Option<InstrumentType>,
}

impl RuleSpec {
    pub fn new(name: impl Into<String>, pattern: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            pattern: pattern.into(),
            capture_order: None,
            fixed_type: None,
        }
    }

    pub fn capture_order(mut self, order: &[CaptureRole]) -> Self {
        self.capture_order = Some(order.to_vec());
        self
    }

    pub fn fixed_type(mut self, ty: InstrumentType) -> Self {
        self.fixed_type = Some(ty);
        self
    }

    /// Compile into a matchable rule, validating the pattern and capture order.
    pub fn compile(&self) -> Result<PatternRule, ConfigError> {
        let regex = RegexBuilder::new(&self.pattern)
            .case_insensitive(true)
            .build()
            .map_err(|source| ConfigError::InvalidPattern {
                name: self.name.clone(),
                source,
            })?;

        let order = self
            .capture_order
            .as_deref()
            .unwrap_or(&[CaptureRole::Year, CaptureRole::Number]);

        let group_of = |role: CaptureRole| {
            let mut positions = order.iter().enumerate().filter(|(_, r)| **r == role);
            match (positions.next(), positions.next()) {
                (Some((i, _)), None) => Some(i + 1),
                _ => None,
            }
        };
        let (Some(year_group), Some(number_group)) =
            (group_of(CaptureRole::Year), group_of(CaptureRole::Number))
        else {
            return Err(ConfigError::InvalidCaptureOrder {
                name: self.name.clone(),
            });
        };

        let available = regex.captures_len() - 1;
        if order.len() > available {
            return Err(ConfigError::CaptureGroupOutOfRange {
                name: self.name.clone(),
                wanted: order.len(),
                available,
            });
        }

        Ok(PatternRule {
            spec: self.clone(),
            regex,
            year_group,
            number_group,
        })
    }
}

/// A compiled pattern rule.
#[derive(Debug, Clone)]
pub struct PatternRule {
    spec: RuleSpec,
    regex: Regex,
    year_group: usize,
    number_group: usize,
}

impl PatternRule {
    pub fn name(&self) -> &str {
        &self.spec.name
    }

    pub fn regex(&self) -> &Regex {
        &self.regex
    }

    pub fn fixed_type(&self) -> Option<InstrumentType> {
        self.spec.fixed_type
    }

    pub fn spec(&self) -> &RuleSpec {
        &self.spec
    }

    pub fn component_order(&self) -> ComponentOrder {
        if self.year_group < self.number_group {
            ComponentOrder::YearFirst
        } else {
            ComponentOrder::NumberFirst
        }
    }

    /// Extract `(year, number)` from a match. `None` if either group did not participate.
    pub fn components<'h>(&self, caps: &Captures<'h>) -> Option<(&'h str, &'h str)> {
        let year = caps.get(self.year_group)?.as_str();
        let number = caps.get(self.number_group)?.as_str();
        Some((year, number))
    }
}

/// Ordered list of compiled rules. Earlier rules take precedence.
#[derive(Debug, Clone, Default)]
pub struct RuleSet {
    rules: Vec<PatternRule>,
}

impl RuleSet {
    pub fn new(rules: Vec<PatternRule>) -> Self {
        Self { rules }
    }

    /// Compile a list of specs, failing on the first invalid one.
    pub fn from_specs<I>(specs: I) -> Result<Self, ConfigError>
    where
        I: IntoIterator<Item = RuleSpec>,
    {
        let rules = specs
            .into_iter()
            .map(|spec| spec.compile())
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self { rules })
    }

    /// Parse and compile a `patterns.json` document (a JSON array of rule specs).
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        let specs: Vec<RuleSpec> = serde_json::from_str(json)?;
        Self::from_specs(specs)
    }

    /// The rule forms shipped with the crate.
    pub fn builtin() -> Self {
        BUILTIN.clone()
    }

    /// Append another set's rules after this one's.
    pub fn extend(&mut self, other: RuleSet) {
        self.rules.extend(other.rules);
    }

    pub fn iter(&self) -> impl Iterator<Item = &PatternRule> {
        self.rules.iter()
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }
}

// ── Built-in rules ──

const QUALIFIER: &str = r"(?:EU|EC|EEC|Euratom|CFSP)";

/// Specs for the built-in rule set, most specific first.
pub fn builtin_specs() -> Vec<RuleSpec> {
    use CaptureRole::{Number, Year};
    use InstrumentType::{Decision, Directive, Regulation};

    vec![
        // Regulation (EC) No 1049/2001
        RuleSpec::new(
            "regulation-numbered",
            format!(r"\bRegulations?\s+\({QUALIFIER}\)\s+No\.?\s+([0-9]{{1,4}})/([0-9]{{2,4}})\b"),
        )
        .capture_order(&[Number, Year])
        .fixed_type(Regulation),
        // Regulation (EU) 2016/679
        RuleSpec::new(
            "regulation",
            format!(r"\bRegulations?\s+\({QUALIFIER}\)\s+([0-9]{{2,4}})/([0-9]{{1,4}})\b"),
        )
        .fixed_type(Regulation),
        // Directive 95/46/EC, Directive (EU) 2019/790
        RuleSpec::new(
            "directive",
            format!(
                r"\bDirectives?\s+(?:\({QUALIFIER}\)\s+)?([0-9]{{2,4}})/([0-9]{{1,4}})(?:/{QUALIFIER})?\b"
            ),
        )
        .capture_order(&[Year, Number])
        .fixed_type(Directive),
        // Decision No 1082/2013/EU
        RuleSpec::new(
            "decision-numbered",
            format!(r"\bDecisions?\s+No\.?\s+([0-9]{{1,4}})/([0-9]{{2,4}})(?:/{QUALIFIER})?\b"),
        )
        .capture_order(&[Number, Year])
        .fixed_type(Decision),
        // Decision 2010/87/EU, Decision (CFSP) 2019/797
        RuleSpec::new(
            "decision",
            format!(
                r"\bDecisions?\s+(?:\({QUALIFIER}\)\s+)?([0-9]{{2,4}})/([0-9]{{1,4}})(?:/{QUALIFIER})?\b"
            ),
        )
        .fixed_type(Decision),
        // No 1049/2001, typed by context
        RuleSpec::new("numbered", r"\bNo\.?\s+([0-9]{1,4})/([0-9]{2,4})\b")
            .capture_order(&[Number, Year]),
        // 95/46/EC, typed by context
        RuleSpec::new(
            "qualified",
            format!(r"\b([0-9]{{2,4}})/([0-9]{{1,4}})/{QUALIFIER}\b"),
        ),
    ]
}

static BUILTIN: LazyLock<RuleSet> = LazyLock::new(|| {
    RuleSet::from_specs(builtin_specs()).expect("built-in rules are valid")
});

#[cfg(test)]
mod tests {
    use super::*;

    fn first_match<'h>(rule: &PatternRule, text: &'h str) -> Option<(&'h str, &'h str)> {
        let caps = rule.regex().captures(text)?;
        rule.components(&caps)
    }

    fn builtin_rule(name: &str) -> PatternRule {
        RuleSet::builtin()
            .iter()
            .find(|r| r.name() == name)
            .cloned()
            .unwrap_or_else(|| panic!("no built-in rule {name}"))
    }

    #[test]
    fn default_capture_order_is_year_then_number() {
        let rule = RuleSpec::new("bare", r"(\d{2,4})/(\d{1,4})").compile().unwrap();
        assert_eq!(rule.component_order(), ComponentOrder::YearFirst);
        assert_eq!(first_match(&rule, "see 2016/679"), Some(("2016", "679")));
    }

    #[test]
    fn explicit_number_first_order() {
        let rule = RuleSpec::new("no", r"No (\d{1,4})/(\d{2,4})")
            .capture_order(&[CaptureRole::Number, CaptureRole::Year])
            .compile()
            .unwrap();
        assert_eq!(rule.component_order(), ComponentOrder::NumberFirst);
        assert_eq!(first_match(&rule, "No 1049/2001"), Some(("2001", "1049")));
    }

    #[test]
    fn patterns_are_case_insensitive() {
        let rule = RuleSpec::new("no", r"No (\d{1,4})/(\d{2,4})")
            .capture_order(&[CaptureRole::Number, CaptureRole::Year])
            .compile()
            .unwrap();
        assert!(rule.regex().is_match("NO 1049/2001"));
        assert!(rule.regex().is_match("no 1049/2001"));
    }

    #[test]
    fn invalid_pattern_rejected() {
        let err = RuleSpec::new("broken", r"(\d+/").compile().unwrap_err();
        assert!(matches!(err, ConfigError::InvalidPattern { ref name, .. } if name == "broken"));
    }

    #[test]
    fn capture_order_must_name_both_roles_once() {
        let err = RuleSpec::new("dup", r"(\d+)/(\d+)")
            .capture_order(&[CaptureRole::Year, CaptureRole::Year])
            .compile()
            .unwrap_err();
        assert!(matches!(err, ConfigError::InvalidCaptureOrder { .. }));

        let err = RuleSpec::new("missing", r"(\d+)/(\d+)")
            .capture_order(&[CaptureRole::Number])
            .compile()
            .unwrap_err();
        assert!(matches!(err, ConfigError::InvalidCaptureOrder { .. }));
    }

    #[test]
    fn capture_order_beyond_group_count_rejected() {
        let err = RuleSpec::new("short", r"(\d+)/\d+").compile().unwrap_err();
        assert!(matches!(
            err,
            ConfigError::CaptureGroupOutOfRange {
                wanted: 2,
                available: 1,
                ..
            }
        ));
    }

    #[test]
    fn rule_set_from_json() {
        let rules = RuleSet::from_json_str(
            r#"[
                {"name": "reg", "pattern": "Regulation \\(EU\\) (\\d{4})/(\\d{1,4})", "fixedType": "R"},
                {"name": "no", "regex": "No (\\d{1,4})/(\\d{2,4})", "captureOrder": ["number", "year"]},
                {"name": "dir", "pattern": "(\\d{2})/(\\d{1,4})/EC", "type": "L"}
            ]"#,
        )
        .unwrap();
        let names: Vec<_> = rules.iter().map(|r| r.name()).collect();
        assert_eq!(names, ["reg", "no", "dir"]);
        let types: Vec<_> = rules.iter().map(|r| r.fixed_type()).collect();
        assert_eq!(
            types,
            [
                Some(InstrumentType::Regulation),
                None,
                Some(InstrumentType::Directive)
            ]
        );
    }

    #[test]
    fn rule_set_rejects_unknown_type_letter() {
        let err = RuleSet::from_json_str(r#"[{"name": "x", "pattern": "(1)(2)", "fixedType": "Q"}]"#)
            .unwrap_err();
        assert!(matches!(err, ConfigError::Json(_)));
    }

    #[test]
    fn spec_round_trips_through_json() {
        let spec = RuleSpec::new("no", r"No (\d+)/(\d+)")
            .capture_order(&[CaptureRole::Number, CaptureRole::Year])
            .fixed_type(InstrumentType::Decision);
        let json = serde_json::to_string(&spec).unwrap();
        assert!(json.contains(r#""captureOrder":["number","year"]"#));
        assert!(json.contains(r#""fixedType":"D""#));
        let parsed: RuleSpec = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, spec);
    }

    #[test]
    fn builtin_rules_compile() {
        assert_eq!(RuleSet::builtin().len(), builtin_specs().len());
    }

    #[test]
    fn builtin_regulation_forms() {
        let numbered = builtin_rule("regulation-numbered");
        assert_eq!(
            first_match(&numbered, "Regulation (EC) No 1049/2001 regarding access"),
            Some(("2001", "1049"))
        );
        let modern = builtin_rule("regulation");
        assert_eq!(
            first_match(&modern, "Regulation (EU) 2016/679 of the European Parliament"),
            Some(("2016", "679"))
        );
        assert!(!modern.regex().is_match("Regulation 2016/679"));
    }

    #[test]
    fn builtin_directive_forms() {
        let directive = builtin_rule("directive");
        assert_eq!(first_match(&directive, "Directive 95/46/EC"), Some(("95", "46")));
        assert_eq!(
            first_match(&directive, "Directive (EU) 2019/790 on copyright"),
            Some(("2019", "790"))
        );
    }

    #[test]
    fn builtin_decision_forms() {
        let numbered = builtin_rule("decision-numbered");
        assert_eq!(
            first_match(&numbered, "Decision No 1082/2013/EU"),
            Some(("2013", "1082"))
        );
        let decision = builtin_rule("decision");
        assert_eq!(
            first_match(&decision, "Decision (CFSP) 2019/797"),
            Some(("2019", "797"))
        );
        assert_eq!(first_match(&decision, "Decision 2010/87/EU"), Some(("2010", "87")));
    }
}
