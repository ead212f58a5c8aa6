//! Instrument-type context carried through a scanning pass.
//!
//! Citations such as "2016/679" do not say what kind of act they cite; the
//! type comes from the nearest preceding "Regulation", "Directive" or
//! "Decision" keyword, which may sit in an earlier text segment.

use std::sync::LazyLock;

use regex::Regex;

use crate::instrument::InstrumentType;

static KEYWORD_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\b(?:Regulations?|Directives?|Decisions?)\b").expect("keyword regex is valid")
});

/// The most recently observed instrument type within one pass over a document.
///
/// Create one per pass and thread it by `&mut` through every segment in
/// document order. It only changes when a new keyword is observed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TypeContext {
    current: Option<InstrumentType>,
}

impl TypeContext {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start from a known type, e.g. when a page title already names the act.
    pub fn with_type(ty: InstrumentType) -> Self {
        Self { current: Some(ty) }
    }

    pub fn current(&self) -> Option<InstrumentType> {
        self.current
    }

    pub fn is_active(&self) -> bool {
        self.current.is_some()
    }

    /// Record a keyword seen token-by-token.
    pub fn set(&mut self, ty: InstrumentType) {
        self.current = Some(ty);
    }

    /// Scan `text` for whole-word instrument keywords.
    ///
    /// When several occur the rightmost wins. Returns the type in force after
    /// the scan.
    pub fn observe(&mut self, text: &str) -> Option<InstrumentType> {
        if let Some(ty) = last_keyword(text) {
            self.current = Some(ty);
        }
        self.current
    }
}

/// Rightmost instrument keyword in `text`.
pub fn last_keyword(text: &str) -> Option<InstrumentType> {
    KEYWORD_RE
        .find_iter(text)
        .filter_map(|m| InstrumentType::from_keyword(m.as_str()))
        .last()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn starts_inactive() {
        let ctx = TypeContext::new();
        assert!(!ctx.is_active());
        assert_eq!(ctx.current(), None);
    }

    #[test]
    fn observes_single_keyword() {
        let mut ctx = TypeContext::new();
        assert_eq!(
            ctx.observe("Regulation 2016/679 on data protection"),
            Some(InstrumentType::Regulation)
        );
    }

    #[test]
    fn rightmost_keyword_wins() {
        let mut ctx = TypeContext::new();
        ctx.observe("the Directive implementing the Regulation");
        assert_eq!(ctx.current(), Some(InstrumentType::Regulation));

        ctx.observe("the Regulations repealed by a Decision");
        assert_eq!(ctx.current(), Some(InstrumentType::Decision));
    }

    #[test]
    fn persists_across_segments_without_keywords() {
        let mut ctx = TypeContext::new();
        ctx.observe("Directives");
        ctx.observe("see 95/46 and 2002/58");
        assert_eq!(ctx.current(), Some(InstrumentType::Directive));
    }

    #[test]
    fn ignores_lowercase_and_embedded_words() {
        let mut ctx = TypeContext::new();
        ctx.observe("a regulation, deregulation and Decisional matters");
        assert_eq!(ctx.current(), None);
    }

    #[test]
    fn with_type_seeds_context() {
        let mut ctx = TypeContext::with_type(InstrumentType::Decision);
        ctx.observe("nothing here");
        assert_eq!(ctx.current(), Some(InstrumentType::Decision));
    }
}
