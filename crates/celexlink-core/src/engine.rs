//! The annotation engine: rules + lookup table, applied segment by segment.

use std::sync::LazyLock;

use regex::Regex;
use tracing::{debug, info};

use crate::context::TypeContext;
use crate::lookup::LookupTable;
use crate::matcher::{ResolvedCitation, find_citations};
use crate::resolver::Resolver;
use crate::rewriter::{Rewrite, rewrite};
use crate::rules::RuleSet;

/// Segments without a `digits/digits` token are not matched. The left side
/// allows a single digit so `No 1/2003` passes.
static CITATION_SHAPE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[0-9]{1,4}/[0-9]{1,4}").expect("shape regex is valid"));

/// True when `text` contains a numeric-looking citation token.
pub fn has_citation_shape(text: &str) -> bool {
    CITATION_SHAPE_RE.is_match(text)
}

/// Immutable engine configuration. Share it freely; each pass owns its own
/// [`TypeContext`].
#[derive(Debug, Clone, Default)]
pub struct Annotator {
    rules: RuleSet,
    resolver: Resolver,
}

impl Annotator {
    pub fn new(rules: RuleSet, lookup: LookupTable) -> Self {
        Self {
            rules,
            resolver: Resolver::new(lookup),
        }
    }

    /// Built-in rules and an empty lookup table.
    pub fn builtin() -> Self {
        Self::new(RuleSet::builtin(), LookupTable::new())
    }

    pub fn rules(&self) -> &RuleSet {
        &self.rules
    }

    pub fn resolver(&self) -> &Resolver {
        &self.resolver
    }

    /// Find and resolve citations in one segment, updating `ctx`.
    pub fn scan(&self, text: &str, ctx: &mut TypeContext) -> Vec<ResolvedCitation> {
        find_citations(text, &self.rules, ctx, &self.resolver)
    }

    /// Rewrite one segment, linking every resolvable citation.
    ///
    /// Never fails: text that cannot be linked is returned unchanged.
    pub fn annotate(&self, text: &str, ctx: &mut TypeContext) -> Rewrite {
        let citations = self.scan(text, ctx);
        rewrite(text, &citations)
    }

    /// Start a pass over one document with a fresh context.
    pub fn pass(&self) -> DocumentPass<'_> {
        DocumentPass::new(self)
    }

    /// Rewrite a whole document given as segments in document order.
    pub fn annotate_document<'s, I>(&self, segments: I) -> Vec<Rewrite>
    where
        I: IntoIterator<Item = &'s str>,
    {
        let mut pass = self.pass();
        let out = segments
            .into_iter()
            .map(|segment| pass.annotate(segment))
            .collect();
        pass.finish();
        out
    }
}

/// Counters for one document pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PassStats {
    pub segments: usize,
    /// Segments that passed the citation-shape prefilter.
    pub matched_segments: usize,
    pub rewritten: usize,
    pub links: usize,
}

/// One scanning pass over a document.
///
/// Every segment is observed for instrument keywords so context carries
/// forward, but only segments with a citation-shaped token are matched.
pub struct DocumentPass<'a> {
    annotator: &'a Annotator,
    ctx: TypeContext,
    stats: PassStats,
}

impl<'a> DocumentPass<'a> {
    pub fn new(annotator: &'a Annotator) -> Self {
        Self::with_context(annotator, TypeContext::new())
    }

    pub fn with_context(annotator: &'a Annotator, ctx: TypeContext) -> Self {
        Self {
            annotator,
            ctx,
            stats: PassStats::default(),
        }
    }

    pub fn context(&self) -> &TypeContext {
        &self.ctx
    }

    pub fn stats(&self) -> PassStats {
        self.stats
    }

    /// Citations in the next segment, in order.
    pub fn scan(&mut self, segment: &str) -> Vec<ResolvedCitation> {
        self.stats.segments += 1;
        if !has_citation_shape(segment) {
            self.ctx.observe(segment);
            return Vec::new();
        }
        self.stats.matched_segments += 1;
        self.annotator.scan(segment, &mut self.ctx)
    }

    /// Rewrite the next segment.
    pub fn annotate(&mut self, segment: &str) -> Rewrite {
        let citations = self.scan(segment);
        let out = rewrite(segment, &citations);
        if out.rewritten {
            self.stats.rewritten += 1;
            self.stats.links += out.links;
            debug!(
                segment = self.stats.segments,
                links = out.links,
                "segment rewritten"
            );
        }
        out
    }

    /// Log the pass summary and return its counters.
    pub fn finish(self) -> PassStats {
        info!(
            segments = self.stats.segments,
            matched_segments = self.stats.matched_segments,
            rewritten = self.stats.rewritten,
            links = self.stats.links,
            "document pass complete"
        );
        self.stats
    }
}
