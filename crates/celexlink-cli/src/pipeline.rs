//! Document pipeline: read inputs, run one pass per input, write results.

use std::io::{Read, Write};
use std::path::{Path, PathBuf};

use anyhow::Context;
use celexlink_core::{Annotator, PassStats, ResolvedCitation};

use crate::display::{CitationReport, Located};

/// One input document.
pub struct Input {
    pub name: String,
    pub text: String,
}

/// Read every path, or stdin when none are given.
pub fn read_inputs(paths: &[PathBuf]) -> anyhow::Result<Vec<Input>> {
    if paths.is_empty() {
        let mut text = String::new();
        std::io::stdin()
            .read_to_string(&mut text)
            .context("reading stdin")?;
        return Ok(vec![Input {
            name: "<stdin>".to_string(),
            text,
        }]);
    }
    paths.iter().map(|p| read_input(p)).collect()
}

fn read_input(path: &Path) -> anyhow::Result<Input> {
    let text =
        std::fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))?;
    Ok(Input {
        name: path.display().to_string(),
        text,
    })
}

/// Lines with their terminators, so rejoining them reproduces the input.
fn segments(text: &str) -> impl Iterator<Item = &str> {
    text.split_inclusive('\n')
}

/// Rewrite one document, line by line, into `out`.
pub fn annotate_input<W: Write>(
    annotator: &Annotator,
    input: &Input,
    out: &mut W,
) -> anyhow::Result<PassStats> {
    let mut pass = annotator.pass();
    for segment in segments(&input.text) {
        let rewrite = pass.annotate(segment);
        out.write_all(rewrite.fragment.as_bytes())
            .with_context(|| format!("writing output for {}", input.name))?;
    }
    Ok(pass.finish())
}

/// Every linked citation in one document with its 1-based line number.
pub fn scan_input(annotator: &Annotator, input: &Input) -> Vec<(usize, ResolvedCitation)> {
    let mut pass = annotator.pass();
    let mut found = Vec::new();
    for (i, segment) in segments(&input.text).enumerate() {
        found.extend(pass.scan(segment).into_iter().map(|c| (i + 1, c)));
    }
    pass.finish();
    found
}

/// Render a scan result as text.
pub fn render_scan(input: &Input, found: &[(usize, ResolvedCitation)]) -> String {
    let located: Vec<Located<'_>> = found
        .iter()
        .map(|(line, citation)| Located {
            line: *line,
            citation,
        })
        .collect();
    CitationReport {
        source: &input.name,
        found: &located,
    }
    .to_string()
}
