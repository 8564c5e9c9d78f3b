// src/extractors/blocks.rs

use once_cell::sync::Lazy;
use regex::Regex;

// --- Regex Patterns (Lazy Static) ---
static URL_IN_TEXT_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"https?://[^\s\)]+").expect("Failed to compile URL_IN_TEXT_RE")
});

/// One inline run of rich text, optionally carrying a hyperlink.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextRun {
    pub text: String,
    pub href: Option<String>,
}

impl TextRun {
    pub fn plain(text: impl Into<String>) -> Self {
        Self { text: text.into(), href: None }
    }

    pub fn linked(text: impl Into<String>, href: impl Into<String>) -> Self {
        Self { text: text.into(), href: Some(href.into()) }
    }
}

/// One node of the source document's content tree. Blocks form a two-level
/// tree: a flat top-level sequence, where list items and toggles may own
/// nested children.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Block {
    pub id: String,
    pub kind: BlockKind,
}

/// Tagged union over the block types the pipeline understands. Each case
/// carries only the fields relevant to it; table rows are resolved by the
/// fetcher before classification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BlockKind {
    Heading2 { runs: Vec<TextRun> },
    Heading3 { runs: Vec<TextRun> },
    Paragraph { runs: Vec<TextRun> },
    Quote { runs: Vec<TextRun> },
    Callout { runs: Vec<TextRun> },
    BulletedItem { runs: Vec<TextRun>, children: Vec<Block> },
    NumberedItem { runs: Vec<TextRun>, children: Vec<Block> },
    Toggle { runs: Vec<TextRun>, children: Vec<Block> },
    Table { rows: Vec<Vec<String>> },
}

impl Block {
    pub fn new(id: impl Into<String>, kind: BlockKind) -> Self {
        Self { id: id.into(), kind }
    }

    /// The inline runs of this block, if its kind carries any.
    pub fn runs(&self) -> Option<&[TextRun]> {
        match &self.kind {
            BlockKind::Heading2 { runs }
            | BlockKind::Heading3 { runs }
            | BlockKind::Paragraph { runs }
            | BlockKind::Quote { runs }
            | BlockKind::Callout { runs }
            | BlockKind::BulletedItem { runs, .. }
            | BlockKind::NumberedItem { runs, .. }
            | BlockKind::Toggle { runs, .. } => Some(runs),
            BlockKind::Table { .. } => None,
        }
    }
}

/// Concatenates the plain text of a run sequence.
pub fn plain_text(runs: &[TextRun]) -> String {
    runs.iter().map(|r| r.text.as_str()).collect()
}

/// First URL carried by a run sequence: an explicit href wins, otherwise the
/// first `http(s)://` substring found inside the run text.
pub fn extract_url(runs: &[TextRun]) -> Option<String> {
    for run in runs {
        if let Some(href) = &run.href {
            return Some(href.clone());
        }
        if run.text.contains("http") {
            if let Some(url) = find_url_in_text(&run.text) {
                return Some(url);
            }
        }
    }
    None
}

/// Extracts the first `http(s)://` URL embedded in free text.
pub fn find_url_in_text(text: &str) -> Option<String> {
    URL_IN_TEXT_RE.find(text).map(|m| m.as_str().to_string())
}
