//! Line-oriented parser for the restricted markdown dialect reports are written in.
//!
//! Each input line maps to exactly one [`Block`]: `#`/`##`/`###` headings, `-`/`*` list
//! items, `|` table rows, blank separators, and paragraphs for everything else. Leading
//! indentation is ignored when classifying a line, so nested list items flatten to
//! top-level items. List items and paragraphs carry [`Inline`] text with `**bold**` spans.

use serde::Serialize;

const BOLD_DELIMITER: &str = "**";

/// A run of inline text, bold or plain.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Span {
    pub text: String,
    pub bold: bool,
}

/// Source text of a list item or paragraph together with its emphasis spans.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Inline {
    pub source: String,
    pub spans: Vec<Span>,
}

impl Inline {
    pub fn parse(source: &str) -> Self {
        Self {
            source: source.to_string(),
            spans: parse_spans(source),
        }
    }

    /// Text with emphasis delimiters removed.
    pub fn plain_text(&self) -> String {
        self.spans.iter().map(|s| s.text.as_str()).collect()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum Block {
    Heading { level: u8, text: String },
    ListItem(Inline),
    /// A `|`-prefixed line, kept verbatim.
    TableRow(String),
    Paragraph(Inline),
    Blank,
}

impl Block {
    pub fn heading(level: u8, text: &str) -> Self {
        Block::Heading {
            level,
            text: text.to_string(),
        }
    }

    pub fn list_item(source: &str) -> Self {
        Block::ListItem(Inline::parse(source))
    }

    pub fn paragraph(source: &str) -> Self {
        Block::Paragraph(Inline::parse(source))
    }

    pub fn table_row(line: &str) -> Self {
        Block::TableRow(line.to_string())
    }
}

/// Parse markdown into one block per line.
pub fn parse_blocks(markdown: &str) -> Vec<Block> {
    markdown.lines().map(parse_line).collect()
}

fn parse_line(line: &str) -> Block {
    let line = line.trim();
    if line.is_empty() {
        return Block::Blank;
    }

    // Longest marker first so "### " is not taken for "# ".
    for (marker, level) in [("### ", 3), ("## ", 2), ("# ", 1)] {
        if let Some(rest) = line.strip_prefix(marker) {
            return Block::heading(level, rest.trim());
        }
    }

    if let Some(rest) = line.strip_prefix("- ").or_else(|| line.strip_prefix("* ")) {
        return Block::list_item(rest.trim_start());
    }

    if line.starts_with('|') {
        return Block::table_row(line);
    }

    Block::paragraph(line)
}

/// Split text on `**` pairs matched left to right. A trailing unmatched `**`
/// stays in the text literally. Empty spans are dropped.
fn parse_spans(text: &str) -> Vec<Span> {
    let mut spans = Vec::new();
    let mut rest = text;

    while let Some(open) = rest.find(BOLD_DELIMITER) {
        let after_open = &rest[open + BOLD_DELIMITER.len()..];
        let Some(close) = after_open.find(BOLD_DELIMITER) else {
            break;
        };
        push_span(&mut spans, &rest[..open], false);
        push_span(&mut spans, &after_open[..close], true);
        rest = &after_open[close + BOLD_DELIMITER.len()..];
    }
    push_span(&mut spans, rest, false);

    spans
}

fn push_span(spans: &mut Vec<Span>, text: &str, bold: bool) {
    if text.is_empty() {
        return;
    }
    // Merge same-weight runs; an empty bold pair must not split the text around it.
    if let Some(last) = spans.last_mut() {
        if last.bold == bold {
            last.text.push_str(text);
            return;
        }
    }
    spans.push(Span {
        text: text.to_string(),
        bold,
    });
}
