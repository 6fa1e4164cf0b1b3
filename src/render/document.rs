use std::collections::BTreeSet;
use std::ops::Range;

use serde::Serialize;

use super::{walk, BlockVisitor};
use crate::markdown::{Inline, Span};
use crate::report::Report;

pub const SOURCES_HEADING: &str = "Sources & References";
const FILENAME_SUFFIX: &str = "_DeepDive_Report.docx";
const MONOSPACE_FONT: &str = "Courier New";
/// Font size in half-points (10pt).
const MONOSPACE_SIZE: u32 = 20;
const SUBTITLE_COLOR: &str = "666666";

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TextRun {
    pub text: String,
    pub bold: bool,
    pub italic: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
}

impl TextRun {
    fn plain(text: &str) -> Self {
        Self {
            text: text.to_string(),
            bold: false,
            italic: false,
            color: None,
        }
    }
}

impl From<&Span> for TextRun {
    fn from(span: &Span) -> Self {
        Self {
            bold: span.bold,
            ..Self::plain(&span.text)
        }
    }
}

/// Word-processor block handed to the export packer.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum DocBlock {
    /// Centered document title.
    Title { text: String },
    Subtitle { runs: Vec<TextRun> },
    Heading { level: u8, text: String },
    Paragraph { runs: Vec<TextRun> },
    /// Level-0 bulleted paragraph.
    Bullet { runs: Vec<TextRun> },
    Monospace { text: String, font: String, size: u32 },
    /// Bulleted hyperlink.
    Link { uri: String },
}

/// The block tree plus the filename the export should be saved under.
#[derive(Debug, Clone, Serialize)]
pub struct ExportDocument {
    /// Id of the report this was rendered from; stable across re-renders.
    pub report_id: String,
    pub filename: String,
    pub blocks: Vec<DocBlock>,
    #[serde(skip)]
    body: Range<usize>,
}

impl ExportDocument {
    /// Blocks rendered from the report body, without title or sources.
    pub fn body(&self) -> &[DocBlock] {
        &self.blocks[self.body.clone()]
    }

    pub fn sources(&self) -> impl Iterator<Item = &str> {
        self.blocks.iter().filter_map(|b| match b {
            DocBlock::Link { uri } => Some(uri.as_str()),
            _ => None,
        })
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}

/// `<subject with whitespace runs as "_">_DeepDive_Report.docx`.
pub fn suggested_filename(subject: &str) -> String {
    let stem = subject.split_whitespace().collect::<Vec<_>>().join("_");
    format!("{}{}", stem, FILENAME_SUFFIX)
}

struct DocumentBuilder {
    blocks: Vec<DocBlock>,
}

impl DocumentBuilder {
    fn runs(inline: &Inline) -> Vec<TextRun> {
        inline.spans.iter().map(TextRun::from).collect()
    }
}

impl BlockVisitor for DocumentBuilder {
    fn heading(&mut self, level: u8, text: &str) {
        self.blocks.push(DocBlock::Heading {
            level,
            text: text.to_string(),
        });
    }

    fn list_item(&mut self, inline: &Inline) {
        self.blocks.push(DocBlock::Bullet {
            runs: Self::runs(inline),
        });
    }

    fn table_row(&mut self, row: &str) {
        self.blocks.push(DocBlock::Monospace {
            text: row.to_string(),
            font: MONOSPACE_FONT.to_string(),
            size: MONOSPACE_SIZE,
        });
    }

    fn paragraph(&mut self, inline: &Inline) {
        self.blocks.push(DocBlock::Paragraph {
            runs: Self::runs(inline),
        });
    }

    // Paragraph spacing already separates blocks in the document.
    fn blank(&mut self) {}

    fn citations(&mut self, uris: &BTreeSet<String>) {
        self.heading(2, SOURCES_HEADING);
        self.blocks
            .extend(uris.iter().map(|uri| DocBlock::Link { uri: uri.clone() }));
    }
}

/// Build the exportable document for `report`.
pub fn render_document(report: &Report) -> ExportDocument {
    let mut builder = DocumentBuilder {
        blocks: vec![
            DocBlock::Title {
                text: format!("Due Diligence Report: {}", report.subject()),
            },
            DocBlock::Subtitle {
                runs: vec![TextRun {
                    italic: true,
                    color: Some(SUBTITLE_COLOR.to_string()),
                    ..TextRun::plain(&format!(
                        "Generated on: {}",
                        report.generated_at().format("%d %b %Y")
                    ))
                }],
            },
        ],
    };
    let body_start = builder.blocks.len();

    walk(report, &mut builder);

    let body_end = builder
        .blocks
        .iter()
        .rposition(|b| matches!(b, DocBlock::Heading { level: 2, text } if text == SOURCES_HEADING))
        .filter(|_| !report.citations().is_empty())
        .unwrap_or(builder.blocks.len());

    ExportDocument {
        report_id: report.id().to_string(),
        filename: suggested_filename(report.subject()),
        blocks: builder.blocks,
        body: body_start..body_end,
    }
}
