//! Presentation targets for a [`Report`].
//!
//! Both renderers are [`BlockVisitor`]s driven by [`walk`] over the report's cached
//! block sequence, so the interactive view and the exported document cannot disagree
//! on structure; they differ only in the primitives each emits.

pub mod chart;
pub mod document;
pub mod view;

use std::collections::BTreeSet;

use crate::markdown::{Block, Inline};
use crate::report::Report;

pub use chart::{chart_points, ChartPoint};
pub use document::{render_document, suggested_filename, DocBlock, ExportDocument, TextRun};
pub use view::{render_view, ReportView, ViewNode};

/// One callback per block kind, plus the trailing sources section.
pub trait BlockVisitor {
    fn heading(&mut self, level: u8, text: &str);
    fn list_item(&mut self, inline: &Inline);
    fn table_row(&mut self, row: &str);
    fn paragraph(&mut self, inline: &Inline);
    fn blank(&mut self);
    /// Called once after the body, only when there is at least one citation.
    fn citations(&mut self, uris: &BTreeSet<String>);
}

/// Feed the report's blocks, then its citations, to `visitor`.
pub fn walk<V: BlockVisitor>(report: &Report, visitor: &mut V) {
    for block in report.blocks() {
        match block {
            Block::Heading { level, text } => visitor.heading(*level, text),
            Block::ListItem(inline) => visitor.list_item(inline),
            Block::TableRow(row) => visitor.table_row(row),
            Block::Paragraph(inline) => visitor.paragraph(inline),
            Block::Blank => visitor.blank(),
        }
    }
    if !report.citations().is_empty() {
        visitor.citations(report.citations());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use crate::markdown::Span;
    use crate::report::assemble;

    /// Kind and visible text of each content node, in order.
    type Outline = Vec<(&'static str, String)>;

    fn spans_text(spans: &[Span]) -> String {
        spans.iter().map(|s| s.text.as_str()).collect()
    }

    fn runs_text(runs: &[TextRun]) -> String {
        runs.iter().map(|r| r.text.as_str()).collect()
    }

    fn bold_spans(spans: &[Span]) -> Vec<String> {
        spans.iter().filter(|s| s.bold).map(|s| s.text.clone()).collect()
    }

    fn bold_runs(runs: &[TextRun]) -> Vec<String> {
        runs.iter().filter(|r| r.bold).map(|r| r.text.clone()).collect()
    }

    fn view_outline(view: &ReportView) -> (Outline, Vec<String>) {
        let mut outline = Vec::new();
        let mut bold = Vec::new();
        for node in &view.nodes {
            match node {
                ViewNode::Heading { level, text } => {
                    outline.push((heading_kind(*level), text.clone()))
                }
                ViewNode::Bullet(spans) => {
                    outline.push(("list", spans_text(spans)));
                    bold.extend(bold_spans(spans));
                }
                ViewNode::Table(row) => outline.push(("table", row.clone())),
                ViewNode::Paragraph(spans) => {
                    outline.push(("para", spans_text(spans)));
                    bold.extend(bold_spans(spans));
                }
                ViewNode::Spacer => {}
            }
        }
        (outline, bold)
    }

    fn document_outline(doc: &ExportDocument) -> (Outline, Vec<String>) {
        let mut outline = Vec::new();
        let mut bold = Vec::new();
        for block in doc.body() {
            match block {
                DocBlock::Heading { level, text } => {
                    outline.push((heading_kind(*level), text.clone()))
                }
                DocBlock::Bullet { runs } => {
                    outline.push(("list", runs_text(runs)));
                    bold.extend(bold_runs(runs));
                }
                DocBlock::Monospace { text, .. } => outline.push(("table", text.clone())),
                DocBlock::Paragraph { runs } => {
                    outline.push(("para", runs_text(runs)));
                    bold.extend(bold_runs(runs));
                }
                _ => {}
            }
        }
        (outline, bold)
    }

    fn heading_kind(level: u8) -> &'static str {
        match level {
            1 => "h1",
            2 => "h2",
            _ => "h3",
        }
    }

    const BODY: &str = "# Acme Power Ltd\n\n## Summary\n- **Key** risk noted\n| A | B |\n|---|---|\n\nRevenue fell **40%** after the **PPA** lapsed, leaving ** dangling.\n### Lenders\n* SBI";

    #[test]
    fn test_renderers_agree_on_content() {
        let report = assemble("Acme Power Ltd", BODY, ["https://a.example", "https://b.example"]);

        let (view, view_bold) = view_outline(&render_view(&report));
        let (doc, doc_bold) = document_outline(&render_document(&report));

        assert_eq!(view, doc);
        assert_eq!(view_bold, doc_bold);
        assert_eq!(view_bold, vec!["Key", "40%", "PPA"]);
        assert_eq!(
            view,
            vec![
                ("h1", "Acme Power Ltd".to_string()),
                ("h2", "Summary".to_string()),
                ("list", "Key risk noted".to_string()),
                ("table", "| A | B |".to_string()),
                ("table", "|---|---|".to_string()),
                (
                    "para",
                    "Revenue fell 40% after the PPA lapsed, leaving ** dangling.".to_string()
                ),
                ("h3", "Lenders".to_string()),
                ("list", "SBI".to_string()),
            ]
        );
    }

    #[test]
    fn test_sources_only_when_cited() {
        let cited = assemble("Acme", "Body", ["https://a.example"]);
        assert_eq!(render_view(&cited).sources.len(), 1);
        assert_eq!(render_document(&cited).sources().count(), 1);

        let uncited = assemble("Acme", "Body", Vec::<String>::new());
        assert!(render_view(&uncited).sources.is_empty());
        assert_eq!(render_document(&uncited).sources().count(), 0);
        assert!(!render_document(&uncited)
            .blocks
            .iter()
            .any(|b| matches!(b, DocBlock::Heading { text, .. } if text == document::SOURCES_HEADING)));
    }

    #[test]
    fn test_concurrent_renders_share_one_parse() {
        let report = assemble("Acme Power Ltd", BODY, ["https://a.example"]);
        let expected = render_view(&report);

        std::thread::scope(|scope| {
            for _ in 0..4 {
                scope.spawn(|| {
                    assert_eq!(render_view(&report), expected);
                    assert_eq!(render_document(&report).body().len(), 8);
                });
            }
        });
    }

    #[test]
    fn test_walk_visits_blank_blocks() {
        struct Counter(usize);
        impl BlockVisitor for Counter {
            fn heading(&mut self, _: u8, _: &str) {}
            fn list_item(&mut self, _: &Inline) {}
            fn table_row(&mut self, _: &str) {}
            fn paragraph(&mut self, _: &Inline) {}
            fn blank(&mut self) {
                self.0 += 1;
            }
            fn citations(&mut self, _: &BTreeSet<String>) {
                panic!("no citations expected");
            }
        }

        let report = assemble("Acme", "a\n\nb\n   \nc", Vec::<String>::new());
        let mut counter = Counter(0);
        walk(&report, &mut counter);
        assert_eq!(counter.0, 2);
    }
}
