use std::collections::BTreeSet;

use maud::{html, Markup};
use serde::Serialize;

use super::chart::{chart_points, ChartPoint};
use super::{walk, BlockVisitor};
use crate::markdown::{Inline, Span};
use crate::report::citations::citation_label;
use crate::report::{Provenance, Report};

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", content = "value", rename_all = "snake_case")]
pub enum ViewNode {
    Heading { level: u8, text: String },
    Bullet(Vec<Span>),
    /// Monospace table row.
    Table(String),
    Paragraph(Vec<Span>),
    Spacer,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ViewHeader {
    pub subject: String,
    pub generated_on: String,
    /// Shown when the report came from internal knowledge only.
    pub badge: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SourceLink {
    pub uri: String,
    pub label: String,
}

/// Everything the interactive screen shows for one report.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReportView {
    pub header: ViewHeader,
    pub chart: Vec<ChartPoint>,
    pub nodes: Vec<ViewNode>,
    pub sources: Vec<SourceLink>,
}

struct ViewBuilder {
    nodes: Vec<ViewNode>,
    sources: Vec<SourceLink>,
}

impl BlockVisitor for ViewBuilder {
    fn heading(&mut self, level: u8, text: &str) {
        self.nodes.push(ViewNode::Heading {
            level,
            text: text.to_string(),
        });
    }

    fn list_item(&mut self, inline: &Inline) {
        self.nodes.push(ViewNode::Bullet(inline.spans.clone()));
    }

    fn table_row(&mut self, row: &str) {
        self.nodes.push(ViewNode::Table(row.to_string()));
    }

    fn paragraph(&mut self, inline: &Inline) {
        self.nodes.push(ViewNode::Paragraph(inline.spans.clone()));
    }

    fn blank(&mut self) {
        self.nodes.push(ViewNode::Spacer);
    }

    fn citations(&mut self, uris: &BTreeSet<String>) {
        self.sources = uris
            .iter()
            .map(|uri| SourceLink {
                uri: uri.clone(),
                label: citation_label(uri),
            })
            .collect();
    }
}

/// Build the interactive view for `report`.
pub fn render_view(report: &Report) -> ReportView {
    let mut builder = ViewBuilder {
        nodes: Vec::new(),
        sources: Vec::new(),
    };
    walk(report, &mut builder);

    let badge = match report.provenance() {
        Provenance::Retrieval => None,
        Provenance::InternalKnowledge => Some("Internal knowledge only".to_string()),
    };

    ReportView {
        header: ViewHeader {
            subject: report.subject().to_string(),
            generated_on: report.generated_at().format("%d %b %Y").to_string(),
            badge,
        },
        chart: chart_points(report.financial_series()),
        nodes: builder.nodes,
        sources: builder.sources,
    }
}

impl ReportView {
    /// Markup for the report panel.
    pub fn markup(&self) -> Markup {
        html! {
            article class="report" {
                header {
                    p class="eyebrow" { "Confidential Information Memorandum" }
                    h1 class="report-title" { (self.header.subject) }
                    p class="generated" { "Generated " (self.header.generated_on) }
                    @if let Some(badge) = &self.header.badge {
                        span class="badge" { (badge) }
                    }
                }
                section class="content" {
                    @for node in &self.nodes {
                        @match node {
                            ViewNode::Heading { level: 1, text } => {
                                h1 class="heading-1" { (text) }
                            },
                            ViewNode::Heading { level: 2, text } => {
                                h2 class="heading-2" { (text) }
                            },
                            ViewNode::Heading { text, .. } => {
                                h3 class="heading-3" { (text) }
                            },
                            ViewNode::Bullet(spans) => {
                                div class="bullet" {
                                    span class="marker" { "●" }
                                    span { (spans_markup(spans)) }
                                }
                            },
                            ViewNode::Table(row) => {
                                pre class="table-row" { (row) }
                            },
                            ViewNode::Paragraph(spans) => {
                                p { (spans_markup(spans)) }
                            },
                            ViewNode::Spacer => {
                                div class="spacer" {}
                            },
                        }
                    }
                }
                @if !self.sources.is_empty() {
                    footer class="sources" {
                        h4 { "Analyst References & Sources" }
                        ul {
                            @for source in &self.sources {
                                li {
                                    a href=(source.uri) target="_blank" rel="noopener noreferrer" title=(source.uri) {
                                        (source.label)
                                    }
                                }
                            }
                        }
                    }
                }
            }
        }
    }

    pub fn to_html(&self) -> String {
        self.markup().into_string()
    }

    /// Terminal-friendly rendering of [`Self::to_html`].
    pub fn to_plain_text(&self, width: usize) -> String {
        let html = self.to_html();
        let rendered = html2text::from_read(html.as_bytes(), width);
        rendered.unwrap_or(html)
    }
}

fn spans_markup(spans: &[Span]) -> Markup {
    html! {
        @for span in spans {
            @if span.bold {
                strong class="font-semibold" { (span.text) }
            } @else {
                (span.text)
            }
        }
    }
}
