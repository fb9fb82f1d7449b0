//! Minimal layout — plain stacked lines, light palette, no rules or
//! chips.

use crate::models::resume::{ResumeData, ResumeStyle};
use crate::render::contact::build_contact_segments;
use crate::render::dom::{StyledDocument, StyledNode};
use crate::render::locale::{document_language, format_period_date, labels_for};
use crate::render::{segment_node, RenderVariant, StyleRenderer};

const INK: &str = "oklch(0.278 0.033 256.848)";
const MUTED: &str = "oklch(0.551 0.027 264.364)";

pub struct MinimalRenderer;

impl StyleRenderer for MinimalRenderer {
    fn style(&self) -> ResumeStyle {
        ResumeStyle::Minimal
    }

    fn render(&self, resume: &ResumeData, variant: RenderVariant) -> StyledDocument {
        let labels = labels_for(document_language(resume));

        let mut root = StyledNode::new("div")
            .class("resume-document resume-minimal")
            .style("background-color", "#ffffff")
            .style("color", INK)
            .style("font-family", "Helvetica, Arial, sans-serif")
            .style("font-weight", "300");

        let mut header = StyledNode::new("header");
        if !resume.full_name.is_empty() {
            header = header.child(
                StyledNode::new("h1")
                    .text(&resume.full_name)
                    .style("color", INK)
                    .style("font-weight", "400"),
            );
        }
        header = header.child(StyledNode::new("p").text(&resume.title).style("color", MUTED));

        let segments = build_contact_segments(resume);
        if !segments.is_empty() {
            let mut line = StyledNode::new("div").class("contact-line").style("color", MUTED);
            for segment in &segments {
                line = line.child(segment_node(segment, variant).style("color", MUTED));
            }
            header = header.child(line);
        }
        if !resume.about.is_empty() {
            header = header.child(StyledNode::new("p").text(&resume.about).style("color", MUTED));
        }
        root = root.child(header);

        if !resume.experiences.is_empty() {
            let mut section = StyledNode::new("section").child(section_title(labels.experience));
            for exp in &resume.experiences {
                let dates = format!(
                    "{} - {}",
                    format_period_date(&exp.period.start),
                    exp.period
                        .end
                        .as_deref()
                        .map(format_period_date)
                        .unwrap_or_else(|| labels.present.to_string()),
                );
                let mut block = StyledNode::new("div")
                    .child(StyledNode::new("p").text(&exp.position).style("color", INK))
                    .child(
                        StyledNode::new("p")
                            .text(format!("{} · {dates}", exp.company))
                            .style("color", MUTED),
                    );
                if !exp.description.is_empty() {
                    block = block.child(
                        StyledNode::new("div")
                            .text(&exp.description)
                            .style("color", MUTED)
                            .style("white-space", "pre-line"),
                    );
                }
                section = section.child(block);
            }
            root = root.child(section);
        }

        if !resume.skills.is_empty() {
            let mut section = StyledNode::new("section").child(section_title(labels.skills));
            for skill in &resume.skills {
                section = section.child(StyledNode::new("p").text(skill).style("color", MUTED));
            }
            root = root.child(section);
        }

        if !resume.languages.is_empty() {
            let mut section = StyledNode::new("section").child(section_title(labels.languages));
            for lang in &resume.languages {
                section = section.child(
                    StyledNode::new("p")
                        .text(format!("{} · {}", lang.name, labels.level(lang.level)))
                        .style("color", MUTED),
                );
            }
            root = root.child(section);
        }

        if !resume.recommendations.is_empty() {
            let mut section =
                StyledNode::new("section").child(section_title(labels.recommendations));
            for rec in &resume.recommendations {
                section = section.child(
                    StyledNode::new("p")
                        .text(format!("{} · {} · {}", rec.name, rec.position, rec.contact))
                        .style("color", MUTED),
                );
            }
            root = root.child(section);
        }

        StyledDocument::new(root).custom_property("--page-surface", "#ffffff")
    }
}

fn section_title(text: &str) -> StyledNode {
    StyledNode::new("h2")
        .text(text)
        .style("color", MUTED)
        .style("text-transform", "uppercase")
        .style("letter-spacing", "3px")
        .style("font-size", "12px")
}
