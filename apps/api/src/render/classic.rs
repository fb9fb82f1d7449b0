//! Classic layout — centered serif header, ruled sections, inline skill
//! list. Same content as the other styles, traditional arrangement.

use crate::models::resume::{ResumeData, ResumeStyle};
use crate::render::contact::build_contact_segments;
use crate::render::dom::{StyledDocument, StyledNode};
use crate::render::locale::{document_language, format_period_date, labels_for};
use crate::render::{segment_node, RenderVariant, StyleRenderer};

const INK: &str = "#1f2937";
const MUTED: &str = "#4b5563";
const FAINT: &str = "#6b7280";
const RULE: &str = "oklch(0.707 0.022 261.325)";

pub struct ClassicRenderer;

impl StyleRenderer for ClassicRenderer {
    fn style(&self) -> ResumeStyle {
        ResumeStyle::Classic
    }

    fn render(&self, resume: &ResumeData, variant: RenderVariant) -> StyledDocument {
        let labels = labels_for(document_language(resume));

        let mut root = StyledNode::new("div")
            .class("resume-document resume-classic")
            .style("background-color", "#ffffff")
            .style("color", INK)
            .style("font-family", "Georgia, serif")
            .style("text-align", "center");

        let mut header = StyledNode::new("header");
        if !resume.full_name.is_empty() {
            header = header.child(
                StyledNode::new("h1")
                    .text(&resume.full_name)
                    .style("color", INK)
                    .style("text-transform", "uppercase")
                    .style("letter-spacing", "2px"),
            );
        }
        header = header.child(StyledNode::new("p").text(&resume.title).style("color", MUTED));

        let segments = build_contact_segments(resume);
        if !segments.is_empty() {
            let mut line = StyledNode::new("div").class("contact-line").style("color", FAINT);
            for (index, segment) in segments.iter().enumerate() {
                if index > 0 {
                    line = line.child(StyledNode::new("span").text("|").style("color", RULE));
                }
                line = line.child(segment_node(segment, variant).style("color", FAINT));
            }
            header = header.child(line);
        }
        if !resume.about.is_empty() {
            header = header.child(
                StyledNode::new("p")
                    .text(&resume.about)
                    .style("color", MUTED)
                    .style("font-style", "italic"),
            );
        }
        root = root.child(header);

        if !resume.experiences.is_empty() {
            let mut section = StyledNode::new("section")
                .style("text-align", "left")
                .child(section_title(labels.experience));
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
                    .child(
                        StyledNode::new("h3")
                            .text(format!("{} — {}", exp.position, exp.company))
                            .style("color", INK),
                    )
                    .child(
                        StyledNode::new("span")
                            .text(dates)
                            .style("color", FAINT)
                            .style("font-style", "italic"),
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
            root = root.child(
                StyledNode::new("section")
                    .style("text-align", "left")
                    .child(section_title(labels.skills))
                    .child(
                        StyledNode::new("p")
                            .text(resume.skills.join(", "))
                            .style("color", MUTED),
                    ),
            );
        }

        if !resume.languages.is_empty() {
            let mut section = StyledNode::new("section")
                .style("text-align", "left")
                .child(section_title(labels.languages));
            for lang in &resume.languages {
                section = section.child(
                    StyledNode::new("p")
                        .text(format!("{} — {}", lang.name, labels.level(lang.level)))
                        .style("color", MUTED),
                );
            }
            root = root.child(section);
        }

        if !resume.recommendations.is_empty() {
            let mut section = StyledNode::new("section")
                .style("text-align", "left")
                .child(section_title(labels.recommendations));
            for rec in &resume.recommendations {
                section = section.child(
                    StyledNode::new("p")
                        .text(format!("{}, {} ({})", rec.name, rec.position, rec.contact))
                        .style("color", MUTED),
                );
            }
            root = root.child(section);
        }

        StyledDocument::new(root)
            .custom_property("--page-surface", "#ffffff")
            .custom_property("--rule", RULE)
    }
}

fn section_title(text: &str) -> StyledNode {
    StyledNode::new("h2")
        .text(text)
        .style("color", "#1f2937")
        .style("border-top-color", RULE)
        .style("border-top-width", "1px")
        .style("text-transform", "uppercase")
        .style("letter-spacing", "1px")
}
