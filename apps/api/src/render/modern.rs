//! Modern layout — bold header with a bottom rule, accent-barred
//! experience blocks, pill-shaped skill chips.

use crate::models::resume::{ResumeData, ResumeStyle};
use crate::render::contact::build_contact_segments;
use crate::render::dom::{StyledDocument, StyledNode};
use crate::render::locale::{document_language, format_period_date, labels_for};
use crate::render::{segment_node, RenderVariant, StyleRenderer};

// Tailwind v4 resolves the theme palette to oklch(); these are the values
// the page surface actually computes to.
const INK: &str = "oklch(0.21 0.034 264.665)";
const MUTED: &str = "oklch(0.446 0.03 256.802)";
const FAINT: &str = "oklch(0.551 0.027 264.364)";
const RULE: &str = "oklch(0.872 0.01 258.338)";
const ACCENT: &str = "oklch(0.623 0.214 259.815)";
const CHIP_BG: &str = "oklch(0.932 0.032 255.585)";
const CHIP_INK: &str = "oklch(0.424 0.199 265.638)";
const GREEN: &str = "oklch(0.723 0.219 149.579)";

pub struct ModernRenderer;

impl StyleRenderer for ModernRenderer {
    fn style(&self) -> ResumeStyle {
        ResumeStyle::Modern
    }

    fn render(&self, resume: &ResumeData, variant: RenderVariant) -> StyledDocument {
        let labels = labels_for(document_language(resume));

        let mut root = StyledNode::new("div")
            .class("resume-document resume-modern")
            .style("background-color", "#ffffff")
            .style("color", INK)
            .style("font-family", "Inter, sans-serif");

        // Header
        let mut header = StyledNode::new("header")
            .style("border-bottom-color", RULE)
            .style("border-bottom-width", "2px");
        if !resume.full_name.is_empty() {
            header = header.child(
                StyledNode::new("h1")
                    .text(&resume.full_name)
                    .style("color", INK)
                    .style("font-size", "36px"),
            );
        }
        header = header.child(
            StyledNode::new("p")
                .text(&resume.title)
                .style("color", MUTED)
                .style("text-transform", "uppercase"),
        );

        let segments = build_contact_segments(resume);
        if !segments.is_empty() {
            let mut line = StyledNode::new("div")
                .class("contact-line")
                .style("color", MUTED);
            for (index, segment) in segments.iter().enumerate() {
                if index > 0 {
                    line = line.child(StyledNode::new("span").text("•").style("color", FAINT));
                }
                line = line.child(segment_node(segment, variant).style("color", MUTED));
            }
            header = header.child(line);
        }

        if !resume.about.is_empty() {
            header = header.child(
                StyledNode::new("p")
                    .text(&resume.about)
                    .style("color", MUTED)
                    .style("line-height", "1.6"),
            );
        }
        root = root.child(header);

        // Experience
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
                    .style("border-left-color", ACCENT)
                    .style("border-left-width", "4px")
                    .child(StyledNode::new("h3").text(&exp.position).style("color", INK))
                    .child(StyledNode::new("p").text(&exp.company).style("color", MUTED))
                    .child(StyledNode::new("span").text(dates).style("color", FAINT));
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

        // Skills
        if !resume.skills.is_empty() {
            let mut section = StyledNode::new("section").child(section_title(labels.skills));
            let mut row = StyledNode::new("div").class("skill-row");
            for skill in &resume.skills {
                row = row.child(
                    StyledNode::new("span")
                        .class("skill-chip")
                        .text(skill)
                        .style("background-color", CHIP_BG)
                        .style("color", CHIP_INK)
                        .style("border-radius", "9999px"),
                );
            }
            root = root.child(section.child(row));
        }

        // Languages
        if !resume.languages.is_empty() {
            let mut section = StyledNode::new("section").child(section_title(labels.languages));
            for lang in &resume.languages {
                section = section.child(
                    StyledNode::new("div")
                        .class("language-row")
                        .child(StyledNode::new("span").text(&lang.name).style("color", INK))
                        .child(
                            StyledNode::new("span")
                                .text(labels.level(lang.level))
                                .style("color", MUTED),
                        ),
                );
            }
            root = root.child(section);
        }

        // Recommendations
        if !resume.recommendations.is_empty() {
            let mut section =
                StyledNode::new("section").child(section_title(labels.recommendations));
            for rec in &resume.recommendations {
                section = section.child(
                    StyledNode::new("div")
                        .style("border-left-color", GREEN)
                        .style("border-left-width", "4px")
                        .child(StyledNode::new("p").text(&rec.name).style("color", INK))
                        .child(StyledNode::new("p").text(&rec.position).style("color", MUTED))
                        .child(StyledNode::new("p").text(&rec.contact).style("color", FAINT)),
                );
            }
            root = root.child(section);
        }

        StyledDocument::new(root)
            .custom_property("--page-surface", "#ffffff")
            .custom_property("--accent", ACCENT)
    }
}

fn section_title(text: &str) -> StyledNode {
    StyledNode::new("h2")
        .text(text)
        .style("color", INK)
        .style("border-bottom-color", RULE)
        .style("border-bottom-width", "1px")
}
