//! Resume renderers — three interchangeable layout projections over one
//! contract. All of them render the same underlying data; only the visual
//! arrangement differs. `Page` output carries clickable contact links,
//! `Card` output is a non-interactive thumbnail.

pub mod contact;
pub mod dom;
pub mod locale;

mod classic;
mod minimal;
mod modern;

pub use classic::ClassicRenderer;
pub use minimal::MinimalRenderer;
pub use modern::ModernRenderer;

use serde::{Deserialize, Serialize};

use crate::models::resume::{ResumeData, ResumeStyle};
use contact::ContactSegment;
use dom::{StyledDocument, StyledNode};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RenderVariant {
    #[default]
    Page,
    Card,
}

pub trait StyleRenderer: Send + Sync {
    fn style(&self) -> ResumeStyle;
    fn render(&self, resume: &ResumeData, variant: RenderVariant) -> StyledDocument;
}

pub fn renderer_for(style: ResumeStyle) -> &'static dyn StyleRenderer {
    match style {
        ResumeStyle::Modern => &ModernRenderer,
        ResumeStyle::Classic => &ClassicRenderer,
        ResumeStyle::Minimal => &MinimalRenderer,
    }
}

/// One contact chip. Links are only attached on the interactive page
/// variant.
pub(crate) fn segment_node(segment: &ContactSegment, variant: RenderVariant) -> StyledNode {
    let mut node = StyledNode::new("span")
        .class("contact-segment")
        .text(segment.display_text());
    if variant == RenderVariant::Page {
        if let Some(href) = &segment.href {
            node = node.link(href.clone());
        }
    }
    node
}
