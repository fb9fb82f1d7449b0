//! Color compatibility pass for the export rasterizer.
//!
//! The page styles resolve to modern CSS color functions the raster
//! backend cannot ingest. This pass walks the styled tree, rewrites every
//! affected property to an `rgb()` equivalent via the CSS color parser,
//! and records each override so the tree can be restored to its exact
//! prior state afterwards. Composite values (gradients, shadows) may carry
//! several color functions; each occurrence is replaced independently.

use crate::render::dom::{walk_mut, StyledDocument};

/// Color-function tokens the raster backend rejects.
pub const MODERN_COLOR_FUNCTIONS: &[&str] = &["oklch(", "oklab(", "lab(", "lch(", "color("];

/// Properties holding a single color value.
const SIMPLE_PROPERTIES: &[&str] = &[
    "color",
    "background-color",
    "border-color",
    "border-top-color",
    "border-right-color",
    "border-bottom-color",
    "border-left-color",
    "outline-color",
    "text-decoration-color",
    "column-rule-color",
];

/// Composite properties that may embed several color functions.
const COMPOSITE_PROPERTIES: &[&str] = &[
    "background",
    "background-image",
    "box-shadow",
    "text-shadow",
];

const NEUTRAL_FALLBACK: &str = "#cccccc";

/// Property-specific substitute when the parser cannot normalize a token.
fn fallback_for(property: &str) -> &'static str {
    if property == "color" {
        "#000000"
    } else if property.starts_with("background") {
        "#ffffff"
    } else {
        NEUTRAL_FALLBACK
    }
}

/// Finds the earliest modern color-function token at or after `from`,
/// requiring an identifier boundary so `lab(` never matches inside
/// `oklab(`.
fn find_token(value: &str, from: usize) -> Option<(usize, &'static str)> {
    let mut best: Option<(usize, &'static str)> = None;
    for token in MODERN_COLOR_FUNCTIONS {
        let mut search = from;
        while let Some(pos) = value[search..].find(token) {
            let abs = search + pos;
            let boundary_ok = abs == 0
                || value[..abs]
                    .chars()
                    .next_back()
                    .map(|prev| !prev.is_ascii_alphanumeric() && prev != '-')
                    .unwrap_or(true);
            if boundary_ok {
                if best.map_or(true, |(b, _)| abs < b) {
                    best = Some((abs, token));
                }
                break;
            }
            search = abs + 1;
        }
    }
    best
}

fn matching_paren(value: &str, open: usize) -> Option<usize> {
    let mut depth = 0i32;
    for (index, byte) in value.bytes().enumerate().skip(open) {
        match byte {
            b'(' => depth += 1,
            b')' => {
                depth -= 1;
                if depth == 0 {
                    return Some(index);
                }
            }
            _ => {}
        }
    }
    None
}

pub fn contains_modern_color(value: &str) -> bool {
    find_token(value, 0).is_some()
}

/// Rewrites every modern color-function occurrence in `value` to an
/// `rgb()` form, substituting `fallback` for occurrences the parser
/// cannot normalize.
pub fn normalize_color_value(value: &str, fallback: &str) -> String {
    let mut out = String::with_capacity(value.len());
    let mut cursor = 0;

    while let Some((start, token)) = find_token(value, cursor) {
        out.push_str(&value[cursor..start]);

        let open = start + token.len() - 1;
        let Some(end) = matching_paren(value, open) else {
            // Unterminated function, nothing sensible left to keep.
            out.push_str(fallback);
            return out;
        };

        match csscolorparser::parse(&value[start..=end]) {
            Ok(color) => out.push_str(&color.to_rgb_string()),
            Err(_) => out.push_str(fallback),
        }
        cursor = end + 1;
    }

    out.push_str(&value[cursor..]);
    out
}

/// One recorded element override: the inline value the property had
/// before the pass (empty = no inline value was set).
#[derive(Debug, Clone, PartialEq)]
pub struct StyleOverride {
    pub path: Vec<usize>,
    pub property: String,
    pub previous: String,
}

#[derive(Debug, Default)]
pub struct OverrideLedger {
    pub elements: Vec<StyleOverride>,
    pub root_properties: Vec<(String, String)>,
}

impl OverrideLedger {
    pub fn is_empty(&self) -> bool {
        self.elements.is_empty() && self.root_properties.is_empty()
    }
}

/// Applies the compatibility pass to the whole document, returning the
/// ledger needed to revert it. Root custom properties are rewritten with
/// the same logic.
pub fn apply_color_fix(doc: &mut StyledDocument) -> OverrideLedger {
    let mut ledger = OverrideLedger::default();

    walk_mut(&mut doc.root, &mut |node, path| {
        for &property in SIMPLE_PROPERTIES.iter().chain(COMPOSITE_PROPERTIES) {
            let Some(value) = node.effective(property).map(str::to_string) else {
                continue;
            };
            if !contains_modern_color(&value) {
                continue;
            }
            let replacement = normalize_color_value(&value, fallback_for(property));
            ledger.elements.push(StyleOverride {
                path: path.to_vec(),
                property: property.to_string(),
                previous: node.inline.get(property).unwrap_or_default().to_string(),
            });
            node.inline.set(property, replacement);
        }
    });

    for name in doc.custom_properties.properties() {
        let Some(value) = doc.custom_properties.get(&name).map(str::to_string) else {
            continue;
        };
        if !contains_modern_color(&value) {
            continue;
        }
        ledger.root_properties.push((name.clone(), value.clone()));
        doc.custom_properties
            .set(&name, normalize_color_value(&value, NEUTRAL_FALLBACK));
    }

    ledger
}

/// Reverts every recorded override, element inline styles and root custom
/// properties both.
pub fn revert(doc: &mut StyledDocument, ledger: &OverrideLedger) {
    for over in &ledger.elements {
        if let Some(node) = doc.root.node_at_path_mut(&over.path) {
            if over.previous.is_empty() {
                node.inline.remove(&over.property);
            } else {
                node.inline.set(&over.property, &over.previous);
            }
        }
    }
    for (name, previous) in &ledger.root_properties {
        doc.custom_properties.set(name, previous);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::render::dom::{StyledDocument, StyledNode};

    #[test]
    fn test_detects_tokens_at_boundaries_only() {
        assert!(contains_modern_color("oklch(0.5 0.1 200)"));
        assert!(contains_modern_color("1px solid lab(50% 40 59)"));
        assert!(!contains_modern_color("rgb(1,2,3)"));
        // "lab(" inside "collaborate(" must not match
        assert!(!contains_modern_color("collaborate(x)"));
    }

    #[test]
    fn test_normalizes_single_value() {
        let out = normalize_color_value("oklch(0.623 0.214 259.815)", "#cccccc");
        assert!(out.starts_with("rgb"), "got {out}");
    }

    #[test]
    fn test_normalizes_each_occurrence_in_composite_value() {
        let value = "linear-gradient(oklch(0.7 0.1 200), oklab(0.4 0.0 0.0))";
        let out = normalize_color_value(value, "#ffffff");
        assert!(out.starts_with("linear-gradient("));
        assert!(!contains_modern_color(&out));
        assert_eq!(out.matches("rgb").count(), 2, "got {out}");
    }

    #[test]
    fn test_unparseable_token_gets_fallback() {
        let out = normalize_color_value("color(display-p3 1 0 0)", "#000000");
        assert_eq!(out, "#000000");
    }

    #[test]
    fn test_unterminated_function_gets_fallback() {
        let out = normalize_color_value("oklch(0.5 0.1", "#cccccc");
        assert_eq!(out, "#cccccc");
    }

    #[test]
    fn test_fallbacks_by_property() {
        assert_eq!(fallback_for("color"), "#000000");
        assert_eq!(fallback_for("background-color"), "#ffffff");
        assert_eq!(fallback_for("background-image"), "#ffffff");
        assert_eq!(fallback_for("border-left-color"), "#cccccc");
        assert_eq!(fallback_for("box-shadow"), "#cccccc");
    }

    fn oklch_document() -> StyledDocument {
        StyledDocument::new(
            StyledNode::new("div")
                .style("color", "oklch(0.21 0.034 264.665)")
                .style("background-color", "#ffffff")
                .child(
                    StyledNode::new("p")
                        .style("border-left-color", "oklch(0.623 0.214 259.815)")
                        .style("box-shadow", "0 1px 2px oklch(0.21 0.034 264.665 / 0.2)"),
                ),
        )
        .custom_property("--accent", "oklch(0.623 0.214 259.815)")
        .custom_property("--surface", "#ffffff")
    }

    #[test]
    fn test_apply_records_and_rewrites() {
        let mut doc = oklch_document();
        let ledger = apply_color_fix(&mut doc);

        assert_eq!(ledger.elements.len(), 3);
        assert_eq!(ledger.root_properties.len(), 1);
        assert!(ledger.elements.iter().all(|o| o.previous.is_empty()));

        assert!(!contains_modern_color(doc.root.effective("color").unwrap()));
        let child = doc.root.node_at_path_mut(&[0]).unwrap();
        assert!(!contains_modern_color(child.effective("border-left-color").unwrap()));
        assert!(!contains_modern_color(child.effective("box-shadow").unwrap()));
        assert!(!contains_modern_color(doc.custom_properties.get("--accent").unwrap()));
        // untouched values stay untouched
        assert_eq!(doc.custom_properties.get("--surface"), Some("#ffffff"));
    }

    #[test]
    fn test_revert_restores_exact_prior_state() {
        let mut doc = oklch_document();
        let pristine = doc.clone();

        let ledger = apply_color_fix(&mut doc);
        assert!(!ledger.is_empty());
        revert(&mut doc, &ledger);

        assert_eq!(doc, pristine);
    }

    #[test]
    fn test_revert_restores_prior_inline_value() {
        let mut doc = StyledDocument::new(StyledNode::new("div").style("color", "oklch(0.5 0.1 20)"));
        doc.root.inline.set("color", "oklch(0.6 0.2 30)");

        let ledger = apply_color_fix(&mut doc);
        assert_eq!(ledger.elements[0].previous, "oklch(0.6 0.2 30)");

        revert(&mut doc, &ledger);
        assert_eq!(doc.root.inline.get("color"), Some("oklch(0.6 0.2 30)"));
    }

    #[test]
    fn test_second_pass_is_a_no_op() {
        let mut doc = oklch_document();
        apply_color_fix(&mut doc);
        let ledger = apply_color_fix(&mut doc);
        assert!(ledger.is_empty());
    }
}
