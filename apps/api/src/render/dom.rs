//! Styled element tree — the renderers' output format.
//!
//! Each node carries two style layers: `computed` (what the stylesheet
//! resolved for the element) and `inline` (per-element overrides). The
//! export color pass reads the effective value, writes overrides into
//! `inline`, and reverts them afterwards. `to_html` serializes the tree
//! for the preview surface.

use std::collections::BTreeMap;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StyleMap(BTreeMap<String, String>);

impl StyleMap {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, property: &str) -> Option<&str> {
        self.0.get(property).map(String::as_str)
    }

    pub fn set(&mut self, property: impl Into<String>, value: impl Into<String>) {
        self.0.insert(property.into(), value.into());
    }

    pub fn remove(&mut self, property: &str) {
        self.0.remove(property);
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn properties(&self) -> Vec<String> {
        self.0.keys().cloned().collect()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct StyledNode {
    pub tag: String,
    pub class: String,
    pub text: Option<String>,
    pub link: Option<String>,
    pub computed: StyleMap,
    pub inline: StyleMap,
    pub children: Vec<StyledNode>,
}

impl StyledNode {
    pub fn new(tag: impl Into<String>) -> Self {
        StyledNode {
            tag: tag.into(),
            class: String::new(),
            text: None,
            link: None,
            computed: StyleMap::new(),
            inline: StyleMap::new(),
            children: Vec::new(),
        }
    }

    pub fn class(mut self, class: impl Into<String>) -> Self {
        self.class = class.into();
        self
    }

    pub fn text(mut self, text: impl Into<String>) -> Self {
        self.text = Some(text.into());
        self
    }

    pub fn link(mut self, href: impl Into<String>) -> Self {
        self.link = Some(href.into());
        self
    }

    pub fn style(mut self, property: &str, value: &str) -> Self {
        self.computed.set(property, value);
        self
    }

    pub fn child(mut self, child: StyledNode) -> Self {
        self.children.push(child);
        self
    }

    /// The value the element currently presents: inline override if set,
    /// else the computed value.
    pub fn effective(&self, property: &str) -> Option<&str> {
        self.inline.get(property).or_else(|| self.computed.get(property))
    }

    pub fn node_at_path_mut(&mut self, path: &[usize]) -> Option<&mut StyledNode> {
        let mut node = self;
        for &index in path {
            node = node.children.get_mut(index)?;
        }
        Some(node)
    }
}

/// Depth-first walk with the child-index path of each node.
pub fn walk_mut<F>(root: &mut StyledNode, f: &mut F)
where
    F: FnMut(&mut StyledNode, &[usize]),
{
    fn inner<F>(node: &mut StyledNode, path: &mut Vec<usize>, f: &mut F)
    where
        F: FnMut(&mut StyledNode, &[usize]),
    {
        f(node, path);
        for index in 0..node.children.len() {
            path.push(index);
            inner(&mut node.children[index], path, f);
            path.pop();
        }
    }
    inner(root, &mut Vec::new(), f);
}

#[derive(Debug, Clone, PartialEq)]
pub struct StyledDocument {
    pub root: StyledNode,
    /// Custom properties declared on the document root (`--name: value`).
    pub custom_properties: StyleMap,
}

impl StyledDocument {
    pub fn new(root: StyledNode) -> Self {
        StyledDocument {
            root,
            custom_properties: StyleMap::new(),
        }
    }

    pub fn custom_property(mut self, name: &str, value: &str) -> Self {
        self.custom_properties.set(name, value);
        self
    }

    pub fn to_html(&self) -> String {
        let mut out = String::new();
        write_node(&mut out, &self.root);
        out
    }
}

fn write_node(out: &mut String, node: &StyledNode) {
    let tag = if node.link.is_some() { "a" } else { node.tag.as_str() };
    out.push('<');
    out.push_str(tag);
    if !node.class.is_empty() {
        out.push_str(" class=\"");
        out.push_str(&escape_attr(&node.class));
        out.push('"');
    }
    if let Some(href) = &node.link {
        out.push_str(" href=\"");
        out.push_str(&escape_attr(href));
        out.push('"');
    }
    let style = style_attr(node);
    if !style.is_empty() {
        out.push_str(" style=\"");
        out.push_str(&escape_attr(&style));
        out.push('"');
    }
    out.push('>');
    if let Some(text) = &node.text {
        out.push_str(&escape_html(text));
    }
    for child in &node.children {
        write_node(out, child);
    }
    out.push_str("</");
    out.push_str(tag);
    out.push('>');
}

fn style_attr(node: &StyledNode) -> String {
    let mut parts: Vec<String> = Vec::new();
    for (property, value) in node.computed.iter() {
        if node.inline.get(property).is_none() {
            parts.push(format!("{property}: {value}"));
        }
    }
    for (property, value) in node.inline.iter() {
        parts.push(format!("{property}: {value}"));
    }
    parts.join("; ")
}

fn escape_html(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
}

fn escape_attr(text: &str) -> String {
    escape_html(text).replace('"', "&quot;")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_effective_prefers_inline() {
        let mut node = StyledNode::new("div").style("color", "#111111");
        assert_eq!(node.effective("color"), Some("#111111"));
        node.inline.set("color", "#222222");
        assert_eq!(node.effective("color"), Some("#222222"));
        node.inline.remove("color");
        assert_eq!(node.effective("color"), Some("#111111"));
    }

    #[test]
    fn test_walk_mut_paths() {
        let mut root = StyledNode::new("div")
            .child(StyledNode::new("p").child(StyledNode::new("span")))
            .child(StyledNode::new("ul"));
        let mut seen = Vec::new();
        walk_mut(&mut root, &mut |node, path| {
            seen.push((node.tag.clone(), path.to_vec()));
        });
        assert_eq!(
            seen,
            vec![
                ("div".to_string(), vec![]),
                ("p".to_string(), vec![0]),
                ("span".to_string(), vec![0, 0]),
                ("ul".to_string(), vec![1]),
            ]
        );
    }

    #[test]
    fn test_node_at_path_mut() {
        let mut root = StyledNode::new("div").child(StyledNode::new("p").child(StyledNode::new("b")));
        assert_eq!(root.node_at_path_mut(&[0, 0]).unwrap().tag, "b");
        assert!(root.node_at_path_mut(&[0, 3]).is_none());
    }

    #[test]
    fn test_to_html_escapes_and_links() {
        let doc = StyledDocument::new(
            StyledNode::new("div").child(
                StyledNode::new("span")
                    .text("a < b & c")
                    .link("https://example.com/?a=1&b=2"),
            ),
        );
        let html = doc.to_html();
        assert!(html.contains("a &lt; b &amp; c"));
        assert!(html.contains("href=\"https://example.com/?a=1&amp;b=2\""));
    }

    #[test]
    fn test_style_attr_inline_wins() {
        let mut node = StyledNode::new("div").style("color", "#111111");
        node.inline.set("color", "rgb(1,2,3)");
        let html = StyledDocument::new(node).to_html();
        assert!(html.contains("color: rgb(1,2,3)"));
        assert!(!html.contains("#111111"));
    }
}
