//! DOM tree data structures.
//!
//! The document is an arena of nodes addressed by [`NodeId`]. Node 0 is always the
//! document node. Nodes that get detached stay in the arena, they are simply no
//! longer reachable from the root.

mod selector;
mod style;

use sp_core::SprinkleError;
use sp_core::SprinkleResult;

pub use selector::SelectorList;

/// ID used to address nodes in the DOM arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(u32);

impl NodeId {
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

/// Payload of a node.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NodeData {
    Document,
    Element(ElementData),
    Text(String),
}

/// Tag name and attributes of an element. Tag names are stored lowercase.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ElementData {
    pub tag: String,
    pub attrs: Vec<(String, String)>,
}

impl ElementData {
    pub fn attr(&self, name: &str) -> Option<&str> {
        self.attrs
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.as_str())
    }

    pub fn has_class(&self, class_name: &str) -> bool {
        self.attr("class")
            .is_some_and(|value| value.split_ascii_whitespace().any(|c| c == class_name))
    }
}

#[derive(Debug, Clone)]
struct Node {
    parent: Option<NodeId>,
    children: Vec<NodeId>,
    data: NodeData,
}

/// Mutable in-memory document.
#[derive(Debug, Clone)]
pub struct Document {
    nodes: Vec<Node>,
    pub title: String,
}

impl Default for Document {
    fn default() -> Self {
        Self::empty()
    }
}

impl Document {
    pub fn empty() -> Self {
        Self {
            nodes: vec![Node {
                parent: None,
                children: Vec::new(),
                data: NodeData::Document,
            }],
            title: String::new(),
        }
    }

    pub fn root(&self) -> NodeId {
        NodeId(0)
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn has_root(&self) -> bool {
        self.document_element().is_some()
    }

    /// First element child of the document node (normally `<html>`).
    pub fn document_element(&self) -> Option<NodeId> {
        self.children(self.root())
            .iter()
            .copied()
            .find(|child| self.is_element(*child))
    }

    pub fn create_element(&mut self, tag: &str) -> NodeId {
        self.push_node(NodeData::Element(ElementData {
            tag: tag.to_ascii_lowercase(),
            attrs: Vec::new(),
        }))
    }

    pub fn create_element_with_attrs(&mut self, tag: &str, attrs: Vec<(String, String)>) -> NodeId {
        self.push_node(NodeData::Element(ElementData {
            tag: tag.to_ascii_lowercase(),
            attrs,
        }))
    }

    pub fn create_text(&mut self, text: impl Into<String>) -> NodeId {
        self.push_node(NodeData::Text(text.into()))
    }

    fn push_node(&mut self, data: NodeData) -> NodeId {
        let id = NodeId(u32::try_from(self.nodes.len()).unwrap_or(u32::MAX));
        self.nodes.push(Node {
            parent: None,
            children: Vec::new(),
            data,
        });
        id
    }

    fn node(&self, id: NodeId) -> Option<&Node> {
        self.nodes.get(id.index())
    }

    fn node_mut(&mut self, id: NodeId) -> Option<&mut Node> {
        self.nodes.get_mut(id.index())
    }

    pub fn contains_node(&self, id: NodeId) -> bool {
        id.index() < self.nodes.len()
    }

    pub fn data(&self, id: NodeId) -> Option<&NodeData> {
        self.node(id).map(|node| &node.data)
    }

    pub fn element(&self, id: NodeId) -> Option<&ElementData> {
        match self.data(id) {
            Some(NodeData::Element(element)) => Some(element),
            _ => None,
        }
    }

    fn element_mut(&mut self, id: NodeId) -> Option<&mut ElementData> {
        match self.node_mut(id).map(|node| &mut node.data) {
            Some(NodeData::Element(element)) => Some(element),
            _ => None,
        }
    }

    pub fn is_element(&self, id: NodeId) -> bool {
        self.element(id).is_some()
    }

    pub fn tag_name(&self, id: NodeId) -> Option<&str> {
        self.element(id).map(|element| element.tag.as_str())
    }

    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.node(id).and_then(|node| node.parent)
    }

    pub fn children(&self, id: NodeId) -> &[NodeId] {
        self.node(id)
            .map(|node| node.children.as_slice())
            .unwrap_or(&[])
    }

    pub fn first_child(&self, id: NodeId) -> Option<NodeId> {
        self.children(id).first().copied()
    }

    pub fn ancestors(&self, id: NodeId) -> Ancestors<'_> {
        Ancestors {
            document: self,
            next: self.parent(id),
        }
    }

    /// Pre-order traversal of everything below `id`, excluding `id` itself.
    pub fn descendants(&self, id: NodeId) -> Descendants<'_> {
        let mut stack = self.children(id).to_vec();
        stack.reverse();
        Descendants {
            document: self,
            stack,
        }
    }

    /// True when `node` is `ancestor` or lives somewhere below it.
    pub fn is_inclusive_ancestor(&self, ancestor: NodeId, node: NodeId) -> bool {
        node == ancestor || self.ancestors(node).any(|candidate| candidate == ancestor)
    }

    /// True when the node is reachable from the document root.
    pub fn is_connected(&self, id: NodeId) -> bool {
        self.is_inclusive_ancestor(self.root(), id)
    }

    pub fn append_child(&mut self, parent: NodeId, child: NodeId) -> SprinkleResult<()> {
        self.insert_before(parent, child, None)
    }

    /// Inserts `child` under `parent` before `reference`, or last when `reference` is `None`.
    /// A child that already has a parent is moved.
    pub fn insert_before(
        &mut self,
        parent: NodeId,
        child: NodeId,
        reference: Option<NodeId>,
    ) -> SprinkleResult<()> {
        self.check_insertion(parent, child)?;
        if let Some(reference) = reference {
            if self.parent(reference) != Some(parent) {
                return Err(SprinkleError::new(
                    "dom.insert.not_a_child",
                    format!(
                        "reference node {} is not a child of {}",
                        reference.index(),
                        parent.index()
                    ),
                ));
            }
            if reference == child {
                return Ok(());
            }
        }

        self.detach(child);
        let Some(parent_node) = self.node_mut(parent) else {
            return Err(missing_node(parent));
        };
        let position = reference
            .and_then(|reference| parent_node.children.iter().position(|c| *c == reference))
            .unwrap_or(parent_node.children.len());
        parent_node.children.insert(position, child);
        if let Some(child_node) = self.node_mut(child) {
            child_node.parent = Some(parent);
        }
        Ok(())
    }

    fn check_insertion(&self, parent: NodeId, child: NodeId) -> SprinkleResult<()> {
        if !self.contains_node(parent) {
            return Err(missing_node(parent));
        }
        if !self.contains_node(child) {
            return Err(missing_node(child));
        }
        if matches!(self.data(parent), Some(NodeData::Text(_))) {
            return Err(SprinkleError::new(
                "dom.insert.hierarchy",
                "text nodes cannot have children",
            ));
        }
        if child == self.root() || self.is_inclusive_ancestor(child, parent) {
            return Err(SprinkleError::new(
                "dom.insert.hierarchy",
                format!(
                    "node {} cannot be inserted under its own descendant {}",
                    child.index(),
                    parent.index()
                ),
            ));
        }
        Ok(())
    }

    fn detach(&mut self, child: NodeId) {
        let Some(old_parent) = self.parent(child) else {
            return;
        };
        if let Some(node) = self.node_mut(old_parent) {
            node.children.retain(|candidate| *candidate != child);
        }
        if let Some(node) = self.node_mut(child) {
            node.parent = None;
        }
    }

    pub fn attribute(&self, id: NodeId, name: &str) -> Option<&str> {
        self.element(id).and_then(|element| element.attr(name))
    }

    /// Sets an attribute; ignored on non-element nodes.
    pub fn set_attribute(&mut self, id: NodeId, name: &str, value: &str) {
        let Some(element) = self.element_mut(id) else {
            return;
        };
        let name = name.to_ascii_lowercase();
        if let Some(slot) = element.attrs.iter_mut().find(|(key, _)| *key == name) {
            slot.1 = value.to_owned();
        } else {
            element.attrs.push((name, value.to_owned()));
        }
    }

    pub fn has_class(&self, id: NodeId, class_name: &str) -> bool {
        self.element(id)
            .is_some_and(|element| element.has_class(class_name))
    }

    pub fn add_class(&mut self, id: NodeId, class_name: &str) {
        if !self.is_element(id) || self.has_class(id, class_name) {
            return;
        }
        let mut classes = self.class_names(id);
        classes.push(class_name.to_owned());
        self.set_attribute(id, "class", &classes.join(" "));
    }

    pub fn remove_class(&mut self, id: NodeId, class_name: &str) {
        if !self.has_class(id, class_name) {
            return;
        }
        let classes = self
            .class_names(id)
            .into_iter()
            .filter(|candidate| candidate != class_name)
            .collect::<Vec<_>>();
        self.set_attribute(id, "class", &classes.join(" "));
    }

    /// Flips a class and returns whether it is present afterwards.
    pub fn toggle_class(&mut self, id: NodeId, class_name: &str) -> bool {
        if self.has_class(id, class_name) {
            self.remove_class(id, class_name);
            false
        } else {
            self.add_class(id, class_name);
            self.has_class(id, class_name)
        }
    }

    pub fn class_names(&self, id: NodeId) -> Vec<String> {
        self.attribute(id, "class")
            .map(|value| {
                value
                    .split_ascii_whitespace()
                    .map(str::to_owned)
                    .collect::<Vec<_>>()
            })
            .unwrap_or_default()
    }

    /// Reads a property from the inline `style` attribute.
    pub fn style_property(&self, id: NodeId, property: &str) -> Option<String> {
        let inline = self.attribute(id, "style")?;
        style::parse_inline_style(inline)
            .into_iter()
            .find(|(name, _)| name.eq_ignore_ascii_case(property))
            .map(|(_, value)| value)
    }

    /// Writes a property into the inline `style` attribute, replacing any previous value.
    pub fn set_style_property(&mut self, id: NodeId, property: &str, value: &str) {
        if !self.is_element(id) {
            return;
        }
        let mut declarations = self
            .attribute(id, "style")
            .map(style::parse_inline_style)
            .unwrap_or_default();
        let property = property.to_ascii_lowercase();
        if let Some(slot) = declarations
            .iter_mut()
            .find(|(name, _)| name.eq_ignore_ascii_case(&property))
        {
            slot.1 = value.to_owned();
        } else {
            declarations.push((property, value.to_owned()));
        }
        self.set_attribute(id, "style", &style::serialize_inline_style(&declarations));
    }

    /// Concatenated text of all descendant text nodes.
    pub fn text_content(&self, id: NodeId) -> String {
        if let Some(NodeData::Text(text)) = self.data(id) {
            return text.clone();
        }
        let mut out = String::new();
        for node in self.descendants(id) {
            if let Some(NodeData::Text(text)) = self.data(node) {
                out.push_str(text);
            }
        }
        out
    }

    /// Replaces all children with a single text node (or none for an empty string).
    pub fn set_text_content(&mut self, id: NodeId, text: &str) {
        match self.node_mut(id).map(|node| &mut node.data) {
            Some(NodeData::Text(existing)) => {
                *existing = text.to_owned();
                return;
            }
            Some(NodeData::Element(_)) => {}
            _ => return,
        }

        for child in self.children(id).to_vec() {
            self.detach(child);
        }
        if !text.is_empty() {
            let text_node = self.create_text(text);
            if let Some(node) = self.node_mut(id) {
                node.children.push(text_node);
            }
            if let Some(node) = self.node_mut(text_node) {
                node.parent = Some(id);
            }
        }
    }

    pub fn matches(&self, id: NodeId, selectors: &SelectorList) -> bool {
        self.element(id).is_some() && selectors.matches(self, id)
    }

    pub fn query_selector(&self, scope: NodeId, selector: &str) -> SprinkleResult<Option<NodeId>> {
        let selectors = SelectorList::parse(selector)?;
        Ok(self.select_first(scope, &selectors))
    }

    pub fn query_selector_all(&self, scope: NodeId, selector: &str) -> SprinkleResult<Vec<NodeId>> {
        let selectors = SelectorList::parse(selector)?;
        Ok(self.select_all(scope, &selectors))
    }

    pub fn select_first(&self, scope: NodeId, selectors: &SelectorList) -> Option<NodeId> {
        self.descendants(scope)
            .find(|node| self.matches(*node, selectors))
    }

    pub fn select_all(&self, scope: NodeId, selectors: &SelectorList) -> Vec<NodeId> {
        self.descendants(scope)
            .filter(|node| self.matches(*node, selectors))
            .collect()
    }
}

fn missing_node(id: NodeId) -> SprinkleError {
    SprinkleError::new(
        "dom.node.missing",
        format!("node {} does not exist in this document", id.index()),
    )
}

/// Iterator over the ancestors of a node, nearest first.
#[derive(Debug)]
pub struct Ancestors<'a> {
    document: &'a Document,
    next: Option<NodeId>,
}

impl Iterator for Ancestors<'_> {
    type Item = NodeId;

    fn next(&mut self) -> Option<Self::Item> {
        let current = self.next?;
        self.next = self.document.parent(current);
        Some(current)
    }
}

/// Pre-order iterator over the descendants of a node.
#[derive(Debug)]
pub struct Descendants<'a> {
    document: &'a Document,
    stack: Vec<NodeId>,
}

impl Iterator for Descendants<'_> {
    type Item = NodeId;

    fn next(&mut self) -> Option<Self::Item> {
        let current = self.stack.pop()?;
        self.stack
            .extend(self.document.children(current).iter().rev().copied());
        Some(current)
    }
}

#[cfg(test)]
mod tests {
    use super::Document;
    use super::NodeId;

    fn sample() -> (Document, NodeId, NodeId, NodeId) {
        let mut doc = Document::empty();
        let html = doc.create_element("HTML");
        let body = doc.create_element("body");
        let para = doc.create_element("p");
        let text = doc.create_text("hello");
        let root = doc.root();
        assert!(doc.append_child(root, html).is_ok());
        assert!(doc.append_child(html, body).is_ok());
        assert!(doc.append_child(body, para).is_ok());
        assert!(doc.append_child(para, text).is_ok());
        (doc, html, body, para)
    }

    #[test]
    fn builds_tree_and_reports_document_element() {
        let (doc, html, body, para) = sample();
        assert_eq!(doc.document_element(), Some(html));
        assert_eq!(doc.tag_name(html), Some("html"));
        assert_eq!(doc.parent(para), Some(body));
        assert_eq!(doc.text_content(body), "hello");
        assert!(doc.is_connected(para));
    }

    #[test]
    fn insert_before_moves_existing_child() {
        let (mut doc, _, body, para) = sample();
        let wrapper = doc.create_element("div");
        assert!(doc.insert_before(body, wrapper, Some(para)).is_ok());
        assert_eq!(doc.children(body), &[wrapper, para]);

        assert!(doc.append_child(wrapper, para).is_ok());
        assert_eq!(doc.children(body), &[wrapper]);
        assert_eq!(doc.children(wrapper), &[para]);
        assert_eq!(doc.parent(para), Some(wrapper));
    }

    #[test]
    fn rejects_cycles_and_foreign_reference_nodes() {
        let (mut doc, html, body, para) = sample();
        let cycle = doc.append_child(para, html);
        assert!(cycle.is_err());
        if let Err(error) = cycle {
            assert_eq!(error.code, "dom.insert.hierarchy");
        }

        let orphan = doc.create_element("span");
        let wrong_reference = doc.insert_before(body, orphan, Some(html));
        assert!(wrong_reference.is_err());
    }

    #[test]
    fn class_list_operations() {
        let (mut doc, _, _, para) = sample();
        doc.add_class(para, "lazy");
        doc.add_class(para, "lazy");
        doc.add_class(para, "wide");
        assert_eq!(doc.attribute(para, "class"), Some("lazy wide"));
        assert!(!doc.toggle_class(para, "lazy"));
        assert!(doc.toggle_class(para, "active"));
        assert_eq!(doc.class_names(para), vec!["wide", "active"]);
        doc.remove_class(para, "missing");
        assert_eq!(doc.attribute(para, "class"), Some("wide active"));
    }

    #[test]
    fn inline_style_properties_are_replaced_in_place() {
        let (mut doc, _, _, para) = sample();
        doc.set_style_property(para, "opacity", "0");
        doc.set_style_property(para, "transform", "translateY(20px)");
        doc.set_style_property(para, "opacity", "1");
        assert_eq!(doc.style_property(para, "opacity").as_deref(), Some("1"));
        assert_eq!(
            doc.attribute(para, "style"),
            Some("opacity: 1; transform: translateY(20px)")
        );
    }

    #[test]
    fn set_text_content_replaces_children() {
        let (mut doc, _, body, para) = sample();
        doc.set_text_content(body, "Copy");
        assert_eq!(doc.text_content(body), "Copy");
        assert!(!doc.is_connected(para));
        assert_eq!(doc.children(body).len(), 1);
    }

    #[test]
    fn descendants_are_in_document_order() {
        let mut doc = Document::empty();
        let root = doc.root();
        let a = doc.create_element("a");
        let b = doc.create_element("b");
        let c = doc.create_element("c");
        let d = doc.create_element("d");
        assert!(doc.append_child(root, a).is_ok());
        assert!(doc.append_child(a, b).is_ok());
        assert!(doc.append_child(b, c).is_ok());
        assert!(doc.append_child(a, d).is_ok());
        assert_eq!(doc.descendants(root).collect::<Vec<_>>(), vec![a, b, c, d]);
    }
}
