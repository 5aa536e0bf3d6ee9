use crate::attrs::AttrParser;

/// A collection of element attributes stored as key-value pairs.
/// Uses a Vec internally for better cache locality with small attribute counts
/// and to keep serialization in insertion order.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Attrs(pub Vec<(String, String)>);

impl Attrs {
    #[inline]
    pub fn new() -> Self {
        Self(Vec::new())
    }

    #[inline]
    pub fn with_capacity(capacity: usize) -> Self {
        Self(Vec::with_capacity(capacity))
    }

    #[inline]
    pub fn get(&self, key: &str) -> Option<&str> {
        self.0
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    #[inline]
    pub fn contains_key(&self, key: &str) -> bool {
        self.0.iter().any(|(k, _)| k == key)
    }

    /// Insert a key-value pair. If the key already exists, update the value in place.
    #[inline]
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<String>) {
        let key = key.into();
        let value = value.into();
        if let Some(pos) = self.0.iter().position(|(k, _)| *k == key) {
            self.0[pos].1 = value;
        } else {
            self.0.push((key, value));
        }
    }

    #[inline]
    pub fn remove(&mut self, key: &str) -> Option<String> {
        let pos = self.0.iter().position(|(k, _)| k == key)?;
        Some(self.0.remove(pos).1)
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    #[inline]
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Push a key-value pair without checking for duplicates.
    /// Use this when building from a known-unique source (e.g., decoding).
    #[inline]
    pub fn push(&mut self, key: String, value: String) {
        self.0.push((key, value));
    }

    #[inline]
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(|(k, _)| k.as_str())
    }
}

impl IntoIterator for Attrs {
    type Item = (String, String);
    type IntoIter = std::vec::IntoIter<(String, String)>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

impl FromIterator<(String, String)> for Attrs {
    fn from_iter<I: IntoIterator<Item = (String, String)>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NodeContent {
    Text(String),
    Nodes(Vec<Node>),
}

/// A namespace-qualified XML element.
///
/// `ns` is the resolved namespace URI. Children created without a namespace
/// inherit their parent's when attached, mirroring how an unprefixed child
/// inherits the default namespace in serialized XML.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Node {
    pub tag: String,
    pub ns: String,
    pub attrs: Attrs,
    pub content: Option<NodeContent>,
}

impl Node {
    pub fn new(tag: &str, ns: &str, attrs: Attrs, content: Option<NodeContent>) -> Self {
        let mut node = Self {
            tag: tag.to_string(),
            ns: ns.to_string(),
            attrs,
            content,
        };
        node.adopt_children();
        node
    }

    pub fn element(ns: &str, tag: &str) -> Self {
        Self::new(tag, ns, Attrs::new(), None)
    }

    #[inline]
    pub fn is(&self, ns: &str, tag: &str) -> bool {
        self.tag == tag && self.ns == ns
    }

    pub fn attrs(&self) -> AttrParser<'_> {
        AttrParser::new(self)
    }

    pub fn attr(&self, key: &str) -> Option<&str> {
        self.attrs.get(key)
    }

    pub fn set_attr(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.attrs.insert(key, value);
    }

    pub fn remove_attr(&mut self, key: &str) -> Option<String> {
        self.attrs.remove(key)
    }

    pub fn children(&self) -> Option<&[Node]> {
        match &self.content {
            Some(NodeContent::Nodes(nodes)) => Some(nodes),
            _ => None,
        }
    }

    pub fn children_mut(&mut self) -> Option<&mut Vec<Node>> {
        match &mut self.content {
            Some(NodeContent::Nodes(nodes)) => Some(nodes),
            _ => None,
        }
    }

    pub fn has_children(&self) -> bool {
        self.children().is_some_and(|c| !c.is_empty())
    }

    /// Text content of this element, empty when absent or when the element
    /// holds child elements.
    pub fn text(&self) -> &str {
        match &self.content {
            Some(NodeContent::Text(s)) => s,
            _ => "",
        }
    }

    /// Replaces all content with `text`. An empty string clears the content.
    pub fn set_text(&mut self, text: impl Into<String>) {
        let text = text.into();
        self.content = (!text.is_empty()).then_some(NodeContent::Text(text));
    }

    /// Appends a child element, replacing any text content.
    pub fn append_child(&mut self, mut child: Node) -> &mut Node {
        child.inherit_ns(&self.ns);
        if !matches!(self.content, Some(NodeContent::Nodes(_))) {
            self.content = Some(NodeContent::Nodes(Vec::new()));
        }
        let Some(NodeContent::Nodes(nodes)) = &mut self.content else {
            unreachable!("content was just set to Nodes");
        };
        nodes.push(child);
        nodes.last_mut().expect("child was just pushed")
    }

    /// All children matching the qualified name, in document order.
    pub fn find<'a>(&'a self, ns: &'a str, tag: &'a str) -> impl Iterator<Item = &'a Node> {
        self.children()
            .into_iter()
            .flatten()
            .filter(move |c| c.is(ns, tag))
    }

    pub fn find_first(&self, ns: &str, tag: &str) -> Option<&Node> {
        self.children()
            .and_then(|nodes| nodes.iter().find(|c| c.is(ns, tag)))
    }

    pub fn find_first_mut(&mut self, ns: &str, tag: &str) -> Option<&mut Node> {
        self.children_mut()
            .and_then(|nodes| nodes.iter_mut().find(|c| c.is(ns, tag)))
    }

    pub fn find_or_create(&mut self, ns: &str, tag: &str) -> &mut Node {
        let pos = self
            .children()
            .and_then(|nodes| nodes.iter().position(|c| c.is(ns, tag)));
        match pos {
            Some(pos) => &mut self.children_mut().expect("position came from children")[pos],
            None => self.append_child(Node::element(ns, tag)),
        }
    }

    /// Removes every child matching the qualified name and returns how many were removed.
    pub fn remove_children(&mut self, ns: &str, tag: &str) -> usize {
        let Some(nodes) = self.children_mut() else {
            return 0;
        };
        let before = nodes.len();
        nodes.retain(|c| !c.is(ns, tag));
        let removed = before - nodes.len();
        if nodes.is_empty() {
            self.content = None;
        }
        removed
    }

    pub fn retain_children(&mut self, mut keep: impl FnMut(&Node) -> bool) {
        if let Some(nodes) = self.children_mut() {
            nodes.retain(|c| keep(c));
            if nodes.is_empty() {
                self.content = None;
            }
        }
    }

    pub fn get_optional_child_by_tag<'a>(&'a self, tags: &[&str]) -> Option<&'a Node> {
        let mut current_node = self;
        for &tag in tags {
            current_node = current_node.get_optional_child(tag)?;
        }
        Some(current_node)
    }

    pub fn get_children_by_tag<'a>(&'a self, tag: &'a str) -> impl Iterator<Item = &'a Node> {
        self.children()
            .into_iter()
            .flatten()
            .filter(move |c| c.tag == tag)
    }

    pub fn get_optional_child(&self, tag: &str) -> Option<&Node> {
        self.children()
            .and_then(|nodes| nodes.iter().find(|node| node.tag == tag))
    }

    fn inherit_ns(&mut self, parent_ns: &str) {
        if self.ns.is_empty() && !parent_ns.is_empty() {
            self.ns = parent_ns.to_string();
        }
        self.adopt_children();
    }

    fn adopt_children(&mut self) {
        if let Some(NodeContent::Nodes(nodes)) = &mut self.content {
            for child in nodes.iter_mut() {
                child.inherit_ns(&self.ns);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const NS: &str = "jabber:client";

    #[test]
    fn test_children_inherit_namespace() {
        let mut msg = Node::element(NS, "message");
        msg.append_child(Node::element("", "body"));
        msg.append_child(Node::element("urn:xmpp:receipts", "request"));

        assert!(msg.find_first(NS, "body").is_some());
        assert!(msg.find_first("urn:xmpp:receipts", "request").is_some());
        assert!(msg.find_first(NS, "request").is_none());
    }

    #[test]
    fn test_find_or_create_is_idempotent() {
        let mut msg = Node::element(NS, "message");
        msg.find_or_create(NS, "thread").set_text("t1");
        msg.find_or_create(NS, "thread").set_text("t2");

        assert_eq!(msg.find(NS, "thread").count(), 1);
        assert_eq!(msg.find_first(NS, "thread").unwrap().text(), "t2");
    }

    #[test]
    fn test_remove_children_clears_empty_content() {
        let mut msg = Node::element(NS, "message");
        msg.append_child(Node::element(NS, "body"));
        msg.append_child(Node::element(NS, "body"));

        assert_eq!(msg.remove_children(NS, "body"), 2);
        assert!(msg.content.is_none());
        assert_eq!(msg.remove_children(NS, "body"), 0);
    }

    #[test]
    fn test_set_text_empty_clears() {
        let mut body = Node::element(NS, "body");
        body.set_text("hi");
        assert_eq!(body.text(), "hi");
        body.set_text("");
        assert!(body.content.is_none());
        assert_eq!(body.text(), "");
    }

    #[test]
    fn test_attrs_insert_updates_in_place() {
        let mut attrs = Attrs::new();
        attrs.insert("id", "1");
        attrs.insert("type", "chat");
        attrs.insert("id", "2");
        assert_eq!(attrs.keys().collect::<Vec<_>>(), vec!["id", "type"]);
        assert_eq!(attrs.get("id"), Some("2"));
        assert_eq!(attrs.remove("id"), Some("2".to_string()));
        assert!(!attrs.contains_key("id"));
    }

    #[test]
    fn test_child_lookup_by_local_name() {
        let mut iq = Node::element(NS, "iq");
        iq.append_child(Node::element("jabber:iq:roster", "query"))
            .append_child(Node::element("jabber:iq:roster", "item"));
        iq.append_child(Node::element("urn:xmpp:ping", "ping"));

        let item = iq.get_optional_child_by_tag(&["query", "item"]).unwrap();
        assert_eq!(item.ns, "jabber:iq:roster");
        assert!(iq.get_optional_child_by_tag(&["query", "group"]).is_none());
        assert_eq!(iq.get_children_by_tag("ping").count(), 1);

        iq.retain_children(|c| c.tag != "ping");
        assert!(iq.get_optional_child("ping").is_none());
        assert!(iq.get_optional_child("query").is_some());
    }
}
