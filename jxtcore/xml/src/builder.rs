use crate::node::{Attrs, Node, NodeContent};
use indexmap::IndexMap;

#[derive(Debug, Default)]
pub struct NodeBuilder {
    tag: String,
    ns: String,
    attrs: IndexMap<String, String>,
    content: Option<NodeContent>,
}

impl NodeBuilder {
    pub fn new(tag: impl Into<String>) -> Self {
        Self {
            tag: tag.into(),
            ..Default::default()
        }
    }

    pub fn ns(mut self, ns: impl Into<String>) -> Self {
        self.ns = ns.into();
        self
    }

    pub fn attr(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.attrs.insert(key.into(), value.into());
        self
    }

    pub fn attrs<I, K, V>(mut self, attrs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        for (key, value) in attrs.into_iter() {
            self.attrs.insert(key.into(), value.into());
        }
        self
    }

    pub fn children(mut self, children: impl IntoIterator<Item = Node>) -> Self {
        let nodes: Vec<Node> = children.into_iter().collect();
        self.content = (!nodes.is_empty()).then_some(NodeContent::Nodes(nodes));
        self
    }

    pub fn text(mut self, s: impl Into<String>) -> Self {
        let s = s.into();
        self.content = (!s.is_empty()).then_some(NodeContent::Text(s));
        self
    }

    pub fn build(self) -> Node {
        Node::new(
            &self.tag,
            &self.ns,
            self.attrs.into_iter().collect::<Attrs>(),
            self.content,
        )
    }
}
