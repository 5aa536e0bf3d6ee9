//! Live-XML stanza wrappers.
//!
//! A stanza holds no materialized fields: every read walks the element tree
//! and every write edits it. The XML is the state.

use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use jxtcore_xml::{Node, marshal};
use log::debug;
use serde_json::{Map, Value as Json};

use crate::field::FieldContext;
use crate::registry::{Definition, DefinitionId, Registry};
use crate::value::FieldValue;

/// An owned element bound to its definition.
#[derive(Clone)]
pub struct Stanza {
    registry: Arc<Registry>,
    id: DefinitionId,
    node: Node,
}

/// A borrowed, read-only view of an element bound to its definition.
#[derive(Clone, Copy)]
pub struct StanzaRef<'a> {
    registry: &'a Arc<Registry>,
    id: DefinitionId,
    node: &'a Node,
}

/// A borrowed, writable view of an element bound to its definition.
pub struct StanzaMut<'a> {
    registry: &'a Arc<Registry>,
    id: DefinitionId,
    node: &'a mut Node,
}

impl Stanza {
    pub fn new(registry: Arc<Registry>, id: DefinitionId, node: Node) -> Self {
        Self { registry, id, node }
    }

    pub fn registry(&self) -> &Arc<Registry> {
        &self.registry
    }

    pub fn definition_id(&self) -> DefinitionId {
        self.id
    }

    pub fn definition(&self) -> &Definition {
        self.registry.definition(self.id)
    }

    pub fn name(&self) -> &str {
        &self.definition().name
    }

    pub fn node(&self) -> &Node {
        &self.node
    }

    pub fn into_node(self) -> Node {
        self.node
    }

    pub fn view(&self) -> StanzaRef<'_> {
        StanzaRef {
            registry: &self.registry,
            id: self.id,
            node: &self.node,
        }
    }

    pub fn view_mut(&mut self) -> StanzaMut<'_> {
        StanzaMut {
            registry: &self.registry,
            id: self.id,
            node: &mut self.node,
        }
    }

    pub fn get(&self, field: &str) -> FieldValue {
        self.view().get(field)
    }

    pub fn set(&mut self, field: &str, value: impl Into<FieldValue>) {
        self.view_mut().set(field, value.into());
    }

    pub fn extension(&self, name: &str) -> Option<StanzaRef<'_>> {
        self.view().extension(name)
    }

    /// Finds the named child extension, creating its element when absent.
    pub fn extension_mut(&mut self, name: &str) -> Option<StanzaMut<'_>> {
        self.view_mut().into_extension_mut(name)
    }

    pub fn to_json(&self) -> Json {
        self.view().to_json()
    }

    pub fn to_xml(&self) -> String {
        marshal(&self.node)
    }
}

impl PartialEq for Stanza {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id && self.node == other.node
    }
}

impl fmt::Debug for Stanza {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Stanza")
            .field("name", &self.name())
            .field("xml", &self.to_xml())
            .finish()
    }
}

impl fmt::Display for Stanza {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_xml())
    }
}

impl<'a> StanzaRef<'a> {
    pub fn definition(&self) -> &'a Definition {
        self.registry.definition(self.id)
    }

    pub fn name(&self) -> &'a str {
        &self.definition().name
    }

    pub fn node(&self) -> &'a Node {
        self.node
    }

    fn cx(&self) -> FieldContext<'a> {
        FieldContext {
            registry: self.registry,
            definition: self.id,
        }
    }

    /// Reads a field. Unknown names read as [`FieldValue::None`].
    pub fn get(&self, field: &str) -> FieldValue {
        match self.definition().field(field) {
            Some(f) => f.get(&self.cx(), self.node),
            None => FieldValue::None,
        }
    }

    pub fn extension(&self, name: &str) -> Option<StanzaRef<'a>> {
        let child = self.registry.extension_of(self.id, name)?;
        let def = self.registry.definition(child);
        let node = self.node.find_first(&def.namespace, &def.element)?;
        Some(StanzaRef {
            registry: self.registry,
            id: child,
            node,
        })
    }

    pub fn to_stanza(&self) -> Stanza {
        Stanza::new(Arc::clone(self.registry), self.id, self.node.clone())
    }

    /// The JSON view: every defined child element keyed by its definition
    /// name, then every field with a non-empty value. Names starting with `_`
    /// are left out.
    pub fn to_json(&self) -> Json {
        let mut out = Map::new();

        for child in self.node.children().into_iter().flatten() {
            let Some(child_id) = self.registry.lookup(&child.tag, &child.ns) else {
                continue;
            };
            let name = &self.registry.definition(child_id).name;
            if name.starts_with('_') || out.contains_key(name) {
                continue;
            }
            let view = StanzaRef {
                registry: self.registry,
                id: child_id,
                node: child,
            };
            out.insert(name.clone(), view.to_json());
        }

        let cx = self.cx();
        for (name, field) in self.definition().fields() {
            if name.starts_with('_') || self.registry.extension_of(self.id, name).is_some() {
                continue;
            }
            let value = field.get(&cx, self.node);
            if value.is_empty() {
                continue;
            }
            let json = match value {
                FieldValue::List(items) => Json::Array(
                    items
                        .iter()
                        .filter(|v| !v.is_none())
                        .map(FieldValue::to_json)
                        .collect(),
                ),
                other => other.to_json(),
            };
            out.insert(name.to_string(), json);
        }

        Json::Object(out)
    }
}

impl<'a> StanzaMut<'a> {
    pub fn new(registry: &'a Arc<Registry>, id: DefinitionId, node: &'a mut Node) -> Self {
        Self { registry, id, node }
    }

    pub fn definition(&self) -> &'a Definition {
        self.registry.definition(self.id)
    }

    pub fn node(&self) -> &Node {
        &*self.node
    }

    pub fn node_mut(&mut self) -> &mut Node {
        &mut *self.node
    }

    pub fn view(&self) -> StanzaRef<'_> {
        StanzaRef {
            registry: self.registry,
            id: self.id,
            node: &*self.node,
        }
    }

    pub fn get(&self, field: &str) -> FieldValue {
        self.view().get(field)
    }

    /// Writes a field. Unknown names are ignored.
    pub fn set(&mut self, field: &str, value: impl Into<FieldValue>) {
        let registry = self.registry;
        let def = registry.definition(self.id);
        let Some(f) = def.field(field) else {
            debug!(target: "jxt/stanza", "Ignoring unknown field '{field}' on '{}'", def.name);
            return;
        };
        let cx = FieldContext {
            registry,
            definition: self.id,
        };
        f.set(&cx, &mut *self.node, value.into());
    }

    /// Writes every entry of a data object through the matching field.
    pub fn apply(&mut self, data: BTreeMap<String, FieldValue>) {
        for (key, value) in data {
            self.set(&key, value);
        }
    }

    pub fn extension_mut(&mut self, name: &str) -> Option<StanzaMut<'_>> {
        let child = self.registry.extension_of(self.id, name)?;
        let def = self.registry.definition(child);
        let node = self.node.find_or_create(&def.namespace, &def.element);
        Some(StanzaMut {
            registry: self.registry,
            id: child,
            node,
        })
    }

    fn into_extension_mut(self, name: &str) -> Option<StanzaMut<'a>> {
        let StanzaMut { registry, id, node } = self;
        let child = registry.extension_of(id, name)?;
        let def = registry.definition(child);
        Some(StanzaMut {
            registry,
            id: child,
            node: node.find_or_create(&def.namespace, &def.element),
        })
    }
}
