//! The stanza definition registry.
//!
//! Definitions are registered with `&mut Registry` while plugins load. Once
//! loading is done the registry is frozen in an `Arc` and shared read-only by
//! every [`Stanza`] built from it.
//!
//! Plugins reference each other's definitions through deferred callbacks
//! ([`Registry::with_definition`], [`Registry::with_tag`]) rather than direct
//! ids, so the order in which plugins load does not change the result.

use std::collections::{BTreeMap, HashMap, HashSet, VecDeque};
use std::fmt;
use std::sync::Arc;

use indexmap::IndexMap;
use jxtcore_xml::{Node, unmarshal};
use log::{debug, trace};

use crate::error::{RegistryError, Result};
use crate::field::{self, Field};
use crate::ns;
use crate::stanza::Stanza;
use crate::value::FieldValue;

/// Handle to a definition inside the registry that issued it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct DefinitionId(usize);

/// A named, namespaced element shape and its fields.
#[derive(Debug)]
pub struct Definition {
    pub name: String,
    pub namespace: String,
    pub element: String,
    pub top_level: bool,
    pub tags: Vec<String>,
    /// `(prefix, namespace)` declarations written onto freshly created elements.
    pub prefixes: Vec<(String, String)>,
    id: DefinitionId,
    fields: IndexMap<String, Field>,
}

impl Definition {
    pub fn id(&self) -> DefinitionId {
        self.id
    }

    pub fn field(&self, name: &str) -> Option<&Field> {
        self.fields.get(name)
    }

    /// Fields in registration order.
    pub fn fields(&self) -> impl Iterator<Item = (&str, &Field)> {
        self.fields.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn prefix_for(&self, namespace: &str) -> Option<&str> {
        self.prefixes
            .iter()
            .find(|(_, ns)| ns == namespace)
            .map(|(prefix, _)| prefix.as_str())
    }

    pub fn is(&self, element: &str, namespace: &str) -> bool {
        self.element == element && self.namespace == namespace
    }
}

#[derive(Debug, Default)]
pub struct DefinitionBuilder {
    name: String,
    namespace: String,
    element: Option<String>,
    top_level: bool,
    tags: Vec<String>,
    prefixes: Vec<(String, String)>,
    fields: IndexMap<String, Field>,
}

impl DefinitionBuilder {
    pub fn new(name: impl Into<String>, namespace: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            namespace: namespace.into(),
            ..Default::default()
        }
    }

    /// Element name, when it differs from the definition name.
    pub fn element(mut self, element: impl Into<String>) -> Self {
        self.element = Some(element.into());
        self
    }

    pub fn top_level(mut self) -> Self {
        self.top_level = true;
        self
    }

    pub fn tag(mut self, tag: impl Into<String>) -> Self {
        self.tags.push(tag.into());
        self
    }

    pub fn prefix(mut self, prefix: impl Into<String>, namespace: impl Into<String>) -> Self {
        self.prefixes.push((prefix.into(), namespace.into()));
        self
    }

    pub fn field(mut self, name: impl Into<String>, field: Field) -> Self {
        self.fields.insert(name.into(), field);
        self
    }
}

pub type Callback = Box<dyn FnMut(&mut Registry, DefinitionId) -> Result<()> + Send + Sync>;

fn skip_callback(_: &mut Registry, _: DefinitionId) -> Result<()> {
    Ok(())
}

/// A named bundle of registrations. Applying the same plugin twice to one
/// registry is a no-op.
#[derive(Debug, Clone, Copy)]
pub struct Plugin {
    pub name: &'static str,
    pub init: fn(&mut Registry) -> Result<()>,
}

fn qname(element: &str, namespace: &str) -> String {
    format!("{namespace}|{element}")
}

#[derive(Default)]
pub struct Registry {
    definitions: Vec<Definition>,
    by_qname: HashMap<String, DefinitionId>,
    by_name: HashMap<String, DefinitionId>,
    extensions: HashMap<DefinitionId, IndexMap<String, DefinitionId>>,
    tags: HashMap<String, Vec<DefinitionId>>,
    definition_callbacks: HashMap<String, Vec<Callback>>,
    tag_callbacks: HashMap<String, Vec<Callback>>,
    /// Tagged definitions whose callbacks have not run yet, with the number
    /// of callbacks registered for the tag when they were defined.
    pending_tags: VecDeque<(String, DefinitionId, usize)>,
    firing_tags: bool,
    plugins: HashSet<&'static str>,
}

impl fmt::Debug for Registry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Registry")
            .field("definitions", &self.definitions.len())
            .field("plugins", &self.plugins)
            .field(
                "pending_definitions",
                &self.definition_callbacks.keys().collect::<Vec<_>>(),
            )
            .finish()
    }
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a definition and fires every callback waiting on its
    /// qualified name or on one of its tags.
    pub fn define(&mut self, builder: DefinitionBuilder) -> Result<DefinitionId> {
        let element = builder.element.unwrap_or_else(|| builder.name.clone());
        if self.by_name.contains_key(&builder.name) {
            return Err(RegistryError::DuplicateName(builder.name));
        }
        let key = qname(&element, &builder.namespace);
        if self.by_qname.contains_key(&key) {
            return Err(RegistryError::DuplicateElement {
                element,
                namespace: builder.namespace,
            });
        }

        let id = DefinitionId(self.definitions.len());
        self.by_qname.insert(key.clone(), id);
        self.by_name.insert(builder.name.clone(), id);
        for tag in &builder.tags {
            self.tags.entry(tag.clone()).or_default().push(id);
        }
        let tags = builder.tags.clone();
        self.definitions.push(Definition {
            name: builder.name,
            namespace: builder.namespace,
            element,
            top_level: builder.top_level,
            tags: builder.tags,
            prefixes: builder.prefixes,
            id,
            fields: builder.fields,
        });

        if let Some(callbacks) = self.definition_callbacks.remove(&key) {
            debug!(
                target: "jxt/registry",
                "Firing {} deferred callback(s) for {key}", callbacks.len()
            );
            for mut callback in callbacks {
                callback(self, id)?;
            }
        }
        for tag in tags {
            let registered = self.tag_callbacks.get(&tag).map_or(0, Vec::len);
            if registered > 0 {
                self.pending_tags.push_back((tag, id, registered));
            }
        }
        self.fire_pending_tags()?;
        Ok(id)
    }

    /// Runs tag callbacks for queued definitions. A definition made from
    /// inside a tag callback is queued and reaches every callback once the
    /// current one returns.
    fn fire_pending_tags(&mut self) -> Result<()> {
        if self.firing_tags {
            return Ok(());
        }
        self.firing_tags = true;
        let outcome = self.drain_pending_tags();
        self.firing_tags = false;
        if outcome.is_err() {
            self.pending_tags.clear();
        }
        outcome
    }

    fn drain_pending_tags(&mut self) -> Result<()> {
        while let Some((tag, id, registered)) = self.pending_tags.pop_front() {
            trace!(target: "jxt/registry", "Firing {registered} callback(s) for tag {tag}");
            // Callbacks added after the definition was queued were already
            // applied to it by `with_tag`.
            for index in 0..registered {
                let Some(slot) = self.tag_callback_mut(&tag, index) else {
                    break;
                };
                let placeholder: Callback = Box::new(skip_callback);
                let mut callback = std::mem::replace(slot, placeholder);
                let result = callback(self, id);
                if let Some(slot) = self.tag_callback_mut(&tag, index) {
                    *slot = callback;
                }
                result?;
            }
        }
        Ok(())
    }

    fn tag_callback_mut(&mut self, tag: &str, index: usize) -> Option<&mut Callback> {
        self.tag_callbacks.get_mut(tag)?.get_mut(index)
    }

    /// Declares that `parent` may contain `child`. Adds a single-child field
    /// named after the child (unless `hide_single` is set alongside a
    /// `multi_name`) and, with `multi_name`, a list field.
    pub fn extend(
        &mut self,
        parent: DefinitionId,
        child: DefinitionId,
        multi_name: Option<&str>,
        hide_single: bool,
    ) {
        let child_name = self.definition(child).name.clone();
        self.extensions
            .entry(parent)
            .or_default()
            .insert(child_name.clone(), child);

        if multi_name.is_none() || !hide_single {
            self.add(parent, &child_name, field::extension(child));
        }
        if let Some(multi_name) = multi_name {
            self.add(parent, multi_name, field::multi_extension(child));
        }
    }

    /// Adds or replaces a field on `parent`.
    pub fn add(&mut self, parent: DefinitionId, name: &str, field: Field) {
        self.definitions[parent.0]
            .fields
            .insert(name.to_string(), field);
    }

    /// Runs `callback` with the definition for `<element xmlns=namespace>`:
    /// immediately when it exists, otherwise once it is defined. A definition
    /// that is never registered means the callback never runs.
    pub fn with_definition<F>(&mut self, element: &str, namespace: &str, mut callback: F) -> Result<()>
    where
        F: FnMut(&mut Registry, DefinitionId) -> Result<()> + Send + Sync + 'static,
    {
        let key = qname(element, namespace);
        match self.by_qname.get(&key).copied() {
            Some(id) => callback(self, id),
            None => {
                self.definition_callbacks
                    .entry(key)
                    .or_default()
                    .push(Box::new(callback));
                Ok(())
            }
        }
    }

    /// Runs `callback` for every definition carrying `tag`, now and in the future.
    pub fn with_tag<F>(&mut self, tag: &str, mut callback: F) -> Result<()>
    where
        F: FnMut(&mut Registry, DefinitionId) -> Result<()> + Send + Sync + 'static,
    {
        let mut index = 0;
        while let Some(&id) = self.tagged(tag).get(index) {
            callback(self, id)?;
            index += 1;
        }
        self.tag_callbacks
            .entry(tag.to_string())
            .or_default()
            .push(Box::new(callback));
        Ok(())
    }

    /// Definitions carrying `tag`, in registration order.
    pub fn tagged(&self, tag: &str) -> &[DefinitionId] {
        self.tags.get(tag).map(Vec::as_slice).unwrap_or_default()
    }

    /// Resolves a qualified element name. Unqualified `iq` and `message`
    /// fall back to the client namespace.
    pub fn lookup(&self, element: &str, namespace: &str) -> Option<DefinitionId> {
        self.by_qname
            .get(&qname(element, namespace))
            .or_else(|| {
                let fallback = namespace.is_empty() && matches!(element, "iq" | "message");
                fallback
                    .then(|| self.by_qname.get(&qname(element, ns::CLIENT)))
                    .flatten()
            })
            .copied()
    }

    pub fn get_definition(&self, element: &str, namespace: &str) -> Option<&Definition> {
        self.lookup(element, namespace).map(|id| self.definition(id))
    }

    /// # Panics
    ///
    /// Panics if `id` was issued by a different registry.
    pub fn definition(&self, id: DefinitionId) -> &Definition {
        &self.definitions[id.0]
    }

    pub fn definition_by_name(&self, name: &str) -> Option<&Definition> {
        self.by_name.get(name).map(|id| self.definition(*id))
    }

    pub fn definitions(&self) -> impl Iterator<Item = &Definition> {
        self.definitions.iter()
    }

    /// Child definitions registered on `<element xmlns=namespace>` through
    /// [`Registry::extend`], keyed by child name.
    pub fn get_extensions(&self, element: &str, namespace: &str) -> Vec<(&str, &Definition)> {
        self.lookup(element, namespace)
            .map(|id| self.extensions_of(id).collect())
            .unwrap_or_default()
    }

    pub fn extensions_of(&self, parent: DefinitionId) -> impl Iterator<Item = (&str, &Definition)> {
        self.extensions
            .get(&parent)
            .into_iter()
            .flatten()
            .map(|(name, id)| (name.as_str(), self.definition(*id)))
    }

    pub fn extension_of(&self, parent: DefinitionId, name: &str) -> Option<DefinitionId> {
        self.extensions.get(&parent)?.get(name).copied()
    }

    /// Wraps an existing element, or returns `None` when nothing is defined
    /// for its qualified name.
    pub fn build(self: &Arc<Self>, node: Node) -> Option<Stanza> {
        let id = self.lookup(&node.tag, &node.ns)?;
        let def = self.definition(id);
        let node = if node.ns.is_empty() && !def.namespace.is_empty() {
            let Node {
                tag,
                attrs,
                content,
                ..
            } = node;
            Node::new(&tag, &def.namespace, attrs, content)
        } else {
            node
        };
        Some(Stanza::new(Arc::clone(self), id, node))
    }

    pub fn parse(self: &Arc<Self>, xml: &str) -> Result<Option<Stanza>> {
        let node = unmarshal(xml)?;
        Ok(self.build(node))
    }

    /// Creates a fresh element for the definition named `name` and writes
    /// `data` through its fields. Keys without a field are dropped.
    pub fn create(
        self: &Arc<Self>,
        name: &str,
        data: BTreeMap<String, FieldValue>,
    ) -> Result<Stanza> {
        let def = self
            .definition_by_name(name)
            .ok_or_else(|| RegistryError::UnknownDefinition(name.to_string()))?;
        let mut node = Node::element(&def.namespace, &def.element);
        for (prefix, namespace) in &def.prefixes {
            node.set_attr(format!("xmlns:{prefix}"), namespace.as_str());
        }
        let mut stanza = Stanza::new(Arc::clone(self), def.id, node);
        stanza.view_mut().apply(data);
        Ok(stanza)
    }

    pub fn create_from_json(self: &Arc<Self>, name: &str, data: &serde_json::Value) -> Result<Stanza> {
        let data = match FieldValue::from(data.clone()) {
            FieldValue::Map(map) => map,
            FieldValue::None => BTreeMap::new(),
            other => {
                debug!(target: "jxt/registry", "Ignoring non-object data for '{name}': {other:?}");
                BTreeMap::new()
            }
        };
        self.create(name, data)
    }

    /// Applies `plugin` unless it was already applied to this registry.
    pub fn use_plugin(&mut self, plugin: &Plugin) -> Result<()> {
        if self.plugins.contains(plugin.name) {
            trace!(target: "jxt/registry", "Plugin {} already loaded", plugin.name);
            return Ok(());
        }
        trace!(target: "jxt/registry", "Loading plugin {}", plugin.name);
        (plugin.init)(self).map_err(|e| match e {
            RegistryError::Plugin { .. } => e,
            other => RegistryError::Plugin {
                name: plugin.name.to_string(),
                reason: other.to_string(),
            },
        })?;
        self.plugins.insert(plugin.name);
        Ok(())
    }

    pub fn is_loaded(&self, plugin: &str) -> bool {
        self.plugins.contains(plugin)
    }

    fn with_each_stanza_ns<F>(&mut self, element: &'static str, callback: F) -> Result<()>
    where
        F: FnMut(&mut Registry, DefinitionId) -> Result<()> + Clone + Send + Sync + 'static,
    {
        for (_, namespace) in ns::STANZA_NAMESPACES {
            self.with_definition(element, namespace, callback.clone())?;
        }
        Ok(())
    }

    /// Runs `callback` for the client, server and component `<message/>` definitions.
    pub fn with_message<F>(&mut self, callback: F) -> Result<()>
    where
        F: FnMut(&mut Registry, DefinitionId) -> Result<()> + Clone + Send + Sync + 'static,
    {
        self.with_each_stanza_ns("message", callback)
    }

    pub fn with_presence<F>(&mut self, callback: F) -> Result<()>
    where
        F: FnMut(&mut Registry, DefinitionId) -> Result<()> + Clone + Send + Sync + 'static,
    {
        self.with_each_stanza_ns("presence", callback)
    }

    pub fn with_iq<F>(&mut self, callback: F) -> Result<()>
    where
        F: FnMut(&mut Registry, DefinitionId) -> Result<()> + Clone + Send + Sync + 'static,
    {
        self.with_each_stanza_ns("iq", callback)
    }

    pub fn with_stanza_error<F>(&mut self, callback: F) -> Result<()>
    where
        F: FnMut(&mut Registry, DefinitionId) -> Result<()> + Clone + Send + Sync + 'static,
    {
        self.with_each_stanza_ns("error", callback)
    }

    pub fn with_data_form<F>(&mut self, callback: F) -> Result<()>
    where
        F: FnMut(&mut Registry, DefinitionId) -> Result<()> + Send + Sync + 'static,
    {
        self.with_definition("x", ns::DATAFORM, callback)
    }

    pub fn extend_message(&mut self, child: DefinitionId) -> Result<()> {
        self.with_message(move |reg, message| {
            reg.extend(message, child, None, false);
            Ok(())
        })
    }

    pub fn extend_presence(&mut self, child: DefinitionId) -> Result<()> {
        self.with_presence(move |reg, presence| {
            reg.extend(presence, child, None, false);
            Ok(())
        })
    }

    pub fn extend_iq(&mut self, child: DefinitionId) -> Result<()> {
        self.with_iq(move |reg, iq| {
            reg.extend(iq, child, None, false);
            Ok(())
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::field::{attribute, text_sub};
    use std::sync::Mutex;

    const NS_A: &str = "urn:test:a";
    const NS_B: &str = "urn:test:b";

    #[test]
    fn test_duplicates_are_rejected() {
        let mut reg = Registry::new();
        reg.define(DefinitionBuilder::new("a", NS_A)).unwrap();

        assert!(matches!(
            reg.define(DefinitionBuilder::new("a", NS_B)),
            Err(RegistryError::DuplicateName(name)) if name == "a"
        ));
        assert!(matches!(
            reg.define(DefinitionBuilder::new("other", NS_A).element("a")),
            Err(RegistryError::DuplicateElement { .. })
        ));
    }

    #[test]
    fn test_with_definition_fires_immediately_or_deferred() {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let mut reg = Registry::new();
        let a = reg.define(DefinitionBuilder::new("a", NS_A)).unwrap();

        let log = Arc::clone(&seen);
        reg.with_definition("a", NS_A, move |_, id| {
            log.lock().unwrap().push(("now", id));
            Ok(())
        })
        .unwrap();

        let log = Arc::clone(&seen);
        reg.with_definition("b", NS_B, move |_, id| {
            log.lock().unwrap().push(("later", id));
            Ok(())
        })
        .unwrap();
        assert_eq!(seen.lock().unwrap().len(), 1);

        let b = reg.define(DefinitionBuilder::new("b", NS_B)).unwrap();
        assert_eq!(*seen.lock().unwrap(), vec![("now", a), ("later", b)]);
    }

    #[test]
    fn test_never_registered_definition_never_fires() {
        let fired = Arc::new(Mutex::new(false));
        let mut reg = Registry::new();
        let flag = Arc::clone(&fired);
        reg.with_definition("missing", NS_A, move |_, _| {
            *flag.lock().unwrap() = true;
            Ok(())
        })
        .unwrap();
        reg.define(DefinitionBuilder::new("a", NS_A)).unwrap();
        assert!(!*fired.lock().unwrap());
    }

    #[test]
    fn test_with_tag_covers_past_and_future_definitions() {
        let mut reg = Registry::new();
        let first = reg
            .define(DefinitionBuilder::new("first", NS_A).tag("app"))
            .unwrap();
        let seen = Arc::new(Mutex::new(Vec::new()));
        let log = Arc::clone(&seen);
        reg.with_tag("app", move |_, id| {
            log.lock().unwrap().push(id);
            Ok(())
        })
        .unwrap();
        let second = reg
            .define(DefinitionBuilder::new("second", NS_B).tag("app"))
            .unwrap();

        assert_eq!(*seen.lock().unwrap(), vec![first, second]);
        assert_eq!(reg.tagged("app"), &[first, second]);
        assert!(reg.tagged("none").is_empty());
    }

    #[test]
    fn test_definitions_made_by_tag_callbacks_reach_every_callback() {
        let mut reg = Registry::new();
        let first_seen = Arc::new(Mutex::new(Vec::new()));
        let second_seen = Arc::new(Mutex::new(Vec::new()));

        let log = Arc::clone(&first_seen);
        let mut defined_companion = false;
        reg.with_tag("app", move |reg, id| {
            log.lock().unwrap().push(id);
            if !defined_companion {
                defined_companion = true;
                reg.define(DefinitionBuilder::new("companion", NS_B).tag("app"))?;
            }
            Ok(())
        })
        .unwrap();
        let log = Arc::clone(&second_seen);
        reg.with_tag("app", move |_, id| {
            log.lock().unwrap().push(id);
            Ok(())
        })
        .unwrap();

        let first = reg
            .define(DefinitionBuilder::new("first", NS_A).tag("app"))
            .unwrap();
        let companion = reg.definition_by_name("companion").unwrap().id();

        assert_eq!(reg.tagged("app"), &[first, companion]);
        assert_eq!(*first_seen.lock().unwrap(), vec![first, companion]);
        assert_eq!(*second_seen.lock().unwrap(), vec![first, companion]);
    }

    #[test]
    fn test_late_tag_callback_sees_definitions_it_makes() {
        let mut reg = Registry::new();
        let first = reg
            .define(DefinitionBuilder::new("first", NS_A).tag("app"))
            .unwrap();
        let seen = Arc::new(Mutex::new(Vec::new()));
        let log = Arc::clone(&seen);
        reg.with_tag("app", move |reg, id| {
            log.lock().unwrap().push(id);
            if reg.definition_by_name("companion").is_none() {
                reg.define(DefinitionBuilder::new("companion", NS_B).tag("app"))?;
            }
            Ok(())
        })
        .unwrap();
        let companion = reg.definition_by_name("companion").unwrap().id();

        assert_eq!(*seen.lock().unwrap(), vec![first, companion]);
    }

    #[test]
    fn test_extend_adds_single_and_multi_fields() {
        let mut reg = Registry::new();
        let parent = reg.define(DefinitionBuilder::new("query", NS_A)).unwrap();
        let item = reg
            .define(DefinitionBuilder::new("_item", NS_A).element("item"))
            .unwrap();
        let hidden = reg
            .define(DefinitionBuilder::new("_hidden", NS_A).element("hidden"))
            .unwrap();

        reg.extend(parent, item, Some("items"), false);
        reg.extend(parent, hidden, Some("hiddens"), true);

        let def = reg.definition(parent);
        assert!(def.field("_item").is_some());
        assert!(def.field("items").is_some());
        assert!(def.field("_hidden").is_none());
        assert!(def.field("hiddens").is_some());
        assert_eq!(reg.extension_of(parent, "_hidden"), Some(hidden));

        let names: Vec<_> = reg
            .get_extensions("query", NS_A)
            .into_iter()
            .map(|(name, _)| name)
            .collect();
        assert_eq!(names, vec!["_item", "_hidden"]);
    }

    #[test]
    fn test_unqualified_iq_falls_back_to_client() {
        let mut reg = Registry::new();
        let iq = reg.define(DefinitionBuilder::new("iq", ns::CLIENT)).unwrap();
        reg.define(DefinitionBuilder::new("presence", ns::CLIENT))
            .unwrap();

        assert_eq!(reg.lookup("iq", ""), Some(iq));
        assert_eq!(reg.lookup("presence", ""), None);
        assert_eq!(reg.lookup("iq", NS_A), None);
    }

    #[test]
    fn test_use_plugin_is_idempotent() {
        fn init(reg: &mut Registry) -> Result<()> {
            reg.define(
                DefinitionBuilder::new("thing", NS_A).field("title", text_sub(NS_A, "title")),
            )?;
            Ok(())
        }
        let plugin = Plugin { name: "thing", init };

        let mut reg = Registry::new();
        reg.use_plugin(&plugin).unwrap();
        reg.use_plugin(&plugin).unwrap();
        assert!(reg.is_loaded("thing"));
        assert_eq!(reg.definitions().count(), 1);
    }

    #[test]
    fn test_failing_plugin_is_reported_and_not_marked_loaded() {
        fn init(reg: &mut Registry) -> Result<()> {
            reg.define(DefinitionBuilder::new("a", NS_A))?;
            reg.define(DefinitionBuilder::new("a", NS_B))?;
            Ok(())
        }
        let plugin = Plugin { name: "broken", init };

        let mut reg = Registry::new();
        let err = reg.use_plugin(&plugin).unwrap_err();
        assert!(matches!(err, RegistryError::Plugin { ref name, .. } if name == "broken"));
        assert!(!reg.is_loaded("broken"));
    }

    #[test]
    fn test_create_drops_unknown_keys() {
        let mut reg = Registry::new();
        reg.define(DefinitionBuilder::new("item", NS_A).field("name", attribute("name")))
            .unwrap();
        let reg = Arc::new(reg);

        let stanza = reg
            .create_from_json(
                "item",
                &serde_json::json!({ "name": "x", "bogus": "y" }),
            )
            .unwrap();
        assert_eq!(stanza.to_xml(), "<item xmlns=\"urn:test:a\" name=\"x\"/>");
        assert!(matches!(
            reg.create("nope", BTreeMap::new()),
            Err(RegistryError::UnknownDefinition(_))
        ));
    }
}
