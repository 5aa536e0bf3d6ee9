//! Field accessors: the `get`/`set` pairs that map a stanza property onto a
//! location in its XML.
//!
//! Every accessor is built by one of the factory functions in this module.
//! Reads never fail and never touch the tree; writes edit the tree in place.

use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use base64::Engine as _;
use base64::engine::general_purpose::STANDARD;
use chrono::Utc;
use jxtcore_xml::{Jid, Node};
use log::{debug, warn};

use crate::ns;
use crate::registry::{Definition, DefinitionId, Registry};
use crate::stanza::{Stanza, StanzaMut};
use crate::value::{FieldValue, format_date, parse_date};

const XML_LANG: &str = "xml:lang";

/// What an accessor sees besides the node: the registry it was registered in
/// and the definition that owns it.
pub struct FieldContext<'a> {
    pub registry: &'a Arc<Registry>,
    pub definition: DefinitionId,
}

impl FieldContext<'_> {
    pub fn definition(&self) -> &Definition {
        self.registry.definition(self.definition)
    }
}

/// A hand-written accessor for shapes no factory covers.
pub trait FieldAccessor: Send + Sync {
    fn get(&self, cx: &FieldContext<'_>, node: &Node) -> FieldValue;

    fn set(&self, cx: &FieldContext<'_>, node: &mut Node, value: FieldValue);

    fn describe(&self) -> String {
        "custom".to_string()
    }
}

/// Where a scalar field keeps its text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Location {
    Attr(String),
    AttrNs { ns: String, name: String },
    Text,
    SubText { ns: String, tag: String },
    SubAttr { ns: String, sub: String, attr: String },
}

/// How a scalar field's text is coerced.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScalarKind {
    Str,
    Bool,
    Int,
    Float,
    /// With `now`, an absent value reads as the current time.
    Date { now: bool },
    Jid,
}

#[derive(Clone)]
pub enum Field {
    Scalar {
        at: Location,
        kind: ScalarKind,
        default: Option<FieldValue>,
    },
    B64Text,
    BoolSub { ns: String, tag: String },
    MultiTextSub { ns: String, tag: String },
    MultiSubAttr { ns: String, sub: String, attr: String },
    LangTextSub { ns: String, tag: String },
    EnumSub { ns: String, values: Vec<String> },
    Extension(DefinitionId),
    MultiExtension(DefinitionId),
    SubExtension { ns: String, sub: String, child: DefinitionId },
    SubMultiExtension { ns: String, sub: String, child: DefinitionId },
    /// Resolves to whichever definition carrying `tag` has its element
    /// present. Writes select the extension named `_<value[type_key]>`.
    Tagged { tag: String, type_key: String },
    Constant(FieldValue),
    Custom(Arc<dyn FieldAccessor>),
}

fn scalar(at: Location, kind: ScalarKind) -> Field {
    Field::Scalar {
        at,
        kind,
        default: None,
    }
}

fn sub_text(ns: &str, tag: &str) -> Location {
    Location::SubText {
        ns: ns.to_string(),
        tag: tag.to_string(),
    }
}

fn sub_attr(ns: &str, sub: &str, attr: &str) -> Location {
    Location::SubAttr {
        ns: ns.to_string(),
        sub: sub.to_string(),
        attr: attr.to_string(),
    }
}

pub fn attribute(name: &str) -> Field {
    scalar(Location::Attr(name.to_string()), ScalarKind::Str)
}

/// An attribute in a foreign namespace. The prefix comes from the owning
/// definition's declared prefixes; the XML namespace always maps to `xml`.
pub fn attribute_ns(ns: &str, name: &str) -> Field {
    scalar(
        Location::AttrNs {
            ns: ns.to_string(),
            name: name.to_string(),
        },
        ScalarKind::Str,
    )
}

pub fn lang_attribute() -> Field {
    attribute_ns(ns::XML, "lang")
}

pub fn bool_attribute(name: &str) -> Field {
    scalar(Location::Attr(name.to_string()), ScalarKind::Bool)
}

pub fn number_attribute(name: &str) -> Field {
    scalar(Location::Attr(name.to_string()), ScalarKind::Int)
}

pub fn float_attribute(name: &str) -> Field {
    scalar(Location::Attr(name.to_string()), ScalarKind::Float)
}

pub fn date_attribute(name: &str, now: bool) -> Field {
    scalar(Location::Attr(name.to_string()), ScalarKind::Date { now })
}

pub fn jid_attribute(name: &str) -> Field {
    scalar(Location::Attr(name.to_string()), ScalarKind::Jid)
}

pub fn text() -> Field {
    scalar(Location::Text, ScalarKind::Str)
}

pub fn b64_text() -> Field {
    Field::B64Text
}

pub fn text_sub(ns: &str, tag: &str) -> Field {
    scalar(sub_text(ns, tag), ScalarKind::Str)
}

pub fn number_sub(ns: &str, tag: &str) -> Field {
    scalar(sub_text(ns, tag), ScalarKind::Int)
}

pub fn float_sub(ns: &str, tag: &str) -> Field {
    scalar(sub_text(ns, tag), ScalarKind::Float)
}

pub fn date_sub(ns: &str, tag: &str, now: bool) -> Field {
    scalar(sub_text(ns, tag), ScalarKind::Date { now })
}

pub fn jid_sub(ns: &str, tag: &str) -> Field {
    scalar(sub_text(ns, tag), ScalarKind::Jid)
}

pub fn sub_attribute(ns: &str, sub: &str, attr: &str) -> Field {
    scalar(sub_attr(ns, sub, attr), ScalarKind::Str)
}

pub fn bool_sub_attribute(ns: &str, sub: &str, attr: &str) -> Field {
    scalar(sub_attr(ns, sub, attr), ScalarKind::Bool)
}

pub fn number_sub_attribute(ns: &str, sub: &str, attr: &str) -> Field {
    scalar(sub_attr(ns, sub, attr), ScalarKind::Int)
}

pub fn date_sub_attribute(ns: &str, sub: &str, attr: &str, now: bool) -> Field {
    scalar(sub_attr(ns, sub, attr), ScalarKind::Date { now })
}

pub fn bool_sub(ns: &str, tag: &str) -> Field {
    Field::BoolSub {
        ns: ns.to_string(),
        tag: tag.to_string(),
    }
}

pub fn multi_text_sub(ns: &str, tag: &str) -> Field {
    Field::MultiTextSub {
        ns: ns.to_string(),
        tag: tag.to_string(),
    }
}

pub fn multi_sub_attribute(ns: &str, sub: &str, attr: &str) -> Field {
    Field::MultiSubAttr {
        ns: ns.to_string(),
        sub: sub.to_string(),
        attr: attr.to_string(),
    }
}

pub fn lang_text_sub(ns: &str, tag: &str) -> Field {
    Field::LangTextSub {
        ns: ns.to_string(),
        tag: tag.to_string(),
    }
}

/// A choice among sibling elements named by `values`. Writes are not checked
/// against `values`: any name is written as given.
pub fn enum_sub(ns: &str, values: &[&str]) -> Field {
    Field::EnumSub {
        ns: ns.to_string(),
        values: values.iter().map(|v| v.to_string()).collect(),
    }
}

pub fn extension(child: DefinitionId) -> Field {
    Field::Extension(child)
}

pub fn multi_extension(child: DefinitionId) -> Field {
    Field::MultiExtension(child)
}

pub fn sub_extension(ns: &str, sub: &str, child: DefinitionId) -> Field {
    Field::SubExtension {
        ns: ns.to_string(),
        sub: sub.to_string(),
        child,
    }
}

pub fn sub_multi_extension(ns: &str, sub: &str, child: DefinitionId) -> Field {
    Field::SubMultiExtension {
        ns: ns.to_string(),
        sub: sub.to_string(),
        child,
    }
}

pub fn tagged(tag: &str, type_key: &str) -> Field {
    Field::Tagged {
        tag: tag.to_string(),
        type_key: type_key.to_string(),
    }
}

pub fn constant(value: impl Into<FieldValue>) -> Field {
    Field::Constant(value.into())
}

pub fn custom(accessor: impl FieldAccessor + 'static) -> Field {
    Field::Custom(Arc::new(accessor))
}

impl Field {
    /// Sets the value read when the location is empty. Only scalar fields
    /// carry a default; other kinds are returned unchanged.
    pub fn with_default(self, value: impl Into<FieldValue>) -> Self {
        match self {
            Field::Scalar { at, kind, .. } => Field::Scalar {
                at,
                kind,
                default: Some(value.into()),
            },
            other => other,
        }
    }

    /// The factory name this field was built with.
    pub fn kind_name(&self) -> String {
        let name = match self {
            Field::Scalar { at, kind, .. } => match (at, kind) {
                (Location::AttrNs { .. }, _) => "attributeNS",
                (Location::Attr(_), ScalarKind::Str) => "attribute",
                (Location::Attr(_), ScalarKind::Bool) => "boolAttribute",
                (Location::Attr(_), ScalarKind::Int | ScalarKind::Float) => "numberAttribute",
                (Location::Attr(_), ScalarKind::Date { .. }) => "dateAttribute",
                (Location::Attr(_), ScalarKind::Jid) => "jidAttribute",
                (Location::Text, _) => "text",
                (Location::SubText { .. }, ScalarKind::Int | ScalarKind::Float) => "numberSub",
                (Location::SubText { .. }, ScalarKind::Date { .. }) => "dateSub",
                (Location::SubText { .. }, ScalarKind::Jid) => "jidSub",
                (Location::SubText { .. }, _) => "textSub",
                (Location::SubAttr { .. }, ScalarKind::Bool) => "boolSubAttribute",
                (Location::SubAttr { .. }, ScalarKind::Int | ScalarKind::Float) => {
                    "numberSubAttribute"
                }
                (Location::SubAttr { .. }, ScalarKind::Date { .. }) => "dateSubAttribute",
                (Location::SubAttr { .. }, _) => "subAttribute",
            },
            Field::B64Text => "b64Text",
            Field::BoolSub { .. } => "boolSub",
            Field::MultiTextSub { .. } => "multiTextSub",
            Field::MultiSubAttr { .. } => "multiSubAttribute",
            Field::LangTextSub { .. } => "langTextSub",
            Field::EnumSub { .. } => "enumSub",
            Field::Extension(_) => "extension",
            Field::MultiExtension(_) => "multiExtension",
            Field::SubExtension { .. } => "subExtension",
            Field::SubMultiExtension { .. } => "subMultiExtension",
            Field::Tagged { .. } => "tagged",
            Field::Constant(_) => "constant",
            Field::Custom(accessor) => return accessor.describe(),
        };
        name.to_string()
    }

    pub fn get(&self, cx: &FieldContext<'_>, node: &Node) -> FieldValue {
        match self {
            Field::Scalar { at, kind, default } => {
                let raw = read_location(cx, at, node).filter(|s| !s.is_empty());
                read_scalar(raw, *kind, default.as_ref())
            }
            Field::B64Text => {
                let text = node.text();
                if text.is_empty() || text == "=" {
                    return FieldValue::Bytes(Vec::new());
                }
                match STANDARD.decode(text.trim()) {
                    Ok(bytes) => FieldValue::Bytes(bytes),
                    Err(e) => {
                        warn!(target: "jxt/field", "Invalid base64 in <{}>: {e}", node.tag);
                        FieldValue::Bytes(Vec::new())
                    }
                }
            }
            Field::BoolSub { ns, tag } => FieldValue::Bool(node.find_first(ns, tag).is_some()),
            Field::MultiTextSub { ns, tag } => FieldValue::List(
                node.find(ns, tag)
                    .map(|c| FieldValue::from(c.text()))
                    .collect(),
            ),
            Field::MultiSubAttr { ns, sub, attr } => FieldValue::List(
                node.find(ns, sub)
                    .filter_map(|c| c.attr(attr))
                    .map(FieldValue::from)
                    .collect(),
            ),
            Field::LangTextSub { ns, tag } => {
                let default_lang = node.attr(XML_LANG).unwrap_or_default();
                let mut map = BTreeMap::new();
                for child in node.find(ns, tag) {
                    let lang = child.attr(XML_LANG).unwrap_or(default_lang);
                    map.insert(lang.to_string(), child.text().to_string());
                }
                FieldValue::LangMap(map)
            }
            Field::EnumSub { ns, values } => values
                .iter()
                .find(|value| node.find_first(ns, value).is_some())
                .map(|value| FieldValue::from(value.as_str()))
                .unwrap_or_else(|| FieldValue::from("")),
            Field::Extension(child) => {
                let def = cx.registry.definition(*child);
                node.find_first(&def.namespace, &def.element)
                    .map(|c| stanza_value(cx, *child, c))
                    .unwrap_or_default()
            }
            Field::MultiExtension(child) => {
                let def = cx.registry.definition(*child);
                FieldValue::List(
                    node.find(&def.namespace, &def.element)
                        .map(|c| stanza_value(cx, *child, c))
                        .collect(),
                )
            }
            Field::SubExtension { ns, sub, child } => {
                let def = cx.registry.definition(*child);
                node.find_first(ns, sub)
                    .and_then(|wrapper| wrapper.find_first(&def.namespace, &def.element))
                    .map(|c| stanza_value(cx, *child, c))
                    .unwrap_or_default()
            }
            Field::SubMultiExtension { ns, sub, child } => {
                let def = cx.registry.definition(*child);
                FieldValue::List(
                    node.find_first(ns, sub)
                        .into_iter()
                        .flat_map(|wrapper| wrapper.find(&def.namespace, &def.element))
                        .map(|c| stanza_value(cx, *child, c))
                        .collect(),
                )
            }
            Field::Tagged { tag, .. } => cx
                .registry
                .tagged(tag)
                .iter()
                .find_map(|id| {
                    let def = cx.registry.definition(*id);
                    node.find_first(&def.namespace, &def.element)
                        .map(|c| stanza_value(cx, *id, c))
                })
                .unwrap_or_default(),
            Field::Constant(value) => value.clone(),
            Field::Custom(accessor) => accessor.get(cx, node),
        }
    }

    pub fn set(&self, cx: &FieldContext<'_>, node: &mut Node, value: FieldValue) {
        match self {
            Field::Scalar { at, kind, .. } => {
                if matches!(kind, ScalarKind::Date { .. }) && value.is_empty() {
                    return;
                }
                let text = write_scalar(value, *kind);
                write_location(cx, at, node, text);
            }
            Field::B64Text => {
                let bytes = match value {
                    FieldValue::Bytes(b) => b,
                    FieldValue::Str(s) => s.into_bytes(),
                    _ => {
                        node.set_text("");
                        return;
                    }
                };
                let encoded = STANDARD.encode(bytes);
                node.set_text(if encoded.is_empty() { "=".to_string() } else { encoded });
            }
            Field::BoolSub { ns, tag } => {
                if is_truthy(&value) {
                    node.find_or_create(ns, tag);
                } else {
                    node.remove_children(ns, tag);
                }
            }
            Field::MultiTextSub { ns, tag } => {
                node.remove_children(ns, tag);
                for item in value.into_list() {
                    match item.to_text() {
                        Some(text) => {
                            node.append_child(Node::element(ns, tag)).set_text(text);
                        }
                        None => warn!(target: "jxt/field", "Skipping non-text entry for <{tag}>: {item:?}"),
                    }
                }
            }
            Field::MultiSubAttr { ns, sub, attr } => {
                node.remove_children(ns, sub);
                for item in value.into_list() {
                    match item.to_text() {
                        Some(text) => {
                            node.append_child(Node::element(ns, sub))
                                .set_attr(attr.as_str(), text);
                        }
                        None => warn!(target: "jxt/field", "Skipping non-text entry for <{sub}>: {item:?}"),
                    }
                }
            }
            Field::LangTextSub { ns, tag } => {
                let default_lang = node.attr(XML_LANG).unwrap_or_default().to_string();
                node.remove_children(ns, tag);
                let entries: Vec<(String, String)> = match value {
                    FieldValue::LangMap(map) => map.into_iter().collect(),
                    FieldValue::Map(map) => map
                        .into_iter()
                        .filter_map(|(lang, v)| v.to_text().map(|t| (lang, t)))
                        .collect(),
                    other => other
                        .to_text()
                        .into_iter()
                        .map(|t| (default_lang.clone(), t))
                        .collect(),
                };
                for (lang, text) in entries {
                    if text.is_empty() {
                        continue;
                    }
                    let child = node.append_child(Node::element(ns, tag));
                    child.set_text(text);
                    if !lang.is_empty() && lang != default_lang {
                        child.set_attr(XML_LANG, lang);
                    }
                }
            }
            Field::EnumSub { ns, values } => {
                let wanted = value.to_text().unwrap_or_default();
                let mut already_present = false;
                for candidate in values {
                    if node.find_first(ns, candidate).is_none() {
                        continue;
                    }
                    if *candidate == wanted {
                        already_present = true;
                    } else {
                        node.remove_children(ns, candidate);
                    }
                }
                if !wanted.is_empty() && !already_present {
                    node.append_child(Node::element(ns, &wanted));
                }
            }
            Field::Extension(child) => write_child(cx.registry, *child, node, value),
            Field::MultiExtension(child) => write_children(cx.registry, *child, node, value),
            Field::SubExtension { ns, sub, child } => {
                if value.is_empty() {
                    node.remove_children(ns, sub);
                    return;
                }
                let wrapper = node.find_or_create(ns, sub);
                write_child(cx.registry, *child, wrapper, value);
            }
            Field::SubMultiExtension { ns, sub, child } => {
                node.remove_children(ns, sub);
                if value.is_empty() {
                    return;
                }
                let wrapper = node.append_child(Node::element(ns, sub));
                write_children(cx.registry, *child, wrapper, value);
            }
            Field::Tagged { tag, type_key } => {
                let target = match &value {
                    FieldValue::Stanza(s) => cx
                        .registry
                        .tagged(tag)
                        .contains(&s.definition_id())
                        .then(|| s.definition_id()),
                    other => other
                        .get(type_key)
                        .and_then(FieldValue::as_str)
                        .and_then(|kind| {
                            cx.registry
                                .extension_of(cx.definition, &format!("_{kind}"))
                        }),
                };
                match target {
                    Some(child) => write_child(cx.registry, child, node, value),
                    None => debug!(
                        target: "jxt/field",
                        "No '{tag}' extension matches value for <{}>", node.tag
                    ),
                }
            }
            Field::Constant(_) => {}
            Field::Custom(accessor) => accessor.set(cx, node, value),
        }
    }
}

impl fmt::Debug for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Field::Scalar { at, kind, default } => f
                .debug_struct("Scalar")
                .field("at", at)
                .field("kind", kind)
                .field("default", default)
                .finish(),
            Field::Custom(accessor) => write!(f, "Custom({})", accessor.describe()),
            other => f.write_str(&other.kind_name()),
        }
    }
}

/// Truthiness for presence-style writes.
pub fn is_truthy(value: &FieldValue) -> bool {
    match value {
        FieldValue::Bool(b) => *b,
        FieldValue::Str(s) => s == "true" || s == "1",
        FieldValue::Int(i) => *i != 0,
        other => !other.is_empty(),
    }
}

/// Resolves the prefix bound to `ns` on `node`, falling back to the one the
/// definition declares. `xml` is always bound.
fn attr_ns_prefix(cx: &FieldContext<'_>, node: &Node, ns: &str) -> Option<String> {
    if ns == ns::XML {
        return Some("xml".to_string());
    }
    node.attrs
        .iter()
        .find_map(|(key, value)| {
            let prefix = key.strip_prefix("xmlns:")?;
            (value == ns).then(|| prefix.to_string())
        })
        .or_else(|| cx.definition().prefix_for(ns).map(str::to_string))
}

fn attr_ns_key(cx: &FieldContext<'_>, node: &Node, ns: &str, name: &str) -> Option<String> {
    attr_ns_prefix(cx, node, ns).map(|prefix| format!("{prefix}:{name}"))
}

fn read_location<'n>(cx: &FieldContext<'_>, at: &Location, node: &'n Node) -> Option<&'n str> {
    match at {
        Location::Attr(name) => node.attr(name),
        Location::AttrNs { ns, name } => node.attr(&attr_ns_key(cx, node, ns, name)?),
        Location::Text => Some(node.text()),
        Location::SubText { ns, tag } => node.find_first(ns, tag).map(Node::text),
        Location::SubAttr { ns, sub, attr } => {
            node.find_first(ns, sub).and_then(|c| c.attr(attr))
        }
    }
}

fn write_location(cx: &FieldContext<'_>, at: &Location, node: &mut Node, text: Option<String>) {
    let text = text.filter(|t| !t.is_empty());
    match at {
        Location::Attr(name) => match text {
            Some(text) => node.set_attr(name.as_str(), text),
            None => {
                node.remove_attr(name);
            }
        },
        Location::AttrNs { ns, name } => {
            let Some(prefix) = attr_ns_prefix(cx, node, ns) else {
                debug!(target: "jxt/field", "No prefix declared for {ns} on <{}>", node.tag);
                return;
            };
            let key = format!("{prefix}:{name}");
            match text {
                Some(text) => {
                    let declaration = format!("xmlns:{prefix}");
                    if prefix != "xml" && node.attr(&declaration).is_none() {
                        node.set_attr(declaration, ns.as_str());
                    }
                    node.set_attr(key, text);
                }
                None => {
                    node.remove_attr(&key);
                }
            }
        }
        Location::Text => node.set_text(text.unwrap_or_default()),
        Location::SubText { ns, tag } => match text {
            Some(text) => node.find_or_create(ns, tag).set_text(text),
            None => {
                node.remove_children(ns, tag);
            }
        },
        Location::SubAttr { ns, sub, attr } => match text {
            Some(text) => node.find_or_create(ns, sub).set_attr(attr.as_str(), text),
            None => {
                if let Some(children) = node.children_mut() {
                    for child in children.iter_mut().filter(|c| c.is(ns, sub)) {
                        child.remove_attr(attr);
                    }
                }
            }
        },
    }
}

/// Parses the leading integer of `s`, ignoring anything after it.
fn leading_int(s: &str) -> Option<i64> {
    let s = s.trim();
    let end = s
        .char_indices()
        .find(|&(i, c)| !(c.is_ascii_digit() || (i == 0 && (c == '-' || c == '+'))))
        .map_or(s.len(), |(i, _)| i);
    s[..end].parse().ok()
}

fn read_scalar(raw: Option<&str>, kind: ScalarKind, default: Option<&FieldValue>) -> FieldValue {
    let fallback = || default.cloned().unwrap_or_default();
    match kind {
        ScalarKind::Str => raw
            .map(FieldValue::from)
            .unwrap_or_else(|| default.cloned().unwrap_or_else(|| FieldValue::from(""))),
        ScalarKind::Bool => FieldValue::Bool(raw.is_some_and(|v| v == "true" || v == "1")),
        ScalarKind::Int => raw
            .and_then(leading_int)
            .map(FieldValue::Int)
            .unwrap_or_else(fallback),
        ScalarKind::Float => raw
            .and_then(|s| s.trim().parse::<f64>().ok())
            .filter(|f| !f.is_nan())
            .map(FieldValue::Float)
            .unwrap_or_else(fallback),
        ScalarKind::Date { now } => match raw {
            Some(s) => parse_date(s).map(FieldValue::Date).unwrap_or_default(),
            None if now => FieldValue::Date(Utc::now()),
            None => FieldValue::None,
        },
        ScalarKind::Jid => raw
            .and_then(|s| s.parse::<Jid>().ok())
            .map(FieldValue::Jid)
            .unwrap_or_default(),
    }
}

fn write_scalar(value: FieldValue, kind: ScalarKind) -> Option<String> {
    match kind {
        ScalarKind::Bool => is_truthy(&value).then(|| "true".to_string()),
        ScalarKind::Date { .. } => match value {
            FieldValue::Date(d) => Some(format_date(&d)),
            other => other.to_text(),
        },
        _ => value.to_text(),
    }
}

fn stanza_value(cx: &FieldContext<'_>, id: DefinitionId, node: &Node) -> FieldValue {
    FieldValue::from(Stanza::new(Arc::clone(cx.registry), id, node.clone()))
}

/// Writes one child extension into `parent`. A data object is applied to
/// the existing child, creating it first if needed.
fn write_child(registry: &Arc<Registry>, child: DefinitionId, parent: &mut Node, value: FieldValue) {
    let def = registry.definition(child);
    match value {
        FieldValue::Stanza(stanza) => {
            if !stanza.node().is(&def.namespace, &def.element) {
                debug!(
                    target: "jxt/field",
                    "Ignoring <{}> written where <{}> was expected", stanza.node().tag, def.element
                );
                return;
            }
            parent.remove_children(&def.namespace, &def.element);
            parent.append_child(stanza.into_node());
        }
        FieldValue::Map(data) => {
            let target = parent.find_or_create(&def.namespace, &def.element);
            StanzaMut::new(registry, child, target).apply(data);
        }
        FieldValue::Bool(true) => {
            parent.find_or_create(&def.namespace, &def.element);
        }
        value if value.is_empty() => {}
        other => debug!(target: "jxt/field", "Ignoring {other:?} written to extension '{}'", def.name),
    }
}

/// Replaces every child of the extension's kind with one per list item.
fn write_children(
    registry: &Arc<Registry>,
    child: DefinitionId,
    parent: &mut Node,
    value: FieldValue,
) {
    let def = registry.definition(child);
    parent.remove_children(&def.namespace, &def.element);
    for item in value.into_list() {
        match item {
            FieldValue::Map(data) => {
                let target = parent.append_child(Node::element(&def.namespace, &def.element));
                StanzaMut::new(registry, child, target).apply(data);
            }
            FieldValue::Stanza(stanza) if stanza.node().is(&def.namespace, &def.element) => {
                parent.append_child(stanza.into_node());
            }
            other => warn!(
                target: "jxt/field",
                "Skipping entry for '{}' that is not a data object: {other:?}", def.name
            ),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_leading_int_matches_lenient_parsing() {
        assert_eq!(leading_int("42"), Some(42));
        assert_eq!(leading_int(" -7 "), Some(-7));
        assert_eq!(leading_int("12abc"), Some(12));
        assert_eq!(leading_int("1.5"), Some(1));
        assert_eq!(leading_int("abc"), None);
        assert_eq!(leading_int(""), None);
    }

    #[test]
    fn test_scalar_reads_fall_back_to_defaults() {
        let default = FieldValue::from("normal");
        assert_eq!(
            read_scalar(None, ScalarKind::Str, Some(&default)),
            FieldValue::from("normal")
        );
        assert_eq!(read_scalar(None, ScalarKind::Str, None), FieldValue::from(""));
        assert_eq!(
            read_scalar(Some("NaN"), ScalarKind::Float, Some(&FieldValue::Float(1.0))),
            FieldValue::Float(1.0)
        );
        assert_eq!(read_scalar(Some("x"), ScalarKind::Int, None), FieldValue::None);
        assert_eq!(read_scalar(Some("1"), ScalarKind::Bool, None), FieldValue::Bool(true));
        assert_eq!(read_scalar(Some("yes"), ScalarKind::Bool, None), FieldValue::Bool(false));
        assert_eq!(read_scalar(Some("not a jid@"), ScalarKind::Jid, None), FieldValue::None);
        assert!(matches!(
            read_scalar(None, ScalarKind::Date { now: true }, None),
            FieldValue::Date(_)
        ));
    }

    #[test]
    fn test_truthiness() {
        assert!(is_truthy(&FieldValue::Bool(true)));
        assert!(is_truthy(&FieldValue::from("1")));
        assert!(!is_truthy(&FieldValue::from("false")));
        assert!(!is_truthy(&FieldValue::None));
        assert!(is_truthy(&FieldValue::map([("a", "b")])));
    }
}
