use std::collections::BTreeMap;

use base64::Engine as _;
use base64::engine::general_purpose::STANDARD;
use chrono::{DateTime, SecondsFormat, Utc};
use jxtcore_xml::Jid;
use serde_json::Value as Json;

use crate::stanza::Stanza;

/// A dynamic value read from or written to a stanza field.
///
/// Reads never fail: a field with nothing to report yields its documented
/// empty value (`None`, an empty string, `false`, or an empty list).
#[derive(Debug, Clone, PartialEq, Default)]
pub enum FieldValue {
    #[default]
    None,
    Str(String),
    Bool(bool),
    Int(i64),
    Float(f64),
    Date(DateTime<Utc>),
    Jid(Jid),
    Bytes(Vec<u8>),
    List(Vec<FieldValue>),
    /// Language tag to text, as produced by language-tagged sub-elements.
    LangMap(BTreeMap<String, String>),
    /// A data object, used to construct extensions and composite values.
    Map(BTreeMap<String, FieldValue>),
    Stanza(Box<Stanza>),
}

/// Formats a timestamp the way stanzas carry it: RFC 3339, UTC, millisecond precision.
pub fn format_date(date: &DateTime<Utc>) -> String {
    date.to_rfc3339_opts(SecondsFormat::Millis, true)
}

pub fn parse_date(value: &str) -> Option<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(value.trim())
        .ok()
        .map(|d| d.with_timezone(&Utc))
}

impl FieldValue {
    /// Convenience for building a data object from key/value pairs.
    pub fn map<K, V, I>(entries: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<FieldValue>,
    {
        Self::Map(
            entries
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        )
    }

    pub fn is_none(&self) -> bool {
        matches!(self, Self::None)
    }

    /// True for values that carry nothing: `None`, `""`, `false`, and empty
    /// collections.
    pub fn is_empty(&self) -> bool {
        match self {
            Self::None => true,
            Self::Str(s) => s.is_empty(),
            Self::Bool(b) => !b,
            Self::Bytes(b) => b.is_empty(),
            Self::List(l) => l.is_empty(),
            Self::LangMap(m) => m.is_empty(),
            Self::Map(m) => m.is_empty(),
            Self::Int(_) | Self::Float(_) | Self::Date(_) | Self::Jid(_) | Self::Stanza(_) => false,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::Str(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_int(&self) -> Option<i64> {
        match self {
            Self::Int(i) => Some(*i),
            _ => None,
        }
    }

    pub fn as_float(&self) -> Option<f64> {
        match self {
            Self::Float(f) => Some(*f),
            Self::Int(i) => Some(*i as f64),
            _ => None,
        }
    }

    pub fn as_date(&self) -> Option<&DateTime<Utc>> {
        match self {
            Self::Date(d) => Some(d),
            _ => None,
        }
    }

    pub fn as_jid(&self) -> Option<&Jid> {
        match self {
            Self::Jid(j) => Some(j),
            _ => None,
        }
    }

    pub fn as_bytes(&self) -> Option<&[u8]> {
        match self {
            Self::Bytes(b) => Some(b),
            _ => None,
        }
    }

    pub fn as_list(&self) -> Option<&[FieldValue]> {
        match self {
            Self::List(l) => Some(l),
            _ => None,
        }
    }

    pub fn as_lang_map(&self) -> Option<&BTreeMap<String, String>> {
        match self {
            Self::LangMap(m) => Some(m),
            _ => None,
        }
    }

    pub fn as_map(&self) -> Option<&BTreeMap<String, FieldValue>> {
        match self {
            Self::Map(m) => Some(m),
            _ => None,
        }
    }

    pub fn as_stanza(&self) -> Option<&Stanza> {
        match self {
            Self::Stanza(s) => Some(s),
            _ => None,
        }
    }

    pub fn into_list(self) -> Vec<FieldValue> {
        match self {
            Self::List(l) => l,
            Self::None => Vec::new(),
            other => vec![other],
        }
    }

    /// Looks up a key of a data object.
    pub fn get(&self, key: &str) -> Option<&FieldValue> {
        self.as_map().and_then(|m| m.get(key))
    }

    /// Renders a scalar as the text it would occupy in XML. Collections and
    /// stanzas have no text form.
    pub fn to_text(&self) -> Option<String> {
        match self {
            Self::Str(s) => Some(s.clone()),
            Self::Bool(b) => Some(b.to_string()),
            Self::Int(i) => Some(i.to_string()),
            Self::Float(f) if f.is_finite() => Some(f.to_string()),
            Self::Date(d) => Some(format_date(d)),
            Self::Jid(j) => Some(j.to_string()),
            _ => None,
        }
    }

    pub fn to_json(&self) -> Json {
        match self {
            Self::None => Json::Null,
            Self::Str(s) => Json::String(s.clone()),
            Self::Bool(b) => Json::Bool(*b),
            Self::Int(i) => Json::from(*i),
            Self::Float(f) => serde_json::Number::from_f64(*f)
                .map(Json::Number)
                .unwrap_or(Json::Null),
            Self::Date(d) => Json::String(format_date(d)),
            Self::Jid(j) => Json::String(j.to_string()),
            Self::Bytes(b) => Json::String(STANDARD.encode(b)),
            Self::List(l) => Json::Array(l.iter().map(FieldValue::to_json).collect()),
            Self::LangMap(m) => Json::Object(
                m.iter()
                    .map(|(k, v)| (k.clone(), Json::String(v.clone())))
                    .collect(),
            ),
            Self::Map(m) => Json::Object(m.iter().map(|(k, v)| (k.clone(), v.to_json())).collect()),
            Self::Stanza(s) => s.to_json(),
        }
    }
}

impl From<&str> for FieldValue {
    fn from(value: &str) -> Self {
        Self::Str(value.to_string())
    }
}

impl From<String> for FieldValue {
    fn from(value: String) -> Self {
        Self::Str(value)
    }
}

impl From<bool> for FieldValue {
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}

impl From<i64> for FieldValue {
    fn from(value: i64) -> Self {
        Self::Int(value)
    }
}

impl From<i32> for FieldValue {
    fn from(value: i32) -> Self {
        Self::Int(value.into())
    }
}

impl From<u32> for FieldValue {
    fn from(value: u32) -> Self {
        Self::Int(value.into())
    }
}

impl From<f64> for FieldValue {
    fn from(value: f64) -> Self {
        Self::Float(value)
    }
}

impl From<DateTime<Utc>> for FieldValue {
    fn from(value: DateTime<Utc>) -> Self {
        Self::Date(value)
    }
}

impl From<Jid> for FieldValue {
    fn from(value: Jid) -> Self {
        Self::Jid(value)
    }
}

impl From<Vec<u8>> for FieldValue {
    fn from(value: Vec<u8>) -> Self {
        Self::Bytes(value)
    }
}

impl From<Vec<FieldValue>> for FieldValue {
    fn from(value: Vec<FieldValue>) -> Self {
        Self::List(value)
    }
}

impl From<Vec<String>> for FieldValue {
    fn from(value: Vec<String>) -> Self {
        Self::List(value.into_iter().map(Self::Str).collect())
    }
}

impl From<Vec<&str>> for FieldValue {
    fn from(value: Vec<&str>) -> Self {
        Self::List(value.into_iter().map(Self::from).collect())
    }
}

impl From<BTreeMap<String, FieldValue>> for FieldValue {
    fn from(value: BTreeMap<String, FieldValue>) -> Self {
        Self::Map(value)
    }
}

impl From<BTreeMap<String, String>> for FieldValue {
    fn from(value: BTreeMap<String, String>) -> Self {
        Self::LangMap(value)
    }
}

impl From<Stanza> for FieldValue {
    fn from(value: Stanza) -> Self {
        Self::Stanza(Box::new(value))
    }
}

impl<T: Into<FieldValue>> From<Option<T>> for FieldValue {
    fn from(value: Option<T>) -> Self {
        value.map_or(Self::None, Into::into)
    }
}

/// Generic JSON coercion. Fields refine the result when they are written:
/// a string lands in a JID attribute as a JID, in a date field as a date.
impl From<Json> for FieldValue {
    fn from(value: Json) -> Self {
        match value {
            Json::Null => Self::None,
            Json::Bool(b) => Self::Bool(b),
            Json::Number(n) => match n.as_i64() {
                Some(i) => Self::Int(i),
                None => Self::Float(n.as_f64().unwrap_or(f64::NAN)),
            },
            Json::String(s) => Self::Str(s),
            Json::Array(items) => Self::List(items.into_iter().map(Self::from).collect()),
            Json::Object(entries) => {
                Self::Map(entries.into_iter().map(|(k, v)| (k, Self::from(v))).collect())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_emptiness_matches_json_view_rules() {
        assert!(FieldValue::None.is_empty());
        assert!(FieldValue::from("").is_empty());
        assert!(FieldValue::from(false).is_empty());
        assert!(FieldValue::List(vec![]).is_empty());
        assert!(!FieldValue::from(0i64).is_empty());
        assert!(!FieldValue::from("x").is_empty());
    }

    #[test]
    fn test_json_coercion() {
        let value = FieldValue::from(json!({
            "jid": "a@x.com",
            "groups": ["Friends"],
            "priority": 5,
            "weight": 0.5,
            "approved": true,
            "nothing": null
        }));

        assert_eq!(value.get("jid"), Some(&FieldValue::from("a@x.com")));
        assert_eq!(
            value.get("groups").and_then(FieldValue::as_list),
            Some(&[FieldValue::from("Friends")][..])
        );
        assert_eq!(value.get("priority").and_then(FieldValue::as_int), Some(5));
        assert_eq!(value.get("weight").and_then(FieldValue::as_float), Some(0.5));
        assert_eq!(value.get("approved").and_then(FieldValue::as_bool), Some(true));
        assert!(value.get("nothing").unwrap().is_none());
    }

    #[test]
    fn test_dates_use_millisecond_rfc3339() {
        let date = parse_date("2002-09-10T23:08:25Z").unwrap();
        assert_eq!(format_date(&date), "2002-09-10T23:08:25.000Z");
        assert_eq!(
            FieldValue::from(date).to_json(),
            json!("2002-09-10T23:08:25.000Z")
        );
        assert!(parse_date("yesterday").is_none());
    }

    #[test]
    fn test_to_text_for_scalars() {
        assert_eq!(FieldValue::from(42i64).to_text().as_deref(), Some("42"));
        assert_eq!(FieldValue::from(1.5).to_text().as_deref(), Some("1.5"));
        assert_eq!(FieldValue::from(true).to_text().as_deref(), Some("true"));
        assert_eq!(FieldValue::from(f64::NAN).to_text(), None);
        assert_eq!(FieldValue::List(vec![]).to_text(), None);
    }
}
