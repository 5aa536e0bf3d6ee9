use std::str::FromStr;

use chrono::{DateTime, Utc};

use crate::error::{Result, XmlError};
use crate::jid::Jid;
use crate::node::{Attrs, Node};

/// Accumulating attribute reader. Lookups that fail to parse push an error
/// instead of returning early; call [`AttrParser::finish`] to surface them.
pub struct AttrParser<'a> {
    pub attrs: &'a Attrs,
    pub errors: Vec<XmlError>,
}

impl<'a> AttrParser<'a> {
    pub fn new(node: &'a Node) -> Self {
        Self {
            attrs: &node.attrs,
            errors: Vec::new(),
        }
    }

    pub fn ok(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn finish(&self) -> Result<()> {
        if self.ok() {
            Ok(())
        } else {
            Err(XmlError::AttrList(self.errors.clone()))
        }
    }

    fn get_raw(&mut self, key: &str, require: bool) -> Option<&'a str> {
        let val = self.attrs.get(key);
        if require && val.is_none() {
            self.errors.push(XmlError::AttrParse(format!(
                "Required attribute '{key}' not found"
            )));
        }
        val
    }

    // --- String ---
    pub fn optional_string(&mut self, key: &str) -> Option<&'a str> {
        self.get_raw(key, false)
    }

    /// Get a required string attribute, returning an error if missing.
    pub fn required_string(&mut self, key: &str) -> Result<&'a str> {
        self.optional_string(key)
            .ok_or_else(|| XmlError::MissingAttr(key.to_string()))
    }

    /// Get string, defaulting to empty string if missing. A missing value
    /// is still recorded as an error.
    pub fn string(&mut self, key: &str) -> String {
        self.get_raw(key, true).unwrap_or_default().to_string()
    }

    // --- JID ---
    pub fn optional_jid(&mut self, key: &str) -> Option<Jid> {
        let s = self.get_raw(key, false)?;
        match Jid::from_str(s) {
            Ok(jid) => Some(jid),
            Err(e) => {
                self.errors.push(XmlError::from(e));
                None
            }
        }
    }

    pub fn jid(&mut self, key: &str) -> Jid {
        self.get_raw(key, true);
        self.optional_jid(key).unwrap_or_default()
    }

    // --- Boolean ---
    // XML Schema booleans: "true"/"1" and "false"/"0".
    fn get_bool(&mut self, key: &str, require: bool) -> Option<bool> {
        self.get_raw(key, require).and_then(|s| match s {
            "true" | "1" => Some(true),
            "false" | "0" => Some(false),
            other => {
                self.errors.push(XmlError::AttrParse(format!(
                    "Failed to parse bool from '{other}' for key '{key}'"
                )));
                None
            }
        })
    }

    pub fn optional_bool(&mut self, key: &str) -> bool {
        self.get_bool(key, false).unwrap_or(false)
    }

    pub fn bool(&mut self, key: &str) -> bool {
        self.get_bool(key, true).unwrap_or(false)
    }

    // --- Numbers ---
    pub fn optional_u64(&mut self, key: &str) -> Option<u64> {
        self.get_parsed(key, "u64")
    }

    pub fn optional_i64(&mut self, key: &str) -> Option<i64> {
        self.get_parsed(key, "i64")
    }

    pub fn optional_u32(&mut self, key: &str) -> Option<u32> {
        self.get_parsed(key, "u32")
    }

    fn get_parsed<T>(&mut self, key: &str, type_name: &str) -> Option<T>
    where
        T: FromStr,
        T::Err: std::fmt::Display,
    {
        self.get_raw(key, false).and_then(|s| match s.parse::<T>() {
            Ok(val) => Some(val),
            Err(e) => {
                self.errors.push(XmlError::AttrParse(format!(
                    "Failed to parse {type_name} from '{s}' for key '{key}': {e}"
                )));
                None
            }
        })
    }

    // --- Timestamps ---
    /// XEP-0082 date-time, e.g. `2002-09-10T23:08:25Z`.
    pub fn optional_datetime(&mut self, key: &str) -> Option<DateTime<Utc>> {
        self.get_raw(key, false)
            .and_then(|s| match DateTime::parse_from_rfc3339(s) {
                Ok(dt) => Some(dt.with_timezone(&Utc)),
                Err(e) => {
                    self.errors.push(XmlError::AttrParse(format!(
                        "Failed to parse timestamp from '{s}' for key '{key}': {e}"
                    )));
                    None
                }
            })
    }
}

#[cfg(test)]
mod tests {
    use crate::builder::NodeBuilder;

    #[test]
    fn test_attr_parser_collects_errors() {
        let node = NodeBuilder::new("item")
            .attr("jid", "@bad")
            .attr("approved", "maybe")
            .attr("seq", "12")
            .build();

        let mut attrs = node.attrs();
        assert_eq!(attrs.optional_jid("jid"), None);
        assert!(!attrs.optional_bool("approved"));
        assert_eq!(attrs.optional_u64("seq"), Some(12));
        assert_eq!(attrs.errors.len(), 2);
        assert!(attrs.finish().is_err());
    }

    #[test]
    fn test_required_string() {
        let node = NodeBuilder::new("item").attr("name", "Juliet").build();
        let mut attrs = node.attrs();
        assert_eq!(attrs.required_string("name").unwrap(), "Juliet");
        assert!(attrs.required_string("missing").is_err());
        assert!(attrs.ok());
    }

    #[test]
    fn test_optional_datetime() {
        let node = NodeBuilder::new("delay")
            .attr("stamp", "2002-09-10T23:08:25Z")
            .build();
        let stamp = node.attrs().optional_datetime("stamp").unwrap();
        assert_eq!(stamp.timestamp(), 1031699305);
    }
}
