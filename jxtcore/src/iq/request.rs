use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use jxtcore_xml::{Jid, Node};
use rand::RngCore;
use thiserror::Error;

use crate::StringEnum;
use crate::types::{Iq, IqType, StanzaError};

/// The two request types an IQ can be sent with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, StringEnum)]
pub enum InfoQueryType {
    #[str = "set"]
    Set,
    #[str = "get"]
    Get,
}

impl From<InfoQueryType> for IqType {
    fn from(value: InfoQueryType) -> Self {
        match value {
            InfoQueryType::Get => IqType::Get,
            InfoQueryType::Set => IqType::Set,
        }
    }
}

#[derive(Debug, Clone)]
pub struct InfoQuery {
    pub query_type: InfoQueryType,
    /// `None` addresses the user's own server.
    pub to: Option<Jid>,
    pub id: Option<String>,
    pub payload: Node,
}

impl InfoQuery {
    pub fn get(payload: Node) -> Self {
        Self {
            query_type: InfoQueryType::Get,
            to: None,
            id: None,
            payload,
        }
    }

    pub fn set(payload: Node) -> Self {
        Self {
            query_type: InfoQueryType::Set,
            ..Self::get(payload)
        }
    }

    pub fn with_to(mut self, to: Jid) -> Self {
        self.to = Some(to);
        self
    }

    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }

    /// Builds the stanza, taking a fresh id from `ids` unless one was set.
    pub fn into_iq(self, ids: &RequestIds) -> Iq {
        Iq {
            id: self.id.unwrap_or_else(|| ids.next_id()),
            from: None,
            to: self.to,
            iq_type: self.query_type.into(),
            payload: Some(self.payload),
            error: None,
        }
    }
}

#[derive(Debug, Error)]
pub enum IqError {
    #[error("Reply id '{got}' does not match request '{expected}'")]
    MismatchedId { expected: String, got: String },
    #[error("Expected a result or error reply, got type '{0}'")]
    NotAReply(IqType),
    #[error("Received a stanza error: {} ({})", .0.condition, .0.error_type)]
    Stanza(StanzaError),
}

/// Issues request ids of the form `<random prefix>-<counter>`.
#[derive(Debug, Clone)]
pub struct RequestIds {
    prefix: String,
    counter: Arc<AtomicU64>,
}

impl Default for RequestIds {
    fn default() -> Self {
        Self::new()
    }
}

impl RequestIds {
    pub fn new() -> Self {
        let mut bytes = [0u8; 4];
        rand::rng().fill_bytes(&mut bytes);
        Self::with_prefix(hex::encode(bytes))
    }

    pub fn with_prefix(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
            counter: Arc::new(AtomicU64::new(0)),
        }
    }

    pub fn next_id(&self) -> String {
        let count = self.counter.fetch_add(1, Ordering::Relaxed);
        format!("{}-{count}", self.prefix)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ns;

    #[test]
    fn test_ids_are_sequential_and_shared_between_clones() {
        let ids = RequestIds::with_prefix("abc");
        let clone = ids.clone();
        assert_eq!(ids.next_id(), "abc-0");
        assert_eq!(clone.next_id(), "abc-1");

        let random = RequestIds::new();
        let id = random.next_id();
        assert_eq!(id.len(), "00000000-0".len());
        assert!(id.ends_with("-0"));
    }

    #[test]
    fn test_into_iq_keeps_explicit_id() {
        let ids = RequestIds::with_prefix("x");
        let iq = InfoQuery::set(Node::element(ns::PING, "ping"))
            .with_id("mine")
            .into_iq(&ids);
        assert_eq!(iq.id, "mine");
        assert_eq!(iq.iq_type, IqType::Set);
        assert_eq!(ids.next_id(), "x-0");
    }
}
