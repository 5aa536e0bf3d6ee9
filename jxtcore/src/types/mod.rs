//! Compile-time typed stanzas.
//!
//! These types read and write the same element trees as the registry but
//! never consult one: the shape of each element is fixed by its Rust type.
//! Open-ended slots are closed enums with an `Unknown(Node)` arm, and any
//! child a type does not model is kept verbatim in `payloads`.

use anyhow::{Result, anyhow};
use jxtcore_xml::Node;

use crate::ns;
use crate::protocol::Payload;

mod delay;
mod iq;
mod jingle;
mod markers;
mod message;
mod presence;
mod roster;
mod rsm;
mod stanza_error;

pub use delay::{Carbon, Delay, Forwarded};
pub use iq::{Iq, IqType};
pub use jingle::{
    Application, Content, IbbTransport, Jingle, JingleAction, PayloadType, Rtp, Transport,
};
pub use markers::{Attention, CarbonsDisable, CarbonsEnable, CarbonsPrivate, Replace};
pub use message::{ChatState, Message, MessageType};
pub use presence::{Presence, PresenceType, Show};
pub use roster::{RosterItem, RosterQuery, Subscription};
pub use rsm::RsmSet;
pub use stanza_error::{ErrorType, StanzaError};

/// Checks a top-level stanza's qualified name. Unqualified elements are taken
/// as `jabber:client`.
pub(crate) fn expect_stanza(node: &Node, tag: &str) -> Result<()> {
    if node.tag == tag && (node.ns.is_empty() || node.ns == ns::CLIENT) {
        return Ok(());
    }
    Err(anyhow!(
        "expected <{tag} xmlns='{}'>, got <{} xmlns='{}'>",
        ns::CLIENT,
        node.tag,
        node.ns
    ))
}

pub(crate) fn child_text(node: &Node, ns: &str, tag: &str) -> Option<String> {
    node.find_first(ns, tag).map(|c| c.text().to_string())
}

pub(crate) fn push_text_child(parent: &mut Node, ns: &str, tag: &str, text: Option<String>) {
    if let Some(text) = text {
        parent.append_child(Node::element(ns, tag)).set_text(text);
    }
}

/// Stanzas that carry arbitrary namespaced payloads next to their own fields.
pub trait Extensible {
    fn payloads(&self) -> &[Node];

    fn payloads_mut(&mut self) -> &mut Vec<Node>;

    /// Parses the first payload with `T`'s qualified name.
    fn payload<T: Payload>(&self) -> Option<Result<T>> {
        self.payloads()
            .iter()
            .find(|n| n.is(T::NAMESPACE, T::TAG))
            .map(T::try_from_node)
    }

    /// Replaces any payload with `T`'s qualified name.
    fn set_payload<T: Payload>(&mut self, payload: T) {
        self.remove_payload::<T>();
        self.payloads_mut().push(payload.into_node());
    }

    fn remove_payload<T: Payload>(&mut self) -> bool {
        let payloads = self.payloads_mut();
        let before = payloads.len();
        payloads.retain(|n| !n.is(T::NAMESPACE, T::TAG));
        payloads.len() != before
    }
}
