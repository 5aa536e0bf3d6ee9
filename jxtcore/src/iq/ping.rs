//! XEP-0199 ping.

use anyhow::Result;
use jxtcore_xml::Jid;

use crate::EmptyNode;
use crate::iq::request::InfoQuery;
use crate::iq::spec::IqSpec;
use crate::protocol::XmppNode;
use crate::types::Iq;

/// Wire format: `<ping xmlns="urn:xmpp:ping"/>`
#[derive(Debug, Clone, Copy, PartialEq, Eq, EmptyNode)]
#[xmpp(tag = "ping", ns = "urn:xmpp:ping")]
pub struct Ping;

/// Pings an entity, or the user's server when `to` is empty.
#[derive(Debug, Default, Clone)]
pub struct PingSpec {
    pub to: Option<Jid>,
}

impl PingSpec {
    pub fn to(jid: Jid) -> Self {
        Self { to: Some(jid) }
    }
}

impl IqSpec for PingSpec {
    type Response = ();

    fn build_iq(&self) -> InfoQuery {
        let query = InfoQuery::get(Ping.into_node());
        match &self.to {
            Some(to) => query.with_to(to.clone()),
            None => query,
        }
    }

    fn parse_response(&self, _response: &Iq) -> Result<Self::Response> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::iq::request::{InfoQueryType, RequestIds};
    use crate::ns;

    #[test]
    fn test_ping_request() {
        let spec = PingSpec::to(Jid::domain("x.com"));
        let query = spec.build_iq();
        assert_eq!(query.query_type, InfoQueryType::Get);
        assert!(query.payload.is(ns::PING, "ping"));

        let iq = query.into_iq(&RequestIds::with_prefix("p"));
        assert_eq!(iq.to, Some(Jid::domain("x.com")));
        assert!(iq.payload_as::<Ping>().unwrap().is_ok());
    }
}
