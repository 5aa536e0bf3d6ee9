//! RFC 6121 roster get and set.

use anyhow::Result;
use jxtcore_xml::Jid;

use crate::iq::request::InfoQuery;
use crate::iq::spec::IqSpec;
use crate::protocol::XmppNode;
use crate::types::{Iq, RosterItem, RosterQuery, Subscription};

/// Fetches the roster. With `ver`, a server that supports versioning may
/// reply with an empty result meaning "unchanged".
#[derive(Debug, Default, Clone)]
pub struct GetRosterSpec {
    pub ver: Option<String>,
}

/// `None` when the cached roster at the requested version is still current.
pub type RosterResponse = Option<RosterQuery>;

impl IqSpec for GetRosterSpec {
    type Response = RosterResponse;

    fn build_iq(&self) -> InfoQuery {
        InfoQuery::get(
            RosterQuery {
                ver: self.ver.clone(),
                items: Vec::new(),
            }
            .into_node(),
        )
    }

    fn parse_response(&self, response: &Iq) -> Result<Self::Response> {
        response.payload_as::<RosterQuery>().transpose()
    }
}

/// Adds, updates or removes one roster item.
#[derive(Debug, Clone)]
pub struct UpdateRosterSpec {
    item: RosterItem,
}

impl UpdateRosterSpec {
    pub fn update(item: RosterItem) -> Self {
        Self { item }
    }

    pub fn remove(jid: Jid) -> Self {
        Self {
            item: RosterItem {
                subscription: Subscription::Remove.to_string(),
                ..RosterItem::new(jid)
            },
        }
    }
}

impl IqSpec for UpdateRosterSpec {
    type Response = ();

    fn build_iq(&self) -> InfoQuery {
        InfoQuery::set(
            RosterQuery {
                ver: None,
                items: vec![self.item.clone()],
            }
            .into_node(),
        )
    }

    fn parse_response(&self, _response: &Iq) -> Result<Self::Response> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::iq::spec::parse_reply;
    use crate::ns;
    use jxtcore_xml::unmarshal;

    #[test]
    fn test_get_roster_with_items() {
        let reply = unmarshal(
            "<iq xmlns='jabber:client' id='r1' type='result'>\
               <query xmlns='jabber:iq:roster' ver='v2'>\
                 <item jid='a@x.com' subscription='both'><group>Friends</group></item>\
               </query>\
             </iq>",
        )
        .unwrap();
        let roster = parse_reply(&GetRosterSpec::default(), "r1", &reply)
            .unwrap()
            .unwrap();
        assert_eq!(roster.ver.as_deref(), Some("v2"));
        assert_eq!(roster.items[0].subscription().unwrap(), Subscription::Both);
    }

    #[test]
    fn test_unchanged_roster_is_none() {
        let spec = GetRosterSpec {
            ver: Some("v2".to_string()),
        };
        assert_eq!(spec.build_iq().payload.attr("ver"), Some("v2"));
        let reply = unmarshal("<iq xmlns='jabber:client' id='r2' type='result'/>").unwrap();
        assert!(parse_reply(&spec, "r2", &reply).unwrap().is_none());
    }

    #[test]
    fn test_remove_item() {
        let query = UpdateRosterSpec::remove(Jid::new("a", "x.com")).build_iq();
        let item = query.payload.find_first(ns::ROSTER, "item").unwrap();
        assert_eq!(item.attr("subscription"), Some("remove"));
        assert_eq!(item.attr("jid"), Some("a@x.com"));
    }
}
