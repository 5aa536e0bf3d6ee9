//! Small fixed-shape payloads that ride along on messages and IQs.

use crate::ns;

crate::define_simple_node! {
    /// XEP-0308 last message correction.
    /// Wire format: `<replace xmlns="urn:xmpp:message-correct:0" id="..."/>`
    pub struct Replace("replace", ns::CORRECTION_0) {
        #[attr("id")]
        /// Id of the message being corrected.
        pub id: String,
    }
}

crate::define_empty_node!(
    /// XEP-0224 attention request.
    pub struct Attention("attention", ns::ATTENTION_0)
);

crate::define_empty_node!(
    /// Asks the server not to copy this message to other resources.
    pub struct CarbonsPrivate("private", ns::CARBONS_2)
);

crate::define_empty_node!(
    pub struct CarbonsEnable("enable", ns::CARBONS_2)
);

crate::define_empty_node!(
    pub struct CarbonsDisable("disable", ns::CARBONS_2)
);

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{Extensible, Message};
    use crate::XmppNode;
    use jxtcore_xml::Jid;

    #[test]
    fn test_correction_on_message() {
        let mut message = Message::chat(Jid::new("b", "x.com"), "fixed text");
        message.set_payload(Replace {
            id: "m1".to_string(),
        });
        message.set_payload(Attention);
        message.set_payload(Replace {
            id: "m2".to_string(),
        });

        let parsed = Message::try_from_node(&message.into_node()).unwrap();
        assert_eq!(parsed.payload::<Replace>().unwrap().unwrap().id, "m2");
        assert!(parsed.payload::<Attention>().is_some());
        assert!(parsed.payload::<CarbonsPrivate>().is_none());
        assert_eq!(parsed.payloads().len(), 2);
    }
}
