//! XML namespace URIs used by the stock plugins.

pub const XML: &str = "http://www.w3.org/XML/1998/namespace";

pub const CLIENT: &str = "jabber:client";
pub const SERVER: &str = "jabber:server";
pub const COMPONENT: &str = "jabber:component:accept";

/// The three top-level stanza namespaces, with the name prefix used for their
/// definitions (`message`, `serverMessage`, `componentMessage`, ...).
pub const STANZA_NAMESPACES: [(&str, &str); 3] =
    [("", CLIENT), ("server", SERVER), ("component", COMPONENT)];

pub const STANZA_ERROR: &str = "urn:ietf:params:xml:ns:xmpp-stanzas";

pub const ROSTER: &str = "jabber:iq:roster";
pub const BLOCKING: &str = "urn:xmpp:blocking";
pub const PING: &str = "urn:xmpp:ping";
pub const DELAY: &str = "urn:xmpp:delay";
pub const FORWARD_0: &str = "urn:xmpp:forward:0";
pub const CARBONS_2: &str = "urn:xmpp:carbons:2";
pub const RECEIPTS: &str = "urn:xmpp:receipts";
pub const CHAT_STATES: &str = "http://jabber.org/protocol/chatstates";
pub const ATTENTION_0: &str = "urn:xmpp:attention:0";
pub const CORRECTION_0: &str = "urn:xmpp:message-correct:0";
pub const RSM: &str = "http://jabber.org/protocol/rsm";
pub const MAM_2: &str = "urn:xmpp:mam:2";
pub const MUC: &str = "http://jabber.org/protocol/muc";
pub const MUC_USER: &str = "http://jabber.org/protocol/muc#user";
pub const DATAFORM: &str = "jabber:x:data";
pub const JINGLE_1: &str = "urn:xmpp:jingle:1";
pub const JINGLE_ERRORS_1: &str = "urn:xmpp:jingle:errors:1";
pub const JINGLE_RTP_1: &str = "urn:xmpp:jingle:apps:rtp:1";
pub const JINGLE_RTP_RTCP_FB_0: &str = "urn:xmpp:jingle:apps:rtp:rtcp-fb:0";
pub const JINGLE_RTP_SSMA_0: &str = "urn:xmpp:jingle:apps:rtp:ssma:0";
pub const JINGLE_GROUPING_0: &str = "urn:xmpp:jingle:apps:grouping:0";
pub const JINGLE_IBB_1: &str = "urn:xmpp:jingle:transports:ibb:1";
pub const IBB: &str = "http://jabber.org/protocol/ibb";
pub const VCARD_TEMP: &str = "vcard-temp";
pub const BOB: &str = "urn:xmpp:bob";
