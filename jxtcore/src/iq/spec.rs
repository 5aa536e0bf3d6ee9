use jxtcore_xml::Node;

use crate::iq::request::{InfoQuery, IqError};
use crate::protocol::XmppNode;
use crate::types::{Iq, IqType};

/// A reusable IQ specification that pairs a request builder with a response parser.
///
/// This keeps protocol-level IQ logic in the library, while sending,
/// retries and timeouts stay with whoever owns the connection.
pub trait IqSpec {
    /// The output type produced by parsing the IQ response.
    type Response;

    /// Build the IQ stanza for this spec.
    fn build_iq(&self) -> InfoQuery;

    /// Parse a `result` IQ into the typed response.
    fn parse_response(&self, response: &Iq) -> Result<Self::Response, anyhow::Error>;
}

/// Parses a reply to the request `request_id` and hands it to `spec`.
/// Error replies become [`IqError::Stanza`].
pub fn parse_reply<S: IqSpec>(
    spec: &S,
    request_id: &str,
    reply: &Node,
) -> Result<S::Response, anyhow::Error> {
    let iq = Iq::try_from_node(reply)?;
    if iq.id != request_id {
        return Err(IqError::MismatchedId {
            expected: request_id.to_string(),
            got: iq.id,
        }
        .into());
    }
    match iq.iq_type {
        IqType::Result => spec.parse_response(&iq),
        IqType::Error => Err(IqError::Stanza(iq.error.unwrap_or_default()).into()),
        other => Err(IqError::NotAReply(other).into()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::iq::ping::PingSpec;
    use crate::types::StanzaError;
    use jxtcore_xml::unmarshal;

    #[test]
    fn test_error_reply_is_surfaced() {
        let reply = unmarshal(
            "<iq xmlns='jabber:client' id='p1' type='error'>\
               <error type='cancel'><feature-not-implemented xmlns='urn:ietf:params:xml:ns:xmpp-stanzas'/></error>\
             </iq>",
        )
        .unwrap();
        let err = parse_reply(&PingSpec::default(), "p1", &reply).unwrap_err();
        match err.downcast_ref::<IqError>() {
            Some(IqError::Stanza(StanzaError { condition, .. })) => {
                assert_eq!(condition, "feature-not-implemented");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_mismatched_id_and_request_type_are_rejected() {
        let reply = unmarshal("<iq xmlns='jabber:client' id='p2' type='result'/>").unwrap();
        assert!(parse_reply(&PingSpec::default(), "p1", &reply).is_err());
        assert!(parse_reply(&PingSpec::default(), "p2", &reply).is_ok());

        let request = unmarshal("<iq xmlns='jabber:client' id='p3' type='get'/>").unwrap();
        let err = parse_reply(&PingSpec::default(), "p3", &request).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<IqError>(),
            Some(IqError::NotAReply(IqType::Get))
        ));
    }
}
