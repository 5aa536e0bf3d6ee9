use std::fmt;
use std::str::FromStr;

use thiserror::Error;

/// Maximum length in bytes of each JID part (RFC 7622 §3).
pub const MAX_PART_LEN: usize = 1023;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum JidError {
    #[error("Invalid JID format: {0}")]
    InvalidFormat(String),
    #[error("JID domain is empty")]
    EmptyDomain,
    #[error("JID {0} part is empty")]
    EmptyPart(&'static str),
    #[error("JID {0} part exceeds {MAX_PART_LEN} bytes")]
    PartTooLong(&'static str),
}

/// An XMPP address, `local@domain/resource`.
///
/// Only the structural rules are enforced; no stringprep/PRECIS
/// normalization is applied.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, PartialOrd, Ord)]
pub struct Jid {
    pub local: Option<String>,
    pub domain: String,
    pub resource: Option<String>,
}

impl Jid {
    pub fn new(local: &str, domain: &str) -> Self {
        Self {
            local: (!local.is_empty()).then(|| local.to_string()),
            domain: domain.to_string(),
            resource: None,
        }
    }

    pub fn domain(domain: &str) -> Self {
        Self::new("", domain)
    }

    pub fn full(local: &str, domain: &str, resource: &str) -> Self {
        Self::new(local, domain).with_resource(resource)
    }

    pub fn with_resource(mut self, resource: &str) -> Self {
        self.resource = (!resource.is_empty()).then(|| resource.to_string());
        self
    }

    /// The address without its resource part.
    pub fn bare(&self) -> Self {
        Self {
            local: self.local.clone(),
            domain: self.domain.clone(),
            resource: None,
        }
    }

    pub fn is_bare(&self) -> bool {
        self.resource.is_none()
    }

    pub fn is_domain(&self) -> bool {
        self.local.is_none() && self.resource.is_none()
    }

    pub fn is_empty(&self) -> bool {
        self.domain.is_empty()
    }

    pub fn is_same_bare_as(&self, other: &Jid) -> bool {
        self.local == other.local && self.domain.eq_ignore_ascii_case(&other.domain)
    }
}

fn check_part(part: &str, name: &'static str) -> Result<(), JidError> {
    if part.is_empty() {
        return Err(JidError::EmptyPart(name));
    }
    if part.len() > MAX_PART_LEN {
        return Err(JidError::PartTooLong(name));
    }
    Ok(())
}

impl FromStr for Jid {
    type Err = JidError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.chars().any(char::is_whitespace) {
            return Err(JidError::InvalidFormat(s.to_string()));
        }

        // The resource may itself contain '@' and '/', so split it off first.
        let (bare, resource) = match s.split_once('/') {
            Some((b, r)) => {
                check_part(r, "resource")?;
                (b, Some(r.to_string()))
            }
            None => (s, None),
        };

        let (local, domain) = match bare.split_once('@') {
            Some((l, d)) => {
                check_part(l, "local")?;
                (Some(l.to_string()), d)
            }
            None => (None, bare),
        };

        if domain.is_empty() {
            return Err(JidError::EmptyDomain);
        }
        if domain.contains('@') {
            return Err(JidError::InvalidFormat(s.to_string()));
        }
        check_part(domain, "domain")?;

        Ok(Jid {
            local,
            domain: domain.to_string(),
            resource,
        })
    }
}

impl fmt::Display for Jid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(local) = &self.local {
            write!(f, "{local}@")?;
        }
        write!(f, "{}", self.domain)?;
        if let Some(resource) = &self.resource {
            write!(f, "/{resource}")?;
        }
        Ok(())
    }
}

impl From<Jid> for String {
    fn from(jid: Jid) -> Self {
        jid.to_string()
    }
}

impl TryFrom<String> for Jid {
    type Error = JidError;
    fn try_from(value: String) -> Result<Self, Self::Error> {
        Jid::from_str(&value)
    }
}

impl TryFrom<&str> for Jid {
    type Error = JidError;
    fn try_from(value: &str) -> Result<Self, Self::Error> {
        Jid::from_str(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_full_jid() {
        let jid: Jid = "juliet@capulet.lit/balcony".parse().unwrap();
        assert_eq!(jid.local.as_deref(), Some("juliet"));
        assert_eq!(jid.domain, "capulet.lit");
        assert_eq!(jid.resource.as_deref(), Some("balcony"));
        assert_eq!(jid.to_string(), "juliet@capulet.lit/balcony");
        assert_eq!(jid.bare().to_string(), "juliet@capulet.lit");
    }

    #[test]
    fn test_resource_may_contain_separators() {
        let jid: Jid = "room@muc.lit/nick@home/phone".parse().unwrap();
        assert_eq!(jid.local.as_deref(), Some("room"));
        assert_eq!(jid.domain, "muc.lit");
        assert_eq!(jid.resource.as_deref(), Some("nick@home/phone"));
    }

    #[test]
    fn test_domain_only() {
        let jid: Jid = "capulet.lit".parse().unwrap();
        assert!(jid.is_domain());
        assert_eq!(jid, Jid::domain("capulet.lit"));
    }

    #[test]
    fn test_invalid_jids() {
        assert_eq!("".parse::<Jid>(), Err(JidError::EmptyDomain));
        assert_eq!("@capulet.lit".parse::<Jid>(), Err(JidError::EmptyPart("local")));
        assert_eq!(
            "juliet@capulet.lit/".parse::<Jid>(),
            Err(JidError::EmptyPart("resource"))
        );
        assert_eq!("juliet@".parse::<Jid>(), Err(JidError::EmptyDomain));
        assert!("a@b@c".parse::<Jid>().is_err());
        assert!("juliet @capulet.lit".parse::<Jid>().is_err());

        let long = format!("{}@capulet.lit", "a".repeat(MAX_PART_LEN + 1));
        assert_eq!(long.parse::<Jid>(), Err(JidError::PartTooLong("local")));
    }

    #[test]
    fn test_same_bare() {
        let a: Jid = "romeo@Montague.lit/orchard".parse().unwrap();
        let b: Jid = "romeo@montague.lit".parse().unwrap();
        assert!(a.is_same_bare_as(&b));
        assert!(!a.is_bare());
    }
}
