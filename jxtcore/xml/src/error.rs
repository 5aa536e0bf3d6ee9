use crate::jid::JidError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum XmlError {
    #[error("XML syntax error: {0}")]
    Syntax(String),
    #[error("Invalid attribute: {0}")]
    InvalidAttr(String),
    #[error("Data is not valid UTF-8: {0}")]
    InvalidUtf8(#[from] std::str::Utf8Error),
    #[error("Unbound namespace prefix: {0}")]
    UnknownPrefix(String),
    #[error("Reached end of document unexpectedly")]
    Eof,
    #[error("Received empty document where an element was expected")]
    EmptyData,
    #[error("Trailing content after root element: {0}")]
    LeftoverData(String),
    #[error("Attribute parsing failed: {0}")]
    AttrParse(String),
    #[error("Missing required attribute: {0}")]
    MissingAttr(String),
    #[error("JID parsing error: {0}")]
    Jid(#[from] JidError),
    #[error("Multiple attribute parsing errors: {0:?}")]
    AttrList(Vec<XmlError>),
}

impl From<quick_xml::Error> for XmlError {
    fn from(err: quick_xml::Error) -> Self {
        XmlError::Syntax(err.to_string())
    }
}

// Manual Clone since Utf8Error is the only wrapped foreign type.
impl Clone for XmlError {
    fn clone(&self) -> Self {
        match self {
            XmlError::Syntax(s) => XmlError::Syntax(s.clone()),
            XmlError::InvalidAttr(s) => XmlError::InvalidAttr(s.clone()),
            XmlError::InvalidUtf8(e) => XmlError::InvalidUtf8(*e),
            XmlError::UnknownPrefix(s) => XmlError::UnknownPrefix(s.clone()),
            XmlError::Eof => XmlError::Eof,
            XmlError::EmptyData => XmlError::EmptyData,
            XmlError::LeftoverData(s) => XmlError::LeftoverData(s.clone()),
            XmlError::AttrParse(s) => XmlError::AttrParse(s.clone()),
            XmlError::MissingAttr(s) => XmlError::MissingAttr(s.clone()),
            XmlError::Jid(e) => XmlError::Jid(e.clone()),
            XmlError::AttrList(list) => XmlError::AttrList(list.clone()),
        }
    }
}

pub type Result<T> = std::result::Result<T, XmlError>;
