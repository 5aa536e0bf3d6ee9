use jxtcore_xml::XmlError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum RegistryError {
    #[error("definition name '{0}' is already registered")]
    DuplicateName(String),
    #[error("a definition for <{element} xmlns='{namespace}'> is already registered")]
    DuplicateElement { element: String, namespace: String },
    #[error("unknown definition '{0}'")]
    UnknownDefinition(String),
    #[error("plugin '{name}' failed: {reason}")]
    Plugin { name: String, reason: String },
    #[error("XML error: {0}")]
    Xml(#[from] XmlError),
}

impl Clone for RegistryError {
    fn clone(&self) -> Self {
        match self {
            Self::DuplicateName(name) => Self::DuplicateName(name.clone()),
            Self::DuplicateElement { element, namespace } => Self::DuplicateElement {
                element: element.clone(),
                namespace: namespace.clone(),
            },
            Self::UnknownDefinition(name) => Self::UnknownDefinition(name.clone()),
            Self::Plugin { name, reason } => Self::Plugin {
                name: name.clone(),
                reason: reason.clone(),
            },
            Self::Xml(e) => Self::Xml(e.clone()),
        }
    }
}

pub type Result<T, E = RegistryError> = std::result::Result<T, E>;
