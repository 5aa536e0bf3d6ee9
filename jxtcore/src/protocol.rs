use anyhow::Result;
use jxtcore_xml::node::Node;

/// A type that maps to one namespaced XMPP element.
pub trait XmppNode: Sized {
    /// The element's local name (e.g., "item", "delay").
    fn tag(&self) -> &'static str;

    /// The element's namespace URI.
    fn namespace(&self) -> &'static str;

    /// Convert the struct into an element.
    fn into_node(self) -> Node;

    /// Parse an element into the struct.
    fn try_from_node(node: &Node) -> Result<Self>;
}

/// Elements whose qualified name is known without an instance. Lets typed
/// stanzas look a payload up before parsing it.
pub trait Payload: XmppNode {
    const TAG: &'static str;
    const NAMESPACE: &'static str;

    fn find_in(parent: &Node) -> Option<Result<Self>> {
        parent
            .find_first(Self::NAMESPACE, Self::TAG)
            .map(Self::try_from_node)
    }
}

/// Macro for defining simple elements with only attributes (no children).
///
/// This macro generates a struct with the specified fields as attributes,
/// and implements the `XmppNode` and `Payload` traits for it. Each field
/// starts with its `#[attr(..)]`; doc comments and other attributes follow it.
///
/// # Example
///
/// ```ignore
/// define_simple_node! {
///     /// A stanza receipt.
///     /// Wire format: `<received xmlns="urn:xmpp:receipts" id="..."/>`
///     pub struct Received("received", "urn:xmpp:receipts") {
///         #[attr("id")]
///         pub id: String,
///     }
/// }
/// ```
#[macro_export]
macro_rules! define_simple_node {
    (
        $(#[$meta:meta])*
        $vis:vis struct $name:ident($tag:literal, $ns:expr) {
            $(
                #[attr($attr_name:literal)]
                $(#[$field_meta:meta])*
                $field_vis:vis $field:ident : $field_type:ty $(= $default:expr)?
            ),* $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq)]
        $vis struct $name {
            $(
                $(#[$field_meta])*
                $field_vis $field: $field_type,
            )*
        }

        impl Default for $name {
            fn default() -> Self {
                Self {
                    $(
                        $field: $crate::define_simple_node!(@default $($default)?),
                    )*
                }
            }
        }

        impl $crate::protocol::XmppNode for $name {
            fn tag(&self) -> &'static str {
                $tag
            }

            fn namespace(&self) -> &'static str {
                $ns
            }

            fn into_node(self) -> $crate::xml::node::Node {
                $crate::xml::builder::NodeBuilder::new($tag)
                    .ns($ns)
                    $(.attr($attr_name, self.$field.to_string()))*
                    .build()
            }

            fn try_from_node(node: &$crate::xml::node::Node) -> ::anyhow::Result<Self> {
                if !node.is($ns, $tag) {
                    return Err(::anyhow::anyhow!(
                        "expected <{} xmlns='{}'>, got <{} xmlns='{}'>",
                        $tag, $ns, node.tag, node.ns
                    ));
                }
                Ok(Self {
                    $(
                        $field: node.attrs().optional_string($attr_name)
                            .map(|s| s.to_string())
                            .unwrap_or_else(|| $crate::define_simple_node!(@default $($default)?)),
                    )*
                })
            }
        }

        impl $crate::protocol::Payload for $name {
            const TAG: &'static str = $tag;
            const NAMESPACE: &'static str = $ns;
        }
    };

    // Helper to handle default values
    (@default $default:expr) => { $default.to_string() };
    (@default) => { String::new() };
}

/// Macro for defining an empty element (qualified name only, no attributes or children).
///
/// # Example
///
/// ```ignore
/// define_empty_node!(
///     /// Enables message carbons.
///     /// Wire format: `<enable xmlns="urn:xmpp:carbons:2"/>`
///     pub struct CarbonsEnable("enable", "urn:xmpp:carbons:2")
/// );
/// ```
#[macro_export]
macro_rules! define_empty_node {
    (
        $(#[$meta:meta])*
        $vis:vis struct $name:ident($tag:literal, $ns:expr)
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
        $vis struct $name;

        impl $crate::protocol::XmppNode for $name {
            fn tag(&self) -> &'static str {
                $tag
            }

            fn namespace(&self) -> &'static str {
                $ns
            }

            fn into_node(self) -> $crate::xml::node::Node {
                $crate::xml::node::Node::element($ns, $tag)
            }

            fn try_from_node(node: &$crate::xml::node::Node) -> ::anyhow::Result<Self> {
                if !node.is($ns, $tag) {
                    return Err(::anyhow::anyhow!(
                        "expected <{} xmlns='{}'>, got <{} xmlns='{}'>",
                        $tag, $ns, node.tag, node.ns
                    ));
                }
                Ok(Self)
            }
        }

        impl $crate::protocol::Payload for $name {
            const TAG: &'static str = $tag;
            const NAMESPACE: &'static str = $ns;
        }
    };
}
