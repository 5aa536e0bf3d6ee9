//! Derive macros for jxtcore stanza types.
//!
//! This crate provides derive macros for implementing the `XmppNode` trait
//! on structs that map to namespaced XMPP elements.
//!
//! # Example
//!
//! ```ignore
//! use jxtcore::{StringEnum, XmppNode};
//!
//! /// A roster item.
//! /// Wire format: `<item xmlns="jabber:iq:roster" jid="..." name="..."><group>..</group></item>`
//! #[derive(XmppNode)]
//! #[xmpp(tag = "item", ns = "jabber:iq:roster")]
//! pub struct RosterItem {
//!     #[attr(name = "jid", jid)]
//!     pub jid: Jid,
//!     #[attr(name = "name")]
//!     pub name: Option<String>,
//!     #[multi_text_sub(name = "group")]
//!     pub groups: Vec<String>,
//! }
//!
//! #[derive(StringEnum)]
//! pub enum Subscription {
//!     #[str = "none"]
//!     None,
//!     #[str = "both"]
//!     Both,
//! }
//! ```

use proc_macro::TokenStream;
use quote::quote;
use syn::{Data, DeriveInput, Fields, parse_macro_input};

/// Derive macro for implementing `XmppNode` on structs.
///
/// # Attributes
///
/// - `#[xmpp(tag = "tagname", ns = "namespace")]` - Required. The qualified element name.
/// - `#[attr(name = "attrname")]` - A String (required) or Option<String> attribute.
/// - `#[attr(name = "attrname", default = "value")]` - Attribute with default value.
/// - `#[attr(name = "attrname", jid)]` - A Jid or Option<Jid> attribute.
/// - `#[text_sub(name = "child")]` - Option<String> text of a child element in the same namespace.
/// - `#[bool_sub(name = "child")]` - bool, true when the child element is present.
/// - `#[multi_text_sub(name = "child")]` - Vec<String>, one child element per value, in order.
///
/// Fields without any of these attributes are filled with `Default::default()` on parse
/// and are not serialized.
#[proc_macro_derive(XmppNode, attributes(xmpp, attr, text_sub, bool_sub, multi_text_sub))]
pub fn derive_xmpp_node(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);

    let name = &input.ident;

    let (tag, ns) = match extract_qname(&input.attrs) {
        Ok(Some(qname)) => qname,
        Ok(None) => {
            return syn::Error::new_spanned(
                &input.ident,
                "XmppNode requires #[xmpp(tag = \"...\", ns = \"...\")]",
            )
            .to_compile_error()
            .into();
        }
        Err(e) => return e.to_compile_error().into(),
    };

    let fields = match &input.data {
        Data::Struct(data) => match &data.fields {
            Fields::Named(fields) => &fields.named,
            Fields::Unit => return generate_empty_impl(name, &tag, &ns).into(),
            _ => {
                return syn::Error::new_spanned(
                    &input.ident,
                    "XmppNode only supports named fields or unit structs",
                )
                .to_compile_error()
                .into();
            }
        },
        _ => {
            return syn::Error::new_spanned(&input.ident, "XmppNode can only be derived for structs")
                .to_compile_error()
                .into();
        }
    };

    let mut infos = Vec::new();
    for field in fields {
        match extract_field_info(field) {
            Ok(info) => infos.push(info),
            Err(e) => return e.to_compile_error().into(),
        }
    }

    let setters: Vec<_> = infos.iter().map(|info| generate_setter(info, &ns)).collect();
    let parsers: Vec<_> = infos.iter().map(|info| generate_parser(info, &ns)).collect();

    let expanded = quote! {
        impl ::jxtcore::protocol::XmppNode for #name {
            fn tag(&self) -> &'static str {
                #tag
            }

            fn namespace(&self) -> &'static str {
                #ns
            }

            fn into_node(self) -> ::jxtcore::xml::node::Node {
                let mut node = ::jxtcore::xml::node::Node::element(#ns, #tag);
                #(#setters)*
                node
            }

            fn try_from_node(node: &::jxtcore::xml::node::Node) -> ::anyhow::Result<Self> {
                if !node.is(#ns, #tag) {
                    return Err(::anyhow::anyhow!(
                        "expected <{} xmlns='{}'>, got <{} xmlns='{}'>",
                        #tag, #ns, node.tag, node.ns
                    ));
                }
                Ok(Self {
                    #(#parsers),*
                })
            }
        }

        impl ::jxtcore::protocol::Payload for #name {
            const TAG: &'static str = #tag;
            const NAMESPACE: &'static str = #ns;
        }
    };

    expanded.into()
}

/// Derive macro for empty stanza elements (qualified name only).
///
/// ```ignore
/// #[derive(EmptyNode)]
/// #[xmpp(tag = "ping", ns = "urn:xmpp:ping")]
/// pub struct Ping;
/// ```
#[proc_macro_derive(EmptyNode, attributes(xmpp))]
pub fn derive_empty_node(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);
    let name = &input.ident;

    let (tag, ns) = match extract_qname(&input.attrs) {
        Ok(Some(qname)) => qname,
        Ok(None) => {
            return syn::Error::new_spanned(
                &input.ident,
                "EmptyNode requires #[xmpp(tag = \"...\", ns = \"...\")]",
            )
            .to_compile_error()
            .into();
        }
        Err(e) => return e.to_compile_error().into(),
    };

    generate_empty_impl(name, &tag, &ns).into()
}

fn generate_empty_impl(name: &syn::Ident, tag: &str, ns: &str) -> proc_macro2::TokenStream {
    quote! {
        impl ::jxtcore::protocol::XmppNode for #name {
            fn tag(&self) -> &'static str {
                #tag
            }

            fn namespace(&self) -> &'static str {
                #ns
            }

            fn into_node(self) -> ::jxtcore::xml::node::Node {
                ::jxtcore::xml::node::Node::element(#ns, #tag)
            }

            fn try_from_node(node: &::jxtcore::xml::node::Node) -> ::anyhow::Result<Self> {
                if !node.is(#ns, #tag) {
                    return Err(::anyhow::anyhow!(
                        "expected <{} xmlns='{}'>, got <{} xmlns='{}'>",
                        #tag, #ns, node.tag, node.ns
                    ));
                }
                Ok(Self)
            }
        }

        impl ::jxtcore::protocol::Payload for #name {
            const TAG: &'static str = #tag;
            const NAMESPACE: &'static str = #ns;
        }

        impl ::core::default::Default for #name {
            fn default() -> Self {
                Self
            }
        }
    }
}

enum FieldKind {
    Attr {
        name: String,
        jid: bool,
        default: Option<String>,
    },
    TextSub(String),
    BoolSub(String),
    MultiTextSub(String),
    Skip,
}

struct FieldInfo {
    ident: syn::Ident,
    optional: bool,
    kind: FieldKind,
}

fn generate_setter(info: &FieldInfo, ns: &str) -> proc_macro2::TokenStream {
    let ident = &info.ident;
    match (&info.kind, info.optional) {
        (FieldKind::Attr { name, .. }, true) => quote! {
            if let Some(value) = self.#ident {
                node.set_attr(#name, value.to_string());
            }
        },
        (FieldKind::Attr { name, .. }, false) => quote! {
            node.set_attr(#name, self.#ident.to_string());
        },
        (FieldKind::TextSub(child), true) => quote! {
            if let Some(text) = self.#ident {
                node.find_or_create(#ns, #child).set_text(text);
            }
        },
        (FieldKind::TextSub(child), false) => quote! {
            node.find_or_create(#ns, #child).set_text(self.#ident);
        },
        (FieldKind::BoolSub(child), _) => quote! {
            if self.#ident {
                node.find_or_create(#ns, #child);
            }
        },
        (FieldKind::MultiTextSub(child), _) => quote! {
            for text in self.#ident {
                let mut sub = ::jxtcore::xml::node::Node::element(#ns, #child);
                sub.set_text(text);
                node.append_child(sub);
            }
        },
        (FieldKind::Skip, _) => quote! {},
    }
}

fn generate_parser(info: &FieldInfo, ns: &str) -> proc_macro2::TokenStream {
    let ident = &info.ident;
    match (&info.kind, info.optional) {
        (FieldKind::Attr { name, jid: true, .. }, false) => quote! {
            #ident: node.attrs().optional_jid(#name)
                .ok_or_else(|| ::anyhow::anyhow!("missing or invalid attribute '{}'", #name))?
        },
        (FieldKind::Attr { name, jid: true, .. }, true) => quote! {
            #ident: node.attrs().optional_jid(#name)
        },
        (FieldKind::Attr { name, jid: false, default: Some(default) }, false) => quote! {
            #ident: node.attrs().optional_string(#name)
                .map(|s| s.to_string())
                .unwrap_or_else(|| #default.to_string())
        },
        (FieldKind::Attr { name, jid: false, default: None }, false) => quote! {
            #ident: node.attrs().required_string(#name)?.to_string()
        },
        (FieldKind::Attr { name, jid: false, default: Some(default) }, true) => quote! {
            #ident: node.attrs().optional_string(#name)
                .map(|s| s.to_string())
                .or_else(|| Some(#default.to_string()))
        },
        (FieldKind::Attr { name, jid: false, default: None }, true) => quote! {
            #ident: node.attrs().optional_string(#name).map(|s| s.to_string())
        },
        (FieldKind::TextSub(child), true) => quote! {
            #ident: node.find_first(#ns, #child).map(|c| c.text().to_string())
        },
        (FieldKind::TextSub(child), false) => quote! {
            #ident: node.find_first(#ns, #child)
                .map(|c| c.text().to_string())
                .unwrap_or_default()
        },
        (FieldKind::BoolSub(child), _) => quote! {
            #ident: node.find_first(#ns, #child).is_some()
        },
        (FieldKind::MultiTextSub(child), _) => quote! {
            #ident: node.find(#ns, #child).map(|c| c.text().to_string()).collect()
        },
        (FieldKind::Skip, _) => quote! {
            #ident: ::core::default::Default::default()
        },
    }
}

fn extract_qname(attrs: &[syn::Attribute]) -> Result<Option<(String, String)>, syn::Error> {
    for attr in attrs {
        if attr.path().is_ident("xmpp") {
            let mut tag = None;
            let mut ns = None;
            attr.parse_nested_meta(|meta| {
                if meta.path.is_ident("tag") {
                    let value: syn::LitStr = meta.value()?.parse()?;
                    tag = Some(value.value());
                } else if meta.path.is_ident("ns") {
                    let value: syn::LitStr = meta.value()?.parse()?;
                    ns = Some(value.value());
                }
                Ok(())
            })?;
            match (tag, ns) {
                (Some(tag), Some(ns)) => return Ok(Some((tag, ns))),
                _ => {
                    return Err(syn::Error::new_spanned(
                        attr,
                        "#[xmpp(...)] needs both `tag` and `ns`",
                    ));
                }
            }
        }
    }
    Ok(None)
}

fn child_name(attr: &syn::Attribute) -> Result<String, syn::Error> {
    let mut name = None;
    attr.parse_nested_meta(|meta| {
        if meta.path.is_ident("name") {
            let value: syn::LitStr = meta.value()?.parse()?;
            name = Some(value.value());
        }
        Ok(())
    })?;
    name.ok_or_else(|| syn::Error::new_spanned(attr, "missing required `name`"))
}

fn extract_field_info(field: &syn::Field) -> Result<FieldInfo, syn::Error> {
    let ident = field
        .ident
        .clone()
        .ok_or_else(|| syn::Error::new_spanned(field, "expected a named field"))?;
    let optional = is_option_type(&field.ty);

    for attr in &field.attrs {
        let path = attr.path();
        if path.is_ident("attr") {
            let mut attr_name = None;
            let mut default = None;
            let mut jid = false;
            attr.parse_nested_meta(|meta| {
                if meta.path.is_ident("name") {
                    let value: syn::LitStr = meta.value()?.parse()?;
                    attr_name = Some(value.value());
                } else if meta.path.is_ident("default") {
                    let value: syn::LitStr = meta.value()?.parse()?;
                    default = Some(value.value());
                } else if meta.path.is_ident("jid") {
                    jid = true;
                }
                Ok(())
            })?;
            let name = attr_name.ok_or_else(|| {
                syn::Error::new_spanned(attr, "missing required `name` in #[attr(...)]")
            })?;
            return Ok(FieldInfo {
                ident,
                optional,
                kind: FieldKind::Attr { name, jid, default },
            });
        } else if path.is_ident("text_sub") {
            return Ok(FieldInfo {
                ident,
                optional,
                kind: FieldKind::TextSub(child_name(attr)?),
            });
        } else if path.is_ident("bool_sub") {
            return Ok(FieldInfo {
                ident,
                optional,
                kind: FieldKind::BoolSub(child_name(attr)?),
            });
        } else if path.is_ident("multi_text_sub") {
            return Ok(FieldInfo {
                ident,
                optional,
                kind: FieldKind::MultiTextSub(child_name(attr)?),
            });
        }
    }

    Ok(FieldInfo {
        ident,
        optional,
        kind: FieldKind::Skip,
    })
}

/// Check if a type is Option<T>
fn is_option_type(ty: &syn::Type) -> bool {
    if let syn::Type::Path(type_path) = ty
        && let Some(segment) = type_path.path.segments.last()
    {
        return segment.ident == "Option";
    }
    false
}

/// Derive macro for enums with string representations.
///
/// Automatically implements:
/// - `as_str(&self) -> &'static str`
/// - `std::fmt::Display`
/// - `TryFrom<&str>`
/// - `Default` (first variant is default, or use `#[string_default]`)
///
/// ```ignore
/// #[derive(StringEnum)]
/// pub enum IqType {
///     #[str = "get"]
///     Get,
///     #[string_default]
///     #[str = "set"]
///     Set,
/// }
/// ```
#[proc_macro_derive(StringEnum, attributes(str, string_default))]
pub fn derive_string_enum(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);

    let name = &input.ident;

    let variants = match &input.data {
        Data::Enum(data) => &data.variants,
        _ => {
            return syn::Error::new_spanned(&input.ident, "StringEnum can only be derived for enums")
                .to_compile_error()
                .into();
        }
    };

    let mut variant_infos = Vec::new();
    let mut default_variant = None;
    let mut seen_str_values: std::collections::HashMap<String, syn::Ident> =
        std::collections::HashMap::new();

    for variant in variants {
        let variant_ident = &variant.ident;

        if !matches!(variant.fields, syn::Fields::Unit) {
            return syn::Error::new_spanned(variant_ident, "StringEnum only supports unit variants")
                .to_compile_error()
                .into();
        }

        let mut str_value = None;
        let mut is_default = false;

        for attr in &variant.attrs {
            if attr.path().is_ident("str") {
                if let syn::Meta::NameValue(nv) = &attr.meta
                    && let syn::Expr::Lit(expr_lit) = &nv.value
                    && let syn::Lit::Str(lit_str) = &expr_lit.lit
                {
                    str_value = Some(lit_str.value());
                }
            } else if attr.path().is_ident("string_default") {
                is_default = true;
            }
        }

        let Some(str_val) = str_value else {
            return syn::Error::new_spanned(
                variant_ident,
                format!("StringEnum variant {variant_ident} requires #[str = \"...\"] attribute"),
            )
            .to_compile_error()
            .into();
        };

        if let Some(prev_variant) = seen_str_values.get(&str_val) {
            return syn::Error::new_spanned(
                variant_ident,
                format!(
                    "duplicate #[str = \"{str_val}\"] value; already used by variant `{prev_variant}`"
                ),
            )
            .to_compile_error()
            .into();
        }
        seen_str_values.insert(str_val.clone(), variant_ident.clone());

        if is_default {
            if default_variant.is_some() {
                return syn::Error::new_spanned(
                    variant_ident,
                    "Multiple #[string_default] attributes found; only one variant may be the default",
                )
                .to_compile_error()
                .into();
            }
            default_variant = Some(variant_ident.clone());
        }

        variant_infos.push((variant_ident.clone(), str_val));
    }

    if variant_infos.is_empty() {
        return syn::Error::new_spanned(&input.ident, "StringEnum cannot be derived for empty enums")
            .to_compile_error()
            .into();
    }

    let default_variant = default_variant.unwrap_or_else(|| variant_infos[0].0.clone());

    let as_str_arms: Vec<_> = variant_infos
        .iter()
        .map(|(ident, str_val)| quote! { #name::#ident => #str_val })
        .collect();

    let try_from_arms: Vec<_> = variant_infos
        .iter()
        .map(|(ident, str_val)| quote! { #str_val => Ok(#name::#ident) })
        .collect();

    let all_values: Vec<_> = variant_infos.iter().map(|(_, s)| s.clone()).collect();

    let expanded = quote! {
        impl #name {
            /// Every wire value of this enum, in declaration order.
            pub const VALUES: &'static [&'static str] = &[#(#all_values),*];

            /// Returns the string representation of this enum variant.
            pub fn as_str(&self) -> &'static str {
                match self {
                    #(#as_str_arms),*
                }
            }
        }

        impl ::core::fmt::Display for #name {
            fn fmt(&self, f: &mut ::core::fmt::Formatter<'_>) -> ::core::fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl ::core::convert::TryFrom<&str> for #name {
            type Error = ::anyhow::Error;

            fn try_from(value: &str) -> ::core::result::Result<Self, ::anyhow::Error> {
                match value {
                    #(#try_from_arms),*,
                    _ => Err(::anyhow::anyhow!("unknown {}: {}", stringify!(#name), value)),
                }
            }
        }

        impl ::core::default::Default for #name {
            fn default() -> Self {
                #name::#default_variant
            }
        }
    };

    expanded.into()
}
