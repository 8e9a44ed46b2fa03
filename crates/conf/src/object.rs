//! Read-only mirrored snapshots of a scope tree for external consumers.

use crate::{arena::NodeId, instance::Payload, parse::Parser, scope::Kind};

/// Intrinsic payload of a mirrored instance.
///
/// This is the public-facing form of instance data: it owns its contents
/// and can be freely cloned, compared, and serialized without a parser.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub enum Value {
    /// Structural instances and object references carry no inline data.
    None,
    Str(String),
    Int(i64),
    Float(f64),
}

impl Value {
    pub(crate) fn from_payload(payload: &Payload) -> Self {
        match payload {
            Payload::None | Payload::ObjectRef(_) => Self::None,
            Payload::Str(text) => Self::Str(text.clone()),
            Payload::Int(value) => Self::Int(*value),
            Payload::Float(value) => Self::Float(*value),
        }
    }

    /// Canonical text form: quotes already stripped for strings, base-10
    /// for ints, shortest round-trip decimal for floats.
    #[must_use]
    pub fn to_text(&self) -> String {
        match self {
            Self::None => String::new(),
            Self::Str(text) => text.clone(),
            Self::Int(value) => value.to_string(),
            Self::Float(value) => ryu::Buffer::new().format(*value).to_owned(),
        }
    }
}

/// A mirrored scope-tree node.
///
/// The snapshot owns all its data: it stays valid after the parser is
/// dropped and serializes naturally to JSON. Functions and operators are
/// omitted, mirroring what external consumers of the scope tree need —
/// names, types, and intrinsic payloads.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub enum Object {
    /// A plain scope with its mirrored children.
    Scope { name: String, children: Vec<Object> },
    /// A type with its mirrored members (instance templates and nested
    /// declarations).
    Type { name: String, children: Vec<Object> },
    /// An instance with its type name, payload, and sub-instances.
    Instance {
        name: String,
        type_name: Option<String>,
        value: Value,
        sub_instances: Vec<Object>,
    },
}

impl Object {
    /// Mirrors the scope tree rooted at `id`.
    #[must_use]
    pub(crate) fn snapshot(parser: &Parser, id: NodeId) -> Self {
        let name = parser.name(id).to_owned();
        match parser.kind(id) {
            Kind::Instance => {
                let type_name = parser.type_of(id).map(|ty| parser.name(ty).to_owned());
                let value = parser.value(id).unwrap_or(Value::None);
                let sub_instances = parser
                    .sub_instances(id)
                    .iter()
                    .map(|&sub| Self::snapshot(parser, sub))
                    .collect();
                Self::Instance {
                    name,
                    type_name,
                    value,
                    sub_instances,
                }
            }
            kind => {
                let children = parser
                    .children(id)
                    .iter()
                    .filter(|&&child| parser.kind(child) != Kind::Function)
                    .map(|&child| Self::snapshot(parser, child))
                    .collect();
                if kind == Kind::Type {
                    Self::Type { name, children }
                } else {
                    // Functions bear no children; a function id mirrors as
                    // an empty scope rather than failing.
                    Self::Scope { name, children }
                }
            }
        }
    }

    /// The node's name.
    #[must_use]
    pub fn name(&self) -> &str {
        match self {
            Self::Scope { name, .. } | Self::Type { name, .. } | Self::Instance { name, .. } => name,
        }
    }

    /// Finds a direct child (or member, or sub-instance) by name.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&Self> {
        let children = match self {
            Self::Scope { children, .. } | Self::Type { children, .. } => children,
            Self::Instance { sub_instances, .. } => sub_instances,
        };
        children.iter().find(|child| child.name() == name)
    }
}
