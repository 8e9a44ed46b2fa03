//! Type data, the intrinsic type registry, and literal typing.

use indexmap::IndexMap;

use crate::{
    arena::{Arena, NodeId},
    error::{ErrorKind, LineError},
    instance::{InstanceData, Payload},
    lexer::STRING_QUOTE,
    scope::{Kind, Node, NodeData, ScopeData},
};

pub(crate) const NAME_TYPE_STRING: &str = "string";
pub(crate) const NAME_TYPE_INT: &str = "int";
pub(crate) const NAME_TYPE_FLOAT: &str = "float";
pub(crate) const NAME_TYPE_OBJECT: &str = "object";
pub(crate) const NAME_TYPE_EXPR: &str = "expr";

/// An in-language type: a scope whose children are member declarations
/// and member operators, plus a factory that manufactures instances.
#[derive(Debug)]
pub(crate) struct TypeData {
    pub scope: ScopeData,
    pub factory: InstanceFactory,
}

/// How a type manufactures a fresh instance.
///
/// A tag instead of a callback: capturing closures would have to hold
/// arena ids anyway, and the factory set is closed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum InstanceFactory {
    /// User-class factory: seeds one sub-instance per structural member
    /// template of the type.
    Structural,
    Str,
    Int,
    Float,
    Object,
    /// The reserved `expr` intrinsic; instantiating it is an error.
    Expr,
}

/// Registry of the intrinsic types in registration order.
///
/// Insertion order is the documented tie-break for literal typing:
/// string, int, float, object, expr. With strict argmax comparison the
/// first registered type wins a tie.
pub(crate) type Registry = IndexMap<String, NodeId>;

/// Creates a fresh instance of `ty` named `name`.
///
/// Structural types seed a same-named sub-instance for every member
/// template (the type's own INSTANCE-kind children), recursively through
/// the member's type.
pub(crate) fn create_instance(arena: &mut Arena, ty: NodeId, name: impl Into<String>) -> Result<NodeId, LineError> {
    let node = arena.get(ty);
    let NodeData::Type(data) = &node.data else {
        panic!("create_instance target must be a type");
    };
    let payload = match data.factory {
        InstanceFactory::Structural => Payload::None,
        InstanceFactory::Str => Payload::Str(String::new()),
        InstanceFactory::Int => Payload::Int(0),
        InstanceFactory::Float => Payload::Float(0.0),
        InstanceFactory::Object => Payload::ObjectRef(None),
        InstanceFactory::Expr => return Err(LineError::new(ErrorKind::ReservedType, NAME_TYPE_EXPR)),
    };
    let seeds_members = data.factory == InstanceFactory::Structural;

    let instance = arena.alloc(Node {
        name: name.into(),
        temporary: false,
        data: NodeData::Instance(InstanceData {
            ty: Some(ty),
            subs: vec![],
            payload,
        }),
    });

    if seeds_members {
        let members: Vec<NodeId> = arena
            .get(ty)
            .scope_data()
            .expect("types carry a scope record")
            .children
            .iter()
            .copied()
            .filter(|&child| arena.get(child).kind() == Kind::Instance)
            .collect();
        for member in members {
            let member_name = arena.get(member).name.clone();
            let Some(member_ty) = arena.get(member).instance().and_then(|data| data.ty) else {
                continue;
            };
            let sub = create_instance(arena, member_ty, member_name)?;
            arena
                .get_mut(instance)
                .instance_mut()
                .expect("just allocated as an instance")
                .subs
                .push(sub);
        }
    }
    Ok(instance)
}

/// Compatibility score between a literal token and an intrinsic type.
///
/// −1 means incompatible; larger is a better fit. For example `5` scores
/// 1000 against int, 500 against float, and −1 against string, so int is
/// preferred and float is the fallback.
pub(crate) fn compatibility(factory: InstanceFactory, text: &str) -> i32 {
    match factory {
        InstanceFactory::Str => {
            let mut chars = text.chars();
            if chars.next() == Some(STRING_QUOTE) && chars.next_back() == Some(STRING_QUOTE) {
                1000
            } else {
                -1
            }
        }
        InstanceFactory::Int => {
            if !text.is_empty() && text.chars().all(|c| c.is_ascii_digit() || c == '-') {
                1000
            } else {
                -1
            }
        }
        InstanceFactory::Float => {
            let numeric = !text.is_empty() && text.chars().all(|c| c.is_ascii_digit() || c == '-' || c == '.');
            if !numeric {
                return -1;
            }
            if text.contains('.') {
                // A bare dot is the member-access operator, not a float.
                if text.chars().count() == 1 { -1 } else { 1000 }
            } else {
                500
            }
        }
        InstanceFactory::Object => {
            let any = [InstanceFactory::Int, InstanceFactory::Float, InstanceFactory::Str]
                .into_iter()
                .any(|intrinsic| compatibility(intrinsic, text) > 0);
            if any { 1 } else { -1 }
        }
        // `expr` stands down as long as `object` is registered, which it
        // always is after bootstrap.
        InstanceFactory::Expr | InstanceFactory::Structural => -1,
    }
}

/// Picks the intrinsic type with the best compatibility for `text`, or
/// `None` when every registered type scores −1.
///
/// Ties break toward the earliest registration (strict argmax over the
/// registry's insertion order).
pub(crate) fn type_from_expression(arena: &Arena, registry: &Registry, text: &str) -> Option<NodeId> {
    let mut best_score = -1;
    let mut best = None;
    for &ty in registry.values() {
        let NodeData::Type(data) = &arena.get(ty).data else {
            continue;
        };
        let score = compatibility(data.factory, text);
        if score > best_score {
            best_score = score;
            best = Some(ty);
        }
    }
    best
}
