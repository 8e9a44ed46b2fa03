//! Instance data and the intrinsic payload variants.

use crate::{
    arena::{Arena, NodeId},
    error::{ErrorKind, LineError},
    lexer::STRING_QUOTE,
    scope::clone_node,
};

/// Runtime state of an instance.
///
/// A structural (user-class) instance is only a container of
/// sub-instances; intrinsic instances additionally carry raw data whose
/// shape depends on their type.
#[derive(Debug)]
pub(crate) struct InstanceData {
    /// The instance's type. Placeholder instances manufactured for
    /// unresolved names have none.
    pub ty: Option<NodeId>,
    /// Owned sub-instances, one per structural member, in declaration order.
    pub subs: Vec<NodeId>,
    pub payload: Payload,
}

/// Intrinsic payload carried by instances of the built-in types.
#[derive(Debug, Clone, PartialEq)]
pub(crate) enum Payload {
    /// Structural instances and placeholders carry no data.
    None,
    Str(String),
    Int(i64),
    Float(f64),
    /// Reference to another instance in the tree. Parsing an object
    /// literal is reserved, so this only ever holds `None` today.
    ObjectRef(Option<NodeId>),
}

/// Parses the payload from source syntax into `instance`.
///
/// String literals keep everything between the outer quotes; ints and
/// floats parse as decimal numbers. Object payloads have no literal
/// syntax and structural instances carry no payload, so both are errors.
pub(crate) fn set_from_string(arena: &mut Arena, instance: NodeId, text: &str) -> Result<(), LineError> {
    let malformed = || LineError::new(ErrorKind::MalformedLiteral, text);
    let node = arena.get_mut(instance);
    let data = node.instance_mut().expect("set_from_string receiver must be an instance");
    match &mut data.payload {
        Payload::Str(payload) => {
            let stripped = text
                .strip_prefix(STRING_QUOTE)
                .and_then(|rest| rest.strip_suffix(STRING_QUOTE))
                .ok_or_else(malformed)?;
            *payload = stripped.to_owned();
        }
        Payload::Int(payload) => *payload = text.parse().map_err(|_| malformed())?,
        Payload::Float(payload) => *payload = text.parse().map_err(|_| malformed())?,
        Payload::None | Payload::ObjectRef(_) => return Err(malformed()),
    }
    Ok(())
}

/// Assigns `src` into `dst`: the intrinsic payload is copied over and
/// `dst`'s sub-instances are replaced by deep clones of `src`'s.
///
/// Used by instance-vs-instance collisions during merge. Cloning (rather
/// than sharing) the sub-instances keeps every instance the sole owner of
/// its descendants.
pub(crate) fn assign(arena: &mut Arena, dst: NodeId, src: NodeId) {
    let payload = arena
        .get(src)
        .instance()
        .expect("assign source must be an instance")
        .payload
        .clone();

    let old_subs = std::mem::take(
        &mut arena
            .get_mut(dst)
            .instance_mut()
            .expect("assign target must be an instance")
            .subs,
    );
    for sub in old_subs {
        arena.release(sub);
    }

    let src_subs = arena.get(src).instance().expect("checked above").subs.clone();
    let mut cloned = Vec::with_capacity(src_subs.len());
    for sub in src_subs {
        let name = arena.get(sub).name.clone();
        cloned.push(clone_node(arena, sub, name));
    }

    let data = arena.get_mut(dst).instance_mut().expect("checked above");
    data.payload = payload;
    data.subs = cloned;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scope::{Node, NodeData};

    fn alloc_instance(arena: &mut Arena, name: &str, payload: Payload) -> NodeId {
        arena.alloc(Node {
            name: name.to_owned(),
            temporary: false,
            data: NodeData::Instance(InstanceData {
                ty: None,
                subs: vec![],
                payload,
            }),
        })
    }

    #[test]
    fn string_payload_strips_outer_quotes() {
        let mut arena = Arena::new();
        let inst = alloc_instance(&mut arena, "s", Payload::Str(String::new()));
        set_from_string(&mut arena, inst, "\"hi\"").unwrap();
        assert_eq!(arena.get(inst).instance().unwrap().payload, Payload::Str("hi".to_owned()));
    }

    #[test]
    fn int_payload_rejects_garbage() {
        let mut arena = Arena::new();
        let inst = alloc_instance(&mut arena, "n", Payload::Int(0));
        assert!(set_from_string(&mut arena, inst, "12x").is_err());
        assert!(set_from_string(&mut arena, inst, "-").is_err());
    }

    #[test]
    fn object_payload_has_no_literal_syntax() {
        let mut arena = Arena::new();
        let inst = alloc_instance(&mut arena, "o", Payload::ObjectRef(None));
        let err = set_from_string(&mut arena, inst, "whatever").unwrap_err();
        assert_eq!(err.kind, ErrorKind::MalformedLiteral);
    }

    #[test]
    fn float_payload_parses_decimals() {
        let mut arena = Arena::new();
        let inst = alloc_instance(&mut arena, "f", Payload::Float(0.0));
        set_from_string(&mut arena, inst, "3.14").unwrap();
        assert_eq!(arena.get(inst).instance().unwrap().payload, Payload::Float(3.14));
        // A trailing dot still parses as a whole number.
        set_from_string(&mut arena, inst, "3.").unwrap();
        assert_eq!(arena.get(inst).instance().unwrap().payload, Payload::Float(3.0));
    }
}
