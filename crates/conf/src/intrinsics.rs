//! Bootstrap of the intrinsic scope and the host-implemented operators.

use crate::{
    arena::{Arena, NodeId},
    error::{ErrorKind, LineError},
    function::{Fixity, FunctionBody, FunctionData, OperatorData, OPERATOR_PREFIX},
    instance::{InstanceData, Payload},
    scope::{add_child, clone_node, Node, NodeData, ScopeData},
    types::{
        InstanceFactory, Registry, TypeData, NAME_TYPE_EXPR, NAME_TYPE_FLOAT, NAME_TYPE_INT, NAME_TYPE_OBJECT,
        NAME_TYPE_STRING,
    },
};

/// Name given to fresh values produced by operator application.
const RVALUE_NAME: &str = "__RV";

/// Host-implemented operator behaviors, one tag per overload installed by
/// [`bootstrap`]. Dispatch is a `match` in [`HostOp::apply`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum HostOp {
    /// `string operator=`: copy the right string payload into the receiver.
    StrAssign,
    /// `int operator=`.
    IntAssign,
    /// `int operator+`: fresh temporary carrying the sum.
    IntAdd,
    /// `int operator*`: fresh temporary carrying the product.
    IntMul,
    /// `int operator+=`: in-place sum, returns the receiver.
    IntAddAssign,
    /// `float operator=`.
    FloatAssign,
    /// `object operator.`: project the receiver onto a named sub-instance.
    ObjMember,
    /// `object operator=`: replace the receiver's sub-instances by clones
    /// of the right side's.
    ObjAssign,
}

impl HostOp {
    /// Applies the operator to `recv` with `args`, returning the result
    /// instance. Wrong payload shapes are a type mismatch; the overloads
    /// never create or release their operands (the evaluator owns them).
    pub fn apply(self, arena: &mut Arena, recv: NodeId, args: &[NodeId]) -> Result<NodeId, LineError> {
        let arg = *args
            .first()
            .ok_or_else(|| LineError::new(ErrorKind::MissingOperand, arena.get(recv).name.clone()))?;
        match self {
            Self::StrAssign => {
                let value = str_payload(arena, arg)?;
                str_payload(arena, recv)?;
                *instance_payload_mut(arena, recv) = Payload::Str(value);
                Ok(recv)
            }
            Self::IntAssign => {
                let value = int_payload(arena, arg)?;
                int_payload(arena, recv)?;
                *instance_payload_mut(arena, recv) = Payload::Int(value);
                Ok(recv)
            }
            Self::IntAdd => {
                let sum = int_payload(arena, recv)?.wrapping_add(int_payload(arena, arg)?);
                Ok(fresh_value(arena, recv, Payload::Int(sum)))
            }
            Self::IntMul => {
                let product = int_payload(arena, recv)?.wrapping_mul(int_payload(arena, arg)?);
                Ok(fresh_value(arena, recv, Payload::Int(product)))
            }
            Self::IntAddAssign => {
                let sum = int_payload(arena, recv)?.wrapping_add(int_payload(arena, arg)?);
                *instance_payload_mut(arena, recv) = Payload::Int(sum);
                Ok(recv)
            }
            Self::FloatAssign => {
                let value = float_payload(arena, arg)?;
                float_payload(arena, recv)?;
                *instance_payload_mut(arena, recv) = Payload::Float(value);
                Ok(recv)
            }
            Self::ObjMember => {
                let member = arena.get(arg).name.clone();
                let subs = arena
                    .get(recv)
                    .instance()
                    .ok_or_else(|| mismatch(arena, recv))?
                    .subs
                    .clone();
                subs.into_iter()
                    .find(|&sub| arena.get(sub).name == member)
                    .ok_or_else(|| LineError::new(ErrorKind::UnknownMember, member))
            }
            Self::ObjAssign => {
                if arena.get(recv).instance().is_none() {
                    return Err(mismatch(arena, recv));
                }
                let src_subs = match arena.get(arg).instance() {
                    Some(data) => data.subs.clone(),
                    None => return Err(mismatch(arena, arg)),
                };
                let old = std::mem::take(&mut arena.get_mut(recv).instance_mut().expect("checked above").subs);
                for sub in old {
                    arena.release(sub);
                }
                for sub in src_subs {
                    let name = arena.get(sub).name.clone();
                    let copy = clone_node(arena, sub, name);
                    arena
                        .get_mut(recv)
                        .instance_mut()
                        .expect("checked above")
                        .subs
                        .push(copy);
                }
                Ok(recv)
            }
        }
    }
}

fn mismatch(arena: &Arena, id: NodeId) -> LineError {
    LineError::new(ErrorKind::TypeMismatch, arena.get(id).name.clone())
}

fn instance_payload_mut(arena: &mut Arena, id: NodeId) -> &mut Payload {
    // Working-list elements handed to operators are always instances.
    &mut arena
        .get_mut(id)
        .instance_mut()
        .expect("operator operand must be an instance")
        .payload
}

fn str_payload(arena: &Arena, id: NodeId) -> Result<String, LineError> {
    match arena.get(id).instance().map(|data| &data.payload) {
        Some(Payload::Str(value)) => Ok(value.clone()),
        _ => Err(mismatch(arena, id)),
    }
}

fn int_payload(arena: &Arena, id: NodeId) -> Result<i64, LineError> {
    match arena.get(id).instance().map(|data| &data.payload) {
        Some(Payload::Int(value)) => Ok(*value),
        _ => Err(mismatch(arena, id)),
    }
}

fn float_payload(arena: &Arena, id: NodeId) -> Result<f64, LineError> {
    match arena.get(id).instance().map(|data| &data.payload) {
        Some(Payload::Float(value)) => Ok(*value),
        _ => Err(mismatch(arena, id)),
    }
}

/// A fresh temporary of the receiver's type carrying `payload`.
fn fresh_value(arena: &mut Arena, recv: NodeId, payload: Payload) -> NodeId {
    let ty = arena.get(recv).instance().and_then(|data| data.ty);
    arena.alloc(Node {
        name: RVALUE_NAME.to_owned(),
        temporary: true,
        data: NodeData::Instance(InstanceData { ty, subs: vec![], payload }),
    })
}

fn alloc_type(arena: &mut Arena, name: &str, factory: InstanceFactory) -> NodeId {
    arena.alloc(Node {
        name: name.to_owned(),
        temporary: false,
        data: NodeData::Type(TypeData {
            scope: ScopeData::default(),
            factory,
        }),
    })
}

fn alloc_operator(arena: &mut Arena, symbol: &str, host: HostOp, priority: u8) -> NodeId {
    arena.alloc(Node {
        name: format!("{OPERATOR_PREFIX}{symbol}"),
        temporary: false,
        data: NodeData::Operator(OperatorData {
            func: FunctionData {
                body: FunctionBody::Host(host),
            },
            priority,
            fixity: Fixity::Mid,
        }),
    })
}

/// Builds the intrinsic scope and the registry of intrinsic types.
///
/// The scope's children are the `string`, `int`, `float`, and `object`
/// types with their operator overloads. `expr` is registered but never a
/// scope child; it reserves the name for expression-typed values.
/// Registration order (string, int, float, object, expr) is the literal
/// typing tie-break.
pub(crate) fn bootstrap(arena: &mut Arena) -> (NodeId, Registry) {
    let intrinsic = arena.alloc(Node::scope("", None));
    let mut registry = Registry::new();

    let string = alloc_type(arena, NAME_TYPE_STRING, InstanceFactory::Str);
    let op = alloc_operator(arena, "=", HostOp::StrAssign, 14);
    add_child(arena, string, op);
    add_child(arena, intrinsic, string);
    registry.insert(NAME_TYPE_STRING.to_owned(), string);

    let int = alloc_type(arena, NAME_TYPE_INT, InstanceFactory::Int);
    for (symbol, host, priority) in [
        ("=", HostOp::IntAssign, 14),
        ("+", HostOp::IntAdd, 4),
        ("*", HostOp::IntMul, 3),
        ("+=", HostOp::IntAddAssign, 14),
    ] {
        let op = alloc_operator(arena, symbol, host, priority);
        add_child(arena, int, op);
    }
    add_child(arena, intrinsic, int);
    registry.insert(NAME_TYPE_INT.to_owned(), int);

    let float = alloc_type(arena, NAME_TYPE_FLOAT, InstanceFactory::Float);
    let op = alloc_operator(arena, "=", HostOp::FloatAssign, 14);
    add_child(arena, float, op);
    add_child(arena, intrinsic, float);
    registry.insert(NAME_TYPE_FLOAT.to_owned(), float);

    let object = alloc_type(arena, NAME_TYPE_OBJECT, InstanceFactory::Object);
    let op = alloc_operator(arena, ".", HostOp::ObjMember, 1);
    add_child(arena, object, op);
    let op = alloc_operator(arena, "=", HostOp::ObjAssign, 14);
    add_child(arena, object, op);
    add_child(arena, intrinsic, object);
    registry.insert(NAME_TYPE_OBJECT.to_owned(), object);

    let expr = alloc_type(arena, NAME_TYPE_EXPR, InstanceFactory::Expr);
    registry.insert(NAME_TYPE_EXPR.to_owned(), expr);

    (intrinsic, registry)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::create_instance;

    fn int_instance(arena: &mut Arena, registry: &Registry, name: &str, value: i64) -> NodeId {
        let ty = registry[NAME_TYPE_INT];
        let instance = create_instance(arena, ty, name).unwrap();
        *instance_payload_mut(arena, instance) = Payload::Int(value);
        instance
    }

    /// The registration order is the literal-typing tie-break.
    #[test]
    fn registry_order_is_documented() {
        let mut arena = Arena::new();
        let (_, registry) = bootstrap(&mut arena);
        let names: Vec<&str> = registry.keys().map(String::as_str).collect();
        assert_eq!(names, ["string", "int", "float", "object", "expr"]);
    }

    /// Arithmetic overloads return a fresh temporary and leave their
    /// operands untouched.
    #[test]
    fn int_add_produces_a_fresh_temporary() {
        let mut arena = Arena::new();
        let (_, registry) = bootstrap(&mut arena);
        let a = int_instance(&mut arena, &registry, "a", 5);
        let b = int_instance(&mut arena, &registry, "b", 9);

        let result = HostOp::IntAdd.apply(&mut arena, a, &[b]).unwrap();
        assert_ne!(result, a);
        assert_ne!(result, b);
        let node = arena.get(result);
        assert!(node.temporary);
        assert_eq!(node.name, RVALUE_NAME);
        assert_eq!(node.instance().unwrap().payload, Payload::Int(14));
        assert_eq!(arena.get(a).instance().unwrap().payload, Payload::Int(5));
    }

    /// Assignment overloads return the receiver itself.
    #[test]
    fn int_assign_returns_the_receiver() {
        let mut arena = Arena::new();
        let (_, registry) = bootstrap(&mut arena);
        let a = int_instance(&mut arena, &registry, "a", 0);
        let b = int_instance(&mut arena, &registry, "b", 3);

        let result = HostOp::IntAssign.apply(&mut arena, a, &[b]).unwrap();
        assert_eq!(result, a);
        assert_eq!(arena.get(a).instance().unwrap().payload, Payload::Int(3));
    }

    #[test]
    fn assignment_rejects_mismatched_payloads() {
        let mut arena = Arena::new();
        let (_, registry) = bootstrap(&mut arena);
        let a = int_instance(&mut arena, &registry, "a", 0);
        let s = create_instance(&mut arena, registry[NAME_TYPE_STRING], "s").unwrap();

        let err = HostOp::IntAssign.apply(&mut arena, a, &[s]).unwrap_err();
        assert_eq!(err.kind, ErrorKind::TypeMismatch);
    }

    /// Member projection matches the argument's name against the
    /// receiver's sub-instances.
    #[test]
    fn member_projection_finds_subs_by_name() {
        let mut arena = Arena::new();
        let (_, registry) = bootstrap(&mut arena);
        let x = int_instance(&mut arena, &registry, "x", 7);
        let recv = arena.alloc(Node {
            name: "p".to_owned(),
            temporary: false,
            data: NodeData::Instance(InstanceData {
                ty: None,
                subs: vec![x],
                payload: Payload::None,
            }),
        });
        let probe = arena.alloc(Node {
            name: "x".to_owned(),
            temporary: true,
            data: NodeData::Instance(InstanceData {
                ty: None,
                subs: vec![],
                payload: Payload::None,
            }),
        });

        assert_eq!(HostOp::ObjMember.apply(&mut arena, recv, &[probe]), Ok(x));

        let missing = arena.alloc(Node {
            name: "z".to_owned(),
            temporary: true,
            data: NodeData::Instance(InstanceData {
                ty: None,
                subs: vec![],
                payload: Payload::None,
            }),
        });
        let err = HostOp::ObjMember.apply(&mut arena, recv, &[missing]).unwrap_err();
        assert_eq!(err.kind, ErrorKind::UnknownMember);
        assert_eq!(err.token, "z");
    }
}
