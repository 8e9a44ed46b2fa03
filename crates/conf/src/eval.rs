//! Operator-precedence evaluation of one parenthesized expression.

use smallvec::SmallVec;
use tracing::trace;

use crate::{
    arena::NodeId,
    error::{ErrorKind, LineError},
    function::{Fixity, FunctionBody, OPERATOR_PREFIX},
    instance::{InstanceData, Payload},
    paren::ParenBag,
    parse::Parser,
    scope::{get_by_name, Kind, Node, NodeData},
    types::{create_instance, type_from_expression, NAME_TYPE_EXPR},
};

/// Evaluates one expression in `scope` and returns the resulting
/// instance, which is temporary unless it resolved to a named value.
pub(crate) fn evaluate(parser: &mut Parser, scope: NodeId, bag: &ParenBag) -> Result<NodeId, LineError> {
    eval_at(parser, scope, bag, 0, 0)
}

fn eval_at(parser: &mut Parser, scope: NodeId, bag: &ParenBag, depth: usize, offset: usize) -> Result<NodeId, LineError> {
    let mut line: Vec<NodeId> = vec![];

    for token in bag.expr(depth, offset) {
        if token.is_empty() {
            continue;
        }

        // Placeholders left by the parenthesization pass stand for the
        // value of the group one depth further in.
        if let Some(rest) = token.strip_prefix('$')
            && let Ok(k) = rest.parse::<usize>()
        {
            line.push(eval_at(parser, scope, bag, depth + 1, k)?);
            continue;
        }

        let element = resolve_token(parser, scope, &line, token)?;
        line.push(element);

        // Priority-1 operators (member access) may change the receiver's
        // type, which changes which overloads resolve for the tokens that
        // follow. They are applied as soon as a `value, op, value` suffix
        // exists instead of waiting for the reduction loop.
        if line.len() > 2 {
            let op_index = line.len() - 2;
            let op = parser.arena.get(line[op_index]);
            let tight = op.operator().is_some_and(|data| data.priority == 1);
            if tight && parser.arena.get(line[line.len() - 1]).kind() == Kind::Instance {
                apply_at(parser, &mut line, op_index)?;
            }
        }
    }

    // Reduce by repeatedly applying the lowest-priority operator; ties go
    // to the leftmost, which yields left-associative evaluation.
    while line.len() > 1 {
        let mut best: Option<(usize, u8)> = None;
        for (index, &element) in line.iter().enumerate() {
            if let Some(op) = parser.arena.get(element).operator()
                && best.is_none_or(|(_, priority)| op.priority < priority)
            {
                best = Some((index, op.priority));
            }
        }
        let Some((op_index, _)) = best else {
            let token = parser.arena.get(line[0]).name.clone();
            return Err(LineError::new(ErrorKind::MissingOperator, token));
        };
        apply_at(parser, &mut line, op_index)?;
    }

    let result = line.first().copied().ok_or_else(|| LineError::new(ErrorKind::EmptyExpression, ""))?;
    if parser.arena.get(result).kind() != Kind::Instance {
        let token = parser.arena.get(result).name.clone();
        return Err(LineError::new(ErrorKind::MissingOperand, token));
    }
    Ok(result)
}

/// Resolves one token into a working-list element, trying in order:
/// named instance in the scope chain, intrinsic literal, operator
/// overload on the previous element's type, and finally a typeless
/// placeholder instance for forgiving evaluation of unresolved names.
fn resolve_token(parser: &mut Parser, scope: NodeId, line: &[NodeId], token: &str) -> Result<NodeId, LineError> {
    if let Some(instance) = get_by_name(&parser.arena, scope, token, Kind::Instance) {
        return Ok(instance);
    }

    if let Some(ty) = type_from_expression(&parser.arena, &parser.registry, token)
        && parser.arena.get(ty).name != NAME_TYPE_EXPR
    {
        let instance = create_instance(&mut parser.arena, ty, token)?;
        crate::instance::set_from_string(&mut parser.arena, instance, token)?;
        parser.arena.get_mut(instance).temporary = true;
        return Ok(instance);
    }

    if let Some(&previous) = line.last()
        && parser.arena.get(previous).kind() != Kind::Function
        && let Some(ty) = parser.arena.get(previous).instance().and_then(|data| data.ty)
        && let Some(op) = get_by_name(&parser.arena, ty, &format!("{OPERATOR_PREFIX}{token}"), Kind::Function)
    {
        return Ok(op);
    }

    // Unresolved name: a typeless temporary carrying the token text, so
    // member access can still match it against the receiver's members.
    Ok(parser.arena.alloc(Node {
        name: token.to_owned(),
        temporary: true,
        data: NodeData::Instance(InstanceData {
            ty: None,
            subs: vec![],
            payload: Payload::None,
        }),
    }))
}

/// Applies the operator at `op_index` via its fixity, splicing the result
/// into the working list.
///
/// Infix takes the two neighbors, calls the overload, replaces the three
/// slots by the result, and releases consumed temporaries. The remaining
/// fixities have no defined application semantics; reporting an error
/// (rather than a no-op) keeps the reduction loop convergent.
fn apply_at(parser: &mut Parser, line: &mut Vec<NodeId>, op_index: usize) -> Result<(), LineError> {
    let op_id = line[op_index];
    let op_name = parser.arena.get(op_id).name.clone();
    let op = parser.arena.get(op_id).operator().expect("apply_at target must be an operator");

    match op.fixity {
        Fixity::Mid => {
            if op_index == 0 || op_index + 1 >= line.len() {
                return Err(LineError::new(ErrorKind::MissingOperand, op_name));
            }
            let body = op.func.body.clone();
            let first = line[op_index - 1];
            let second = line[op_index + 1];
            trace!(operator = %op_name, "applying infix operator");
            let result = match body {
                FunctionBody::Host(host) => {
                    let args: SmallVec<[NodeId; 1]> = SmallVec::from_slice(&[second]);
                    host.apply(&mut parser.arena, first, &args)?
                }
                FunctionBody::Captured(_) => return Err(LineError::new(ErrorKind::ExtrinsicCall, op_name)),
            };
            line.splice(op_index - 1..=op_index + 1, [result]);
            for operand in [first, second] {
                // Member access can return a value owned by its operand;
                // releasing the operand then would free the result with it.
                if operand != result
                    && parser.arena.is_live(operand)
                    && parser.arena.get(operand).temporary
                    && !owns(parser, operand, result)
                {
                    parser.arena.release(operand);
                }
            }
            Ok(())
        }
        Fixity::Pre | Fixity::Post | Fixity::Sur => Err(LineError::new(ErrorKind::UnsupportedFixity, op_name)),
    }
}

/// Whether `target` is owned (directly or transitively) by `root`.
fn owns(parser: &Parser, root: NodeId, target: NodeId) -> bool {
    parser
        .arena
        .get(root)
        .owned_ids()
        .iter()
        .any(|&child| child == target || owns(parser, child, target))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{lexer::operator_split, paren::parenthesize};

    fn eval_str(parser: &mut Parser, text: &str) -> Result<NodeId, LineError> {
        let tokens = operator_split(text);
        let bag = parenthesize(&tokens)?;
        let scope = parser.global();
        evaluate(parser, scope, &bag)
    }

    /// A literal token manufactures a temporary of the best-matching
    /// intrinsic type.
    #[test]
    fn literals_manufacture_temporaries() {
        let mut parser = Parser::new();
        let result = eval_str(&mut parser, "5").unwrap();
        let node = parser.arena.get(result);
        assert!(node.temporary);
        assert_eq!(node.instance().unwrap().payload, Payload::Int(5));
        let ty = node.instance().unwrap().ty.unwrap();
        assert_eq!(parser.arena.get(ty).name, "int");
    }

    /// An unresolved name reduces to a typeless temporary carrying the
    /// token text.
    #[test]
    fn unresolved_names_become_placeholders() {
        let mut parser = Parser::new();
        let result = eval_str(&mut parser, "ghost").unwrap();
        let node = parser.arena.get(result);
        assert!(node.temporary);
        assert_eq!(node.name, "ghost");
        assert!(node.instance().unwrap().ty.is_none());
    }

    /// Empty bookkeeping tokens from the segmenter are skipped.
    #[test]
    fn empty_tokens_are_skipped() {
        let mut parser = Parser::new();
        let result = eval_str(&mut parser, "  5  ").unwrap();
        assert_eq!(parser.arena.get(result).instance().unwrap().payload, Payload::Int(5));
    }

    /// Infix application consumes its temporary operands.
    #[test]
    fn infix_releases_consumed_temporaries() {
        let mut parser = Parser::new();
        let before = parser.stats().live;
        let result = eval_str(&mut parser, "2 + 3").unwrap();
        assert_eq!(parser.arena.get(result).instance().unwrap().payload, Payload::Int(5));
        parser.arena.release(result);
        assert_eq!(parser.stats().live, before);
    }

    #[test]
    fn leftover_list_without_operator_errors() {
        let mut parser = Parser::new();
        let err = eval_str(&mut parser, "1 2").unwrap_err();
        assert_eq!(err.kind, ErrorKind::MissingOperator);
    }
}
