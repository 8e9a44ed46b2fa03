//! Parenthesization pass: flattens balanced parentheses into a
//! depth-indexed bag of sub-expressions.

use crate::error::{ErrorKind, LineError};

/// Depth-indexed bag of sub-expressions.
///
/// Level `d` holds the token lists opened at nesting depth `d`, in the
/// order their `(` appeared. A closed group leaves a `$k` placeholder in
/// the enclosing list, where `k` is the zero-based index of the group at
/// the inner depth; the evaluator substitutes the group's value when it
/// reaches the placeholder.
#[derive(Debug, Default)]
pub(crate) struct ParenBag {
    levels: Vec<Vec<Vec<String>>>,
}

impl ParenBag {
    pub fn expr(&self, depth: usize, offset: usize) -> &[String] {
        &self.levels[depth][offset]
    }
}

/// Distributes a flat token stream over nesting depths.
///
/// `(` bumps the depth and opens a new list there; `)` drops back and
/// appends the placeholder for the just-closed list; anything else is
/// appended to the current list. Unbalanced parentheses are an error.
pub(crate) fn parenthesize(tokens: &[String]) -> Result<ParenBag, LineError> {
    let mut bag = ParenBag {
        levels: vec![vec![vec![]]],
    };
    let mut depth = 0usize;
    for token in tokens {
        match token.as_str() {
            "(" => {
                depth += 1;
                if bag.levels.len() == depth {
                    bag.levels.push(vec![]);
                }
                bag.levels[depth].push(vec![]);
            }
            ")" => {
                if depth == 0 {
                    return Err(LineError::new(ErrorKind::UnbalancedParens, ")"));
                }
                let inner_index = bag.levels[depth].len() - 1;
                depth -= 1;
                let current = bag.levels[depth].last_mut().expect("level has an open list");
                current.push(format!("${inner_index}"));
            }
            _ => {
                let current = bag.levels[depth].last_mut().expect("level has an open list");
                current.push(token.clone());
            }
        }
    }
    if depth != 0 {
        return Err(LineError::new(ErrorKind::UnbalancedParens, "("));
    }
    Ok(bag)
}
