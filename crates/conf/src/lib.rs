#![doc = include_str!("../../../README.md")]
#![expect(dead_code, reason = "captured function bodies are stored but not yet executable")]

mod arena;
mod error;
mod eval;
mod function;
mod instance;
mod intrinsics;
pub mod lexer;
mod object;
mod paren;
mod parse;
mod scope;
mod types;

pub use crate::{
    arena::{ArenaStats, NodeId},
    error::{ConfError, ErrorKind, LineError},
    function::Fixity,
    object::{Object, Value},
    parse::Parser,
    scope::Kind,
};
