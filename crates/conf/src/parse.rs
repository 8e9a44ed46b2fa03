//! The parser context and line dispatcher.

use std::{
    fs,
    path::{Path, PathBuf},
};

use ahash::AHashMap;
use tracing::debug;

use crate::{
    arena::{Arena, ArenaStats, NodeId},
    error::{ConfError, ErrorKind, LineError},
    eval::evaluate,
    function::Fixity,
    intrinsics,
    lexer::{filter_split, operator_split, trim, SplitFilter, STRING_QUOTE},
    object::{Object, Value},
    paren::parenthesize,
    scope::{add_child, get_by_name, merge_from, Kind, Node, NodeData, ScopeData},
    types::{create_instance, InstanceFactory, Registry, TypeData, NAME_TYPE_OBJECT},
};

const COMMENT_CHAR: char = '#';
const DIRECTIVE_CHAR: char = '%';
const SCOPE_BEGIN_CHAR: char = '{';
const SCOPE_END_CHAR: char = '}';
const KEYWORD_CLASS: &str = "class";

/// Delimiters for declaration and directive tokenization: whitespace is
/// discarded, the rest are kept as single-character tokens.
const LINE_DELIMITERS: &str = " =#%+-*/.";

#[derive(Debug, Clone, Copy)]
enum Directive {
    Use,
    Default,
    Define,
    Type,
    Function,
}

#[derive(Debug, Clone, Copy)]
enum Keyword {
    Class,
}

/// Interpreter context: the arena of scopeables, the intrinsic scope with
/// its type registry, and the global scope that parsing populates.
///
/// All state lives in the context — there are no process-wide globals —
/// so tests and embedders can construct independent parsers. The
/// intrinsic scope is built once per context and shared (by id) as the
/// global scope's parent; teardown never traverses into it because
/// parents are non-owning.
pub struct Parser {
    pub(crate) arena: Arena,
    pub(crate) registry: Registry,
    intrinsic: NodeId,
    global: NodeId,
    formatter: Option<fn(String) -> String>,
    directives: AHashMap<&'static str, Directive>,
    keywords: AHashMap<&'static str, Keyword>,
}

impl Parser {
    #[must_use]
    pub fn new() -> Self {
        let mut arena = Arena::new();
        let (intrinsic, registry) = intrinsics::bootstrap(&mut arena);
        let global = arena.alloc(Node::scope("", Some(intrinsic)));

        let mut directives = AHashMap::new();
        directives.insert("use", Directive::Use);
        directives.insert("default", Directive::Default);
        directives.insert("define", Directive::Define);
        directives.insert("type", Directive::Type);
        directives.insert("function", Directive::Function);

        let mut keywords = AHashMap::new();
        keywords.insert(KEYWORD_CLASS, Keyword::Class);

        Self {
            arena,
            registry,
            intrinsic,
            global,
            formatter: None,
            directives,
            keywords,
        }
    }

    /// Installs a hook applied to each trimmed non-empty line before
    /// classification. Pass `None` to remove it.
    pub fn set_formatter(&mut self, formatter: Option<fn(String) -> String>) {
        self.formatter = formatter;
    }

    /// Parses a source file into the global scope and returns that scope.
    ///
    /// Repeated calls keep adding to the same global scope and reuse the
    /// shared intrinsic scope.
    pub fn parse_file(&mut self, path: impl AsRef<Path>) -> Result<NodeId, ConfError> {
        let path = path.as_ref();
        let text = fs::read_to_string(path)?;
        let file_name = path.display().to_string();
        let global = self.global;
        self.parse_text(&text, path.parent(), Some(file_name.as_str()), global)
    }

    /// Parses in-memory source into the global scope.
    ///
    /// Relative paths in `use`/`default` directives resolve against the
    /// process working directory since there is no including file.
    pub fn parse_source(&mut self, source: &str) -> Result<NodeId, ConfError> {
        let global = self.global;
        self.parse_text(source, None, None, global)
    }

    fn parse_text(
        &mut self,
        text: &str,
        dir: Option<&Path>,
        file: Option<&str>,
        into: NodeId,
    ) -> Result<NodeId, ConfError> {
        let text = text.replace('\r', "");
        let delimiters = SplitFilter::with_keeps(LINE_DELIMITERS, &[false], true);
        let mut current = into;

        for (index, raw) in text.split('\n').enumerate() {
            let line_no = index + 1;
            let trimmed = trim(raw);
            if trimmed.is_empty() {
                continue;
            }
            let line = match self.formatter {
                Some(format) => format(trimmed.to_owned()),
                None => trimmed.to_owned(),
            };
            let fail = |error: LineError| ConfError::at(file, line_no, error);

            let tokens: Vec<String> = filter_split(&line, &delimiters, true, true)
                .into_iter()
                .filter(|token| !token.is_empty())
                .collect();

            match line.chars().next() {
                Some(COMMENT_CHAR) => {}
                Some(DIRECTIVE_CHAR) => self.apply_directive(&tokens, current, dir, file, line_no)?,
                Some(SCOPE_BEGIN_CHAR) => {
                    let block = self.arena.alloc(Node::scope("", Some(current)));
                    add_child(&mut self.arena, current, block);
                    current = block;
                }
                Some(SCOPE_END_CHAR) => {
                    if current == into {
                        return Err(fail(LineError::new(ErrorKind::ScopeUnderflow, "}")));
                    }
                    current = self
                        .arena
                        .get(current)
                        .scope_data()
                        .and_then(|data| data.parent)
                        .expect("non-root scope has a parent");
                }
                _ => current = self.statement(&line, &tokens, current).map_err(fail)?,
            }
        }
        Ok(into)
    }

    /// Handles a declaration or expression line; returns the scope the
    /// next line should evaluate in (a `class` line enters the new type).
    fn statement(&mut self, line: &str, tokens: &[String], current: NodeId) -> Result<NodeId, LineError> {
        let first = tokens.first().map_or("", String::as_str);

        if let Some(keyword) = self.keywords.get(first).copied() {
            match keyword {
                Keyword::Class => return self.declare_class(tokens, current),
            }
        }

        let Some(first_node) = get_by_name(&self.arena, current, first, Kind::None) else {
            return Err(LineError::new(ErrorKind::UnresolvedSymbol, first));
        };

        let mut expr_text = line;
        if self.arena.get(first_node).kind() == Kind::Type {
            // Declaration: install a fresh instance, then evaluate the
            // rest of the line with the type name stripped off the head.
            let name = tokens
                .get(1)
                .filter(|name| !name.is_empty())
                .ok_or_else(|| LineError::new(ErrorKind::MissingName, first))?;
            let instance = create_instance(&mut self.arena, first_node, name.clone())?;
            add_child(&mut self.arena, current, instance);
            expr_text = line.split_once(' ').map_or(line, |(_, rest)| rest);
        }

        let expr_tokens = operator_split(expr_text);
        let bag = parenthesize(&expr_tokens)?;
        let result = evaluate(self, current, &bag)?;
        if self.arena.get(result).temporary {
            self.arena.release(result);
        }
        Ok(current)
    }

    /// `class <Name>`: a new type inheriting the `object` intrinsic,
    /// installed in the current scope and made the current scope for the
    /// body lines that follow.
    fn declare_class(&mut self, tokens: &[String], current: NodeId) -> Result<NodeId, LineError> {
        let name = tokens
            .get(1)
            .filter(|name| !name.is_empty())
            .ok_or_else(|| LineError::new(ErrorKind::MissingName, KEYWORD_CLASS))?;
        let ty = self.arena.alloc(Node {
            name: name.clone(),
            temporary: false,
            data: NodeData::Type(TypeData {
                scope: ScopeData {
                    parent: Some(current),
                    children: vec![],
                },
                factory: InstanceFactory::Structural,
            }),
        });
        let object = self
            .registry
            .get(NAME_TYPE_OBJECT)
            .copied()
            .expect("object intrinsic is registered at bootstrap");
        merge_from(&mut self.arena, ty, object);
        add_child(&mut self.arena, current, ty);
        debug!(class = %name, "declared class");
        Ok(ty)
    }

    fn apply_directive(
        &mut self,
        tokens: &[String],
        current: NodeId,
        dir: Option<&Path>,
        file: Option<&str>,
        line_no: usize,
    ) -> Result<(), ConfError> {
        let fail = |error: LineError| ConfError::at(file, line_no, error);
        let verb = tokens.get(1).map_or("", String::as_str);
        let Some(directive) = self.directives.get(verb).copied() else {
            return Err(fail(LineError::new(ErrorKind::UnknownDirective, verb)));
        };
        match directive {
            // `use` parses the referenced file and then acts as `default`;
            // both currently fold the included scope into the current one.
            Directive::Use | Directive::Default => {
                let arg = tokens
                    .get(2)
                    .ok_or_else(|| fail(LineError::new(ErrorKind::MissingArgument, verb)))?;
                let path = unquote(arg).ok_or_else(|| fail(LineError::new(ErrorKind::MalformedLiteral, arg.clone())))?;
                self.include(Path::new(path), dir, current)
            }
            // Reserved verbs are accepted and ignored.
            Directive::Define | Directive::Type | Directive::Function => Ok(()),
        }
    }

    /// Parses the referenced file into a staging scope and merges that
    /// scope into `current`.
    fn include(&mut self, path: &Path, dir: Option<&Path>, current: NodeId) -> Result<(), ConfError> {
        let resolved: PathBuf = match dir {
            Some(dir) if path.is_relative() => dir.join(path),
            _ => path.to_path_buf(),
        };
        debug!(path = %resolved.display(), "including file");
        let text = fs::read_to_string(&resolved)?;
        let staging = self.arena.alloc(Node::scope("", Some(self.intrinsic)));
        let file_name = resolved.display().to_string();
        self.parse_text(&text, resolved.parent(), Some(file_name.as_str()), staging)?;
        merge_from(&mut self.arena, current, staging);
        // The staging tree is intentionally never released: instances
        // merged out of it keep referencing types declared inside it.
        Ok(())
    }

    // ------------------------------------------------------------------
    // Object-model surface for embedders.
    // ------------------------------------------------------------------

    /// The global scope populated by parsing.
    #[must_use]
    pub fn global(&self) -> NodeId {
        self.global
    }

    /// The shared intrinsic scope (the global scope's parent).
    #[must_use]
    pub fn intrinsic_scope(&self) -> NodeId {
        self.intrinsic
    }

    /// Scope-chain lookup: first child of `scope` matching `name` and the
    /// kind filter, walking parents when the scope itself has no match.
    #[must_use]
    pub fn find(&self, scope: NodeId, name: &str, filter: Kind) -> Option<NodeId> {
        get_by_name(&self.arena, scope, name, filter)
    }

    #[must_use]
    pub fn name(&self, id: NodeId) -> &str {
        &self.arena.get(id).name
    }

    #[must_use]
    pub fn kind(&self, id: NodeId) -> Kind {
        self.arena.get(id).kind()
    }

    #[must_use]
    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.arena.get(id).scope_data().and_then(|data| data.parent)
    }

    /// Children of a scope or type, in insertion order. Empty for nodes
    /// that bear no children.
    #[must_use]
    pub fn children(&self, id: NodeId) -> &[NodeId] {
        match self.arena.get(id).scope_data() {
            Some(data) => &data.children,
            None => &[],
        }
    }

    /// An instance's type, when it has one.
    #[must_use]
    pub fn type_of(&self, id: NodeId) -> Option<NodeId> {
        self.arena.get(id).instance().and_then(|data| data.ty)
    }

    /// An instance's owned sub-instances, in declaration order.
    #[must_use]
    pub fn sub_instances(&self, id: NodeId) -> &[NodeId] {
        match self.arena.get(id).instance() {
            Some(data) => &data.subs,
            None => &[],
        }
    }

    /// The intrinsic payload of an instance. `Value::None` for structural
    /// instances; `None` for nodes that are not instances.
    #[must_use]
    pub fn value(&self, id: NodeId) -> Option<Value> {
        self.arena.get(id).instance().map(|data| Value::from_payload(&data.payload))
    }

    /// An operator's priority and fixity, when `id` is an operator.
    #[must_use]
    pub fn operator_info(&self, id: NodeId) -> Option<(u8, Fixity)> {
        self.arena.get(id).operator().map(|op| (op.priority, op.fixity))
    }

    /// Builds a read-only mirrored snapshot of a scope tree.
    #[must_use]
    pub fn snapshot(&self, scope: NodeId) -> Object {
        Object::snapshot(self, scope)
    }

    /// Live/free node counts, for release-discipline diagnostics.
    #[must_use]
    pub fn stats(&self) -> ArenaStats {
        self.arena.stats()
    }
}

impl Default for Parser {
    fn default() -> Self {
        Self::new()
    }
}

/// Strips the outer quotes from a directive's string argument.
fn unquote(text: &str) -> Option<&str> {
    text.strip_prefix(STRING_QUOTE)?.strip_suffix(STRING_QUOTE)
}
