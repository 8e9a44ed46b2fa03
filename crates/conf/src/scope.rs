use crate::{
    arena::{Arena, NodeId},
    function::{FunctionData, OperatorData},
    instance::InstanceData,
    types::TypeData,
};

/// Object kind of a scopeable, used both as a tag and as a lookup filter.
///
/// `None` is the filter sentinel meaning "any kind"; it is never the kind
/// of a stored node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, strum::Display, serde::Serialize, serde::Deserialize)]
#[strum(serialize_all = "lowercase")]
pub enum Kind {
    Type,
    Instance,
    Function,
    Scope,
    None,
}

/// A scopeable: any named object that can be inserted into a scope.
///
/// The concrete shape lives in [`NodeData`]; behavior that the source
/// language dispatches virtually (kind, clone, operator application)
/// becomes explicit dispatch on the variant tag.
#[derive(Debug)]
pub(crate) struct Node {
    pub name: String,
    /// Temporaries are owned by the evaluator and released as soon as an
    /// operator consumes them or a dead expression result is discarded.
    pub temporary: bool,
    pub data: NodeData,
}

#[derive(Debug)]
pub(crate) enum NodeData {
    Scope(ScopeData),
    Type(TypeData),
    Instance(InstanceData),
    Function(FunctionData),
    Operator(OperatorData),
}

/// The child-bearing record embedded in scopes and types.
#[derive(Debug, Default)]
pub(crate) struct ScopeData {
    /// Back reference; parents outlive children and are never owned.
    pub parent: Option<NodeId>,
    /// Owned children in insertion order. No name uniqueness is enforced;
    /// lookup returns the first match.
    pub children: Vec<NodeId>,
}

impl Node {
    pub fn scope(name: impl Into<String>, parent: Option<NodeId>) -> Self {
        Self {
            name: name.into(),
            temporary: false,
            data: NodeData::Scope(ScopeData { parent, children: vec![] }),
        }
    }

    /// Kind reported to lookups. Operators count as functions, exactly as
    /// the member-function lookup expects.
    pub fn kind(&self) -> Kind {
        match &self.data {
            NodeData::Scope(_) => Kind::Scope,
            NodeData::Type(_) => Kind::Type,
            NodeData::Instance(_) => Kind::Instance,
            NodeData::Function(_) | NodeData::Operator(_) => Kind::Function,
        }
    }

    /// The embedded scope record, for the node kinds that carry one.
    pub fn scope_data(&self) -> Option<&ScopeData> {
        match &self.data {
            NodeData::Scope(scope) => Some(scope),
            NodeData::Type(ty) => Some(&ty.scope),
            _ => None,
        }
    }

    pub fn scope_data_mut(&mut self) -> Option<&mut ScopeData> {
        match &mut self.data {
            NodeData::Scope(scope) => Some(scope),
            NodeData::Type(ty) => Some(&mut ty.scope),
            _ => None,
        }
    }

    pub fn instance(&self) -> Option<&InstanceData> {
        match &self.data {
            NodeData::Instance(instance) => Some(instance),
            _ => None,
        }
    }

    pub fn instance_mut(&mut self) -> Option<&mut InstanceData> {
        match &mut self.data {
            NodeData::Instance(instance) => Some(instance),
            _ => None,
        }
    }

    pub fn operator(&self) -> Option<&OperatorData> {
        match &self.data {
            NodeData::Operator(op) => Some(op),
            _ => None,
        }
    }

    /// Ids this node owns and releases with itself.
    pub fn owned_ids(&self) -> Vec<NodeId> {
        match &self.data {
            NodeData::Scope(scope) => scope.children.clone(),
            NodeData::Type(ty) => ty.scope.children.clone(),
            NodeData::Instance(instance) => instance.subs.clone(),
            NodeData::Function(_) | NodeData::Operator(_) => vec![],
        }
    }
}

/// Looks `name` up in `scope`'s own children in insertion order, then in
/// the parent chain. The kind filter is preserved through the recursion:
/// a lookup for an instance never resolves to a type of the same name in
/// an enclosing scope.
pub(crate) fn get_by_name(arena: &Arena, scope: NodeId, name: &str, filter: Kind) -> Option<NodeId> {
    let node = arena.get(scope);
    let data = node.scope_data()?;
    for &child in &data.children {
        let child_node = arena.get(child);
        if (filter == Kind::None || child_node.kind() == filter) && child_node.name == name {
            return Some(child);
        }
    }
    data.parent.and_then(|parent| get_by_name(arena, parent, name, filter))
}

/// Appends `child` to `scope`'s children.
///
/// # Panics
/// Panics if `scope` does not carry a scope record.
pub(crate) fn add_child(arena: &mut Arena, scope: NodeId, child: NodeId) {
    arena
        .get_mut(scope)
        .scope_data_mut()
        .expect("add_child target must be a scope")
        .children
        .push(child);
}

/// Recursive merge, the `+=` of the source language: folds `src` into
/// `dst`, overriding left by right.
///
/// For each child of `src`: a same-named instance in `dst` is assigned
/// into (payload copied, sub-instances replaced by deep clones); a
/// same-named scope or type is merged recursively; anything else is deep
/// cloned into `dst`. This is how class declarations inherit the `object`
/// intrinsic and how included files compose.
pub(crate) fn merge_from(arena: &mut Arena, dst: NodeId, src: NodeId) {
    let Some(src_children) = arena.get(src).scope_data().map(|data| data.children.clone()) else {
        return;
    };
    for child in src_children {
        let name = arena.get(child).name.clone();
        match get_by_name(arena, dst, &name, Kind::None) {
            Some(found) => {
                let found_kind = arena.get(found).kind();
                let child_kind = arena.get(child).kind();
                match (found_kind, child_kind) {
                    (Kind::Instance, Kind::Instance) => crate::instance::assign(arena, found, child),
                    (Kind::Scope | Kind::Type, Kind::Scope | Kind::Type) => {
                        merge_from(arena, found, child);
                    }
                    _ => {}
                }
            }
            None => {
                let copy = clone_node(arena, child, name);
                add_child(arena, dst, copy);
            }
        }
    }
}

/// Deep-copies a scopeable under a new name.
///
/// Scopes clone their children recursively; types additionally keep their
/// instance factory; operators keep callback, priority, and fixity;
/// instances keep their intrinsic payload and deep-clone sub-instances.
/// The clone is not registered anywhere and starts non-temporary.
pub(crate) fn clone_node(arena: &mut Arena, src: NodeId, name: String) -> NodeId {
    let data = match &arena.get(src).data {
        NodeData::Scope(scope) => NodeData::Scope(ScopeData {
            parent: scope.parent,
            children: vec![],
        }),
        NodeData::Type(ty) => NodeData::Type(TypeData {
            scope: ScopeData {
                parent: ty.scope.parent,
                children: vec![],
            },
            factory: ty.factory,
        }),
        NodeData::Instance(instance) => NodeData::Instance(InstanceData {
            ty: instance.ty,
            subs: vec![],
            payload: instance.payload.clone(),
        }),
        NodeData::Function(func) => NodeData::Function(FunctionData { body: func.body.clone() }),
        NodeData::Operator(op) => NodeData::Operator(OperatorData {
            func: FunctionData {
                body: op.func.body.clone(),
            },
            priority: op.priority,
            fixity: op.fixity,
        }),
    };
    let copy = arena.alloc(Node {
        name,
        temporary: false,
        data,
    });

    // Children and sub-instances are cloned after the shell so the borrow
    // of `src` is released before the arena is mutated.
    let owned = arena.get(src).owned_ids();
    for child in owned {
        let child_name = arena.get(child).name.clone();
        let child_copy = clone_node(arena, child, child_name);
        match &mut arena.get_mut(copy).data {
            NodeData::Scope(scope) => scope.children.push(child_copy),
            NodeData::Type(ty) => ty.scope.children.push(child_copy),
            NodeData::Instance(instance) => instance.subs.push(child_copy),
            NodeData::Function(_) | NodeData::Operator(_) => {}
        }
    }
    copy
}
