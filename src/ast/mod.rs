pub mod locator;
pub mod sexpr;
pub mod visitor;

use serde::Serialize;

use crate::span::Span;

/// Index of a node in its [`Tree`]. Parents are referenced by id, never owned.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct NodeId(u32);

impl NodeId {
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum NodeKind {
    Root,
    Blob,
    Identifier,
    Variable,
    VariableDefinition,
    StringLiteral,
    ClassRef,
    TypeReference,
    FunctionCall,
    Resource,
    ResourceAttribute,
    ClassDecl,
    NodeDecl,
    DefineDecl,
    CaseStmt,
    Condition,
    ClassParam,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct CaseArm {
    pub matcher: NodeId,
    pub body: NodeId,
}

/// Per-kind payload. Fields holding a [`NodeId`] always point at a child of the node.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum NodeData<'ast> {
    Root,
    /// Unclassified token span; recognized sub-elements are its children.
    Blob,
    Identifier { name: &'ast str },
    /// Variable usage.
    Variable { name: &'ast str },
    /// Variable binding, `$x = ...` or a parameter.
    VariableDefinition { name: &'ast str },
    /// Unquoted literal text; `${var}` interpolations are `Variable` children.
    StringLiteral { value: &'ast str },
    ClassRef { name: Option<NodeId> },
    TypeReference { name: &'ast str },
    FunctionCall { name: &'ast str },
    Resource { resource_type: &'ast str, title: Option<NodeId> },
    ResourceAttribute { name: &'ast str, value: Option<NodeId> },
    ClassDecl { name: Option<NodeId>, inherits: Option<NodeId>, body: Option<NodeId> },
    /// Node names are kept as raw token text, quotes included.
    NodeDecl { names: &'ast [&'ast str], body: Option<NodeId> },
    DefineDecl { name: &'ast str, body: Option<NodeId> },
    CaseStmt { control: Option<NodeId>, arms: Vec<CaseArm> },
    /// `if`, or `unless` when `negated`. An `elsif` is a nested condition in `otherwise`.
    Condition {
        negated: bool,
        condition: Option<NodeId>,
        consequence: Option<NodeId>,
        otherwise: Option<NodeId>,
    },
    ClassParam { type_name: &'ast str, variable: Option<NodeId>, default: Option<NodeId> },
}

impl NodeData<'_> {
    pub fn kind(&self) -> NodeKind {
        match self {
            NodeData::Root => NodeKind::Root,
            NodeData::Blob => NodeKind::Blob,
            NodeData::Identifier { .. } => NodeKind::Identifier,
            NodeData::Variable { .. } => NodeKind::Variable,
            NodeData::VariableDefinition { .. } => NodeKind::VariableDefinition,
            NodeData::StringLiteral { .. } => NodeKind::StringLiteral,
            NodeData::ClassRef { .. } => NodeKind::ClassRef,
            NodeData::TypeReference { .. } => NodeKind::TypeReference,
            NodeData::FunctionCall { .. } => NodeKind::FunctionCall,
            NodeData::Resource { .. } => NodeKind::Resource,
            NodeData::ResourceAttribute { .. } => NodeKind::ResourceAttribute,
            NodeData::ClassDecl { .. } => NodeKind::ClassDecl,
            NodeData::NodeDecl { .. } => NodeKind::NodeDecl,
            NodeData::DefineDecl { .. } => NodeKind::DefineDecl,
            NodeData::CaseStmt { .. } => NodeKind::CaseStmt,
            NodeData::Condition { .. } => NodeKind::Condition,
            NodeData::ClassParam { .. } => NodeKind::ClassParam,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct Node<'ast> {
    pub data: NodeData<'ast>,
    start: usize,
    end: usize,
    parent: Option<NodeId>,
    children: Vec<NodeId>,
}

/// Arena of nodes built by one forward pass. Node 0 is the root and spans the input.
#[derive(Debug, Clone, Serialize)]
pub struct Tree<'ast> {
    nodes: Vec<Node<'ast>>,
}

impl<'ast> Tree<'ast> {
    pub fn new(len: usize) -> Self {
        Self {
            nodes: vec![Node {
                data: NodeData::Root,
                start: 0,
                end: len,
                parent: None,
                children: Vec::new(),
            }],
        }
    }

    pub fn root(&self) -> NodeId {
        NodeId(0)
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.len() == 1
    }

    pub fn node(&self, id: NodeId) -> &Node<'ast> {
        &self.nodes[id.index()]
    }

    pub fn data(&self, id: NodeId) -> &NodeData<'ast> {
        &self.node(id).data
    }

    pub fn kind(&self, id: NodeId) -> NodeKind {
        self.data(id).kind()
    }

    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.node(id).parent
    }

    pub fn children(&self, id: NodeId) -> &[NodeId] {
        &self.node(id).children
    }

    pub fn start(&self, id: NodeId) -> usize {
        self.node(id).start
    }

    pub fn end(&self, id: NodeId) -> usize {
        self.node(id).end
    }

    pub fn span(&self, id: NodeId) -> Span {
        Span::new(self.start(id), self.end(id))
    }

    pub fn children_of_kind(&self, id: NodeId, kind: NodeKind) -> impl Iterator<Item = NodeId> + '_ {
        self.children(id).iter().copied().filter(move |&c| self.kind(c) == kind)
    }

    /// All nodes below `id` in source order.
    pub fn descendants(&self, id: NodeId) -> Vec<NodeId> {
        let mut out = Vec::new();
        let mut stack: Vec<NodeId> = self.children(id).iter().rev().copied().collect();
        while let Some(next) = stack.pop() {
            out.push(next);
            stack.extend(self.children(next).iter().rev().copied());
        }
        out
    }

    /// Name of a declaration, reference, call or binding, where the kind has one.
    pub fn name(&self, id: NodeId) -> Option<&'ast str> {
        match *self.data(id) {
            NodeData::Identifier { name }
            | NodeData::Variable { name }
            | NodeData::VariableDefinition { name }
            | NodeData::TypeReference { name }
            | NodeData::FunctionCall { name }
            | NodeData::ResourceAttribute { name, .. }
            | NodeData::DefineDecl { name, .. } => Some(name),
            NodeData::ClassRef { name } | NodeData::ClassDecl { name, .. } => {
                name.and_then(|n| self.name(n))
            }
            _ => None,
        }
    }

    pub fn params(&self, id: NodeId) -> impl Iterator<Item = NodeId> + '_ {
        self.children_of_kind(id, NodeKind::ClassParam)
    }

    pub fn attributes(&self, id: NodeId) -> impl Iterator<Item = NodeId> + '_ {
        self.children_of_kind(id, NodeKind::ResourceAttribute)
    }

    /// Adds a node under `parent`, keeping siblings ordered by start offset.
    /// `end` is a lower bound; [`Tree::seal`] widens it to cover the children.
    pub(crate) fn add(&mut self, parent: NodeId, start: usize, end: usize, data: NodeData<'ast>) -> NodeId {
        let id = NodeId(self.nodes.len() as u32);
        self.nodes.push(Node {
            data,
            start,
            end: end.max(start),
            parent: None,
            children: Vec::new(),
        });
        self.attach(parent, id);
        id
    }

    fn attach(&mut self, parent: NodeId, child: NodeId) {
        let start = self.start(child);
        let siblings = &self.nodes[parent.index()].children;
        let at = siblings.partition_point(|&s| self.nodes[s.index()].start <= start);
        self.nodes[parent.index()].children.insert(at, child);
        self.nodes[child.index()].parent = Some(parent);
    }

    /// Moves `child` under `new_parent`, updating both sides.
    pub(crate) fn reparent(&mut self, child: NodeId, new_parent: NodeId) {
        debug_assert_ne!(child, self.root(), "the root cannot be re-parented");
        if let Some(old) = self.parent(child) {
            let siblings = &mut self.nodes[old.index()].children;
            let before = siblings.len();
            siblings.retain(|&s| s != child);
            debug_assert_eq!(siblings.len() + 1, before, "child missing from its parent");
        }
        self.attach(new_parent, child);
    }

    pub(crate) fn data_mut(&mut self, id: NodeId) -> &mut NodeData<'ast> {
        &mut self.nodes[id.index()].data
    }

    pub(crate) fn set_end(&mut self, id: NodeId, end: usize) {
        let node = &mut self.nodes[id.index()];
        node.end = node.end.max(end);
    }

    /// Widens every end offset to cover its children. Runs once, after the pass.
    pub(crate) fn seal(&mut self) {
        let mut order = Vec::with_capacity(self.nodes.len());
        let mut stack = vec![self.root()];
        while let Some(id) = stack.pop() {
            order.push(id);
            stack.extend(self.children(id).iter().copied());
        }
        for &id in order.iter().rev() {
            let children_end = self.children(id).iter().map(|&c| self.end(c)).max();
            if let Some(children_end) = children_end {
                self.set_end(id, children_end);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn siblings_stay_in_source_order() {
        let mut tree = Tree::new(20);
        let root = tree.root();
        let late = tree.add(root, 10, 12, NodeData::Blob);
        let early = tree.add(root, 2, 4, NodeData::Blob);
        assert_eq!(tree.children(root), &[early, late]);
        assert_eq!(tree.parent(early), Some(root));
    }

    #[test]
    fn reparent_updates_both_sides() {
        let mut tree = Tree::new(20);
        let root = tree.root();
        let title = tree.add(root, 5, 8, NodeData::StringLiteral { value: "a" });
        let resource = tree.add(root, 0, 0, NodeData::Resource { resource_type: "file", title: None });
        tree.reparent(title, resource);
        assert_eq!(tree.children(root), &[resource]);
        assert_eq!(tree.children(resource), &[title]);
        assert_eq!(tree.parent(title), Some(resource));
    }

    #[test]
    fn seal_widens_ends_to_children() {
        let mut tree = Tree::new(30);
        let root = tree.root();
        let class = tree.add(root, 0, 0, NodeData::ClassDecl { name: None, inherits: None, body: None });
        let body = tree.add(class, 8, 20, NodeData::Blob);
        tree.add(body, 10, 12, NodeData::Variable { name: "$x" });
        tree.seal();
        assert_eq!(tree.span(class), Span::new(0, 20));
        assert_eq!(tree.end(root), 30);
    }
}
