use crate::ast::{NodeId, Tree};

/// Depth-first traversal over a [`Tree`]. Override `visit_node` and call
/// [`walk_node`] to keep descending.
pub trait Visitor<'ast> {
    fn visit_tree(&mut self, tree: &Tree<'ast>) {
        self.visit_node(tree, tree.root());
    }

    fn visit_node(&mut self, tree: &Tree<'ast>, id: NodeId) {
        walk_node(self, tree, id);
    }
}

pub fn walk_node<'ast, V: Visitor<'ast> + ?Sized>(visitor: &mut V, tree: &Tree<'ast>, id: NodeId) {
    for &child in tree.children(id) {
        visitor.visit_node(tree, child);
    }
}
