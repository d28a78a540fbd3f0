use crate::ast::visitor::{walk_node, Visitor};
use crate::ast::{NodeId, Tree};

/// Finds the chain of nodes enclosing an offset, outermost first.
pub struct Locator {
    target: usize,
    path: Vec<NodeId>,
}

impl Locator {
    pub fn new(target: usize) -> Self {
        Self {
            target,
            path: Vec::new(),
        }
    }

    pub fn find(tree: &Tree<'_>, target: usize) -> Vec<NodeId> {
        let mut locator = Self::new(target);
        locator.visit_tree(tree);
        locator.path
    }

    /// The innermost node enclosing `target`.
    pub fn innermost(tree: &Tree<'_>, target: usize) -> Option<NodeId> {
        Self::find(tree, target).pop()
    }
}

impl<'ast> Visitor<'ast> for Locator {
    fn visit_node(&mut self, tree: &Tree<'ast>, id: NodeId) {
        // Adjacent siblings share a boundary offset; the first one claims it.
        if let Some(&last) = self.path.last()
            && tree.parent(id) != Some(last)
        {
            return;
        }
        if tree.span(id).contains(self.target) {
            self.path.push(id);
            walk_node(self, tree, id);
        }
    }
}
