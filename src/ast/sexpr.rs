use crate::ast::visitor::Visitor;
use crate::ast::*;

/// Renders a tree as an indented S-expression, one node per line.
pub struct SExprFormatter {
    output: String,
    indent: usize,
}

impl Default for SExprFormatter {
    fn default() -> Self {
        Self::new()
    }
}

impl SExprFormatter {
    pub fn new() -> Self {
        Self {
            output: String::new(),
            indent: 0,
        }
    }

    pub fn format(tree: &Tree<'_>) -> String {
        let mut formatter = Self::new();
        formatter.visit_tree(tree);
        formatter.finish()
    }

    pub fn finish(self) -> String {
        self.output
    }

    fn write(&mut self, s: &str) {
        self.output.push_str(s);
    }

    fn newline(&mut self) {
        self.output.push('\n');
        for _ in 0..self.indent {
            self.output.push_str("  ");
        }
    }

    fn head(tree: &Tree<'_>, id: NodeId) -> String {
        match tree.data(id) {
            NodeData::Root => "manifest".to_string(),
            NodeData::Blob => "blob".to_string(),
            NodeData::Identifier { name } => format!("ident {name}"),
            NodeData::Variable { name } => format!("var {name}"),
            NodeData::VariableDefinition { name } => format!("vardef {name}"),
            NodeData::StringLiteral { value } => format!("string {value:?}"),
            NodeData::ClassRef { .. } => {
                let keyword = match tree.parent(id).map(|p| tree.data(p)) {
                    Some(NodeData::ClassDecl { inherits: Some(i), .. }) if *i == id => "inherits",
                    _ => "classref",
                };
                format!("{keyword} {}", tree.name(id).unwrap_or_default())
            }
            NodeData::TypeReference { name } => format!("typeref {name}"),
            NodeData::FunctionCall { name } => format!("call {name}"),
            NodeData::Resource { resource_type, .. } => format!("resource {resource_type}"),
            NodeData::ResourceAttribute { name, .. } => format!("attr {name}"),
            NodeData::ClassDecl { .. } => format!("class {}", tree.name(id).unwrap_or_default()),
            NodeData::NodeDecl { names, .. } => format!("node {}", names.join(" ")),
            NodeData::DefineDecl { name, .. } => format!("define {name}"),
            NodeData::CaseStmt { .. } => "case".to_string(),
            NodeData::Condition { negated: true, .. } => "unless".to_string(),
            NodeData::Condition { .. } => match tree.parent(id).map(|p| tree.kind(p)) {
                Some(NodeKind::Condition) => "elsif".to_string(),
                _ => "if".to_string(),
            },
            NodeData::ClassParam { type_name, .. } => format!("param {type_name}"),
        }
    }

    /// Name identifiers are already part of their owner's head.
    fn is_inlined(tree: &Tree<'_>, id: NodeId) -> bool {
        match tree.parent(id).map(|p| tree.data(p)) {
            Some(NodeData::ClassRef { name: Some(n) }) | Some(NodeData::ClassDecl { name: Some(n), .. }) => {
                *n == id
            }
            _ => false,
        }
    }
}

impl<'ast> Visitor<'ast> for SExprFormatter {
    fn visit_node(&mut self, tree: &Tree<'ast>, id: NodeId) {
        self.write("(");
        self.write(&Self::head(tree, id));
        self.indent += 1;
        for &child in tree.children(id) {
            if Self::is_inlined(tree, child) {
                continue;
            }
            self.newline();
            self.visit_node(tree, child);
        }
        self.indent -= 1;
        self.write(")");
    }
}
