use std::env;
use std::fs;

use anyhow::{bail, Context, Result};
use bumpalo::Bump;
use puppet_parser::ast::NodeKind;
use puppet_parser::ast::sexpr::SExprFormatter;
use puppet_parser::line_index::LineIndex;
use puppet_parser::parser::parse_str;

/// Prints the tree of one manifest followed by every declaration with its position.
fn main() -> Result<()> {
    let args: Vec<String> = env::args().collect();
    if args.len() < 2 {
        bail!("usage: {} <file>", args[0]);
    }

    let file_path = &args[1];
    let source = fs::read_to_string(file_path).with_context(|| format!("could not read {file_path}"))?;

    let arena = Bump::new();
    let manifest = parse_str(&source, &arena);
    let tree = &manifest.tree;
    println!("{}", SExprFormatter::format(tree));

    let index = LineIndex::new(&source);
    for id in tree.descendants(tree.root()) {
        let kind = tree.kind(id);
        if matches!(kind, NodeKind::ClassDecl | NodeKind::DefineDecl | NodeKind::NodeDecl | NodeKind::Resource) {
            let (line, col) = index.line_col(tree.start(id));
            println!("{line}:{col} {kind:?} {}", tree.name(id).unwrap_or("-"));
        }
    }
    if let Err(interrupted) = manifest.status {
        println!("Parse stopped early: {interrupted}");
    }
    Ok(())
}
