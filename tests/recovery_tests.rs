use bumpalo::Bump;
use puppet_parser::ast::{NodeData, NodeKind};
use puppet_parser::parser::parse_str;

fn kinds_below_root(code: &str) -> Vec<NodeKind> {
    let arena = Bump::new();
    let manifest = parse_str(code, &arena);
    assert!(manifest.status.is_ok());
    let tree = &manifest.tree;
    tree.descendants(tree.root()).into_iter().map(|id| tree.kind(id)).collect()
}

#[test]
fn test_unclosed_bracket_runs_to_end_of_input() {
    let code = "class a { $x = [1, 2 }\nclass b { }\n";
    let arena = Bump::new();
    let manifest = parse_str(code, &arena);
    let tree = &manifest.tree;
    let class = tree.children(tree.root())[0];
    assert_eq!(tree.children(tree.root()).len(), 1);
    assert_eq!(tree.end(class), code.len());
}

#[test]
fn test_missing_class_body() {
    let code = "class a inherits\nclass b { $y = 1 }";
    let arena = Bump::new();
    let manifest = parse_str(code, &arena);
    let tree = &manifest.tree;
    let classes: Vec<_> = tree.children(tree.root()).iter().map(|&c| tree.name(c)).collect();
    assert_eq!(classes, [Some("a"), Some("b")]);
    let NodeData::ClassDecl { inherits, body, .. } = *tree.data(tree.children(tree.root())[0]) else {
        panic!("expected a class");
    };
    assert_eq!((inherits, body), (None, None));
}

#[test]
fn test_stray_closer_does_not_swallow_later_declarations() {
    for code in ["class a { foo) }\nclass b { $x = 1 }\n", "class a { $y = 1] }\nclass b { $x = 1 }\n"] {
        let arena = Bump::new();
        let manifest = parse_str(code, &arena);
        let tree = &manifest.tree;
        let classes: Vec<_> = tree.children(tree.root()).iter().map(|&c| tree.name(c)).collect();
        assert_eq!(classes, [Some("a"), Some("b")], "{code}");

        let first = tree.children(tree.root())[0];
        assert_eq!(tree.end(first), code.find('}').expect("first close") + 1);
        let NodeData::ClassDecl { body: Some(body), .. } = *tree.data(tree.children(tree.root())[1]) else {
            panic!("expected a class with a body");
        };
        let bindings: Vec<_> = tree.children(body).iter().filter_map(|&c| tree.name(c)).collect();
        assert_eq!(bindings, ["$x"]);
    }
}

#[test]
fn test_resource_without_colon_keeps_title() {
    let code = "class a { file { '/x' ensure => present } $z = 1 }";
    let arena = Bump::new();
    let manifest = parse_str(code, &arena);
    let tree = &manifest.tree;
    let NodeData::ClassDecl { body: Some(body), .. } = *tree.data(tree.children(tree.root())[0]) else {
        panic!("expected a class with a body");
    };
    let kinds: Vec<_> = tree.children(body).iter().map(|&c| tree.kind(c)).collect();
    assert_eq!(kinds, [NodeKind::StringLiteral, NodeKind::VariableDefinition]);
    assert_eq!(tree.end(body), code.len());
}

#[test]
fn test_resource_without_title() {
    let kinds = kinds_below_root("class a { file { } $z = 1 }");
    assert!(!kinds.contains(&NodeKind::Resource));
    assert!(kinds.contains(&NodeKind::VariableDefinition));
}

#[test]
fn test_malformed_class_reference_abandons_list() {
    let code = "class a { include Class[$name], other $y = 1 }";
    let arena = Bump::new();
    let manifest = parse_str(code, &arena);
    let tree = &manifest.tree;
    let descendants = tree.descendants(tree.root());
    let call = descendants
        .iter()
        .copied()
        .find(|&id| tree.kind(id) == NodeKind::FunctionCall)
        .expect("include call");
    assert!(tree.children(call).is_empty());
    let definitions: Vec<_> = descendants
        .iter()
        .copied()
        .filter(|&id| tree.kind(id) == NodeKind::VariableDefinition)
        .filter_map(|id| tree.name(id))
        .collect();
    assert_eq!(definitions, ["$y"]);
}

#[test]
fn test_unterminated_string_inside_class() {
    let kinds = kinds_below_root("class a {\n  $x = \"abc\n  $y = 2\n}\n");
    assert_eq!(
        kinds,
        [
            NodeKind::ClassDecl,
            NodeKind::Identifier,
            NodeKind::Blob,
            NodeKind::VariableDefinition,
            NodeKind::StringLiteral,
            NodeKind::VariableDefinition,
        ]
    );
}

#[test]
fn test_else_without_body() {
    let kinds = kinds_below_root("class a { if $x { } else $y = 1 }");
    assert!(kinds.contains(&NodeKind::Condition));
    assert!(kinds.contains(&NodeKind::VariableDefinition));
}

#[test]
fn test_truncated_inputs_never_panic() {
    let code = "class a ($p = 1) inherits b { case $x { 'a': { file { ['t']: mode => \"${m}\" } } } \
                if $y { } elsif $z { } else { include Class['c'] } }\n\
                define d { notice($q.foo(1)) }\nnode 'n' { class { 'k': } }\n";
    for end in 0..=code.len() {
        let arena = Bump::new();
        let manifest = parse_str(&code[..end], &arena);
        assert!(manifest.status.is_ok());
        assert_eq!(manifest.tree.end(manifest.tree.root()), end);
    }
}

#[test]
fn test_empty_and_garbage_input() {
    assert!(kinds_below_root("").is_empty());
    assert!(kinds_below_root("@@@ } ) ] \\u12").is_empty());
}
