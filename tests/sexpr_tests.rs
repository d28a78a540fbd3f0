use bumpalo::Bump;
use insta::assert_snapshot;
use puppet_parser::ast::sexpr::SExprFormatter;
use puppet_parser::ast::visitor::Visitor;
use puppet_parser::parser::Parser;
use puppet_parser::parser::stream::TokenStream;

fn sexpr(code: &str) -> String {
    let arena = Bump::new();
    let manifest = Parser::new(TokenStream::new(code), &arena).parse_manifest();
    let mut formatter = SExprFormatter::new();
    formatter.visit_tree(&manifest.tree);
    formatter.finish()
}

#[test]
fn test_sexpr_class_with_binding() {
    assert_eq!(
        sexpr("class foo { $x = 1 }"),
        "(manifest\n  (class foo\n    (blob\n      (vardef $x))))"
    );
}

#[test]
fn test_sexpr_node_names_are_raw() {
    assert_eq!(sexpr("node 'a', 'b' { }"), "(manifest\n  (node 'a' 'b'\n    (blob)))");
}

#[test]
fn test_sexpr_if_else() {
    assert_snapshot!(sexpr("class a { if $x { notice('hi') } else { } }"), @r#"
    (manifest
      (class a
        (blob
          (if
            (blob
              (var $x))
            (blob
              (call notice
                (blob
                  (string "hi"))))
            (blob)))))
    "#);
}

#[test]
fn test_sexpr_elsif_chain_nests() {
    assert_snapshot!(sexpr("class a { if $x { } elsif $y { } else { } }"), @r"
    (manifest
      (class a
        (blob
          (if
            (blob
              (var $x))
            (blob)
            (elsif
              (blob
                (var $y))
              (blob)
              (blob))))))
    ");
}

#[test]
fn test_sexpr_include_class_reference() {
    assert_snapshot!(sexpr("class a { include Class['foo::bar'] }"), @r"
    (manifest
      (class a
        (blob
          (call include
            (classref foo::bar)))))
    ");
}

#[test]
fn test_sexpr_resource() {
    assert_snapshot!(sexpr("class a { file { '/tmp/x': ensure => present, mode => '0644' } }"), @r#"
    (manifest
      (class a
        (blob
          (resource file
            (string "/tmp/x")
            (attr ensure
              (blob))
            (attr mode
              (blob
                (string "0644")))))))
    "#);
}

#[test]
fn test_sexpr_class_params_and_inherits() {
    assert_snapshot!(sexpr("class a (String $x = 'y', $z) inherits b { }"), @r#"
    (manifest
      (class a
        (param String
          (vardef $x)
          (blob
            (string "y")))
        (param Any
          (vardef $z))
        (inherits b)
        (blob)))
    "#);
}

#[test]
fn test_sexpr_define() {
    assert_snapshot!(sexpr("define foo::bar ($a) { notice($a) }"), @r"
    (manifest
      (define foo::bar
        (param Any
          (vardef $a))
        (blob
          (call notice
            (blob
              (var $a))))))
    ");
}

#[test]
fn test_sexpr_case() {
    assert_snapshot!(
        sexpr("class a { case $os { 'debian', 'ubuntu': { $p = 'apt' } default: { } } }"),
        @r#"
    (manifest
      (class a
        (blob
          (case
            (blob
              (var $os))
            (blob
              (string "debian")
              (string "ubuntu"))
            (blob
              (vardef $p)
              (string "apt"))
            (blob)
            (blob)))))
    "#
    );
}

#[test]
fn test_sexpr_class_resource_title_is_reference() {
    assert_snapshot!(sexpr("node default { class { 'apache': version => '2.4' } }"), @r#"
    (manifest
      (node default
        (blob
          (resource class
            (classref apache)
            (attr version
              (blob
                (string "2.4")))))))
    "#);
}

#[test]
fn test_sexpr_unless() {
    assert_snapshot!(sexpr("class a { unless $x { } }"), @r"
    (manifest
      (class a
        (blob
          (unless
            (blob
              (var $x))
            (blob)))))
    ");
}
