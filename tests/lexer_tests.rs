use puppet_parser::Span;
use puppet_parser::lexer::Lexer;
use puppet_parser::lexer::keywords::{KEYWORDS, KeywordRule};
use puppet_parser::lexer::token::{Category, Part, TokenKind};

const MANIFEST: &str = r#"# Install and run ntp
class ntp (
  String $server = 'pool.ntp.org',
) inherits ntp::params {
  package { 'ntp': ensure => present }
  file { '/etc/ntp.conf':
    content => template("ntp/${::osfamily}.erb"),
    require => Package['ntp'],
  }
  /* service */
  service { 'ntpd': ensure => running } ~> Exec['x']
  if $facts['os']['family'] =~ /^(Debian|RedHat)$/ and !$disabled {
    notice "ok ${server}"
  }
  Package <<| tag == 'ntp' |>>
  $n = 1 + 2 * 3 % 4 - 5
}
"#;

#[test]
fn test_spans_reconstruct_source() {
    let inputs = [
        MANIFEST,
        "",
        "   \t\r\n",
        "\"abc",
        "/* open",
        "class@$::x::\\u0041\\uD800\\uD835\\uDC00 é\u{3000}x",
        "'a\\'b' \"c\\\"d\" /a\\/b/ # c\r\n#d",
    ];
    for input in inputs {
        let tokens = Lexer::tokenize(input);
        let rebuilt: String = tokens.iter().map(|t| t.span.as_str(input)).collect();
        assert_eq!(rebuilt, input);
        let mut expected_start = 0;
        for token in &tokens {
            assert_eq!(token.span.start, expected_start);
            assert!(!token.span.is_empty());
            expected_start = token.span.end;
        }
    }
}

#[test]
fn test_keywords_need_a_boundary() {
    for keyword in KEYWORDS {
        let spaced = format!("{} x", keyword.spelling);
        let tokens = Lexer::tokenize(&spaced);
        assert_eq!(tokens[0].kind, keyword.kind, "{spaced}");
        assert_eq!(tokens[0].span, Span::new(0, keyword.spelling.len()));

        let joined = format!("{}x1_", keyword.spelling);
        let tokens = Lexer::tokenize(&joined);
        assert_eq!(tokens.len(), 1, "{joined}");
        assert_eq!(tokens[0].kind, TokenKind::Identifier);
        assert_eq!(tokens[0].span, Span::new(0, joined.len()));
    }
}

#[test]
fn test_function_keywords_yield_to_brace_and_equals() {
    for keyword in KEYWORDS.iter().filter(|k| k.rule == KeywordRule::Function) {
        assert_eq!(keyword.kind.category(), Category::Function);
        for suffix in [" => 1", "{ }", "  \n= 1"] {
            let input = format!("{}{}", keyword.spelling, suffix);
            assert_eq!(Lexer::tokenize(&input)[0].kind, TokenKind::Identifier, "{input}");
        }
        let call = format!("{}('x')", keyword.spelling);
        assert_eq!(Lexer::tokenize(&call)[0].kind, keyword.kind);
    }
}

#[test]
fn test_unicode_escapes() {
    let tokens = Lexer::tokenize(r"\u0041bc");
    assert_eq!(tokens.len(), 1);
    assert_eq!(tokens[0].kind, TokenKind::Identifier);
    assert_eq!(tokens[0].span, Span::new(0, 8));

    let input = r"\u00G1";
    let texts: Vec<_> = Lexer::tokenize(input).iter().map(|t| t.span.as_str(input)).collect();
    assert_eq!(texts, ["\\", "u00G1"]);

    let input = r"\u004";
    let texts: Vec<_> = Lexer::tokenize(input).iter().map(|t| t.span.as_str(input)).collect();
    assert_eq!(texts, ["\\", "u004"]);
}

#[test]
fn test_unterminated_string_at_end_of_input() {
    let tokens = Lexer::tokenize("\"abc");
    assert_eq!(tokens.len(), 1);
    assert_eq!(tokens[0].kind, TokenKind::StringLiteral);
    assert_eq!(tokens[0].span, Span::new(0, 4));
    assert_eq!(tokens[0].part, Part::Start);
    assert!(!tokens[0].is_complete());
}

#[test]
fn test_collector_token_kinds() {
    let significant: Vec<_> = Lexer::tokenize("Package <<| tag == 'ntp' |>> ~> Exec['x']")
        .into_iter()
        .filter(|t| !t.is_trivia())
        .map(|t| t.kind)
        .collect();
    assert_eq!(
        significant,
        [
            TokenKind::Identifier,
            TokenKind::LExportCollector,
            TokenKind::Identifier,
            TokenKind::EqEq,
            TokenKind::StringLiteral,
            TokenKind::RExportCollector,
            TokenKind::NotifyArrow,
            TokenKind::Identifier,
            TokenKind::LBracket,
            TokenKind::StringLiteral,
            TokenKind::RBracket,
        ]
    );
}

#[test]
fn test_categories() {
    assert_eq!(TokenKind::Class.category(), Category::Keyword);
    assert_eq!(TokenKind::And.category(), Category::Operator);
    assert_eq!(TokenKind::Include.category(), Category::Function);
    assert_eq!(TokenKind::LineComment.category(), Category::Comment);
    assert_eq!(TokenKind::Semicolon.category(), Category::Separator);
    assert_eq!(TokenKind::RegexpLiteral.category(), Category::Literal);
}
