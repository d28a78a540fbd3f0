pub mod keywords;
pub mod reader;
pub mod token;

use keywords::{Keyword, KeywordRule, KeywordTrie};
use reader::{
    as_char, combine_surrogates, is_high_surrogate, is_identifier_part, is_identifier_start,
    is_low_surrogate, is_whitespace, Unit, UnicodeReader,
};
use token::{Part, Token, TokenKind};
use crate::span::Span;

/// Context-sensitive Puppet lexer.
///
/// Every unit of the input ends up in exactly one token: malformed input yields
/// `Error` tokens or literals marked [`Part::Start`], never a failure.
pub struct Lexer<'src> {
    reader: UnicodeReader<'src>,
}

impl<'src> Lexer<'src> {
    pub fn new(input: &'src str) -> Self {
        Self {
            reader: UnicodeReader::new(input),
        }
    }

    pub fn tokenize(input: &'src str) -> Vec<Token> {
        Self::new(input).collect()
    }

    /// Reads one unit, joining an escaped surrogate pair into a single code point.
    /// Returns the code point and the number of units consumed.
    fn read_code_point(&mut self) -> (Unit, usize) {
        match self.reader.read() {
            Some(unit) => self.translate_surrogates(unit),
            None => (None, 1),
        }
    }

    fn translate_surrogates(&mut self, unit: u32) -> (Unit, usize) {
        if is_high_surrogate(unit) {
            match self.reader.read() {
                Some(low) if is_low_surrogate(low) => {
                    return (Some(combine_surrogates(unit, low)), 2);
                }
                // Unpaired: leave it alone, it classifies as an error.
                _ => self.reader.backup(1),
            }
        }
        (Some(unit), 1)
    }

    fn consume_newline(&mut self) {
        if self.reader.read() != Some('\n' as u32) {
            self.reader.backup(1);
        }
    }

    fn scan(&mut self, first: u32) -> (TokenKind, Part) {
        let Some(c) = char::from_u32(first) else {
            return (self.scan_surrogate(first), Part::Complete);
        };
        let kind = match c {
            '0'..='9' => self.finish_number(),
            '#' => self.finish_line_comment(),
            '\'' | '"' => return self.finish_string(c),
            '$' => self.finish_variable(),
            '!' => self.operator(&[('=', TokenKind::NotEq), ('~', TokenKind::NotMatch)], TokenKind::Bang),
            '=' => self.operator(
                &[('>', TokenKind::FatArrow), ('=', TokenKind::EqEq), ('~', TokenKind::Match)],
                TokenKind::Equals,
            ),
            '>' => self.operator(&[('=', TokenKind::GtEq), ('>', TokenKind::Shr)], TokenKind::Gt),
            '<' => match as_char(self.reader.read()) {
                Some('=') => TokenKind::LtEq,
                Some('|') => TokenKind::LCollector,
                Some('<') => self.operator(&[('|', TokenKind::LExportCollector)], TokenKind::Shl),
                _ => {
                    self.reader.backup(1);
                    TokenKind::Lt
                }
            },
            '|' => match as_char(self.reader.read()) {
                Some('>') => self.operator(&[('>', TokenKind::RExportCollector)], TokenKind::RCollector),
                _ => {
                    self.reader.backup(1);
                    TokenKind::Pipe
                }
            },
            '-' => self.operator(&[('>', TokenKind::OrderArrow)], TokenKind::Minus),
            '~' => self.operator(&[('>', TokenKind::NotifyArrow)], TokenKind::Tilde),
            '/' => {
                if self.reader.read() == Some('*' as u32) {
                    return self.finish_block_comment();
                }
                self.reader.backup(1);
                return self.finish_regexp();
            }
            '+' => TokenKind::Plus,
            '*' => TokenKind::Star,
            '%' => TokenKind::Percent,
            '.' => TokenKind::Dot,
            '?' => TokenKind::Question,
            '(' => TokenKind::LParen,
            ')' => TokenKind::RParen,
            '[' => TokenKind::LBracket,
            ']' => TokenKind::RBracket,
            '{' => TokenKind::LBrace,
            '}' => TokenKind::RBrace,
            ',' => TokenKind::Comma,
            ':' => TokenKind::Colon,
            ';' => TokenKind::Semicolon,
            c if is_whitespace(Some(c as u32)) => self.finish_whitespace(),
            c if is_identifier_start(Some(c as u32)) => self.keyword_or_identifier(c),
            _ => TokenKind::Error,
        };
        (kind, Part::Complete)
    }

    /// One unit of lookahead: the first matching follower wins, anything else is pushed back.
    fn operator(&mut self, followers: &[(char, TokenKind)], fallback: TokenKind) -> TokenKind {
        let next = as_char(self.reader.read());
        match followers.iter().find(|(c, _)| Some(*c) == next) {
            Some(&(_, kind)) => kind,
            None => {
                self.reader.backup(1);
                fallback
            }
        }
    }

    fn scan_surrogate(&mut self, unit: u32) -> TokenKind {
        let (code_point, _) = self.translate_surrogates(unit);
        if code_point == Some(unit) {
            return TokenKind::Error;
        }
        if is_identifier_start(code_point) {
            let next = self.read_code_point();
            return self.finish_identifier(next);
        }
        if is_whitespace(code_point) {
            return self.finish_whitespace();
        }
        TokenKind::Error
    }

    fn finish_number(&mut self) -> TokenKind {
        while as_char(self.reader.read()).is_some_and(|c| c.is_ascii_digit()) {}
        self.reader.backup(1);
        TokenKind::IntLiteral
    }

    fn finish_line_comment(&mut self) -> TokenKind {
        loop {
            match as_char(self.reader.read()) {
                Some('\r') => {
                    self.consume_newline();
                    break;
                }
                Some('\n') | None => break,
                _ => {}
            }
        }
        TokenKind::LineComment
    }

    fn finish_string(&mut self, quote: char) -> (TokenKind, Part) {
        loop {
            match as_char(self.reader.read()) {
                Some(c) if c == quote => return (TokenKind::StringLiteral, Part::Complete),
                Some('\\') => {
                    self.reader.read();
                }
                Some('\r') => {
                    self.consume_newline();
                    return (TokenKind::StringLiteral, Part::Start);
                }
                Some('\n') | None => return (TokenKind::StringLiteral, Part::Start),
                _ => {}
            }
        }
    }

    fn finish_regexp(&mut self) -> (TokenKind, Part) {
        let mut escaped = false;
        loop {
            match as_char(self.reader.read()) {
                Some('\r') => {
                    self.consume_newline();
                    return (TokenKind::RegexpLiteral, Part::Start);
                }
                Some('\n') | None => return (TokenKind::RegexpLiteral, Part::Start),
                Some('\\') => escaped = !escaped,
                Some('/') if !escaped => return (TokenKind::RegexpLiteral, Part::Complete),
                _ => escaped = false,
            }
        }
    }

    fn finish_block_comment(&mut self) -> (TokenKind, Part) {
        let mut star = false;
        loop {
            match as_char(self.reader.read()) {
                None => return (TokenKind::BlockComment, Part::Start),
                Some('*') => star = true,
                Some('/') if star => return (TokenKind::BlockComment, Part::Complete),
                _ => star = false,
            }
        }
    }

    fn finish_whitespace(&mut self) -> TokenKind {
        while is_whitespace(self.reader.read()) {}
        self.reader.backup(1);
        TokenKind::Whitespace
    }

    /// `$` followed by identifier parts and colons. A trailing colon run is left
    /// for the next token, so `$x::` lexes as `$x` then `:` `:`.
    fn finish_variable(&mut self) -> TokenKind {
        let mut name_end = self.reader.mark();
        loop {
            let (next, _) = self.read_code_point();
            if next == Some(':' as u32) {
                continue;
            }
            if !is_identifier_part(next) {
                self.reader.reset(name_end);
                return TokenKind::Variable;
            }
            name_end = self.reader.mark();
        }
    }

    /// Walks the keyword trie while the input keeps spelling some keyword. A keyword
    /// is emitted only on a full spelling at an identifier boundary; otherwise the
    /// consumed run continues as an identifier.
    fn keyword_or_identifier(&mut self, first: char) -> TokenKind {
        let Some(mut trie) = KeywordTrie::start(first) else {
            let next = self.read_code_point();
            return self.finish_identifier(next);
        };
        loop {
            let (next, width) = self.read_code_point();
            if let Some(c) = as_char(next)
                && trie.advance(c)
            {
                continue;
            }
            if let Some(keyword) = trie.matched()
                && !is_identifier_part(next)
            {
                self.reader.backup(width);
                return self.keyword(keyword);
            }
            return self.finish_identifier((next, width));
        }
    }

    fn keyword(&mut self, keyword: &Keyword) -> TokenKind {
        match keyword.rule {
            KeywordRule::Keyword => keyword.kind,
            KeywordRule::Function => self.function_or_identifier(keyword.kind),
        }
    }

    fn function_or_identifier(&mut self, kind: TokenKind) -> TokenKind {
        let end = self.reader.mark();
        let mut next = self.reader.read();
        while is_whitespace(next) {
            next = self.reader.read();
        }
        self.reader.reset(end);
        match as_char(next) {
            Some('{' | '=') => TokenKind::Identifier,
            _ => kind,
        }
    }

    /// Continues an identifier whose last read unit is `next`. Segments may be
    /// joined by `::` when another segment follows.
    fn finish_identifier(&mut self, (mut next, mut width): (Unit, usize)) -> TokenKind {
        loop {
            if is_identifier_part(next) {
                (next, width) = self.read_code_point();
                continue;
            }
            self.reader.backup(width);
            if !self.eat_qualifier() {
                return TokenKind::Identifier;
            }
            (next, width) = self.read_code_point();
        }
    }

    fn eat_qualifier(&mut self) -> bool {
        let mark = self.reader.mark();
        if self.reader.read() == Some(':' as u32) && self.reader.read() == Some(':' as u32) {
            let (next, width) = self.read_code_point();
            if is_identifier_start(next) {
                self.reader.backup(width);
                return true;
            }
        }
        self.reader.reset(mark);
        false
    }

    fn token(&mut self, kind: TokenKind, part: Part) -> Token {
        let span = Span::new(self.reader.token_start(), self.reader.mark());
        let text = match kind {
            TokenKind::Whitespace if span.as_str(self.reader.input()) == " " => Some(" "),
            _ => kind.fixed_text().filter(|text| text.len() == span.len()),
        };
        self.reader.finish_token();
        Token { kind, span, part, text }
    }
}

impl<'src> Iterator for Lexer<'src> {
    type Item = Token;

    fn next(&mut self) -> Option<Self::Item> {
        let first = self.reader.read()?;
        let (kind, part) = self.scan(first);
        Some(self.token(kind, part))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kinds(input: &str) -> Vec<TokenKind> {
        Lexer::tokenize(input).into_iter().map(|t| t.kind).collect()
    }

    fn texts(input: &str) -> Vec<&str> {
        Lexer::tokenize(input).into_iter().map(|t| t.span.as_str(input)).collect()
    }

    #[test]
    fn keyword_needs_identifier_boundary() {
        assert_eq!(kinds("class"), vec![TokenKind::Class]);
        assert_eq!(kinds("classroom"), vec![TokenKind::Identifier]);
        assert_eq!(kinds("clas"), vec![TokenKind::Identifier]);
        assert_eq!(kinds("class{"), vec![TokenKind::Class, TokenKind::LBrace]);
    }

    #[test]
    fn function_keyword_before_brace_or_equals_is_identifier() {
        assert_eq!(kinds("notice 'x'")[0], TokenKind::Notice);
        assert_eq!(kinds("notice('x')")[0], TokenKind::Notice);
        assert_eq!(kinds("tag => 'a'")[0], TokenKind::Identifier);
        assert_eq!(kinds("notice   { 'x': }")[0], TokenKind::Identifier);
        assert_eq!(texts("tag => 'a'")[0], "tag");
    }

    #[test]
    fn qualified_identifiers() {
        assert_eq!(texts("foo::bar::baz x"), vec!["foo::bar::baz", " ", "x"]);
        assert_eq!(texts("foo: x"), vec!["foo", ":", " ", "x"]);
        assert_eq!(texts("foo::"), vec!["foo", ":", ":"]);
    }

    #[test]
    fn variables_drop_trailing_colons() {
        assert_eq!(texts("$x = 1"), vec!["$x", " ", "=", " ", "1"]);
        assert_eq!(texts("$::os::family"), vec!["$::os::family"]);
        assert_eq!(texts("$x:"), vec!["$x", ":"]);
        assert_eq!(texts("$x::"), vec!["$x", ":", ":"]);
        assert_eq!(texts("$"), vec!["$"]);
    }

    #[test]
    fn numbers_are_digit_runs() {
        assert_eq!(texts("123abc"), vec!["123", "abc"]);
        assert_eq!(kinds("1.5"), vec![TokenKind::IntLiteral, TokenKind::Dot, TokenKind::IntLiteral]);
    }

    #[test]
    fn operators_take_longest_spelling() {
        assert_eq!(
            kinds("<<| |>> <| |> << >> -> ~> =~ !~ => == != >= <="),
            vec![
                TokenKind::LExportCollector, TokenKind::Whitespace,
                TokenKind::RExportCollector, TokenKind::Whitespace,
                TokenKind::LCollector, TokenKind::Whitespace,
                TokenKind::RCollector, TokenKind::Whitespace,
                TokenKind::Shl, TokenKind::Whitespace,
                TokenKind::Shr, TokenKind::Whitespace,
                TokenKind::OrderArrow, TokenKind::Whitespace,
                TokenKind::NotifyArrow, TokenKind::Whitespace,
                TokenKind::Match, TokenKind::Whitespace,
                TokenKind::NotMatch, TokenKind::Whitespace,
                TokenKind::FatArrow, TokenKind::Whitespace,
                TokenKind::EqEq, TokenKind::Whitespace,
                TokenKind::NotEq, TokenKind::Whitespace,
                TokenKind::GtEq, TokenKind::Whitespace,
                TokenKind::LtEq,
            ]
        );
        assert_eq!(
            kinds("! = > < | - ~"),
            vec![
                TokenKind::Bang, TokenKind::Whitespace,
                TokenKind::Equals, TokenKind::Whitespace,
                TokenKind::Gt, TokenKind::Whitespace,
                TokenKind::Lt, TokenKind::Whitespace,
                TokenKind::Pipe, TokenKind::Whitespace,
                TokenKind::Minus, TokenKind::Whitespace,
                TokenKind::Tilde,
            ]
        );
    }

    #[test]
    fn slash_starts_comment_or_regexp() {
        assert_eq!(texts("/* a */x"), vec!["/* a */", "x"]);
        assert_eq!(texts("/^a\\/b$/ x"), vec!["/^a\\/b$/", " ", "x"]);
        let open = Lexer::tokenize("/* never closed");
        assert_eq!(open.len(), 1);
        assert_eq!(open[0].part, Part::Start);
    }

    #[test]
    fn comments_include_their_newline() {
        assert_eq!(texts("# hi\r\nx"), vec!["# hi\r\n", "x"]);
        assert_eq!(texts("# end"), vec!["# end"]);
    }

    #[test]
    fn unterminated_string_stops_at_newline() {
        let tokens = Lexer::tokenize("'abc\nx");
        assert_eq!(tokens[0].span, Span::new(0, 5));
        assert_eq!(tokens[0].part, Part::Start);
        assert_eq!(tokens[1].kind, TokenKind::Identifier);
    }

    #[test]
    fn escaped_quote_does_not_end_string() {
        assert_eq!(texts(r#""a\"b" x"#), vec![r#""a\"b""#, " ", "x"]);
    }

    #[test]
    fn fixed_spellings_share_text() {
        let tokens = Lexer::tokenize("class { }\t");
        assert_eq!(tokens[0].text, Some("class"));
        assert_eq!(tokens[1].text, Some(" "));
        assert_eq!(tokens[2].text, Some("{"));
        assert_eq!(tokens[4].text, Some("}"));
        assert_eq!(tokens[5].text, None);
    }

    #[test]
    fn escaped_keyword_is_decoded_but_not_shared() {
        let tokens = Lexer::tokenize(r"\u0063lass x");
        assert_eq!(tokens[0].kind, TokenKind::Class);
        assert_eq!(tokens[0].span, Span::new(0, 10));
        assert_eq!(tokens[0].text, None);
    }

    #[test]
    fn unrecognized_units_are_single_error_tokens() {
        assert_eq!(texts("@@x"), vec!["@", "@", "x"]);
        assert_eq!(kinds("@")[0], TokenKind::Error);
        let tokens = Lexer::tokenize(r"\uD800x");
        assert_eq!(tokens[0].kind, TokenKind::Error);
        assert_eq!(tokens[0].span, Span::new(0, 6));
        assert_eq!(tokens[1].kind, TokenKind::Identifier);
    }

    #[test]
    fn escaped_surrogate_pair_is_one_unit() {
        let tokens = Lexer::tokenize(r"\uD835\uDC00 x");
        assert_eq!(tokens[0].kind, TokenKind::Identifier);
        assert_eq!(tokens[0].span, Span::new(0, 12));
    }
}
