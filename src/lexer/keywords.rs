//! Keyword spellings as a sorted table walked like a trie.
//!
//! Entries sharing a prefix are contiguous in a sorted table, so a trie node is
//! just a range of the table plus the matched depth.

use super::token::TokenKind;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeywordRule {
    /// Emitted whenever the spelling is not followed by an identifier part.
    Keyword,
    /// Built-in callable without parentheses. Falls back to an identifier when the
    /// next non-whitespace unit is `{` or `=`, as in `tag => 'x'` or `notice { 'x': }`.
    Function,
}

#[derive(Debug, Clone, Copy)]
pub struct Keyword {
    pub spelling: &'static str,
    pub kind: TokenKind,
    pub rule: KeywordRule,
}

const fn keyword(spelling: &'static str, kind: TokenKind) -> Keyword {
    Keyword { spelling, kind, rule: KeywordRule::Keyword }
}

const fn function(spelling: &'static str, kind: TokenKind) -> Keyword {
    Keyword { spelling, kind, rule: KeywordRule::Function }
}

/// Must stay sorted by spelling.
pub static KEYWORDS: &[Keyword] = &[
    keyword("absent", TokenKind::Absent),
    keyword("and", TokenKind::And),
    keyword("case", TokenKind::Case),
    keyword("class", TokenKind::Class),
    function("contain", TokenKind::Contain),
    function("debug", TokenKind::Debug),
    keyword("default", TokenKind::Default),
    keyword("define", TokenKind::Define),
    keyword("else", TokenKind::Else),
    keyword("elsif", TokenKind::Elsif),
    function("err", TokenKind::Err),
    function("fail", TokenKind::Fail),
    keyword("false", TokenKind::False),
    keyword("if", TokenKind::If),
    keyword("import", TokenKind::Import),
    function("include", TokenKind::Include),
    keyword("inherits", TokenKind::Inherits),
    keyword("nil", TokenKind::Nil),
    keyword("node", TokenKind::Node),
    function("notice", TokenKind::Notice),
    keyword("or", TokenKind::Or),
    keyword("present", TokenKind::Present),
    function("realize", TokenKind::Realize),
    function("require", TokenKind::Require),
    function("tag", TokenKind::Tag),
    keyword("true", TokenKind::True),
    keyword("undef", TokenKind::Undef),
    keyword("unless", TokenKind::Unless),
    function("warning", TokenKind::Warning),
];

/// A node of the keyword trie: the table range sharing the first `depth` bytes.
#[derive(Debug, Clone, Copy)]
pub struct KeywordTrie {
    lo: usize,
    hi: usize,
    depth: usize,
}

impl KeywordTrie {
    pub fn start(first: char) -> Option<Self> {
        let mut trie = Self { lo: 0, hi: KEYWORDS.len(), depth: 0 };
        trie.advance(first).then_some(trie)
    }

    /// Narrows to the spellings continuing with `c`. Leaves the node untouched and
    /// returns `false` when none does.
    pub fn advance(&mut self, c: char) -> bool {
        if !c.is_ascii() {
            return false;
        }
        let byte = c as u8;
        let depth = self.depth;
        let at = |k: &Keyword| k.spelling.as_bytes().get(depth).copied();
        let range = &KEYWORDS[self.lo..self.hi];
        let lo = range.partition_point(|k| at(k).is_none_or(|b| b < byte));
        let hi = range.partition_point(|k| at(k).is_none_or(|b| b <= byte));
        if lo == hi {
            return false;
        }
        self.hi = self.lo + hi;
        self.lo += lo;
        self.depth += 1;
        true
    }

    /// The keyword spelled exactly by the bytes matched so far.
    pub fn matched(&self) -> Option<&'static Keyword> {
        KEYWORDS[self.lo..self.hi]
            .first()
            .filter(|k| k.spelling.len() == self.depth)
    }
}
