use serde::Serialize;

use crate::span::Span;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Token {
    pub kind: TokenKind,
    pub span: Span,
    pub part: Part,
    /// Shared spelling for tokens whose text is the constant spelling of their kind.
    pub text: Option<&'static str>,
}

impl Token {
    pub fn is_trivia(&self) -> bool {
        self.kind.is_trivia()
    }

    pub fn is_complete(&self) -> bool {
        self.part == Part::Complete
    }
}

/// Whether a token is whole or the start of a literal cut short by a newline or end of input.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub enum Part {
    #[default]
    Complete,
    Start,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum TokenKind {
    // Literals
    IntLiteral,
    StringLiteral,
    RegexpLiteral,

    // Trivia
    Whitespace,
    LineComment, // # ...
    BlockComment, // /* ... */

    Identifier,
    Variable,

    // Keywords
    Absent, Case, Class, Default, Define, Else, Elsif, False, If, Import, Inherits,
    Node, Nil, Present, True, Undef, Unless,

    // Text operators
    And, Or,

    // Built-ins callable without parentheses
    Contain, Debug, Err, Fail, Include, Notice, Realize, Require, Tag, Warning,

    // Separators
    LParen, RParen, LBracket, RBracket, LBrace, RBrace,
    Comma, Colon, Semicolon, Dot, Question,

    // Operators
    Equals, // =
    FatArrow, // =>
    EqEq, // ==
    Match, // =~
    Bang, // !
    NotEq, // !=
    NotMatch, // !~
    Gt, GtEq, Shr,
    Lt, LtEq, Shl,
    LCollector, // <|
    LExportCollector, // <<|
    RCollector, // |>
    RExportCollector, // |>>
    Pipe,
    Minus,
    OrderArrow, // ->
    Tilde,
    NotifyArrow, // ~>
    Plus, Star, Percent,

    Error,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Category {
    Literal,
    Whitespace,
    Comment,
    Identifier,
    Variable,
    Keyword,
    Function,
    Separator,
    Operator,
    Error,
}

impl TokenKind {
    pub fn category(self) -> Category {
        use TokenKind::*;
        match self {
            IntLiteral | StringLiteral | RegexpLiteral => Category::Literal,
            Whitespace => Category::Whitespace,
            LineComment | BlockComment => Category::Comment,
            Identifier => Category::Identifier,
            Variable => Category::Variable,
            Absent | Case | Class | Default | Define | Else | Elsif | False | If | Import
            | Inherits | Node | Nil | Present | True | Undef | Unless => Category::Keyword,
            Contain | Debug | Err | Fail | Include | Notice | Realize | Require | Tag
            | Warning => Category::Function,
            LParen | RParen | LBracket | RBracket | LBrace | RBrace | Comma | Colon
            | Semicolon | Dot | Question => Category::Separator,
            And | Or | Equals | FatArrow | EqEq | Match | Bang | NotEq | NotMatch | Gt | GtEq
            | Shr | Lt | LtEq | Shl | LCollector | LExportCollector | RCollector
            | RExportCollector | Pipe | Minus | OrderArrow | Tilde | NotifyArrow | Plus | Star
            | Percent => Category::Operator,
            Error => Category::Error,
        }
    }

    pub fn is_trivia(self) -> bool {
        matches!(self, TokenKind::Whitespace | TokenKind::LineComment | TokenKind::BlockComment)
    }

    pub fn is_function(self) -> bool {
        self.category() == Category::Function
    }

    /// The constant spelling of fixed-text kinds.
    pub fn fixed_text(self) -> Option<&'static str> {
        use TokenKind::*;
        let text = match self {
            Absent => "absent",
            Case => "case",
            Class => "class",
            Default => "default",
            Define => "define",
            Else => "else",
            Elsif => "elsif",
            False => "false",
            If => "if",
            Import => "import",
            Inherits => "inherits",
            Node => "node",
            Nil => "nil",
            Present => "present",
            True => "true",
            Undef => "undef",
            Unless => "unless",
            And => "and",
            Or => "or",
            Contain => "contain",
            Debug => "debug",
            Err => "err",
            Fail => "fail",
            Include => "include",
            Notice => "notice",
            Realize => "realize",
            Require => "require",
            Tag => "tag",
            Warning => "warning",
            LParen => "(",
            RParen => ")",
            LBracket => "[",
            RBracket => "]",
            LBrace => "{",
            RBrace => "}",
            Comma => ",",
            Colon => ":",
            Semicolon => ";",
            Dot => ".",
            Question => "?",
            Equals => "=",
            FatArrow => "=>",
            EqEq => "==",
            Match => "=~",
            Bang => "!",
            NotEq => "!=",
            NotMatch => "!~",
            Gt => ">",
            GtEq => ">=",
            Shr => ">>",
            Lt => "<",
            LtEq => "<=",
            Shl => "<<",
            LCollector => "<|",
            LExportCollector => "<<|",
            RCollector => "|>",
            RExportCollector => "|>>",
            Pipe => "|",
            Minus => "-",
            OrderArrow => "->",
            Tilde => "~",
            NotifyArrow => "~>",
            Plus => "+",
            Star => "*",
            Percent => "%",
            IntLiteral | StringLiteral | RegexpLiteral | Whitespace | LineComment
            | BlockComment | Identifier | Variable | Error => return None,
        };
        Some(text)
    }
}
