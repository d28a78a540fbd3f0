use crate::lexer::Lexer;
use crate::lexer::token::Token;

/// Bidirectional cursor over the tokens of one source snapshot, trivia included.
///
/// The cursor sits before the first token, on a token, or past the last one.
pub trait TokenSource<'src> {
    /// The snapshot the tokens were lexed from.
    fn source(&self) -> &'src str;
    /// Moves before the first token.
    fn move_start(&mut self);
    /// Advances one token. Returns `false`, leaving the cursor past the end, when none is left.
    fn move_next(&mut self) -> bool;
    /// Steps back one token. Returns `false` when already before the first.
    fn move_previous(&mut self) -> bool;
    fn token(&self) -> Option<Token>;
    /// Start of the current token, or the end of the source when past the last one.
    fn offset(&self) -> usize;
    /// `false` once the backing document changed under the cursor.
    fn is_valid(&self) -> bool {
        true
    }
}

/// Token source over an eagerly lexed snapshot.
#[derive(Debug, Clone)]
pub struct TokenStream<'src> {
    source: &'src str,
    tokens: Vec<Token>,
    // 0 is before the first token, `i + 1` is on token `i`.
    position: usize,
}

impl<'src> TokenStream<'src> {
    pub fn new(source: &'src str) -> Self {
        Self::from_tokens(source, Lexer::tokenize(source))
    }

    pub fn from_tokens(source: &'src str, tokens: Vec<Token>) -> Self {
        Self { source, tokens, position: 0 }
    }
}

impl<'src> TokenSource<'src> for TokenStream<'src> {
    fn source(&self) -> &'src str {
        self.source
    }

    fn move_start(&mut self) {
        self.position = 0;
    }

    fn move_next(&mut self) -> bool {
        if self.position > self.tokens.len() {
            return false;
        }
        self.position += 1;
        self.position <= self.tokens.len()
    }

    fn move_previous(&mut self) -> bool {
        if self.position <= 1 {
            self.position = 0;
            return false;
        }
        self.position -= 1;
        true
    }

    fn token(&self) -> Option<Token> {
        self.position
            .checked_sub(1)
            .and_then(|i| self.tokens.get(i))
            .copied()
    }

    fn offset(&self) -> usize {
        match self.position {
            0 => 0,
            p => self.tokens.get(p - 1).map_or(self.source.len(), |t| t.span.start),
        }
    }
}
