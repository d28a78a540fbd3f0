//! Character input for the lexer.
//!
//! [`SourceReader`] walks the raw snapshot one `char` at a time. [`UnicodeReader`]
//! sits on top of it and decodes `\uXXXX` escapes on the fly, so the lexer only
//! ever sees decoded units. Units are `u32` rather than `char` because an escape
//! may decode to a lone surrogate.

/// A decoded input unit; `None` is end of input.
pub type Unit = Option<u32>;

/// Raw, position-addressable reader over one immutable snapshot.
#[derive(Debug, Clone)]
pub struct SourceReader<'src> {
    input: &'src str,
    cursor: usize,
    token_start: usize,
}

impl<'src> SourceReader<'src> {
    pub fn new(input: &'src str) -> Self {
        Self {
            input,
            cursor: 0,
            token_start: 0,
        }
    }

    pub fn input(&self) -> &'src str {
        self.input
    }

    pub fn read(&mut self) -> Option<char> {
        let c = self.input[self.cursor..].chars().next()?;
        self.cursor += c.len_utf8();
        Some(c)
    }

    pub fn position(&self) -> usize {
        self.cursor
    }

    /// Moves back to an earlier position inside the current token.
    pub fn reset(&mut self, position: usize) {
        debug_assert!(
            self.token_start <= position && position <= self.cursor,
            "reset to {position} outside token {}..{}",
            self.token_start,
            self.cursor
        );
        self.cursor = position;
    }

    pub fn token_start(&self) -> usize {
        self.token_start
    }

    /// Starts the next token at the current position.
    pub fn finish_token(&mut self) {
        self.token_start = self.cursor;
    }
}

/// Decode-on-read wrapper that remembers how many raw bytes the last two
/// decoded units consumed, so either can be pushed back exactly.
#[derive(Debug, Clone)]
pub struct UnicodeReader<'src> {
    raw: SourceReader<'src>,
    current_len: Option<usize>,
    previous_len: Option<usize>,
}

impl<'src> UnicodeReader<'src> {
    pub fn new(input: &'src str) -> Self {
        Self {
            raw: SourceReader::new(input),
            current_len: None,
            previous_len: None,
        }
    }

    pub fn input(&self) -> &'src str {
        self.raw.input()
    }

    pub fn read(&mut self) -> Unit {
        self.previous_len = self.current_len;
        let start = self.raw.position();
        let unit = self.decode();
        self.current_len = Some(self.raw.position() - start);
        unit
    }

    fn decode(&mut self) -> Unit {
        let start = self.raw.position();
        let c = self.raw.read()?;
        if c != '\\' {
            return Some(c as u32);
        }

        let mut saw_u = false;
        let mut first = self.raw.read();
        while first == Some('u') {
            saw_u = true;
            first = self.raw.read();
        }
        if !saw_u {
            return self.reread_backslash(start);
        }

        let digits = [first, self.raw.read(), self.raw.read(), self.raw.read()];
        let mut value = 0;
        for digit in digits {
            match digit.and_then(|d| d.to_digit(16)) {
                Some(d) => value = value * 16 + d,
                None => return self.reread_backslash(start),
            }
        }
        Some(value)
    }

    /// A malformed escape decodes to its leading backslash alone.
    fn reread_backslash(&mut self, start: usize) -> Unit {
        self.raw.reset(start + 1);
        Some('\\' as u32)
    }

    /// Pushes back the last one or two decoded units.
    pub fn backup(&mut self, count: usize) {
        match count {
            1 => {
                debug_assert!(self.current_len.is_some(), "backup(1) without a remembered unit");
                let len = self.current_len.unwrap_or(0);
                self.raw.reset(self.raw.position() - len);
                self.current_len = self.previous_len.take();
            }
            2 => {
                debug_assert!(
                    self.current_len.is_some() && self.previous_len.is_some(),
                    "backup(2) without two remembered units"
                );
                let len = self.current_len.unwrap_or(0) + self.previous_len.unwrap_or(0);
                self.raw.reset(self.raw.position() - len);
                self.current_len = None;
                self.previous_len = None;
            }
            _ => debug_assert!(false, "backup({count}) exceeds the two remembered units"),
        }
    }

    /// Raw position, usable with [`UnicodeReader::reset`].
    pub fn mark(&self) -> usize {
        self.raw.position()
    }

    /// Returns to a mark taken inside the current token. Clears the backup history.
    pub fn reset(&mut self, mark: usize) {
        self.raw.reset(mark);
        self.current_len = None;
        self.previous_len = None;
    }

    pub fn token_start(&self) -> usize {
        self.raw.token_start()
    }

    pub fn finish_token(&mut self) {
        self.raw.finish_token();
        self.current_len = None;
        self.previous_len = None;
    }
}

pub(crate) fn is_high_surrogate(unit: u32) -> bool {
    (0xD800..=0xDBFF).contains(&unit)
}

pub(crate) fn is_low_surrogate(unit: u32) -> bool {
    (0xDC00..=0xDFFF).contains(&unit)
}

pub(crate) fn combine_surrogates(high: u32, low: u32) -> u32 {
    0x10000 + ((high - 0xD800) << 10) + (low - 0xDC00)
}

/// Lone surrogates map to U+FFFD so that only end of input maps to `None`.
pub(crate) fn as_char(unit: Unit) -> Option<char> {
    unit.map(|u| char::from_u32(u).unwrap_or(char::REPLACEMENT_CHARACTER))
}

pub(crate) fn is_identifier_start(unit: Unit) -> bool {
    as_char(unit).is_some_and(|c| c == '_' || c.is_alphabetic())
}

pub(crate) fn is_identifier_part(unit: Unit) -> bool {
    as_char(unit).is_some_and(|c| c == '_' || c.is_alphanumeric())
}

pub(crate) fn is_whitespace(unit: Unit) -> bool {
    match unit {
        Some(0x09..=0x0D | 0x1C..=0x20) => true,
        Some(u) if u >= 0x80 => char::from_u32(u).is_some_and(|c| {
            c.is_whitespace() && !matches!(c, '\u{85}' | '\u{A0}' | '\u{2007}' | '\u{202F}')
        }),
        _ => false,
    }
}
