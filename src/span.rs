use serde::Serialize;

/// Byte range into the source snapshot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Hash, Serialize)]
pub struct Span {
    pub start: usize,
    pub end: usize,
}

impl Span {
    pub fn new(start: usize, end: usize) -> Self { Self { start, end } }

    pub fn len(&self) -> usize { self.end - self.start }

    pub fn is_empty(&self) -> bool { self.start == self.end }

    pub fn contains(&self, offset: usize) -> bool {
        self.start <= offset && offset <= self.end
    }

    /// Slices the source. Spans produced by the lexer always fall on char boundaries.
    pub fn as_str<'src>(&self, source: &'src str) -> &'src str {
        &source[self.start..self.end]
    }
}
