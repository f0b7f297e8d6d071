use std::ops::Range;

/// Byte region of the source text covered by a token or syntax node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Span {
    /// The byte position of the start of the region.
    pub start: u32,
    /// The length of the region in bytes.
    pub length: u32,
}

impl Span {
    pub const fn new(start: u32, length: u32) -> Self {
        Self { start, length }
    }

    pub fn from_range(range: Range<usize>) -> Self {
        Self {
            start: range.start as u32,
            length: (range.end - range.start) as u32,
        }
    }

    pub fn range(&self) -> Range<usize> {
        self.start as usize..self.end() as usize
    }

    pub fn end(&self) -> u32 {
        self.start + self.length
    }

    pub fn merge(&self, other: &Span) -> Span {
        let start = self.start.min(other.start);
        let end = self.end().max(other.end());
        Span {
            start,
            length: end - start,
        }
    }
}
