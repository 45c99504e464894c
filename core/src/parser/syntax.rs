// Syntax structures shared by the parser, the evaluator and error reporting.

use core::{fmt, ops::Range};

/// Byte range into the formula source.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Span(pub Range<usize>);

impl Span {
    pub fn new(start: usize, end: usize) -> Self {
        Self(start..end)
    }
    pub fn combine(a: &Span, b: &Span) -> Span {
        Span::new(a.0.start, b.0.end)
    }
    #[cfg(test)]
    pub(crate) fn str_of<'a>(&self, source: &'a str) -> &'a str {
        &source[self.0.start..self.0.end]
    }
}

impl From<pest::Span<'_>> for Span {
    fn from(s: pest::Span<'_>) -> Self {
        Self(s.start()..s.end())
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum BinaryOp {
    Add,
    Sub,
    Mul,
    Div,
}

impl BinaryOp {
    pub fn symbol(self) -> &'static str {
        match self {
            BinaryOp::Add => "+",
            BinaryOp::Sub => "-",
            BinaryOp::Mul => "*",
            BinaryOp::Div => "/",
        }
    }
}

impl fmt::Display for BinaryOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.symbol())
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum UnaryOp {
    Neg,
}

impl fmt::Display for UnaryOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            UnaryOp::Neg => f.write_str("-"),
        }
    }
}

/// Converts a byte offset into `source` to a character offset.
///
/// Offsets that fall inside a multi-byte character are moved back to the
/// start of that character, and offsets past the end are clamped, so the
/// result never exceeds `byte_offset`.
pub fn byte_offset_to_char_offset(source: &str, byte_offset: usize) -> usize {
    source[..char_boundary_at_or_before(source, byte_offset)]
        .chars()
        .count()
}

/// 1-based `(line, column)` of a byte offset, with the column counted in
/// characters.
pub fn line_col(source: &str, byte_offset: usize) -> (usize, usize) {
    let offset = char_boundary_at_or_before(source, byte_offset);
    let prefix = &source[..offset];
    let line = prefix.matches('\n').count() + 1;
    let line_start = prefix.rfind('\n').map_or(0, |newline| newline + 1);
    let column = byte_offset_to_char_offset(&source[line_start..], offset - line_start) + 1;
    (line, column)
}

fn char_boundary_at_or_before(source: &str, byte_offset: usize) -> usize {
    let mut offset = byte_offset.min(source.len());
    while !source.is_char_boundary(offset) {
        offset -= 1;
    }
    offset
}
