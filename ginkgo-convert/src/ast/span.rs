//! Source location tracking

use serde::{Deserialize, Serialize};

/// A byte range in the source file
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Span {
    pub start: usize,
    pub end: usize,
}

impl Span {
    /// Span of a node built by the converter rather than read from source.
    pub const DETACHED: Span = Span {
        start: usize::MAX,
        end: usize::MAX,
    };

    pub fn new(start: usize, end: usize) -> Self {
        Self { start, end }
    }

    pub fn merge(self, other: Span) -> Span {
        if self.is_detached() {
            return other;
        }
        if other.is_detached() {
            return self;
        }
        Span {
            start: self.start.min(other.start),
            end: self.end.max(other.end),
        }
    }

    pub fn is_detached(&self) -> bool {
        *self == Self::DETACHED
    }
}

impl std::fmt::Display for Span {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.is_detached() {
            return write!(f, "<detached>");
        }
        write!(f, "{}..{}", self.start, self.end)
    }
}

impl From<Span> for std::ops::Range<usize> {
    fn from(span: Span) -> Self {
        span.start..span.end
    }
}

impl From<std::ops::Range<usize>> for Span {
    fn from(range: std::ops::Range<usize>) -> Self {
        Span::new(range.start, range.end)
    }
}

/// A value with source location
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Spanned<T> {
    pub node: T,
    pub span: Span,
}

impl<T> Spanned<T> {
    pub fn new(node: T, span: Span) -> Self {
        Self { node, span }
    }

    /// Wrap a synthesized node.
    pub fn detached(node: T) -> Self {
        Self {
            node,
            span: Span::DETACHED,
        }
    }

    pub fn map<U, F: FnOnce(T) -> U>(self, f: F) -> Spanned<U> {
        Spanned {
            node: f(self.node),
            span: self.span,
        }
    }
}

/// Byte offset to line number lookup for one source file
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LineIndex {
    line_starts: Vec<usize>,
}

impl LineIndex {
    pub fn new(source: &str) -> Self {
        let line_starts = std::iter::once(0)
            .chain(source.match_indices('\n').map(|(i, _)| i + 1))
            .collect();
        Self { line_starts }
    }

    /// Zero-based line containing `offset`; `None` for detached positions.
    pub fn line(&self, offset: usize) -> Option<usize> {
        if offset == usize::MAX || self.line_starts.is_empty() {
            return None;
        }
        Some(match self.line_starts.binary_search(&offset) {
            Ok(line) => line,
            Err(next) => next - 1,
        })
    }

    /// Number of line breaks between two offsets, when both are known.
    pub fn lines_between(&self, from: usize, to: usize) -> Option<usize> {
        let a = self.line(from)?;
        let b = self.line(to)?;
        Some(b.saturating_sub(a))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_span_new() {
        let span = Span::new(10, 20);
        assert_eq!(span.start, 10);
        assert_eq!(span.end, 20);
    }

    #[test]
    fn test_span_merge_non_overlapping() {
        let merged = Span::new(0, 5).merge(Span::new(10, 15));
        assert_eq!(merged, Span::new(0, 15));
    }

    #[test]
    fn test_span_merge_reversed_order() {
        let merged = Span::new(10, 20).merge(Span::new(0, 5));
        assert_eq!(merged, Span::new(0, 20));
    }

    #[test]
    fn test_span_merge_ignores_detached() {
        let real = Span::new(3, 9);
        assert_eq!(real.merge(Span::DETACHED), real);
        assert_eq!(Span::DETACHED.merge(real), real);
    }

    #[test]
    fn test_span_display() {
        assert_eq!(format!("{}", Span::new(42, 99)), "42..99");
        assert_eq!(format!("{}", Span::DETACHED), "<detached>");
    }

    #[test]
    fn test_span_range_conversion() {
        let range: std::ops::Range<usize> = Span::new(5, 15).into();
        assert_eq!(range, 5..15);
        let span: Span = (10..20usize).into();
        assert_eq!(span, Span::new(10, 20));
    }

    #[test]
    fn test_spanned_map_preserves_span() {
        let spanned = Spanned::new(21, Span::new(1, 3)).map(|n| n * 2);
        assert_eq!(spanned.node, 42);
        assert_eq!(spanned.span, Span::new(1, 3));
    }

    #[test]
    fn test_spanned_detached() {
        let spanned = Spanned::detached("init");
        assert!(spanned.span.is_detached());
    }

    #[test]
    fn test_line_index_lookup() {
        let index = LineIndex::new("a\nbc\n\nd");
        assert_eq!(index.line(0), Some(0));
        assert_eq!(index.line(1), Some(0));
        assert_eq!(index.line(2), Some(1));
        assert_eq!(index.line(5), Some(2));
        assert_eq!(index.line(6), Some(3));
        assert_eq!(index.line(usize::MAX), None);
    }

    #[test]
    fn test_line_index_lines_between() {
        let index = LineIndex::new("a\nbc\n\nd");
        assert_eq!(index.lines_between(0, 6), Some(3));
        assert_eq!(index.lines_between(2, 3), Some(0));
        assert_eq!(index.lines_between(0, usize::MAX), None);
    }
}
