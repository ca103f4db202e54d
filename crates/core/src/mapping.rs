//! Offset mapping between raw markup text and its plain-text projection
//!
//! A text run such as `AT&amp;T` is 8 bytes of markup but only 4 bytes of
//! plain text. Change ranges are computed over the plain projection and have
//! to be carried back to raw positions before markers are inserted. The map
//! is a sorted list of segments; each segment is either a literal run (same
//! length on both sides) or a single decoded entity, which is atomic.

/// Represents a span of bytes in text
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CharSpan {
    /// Start position (inclusive)
    pub start: usize,
    /// End position (exclusive)
    pub end: usize,
}

impl CharSpan {
    pub fn new(start: usize, end: usize) -> Self {
        Self { start, end }
    }

    pub fn len(&self) -> usize {
        self.end.saturating_sub(self.start)
    }

    pub fn is_empty(&self) -> bool {
        self.start >= self.end
    }

    pub fn contains(&self, pos: usize) -> bool {
        pos >= self.start && pos < self.end
    }

    /// Create a point span (zero-width)
    pub fn point(pos: usize) -> Self {
        Self::new(pos, pos)
    }

    /// Whether the two half-open spans share at least one position
    pub fn overlaps(&self, other: &CharSpan) -> bool {
        self.start < other.end && other.start < self.end
    }

    /// The overlapping part of two spans, if any
    pub fn intersection(&self, other: &CharSpan) -> Option<CharSpan> {
        if self.overlaps(other) {
            Some(CharSpan::new(
                self.start.max(other.start),
                self.end.min(other.end),
            ))
        } else {
            None
        }
    }

    /// Shift both ends left by `offset`
    pub fn relative_to(&self, offset: usize) -> CharSpan {
        CharSpan::new(
            self.start.saturating_sub(offset),
            self.end.saturating_sub(offset),
        )
    }
}

/// One run of the mapping
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Segment {
    pub raw: CharSpan,
    pub plain: CharSpan,
    /// Literal runs map byte for byte; entity runs are indivisible
    pub literal: bool,
}

/// Mapping from plain-text offsets back to raw markup offsets
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OffsetMap {
    segments: Vec<Segment>,
    raw_len: usize,
    plain_len: usize,
}

impl OffsetMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Mapping for text that needed no decoding
    pub fn identity(len: usize) -> Self {
        let mut map = Self::new();
        map.push_literal(len);
        map
    }

    /// Append a literal run of `len` bytes
    pub fn push_literal(&mut self, len: usize) {
        if len == 0 {
            return;
        }
        if let Some(last) = self.segments.last_mut() {
            if last.literal {
                last.raw.end += len;
                last.plain.end += len;
                self.raw_len += len;
                self.plain_len += len;
                return;
            }
        }
        self.segments.push(Segment {
            raw: CharSpan::new(self.raw_len, self.raw_len + len),
            plain: CharSpan::new(self.plain_len, self.plain_len + len),
            literal: true,
        });
        self.raw_len += len;
        self.plain_len += len;
    }

    /// Append an entity occupying `raw_len` bytes that decodes to `plain_len` bytes
    pub fn push_entity(&mut self, raw_len: usize, plain_len: usize) {
        self.segments.push(Segment {
            raw: CharSpan::new(self.raw_len, self.raw_len + raw_len),
            plain: CharSpan::new(self.plain_len, self.plain_len + plain_len),
            literal: false,
        });
        self.raw_len += raw_len;
        self.plain_len += plain_len;
    }

    pub fn raw_len(&self) -> usize {
        self.raw_len
    }

    pub fn plain_len(&self) -> usize {
        self.plain_len
    }

    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    /// Raw offset for a plain offset used as a span start.
    ///
    /// A position inside an entity snaps back to the entity's first byte.
    pub fn raw_start(&self, plain: usize) -> usize {
        if plain >= self.plain_len {
            return self.raw_len;
        }
        let idx = self.segments.partition_point(|s| s.plain.end <= plain);
        let seg = &self.segments[idx];
        if seg.literal {
            seg.raw.start + (plain - seg.plain.start)
        } else {
            seg.raw.start
        }
    }

    /// Raw offset for a plain offset used as a span end.
    ///
    /// A position inside an entity snaps forward past the entity.
    pub fn raw_end(&self, plain: usize) -> usize {
        if plain == 0 {
            return 0;
        }
        if plain >= self.plain_len {
            return self.raw_len;
        }
        let idx = self.segments.partition_point(|s| s.plain.end < plain);
        let seg = &self.segments[idx];
        if seg.literal {
            seg.raw.start + (plain - seg.plain.start)
        } else {
            seg.raw.end
        }
    }

    /// Map a plain span to the smallest raw span covering it
    pub fn map_span_to_raw(&self, plain: CharSpan) -> CharSpan {
        CharSpan::new(self.raw_start(plain.start), self.raw_end(plain.end))
    }
}
