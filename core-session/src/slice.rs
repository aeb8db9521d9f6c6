use std::ops::Range;

/// Half-open slice bounds with host-language semantics: negative values count
/// from the end, missing values mean "from the start" and "to the end", and
/// everything is clamped to the sequence. Only unit steps are supported.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SliceBounds {
    pub start: Option<i64>,
    pub stop: Option<i64>,
}

impl SliceBounds {
    pub fn new(start: Option<i64>, stop: Option<i64>) -> Self {
        Self { start, stop }
    }

    /// The whole sequence.
    pub fn full() -> Self {
        Self::default()
    }

    /// Resolve against a sequence of `len` items. An inverted slice resolves
    /// to an empty range positioned at its start.
    pub fn resolve(&self, len: usize) -> Range<usize> {
        let start = self.start.map_or(0, |start| clamp(start, len));
        let stop = self.stop.map_or(len, |stop| clamp(stop, len));
        start..stop.max(start)
    }
}

impl From<Range<usize>> for SliceBounds {
    fn from(range: Range<usize>) -> Self {
        Self::new(
            i64::try_from(range.start).ok(),
            Some(i64::try_from(range.end).unwrap_or(i64::MAX)),
        )
    }
}

fn clamp(value: i64, len: usize) -> usize {
    let len_i = i64::try_from(len).unwrap_or(i64::MAX);
    let value = if value < 0 { value + len_i } else { value };
    usize::try_from(value.clamp(0, len_i)).unwrap_or(len)
}
