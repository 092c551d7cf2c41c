//! Region bookkeeping shared by the matcher passes.

use std::ops::Range;

/// Byte ranges of a text already taken by an earlier match.
///
/// Ranges are kept sorted by start and never overlap.
#[derive(Debug, Clone, Default)]
pub struct ClaimedRegions {
    regions: Vec<Range<usize>>,
}

impl ClaimedRegions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether `range` overlaps nothing claimed so far.
    pub fn is_free(&self, range: &Range<usize>) -> bool {
        !self
            .regions
            .iter()
            .any(|claimed| claimed.start < range.end && range.start < claimed.end)
    }

    /// Claim `range` if it is free. Returns whether the claim succeeded.
    pub fn claim(&mut self, range: Range<usize>) -> bool {
        if range.is_empty() || !self.is_free(&range) {
            return false;
        }
        let at = self.regions.partition_point(|r| r.start < range.start);
        self.regions.insert(at, range);
        true
    }

    /// The parts of `0..len` nobody has claimed, in order.
    pub fn unclaimed_gaps(&self, len: usize) -> Vec<Range<usize>> {
        let mut gaps = Vec::with_capacity(self.regions.len() + 1);
        let mut cursor = 0;
        for claimed in &self.regions {
            if claimed.start > cursor {
                gaps.push(cursor..claimed.start);
            }
            cursor = cursor.max(claimed.end);
        }
        if cursor < len {
            gaps.push(cursor..len);
        }
        gaps
    }

    /// Unclaimed slices of `text` with their byte offsets.
    pub fn gaps<'t>(&self, text: &'t str) -> impl Iterator<Item = (usize, &'t str)> + 't {
        self.unclaimed_gaps(text.len())
            .into_iter()
            .map(move |gap| (gap.start, &text[gap]))
    }

    pub fn regions(&self) -> &[Range<usize>] {
        &self.regions
    }

    pub fn is_empty(&self) -> bool {
        self.regions.is_empty()
    }
}
