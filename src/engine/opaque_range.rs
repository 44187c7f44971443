//! Per-column bookkeeping of screen-row ranges already covered by opaque
//! pixels. Used both to clip a new wall's draw span against what a nearer
//! wall already painted, and to stop marching the ray once the column is
//! fully covered.

/// A sorted, pairwise-disjoint set of closed integer intervals `[a, b]`.
#[derive(Clone, Debug, Default)]
pub struct OpaqueRange {
    spans: Vec<(i32, i32)>,
}

impl OpaqueRange {
    pub fn new() -> Self {
        Self { spans: Vec::new() }
    }

    pub fn is_empty(&self) -> bool {
        self.spans.is_empty()
    }

    pub fn spans(&self) -> &[(i32, i32)] {
        &self.spans
    }

    /// Insert `[a, b]`, merging with any touching or overlapping spans.
    /// A single forward sweep: find the insertion point, then absorb
    /// every following span that overlaps or touches the new one.
    pub fn insert(&mut self, a: i32, b: i32) {
        if a > b {
            return;
        }
        let idx = self.spans.partition_point(|&(_, hi)| hi + 1 < a);

        let mut lo = a;
        let mut hi = b;
        let mut end = idx;
        while end < self.spans.len() && self.spans[end].0 <= hi + 1 {
            lo = lo.min(self.spans[end].0);
            hi = hi.max(self.spans[end].1);
            end += 1;
        }
        self.spans.splice(idx..end, std::iter::once((lo, hi)));
    }

    /// Whether `[a, b]` is fully contained in some existing span.
    pub fn covers(&self, a: i32, b: i32) -> bool {
        self.spans
            .iter()
            .any(|&(lo, hi)| lo <= a && b <= hi)
    }

    /// True once `[full_lo, full_hi]` is entirely covered — the signal to
    /// stop marching further tiles for this column.
    pub fn is_full(&self, full_lo: i32, full_hi: i32) -> bool {
        self.covers(full_lo, full_hi)
    }

    /// Clip `[a, b]` against the covered spans, returning the visible
    /// sub-intervals in ascending order. Fully-covered input yields an
    /// empty vec.
    pub fn visible_subranges(&self, a: i32, b: i32) -> Vec<(i32, i32)> {
        let mut cursor = a;
        let mut out = Vec::new();
        for &(lo, hi) in &self.spans {
            if hi < cursor || lo > b {
                continue;
            }
            if lo > cursor {
                out.push((cursor, (lo - 1).min(b)));
            }
            cursor = cursor.max(hi + 1);
            if cursor > b {
                break;
            }
        }
        if cursor <= b {
            out.push((cursor, b));
        }
        out
    }
}
