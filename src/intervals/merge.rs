use crate::models::Interval;

/// Collapse an unordered set of spans into the minimal sorted, disjoint cover.
///
/// Spans are first normalized (see [`Interval::normalized`]); anything that
/// cannot be normalized is dropped. Touching spans (`next.start == current.end`)
/// merge, so a zero-length span can bridge two neighbours.
pub fn merge_intervals(intervals: &[Interval]) -> Vec<Interval> {
    let mut sorted: Vec<Interval> = intervals.iter().filter_map(Interval::normalized).collect();
    if sorted.is_empty() {
        return Vec::new();
    }

    sorted.sort_by(|a, b| a.start.total_cmp(&b.start));

    let mut merged = Vec::with_capacity(sorted.len());
    let mut current = sorted[0];

    for next in sorted.into_iter().skip(1) {
        if next.start <= current.end {
            current.end = current.end.max(next.end);
        } else {
            merged.push(current);
            current = next;
        }
    }
    merged.push(current);

    merged
}

/// True when `intervals` already satisfies the merged invariant.
pub fn is_merged(intervals: &[Interval]) -> bool {
    intervals.windows(2).all(|pair| pair[0].end < pair[1].start)
        && intervals.iter().all(|interval| interval.start <= interval.end)
}
