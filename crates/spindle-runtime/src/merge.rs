//! Per-cell multi-way event merging
//!
//! Every enqueue step rebuilds one cell's event lane from three sorted
//! sources: the carry-over tail of the previous lane, the freshly translated
//! pending events, and the cell's event generators queried on the next
//! epoch's interval. The active region `[t_from, t_to)` is produced by a
//! balanced pairwise merge; the two suffixes beyond `t_to` are merged behind
//! it so the whole lane stays sorted.

use spindle_core::{Event, EventGenerator, Time};

/// Split a time-sorted slice at `t`: `(events < t, events >= t)`
fn split_at_time(events: &[Event], t: Time) -> (&[Event], &[Event]) {
    events.split_at(events.partition_point(|e| e.time < t))
}

/// Two-way stable merge by time, appended to `out`; ties take from `a` first
fn merge_two(a: &[Event], b: &[Event], out: &mut Vec<Event>) {
    out.reserve(a.len() + b.len());
    let (mut i, mut j) = (0, 0);
    while i < a.len() && j < b.len() {
        if b[j].time < a[i].time {
            out.push(b[j]);
            j += 1;
        } else {
            out.push(a[i]);
            i += 1;
        }
    }
    out.extend_from_slice(&a[i..]);
    out.extend_from_slice(&b[j..]);
}

/// Balanced pairwise merge of presorted spans, appended to `out`.
///
/// With `G` generators plus the two carried sequences this costs
/// `O(N log(G+2))` comparisons, which beats a heap for the small `G`
/// typical per cell. Ties resolve in span order, so the result is stable.
pub fn tree_merge_events(spans: &[&[Event]], out: &mut Vec<Event>) {
    match spans {
        [] => {}
        [only] => out.extend_from_slice(only),
        [a, b] => merge_two(a, b, out),
        _ => {
            let mid = spans.len() / 2;
            let mut left = Vec::new();
            let mut right = Vec::new();
            tree_merge_events(&spans[..mid], &mut left);
            tree_merge_events(&spans[mid..], &mut right);
            merge_two(&left, &right, out);
        }
    }
}

/// Build a cell's next event lane from sorted pending events, the previous
/// lane, and generator events for `[t_from, t_to)`.
///
/// `out` receives the sorted union of the three sources restricted to
/// `[t_from, t_to)`, followed by the merged `>= t_to` suffixes of the old
/// and pending events. Entries of `old_events` before `t_from` were consumed
/// by the previous update and are dropped.
///
/// Equal-time ties resolve by source: carry-over, then pending, then
/// generators in registration order; in the suffix, pending before
/// carry-over. The order is fixed so every rank produces the same lane.
pub fn merge_cell_events(
    t_from: Time,
    t_to: Time,
    old_events: &[Event],
    pending: &[Event],
    generators: &mut [EventGenerator],
    out: &mut Vec<Event>,
) {
    out.clear();
    let (_, mut old_events) = split_at_time(old_events, t_from);
    let mut pending = pending;

    if !generators.is_empty() {
        let (old_active, old_tail) = split_at_time(old_events, t_to);
        let (pending_active, pending_tail) = split_at_time(pending, t_to);

        let mut spans: Vec<&[Event]> = Vec::with_capacity(2 + generators.len());
        spans.push(old_active);
        spans.push(pending_active);
        for generator in generators.iter_mut() {
            let events = generator.events(t_from, t_to);
            if !events.is_empty() {
                spans.push(events);
            }
        }

        tree_merge_events(&spans, out);

        old_events = old_tail;
        pending = pending_tail;
    }

    // Merge the remaining future events behind the active region.
    merge_two(pending, old_events, out);
}
