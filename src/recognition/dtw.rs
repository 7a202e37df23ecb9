use crate::{geometry::distance, types::Point};

/// Dynamic time warping distance between two point sequences, normalized by
/// the longer sequence so the result reads as a mean per-step distance.
pub(crate) fn dtw_distance(a: &[Point], b: &[Point]) -> Option<f32> {
    if a.is_empty() || b.is_empty() {
        return None;
    }

    let width = b.len() + 1;
    let mut prev = vec![f32::INFINITY; width];
    let mut curr = vec![f32::INFINITY; width];
    prev[0] = 0.0;

    for &pa in a {
        curr[0] = f32::INFINITY;
        for (j, &pb) in b.iter().enumerate() {
            let best = prev[j].min(prev[j + 1]).min(curr[j]);
            curr[j + 1] = distance(pa, pb) + best;
        }
        core::mem::swap(&mut prev, &mut curr);
    }

    Some(prev[b.len()] / a.len().max(b.len()) as f32)
}
