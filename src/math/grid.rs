use std::ops::Range;

// ─────────────────────────────────────────────
// 網格工具：排序、重複點合併、重疊區段、外插索引
// ─────────────────────────────────────────────

/// `num` evenly spaced samples over `[start, stop]`, endpoint included.
pub fn linspace(start: f64, stop: f64, num: usize) -> Vec<f64> {
    match num {
        0 => Vec::new(),
        1 => vec![start],
        _ => {
            let step = (stop - start) / (num - 1) as f64;
            let mut grid: Vec<f64> = (0..num).map(|i| start + i as f64 * step).collect();
            grid[num - 1] = stop;
            grid
        }
    }
}

/// Equal neighbours are allowed; they are merged later by
/// [`collapse_duplicates`].
pub fn is_non_decreasing(x: &[f64]) -> bool {
    x.windows(2).all(|pair| pair[0] <= pair[1])
}

/// Sorts `(x, y)` pairs by `x`. The sort is stable, so samples sharing an `x`
/// keep their original relative order.
pub fn sort_by_x(x: &[f64], y: &[f64]) -> (Vec<f64>, Vec<f64>) {
    let mut pairs: Vec<(f64, f64)> = x.iter().copied().zip(y.iter().copied()).collect();
    pairs.sort_by(|lhs, rhs| lhs.0.total_cmp(&rhs.0));
    pairs.into_iter().unzip()
}

/// Merges runs of identical `x` in a sorted grid into one sample carrying the
/// arithmetic mean of the run's `y` values.
pub fn collapse_duplicates(x_sorted: &[f64], y_sorted: &[f64]) -> (Vec<f64>, Vec<f64>) {
    let mut x_unique = Vec::with_capacity(x_sorted.len());
    let mut y_mean = Vec::with_capacity(y_sorted.len());

    let mut start = 0;
    while start < x_sorted.len() {
        let value = x_sorted[start];
        let end = start + x_sorted[start..].iter().take_while(|&&x| x == value).count();
        let run = &y_sorted[start..end];
        x_unique.push(value);
        y_mean.push(run.iter().sum::<f64>() / run.len() as f64);
        start = end;
    }

    (x_unique, y_mean)
}

fn step_direction(lhs: f64, rhs: f64) -> i8 {
    if rhs > lhs {
        1
    } else if rhs < lhs {
        -1
    } else {
        0
    }
}

/// Value ranges `(min, max)` of the maximal monotonic runs of `x` that move
/// against the dominant direction of the array (`x[0]` vs `x[last]`).
///
/// Consecutive runs share their turning point. Flat runs are never reported.
pub fn overlapping_regions(x: &[f64]) -> Vec<(f64, f64)> {
    if x.len() < 2 {
        return Vec::new();
    }
    let against = if x[0] < x[x.len() - 1] { -1 } else { 1 };

    let mut runs: Vec<(Range<usize>, i8)> = Vec::new();
    let mut start = 0;
    let mut direction = step_direction(x[0], x[1]);
    for i in 1..(x.len() - 1) {
        let next = step_direction(x[i], x[i + 1]);
        if next != direction {
            runs.push((start..(i + 1), direction));
            start = i;
            direction = next;
        }
    }
    runs.push((start..x.len(), direction));

    runs.into_iter()
        .filter(|(_, direction)| *direction == against)
        .map(|(range, _)| {
            let run = &x[range];
            let lo = run.iter().copied().fold(f64::INFINITY, f64::min);
            let hi = run.iter().copied().fold(f64::NEG_INFINITY, f64::max);
            (lo, hi)
        })
        .collect()
}

/// Common range of two increasing grids, from their end points.
pub fn overlap_range(lhs: &[f64], rhs: &[f64]) -> Option<(f64, f64)> {
    let (lhs_first, lhs_last) = (lhs.first()?, lhs.last()?);
    let (rhs_first, rhs_last) = (rhs.first()?, rhs.last()?);
    let lo = lhs_first.max(*rhs_first);
    let hi = lhs_last.min(*rhs_last);
    if lo <= hi { Some((lo, hi)) } else { None }
}

/// Contiguous index range of an increasing grid whose values lie in `[lo, hi]`.
pub fn slice_within(x: &[f64], lo: f64, hi: f64) -> Option<Range<usize>> {
    let start = x.partition_point(|&v| v < lo);
    let end = x.partition_point(|&v| v <= hi);
    if start < end { Some(start..end) } else { None }
}

/// `(low, high)` where `low` is the last index of `x_eval` below `x_min` and
/// `high` the first index above `x_max`.
pub fn extrapolation_indices(x_eval: &[f64], x_min: f64, x_max: f64) -> (Option<usize>, Option<usize>) {
    let low = x_eval.iter().rposition(|&x| x < x_min);
    let high = x_eval.iter().position(|&x| x > x_max);
    (low, high)
}
