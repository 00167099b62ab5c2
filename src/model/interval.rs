//! Arithmetic on closed integer intervals, used both for cultivation periods
//! (weeks) and for variable domains viewed as their bound range (beds).

/// True iff the closed intervals `[s1, e1]` and `[s2, e2]` intersect.
pub fn intersect(s1: i32, e1: i32, s2: i32, e2: i32) -> bool {
    !(s2 > e1 || s1 > e2)
}

/// The intersection of two closed intervals, if any.
pub fn range_intersection(s1: i32, e1: i32, s2: i32, e2: i32) -> Option<(i32, i32)> {
    if !intersect(s1, e1, s2, e2) {
        return None;
    }
    Some((s1.max(s2), e1.min(e2)))
}

/// The minimum distance between two bound ranges. Zero when the ranges
/// intersect, otherwise the gap between the largest lower bound and the
/// smallest upper bound.
pub fn min_distance(lb1: i32, ub1: i32, lb2: i32, ub2: i32) -> i32 {
    if intersect(lb1, ub1, lb2, ub2) {
        return 0;
    }
    lb1.max(lb2) - ub1.min(ub2)
}

/// The maximum distance achievable between two bound ranges.
pub fn max_distance(lb1: i32, ub1: i32, lb2: i32, ub2: i32) -> i32 {
    let d1 = (ub2 - lb1).abs();
    let d2 = (ub1 - lb2).abs();
    d1.max(d2)
}
