//! Ordered fallback combinators.
//!
//! Fallback chains are written as an ordered list of candidate producers so
//! the priority order of each chain stays visible at the call site.

/// A lazily evaluated candidate in a fallback chain.
pub type Candidate<'a, T> = &'a dyn Fn() -> Option<T>;

/// Evaluate candidates in order and return the first defined result.
///
/// Later candidates are not evaluated once one yields a value.
pub fn first_defined<T>(candidates: &[Candidate<'_, T>]) -> Option<T> {
    candidates.iter().find_map(|candidate| candidate())
}

/// Pick the first count strictly greater than zero.
///
/// Zero and absent candidates are both skipped, so a stale zero in a
/// higher-priority source cannot mask a populated lower-priority one. The
/// cost is that a confirmed zero falls through to the next candidate and
/// a genuine zero is only reported when every candidate is zero or absent
/// (the result is then `None`).
pub fn pick_nonzero_count(candidates: &[Option<f64>]) -> Option<f64> {
    candidates
        .iter()
        .flatten()
        .copied()
        .find(|v| v.is_finite() && *v > 0.0)
}
