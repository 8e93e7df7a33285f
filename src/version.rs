//! Permissive dotted-numeric version comparison.
//!
//! Not semver: `"1.2"` equals `"1.2.0"`, and any segment that is not a
//! non-negative integer counts as `0` instead of being an error.

use std::cmp::Ordering;

/// Compare two dotted version strings segment by segment.
///
/// The shorter version is padded with zeros, so trailing `.0` segments never
/// change the result.
pub fn compare(a: &str, b: &str) -> Ordering {
    let a: Vec<u64> = segments(a).collect();
    let b: Vec<u64> = segments(b).collect();

    (0..a.len().max(b.len()))
        .map(|i| {
            let x = a.get(i).copied().unwrap_or(0);
            let y = b.get(i).copied().unwrap_or(0);
            x.cmp(&y)
        })
        .find(|ord| ord.is_ne())
        .unwrap_or(Ordering::Equal)
}

/// True when `candidate` is strictly newer than `current`.
pub fn is_newer(candidate: &str, current: &str) -> bool {
    compare(candidate, current) == Ordering::Greater
}

fn segments(version: &str) -> impl Iterator<Item = u64> + '_ {
    version
        .split('.')
        .map(|segment| segment.trim().parse::<u64>().unwrap_or(0))
}
