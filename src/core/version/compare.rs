// ─── Version Comparison ───
// Ordering over loosely formatted mod/loader version strings.

use std::cmp::Ordering;

#[derive(Debug, Clone, PartialEq, Eq)]
enum Segment<'a> {
    Numeric(u64),
    Text(&'a str),
}

impl Segment<'_> {
    fn as_text(&self) -> String {
        match self {
            Segment::Numeric(n) => n.to_string(),
            Segment::Text(s) => (*s).to_string(),
        }
    }
}

/// Drop `+build` then `-prerelease`, then a leading `v`.
fn core_part(version: &str) -> &str {
    let without_build = version.split('+').next().unwrap_or(version);
    let without_pre = without_build.split('-').next().unwrap_or(without_build);
    without_pre.strip_prefix('v').unwrap_or(without_pre)
}

/// `None` when a numeric-looking segment does not fit in a `u64`.
fn segments(version: &str) -> Option<Vec<Segment<'_>>> {
    core_part(version)
        .split('.')
        .map(|part| {
            if !part.is_empty() && part.bytes().all(|b| b.is_ascii_digit()) {
                part.parse().ok().map(Segment::Numeric)
            } else {
                Some(Segment::Text(part))
            }
        })
        .collect()
}

/// Compare two version identifiers.
///
/// Numeric segments compare numerically (`1.2.10 > 1.2.9`), anything else
/// compares as text, missing trailing segments count as `0`. Build metadata
/// and pre-release tags are ignored. If either side cannot be segmented the
/// comparison falls back to plain string order, so this never fails.
pub fn compare_versions(a: &str, b: &str) -> Ordering {
    let (left, right) = match (segments(a), segments(b)) {
        (Some(left), Some(right)) => (left, right),
        _ => return a.cmp(b),
    };

    let zero = Segment::Numeric(0);
    let len = left.len().max(right.len());

    for i in 0..len {
        let l = left.get(i).unwrap_or(&zero);
        let r = right.get(i).unwrap_or(&zero);

        let ord = match (l, r) {
            (Segment::Numeric(x), Segment::Numeric(y)) => x.cmp(y),
            _ => l.as_text().cmp(&r.as_text()),
        };

        if ord != Ordering::Equal {
            return ord;
        }
    }

    Ordering::Equal
}

/// `true` when `candidate` orders strictly after `current`.
pub fn is_newer(candidate: &str, current: &str) -> bool {
    compare_versions(candidate, current) == Ordering::Greater
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn numeric_segments_are_not_string_ordered() {
        assert_eq!(compare_versions("1.2.10", "1.2.9"), Ordering::Greater);
        assert_eq!(compare_versions("1.2.9", "1.2.10"), Ordering::Less);
    }

    #[test]
    fn equal_is_reflexive() {
        for v in ["1.0", "0.16.5", "v2.3.4+1.21.1", "beta", "", "1..2"] {
            assert_eq!(compare_versions(v, v), Ordering::Equal, "{v}");
        }
    }

    #[test]
    fn prerelease_and_build_suffixes_are_ignored() {
        assert_eq!(compare_versions("1.2.0-beta", "1.2.0"), Ordering::Equal);
        assert_eq!(
            compare_versions("0.102.0+1.21.1", "0.102.0+1.20.4"),
            Ordering::Equal
        );
        assert_eq!(compare_versions("v1.3", "1.3"), Ordering::Equal);
    }

    #[test]
    fn shorter_versions_are_zero_padded() {
        assert_eq!(compare_versions("1.2", "1.2.0"), Ordering::Equal);
        assert_eq!(compare_versions("1.2", "1.2.1"), Ordering::Less);
    }

    #[test]
    fn text_segments_use_string_order() {
        assert_eq!(compare_versions("1.2.b", "1.2.a"), Ordering::Greater);
        assert_eq!(compare_versions("1.2.a", "1.2.0"), Ordering::Greater);
    }

    #[test]
    fn oversized_numbers_fall_back_to_raw_string_order() {
        let huge = "1.99999999999999999999999";
        assert_eq!(compare_versions(huge, "1.5"), huge.cmp("1.5"));
    }

    #[test]
    fn antisymmetric_and_transitive_over_sample() {
        let sample = [
            "0.9", "0.15.11", "0.16.0", "0.16.5", "1.0", "1.2.9", "1.2.10", "1.10", "2.0.1",
        ];

        for (i, a) in sample.iter().enumerate() {
            for (j, b) in sample.iter().enumerate() {
                let ab = compare_versions(a, b);
                assert_eq!(ab, compare_versions(b, a).reverse(), "{a} vs {b}");
                assert_eq!(ab, i.cmp(&j), "{a} vs {b}");
            }
        }
    }

    #[test]
    fn is_newer_is_strict() {
        assert!(is_newer("0.16.10", "0.16.9"));
        assert!(!is_newer("0.16.9", "0.16.9"));
        assert!(!is_newer("0.16.8", "0.16.9"));
    }
}
