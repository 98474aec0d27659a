//! Natural ordering for frame file names.

use std::cmp::Ordering;

/// Compare file names so embedded numbers sort numerically:
/// `img_2.png` comes before `img_10.png`.
///
/// Non-digit runs compare case-insensitively; digit runs compare by value
/// with leading zeros ignored. Names that only differ in padding or case
/// fall back to plain string order so the result stays total.
pub fn natural_cmp(a: &str, b: &str) -> Ordering {
    let mut runs_a = runs(a);
    let mut runs_b = runs(b);

    loop {
        match (runs_a.next(), runs_b.next()) {
            (None, None) => break,
            (None, Some(_)) => return Ordering::Less,
            (Some(_), None) => return Ordering::Greater,
            (Some(x), Some(y)) => {
                let ord = compare_runs(x, y);
                if ord != Ordering::Equal {
                    return ord;
                }
            }
        }
    }

    a.cmp(b)
}

fn compare_runs(a: &str, b: &str) -> Ordering {
    let digits = |s: &str| s.bytes().all(|c| c.is_ascii_digit());
    if digits(a) && digits(b) {
        compare_numeric(a, b)
    } else {
        let a = a.to_ascii_lowercase();
        let b = b.to_ascii_lowercase();
        a.cmp(&b)
    }
}

/// Compare two digit runs by numeric value without parsing, so arbitrary
/// lengths cannot overflow.
fn compare_numeric(a: &str, b: &str) -> Ordering {
    let a = a.trim_start_matches('0');
    let b = b.trim_start_matches('0');
    a.len().cmp(&b.len()).then_with(|| a.cmp(b))
}

/// Split into maximal runs of digits and non-digits.
fn runs(s: &str) -> impl Iterator<Item = &str> {
    let mut rest = s;
    std::iter::from_fn(move || {
        if rest.is_empty() {
            return None;
        }
        let first_is_digit = rest.as_bytes()[0].is_ascii_digit();
        let end = rest
            .bytes()
            .position(|c| c.is_ascii_digit() != first_is_digit)
            .unwrap_or(rest.len());
        let (run, tail) = rest.split_at(end);
        rest = tail;
        Some(run)
    })
}
