/// Numeric value of a challenge rating string: `"1/8"` → 0.125, `"3"` → 3.0.
/// Other fractions `a/b` are divided out; anything else goes through decimal
/// parsing.
pub fn challenge_value(cr: &str) -> Option<f64> {
    let cr = cr.trim();
    match cr {
        "0" => Some(0.0),
        "1/8" => Some(0.125),
        "1/4" => Some(0.25),
        "1/2" => Some(0.5),
        _ => match cr.split_once('/') {
            Some((num, den)) => {
                let num: f64 = num.trim().parse().ok()?;
                let den: f64 = den.trim().parse().ok()?;
                (den != 0.0).then(|| num / den)
            }
            None => cr.parse().ok().filter(|v: &f64| v.is_finite()),
        },
    }
}

/// How many copies a conjure summons for a challenge rating.
///
/// Uses the numeric thresholds throughout: CR ≤ 1/4 gives 8, ≤ 1/2 gives 4,
/// ≤ 1 gives 2, anything higher 1. A rating that cannot be read gives 1.
pub fn count_for_challenge_rating(cr: &str) -> u32 {
    match challenge_value(cr) {
        Some(v) if v <= 0.25 => 8,
        Some(v) if v <= 0.5 => 4,
        Some(v) if v <= 1.0 => 2,
        _ => 1,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fractions_and_decimals() {
        assert_eq!(challenge_value("1/8"), Some(0.125));
        assert_eq!(challenge_value(" 2 "), Some(2.0));
        assert_eq!(challenge_value("0.5"), Some(0.5));
        assert_eq!(challenge_value("3/4"), Some(0.75));
        assert_eq!(challenge_value("1/0"), None);
        assert_eq!(challenge_value("unknown"), None);
    }

    #[test]
    fn eighth_and_zero_summon_eight() {
        assert_eq!(count_for_challenge_rating("1/8"), 8);
        assert_eq!(count_for_challenge_rating("0"), 8);
        assert_eq!(count_for_challenge_rating(""), 1);
    }
}
