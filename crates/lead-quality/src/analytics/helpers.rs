/// Zero-guarded division: a zero denominator yields 0 rather than NaN/inf.
pub fn ratio(numerator: f64, denominator: f64) -> f64 {
    if denominator == 0.0 {
        0.0
    } else {
        numerator / denominator
    }
}

/// `part / whole * 100`, zero when `whole` is zero.
pub fn percentage(part: usize, whole: usize) -> f64 {
    ratio(part as f64, whole as f64) * 100.0
}

pub fn round_to(value: f64, decimals: i32) -> f64 {
    let factor = 10f64.powi(decimals);
    (value * factor).round() / factor
}

/// Rounds a non-negative amount to the nearest whole unit.
pub fn round_amount(value: f64) -> u64 {
    value.max(0.0).round() as u64
}

/// One-decimal percentage label, `"0"` when there is nothing to measure.
pub fn percentage_label(part: usize, whole: usize) -> String {
    if part == 0 || whole == 0 {
        "0".to_string()
    } else {
        format!("{:.1}", percentage(part, whole))
    }
}

/// Index of the largest count; ties resolve to the earliest position.
pub(crate) fn mode_index(counts: &[usize]) -> Option<usize> {
    let mut best: Option<(usize, usize)> = None;
    for (index, &count) in counts.iter().enumerate() {
        if count == 0 {
            continue;
        }
        match best {
            Some((_, top)) if top >= count => {}
            _ => best = Some((index, count)),
        }
    }
    best.map(|(index, _)| index)
}
