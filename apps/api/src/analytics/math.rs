//! Small numeric helpers shared by every scorer.
//!
//! Every ratio here defines 0/0 as 0 so no score can become NaN or infinite.

/// Round half up (2.5 → 3, -2.5 → -2).
pub fn round_half_up(value: f64) -> f64 {
    (value + 0.5).floor()
}

/// Rounds to `decimals` places, half up.
pub fn round_to(value: f64, decimals: i32) -> f64 {
    let factor = 10_f64.powi(decimals);
    round_half_up(value * factor) / factor
}

/// `100 * part / whole`, or 0 when `whole` is 0.
pub fn percent(part: usize, whole: usize) -> f64 {
    if whole == 0 {
        0.0
    } else {
        100.0 * part as f64 / whole as f64
    }
}

pub fn mean<I>(values: I) -> Option<f64>
where
    I: IntoIterator<Item = f64>,
{
    let (sum, count) = values
        .into_iter()
        .fold((0.0, 0usize), |(sum, count), v| (sum + v, count + 1));
    (count > 0).then(|| sum / count as f64)
}

/// Rounds, then clamps into `[floor, ceiling]`.
pub fn bounded(value: f64, floor: u32, ceiling: u32) -> u32 {
    let rounded = round_half_up(value);
    if rounded.is_nan() {
        return floor;
    }
    rounded.clamp(floor as f64, ceiling as f64) as u32
}

/// Rounds and clamps into the 0-100 score range.
pub fn score(value: f64) -> u32 {
    bounded(value, 0, 100)
}
