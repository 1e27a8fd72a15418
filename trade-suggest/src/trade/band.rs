// Tolerance band arithmetic.

use serde::Serialize;

/// Inclusive `[low, high]` window around a target value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ToleranceBand {
    pub low: i64,
    pub high: i64,
}

impl ToleranceBand {
    /// Band of `tolerance_pct` percent either side of `target`.
    ///
    /// `low = floor(target * (1 - pct/100))`, `high = floor(target * (1 + pct/100))`,
    /// computed in integers so 5% of 5000 is exactly 250. A negative target
    /// (a heavily penalized package) swaps the bounds so `low <= high` holds.
    pub fn around(target: i64, tolerance_pct: u32) -> Self {
        let pct = i128::from(tolerance_pct);
        let target = i128::from(target);
        let below = saturate((target * (100 - pct)).div_euclid(100));
        let above = saturate((target * (100 + pct)).div_euclid(100));
        ToleranceBand {
            low: below.min(above),
            high: below.max(above),
        }
    }

    pub fn contains(&self, value: i64) -> bool {
        self.low <= value && value <= self.high
    }
}

/// Clamp a widened intermediate back into `i64`.
fn saturate(value: i128) -> i64 {
    i64::try_from(value).unwrap_or(if value < 0 { i64::MIN } else { i64::MAX })
}
