// Package bonus curves.
//
// A lone elite asset is worth more than its nominal value (it consolidates
// roster spots), while bundling several moderate assets costs the proposer a
// flat amount per extra asset. Both effects are modeled as step tables so a
// league can tune them in curves.toml.

use serde::{Deserialize, Serialize};

use crate::valuation::ValuationError;

// ---------------------------------------------------------------------------
// Step tables
// ---------------------------------------------------------------------------

/// One step of a bonus table: totals at or above `threshold` earn `bonus`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tier {
    pub threshold: u64,
    pub bonus: i64,
}

/// A step function evaluated top-down: the first tier whose threshold the
/// total reaches wins. Totals below every threshold earn 0.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "Vec<Tier>", into = "Vec<Tier>")]
pub struct TierTable {
    /// Sorted by threshold, highest first.
    tiers: Vec<Tier>,
}

impl TierTable {
    pub fn new(mut tiers: Vec<Tier>) -> Self {
        tiers.sort_by(|a, b| b.threshold.cmp(&a.threshold));
        TierTable { tiers }
    }

    /// Build from `(threshold, bonus)` pairs in any order.
    pub fn from_pairs(pairs: &[(u64, i64)]) -> Self {
        Self::new(
            pairs
                .iter()
                .map(|&(threshold, bonus)| Tier { threshold, bonus })
                .collect(),
        )
    }

    pub fn lookup(&self, total: u64) -> i64 {
        self.tiers
            .iter()
            .find(|t| total >= t.threshold)
            .map_or(0, |t| t.bonus)
    }

    pub fn tiers(&self) -> &[Tier] {
        &self.tiers
    }

    pub fn is_empty(&self) -> bool {
        self.tiers.is_empty()
    }

    /// Whether a higher total can never earn a smaller bonus.
    ///
    /// The implicit floor (bonus 0 below the lowest threshold) counts, so a
    /// negative bottom tier breaks monotonicity.
    pub fn is_non_decreasing(&self) -> bool {
        let descending_ok = self.tiers.windows(2).all(|w| w[0].bonus >= w[1].bonus);
        let floor_ok = self.tiers.last().map_or(true, |t| t.bonus >= 0);
        descending_ok && floor_ok
    }

    /// First threshold that appears more than once, if any.
    pub fn duplicate_threshold(&self) -> Option<u64> {
        self.tiers
            .windows(2)
            .find(|w| w[0].threshold == w[1].threshold)
            .map(|w| w[0].threshold)
    }
}

impl From<Vec<Tier>> for TierTable {
    fn from(tiers: Vec<Tier>) -> Self {
        TierTable::new(tiers)
    }
}

impl From<TierTable> for Vec<Tier> {
    fn from(table: TierTable) -> Self {
        table.tiers
    }
}

// ---------------------------------------------------------------------------
// Package curve
// ---------------------------------------------------------------------------

/// Bonus curve applied to the asset set being evaluated as one package.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PackageCurve {
    /// Lookup for a package of exactly one asset.
    pub single: TierTable,
    /// Coarser lookup on the summed value of a multi-asset package.
    pub multi: TierTable,
    /// Subtracted once for every asset beyond the first.
    pub penalty_per_extra_asset: i64,
}

impl PackageCurve {
    /// Package bonus for the raw valuations of one proposal.
    ///
    /// One asset uses the single table. Several assets use the multi table on
    /// their sum, less `(count - 1) * penalty_per_extra_asset`.
    pub fn bonus(&self, values: &[u32]) -> Result<i64, ValuationError> {
        match values {
            [] => Err(ValuationError::invalid(
                "package bonus needs at least one valuation",
            )),
            [only] => Ok(self.single_bonus(*only)),
            _ => {
                let total: u64 = values.iter().map(|&v| u64::from(v)).sum();
                let extra = values.len() as i64 - 1;
                let penalty = extra.saturating_mul(self.penalty_per_extra_asset).max(0);
                Ok(self.multi.lookup(total).saturating_sub(penalty))
            }
        }
    }

    /// Single-asset bonus. Infallible shorthand for `bonus(&[value])`.
    pub fn single_bonus(&self, value: u32) -> i64 {
        self.single.lookup(u64::from(value))
    }
}

impl Default for PackageCurve {
    fn default() -> Self {
        PackageCurve {
            single: TierTable::from_pairs(&[
                (9000, 3700),
                (8500, 3400),
                (8000, 3100),
                (7500, 2850),
                (7000, 2600),
                (6500, 2300),
                (6000, 2000),
                (5000, 1650),
                (4000, 1300),
                (3000, 1000),
                (2000, 700),
            ]),
            multi: TierTable::from_pairs(&[
                (9000, 3200),
                (8000, 2700),
                (7000, 2200),
                (6000, 1800),
                (5000, 1300),
                (4000, 900),
                (3000, 600),
                (2000, 400),
            ]),
            penalty_per_extra_asset: 400,
        }
    }
}

// ---------------------------------------------------------------------------
// Filler table
// ---------------------------------------------------------------------------

/// One step of the filler table: values at or below `ceiling` get
/// `adjustment` (normally negative).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FillerTier {
    pub ceiling: u64,
    pub adjustment: i64,
}

/// Per-member adjustment for low-value throw-ins on the receiving side of a
/// multi-asset offer. Evaluated bottom-up; values above every ceiling get 0.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "Vec<FillerTier>", into = "Vec<FillerTier>")]
pub struct FillerTable {
    /// Sorted by ceiling, lowest first.
    tiers: Vec<FillerTier>,
}

impl FillerTable {
    pub fn new(mut tiers: Vec<FillerTier>) -> Self {
        tiers.sort_by_key(|t| t.ceiling);
        FillerTable { tiers }
    }

    pub fn lookup(&self, value: u32) -> i64 {
        let value = u64::from(value);
        self.tiers
            .iter()
            .find(|t| value <= t.ceiling)
            .map_or(0, |t| t.adjustment)
    }

    pub fn tiers(&self) -> &[FillerTier] {
        &self.tiers
    }
}

impl Default for FillerTable {
    fn default() -> Self {
        FillerTable::new(vec![
            FillerTier { ceiling: 1000, adjustment: -800 },
            FillerTier { ceiling: 1500, adjustment: -600 },
            FillerTier { ceiling: 2000, adjustment: -400 },
            FillerTier { ceiling: 2500, adjustment: -250 },
        ])
    }
}

impl From<Vec<FillerTier>> for FillerTable {
    fn from(tiers: Vec<FillerTier>) -> Self {
        FillerTable::new(tiers)
    }
}

impl From<FillerTable> for Vec<FillerTier> {
    fn from(table: FillerTable) -> Self {
        table.tiers
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
