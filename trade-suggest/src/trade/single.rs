// 1-for-1 matching: every individual asset on another roster whose value
// lands inside the tolerance band around the target.

use std::collections::HashSet;

use crate::league::asset::Asset;
use crate::league::pool::{candidates, AssetPool};
use crate::trade::band::ToleranceBand;
use crate::valuation::curve::PackageCurve;
use crate::valuation::premium::QbPremium;

/// How a lone candidate asset is valued before comparing it with the target.
///
/// The default is the raw valuation. Adding the premium values candidates the
/// same way the outgoing side is valued; adding the single-asset curve bonus
/// makes sense when the target itself is a multi-asset package with its own
/// curve adjustment.
#[derive(Debug, Clone, Copy, Default)]
pub struct CandidateValuer<'a> {
    premium: Option<&'a QbPremium>,
    curve: Option<&'a PackageCurve>,
}

impl<'a> CandidateValuer<'a> {
    /// Value candidates at their raw valuation only.
    pub fn raw() -> Self {
        CandidateValuer::default()
    }

    pub fn with_premium(mut self, premium: &'a QbPremium) -> Self {
        self.premium = Some(premium);
        self
    }

    pub fn with_curve_bonus(mut self, curve: &'a PackageCurve) -> Self {
        self.curve = Some(curve);
        self
    }

    pub fn value(&self, asset: &Asset) -> i64 {
        let premium = self.premium.map_or(0, |p| p.premium_for(asset));
        let bonus = self.curve.map_or(0, |c| c.single_bonus(asset.valuation));
        i64::from(asset.valuation)
            .saturating_add(premium)
            .saturating_add(bonus)
    }
}

/// One asset that fits the band, with the value it was matched on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SingleMatch<'a> {
    pub asset: &'a Asset,
    pub value: i64,
}

/// Every asset not held by `exclude_owner` whose candidate value falls in
/// `[floor(target * (1 - pct/100)), floor(target * (1 + pct/100))]`.
///
/// Results come back in pool order; an empty result is a valid answer.
pub fn match_one<'a>(
    pool: &'a AssetPool,
    target_value: i64,
    tolerance_pct: u32,
    exclude_owner: &str,
    valuer: &CandidateValuer<'_>,
) -> Vec<SingleMatch<'a>> {
    let band = ToleranceBand::around(target_value, tolerance_pct);
    let no_exclusions = HashSet::new();
    candidates(pool, exclude_owner, &no_exclusions)
        .map(|asset| SingleMatch {
            asset,
            value: valuer.value(asset),
        })
        .filter(|m| band.contains(m.value))
        .collect()
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
