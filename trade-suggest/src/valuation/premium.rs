// Quarterback premium.
//
// Superflex-style leagues value starting QBs above their market number. The
// premium goes to the top-N quarterbacks in the pool by valuation, and is a
// flat amount per qualifying QB in a package.

use std::collections::HashSet;

use crate::league::asset::{Asset, Position};
use crate::league::pool::AssetPool;

/// Display names of the `top_n` highest-valued quarterbacks in the pool.
///
/// Ties keep pool order. Recompute whenever the pool changes.
pub fn qualified_quarterbacks(pool: &AssetPool, top_n: usize) -> HashSet<String> {
    let mut qbs: Vec<&Asset> = pool
        .iter()
        .filter(|a| a.position == Position::Quarterback)
        .collect();
    // sort_by is stable, so equal valuations stay in pool order
    qbs.sort_by(|a, b| b.valuation.cmp(&a.valuation));
    qbs.into_iter()
        .take(top_n)
        .map(|a| a.display_name.clone())
        .collect()
}

/// The QB premium rule: which quarterbacks qualify and how much each earns.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QbPremium {
    pub qualified: HashSet<String>,
    pub amount: u32,
}

impl QbPremium {
    pub fn new(qualified: HashSet<String>, amount: u32) -> Self {
        QbPremium { qualified, amount }
    }

    /// Build the rule from the current pool.
    pub fn from_pool(pool: &AssetPool, top_n: usize, amount: u32) -> Self {
        QbPremium {
            qualified: qualified_quarterbacks(pool, top_n),
            amount,
        }
    }

    /// A rule that never awards anything.
    pub fn none() -> Self {
        QbPremium::default()
    }

    pub fn qualifies(&self, asset: &Asset) -> bool {
        asset.is_quarterback() && self.qualified.contains(&asset.display_name)
    }

    /// Premium earned by one asset: `amount` if it qualifies, else 0.
    pub fn premium_for(&self, asset: &Asset) -> i64 {
        if self.qualifies(asset) {
            i64::from(self.amount)
        } else {
            0
        }
    }
}
