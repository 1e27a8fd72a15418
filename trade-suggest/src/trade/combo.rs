// N-for-1 matching: same-owner combinations of 2 or 3 assets whose combined
// value lands inside the tolerance band.
//
// Combinations are enumerated lazily per owner, and members worth more than
// the raw cap are dropped before enumeration so they never inflate the search.

use std::collections::{HashMap, HashSet};

use crate::league::asset::Asset;
use crate::league::pool::{candidates, AssetPool};
use crate::trade::band::ToleranceBand;
use crate::valuation::curve::FillerTable;
use crate::valuation::premium::QbPremium;
use crate::valuation::ValuationError;

// ---------------------------------------------------------------------------
// Lazy k-combinations
// ---------------------------------------------------------------------------

/// Iterator over every k-sized subset of a slice, in lexicographic index
/// order. Holds only the current index vector; nothing is materialized ahead.
#[derive(Debug, Clone)]
pub struct Combinations<'a, T> {
    items: &'a [T],
    indices: Vec<usize>,
    started: bool,
    done: bool,
}

impl<'a, T> Combinations<'a, T> {
    pub fn new(items: &'a [T], k: usize) -> Self {
        Combinations {
            items,
            indices: (0..k).collect(),
            started: false,
            done: k > items.len(),
        }
    }

    fn current(&self) -> Vec<&'a T> {
        self.indices.iter().map(|&i| &self.items[i]).collect()
    }
}

impl<'a, T> Iterator for Combinations<'a, T> {
    type Item = Vec<&'a T>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }
        if !self.started {
            self.started = true;
            return Some(self.current());
        }

        let n = self.items.len();
        let k = self.indices.len();
        // rightmost index that can still move forward
        let Some(i) = (0..k).rev().find(|&i| self.indices[i] != i + n - k) else {
            self.done = true;
            return None;
        };
        self.indices[i] += 1;
        for j in i + 1..k {
            self.indices[j] = self.indices[j - 1] + 1;
        }
        Some(self.current())
    }
}

// ---------------------------------------------------------------------------
// Query and result types
// ---------------------------------------------------------------------------

/// Parameters of one combination search.
#[derive(Debug, Clone, Copy)]
pub struct ComboQuery<'a> {
    /// Inclusive value window a combination must land in.
    pub band: ToleranceBand,
    /// Members per combination (2 or 3 in practice).
    pub combo_size: usize,
    pub premium: &'a QbPremium,
    /// No member may be worth more than this raw valuation.
    pub raw_cap: i64,
    pub exclude_owner: &'a str,
    /// Assets already offered elsewhere, e.g. 1-for-1 matches.
    pub exclude_asset_ids: Option<&'a HashSet<String>>,
    /// Optional per-member adjustment for low-value throw-ins.
    pub filler: Option<&'a FillerTable>,
}

impl<'a> ComboQuery<'a> {
    pub fn new(
        band: ToleranceBand,
        combo_size: usize,
        premium: &'a QbPremium,
        raw_cap: i64,
        exclude_owner: &'a str,
    ) -> Self {
        ComboQuery {
            band,
            combo_size,
            premium,
            raw_cap,
            exclude_owner,
            exclude_asset_ids: None,
            filler: None,
        }
    }

    pub fn excluding(mut self, asset_ids: &'a HashSet<String>) -> Self {
        self.exclude_asset_ids = Some(asset_ids);
        self
    }

    pub fn with_filler(mut self, filler: &'a FillerTable) -> Self {
        self.filler = Some(filler);
        self
    }

    /// Combined value of one combination: raw valuations plus QB premiums,
    /// plus the filler adjustment when configured. The multi-asset package
    /// penalty is never applied to the receiving side.
    pub fn total_value(&self, members: &[&Asset]) -> i64 {
        members.iter().fold(0i64, |total, a| {
            let filler = self.filler.map_or(0, |f| f.lookup(a.valuation));
            total
                .saturating_add(i64::from(a.valuation))
                .saturating_add(self.premium.premium_for(a))
                .saturating_add(filler)
        })
    }
}

/// A same-owner combination that fits the band.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ComboMatch<'a> {
    pub owner: &'a str,
    pub assets: Vec<&'a Asset>,
    pub total_value: i64,
}

// ---------------------------------------------------------------------------
// Search
// ---------------------------------------------------------------------------

/// Every `combo_size`-asset combination from a single roster other than
/// `exclude_owner` whose total value falls inside the band.
///
/// Owners are visited in pool order and combinations in roster order.
/// `combo_size` below 2 is rejected: single assets belong to `match_one`.
pub fn match_combinations<'a>(
    pool: &'a AssetPool,
    query: &ComboQuery<'_>,
) -> Result<Vec<ComboMatch<'a>>, ValuationError> {
    if query.combo_size < 2 {
        return Err(ValuationError::invalid(format!(
            "combination size must be at least 2, got {}",
            query.combo_size
        )));
    }

    let no_exclusions = HashSet::new();
    let excluded = query.exclude_asset_ids.unwrap_or(&no_exclusions);

    // Group eligible candidates by owner, keeping first-seen owner order.
    // Anything above the raw cap is pruned here, before enumeration.
    let mut rosters: Vec<(&'a str, Vec<&'a Asset>)> = Vec::new();
    let mut slot_of: HashMap<&'a str, usize> = HashMap::new();
    for asset in candidates(pool, query.exclude_owner, excluded) {
        if i64::from(asset.valuation) > query.raw_cap {
            continue;
        }
        let owner = asset.owning_team.as_str();
        let slot = *slot_of.entry(owner).or_insert_with(|| {
            rosters.push((owner, Vec::new()));
            rosters.len() - 1
        });
        rosters[slot].1.push(asset);
    }

    let mut matches = Vec::new();
    for &(owner, ref roster) in &rosters {
        for combo in Combinations::new(roster, query.combo_size) {
            let members: Vec<&'a Asset> = combo.into_iter().copied().collect();
            let total_value = query.total_value(&members);
            if query.band.contains(total_value) {
                matches.push(ComboMatch {
                    owner,
                    assets: members,
                    total_value,
                });
            }
        }
    }

    Ok(matches)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::league::asset::Position;

    fn asset(id: &str, pos: Position, owner: &str, value: u32) -> Asset {
        Asset::player(id, &format!("Player {id}"), pos, owner, value)
    }

    fn pool() -> AssetPool {
        AssetPool::new(vec![
            asset("a1", Position::Quarterback, "Alice", 9500),
            asset("b1", Position::RunningBack, "Bob", 3500),
            asset("b2", Position::WideReceiver, "Bob", 2500),
            asset("b3", Position::WideReceiver, "Bob", 2000),
            asset("b4", Position::TightEnd, "Bob", 2400),
            asset("c1", Position::Quarterback, "Carol", 2300),
            asset("c2", Position::RunningBack, "Carol", 2400),
            asset("c3", Position::Pick, "Carol", 400),
        ])
        .unwrap()
    }

    fn member_ids(m: &ComboMatch<'_>) -> Vec<String> {
        m.assets.iter().map(|a| a.id.clone()).collect()
    }

    #[test]
    fn combinations_enumerates_n_choose_k() {
        let items = vec![1, 2, 3, 4, 5];
        assert_eq!(Combinations::new(&items, 2).count(), 10);
        assert_eq!(Combinations::new(&items, 3).count(), 10);
        assert_eq!(Combinations::new(&items, 5).count(), 1);
        assert_eq!(Combinations::new(&items, 6).count(), 0);

        let pairs: Vec<Vec<i32>> = Combinations::new(&items[..3], 2)
            .map(|c| c.into_iter().copied().collect())
            .collect();
        assert_eq!(pairs, vec![vec![1, 2], vec![1, 3], vec![2, 3]]);
    }

    #[test]
    fn combinations_is_lazy() {
        let items: Vec<u32> = (0..60).collect();
        let mut iter = Combinations::new(&items, 3);
        assert_eq!(iter.next().map(|c| c.len()), Some(3));
        assert_eq!(iter.nth(1).map(|c| *c[2]), Some(4));
    }

    #[test]
    fn raw_cap_prunes_pairs_even_when_total_fits() {
        let pool = pool();
        let premium = QbPremium::none();
        // b1 (3500) + b3 (2000) = 5500 would fit, but b1 exceeds the cap
        let query = ComboQuery::new(ToleranceBand { low: 4000, high: 6000 }, 2, &premium, 3000, "Alice");
        let found = match_combinations(&pool, &query).unwrap();
        assert!(!found.is_empty());
        for m in &found {
            assert!(m.assets.iter().all(|a| i64::from(a.valuation) <= 3000));
            assert!(m.assets.iter().all(|a| a.id != "b1"));
        }
    }

    #[test]
    fn members_share_one_owner_and_skip_excluded_owner() {
        let pool = pool();
        let premium = QbPremium::none();
        let query = ComboQuery::new(ToleranceBand { low: 0, high: 100_000 }, 2, &premium, 10_000, "Alice");
        let found = match_combinations(&pool, &query).unwrap();
        // C(4,2) for Bob + C(3,2) for Carol
        assert_eq!(found.len(), 9);
        for m in &found {
            assert_ne!(m.owner, "Alice");
            assert!(m.assets.iter().all(|a| a.owning_team == m.owner));
        }
    }

    #[test]
    fn qb_premium_counts_per_qualifying_member() {
        let pool = pool();
        let premium = QbPremium::new(["Player c1".to_string()].into_iter().collect(), 500);
        let band = ToleranceBand::around(5200, 0);
        let query = ComboQuery::new(band, 2, &premium, 9500, "Alice");
        let found = match_combinations(&pool, &query).unwrap();
        // c1 2300 + 500 premium + c2 2400 = 5200
        assert_eq!(found.len(), 1);
        assert_eq!(member_ids(&found[0]), vec!["c1", "c2"]);
        assert_eq!(found[0].total_value, 5200);
    }

    #[test]
    fn triples_are_supported() {
        let pool = pool();
        let premium = QbPremium::none();
        // b2 + b3 + b4 = 6900
        let query = ComboQuery::new(ToleranceBand::around(6900, 0), 3, &premium, 3000, "Alice");
        let found = match_combinations(&pool, &query).unwrap();
        assert_eq!(found.len(), 1);
        assert_eq!(member_ids(&found[0]), vec!["b2", "b3", "b4"]);
    }

    #[test]
    fn excluded_ids_never_appear() {
        let pool = pool();
        let premium = QbPremium::none();
        let excluded: HashSet<String> = ["b2".to_string()].into_iter().collect();
        let query = ComboQuery::new(ToleranceBand { low: 0, high: 100_000 }, 2, &premium, 10_000, "Alice")
            .excluding(&excluded);
        let found = match_combinations(&pool, &query).unwrap();
        assert!(found.iter().all(|m| m.assets.iter().all(|a| a.id != "b2")));
        // C(3,2) for Bob + C(3,2) for Carol
        assert_eq!(found.len(), 6);
    }

    #[test]
    fn filler_penalty_applies_per_member() {
        let pool = pool();
        let premium = QbPremium::none();
        let filler = FillerTable::default();
        // c2 2400 (-250) + c3 400 (-800) = 1750
        let query = ComboQuery::new(ToleranceBand::around(1750, 0), 2, &premium, 3000, "Alice")
            .with_filler(&filler);
        let found = match_combinations(&pool, &query).unwrap();
        assert_eq!(found.len(), 1);
        assert_eq!(member_ids(&found[0]), vec!["c2", "c3"]);
    }

    #[test]
    fn combo_size_below_two_is_invalid() {
        let pool = pool();
        let premium = QbPremium::none();
        let query = ComboQuery::new(ToleranceBand { low: 0, high: 1 }, 1, &premium, 10_000, "Alice");
        assert!(matches!(
            match_combinations(&pool, &query),
            Err(ValuationError::InvalidInput { .. })
        ));
    }

    #[test]
    fn nothing_in_band_is_empty() {
        let pool = pool();
        let premium = QbPremium::none();
        let query = ComboQuery::new(ToleranceBand { low: 50_000, high: 60_000 }, 2, &premium, 10_000, "Alice");
        assert!(match_combinations(&pool, &query).unwrap().is_empty());
    }
}
