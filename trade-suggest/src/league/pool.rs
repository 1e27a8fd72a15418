// League-wide asset pool and candidate filtering.
//
// The pool is rebuilt from the roster provider on every request and is never
// mutated by the valuation or matching code.

use std::collections::{HashMap, HashSet};

use crate::league::asset::Asset;
use crate::valuation::ValuationError;

// ---------------------------------------------------------------------------
// AssetPool
// ---------------------------------------------------------------------------

/// An ordered, id-indexed collection of every asset in one league.
#[derive(Debug, Clone, Default)]
pub struct AssetPool {
    assets: Vec<Asset>,
    index: HashMap<String, usize>,
}

impl AssetPool {
    /// Build a pool, rejecting duplicate asset ids.
    ///
    /// Insertion order is preserved; it drives owner ordering and tie-breaking
    /// in the premium set.
    pub fn new(assets: Vec<Asset>) -> Result<Self, ValuationError> {
        let mut index = HashMap::with_capacity(assets.len());
        for (i, asset) in assets.iter().enumerate() {
            if index.insert(asset.id.clone(), i).is_some() {
                return Err(ValuationError::DuplicateAsset {
                    id: asset.id.clone(),
                });
            }
        }
        Ok(AssetPool { assets, index })
    }

    pub fn len(&self) -> usize {
        self.assets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.assets.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Asset> {
        self.assets.iter()
    }

    pub fn assets(&self) -> &[Asset] {
        &self.assets
    }

    /// Look up an asset by id.
    pub fn get(&self, id: &str) -> Option<&Asset> {
        self.index.get(id).map(|&i| &self.assets[i])
    }

    /// Look up an asset by id, failing with `UnknownAsset` if absent.
    pub fn require(&self, id: &str) -> Result<&Asset, ValuationError> {
        self.get(id).ok_or_else(|| ValuationError::UnknownAsset { id: id.to_string() })
    }

    /// Find an asset by display name (case-insensitive, exact match).
    /// Returns the first match in pool order.
    pub fn find_by_name(&self, name: &str) -> Option<&Asset> {
        let needle = name.trim().to_lowercase();
        self.assets
            .iter()
            .find(|a| a.display_name.to_lowercase() == needle)
    }

    /// Distinct owners in first-seen pool order.
    pub fn owners(&self) -> Vec<&str> {
        let mut seen = HashSet::new();
        self.assets
            .iter()
            .filter(|a| seen.insert(a.owning_team.as_str()))
            .map(|a| a.owning_team.as_str())
            .collect()
    }

    /// All assets held by one owner, in pool order.
    pub fn roster_of<'a>(&'a self, owner: &'a str) -> impl Iterator<Item = &'a Asset> + 'a {
        self.assets.iter().filter(move |a| a.owning_team == owner)
    }
}

// ---------------------------------------------------------------------------
// Candidate filter
// ---------------------------------------------------------------------------

/// Every asset not held by `exclude_owner` and not listed in
/// `exclude_asset_ids`, in pool order.
pub fn candidates<'p, 'q>(
    pool: &'p AssetPool,
    exclude_owner: &'q str,
    exclude_asset_ids: &'q HashSet<String>,
) -> impl Iterator<Item = &'p Asset> + 'q
where
    'p: 'q,
{
    pool.iter()
        .filter(move |a| a.owning_team != exclude_owner && !exclude_asset_ids.contains(&a.id))
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
