// Package value calculation.
//
// Folds raw valuations, QB premiums and the package bonus curve into a single
// adjusted number for one side of a proposed trade.

use std::collections::HashSet;

use serde::Serialize;

use crate::league::asset::Asset;
use crate::league::pool::AssetPool;
use crate::valuation::curve::PackageCurve;
use crate::valuation::premium::QbPremium;
use crate::valuation::ValuationError;

/// Value breakdown of one package of assets.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PackageValue {
    /// The single owner every asset in the package belongs to.
    pub owner: String,
    pub asset_count: usize,
    pub raw_total: i64,
    pub premium_total: i64,
    pub curve_bonus: i64,
    /// `raw_total + premium_total + curve_bonus`.
    pub adjusted_total: i64,
}

/// Resolve a set of asset ids against the pool.
///
/// Fails on an empty set, a repeated id, an id the pool does not know, or
/// assets belonging to more than one owner. On success every returned asset
/// shares `owning_team`.
pub fn resolve_package<'a, S: AsRef<str>>(
    pool: &'a AssetPool,
    asset_ids: &[S],
) -> Result<Vec<&'a Asset>, ValuationError> {
    if asset_ids.is_empty() {
        return Err(ValuationError::invalid("package must contain at least one asset"));
    }

    let mut seen = HashSet::with_capacity(asset_ids.len());
    let mut assets = Vec::with_capacity(asset_ids.len());
    for id in asset_ids {
        let id = id.as_ref();
        if !seen.insert(id) {
            return Err(ValuationError::invalid(format!(
                "asset id {id} listed more than once"
            )));
        }
        assets.push(pool.require(id)?);
    }

    let mut owners: Vec<String> = Vec::new();
    for asset in &assets {
        if !owners.contains(&asset.owning_team) {
            owners.push(asset.owning_team.clone());
        }
    }
    if owners.len() > 1 {
        return Err(ValuationError::InconsistentOwner { owners });
    }

    Ok(assets)
}

/// Evaluate a package of assets that all belong to one owner.
///
/// Premium and curve bonus always count toward `adjusted_total` for the side
/// being evaluated.
pub fn evaluate<S: AsRef<str>>(
    pool: &AssetPool,
    asset_ids: &[S],
    premium: &QbPremium,
    curve: &PackageCurve,
) -> Result<PackageValue, ValuationError> {
    let assets = resolve_package(pool, asset_ids)?;
    evaluate_assets(&assets, premium, curve)
}

/// Evaluate already-resolved assets. The caller guarantees a non-empty,
/// single-owner set (see `resolve_package`); emptiness is still checked.
pub fn evaluate_assets(
    assets: &[&Asset],
    premium: &QbPremium,
    curve: &PackageCurve,
) -> Result<PackageValue, ValuationError> {
    let values: Vec<u32> = assets.iter().map(|a| a.valuation).collect();
    let curve_bonus = curve.bonus(&values)?;

    let raw_total: i64 = values.iter().map(|&v| i64::from(v)).sum();
    let premium_total: i64 = assets.iter().map(|a| premium.premium_for(a)).sum();

    Ok(PackageValue {
        owner: assets[0].owning_team.clone(),
        asset_count: assets.len(),
        raw_total,
        premium_total,
        curve_bonus,
        adjusted_total: raw_total.saturating_add(premium_total).saturating_add(curve_bonus),
    })
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
