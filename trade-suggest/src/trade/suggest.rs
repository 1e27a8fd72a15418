// Trade suggestion pipeline.
//
// Given the league pool and the assets a user wants to move, value the
// outgoing package and search the rest of the league for 1-for-1 and N-for-1
// offers of comparable value.

use std::cmp::Ordering;
use std::collections::HashSet;

use tracing::{debug, info};

use crate::league::asset::Asset;
use crate::league::pool::AssetPool;
use crate::trade::band::ToleranceBand;
use crate::trade::combo::{match_combinations, ComboMatch, ComboQuery};
use crate::trade::single::{match_one, CandidateValuer, SingleMatch};
use crate::valuation::curve::{FillerTable, PackageCurve};
use crate::valuation::package::{evaluate_assets, resolve_package, PackageValue};
use crate::valuation::premium::QbPremium;
use crate::valuation::ValuationError;

// ---------------------------------------------------------------------------
// Settings and request
// ---------------------------------------------------------------------------

/// League-tunable knobs for one suggestion run. Built from config; the
/// defaults mirror the shipped `defaults/*.toml`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MatchSettings {
    pub tolerance_pct: u32,
    /// Combination sizes to search, e.g. `[2]` or `[2, 3]`.
    pub combo_sizes: Vec<usize>,
    /// Drop assets already offered 1-for-1 from the combination search.
    pub exclude_single_matches_from_combos: bool,
    pub qb_premium_amount: u32,
    /// How many of the pool's top QBs qualify for the premium.
    pub qb_premium_top_n: usize,
    /// Value 1-for-1 candidates with their own QB premium.
    pub single_apply_premium: bool,
    /// For multi-asset outgoing packages, value 1-for-1 candidates with
    /// their own single-asset curve bonus.
    pub single_apply_curve_bonus_for_packages: bool,
    pub curve: PackageCurve,
    /// Per-member filler adjustment for combinations; `None` disables it.
    pub filler: Option<FillerTable>,
}

impl Default for MatchSettings {
    fn default() -> Self {
        MatchSettings {
            tolerance_pct: 5,
            combo_sizes: vec![2],
            exclude_single_matches_from_combos: true,
            qb_premium_amount: 300,
            qb_premium_top_n: 30,
            single_apply_premium: true,
            single_apply_curve_bonus_for_packages: true,
            curve: PackageCurve::default(),
            filler: None,
        }
    }
}

/// What the user wants to trade away.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TradeRequest {
    /// Ids of the outgoing assets; all must belong to one owner.
    pub outgoing: Vec<String>,
    /// Keep only combinations with a member whose name contains this text
    /// (case-insensitive).
    pub name_filter: Option<String>,
}

impl TradeRequest {
    pub fn new<S: Into<String>>(outgoing: impl IntoIterator<Item = S>) -> Self {
        TradeRequest {
            outgoing: outgoing.into_iter().map(Into::into).collect(),
            name_filter: None,
        }
    }

    pub fn with_name_filter(mut self, filter: impl Into<String>) -> Self {
        let filter = filter.into();
        self.name_filter = if filter.trim().is_empty() {
            None
        } else {
            Some(filter)
        };
        self
    }
}

// ---------------------------------------------------------------------------
// Results
// ---------------------------------------------------------------------------

/// All combinations of one size that fit the band.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ComboGroup<'a> {
    pub combo_size: usize,
    pub matches: Vec<ComboMatch<'a>>,
}

/// Everything a caller needs to present a trade request's results.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TradeSuggestions<'a> {
    pub outgoing: Vec<&'a Asset>,
    pub package: PackageValue,
    /// Value the 1-for-1 search was centered on.
    pub single_target: i64,
    pub single_band: ToleranceBand,
    /// Sorted by matched value, highest first.
    pub singles: Vec<SingleMatch<'a>>,
    pub combo_band: ToleranceBand,
    /// One group per configured size, each sorted by total, highest first.
    pub combos: Vec<ComboGroup<'a>>,
}

// ---------------------------------------------------------------------------
// Pipeline
// ---------------------------------------------------------------------------

/// Run a full suggestion request against the pool.
///
/// 1. Build the QB premium set from the pool.
/// 2. Value the outgoing package (premium and curve bonus included).
/// 3. 1-for-1: target is raw + premium for a lone asset (its stud bonus only
///    counts against multi-asset offers), or the adjusted total for a
///    package.
/// 4. N-for-1: band around the adjusted total, raw cap = outgoing raw total.
pub fn suggest_trades<'a>(
    pool: &'a AssetPool,
    request: &TradeRequest,
    settings: &MatchSettings,
) -> Result<TradeSuggestions<'a>, ValuationError> {
    let outgoing = resolve_package(pool, &request.outgoing)?;
    let premium = QbPremium::from_pool(pool, settings.qb_premium_top_n, settings.qb_premium_amount);
    let package = evaluate_assets(&outgoing, &premium, &settings.curve)?;
    let owner = package.owner.as_str();

    info!(
        "Evaluating {} outgoing asset(s) from {}: raw={}, premium={}, bonus={}, adjusted={}",
        package.asset_count,
        owner,
        package.raw_total,
        package.premium_total,
        package.curve_bonus,
        package.adjusted_total
    );

    // --- 1-for-1 ---
    let is_package = outgoing.len() > 1;
    let single_target = if is_package {
        package.adjusted_total
    } else {
        package.raw_total + package.premium_total
    };
    let mut valuer = CandidateValuer::raw();
    if settings.single_apply_premium {
        valuer = valuer.with_premium(&premium);
    }
    if is_package && settings.single_apply_curve_bonus_for_packages {
        valuer = valuer.with_curve_bonus(&settings.curve);
    }
    let single_band = ToleranceBand::around(single_target, settings.tolerance_pct);
    let mut singles = match_one(pool, single_target, settings.tolerance_pct, owner, &valuer);
    singles.sort_by(|a, b| {
        b.value
            .cmp(&a.value)
            .then_with(|| a.asset.display_name.cmp(&b.asset.display_name))
    });
    debug!(
        "1-for-1 band [{}, {}] -> {} match(es)",
        single_band.low,
        single_band.high,
        singles.len()
    );

    // --- N-for-1 ---
    let single_ids: HashSet<String> = if settings.exclude_single_matches_from_combos {
        singles.iter().map(|m| m.asset.id.clone()).collect()
    } else {
        HashSet::new()
    };
    let combo_band = ToleranceBand::around(package.adjusted_total, settings.tolerance_pct);
    let name_filter = request
        .name_filter
        .as_deref()
        .map(|f| f.trim().to_lowercase())
        .filter(|f| !f.is_empty());

    let mut combos = Vec::with_capacity(settings.combo_sizes.len());
    for &combo_size in &settings.combo_sizes {
        let mut query = ComboQuery::new(combo_band, combo_size, &premium, package.raw_total, owner)
            .excluding(&single_ids);
        if let Some(filler) = &settings.filler {
            query = query.with_filler(filler);
        }
        let mut matches = match_combinations(pool, &query)?;
        if let Some(needle) = &name_filter {
            matches.retain(|m| {
                m.assets
                    .iter()
                    .any(|a| a.display_name.to_lowercase().contains(needle.as_str()))
            });
        }
        matches.sort_by(compare_combos);
        debug!(
            "{}-for-1 band [{}, {}] -> {} match(es)",
            combo_size,
            combo_band.low,
            combo_band.high,
            matches.len()
        );
        combos.push(ComboGroup {
            combo_size,
            matches,
        });
    }

    info!(
        "Found {} 1-for-1 and {} multi-asset suggestion(s)",
        singles.len(),
        combos.iter().map(|g| g.matches.len()).sum::<usize>()
    );

    Ok(TradeSuggestions {
        outgoing,
        package,
        single_target,
        single_band,
        singles,
        combo_band,
        combos,
    })
}

/// Highest total first, then owner, then member names.
fn compare_combos(a: &ComboMatch<'_>, b: &ComboMatch<'_>) -> Ordering {
    b.total_value
        .cmp(&a.total_value)
        .then_with(|| a.owner.cmp(b.owner))
        .then_with(|| {
            let names_a = a.assets.iter().map(|x| x.display_name.as_str());
            let names_b = b.assets.iter().map(|x| x.display_name.as_str());
            names_a.cmp(names_b)
        })
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
