// Configuration loading and parsing (trade.toml, curves.toml).

use serde::Deserialize;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::info;

use crate::trade::suggest::MatchSettings;
use crate::valuation::curve::{FillerTable, PackageCurve, TierTable};

// ---------------------------------------------------------------------------
// Error types
// ---------------------------------------------------------------------------

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("config file not found: {path}")]
    FileNotFound { path: PathBuf },

    #[error("failed to parse config file {path}: {source}")]
    ParseError {
        path: PathBuf,
        source: toml::de::Error,
    },

    #[error("validation error for field `{field}`: {message}")]
    ValidationError { field: String, message: String },

    #[error("failed to initialize config from defaults: {message}")]
    DefaultsCopyError { message: String },
}

// ---------------------------------------------------------------------------
// Top-level assembled Config
// ---------------------------------------------------------------------------

#[derive(Debug, Clone)]
pub struct Config {
    pub matching: MatchingConfig,
    pub qb_premium: QbPremiumConfig,
    pub single_match: SingleMatchConfig,
    pub combo: ComboConfig,
    pub curves: CurvesConfig,
    pub data_paths: DataPaths,
}

impl Config {
    /// Flatten the config into the settings the suggestion pipeline consumes.
    pub fn match_settings(&self) -> MatchSettings {
        MatchSettings {
            tolerance_pct: self.matching.tolerance_pct,
            combo_sizes: self.matching.combo_sizes.clone(),
            exclude_single_matches_from_combos: self.matching.exclude_single_matches_from_combos,
            qb_premium_amount: self.qb_premium.amount,
            qb_premium_top_n: self.qb_premium.top_n,
            single_apply_premium: self.single_match.apply_premium,
            single_apply_curve_bonus_for_packages: self
                .single_match
                .apply_curve_bonus_for_packages,
            curve: self.curves.package_curve(),
            filler: self
                .combo
                .apply_filler_penalty
                .then(|| self.curves.filler.clone()),
        }
    }
}

// ---------------------------------------------------------------------------
// trade.toml structs
// ---------------------------------------------------------------------------

/// Raw deserialization target for the entire trade.toml file.
#[derive(Debug, Clone, Deserialize)]
struct TradeFile {
    matching: MatchingConfig,
    qb_premium: QbPremiumConfig,
    #[serde(default)]
    single_match: SingleMatchConfig,
    #[serde(default)]
    combo: ComboConfig,
    data: DataPaths,
}

#[derive(Debug, Clone, Deserialize)]
pub struct MatchingConfig {
    /// Width of the match window, in percent either side of the target.
    pub tolerance_pct: u32,
    pub combo_sizes: Vec<usize>,
    #[serde(default = "default_true")]
    pub exclude_single_matches_from_combos: bool,
}

#[derive(Debug, Clone, Deserialize)]
pub struct QbPremiumConfig {
    pub amount: u32,
    pub top_n: usize,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SingleMatchConfig {
    #[serde(default = "default_true")]
    pub apply_premium: bool,
    #[serde(default = "default_true")]
    pub apply_curve_bonus_for_packages: bool,
}

impl Default for SingleMatchConfig {
    fn default() -> Self {
        SingleMatchConfig {
            apply_premium: true,
            apply_curve_bonus_for_packages: true,
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ComboConfig {
    #[serde(default)]
    pub apply_filler_penalty: bool,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DataPaths {
    pub pool: String,
}

fn default_true() -> bool {
    true
}

// ---------------------------------------------------------------------------
// curves.toml structs
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Deserialize)]
pub struct CurvesConfig {
    pub penalty_per_extra_asset: i64,
    pub single: TierTable,
    pub multi: TierTable,
    #[serde(default)]
    pub filler: FillerTable,
}

impl CurvesConfig {
    pub fn package_curve(&self) -> PackageCurve {
        PackageCurve {
            single: self.single.clone(),
            multi: self.multi.clone(),
            penalty_per_extra_asset: self.penalty_per_extra_asset,
        }
    }
}

// ---------------------------------------------------------------------------
// Loading logic
// ---------------------------------------------------------------------------

/// Load and validate configuration from `config/trade.toml` and
/// `config/curves.toml`, both relative to the given `base_dir`.
///
/// This is the lower-level loading primitive that does not auto-copy defaults.
/// Prefer `load_config()` which handles default initialization automatically.
pub fn load_config_from(base_dir: &Path) -> Result<Config, ConfigError> {
    let config_dir = base_dir.join("config");

    // --- trade.toml (required) ---
    let trade_path = config_dir.join("trade.toml");
    let trade_text = read_file(&trade_path)?;
    let trade_file: TradeFile =
        toml::from_str(&trade_text).map_err(|e| ConfigError::ParseError {
            path: trade_path.clone(),
            source: e,
        })?;

    // --- curves.toml (required) ---
    let curves_path = config_dir.join("curves.toml");
    let curves_text = read_file(&curves_path)?;
    let curves: CurvesConfig =
        toml::from_str(&curves_text).map_err(|e| ConfigError::ParseError {
            path: curves_path.clone(),
            source: e,
        })?;

    let config = Config {
        matching: trade_file.matching,
        qb_premium: trade_file.qb_premium,
        single_match: trade_file.single_match,
        combo: trade_file.combo,
        curves,
        data_paths: trade_file.data,
    };

    validate(&config)?;

    Ok(config)
}

/// Copy every shipped file in `defaults/` that has no counterpart in
/// `config/`, so a league's edited files are never overwritten. `.example`
/// files are skipped. Returns the written paths, sorted.
pub fn seed_missing_config(base_dir: &Path) -> Result<Vec<PathBuf>, ConfigError> {
    let defaults_dir = base_dir.join("defaults");
    let config_dir = base_dir.join("config");

    match (defaults_dir.is_dir(), config_dir.is_dir()) {
        (true, _) => {}
        (false, true) => return Ok(Vec::new()),
        (false, false) => {
            return Err(seed_error(format!(
                "no defaults/ or config/ directory under {}",
                base_dir.display()
            )))
        }
    }

    std::fs::create_dir_all(&config_dir)
        .map_err(|e| seed_error(format!("cannot create {}: {e}", config_dir.display())))?;
    let entries = std::fs::read_dir(&defaults_dir)
        .map_err(|e| seed_error(format!("cannot list {}: {e}", defaults_dir.display())))?;

    let mut seeded = Vec::new();
    for entry in entries {
        let source = entry.map_err(|e| seed_error(e.to_string()))?.path();
        if !source.is_file() || source.extension().is_some_and(|ext| ext == "example") {
            continue;
        }
        let Some(name) = source.file_name() else {
            continue;
        };
        let target = config_dir.join(name);
        if copy_if_absent(&source, &target)? {
            seeded.push(target);
        }
    }
    seeded.sort();
    Ok(seeded)
}

/// Create `target` from `source` unless it already exists.
fn copy_if_absent(source: &Path, target: &Path) -> Result<bool, ConfigError> {
    let mut dest = match std::fs::OpenOptions::new()
        .write(true)
        .create_new(true)
        .open(target)
    {
        Ok(file) => file,
        Err(e) if e.kind() == std::io::ErrorKind::AlreadyExists => return Ok(false),
        Err(e) => return Err(seed_error(format!("cannot create {}: {e}", target.display()))),
    };
    let mut src = std::fs::File::open(source)
        .map_err(|e| seed_error(format!("cannot read {}: {e}", source.display())))?;
    std::io::copy(&mut src, &mut dest)
        .map_err(|e| seed_error(format!("cannot write {}: {e}", target.display())))?;
    Ok(true)
}

/// Convenience wrapper: loads config relative to the current working directory.
/// Ensures default config files are copied before loading.
pub fn load_config() -> Result<Config, ConfigError> {
    let cwd = std::env::current_dir().map_err(|_| ConfigError::FileNotFound {
        path: PathBuf::from("."),
    })?;
    for path in seed_missing_config(&cwd)? {
        info!("Seeded {} from defaults", path.display());
    }
    load_config_from(&cwd)
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn read_file(path: &Path) -> Result<String, ConfigError> {
    std::fs::read_to_string(path).map_err(|_| ConfigError::FileNotFound {
        path: path.to_path_buf(),
    })
}

fn seed_error(message: impl Into<String>) -> ConfigError {
    ConfigError::DefaultsCopyError {
        message: message.into(),
    }
}

fn invalid(field: &str, message: impl Into<String>) -> ConfigError {
    ConfigError::ValidationError {
        field: field.to_string(),
        message: message.into(),
    }
}

// ---------------------------------------------------------------------------
// Validation
// ---------------------------------------------------------------------------

/// Largest bonus, adjustment or penalty magnitude accepted from curves.toml.
/// Keeps every package and combination total far from `i64` overflow.
pub const MAX_CURVE_MAGNITUDE: i64 = 1_000_000;

fn validate(config: &Config) -> Result<(), ConfigError> {
    // Matching validations
    let tol = config.matching.tolerance_pct;
    if tol > 100 {
        return Err(invalid(
            "matching.tolerance_pct",
            format!("must be between 0 and 100 inclusive, got {tol}"),
        ));
    }

    if config.matching.combo_sizes.is_empty() {
        return Err(invalid("matching.combo_sizes", "must list at least one size"));
    }
    for &size in &config.matching.combo_sizes {
        if !(2..=3).contains(&size) {
            return Err(invalid(
                "matching.combo_sizes",
                format!("sizes must be 2 or 3, got {size}"),
            ));
        }
    }

    // Curve validations
    let curves = &config.curves;
    let tables: &[(&str, &TierTable)] = &[("curves.single", &curves.single), ("curves.multi", &curves.multi)];
    for (name, table) in tables {
        if table.is_empty() {
            return Err(invalid(name, "must define at least one tier"));
        }
        if let Some(threshold) = table.duplicate_threshold() {
            return Err(invalid(name, format!("threshold {threshold} appears more than once")));
        }
        if !table.is_non_decreasing() {
            return Err(invalid(
                name,
                "bonus must not shrink as the threshold grows, and must not go below 0",
            ));
        }
        let oversized = table
            .tiers()
            .iter()
            .find(|t| t.bonus.checked_abs().map_or(true, |b| b > MAX_CURVE_MAGNITUDE));
        if let Some(tier) = oversized {
            return Err(invalid(
                name,
                format!(
                    "bonus {} at threshold {} exceeds {MAX_CURVE_MAGNITUDE}",
                    tier.bonus, tier.threshold
                ),
            ));
        }
    }

    if let Some(tier) = curves
        .filler
        .tiers()
        .iter()
        .find(|t| t.adjustment.checked_abs().map_or(true, |a| a > MAX_CURVE_MAGNITUDE))
    {
        return Err(invalid(
            "curves.filler",
            format!(
                "adjustment {} at ceiling {} exceeds {MAX_CURVE_MAGNITUDE} in magnitude",
                tier.adjustment, tier.ceiling
            ),
        ));
    }

    let penalty = curves.penalty_per_extra_asset;
    if penalty <= 0 || penalty > MAX_CURVE_MAGNITUDE {
        return Err(invalid(
            "curves.penalty_per_extra_asset",
            format!("must be between 1 and {MAX_CURVE_MAGNITUDE}, got {penalty}"),
        ));
    }

    Ok(())
}

// ---------------------------------------------------------------------------
// Unit tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use std::path::PathBuf;

    fn shipped_defaults() -> PathBuf {
        PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("defaults")
    }

    /// Scratch dir with config/ populated from the shipped defaults.
    fn scratch_with_defaults(name: &str) -> PathBuf {
        let tmp = std::env::temp_dir().join(name);
        let config_dir = tmp.join("config");
        let _ = fs::remove_dir_all(&tmp);
        fs::create_dir_all(&config_dir).unwrap();

        for file in ["trade.toml", "curves.toml"] {
            fs::copy(shipped_defaults().join(file), config_dir.join(file)).unwrap();
        }
        tmp
    }

    fn rewrite(tmp: &Path, file: &str, from: &str, to: &str) {
        let path = tmp.join("config").join(file);
        let text = fs::read_to_string(&path).unwrap();
        assert!(text.contains(from), "{file} should contain {from:?}");
        fs::write(&path, text.replace(from, to)).unwrap();
    }

    fn expect_validation_field(tmp: &Path, expected: &str) {
        let err = load_config_from(tmp).unwrap_err();
        match &err {
            ConfigError::ValidationError { field, .. } => {
                assert_eq!(field, expected);
            }
            other => panic!("expected ValidationError, got: {other}"),
        }
    }

    #[test]
    fn load_valid_config_from_defaults() {
        let tmp = scratch_with_defaults("config_test_valid_defaults");
        let config = load_config_from(&tmp).expect("should load valid config");

        assert_eq!(config.matching.tolerance_pct, 5);
        assert_eq!(config.matching.combo_sizes, vec![2]);
        assert!(config.matching.exclude_single_matches_from_combos);
        assert_eq!(config.qb_premium.amount, 300);
        assert_eq!(config.qb_premium.top_n, 30);
        assert!(config.single_match.apply_premium);
        assert!(!config.combo.apply_filler_penalty);
        assert_eq!(config.data_paths.pool, "data/league_pool.json");

        // Shipped curves reproduce the reference tables
        assert_eq!(config.curves.package_curve(), PackageCurve::default());
        assert_eq!(config.curves.filler, FillerTable::default());

        let _ = fs::remove_dir_all(&tmp);
    }

    #[test]
    fn match_settings_from_defaults_equal_builtin_defaults() {
        let tmp = scratch_with_defaults("config_test_match_settings");
        let config = load_config_from(&tmp).unwrap();
        assert_eq!(config.match_settings(), MatchSettings::default());
        let _ = fs::remove_dir_all(&tmp);
    }

    #[test]
    fn filler_enabled_flows_into_settings() {
        let tmp = scratch_with_defaults("config_test_filler_enabled");
        rewrite(&tmp, "trade.toml", "apply_filler_penalty = false", "apply_filler_penalty = true");
        let settings = load_config_from(&tmp).unwrap().match_settings();
        assert_eq!(settings.filler, Some(FillerTable::default()));
        let _ = fs::remove_dir_all(&tmp);
    }

    #[test]
    fn rejects_tolerance_above_100() {
        let tmp = scratch_with_defaults("config_test_tolerance_high");
        rewrite(&tmp, "trade.toml", "tolerance_pct = 5", "tolerance_pct = 101");
        expect_validation_field(&tmp, "matching.tolerance_pct");
        let _ = fs::remove_dir_all(&tmp);
    }

    #[test]
    fn rejects_combo_size_four() {
        let tmp = scratch_with_defaults("config_test_combo_four");
        rewrite(&tmp, "trade.toml", "combo_sizes = [2]", "combo_sizes = [2, 4]");
        expect_validation_field(&tmp, "matching.combo_sizes");
        let _ = fs::remove_dir_all(&tmp);
    }

    #[test]
    fn rejects_empty_combo_sizes() {
        let tmp = scratch_with_defaults("config_test_combo_empty");
        rewrite(&tmp, "trade.toml", "combo_sizes = [2]", "combo_sizes = []");
        expect_validation_field(&tmp, "matching.combo_sizes");
        let _ = fs::remove_dir_all(&tmp);
    }

    #[test]
    fn rejects_zero_penalty() {
        let tmp = scratch_with_defaults("config_test_zero_penalty");
        rewrite(&tmp, "curves.toml", "penalty_per_extra_asset = 400", "penalty_per_extra_asset = 0");
        expect_validation_field(&tmp, "curves.penalty_per_extra_asset");
        let _ = fs::remove_dir_all(&tmp);
    }

    #[test]
    fn rejects_non_monotonic_single_table() {
        let tmp = scratch_with_defaults("config_test_non_monotonic");
        // 9000 tier drops below the 8500 tier
        rewrite(&tmp, "curves.toml", "threshold = 9000\nbonus = 3700", "threshold = 9000\nbonus = 100");
        expect_validation_field(&tmp, "curves.single");
        let _ = fs::remove_dir_all(&tmp);
    }

    #[test]
    fn rejects_duplicate_multi_threshold() {
        let tmp = scratch_with_defaults("config_test_duplicate_threshold");
        rewrite(&tmp, "curves.toml", "threshold = 8000\nbonus = 2700", "threshold = 9000\nbonus = 2700");
        expect_validation_field(&tmp, "curves.multi");
        let _ = fs::remove_dir_all(&tmp);
    }

    #[test]
    fn file_not_found_for_missing_curves_toml() {
        let tmp = scratch_with_defaults("config_test_missing_curves");
        fs::remove_file(tmp.join("config/curves.toml")).unwrap();

        let err = load_config_from(&tmp).unwrap_err();
        match &err {
            ConfigError::FileNotFound { path } => {
                assert!(path.ends_with("curves.toml"));
            }
            other => panic!("expected FileNotFound, got: {other}"),
        }

        let _ = fs::remove_dir_all(&tmp);
    }

    #[test]
    fn parse_error_for_invalid_toml() {
        let tmp = scratch_with_defaults("config_test_invalid_toml");
        fs::write(tmp.join("config/trade.toml"), "this is not valid [[[ toml").unwrap();

        let err = load_config_from(&tmp).unwrap_err();
        match &err {
            ConfigError::ParseError { path, .. } => {
                assert!(path.ends_with("trade.toml"));
            }
            other => panic!("expected ParseError, got: {other}"),
        }

        let _ = fs::remove_dir_all(&tmp);
    }

    #[test]
    fn rejects_oversized_penalty() {
        let tmp = scratch_with_defaults("config_test_oversized_penalty");
        rewrite(
            &tmp,
            "curves.toml",
            "penalty_per_extra_asset = 400",
            "penalty_per_extra_asset = 9223372036854775807",
        );
        expect_validation_field(&tmp, "curves.penalty_per_extra_asset");

        rewrite(
            &tmp,
            "curves.toml",
            "penalty_per_extra_asset = 9223372036854775807",
            "penalty_per_extra_asset = 1000001",
        );
        expect_validation_field(&tmp, "curves.penalty_per_extra_asset");
        let _ = fs::remove_dir_all(&tmp);
    }

    #[test]
    fn largest_allowed_penalty_still_evaluates_packages() {
        let tmp = scratch_with_defaults("config_test_max_penalty");
        rewrite(
            &tmp,
            "curves.toml",
            "penalty_per_extra_asset = 400",
            "penalty_per_extra_asset = 1000000",
        );
        let curve = load_config_from(&tmp).unwrap().match_settings().curve;
        // total 3000 -> base 600, two extra assets
        assert_eq!(curve.bonus(&[1000, 1000, 1000]), Ok(600 - 2_000_000));
        let _ = fs::remove_dir_all(&tmp);
    }

    #[test]
    fn rejects_oversized_tier_bonus() {
        let tmp = scratch_with_defaults("config_test_oversized_bonus");
        // still non-decreasing, only too large
        rewrite(&tmp, "curves.toml", "threshold = 9000\nbonus = 3700", "threshold = 9000\nbonus = 2000000");
        expect_validation_field(&tmp, "curves.single");
        let _ = fs::remove_dir_all(&tmp);
    }

    #[test]
    fn rejects_oversized_filler_adjustment() {
        let tmp = scratch_with_defaults("config_test_oversized_filler");
        rewrite(&tmp, "curves.toml", "adjustment = -800", "adjustment = -5000000");
        expect_validation_field(&tmp, "curves.filler");
        let _ = fs::remove_dir_all(&tmp);
    }

    #[test]
    fn seeding_fills_gaps_and_keeps_league_edits() {
        let tmp = std::env::temp_dir().join("config_test_seeding");
        let _ = fs::remove_dir_all(&tmp);
        let defaults_dir = tmp.join("defaults");
        fs::create_dir_all(&defaults_dir).unwrap();
        fs::create_dir_all(tmp.join("config")).unwrap();
        for file in ["trade.toml", "curves.toml"] {
            fs::copy(shipped_defaults().join(file), defaults_dir.join(file)).unwrap();
        }
        fs::write(defaults_dir.join("keys.toml.example"), "# template only\n").unwrap();

        // The league already widened its tolerance
        let edited = fs::read_to_string(defaults_dir.join("trade.toml"))
            .unwrap()
            .replace("tolerance_pct = 5", "tolerance_pct = 10");
        fs::write(tmp.join("config/trade.toml"), &edited).unwrap();

        let seeded = seed_missing_config(&tmp).unwrap();
        assert_eq!(seeded, vec![tmp.join("config/curves.toml")]);
        assert!(!tmp.join("config/keys.toml.example").exists());

        let config = load_config_from(&tmp).unwrap();
        assert_eq!(config.matching.tolerance_pct, 10);

        // A second run has nothing left to do
        assert!(seed_missing_config(&tmp).unwrap().is_empty());

        let _ = fs::remove_dir_all(&tmp);
    }

    #[test]
    fn seeding_without_defaults_or_config_fails() {
        let tmp = std::env::temp_dir().join("config_test_seeding_nothing");
        let _ = fs::remove_dir_all(&tmp);
        fs::create_dir_all(&tmp).unwrap();

        let err = seed_missing_config(&tmp).unwrap_err();
        assert!(matches!(err, ConfigError::DefaultsCopyError { .. }), "got: {err}");

        let _ = fs::remove_dir_all(&tmp);
    }
}
