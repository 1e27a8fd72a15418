// Asset pool ingestion.
//
// Reads a JSON array of roster rows (one per rostered player or pick, already
// joined with market valuations) and resolves every loosely-typed field once,
// so the valuation engine only ever sees validated `Asset`s.

use std::collections::HashSet;
use std::io::Read;
use std::path::Path;

use serde::Deserialize;
use tracing::{info, warn};

use crate::league::asset::{Asset, AssetKind, Position};
use crate::league::pool::AssetPool;

// ---------------------------------------------------------------------------
// Error type
// ---------------------------------------------------------------------------

#[derive(Debug, thiserror::Error)]
pub enum IngestError {
    #[error("failed to read file {path}: {source}")]
    Io {
        path: String,
        source: std::io::Error,
    },

    #[error("JSON error in {path}: {source}")]
    Json {
        path: String,
        source: serde_json::Error,
    },

    #[error("validation error: {0}")]
    Validation(String),
}

// ---------------------------------------------------------------------------
// Raw JSON row (private)
// ---------------------------------------------------------------------------

/// One roster row as exported by the roster/valuation join. Field aliases
/// cover the common export spellings; unknown fields are ignored.
#[derive(Debug, Deserialize)]
struct RawAssetRow {
    #[serde(alias = "player_id")]
    id: RawId,
    #[serde(alias = "display_name", alias = "full_name")]
    name: String,
    #[serde(default)]
    position: Option<String>,
    #[serde(default)]
    team: Option<String>,
    #[serde(alias = "owning_team", alias = "team_owner")]
    owner: String,
    /// Fractional and missing values both occur in exports.
    #[serde(default, alias = "ktc_value")]
    valuation: Option<f64>,
    #[serde(default)]
    kind: Option<String>,
}

/// Roster providers export ids as strings or bare integers.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum RawId {
    Text(String),
    Number(serde_json::Number),
}

impl RawId {
    fn into_string(self) -> String {
        match self {
            RawId::Text(s) => s.trim().to_string(),
            RawId::Number(n) => n.to_string(),
        }
    }
}

// ---------------------------------------------------------------------------
// Row normalization
// ---------------------------------------------------------------------------

fn parse_kind(raw: Option<&str>, position: Position, name: &str) -> AssetKind {
    match raw.map(|k| k.trim().to_lowercase()) {
        Some(k) if k == "player" => AssetKind::Player,
        Some(k) if k == "pick" => AssetKind::Pick,
        Some(other) => {
            warn!("unknown kind '{}' for '{}', deriving from position", other, name);
            kind_from_position(position)
        }
        None => kind_from_position(position),
    }
}

fn kind_from_position(position: Position) -> AssetKind {
    if position == Position::Pick {
        AssetKind::Pick
    } else {
        AssetKind::Player
    }
}

fn parse_valuation(raw: Option<f64>, name: &str) -> u32 {
    match raw {
        None => 0,
        Some(v) if !v.is_finite() || v < 0.0 => {
            warn!("invalid valuation {} for '{}', treating as 0", v, name);
            0
        }
        Some(v) => v.round().min(f64::from(u32::MAX)) as u32,
    }
}

fn normalize_row(raw: RawAssetRow) -> Option<Asset> {
    let id = raw.id.into_string();
    let name = raw.name.trim().to_string();
    let owner = raw.owner.trim().to_string();

    if id.is_empty() {
        warn!("skipping row '{}': blank id", name);
        return None;
    }
    if owner.is_empty() {
        warn!("skipping '{}' ({}): blank owner", name, id);
        return None;
    }

    let position = Position::from_str_pos(raw.position.as_deref().unwrap_or(""));
    let kind = parse_kind(raw.kind.as_deref(), position, &name);
    let valuation = parse_valuation(raw.valuation, &name);
    let display_name = if name.is_empty() { id.clone() } else { name };

    Some(Asset {
        id,
        display_name,
        position,
        kind,
        nfl_team: raw.team.unwrap_or_default().trim().to_string(),
        owning_team: owner,
        valuation,
    })
}

// ---------------------------------------------------------------------------
// Reader-based loader (private, enables testing without temp files)
// ---------------------------------------------------------------------------

fn load_assets_from_reader<R: Read>(rdr: R) -> Result<Vec<Asset>, serde_json::Error> {
    let rows: Vec<serde_json::Value> = serde_json::from_reader(rdr)?;
    let mut assets = Vec::with_capacity(rows.len());
    let mut seen: HashSet<String> = HashSet::new();

    for value in rows {
        match serde_json::from_value::<RawAssetRow>(value) {
            Ok(raw) => {
                let Some(asset) = normalize_row(raw) else {
                    continue;
                };
                if !seen.insert(asset.id.clone()) {
                    warn!("duplicate asset id '{}', keeping first row", asset.id);
                    continue;
                }
                assets.push(asset);
            }
            Err(e) => {
                warn!("skipping malformed asset row: {}", e);
            }
        }
    }
    Ok(assets)
}

// ---------------------------------------------------------------------------
// Public path-based loader
// ---------------------------------------------------------------------------

/// Load the league asset pool from a JSON file.
pub fn load_pool(path: &Path) -> Result<AssetPool, IngestError> {
    let file = std::fs::File::open(path).map_err(|e| IngestError::Io {
        path: path.display().to_string(),
        source: e,
    })?;
    let assets = load_assets_from_reader(std::io::BufReader::new(file)).map_err(|e| {
        IngestError::Json {
            path: path.display().to_string(),
            source: e,
        }
    })?;

    if assets.is_empty() {
        return Err(IngestError::Validation(format!(
            "{} produced zero valid asset rows",
            path.display()
        )));
    }

    let pool = AssetPool::new(assets).map_err(|e| IngestError::Validation(e.to_string()))?;
    info!(
        "Loaded {} assets across {} owners from {}",
        pool.len(),
        pool.owners().len(),
        path.display()
    );
    Ok(pool)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
