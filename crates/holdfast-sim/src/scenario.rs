//! Scenario definitions: cover layouts, squads and the opening threat.
//!
//! Built-in scenarios are constructed in code; custom ones are JSON documents
//! deserialized into the same `ScenarioConfig`, with every field optional.

use std::f64::consts::{FRAC_PI_2, PI};
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::info;

use holdfast_core::constants::{RANK_WEIGHT_DISTANCE, RANK_WEIGHT_EFFECTIVENESS, UNIT_MAX_HEALTH};
use holdfast_core::enums::{CoverQuality, ScenarioId, UnitRole};
use holdfast_core::error::CoverError;
use holdfast_core::types::{CoverPointId, Position};
use holdfast_cover::{CoverPointDef, RankingWeights};

/// Failure to load or apply a scenario.
#[derive(Debug, Error)]
pub enum ScenarioError {
    #[error("cannot read scenario {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("malformed scenario: {0}")]
    Json(#[from] serde_json::Error),
    #[error("invalid cover layout: {0}")]
    Cover(#[from] CoverError),
    #[error("invalid scenario: {0}")]
    Invalid(String),
}

/// Complete description of a mission.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ScenarioConfig {
    pub name: String,
    pub cover_points: Vec<CoverPointDef>,
    pub squads: Vec<SquadDef>,
    /// Threat placed when the mission starts, if any.
    pub threat: Option<Position>,
    pub ranking: RankingConfig,
}

/// Empty battlefield. Fields missing from a scenario file fall back to this.
impl Default for ScenarioConfig {
    fn default() -> Self {
        Self {
            name: "Custom".into(),
            cover_points: Vec::new(),
            squads: Vec::new(),
            threat: None,
            ranking: RankingConfig::default(),
        }
    }
}

/// A squad and where it deploys.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SquadDef {
    pub squad: u32,
    pub origin: Position,
    pub members: Vec<UnitDef>,
}

/// One unit of a squad.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UnitDef {
    pub name: String,
    #[serde(default)]
    pub role: UnitRole,
    #[serde(default)]
    pub squad_leader: bool,
    #[serde(default)]
    pub specialist: bool,
    #[serde(default)]
    pub experience: u32,
    #[serde(default = "default_health")]
    pub health: f64,
}

fn default_health() -> f64 {
    UNIT_MAX_HEALTH
}

/// Candidate-ranking weights as authored.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(default)]
pub struct RankingConfig {
    pub effectiveness: f64,
    pub distance: f64,
}

impl Default for RankingConfig {
    fn default() -> Self {
        Self {
            effectiveness: RANK_WEIGHT_EFFECTIVENESS,
            distance: RANK_WEIGHT_DISTANCE,
        }
    }
}

impl From<RankingConfig> for RankingWeights {
    fn from(cfg: RankingConfig) -> Self {
        RankingWeights {
            effectiveness: cfg.effectiveness,
            distance: cfg.distance,
        }
    }
}

impl UnitDef {
    fn new(name: &str, role: UnitRole) -> Self {
        Self {
            name: name.to_string(),
            role,
            squad_leader: false,
            specialist: false,
            experience: 0,
            health: UNIT_MAX_HEALTH,
        }
    }

    fn leader(mut self) -> Self {
        self.squad_leader = true;
        self
    }

    fn specialist(mut self) -> Self {
        self.specialist = true;
        self
    }

    fn experience(mut self, experience: u32) -> Self {
        self.experience = experience;
        self
    }
}

impl ScenarioConfig {
    /// Checks that cannot be expressed in the types. Cover point geometry is
    /// validated when the points are built.
    pub fn validate(&self) -> Result<(), ScenarioError> {
        let mut names = std::collections::HashSet::new();
        for member in self.squads.iter().flat_map(|s| s.members.iter()) {
            if !(member.health.is_finite() && member.health > 0.0) {
                return Err(ScenarioError::Invalid(format!(
                    "unit {} starts with health {}",
                    member.name, member.health
                )));
            }
            if !names.insert(member.name.as_str()) {
                return Err(ScenarioError::Invalid(format!(
                    "unit name {} used twice",
                    member.name
                )));
            }
        }
        let r = self.ranking;
        if !(r.effectiveness.is_finite() && r.distance.is_finite()) {
            return Err(ScenarioError::Invalid("ranking weights must be finite".into()));
        }
        Ok(())
    }

    pub fn unit_count(&self) -> usize {
        self.squads.iter().map(|s| s.members.len()).sum()
    }
}

/// Build the configuration for a built-in scenario.
pub fn build_scenario(scenario: ScenarioId) -> ScenarioConfig {
    match scenario {
        ScenarioId::Skirmish => build_skirmish(),
        ScenarioId::Contested => build_contested(),
        ScenarioId::Siege => build_siege(),
    }
}

/// Parse a scenario from JSON text.
pub fn parse_scenario(json: &str) -> Result<ScenarioConfig, ScenarioError> {
    let config: ScenarioConfig = serde_json::from_str(json)?;
    config.validate()?;
    Ok(config)
}

/// Read and parse a scenario file.
pub fn load_scenario(path: &Path) -> Result<ScenarioConfig, ScenarioError> {
    let text = std::fs::read_to_string(path).map_err(|source| ScenarioError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let config = parse_scenario(&text)?;
    info!(path = %path.display(), name = %config.name, "scenario loaded");
    Ok(config)
}

/// A built-in scenario by name (case-insensitive), otherwise a file path.
pub fn resolve_scenario(name: &str) -> Result<ScenarioConfig, ScenarioError> {
    match name.to_ascii_lowercase().as_str() {
        "skirmish" => Ok(build_scenario(ScenarioId::Skirmish)),
        "contested" => Ok(build_scenario(ScenarioId::Contested)),
        "siege" => Ok(build_scenario(ScenarioId::Siege)),
        _ => load_scenario(Path::new(name)),
    }
}

fn point(id: u32, x: f64, y: f64, quality: CoverQuality) -> CoverPointDef {
    CoverPointDef::new(CoverPointId(id), Position::new(x, y, 0.0), quality)
}

/// Skirmish: "Hedgerow"
/// One squad of four, a farmhouse behind and walls ahead. Spare capacity.
fn build_skirmish() -> ScenarioConfig {
    ScenarioConfig {
        name: "Hedgerow".into(),
        cover_points: vec![
            point(1, 0.0, 12.0, CoverQuality::Heavy).with_capacity(2),
            point(2, -8.0, 10.0, CoverQuality::Light).with_flank_factor(0.5),
            point(3, 8.0, 10.0, CoverQuality::Light).with_flank_factor(0.5),
            point(4, 0.0, -14.0, CoverQuality::Garrison).with_capacity(4),
        ],
        squads: vec![SquadDef {
            squad: 1,
            origin: Position::new(0.0, 0.0, 0.0),
            members: vec![
                UnitDef::new("Sgt. Hale", UnitRole::Officer).leader().experience(6),
                UnitDef::new("Pvt. Ortiz", UnitRole::Rifleman).experience(1),
                UnitDef::new("Cpl. Brandt", UnitRole::Support).specialist().experience(3),
                UnitDef::new("Doc Reyes", UnitRole::Medic).experience(2),
            ],
        }],
        threat: Some(Position::new(0.0, 200.0, 0.0)),
        ranking: RankingConfig::default(),
    }
}

/// Contested: "Crossroads"
/// Two squads and three single-slot points between them.
fn build_contested() -> ScenarioConfig {
    ScenarioConfig {
        name: "Crossroads".into(),
        cover_points: vec![
            point(1, 0.0, 5.0, CoverQuality::Heavy).facing(FRAC_PI_2, PI),
            point(2, 0.0, -5.0, CoverQuality::Heavy).facing(FRAC_PI_2, PI),
            point(3, 0.0, 15.0, CoverQuality::Light).facing(FRAC_PI_2, PI),
        ],
        squads: vec![
            SquadDef {
                squad: 1,
                origin: Position::new(-10.0, 0.0, 0.0),
                members: vec![
                    UnitDef::new("Lt. Marsh", UnitRole::Officer).leader().experience(4),
                    UnitDef::new("Pvt. Kerr", UnitRole::Rifleman),
                    UnitDef::new("Doc Okafor", UnitRole::Medic).experience(1),
                ],
            },
            SquadDef {
                squad: 2,
                origin: Position::new(10.0, 0.0, 0.0),
                members: vec![
                    UnitDef::new("Cpl. Vance", UnitRole::Sniper),
                    UnitDef::new("Pvt. Lund", UnitRole::Support).specialist().experience(2),
                    UnitDef::new("Pvt. Sato", UnitRole::Engineer),
                ],
            },
        ],
        threat: Some(Position::new(150.0, 0.0, 0.0)),
        ranking: RankingConfig::default(),
    }
}

/// Siege: "Mill House"
/// A garrisoned building for three and a ring of fragile light cover.
fn build_siege() -> ScenarioConfig {
    let mut cover_points = vec![point(1, 0.0, 0.0, CoverQuality::Garrison).with_capacity(3)];
    for (i, (x, y)) in [(12.0, 6.0), (-12.0, 6.0), (6.0, -12.0), (-6.0, -12.0)]
        .into_iter()
        .enumerate()
    {
        cover_points.push(point(2 + i as u32, x, y, CoverQuality::Light).facing(PI / 4.0, FRAC_PI_2));
    }

    ScenarioConfig {
        name: "Mill House".into(),
        cover_points,
        squads: vec![
            SquadDef {
                squad: 1,
                origin: Position::new(-15.0, 15.0, 0.0),
                members: vec![
                    UnitDef::new("Capt. Dunmore", UnitRole::Officer).leader().experience(9),
                    UnitDef::new("Pvt. Abara", UnitRole::Rifleman),
                    UnitDef::new("Spr. Iqbal", UnitRole::Engineer).specialist(),
                ],
            },
            SquadDef {
                squad: 2,
                origin: Position::new(15.0, -15.0, 0.0),
                members: vec![
                    UnitDef::new("Sgt. Novak", UnitRole::Rifleman).leader().experience(5),
                    UnitDef::new("Pvt. Quill", UnitRole::Sniper),
                    UnitDef::new("Doc Farrow", UnitRole::Medic),
                ],
            },
        ],
        threat: Some(Position::new(150.0, 150.0, 0.0)),
        ranking: RankingConfig::default(),
    }
}
