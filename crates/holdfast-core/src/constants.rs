//! Simulation constants and tuning parameters.

/// Simulation tick rate (Hz).
pub const TICK_RATE: u32 = 30;

/// Seconds per tick.
pub const DT: f64 = 1.0 / TICK_RATE as f64;

// --- Cover quality ---

/// Damage reduction of open ground.
pub const COVER_REDUCTION_NONE: f64 = 0.0;

/// Damage reduction of light cover.
pub const COVER_REDUCTION_LIGHT: f64 = 0.25;

/// Damage reduction of heavy cover.
pub const COVER_REDUCTION_HEAVY: f64 = 0.5;

/// Damage reduction inside a garrisoned structure.
pub const COVER_REDUCTION_GARRISON: f64 = 0.75;

/// Negative cover never reduces damage.
pub const COVER_REDUCTION_NEGATIVE: f64 = 0.0;

/// Default protection arc width (radians, ~120°).
pub const DEFAULT_PROTECTION_ARC: f64 = std::f64::consts::TAU / 3.0;

/// Fraction of the reduction kept when the threat is outside the arc.
pub const DEFAULT_FLANK_FACTOR: f64 = 0.0;

/// Default number of simultaneous users of a cover point.
pub const DEFAULT_MAX_OCCUPANTS: u32 = 1;

// --- Candidate ranking ---

/// Weight of effectiveness in the candidate score.
pub const RANK_WEIGHT_EFFECTIVENESS: f64 = 1.0;

/// Weight of normalized distance (distance / radius) in the candidate score.
pub const RANK_WEIGHT_DISTANCE: f64 = 0.5;

// --- Unit priority ---

/// Priority bonus for a squad leader.
pub const PRIORITY_LEADER_BONUS: f64 = 20.0;

/// Priority bonus for a specialist (heavy weapons, radio, demolitions).
pub const PRIORITY_SPECIALIST_BONUS: f64 = 10.0;

/// Priority per point of experience.
pub const PRIORITY_PER_EXPERIENCE: f64 = 2.0;

/// Experience is capped at this value when scoring.
pub const PRIORITY_MAX_EXPERIENCE: u32 = 10;

/// Priority added at zero health (scaled linearly by missing health).
pub const PRIORITY_WOUNDED_WEIGHT: f64 = 30.0;

// --- Units ---

/// Maximum unit health.
pub const UNIT_MAX_HEALTH: f64 = 100.0;

/// Unit movement speed when running to cover (m/s).
pub const UNIT_RUN_SPEED: f64 = 4.5;

/// Default cover search radius (meters).
pub const DEFAULT_SEARCH_RADIUS: f64 = 40.0;

/// Distance at which a unit counts as arrived at its cover point (meters).
pub const ARRIVAL_TOLERANCE: f64 = 0.5;

/// Ticks a unit waits after a failed search before asking again.
pub const SEEK_RETRY_TICKS: u64 = 15;

/// Random jitter applied to unit spawn positions (meters).
pub const SPAWN_JITTER: f64 = 2.0;
