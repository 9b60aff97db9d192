use serde::Serialize;
use thiserror::Error;

use crate::config;

/// Every live-adjustable parameter the behavior core exposes. A finite,
/// typed set: nothing outside this list can be patched at runtime.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Param {
    PatrolSpeed,
    HuntSpeed,
    Acceleration,
    AngularAccel,
    ReactionDuration,
    ReactionJumpTime,
    RaceLockDuration,
    InvestigateDuration,
    HearingRange,
    SneakVolumeMultiplier,
    VisionAngle,
    VisionRange,
    VisionNearThreshold,
    VisionFarThreshold,
    RecklessDelay,
    RecklessRamp,
    RecklessMaxRadius,
    WinDistance,
}

pub const PARAM_COUNT: usize = 18;

impl Param {
    pub const ALL: [Param; PARAM_COUNT] = [
        Param::PatrolSpeed,
        Param::HuntSpeed,
        Param::Acceleration,
        Param::AngularAccel,
        Param::ReactionDuration,
        Param::ReactionJumpTime,
        Param::RaceLockDuration,
        Param::InvestigateDuration,
        Param::HearingRange,
        Param::SneakVolumeMultiplier,
        Param::VisionAngle,
        Param::VisionRange,
        Param::VisionNearThreshold,
        Param::VisionFarThreshold,
        Param::RecklessDelay,
        Param::RecklessRamp,
        Param::RecklessMaxRadius,
        Param::WinDistance,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Param::PatrolSpeed => "patrol_speed",
            Param::HuntSpeed => "hunt_speed",
            Param::Acceleration => "acceleration",
            Param::AngularAccel => "angular_accel",
            Param::ReactionDuration => "reaction_duration",
            Param::ReactionJumpTime => "reaction_jump_time",
            Param::RaceLockDuration => "race_lock_duration",
            Param::InvestigateDuration => "investigate_duration",
            Param::HearingRange => "hearing_range",
            Param::SneakVolumeMultiplier => "sneak_volume_multiplier",
            Param::VisionAngle => "vision_angle",
            Param::VisionRange => "vision_range",
            Param::VisionNearThreshold => "vision_near_threshold",
            Param::VisionFarThreshold => "vision_far_threshold",
            Param::RecklessDelay => "reckless_delay",
            Param::RecklessRamp => "reckless_ramp",
            Param::RecklessMaxRadius => "reckless_max_radius",
            Param::WinDistance => "win_distance",
        }
    }

    /// Valid range. Setters clamp here; invalid state is never stored.
    pub fn bounds(self) -> (f32, f32) {
        match self {
            Param::PatrolSpeed => (0.5, 6.0),
            Param::HuntSpeed => (1.0, 10.0),
            Param::Acceleration => (1.0, 40.0),
            Param::AngularAccel => (0.5, 10.0),
            Param::ReactionDuration => (0.1, 3.0),
            Param::ReactionJumpTime => (0.0, 1.0),
            Param::RaceLockDuration => (0.0, 15.0),
            Param::InvestigateDuration => (1.0, 20.0),
            Param::HearingRange => (0.0, 30.0),
            Param::SneakVolumeMultiplier => (0.0, 1.0),
            Param::VisionAngle => (config::VISION_MIN_ANGLE, 180.0),
            Param::VisionRange => (1.0, 40.0),
            Param::VisionNearThreshold => (0.05, 0.95),
            Param::VisionFarThreshold => (0.1, 0.99),
            Param::RecklessDelay => (0.0, 300.0),
            Param::RecklessRamp => (1.0, 300.0),
            Param::RecklessMaxRadius => (config::ORBIT_RADIUS_MIN, 15.0),
            Param::WinDistance => (0.5, 5.0),
        }
    }

    pub fn default_value(self) -> f32 {
        match self {
            Param::PatrolSpeed => config::PATROL_SPEED,
            Param::HuntSpeed => config::HUNT_SPEED,
            Param::Acceleration => config::ACCELERATION,
            Param::AngularAccel => config::MAX_ANGULAR_ACCEL,
            Param::ReactionDuration => config::REACTION_DURATION,
            Param::ReactionJumpTime => config::REACTION_JUMP_TIME,
            Param::RaceLockDuration => config::RACE_LOCK_DURATION,
            Param::InvestigateDuration => config::INVESTIGATE_DURATION,
            Param::HearingRange => config::HEARING_RANGE,
            Param::SneakVolumeMultiplier => config::SNEAK_VOLUME_MULTIPLIER,
            Param::VisionAngle => config::VISION_ANGLE,
            Param::VisionRange => config::VISION_RANGE,
            Param::VisionNearThreshold => config::VISION_NEAR_THRESHOLD,
            Param::VisionFarThreshold => config::VISION_FAR_THRESHOLD,
            Param::RecklessDelay => config::RECKLESS_DELAY,
            Param::RecklessRamp => config::RECKLESS_RAMP,
            Param::RecklessMaxRadius => config::RECKLESS_MAX_RADIUS,
            Param::WinDistance => config::WIN_DISTANCE,
        }
    }

    pub fn from_name(name: &str) -> Option<Param> {
        Param::ALL.iter().copied().find(|p| p.name() == name)
    }
}

#[derive(Error, Debug, PartialEq, Eq)]
pub enum TuningError {
    #[error("unknown tuning parameter `{0}`")]
    UnknownParam(String),
}

/// One row of a tuning snapshot, serializable for the host's debug panel.
#[derive(Clone, Debug, Serialize)]
pub struct ParamEntry {
    pub name: &'static str,
    pub value: f32,
    pub min: f32,
    pub max: f32,
    pub overridden: bool,
}

/// The runtime tuning surface. Values start at the crate defaults; the
/// first registered hunter's authored values replace any default that the
/// host has not explicitly overridden, and explicit writes always win.
pub struct Tuning {
    values: [f32; PARAM_COUNT],
    overridden: [bool; PARAM_COUNT],
    captured: [bool; PARAM_COUNT],
}

impl Tuning {
    pub fn new() -> Self {
        let mut values = [0.0; PARAM_COUNT];
        for param in Param::ALL {
            values[param as usize] = param.default_value();
        }
        Self {
            values,
            overridden: [false; PARAM_COUNT],
            captured: [false; PARAM_COUNT],
        }
    }

    pub fn get(&self, param: Param) -> f32 {
        self.values[param as usize]
    }

    /// Clamp into the valid range and store. Returns the stored value.
    pub fn set(&mut self, param: Param, value: f32) -> f32 {
        let (min, max) = param.bounds();
        let clamped = if value.is_finite() {
            value.clamp(min, max)
        } else {
            param.default_value()
        };
        self.values[param as usize] = clamped;
        self.overridden[param as usize] = true;
        clamped
    }

    pub fn get_named(&self, name: &str) -> Result<f32, TuningError> {
        Param::from_name(name)
            .map(|p| self.get(p))
            .ok_or_else(|| TuningError::UnknownParam(name.to_string()))
    }

    pub fn set_named(&mut self, name: &str, value: f32) -> Result<f32, TuningError> {
        Param::from_name(name)
            .map(|p| self.set(p, value))
            .ok_or_else(|| TuningError::UnknownParam(name.to_string()))
    }

    /// Adopt an authored default. Only the first capture lands, and an
    /// explicit override always takes precedence.
    pub fn capture_default(&mut self, param: Param, authored: f32) {
        let idx = param as usize;
        if self.overridden[idx] || self.captured[idx] {
            return;
        }
        let (min, max) = param.bounds();
        if authored.is_finite() {
            self.values[idx] = authored.clamp(min, max);
        }
        self.captured[idx] = true;
    }

    pub fn snapshot(&self) -> Vec<ParamEntry> {
        Param::ALL
            .iter()
            .map(|&param| {
                let (min, max) = param.bounds();
                ParamEntry {
                    name: param.name(),
                    value: self.get(param),
                    min,
                    max,
                    overridden: self.overridden[param as usize],
                }
            })
            .collect()
    }
}

impl Default for Tuning {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn set_clamps_out_of_range_values() {
        let mut tuning = Tuning::new();
        assert_eq!(tuning.set(Param::ReactionDuration, -5.0), 0.1);
        assert_eq!(tuning.set(Param::ReactionDuration, 99.0), 3.0);
        assert_eq!(tuning.get(Param::ReactionDuration), 3.0);
    }

    #[test]
    fn non_finite_set_falls_back_to_default() {
        let mut tuning = Tuning::new();
        let stored = tuning.set(Param::HearingRange, f32::NAN);
        assert_eq!(stored, config::HEARING_RANGE);
    }

    #[test]
    fn named_access_round_trips_and_rejects_unknown() {
        let mut tuning = Tuning::new();
        tuning.set_named("hearing_range", 14.0).unwrap();
        assert_eq!(tuning.get_named("hearing_range").unwrap(), 14.0);
        assert_eq!(
            tuning.set_named("turbo_mode", 1.0),
            Err(TuningError::UnknownParam("turbo_mode".to_string()))
        );
    }

    #[test]
    fn first_capture_wins_until_overridden() {
        let mut tuning = Tuning::new();

        tuning.capture_default(Param::PatrolSpeed, 3.0);
        assert_eq!(tuning.get(Param::PatrolSpeed), 3.0);

        // A second agent's authored value does not displace the first.
        tuning.capture_default(Param::PatrolSpeed, 5.0);
        assert_eq!(tuning.get(Param::PatrolSpeed), 3.0);

        // An explicit write beats any capture, past or future.
        tuning.set(Param::PatrolSpeed, 4.0);
        tuning.capture_default(Param::PatrolSpeed, 2.0);
        assert_eq!(tuning.get(Param::PatrolSpeed), 4.0);
    }

    #[test]
    fn override_blocks_later_capture_even_before_first_capture() {
        let mut tuning = Tuning::new();
        tuning.set(Param::VisionRange, 20.0);
        tuning.capture_default(Param::VisionRange, 8.0);
        assert_eq!(tuning.get(Param::VisionRange), 20.0);
    }

    #[test]
    fn snapshot_lists_every_parameter() {
        let tuning = Tuning::new();
        let snapshot = tuning.snapshot();
        assert_eq!(snapshot.len(), PARAM_COUNT);
        assert!(snapshot.iter().any(|e| e.name == "patrol_speed"));
        for entry in &snapshot {
            assert!(entry.value >= entry.min && entry.value <= entry.max);
        }
    }
}
