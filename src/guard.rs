use glam::{vec2, Vec2};
use rand::Rng;
use rand_chacha::ChaCha8Rng;
use tracing::debug;

use crate::config;
use crate::steering::{angular_steering, bearing, Steering};
use crate::world::Obstacle;

/// Current patrol tempo, rolled every few seconds to keep the guard from
/// looking mechanical.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Tempo {
    Normal,
    Pause,
    Reposition,
    Creep,
    Sweep,
}

/// Per-hunter orbiting state around the can. Created lazily on the first
/// patrol update and kept for the hunter's lifetime.
#[derive(Clone, Debug)]
pub struct GuardState {
    pub orbit_radius: f32,
    pub orbit_angle: f32,
    pub orbit_direction: f32, // +1 or -1
    pub target_orbit_angle: Option<f32>,

    pub scan_target: f32, // heading the guard wants to look along
    pub scan_focus_distance: Option<f32>, // distance to the hiding spot being checked
    scan_timer: f32,

    pub tempo: Tempo,
    pub move_speed_multiplier: f32,
    pub turn_speed_multiplier: f32,
    behavior_timer: f32,
    next_behavior_change: f32,

    obstacle_index: usize,
    /// Personal rhythm so a pack of guards never moves in lockstep.
    tempo_scale: f32,
}

impl GuardState {
    pub fn init(rng: &mut ChaCha8Rng) -> Self {
        Self {
            orbit_radius: rng.gen_range(config::ORBIT_RADIUS_MIN..config::ORBIT_RADIUS_MAX),
            orbit_angle: rng.gen_range(0.0..std::f32::consts::TAU),
            orbit_direction: if rng.gen_bool(0.5) { 1.0 } else { -1.0 },
            target_orbit_angle: None,
            scan_target: rng.gen_range(-std::f32::consts::PI..std::f32::consts::PI),
            scan_focus_distance: None,
            scan_timer: 0.0,
            tempo: Tempo::Normal,
            move_speed_multiplier: 1.0,
            turn_speed_multiplier: 1.0,
            behavior_timer: 0.0,
            next_behavior_change: rng
                .gen_range(config::BEHAVIOR_CHANGE_MIN..config::BEHAVIOR_CHANGE_MAX),
            obstacle_index: 0,
            tempo_scale: rng.gen_range(0.85..1.15),
        }
    }
}

/// One tick of the can-guarding patrol. Returns a steering contribution;
/// never mutates the transform directly.
#[allow(clippy::too_many_arguments)]
pub fn compute_can_guard_patrol(
    state: &mut GuardState,
    rng: &mut ChaCha8Rng,
    pos: Vec2,
    heading: f32,
    accel: f32,
    max_angular_accel: f32,
    objective: Vec2,
    dt: f32,
    obstacles: &[Obstacle],
    radius_override: Option<f32>,
) -> Steering {
    // A reckless override may grow the orbit, never shrink it below the
    // minimum patrol radius.
    let orbit_radius = radius_override
        .unwrap_or(state.orbit_radius)
        .max(config::ORBIT_RADIUS_MIN);

    let from_can = pos - objective;
    let distance_from_can = from_can.length();

    let orbit_target = objective
        + vec2(state.orbit_angle.sin(), state.orbit_angle.cos()) * orbit_radius;
    let distance_to_target = pos.distance(orbit_target);

    // Tempo rolls happen only once the guard has settled near its target,
    // so the change reads as a decision rather than a glitch.
    state.behavior_timer += dt;
    let is_settled = distance_to_target < config::SETTLED_DISTANCE;
    if state.behavior_timer > state.next_behavior_change * state.tempo_scale && is_settled {
        state.behavior_timer = 0.0;
        state.next_behavior_change =
            rng.gen_range(config::BEHAVIOR_CHANGE_MIN..config::BEHAVIOR_CHANGE_MAX);
        roll_tempo(state, rng);
    }

    // Too far out: urgent return. Too close: back off. Otherwise orbit.
    if distance_from_can > config::GUARD_FAR_DISTANCE {
        return return_to_can(pos, heading, accel, max_angular_accel, objective, orbit_radius);
    }
    if distance_from_can < config::GUARD_NEAR_DISTANCE {
        return move_away_from_can(rng, pos, heading, accel, max_angular_accel, objective);
    }

    let mut steering = Steering::default();

    if let Some(target_angle) = state.target_orbit_angle {
        // Smooth swing toward the reposition target angle.
        let diff = crate::steering::normalize_angle(target_angle - state.orbit_angle);
        let step = config::REPOSITION_TURN_SPEED * dt;
        if diff.abs() < step {
            state.orbit_angle = target_angle;
            state.target_orbit_angle = None;
        } else {
            state.orbit_angle += diff.signum() * step;
        }
    } else {
        let orbit_speed = config::BASE_ORBIT_SPEED * state.move_speed_multiplier;
        state.orbit_angle += state.orbit_direction * orbit_speed * dt;
    }
    state.orbit_angle = crate::steering::normalize_angle(state.orbit_angle);

    let target = objective
        + vec2(state.orbit_angle.sin(), state.orbit_angle.cos()) * orbit_radius;
    let to_target = target - pos;

    if to_target.length() > 0.4 {
        let move_dir = bearing(pos, target);
        steering.linear =
            vec2(move_dir.sin(), move_dir.cos()) * accel * state.move_speed_multiplier;
    }

    update_scan(state, rng, pos, dt, obstacles);

    steering.angular = angular_steering(
        heading,
        state.scan_target,
        max_angular_accel * state.turn_speed_multiplier,
    );

    steering
}

/// Weighted tempo roll: pause-and-scan, quick reposition to the opposite
/// side, slow creep, fast reversed sweep, or back to normal.
fn roll_tempo(state: &mut GuardState, rng: &mut ChaCha8Rng) {
    let roll: f32 = rng.gen();

    if roll < 0.20 {
        state.tempo = Tempo::Pause;
        state.move_speed_multiplier = 0.0;
        state.turn_speed_multiplier = 3.0;
        state.next_behavior_change = rng.gen_range(1.0..3.0);
    } else if roll < 0.35 {
        state.tempo = Tempo::Reposition;
        state.target_orbit_angle = Some(
            state.orbit_angle
                + std::f32::consts::PI
                + (rng.gen::<f32>() - 0.5) * std::f32::consts::FRAC_PI_3,
        );
        state.move_speed_multiplier = 2.0;
        state.turn_speed_multiplier = 3.0;
    } else if roll < 0.55 {
        state.tempo = Tempo::Creep;
        state.move_speed_multiplier = 0.3;
        state.turn_speed_multiplier = 2.5;
    } else if roll < 0.70 {
        state.tempo = Tempo::Sweep;
        state.move_speed_multiplier = 1.6;
        state.turn_speed_multiplier = 1.5;
        state.orbit_direction *= -1.0;
    } else {
        state.tempo = Tempo::Normal;
        state.move_speed_multiplier = 1.0;
        state.turn_speed_multiplier = 1.0;
    }

    debug!(tempo = ?state.tempo, "guard tempo change");
}

/// Rotate the scan target through known hiding spots, occasionally
/// skipping ahead so the sweep order stays unpredictable.
fn update_scan(
    state: &mut GuardState,
    rng: &mut ChaCha8Rng,
    pos: Vec2,
    dt: f32,
    obstacles: &[Obstacle],
) {
    state.scan_timer += dt;
    let interval =
        config::SCAN_INTERVAL * state.tempo_scale / state.turn_speed_multiplier.max(0.1);
    if state.scan_timer <= interval {
        return;
    }
    state.scan_timer = 0.0;

    if obstacles.is_empty() {
        state.scan_target = rng.gen_range(-std::f32::consts::PI..std::f32::consts::PI);
        state.scan_focus_distance = None;
        return;
    }

    let mut advance = 1;
    if rng.gen::<f32>() < 0.25 {
        advance += rng.gen_range(1..=2);
    }
    state.obstacle_index = (state.obstacle_index + advance) % obstacles.len();

    let spot = &obstacles[state.obstacle_index];
    state.scan_target = bearing(pos, spot.center);
    state.scan_focus_distance = Some(pos.distance(spot.center));
}

/// Urgent return when drifting too far from the can; urgency grows with
/// the overshoot, capped at full strength.
fn return_to_can(
    pos: Vec2,
    heading: f32,
    accel: f32,
    max_angular_accel: f32,
    objective: Vec2,
    orbit_radius: f32,
) -> Steering {
    let distance = pos.distance(objective);
    let overshoot = (distance - orbit_radius).max(0.0);
    let urgency = (overshoot / 3.0).min(1.0);
    let approach = bearing(pos, objective);

    Steering {
        linear: vec2(approach.sin(), approach.cos()) * accel * 1.5 * urgency,
        angular: angular_steering(heading, approach, max_angular_accel * 2.0),
    }
}

fn move_away_from_can(
    rng: &mut ChaCha8Rng,
    pos: Vec2,
    heading: f32,
    accel: f32,
    max_angular_accel: f32,
    objective: Vec2,
) -> Steering {
    let from_can = pos - objective;

    // Standing on top of the can: pick a random escape direction.
    let away = if from_can.length() < 0.1 {
        rng.gen_range(-std::f32::consts::PI..std::f32::consts::PI)
    } else {
        bearing(objective, pos)
    };

    Steering {
        linear: vec2(away.sin(), away.cos()) * accel,
        angular: angular_steering(heading, away, max_angular_accel),
    }
}
