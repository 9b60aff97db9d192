// All authored hunter defaults in one place. Runtime-tunable values are
// mirrored into the tuning surface; these are the starting points.

use std::f32::consts::PI;

// Simulation
pub const FIXED_DT: f32 = 1.0 / 60.0;

// Movement
pub const PATROL_SPEED: f32 = 2.4; // units/sec
pub const HUNT_SPEED: f32 = 4.2;
pub const ACCELERATION: f32 = 16.0; // units/sec^2, sized against per-tick friction
pub const MAX_ANGULAR_ACCEL: f32 = 4.5; // rad/sec
pub const FRICTION: f32 = 0.92; // per-tick velocity retention
pub const PULL_SPEED_FACTOR: f32 = 0.4; // while the player hangs onto the hunter

// Guard patrol
pub const ORBIT_RADIUS_MIN: f32 = 4.5;
pub const ORBIT_RADIUS_MAX: f32 = 7.5;
pub const GUARD_FAR_DISTANCE: f32 = 9.5; // beyond this, return urgently
pub const GUARD_NEAR_DISTANCE: f32 = 4.0; // inside this, back off
pub const BASE_ORBIT_SPEED: f32 = 0.3; // rad/sec
pub const REPOSITION_TURN_SPEED: f32 = 2.0; // rad/sec while swinging to a new angle
pub const SCAN_INTERVAL: f32 = 1.5; // sec between scan target changes
pub const BEHAVIOR_CHANGE_MIN: f32 = 2.0; // sec between tempo rolls
pub const BEHAVIOR_CHANGE_MAX: f32 = 6.0;
pub const SETTLED_DISTANCE: f32 = 0.8; // close enough to orbit target to re-roll tempo

// Recklessness (orbit radius grows the longer a round runs)
pub const RECKLESS_DELAY: f32 = 45.0; // sec before the ramp starts
pub const RECKLESS_RAMP: f32 = 60.0; // sec to reach full boldness
pub const RECKLESS_MAX_RADIUS: f32 = 8.5;

// Vision
pub const VISION_ANGLE: f32 = 70.0; // degrees
pub const VISION_RANGE: f32 = 12.0;
pub const VISION_NEAR_THRESHOLD: f32 = 0.3;
pub const VISION_FAR_THRESHOLD: f32 = 0.6;
pub const VISION_MIN_ANGLE: f32 = 1.0; // degrees, dynamic vision never collapses
pub const VISION_MIN_RANGE: f32 = 0.1;
pub const VISION_SMOOTHING: f32 = 0.1; // per-tick blend toward the new focus distance
pub const LOS_SAMPLES_PER_UNIT: f32 = 2.0;

// Hearing
pub const HEARING_RANGE: f32 = 10.0;
pub const SNEAK_VOLUME_MULTIPLIER: f32 = 0.3;
pub const NOISE_FLOOR_SPEED: f32 = 0.05; // below this the player makes no sound

// Reaction sequence (spotted -> jump -> race)
pub const REACTION_DURATION: f32 = 0.8;
pub const REACTION_JUMP_TIME: f32 = 0.2;
pub const REACTION_JUMP_HEIGHT: f32 = 0.35;

// Racing for the can
pub const RACE_LOCK_DURATION: f32 = 4.0;
pub const RACE_ABORT_DISTANCE: f32 = 8.0; // lock expired and still this far: give up
pub const WIN_DISTANCE: f32 = 1.6;

// Investigation
pub const INVESTIGATE_DURATION: f32 = 6.0;
pub const INVESTIGATE_ARRIVE_DISTANCE: f32 = 1.5;
pub const INVESTIGATE_SLOW_RADIUS: f32 = 2.5;
pub const INVESTIGATE_LOOK_SPEED: f32 = 1.0; // rad/sec while looking around
pub const INVESTIGATE_MAX_STUCK: u32 = 3;
pub const INVESTIGATE_LOOKAHEAD: f32 = 3.0;

// Obstacle avoidance
pub const AVOID_LOOKAHEAD: f32 = 2.5;
pub const AVOID_WEIGHT: f32 = 3.0; // avoidance dominates guard steering
pub const AVOID_ANGULAR_GAIN: f32 = 8.0;
pub const AVOID_LINEAR_GAIN: f32 = 5.0;
pub const AVOID_FORWARD_DOT: f32 = 0.3; // ~70 degree cone counts as "ahead"
pub const STUCK_TRIGGER_TIME: f32 = 0.15; // sec of no displacement before unsticking
pub const STUCK_MOVEMENT_EPSILON: f32 = 0.005; // per-frame displacement floor
pub const UNSTUCK_TURN_MIN: f32 = PI * 0.6; // 120 degrees
pub const UNSTUCK_TURN_SPAN: f32 = PI * 0.4; // up to 180

// Corner detection
pub const CORNER_RAY_SAMPLES_PER_UNIT: f32 = 10.0;
