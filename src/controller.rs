use std::panic::{catch_unwind, AssertUnwindSafe};

use glam::Vec2;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use tracing::{debug, warn};

use crate::avoidance;
use crate::config;
use crate::corners;
use crate::guard::{self, GuardState};
use crate::hearing;
use crate::hunter::{
    Hunter, HunterArena, HunterConfig, HunterId, HunterState, Reaction, ReactionPhase,
};
use crate::investigate;
use crate::steering::{self, heading_dir, normalize_angle};
use crate::tuning::{Param, ParamEntry, Tuning, TuningError};
use crate::vision;
use crate::world::{GamePhase, Obstacle, Outcome, OutcomeSink, PlayerState, WorldView};

/// Read-only per-tick context shared by every hunter update.
struct TickCtx<'a> {
    player: Option<PlayerState>,
    objective: Vec2,
    obstacles: &'a [Obstacle],
    reckless: f32,
    frozen: bool,
    now: f64,
}

/// Owns every registered hunter and runs the full behavior pipeline each
/// simulation tick: hearing, state behavior, integration, vision, and the
/// race-win side effect. One hunter's fault never stalls the batch.
pub struct HunterController {
    arena: HunterArena,
    tuning: Tuning,
    outcome: Box<dyn OutcomeSink>,
    seed: u64,
    spawn_counter: u64,
    now: f64,
    session_elapsed: f32,
    session_active: bool,
    round_reported: bool,
    /// Debug/test hook: short-circuits all motion while perception keeps
    /// running.
    pub frozen: bool,
}

impl HunterController {
    pub fn new(seed: u64, outcome: Box<dyn OutcomeSink>) -> Self {
        Self {
            arena: HunterArena::new(),
            tuning: Tuning::new(),
            outcome,
            seed,
            spawn_counter: 0,
            now: 0.0,
            session_elapsed: 0.0,
            session_active: false,
            round_reported: false,
            frozen: false,
        }
    }

    /// Register a hunter. Its authored defaults are captured into the
    /// tuning surface (first write wins), then the active tuning is
    /// stamped back onto the hunter.
    pub fn register(&mut self, cfg: HunterConfig) -> HunterId {
        self.tuning.capture_default(Param::PatrolSpeed, cfg.max_speed);
        self.tuning.capture_default(Param::HuntSpeed, cfg.max_speed_hunting);
        self.tuning.capture_default(Param::Acceleration, cfg.acceleration);
        self.tuning.capture_default(Param::AngularAccel, cfg.max_angular_accel);
        self.tuning.capture_default(Param::VisionAngle, cfg.vision_angle);
        self.tuning.capture_default(Param::VisionRange, cfg.vision_range);
        self.tuning.capture_default(Param::HearingRange, cfg.hearing_range);
        self.tuning.capture_default(Param::ReactionDuration, cfg.reaction_duration);

        let rng_seed = self
            .seed
            .wrapping_add(self.spawn_counter.wrapping_mul(0x9E37_79B9_7F4A_7C15));
        self.spawn_counter += 1;

        let mut hunter = Hunter::from_config(&cfg, ChaCha8Rng::seed_from_u64(rng_seed));
        apply_tuning(&mut hunter, &self.tuning);
        let id = self.arena.insert(hunter);
        debug!(index = id.index, "hunter registered");
        id
    }

    /// Idempotent re-registration: an already-registered hunter only gets
    /// the current tuning refreshed.
    pub fn reregister(&mut self, id: HunterId) -> bool {
        let tuning = &self.tuning;
        match self.arena.get_mut(id) {
            Some(hunter) => {
                apply_tuning(hunter, tuning);
                true
            }
            None => false,
        }
    }

    pub fn unregister(&mut self, id: HunterId) -> bool {
        self.arena.remove(id)
    }

    /// Read-only view of the live hunters, in stable order.
    pub fn hunters(&self) -> impl Iterator<Item = (HunterId, &Hunter)> {
        self.arena.iter()
    }

    pub fn get(&self, id: HunterId) -> Option<&Hunter> {
        self.arena.get(id)
    }

    /// External interaction hook: the player grabbing this hunter's shirt.
    pub fn set_pulled(&mut self, id: HunterId, pulled: bool) {
        if let Some(hunter) = self.arena.get_mut(id) {
            hunter.is_being_pulled = pulled;
        }
    }

    /// Set a tuning parameter by name. The clamped value is applied to
    /// every currently-registered hunter before this call returns.
    pub fn set_param(&mut self, name: &str, value: f32) -> Result<f32, TuningError> {
        let stored = self.tuning.set_named(name, value)?;
        let tuning = &self.tuning;
        for (_, hunter) in self.arena.iter_mut() {
            apply_tuning(hunter, tuning);
        }
        Ok(stored)
    }

    pub fn get_param(&self, name: &str) -> Result<f32, TuningError> {
        self.tuning.get_named(name)
    }

    pub fn tuning_snapshot(&self) -> Vec<ParamEntry> {
        self.tuning.snapshot()
    }

    /// Advance every hunter by one simulation tick. No-op outside the
    /// playing phase; the first active tick starts the session clock that
    /// drives recklessness.
    pub fn tick(&mut self, world: &dyn WorldView, dt: f32) {
        if world.game_phase() != GamePhase::Playing {
            self.session_active = false;
            return;
        }
        if self.session_active {
            self.session_elapsed += dt;
        } else {
            self.session_active = true;
            self.session_elapsed = 0.0;
            self.round_reported = false;
        }
        self.now += dt as f64;

        self.arena.sweep_inactive();

        let obstacles = world.static_obstacles();
        let ctx = TickCtx {
            player: world.local_player(),
            objective: world.objective_position(),
            obstacles: &obstacles,
            reckless: self.reckless_factor(),
            frozen: self.frozen,
            now: self.now,
        };

        let tuning = &self.tuning;
        let mut any_won = false;
        for idx in 0..self.arena.slot_count() {
            let Some(hunter) = self.arena.get_mut_by_index(idx) else {
                continue;
            };
            if !hunter.active {
                continue;
            }

            match catch_unwind(AssertUnwindSafe(|| update_hunter(hunter, &ctx, tuning, dt))) {
                Ok(won) => any_won |= won,
                Err(_) => {
                    warn!(hunter = idx, tick_time = ctx.now, "hunter update panicked, skipped for this tick");
                }
            }
        }

        if any_won && !self.round_reported {
            self.round_reported = true;
            self.outcome.report_outcome(Outcome::AiWon);
        }
    }

    /// 0 -> 1 boldness ramp from elapsed session time.
    fn reckless_factor(&self) -> f32 {
        let delay = self.tuning.get(Param::RecklessDelay);
        let ramp = self.tuning.get(Param::RecklessRamp).max(0.001);
        ((self.session_elapsed - delay) / ramp).clamp(0.0, 1.0)
    }
}

/// Stamp the live tuning onto a hunter's own fields. Values the behaviors
/// read per tick (hearing range, thresholds, durations) are pulled from
/// the tuning surface directly and need no stamping.
fn apply_tuning(hunter: &mut Hunter, tuning: &Tuning) {
    hunter.max_speed = tuning.get(Param::PatrolSpeed);
    hunter.max_speed_hunting = tuning.get(Param::HuntSpeed);
    hunter.acceleration = tuning.get(Param::Acceleration);
    hunter.max_angular_accel = tuning.get(Param::AngularAccel);
    hunter.vision.base_angle = tuning
        .get(Param::VisionAngle)
        .clamp(config::VISION_MIN_ANGLE, 180.0);
    hunter.vision.base_range = tuning.get(Param::VisionRange).max(config::VISION_MIN_RANGE);
}

/// Full per-hunter pipeline for one tick. Returns whether this hunter
/// reached the can.
fn update_hunter(hunter: &mut Hunter, ctx: &TickCtx, tuning: &Tuning, dt: f32) -> bool {
    if hunter.inject_fault {
        panic!("injected hunter fault");
    }

    // A hunter with a broken transform is skipped, not an error.
    if !hunter.pos.is_finite() || !hunter.heading.is_finite() {
        return false;
    }

    let mut won = false;
    if ctx.frozen {
        hunter.velocity = Vec2::ZERO;
    } else {
        let heard_transition = update_hearing(hunter, ctx, tuning);

        let change = match hunter.state {
            HunterState::Patrol => update_patrol(hunter, ctx, tuning, dt),
            HunterState::Investigate => investigate::update_investigate(
                hunter,
                ctx.obstacles,
                tuning.get(Param::InvestigateDuration),
                ctx.now,
                dt,
            ),
            HunterState::Race => {
                let (change, reached) = update_race(hunter, ctx, tuning, dt);
                won = reached;
                change
            }
        };

        // At most one state change per tick: a hearing-triggered
        // transition wins over whatever the behavior proposes.
        if let Some(next) = change {
            if !heard_transition {
                debug!(from = ?hunter.state, to = ?next, "state change");
                hunter.state = next;
            }
        }

        hunter.pos += hunter.velocity * dt;
    }

    update_vision(hunter, ctx, tuning);
    won
}

/// Hearing check, first in the pipeline. A heard player snaps the
/// hunter's attention instantly and puts it in INVESTIGATE.
fn update_hearing(hunter: &mut Hunter, ctx: &TickCtx, tuning: &Tuning) -> bool {
    let Some(player) = ctx.player else {
        return false;
    };
    // Racing hunters ignore stimuli; a reacting hunter is already committed.
    if hunter.is_reacting() || hunter.state == HunterState::Race {
        return false;
    }

    let distance = hunter.pos.distance(player.position);
    if !hearing::can_hear(
        distance,
        tuning.get(Param::HearingRange),
        &player,
        tuning.get(Param::SneakVolumeMultiplier),
    ) {
        return false;
    }

    hunter.last_heard = Some(player.position);
    let look = corners::determine_look_at_target(hunter.pos, player.position, ctx.obstacles);
    hunter.look_at = Some(look.position);
    // Startled: no smoothing, the head whips around.
    hunter.heading = steering::bearing(hunter.pos, look.position);
    hunter.investigation.started_at = ctx.now;
    hunter.investigation.look_around_time = 0.0;

    if hunter.state != HunterState::Investigate {
        debug!(corner = look.is_corner, "sound heard, investigating");
        hunter.state = HunterState::Investigate;
        true
    } else {
        false
    }
}

fn update_patrol(
    hunter: &mut Hunter,
    ctx: &TickCtx,
    tuning: &Tuning,
    dt: f32,
) -> Option<HunterState> {
    if hunter.is_reacting() {
        return update_reaction(hunter, tuning, ctx.now);
    }
    hunter.jump_offset = 0.0;

    let avoid =
        avoidance::compute_obstacle_avoidance(hunter, ctx.obstacles, config::AVOID_LOOKAHEAD);

    // Stuck only counts while wall avoidance is pushing; a deliberate
    // pause in open space is not a stuck condition.
    if avoid != crate::steering::Steering::default() {
        if avoidance::is_stuck_on_wall(hunter, dt) {
            avoidance::unstuck(hunter);
        }
    } else {
        hunter.stuck.timer = 0.0;
        hunter.stuck.last_position = Some(hunter.pos);
    }

    let guard_state = hunter
        .guard
        .get_or_insert_with(|| GuardState::init(&mut hunter.rng));

    // Recklessness only ever grows the orbit.
    let radius_override = if ctx.reckless > 0.0 {
        let max_radius = tuning.get(Param::RecklessMaxRadius);
        let grown = guard_state.orbit_radius
            + (max_radius - guard_state.orbit_radius).max(0.0) * ctx.reckless;
        Some(grown)
    } else {
        None
    };

    let guard_steer = guard::compute_can_guard_patrol(
        guard_state,
        &mut hunter.rng,
        hunter.pos,
        hunter.heading,
        hunter.acceleration,
        hunter.max_angular_accel,
        ctx.objective,
        dt,
        ctx.obstacles,
        radius_override,
    );

    // Avoidance dominates, or the guard grinds along walls.
    let combined = steering::combine(&[(guard_steer, 1.0), (avoid, config::AVOID_WEIGHT)]);

    hunter.heading = normalize_angle(hunter.heading + combined.angular * dt);
    hunter.velocity += combined.linear * dt;

    let speed = hunter.velocity.length();
    if speed > hunter.max_speed {
        hunter.velocity *= hunter.max_speed / speed;
    }
    hunter.velocity *= config::FRICTION;
    if hunter.is_being_pulled {
        hunter.velocity *= config::PULL_SPEED_FACTOR;
    }

    None
}

/// Spotted-player reaction playback: freeze, jump, then race. The jump is
/// a kinematic vertical excursion that returns to the ground.
fn update_reaction(hunter: &mut Hunter, tuning: &Tuning, now: f64) -> Option<HunterState> {
    let Some(reaction) = hunter.reaction.as_mut() else {
        return None;
    };

    hunter.velocity = Vec2::ZERO;

    let jump_time = tuning.get(Param::ReactionJumpTime);
    let duration = tuning.get(Param::ReactionDuration).max(jump_time + 0.01);
    let elapsed = (now - reaction.started_at) as f32;

    if reaction.phase == ReactionPhase::Spotted && elapsed >= jump_time {
        reaction.phase = ReactionPhase::Reacting;
        debug!("reaction jump");
    }

    hunter.jump_offset = if elapsed > jump_time && elapsed < duration {
        let progress = (elapsed - jump_time) / (duration - jump_time);
        config::REACTION_JUMP_HEIGHT * 4.0 * progress * (1.0 - progress)
    } else {
        0.0
    };

    if elapsed >= duration {
        hunter.reaction = None;
        hunter.jump_offset = 0.0;
        hunter.current_speed = 0.0;
        hunter.race_lock_until = now + tuning.get(Param::RaceLockDuration) as f64;
        return Some(HunterState::Race);
    }

    None
}

/// Sprint at the can, ignoring everything else. Speed ramps linearly from
/// zero toward the hunting maximum.
fn update_race(
    hunter: &mut Hunter,
    ctx: &TickCtx,
    tuning: &Tuning,
    dt: f32,
) -> (Option<HunterState>, bool) {
    let distance = hunter.pos.distance(ctx.objective);
    if distance < tuning.get(Param::WinDistance) {
        hunter.velocity = Vec2::ZERO;
        return (None, true);
    }

    let desired = steering::bearing(hunter.pos, ctx.objective);
    let angular = steering::angular_steering(hunter.heading, desired, hunter.max_angular_accel * 3.5);
    hunter.heading = normalize_angle(hunter.heading + angular * dt);

    hunter.current_speed =
        (hunter.current_speed + hunter.acceleration * dt).min(hunter.max_speed_hunting);
    let effective_speed = if hunter.is_being_pulled {
        hunter.current_speed * config::PULL_SPEED_FACTOR
    } else {
        hunter.current_speed
    };
    hunter.velocity = heading_dir(hunter.heading) * effective_speed;

    // Commitment window: only give up once the lock expires and the can is
    // still far away.
    if ctx.now > hunter.race_lock_until && distance > config::RACE_ABORT_DISTANCE {
        debug!("race lock expired far from the can, back to patrol");
        hunter.current_speed = 0.0;
        hunter.race_lock_until = 0.0;
        return (Some(HunterState::Patrol), false);
    }

    (None, false)
}

/// Dynamic vision plus the acquisition test. A clean line of sight from
/// PATROL starts the spotted reaction.
fn update_vision(hunter: &mut Hunter, ctx: &TickCtx, tuning: &Tuning) {
    hunter.vision.can_see_player = false;

    let default_focus = hunter.vision.base_range * 0.5;
    let focus_distance = if hunter.is_reacting() {
        hunter
            .vision
            .last_seen
            .map(|seen| hunter.pos.distance(seen))
            .unwrap_or(default_focus)
    } else {
        match hunter.state {
            HunterState::Patrol => hunter
                .guard
                .as_ref()
                .and_then(|g| g.scan_focus_distance)
                .unwrap_or(20.0),
            HunterState::Investigate => hunter
                .look_at
                .or(hunter.last_heard)
                .map(|target| hunter.pos.distance(target))
                .unwrap_or(default_focus),
            HunterState::Race => 15.0,
        }
    };

    vision::update_dynamic_vision(
        &mut hunter.vision,
        focus_distance,
        tuning.get(Param::VisionNearThreshold),
        tuning.get(Param::VisionFarThreshold),
    );

    let Some(player) = ctx.player else {
        return;
    };

    if vision::can_acquire(
        &hunter.vision,
        hunter.pos,
        hunter.heading,
        player.position,
        ctx.obstacles,
    ) {
        hunter.vision.can_see_player = true;
        hunter.vision.last_seen = Some(player.position);
        hunter.vision.last_seen_time = ctx.now;

        if hunter.state == HunterState::Patrol && !hunter.is_reacting() && !ctx.frozen {
            debug!("player spotted, reaction starts");
            hunter.velocity = Vec2::ZERO;
            hunter.heading = steering::bearing(hunter.pos, player.position);
            hunter.reaction = Some(Reaction {
                phase: ReactionPhase::Spotted,
                started_at: ctx.now,
            });
        }
    }
}
