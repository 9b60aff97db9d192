use tracing::debug;

use crate::avoidance;
use crate::config;
use crate::hunter::{Hunter, HunterState};
use crate::steering::{self, normalize_angle};
use crate::world::Obstacle;

/// One tick of the INVESTIGATE state: approach the heard position (or the
/// corner chosen for it), look around once arrived, and give up after a
/// bounded number of stuck events or a timeout. Returns the state to fall
/// back to, if any.
pub fn update_investigate(
    hunter: &mut Hunter,
    obstacles: &[Obstacle],
    investigate_duration: f32,
    now: f64,
    dt: f32,
) -> Option<HunterState> {
    let Some(heard) = hunter.last_heard else {
        return Some(HunterState::Patrol);
    };
    let target = hunter.look_at.unwrap_or(heard);
    let elapsed = (now - hunter.investigation.started_at) as f32;

    let distance = hunter.pos.distance(target);
    if distance > config::INVESTIGATE_ARRIVE_DISTANCE {
        if avoidance::is_stuck_on_wall(hunter, dt) {
            hunter.investigation.stuck_count += 1;
            if hunter.investigation.stuck_count > config::INVESTIGATE_MAX_STUCK {
                debug!(stuck = hunter.investigation.stuck_count, "giving up investigation");
                abandon(hunter);
                return Some(HunterState::Patrol);
            }
            avoidance::unstuck(hunter);
        }

        let avoid = avoidance::compute_obstacle_avoidance(
            hunter,
            obstacles,
            config::INVESTIGATE_LOOKAHEAD,
        );
        let approach = steering::arrive(
            hunter.heading,
            hunter.acceleration,
            hunter.max_angular_accel,
            target,
            hunter.pos,
            config::INVESTIGATE_SLOW_RADIUS,
        );
        let combined = steering::combine(&[(approach, 1.0), (avoid, config::AVOID_WEIGHT)]);

        hunter.heading = normalize_angle(hunter.heading + combined.angular * dt);
        hunter.velocity += combined.linear * dt;

        let speed = hunter.velocity.length();
        if speed > hunter.max_speed {
            hunter.velocity *= hunter.max_speed / speed;
        }
        hunter.velocity *= config::FRICTION;
    } else {
        // Arrived: stop and sweep the area.
        hunter.investigation.stuck_count = 0;
        hunter.velocity = glam::Vec2::ZERO;
        hunter.investigation.look_around_time += dt;
        hunter.heading = normalize_angle(hunter.heading + config::INVESTIGATE_LOOK_SPEED * dt);
    }

    if elapsed > investigate_duration {
        debug!("investigation timed out");
        abandon(hunter);
        return Some(HunterState::Patrol);
    }

    None
}

fn abandon(hunter: &mut Hunter) {
    hunter.last_heard = None;
    hunter.look_at = None;
    hunter.investigation.look_around_time = 0.0;
    hunter.investigation.stuck_count = 0;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hunter::HunterConfig;
    use glam::vec2;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    fn investigating_hunter() -> Hunter {
        let mut hunter = Hunter::from_config(
            &HunterConfig::at(vec2(0.0, 0.0)),
            ChaCha8Rng::seed_from_u64(21),
        );
        hunter.state = HunterState::Investigate;
        hunter.last_heard = Some(vec2(0.0, 6.0));
        hunter.investigation.started_at = 0.0;
        hunter
    }

    #[test]
    fn moves_toward_heard_position() {
        let mut hunter = investigating_hunter();
        let dt = 1.0 / 60.0;
        let mut now = 0.0;
        for _ in 0..120 {
            let change = update_investigate(&mut hunter, &[], config::INVESTIGATE_DURATION, now, dt);
            assert_eq!(change, None);
            hunter.pos += hunter.velocity * dt;
            now += dt as f64;
        }
        // Two seconds in, the hunter has closed most of the gap.
        assert!(hunter.pos.distance(vec2(0.0, 6.0)) < 4.0);
    }

    #[test]
    fn looks_around_after_arriving() {
        let mut hunter = investigating_hunter();
        hunter.pos = vec2(0.0, 5.5); // already within arrive distance
        let before = hunter.heading;
        let change = update_investigate(&mut hunter, &[], config::INVESTIGATE_DURATION, 0.1, 0.1);
        assert_eq!(change, None);
        assert_eq!(hunter.velocity, glam::Vec2::ZERO);
        assert!(hunter.heading != before);
        assert!(hunter.investigation.look_around_time > 0.0);
    }

    #[test]
    fn times_out_back_to_patrol() {
        let mut hunter = investigating_hunter();
        let now = (config::INVESTIGATE_DURATION + 0.5) as f64;
        let change = update_investigate(&mut hunter, &[], config::INVESTIGATE_DURATION, now, 1.0 / 60.0);
        assert_eq!(change, Some(HunterState::Patrol));
        assert!(hunter.last_heard.is_none());
    }

    #[test]
    fn missing_target_returns_to_patrol() {
        let mut hunter = investigating_hunter();
        hunter.last_heard = None;
        let change = update_investigate(&mut hunter, &[], config::INVESTIGATE_DURATION, 0.0, 1.0 / 60.0);
        assert_eq!(change, Some(HunterState::Patrol));
    }

    #[test]
    fn repeated_stuck_aborts_investigation() {
        let mut hunter = investigating_hunter();
        // Pin the hunter: zero velocity every tick so displacement stays 0.
        let dt = 0.1;
        let mut now = 0.0;
        let mut aborted = false;
        for _ in 0..200 {
            let change = update_investigate(&mut hunter, &[], config::INVESTIGATE_DURATION, now, dt);
            hunter.velocity = glam::Vec2::ZERO;
            hunter.pos = vec2(0.0, 0.0);
            now += dt as f64;
            if change == Some(HunterState::Patrol) {
                aborted = true;
                break;
            }
        }
        assert!(aborted, "stuck investigation never gave up");
    }
}
