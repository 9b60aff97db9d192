use rand::Rng;

use crate::config;
use crate::hunter::Hunter;
use crate::steering::{heading_dir, normalize_angle, Steering};
use crate::world::Obstacle;

/// Probe ahead along the hunter's heading and steer away from the closest
/// movement-blocking obstacle in the forward cone. Steering strength grows
/// quadratically as the obstacle gets close.
pub fn compute_obstacle_avoidance(
    hunter: &Hunter,
    obstacles: &[Obstacle],
    look_ahead: f32,
) -> Steering {
    let mut steering = Steering::default();
    if obstacles.is_empty() {
        return steering;
    }

    let ray_dir = heading_dir(hunter.heading);

    let mut closest: Option<(f32, f32)> = None; // (distance, turn direction)
    for obstacle in obstacles {
        if !obstacle.block_movement {
            continue;
        }

        let to_obstacle = obstacle.center - hunter.pos;
        let distance = to_obstacle.length();
        if distance > look_ahead + 1.0 || distance < f32::EPSILON {
            continue;
        }

        // Forward cone check.
        let forward_dot = ray_dir.dot(to_obstacle) / distance;
        if forward_dot <= config::AVOID_FORWARD_DOT {
            continue;
        }

        if closest.map_or(true, |(best, _)| distance < best) {
            // Cross product sign: which side the obstacle sits on.
            let cross = ray_dir.x * to_obstacle.y - ray_dir.y * to_obstacle.x;
            let turn_direction = if cross >= 0.0 { 1.0 } else { -1.0 };
            closest = Some((distance, turn_direction));
        }
    }

    if let Some((distance, turn_direction)) = closest {
        if distance < look_ahead {
            let urgency = 1.0 - distance / look_ahead;
            let panic_level = urgency * urgency;

            steering.angular = turn_direction
                * hunter.max_angular_accel
                * config::AVOID_ANGULAR_GAIN
                * panic_level;

            // Shove sideways, perpendicular to the heading.
            let perp = heading_dir(hunter.heading + turn_direction * std::f32::consts::FRAC_PI_2);
            steering.linear =
                perp * hunter.acceleration * config::AVOID_LINEAR_GAIN * panic_level;
        }
    }

    steering
}

/// Sustained near-zero displacement while the hunter is trying to move
/// means it is grinding against a wall.
pub fn is_stuck_on_wall(hunter: &mut Hunter, dt: f32) -> bool {
    let Some(last) = hunter.stuck.last_position else {
        hunter.stuck.last_position = Some(hunter.pos);
        return false;
    };

    let moved = hunter.pos.distance(last);
    hunter.stuck.last_position = Some(hunter.pos);

    if hunter.max_speed > 0.05 && moved < config::STUCK_MOVEMENT_EPSILON {
        hunter.stuck.timer += dt;
        if hunter.stuck.timer > config::STUCK_TRIGGER_TIME {
            return true;
        }
    } else {
        hunter.stuck.timer = 0.0;
    }

    false
}

/// Emergency escape: swing 120-180 degrees in a random direction and
/// re-seed velocity so the next integration step actually leaves the wall.
pub fn unstuck(hunter: &mut Hunter) {
    let turn = config::UNSTUCK_TURN_MIN + hunter.rng.gen::<f32>() * config::UNSTUCK_TURN_SPAN;
    let direction = if hunter.rng.gen_bool(0.5) { 1.0 } else { -1.0 };

    hunter.heading = normalize_angle(hunter.heading + turn * direction);
    hunter.stuck.timer = 0.0;
    hunter.stuck.last_position = None;
    hunter.velocity = heading_dir(hunter.heading) * hunter.max_speed * 0.8;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hunter::HunterConfig;
    use glam::{vec2, Vec2};
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    fn hunter_at(pos: Vec2, heading: f32) -> Hunter {
        let mut cfg = HunterConfig::at(pos);
        cfg.heading = heading;
        Hunter::from_config(&cfg, ChaCha8Rng::seed_from_u64(11))
    }

    #[test]
    fn obstacle_dead_ahead_produces_steering() {
        // Heading 0 faces +z; box 1.5 units ahead.
        let hunter = hunter_at(vec2(0.0, 0.0), 0.0);
        let obstacles = vec![Obstacle::block(vec2(0.0, 1.5), 1.0, 1.0)];

        let steering = compute_obstacle_avoidance(&hunter, &obstacles, config::AVOID_LOOKAHEAD);
        assert!(steering.angular.abs() > 0.0);
        assert!(steering.linear.length() > 0.0);
    }

    #[test]
    fn obstacle_behind_is_ignored() {
        let hunter = hunter_at(vec2(0.0, 0.0), 0.0);
        let obstacles = vec![Obstacle::block(vec2(0.0, -1.5), 1.0, 1.0)];

        let steering = compute_obstacle_avoidance(&hunter, &obstacles, config::AVOID_LOOKAHEAD);
        assert_eq!(steering, Steering::default());
    }

    #[test]
    fn closer_obstacle_steers_harder() {
        let hunter = hunter_at(vec2(0.0, 0.0), 0.0);
        let near = vec![Obstacle::block(vec2(0.0, 0.8), 1.0, 1.0)];
        let far = vec![Obstacle::block(vec2(0.0, 2.2), 1.0, 1.0)];

        let near_steer = compute_obstacle_avoidance(&hunter, &near, config::AVOID_LOOKAHEAD);
        let far_steer = compute_obstacle_avoidance(&hunter, &far, config::AVOID_LOOKAHEAD);
        assert!(near_steer.linear.length() > far_steer.linear.length());
    }

    #[test]
    fn stuck_trips_after_sustained_no_movement() {
        let mut hunter = hunter_at(vec2(3.0, 3.0), 0.0);

        // First call only seeds the tracker.
        assert!(!is_stuck_on_wall(&mut hunter, 0.05));
        assert!(!is_stuck_on_wall(&mut hunter, 0.05));
        assert!(!is_stuck_on_wall(&mut hunter, 0.05));
        // Past the trigger time with no displacement.
        assert!(is_stuck_on_wall(&mut hunter, 0.1));
    }

    #[test]
    fn movement_resets_stuck_timer() {
        let mut hunter = hunter_at(vec2(3.0, 3.0), 0.0);
        assert!(!is_stuck_on_wall(&mut hunter, 0.1));
        hunter.pos += vec2(0.5, 0.0);
        assert!(!is_stuck_on_wall(&mut hunter, 0.1));
        assert_eq!(hunter.stuck.timer, 0.0);
    }

    #[test]
    fn unstuck_turns_at_least_120_degrees() {
        let mut hunter = hunter_at(vec2(0.0, 0.0), 0.3);
        let before = hunter.heading;
        unstuck(&mut hunter);
        let diff = crate::steering::normalize_angle(hunter.heading - before).abs();
        assert!(diff >= config::UNSTUCK_TURN_MIN - 1e-4);
        assert!(hunter.velocity.length() > 0.0);
    }
}
