use glam::{vec2, Vec2};

use crate::config;
use crate::world::Obstacle;

/// Where the hunter should aim its attention after hearing something.
#[derive(Clone, Copy, Debug)]
pub struct LookAtTarget {
    pub position: Vec2,
    pub is_corner: bool,
}

/// Ground-plane corners of an obstacle footprint.
pub fn box_corners(obstacle: &Obstacle) -> [Vec2; 4] {
    let h = obstacle.half_extents();
    let c = obstacle.center;
    [
        vec2(c.x + h.x, c.y + h.y),
        vec2(c.x + h.x, c.y - h.y),
        vec2(c.x - h.x, c.y + h.y),
        vec2(c.x - h.x, c.y - h.y),
    ]
}

/// March along the segment and return the index of the first vision-blocking
/// obstacle hit, if any. Sample count scales with segment length.
pub fn raycast_obstacles(
    from: Vec2,
    to: Vec2,
    obstacles: &[Obstacle],
    ignore: Option<usize>,
) -> Option<usize> {
    let distance = from.distance(to);
    if distance < 0.001 {
        return None;
    }

    let steps = (distance * config::CORNER_RAY_SAMPLES_PER_UNIT).ceil() as usize;
    for (idx, obstacle) in obstacles.iter().enumerate() {
        if !obstacle.block_vision {
            continue;
        }
        if ignore == Some(idx) {
            continue;
        }
        for i in 0..=steps {
            let t = i as f32 / steps as f32;
            if obstacle.contains(from.lerp(to, t)) {
                return Some(idx);
            }
        }
    }
    None
}

/// Unobstructed line segment test for vision acquisition. Endpoints are
/// excluded so an agent standing flush against a box can still see out.
pub fn line_of_sight(from: Vec2, to: Vec2, obstacles: &[Obstacle]) -> bool {
    let distance = from.distance(to);
    if distance < 0.001 {
        return true;
    }

    let steps = (distance * config::LOS_SAMPLES_PER_UNIT).ceil().max(1.0) as usize;
    for i in 1..steps {
        let t = i as f32 / steps as f32;
        let sample = from.lerp(to, t);
        for obstacle in obstacles {
            if obstacle.block_vision && obstacle.contains(sample) {
                return false;
            }
        }
    }
    true
}

/// Nearest corner of the blocking obstacle that the agent can actually see.
pub fn nearest_visible_corner(
    agent_pos: Vec2,
    blocking_idx: usize,
    obstacles: &[Obstacle],
) -> Option<Vec2> {
    let corners = box_corners(&obstacles[blocking_idx]);

    let mut nearest: Option<(Vec2, f32)> = None;
    for corner in corners {
        let distance = agent_pos.distance(corner);
        let blocked = raycast_obstacles(agent_pos, corner, obstacles, Some(blocking_idx)).is_some();
        if blocked {
            continue;
        }
        match nearest {
            Some((_, best)) if distance >= best => {}
            _ => nearest = Some((corner, distance)),
        }
    }
    nearest.map(|(corner, _)| corner)
}

/// Decide what to look at after hearing a sound: the raw sound position if
/// the path is clear, otherwise the nearest visible corner of whatever is
/// in the way — a plausible hiding spot beats staring at empty air.
pub fn determine_look_at_target(
    agent_pos: Vec2,
    sound_pos: Vec2,
    obstacles: &[Obstacle],
) -> LookAtTarget {
    let Some(blocking_idx) = raycast_obstacles(agent_pos, sound_pos, obstacles, None) else {
        return LookAtTarget {
            position: sound_pos,
            is_corner: false,
        };
    };

    match nearest_visible_corner(agent_pos, blocking_idx, obstacles) {
        Some(corner) => LookAtTarget {
            position: corner,
            is_corner: true,
        },
        // No visible corner, look at the sound anyway.
        None => LookAtTarget {
            position: sound_pos,
            is_corner: false,
        },
    }
}
