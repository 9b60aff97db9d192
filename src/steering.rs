use glam::{vec2, Vec2};

/// Combined linear/angular steering contribution for one tick.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Steering {
    pub linear: Vec2,
    pub angular: f32,
}

/// Normalize an angle to [-PI, PI].
pub fn normalize_angle(mut angle: f32) -> f32 {
    use std::f32::consts::{PI, TAU};
    while angle > PI {
        angle -= TAU;
    }
    while angle < -PI {
        angle += TAU;
    }
    angle
}

/// Unit facing vector for a heading. Heading 0 faces +z; the ground plane
/// packs (x, z) into `Vec2` as (x, y).
pub fn heading_dir(heading: f32) -> Vec2 {
    vec2(heading.sin(), heading.cos())
}

/// Heading from one point toward another.
pub fn bearing(from: Vec2, to: Vec2) -> f32 {
    let d = to - from;
    d.x.atan2(d.y)
}

/// Angular correction toward a target heading, capped at `max_angular_accel`.
pub fn angular_steering(current_heading: f32, target_heading: f32, max_angular_accel: f32) -> f32 {
    let diff = normalize_angle(target_heading - current_heading);
    diff.signum() * diff.abs().min(max_angular_accel)
}

/// Approach a target and slow down inside `slow_radius` to avoid overshoot.
pub fn arrive(
    heading: f32,
    max_accel: f32,
    max_angular_accel: f32,
    target: Vec2,
    pos: Vec2,
    slow_radius: f32,
) -> Steering {
    let distance = pos.distance(target);
    let desired = bearing(pos, target);
    let speed_factor = (distance / slow_radius.max(f32::EPSILON)).min(1.0);
    Steering {
        linear: heading_dir(heading) * max_accel * speed_factor,
        angular: angular_steering(heading, desired, max_angular_accel),
    }
}

/// Sum weighted steering contributions.
pub fn combine(behaviors: &[(Steering, f32)]) -> Steering {
    let mut combined = Steering::default();
    for (steering, weight) in behaviors {
        combined.linear += steering.linear * *weight;
        combined.angular += steering.angular * *weight;
    }
    combined
}
