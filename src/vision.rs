use glam::Vec2;

use crate::config;
use crate::corners::line_of_sight;
use crate::steering::{bearing, normalize_angle};
use crate::world::Obstacle;

/// Per-hunter vision cone. `angle`/`range` are recomputed every tick from
/// the authored base values and the current focus.
#[derive(Clone, Copy, Debug)]
pub struct VisionCone {
    pub base_angle: f32, // degrees
    pub base_range: f32,
    pub angle: f32,
    pub range: f32,
    pub can_see_player: bool,
    pub is_focusing: bool,
    pub last_seen: Option<Vec2>,
    pub last_seen_time: f64,
    smoothed_focus_distance: Option<f32>,
}

impl VisionCone {
    pub fn new(base_angle: f32, base_range: f32) -> Self {
        let base_angle = base_angle.clamp(config::VISION_MIN_ANGLE, 180.0);
        let base_range = base_range.max(config::VISION_MIN_RANGE);
        Self {
            base_angle,
            base_range,
            angle: base_angle,
            range: base_range,
            can_see_player: false,
            is_focusing: false,
            last_seen: None,
            last_seen_time: 0.0,
            smoothed_focus_distance: None,
        }
    }

    /// Reset to the authored parameters. Used as the fallback when the
    /// dynamic computation hits degenerate geometry.
    pub fn apply_base(&mut self) {
        self.angle = self.base_angle;
        self.range = self.base_range;
        self.is_focusing = false;
    }
}

/// Dynamic angle/range for this tick, derived from how far away the
/// current point of attention is. A distant focus narrows the cone and
/// extends the range; close-in scanning widens it and pulls it back.
pub fn update_dynamic_vision(
    cone: &mut VisionCone,
    focus_distance: f32,
    near_threshold: f32,
    far_threshold: f32,
) {
    if !focus_distance.is_finite() || cone.base_range <= 0.0 {
        cone.apply_base();
        return;
    }

    let smoothed = match cone.smoothed_focus_distance {
        Some(prev) => prev * (1.0 - config::VISION_SMOOTHING) + focus_distance * config::VISION_SMOOTHING,
        None => focus_distance,
    };
    cone.smoothed_focus_distance = Some(smoothed);

    let normalized = (smoothed / cone.base_range).min(1.0);
    let near = near_threshold.clamp(0.05, 0.95);
    let far = far_threshold.clamp(near + 0.01, 0.99);

    let (range_factor, angle_factor) = if normalized <= near {
        let progress = normalized / near;
        (0.8 + progress * 0.2, 1.2 - progress * 0.2)
    } else if normalized <= far {
        (1.0, 1.0)
    } else {
        let progress = (normalized - far) / (1.0 - far).max(0.0001);
        (1.0 + progress * 1.875, 1.0 - progress * 0.85)
    };

    let angle = cone.base_angle * angle_factor;
    let range = cone.base_range * range_factor;
    if !angle.is_finite() || !range.is_finite() {
        cone.apply_base();
        return;
    }

    // The cone never fully collapses.
    cone.angle = angle.clamp(config::VISION_MIN_ANGLE, 180.0);
    cone.range = range.max(config::VISION_MIN_RANGE);
    cone.is_focusing = normalized > far;
}

/// Acquisition test against the current cone: in range, inside the half
/// angle, and unobstructed by vision-blocking obstacles.
pub fn can_acquire(
    cone: &VisionCone,
    agent_pos: Vec2,
    agent_heading: f32,
    target_pos: Vec2,
    obstacles: &[Obstacle],
) -> bool {
    let distance = agent_pos.distance(target_pos);
    if distance > cone.range {
        return false;
    }

    let angle_to_target = bearing(agent_pos, target_pos);
    let off_axis = normalize_angle(angle_to_target - agent_heading).abs();
    let half_angle = cone.angle.to_radians() * 0.5;
    if off_axis > half_angle {
        return false;
    }

    line_of_sight(agent_pos, target_pos, obstacles)
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::vec2;

    fn cone() -> VisionCone {
        VisionCone::new(config::VISION_ANGLE, config::VISION_RANGE)
    }

    #[test]
    fn dynamic_vision_stays_positive_across_focus_sweep() {
        let mut c = cone();
        let mut distance = 0.0;
        while distance <= 40.0 {
            update_dynamic_vision(&mut c, distance, 0.3, 0.6);
            assert!(c.angle > 0.0 && c.angle <= 180.0, "angle {} at {}", c.angle, distance);
            assert!(c.range > 0.0, "range {} at {}", c.range, distance);
            distance += 0.5;
        }
    }

    #[test]
    fn distant_focus_narrows_and_extends() {
        let mut c = cone();
        // Drive the smoothed distance well past the far threshold.
        for _ in 0..200 {
            let target = c.base_range * 2.0;
            update_dynamic_vision(&mut c, target, 0.3, 0.6);
        }
        assert!(c.is_focusing);
        assert!(c.angle < c.base_angle);
        assert!(c.range > c.base_range);
    }

    #[test]
    fn close_scan_widens_and_shortens() {
        let mut c = cone();
        for _ in 0..200 {
            update_dynamic_vision(&mut c, 0.5, 0.3, 0.6);
        }
        assert!(!c.is_focusing);
        assert!(c.angle > c.base_angle);
        assert!(c.range < c.base_range);
    }

    #[test]
    fn degenerate_focus_falls_back_to_base() {
        let mut c = cone();
        update_dynamic_vision(&mut c, f32::NAN, 0.3, 0.6);
        assert_eq!(c.angle, c.base_angle);
        assert_eq!(c.range, c.base_range);
    }

    #[test]
    fn acquisition_requires_range_angle_and_los() {
        let c = cone();
        let pos = vec2(0.0, 0.0);

        // Dead ahead, in range, clear.
        assert!(can_acquire(&c, pos, 0.0, vec2(0.0, 8.0), &[]));
        // Out of range.
        assert!(!can_acquire(&c, pos, 0.0, vec2(0.0, 20.0), &[]));
        // Behind the agent.
        assert!(!can_acquire(&c, pos, 0.0, vec2(0.0, -8.0), &[]));
        // Occluded.
        let wall = vec![Obstacle::block(vec2(0.0, 4.0), 3.0, 0.5)];
        assert!(!can_acquire(&c, pos, 0.0, vec2(0.0, 8.0), &wall));
    }
}
