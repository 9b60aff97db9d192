use crate::config;
use crate::world::PlayerState;

/// How far the player can be heard right now. Scales with how fast they
/// are moving and drops hard while sneaking.
pub fn effective_hearing_range(base_range: f32, player: &PlayerState, sneak_multiplier: f32) -> f32 {
    let max_speed = player.max_speed.max(f32::EPSILON);
    let mut sound_level = (player.speed / max_speed).clamp(0.0, 1.0);
    if player.is_sneaking {
        sound_level *= sneak_multiplier;
    }
    base_range * sound_level
}

/// Whether the hunter hears the player this tick.
pub fn can_hear(
    agent_distance: f32,
    base_range: f32,
    player: &PlayerState,
    sneak_multiplier: f32,
) -> bool {
    if player.speed <= config::NOISE_FLOOR_SPEED {
        return false;
    }
    agent_distance <= effective_hearing_range(base_range, player, sneak_multiplier)
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::vec2;

    fn player(speed: f32, sneaking: bool) -> PlayerState {
        PlayerState {
            position: vec2(0.0, 0.0),
            speed,
            max_speed: 4.0,
            is_sneaking: sneaking,
        }
    }

    #[test]
    fn full_speed_player_heard_at_base_range() {
        let p = player(4.0, false);
        assert!((effective_hearing_range(10.0, &p, 0.3) - 10.0).abs() < 1e-5);
        assert!(can_hear(5.0, 10.0, &p, 0.3));
    }

    #[test]
    fn sneaking_shrinks_range_below_distance() {
        let p = player(4.0, true);
        assert!((effective_hearing_range(10.0, &p, 0.3) - 3.0).abs() < 1e-5);
        assert!(!can_hear(5.0, 10.0, &p, 0.3));
    }

    #[test]
    fn stationary_player_is_silent() {
        let p = player(0.0, false);
        assert!(!can_hear(0.5, 10.0, &p, 0.3));
    }

    #[test]
    fn hearing_range_monotonic_in_player_speed() {
        let mut previous = 0.0;
        let mut speed = 0.0;
        while speed <= 8.0 {
            let range = effective_hearing_range(10.0, &player(speed, false), 0.3);
            assert!(range >= previous, "range shrank at speed {speed}");
            previous = range;
            speed += 0.25;
        }
    }
}
