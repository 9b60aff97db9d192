use glam::{vec2, Vec2};
use serde::Serialize;

/// Host game phase as reported by the world collaborator.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum GamePhase {
    StartMenu,
    Countdown,
    Playing,
    GameOver,
}

/// Static axis-aligned obstacle owned by the arena. The ground plane packs
/// (x, z) into `Vec2`; `height` is kept for the host but ignored by the
/// 2D occlusion and avoidance math.
#[derive(Clone, Copy, Debug)]
pub struct Obstacle {
    pub center: Vec2,
    pub width: f32,
    pub height: f32,
    pub depth: f32,
    pub is_wall: bool,
    pub block_movement: bool,
    pub block_vision: bool,
}

impl Obstacle {
    pub fn block(center: Vec2, width: f32, depth: f32) -> Self {
        Self {
            center,
            width,
            height: 1.2,
            depth,
            is_wall: false,
            block_movement: true,
            block_vision: true,
        }
    }

    pub fn half_extents(&self) -> Vec2 {
        vec2(self.width * 0.5, self.depth * 0.5)
    }

    pub fn contains(&self, point: Vec2) -> bool {
        let h = self.half_extents();
        point.x >= self.center.x - h.x
            && point.x <= self.center.x + h.x
            && point.y >= self.center.y - h.y
            && point.y <= self.center.y + h.y
    }
}

/// Per-tick snapshot of the local player, read from the host's movement
/// and audio systems.
#[derive(Clone, Copy, Debug)]
pub struct PlayerState {
    pub position: Vec2,
    pub speed: f32,
    pub max_speed: f32,
    pub is_sneaking: bool,
}

/// Round outcome reported by the behavior core.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub enum Outcome {
    AiWon,
}

/// World/entity queries the controller needs each tick. The controller
/// treats everything returned here as a read-only snapshot.
pub trait WorldView {
    fn local_player(&self) -> Option<PlayerState>;
    fn objective_position(&self) -> Vec2;
    fn static_obstacles(&self) -> Vec<Obstacle>;
    fn game_phase(&self) -> GamePhase;
}

/// Win/loss signaling on the host game state. The controller reports,
/// the host ends the round.
pub trait OutcomeSink {
    fn report_outcome(&mut self, outcome: Outcome);
}
