use glam::Vec2;
use rand_chacha::ChaCha8Rng;

use crate::config;
use crate::guard::GuardState;
use crate::vision::VisionCone;

/// Stable handle to a registered hunter. The generation field invalidates
/// stale references after the slot is reused.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub struct HunterId {
    pub index: u32,
    pub generation: u32,
}

/// Top-level behavior state. The spotted/reacting overlay lives in
/// [`Reaction`], not here; racing is only reachable through it.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum HunterState {
    Patrol,
    Investigate,
    Race,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ReactionPhase {
    Spotted,
    Reacting,
}

/// Reaction sequence playback: freeze, startled jump, then race.
#[derive(Clone, Copy, Debug)]
pub struct Reaction {
    pub phase: ReactionPhase,
    pub started_at: f64,
}

/// Investigation bookkeeping while chasing a sound.
#[derive(Clone, Copy, Debug, Default)]
pub struct Investigation {
    pub started_at: f64,
    pub look_around_time: f32,
    pub stuck_count: u32,
}

/// Position-delta based wall-stuck detection state.
#[derive(Clone, Copy, Debug, Default)]
pub struct StuckTracker {
    pub timer: f32,
    pub last_position: Option<Vec2>,
}

/// Designer-authored defaults for one hunter. Captured into the tuning
/// surface at registration (first write wins), then overwritten by the
/// active tuning.
#[derive(Clone, Copy, Debug)]
pub struct HunterConfig {
    pub position: Vec2,
    pub heading: f32,
    pub max_speed: f32,
    pub max_speed_hunting: f32,
    pub acceleration: f32,
    pub max_angular_accel: f32,
    pub vision_angle: f32,
    pub vision_range: f32,
    pub hearing_range: f32,
    pub reaction_duration: f32,
}

impl HunterConfig {
    pub fn at(position: Vec2) -> Self {
        Self {
            position,
            heading: 0.0,
            max_speed: config::PATROL_SPEED,
            max_speed_hunting: config::HUNT_SPEED,
            acceleration: config::ACCELERATION,
            max_angular_accel: config::MAX_ANGULAR_ACCEL,
            vision_angle: config::VISION_ANGLE,
            vision_range: config::VISION_RANGE,
            hearing_range: config::HEARING_RANGE,
            reaction_duration: config::REACTION_DURATION,
        }
    }
}

/// One AI-controlled hunter. Owns its full behavior record; the controller
/// is the only writer.
#[derive(Clone, Debug)]
pub struct Hunter {
    pub pos: Vec2,
    pub heading: f32,
    pub velocity: Vec2,
    /// Kinematic vertical excursion during the reaction jump. Purely
    /// visual; locomotion stays on the ground plane.
    pub jump_offset: f32,

    pub state: HunterState,
    pub reaction: Option<Reaction>,

    pub current_speed: f32,
    pub max_speed: f32,
    pub max_speed_hunting: f32,
    pub acceleration: f32,
    pub max_angular_accel: f32,

    pub vision: VisionCone,
    pub guard: Option<GuardState>,

    pub last_heard: Option<Vec2>,
    pub look_at: Option<Vec2>,
    pub investigation: Investigation,

    pub race_lock_until: f64,
    pub is_being_pulled: bool,

    pub stuck: StuckTracker,
    pub rng: ChaCha8Rng,
    pub active: bool,
    /// Failure-injection hook: the next update panics. Exists to exercise
    /// the controller's per-hunter fault boundary.
    pub inject_fault: bool,
}

impl Hunter {
    pub fn from_config(cfg: &HunterConfig, rng: ChaCha8Rng) -> Self {
        Self {
            pos: cfg.position,
            heading: cfg.heading,
            velocity: Vec2::ZERO,
            jump_offset: 0.0,
            state: HunterState::Patrol,
            reaction: None,
            current_speed: 0.0,
            max_speed: cfg.max_speed,
            max_speed_hunting: cfg.max_speed_hunting,
            acceleration: cfg.acceleration,
            max_angular_accel: cfg.max_angular_accel,
            vision: VisionCone::new(cfg.vision_angle, cfg.vision_range),
            guard: None,
            last_heard: None,
            look_at: None,
            investigation: Investigation::default(),
            race_lock_until: 0.0,
            is_being_pulled: false,
            stuck: StuckTracker::default(),
            rng,
            active: true,
            inject_fault: false,
        }
    }

    /// True when the spotted/reacting overlay is running.
    pub fn is_reacting(&self) -> bool {
        self.reaction.is_some()
    }
}

/// Slot-based hunter storage with generational handles and a free list.
pub struct HunterArena {
    pub hunters: Vec<Option<Hunter>>,
    generations: Vec<u32>,
    free_list: Vec<u32>,
    count: usize,
}

impl HunterArena {
    pub fn new() -> Self {
        Self {
            hunters: Vec::new(),
            generations: Vec::new(),
            free_list: Vec::new(),
            count: 0,
        }
    }

    pub fn insert(&mut self, hunter: Hunter) -> HunterId {
        if let Some(index) = self.free_list.pop() {
            let idx = index as usize;
            self.hunters[idx] = Some(hunter);
            self.count += 1;
            HunterId {
                index,
                generation: self.generations[idx],
            }
        } else {
            let index = self.hunters.len() as u32;
            self.hunters.push(Some(hunter));
            self.generations.push(0);
            self.count += 1;
            HunterId {
                index,
                generation: 0,
            }
        }
    }

    pub fn remove(&mut self, id: HunterId) -> bool {
        let idx = id.index as usize;
        if idx < self.hunters.len()
            && self.generations[idx] == id.generation
            && self.hunters[idx].is_some()
        {
            self.hunters[idx] = None;
            self.generations[idx] += 1;
            self.free_list.push(id.index);
            self.count -= 1;
            true
        } else {
            false
        }
    }

    pub fn get(&self, id: HunterId) -> Option<&Hunter> {
        let idx = id.index as usize;
        if idx < self.hunters.len() && self.generations[idx] == id.generation {
            self.hunters[idx].as_ref()
        } else {
            None
        }
    }

    pub fn get_mut(&mut self, id: HunterId) -> Option<&mut Hunter> {
        let idx = id.index as usize;
        if idx < self.hunters.len() && self.generations[idx] == id.generation {
            self.hunters[idx].as_mut()
        } else {
            None
        }
    }

    /// Drop slots whose hunter went inactive. Returns how many were dropped.
    pub fn sweep_inactive(&mut self) -> usize {
        let mut dropped = 0;
        for (idx, slot) in self.hunters.iter_mut().enumerate() {
            if let Some(hunter) = slot {
                if !hunter.active {
                    *slot = None;
                    self.generations[idx] += 1;
                    self.free_list.push(idx as u32);
                    self.count -= 1;
                    dropped += 1;
                }
            }
        }
        dropped
    }

    /// Iterate (id, &Hunter) in stable slot order.
    pub fn iter(&self) -> impl Iterator<Item = (HunterId, &Hunter)> {
        self.hunters.iter().enumerate().filter_map(|(i, slot)| {
            slot.as_ref().map(|h| {
                (
                    HunterId {
                        index: i as u32,
                        generation: self.generations[i],
                    },
                    h,
                )
            })
        })
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = (HunterId, &mut Hunter)> {
        self.hunters.iter_mut().enumerate().filter_map(|(i, slot)| {
            let generation = self.generations[i];
            slot.as_mut().map(move |h| {
                (
                    HunterId {
                        index: i as u32,
                        generation,
                    },
                    h,
                )
            })
        })
    }

    pub fn get_by_index(&self, index: usize) -> Option<&Hunter> {
        self.hunters.get(index).and_then(|h| h.as_ref())
    }

    pub fn get_mut_by_index(&mut self, index: usize) -> Option<&mut Hunter> {
        self.hunters.get_mut(index).and_then(|h| h.as_mut())
    }

    pub fn len(&self) -> usize {
        self.count
    }

    pub fn is_empty(&self) -> bool {
        self.count == 0
    }

    pub fn slot_count(&self) -> usize {
        self.hunters.len()
    }
}

impl Default for HunterArena {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::vec2;
    use rand::SeedableRng;

    fn test_hunter(pos: Vec2) -> Hunter {
        Hunter::from_config(&HunterConfig::at(pos), ChaCha8Rng::seed_from_u64(7))
    }

    #[test]
    fn generational_handles_invalidate_after_remove() {
        let mut arena = HunterArena::new();
        let id_a = arena.insert(test_hunter(vec2(0.0, 0.0)));
        assert!(arena.get(id_a).is_some());

        assert!(arena.remove(id_a));
        assert!(arena.get(id_a).is_none());

        let id_b = arena.insert(test_hunter(vec2(1.0, 0.0)));
        assert_eq!(id_a.index, id_b.index);
        assert_ne!(id_a.generation, id_b.generation);
        assert!(arena.get(id_b).is_some());
    }

    #[test]
    fn sweep_drops_inactive_hunters() {
        let mut arena = HunterArena::new();
        let id_live = arena.insert(test_hunter(vec2(0.0, 0.0)));
        let id_dead = arena.insert(test_hunter(vec2(1.0, 0.0)));

        arena.get_mut(id_dead).unwrap().active = false;
        assert_eq!(arena.sweep_inactive(), 1);
        assert_eq!(arena.len(), 1);
        assert!(arena.get(id_live).is_some());
        assert!(arena.get(id_dead).is_none());
    }
}
