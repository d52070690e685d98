// Animation data and the registry every entity animates from

use std::collections::HashMap;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::core::math::{tolerant_floor, BoundingBox, Vector2};
use crate::engine::error::RegistryError;
use crate::game::combat::events::{
    CameraShakeData, DamageData, EffectData, FrameEvent, FrameEventKind, SfxData,
    SpawnProjectileData,
};

use super::state::CharacterState;

/// Handle to an animation, only handed out by the registry that owns it
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct AnimationId(u32);

impl AnimationId {
    pub fn index(&self) -> usize {
        self.0 as usize
    }
}

/// Whether a box deals damage or receives it
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HitboxKind {
    Hit,
    Hurt,
}

/// A hit or hurt box active on one frame, in local space
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FrameHitbox {
    pub frame: usize,
    #[serde(rename = "type")]
    pub kind: HitboxKind,
    pub bounds: BoundingBox,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub damage: Option<f32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub knockback: Option<Vector2>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hitstun: Option<f32>,
}

impl FrameHitbox {
    pub fn hurt(frame: usize, bounds: BoundingBox) -> Self {
        Self {
            frame,
            kind: HitboxKind::Hurt,
            bounds,
            damage: None,
            knockback: None,
            hitstun: None,
        }
    }

    pub fn hit(
        frame: usize,
        bounds: BoundingBox,
        damage: f32,
        knockback: Vector2,
        hitstun: f32,
    ) -> Self {
        Self {
            frame,
            kind: HitboxKind::Hit,
            bounds,
            damage: Some(damage),
            knockback: Some(knockback),
            hitstun: Some(hitstun),
        }
    }
}

/// Frames entered by one animation step
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FrameCrossing {
    /// Frame already fired before this step, `None` on the first step
    pub from: Option<usize>,
    /// Raw (unclamped) frame index reached
    pub to: usize,
    /// A looping animation ran past its end and re-entered frame 0
    pub wrapped: bool,
}

/// A single animation: playback rate, length, loop flag, events and boxes
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct AnimationData {
    /// Name of the animation (e.g., "idle", "ranged", "die")
    pub name: String,
    /// Frames per second
    pub fps: f64,
    /// Whether the animation loops
    #[serde(rename = "loop")]
    pub looping: bool,
    /// Number of frames in the animation
    pub frames: usize,
    /// Events, sorted by frame once loaded into a registry
    #[serde(default)]
    pub events: Vec<FrameEvent>,
    #[serde(default)]
    pub hitboxes: Vec<FrameHitbox>,
}

impl AnimationData {
    /// Create a new animation without events or boxes
    pub fn new(name: &str, frames: usize, fps: f64, looping: bool) -> Self {
        Self {
            name: name.to_string(),
            fps,
            looping,
            frames,
            events: Vec::new(),
            hitboxes: Vec::new(),
        }
    }

    /// Create a looping animation
    pub fn looping(name: &str, frames: usize, fps: f64) -> Self {
        Self::new(name, frames, fps, true)
    }

    /// Create a one-shot animation (plays once)
    pub fn one_shot(name: &str, frames: usize, fps: f64) -> Self {
        Self::new(name, frames, fps, false)
    }

    /// Add an event on a frame
    pub fn with_event(mut self, frame: usize, kind: FrameEventKind) -> Self {
        self.events.push(FrameEvent::new(frame, kind));
        self
    }

    pub fn with_hitbox(mut self, hitbox: FrameHitbox) -> Self {
        self.hitboxes.push(hitbox);
        self
    }

    /// Add the same hurtbox to every frame
    pub fn with_hurtbox_all_frames(mut self, bounds: BoundingBox) -> Self {
        for frame in 0..self.frames {
            self.hitboxes.push(FrameHitbox::hurt(frame, bounds));
        }
        self
    }

    /// Duration of each frame in milliseconds
    pub fn frame_duration_ms(&self) -> f64 {
        1000.0 / self.fps
    }

    /// Duration of one full pass through the animation in milliseconds
    pub fn total_duration_ms(&self) -> f64 {
        self.frames as f64 * self.frame_duration_ms()
    }

    pub fn last_frame(&self) -> usize {
        self.frames - 1
    }

    /// Events on the frames a step entered, in the order they were entered
    pub fn events_crossed(&self, crossing: FrameCrossing) -> impl Iterator<Item = &FrameEvent> {
        let tail = self.events.iter().filter(move |event| {
            crossing.from.map_or(true, |from| event.frame > from) && event.frame <= crossing.to
        });
        let head = self
            .events
            .iter()
            .filter(move |event| crossing.wrapped && event.frame == 0);
        tail.chain(head)
    }

    /// Boxes of one kind active on a frame
    pub fn hitboxes_at(&self, frame: usize, kind: HitboxKind) -> impl Iterator<Item = &FrameHitbox> {
        self.hitboxes
            .iter()
            .filter(move |hitbox| hitbox.frame == frame && hitbox.kind == kind)
    }

    /// Advance an entity playing this animation by one fixed step
    ///
    /// Returns the crossing when a frame was entered; the caller fires
    /// `events_crossed` for it. The first step after a (re)start enters
    /// frame 0. Looping animations wrap to frame 0 and reset their time,
    /// one-shots clamp on the last frame.
    pub fn advance(&self, state: &mut CharacterState, step_ms: f64) -> Option<FrameCrossing> {
        let first_step = !state.animation_started;
        state.animation_started = true;

        let old_frame = state.animation_frame;
        let new_frame = tolerant_floor(state.animation_time / self.frame_duration_ms()) as usize;

        if !first_step && new_frame == old_frame {
            state.animation_time += step_ms;
            return None;
        }

        let mut wrapped = false;
        if new_frame >= self.frames {
            if self.looping {
                state.animation_frame = 0;
                state.animation_time = 0.0;
                wrapped = true;
            } else {
                // Stay on last frame
                state.animation_frame = self.last_frame();
            }
        } else {
            state.animation_frame = new_frame;
        }

        state.animation_time += step_ms;
        Some(FrameCrossing {
            from: (!first_step).then_some(old_frame),
            to: new_frame,
            wrapped,
        })
    }

    /// Check and normalize an animation before it enters a registry
    fn validated(mut self) -> Result<Self, RegistryError> {
        let invalid = |reason: String| RegistryError::Invalid {
            name: self.name.clone(),
            reason,
        };

        if self.name.is_empty() {
            return Err(invalid("name must not be empty".to_string()));
        }
        if !(self.fps.is_finite() && self.fps > 0.0) {
            return Err(invalid(format!("fps must be positive, got {}", self.fps)));
        }
        if self.frames == 0 {
            return Err(invalid("must have at least one frame".to_string()));
        }
        if let Some(event) = self.events.iter().find(|e| e.frame >= self.frames) {
            return Err(invalid(format!(
                "{} event on frame {} past the last frame {}",
                event.kind.type_name(),
                event.frame,
                self.frames - 1
            )));
        }
        if let Some(hitbox) = self
            .hitboxes
            .iter()
            .find(|h| h.frame >= self.frames || !h.bounds.is_valid())
        {
            return Err(invalid(format!("invalid hitbox on frame {}", hitbox.frame)));
        }

        if self.looping {
            let before = self.events.len();
            self.events.retain(|event| !event.kind.is_complete());
            if self.events.len() != before {
                log::warn!(
                    "Looping animation {} declares complete events, dropping them",
                    self.name
                );
            }
        } else if !self.events.iter().any(|event| event.kind.is_complete()) {
            let last = self.last_frame();
            self.events.push(FrameEvent::new(last, FrameEventKind::Complete));
        }

        // Stable, so events sharing a frame keep their declared order
        self.events.sort_by_key(|event| event.frame);
        Ok(self)
    }
}

/// Immutable table of animations keyed by name
#[derive(Debug, Clone, Default)]
pub struct AnimationRegistry {
    animations: Vec<AnimationData>,
    by_name: HashMap<String, AnimationId>,
}

impl AnimationRegistry {
    /// Build a registry, validating every animation
    pub fn new(animations: impl IntoIterator<Item = AnimationData>) -> Result<Self, RegistryError> {
        let mut registry = Self::default();
        for animation in animations {
            let animation = animation.validated()?;
            if registry.by_name.contains_key(&animation.name) {
                return Err(RegistryError::Duplicate(animation.name));
            }
            let id = AnimationId(registry.animations.len() as u32);
            registry.by_name.insert(animation.name.clone(), id);
            registry.animations.push(animation);
        }
        Ok(registry)
    }

    /// Load a registry from a JSON array of animations
    pub fn from_json(json: &str) -> Result<Self, RegistryError> {
        let animations: Vec<AnimationData> = serde_json::from_str(json)?;
        Self::new(animations)
    }

    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self, RegistryError> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json(&json)
    }

    /// The built-in arena animation table
    pub fn standard() -> Self {
        Self::new(standard_animations()).unwrap_or_else(|err| {
            log::error!("Built-in animation table is invalid: {err}");
            Self::default()
        })
    }

    /// Resolve a name to a handle
    pub fn resolve(&self, name: &str) -> Option<AnimationId> {
        self.by_name.get(name).copied()
    }

    pub fn get(&self, id: AnimationId) -> Option<&AnimationData> {
        self.animations.get(id.index())
    }

    pub fn by_name(&self, name: &str) -> Option<&AnimationData> {
        self.resolve(name).and_then(|id| self.get(id))
    }

    /// Name of an animation, for renderers selecting sprite rows
    pub fn name(&self, id: AnimationId) -> Option<&str> {
        self.get(id).map(|animation| animation.name.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (AnimationId, &AnimationData)> {
        self.animations
            .iter()
            .enumerate()
            .map(|(index, animation)| (AnimationId(index as u32), animation))
    }

    pub fn len(&self) -> usize {
        self.animations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.animations.is_empty()
    }
}

/// Standard arena animations: locomotion, attacks, projectile and effects
pub fn standard_animations() -> Vec<AnimationData> {
    let body = BoundingBox::new(-20.0, -60.0, 40.0, 60.0);

    vec![
        AnimationData::looping("idle", 4, 8.0).with_hurtbox_all_frames(body),
        AnimationData::looping("walk", 6, 12.0).with_hurtbox_all_frames(body),
        AnimationData::one_shot("ranged", 4, 15.0)
            .with_event(
                1,
                FrameEventKind::PlaySfx(SfxData {
                    sound: "aim".to_string(),
                }),
            )
            .with_event(
                2,
                FrameEventKind::CameraShake(CameraShakeData {
                    intensity: 4.0,
                    duration: 120.0,
                }),
            )
            .with_event(3, FrameEventKind::SpawnProjectile(SpawnProjectileData::default()))
            .with_event(3, FrameEventKind::Complete)
            .with_hurtbox_all_frames(body),
        AnimationData::one_shot("melee", 5, 12.0)
            .with_event(
                1,
                FrameEventKind::PlaySfx(SfxData {
                    sound: "swing".to_string(),
                }),
            )
            .with_event(
                2,
                FrameEventKind::DealDamage(DamageData {
                    amount: 10.0,
                    knockback: Vector2::new(40.0, -20.0),
                    hitstun: 250.0,
                }),
            )
            .with_hitbox(FrameHitbox::hit(
                2,
                BoundingBox::new(10.0, -50.0, 40.0, 30.0),
                10.0,
                Vector2::new(40.0, -20.0),
                250.0,
            ))
            .with_hurtbox_all_frames(body),
        AnimationData::one_shot("cast", 4, 10.0)
            .with_event(
                2,
                FrameEventKind::EmitFx(EffectData {
                    effect: "blast".to_string(),
                    offset: Vector2::new(30.0, -20.0),
                }),
            )
            .with_hurtbox_all_frames(body),
        AnimationData::one_shot("hit", 3, 12.0).with_hurtbox_all_frames(body),
        AnimationData::looping("projectile", 4, 20.0),
        AnimationData::one_shot("die", 3, 60.0),
        AnimationData::one_shot("blast", 8, 20.0),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::math::Vector2;
    use crate::game::characters::state::Facing;

    fn state_for(registry: &AnimationRegistry, name: &str) -> CharacterState {
        let id = registry.resolve(name).unwrap();
        CharacterState::new("c1", Vector2::ZERO, Facing::Right, id)
    }

    #[test]
    fn test_animation_data_creation() {
        let animation = AnimationData::looping("idle", 4, 8.0);
        assert_eq!(animation.name, "idle");
        assert_eq!(animation.frames, 4);
        assert_eq!(animation.frame_duration_ms(), 125.0);
        assert_eq!(animation.total_duration_ms(), 500.0);
        assert!(animation.looping);
    }

    #[test]
    fn test_standard_registry_is_valid() {
        let registry = AnimationRegistry::new(standard_animations()).unwrap();
        for name in ["idle", "ranged", "projectile", "die", "blast"] {
            assert!(registry.resolve(name).is_some(), "missing {name}");
        }
        assert_eq!(registry.len(), standard_animations().len());
    }

    #[test]
    fn test_one_shot_gets_complete_event() {
        let registry = AnimationRegistry::new([AnimationData::one_shot("hit", 3, 12.0)]).unwrap();
        let hit = registry.by_name("hit").unwrap();
        assert_eq!(hit.events.len(), 1);
        assert_eq!(hit.events[0].frame, 2);
        assert!(hit.events[0].kind.is_complete());
    }

    #[test]
    fn test_looping_drops_complete_event() {
        let animation =
            AnimationData::looping("walk", 4, 10.0).with_event(3, FrameEventKind::Complete);
        let registry = AnimationRegistry::new([animation]).unwrap();
        assert!(registry.by_name("walk").unwrap().events.is_empty());
    }

    #[test]
    fn test_events_sorted_stably() {
        let sfx = |sound: &str| {
            FrameEventKind::PlaySfx(SfxData {
                sound: sound.to_string(),
            })
        };
        let animation = AnimationData::one_shot("combo", 4, 10.0)
            .with_event(2, sfx("b"))
            .with_event(1, sfx("a"))
            .with_event(2, sfx("c"));
        let registry = AnimationRegistry::new([animation]).unwrap();
        let order: Vec<_> = registry
            .by_name("combo")
            .unwrap()
            .events
            .iter()
            .filter_map(|event| match &event.kind {
                FrameEventKind::PlaySfx(sfx) => Some(sfx.sound.as_str()),
                _ => None,
            })
            .collect();
        assert_eq!(order, vec!["a", "b", "c"]);
    }

    #[test]
    fn test_invalid_animations_rejected() {
        assert!(AnimationRegistry::new([AnimationData::looping("zero", 0, 10.0)]).is_err());
        assert!(AnimationRegistry::new([AnimationData::looping("slow", 2, 0.0)]).is_err());
        assert!(AnimationRegistry::new([
            AnimationData::one_shot("late", 2, 10.0).with_event(2, FrameEventKind::Complete)
        ])
        .is_err());
        assert!(AnimationRegistry::new([AnimationData::looping("bad_box", 2, 10.0)
            .with_hitbox(FrameHitbox::hurt(0, BoundingBox::new(0.0, 0.0, -5.0, 5.0)))])
        .is_err());
    }

    #[test]
    fn test_duplicate_names_rejected() {
        let result = AnimationRegistry::new([
            AnimationData::looping("idle", 2, 10.0),
            AnimationData::looping("idle", 4, 10.0),
        ]);
        assert!(matches!(result, Err(RegistryError::Duplicate(name)) if name == "idle"));
    }

    #[test]
    fn test_from_json() {
        let json = r#"[
            { "name": "idle", "fps": 8, "loop": true, "frames": 4,
              "hitboxes": [ { "frame": 0, "type": "hurt",
                              "bounds": { "x": -20, "y": -60, "width": 40, "height": 60 } } ] },
            { "name": "ranged", "fps": 15, "loop": false, "frames": 4,
              "events": [
                { "frame": 3, "type": "spawnProjectile" },
                { "frame": 1, "type": "playSfx", "data": { "sound": "aim" } },
                { "frame": 2, "type": "cameraShake", "data": { "intensity": 4, "duration": 120 } },
                { "frame": 3, "type": "complete" }
              ] }
        ]"#;
        let registry = AnimationRegistry::from_json(json).unwrap();
        assert_eq!(registry.len(), 2);

        let ranged = registry.by_name("ranged").unwrap();
        let frames: Vec<usize> = ranged.events.iter().map(|event| event.frame).collect();
        assert_eq!(frames, vec![1, 2, 3, 3]);
        assert!(ranged.events[3].kind.is_complete());

        let idle = registry.by_name("idle").unwrap();
        assert_eq!(idle.hitboxes_at(0, HitboxKind::Hurt).count(), 1);
        assert_eq!(idle.hitboxes_at(1, HitboxKind::Hurt).count(), 0);
    }

    #[test]
    fn test_from_json_rejects_bad_data() {
        assert!(matches!(
            AnimationRegistry::from_json("not json"),
            Err(RegistryError::Parse(_))
        ));
    }

    #[test]
    fn test_name_lookup() {
        let registry = AnimationRegistry::standard();
        let id = registry.resolve("blast").unwrap();
        assert_eq!(registry.name(id), Some("blast"));
        assert!(registry.resolve("missing").is_none());
    }

    #[test]
    fn test_advance_one_shot_clamps() {
        let registry = AnimationRegistry::new([AnimationData::one_shot("test", 3, 10.0)]).unwrap();
        let animation = registry.by_name("test").unwrap();
        let mut state = state_for(&registry, "test");

        for _ in 0..100 {
            animation.advance(&mut state, 50.0);
            assert!(state.animation_frame < 3);
        }
        assert_eq!(state.animation_frame, 2);
    }

    #[test]
    fn test_advance_looping_wraps() {
        let registry = AnimationRegistry::new([AnimationData::looping("test", 3, 10.0)]).unwrap();
        let animation = registry.by_name("test").unwrap();
        let mut state = state_for(&registry, "test");

        let mut sequence = Vec::new();
        for _ in 0..16 {
            animation.advance(&mut state, 50.0);
            sequence.push(state.animation_frame);
        }
        assert_eq!(
            sequence,
            vec![0, 0, 1, 1, 2, 2, 0, 0, 1, 1, 2, 2, 0, 0, 1, 1]
        );
    }

    #[test]
    fn test_advance_reports_skipped_frames() {
        let registry = AnimationRegistry::new([AnimationData::one_shot("test", 4, 10.0)]).unwrap();
        let animation = registry.by_name("test").unwrap();
        let mut state = state_for(&registry, "test");

        // First step enters frame 0
        assert_eq!(
            animation.advance(&mut state, 350.0),
            Some(FrameCrossing {
                from: None,
                to: 0,
                wrapped: false
            })
        );
        // Next step jumps from frame 0 to frame 3
        assert_eq!(
            animation.advance(&mut state, 50.0),
            Some(FrameCrossing {
                from: Some(0),
                to: 3,
                wrapped: false
            })
        );
        assert_eq!(state.animation_frame, 3);
        // Clamped one-shots keep reporting raw frames past the end
        assert_eq!(
            animation.advance(&mut state, 50.0),
            Some(FrameCrossing {
                from: Some(3),
                to: 4,
                wrapped: false
            })
        );
        assert_eq!(state.animation_frame, 3);
    }

    fn fired<'a>(animation: &'a AnimationData, crossing: Option<FrameCrossing>) -> Vec<&'a str> {
        crossing
            .map(|crossing| {
                animation
                    .events_crossed(crossing)
                    .map(|event| match &event.kind {
                        FrameEventKind::PlaySfx(sfx) => sfx.sound.as_str(),
                        other => other.type_name(),
                    })
                    .collect()
            })
            .unwrap_or_default()
    }

    #[test]
    fn test_frame_zero_events_fire_on_start() {
        let json = r#"[
            { "name": "draw", "fps": 10, "loop": false, "frames": 2,
              "events": [ { "frame": 0, "type": "playSfx", "data": { "sound": "unsheathe" } } ] }
        ]"#;
        let registry = AnimationRegistry::from_json(json).unwrap();
        let animation = registry.by_name("draw").unwrap();
        let mut state = state_for(&registry, "draw");

        assert_eq!(fired(animation, animation.advance(&mut state, 50.0)), vec!["unsheathe"]);
        assert!(fired(animation, animation.advance(&mut state, 50.0)).is_empty());
        assert_eq!(fired(animation, animation.advance(&mut state, 50.0)), vec!["complete"]);

        // Restarting re-enters frame 0
        state.restart(registry.resolve("draw").unwrap());
        assert_eq!(fired(animation, animation.advance(&mut state, 50.0)), vec!["unsheathe"]);
    }

    #[test]
    fn test_frame_zero_events_fire_on_every_loop() {
        let sfx = |sound: &str| {
            FrameEventKind::PlaySfx(SfxData {
                sound: sound.to_string(),
            })
        };
        let registry = AnimationRegistry::new([AnimationData::looping("spin", 2, 10.0)
            .with_event(0, sfx("start"))
            .with_event(1, sfx("half"))])
        .unwrap();
        let animation = registry.by_name("spin").unwrap();
        let mut state = state_for(&registry, "spin");

        let mut sounds = Vec::new();
        for _ in 0..10 {
            sounds.extend(fired(animation, animation.advance(&mut state, 50.0)));
        }
        // 100ms frames at 50ms steps: frame 1 on step 3, wrap on step 5
        assert_eq!(sounds, vec!["start", "half", "start", "half", "start"]);
    }

    #[test]
    fn test_single_frame_one_shot_completes() {
        let registry = AnimationRegistry::new([AnimationData::one_shot("flash", 1, 10.0)]).unwrap();
        let animation = registry.by_name("flash").unwrap();
        let mut state = state_for(&registry, "flash");

        let mut completes = 0;
        for _ in 0..20 {
            completes += fired(animation, animation.advance(&mut state, 50.0)).len();
            assert_eq!(state.animation_frame, 0);
        }
        assert_eq!(completes, 1);
    }
}
