// Animation engine - fixed-step animation, frame events and projectiles
//
// Every tick runs in the same order:
// 1. Advance simulation time and drop projectiles whose die animation ended
// 2. Animate characters
// 3. Move, expire, animate and collide projectiles
// 4. Animate effects
// 5. Dispatch the frame events queued above, oldest first
//
// Frame events never reach game rules directly. Anything that touches HP,
// audio or the camera leaves the engine as a `CombatEvent`.

use std::collections::{BTreeMap, VecDeque};

use crate::core::math::{ensure_finite_vec, Vector2, FRAME_EPSILON};
use crate::engine::config::{EngineConfig, DIE_ANIMATION, IDLE_ANIMATION, PROJECTILE_ANIMATION};
use crate::engine::error::EngineError;
use crate::engine::game_loop::FixedStepClock;
use crate::game::characters::animation::AnimationRegistry;
use crate::game::characters::character::{self, refresh_hurtboxes};
use crate::game::characters::definition::{CharacterDefinition, CharacterDefinitions};
use crate::game::characters::state::{CharacterState, Facing, ProjectileState};
use crate::game::world::{EntityId, World};

use super::events::{
    AnimationEvent, CombatEvent, EffectData, FrameEventKind, SpawnProjectileData,
};
use super::projectile::{integrate, ProjectileSpec};

/// Owned copy of every entity at one point in simulation time
#[derive(Debug, Clone, PartialEq)]
pub struct EngineSnapshot {
    pub global_time: f64,
    pub characters: BTreeMap<EntityId, CharacterState>,
    pub projectiles: BTreeMap<EntityId, ProjectileState>,
    pub effects: BTreeMap<EntityId, CharacterState>,
}

/// Drives every animated entity at a fixed rate
pub struct AnimationEngine {
    registry: AnimationRegistry,
    definitions: CharacterDefinitions,
    config: EngineConfig,
    world: World,
    clock: FixedStepClock,

    /// Simulation time (ms), advanced once per fixed step
    global_time: f64,

    /// Frame events crossed during the current tick
    event_queue: VecDeque<AnimationEvent>,

    /// Messages waiting for the game rules
    outbound: VecDeque<CombatEvent>,

    /// Suffix for generated projectile and effect ids
    spawn_counter: u64,
}

/// Step one entity's animation and queue the frame events it crossed.
/// Returns whether the visible frame changed.
fn animate(
    registry: &AnimationRegistry,
    state: &mut CharacterState,
    step_ms: f64,
    timestamp: f64,
    queue: &mut VecDeque<AnimationEvent>,
) -> bool {
    let Some(data) = registry.get(state.current_animation) else {
        log::warn!("{} plays an animation missing from the registry", state.id);
        return false;
    };

    let before = state.animation_frame;
    let Some(crossing) = data.advance(state, step_ms) else {
        return false;
    };

    for event in data.events_crossed(crossing) {
        queue.push_back(AnimationEvent {
            entity_id: state.id.clone(),
            event: event.clone(),
            timestamp,
        });
    }
    state.animation_frame != before
}

impl AnimationEngine {
    /// Create a stopped engine with the default config
    pub fn new(registry: AnimationRegistry) -> Self {
        Self::with_config(registry, EngineConfig::default())
    }

    pub fn with_config(registry: AnimationRegistry, config: EngineConfig) -> Self {
        let config = config.sanitized();
        let clock = FixedStepClock::new(config.fixed_timestep_ms, config.max_steps_per_update);
        Self {
            registry,
            definitions: CharacterDefinitions::new(),
            config,
            world: World::new(),
            clock,
            global_time: 0.0,
            event_queue: VecDeque::new(),
            outbound: VecDeque::new(),
            spawn_counter: 0,
        }
    }

    pub fn with_definitions(mut self, definitions: CharacterDefinitions) -> Self {
        self.definitions = definitions;
        self
    }

    /// Register or replace the definition used when a character fires
    pub fn set_character_definition(&mut self, id: &str, definition: CharacterDefinition) {
        self.definitions.insert(id, definition);
    }

    // ---- Lifecycle ----

    pub fn start(&mut self) {
        self.clock.start();
    }

    pub fn stop(&mut self) {
        self.clock.stop();
    }

    pub fn is_running(&self) -> bool {
        self.clock.is_running()
    }

    /// Real-time entry point, returns the number of fixed steps run.
    /// Does nothing while stopped.
    pub fn update(&mut self, current_time: f64) -> u32 {
        let steps = self.clock.begin_frame(current_time);
        for _ in 0..steps {
            self.fixed_update();
        }
        steps
    }

    /// Run every whole step in `delta_ms` immediately, running or not
    pub fn update_direct(&mut self, delta_ms: f64) -> u32 {
        let steps = self.clock.direct_steps(delta_ms);
        for _ in 0..steps {
            self.fixed_update();
        }
        steps
    }

    /// Advance the simulation by exactly one fixed step
    pub fn fixed_update(&mut self) {
        let step = self.clock.step_ms();
        self.global_time += step;

        self.process_removals();
        self.update_characters(step);
        self.update_projectiles(step);
        self.update_effects(step);
        self.process_events();
    }

    // ---- Entities ----

    /// Register a character in its idle animation
    pub fn create_character(
        &mut self,
        id: &str,
        position: Vector2,
        facing: Facing,
    ) -> Result<(), EngineError> {
        character::create_character(&mut self.world, &self.registry, id, position, facing)
    }

    /// Launch a projectile playing the projectile animation
    pub fn create_projectile(&mut self, id: &str, spec: ProjectileSpec) -> Result<(), EngineError> {
        let animation = self
            .registry
            .resolve(PROJECTILE_ANIMATION)
            .ok_or_else(|| EngineError::UnknownAnimation(PROJECTILE_ANIMATION.to_string()))?;
        let projectile = spec.build(id, animation, &self.config)?;
        self.world.insert_projectile(projectile)
    }

    /// Spawn a visual-only entity; it never collides or expires on its own
    pub fn create_effect(
        &mut self,
        id: &str,
        position: Vector2,
        animation: &str,
    ) -> Result<(), EngineError> {
        let position = ensure_finite_vec("position", position)?;
        let animation_id = self
            .registry
            .resolve(animation)
            .ok_or_else(|| EngineError::UnknownAnimation(animation.to_string()))?;
        self.world
            .insert_effect(CharacterState::new(id, position, Facing::Right, animation_id))
    }

    /// Switch an entity to an animation from frame 0, restarting it if it's
    /// already playing
    pub fn play_animation(&mut self, id: &str, animation: &str) -> Result<(), EngineError> {
        if !self.world.contains(id) {
            return Err(EngineError::NotFound(id.to_string()));
        }
        let animation_id = self
            .registry
            .resolve(animation)
            .ok_or_else(|| EngineError::UnknownAnimation(animation.to_string()))?;

        if let Some(character) = self.world.character_mut(id) {
            character.state.restart(animation_id);
            refresh_hurtboxes(character, &self.registry);
        } else if let Some(projectile) = self.world.projectile_mut(id) {
            projectile.state.restart(animation_id);
        } else if let Some(effect) = self.world.effect_mut(id) {
            effect.restart(animation_id);
        }
        Ok(())
    }

    /// Remove a projectile now, skipping its die animation
    pub fn force_destroy_projectile(&mut self, id: &str) -> bool {
        self.world.remove_projectile(id).is_some()
    }

    /// Remove a character and its definition
    pub fn remove_character(&mut self, id: &str) -> bool {
        self.definitions.remove(id);
        character::remove_character(&mut self.world, id)
    }

    pub fn remove_effect(&mut self, id: &str) -> bool {
        self.world.remove_effect(id).is_some()
    }

    /// Remove every entity and definition and drop queued events
    pub fn clear(&mut self) {
        character::clear(&mut self.world);
        self.definitions = CharacterDefinitions::new();
        self.event_queue.clear();
        self.outbound.clear();
    }

    // ---- Queries ----

    pub fn character(&self, id: &str) -> Option<&CharacterState> {
        character::get_character(&self.world, id)
    }

    pub fn characters(&self) -> impl Iterator<Item = &CharacterState> {
        self.world.characters().map(|character| &character.state)
    }

    pub fn projectile(&self, id: &str) -> Option<&ProjectileState> {
        self.world.projectile(id)
    }

    pub fn projectiles(&self) -> impl Iterator<Item = &ProjectileState> {
        self.world.projectiles()
    }

    pub fn effect(&self, id: &str) -> Option<&CharacterState> {
        self.world.effect(id)
    }

    pub fn effects(&self) -> impl Iterator<Item = &CharacterState> {
        self.world.effects()
    }

    /// Deep copy of the current state
    pub fn snapshot(&self) -> EngineSnapshot {
        EngineSnapshot {
            global_time: self.global_time,
            characters: self
                .characters()
                .map(|state| (state.id.clone(), state.clone()))
                .collect(),
            projectiles: self
                .projectiles()
                .map(|projectile| (projectile.state.id.clone(), projectile.clone()))
                .collect(),
            effects: self
                .effects()
                .map(|state| (state.id.clone(), state.clone()))
                .collect(),
        }
    }

    /// Simulation time (ms)
    pub fn global_time(&self) -> f64 {
        self.global_time
    }

    /// Interpolation factor between the last fixed step and the next
    pub fn alpha(&self) -> f64 {
        self.clock.alpha()
    }

    /// Timing state: host frames seen, steps run and time still owed
    pub fn clock(&self) -> &FixedStepClock {
        &self.clock
    }

    pub fn registry(&self) -> &AnimationRegistry {
        &self.registry
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn world(&self) -> &World {
        &self.world
    }

    /// Shared arena for character system calls (movement, facing, queries)
    pub fn world_mut(&mut self) -> &mut World {
        &mut self.world
    }

    /// Take every pending combat event, oldest first
    pub fn drain_events(&mut self) -> Vec<CombatEvent> {
        self.outbound.drain(..).collect()
    }

    // ---- Tick phases ----

    fn process_removals(&mut self) {
        let now = self.global_time;
        let due: Vec<EntityId> = self
            .world
            .projectiles()
            .filter(|projectile| {
                projectile
                    .removal_at
                    .is_some_and(|at| at <= now + FRAME_EPSILON)
            })
            .map(|projectile| projectile.state.id.clone())
            .collect();

        for id in due {
            log::debug!("Removing projectile {id}");
            self.world.remove_projectile(&id);
        }
    }

    fn update_characters(&mut self, step: f64) {
        let timestamp = self.global_time;
        for character in self.world.characters_mut() {
            if animate(
                &self.registry,
                &mut character.state,
                step,
                timestamp,
                &mut self.event_queue,
            ) {
                refresh_hurtboxes(character, &self.registry);
            }
        }
    }

    fn update_projectiles(&mut self, step: f64) {
        let timestamp = self.global_time;
        let mut expired = Vec::new();

        for projectile in self.world.projectiles_mut() {
            if !projectile.is_dying() {
                integrate(projectile, step);
                if projectile.lifetime + FRAME_EPSILON >= projectile.max_lifetime {
                    expired.push(projectile.state.id.clone());
                    continue;
                }
            }
            animate(
                &self.registry,
                &mut projectile.state,
                step,
                timestamp,
                &mut self.event_queue,
            );
        }

        for id in expired {
            log::debug!("Projectile {id} reached its max lifetime");
            self.destroy_projectile(&id);
        }

        self.check_projectile_collisions();
    }

    fn update_effects(&mut self, step: f64) {
        let timestamp = self.global_time;
        for effect in self.world.effects_mut() {
            animate(&self.registry, effect, step, timestamp, &mut self.event_queue);
        }
    }

    /// First character (by id) within range of each live projectile
    fn check_projectile_collisions(&mut self) {
        let radius = self.config.collision_radius;
        let hits: Vec<(EntityId, EntityId)> = self
            .world
            .projectiles()
            .filter(|projectile| !projectile.is_dying())
            .filter_map(|projectile| {
                self.world
                    .characters()
                    .map(|character| &character.state)
                    .find(|target| {
                        target.id != projectile.owner
                            && target.position.distance(projectile.state.position) < radius
                    })
                    .map(|target| (projectile.state.id.clone(), target.id.clone()))
            })
            .collect();

        for (projectile, target) in hits {
            self.resolve_hit(&projectile, &target);
        }
    }

    fn resolve_hit(&mut self, projectile_id: &str, target: &str) {
        let Some(projectile) = self.world.projectile(projectile_id) else {
            return;
        };
        let position = projectile.state.position;
        log::debug!("Projectile {projectile_id} hit {target}");

        self.outbound.push_back(CombatEvent::ProjectileHit {
            projectile: projectile_id.to_string(),
            owner: projectile.owner.clone(),
            target: target.to_string(),
            position,
            damage: projectile.damage,
            knockback: projectile.state.facing.mirror(projectile.knockback),
            hitstun: projectile.hitstun,
        });

        let effect = self.config.hit_effect.clone();
        let effect_id = self.next_spawn_id(&format!("{projectile_id}_{effect}"));
        if let Err(err) = self.create_effect(&effect_id, position, &effect) {
            log::debug!("Skipping hit effect for {projectile_id}: {err}");
        }

        self.destroy_projectile(projectile_id);
    }

    /// Start the die animation and schedule removal when it ends.
    /// Without a die animation the projectile is removed immediately.
    fn destroy_projectile(&mut self, id: &str) {
        let die = self
            .registry
            .resolve(DIE_ANIMATION)
            .and_then(|die| Some((die, self.registry.get(die)?.total_duration_ms())));

        let Some((die, duration)) = die else {
            self.world.remove_projectile(id);
            return;
        };

        let removal_at = self.global_time + duration;
        if let Some(projectile) = self.world.projectile_mut(id) {
            if projectile.is_dying() {
                return;
            }
            projectile.state.restart(die);
            projectile.velocity = Vector2::ZERO;
            projectile.speed = 0.0;
            projectile.removal_at = Some(removal_at);
        }
    }

    // ---- Event dispatch ----

    fn process_events(&mut self) {
        while let Some(event) = self.event_queue.pop_front() {
            self.dispatch(event);
        }
    }

    fn dispatch(&mut self, event: AnimationEvent) {
        let AnimationEvent {
            entity_id,
            event,
            timestamp,
        } = event;

        if !self.world.contains(&entity_id) {
            log::debug!(
                "Dropping {} event for removed entity {entity_id}",
                event.kind.type_name()
            );
            return;
        }
        log::debug!(
            "{entity_id}: {} on frame {} at {timestamp:.1}ms",
            event.kind.type_name(),
            event.frame
        );

        match event.kind {
            FrameEventKind::SpawnProjectile(data) => self.handle_spawn_projectile(&entity_id, &data),
            FrameEventKind::EmitFx(data) => self.handle_emit_fx(&entity_id, &data),
            FrameEventKind::Complete => self.handle_complete(&entity_id),
            FrameEventKind::PlaySfx(sfx) => self.outbound.push_back(CombatEvent::PlaySfx {
                source: entity_id,
                sfx,
            }),
            FrameEventKind::CameraShake(shake) => {
                self.outbound.push_back(CombatEvent::CameraShake {
                    source: entity_id,
                    shake,
                })
            }
            FrameEventKind::DealDamage(damage) => {
                self.outbound.push_back(CombatEvent::DealDamage {
                    source: entity_id,
                    damage,
                })
            }
        }
    }

    fn handle_spawn_projectile(&mut self, source: &str, data: &SpawnProjectileData) {
        let Some(state) = character::get_character(&self.world, source) else {
            log::debug!("Skipping spawnProjectile from {source}: not a character");
            return;
        };
        let Some(definition) = self.definitions.get(source).copied() else {
            log::debug!("Skipping spawnProjectile from {source}: no character definition");
            return;
        };

        let position = definition.muzzle_position(state.position, state.facing);
        let velocity = Vector2::new(self.config.projectile_speed * state.facing.sign(), 0.0);

        let id = self.next_spawn_id(&format!("{source}_projectile"));
        let spec = ProjectileSpec::new(position, velocity, source).with_overrides(data);
        match self.create_projectile(&id, spec) {
            Ok(()) => self.outbound.push_back(CombatEvent::ProjectileSpawned {
                projectile: id,
                owner: source.to_string(),
                position,
            }),
            Err(err) => log::warn!("Failed to spawn projectile for {source}: {err}"),
        }
    }

    fn handle_emit_fx(&mut self, source: &str, data: &EffectData) {
        let Some(state) = self.entity_state(source) else {
            return;
        };
        let facing = state.facing;
        let position = state.position + facing.mirror(data.offset);

        let id = self.next_spawn_id(&format!("{source}_fx"));
        match self.create_effect(&id, position, &data.effect) {
            Ok(()) => {
                if let Some(effect) = self.world.effect_mut(&id) {
                    effect.facing = facing;
                }
            }
            Err(err) => log::warn!("Failed to emit {} for {source}: {err}", data.effect),
        }
    }

    fn handle_complete(&mut self, id: &str) {
        let Some(animation) = self.entity_state(id).map(|state| state.current_animation) else {
            return;
        };
        self.outbound.push_back(CombatEvent::AnimationComplete {
            entity: id.to_string(),
            animation,
        });

        if let Some(character) = self.world.character_mut(id) {
            match self.registry.resolve(IDLE_ANIMATION) {
                Some(idle) if idle != animation => {
                    character.state.restart(idle);
                    refresh_hurtboxes(character, &self.registry);
                }
                Some(_) => {}
                None => log::warn!("No {IDLE_ANIMATION} animation to return {id} to"),
            }
        } else if self.world.remove_effect(id).is_some() {
            log::debug!("Effect {id} finished");
        }
    }

    /// Animation state of any entity, whatever its table
    fn entity_state(&self, id: &str) -> Option<&CharacterState> {
        self.character(id)
            .or_else(|| self.world.projectile(id).map(|projectile| &projectile.state))
            .or_else(|| self.world.effect(id))
    }

    /// Next free id of the form `{prefix}_{n}`
    fn next_spawn_id(&mut self, prefix: &str) -> EntityId {
        loop {
            self.spawn_counter += 1;
            let id = format!("{prefix}_{}", self.spawn_counter);
            if !self.world.contains(&id) {
                return id;
            }
        }
    }
}
