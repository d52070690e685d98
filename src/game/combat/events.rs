// Frame events declared in animation data, and the messages the engine emits

use serde::{Deserialize, Serialize};

use crate::core::math::Vector2;
use crate::game::characters::animation::AnimationId;
use crate::game::world::EntityId;

/// Optional overrides for a projectile spawned by an animation
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SpawnProjectileData {
    #[serde(default)]
    pub damage: Option<f32>,
    #[serde(default)]
    pub knockback: Option<Vector2>,
    #[serde(default)]
    pub hitstun: Option<f32>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SfxData {
    pub sound: String,
}

/// Visual effect spawned relative to the source entity
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EffectData {
    /// Animation name of the effect
    pub effect: String,
    /// Offset from the source position, mirrored by facing
    #[serde(default)]
    pub offset: Vector2,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DamageData {
    pub amount: f32,
    #[serde(default)]
    pub knockback: Vector2,
    /// Hitstun duration in milliseconds
    #[serde(default)]
    pub hitstun: f32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CameraShakeData {
    pub intensity: f32,
    /// Shake duration in milliseconds
    pub duration: f32,
}

/// What happens when a frame event fires
#[derive(Debug, Clone, PartialEq)]
pub enum FrameEventKind {
    SpawnProjectile(SpawnProjectileData),
    PlaySfx(SfxData),
    EmitFx(EffectData),
    DealDamage(DamageData),
    Complete,
    CameraShake(CameraShakeData),
}

impl FrameEventKind {
    /// Name used for this event type in animation data
    pub fn type_name(&self) -> &'static str {
        match self {
            Self::SpawnProjectile(_) => "spawnProjectile",
            Self::PlaySfx(_) => "playSfx",
            Self::EmitFx(_) => "emitFx",
            Self::DealDamage(_) => "dealDamage",
            Self::Complete => "complete",
            Self::CameraShake(_) => "cameraShake",
        }
    }

    pub fn is_complete(&self) -> bool {
        matches!(self, Self::Complete)
    }
}

/// A gameplay event bound to an animation frame
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(try_from = "RawFrameEvent")]
pub struct FrameEvent {
    pub frame: usize,
    pub kind: FrameEventKind,
}

impl FrameEvent {
    pub fn new(frame: usize, kind: FrameEventKind) -> Self {
        Self { frame, kind }
    }
}

/// Wire shape of a frame event: `{"frame": 1, "type": "playSfx", "data": {...}}`
#[derive(Deserialize)]
struct RawFrameEvent {
    frame: usize,
    #[serde(rename = "type")]
    kind: String,
    #[serde(default)]
    data: serde_json::Value,
}

impl TryFrom<RawFrameEvent> for FrameEvent {
    type Error = String;

    fn try_from(raw: RawFrameEvent) -> Result<Self, Self::Error> {
        fn payload<T: serde::de::DeserializeOwned>(
            kind: &str,
            data: serde_json::Value,
        ) -> Result<T, String> {
            // Events with only optional fields may omit `data` entirely
            let data = if data.is_null() {
                serde_json::Value::Object(serde_json::Map::new())
            } else {
                data
            };
            serde_json::from_value(data).map_err(|e| format!("invalid {kind} data: {e}"))
        }

        let kind = match raw.kind.as_str() {
            "spawnProjectile" => FrameEventKind::SpawnProjectile(payload(&raw.kind, raw.data)?),
            "playSfx" => FrameEventKind::PlaySfx(payload(&raw.kind, raw.data)?),
            "emitFx" => FrameEventKind::EmitFx(payload(&raw.kind, raw.data)?),
            "dealDamage" => FrameEventKind::DealDamage(payload(&raw.kind, raw.data)?),
            "complete" => FrameEventKind::Complete,
            "cameraShake" => FrameEventKind::CameraShake(payload(&raw.kind, raw.data)?),
            other => return Err(format!("unknown frame event type: {other}")),
        };

        Ok(Self {
            frame: raw.frame,
            kind,
        })
    }
}

/// A frame event queued during a tick, consumed before the tick ends
#[derive(Debug, Clone, PartialEq)]
pub struct AnimationEvent {
    pub entity_id: EntityId,
    pub event: FrameEvent,
    /// Simulation time (ms) of the tick that crossed the frame
    pub timestamp: f64,
}

/// Message handed to the game-rule collaborator
///
/// Each variant carries the source entity and exactly the payload the frame
/// event declared; the engine itself never applies damage or plays audio.
#[derive(Debug, Clone, PartialEq)]
pub enum CombatEvent {
    PlaySfx {
        source: EntityId,
        sfx: SfxData,
    },
    CameraShake {
        source: EntityId,
        shake: CameraShakeData,
    },
    DealDamage {
        source: EntityId,
        damage: DamageData,
    },
    ProjectileSpawned {
        projectile: EntityId,
        owner: EntityId,
        position: Vector2,
    },
    /// A projectile reached a character; knockback is already mirrored by
    /// the projectile's facing
    ProjectileHit {
        projectile: EntityId,
        owner: EntityId,
        target: EntityId,
        position: Vector2,
        damage: f32,
        knockback: Vector2,
        hitstun: f32,
    },
    AnimationComplete {
        entity: EntityId,
        animation: AnimationId,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(json: &str) -> Result<FrameEvent, serde_json::Error> {
        serde_json::from_str(json)
    }

    #[test]
    fn test_parse_play_sfx() {
        let event = parse(r#"{ "frame": 1, "type": "playSfx", "data": { "sound": "aim" } }"#).unwrap();
        assert_eq!(event.frame, 1);
        assert_eq!(
            event.kind,
            FrameEventKind::PlaySfx(SfxData {
                sound: "aim".to_string()
            })
        );
    }

    #[test]
    fn test_parse_complete_without_data() {
        let event = parse(r#"{ "frame": 3, "type": "complete" }"#).unwrap();
        assert!(event.kind.is_complete());
    }

    #[test]
    fn test_parse_spawn_projectile_without_data() {
        let event = parse(r#"{ "frame": 3, "type": "spawnProjectile" }"#).unwrap();
        assert_eq!(
            event.kind,
            FrameEventKind::SpawnProjectile(SpawnProjectileData::default())
        );
    }

    #[test]
    fn test_parse_deal_damage() {
        let event = parse(
            r#"{ "frame": 2, "type": "dealDamage",
                 "data": { "amount": 10, "knockback": [40, -20], "hitstun": 250 } }"#,
        )
        .unwrap();
        let FrameEventKind::DealDamage(damage) = event.kind else {
            panic!("expected dealDamage");
        };
        assert_eq!(damage.amount, 10.0);
        assert_eq!(damage.knockback, Vector2::new(40.0, -20.0));
        assert_eq!(damage.hitstun, 250.0);
    }

    #[test]
    fn test_unknown_type_rejected() {
        let err = parse(r#"{ "frame": 1, "type": "explode" }"#).unwrap_err();
        assert!(err.to_string().contains("unknown frame event type"));
    }

    #[test]
    fn test_missing_payload_field_rejected() {
        assert!(parse(r#"{ "frame": 1, "type": "playSfx", "data": {} }"#).is_err());
    }

    #[test]
    fn test_type_names() {
        assert_eq!(FrameEventKind::Complete.type_name(), "complete");
        assert_eq!(
            FrameEventKind::CameraShake(CameraShakeData {
                intensity: 1.0,
                duration: 100.0
            })
            .type_name(),
            "cameraShake"
        );
    }
}
