//! Projectile: authoritative прямолинейный снаряд.

use bevy::prelude::*;

#[derive(Component, Debug, Clone)]
pub struct Projectile {
    pub shooter: Entity,
    pub instigator: Option<Entity>,
    pub velocity: Vec3,
    pub damage: f32,
    pub lifetime: Timer,
}

impl Projectile {
    pub fn new(
        shooter: Entity,
        instigator: Option<Entity>,
        direction: Vec3,
        speed: f32,
        damage: f32,
        lifetime_secs: f32,
    ) -> Self {
        Self {
            shooter,
            instigator,
            velocity: direction.try_normalize().unwrap_or(Vec3::NEG_Z) * speed,
            damage,
            lifetime: Timer::from_seconds(lifetime_secs, TimerMode::Once),
        }
    }
}
