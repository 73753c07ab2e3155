//! Projectile systems: spawn → sweep → hit → damage request.

use bevy::prelude::*;

use crate::aim::{ArenaTracer, ObstacleField};
use crate::combat::events::{DamageRequest, ProjectileHit, ProjectileSpawned};
use crate::combat::projectile::Projectile;
use crate::components::{BodyControl, HitBox};
use crate::config::ArenaConfig;
use crate::logger;

pub fn spawn_projectiles(
    mut spawned: EventReader<ProjectileSpawned>,
    config: Res<ArenaConfig>,
    mut commands: Commands,
) {
    for event in spawned.read() {
        commands.spawn((
            Projectile::new(
                event.shooter,
                event.instigator,
                event.direction,
                event.speed,
                event.damage,
                config.projectile_lifetime_secs,
            ),
            Transform::from_translation(event.origin),
        ));
    }
}

/// Sweep отрезка за тик против hit box'ов и препятствий; первое попадание гасит снаряд
pub fn advance_projectiles(
    mut projectiles: Query<(Entity, &mut Transform, &mut Projectile)>,
    bodies: Query<(Entity, &Transform, &HitBox, &BodyControl), Without<Projectile>>,
    obstacles: Res<ObstacleField>,
    time: Res<Time>,
    mut hits: EventWriter<ProjectileHit>,
    mut commands: Commands,
) {
    let dt = time.delta_secs();
    if projectiles.is_empty() {
        return;
    }

    let mut tracer = ArenaTracer::new(&obstacles);
    for (entity, transform, hit_box, control) in bodies.iter() {
        if control.blocks_traces() {
            tracer.push_body(entity, transform.translation, hit_box.half_extents);
        }
    }

    for (entity, mut transform, mut projectile) in projectiles.iter_mut() {
        let start = transform.translation;
        let end = start + projectile.velocity * dt;

        if let Some(hit) = tracer.trace(start, end, Some(projectile.shooter)) {
            if let Some(target) = hit.body {
                hits.write(ProjectileHit {
                    shooter: projectile.shooter,
                    instigator: projectile.instigator,
                    target,
                    damage: projectile.damage,
                });
            }
            commands.entity(entity).despawn();
            continue;
        }

        transform.translation = end;
        if projectile.lifetime.tick(time.delta()).finished() {
            commands.entity(entity).despawn();
        }
    }
}

/// Hit → DamageRequest. Попадание в себя игнорируется
pub fn convert_projectile_hits(
    mut hits: EventReader<ProjectileHit>,
    mut damage: EventWriter<DamageRequest>,
) {
    for hit in hits.read() {
        if hit.target == hit.shooter {
            logger::log(&format!("💥 {:?} hit itself, ignored", hit.shooter));
            continue;
        }
        damage.write(DamageRequest {
            target: hit.target,
            amount: hit.damage,
            instigator: hit.instigator,
        });
    }
}
