//! Aim resolution: куда стреляет комбатант.
//!
//! Read-only: никакого state, только source + target + tracer + RNG.
//! Вся случайность идёт через переданный RNG (DeterministicRng в системах),
//! поэтому при фиксированном seed результат воспроизводим.
//!
//! Координаты: метры, Y вверх.

use bevy::prelude::*;
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::f32::consts::{PI, TAU};

pub mod geom;
pub mod tracer;

#[cfg(test)]
mod aim_tests;

pub use geom::segment_aabb_enter_t;
pub use tracer::{ArenaTracer, Obstacle, ObstacleField, TraceBody, TraceHit};

/// Трасса по миру (world layer capability)
pub trait LineTracer {
    /// Первая блокирующая точка на отрезке start→end. `ignore` прозрачен
    fn line_trace(&self, start: Vec3, end: Vec3, ignore: Option<Entity>) -> Option<Vec3>;
}

/// Откуда целимся: глаза + взгляд
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AimSource {
    pub origin: Vec3,
    pub forward: Vec3,
}

impl AimSource {
    pub fn from_transform(transform: &Transform, eye_height: f32) -> Self {
        Self {
            origin: transform.translation + Vec3::Y * eye_height,
            forward: transform.forward().as_vec3(),
        }
    }

    pub fn forward_dir(&self) -> Vec3 {
        self.forward.try_normalize().unwrap_or(Vec3::NEG_Z)
    }
}

/// NPC aim tuning
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AimTuning {
    /// Дальность трассы (метры)
    pub aim_range: f32,
    /// Полуугол конуса разброса (градусы)
    pub variance_half_angle_deg: f32,
    /// Вертикальное смещение точки прицеливания относительно центра цели (метры)
    pub min_offset_y: f32,
    pub max_offset_y: f32,
}

impl Default for AimTuning {
    fn default() -> Self {
        Self {
            aim_range: 100.0,
            variance_half_angle_deg: 10.0,
            min_offset_y: -0.35,
            max_offset_y: -0.60,
        }
    }
}

impl AimTuning {
    /// (lo, hi) независимо от того, в каком порядке заданы min/max
    pub fn offset_range(&self) -> (f32, f32) {
        if self.min_offset_y <= self.max_offset_y {
            (self.min_offset_y, self.max_offset_y)
        } else {
            (self.max_offset_y, self.min_offset_y)
        }
    }
}

/// Равномерно распределённое направление внутри конуса вокруг `axis`
pub fn random_unit_vector_in_cone<R: Rng + ?Sized>(
    axis: Vec3,
    half_angle_rad: f32,
    rng: &mut R,
) -> Vec3 {
    let axis = axis.try_normalize().unwrap_or(Vec3::NEG_Z);
    let half_angle = half_angle_rad.clamp(0.0, PI);
    if half_angle <= f32::EPSILON {
        return axis;
    }

    // Равномерно по сферической шапке: cos(θ) ∈ [cos(half), 1]
    let cos_max = half_angle.cos();
    let z: f32 = rng.gen_range(cos_max..=1.0);
    let phi: f32 = rng.gen_range(0.0..TAU);
    let r = (1.0 - z * z).max(0.0).sqrt();

    let (u, v) = axis.any_orthonormal_pair();
    (axis * z + (u * phi.cos() + v * phi.sin()) * r)
        .try_normalize()
        .unwrap_or(axis)
}

/// Равномерно по всей сфере
pub fn random_unit_vector<R: Rng + ?Sized>(rng: &mut R) -> Vec3 {
    random_unit_vector_in_cone(Vec3::NEG_Z, PI, rng)
}

/// Точка выстрела NPC.
///
/// С целью: центр цели + случайный вертикальный bias, направление
/// возмущается в конусе. Без цели: forward источника + тот же конус.
/// Результат: первая блокирующая точка трассы или точка на max range.
pub fn resolve_fire_target<R: Rng + ?Sized>(
    source: &AimSource,
    target: Option<Vec3>,
    tuning: &AimTuning,
    tracer: &dyn LineTracer,
    ignore: Option<Entity>,
    rng: &mut R,
) -> Vec3 {
    let base_dir = match target {
        Some(target_pos) => {
            let (lo, hi) = tuning.offset_range();
            let offset = if hi - lo > f32::EPSILON {
                rng.gen_range(lo..=hi)
            } else {
                lo
            };
            let aim_point = target_pos + Vec3::Y * offset;
            (aim_point - source.origin)
                .try_normalize()
                .unwrap_or_else(|| source.forward_dir())
        }
        None => source.forward_dir(),
    };

    let dir = random_unit_vector_in_cone(
        base_dir,
        tuning.variance_half_angle_deg.to_radians(),
        rng,
    );
    let end = source.origin + dir * tuning.aim_range;

    tracer
        .line_trace(source.origin, end, ignore)
        .unwrap_or(end)
}

/// Точка выстрела игрока: прямо по взгляду, без разброса
pub fn resolve_pilot_target(
    source: &AimSource,
    max_aim_distance: f32,
    tracer: &dyn LineTracer,
    ignore: Option<Entity>,
) -> Vec3 {
    let end = source.origin + source.forward_dir() * max_aim_distance;
    tracer
        .line_trace(source.origin, end, ignore)
        .unwrap_or(end)
}
