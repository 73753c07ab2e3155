//! Segment vs AABB (slab test).

use bevy::prelude::*;

/// Параметр t ∈ [0, 1] точки входа отрезка p0→p1 в AABB.
/// Если p0 внутри box'а: Some(0.0). Нет пересечения: None.
pub fn segment_aabb_enter_t(p0: Vec3, p1: Vec3, min: Vec3, max: Vec3) -> Option<f32> {
    let d = p1 - p0;
    let mut tmin = 0.0f32;
    let mut tmax = 1.0f32;
    for axis in 0..3 {
        let start = p0[axis];
        let dir = d[axis];
        if dir.abs() < 1e-6 {
            // Параллельно slab'у: либо всегда внутри, либо мимо
            if start < min[axis] || start > max[axis] {
                return None;
            }
            continue;
        }
        let inv = 1.0 / dir;
        let mut t0 = (min[axis] - start) * inv;
        let mut t1 = (max[axis] - start) * inv;
        if t0 > t1 {
            std::mem::swap(&mut t0, &mut t1);
        }
        tmin = tmin.max(t0);
        tmax = tmax.min(t1);
        if tmin > tmax {
            return None;
        }
    }
    Some(tmin)
}
