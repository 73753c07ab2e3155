//! Line tracing по арене: статические препятствия + hit box'ы живых тел.

use bevy::prelude::*;

use super::geom::segment_aabb_enter_t;
use super::LineTracer;

/// Статический AABB (стена, укрытие)
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Obstacle {
    pub min: Vec3,
    pub max: Vec3,
}

/// Статическая геометрия арены
#[derive(Resource, Debug, Clone, Default)]
pub struct ObstacleField {
    obstacles: Vec<Obstacle>,
}

impl ObstacleField {
    pub fn add_box(&mut self, center: Vec3, half_extents: Vec3) {
        let half = half_extents.abs();
        self.obstacles.push(Obstacle {
            min: center - half,
            max: center + half,
        });
    }

    pub fn obstacles(&self) -> &[Obstacle] {
        &self.obstacles
    }

    pub fn clear(&mut self) {
        self.obstacles.clear();
    }
}

/// Hit box тела, участвующий в трассах
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TraceBody {
    pub entity: Entity,
    pub min: Vec3,
    pub max: Vec3,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TraceHit {
    /// Параметр вдоль отрезка [0, 1]
    pub t: f32,
    pub point: Vec3,
    /// None = препятствие
    pub body: Option<Entity>,
}

/// Tracer по снимку арены (строится на время одной системы)
pub struct ArenaTracer<'a> {
    obstacles: &'a ObstacleField,
    bodies: Vec<TraceBody>,
}

impl<'a> ArenaTracer<'a> {
    pub fn new(obstacles: &'a ObstacleField) -> Self {
        Self {
            obstacles,
            bodies: Vec::new(),
        }
    }

    pub fn with_body(mut self, entity: Entity, center: Vec3, half_extents: Vec3) -> Self {
        self.push_body(entity, center, half_extents);
        self
    }

    pub fn push_body(&mut self, entity: Entity, center: Vec3, half_extents: Vec3) {
        self.bodies.push(TraceBody {
            entity,
            min: center - half_extents,
            max: center + half_extents,
        });
    }

    /// Ближайшее пересечение отрезка (ignore пропускается)
    pub fn trace(&self, start: Vec3, end: Vec3, ignore: Option<Entity>) -> Option<TraceHit> {
        let mut best: Option<(f32, Option<Entity>)> = None;

        let mut consider = |t: f32, body: Option<Entity>| {
            if best.map_or(true, |(best_t, _)| t < best_t) {
                best = Some((t, body));
            }
        };

        for obstacle in self.obstacles.obstacles() {
            if let Some(t) = segment_aabb_enter_t(start, end, obstacle.min, obstacle.max) {
                consider(t, None);
            }
        }

        for body in &self.bodies {
            if Some(body.entity) == ignore {
                continue;
            }
            if let Some(t) = segment_aabb_enter_t(start, end, body.min, body.max) {
                consider(t, Some(body.entity));
            }
        }

        best.map(|(t, body)| TraceHit {
            t,
            point: start + (end - start) * t,
            body,
        })
    }
}

impl LineTracer for ArenaTracer<'_> {
    fn line_trace(&self, start: Vec3, end: Vec3, ignore: Option<Entity>) -> Option<Vec3> {
        self.trace(start, end, ignore).map(|hit| hit.point)
    }
}
