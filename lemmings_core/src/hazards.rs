use std::time::Duration;

use bevy::{math::Rect, prelude::*};
use serde::Deserialize;

use crate::animation::AnimationClock;

const WATER_FRAMES: u8 = 4;
const WATER_PERIOD: Duration = Duration::from_millis(100);
const TRAP_FRAMES: u8 = 2;
const TRAP_PERIOD: Duration = Duration::from_millis(200);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HazardKind {
    Water,
    Trap,
}

impl HazardKind {
    pub fn as_str(self) -> &'static str {
        match self {
            HazardKind::Water => "water",
            HazardKind::Trap => "trap",
        }
    }

    fn clock(self) -> AnimationClock {
        match self {
            HazardKind::Water => AnimationClock::new(WATER_FRAMES, WATER_PERIOD),
            HazardKind::Trap => AnimationClock::new(TRAP_FRAMES, TRAP_PERIOD),
        }
    }
}

/// Hazard placement as it appears in configuration.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
pub struct HazardSpec {
    pub kind: HazardKind,
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

/// A lethal rectangle. Hazards never act on agents; agents poll them.
#[derive(Debug, Clone, PartialEq)]
pub struct Hazard {
    pub kind: HazardKind,
    pub bounds: Rect,
    animation: AnimationClock,
}

impl Hazard {
    pub fn new(kind: HazardKind, x: f32, y: f32, width: f32, height: f32) -> Self {
        Self {
            kind,
            bounds: Rect::new(x, y, x + width, y + height),
            animation: kind.clock(),
        }
    }

    pub fn water(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self::new(HazardKind::Water, x, y, width, height)
    }

    pub fn trap(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self::new(HazardKind::Trap, x, y, width, height)
    }

    pub fn update(&mut self, dt: Duration) {
        self.animation.advance(dt);
    }

    pub fn frame(&self) -> u8 {
        self.animation.frame()
    }

    pub fn intersects(&self, other: &Rect) -> bool {
        overlaps_strictly(&self.bounds, other)
    }
}

impl From<&HazardSpec> for Hazard {
    fn from(spec: &HazardSpec) -> Self {
        Hazard::new(spec.kind, spec.x, spec.y, spec.width, spec.height)
    }
}

/// All hazards of the active level, in configuration order.
#[derive(Resource, Debug, Clone, Default, PartialEq)]
pub struct HazardSet {
    hazards: Vec<Hazard>,
}

impl HazardSet {
    pub fn new(hazards: Vec<Hazard>) -> Self {
        Self { hazards }
    }

    pub fn from_specs(specs: &[HazardSpec]) -> Self {
        Self::new(specs.iter().map(Hazard::from).collect())
    }

    pub fn update(&mut self, dt: Duration) {
        for hazard in &mut self.hazards {
            hazard.update(dt);
        }
    }

    pub fn first_hit(&self, bounds: &Rect) -> Option<&Hazard> {
        self.hazards.iter().find(|hazard| hazard.intersects(bounds))
    }

    pub fn iter(&self) -> impl Iterator<Item = &Hazard> {
        self.hazards.iter()
    }

    pub fn len(&self) -> usize {
        self.hazards.len()
    }

    pub fn is_empty(&self) -> bool {
        self.hazards.is_empty()
    }
}

/// Overlap on both axes with positive area; shared edges do not count.
pub fn overlaps_strictly(a: &Rect, b: &Rect) -> bool {
    a.max.x > b.min.x && a.min.x < b.max.x && a.max.y > b.min.y && a.min.y < b.max.y
}

#[cfg(test)]
mod tests {
    use super::*;

    fn body(x: f32, y: f32) -> Rect {
        Rect::new(x, y, x + 20.0, y + 20.0)
    }

    #[test]
    fn overlapping_bodies_hit() {
        let water = Hazard::water(400.0, 400.0, 100.0, 50.0);
        assert!(water.intersects(&body(390.0, 390.0)));
        assert!(water.intersects(&body(480.0, 440.0)));
    }

    #[test]
    fn touching_edges_do_not_hit() {
        let trap = Hazard::trap(300.0, 300.0, 50.0, 20.0);
        assert!(!trap.intersects(&body(280.0, 300.0)));
        assert!(!trap.intersects(&body(350.0, 300.0)));
        assert!(!trap.intersects(&body(300.0, 280.0)));
        assert!(!trap.intersects(&body(300.0, 320.0)));
    }

    #[test]
    fn water_and_trap_animate_at_their_own_rates() {
        let mut set = HazardSet::new(vec![
            Hazard::water(0.0, 0.0, 10.0, 10.0),
            Hazard::trap(20.0, 0.0, 10.0, 10.0),
        ]);
        set.update(Duration::from_millis(150));
        let frames: Vec<u8> = set.iter().map(Hazard::frame).collect();
        assert_eq!(frames, vec![1, 0]);
        set.update(Duration::from_millis(150));
        let frames: Vec<u8> = set.iter().map(Hazard::frame).collect();
        assert_eq!(frames, vec![2, 1]);
    }

    #[test]
    fn empty_set_never_hits() {
        let set = HazardSet::default();
        assert!(set.first_hit(&body(0.0, 0.0)).is_none());
        assert!(set.is_empty());
    }

    #[test]
    fn first_hit_follows_configuration_order() {
        let set = HazardSet::from_specs(&[
            HazardSpec {
                kind: HazardKind::Trap,
                x: 0.0,
                y: 0.0,
                width: 50.0,
                height: 50.0,
            },
            HazardSpec {
                kind: HazardKind::Water,
                x: 0.0,
                y: 0.0,
                width: 50.0,
                height: 50.0,
            },
        ]);
        let hit = set.first_hit(&body(10.0, 10.0)).map(|h| h.kind);
        assert_eq!(hit, Some(HazardKind::Trap));
    }
}
