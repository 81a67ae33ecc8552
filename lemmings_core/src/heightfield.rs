use std::f32::consts::PI;

use bevy::{math::Vec2, prelude::*};
use rand::Rng;

/// Vertical change applied by a single dig or build call.
pub const TERRAIN_STEP: f32 = 2.0;

/// Columns flattened in front of the exit so every level stays passable.
pub const EXIT_CORRIDOR: usize = 200;

const BASE_DEPTH: f32 = 100.0;
const BASE_AMPLITUDE: f32 = 20.0;
const BASE_FREQUENCY: f32 = 0.02;
const HILL_CHANCE: f32 = 0.01;
const HILL_MIN_HEIGHT: f32 = 30.0;
const HILL_HEIGHT_RANGE: f32 = 50.0;
const HILL_MIN_WIDTH: f32 = 50.0;
const HILL_WIDTH_RANGE: f32 = 100.0;
const EXIT_INSET_X: f32 = 100.0;
const EXIT_INSET_Y: f32 = 150.0;

/// One-dimensional destructible terrain.
///
/// `heights[x]` is the screen-space y of the walkable surface at column `x`,
/// so a larger value means a lower surface. Digging increases the stored
/// value, building decreases it; both stay clamped to `[0, height]`.
#[derive(Resource, Debug, Clone, PartialEq)]
pub struct HeightField {
    pub width: u32,
    pub height: f32,
    pub exit: Vec2,
    heights: Vec<f32>,
}

impl HeightField {
    /// Terrain from explicit column heights. Values are clamped into range and
    /// the exit sits at the usual inset from the bottom-right corner.
    pub fn from_heights(height: f32, heights: Vec<f32>) -> Self {
        let width = heights.len() as u32;
        let heights = heights
            .into_iter()
            .map(|value| value.clamp(0.0, height))
            .collect();
        Self {
            width,
            height,
            exit: default_exit(width, height),
            heights,
        }
    }

    /// Flat terrain with every column at `surface`.
    pub fn flat(width: u32, height: f32, surface: f32) -> Self {
        Self::from_heights(height, vec![surface; width as usize])
    }

    /// Procedural terrain: a sine base curve, randomly placed hills and a flat
    /// corridor leading into the exit.
    ///
    /// All randomness comes from `rng`, so equal seeds give equal terrain.
    pub fn generate<R: Rng + ?Sized>(width: u32, height: f32, rng: &mut R) -> Self {
        let columns = width as usize;
        let base_line = height - BASE_DEPTH;
        let mut heights: Vec<f32> = (0..columns)
            .map(|x| base_line + (x as f32 * BASE_FREQUENCY).sin() * BASE_AMPLITUDE)
            .collect();

        let mut hills = 0u32;
        for x in 0..columns {
            if rng.gen::<f32>() >= HILL_CHANCE {
                continue;
            }
            hills += 1;
            let hill_height = HILL_MIN_HEIGHT + rng.gen::<f32>() * HILL_HEIGHT_RANGE;
            let hill_width = HILL_MIN_WIDTH + rng.gen::<f32>() * HILL_WIDTH_RANGE;
            let span = hill_width.ceil() as usize;
            for (i, slot) in heights.iter_mut().skip(x).take(span).enumerate() {
                let profile = base_line - hill_height * (i as f32 / hill_width * PI).sin();
                // Hills only ever add ground.
                *slot = slot.min(profile);
            }
        }

        let exit = default_exit(width, height);
        let corridor_end = exit.x.max(0.0) as usize;
        let corridor_start = corridor_end.saturating_sub(EXIT_CORRIDOR);
        for slot in heights
            .iter_mut()
            .take(corridor_end)
            .skip(corridor_start)
        {
            *slot = exit.y;
        }

        for slot in &mut heights {
            *slot = slot.clamp(0.0, height);
        }

        tracing::debug!(
            target: "lemmings::terrain",
            width,
            height,
            hills,
            exit_x = exit.x,
            exit_y = exit.y,
            "terrain.generated"
        );

        Self {
            width,
            height,
            exit,
            heights,
        }
    }

    /// Surface height at `floor(x)`. Anything outside `[0, width)` reads as the
    /// bottom of the world.
    #[inline]
    pub fn height_at(&self, x: f32) -> f32 {
        self.column(x)
            .and_then(|idx| self.heights.get(idx).copied())
            .unwrap_or(self.height)
    }

    /// Lower the surface under column `floor(x)` by one step.
    pub fn dig(&mut self, x: f32, _y_hint: f32) {
        let bound = self.height;
        if let Some(slot) = self.column(x).and_then(|idx| self.heights.get_mut(idx)) {
            *slot = (*slot + TERRAIN_STEP).min(bound);
        }
    }

    /// Raise the surface under column `floor(x)` by one step.
    pub fn build(&mut self, x: f32, _y_hint: f32) {
        if let Some(slot) = self.column(x).and_then(|idx| self.heights.get_mut(idx)) {
            *slot = (*slot - TERRAIN_STEP).max(0.0);
        }
    }

    pub fn heights(&self) -> &[f32] {
        &self.heights
    }

    fn column(&self, x: f32) -> Option<usize> {
        if !x.is_finite() || x < 0.0 {
            return None;
        }
        let idx = x.floor() as usize;
        (idx < self.width as usize).then_some(idx)
    }
}

fn default_exit(width: u32, height: f32) -> Vec2 {
    Vec2::new(width as f32 - EXIT_INSET_X, height - EXIT_INSET_Y)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::{rngs::mock::StepRng, SeedableRng};
    use rand_chacha::ChaCha8Rng;

    fn base_curve(x: usize, height: f32) -> f32 {
        height - BASE_DEPTH + (x as f32 * BASE_FREQUENCY).sin() * BASE_AMPLITUDE
    }

    #[test]
    fn out_of_range_reads_as_bottom() {
        let field = HeightField::flat(10, 600.0, 500.0);
        assert_eq!(field.height_at(-0.5), 600.0);
        assert_eq!(field.height_at(10.0), 600.0);
        assert_eq!(field.height_at(1e9), 600.0);
        assert_eq!(field.height_at(f32::NAN), 600.0);
        assert_eq!(field.height_at(9.99), 500.0);
    }

    #[test]
    fn fractional_positions_use_floor() {
        let field = HeightField::from_heights(100.0, vec![10.0, 20.0, 30.0]);
        assert_eq!(field.height_at(1.0), 20.0);
        assert_eq!(field.height_at(1.9), 20.0);
        assert_eq!(field.height_at(2.2), 30.0);
    }

    #[test]
    fn dig_then_build_restores_column() {
        let mut field = HeightField::flat(5, 600.0, 400.0);
        field.dig(2.5, 0.0);
        assert_eq!(field.height_at(2.0), 400.0 + TERRAIN_STEP);
        field.build(2.5, 0.0);
        assert_eq!(field.height_at(2.0), 400.0);
        assert_eq!(field.height_at(1.0), 400.0);
    }

    #[test]
    fn dig_and_build_clamp_at_bounds() {
        let mut field = HeightField::from_heights(600.0, vec![600.0, 0.0, 599.0]);
        field.dig(0.0, 0.0);
        assert_eq!(field.height_at(0.0), 600.0);
        field.build(1.0, 0.0);
        assert_eq!(field.height_at(1.0), 0.0);
        field.dig(2.0, 0.0);
        assert_eq!(field.height_at(2.0), 600.0);
        field.build(2.0, 0.0);
        // Clamping loses the sub-step remainder.
        assert!((field.height_at(2.0) - 599.0).abs() <= TERRAIN_STEP);
    }

    #[test]
    fn mutations_outside_the_field_are_ignored() {
        let mut field = HeightField::flat(4, 100.0, 50.0);
        let before = field.clone();
        field.dig(-1.0, 0.0);
        field.build(4.0, 0.0);
        field.dig(f32::INFINITY, 0.0);
        assert_eq!(field, before);
    }

    #[test]
    fn generation_is_reproducible_for_a_seed() {
        let a = HeightField::generate(800, 600.0, &mut ChaCha8Rng::seed_from_u64(7));
        let b = HeightField::generate(800, 600.0, &mut ChaCha8Rng::seed_from_u64(7));
        assert_eq!(a, b);
        assert_eq!(a.heights().len(), 800);
        assert!(a.heights().iter().all(|h| (0.0..=600.0).contains(h)));
    }

    #[test]
    fn corridor_in_front_of_exit_is_flat() {
        let field = HeightField::generate(800, 600.0, &mut ChaCha8Rng::seed_from_u64(99));
        assert_eq!(field.exit, Vec2::new(700.0, 450.0));
        for x in 500..700 {
            assert_eq!(field.heights()[x], 450.0, "column {x}");
        }
        assert_ne!(field.heights()[700], 450.0);
    }

    #[test]
    fn no_hills_leaves_the_base_curve() {
        // Every draw is just below 1.0, so no column rolls a hill.
        let mut rng = StepRng::new(u64::MAX, 0);
        let field = HeightField::generate(800, 600.0, &mut rng);
        for x in [0usize, 100, 250, 499, 700, 799] {
            assert!((field.heights()[x] - base_curve(x, 600.0)).abs() < 1e-4);
        }
    }

    #[test]
    fn hills_only_raise_the_surface() {
        // Every draw is 0.0: a minimum-size hill starts at every column.
        let mut rng = StepRng::new(0, 0);
        let field = HeightField::generate(800, 600.0, &mut rng);
        for x in 0..500 {
            assert!(field.heights()[x] <= base_curve(x, 600.0) + 1e-4);
        }
        // Column 100 sits under the crest of the hill rolled at column 75.
        assert!(field.heights()[100] <= 600.0 - BASE_DEPTH - HILL_MIN_HEIGHT + 1e-3);
    }

    #[test]
    fn narrow_fields_do_not_panic() {
        let field = HeightField::generate(50, 120.0, &mut ChaCha8Rng::seed_from_u64(1));
        assert_eq!(field.heights().len(), 50);
        assert!(field.heights().iter().all(|h| (0.0..=120.0).contains(h)));
    }
}
