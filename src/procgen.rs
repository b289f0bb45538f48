//! Noise-driven terrain for [`HexMap::generate_procedural_map`].
//!
//! Samples an `Fbm<Perlin>` per cell, maps it to an elevation in `[0, 1]` and
//! picks a terrain by elevation band. Cells near the map edge can be forced to
//! a border terrain so land masses never touch the edge.
//!
//! [`HexMap::generate_procedural_map`]: crate::map::HexMap::generate_procedural_map

use bevy::prelude::*;
use noise::{Fbm, MultiFractal, NoiseFn, Perlin};

use crate::map::CellSpec;
use crate::math;

/// Elevation payload attached to every generated cell.
#[derive(Clone, Copy, Debug, PartialEq, Reflect)]
pub struct Elevation(pub f32);

/// Configuration of the noise terrain generator.
#[derive(Clone, Debug)]
pub struct NoiseTerrain {
    /// Seed for the elevation noise.
    pub seed: u32,
    /// Number of octaves.
    pub octaves: usize,
    /// Spatial scale divisor, in cells.
    pub scale: f64,
    /// `(upper elevation bound, terrain index)` pairs, ascending by bound.
    /// Elevations above the last bound use the last terrain.
    pub bands: Vec<(f32, usize)>,
    /// Terrain forced on the outer rings, if any.
    pub border: Option<usize>,
    /// Number of outer rings that get the border terrain.
    pub border_width: u32,
}

impl Default for NoiseTerrain {
    fn default() -> Self {
        Self {
            seed: 42,
            octaves: 4,
            scale: 8.0,
            bands: vec![(0.4, 0), (0.55, 1), (0.8, 2), (1.0, 3)],
            border: Some(0),
            border_width: 2,
        }
    }
}

impl NoiseTerrain {
    /// Cell function for a `width × height` map.
    ///
    /// Terrain indices come straight from `bands` and `border`; the map
    /// rejects out-of-range ones.
    pub fn cell_fn(&self, width: u32, height: u32) -> impl FnMut(u32, u32) -> CellSpec + '_ {
        let fbm: Fbm<Perlin> = Fbm::new(self.seed).set_octaves(self.octaves);
        move |column, row| {
            let elevation = self.elevation(&fbm, column, row);
            let on_border = self.border_width > 0
                && (column < self.border_width
                    || row < self.border_width
                    || column + self.border_width >= width
                    || row + self.border_width >= height);
            let terrain = match self.border {
                Some(border) if on_border => border,
                _ => self.band(elevation),
            };
            CellSpec::terrain(terrain).with_data(Elevation(elevation))
        }
    }

    fn elevation(&self, fbm: &Fbm<Perlin>, column: u32, row: u32) -> f32 {
        let n = fbm.get([column as f64 / self.scale, row as f64 / self.scale]);
        math::map_noise_to_range(n, 0.0, 1.0).clamp(0.0, 1.0)
    }

    fn band(&self, elevation: f32) -> usize {
        self.bands
            .iter()
            .find(|(bound, _)| elevation <= *bound)
            .or(self.bands.last())
            .map_or(0, |&(_, terrain)| terrain)
    }
}
