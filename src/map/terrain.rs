use bevy::prelude::*;

/// How cells of a terrain type are drawn.
#[derive(Clone, Debug, PartialEq, Reflect)]
pub enum TerrainKind {
    /// Nothing but the outline.
    Empty,
    /// Texture clipped to the hex shape.
    Textured {
        /// Index into [`super::MapOptions::textures`].
        texture: usize,
    },
    /// Free-standing sprite that may overhang below the hex
    /// (see [`super::MapOptions::hex_bottom_pad`]).
    Tile {
        /// Index into [`super::MapOptions::textures`].
        texture: usize,
    },
    /// Solid fill.
    FlatColor {
        /// Fill color.
        color: Color,
    },
}

impl TerrainKind {
    /// Solid white fill, used when a flat terrain has no color of its own.
    pub fn flat_default() -> Self {
        Self::FlatColor {
            color: Color::WHITE,
        }
    }

    /// Texture slot this kind draws from, if any.
    pub fn texture_index(&self) -> Option<usize> {
        match self {
            Self::Textured { texture } | Self::Tile { texture } => Some(*texture),
            Self::Empty | Self::FlatColor { .. } => None,
        }
    }
}

/// One entry of the terrain catalog. Cells reference these by index.
#[derive(Clone, Debug, PartialEq, Reflect)]
pub struct TerrainType {
    /// Display name.
    pub name: String,
    /// Visual strategy.
    pub kind: TerrainKind,
    /// Movement modifier carried for game code; the map never reads it.
    pub move_mod: Option<f32>,
}

impl TerrainType {
    /// Outline-only terrain.
    pub fn empty(name: impl Into<String>) -> Self {
        Self::new(name, TerrainKind::Empty)
    }

    /// Solid color terrain.
    pub fn flat(name: impl Into<String>, color: impl Into<Color>) -> Self {
        Self::new(
            name,
            TerrainKind::FlatColor {
                color: color.into(),
            },
        )
    }

    /// Hex-masked texture terrain.
    pub fn textured(name: impl Into<String>, texture: usize) -> Self {
        Self::new(name, TerrainKind::Textured { texture })
    }

    /// Free-standing tile sprite terrain.
    pub fn tile(name: impl Into<String>, texture: usize) -> Self {
        Self::new(name, TerrainKind::Tile { texture })
    }

    /// Attaches an inert movement modifier.
    pub fn with_move_mod(mut self, move_mod: f32) -> Self {
        self.move_mod = Some(move_mod);
        self
    }

    fn new(name: impl Into<String>, kind: TerrainKind) -> Self {
        Self {
            name: name.into(),
            kind,
            move_mod: None,
        }
    }
}
