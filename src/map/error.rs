use thiserror::Error;

use super::CellKey;

/// Errors raised while configuring, mutating or rendering a [`super::HexMap`].
#[derive(Debug, Error, Clone, PartialEq)]
pub enum MapError {
    /// Hex radius, width or height is zero, negative or not finite.
    #[error("degenerate hex size: {what} = {value}")]
    DegenerateHexSize {
        /// Which sizing parameter was rejected.
        what: &'static str,
        /// The rejected value.
        value: f32,
    },

    /// The terrain catalog is empty, so no cell could be rendered.
    #[error("terrain catalog is empty")]
    NoTerrainTypes,

    /// A cell references a terrain type past the end of the catalog.
    #[error("terrain index {index} out of range ({available} terrain types)")]
    TerrainOutOfRange {
        /// Requested terrain index.
        index: usize,
        /// Length of the terrain catalog.
        available: usize,
    },

    /// A terrain type or texture operation references a missing texture slot.
    #[error("texture index {index} out of range ({available} textures)")]
    TextureOutOfRange {
        /// Requested texture index.
        index: usize,
        /// Length of the texture catalog.
        available: usize,
    },

    /// A texture slot exists but has no usable image handle.
    #[error("texture {index} is not available")]
    TextureNotReady {
        /// Texture slot index.
        index: usize,
    },

    /// A texture could not be loaded.
    #[error("texture {index} failed to load: {reason}")]
    TextureLoad {
        /// Texture slot index.
        index: usize,
        /// Loader message.
        reason: String,
    },

    /// Coordinate system index or name not in the table.
    #[error("unknown coordinate system: {0}")]
    UnknownCoordinateSystem(String),

    /// No cell exists at the given position.
    #[error("no cell at column {}, row {}", .0.column, .0.row)]
    CellNotFound(CellKey),

    /// A cell was drawn before its geometry was computed.
    #[error("cell at column {}, row {} has no geometry yet", .0.column, .0.row)]
    GeometryNotComputed(CellKey),
}
