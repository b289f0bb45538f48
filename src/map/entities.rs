use bevy::platform::collections::HashMap;
use bevy::prelude::*;

use super::CellKey;

/// Links a cell entity back to its model cell.
#[derive(Component, Clone, Copy, Debug, PartialEq, Eq, Reflect)]
pub struct CellRef(pub CellKey);

/// Hit-test polygon in the entity's local (y-up) space.
#[derive(Component, Clone, Debug, PartialEq)]
pub struct HitArea(pub [Vec2; 6]);

/// Marker on the shared hover highlight.
#[derive(Component, Reflect)]
pub struct Highlighter;

/// Entity side-table of the spawned map.
///
/// `container` holds `hexes` (one child per cell) and the highlight. The
/// container is parented to `stage` when one is set.
#[derive(Resource, Default)]
pub struct MapScene {
    /// Parent for the map container; applied on the next full rebuild.
    pub stage: Option<Entity>,
    pub(crate) container: Option<Entity>,
    pub(crate) hexes: Option<Entity>,
    pub(crate) highlighter: Option<Entity>,
    pub(crate) visuals: HashMap<CellKey, Entity>,
}

impl MapScene {
    /// Root entity of the map.
    pub fn container(&self) -> Option<Entity> {
        self.container
    }

    /// Parent of all cell entities.
    pub fn hexes(&self) -> Option<Entity> {
        self.hexes
    }

    /// The hover highlight.
    pub fn highlighter(&self) -> Option<Entity> {
        self.highlighter
    }

    /// Entity currently drawing `key`.
    pub fn cell_entity(&self, key: CellKey) -> Option<Entity> {
        self.visuals.get(&key).copied()
    }
}

// ── Messages ───────────────────────────────────────────────────────

/// A cell was clicked or tapped.
#[derive(Message, Clone, Copy, Debug, PartialEq)]
pub struct HexClicked {
    /// Clicked cell.
    pub cell: CellKey,
    /// [`super::HexMap::generation`] at the time of the click.
    pub generation: u32,
}

/// The pointer entered a cell.
#[derive(Message, Clone, Copy, Debug, PartialEq)]
pub struct HexHovered {
    /// Entered cell.
    pub cell: CellKey,
    /// [`super::HexMap::generation`] at the time of the event.
    pub generation: u32,
}

/// The pointer left a cell, or the cell's entity was replaced under it.
///
/// A replaced cell is entered again by the next pointer move over it.
#[derive(Message, Clone, Copy, Debug, PartialEq)]
pub struct HexOut {
    /// Left cell.
    pub cell: CellKey,
    /// [`super::HexMap::generation`] at the time of the event.
    pub generation: u32,
}

/// Every texture of a map construction has settled.
///
/// Written once per [`super::HexMap::new`] / [`super::HexMap::reset`].
#[derive(Message, Clone, Debug, PartialEq)]
pub struct AssetsLoaded {
    /// Generation of the map the textures belong to.
    pub generation: u32,
    /// Texture slots that failed to load.
    pub failed: Vec<usize>,
}
