//! Hex tile map: cell grid, visual factory, scene sync and pointer handling.
//!
//! [`HexMap`] is the model. Its operations only mark the scene dirty; the
//! systems installed by [`HexMapPlugin`] bring the entity tree in line with it
//! once per frame and translate picking events into [`HexHovered`],
//! [`HexOut`] and [`HexClicked`] messages.

mod cell;
mod coords;
mod entities;
mod error;
mod hex_map;
mod map_layout;
mod mesh;
mod picking;
mod systems;
mod terrain;
mod textures;
mod visual;

pub use cell::{Cell, CellData, CellGeometry, CellKey, CellSpec};
pub use coords::CoordinateSystem;
pub use entities::{
    AssetsLoaded, CellRef, HexClicked, HexHovered, HexOut, Highlighter, HitArea, MapScene,
};
pub use error::MapError;
pub use hex_map::{HexMap, HighlightChange};
pub use map_layout::MapLayout;
pub use terrain::{TerrainKind, TerrainType};
pub use textures::{TextureCache, TextureSource};
pub use visual::{
    CellBody, CellVisual, Label, Outline, SpriteSize, VisualContext, cell_visual, highlight_outline,
    tile_anchor_from_top,
};

use bevy::picking::PickingSystems;
use bevy::prelude::*;

/// How the hex dimensions are given.
#[derive(Clone, Copy, Debug, PartialEq, Reflect)]
pub enum HexSizing {
    /// Radius of a regular hex; width and height follow from the orientation.
    Radius(f32),
    /// Exact pixel width and height; the hex is stretched to fit.
    Explicit {
        /// Pixel width.
        width: f32,
        /// Pixel height.
        height: f32,
    },
}

/// Produces the coordinate label text of a cell.
pub type LabelFormatter = fn(&Cell) -> String;

/// `"column, row"`.
pub fn column_row_label(cell: &Cell) -> String {
    format!("{}, {}", cell.column(), cell.row())
}

/// Column with the row remapped onto a rotated axis, `3 - (row - ⌊-column/2⌋)`.
pub fn rotated_label(cell: &Cell) -> String {
    let column = i64::from(cell.column());
    let row = 3 - (i64::from(cell.row()) - (-column).div_euclid(2));
    format!("{column}, {row}")
}

/// Map configuration. Missing fields come from [`Default`].
#[derive(Clone, Debug)]
pub struct MapOptions {
    /// Offset-grid convention.
    pub coordinate_system: CoordinateSystem,
    /// Cells per row.
    pub map_width: u32,
    /// Number of rows.
    pub map_height: u32,
    /// Cell dimensions used for placement and hit-testing.
    pub sizing: HexSizing,
    /// Cell dimensions used for drawing; `None` draws at `sizing`.
    pub draw_sizing: Option<HexSizing>,
    /// Outline color.
    pub hex_line_color: Color,
    /// Outline width; `0` disables outlines.
    pub hex_line_width: f32,
    /// Attach a coordinate label to every cell.
    pub show_coordinates: bool,
    /// Label text of a cell.
    pub label_formatter: LabelFormatter,
    /// Terrain catalog; cells hold indices into it.
    pub terrain_types: Vec<TerrainType>,
    /// Texture catalog; terrain types hold indices into it.
    pub textures: Vec<TextureSource>,
    /// Extra sprite height below tile terrain.
    pub hex_bottom_pad: f32,
    /// Added to every cell centre.
    pub offset: Vec2,
    /// Snap cell positions to whole pixels.
    pub dont_blurry_images: bool,
    /// Masked and tile sprites keep the image's own size.
    pub size_based_on_texture: bool,
    /// Hover highlight color.
    pub highlight_color: Color,
    /// Hover highlight stroke width.
    pub highlight_width: f32,
}

impl Default for MapOptions {
    fn default() -> Self {
        Self {
            coordinate_system: CoordinateSystem::EvenQ,
            map_width: 10,
            map_height: 10,
            sizing: HexSizing::Radius(40.0),
            draw_sizing: None,
            hex_line_color: Color::srgb_u8(0x90, 0x90, 0x90),
            hex_line_width: 2.0,
            show_coordinates: false,
            label_formatter: column_row_label,
            terrain_types: vec![TerrainType::empty("empty")],
            textures: Vec::new(),
            hex_bottom_pad: 0.0,
            offset: Vec2::ZERO,
            dont_blurry_images: false,
            size_based_on_texture: false,
            highlight_color: Color::srgb_u8(0xff, 0x55, 0x21),
            highlight_width: 3.0,
        }
    }
}

impl MapOptions {
    /// Checks catalog references. Sizes are checked by [`MapLayout::resolve`].
    pub fn validate(&self) -> Result<(), MapError> {
        if self.terrain_types.is_empty() {
            return Err(MapError::NoTerrainTypes);
        }
        let available = self.textures.len();
        for terrain in &self.terrain_types {
            if let Some(index) = terrain.kind.texture_index()
                && index >= available
            {
                return Err(MapError::TextureOutOfRange { index, available });
            }
        }
        Ok(())
    }
}

/// Installs the map: model resource, scene sync, picking and hover observers.
///
/// Options that fail validation are logged and no [`HexMap`] is inserted;
/// the application may insert one later.
pub struct HexMapPlugin(pub MapOptions);

impl Plugin for HexMapPlugin {
    fn build(&self, app: &mut App) {
        app.register_type::<CoordinateSystem>()
            .register_type::<CellKey>()
            .register_type::<CellRef>()
            .register_type::<Highlighter>()
            .add_message::<HexClicked>()
            .add_message::<HexHovered>()
            .add_message::<HexOut>()
            .add_message::<AssetsLoaded>()
            .init_resource::<MapScene>()
            .add_systems(
                PreUpdate,
                picking::hex_picking_backend.in_set(PickingSystems::Backend),
            )
            .add_systems(
                PostUpdate,
                (
                    systems::load_textures,
                    systems::sync_scene,
                    systems::watch_texture_loads,
                )
                    .chain()
                    .run_if(resource_exists::<HexMap>)
                    .before(TransformSystems::Propagate),
            );

        match HexMap::new(self.0.clone()) {
            Ok(map) => {
                app.insert_resource(map);
            }
            Err(err) => error!("hex map options rejected: {err}"),
        }
    }
}
