use bevy::prelude::*;
use rand::Rng;

use super::{
    Cell, CellKey, CellSpec, MapError, MapLayout, MapOptions, TextureCache, TextureSource,
    VisualContext,
};

/// Scene work queued by model operations, consumed by the sync system.
#[derive(Clone, Debug, Default, PartialEq)]
pub(crate) enum SceneDirty {
    #[default]
    Clean,
    /// Only these cells need new visuals.
    Cells(Vec<CellKey>),
    /// Every cell visual is rebuilt inside the existing container.
    All,
    /// Container, highlight and cells are rebuilt from scratch.
    Rebuild,
}

impl SceneDirty {
    fn merge(&mut self, other: SceneDirty) {
        let merged = match (std::mem::take(self), other) {
            (Self::Rebuild, _) | (_, Self::Rebuild) => Self::Rebuild,
            (Self::All, _) | (_, Self::All) => Self::All,
            (Self::Cells(mut keys), Self::Cells(more)) => {
                for key in more {
                    if !keys.contains(&key) {
                        keys.push(key);
                    }
                }
                Self::Cells(keys)
            }
            (Self::Clean, other) | (other, Self::Clean) => other,
        };
        *self = merged;
    }
}

/// What the shared hover highlight should do after a pointer transition.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum HighlightChange {
    /// First hovered cell: move to this pixel position and show.
    Show(Vec2),
    /// Another cell is already hovered: move only.
    Move(Vec2),
    /// Last hovered cell left: hide.
    Hide,
    /// Other cells are still hovered: leave as is.
    Keep,
}

/// The map model: options, resolved layout, cell grid and texture catalog.
///
/// Rows are stored in generation order (even columns ascending, then odd
/// columns ascending), which is also the order cells are painted in.
#[derive(Resource)]
pub struct HexMap {
    options: MapOptions,
    layout: MapLayout,
    rows: Vec<Vec<Cell>>,
    textures: TextureCache,
    hover_count: u32,
    generation: u32,
    dirty: SceneDirty,
}

impl HexMap {
    /// Validates `options` and prepares an empty map.
    ///
    /// The scene is built on the next sync pass; cells appear once one of the
    /// `generate_*` operations runs.
    pub fn new(options: MapOptions) -> Result<Self, MapError> {
        options.validate()?;
        let layout = MapLayout::resolve(&options)?;
        let textures = TextureCache::from_sources(&options.textures);
        Ok(Self {
            options,
            layout,
            rows: Vec::new(),
            textures,
            hover_count: 0,
            generation: 0,
            dirty: SceneDirty::Rebuild,
        })
    }

    /// Current options.
    pub fn options(&self) -> &MapOptions {
        &self.options
    }

    /// Resolved dimensions.
    pub fn layout(&self) -> &MapLayout {
        &self.layout
    }

    /// Texture catalog.
    pub fn textures(&self) -> &TextureCache {
        &self.textures
    }

    /// Bumped by every [`HexMap::reset`]; messages carry it.
    pub fn generation(&self) -> u32 {
        self.generation
    }

    /// Number of cells the pointer is over.
    pub fn hover_count(&self) -> u32 {
        self.hover_count
    }

    /// Total number of cells.
    pub fn cell_count(&self) -> usize {
        self.rows.iter().map(Vec::len).sum()
    }

    /// All cells, row by row in generation order.
    pub fn cells(&self) -> impl Iterator<Item = &Cell> {
        self.rows.iter().flatten()
    }

    /// Cell at `key`.
    pub fn cell(&self, key: CellKey) -> Result<&Cell, MapError> {
        let slot = self.slot(key)?;
        Ok(&self.rows[key.row as usize][slot])
    }

    /// Borrowed inputs for [`super::cell_visual`].
    pub fn visual_context(&self) -> VisualContext<'_> {
        VisualContext {
            options: &self.options,
            layout: &self.layout,
            textures: &self.textures,
        }
    }

    // ── Generation ─────────────────────────────────────────────────

    /// Fills the grid with uniformly random terrain.
    pub fn generate_random_map<R: Rng>(&mut self, rng: &mut R) {
        let n = self.options.terrain_types.len();
        let rows = self.build_rows(|_, _| CellSpec::terrain(rng.gen_range(0..n)));
        self.install_rows(rows);
    }

    /// Fills the grid with terrain `0`.
    pub fn generate_blank_map(&mut self) {
        let rows = self.build_rows(|_, _| CellSpec::terrain(0));
        self.install_rows(rows);
    }

    /// Fills the grid from `cell_fn(column, row)`.
    ///
    /// Every returned terrain index is checked before anything is replaced,
    /// so on error the previous grid is kept.
    pub fn generate_procedural_map(
        &mut self,
        cell_fn: impl FnMut(u32, u32) -> CellSpec,
    ) -> Result<(), MapError> {
        let rows = self.build_rows(cell_fn);
        let available = self.options.terrain_types.len();
        if let Some(cell) = rows.iter().flatten().find(|c| c.terrain >= available) {
            return Err(MapError::TerrainOutOfRange {
                index: cell.terrain,
                available,
            });
        }
        self.install_rows(rows);
        Ok(())
    }

    /// Builds placed rows in generation order.
    fn build_rows(&self, mut cell_fn: impl FnMut(u32, u32) -> CellSpec) -> Vec<Vec<Cell>> {
        let width = self.options.map_width;
        let mut rows = Vec::with_capacity(self.options.map_height as usize);
        let mut paint_order = 0;
        for row in 0..self.options.map_height {
            let columns = (0..width).step_by(2).chain((1..width).step_by(2));
            let mut cells = Vec::with_capacity(width as usize);
            for column in columns {
                let spec = cell_fn(column, row);
                let mut cell = Cell::new(CellKey::new(row, column), spec.terrain, spec.data);
                cell.place(&self.layout, paint_order);
                paint_order += 1;
                cells.push(cell);
            }
            rows.push(cells);
        }
        rows
    }

    fn install_rows(&mut self, rows: Vec<Vec<Cell>>) {
        self.rows = rows;
        self.hover_count = 0;
        self.mark(SceneDirty::All);
    }

    // ── Mutation ───────────────────────────────────────────────────

    /// Changes one cell's terrain; only that cell is redrawn.
    pub fn set_cell_terrain_type(&mut self, key: CellKey, terrain: usize) -> Result<(), MapError> {
        let available = self.options.terrain_types.len();
        if terrain >= available {
            return Err(MapError::TerrainOutOfRange {
                index: terrain,
                available,
            });
        }
        self.cell_mut(key)?.terrain = terrain;
        self.mark(SceneDirty::Cells(vec![key]));
        Ok(())
    }

    /// Replaces texture slot `index` and redraws every cell.
    pub fn change_texture(&mut self, index: usize, source: TextureSource) -> Result<(), MapError> {
        self.textures.replace(index, source.clone())?;
        if let Some(slot) = self.options.textures.get_mut(index) {
            *slot = source;
        }
        self.mark(SceneDirty::All);
        Ok(())
    }

    /// Replaces the whole map with one built from `options`.
    ///
    /// Options are checked first; on error the current map is untouched.
    /// Otherwise cells, hover state and textures are discarded and the
    /// generation is bumped, so pending loads of the old map are ignored.
    pub fn reset(&mut self, options: MapOptions) -> Result<(), MapError> {
        let fresh = Self::new(options)?;
        let generation = self.generation.wrapping_add(1);
        *self = Self { generation, ..fresh };
        Ok(())
    }

    // ── Hover ──────────────────────────────────────────────────────

    /// Records the pointer entering `key`.
    ///
    /// Entering a cell that is already hovered does not count twice.
    pub fn hover_enter(&mut self, key: CellKey) -> Result<HighlightChange, MapError> {
        let was_hovered = self.hover_count;
        let round = self.options.dont_blurry_images;
        let cell = self.cell_mut(key)?;
        let center = if round { cell.center().round() } else { cell.center() };
        if !cell.is_over {
            cell.is_over = true;
            self.hover_count += 1;
        }
        Ok(if was_hovered == 0 {
            HighlightChange::Show(center)
        } else {
            HighlightChange::Move(center)
        })
    }

    /// Records the pointer leaving `key`. `None` if it was not hovered.
    pub fn hover_exit(&mut self, key: CellKey) -> Result<Option<HighlightChange>, MapError> {
        let cell = self.cell_mut(key)?;
        if !cell.is_over {
            return Ok(None);
        }
        cell.is_over = false;
        self.hover_count = self.hover_count.saturating_sub(1);
        Ok(Some(if self.hover_count == 0 {
            HighlightChange::Hide
        } else {
            HighlightChange::Keep
        }))
    }

    // ── Crate internals ────────────────────────────────────────────

    /// Drops every hover; returns the cells that were hovered.
    pub(crate) fn clear_hover(&mut self) -> Vec<CellKey> {
        let mut cleared = Vec::new();
        for cell in self.rows.iter_mut().flatten() {
            if cell.is_over {
                cell.is_over = false;
                cleared.push(cell.key());
            }
        }
        self.hover_count = 0;
        cleared
    }

    pub(crate) fn textures_mut(&mut self) -> &mut TextureCache {
        &mut self.textures
    }

    pub(crate) fn mark(&mut self, dirty: SceneDirty) {
        self.dirty.merge(dirty);
    }

    pub(crate) fn take_dirty(&mut self) -> SceneDirty {
        std::mem::take(&mut self.dirty)
    }

    fn slot(&self, key: CellKey) -> Result<usize, MapError> {
        let width = self.options.map_width;
        let row = self
            .rows
            .get(key.row as usize)
            .ok_or(MapError::CellNotFound(key))?;
        if key.column >= width {
            return Err(MapError::CellNotFound(key));
        }
        let slot = if key.column % 2 == 0 {
            key.column / 2
        } else {
            width.div_ceil(2) + key.column / 2
        } as usize;
        match row.get(slot) {
            Some(cell) if cell.key() == key => Ok(slot),
            _ => Err(MapError::CellNotFound(key)),
        }
    }

    fn cell_mut(&mut self, key: CellKey) -> Result<&mut Cell, MapError> {
        let slot = self.slot(key)?;
        Ok(&mut self.rows[key.row as usize][slot])
    }
}
