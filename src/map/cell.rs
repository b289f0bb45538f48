use std::any::Any;
use std::fmt;
use std::sync::Arc;

use bevy::prelude::*;

use super::MapLayout;

/// Grid position of a cell. Fixed for the cell's lifetime.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Reflect)]
pub struct CellKey {
    /// Row index, `0..map_height`.
    pub row: u32,
    /// Column index, `0..map_width`.
    pub column: u32,
}

impl CellKey {
    /// Key for `(row, column)`.
    pub const fn new(row: u32, column: u32) -> Self {
        Self { row, column }
    }
}

/// Opaque per-cell payload supplied by the application.
pub type CellData = Arc<dyn Any + Send + Sync>;

/// What a procedural generator returns for one position.
#[derive(Clone, Default)]
pub struct CellSpec {
    /// Terrain catalog index.
    pub terrain: usize,
    /// Optional payload stored on the cell.
    pub data: Option<CellData>,
}

impl CellSpec {
    /// Spec with a terrain index and no payload.
    pub fn terrain(terrain: usize) -> Self {
        Self {
            terrain,
            data: None,
        }
    }

    /// Attaches a payload.
    pub fn with_data<T: Any + Send + Sync>(mut self, data: T) -> Self {
        self.data = Some(Arc::new(data));
        self
    }
}

/// Pixel-space geometry of a placed cell.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CellGeometry {
    /// Hex centre (pixel space, y-down).
    pub center: Vec2,
    /// Corners used for drawing, relative to `center`.
    pub polygon: [Vec2; 6],
    /// Corners used for pointer hit-testing, relative to `center`.
    pub hit_polygon: [Vec2; 6],
}

/// One hex of the map.
#[derive(Clone)]
pub struct Cell {
    key: CellKey,
    pub(crate) terrain: usize,
    geometry: Option<CellGeometry>,
    data: Option<CellData>,
    pub(crate) is_over: bool,
    paint_order: usize,
}

impl Cell {
    /// Unplaced cell; geometry is computed by [`Cell::place`].
    pub fn new(key: CellKey, terrain: usize, data: Option<CellData>) -> Self {
        Self {
            key,
            terrain,
            geometry: None,
            data,
            is_over: false,
            paint_order: 0,
        }
    }

    /// Grid position.
    pub fn key(&self) -> CellKey {
        self.key
    }

    /// Row index.
    pub fn row(&self) -> u32 {
        self.key.row
    }

    /// Column index.
    pub fn column(&self) -> u32 {
        self.key.column
    }

    /// Terrain catalog index.
    pub fn terrain(&self) -> usize {
        self.terrain
    }

    /// Whether a pointer is currently over the cell.
    pub fn is_over(&self) -> bool {
        self.is_over
    }

    /// Position in generation order; later cells paint on top.
    pub fn paint_order(&self) -> usize {
        self.paint_order
    }

    /// Computed geometry, `None` until placed.
    pub fn geometry(&self) -> Option<&CellGeometry> {
        self.geometry.as_ref()
    }

    /// Hex centre in pixel space (origin until placed).
    pub fn center(&self) -> Vec2 {
        self.geometry.map_or(Vec2::ZERO, |g| g.center)
    }

    /// Raw payload.
    pub fn data(&self) -> Option<&CellData> {
        self.data.as_ref()
    }

    /// Payload downcast to `T`.
    pub fn data_as<T: Any>(&self) -> Option<&T> {
        self.data.as_deref().and_then(|d| d.downcast_ref::<T>())
    }

    /// Computes centre and polygons from the layout and records the paint order.
    pub fn place(&mut self, layout: &MapLayout, paint_order: usize) {
        self.geometry = Some(CellGeometry {
            center: layout.cell_center(self.key),
            polygon: layout.draw_polygon(),
            hit_polygon: layout.hit_polygon(),
        });
        self.paint_order = paint_order;
    }
}

impl fmt::Debug for Cell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Cell")
            .field("key", &self.key)
            .field("terrain", &self.terrain)
            .field("center", &self.center())
            .field("is_over", &self.is_over)
            .field("paint_order", &self.paint_order)
            .field("has_data", &self.data.is_some())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, PartialEq)]
    struct Loot(u32);

    #[test]
    fn payload_downcasts_to_its_own_type() {
        let spec = CellSpec::terrain(1).with_data(Loot(7));
        let cell = Cell::new(CellKey::new(0, 0), spec.terrain, spec.data);
        assert_eq!(cell.data_as::<Loot>(), Some(&Loot(7)));
        assert_eq!(cell.data_as::<String>(), None);
    }

    #[test]
    fn unplaced_cell_has_no_geometry() {
        let cell = Cell::new(CellKey::new(2, 3), 0, None);
        assert!(cell.geometry().is_none());
        assert_eq!(cell.center(), Vec2::ZERO);
        assert_eq!((cell.row(), cell.column()), (2, 3));
    }
}
