use bevy::prelude::*;

use super::{CellKey, CoordinateSystem, HexSizing, MapError, MapOptions};
use crate::math;

/// Pixel dimensions resolved from [`MapOptions`].
///
/// Two axes are kept apart: `hex_axis` drives pointer hit-testing,
/// `hex_draw_axis` drives drawing. They only differ when
/// [`MapOptions::draw_sizing`] is set.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct MapLayout {
    coordinate_system: CoordinateSystem,
    hex_size: f32,
    hex_width: f32,
    hex_height: f32,
    draw_width: f32,
    draw_height: f32,
    aspect_ratio: f32,
    hex_axis: Vec2,
    hex_draw_axis: Vec2,
    offset: Vec2,
}

impl MapLayout {
    /// Resolves dimensions for the options' coordinate system and sizing mode.
    pub fn resolve(options: &MapOptions) -> Result<Self, MapError> {
        let cs = options.coordinate_system;
        let (hex_size, hex_width, hex_height) = dimensions(options.sizing, cs)?;
        let draw_sizing = options.draw_sizing.unwrap_or(options.sizing);
        let (_, draw_width, draw_height) = dimensions(draw_sizing, cs)?;
        let hex_axis = math::hex_axis(options.sizing, cs);

        Ok(Self {
            coordinate_system: cs,
            hex_size,
            hex_width,
            hex_height,
            draw_width,
            draw_height,
            aspect_ratio: hex_axis.y / hex_axis.x,
            hex_axis,
            hex_draw_axis: math::hex_axis(draw_sizing, cs),
            offset: options.offset,
        })
    }

    /// Coordinate convention in use.
    pub fn coordinate_system(&self) -> CoordinateSystem {
        self.coordinate_system
    }

    /// Hex radius (back-derived for explicit sizing).
    pub fn hex_size(&self) -> f32 {
        self.hex_size
    }

    /// Pixel width of one hex; horizontal spacing is derived from it.
    pub fn hex_width(&self) -> f32 {
        self.hex_width
    }

    /// Pixel height of one hex; vertical spacing is derived from it.
    pub fn hex_height(&self) -> f32 {
        self.hex_height
    }

    /// Width the visuals are drawn at.
    pub fn draw_width(&self) -> f32 {
        self.draw_width
    }

    /// Height the visuals are drawn at.
    pub fn draw_height(&self) -> f32 {
        self.draw_height
    }

    /// Vertical stretch relative to a regular hex; `1.0` when undistorted.
    pub fn aspect_ratio(&self) -> f32 {
        self.aspect_ratio
    }

    /// Axis of the hit-test polygon.
    pub fn hex_axis(&self) -> Vec2 {
        self.hex_axis
    }

    /// Axis of the drawn polygon.
    pub fn hex_draw_axis(&self) -> Vec2 {
        self.hex_draw_axis
    }

    /// Pixel centre of the cell at `key`.
    pub fn cell_center(&self, key: CellKey) -> Vec2 {
        math::cell_center(
            key.column,
            key.row,
            self.coordinate_system,
            self.hex_width,
            self.hex_height,
            self.offset,
        )
    }

    /// Local polygon used for hit-testing.
    pub fn hit_polygon(&self) -> [Vec2; 6] {
        math::hex_poly(self.hex_axis, self.coordinate_system)
    }

    /// Local polygon used for drawing.
    pub fn draw_polygon(&self) -> [Vec2; 6] {
        math::hex_poly(self.hex_draw_axis, self.coordinate_system)
    }
}

/// `(hex_size, width, height)` for a sizing mode.
fn dimensions(sizing: HexSizing, cs: CoordinateSystem) -> Result<(f32, f32, f32), MapError> {
    match sizing {
        HexSizing::Radius(size) => {
            check_positive("hex_size", size)?;
            Ok((size, math::hex_width(size, cs), math::hex_height(size, cs)))
        }
        HexSizing::Explicit { width, height } => {
            check_positive("hex_width", width)?;
            check_positive("hex_height", height)?;
            Ok((math::hex_size_from_width(width, cs), width, height))
        }
    }
}

fn check_positive(what: &'static str, value: f32) -> Result<(), MapError> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(MapError::DegenerateHexSize { what, value })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn options(cs: CoordinateSystem, sizing: HexSizing) -> MapOptions {
        MapOptions {
            coordinate_system: cs,
            sizing,
            ..default()
        }
    }

    #[test]
    fn radius_sizing_derives_dimensions() {
        let layout = MapLayout::resolve(&options(CoordinateSystem::OddQ, HexSizing::Radius(40.0)));
        let Ok(layout) = layout else {
            panic!("valid sizing rejected: {layout:?}");
        };
        assert_eq!(layout.hex_width(), 80.0);
        assert!((layout.hex_height() - 40.0 * math::SQRT_3).abs() < 1e-3);
        assert_eq!(layout.hex_axis(), Vec2::splat(80.0));
        assert_eq!(layout.aspect_ratio(), 1.0);
    }

    #[test]
    fn explicit_sizing_back_derives_radius() {
        for cs in CoordinateSystem::ALL {
            let layout = MapLayout::resolve(&options(
                cs,
                HexSizing::Explicit {
                    width: 65.0,
                    height: 65.0,
                },
            ))
            .expect("valid sizing");
            assert_eq!(layout.hex_width(), 65.0);
            assert_eq!(layout.hex_height(), 65.0);
            let regenerated = math::hex_width(layout.hex_size(), cs);
            assert!((regenerated - 65.0).abs() < 1e-3, "{cs}: {regenerated}");
        }
    }

    #[test]
    fn both_sizing_paths_agree_for_regular_hexes() {
        for cs in CoordinateSystem::ALL {
            let by_radius =
                MapLayout::resolve(&options(cs, HexSizing::Radius(25.0))).expect("radius");
            let by_size = MapLayout::resolve(&options(
                cs,
                HexSizing::Explicit {
                    width: by_radius.hex_width(),
                    height: by_radius.hex_height(),
                },
            ))
            .expect("explicit");
            assert!((by_radius.hex_size() - by_size.hex_size()).abs() < 1e-3);
            assert!((by_radius.aspect_ratio() - by_size.aspect_ratio()).abs() < 1e-4);
            assert!((by_radius.hex_axis() - by_size.hex_axis()).length() < 1e-3);
        }
    }

    #[test]
    fn degenerate_sizes_are_rejected() {
        for sizing in [
            HexSizing::Radius(0.0),
            HexSizing::Radius(-3.0),
            HexSizing::Radius(f32::NAN),
            HexSizing::Explicit {
                width: 10.0,
                height: 0.0,
            },
        ] {
            let result = MapLayout::resolve(&options(CoordinateSystem::EvenR, sizing));
            assert!(
                matches!(result, Err(MapError::DegenerateHexSize { .. })),
                "{sizing:?} accepted"
            );
        }
    }

    #[test]
    fn draw_axis_follows_draw_sizing() {
        let opts = MapOptions {
            sizing: HexSizing::Radius(40.0),
            draw_sizing: Some(HexSizing::Radius(36.0)),
            ..default()
        };
        let layout = MapLayout::resolve(&opts).expect("valid");
        assert_eq!(layout.hex_axis(), Vec2::splat(80.0));
        assert_eq!(layout.hex_draw_axis(), Vec2::splat(72.0));
        assert_eq!(layout.draw_width(), 72.0);
    }
}
