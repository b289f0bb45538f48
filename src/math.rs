//! Pure hex geometry helpers extracted for testability.
//!
//! All functions in this module are free of Bevy ECS dependencies and operate
//! in *pixel space*: origin at the top-left of the map, x to the right and y
//! pointing down. [`pixel_to_world`] is the single conversion into Bevy's
//! y-up world space.

use bevy::prelude::Vec2;

use crate::map::{CoordinateSystem, HexSizing};

/// `√3`, the width/height ratio of a regular hexagon.
pub const SQRT_3: f32 = 1.732_050_8;

/// Maps a noise value from the standard `[-1, 1]` range into `[min, max]`.
///
/// Noise generators (e.g. `Fbm<Perlin>`) produce values centred around zero.
/// This linearly rescales to an arbitrary output range.
///
/// # Examples
/// ```
/// # use hex_tile_map::math::map_noise_to_range;
/// assert_eq!(map_noise_to_range(-1.0, 0.0, 10.0), 0.0);
/// assert_eq!(map_noise_to_range( 1.0, 0.0, 10.0), 10.0);
/// assert_eq!(map_noise_to_range( 0.0, 2.0, 6.0),  4.0);
/// ```
pub fn map_noise_to_range(noise_val: f64, min: f32, max: f32) -> f32 {
    min + ((noise_val as f32 + 1.0) / 2.0) * (max - min)
}

// ── Dimensions ──────────────────────────────────────────────────────

/// Pixel width of a regular hex with the given radius.
///
/// Flat-top hexes are `2·size` wide, pointy-top hexes `√3·size`.
pub fn hex_width(hex_size: f32, cs: CoordinateSystem) -> f32 {
    if cs.is_flat_top() {
        2.0 * hex_size
    } else {
        SQRT_3 * hex_size
    }
}

/// Pixel height of a regular hex with the given radius (dual of [`hex_width`]).
pub fn hex_height(hex_size: f32, cs: CoordinateSystem) -> f32 {
    if cs.is_flat_top() {
        SQRT_3 * hex_size
    } else {
        2.0 * hex_size
    }
}

/// Radius back-derived from an explicit pixel width; inverse of [`hex_width`].
pub fn hex_size_from_width(width: f32, cs: CoordinateSystem) -> f32 {
    if cs.is_flat_top() {
        width / 2.0
    } else {
        width / SQRT_3
    }
}

/// Bounding axis of the hex polygon: twice the polygon's x and y radii.
///
/// For [`HexSizing::Radius`] both components are `2·size`. For explicit
/// sizing the axis is stretched so the polygon spans exactly `width × height`.
pub fn hex_axis(sizing: HexSizing, cs: CoordinateSystem) -> Vec2 {
    match sizing {
        HexSizing::Radius(size) => Vec2::splat(size * 2.0),
        HexSizing::Explicit { width, height } => {
            if cs.is_flat_top() {
                Vec2::new(width, height * 2.0 / SQRT_3)
            } else {
                Vec2::new(width * 2.0 / SQRT_3, height)
            }
        }
    }
}

// ── Polygons ────────────────────────────────────────────────────────

/// The six corners of a hex centred on the local origin.
///
/// Radii are `axis / 2`. The first corner sits at 0° (flat-top) or 30°
/// (pointy-top); the rest follow in 60° steps, so the signed area of the
/// result is always positive.
pub fn hex_poly(axis: Vec2, cs: CoordinateSystem) -> [Vec2; 6] {
    let offset = if cs.is_flat_top() { 0.0 } else { 0.5 };
    let radii = axis / 2.0;
    std::array::from_fn(|i| {
        let angle = std::f32::consts::TAU / 6.0 * (i as f32 + offset);
        Vec2::new(radii.x * angle.cos(), radii.y * angle.sin())
    })
}

/// Shoelace signed area of a closed polygon.
pub fn signed_area(poly: &[Vec2]) -> f32 {
    let n = poly.len();
    (0..n)
        .map(|i| {
            let a = poly[i];
            let b = poly[(i + 1) % n];
            a.x * b.y - b.x * a.y
        })
        .sum::<f32>()
        / 2.0
}

/// Even-odd point-in-polygon test.
///
/// Points exactly on an edge may fall either way.
pub fn polygon_contains(poly: &[Vec2], point: Vec2) -> bool {
    let Some(&last) = poly.last() else {
        return false;
    };
    let mut inside = false;
    let mut b = last;
    for &a in poly {
        if (a.y > point.y) != (b.y > point.y) {
            let cross_x = (b.x - a.x) * (point.y - a.y) / (b.y - a.y) + a.x;
            if point.x < cross_x {
                inside = !inside;
            }
        }
        b = a;
    }
    inside
}

// ── Cell placement ──────────────────────────────────────────────────

/// Pixel centre of the cell at `(column, row)` under the brick-offset layout.
///
/// Flat-top systems step `0.75·width` per column and shift every other
/// column by half a hex vertically; pointy-top systems step `0.75·height` per
/// row and shift every other row horizontally. `offset` is added last.
pub fn cell_center(
    column: u32,
    row: u32,
    cs: CoordinateSystem,
    hex_width: f32,
    hex_height: f32,
    offset: Vec2,
) -> Vec2 {
    let column_f = column as f32;
    let row_f = row as f32;
    let center = if cs.is_flat_top() {
        let inc_x = 0.75 * hex_width;
        let inc_y = hex_height;
        let parity = if cs.is_odd() { 0 } else { 1 };
        let x = column_f * inc_x + hex_width / 2.0;
        let y = if (column + parity) % 2 == 1 {
            row_f * inc_y + inc_y / 2.0
        } else {
            row_f * inc_y + inc_y
        };
        Vec2::new(x, y)
    } else {
        let inc_x = hex_width;
        let inc_y = 0.75 * hex_height;
        let parity = if cs.is_odd() { 1 } else { 0 };
        let y = row_f * inc_y + hex_height / 2.0;
        let x = if (row + parity) % 2 == 1 {
            column_f * inc_x + hex_width / 2.0
        } else {
            column_f * inc_x + hex_width
        };
        Vec2::new(x, y)
    };
    center + offset
}

/// Converts a pixel-space (y-down) point into Bevy world space (y-up).
pub fn pixel_to_world(p: Vec2) -> Vec2 {
    Vec2::new(p.x, -p.y)
}

#[cfg(test)]
mod tests {
    use super::*;
    use hexx::HexLayout;

    const EPS: f32 = 1e-3;

    fn close(a: Vec2, b: Vec2) -> bool {
        (a - b).length() < EPS
    }

    // ── map_noise_to_range ──────────────────────────────────────────

    #[test]
    fn noise_min_maps_to_range_min() {
        assert_eq!(map_noise_to_range(-1.0, 0.0, 10.0), 0.0);
    }

    #[test]
    fn noise_zero_maps_to_midpoint() {
        let result = map_noise_to_range(0.0, 2.0, 6.0);
        assert!((result - 4.0).abs() < 1e-6);
    }

    // ── dimensions ──────────────────────────────────────────────────

    #[test]
    fn flat_top_is_wider_than_tall() {
        let cs = CoordinateSystem::EvenQ;
        assert!((hex_width(40.0, cs) - 80.0).abs() < EPS);
        assert!((hex_height(40.0, cs) - 40.0 * SQRT_3).abs() < EPS);
    }

    #[test]
    fn pointy_top_swaps_dimensions() {
        let cs = CoordinateSystem::OddR;
        assert!((hex_width(40.0, cs) - 40.0 * SQRT_3).abs() < EPS);
        assert!((hex_height(40.0, cs) - 80.0).abs() < EPS);
    }

    #[test]
    fn size_from_width_roundtrips_for_every_system() {
        for cs in CoordinateSystem::ALL {
            for size in [1.0, 12.5, 40.0, 333.0] {
                let width = hex_width(size, cs);
                let back = hex_width(hex_size_from_width(width, cs), cs);
                assert!(
                    (back - width).abs() < 1e-3,
                    "{cs}: width {width} came back as {back}"
                );
            }
        }
    }

    #[test]
    fn explicit_axis_matches_radius_axis_for_regular_hexes() {
        for cs in CoordinateSystem::ALL {
            let size = 30.0;
            let explicit = HexSizing::Explicit {
                width: hex_width(size, cs),
                height: hex_height(size, cs),
            };
            let a = hex_axis(explicit, cs);
            let b = hex_axis(HexSizing::Radius(size), cs);
            assert!(close(a, b), "{cs}: {a:?} vs {b:?}");
        }
    }

    // ── hex_poly ────────────────────────────────────────────────────

    #[test]
    fn poly_has_six_corners_symmetric_about_origin() {
        for cs in CoordinateSystem::ALL {
            let poly = hex_poly(Vec2::new(80.0, 70.0), cs);
            assert_eq!(poly.len(), 6);
            for i in 0..3 {
                assert!(close(poly[i], -poly[i + 3]), "{cs}: corner {i} not mirrored");
            }
        }
    }

    #[test]
    fn first_corner_angle_depends_on_orientation() {
        let flat = hex_poly(Vec2::splat(2.0), CoordinateSystem::OddQ);
        assert!(close(flat[0], Vec2::new(1.0, 0.0)));

        let pointy = hex_poly(Vec2::splat(2.0), CoordinateSystem::EvenR);
        let expected = Vec2::new(30f32.to_radians().cos(), 30f32.to_radians().sin());
        assert!(close(pointy[0], expected));
    }

    #[test]
    fn poly_winding_is_consistent() {
        for cs in CoordinateSystem::ALL {
            assert!(signed_area(&hex_poly(Vec2::splat(50.0), cs)) > 0.0);
        }
    }

    #[test]
    fn poly_spans_explicit_dimensions() {
        for cs in CoordinateSystem::ALL {
            let axis = hex_axis(
                HexSizing::Explicit {
                    width: 65.0,
                    height: 65.0,
                },
                cs,
            );
            let poly = hex_poly(axis, cs);
            let (min, max) = poly
                .iter()
                .fold((Vec2::MAX, Vec2::MIN), |(lo, hi), p| (lo.min(*p), hi.max(*p)));
            assert!(close(max - min, Vec2::new(65.0, 65.0)), "{cs}: {:?}", max - min);
        }
    }

    #[test]
    fn poly_corners_agree_with_hexx_layout() {
        for cs in CoordinateSystem::ALL {
            let size = 10.0;
            let layout = HexLayout {
                orientation: cs.orientation(),
                scale: Vec2::splat(size),
                ..Default::default()
            };
            let corners = layout.center_aligned_hex_corners();
            let poly = hex_poly(Vec2::splat(size * 2.0), cs);
            for p in poly {
                assert!(
                    (0..6).any(|i| close(p, corners[i]) || close(p, corners[i] * Vec2::new(1.0, -1.0))),
                    "{cs}: corner {p:?} not found in hexx layout"
                );
            }
        }
    }

    // ── polygon_contains ────────────────────────────────────────────

    #[test]
    fn contains_center_but_not_outside() {
        let poly = hex_poly(Vec2::splat(40.0), CoordinateSystem::OddQ);
        assert!(polygon_contains(&poly, Vec2::ZERO));
        assert!(polygon_contains(&poly, Vec2::new(15.0, 5.0)));
        assert!(!polygon_contains(&poly, Vec2::new(25.0, 0.0)));
        assert!(!polygon_contains(&poly, Vec2::new(19.0, 19.0)));
    }

    // ── cell_center ─────────────────────────────────────────────────

    fn centers(cs: CoordinateSystem, size: f32, cols: u32, rows: u32) -> Vec<(u32, u32, Vec2)> {
        let w = hex_width(size, cs);
        let h = hex_height(size, cs);
        (0..rows)
            .flat_map(|r| (0..cols).map(move |c| (c, r)))
            .map(|(c, r)| (c, r, cell_center(c, r, cs, w, h, Vec2::ZERO)))
            .collect()
    }

    #[test]
    fn centers_are_injective() {
        for cs in CoordinateSystem::ALL {
            let all = centers(cs, 20.0, 8, 8);
            for (i, a) in all.iter().enumerate() {
                for b in &all[i + 1..] {
                    assert!(
                        (a.2 - b.2).length() > 1.0,
                        "{cs}: ({},{}) and ({},{}) share a center",
                        a.0,
                        a.1,
                        b.0,
                        b.1
                    );
                }
            }
        }
    }

    #[test]
    fn flat_top_column_step_alternates_vertical_shift() {
        for cs in [CoordinateSystem::OddQ, CoordinateSystem::EvenQ] {
            let (w, h) = (hex_width(20.0, cs), hex_height(20.0, cs));
            let mut shifts = Vec::new();
            for column in 0..4 {
                let a = cell_center(column, 2, cs, w, h, Vec2::ZERO);
                let b = cell_center(column + 1, 2, cs, w, h, Vec2::ZERO);
                let d = b - a;
                assert!((d.x - 0.75 * w).abs() < EPS);
                assert!((d.y.abs() - 0.5 * h).abs() < EPS);
                shifts.push(d.y.signum());
            }
            assert!(shifts.windows(2).all(|s| s[0] == -s[1]), "{cs}: {shifts:?}");
        }
    }

    #[test]
    fn pointy_top_row_step_alternates_horizontal_shift() {
        for cs in [CoordinateSystem::OddR, CoordinateSystem::EvenR] {
            let (w, h) = (hex_width(20.0, cs), hex_height(20.0, cs));
            let mut shifts = Vec::new();
            for row in 0..4 {
                let a = cell_center(3, row, cs, w, h, Vec2::ZERO);
                let b = cell_center(3, row + 1, cs, w, h, Vec2::ZERO);
                let d = b - a;
                assert!((d.y - 0.75 * h).abs() < EPS);
                assert!((d.x.abs() - 0.5 * w).abs() < EPS);
                shifts.push(d.x.signum());
            }
            assert!(shifts.windows(2).all(|s| s[0] == -s[1]), "{cs}: {shifts:?}");
        }
    }

    #[test]
    fn interior_cells_have_six_equidistant_neighbours() {
        let size = 20.0;
        let spacing = SQRT_3 * size;
        for cs in CoordinateSystem::ALL {
            let all = centers(cs, size, 5, 5);
            let mid = all.iter().find(|(c, r, _)| *c == 2 && *r == 2).map(|x| x.2);
            let Some(mid) = mid else {
                panic!("missing middle cell");
            };
            let near: Vec<f32> = all
                .iter()
                .map(|(_, _, p)| (*p - mid).length())
                .filter(|d| *d > 1.0 && *d < spacing * 1.2)
                .collect();
            assert_eq!(near.len(), 6, "{cs}: {near:?}");
            assert!(near.iter().all(|d| (d - spacing).abs() < EPS), "{cs}: {near:?}");
        }
    }

    #[test]
    fn odd_q_shifts_even_columns_down() {
        let cs = CoordinateSystem::OddQ;
        let (w, h) = (80.0, 70.0);
        assert!(close(cell_center(0, 0, cs, w, h, Vec2::ZERO), Vec2::new(40.0, 70.0)));
        assert!(close(cell_center(1, 0, cs, w, h, Vec2::ZERO), Vec2::new(100.0, 35.0)));
    }

    #[test]
    fn odd_r_shifts_odd_rows_right() {
        let cs = CoordinateSystem::OddR;
        let (w, h) = (70.0, 80.0);
        assert!(close(cell_center(0, 0, cs, w, h, Vec2::ZERO), Vec2::new(35.0, 40.0)));
        assert!(close(cell_center(0, 1, cs, w, h, Vec2::ZERO), Vec2::new(70.0, 100.0)));
    }

    #[test]
    fn offset_translates_every_center() {
        let cs = CoordinateSystem::EvenR;
        let offset = Vec2::new(12.0, -7.0);
        let a = cell_center(3, 4, cs, 50.0, 60.0, Vec2::ZERO);
        let b = cell_center(3, 4, cs, 50.0, 60.0, offset);
        assert!(close(b - a, offset));
    }

    #[test]
    fn world_conversion_flips_y() {
        assert_eq!(pixel_to_world(Vec2::new(3.0, 4.0)), Vec2::new(3.0, -4.0));
    }
}
