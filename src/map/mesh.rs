//! 2D meshes for hex bodies and outlines.
//!
//! Inputs are pixel-space polygons (y-down) relative to the cell centre;
//! outputs are world-space (y-up) meshes with counter-clockwise triangles.

use bevy::asset::RenderAssetUsages;
use bevy::mesh::Indices;
use bevy::prelude::*;
use bevy::render::render_resource::PrimitiveTopology;

use crate::math;

/// Filled polygon as a triangle fan around the local origin.
///
/// `uv` maps a pixel-space point to its texture coordinate.
pub fn fill_mesh(polygon: &[Vec2], uv: impl Fn(Vec2) -> Vec2) -> Mesh {
    let n = polygon.len() as u16;
    let mut positions = vec![[0.0, 0.0, 0.0]];
    let mut uvs = vec![uv(Vec2::ZERO).to_array()];
    for &p in polygon {
        positions.push(math::pixel_to_world(p).extend(0.0).to_array());
        uvs.push(uv(p).to_array());
    }

    let ccw = world_is_ccw(polygon);
    let mut indices = Vec::with_capacity(polygon.len() * 3);
    for i in 0..n {
        let a = 1 + i;
        let b = 1 + (i + 1) % n;
        if ccw {
            indices.extend([0, a, b]);
        } else {
            indices.extend([0, b, a]);
        }
    }

    build(positions, uvs, indices)
}

/// Texture coordinates of a sprite rectangle of `size` centred on the origin.
pub fn centered_rect_uv(size: Vec2) -> impl Fn(Vec2) -> Vec2 {
    move |p| p / size + Vec2::splat(0.5)
}

/// Closed stroke of `width` along `polygon`.
///
/// Each corner is pushed radially by `±width / 2`.
pub fn outline_mesh(polygon: &[Vec2], width: f32) -> Mesh {
    let n = polygon.len() as u16;
    let half = width / 2.0;
    let mut positions = Vec::with_capacity(polygon.len() * 2);
    let mut uvs = Vec::with_capacity(polygon.len() * 2);
    for (i, &p) in polygon.iter().enumerate() {
        let dir = p.normalize_or_zero();
        let u = i as f32 / polygon.len() as f32;
        positions.push(math::pixel_to_world(p - dir * half).extend(0.0).to_array());
        positions.push(math::pixel_to_world(p + dir * half).extend(0.0).to_array());
        uvs.push([u, 0.0]);
        uvs.push([u, 1.0]);
    }

    let ccw = world_is_ccw(polygon);
    let mut indices = Vec::with_capacity(polygon.len() * 6);
    for i in 0..n {
        let j = (i + 1) % n;
        let (inner_a, outer_a) = (2 * i, 2 * i + 1);
        let (inner_b, outer_b) = (2 * j, 2 * j + 1);
        if ccw {
            indices.extend([inner_a, outer_a, outer_b, inner_a, outer_b, inner_b]);
        } else {
            indices.extend([inner_a, outer_b, outer_a, inner_a, inner_b, outer_b]);
        }
    }

    build(positions, uvs, indices)
}

fn world_is_ccw(polygon: &[Vec2]) -> bool {
    let world: Vec<Vec2> = polygon.iter().map(|&p| math::pixel_to_world(p)).collect();
    math::signed_area(&world) > 0.0
}

fn build(positions: Vec<[f32; 3]>, uvs: Vec<[f32; 2]>, indices: Vec<u16>) -> Mesh {
    let normals = vec![[0.0, 0.0, 1.0]; positions.len()];
    Mesh::new(
        PrimitiveTopology::TriangleList,
        RenderAssetUsages::RENDER_WORLD,
    )
    .with_inserted_attribute(Mesh::ATTRIBUTE_POSITION, positions)
    .with_inserted_attribute(Mesh::ATTRIBUTE_NORMAL, normals)
    .with_inserted_attribute(Mesh::ATTRIBUTE_UV_0, uvs)
    .with_inserted_indices(Indices::U16(indices))
}
