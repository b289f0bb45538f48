//! Pointer picking for hex cells and the hover/click observers.
//!
//! The backend tests the pointer against each cell's [`HitArea`] rather than
//! its drawn shape, so tiles that overhang their hex don't steal hovers from
//! the cell below.

use bevy::picking::backend::{HitData, PointerHits};
use bevy::picking::events::{Click, Out, Over, Pointer};
use bevy::picking::pointer::{PointerId, PointerLocation};
use bevy::prelude::*;

use super::entities::{CellRef, HexClicked, HexHovered, HexOut, Highlighter, HitArea, MapScene};
use super::systems::HIGHLIGHT_Z;
use super::{HexMap, HighlightChange};
use crate::math;

pub(super) type HighlightQuery<'w, 's> =
    Query<'w, 's, (&'static mut Transform, &'static mut Visibility), With<Highlighter>>;

/// Reports every cell whose hit polygon contains a pointer.
///
/// Each pointer is tested through the highest-order active 2D camera whose
/// viewport contains it; pointers outside every viewport report nothing.
pub fn hex_picking_backend(
    pointers: Query<(&PointerId, &PointerLocation)>,
    cameras: Query<(Entity, &Camera, &GlobalTransform), With<Camera2d>>,
    cells: Query<
        (
            Entity,
            &HitArea,
            &GlobalTransform,
            &InheritedVisibility,
            Option<&Pickable>,
        ),
        With<CellRef>,
    >,
    mut output: MessageWriter<PointerHits>,
) {
    let mut cameras: Vec<_> = cameras
        .iter()
        .filter(|(_, camera, _)| camera.is_active)
        .collect();
    cameras.sort_by_key(|(_, camera, _)| std::cmp::Reverse(camera.order));

    for (pointer, location) in &pointers {
        let Some(location) = location.location() else {
            continue;
        };
        let Some((camera_entity, camera, camera_transform, viewport_pos)) =
            cameras.iter().find_map(|&(entity, camera, transform)| {
                viewport_position(camera.logical_viewport_rect(), location.position)
                    .map(|pos| (entity, camera, transform, pos))
            })
        else {
            continue;
        };
        let Ok(world_pos) = camera.viewport_to_world_2d(camera_transform, viewport_pos) else {
            continue;
        };

        let picks: Vec<(Entity, HitData)> = cells
            .iter()
            .filter(|(_, _, _, visibility, pickable)| {
                visibility.get() && pickable.is_none_or(|p| p.is_hoverable)
            })
            .filter(|(_, area, transform, _, _)| hits(area, transform, world_pos))
            .map(|(entity, _, transform, _, _)| {
                let z = transform.translation().z;
                let depth = camera_transform.translation().z - z;
                let hit = HitData::new(camera_entity, depth, Some(world_pos.extend(z)), None);
                (entity, hit)
            })
            .collect();

        output.write(PointerHits::new(*pointer, picks, camera.order as f32));
    }
}

/// Pointer position relative to `viewport`, `None` when it falls outside.
fn viewport_position(viewport: Option<Rect>, position: Vec2) -> Option<Vec2> {
    let viewport = viewport?;
    viewport
        .contains(position)
        .then(|| position - viewport.min)
}

/// `true` when `world_pos` falls inside `area` placed by `transform`.
fn hits(area: &HitArea, transform: &GlobalTransform, world_pos: Vec2) -> bool {
    let local = transform
        .affine()
        .inverse()
        .transform_point3(world_pos.extend(transform.translation().z));
    math::polygon_contains(&area.0, local.truncate())
}

// ── Observers ──────────────────────────────────────────────────────

/// Pointer entered a cell: show or move the highlight, then notify.
pub fn on_hex_over(
    event: On<Pointer<Over>>,
    cells: Query<&CellRef>,
    map: Option<ResMut<HexMap>>,
    scene: Res<MapScene>,
    mut highlighter: HighlightQuery,
    mut hovered: MessageWriter<HexHovered>,
) {
    let Ok(&CellRef(cell)) = cells.get(event.event().event_target()) else {
        return;
    };
    let Some(mut map) = map else {
        return;
    };
    match map.hover_enter(cell) {
        Ok(change) => {
            apply_highlight(&scene, &mut highlighter, change);
            hovered.write(HexHovered {
                cell,
                generation: map.generation(),
            });
        }
        Err(err) => debug!("hover ignored: {err}"),
    }
}

/// Pointer left a cell: hide the highlight when nothing else is hovered.
pub fn on_hex_out(
    event: On<Pointer<Out>>,
    cells: Query<&CellRef>,
    map: Option<ResMut<HexMap>>,
    scene: Res<MapScene>,
    mut highlighter: HighlightQuery,
    mut out: MessageWriter<HexOut>,
) {
    let Ok(&CellRef(cell)) = cells.get(event.event().event_target()) else {
        return;
    };
    let Some(mut map) = map else {
        return;
    };
    match map.hover_exit(cell) {
        Ok(Some(change)) => {
            apply_highlight(&scene, &mut highlighter, change);
            out.write(HexOut {
                cell,
                generation: map.generation(),
            });
        }
        Ok(None) => {}
        Err(err) => debug!("hover exit ignored: {err}"),
    }
}

/// Cell clicked or tapped.
pub fn on_hex_click(
    event: On<Pointer<Click>>,
    cells: Query<&CellRef>,
    map: Option<Res<HexMap>>,
    mut clicked: MessageWriter<HexClicked>,
) {
    let Ok(&CellRef(cell)) = cells.get(event.event().event_target()) else {
        return;
    };
    let Some(map) = map else {
        return;
    };
    clicked.write(HexClicked {
        cell,
        generation: map.generation(),
    });
}

pub(super) fn apply_highlight(scene: &MapScene, highlighter: &mut HighlightQuery, change: HighlightChange) {
    let Some(entity) = scene.highlighter() else {
        return;
    };
    let Ok((mut transform, mut visibility)) = highlighter.get_mut(entity) else {
        return;
    };
    match change {
        HighlightChange::Show(pos) => {
            transform.translation = math::pixel_to_world(pos).extend(HIGHLIGHT_Z);
            *visibility = Visibility::Inherited;
        }
        HighlightChange::Move(pos) => {
            transform.translation = math::pixel_to_world(pos).extend(HIGHLIGHT_Z);
        }
        HighlightChange::Hide => *visibility = Visibility::Hidden,
        HighlightChange::Keep => {}
    }
}
