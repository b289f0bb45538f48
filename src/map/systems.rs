use bevy::asset::LoadState;
use bevy::prelude::*;
use bevy::sprite::Anchor;

use super::entities::{AssetsLoaded, CellRef, HexOut, Highlighter, HitArea, MapScene};
use super::hex_map::SceneDirty;
use super::visual::{
    CellBody, CellVisual, SpriteSize, cell_visual, highlight_outline, tile_anchor_from_top,
};
use super::{Cell, CellKey, HexMap, MapError, TextureSource, VisualContext, mesh, picking};
use crate::math;

/// Depth step between consecutive cells in paint order.
const CELL_Z_STEP: f32 = 0.01;
/// Outline above the body, below the next cell.
const OUTLINE_Z: f32 = 0.003;
const LABEL_Z: f32 = 0.006;
/// Highlight above every cell.
pub(super) const HIGHLIGHT_Z: f32 = 900.0;

/// Mesh and material stores used while spawning visuals.
struct VisualAssets<'a> {
    meshes: &'a mut Assets<Mesh>,
    materials: &'a mut Assets<ColorMaterial>,
    images: &'a Assets<Image>,
}

// ── Textures ───────────────────────────────────────────────────────

/// Turns every unresolved texture slot into an image handle.
///
/// Path sources go through the `AssetServer` and are tracked until they
/// settle; in-memory images and prepared handles are ready immediately.
pub fn load_textures(
    mut map: ResMut<HexMap>,
    asset_server: Option<Res<AssetServer>>,
    mut images: ResMut<Assets<Image>>,
) {
    let unresolved = map.textures().unresolved();
    for index in unresolved {
        let Some(source) = map.textures().source(index).cloned() else {
            continue;
        };
        let textures = map.textures_mut();
        match source {
            TextureSource::Path(path) => match asset_server.as_deref() {
                Some(server) => {
                    debug!("loading texture {index} from {path}");
                    textures.resolve(index, server.load(path), true);
                }
                None => {
                    let err = MapError::TextureLoad {
                        index,
                        reason: format!("no asset server to load {path}"),
                    };
                    error!("{err}");
                    textures.settle(index, true);
                }
            },
            TextureSource::Image(image) => textures.resolve(index, images.add(image), false),
            TextureSource::Handle(handle) => textures.resolve(index, handle, false),
        }
    }
}

/// Settles tracked loads and writes [`AssetsLoaded`] once nothing is in flight.
pub fn watch_texture_loads(
    mut map: ResMut<HexMap>,
    asset_server: Option<Res<AssetServer>>,
    mut loaded: MessageWriter<AssetsLoaded>,
) {
    if let Some(server) = asset_server.as_deref() {
        let mut settled = false;
        for index in map.textures().pending().to_vec() {
            let Ok(handle) = map.textures().handle(index) else {
                continue;
            };
            match server.get_load_state(handle.id()) {
                Some(LoadState::Loaded) => {
                    map.textures_mut().settle(index, false);
                    settled = true;
                }
                Some(LoadState::Failed(reason)) => {
                    let err = MapError::TextureLoad {
                        index,
                        reason: reason.to_string(),
                    };
                    error!("{err}");
                    map.textures_mut().settle(index, true);
                    settled = true;
                }
                _ => {}
            }
        }
        // Natural sprite sizes are only known once the image is in.
        if settled && map.options().size_based_on_texture {
            map.mark(SceneDirty::All);
        }
    }

    if map.bypass_change_detection().textures_mut().take_completion() {
        let failed = map.textures().failed().to_vec();
        let generation = map.generation();
        if failed.is_empty() {
            info!("map {generation}: all textures ready");
        } else {
            warn!("map {generation}: textures {failed:?} failed to load");
        }
        loaded.write(AssetsLoaded { generation, failed });
    }
}

// ── Scene sync ─────────────────────────────────────────────────────

/// Brings the entity tree in line with the queued [`SceneDirty`] work.
pub fn sync_scene(
    mut commands: Commands,
    mut map: ResMut<HexMap>,
    mut scene: ResMut<MapScene>,
    mut meshes: ResMut<Assets<Mesh>>,
    mut materials: ResMut<Assets<ColorMaterial>>,
    images: Res<Assets<Image>>,
    mut out: MessageWriter<HexOut>,
) {
    let mut dirty = map.bypass_change_detection().take_dirty();
    if dirty == SceneDirty::Clean {
        return;
    }
    if scene.hexes.is_none() {
        dirty = SceneDirty::Rebuild;
    }

    // Respawned entities never see `Pointer<Out>`; picking enters them afresh.
    let cleared = drop_hover(map.bypass_change_detection(), &dirty);
    let map = &*map;
    for &cell in &cleared {
        out.write(HexOut {
            cell,
            generation: map.generation(),
        });
    }
    if !cleared.is_empty()
        && map.hover_count() == 0
        && let Some(highlighter) = scene.highlighter
    {
        commands.entity(highlighter).insert(Visibility::Hidden);
    }

    let ctx = map.visual_context();
    let mut assets = VisualAssets {
        meshes: &mut meshes,
        materials: &mut materials,
        images: &images,
    };

    if dirty == SceneDirty::Rebuild {
        rebuild_container(&mut commands, &mut scene, &ctx, &mut assets, map.generation());
    }
    let Some(hexes) = scene.hexes else {
        return;
    };

    match dirty {
        SceneDirty::Clean => {}
        SceneDirty::Cells(keys) => {
            for key in keys {
                if let Some(old) = scene.visuals.remove(&key) {
                    commands.entity(old).try_despawn();
                }
                match map.cell(key) {
                    Ok(cell) => {
                        let entity = spawn_cell(&mut commands, &mut assets, hexes, cell, &ctx);
                        scene.visuals.insert(key, entity);
                    }
                    Err(err) => warn!("skipping redraw: {err}"),
                }
            }
        }
        SceneDirty::All | SceneDirty::Rebuild => {
            for (_, entity) in scene.visuals.drain() {
                commands.entity(entity).try_despawn();
            }
            if let Some(highlighter) = scene.highlighter {
                commands.entity(highlighter).insert(Visibility::Hidden);
            }
            for cell in map.cells() {
                let entity = spawn_cell(&mut commands, &mut assets, hexes, cell, &ctx);
                scene.visuals.insert(cell.key(), entity);
            }
            debug!("spawned {} hex cells", map.cell_count());
        }
    }
}

/// Clears the hover state of every cell whose entity is about to be replaced.
fn drop_hover(map: &mut HexMap, dirty: &SceneDirty) -> Vec<CellKey> {
    match dirty {
        SceneDirty::Clean => Vec::new(),
        SceneDirty::Cells(keys) => keys
            .iter()
            .copied()
            .filter(|&key| matches!(map.hover_exit(key), Ok(Some(_))))
            .collect(),
        SceneDirty::All | SceneDirty::Rebuild => map.clear_hover(),
    }
}

/// Replaces the container, hex parent and highlight.
fn rebuild_container(
    commands: &mut Commands,
    scene: &mut MapScene,
    ctx: &VisualContext,
    assets: &mut VisualAssets,
    generation: u32,
) {
    if let Some(old) = scene.container.take() {
        commands.entity(old).try_despawn();
    }
    scene.visuals.clear();

    let mut container = commands.spawn((
        Name::new(format!("Hex Map {generation}")),
        Transform::default(),
        Visibility::default(),
    ));
    if let Some(stage) = scene.stage {
        container.insert(ChildOf(stage));
    }
    let container = container.id();

    let hexes = commands
        .spawn((
            Name::new("Hexes"),
            Transform::default(),
            Visibility::default(),
            ChildOf(container),
        ))
        .id();

    scene.container = Some(container);
    scene.hexes = Some(hexes);
    scene.highlighter = match highlight_outline(ctx.options, ctx.layout) {
        Ok(outline) => Some(
            commands
                .spawn((
                    Name::new("Highlight"),
                    Highlighter,
                    Mesh2d(assets.meshes.add(mesh::outline_mesh(&outline.polygon, outline.width))),
                    MeshMaterial2d(assets.materials.add(ColorMaterial::from_color(outline.color))),
                    Transform::from_xyz(0.0, 0.0, HIGHLIGHT_Z),
                    Visibility::Hidden,
                    ChildOf(container),
                ))
                .id(),
        ),
        Err(err) => {
            error!("cannot build hover highlight: {err}");
            None
        }
    };
}

/// Spawns the root entity of `cell` and, when the visual can be built, its
/// body, outline and label children.
///
/// The root is spawned even when the visual fails so the container keeps one
/// child per cell.
fn spawn_cell(
    commands: &mut Commands,
    assets: &mut VisualAssets,
    hexes: Entity,
    cell: &Cell,
    ctx: &VisualContext,
) -> Entity {
    let key = cell.key();
    let visual = cell_visual(cell, ctx);
    let (position, hit_polygon) = match &visual {
        Ok(v) => (v.position, v.hit_polygon),
        Err(_) => (cell.center(), ctx.layout.hit_polygon()),
    };
    let z = cell.paint_order() as f32 * CELL_Z_STEP;

    let root = commands
        .spawn((
            Name::new(format!("Hex {}, {}", key.column, key.row)),
            CellRef(key),
            HitArea(hit_polygon.map(math::pixel_to_world)),
            Pickable::default(),
            Transform::from_translation(math::pixel_to_world(position).extend(z)),
            Visibility::default(),
            ChildOf(hexes),
        ))
        .observe(picking::on_hex_over)
        .observe(picking::on_hex_out)
        .observe(picking::on_hex_click)
        .id();

    match visual {
        Ok(visual) => spawn_cell_visual(commands, assets, root, &visual, ctx),
        Err(err) => error!("cell {}, {} drawn without body: {err}", key.column, key.row),
    }
    root
}

fn spawn_cell_visual(
    commands: &mut Commands,
    assets: &mut VisualAssets,
    root: Entity,
    visual: &CellVisual,
    ctx: &VisualContext,
) {
    let draw_size = Vec2::new(ctx.layout.draw_width(), ctx.layout.draw_height());

    match &visual.body {
        CellBody::Empty => {}
        CellBody::Flat { polygon, color } => {
            commands.spawn((
                Name::new("Body"),
                Mesh2d(assets.meshes.add(mesh::fill_mesh(polygon, mesh::centered_rect_uv(draw_size)))),
                MeshMaterial2d(assets.materials.add(ColorMaterial::from_color(*color))),
                Transform::default(),
                ChildOf(root),
            ));
        }
        CellBody::MaskedTexture {
            polygon,
            texture,
            size,
        } => {
            let size = match size {
                SpriteSize::Explicit(size) => *size,
                SpriteSize::Natural => assets
                    .images
                    .get(texture)
                    .map_or(draw_size, |image| image.size_f32()),
            };
            let material = ColorMaterial {
                texture: Some(texture.clone()),
                ..default()
            };
            commands.spawn((
                Name::new("Body"),
                Mesh2d(assets.meshes.add(mesh::fill_mesh(polygon, mesh::centered_rect_uv(size)))),
                MeshMaterial2d(assets.materials.add(material)),
                Transform::default(),
                ChildOf(root),
            ));
        }
        CellBody::Tile {
            texture,
            size,
            anchor_from_top,
        } => {
            let (custom_size, anchor_from_top) = match size {
                SpriteSize::Explicit(size) => (Some(*size), *anchor_from_top),
                SpriteSize::Natural => {
                    let anchor = assets.images.get(texture).map_or(*anchor_from_top, |image| {
                        tile_anchor_from_top(ctx.layout.draw_height(), image.size_f32().y)
                    });
                    (None, anchor)
                }
            };
            commands.spawn((
                Name::new("Tile"),
                Sprite {
                    image: texture.clone(),
                    custom_size,
                    ..default()
                },
                Anchor(Vec2::new(0.0, 0.5 - anchor_from_top)),
                Transform::default(),
                ChildOf(root),
            ));
        }
    }

    if let Some(outline) = &visual.outline {
        commands.spawn((
            Name::new("Outline"),
            Mesh2d(assets.meshes.add(mesh::outline_mesh(&outline.polygon, outline.width))),
            MeshMaterial2d(assets.materials.add(ColorMaterial::from_color(outline.color))),
            Transform::from_xyz(0.0, 0.0, OUTLINE_Z),
            ChildOf(root),
        ));
    }

    if let Some(label) = &visual.label {
        commands.spawn((
            Name::new("Label"),
            Text2d::new(label.text.clone()),
            TextFont::from_font_size(10.0),
            TextColor(Color::BLACK),
            Anchor::TOP_CENTER,
            Transform::from_translation(math::pixel_to_world(label.offset).extend(LABEL_Z)),
            ChildOf(root),
        ));
    }
}
