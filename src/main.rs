#![warn(missing_docs)]
//! Hex tile map demo.
//!
//! Draws a map from command-line settings, cycles a cell's terrain on click
//! and offers an egui panel to rebuild the map with a different size or
//! coordinate system. Tab toggles the world inspector.

use bevy::app::AppExit;
use bevy::prelude::*;
use bevy::render::render_resource::{Extent3d, TextureDimension, TextureFormat};
use bevy_egui::{EguiContexts, EguiPrimaryContextPass, egui};
use bevy_inspector_egui::quick::WorldInspectorPlugin;
use rand::SeedableRng;
use rand::rngs::StdRng;

use hex_tile_map::map::{
    AssetsLoaded, CoordinateSystem, HexClicked, HexHovered, HexMap, HexMapPlugin, HexOut,
    HexSizing, MapError, MapOptions, TerrainType, TextureSource, column_row_label,
};
use hex_tile_map::math;
use hex_tile_map::procgen::NoiseTerrain;

/// Application-wide demo state, used for system scheduling.
#[derive(States, Default, Debug, Clone, PartialEq, Eq, Hash, Reflect)]
pub enum DemoState {
    /// Map interaction only.
    #[default]
    Running,
    /// World inspector open (Tab to toggle).
    Inspecting,
}

/// How the demo fills a fresh map.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Reflect)]
#[cfg_attr(feature = "native", derive(clap::ValueEnum))]
pub enum Generator {
    /// Uniformly random terrain.
    #[default]
    Random,
    /// Every cell gets the first terrain.
    Blank,
    /// Noise elevation bands with a water border.
    Noise,
}

/// Settings the control panel edits; applied on the next rebuild.
#[derive(Resource, Clone, Debug, Reflect)]
pub struct DemoSettings {
    /// Cells per row.
    pub width: u32,
    /// Number of rows.
    pub height: u32,
    /// Offset convention.
    pub coordinate_system: CoordinateSystem,
    /// Hex radius in pixels.
    pub hex_size: f32,
    /// Label every cell with its coordinates.
    pub show_coordinates: bool,
    /// Fill strategy for new maps.
    pub generator: Generator,
    /// Fixed seed; `None` draws a fresh one per map.
    pub seed: Option<u64>,
    /// Tile texture asset paths.
    pub textures: Vec<String>,
    /// Alternate palette of the generated checker texture.
    pub checker_alt: bool,
}

impl Default for DemoSettings {
    fn default() -> Self {
        Self {
            width: 12,
            height: 10,
            coordinate_system: CoordinateSystem::EvenQ,
            hex_size: 32.0,
            show_coordinates: false,
            generator: Generator::Random,
            seed: None,
            textures: Vec::new(),
            checker_alt: false,
        }
    }
}

#[cfg(feature = "native")]
#[derive(clap::Parser, Debug)]
#[command(version, about = "Hexagonal tile map demo")]
struct Cli {
    /// Cells per row.
    #[arg(long, default_value_t = 12)]
    width: u32,
    /// Number of rows.
    #[arg(long, default_value_t = 10)]
    height: u32,
    /// Offset convention: odd-q, even-q, odd-r or even-r.
    #[arg(long, default_value = "even-q")]
    coordinate_system: CoordinateSystem,
    /// Hex radius in pixels.
    #[arg(long, default_value_t = 32.0)]
    hex_size: f32,
    /// Label every cell with its coordinates.
    #[arg(long)]
    coordinates: bool,
    /// Fill strategy for the first map.
    #[arg(long, value_enum, default_value_t = Generator::Random)]
    generator: Generator,
    /// Seed for random and noise maps.
    #[arg(long)]
    seed: Option<u64>,
    /// Tile texture asset path; repeat for more tile terrains.
    #[arg(long = "texture")]
    textures: Vec<String>,
}

impl DemoSettings {
    #[cfg(feature = "native")]
    fn from_args() -> Self {
        use clap::Parser;
        let cli = Cli::parse();
        Self {
            width: cli.width,
            height: cli.height,
            coordinate_system: cli.coordinate_system,
            hex_size: cli.hex_size,
            show_coordinates: cli.coordinates,
            generator: cli.generator,
            seed: cli.seed,
            textures: cli.textures,
            ..default()
        }
    }

    #[cfg(not(feature = "native"))]
    fn from_args() -> Self {
        Self::default()
    }

    /// Slot of the generated checker texture, after the asset paths.
    fn checker_slot(&self) -> usize {
        self.textures.len()
    }

    fn map_options(&self) -> MapOptions {
        let mut terrain_types = vec![
            TerrainType::flat("dirt", Color::srgb_u8(0x9b, 0x55, 0x23)).with_move_mod(1.5),
            TerrainType::flat("sand", Color::srgb_u8(0xdb, 0xd5, 0x88)).with_move_mod(1.2),
            TerrainType::flat("snow", Color::srgb_u8(0xeb, 0xeb, 0xfa)).with_move_mod(2.0),
            TerrainType::flat("water", Color::srgb_u8(0x40, 0x60, 0xfa)),
            TerrainType::flat("grass", Color::srgb_u8(0x10, 0xfa, 0x10)).with_move_mod(1.0),
            TerrainType::textured("checker", self.checker_slot()),
        ];
        terrain_types.extend(
            (0..self.textures.len()).map(|i| TerrainType::tile(format!("tile {i}"), i)),
        );

        let mut textures: Vec<TextureSource> =
            self.textures.iter().cloned().map(TextureSource::from).collect();
        textures.push(checker_image(self.checker_alt).into());

        MapOptions {
            coordinate_system: self.coordinate_system,
            map_width: self.width,
            map_height: self.height,
            sizing: HexSizing::Radius(self.hex_size),
            show_coordinates: self.show_coordinates,
            label_formatter: column_row_label,
            terrain_types,
            textures,
            hex_bottom_pad: self.hex_size / 2.0,
            dont_blurry_images: true,
            ..default()
        }
    }

    fn noise(&self) -> NoiseTerrain {
        let defaults = NoiseTerrain::default();
        NoiseTerrain {
            seed: self.seed.map_or(defaults.seed, |s| s as u32),
            bands: vec![(0.4, 3), (0.48, 1), (0.65, 4), (0.8, 0), (1.0, 2)],
            border: Some(3),
            ..defaults
        }
    }
}

/// 64×64 checkerboard used as the in-memory "canvas" texture.
fn checker_image(alt: bool) -> Image {
    const SIZE: u32 = 64;
    const SQUARE: u32 = 8;
    let (a, b) = if alt {
        ([0x30, 0x30, 0x30, 0xff], [0xf0, 0xc0, 0x20, 0xff])
    } else {
        ([0xf0, 0xf0, 0xf0, 0xff], [0x80, 0x20, 0xa0, 0xff])
    };
    let data = (0..SIZE * SIZE)
        .flat_map(|i| {
            let (x, y) = (i % SIZE / SQUARE, i / SIZE / SQUARE);
            if (x + y) % 2 == 0 { a } else { b }
        })
        .collect();
    Image::new(
        Extent3d {
            width: SIZE,
            height: SIZE,
            depth_or_array_layers: 1,
        },
        TextureDimension::D2,
        data,
        TextureFormat::Rgba8UnormSrgb,
        default(),
    )
}

fn main() {
    let settings = DemoSettings::from_args();
    let options = settings.map_options();
    let mut app = App::new();

    app.add_plugins(DefaultPlugins.set(WindowPlugin {
        primary_window: Some(Window {
            title: "Hex Tile Map".into(),
            ..default()
        }),
        ..default()
    }))
    .register_type::<DemoState>()
    .register_type::<DemoSettings>()
    .init_state::<DemoState>()
    .insert_resource(settings)
    .insert_resource(ClearColor(Color::srgb_u8(0x20, 0x22, 0x28)))
    .add_plugins(bevy_egui::EguiPlugin::default())
    .add_plugins(HexMapPlugin(options))
    .add_systems(
        Startup,
        (spawn_camera, generate_initial_map.run_if(resource_exists::<HexMap>)),
    )
    .add_systems(
        Update,
        (
            cycle_clicked_terrain.run_if(resource_exists::<HexMap>),
            log_pointer,
            log_assets,
            center_camera.run_if(resource_exists_and_changed::<HexMap>),
        ),
    )
    .add_systems(
        EguiPrimaryContextPass,
        control_panel.run_if(resource_exists::<HexMap>),
    )
    .add_systems(Update, exit_on_esc)
    .add_systems(Update, toggle_inspector)
    .add_plugins(WorldInspectorPlugin::new().run_if(in_state(DemoState::Inspecting)));

    app.run();
}

fn spawn_camera(mut commands: Commands) {
    commands.spawn((Name::new("Camera"), Camera2d));
}

fn generate_initial_map(settings: Res<DemoSettings>, mut map: ResMut<HexMap>) {
    if let Err(err) = generate(&settings, &mut map) {
        error!("initial map failed: {err}");
    }
}

fn generate(settings: &DemoSettings, map: &mut HexMap) -> Result<(), MapError> {
    match settings.generator {
        Generator::Random => match settings.seed {
            Some(seed) => map.generate_random_map(&mut StdRng::seed_from_u64(seed)),
            None => map.generate_random_map(&mut rand::thread_rng()),
        },
        Generator::Blank => map.generate_blank_map(),
        Generator::Noise => {
            let noise = settings.noise();
            map.generate_procedural_map(noise.cell_fn(settings.width, settings.height))?;
        }
    }
    Ok(())
}

/// Rebuilds the map from the current settings.
fn rebuild(settings: &DemoSettings, map: &mut HexMap) {
    if let Err(err) = map.reset(settings.map_options()) {
        error!("map options rejected: {err}");
        return;
    }
    if let Err(err) = generate(settings, map) {
        error!("map generation failed: {err}");
    }
}

/// Clicking a cell steps it to the next terrain in the catalog.
fn cycle_clicked_terrain(mut clicks: MessageReader<HexClicked>, mut map: ResMut<HexMap>) {
    let available = map.options().terrain_types.len();
    for click in clicks.read() {
        if click.generation != map.generation() {
            continue;
        }
        let next = match map.cell(click.cell) {
            Ok(cell) => (cell.terrain() + 1) % available,
            Err(_) => continue,
        };
        if let Err(err) = map.set_cell_terrain_type(click.cell, next) {
            warn!("terrain change on {:?} failed: {err}", click.cell);
        }
    }
}

fn log_pointer(mut hovered: MessageReader<HexHovered>, mut out: MessageReader<HexOut>) {
    for event in hovered.read() {
        debug!("over {:?}", event.cell);
    }
    for event in out.read() {
        debug!("out {:?}", event.cell);
    }
}

fn log_assets(mut loaded: MessageReader<AssetsLoaded>) {
    for event in loaded.read() {
        if event.failed.is_empty() {
            info!("map {} textures ready", event.generation);
        } else {
            warn!(
                "map {} textures ready, {} failed: {:?}",
                event.generation,
                event.failed.len(),
                event.failed
            );
        }
    }
}

/// Keeps the camera on the middle of the map.
fn center_camera(map: Res<HexMap>, mut cameras: Query<&mut Transform, With<Camera2d>>) {
    let Some(bounds) = map
        .cells()
        .map(|cell| cell.center())
        .fold(None, |acc: Option<Rect>, p| {
            Some(acc.map_or(Rect::from_center_size(p, Vec2::ZERO), |r| r.union_point(p)))
        })
    else {
        return;
    };
    let center = math::pixel_to_world(bounds.center());
    for mut transform in &mut cameras {
        transform.translation.x = center.x;
        transform.translation.y = center.y;
    }
}

fn control_panel(
    mut contexts: EguiContexts,
    mut settings: ResMut<DemoSettings>,
    mut map: ResMut<HexMap>,
) -> Result {
    let ctx = contexts.ctx_mut()?;
    let settings = &mut *settings;
    let mut make = None;
    let mut recolor = false;

    egui::Window::new("Map").show(ctx, |ui| {
        ui.add(egui::Slider::new(&mut settings.width, 1..=64).text("width"));
        ui.add(egui::Slider::new(&mut settings.height, 1..=64).text("height"));
        ui.add(egui::Slider::new(&mut settings.hex_size, 8.0..=96.0).text("hex size"));
        egui::ComboBox::from_label("coordinate system")
            .selected_text(settings.coordinate_system.name())
            .show_ui(ui, |ui| {
                for cs in CoordinateSystem::ALL {
                    ui.selectable_value(&mut settings.coordinate_system, cs, cs.name());
                }
            });
        ui.checkbox(&mut settings.show_coordinates, "show coordinates");
        ui.horizontal(|ui| {
            if ui.button("Make map").clicked() {
                make = Some(Generator::Random);
            }
            if ui.button("Noise map").clicked() {
                make = Some(Generator::Noise);
            }
            if ui.button("Clear map").clicked() {
                make = Some(Generator::Blank);
            }
        });
        if ui.button("Recolor checker").clicked() {
            recolor = true;
        }
        ui.label(format!(
            "{} cells, {} hovered",
            map.cell_count(),
            map.hover_count()
        ));
    });

    if let Some(generator) = make {
        settings.generator = generator;
        rebuild(settings, &mut map);
    }
    if recolor {
        settings.checker_alt = !settings.checker_alt;
        let image = checker_image(settings.checker_alt);
        if let Err(err) = map.change_texture(settings.checker_slot(), image.into()) {
            error!("checker texture change failed: {err}");
        }
    }
    Ok(())
}

fn toggle_inspector(
    keys: Res<ButtonInput<KeyCode>>,
    state: Res<State<DemoState>>,
    mut next: ResMut<NextState<DemoState>>,
) {
    if keys.just_pressed(KeyCode::Tab) {
        next.set(match state.get() {
            DemoState::Running => DemoState::Inspecting,
            DemoState::Inspecting => DemoState::Running,
        });
    }
}

fn exit_on_esc(keys: Res<ButtonInput<KeyCode>>, mut exit: MessageWriter<AppExit>) {
    if keys.just_pressed(KeyCode::Escape) {
        exit.write(AppExit::Success);
    }
}
