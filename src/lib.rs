#![warn(missing_docs)]
//! Hexagonal tile maps for Bevy 2D.
//!
//! A rectangular grid of hex cells in one of four offset conventions, each
//! drawn from its terrain type (flat color, masked texture or free-standing
//! tile sprite), with coordinate labels and a shared hover highlight. Pointer
//! hover, exit and click reach the application as messages.
//!
//! ```no_run
//! use bevy::prelude::*;
//! use hex_tile_map::map::{HexClicked, HexMap, HexMapPlugin, MapOptions, TerrainType};
//!
//! App::new()
//!     .add_plugins(DefaultPlugins)
//!     .add_plugins(HexMapPlugin(MapOptions {
//!         terrain_types: vec![TerrainType::flat("grass", Color::srgb(0.1, 0.9, 0.1))],
//!         ..default()
//!     }))
//!     .add_systems(Startup, |mut commands: Commands, mut map: ResMut<HexMap>| {
//!         commands.spawn(Camera2d);
//!         map.generate_blank_map();
//!     })
//!     .add_systems(Update, |mut clicks: MessageReader<HexClicked>| {
//!         for click in clicks.read() {
//!             info!("clicked {:?}", click.cell);
//!         }
//!     })
//!     .run();
//! ```

pub mod map;
pub mod math;
pub mod procgen;
