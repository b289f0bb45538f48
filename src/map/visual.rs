//! Pure description of a cell's visual subtree.
//!
//! [`cell_visual`] decides *what* to draw for a cell; spawning the entities is
//! left to the sync system so the decision can be tested without a `World`.

use bevy::prelude::*;

use super::{Cell, CellKey, MapError, MapLayout, MapOptions, TerrainKind, TextureCache};

/// Everything [`cell_visual`] reads besides the cell itself.
#[derive(Clone, Copy)]
pub struct VisualContext<'a> {
    /// Map options.
    pub options: &'a MapOptions,
    /// Resolved dimensions.
    pub layout: &'a MapLayout,
    /// Texture catalog.
    pub textures: &'a TextureCache,
}

/// Size of a sprite-backed body.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum SpriteSize {
    /// Stretched to these pixel dimensions.
    Explicit(Vec2),
    /// Whatever size the image turns out to be.
    Natural,
}

/// The single visual strategy chosen for a cell.
#[derive(Clone, Debug, PartialEq)]
pub enum CellBody {
    /// No fill, outline only.
    Empty,
    /// Solid polygon.
    Flat {
        /// Corners relative to the cell centre (pixel space).
        polygon: [Vec2; 6],
        /// Fill color.
        color: Color,
    },
    /// Texture centred on the cell and clipped to the hex polygon.
    MaskedTexture {
        /// Clip polygon relative to the cell centre (pixel space).
        polygon: [Vec2; 6],
        /// Image to show.
        texture: Handle<Image>,
        /// Size of the (unclipped) sprite rectangle.
        size: SpriteSize,
    },
    /// Free-standing sprite, hex area on top and padding hanging below.
    Tile {
        /// Image to show.
        texture: Handle<Image>,
        /// Sprite size including the bottom pad.
        size: SpriteSize,
        /// Vertical anchor measured from the sprite's top edge, in `0..=1`.
        ///
        /// Computed for the explicit size. With [`SpriteSize::Natural`] the
        /// spawner recomputes it from the image height through
        /// [`tile_anchor_from_top`] once the image is loaded.
        anchor_from_top: f32,
    },
}

/// Stroke drawn over the body.
#[derive(Clone, Debug, PartialEq)]
pub struct Outline {
    /// Corners relative to the cell centre (pixel space).
    pub polygon: [Vec2; 6],
    /// Stroke width.
    pub width: f32,
    /// Stroke color.
    pub color: Color,
}

/// Coordinate label.
#[derive(Clone, Debug, PartialEq)]
pub struct Label {
    /// Text to show.
    pub text: String,
    /// Top-centre of the text relative to the cell centre (pixel space).
    pub offset: Vec2,
}

/// Full visual description of one cell.
#[derive(Clone, Debug, PartialEq)]
pub struct CellVisual {
    /// Cell centre in pixel space.
    pub position: Vec2,
    /// Corners used for pointer hit-testing.
    pub hit_polygon: [Vec2; 6],
    /// Fill strategy.
    pub body: CellBody,
    /// Present when the outline width is positive.
    pub outline: Option<Outline>,
    /// Present when coordinates are shown.
    pub label: Option<Label>,
}

/// Builds the visual description of `cell`.
pub fn cell_visual(cell: &Cell, ctx: &VisualContext) -> Result<CellVisual, MapError> {
    let geometry = cell
        .geometry()
        .ok_or(MapError::GeometryNotComputed(cell.key()))?;
    let options = ctx.options;
    let layout = ctx.layout;
    let terrain = options
        .terrain_types
        .get(cell.terrain())
        .ok_or(MapError::TerrainOutOfRange {
            index: cell.terrain(),
            available: options.terrain_types.len(),
        })?;

    let sprite_size = |size: Vec2| {
        if options.size_based_on_texture {
            SpriteSize::Natural
        } else {
            SpriteSize::Explicit(size)
        }
    };

    let body = match &terrain.kind {
        TerrainKind::Empty => CellBody::Empty,
        TerrainKind::Textured { texture } => CellBody::MaskedTexture {
            polygon: geometry.polygon,
            texture: ctx.textures.handle(*texture)?.clone(),
            size: sprite_size(Vec2::new(layout.draw_width(), layout.draw_height())),
        },
        TerrainKind::Tile { texture } => {
            let h = layout.draw_height();
            let padded = h + options.hex_bottom_pad;
            CellBody::Tile {
                texture: ctx.textures.handle(*texture)?.clone(),
                size: sprite_size(Vec2::new(layout.draw_width(), padded)),
                anchor_from_top: tile_anchor_from_top(h, padded),
            }
        }
        TerrainKind::FlatColor { color } => CellBody::Flat {
            polygon: geometry.polygon,
            color: *color,
        },
    };

    let outline = (options.hex_line_width > 0.0).then(|| Outline {
        polygon: geometry.polygon,
        width: options.hex_line_width,
        color: options.hex_line_color,
    });

    let label = options.show_coordinates.then(|| Label {
        text: (options.label_formatter)(cell),
        offset: Vec2::new(0.0, 8.0 - (layout.hex_height() / 2.0).round()),
    });

    let position = if options.dont_blurry_images {
        geometry.center.round()
    } else {
        geometry.center
    };

    Ok(CellVisual {
        position,
        hit_polygon: geometry.hit_polygon,
        body,
        outline,
        label,
    })
}

/// Anchor that puts the centre of a `hex_height` hex at the top of a tile
/// sprite `sprite_height` pixels tall.
pub fn tile_anchor_from_top(hex_height: f32, sprite_height: f32) -> f32 {
    if sprite_height <= 0.0 {
        return 0.5;
    }
    (hex_height / sprite_height / 2.0).clamp(0.0, 1.0)
}

/// Outline of the hover highlight, shaped like the cell at `(0, 0)`.
pub fn highlight_outline(options: &MapOptions, layout: &MapLayout) -> Result<Outline, MapError> {
    let key = CellKey::new(0, 0);
    let mut reference = Cell::new(key, 0, None);
    reference.place(layout, 0);
    let geometry = reference
        .geometry()
        .ok_or(MapError::GeometryNotComputed(key))?;
    Ok(Outline {
        polygon: geometry.polygon,
        width: options.highlight_width,
        color: options.highlight_color,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::map::{HexSizing, TerrainType, TextureSource};

    fn options(terrain: TerrainType) -> MapOptions {
        MapOptions {
            terrain_types: vec![terrain],
            textures: vec![TextureSource::Handle(Handle::default())],
            ..default()
        }
    }

    fn build(options: &MapOptions) -> Result<CellVisual, MapError> {
        let layout = MapLayout::resolve(options)?;
        let mut textures = TextureCache::from_sources(&options.textures);
        for index in textures.unresolved() {
            textures.resolve(index, Handle::default(), false);
        }
        let mut cell = Cell::new(CellKey::new(1, 2), 0, None);
        cell.place(&layout, 0);
        cell_visual(
            &cell,
            &VisualContext {
                options,
                layout: &layout,
                textures: &textures,
            },
        )
    }

    // ── body strategy ───────────────────────────────────────────────

    #[test]
    fn each_kind_selects_its_body() {
        let cases = [
            (TerrainType::empty("void"), "empty"),
            (TerrainType::textured("grass", 0), "masked"),
            (TerrainType::tile("rock", 0), "tile"),
            (TerrainType::flat("dirt", Color::BLACK), "flat"),
        ];
        for (terrain, expected) in cases {
            let visual = build(&options(terrain)).expect("buildable");
            let got = match visual.body {
                CellBody::Empty => "empty",
                CellBody::MaskedTexture { .. } => "masked",
                CellBody::Tile { .. } => "tile",
                CellBody::Flat { .. } => "flat",
            };
            assert_eq!(got, expected);
        }
    }

    #[test]
    fn flat_body_carries_its_color() {
        let color = Color::srgb_u8(0x40, 0x60, 0xfa);
        let visual = build(&options(TerrainType::flat("water", color))).expect("buildable");
        assert!(matches!(visual.body, CellBody::Flat { color: c, .. } if c == color));
    }

    #[test]
    fn unresolved_texture_is_reported() {
        let opts = options(TerrainType::textured("grass", 0));
        let layout = MapLayout::resolve(&opts).expect("layout");
        let textures = TextureCache::from_sources(&opts.textures);
        let mut cell = Cell::new(CellKey::new(0, 0), 0, None);
        cell.place(&layout, 0);
        let ctx = VisualContext {
            options: &opts,
            layout: &layout,
            textures: &textures,
        };
        assert_eq!(
            cell_visual(&cell, &ctx),
            Err(MapError::TextureNotReady { index: 0 })
        );
    }

    #[test]
    fn unplaced_cell_is_rejected() {
        let opts = MapOptions::default();
        let layout = MapLayout::resolve(&opts).expect("layout");
        let textures = TextureCache::default();
        let cell = Cell::new(CellKey::new(0, 0), 0, None);
        let ctx = VisualContext {
            options: &opts,
            layout: &layout,
            textures: &textures,
        };
        assert_eq!(
            cell_visual(&cell, &ctx),
            Err(MapError::GeometryNotComputed(CellKey::new(0, 0)))
        );
    }

    #[test]
    fn natural_size_when_based_on_texture() {
        let mut opts = options(TerrainType::textured("grass", 0));
        opts.size_based_on_texture = true;
        let visual = build(&opts).expect("buildable");
        assert!(matches!(
            visual.body,
            CellBody::MaskedTexture {
                size: SpriteSize::Natural,
                ..
            }
        ));
    }

    // ── tiles ───────────────────────────────────────────────────────

    #[test]
    fn tile_padding_hangs_below_hex() {
        let mut opts = options(TerrainType::tile("rock", 0));
        opts.sizing = HexSizing::Explicit {
            width: 65.0,
            height: 65.0,
        };
        opts.hex_bottom_pad = 24.0;
        let visual = build(&opts).expect("buildable");
        let CellBody::Tile {
            size,
            anchor_from_top,
            ..
        } = visual.body
        else {
            panic!("tile terrain must build a tile body");
        };
        assert_eq!(size, SpriteSize::Explicit(Vec2::new(65.0, 89.0)));
        assert!((anchor_from_top - 65.0 / 89.0 / 2.0).abs() < 1e-6);
        // Hex centre sits half a hex below the sprite top.
        assert!((anchor_from_top * 89.0 - 32.5).abs() < 1e-3);
    }

    #[test]
    fn tile_without_padding_is_centred() {
        let visual = build(&options(TerrainType::tile("rock", 0))).expect("buildable");
        assert!(matches!(
            visual.body,
            CellBody::Tile { anchor_from_top, .. } if (anchor_from_top - 0.5).abs() < 1e-6
        ));
    }

    #[test]
    fn tile_anchor_tracks_sprite_height() {
        assert!((tile_anchor_from_top(60.0, 60.0) - 0.5).abs() < 1e-6);
        assert!((tile_anchor_from_top(60.0, 120.0) - 0.25).abs() < 1e-6);
        assert_eq!(tile_anchor_from_top(60.0, 20.0), 1.0);
        assert_eq!(tile_anchor_from_top(60.0, 0.0), 0.5);
    }

    // ── outline, label, position ────────────────────────────────────

    #[test]
    fn outline_follows_line_width() {
        let mut opts = options(TerrainType::empty("void"));
        let visual = build(&opts).expect("buildable");
        let Some(outline) = visual.outline else {
            panic!("default line width draws an outline");
        };
        assert_eq!(outline.width, 2.0);
        assert_eq!(outline.polygon, visual.hit_polygon);

        opts.hex_line_width = 0.0;
        assert!(build(&opts).expect("buildable").outline.is_none());
    }

    #[test]
    fn label_sits_near_the_top() {
        let mut opts = options(TerrainType::empty("void"));
        assert!(build(&opts).expect("buildable").label.is_none());

        opts.show_coordinates = true;
        let label = build(&opts).expect("buildable").label;
        let Some(label) = label else {
            panic!("coordinates requested");
        };
        assert_eq!(label.text, "2, 1");
        let h = 40.0 * crate::math::SQRT_3;
        assert_eq!(label.offset, Vec2::new(0.0, 8.0 - (h / 2.0).round()));
        assert!(label.offset.y < 0.0);
    }

    #[test]
    fn custom_label_formatter_is_used() {
        let mut opts = options(TerrainType::empty("void"));
        opts.show_coordinates = true;
        opts.label_formatter = |cell| format!("#{}", cell.paint_order());
        let label = build(&opts).expect("buildable").label.map(|l| l.text);
        assert_eq!(label.as_deref(), Some("#0"));
    }

    #[test]
    fn position_is_rounded_only_on_request() {
        let mut opts = options(TerrainType::empty("void"));
        let raw = build(&opts).expect("buildable").position;
        assert_ne!(raw, raw.round(), "fixture should land between pixels");
        opts.dont_blurry_images = true;
        assert_eq!(build(&opts).expect("buildable").position, raw.round());
    }

    #[test]
    fn draw_and_hit_polygons_can_differ() {
        let mut opts = options(TerrainType::flat("dirt", Color::BLACK));
        opts.draw_sizing = Some(HexSizing::Radius(30.0));
        let visual = build(&opts).expect("buildable");
        let CellBody::Flat { polygon, .. } = visual.body else {
            panic!("flat body expected");
        };
        assert!(polygon[0].length() < visual.hit_polygon[0].length());
    }

    // ── highlight ───────────────────────────────────────────────────

    #[test]
    fn highlight_uses_highlight_style() {
        let opts = MapOptions::default();
        let layout = MapLayout::resolve(&opts).expect("layout");
        let outline = highlight_outline(&opts, &layout).expect("highlight");
        assert_eq!(outline.width, 3.0);
        assert_eq!(outline.color, Color::srgb_u8(0xff, 0x55, 0x21));
        assert_eq!(outline.polygon, layout.draw_polygon());
    }
}
