use cairo::ImageSurface;
use physbox::draw::{self, CairoSurface, Surface};
use physbox::game::{Game, GameSettings};
use physbox::input::Event;
use physbox::input::tools::ToolKind;
use physbox::util::Point;
use physbox::world::rapier::{RapierSettings, RapierWorld};
use tempfile::TempDir;

/// Returns `[r, g, b, a]` of one ARGB32 pixel.
fn pixel(image: &mut ImageSurface, x: usize, y: usize) -> [u8; 4] {
    let stride = image.stride() as usize;
    let data = image.data().expect("exclusive access to image data");
    let offset = y * stride + x * 4;
    let word = u32::from_ne_bytes([
        data[offset],
        data[offset + 1],
        data[offset + 2],
        data[offset + 3],
    ]);
    [
        (word >> 16) as u8,
        (word >> 8) as u8,
        word as u8,
        (word >> 24) as u8,
    ]
}

const WHITE: [u8; 4] = [255, 255, 255, 255];

#[test]
fn clear_paints_every_pixel() {
    let mut surface = CairoSurface::new(16, 8).unwrap();
    surface.clear(draw::WHITE);
    let mut image = surface.into_image();
    for (x, y) in [(0, 0), (15, 0), (7, 4), (15, 7)] {
        assert_eq!(pixel(&mut image, x, y), WHITE);
    }
}

#[test]
fn circle_width_selects_fill_or_outline() {
    let mut surface = CairoSurface::new(100, 50).unwrap();
    surface.clear(draw::WHITE);
    surface.draw_circle(draw::BLACK, Point::new(25.0, 25.0), 15.0, 0.0);
    surface.draw_circle(draw::BLACK, Point::new(75.0, 25.0), 15.0, 2.0);
    let mut image = surface.into_image();

    assert_eq!(pixel(&mut image, 25, 25), [0, 0, 0, 255]);
    assert_eq!(pixel(&mut image, 75, 25), WHITE);
    assert_ne!(pixel(&mut image, 90, 25), WHITE);
}

#[test]
fn degenerate_primitives_draw_nothing() {
    let mut surface = CairoSurface::new(20, 20).unwrap();
    surface.clear(draw::WHITE);
    surface.draw_polyline(draw::RED, &[Point::new(10.0, 10.0)], 5.0);
    surface.draw_polygon(draw::RED, &[Point::new(10.0, 10.0)], 0.0);
    surface.draw_circle(draw::RED, Point::new(10.0, 10.0), 0.0, 0.0);
    let mut image = surface.into_image();
    assert_eq!(pixel(&mut image, 10, 10), WHITE);
}

#[test]
fn write_png_creates_file() {
    let temp = TempDir::new().unwrap();
    let path = temp.path().join("frame.png");
    let mut surface = CairoSurface::new(32, 32).unwrap();
    surface.clear(draw::SKY);
    surface.write_png(&path).unwrap();

    let bytes = std::fs::read(&path).unwrap();
    assert_eq!(&bytes[1..4], b"PNG");
}

#[test]
fn game_frame_renders_world_outlines() {
    let settings = RapierSettings {
        width: 320.0,
        height: 240.0,
        ..RapierSettings::default()
    };
    let mut game = Game::new(
        RapierWorld::new(settings),
        GameSettings {
            default_tool: ToolKind::Box,
            start_paused: true,
            throttle: false,
            ..GameSettings::default()
        },
    );
    game.dispatch(Event::down((100.0, 100.0)));
    game.dispatch(Event::up((200.0, 160.0)));

    let mut surface = CairoSurface::new(320, 240).unwrap();
    assert!(game.frame(&mut surface));
    let mut image = surface.into_image();

    // Box outline, hollow inside.
    assert_ne!(pixel(&mut image, 100, 130), WHITE);
    assert_ne!(pixel(&mut image, 150, 160), WHITE);
    assert_eq!(pixel(&mut image, 150, 130), WHITE);
    // Top edge of the static ground strip.
    assert_ne!(pixel(&mut image, 160, 220), WHITE);
}
