/// Pixel tests for the wgpu backend.
///
/// These render through a headless renderer and read the offscreen target back. They return
/// early on machines without a GPU adapter.
///
/// Run with:   cargo test --test headless_render
use futures::executor::block_on;
use oscscene::{queue, Color, Command, FrameScheduler, Renderer, ShapeKind};

const SIZE: u32 = 64;

fn headless() -> Option<Renderer<'static>> {
    match block_on(Renderer::try_new_headless((SIZE, SIZE))) {
        Ok(renderer) => Some(renderer),
        Err(error) => {
            eprintln!("skipping GPU test: {error}");
            None
        }
    }
}

fn pixel(pixels: &[u8], x: u32, y: u32) -> [u8; 4] {
    let offset = ((y * SIZE + x) * 4) as usize;
    [
        pixels[offset],
        pixels[offset + 1],
        pixels[offset + 2],
        pixels[offset + 3],
    ]
}

fn assert_close(actual: [u8; 4], expected: [u8; 4], label: &str) {
    let close = actual
        .iter()
        .zip(expected)
        .all(|(actual, expected)| actual.abs_diff(expected) <= 2);
    assert!(close, "{label}: expected {expected:?}, got {actual:?}");
}

#[test]
fn rect_over_clear_color() {
    let Some(mut renderer) = headless() else {
        return;
    };
    assert!(renderer.is_headless());

    let (mut producer, consumer) = queue::bounded(8);
    let mut scheduler = FrameScheduler::new(consumer, SIZE, SIZE).with_clear_color(Color::BLACK);
    producer.push(Command::create(
        ShapeKind::Rect,
        "box",
        (0.0, 0.0),
        (0.5, 0.5),
        [0.0, 1.0, 0.0, 1.0],
    ));

    let stats = scheduler.frame(&mut renderer).unwrap();
    assert_eq!(stats.drawn, 1);
    assert_eq!(renderer.frames_presented(), 1);

    let mut pixels = Vec::new();
    assert!(renderer.read_pixels(&mut pixels));
    assert_eq!(pixels.len(), (SIZE * SIZE * 4) as usize);

    assert_close(pixel(&pixels, SIZE / 2, SIZE / 2), [0, 255, 0, 255], "rect centre");
    assert_close(pixel(&pixels, 2, 2), [0, 0, 0, 255], "background corner");
}

#[test]
fn removed_shape_is_not_drawn() {
    let Some(mut renderer) = headless() else {
        return;
    };

    let (mut producer, consumer) = queue::bounded(8);
    let mut scheduler = FrameScheduler::new(consumer, SIZE, SIZE);
    producer.push(Command::create(
        ShapeKind::Ellipse,
        "dot",
        (0.0, 0.0),
        (0.5, 0.5),
        Color::WHITE,
    ));
    scheduler.frame(&mut renderer).unwrap();

    producer.push(Command::new(oscscene::CommandKind::Remove, "dot"));
    scheduler.frame(&mut renderer).unwrap();

    let mut pixels = Vec::new();
    assert!(renderer.read_pixels(&mut pixels));
    assert_close(pixel(&pixels, SIZE / 2, SIZE / 2), [0, 0, 0, 255], "cleared centre");
}

#[test]
fn image_is_sampled() {
    let Some(mut renderer) = headless() else {
        return;
    };

    let path = std::env::temp_dir().join(format!("oscscene-{}-red.png", std::process::id()));
    image::RgbaImage::from_pixel(4, 4, image::Rgba([255, 0, 0, 255]))
        .save(&path)
        .unwrap();

    let (mut producer, consumer) = queue::bounded(8);
    let mut scheduler = FrameScheduler::new(consumer, SIZE, SIZE);
    producer.push(
        Command::create(
            ShapeKind::Image,
            "picture",
            (0.0, 0.0),
            (0.5, 0.5),
            Color::WHITE,
        )
        .with_payload(path.to_string_lossy()),
    );
    let stats = scheduler.frame(&mut renderer).unwrap();
    std::fs::remove_file(&path).unwrap();
    assert_eq!(stats.drawn, 1);

    let mut pixels = Vec::new();
    assert!(renderer.read_pixels(&mut pixels));
    assert_close(pixel(&pixels, SIZE / 2, SIZE / 2), [255, 0, 0, 255], "image centre");
}

#[test]
fn oversized_image_draws_nothing() {
    let Some(mut renderer) = headless() else {
        return;
    };

    let width = renderer.max_texture_dimension() + 1;
    let path = std::env::temp_dir().join(format!("oscscene-{}-wide.png", std::process::id()));
    image::RgbaImage::from_pixel(width, 1, image::Rgba([0, 0, 255, 255]))
        .save(&path)
        .unwrap();

    let (mut producer, consumer) = queue::bounded(8);
    let mut scheduler = FrameScheduler::new(consumer, SIZE, SIZE);
    producer.push(
        Command::create(ShapeKind::Image, "big", (0.0, 0.0), (0.5, 0.5), Color::WHITE)
            .with_payload(path.to_string_lossy()),
    );
    let result = scheduler.frame(&mut renderer);
    std::fs::remove_file(&path).unwrap();

    let stats = result.unwrap();
    assert_eq!(stats.shapes, 1);
    assert_eq!(stats.drawn, 0);
    assert!(scheduler.registry().contains("big"));

    let mut pixels = Vec::new();
    assert!(renderer.read_pixels(&mut pixels));
    assert_close(pixel(&pixels, SIZE / 2, SIZE / 2), [0, 0, 0, 255], "cleared centre");
}

#[test]
fn resize_reallocates_the_target() {
    let Some(mut renderer) = headless() else {
        return;
    };
    renderer.resize((0, 32));
    assert_eq!(renderer.size(), (1, 32));
}
