use oscscene::ShapeKind;
use rosc::{OscBundle, OscError, OscMessage, OscPacket, OscTime, OscType};

use crate::expectations::GeometryExpectation;

/// Path of the image the main scene expects to fail loading. Callers using a
/// `RecordingBackend` mark it unavailable before applying the scene.
pub const BROKEN_IMAGE_PATH: &str = "missing/broken.png";

/// A scripted sequence of packets and the registry state it should produce.
pub struct MainScene {
    pub packets: Vec<OscPacket>,
    pub expectations: Vec<GeometryExpectation>,
    /// Commands the decoder should enqueue for the whole scene.
    pub commands: usize,
    /// Messages the decoder should discard as malformed.
    pub discarded: u64,
    /// Shapes that should issue a draw call once the scene is applied.
    pub drawn: usize,
}

pub fn message(addr: &str, args: Vec<OscType>) -> OscPacket {
    OscPacket::Message(OscMessage {
        addr: addr.to_string(),
        args,
    })
}

fn f(value: f32) -> OscType {
    OscType::Float(value)
}

fn s(value: &str) -> OscType {
    OscType::String(value.to_string())
}

fn creation(addr: &str, id: OscType, geometry: [f32; 4], color: [f32; 4]) -> OscPacket {
    let mut args = vec![id];
    args.extend(geometry.into_iter().chain(color).map(f));
    message(addr, args)
}

/// Encodes each packet into one datagram.
pub fn encode_packets(packets: &[OscPacket]) -> Result<Vec<Vec<u8>>, OscError> {
    packets.iter().map(rosc::encoder::encode).collect()
}

/// Builds the main scene: every address in the `/sg` namespace, a bundle, and a few
/// messages that must be rejected or ignored.
pub fn build_main_scene() -> MainScene {
    let mut packets = Vec::new();
    let mut expectations = Vec::new();

    // Background rect, then a single-channel alpha change.
    packets.push(creation(
        "/sg/rect",
        s("background"),
        [0.0, 0.0, 1.6, 1.0],
        [0.1, 0.1, 0.1, 1.0],
    ));
    packets.push(message("/sg/alpha", vec![s("background"), f(0.5)]));
    expectations.push(GeometryExpectation::centered(
        "background",
        ShapeKind::Rect,
        [0.0, 0.0],
        [1.6, 1.0],
        [0.1, 0.1, 0.1, 0.5],
        "rect with alpha change",
    ));

    // A line whose end point is moved by a size message, then recolored by a creation
    // message of another variant.
    packets.push(creation(
        "/sg/line",
        s("diagonal"),
        [-0.5, -0.5, 0.5, 0.5],
        [1.0, 1.0, 1.0, 1.0],
    ));
    packets.push(message("/sg/size", vec![s("diagonal"), f(0.25), f(0.4)]));
    packets.push(creation(
        "/sg/ellipse",
        s("diagonal"),
        [9.0, 9.0, 9.0, 9.0],
        [0.0, 1.0, 0.0, 1.0],
    ));
    expectations.push(GeometryExpectation::line(
        "diagonal",
        [-0.5, -0.5],
        [0.25, 0.4],
        [0.0, 1.0, 0.0, 1.0],
        "line end point follows size",
    ));

    // Ellipse moved and resized after creation.
    packets.push(creation(
        "/sg/ellipse",
        s("sun"),
        [0.2, 0.2, 0.2, 0.1],
        [1.0, 0.8, 0.0, 1.0],
    ));
    packets.push(message("/sg/position", vec![s("sun"), f(0.3), f(0.1)]));
    packets.push(message("/sg/size", vec![s("sun"), f(0.1), f(0.1)]));
    expectations.push(GeometryExpectation::centered(
        "sun",
        ShapeKind::Ellipse,
        [0.3, 0.1],
        [0.1, 0.1],
        [1.0, 0.8, 0.0, 1.0],
        "ellipse moved and resized",
    ));

    // Integer id and integer coordinates.
    packets.push(message(
        "/sg/rect",
        vec![
            OscType::Int(7),
            OscType::Int(0),
            OscType::Int(0),
            f(0.2),
            f(0.2),
            OscType::Int(1),
            f(0.0),
            f(0.0),
            OscType::Int(1),
        ],
    ));
    packets.push(message("/sg/green", vec![OscType::Int(7), f(0.5)]));

    // Created, removed, then addressed again.
    packets.push(creation(
        "/sg/rect",
        s("gone"),
        [0.0, 0.0, 1.0, 1.0],
        [1.0, 1.0, 1.0, 1.0],
    ));
    packets.push(message("/sg/remove", vec![s("gone")]));
    packets.push(message(
        "/sg/color",
        vec![s("gone"), f(1.0), f(1.0), f(1.0), f(1.0)],
    ));
    expectations.push(GeometryExpectation::absent("gone", "removed rect stays removed"));

    // Images: one that loads and one that does not.
    packets.push(message(
        "/sg/image",
        vec![
            s("logo"),
            s("logo.png"),
            f(0.0),
            f(-0.2),
            f(0.4),
            f(0.3),
            f(1.0),
            f(1.0),
            f(1.0),
            f(1.0),
        ],
    ));
    packets.push(message(
        "/sg/image",
        vec![
            s("broken"),
            s(BROKEN_IMAGE_PATH),
            f(0.5),
            f(0.5),
            f(0.1),
            f(0.1),
            f(1.0),
            f(1.0),
            f(1.0),
            f(1.0),
        ],
    ));
    expectations.push(GeometryExpectation::centered(
        "broken",
        ShapeKind::Image,
        [0.5, 0.5],
        [0.1, 0.1],
        [1.0, 1.0, 1.0, 1.0],
        "image that failed to load is still registered",
    ));

    // Bundled updates apply in order.
    packets.push(OscPacket::Bundle(OscBundle {
        timetag: OscTime {
            seconds: 0,
            fractional: 1,
        },
        content: vec![
            message("/sg/position", vec![s("logo"), f(0.1), f(-0.2)]),
            message("/sg/blue", vec![OscType::Int(7), f(0.25)]),
        ],
    }));
    expectations.push(GeometryExpectation::centered(
        "logo",
        ShapeKind::Image,
        [0.1, -0.2],
        [0.4, 0.3],
        [1.0, 1.0, 1.0, 1.0],
        "image moved by bundled position",
    ));
    expectations.push(GeometryExpectation::centered(
        "7",
        ShapeKind::Rect,
        [0.0, 0.0],
        [0.2, 0.2],
        [1.0, 0.5, 0.25, 1.0],
        "integer id with channel updates",
    ));

    // Rejected: too few arguments. Ignored: foreign namespace and unknown method.
    packets.push(message("/sg/rect", vec![s("bad"), f(1.0), f(2.0)]));
    packets.push(creation(
        "/elsewhere/rect",
        s("stray"),
        [0.0, 0.0, 1.0, 1.0],
        [1.0, 1.0, 1.0, 1.0],
    ));
    packets.push(message("/sg/spin", vec![s("sun"), f(1.0)]));
    expectations.push(GeometryExpectation::absent("bad", "short message discarded"));
    expectations.push(GeometryExpectation::absent("stray", "foreign namespace ignored"));

    MainScene {
        packets,
        expectations,
        commands: 17,
        discarded: 1,
        // Every live shape except the broken image.
        drawn: 5,
    }
}
