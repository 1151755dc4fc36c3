//! Scripted OSC scenes and registry expectations shared by the integration tests and benches.

pub mod expectations;
pub mod scene;

pub use expectations::{check_geometry, Expected, GeometryExpectation};
pub use scene::{build_main_scene, encode_packets, message, MainScene, BROKEN_IMAGE_PATH};
