/// Tests for the network thread over a real loopback socket.
///
/// Run with:   cargo test --test udp_loopback
use std::net::{Ipv4Addr, SocketAddr, UdpSocket};
use std::time::{Duration, Instant};

use oscscene::{queue, CommandDecoder, CommandKind, OscListener, DEFAULT_NAMESPACE};
use oscscene_test_scenes::{build_main_scene, encode_packets, message};
use rosc::OscType;

const TIMEOUT: Duration = Duration::from_secs(5);

fn loopback() -> SocketAddr {
    SocketAddr::from((Ipv4Addr::LOCALHOST, 0))
}

fn wait_for(mut condition: impl FnMut() -> bool) -> bool {
    let start = Instant::now();
    while start.elapsed() < TIMEOUT {
        if condition() {
            return true;
        }
        std::thread::sleep(Duration::from_millis(5));
    }
    false
}

#[test]
fn datagrams_reach_the_queue() {
    let (producer, mut consumer) = queue::bounded(64);
    let decoder = CommandDecoder::new(DEFAULT_NAMESPACE, producer);
    let listener = OscListener::spawn(loopback(), decoder).unwrap();
    assert_ne!(listener.local_addr().port(), 0);

    let sender = UdpSocket::bind(loopback()).unwrap();
    let datagrams = encode_packets(&[
        message("/sg/remove", vec![OscType::String("a".into())]),
        message("/sg/unknown", vec![OscType::String("b".into())]),
        message(
            "/sg/position",
            vec![OscType::Int(3), OscType::Float(0.5), OscType::Float(0.25)],
        ),
    ])
    .unwrap();
    for datagram in &datagrams {
        sender.send_to(datagram, listener.local_addr()).unwrap();
    }

    assert!(wait_for(|| consumer.len() == 2), "commands never arrived");
    let first = consumer.pop().unwrap();
    assert_eq!(first.kind, CommandKind::Remove);
    assert_eq!(first.object_id.as_str(), "a");
    let second = consumer.pop().unwrap();
    assert_eq!(second.kind, CommandKind::SetPosition);
    assert_eq!(second.object_id.as_str(), "3");

    listener.stop().unwrap();
}

#[test]
fn main_scene_over_the_wire() {
    let scene = build_main_scene();
    let (producer, mut consumer) = queue::bounded(64);
    let listener =
        OscListener::spawn(loopback(), CommandDecoder::new(DEFAULT_NAMESPACE, producer)).unwrap();

    let sender = UdpSocket::bind(loopback()).unwrap();
    for datagram in encode_packets(&scene.packets).unwrap() {
        sender.send_to(&datagram, listener.local_addr()).unwrap();
    }

    assert!(
        wait_for(|| consumer.len() == scene.commands),
        "expected {} commands, got {}",
        scene.commands,
        consumer.len()
    );
    listener.stop().unwrap();
    assert_eq!(consumer.dropped(), 0);
}

#[test]
fn stop_joins_the_thread() {
    let (producer, _consumer) = queue::bounded(4);
    let listener =
        OscListener::spawn(loopback(), CommandDecoder::new(DEFAULT_NAMESPACE, producer)).unwrap();
    assert!(!listener.is_finished());
    listener.stop().unwrap();
}

#[test]
fn bind_conflict_is_reported() {
    let taken = UdpSocket::bind(loopback()).unwrap();
    let (producer, _consumer) = queue::bounded(4);
    let result = OscListener::spawn(
        taken.local_addr().unwrap(),
        CommandDecoder::new(DEFAULT_NAMESPACE, producer),
    );
    assert!(matches!(result, Err(oscscene::TransportError::Bind { .. })));
}
