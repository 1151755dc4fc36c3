//! Decoding of inbound OSC messages into [`Command`] records.
//!
//! Each address has a fixed argument schema. The first argument is always the object id
//! (string, int or float, normalized to a string); the rest are positional. Numeric slots
//! accept either an `i32` or an `f32`. A message that does not match its schema is discarded
//! as a whole, and addresses outside the table are ignored.

use rosc::{OscMessage, OscPacket, OscType};

use crate::color::Color;
use crate::command::{Command, CommandKind, Point};
use crate::error::DecodeError;
use crate::id::ObjectId;
use crate::queue::Producer;

pub const DEFAULT_NAMESPACE: &str = "/sg";

/// A numeric slot of the command record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Field {
    X,
    Y,
    Width,
    Height,
    Red,
    Green,
    Blue,
    Alpha,
}

const GEOMETRY_AND_COLOR: &[Field] = &[
    Field::X,
    Field::Y,
    Field::Width,
    Field::Height,
    Field::Red,
    Field::Green,
    Field::Blue,
    Field::Alpha,
];

/// Arguments expected after the object id.
struct Schema {
    /// Leading string argument (the image path).
    payload: bool,
    fields: &'static [Field],
}

impl Schema {
    fn arity(&self) -> usize {
        self.fields.len() + usize::from(self.payload)
    }
}

fn schema(kind: CommandKind) -> Schema {
    let (payload, fields): (bool, &'static [Field]) = match kind {
        CommandKind::CreateOrUpdateLine
        | CommandKind::CreateOrUpdateRect
        | CommandKind::CreateOrUpdateEllipse => (false, GEOMETRY_AND_COLOR),
        CommandKind::CreateOrUpdateImage => (true, GEOMETRY_AND_COLOR),
        CommandKind::Remove => (false, &[]),
        CommandKind::SetPosition => (false, &[Field::X, Field::Y]),
        CommandKind::SetSize => (false, &[Field::Width, Field::Height]),
        CommandKind::SetColor => (false, &[Field::Red, Field::Green, Field::Blue, Field::Alpha]),
        CommandKind::SetChannelRed => (false, &[Field::Red]),
        CommandKind::SetChannelGreen => (false, &[Field::Green]),
        CommandKind::SetChannelBlue => (false, &[Field::Blue]),
        CommandKind::SetChannelAlpha => (false, &[Field::Alpha]),
    };
    Schema { payload, fields }
}

/// Maps an address to a command kind, given the namespace prefix (e.g. `/sg`).
pub fn route(namespace: &str, address: &str) -> Option<CommandKind> {
    let method = address.strip_prefix(namespace)?.strip_prefix('/')?;
    let kind = match method {
        "line" => CommandKind::CreateOrUpdateLine,
        "rect" => CommandKind::CreateOrUpdateRect,
        "ellipse" => CommandKind::CreateOrUpdateEllipse,
        "image" => CommandKind::CreateOrUpdateImage,
        "remove" => CommandKind::Remove,
        "position" => CommandKind::SetPosition,
        "size" => CommandKind::SetSize,
        "color" => CommandKind::SetColor,
        "red" => CommandKind::SetChannelRed,
        "green" => CommandKind::SetChannelGreen,
        "blue" => CommandKind::SetChannelBlue,
        "alpha" => CommandKind::SetChannelAlpha,
        _ => return None,
    };
    Some(kind)
}

fn type_name(arg: &OscType) -> &'static str {
    match arg {
        OscType::Int(_) => "int",
        OscType::Float(_) => "float",
        OscType::String(_) => "string",
        OscType::Blob(_) => "blob",
        OscType::Time(_) => "time",
        OscType::Long(_) => "long",
        OscType::Double(_) => "double",
        OscType::Char(_) => "char",
        OscType::Color(_) => "color",
        OscType::Midi(_) => "midi",
        OscType::Bool(_) => "bool",
        OscType::Array(_) => "array",
        OscType::Nil => "nil",
        OscType::Inf => "inf",
        #[allow(unreachable_patterns)]
        _ => "unknown",
    }
}

/// Formats a float id the way a C `%g` conversion does: six significant digits, trailing zeros
/// trimmed, scientific notation below 1e-4 or from 1e6 on.
fn float_id(value: f32) -> String {
    const PRECISION: i32 = 6;

    let value = f64::from(value);
    if value.is_nan() {
        return "nan".to_owned();
    }
    if value.is_infinite() {
        return if value > 0.0 { "inf" } else { "-inf" }.to_owned();
    }

    let scientific = format!("{:.*e}", (PRECISION - 1) as usize, value);
    let (mantissa, exponent) = scientific.split_once('e').unwrap_or((&scientific, "0"));
    let exponent: i32 = exponent.parse().unwrap_or(0);

    if exponent < -4 || exponent >= PRECISION {
        let sign = if exponent < 0 { '-' } else { '+' };
        format!("{}e{sign}{:02}", trim_fraction(mantissa), exponent.abs())
    } else {
        let decimals = (PRECISION - 1 - exponent) as usize;
        trim_fraction(&format!("{value:.decimals$}")).to_owned()
    }
}

fn trim_fraction(number: &str) -> &str {
    if number.contains('.') {
        number.trim_end_matches('0').trim_end_matches('.')
    } else {
        number
    }
}

fn object_id(address: &str, arg: Option<&OscType>) -> Result<ObjectId, DecodeError> {
    let id = match arg {
        None => {
            return Err(DecodeError::MissingId {
                address: address.to_owned(),
            })
        }
        Some(OscType::String(id)) => id.clone(),
        Some(OscType::Int(id)) => id.to_string(),
        Some(OscType::Float(id)) => float_id(*id),
        Some(other) => {
            return Err(DecodeError::InvalidId {
                address: address.to_owned(),
                found: type_name(other),
            })
        }
    };

    if id.is_empty() {
        return Err(DecodeError::EmptyId {
            address: address.to_owned(),
        });
    }
    Ok(ObjectId::from(id))
}

fn numeric(address: &str, index: usize, arg: &OscType) -> Result<f32, DecodeError> {
    match arg {
        OscType::Int(value) => Ok(*value as f32),
        OscType::Float(value) => Ok(*value),
        other => Err(DecodeError::ArgumentType {
            address: address.to_owned(),
            index,
            expected: "int or float",
            found: type_name(other),
        }),
    }
}

fn assign(command: &mut Command, field: Field, value: f32) {
    let Command {
        position,
        size,
        color,
        ..
    } = command;
    match field {
        Field::X => position.x = value,
        Field::Y => position.y = value,
        Field::Width => size.x = value,
        Field::Height => size.y = value,
        Field::Red => color.0[0] = value,
        Field::Green => color.0[1] = value,
        Field::Blue => color.0[2] = value,
        Field::Alpha => color.0[3] = value,
    }
}

/// Decodes one message against the address table.
///
/// Returns `Ok(None)` for addresses outside the table and an error when the arguments do not
/// match the address schema. Never produces a partially filled record.
///
/// # Examples
///
/// ```
/// use oscscene::decoder::decode_message;
/// use oscscene::CommandKind;
/// use rosc::{OscMessage, OscType};
///
/// let message = OscMessage {
///     addr: "/sg/position".to_string(),
///     args: vec![OscType::Int(7), OscType::Float(0.25), OscType::Int(-1)],
/// };
/// let command = decode_message("/sg", &message).unwrap().unwrap();
/// assert_eq!(command.kind, CommandKind::SetPosition);
/// assert_eq!(command.object_id.as_str(), "7");
/// assert_eq!((command.position.x, command.position.y), (0.25, -1.0));
/// ```
pub fn decode_message(
    namespace: &str,
    message: &OscMessage,
) -> Result<Option<Command>, DecodeError> {
    let address = message.addr.as_str();
    let Some(kind) = route(namespace, address) else {
        return Ok(None);
    };

    let mut args = message.args.iter();
    let object_id = object_id(address, args.next())?;

    let schema = schema(kind);
    let rest = args.as_slice();
    if rest.len() != schema.arity() {
        return Err(DecodeError::Arity {
            address: address.to_owned(),
            expected: schema.arity(),
            found: rest.len(),
        });
    }

    let mut command = Command {
        kind,
        object_id,
        position: Point::ZERO,
        size: Point::ZERO,
        color: Color::TRANSPARENT,
        payload: None,
    };

    let mut rest = rest.iter().enumerate();
    if schema.payload {
        if let Some((index, arg)) = rest.next() {
            match arg {
                OscType::String(path) => command.payload = Some(path.clone()),
                other => {
                    return Err(DecodeError::ArgumentType {
                        address: address.to_owned(),
                        index: index + 1,
                        expected: "string",
                        found: type_name(other),
                    })
                }
            }
        }
    }

    for (field, (index, arg)) in schema.fields.iter().zip(rest) {
        // Index counts the id as argument 0.
        let value = numeric(address, index + 1, arg)?;
        assign(&mut command, *field, value);
    }

    Ok(Some(command))
}

/// Decodes packets from the wire and feeds the resulting commands into the queue.
///
/// Owned by the network thread; the render thread never sees it.
pub struct CommandDecoder {
    namespace: String,
    producer: Producer,
    discarded: u64,
}

impl CommandDecoder {
    pub fn new(namespace: impl Into<String>, producer: Producer) -> Self {
        Self {
            namespace: namespace.into(),
            producer,
            discarded: 0,
        }
    }

    pub fn namespace(&self) -> &str {
        &self.namespace
    }

    pub fn producer(&self) -> &Producer {
        &self.producer
    }

    /// Number of messages discarded because they did not match their schema.
    pub fn discarded(&self) -> u64 {
        self.discarded
    }

    /// Decodes one UDP datagram and enqueues every command it carries.
    ///
    /// Returns the number of commands enqueued. Malformed input is logged and discarded.
    pub fn decode_packet(&mut self, bytes: &[u8]) -> usize {
        match rosc::decoder::decode_udp(bytes) {
            Ok((_, packet)) => self.handle_packet(packet),
            Err(error) => {
                self.discarded += 1;
                tracing::warn!(
                    "Discarding datagram: {}",
                    DecodeError::Packet(format!("{error:?}"))
                );
                0
            }
        }
    }

    /// Handles a decoded packet, flattening bundles in order.
    pub fn handle_packet(&mut self, packet: OscPacket) -> usize {
        match packet {
            OscPacket::Message(message) => usize::from(self.handle_message(&message)),
            OscPacket::Bundle(bundle) => bundle
                .content
                .into_iter()
                .map(|packet| self.handle_packet(packet))
                .sum(),
        }
    }

    /// Decodes a single message and enqueues it. Returns true if a command was enqueued.
    pub fn handle_message(&mut self, message: &OscMessage) -> bool {
        match decode_message(&self.namespace, message) {
            Ok(Some(command)) => {
                tracing::trace!(object_id = %command.object_id, kind = ?command.kind, "Decoded");
                self.producer.push(command);
                true
            }
            Ok(None) => {
                tracing::trace!(address = %message.addr, "Ignoring unrouted address");
                false
            }
            Err(error) => {
                self.discarded += 1;
                tracing::warn!("Error while parsing message: {error}");
                false
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::queue;

    fn message(addr: &str, args: Vec<OscType>) -> OscMessage {
        OscMessage {
            addr: addr.to_string(),
            args,
        }
    }

    fn s(value: &str) -> OscType {
        OscType::String(value.to_string())
    }

    #[test]
    fn decodes_rect_with_mixed_numeric_types() {
        let msg = message(
            "/sg/rect",
            vec![
                s("r1"),
                OscType::Int(0),
                OscType::Float(0.5),
                OscType::Int(10),
                OscType::Float(20.0),
                OscType::Int(1),
                OscType::Float(0.0),
                OscType::Float(0.0),
                OscType::Int(1),
            ],
        );
        let command = decode_message("/sg", &msg).unwrap().unwrap();
        assert_eq!(command.kind, CommandKind::CreateOrUpdateRect);
        assert_eq!(command.object_id.as_str(), "r1");
        assert_eq!(command.position, Point::new(0.0, 0.5));
        assert_eq!(command.size, Point::new(10.0, 20.0));
        assert_eq!(command.color, Color::rgba(1.0, 0.0, 0.0, 1.0));
        assert!(command.payload.is_none());
    }

    #[test]
    fn decodes_image_payload() {
        let mut args = vec![s("img"), s("assets/logo.png")];
        args.extend((0..8).map(|i| OscType::Int(i)));
        let command = decode_message("/sg", &message("/sg/image", args))
            .unwrap()
            .unwrap();
        assert_eq!(command.kind, CommandKind::CreateOrUpdateImage);
        assert_eq!(command.payload.as_deref(), Some("assets/logo.png"));
        assert_eq!(command.position, Point::new(0.0, 1.0));
        assert_eq!(command.color, Color::rgba(4.0, 5.0, 6.0, 7.0));
    }

    #[test]
    fn image_path_must_be_a_string() {
        let mut args = vec![s("img"), OscType::Int(3)];
        args.extend((0..8).map(|i| OscType::Int(i)));
        let error = decode_message("/sg", &message("/sg/image", args)).unwrap_err();
        assert!(matches!(
            error,
            DecodeError::ArgumentType {
                index: 1,
                expected: "string",
                ..
            }
        ));
    }

    #[test]
    fn numeric_ids_are_normalized() {
        let remove_int = message("/sg/remove", vec![OscType::Int(42)]);
        let remove_float = message("/sg/remove", vec![OscType::Float(2.5)]);
        let remove_whole = message("/sg/remove", vec![OscType::Float(3.0)]);
        assert_eq!(
            decode_message("/sg", &remove_int).unwrap().unwrap().object_id,
            ObjectId::from("42")
        );
        assert_eq!(
            decode_message("/sg", &remove_float).unwrap().unwrap().object_id,
            ObjectId::from("2.5")
        );
        assert_eq!(
            decode_message("/sg", &remove_whole).unwrap().unwrap().object_id,
            ObjectId::from("3")
        );
    }

    #[test]
    fn float_ids_keep_six_significant_digits() {
        let cases = [
            (1234567.0, "1.23457e+06"),
            (100000.0, "100000"),
            (1000000.0, "1e+06"),
            (0.1, "0.1"),
            (0.0001, "0.0001"),
            (0.00001234, "1.234e-05"),
            (-2.25, "-2.25"),
            (0.0, "0"),
            (f32::INFINITY, "inf"),
        ];
        let failures: Vec<String> = cases
            .iter()
            .filter(|(value, expected)| float_id(*value) != *expected)
            .map(|(value, expected)| format!("{value:?}: expected {expected}, got {}", float_id(*value)))
            .collect();
        assert!(failures.is_empty(), "{}", failures.join("\n"));
    }

    #[test]
    fn single_channel_commands_fill_their_slot() {
        let cases = [
            ("/sg/red", CommandKind::SetChannelRed, 0),
            ("/sg/green", CommandKind::SetChannelGreen, 1),
            ("/sg/blue", CommandKind::SetChannelBlue, 2),
            ("/sg/alpha", CommandKind::SetChannelAlpha, 3),
        ];
        for (address, kind, index) in cases {
            let msg = message(address, vec![s("x"), OscType::Float(0.75)]);
            let command = decode_message("/sg", &msg).unwrap().unwrap();
            assert_eq!(command.kind, kind);
            assert_eq!(command.color.0[index], 0.75);
            assert_eq!(command.color.0.iter().filter(|c| **c != 0.0).count(), 1);
        }
    }

    #[test]
    fn unknown_address_is_ignored() {
        let msg = message("/sg/triangle", vec![s("t")]);
        assert_eq!(decode_message("/sg", &msg), Ok(None));
        let msg = message("/other/rect", vec![s("t")]);
        assert_eq!(decode_message("/sg", &msg), Ok(None));
        let msg = message("/sgrect", vec![s("t")]);
        assert_eq!(decode_message("/sg", &msg), Ok(None));
    }

    #[test]
    fn missing_arguments_are_rejected() {
        let msg = message(
            "/sg/line",
            vec![s("l"), OscType::Int(0), OscType::Int(0), OscType::Int(1)],
        );
        assert_eq!(
            decode_message("/sg", &msg),
            Err(DecodeError::Arity {
                address: "/sg/line".to_string(),
                expected: 8,
                found: 3,
            })
        );
    }

    #[test]
    fn extra_arguments_are_rejected() {
        let msg = message("/sg/remove", vec![s("l"), OscType::Int(0)]);
        assert!(matches!(
            decode_message("/sg", &msg),
            Err(DecodeError::Arity { expected: 0, found: 1, .. })
        ));
    }

    #[test]
    fn wrong_argument_type_is_rejected() {
        let msg = message("/sg/position", vec![s("p"), OscType::Int(1), s("two")]);
        assert!(matches!(
            decode_message("/sg", &msg),
            Err(DecodeError::ArgumentType {
                index: 2,
                found: "string",
                ..
            })
        ));
    }

    #[test]
    fn id_errors() {
        assert!(matches!(
            decode_message("/sg", &message("/sg/remove", vec![])),
            Err(DecodeError::MissingId { .. })
        ));
        assert!(matches!(
            decode_message("/sg", &message("/sg/remove", vec![OscType::Bool(true)])),
            Err(DecodeError::InvalidId { found: "bool", .. })
        ));
        assert!(matches!(
            decode_message("/sg", &message("/sg/remove", vec![s("")])),
            Err(DecodeError::EmptyId { .. })
        ));
    }

    #[test]
    fn custom_namespace() {
        let msg = message("/stage/remove", vec![s("a")]);
        assert!(decode_message("/stage", &msg).unwrap().is_some());
        assert_eq!(decode_message("/sg", &msg), Ok(None));
    }

    #[test]
    fn decoder_enqueues_only_valid_messages() {
        let (producer, mut consumer) = queue::bounded(8);
        let mut decoder = CommandDecoder::new(DEFAULT_NAMESPACE, producer);

        assert!(decoder.handle_message(&message("/sg/remove", vec![s("a")])));
        assert!(!decoder.handle_message(&message("/sg/remove", vec![])));
        assert!(!decoder.handle_message(&message("/sg/unknown", vec![s("a")])));

        assert_eq!(consumer.len(), 1);
        assert_eq!(decoder.discarded(), 1);
        assert_eq!(consumer.pop().unwrap().object_id.as_str(), "a");
    }

    #[test]
    fn bundles_are_flattened_in_order() {
        let (producer, mut consumer) = queue::bounded(8);
        let mut decoder = CommandDecoder::new(DEFAULT_NAMESPACE, producer);

        let inner = OscPacket::Bundle(rosc::OscBundle {
            timetag: rosc::OscTime {
                seconds: 0,
                fractional: 1,
            },
            content: vec![OscPacket::Message(message("/sg/remove", vec![s("b")]))],
        });
        let outer = OscPacket::Bundle(rosc::OscBundle {
            timetag: rosc::OscTime {
                seconds: 0,
                fractional: 1,
            },
            content: vec![
                OscPacket::Message(message("/sg/remove", vec![s("a")])),
                OscPacket::Message(message("/sg/remove", vec![])),
                inner,
            ],
        });
        let bytes = rosc::encoder::encode(&outer).unwrap();

        assert_eq!(decoder.decode_packet(&bytes), 2);
        assert_eq!(consumer.pop().unwrap().object_id.as_str(), "a");
        assert_eq!(consumer.pop().unwrap().object_id.as_str(), "b");
        assert_eq!(decoder.discarded(), 1);
    }

    #[test]
    fn garbage_datagram_is_discarded() {
        let (producer, consumer) = queue::bounded(8);
        let mut decoder = CommandDecoder::new(DEFAULT_NAMESPACE, producer);
        assert_eq!(decoder.decode_packet(&[0xff, 0x00, 0x13]), 0);
        assert!(consumer.is_empty());
        assert_eq!(decoder.discarded(), 1);
    }
}
