//! Mapping between OSC argument types and parameter values.

use rosc::{OscMessage, OscPacket, OscType};

use vrcbridge_core::ParamValue;

/// Encode a value as an OSC argument.
///
/// Integers saturate to int32 and floats narrow to float32, since those are
/// the only numeric widths VRChat accepts.
pub fn to_osc(value: &ParamValue) -> OscType {
    match value {
        ParamValue::Bool(b) => OscType::Bool(*b),
        ParamValue::Int(i) => OscType::Int((*i).clamp(i64::from(i32::MIN), i64::from(i32::MAX)) as i32),
        ParamValue::Float(f) => OscType::Float(*f as f32),
        ParamValue::String(s) => OscType::String(s.clone()),
    }
}

/// Decode an OSC argument. Blobs, timetags, MIDI, colors, arrays and the
/// nil/infinitum markers have no parameter representation.
pub fn from_osc(arg: OscType) -> Option<ParamValue> {
    match arg {
        OscType::Int(i) => Some(ParamValue::Int(i64::from(i))),
        OscType::Long(i) => Some(ParamValue::Int(i)),
        OscType::Float(f) => Some(ParamValue::Float(f64::from(f))),
        OscType::Double(f) => Some(ParamValue::Float(f)),
        OscType::Bool(b) => Some(ParamValue::Bool(b)),
        OscType::String(s) => Some(ParamValue::String(s)),
        OscType::Char(c) => Some(ParamValue::String(c.to_string())),
        _ => None,
    }
}

/// Inbound message arguments by wire position. Unsupported arguments keep
/// their slot as `None`.
pub type OscArgs = Vec<Option<ParamValue>>;

/// Convert a message's arguments positionally.
pub fn message_args(args: Vec<OscType>) -> OscArgs {
    args.into_iter().map(from_osc).collect()
}

/// Flatten a packet into its messages, descending into nested bundles.
pub fn flatten(packet: OscPacket) -> Vec<OscMessage> {
    let mut out = Vec::new();
    collect(packet, &mut out);
    out
}

fn collect(packet: OscPacket, out: &mut Vec<OscMessage>) {
    match packet {
        OscPacket::Message(msg) => out.push(msg),
        OscPacket::Bundle(bundle) => {
            for inner in bundle.content {
                collect(inner, out);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rosc::{OscBundle, OscTime};

    fn msg(addr: &str) -> OscPacket {
        OscPacket::Message(OscMessage {
            addr: addr.into(),
            args: vec![],
        })
    }

    #[test]
    fn encode_narrows_numbers() {
        assert_eq!(to_osc(&ParamValue::Int(5)), OscType::Int(5));
        assert_eq!(to_osc(&ParamValue::Int(i64::MAX)), OscType::Int(i32::MAX));
        assert_eq!(to_osc(&ParamValue::Float(0.5)), OscType::Float(0.5));
        assert_eq!(to_osc(&ParamValue::Bool(true)), OscType::Bool(true));
    }

    #[test]
    fn decode_widens_numbers() {
        assert_eq!(from_osc(OscType::Int(-2)), Some(ParamValue::Int(-2)));
        assert_eq!(from_osc(OscType::Float(0.25)), Some(ParamValue::Float(0.25)));
        assert_eq!(from_osc(OscType::Double(1.5)), Some(ParamValue::Float(1.5)));
        assert_eq!(from_osc(OscType::Char('x')), Some(ParamValue::String("x".into())));
    }

    #[test]
    fn unsupported_args_keep_their_slot() {
        let args = vec![OscType::Nil, OscType::Int(1), OscType::Blob(vec![0, 1])];
        assert_eq!(message_args(args), vec![None, Some(ParamValue::Int(1)), None]);
    }

    #[test]
    fn leading_nil_does_not_shift_later_args() {
        let mut args = vec![OscType::Nil];
        args.extend((1..=6).map(|i| OscType::Float(i as f32)));
        let decoded = message_args(args);
        assert_eq!(decoded.len(), 7);
        assert_eq!(decoded[0], None);
        assert_eq!(decoded[3], Some(ParamValue::Float(3.0)));
        assert_eq!(decoded[6], Some(ParamValue::Float(6.0)));
    }

    #[test]
    fn nested_bundles_flatten_in_order() {
        let inner = OscPacket::Bundle(OscBundle {
            timetag: OscTime {
                seconds: 0,
                fractional: 1,
            },
            content: vec![msg("/b"), msg("/c")],
        });
        let outer = OscPacket::Bundle(OscBundle {
            timetag: OscTime {
                seconds: 0,
                fractional: 1,
            },
            content: vec![msg("/a"), inner, msg("/d")],
        });
        let addrs: Vec<String> = flatten(outer).into_iter().map(|m| m.addr).collect();
        assert_eq!(addrs, vec!["/a", "/b", "/c", "/d"]);
    }
}
