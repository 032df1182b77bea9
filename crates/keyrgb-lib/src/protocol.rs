//! Protocol constants for the SONiX RGB keyboard (VID `0x0c45`, PID `0x8508`).
//!
//! The lighting command is a single fixed-size output report. Everything
//! except five bytes is a constant template captured from the vendor tool:
//!
//! | Offset | Meaning |
//! |---|---|
//! | 14, 15, 16 | key backlight R, G, B |
//! | 28 | accent line colour code |
//! | 30 | volume knob colour code |
//!
//! The line/volume codes are the hardware's own numbering, not theme indices
//! (see [`crate::lighting::ThemeMapping`]).

// ── Device identity ──

/// SONiX vendor id. Matched exactly.
pub const SONIX_VID: u16 = 0x0c45;

/// Keyboard product id. Matched exactly.
pub const KEYBOARD_PID: u16 = 0x8508;

/// Vendor-defined usage page of the lighting interface (65308).
pub const LIGHTING_USAGE_PAGE: u16 = 0xFF1C;

/// Usage of the lighting interface (146).
pub const LIGHTING_USAGE: u16 = 0x92;

// ── Lighting packet ──

/// Size of a lighting packet on the wire.
pub const PACKET_LEN: usize = 66;

/// Key backlight red channel.
pub const OFF_KEY_R: usize = 14;
/// Key backlight green channel.
pub const OFF_KEY_G: usize = 15;
/// Key backlight blue channel.
pub const OFF_KEY_B: usize = 16;
/// Accent line colour code.
pub const OFF_LINE_COLOR: usize = 28;
/// Volume knob colour code.
pub const OFF_VOLUME_COLOR: usize = 30;

/// Offsets that [`crate::lighting::LightingPacket::encode`] may change.
pub const MUTABLE_OFFSETS: [usize; 5] = [
    OFF_KEY_R,
    OFF_KEY_G,
    OFF_KEY_B,
    OFF_LINE_COLOR,
    OFF_VOLUME_COLOR,
];

/// Base lighting report: white keys, purple accents.
///
/// The first 64 bytes are the captured command
/// (`043b0406 22000000 00060301 fa00ffff ff000000 00000000 00000004 06000800 …`);
/// the last two bytes are zero padding up to [`PACKET_LEN`].
pub const BASE_PACKET: [u8; PACKET_LEN] = [
    0x04, 0x3b, 0x04, 0x06, 0x22, 0x00, 0x00, 0x00, // 0..8
    0x00, 0x06, 0x03, 0x01, 0xfa, 0x00, 0xff, 0xff, // 8..16
    0xff, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, // 16..24
    0x00, 0x00, 0x00, 0x04, 0x06, 0x00, 0x08, 0x00, // 24..32
    0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, // 32..40
    0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, // 40..48
    0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, // 48..56
    0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, // 56..64
    0x00, 0x00, // padding
];

// ── Acknowledgement ──

/// Maximum acknowledgement size read back after each packet.
pub const ACK_LEN: usize = 64;

/// How long to wait for the acknowledgement report.
pub const ACK_TIMEOUT_MS: i32 = 250;
