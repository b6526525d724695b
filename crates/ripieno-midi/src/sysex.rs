//! Recognition of the bit-exact System Exclusive sequences a GM/GS/XG tone
//! module is expected to react to. Everything else is a SysEx the
//! instrument doesn't understand and is logged, not acted on.

/// A system-level action decoded from a recognized SysEx sequence.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SystemAction {
    /// `F0 7E <dev> 09 01 F7`
    Gm1Reset,
    /// `F0 7E <dev> 09 03 F7`
    Gm2Reset,
    /// `F0 41 <dev> 42 12 40 00 7F 00 41 F7`
    GsReset,
    /// `F0 41 <dev> 42 12 40 1<ch> 15 <map> <sum> F7`
    GsDrumPart { channel: u8, is_drum: bool },
    /// `F0 43 <dev> 4C 00 00 7E 00 F7`
    XgReset,
}

/// Attempt to recognize `bytes` (including the `F0`/`F7` framing) as one of
/// the sequences named in spec.md §6. Returns `None` for anything else,
/// including well-formed but unrecognized manufacturer SysEx.
pub fn recognize(bytes: &[u8]) -> Option<SystemAction> {
    if bytes.first() != Some(&0xF0) || bytes.last() != Some(&0xF7) {
        return None;
    }

    match bytes {
        [0xF0, 0x7E, _dev, 0x09, 0x01, 0xF7] => Some(SystemAction::Gm1Reset),
        [0xF0, 0x7E, _dev, 0x09, 0x03, 0xF7] => Some(SystemAction::Gm2Reset),
        [0xF0, 0x41, _dev, 0x42, 0x12, 0x40, 0x00, 0x7F, 0x00, 0x41, 0xF7] => {
            Some(SystemAction::GsReset)
        }
        [0xF0, 0x43, _dev, 0x4C, 0x00, 0x00, 0x7E, 0x00, 0xF7] => Some(SystemAction::XgReset),
        [0xF0, 0x41, _dev, 0x42, 0x12, 0x40, addr, 0x15, map, _sum, 0xF7] => {
            // addr = 0x1<ch>: high nibble is the fixed 1, low nibble the channel.
            if addr & 0xF0 != 0x10 {
                return None;
            }
            let channel = addr & 0x0F;
            Some(SystemAction::GsDrumPart {
                channel,
                is_drum: *map != 0,
            })
        }
        _ => None,
    }
}

/// Build a GS Drum Part SysEx for `channel` (0-15) with the given
/// `is_drum` flag, using the Roland GS checksum (two's complement of the
/// sum of the address + data bytes, mod 128).
pub fn gs_drum_part(channel: u8, is_drum: bool) -> Vec<u8> {
    let addr = [0x40u8, 0x10 | (channel & 0x0F), 0x15];
    let map = if is_drum { 1u8 } else { 0u8 };
    let checksum = gs_checksum(&[addr[0], addr[1], addr[2], map]);
    vec![
        0xF0, 0x41, 0x00, 0x42, 0x12, addr[0], addr[1], addr[2], map, checksum, 0xF7,
    ]
}

fn gs_checksum(bytes: &[u8]) -> u8 {
    let sum: u32 = bytes.iter().map(|&b| b as u32).sum();
    (0x80 - (sum % 0x80) as u8 % 0x80) % 0x80
}
