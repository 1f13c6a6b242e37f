// 128-bit peer address used by the intercore transport
//
// GUID-shaped: u32, u16, u16, then 8 raw bytes. On the wire the three
// integer segments are little-endian (as laid out in memory by both
// cores); seg_3_4 is copied as-is.

use core::fmt;

pub const COMPONENT_ID_LEN: usize = 16;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct ComponentId {
    pub seg_0: u32,
    pub seg_1: u16,
    pub seg_2: u16,
    pub seg_3_4: [u8; 8],
}

impl ComponentId {
    pub const fn new(seg_0: u32, seg_1: u16, seg_2: u16, seg_3_4: [u8; 8]) -> Self {
        Self {
            seg_0,
            seg_1,
            seg_2,
            seg_3_4,
        }
    }

    pub fn to_bytes(&self) -> [u8; COMPONENT_ID_LEN] {
        let mut out = [0u8; COMPONENT_ID_LEN];
        out[0..4].copy_from_slice(&self.seg_0.to_le_bytes());
        out[4..6].copy_from_slice(&self.seg_1.to_le_bytes());
        out[6..8].copy_from_slice(&self.seg_2.to_le_bytes());
        out[8..16].copy_from_slice(&self.seg_3_4);
        out
    }

    pub fn from_bytes(b: &[u8; COMPONENT_ID_LEN]) -> Self {
        let mut seg_3_4 = [0u8; 8];
        seg_3_4.copy_from_slice(&b[8..16]);
        Self {
            seg_0: u32::from_le_bytes([b[0], b[1], b[2], b[3]]),
            seg_1: u16::from_le_bytes([b[4], b[5]]),
            seg_2: u16::from_le_bytes([b[6], b[7]]),
            seg_3_4,
        }
    }
}

// 8-4-4-4-12, lowercase, zero padded
impl fmt::Display for ComponentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:08x}-{:04x}-{:04x}-", self.seg_0, self.seg_1, self.seg_2)?;
        for b in &self.seg_3_4[..2] {
            write!(f, "{:02x}", b)?;
        }
        f.write_str("-")?;
        for b in &self.seg_3_4[2..] {
            write!(f, "{:02x}", b)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_keeps_field_widths() {
        let id = ComponentId::new(0x0000_0a01, 0x2, 0x30, [0, 1, 2, 3, 4, 5, 6, 0xff]);
        assert_eq!(id.to_string(), "00000a01-0002-0030-0001-0203040506ff");
    }

    #[test]
    fn wire_layout_is_little_endian() {
        let id = ComponentId::new(0x2502_5d2c, 0x66da, 0x4448, [0xba, 0xe1, 0xac, 0x26, 0xfc, 0xdd, 0x36, 0x27]);
        let bytes = id.to_bytes();
        assert_eq!(&bytes[..8], &[0x2c, 0x5d, 0x02, 0x25, 0xda, 0x66, 0x48, 0x44]);
        assert_eq!(&bytes[8..], &id.seg_3_4);
        assert_eq!(ComponentId::from_bytes(&bytes), id);
    }
}
