//! Object attribute memory: 40 entries of 4 bytes at $FE00-$FE9F.
use crate::common::address::oam_offset;
use crate::common::address::OAM_SIZE;
use crate::common::address::OAM_START;

pub const OAM_ENTRY_COUNT: usize = 40;
pub const OAM_ENTRY_BYTES: usize = 4;

pub struct Oam {
    memory: Vec<u8>,
}

impl Oam {
    #[allow(clippy::new_without_default)]
    pub fn new() -> Self {
        Self {
            memory: vec![0; OAM_SIZE],
        }
    }

    /// Reads the byte at hardware address `addr`. Addresses outside OAM read as $FF.
    pub fn read(&self, addr: u16) -> u8 {
        match oam_offset(addr) {
            Some(offset) => self.memory[offset],
            None => 0xFF,
        }
    }

    /// Writes the byte at hardware address `addr`. Addresses outside OAM are ignored.
    pub fn write(&mut self, addr: u16, value: u8) {
        if let Some(offset) = oam_offset(addr) {
            self.memory[offset] = value;
        }
    }

    /// Hardware address of the first byte of entry `index`.
    pub fn entry_address(index: usize) -> u16 {
        OAM_START + (index * OAM_ENTRY_BYTES) as u16
    }

    /// Raw Y, X, tile and flag bytes of entry `index`. Entries past 39 read as $FF.
    pub fn entry(&self, index: usize) -> [u8; 4] {
        if index >= OAM_ENTRY_COUNT {
            return [0xFF; 4];
        }
        let start = index * OAM_ENTRY_BYTES;
        let mut data = [0; 4];
        data.copy_from_slice(&self.memory[start..start + OAM_ENTRY_BYTES]);
        data
    }

    pub fn set_entry(&mut self, index: usize, data: [u8; 4]) {
        if index >= OAM_ENTRY_COUNT {
            return;
        }
        let start = index * OAM_ENTRY_BYTES;
        self.memory[start..start + OAM_ENTRY_BYTES].copy_from_slice(&data);
    }

    pub fn clear(&mut self) {
        self.memory.fill(0);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_read_write() {
        let mut oam = Oam::new();
        oam.write(0xFE00, 0x10);
        oam.write(0xFE9F, 0x20);
        oam.write(0xFEA0, 0x30);
        assert_eq!(oam.read(0xFE00), 0x10);
        assert_eq!(oam.read(0xFE9F), 0x20);
        assert_eq!(oam.read(0xFEA0), 0xFF);
        assert_eq!(oam.read(0xFDFF), 0xFF);
    }

    #[test]
    fn test_entries() {
        let mut oam = Oam::new();
        oam.set_entry(39, [16, 8, 0x42, 0x80]);
        assert_eq!(Oam::entry_address(39), 0xFE9C);
        assert_eq!(oam.read(0xFE9E), 0x42);
        assert_eq!(oam.entry(39), [16, 8, 0x42, 0x80]);
        assert_eq!(oam.entry(40), [0xFF; 4]);
        oam.set_entry(40, [1, 2, 3, 4]);
        oam.clear();
        assert_eq!(oam.entry(39), [0; 4]);
    }
}
