//! ELF executable header (64-bit)

use std::io::{Read, Seek};

use tracing::debug;

use crate::reader::read_at;
use crate::{ElfError, Result};

/// ELF magic bytes
pub const ELF_MAGIC: [u8; 4] = [0x7F, b'E', b'L', b'F'];

/// e_ident index of the file class byte
pub const EI_CLASS: usize = 4;
/// e_ident index of the data encoding byte
pub const EI_DATA: usize = 5;

/// 64-bit file class
pub const ELFCLASS64: u8 = 2;
/// Little-endian data encoding
pub const ELFDATA2LSB: u8 = 1;

/// ELF file header (64-bit)
#[derive(Debug, Clone, Copy, Default)]
pub struct Elf64Header {
    pub e_ident: [u8; 16],
    pub e_type: u16,
    pub e_machine: u16,
    pub e_version: u32,
    pub e_entry: u64,
    pub e_phoff: u64,
    pub e_shoff: u64,
    pub e_flags: u32,
    pub e_ehsize: u16,
    pub e_phentsize: u16,
    pub e_phnum: u16,
    pub e_shentsize: u16,
    pub e_shnum: u16,
    pub e_shstrndx: u16,
}

/// Object file type, from `e_type`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ObjectKind {
    None,
    Relocatable,
    Executable,
    Shared,
    Core,
    Unknown(u16),
}

impl From<u16> for ObjectKind {
    fn from(value: u16) -> Self {
        match value {
            0 => ObjectKind::None,
            1 => ObjectKind::Relocatable,
            2 => ObjectKind::Executable,
            3 => ObjectKind::Shared,
            4 => ObjectKind::Core,
            other => ObjectKind::Unknown(other),
        }
    }
}

impl Elf64Header {
    /// On-disk size of the ELF64 header.
    pub const SIZE: usize = 64;

    /// Parse the executable header at file offset 0.
    ///
    /// Validates the magic bytes, ELFCLASS64 and little-endian encoding.
    /// The original implementation stored the identification bytes without
    /// checking them; the validation here is a documented hardening on top
    /// of its behavior.
    pub fn parse<R: Read + Seek>(reader: &mut R, file_len: u64) -> Result<Self> {
        if file_len < Self::SIZE as u64 {
            return Err(ElfError::MalformedHeader(format!(
                "file is {} bytes, need at least {} for an ELF64 header",
                file_len,
                Self::SIZE
            )));
        }

        let buf = read_at(reader, 0, Self::SIZE)?;

        let mut e_ident = [0u8; 16];
        e_ident.copy_from_slice(&buf[0..16]);

        if e_ident[0..4] != ELF_MAGIC {
            return Err(ElfError::MalformedHeader(format!(
                "invalid magic bytes {:02X} {:02X} {:02X} {:02X} (expected 7F 45 4C 46)",
                e_ident[0], e_ident[1], e_ident[2], e_ident[3]
            )));
        }
        if e_ident[EI_CLASS] != ELFCLASS64 {
            return Err(ElfError::MalformedHeader(format!(
                "unsupported file class {} (expected {} for ELFCLASS64)",
                e_ident[EI_CLASS],
                ELFCLASS64
            )));
        }
        if e_ident[EI_DATA] != ELFDATA2LSB {
            return Err(ElfError::MalformedHeader(format!(
                "unsupported data encoding {} (expected {} for ELFDATA2LSB)",
                e_ident[EI_DATA],
                ELFDATA2LSB
            )));
        }

        let header = Self {
            e_ident,
            e_type: u16::from_le_bytes([buf[16], buf[17]]),
            e_machine: u16::from_le_bytes([buf[18], buf[19]]),
            e_version: u32::from_le_bytes([buf[20], buf[21], buf[22], buf[23]]),
            e_entry: u64::from_le_bytes([
                buf[24], buf[25], buf[26], buf[27], buf[28], buf[29], buf[30], buf[31],
            ]),
            e_phoff: u64::from_le_bytes([
                buf[32], buf[33], buf[34], buf[35], buf[36], buf[37], buf[38], buf[39],
            ]),
            e_shoff: u64::from_le_bytes([
                buf[40], buf[41], buf[42], buf[43], buf[44], buf[45], buf[46], buf[47],
            ]),
            e_flags: u32::from_le_bytes([buf[48], buf[49], buf[50], buf[51]]),
            e_ehsize: u16::from_le_bytes([buf[52], buf[53]]),
            e_phentsize: u16::from_le_bytes([buf[54], buf[55]]),
            e_phnum: u16::from_le_bytes([buf[56], buf[57]]),
            e_shentsize: u16::from_le_bytes([buf[58], buf[59]]),
            e_shnum: u16::from_le_bytes([buf[60], buf[61]]),
            e_shstrndx: u16::from_le_bytes([buf[62], buf[63]]),
        };

        debug!(
            "parsed ELF header: type={:?}, entry=0x{:x}, phnum={}, shnum={}",
            header.kind(),
            header.e_entry,
            header.e_phnum,
            header.e_shnum
        );

        Ok(header)
    }

    /// Object file type as an enumerated view of `e_type`.
    pub fn kind(&self) -> ObjectKind {
        ObjectKind::from(self.e_type)
    }
}
