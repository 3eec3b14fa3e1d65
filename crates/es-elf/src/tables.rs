//! Fixed-size on-disk table loading.
//!
//! Program headers, section headers and symbols are all arrays of
//! fixed-size records; [`load_table`] is the single generic routine that
//! loads any of them, bounds-checked against the file length.

use std::io::{Read, Seek};

use tracing::debug;

use crate::reader::read_at;
use crate::{ElfError, Result};

/// Program header types
pub mod pt {
    pub const NULL: u32 = 0;
    pub const LOAD: u32 = 1;
    pub const DYNAMIC: u32 = 2;
    pub const INTERP: u32 = 3;
    pub const NOTE: u32 = 4;
    pub const SHLIB: u32 = 5;
    pub const PHDR: u32 = 6;
    pub const TLS: u32 = 7;
    pub const GNU_EH_FRAME: u32 = 0x6474_e550;
    pub const GNU_STACK: u32 = 0x6474_e551;
    pub const GNU_RELRO: u32 = 0x6474_e552;
}

/// Section header types
pub mod sht {
    pub const NULL: u32 = 0;
    pub const PROGBITS: u32 = 1;
    pub const SYMTAB: u32 = 2;
    pub const STRTAB: u32 = 3;
    pub const RELA: u32 = 4;
    pub const HASH: u32 = 5;
    pub const DYNAMIC: u32 = 6;
    pub const NOTE: u32 = 7;
    pub const NOBITS: u32 = 8;
    pub const REL: u32 = 9;
    pub const DYNSYM: u32 = 11;
}

/// A fixed-size on-disk record.
pub trait TableEntry: Sized {
    /// On-disk size of one record in bytes.
    const SIZE: usize;

    /// Decode one record from exactly [`Self::SIZE`] bytes.
    fn parse(buf: &[u8]) -> Self;
}

/// Load `count` contiguous fixed-size records starting at `offset`.
///
/// A count of zero is a legitimate empty table, not an error. A table whose
/// declared extent runs past `file_len` is rejected before any read happens.
pub fn load_table<T: TableEntry, R: Read + Seek>(
    reader: &mut R,
    offset: u64,
    count: u64,
    file_len: u64,
) -> Result<Vec<T>> {
    if count == 0 {
        return Ok(Vec::new());
    }

    let entry_size = T::SIZE as u64;
    let table_end = count
        .checked_mul(entry_size)
        .and_then(|total| offset.checked_add(total));
    match table_end {
        Some(end) if end <= file_len => {}
        _ => {
            return Err(ElfError::MalformedTable {
                offset,
                count,
                entry_size,
                file_len,
            });
        }
    }

    debug!(
        "loading {} records of {} bytes at offset 0x{:x}",
        count, entry_size, offset
    );

    let bytes = read_at(reader, offset, (count * entry_size) as usize)?;
    let mut entries = Vec::with_capacity(count as usize);
    for chunk in bytes.chunks_exact(T::SIZE) {
        entries.push(T::parse(chunk));
    }

    Ok(entries)
}

/// ELF program header (64-bit)
#[derive(Debug, Clone, Copy, Default)]
pub struct Elf64Phdr {
    pub p_type: u32,
    pub p_flags: u32,
    pub p_offset: u64,
    pub p_vaddr: u64,
    pub p_paddr: u64,
    pub p_filesz: u64,
    pub p_memsz: u64,
    pub p_align: u64,
}

impl TableEntry for Elf64Phdr {
    const SIZE: usize = 56;

    fn parse(buf: &[u8]) -> Self {
        Self {
            p_type: u32::from_le_bytes([buf[0], buf[1], buf[2], buf[3]]),
            p_flags: u32::from_le_bytes([buf[4], buf[5], buf[6], buf[7]]),
            p_offset: u64::from_le_bytes([
                buf[8], buf[9], buf[10], buf[11], buf[12], buf[13], buf[14], buf[15],
            ]),
            p_vaddr: u64::from_le_bytes([
                buf[16], buf[17], buf[18], buf[19], buf[20], buf[21], buf[22], buf[23],
            ]),
            p_paddr: u64::from_le_bytes([
                buf[24], buf[25], buf[26], buf[27], buf[28], buf[29], buf[30], buf[31],
            ]),
            p_filesz: u64::from_le_bytes([
                buf[32], buf[33], buf[34], buf[35], buf[36], buf[37], buf[38], buf[39],
            ]),
            p_memsz: u64::from_le_bytes([
                buf[40], buf[41], buf[42], buf[43], buf[44], buf[45], buf[46], buf[47],
            ]),
            p_align: u64::from_le_bytes([
                buf[48], buf[49], buf[50], buf[51], buf[52], buf[53], buf[54], buf[55],
            ]),
        }
    }
}

impl Elf64Phdr {
    /// Segment type as an enumerated view of `p_type`.
    pub fn kind(&self) -> SegmentKind {
        SegmentKind::from(self.p_type)
    }
}

/// Segment type, from `p_type`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SegmentKind {
    Null,
    Load,
    Dynamic,
    Interp,
    Note,
    Shlib,
    Phdr,
    Tls,
    GnuEhFrame,
    GnuStack,
    GnuRelro,
    Unknown(u32),
}

impl From<u32> for SegmentKind {
    fn from(value: u32) -> Self {
        match value {
            pt::NULL => SegmentKind::Null,
            pt::LOAD => SegmentKind::Load,
            pt::DYNAMIC => SegmentKind::Dynamic,
            pt::INTERP => SegmentKind::Interp,
            pt::NOTE => SegmentKind::Note,
            pt::SHLIB => SegmentKind::Shlib,
            pt::PHDR => SegmentKind::Phdr,
            pt::TLS => SegmentKind::Tls,
            pt::GNU_EH_FRAME => SegmentKind::GnuEhFrame,
            pt::GNU_STACK => SegmentKind::GnuStack,
            pt::GNU_RELRO => SegmentKind::GnuRelro,
            other => SegmentKind::Unknown(other),
        }
    }
}

/// ELF section header (64-bit)
#[derive(Debug, Clone, Copy, Default)]
pub struct Elf64Shdr {
    pub sh_name: u32,
    pub sh_type: u32,
    pub sh_flags: u64,
    pub sh_addr: u64,
    pub sh_offset: u64,
    pub sh_size: u64,
    pub sh_link: u32,
    pub sh_info: u32,
    pub sh_addralign: u64,
    pub sh_entsize: u64,
}

impl TableEntry for Elf64Shdr {
    const SIZE: usize = 64;

    fn parse(buf: &[u8]) -> Self {
        Self {
            sh_name: u32::from_le_bytes([buf[0], buf[1], buf[2], buf[3]]),
            sh_type: u32::from_le_bytes([buf[4], buf[5], buf[6], buf[7]]),
            sh_flags: u64::from_le_bytes([
                buf[8], buf[9], buf[10], buf[11], buf[12], buf[13], buf[14], buf[15],
            ]),
            sh_addr: u64::from_le_bytes([
                buf[16], buf[17], buf[18], buf[19], buf[20], buf[21], buf[22], buf[23],
            ]),
            sh_offset: u64::from_le_bytes([
                buf[24], buf[25], buf[26], buf[27], buf[28], buf[29], buf[30], buf[31],
            ]),
            sh_size: u64::from_le_bytes([
                buf[32], buf[33], buf[34], buf[35], buf[36], buf[37], buf[38], buf[39],
            ]),
            sh_link: u32::from_le_bytes([buf[40], buf[41], buf[42], buf[43]]),
            sh_info: u32::from_le_bytes([buf[44], buf[45], buf[46], buf[47]]),
            sh_addralign: u64::from_le_bytes([
                buf[48], buf[49], buf[50], buf[51], buf[52], buf[53], buf[54], buf[55],
            ]),
            sh_entsize: u64::from_le_bytes([
                buf[56], buf[57], buf[58], buf[59], buf[60], buf[61], buf[62], buf[63],
            ]),
        }
    }
}

impl Elf64Shdr {
    /// Section type as an enumerated view of `sh_type`.
    pub fn kind(&self) -> SectionKind {
        SectionKind::from(self.sh_type)
    }
}

/// Section type, from `sh_type`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SectionKind {
    Null,
    Progbits,
    Symtab,
    Strtab,
    Rela,
    Hash,
    Dynamic,
    Note,
    Nobits,
    Rel,
    Dynsym,
    Unknown(u32),
}

impl From<u32> for SectionKind {
    fn from(value: u32) -> Self {
        match value {
            sht::NULL => SectionKind::Null,
            sht::PROGBITS => SectionKind::Progbits,
            sht::SYMTAB => SectionKind::Symtab,
            sht::STRTAB => SectionKind::Strtab,
            sht::RELA => SectionKind::Rela,
            sht::HASH => SectionKind::Hash,
            sht::DYNAMIC => SectionKind::Dynamic,
            sht::NOTE => SectionKind::Note,
            sht::NOBITS => SectionKind::Nobits,
            sht::REL => SectionKind::Rel,
            sht::DYNSYM => SectionKind::Dynsym,
            other => SectionKind::Unknown(other),
        }
    }
}
