//! Symbol table records and loading.

use std::io::{Read, Seek};

use tracing::{debug, info};

use crate::tables::{load_table, sht, Elf64Shdr, TableEntry};
use crate::Result;

/// Symbol binding
pub const STB_LOCAL: u8 = 0;
pub const STB_GLOBAL: u8 = 1;
pub const STB_WEAK: u8 = 2;

/// Symbol type
pub const STT_NOTYPE: u8 = 0;
pub const STT_OBJECT: u8 = 1;
pub const STT_FUNC: u8 = 2;
pub const STT_SECTION: u8 = 3;
pub const STT_FILE: u8 = 4;
pub const STT_COMMON: u8 = 5;
pub const STT_TLS: u8 = 6;

/// Section index sentinels in `st_shndx`
pub const SHN_UNDEF: u16 = 0;
pub const SHN_LORESERVE: u16 = 0xff00;

/// ELF symbol table entry (64-bit)
#[derive(Debug, Clone, Copy, Default)]
pub struct Elf64Sym {
    pub st_name: u32,
    pub st_info: u8,
    pub st_other: u8,
    pub st_shndx: u16,
    pub st_value: u64,
    pub st_size: u64,
}

impl TableEntry for Elf64Sym {
    const SIZE: usize = 24;

    fn parse(buf: &[u8]) -> Self {
        Self {
            st_name: u32::from_le_bytes([buf[0], buf[1], buf[2], buf[3]]),
            st_info: buf[4],
            st_other: buf[5],
            st_shndx: u16::from_le_bytes([buf[6], buf[7]]),
            st_value: u64::from_le_bytes([
                buf[8], buf[9], buf[10], buf[11], buf[12], buf[13], buf[14], buf[15],
            ]),
            st_size: u64::from_le_bytes([
                buf[16], buf[17], buf[18], buf[19], buf[20], buf[21], buf[22], buf[23],
            ]),
        }
    }
}

impl Elf64Sym {
    /// Symbol binding, from the high 4 bits of `st_info`.
    pub fn binding(&self) -> u8 {
        self.st_info >> 4
    }

    /// Symbol type, from the low 4 bits of `st_info`.
    pub fn sym_type(&self) -> u8 {
        self.st_info & 0x0F
    }

    /// Symbol type as an enumerated view.
    pub fn kind(&self) -> SymbolKind {
        SymbolKind::from(self.sym_type())
    }

    /// Check if the symbol is a data object.
    pub fn is_object(&self) -> bool {
        self.sym_type() == STT_OBJECT
    }

    /// Check if `st_shndx` references a real section rather than a
    /// sentinel (`SHN_UNDEF`, `SHN_ABS`, `SHN_COMMON`, ...).
    pub fn has_defined_section(&self) -> bool {
        self.st_shndx != SHN_UNDEF && self.st_shndx < SHN_LORESERVE
    }
}

/// Symbol type, from the low 4 bits of `st_info`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SymbolKind {
    NoType,
    Object,
    Func,
    Section,
    File,
    Common,
    Tls,
    Unknown(u8),
}

impl From<u8> for SymbolKind {
    fn from(value: u8) -> Self {
        match value {
            STT_NOTYPE => SymbolKind::NoType,
            STT_OBJECT => SymbolKind::Object,
            STT_FUNC => SymbolKind::Func,
            STT_SECTION => SymbolKind::Section,
            STT_FILE => SymbolKind::File,
            STT_COMMON => SymbolKind::Common,
            STT_TLS => SymbolKind::Tls,
            other => SymbolKind::Unknown(other),
        }
    }
}

/// A loaded symbol table together with the index of the section header it
/// came from. The `sh_link` of that section names the string table holding
/// the symbols' names.
#[derive(Debug, Clone)]
pub struct SymbolTable {
    pub symbols: Vec<Elf64Sym>,
    pub section_index: usize,
}

/// Locate and load the symbol table.
///
/// Only the first `SHT_SYMTAB` section is honored; a file without one yields
/// `Ok(None)` and symbol queries downstream fail with `NoSymbolTable`.
pub fn load_symbols<R: Read + Seek>(
    reader: &mut R,
    section_headers: &[Elf64Shdr],
    file_len: u64,
) -> Result<Option<SymbolTable>> {
    let Some(section_index) = section_headers
        .iter()
        .position(|sh| sh.sh_type == sht::SYMTAB)
    else {
        debug!("no symbol table section");
        return Ok(None);
    };

    let section = &section_headers[section_index];
    let count = section.sh_size / Elf64Sym::SIZE as u64;
    let symbols = load_table(reader, section.sh_offset, count, file_len)?;

    info!(
        "loaded {} symbols from section {}",
        symbols.len(),
        section_index
    );

    Ok(Some(SymbolTable {
        symbols,
        section_index,
    }))
}
