//! Error types for the ELF introspection engine

use thiserror::Error;

/// Errors produced while parsing or querying an ELF object.
///
/// Parse-time failures abort the whole parse; query-time failures
/// (symbol and object lookups) leave the parsed object usable.
#[derive(Error, Debug)]
pub enum ElfError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("malformed ELF header: {0}")]
    MalformedHeader(String),

    #[error(
        "malformed table: {count} entries of {entry_size} bytes at offset 0x{offset:x} \
         exceed file length {file_len}"
    )]
    MalformedTable {
        offset: u64,
        count: u64,
        entry_size: u64,
        file_len: u64,
    },

    #[error("string offset 0x{offset:x} out of bounds for string table of {table_size} bytes")]
    OutOfBounds { offset: u64, table_size: u64 },

    #[error("file has no symbol table")]
    NoSymbolTable,

    #[error("symbol not found: {0}")]
    SymbolNotFound(String),

    #[error("symbol '{0}' is not a data object")]
    NotAnObject(String),

    #[error("section index {0} does not reference a valid section")]
    UndefinedSection(u32),

    #[error(
        "object at 0x{value:x}..0x{end:x} lies outside its section's address range \
         0x{section_start:x}..0x{section_end:x}"
    )]
    AddressOutOfRange {
        value: u64,
        end: u64,
        section_start: u64,
        section_end: u64,
    },
}

pub type Result<T> = std::result::Result<T, ElfError>;
