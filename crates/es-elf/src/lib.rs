//! ELF64 object-file introspection engine for elfscope
//!
//! Parses the executable header, program headers, section headers and
//! symbol table of an ELF64 binary, resolves names through the
//! cross-referenced string tables, and extracts the raw bytes of named data
//! objects. Every offset and count declared inside the file is treated as
//! untrusted and bounds-checked against the file's real length.

pub mod error;
pub mod header;
pub mod object;
pub mod reader;
pub mod strtab;
pub mod symtab;
pub mod tables;

pub use error::{ElfError, Result};
pub use header::{Elf64Header, ObjectKind, ELF_MAGIC};
pub use object::ElfObject;
pub use symtab::{Elf64Sym, SymbolKind, SymbolTable};
pub use tables::{Elf64Phdr, Elf64Shdr, SectionKind, SegmentKind};
