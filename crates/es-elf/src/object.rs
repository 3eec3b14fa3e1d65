//! Parsed ELF object and the query surface over it.

use std::io::{Read, Seek};

use tracing::{debug, info};

use crate::header::Elf64Header;
use crate::reader::{read_at, stream_len};
use crate::strtab::resolve_name;
use crate::symtab::{load_symbols, Elf64Sym, SymbolTable};
use crate::tables::{load_table, sht, Elf64Phdr, Elf64Shdr};
use crate::{ElfError, Result};

/// An ELF64 file parsed into memory.
///
/// Owns the reader and every loaded table for its whole lifetime. Built only
/// by [`ElfObject::parse`], which runs the header, program header table,
/// section header table and symbol table loads in that fixed order and
/// aborts on the first failure, so a half-populated object cannot exist.
pub struct ElfObject<R: Read + Seek> {
    reader: R,
    file_len: u64,
    header: Elf64Header,
    program_headers: Vec<Elf64Phdr>,
    section_headers: Vec<Elf64Shdr>,
    symtab: Option<SymbolTable>,
}

impl<R: Read + Seek> ElfObject<R> {
    /// Parse an ELF64 file.
    pub fn parse(mut reader: R) -> Result<Self> {
        let file_len = stream_len(&mut reader)?;
        let header = Elf64Header::parse(&mut reader, file_len)?;
        let program_headers = load_table::<Elf64Phdr, _>(
            &mut reader,
            header.e_phoff,
            header.e_phnum as u64,
            file_len,
        )?;
        let section_headers = load_table::<Elf64Shdr, _>(
            &mut reader,
            header.e_shoff,
            header.e_shnum as u64,
            file_len,
        )?;
        let symtab = load_symbols(&mut reader, &section_headers, file_len)?;

        info!(
            "parsed ELF object: {} program headers, {} sections, {} symbols",
            program_headers.len(),
            section_headers.len(),
            symtab.as_ref().map_or(0, |t| t.symbols.len())
        );

        Ok(Self {
            reader,
            file_len,
            header,
            program_headers,
            section_headers,
            symtab,
        })
    }

    pub fn header(&self) -> &Elf64Header {
        &self.header
    }

    pub fn program_headers(&self) -> &[Elf64Phdr] {
        &self.program_headers
    }

    pub fn section_headers(&self) -> &[Elf64Shdr] {
        &self.section_headers
    }

    /// Loaded symbols, empty if the file has no symbol table.
    pub fn symbols(&self) -> &[Elf64Sym] {
        self.symtab
            .as_ref()
            .map_or(&[], |table| table.symbols.as_slice())
    }

    /// Index of the section holding the symbol table, if one was found.
    pub fn symtab_section_index(&self) -> Option<usize> {
        self.symtab.as_ref().map(|table| table.section_index)
    }

    /// Resolve the name of the section at `index` via the section-name
    /// string table (`e_shstrndx`).
    pub fn section_name(&mut self, index: usize) -> Result<String> {
        let section = self.section(index)?;
        let strtab_index = self.header.e_shstrndx as usize;
        let strtab = self.section(strtab_index)?;
        resolve_name(&mut self.reader, &strtab, section.sh_name as u64, self.file_len)
    }

    /// Resolve the name of the symbol at `index` via the string table linked
    /// from the symbol table section.
    pub fn symbol_name(&mut self, index: usize) -> Result<String> {
        let strtab = self.symbol_strtab()?;
        let symtab = self.symtab.as_ref().ok_or(ElfError::NoSymbolTable)?;
        let sym = symtab
            .symbols
            .get(index)
            .copied()
            .ok_or_else(|| ElfError::SymbolNotFound(format!("#{index}")))?;
        resolve_name(&mut self.reader, &strtab, sym.st_name as u64, self.file_len)
    }

    /// Look up a symbol by name.
    ///
    /// Linear scan in table order; the first exact match wins. Entries whose
    /// name is empty or whose name offset falls outside the string table are
    /// skipped without aborting the scan.
    pub fn find_symbol(&mut self, name: &str) -> Result<(Elf64Sym, usize)> {
        let strtab = self.symbol_strtab()?;
        let symtab = self.symtab.as_ref().ok_or(ElfError::NoSymbolTable)?;

        let file_len = self.file_len;
        for (index, sym) in symtab.symbols.iter().enumerate() {
            let resolved = match resolve_name(&mut self.reader, &strtab, sym.st_name as u64, file_len)
            {
                Ok(resolved) => resolved,
                Err(ElfError::OutOfBounds { .. }) => continue,
                Err(err) => return Err(err),
            };
            if resolved.is_empty() {
                continue;
            }
            if resolved == name {
                debug!("found symbol '{}' at index {}", name, index);
                return Ok((*sym, index));
            }
        }

        Err(ElfError::SymbolNotFound(name.to_string()))
    }

    /// Read the raw bytes of a named `STT_OBJECT` symbol out of the file.
    ///
    /// Returns the object's bytes together with the symbol's index in the
    /// loaded table. The symbol's address range must lie inside the address
    /// range of its containing section.
    pub fn read_object_data(&mut self, name: &str) -> Result<(Vec<u8>, usize)> {
        let (sym, index) = self.find_symbol(name)?;

        if !sym.is_object() {
            return Err(ElfError::NotAnObject(name.to_string()));
        }
        if !sym.has_defined_section() {
            return Err(ElfError::UndefinedSection(sym.st_shndx as u32));
        }
        let section = self.section(sym.st_shndx as usize)?;

        // section-relative arithmetic cannot overflow on crafted values
        let in_range = sym.st_value >= section.sh_addr && {
            let delta = sym.st_value - section.sh_addr;
            delta <= section.sh_size && sym.st_size <= section.sh_size - delta
        };
        if !in_range {
            return Err(ElfError::AddressOutOfRange {
                value: sym.st_value,
                end: sym.st_value.saturating_add(sym.st_size),
                section_start: section.sh_addr,
                section_end: section.sh_addr.saturating_add(section.sh_size),
            });
        }
        self.check_section_extent(&section)?;

        // safe: the object lies inside the section and the section inside
        // the file, so this sum stays below the file length
        let file_offset = section.sh_offset + (sym.st_value - section.sh_addr);
        debug!(
            "reading {} bytes of object '{}' at file offset 0x{:x}",
            sym.st_size, name, file_offset
        );
        let data = read_at(&mut self.reader, file_offset, sym.st_size as usize)?;

        Ok((data, index))
    }

    /// Read a section's raw bytes.
    ///
    /// Empty for zero-sized sections and for `SHT_NOBITS` (which occupies no
    /// file space).
    pub fn read_section(&mut self, index: usize) -> Result<Vec<u8>> {
        let section = self.section(index)?;
        if section.sh_size == 0 || section.sh_type == sht::NOBITS {
            return Ok(Vec::new());
        }
        self.check_section_extent(&section)?;
        read_at(&mut self.reader, section.sh_offset, section.sh_size as usize)
    }

    /// Reject a section whose declared file extent overflows or runs past
    /// the end of the file, before any allocation sized from it.
    fn check_section_extent(&self, section: &Elf64Shdr) -> Result<()> {
        match section.sh_offset.checked_add(section.sh_size) {
            Some(end) if end <= self.file_len => Ok(()),
            _ => Err(ElfError::MalformedTable {
                offset: section.sh_offset,
                count: 1,
                entry_size: section.sh_size,
                file_len: self.file_len,
            }),
        }
    }

    /// Range-checked section header lookup.
    fn section(&self, index: usize) -> Result<Elf64Shdr> {
        self.section_headers
            .get(index)
            .copied()
            .ok_or(ElfError::UndefinedSection(index as u32))
    }

    /// The string table section linked from the symbol table section.
    fn symbol_strtab(&self) -> Result<Elf64Shdr> {
        let symtab = self.symtab.as_ref().ok_or(ElfError::NoSymbolTable)?;
        let link = self.section_headers[symtab.section_index].sh_link;
        self.section(link as usize)
    }
}
