//! String table name resolution.

use std::io::{Read, Seek};

use crate::reader::read_at;
use crate::tables::Elf64Shdr;
use crate::{ElfError, Result};

/// Resolve the null-terminated name at `byte_offset` inside a string table
/// section.
///
/// The read is bounded by the section's declared size: a name is cut at the
/// first NUL byte, and a name with no terminator runs to the declared end of
/// the table, never past it. Offset 0 (or an offset pointing directly at a
/// terminator) yields the empty string.
///
/// The section's declared extent is itself untrusted: a string table whose
/// `sh_offset + sh_size` overflows or runs past `file_len` is rejected
/// before any allocation or read happens.
pub fn resolve_name<R: Read + Seek>(
    reader: &mut R,
    strtab: &Elf64Shdr,
    byte_offset: u64,
    file_len: u64,
) -> Result<String> {
    if byte_offset >= strtab.sh_size {
        return Err(ElfError::OutOfBounds {
            offset: byte_offset,
            table_size: strtab.sh_size,
        });
    }

    let table_end = strtab.sh_offset.checked_add(strtab.sh_size);
    match table_end {
        Some(end) if end <= file_len => {}
        _ => {
            return Err(ElfError::MalformedTable {
                offset: strtab.sh_offset,
                count: 1,
                entry_size: strtab.sh_size,
                file_len,
            });
        }
    }

    // byte_offset < sh_size and the table lies inside the file, so neither
    // the start offset nor the window can overflow or cross the file end
    let window = (strtab.sh_size - byte_offset) as usize;
    let bytes = read_at(reader, strtab.sh_offset + byte_offset, window)?;
    let end = bytes.iter().position(|&b| b == 0).unwrap_or(bytes.len());

    Ok(String::from_utf8_lossy(&bytes[..end]).into_owned())
}
