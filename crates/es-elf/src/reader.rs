//! Raw reads against the underlying file.
//!
//! Every read takes an absolute offset; no function here depends on (or
//! leaves behind) any particular file position.

use std::io::{Read, Seek, SeekFrom};

use crate::Result;

/// Read exactly `len` bytes at absolute file offset `offset`.
///
/// A short read at end-of-file is an error, never partial data.
pub fn read_at<R: Read + Seek>(reader: &mut R, offset: u64, len: usize) -> Result<Vec<u8>> {
    reader.seek(SeekFrom::Start(offset))?;
    let mut buf = vec![0u8; len];
    reader.read_exact(&mut buf)?;
    Ok(buf)
}

/// Total length of the underlying stream.
pub fn stream_len<R: Seek>(reader: &mut R) -> Result<u64> {
    Ok(reader.seek(SeekFrom::End(0))?)
}
