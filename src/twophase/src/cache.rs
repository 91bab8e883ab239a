//! Flat binary persistence for [`PruningTables`].
//!
//! The layout is the magic `TPPT`, a format version byte, the table count and
//! every table's length as little endian `u32`s, followed by the raw table
//! bytes in [`PruningTables::all`] order.

use std::{
    fs,
    io::{self, Write},
    path::Path,
};

use log::{debug, info};
use thiserror::Error;

use crate::{pruning::PruningTables, start, success};

const MAGIC: &[u8; 4] = b"TPPT";
const VERSION: u8 = 1;

#[derive(Error, Debug)]
pub enum CacheError {
    #[error("Could not access the table cache: {0}")]
    Io(#[from] io::Error),
    #[error("The table cache does not start with the expected magic bytes")]
    BadMagic,
    #[error("The table cache has format version {found}, expected {expected}")]
    Version { found: u8, expected: u8 },
    #[error("The table cache holds {found} tables, expected {expected}")]
    TableCount { found: usize, expected: usize },
    #[error("The cached {name} table has {found} entries, expected {expected}")]
    SizeMismatch {
        name: &'static str,
        found: usize,
        expected: usize,
    },
    #[error("The table cache is {found} bytes long, expected {expected}")]
    Truncated { found: usize, expected: usize },
    #[error("The {0} table is not finished building and cannot be cached")]
    Incomplete(&'static str),
}

/// Serializes complete tables.
///
/// # Errors
///
/// Returns [`CacheError::Incomplete`] if any table is still being built.
pub fn encode(tables: &PruningTables) -> Result<Vec<u8>, CacheError> {
    let all = tables.all();
    if let Some(table) = all.iter().find(|table| !table.is_complete()) {
        return Err(CacheError::Incomplete(table.name()));
    }

    let body_len = all.iter().map(|table| table.len()).sum::<usize>();
    let mut bytes = Vec::with_capacity(MAGIC.len() + 1 + 4 * (all.len() + 1) + body_len);
    bytes.extend_from_slice(MAGIC);
    bytes.push(VERSION);
    bytes.extend_from_slice(&(all.len() as u32).to_le_bytes());
    for table in all {
        bytes.extend_from_slice(&(table.len() as u32).to_le_bytes());
    }
    for table in all {
        bytes.extend(table.bytes());
    }
    Ok(bytes)
}

fn read_u32(bytes: &[u8], offset: usize) -> Result<usize, CacheError> {
    let word = bytes
        .get(offset..offset + 4)
        .and_then(|word| <[u8; 4]>::try_from(word).ok())
        .ok_or(CacheError::Truncated {
            found: bytes.len(),
            expected: offset + 4,
        })?;
    Ok(u32::from_le_bytes(word) as usize)
}

/// Checks the whole header against `tables` before filling any of them, so
/// a rejected cache leaves `tables` untouched.
///
/// # Errors
///
/// Returns a [`CacheError`] describing the first mismatch.
pub fn decode_into(bytes: &[u8], tables: &PruningTables) -> Result<(), CacheError> {
    if bytes.get(..MAGIC.len()) != Some(MAGIC.as_slice()) {
        return Err(CacheError::BadMagic);
    }
    let version = bytes.get(MAGIC.len()).copied().ok_or(CacheError::Truncated {
        found: bytes.len(),
        expected: MAGIC.len() + 1,
    })?;
    if version != VERSION {
        return Err(CacheError::Version {
            found: version,
            expected: VERSION,
        });
    }

    let all = tables.all();
    let mut offset = MAGIC.len() + 1;
    let count = read_u32(bytes, offset)?;
    offset += 4;
    if count != all.len() {
        return Err(CacheError::TableCount {
            found: count,
            expected: all.len(),
        });
    }
    for table in all {
        let len = read_u32(bytes, offset)?;
        offset += 4;
        if len != table.len() {
            return Err(CacheError::SizeMismatch {
                name: table.name(),
                found: len,
                expected: table.len(),
            });
        }
    }

    let expected = offset + all.iter().map(|table| table.len()).sum::<usize>();
    if bytes.len() != expected {
        return Err(CacheError::Truncated {
            found: bytes.len(),
            expected,
        });
    }
    for table in all {
        table.fill_from(&bytes[offset..offset + table.len()]);
        offset += table.len();
    }
    Ok(())
}

/// Writes the tables to `path`, creating parent directories as needed. The
/// file is written next to `path` and renamed into place.
///
/// # Errors
///
/// Returns [`CacheError::Incomplete`] for unfinished tables and
/// [`CacheError::Io`] for filesystem failures.
pub fn save(path: &Path, tables: &PruningTables) -> Result<(), CacheError> {
    info!(start!("Writing the table cache to {}"), path.display());
    let bytes = encode(tables)?;
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    let partial = path.with_extension("partial");
    if let Err(e) = write_then_rename(&partial, path, &bytes) {
        let _ = fs::remove_file(&partial);
        return Err(e.into());
    }
    info!(success!("Wrote {} bytes of tables"), bytes.len());
    Ok(())
}

fn write_then_rename(partial: &Path, path: &Path, bytes: &[u8]) -> io::Result<()> {
    let mut file = fs::File::create(partial)?;
    file.write_all(bytes)?;
    file.sync_all()?;
    fs::rename(partial, path)
}

/// # Errors
///
/// Returns a [`CacheError`] if the file is missing, unreadable or does not
/// match `tables`.
pub fn load(path: &Path, tables: &PruningTables) -> Result<(), CacheError> {
    debug!("Reading the table cache from {}", path.display());
    let bytes = fs::read(path)?;
    decode_into(&bytes, tables)?;
    info!(success!("Loaded pruning tables from {}"), path.display());
    Ok(())
}
