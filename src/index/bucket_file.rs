//! On-disk bucket format
//!
//! ```text
//! header     magic "KBIX" | version u32 | key_bits u32 | entries u64 | blob_len u64
//! directory  entries x (key u32 | byte_offset u64 | byte_length u64)
//! blob       per entry: count u64 | count x posting u64
//! ```
//!
//! All integers are little-endian. Directory entries are sorted by key and
//! offsets are relative to the start of the blob. Keys without postings are
//! absent from the directory.

use std::fs::{self, File};
use std::io::{self, BufReader, BufWriter, Read, Write};
use std::path::{Path, PathBuf};

use log::warn;

use super::{InvertedIndex, Posting};
use crate::error::IndexError;

const MAGIC: &[u8; 4] = b"KBIX";
const VERSION: u32 = 1;
const HEADER_BYTES: u64 = 4 + 4 + 4 + 8 + 8;
const DIRECTORY_ENTRY_BYTES: u64 = 4 + 8 + 8;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DirectoryEntry {
    pub key: u32,
    pub byte_offset: u64,
    pub byte_length: u64,
}

/// Staged blob next to the destination, removed when dropped.
struct StagingFile {
    path: PathBuf,
}

impl Drop for StagingFile {
    fn drop(&mut self) {
        if let Err(e) = fs::remove_file(&self.path) {
            if e.kind() != io::ErrorKind::NotFound {
                warn!("could not remove {}: {}", self.path.display(), e);
            }
        }
    }
}

/// Streams key groups into a bucket file.
///
/// The blob is staged next to the destination and appended after the
/// directory once every key has been seen. Dropping the writer without
/// [`finish`](Self::finish) removes the staged blob.
pub struct BucketWriter {
    path: PathBuf,
    blob: BufWriter<File>,
    // after `blob` so the handle closes before the file is removed
    staging: StagingFile,
    key_bits: u32,
    directory: Vec<DirectoryEntry>,
    blob_len: u64,
}

impl BucketWriter {
    pub fn create(path: &Path, key_bits: u32) -> Result<Self, IndexError> {
        let mut blob_name = path.as_os_str().to_owned();
        blob_name.push(".blob");
        let blob_path = PathBuf::from(blob_name);
        let file = File::create(&blob_path)
            .map_err(|e| IndexError::io(format!("creating {}", blob_path.display()), e))?;
        Ok(Self {
            path: path.to_path_buf(),
            staging: StagingFile { path: blob_path },
            blob: BufWriter::new(file),
            key_bits,
            directory: Vec::new(),
            blob_len: 0,
        })
    }

    /// Append the postings of `key`. Keys must arrive in increasing order.
    pub fn push(&mut self, key: u32, postings: &[Posting]) -> Result<(), IndexError> {
        if let Some(last) = self.directory.last() {
            if key <= last.key {
                return Err(IndexError::Format {
                    path: self.path.clone(),
                    reason: format!("key {} written after key {}", key, last.key),
                });
            }
        }
        let byte_length = 8 + 8 * postings.len() as u64;
        let context = || format!("writing {}", self.staging.path.display());
        write_all_postings(&mut self.blob, postings).map_err(|e| IndexError::io(context(), e))?;
        self.directory.push(DirectoryEntry {
            key,
            byte_offset: self.blob_len,
            byte_length,
        });
        self.blob_len += byte_length;
        Ok(())
    }

    pub fn finish(self) -> Result<(), IndexError> {
        let BucketWriter {
            path,
            staging,
            blob,
            key_bits,
            directory,
            blob_len,
        } = self;
        blob.into_inner()
            .map_err(|e| IndexError::io(format!("flushing {}", staging.path.display()), e.into_error()))?
            .sync_all()
            .map_err(|e| IndexError::io(format!("syncing {}", staging.path.display()), e))?;

        write_final(&path, &staging.path, key_bits, &directory, blob_len)
    }
}

fn write_all_postings<W: Write>(out: &mut W, postings: &[Posting]) -> io::Result<()> {
    out.write_all(&(postings.len() as u64).to_le_bytes())?;
    for posting in postings {
        out.write_all(&posting.raw().to_le_bytes())?;
    }
    Ok(())
}

fn write_final(
    path: &Path,
    blob_path: &Path,
    key_bits: u32,
    directory: &[DirectoryEntry],
    blob_len: u64,
) -> Result<(), IndexError> {
    let context = || format!("writing {}", path.display());
    let file = File::create(path).map_err(|e| IndexError::io(context(), e))?;
    let mut out = BufWriter::new(file);
    let write_head = |out: &mut BufWriter<File>| -> io::Result<()> {
        out.write_all(MAGIC)?;
        out.write_all(&VERSION.to_le_bytes())?;
        out.write_all(&key_bits.to_le_bytes())?;
        out.write_all(&(directory.len() as u64).to_le_bytes())?;
        out.write_all(&blob_len.to_le_bytes())?;
        for entry in directory {
            out.write_all(&entry.key.to_le_bytes())?;
            out.write_all(&entry.byte_offset.to_le_bytes())?;
            out.write_all(&entry.byte_length.to_le_bytes())?;
        }
        Ok(())
    };
    write_head(&mut out).map_err(|e| IndexError::io(context(), e))?;

    let mut blob = File::open(blob_path)
        .map_err(|e| IndexError::io(format!("reopening {}", blob_path.display()), e))?;
    let copied = io::copy(&mut blob, &mut out).map_err(|e| IndexError::io(context(), e))?;
    if copied != blob_len {
        return Err(IndexError::Format {
            path: path.to_path_buf(),
            reason: format!("staged blob holds {} bytes, expected {}", copied, blob_len),
        });
    }
    out.flush().map_err(|e| IndexError::io(context(), e))?;
    Ok(())
}

fn read_u32<R: Read>(r: &mut R) -> io::Result<u32> {
    let mut buf = [0u8; 4];
    r.read_exact(&mut buf)?;
    Ok(u32::from_le_bytes(buf))
}

fn read_u64<R: Read>(r: &mut R) -> io::Result<u64> {
    let mut buf = [0u8; 8];
    r.read_exact(&mut buf)?;
    Ok(u64::from_le_bytes(buf))
}

fn open_sized(path: &Path) -> Result<(File, u64), IndexError> {
    let context = || format!("opening {}", path.display());
    let file = File::open(path).map_err(|e| IndexError::io(context(), e))?;
    let size = file.metadata().map_err(|e| IndexError::io(context(), e))?.len();
    Ok((file, size))
}

/// Header and directory of a bucket file.
pub fn read_directory(path: &Path) -> Result<(u32, Vec<DirectoryEntry>), IndexError> {
    let (file, size) = open_sized(path)?;
    let mut reader = BufReader::new(file);
    let (key_bits, directory, _) = read_head(path, &mut reader, size)?;
    Ok((key_bits, directory))
}

/// Header and directory; `size` is the length of the file on disk.
fn read_head<R: Read>(
    path: &Path,
    reader: &mut R,
    size: u64,
) -> Result<(u32, Vec<DirectoryEntry>, u64), IndexError> {
    let malformed = |reason: String| IndexError::Format {
        path: path.to_path_buf(),
        reason,
    };
    let context = || format!("reading {}", path.display());

    let mut magic = [0u8; 4];
    reader.read_exact(&mut magic).map_err(|e| IndexError::io(context(), e))?;
    if &magic != MAGIC {
        return Err(malformed("bad magic".to_string()));
    }
    let version = read_u32(reader).map_err(|e| IndexError::io(context(), e))?;
    if version != VERSION {
        return Err(malformed(format!("unsupported version {}", version)));
    }
    let key_bits = read_u32(reader).map_err(|e| IndexError::io(context(), e))?;
    if key_bits > crate::core::encoding::MAX_KEY_BITS {
        return Err(malformed(format!("key width {} is too large", key_bits)));
    }
    let entries = read_u64(reader).map_err(|e| IndexError::io(context(), e))?;
    let blob_len = read_u64(reader).map_err(|e| IndexError::io(context(), e))?;
    if entries > 1u64 << key_bits {
        return Err(malformed(format!("{} directory entries for {} keys", entries, 1u64 << key_bits)));
    }
    match file_len(entries, blob_len) {
        Some(expected) if expected == size => {}
        Some(expected) => {
            return Err(malformed(format!(
                "header describes {} bytes, file holds {}",
                expected, size
            )))
        }
        None => return Err(malformed(format!("blob length {} overflows", blob_len))),
    }

    let mut directory = Vec::with_capacity(entries as usize);
    for _ in 0..entries {
        let key = read_u32(reader).map_err(|e| IndexError::io(context(), e))?;
        let byte_offset = read_u64(reader).map_err(|e| IndexError::io(context(), e))?;
        let byte_length = read_u64(reader).map_err(|e| IndexError::io(context(), e))?;
        directory.push(DirectoryEntry {
            key,
            byte_offset,
            byte_length,
        });
    }
    Ok((key_bits, directory, blob_len))
}

/// Load a bucket file into a queryable index.
pub fn read_bucket_file(path: &Path) -> Result<InvertedIndex, IndexError> {
    let (file, size) = open_sized(path)?;
    let mut reader = BufReader::new(file);
    let (key_bits, directory, blob_len) = read_head(path, &mut reader, size)?;
    let malformed = |reason: String| IndexError::Format {
        path: path.to_path_buf(),
        reason,
    };
    let context = || format!("reading {}", path.display());

    let keyspace = 1usize << key_bits;
    let mut offsets = Vec::with_capacity(keyspace + 1);
    offsets.push(0u32);
    let mut postings: Vec<Posting> = Vec::with_capacity(((blob_len / 8) as usize).saturating_sub(directory.len()));
    let mut expected_offset = 0u64;

    for entry in &directory {
        if entry.key as usize >= keyspace || (entry.key as usize) + 1 < offsets.len() {
            return Err(malformed(format!("directory key {} out of order", entry.key)));
        }
        if entry.byte_offset != expected_offset {
            return Err(malformed(format!(
                "key {} starts at byte {}, expected {}",
                entry.key, entry.byte_offset, expected_offset
            )));
        }
        // keys with no postings share the running offset
        while offsets.len() <= entry.key as usize {
            offsets.push(postings.len() as u32);
        }
        let count = read_u64(&mut reader).map_err(|e| IndexError::io(context(), e))?;
        if entry.byte_length != 8 + 8 * count {
            return Err(malformed(format!(
                "key {} declares {} bytes for {} postings",
                entry.key, entry.byte_length, count
            )));
        }
        for _ in 0..count {
            let raw = read_u64(&mut reader).map_err(|e| IndexError::io(context(), e))?;
            postings.push(Posting::from_raw(raw));
        }
        if postings.len() > u32::MAX as usize {
            return Err(IndexError::TooManyPostings(u32::MAX as usize));
        }
        offsets.push(postings.len() as u32);
        expected_offset += entry.byte_length;
    }
    if expected_offset != blob_len {
        return Err(malformed(format!(
            "directory covers {} blob bytes, header says {}",
            expected_offset, blob_len
        )));
    }
    while offsets.len() < keyspace + 1 {
        offsets.push(postings.len() as u32);
    }

    Ok(InvertedIndex::from_parts(key_bits, offsets, postings))
}

/// Size in bytes of a bucket file with `entries` keys and `blob_len` blob
/// bytes, `None` if it does not fit in a `u64`.
pub fn file_len(entries: u64, blob_len: u64) -> Option<u64> {
    entries
        .checked_mul(DIRECTORY_ENTRY_BYTES)?
        .checked_add(HEADER_BYTES)?
        .checked_add(blob_len)
}
