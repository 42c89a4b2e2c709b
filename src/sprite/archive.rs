use std::collections::HashMap;
use std::fs::File;
use std::io::{BufWriter, Read, Seek, SeekFrom, Write};
use std::path::Path;

use crate::log;
use crate::error::EditorError;

const ARCHIVE_LOG_CHANNEL: log::Channel = log::channel!("archive");

// Sprite pack container layout:
//
//   magic   : 4 bytes, "SEPK"
//   version : u32 LE
//   count   : u32 LE
//   index   : count entries of [key_len: u16 LE][key bytes][offset: u32 LE][size: u32 LE]
//   blobs   : raw entry payloads, offsets are absolute file positions
//
// Keys are UTF-8 and unique within a pack. The index is small enough to
// keep resident; payloads are read on demand.
const ARCHIVE_MAGIC: [u8; 4] = *b"SEPK";
const ARCHIVE_VERSION: u32 = 1;

// ----------------------------------------------
// SpriteArchive
// ----------------------------------------------

// Read-only handle to an open sprite pack. The full index is parsed up
// front; `read()` seeks into the blob region for each lookup.
pub struct SpriteArchive {
    file: File,
    index: HashMap<String, IndexEntry>,
}

#[derive(Copy, Clone)]
struct IndexEntry {
    offset: u64,
    size: u32,
}

impl SpriteArchive {
    pub fn open(path: &Path) -> Result<Self, EditorError> {
        let asset_err = |detail: String| {
            EditorError::Asset {
                key: path.display().to_string(),
                detail: detail,
            }
        };

        let mut file = File::open(path)
            .map_err(|err| asset_err(format!("open failed ({err})")))?;

        let mut header = [0u8; 12];
        file.read_exact(&mut header)
            .map_err(|err| asset_err(format!("short header ({err})")))?;

        if header[0..4] != ARCHIVE_MAGIC {
            return Err(asset_err("bad magic".to_string()));
        }

        let version = u32::from_le_bytes([header[4], header[5], header[6], header[7]]);
        if version != ARCHIVE_VERSION {
            return Err(asset_err(format!("unsupported pack version [{version}]")));
        }

        let count = u32::from_le_bytes([header[8], header[9], header[10], header[11]]);

        let mut index = HashMap::with_capacity(count as usize);

        for _ in 0..count {
            let mut key_len = [0u8; 2];
            file.read_exact(&mut key_len)
                .map_err(|err| asset_err(format!("truncated index ({err})")))?;

            let mut key_bytes = vec![0u8; u16::from_le_bytes(key_len) as usize];
            file.read_exact(&mut key_bytes)
                .map_err(|err| asset_err(format!("truncated index ({err})")))?;

            let key = String::from_utf8(key_bytes)
                .map_err(|_| asset_err("index key is not valid UTF-8".to_string()))?;

            let mut loc = [0u8; 8];
            file.read_exact(&mut loc)
                .map_err(|err| asset_err(format!("truncated index ({err})")))?;

            let entry = IndexEntry {
                offset: u32::from_le_bytes([loc[0], loc[1], loc[2], loc[3]]) as u64,
                size: u32::from_le_bytes([loc[4], loc[5], loc[6], loc[7]]),
            };

            index.insert(key, entry);
        }

        log::verbose!(ARCHIVE_LOG_CHANNEL,
                      "Opened sprite pack {:?}, {} entries", path, index.len());

        Ok(Self {
            file: file,
            index: index,
        })
    }

    #[inline]
    pub fn contains(&self, key: &str) -> bool {
        self.index.contains_key(key)
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.index.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.index.is_empty()
    }

    // Reads the raw payload for `key` into a fresh buffer.
    pub fn read(&mut self, key: &str) -> Result<Vec<u8>, EditorError> {
        let entry = *self.index.get(key).ok_or_else(|| {
            EditorError::Asset {
                key: key.to_string(),
                detail: "no such entry in pack".to_string(),
            }
        })?;

        self.file.seek(SeekFrom::Start(entry.offset)).map_err(|err| {
            EditorError::Asset {
                key: key.to_string(),
                detail: format!("seek failed ({err})"),
            }
        })?;

        let mut payload = vec![0u8; entry.size as usize];
        self.file.read_exact(&mut payload).map_err(|err| {
            EditorError::Asset {
                key: key.to_string(),
                detail: format!("read failed ({err})"),
            }
        })?;

        Ok(payload)
    }
}

// ----------------------------------------------
// SpriteArchiveWriter
// ----------------------------------------------

// Builds a sprite pack in memory and serializes it to disk. Used by the
// asset pipeline and by tests to assemble fixture packs.
#[derive(Default)]
pub struct SpriteArchiveWriter {
    entries: Vec<(String, Vec<u8>)>,
}

impl SpriteArchiveWriter {
    pub fn new() -> Self {
        Self::default()
    }

    // Duplicate keys are a caller bug.
    pub fn add(&mut self, key: &str, payload: Vec<u8>) {
        assert!(!self.entries.iter().any(|(k, _)| k == key),
                "Duplicate pack entry key \"{key}\"");
        assert!(key.len() <= u16::MAX as usize);

        self.entries.push((key.to_string(), payload));
    }

    pub fn write_file(&self, path: &Path) -> Result<(), EditorError> {
        let asset_err = |detail: String| {
            EditorError::Asset {
                key: path.display().to_string(),
                detail: detail,
            }
        };

        let file = File::create(path)
            .map_err(|err| asset_err(format!("create failed ({err})")))?;

        let mut out = BufWriter::new(file);

        let index_size: usize = self.entries.iter()
            .map(|(key, _)| 2 + key.len() + 8)
            .sum();

        let mut blob_offset = (12 + index_size) as u64;

        out.write_all(&ARCHIVE_MAGIC)
            .and_then(|_| out.write_all(&ARCHIVE_VERSION.to_le_bytes()))
            .and_then(|_| out.write_all(&(self.entries.len() as u32).to_le_bytes()))
            .map_err(|err| asset_err(format!("write failed ({err})")))?;

        for (key, payload) in &self.entries {
            out.write_all(&(key.len() as u16).to_le_bytes())
                .and_then(|_| out.write_all(key.as_bytes()))
                .and_then(|_| out.write_all(&(blob_offset as u32).to_le_bytes()))
                .and_then(|_| out.write_all(&(payload.len() as u32).to_le_bytes()))
                .map_err(|err| asset_err(format!("write failed ({err})")))?;

            blob_offset += payload.len() as u64;
        }

        for (_, payload) in &self.entries {
            out.write_all(payload)
                .map_err(|err| asset_err(format!("write failed ({err})")))?;
        }

        out.flush()
            .map_err(|err| asset_err(format!("flush failed ({err})")))?;

        Ok(())
    }
}
