//! File metadata and identity.
//!
//! Every candidate leaf file gets a byte size, a raw-byte hash, and a
//! creation timestamp, independent of whether content extraction later
//! succeeds. The hash is a pure function of the bytes: identical content
//! anywhere in the tree produces an identical hash.

use anyhow::{Context, Result};
use chrono::{DateTime, TimeZone, Utc};
use sha2::{Digest, Sha256};
use std::fs::File;
use std::io::Read;
use std::path::Path;

const HASH_CHUNK_BYTES: usize = 8192;

/// Hex SHA-256 of the file's raw bytes, read in fixed-size chunks.
pub fn file_hash(path: &Path) -> Result<String> {
    let mut file = File::open(path)
        .with_context(|| format!("Failed to open {} for hashing", path.display()))?;
    let mut hasher = Sha256::new();
    let mut buf = [0u8; HASH_CHUNK_BYTES];
    loop {
        let n = file
            .read(&mut buf)
            .with_context(|| format!("Failed to read {} for hashing", path.display()))?;
        if n == 0 {
            break;
        }
        hasher.update(&buf[..n]);
    }
    Ok(format!("{:x}", hasher.finalize()))
}

/// Creation timestamp with platform fallbacks: birth time where the
/// filesystem exposes it, else the last metadata-change time on Unix,
/// else the modification time.
pub fn created_date(metadata: &std::fs::Metadata) -> DateTime<Utc> {
    if let Ok(created) = metadata.created() {
        return created.into();
    }
    #[cfg(unix)]
    {
        use std::os::unix::fs::MetadataExt;
        if let Some(dt) = Utc
            .timestamp_opt(metadata.ctime(), metadata.ctime_nsec() as u32)
            .single()
        {
            return dt;
        }
    }
    metadata
        .modified()
        .map(Into::into)
        .unwrap_or_else(|_| Utc.timestamp_opt(0, 0).unwrap())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn hash_depends_on_bytes_not_name() {
        let dir = tempfile::tempdir().unwrap();
        let a = dir.path().join("a.bin");
        let b = dir.path().join("deeply").join("renamed.bin");
        std::fs::create_dir_all(b.parent().unwrap()).unwrap();
        std::fs::write(&a, b"same bytes").unwrap();
        std::fs::write(&b, b"same bytes").unwrap();
        assert_eq!(file_hash(&a).unwrap(), file_hash(&b).unwrap());

        std::fs::write(&b, b"different bytes").unwrap();
        assert_ne!(file_hash(&a).unwrap(), file_hash(&b).unwrap());
    }

    #[test]
    fn hash_of_large_file_spans_chunks() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("big.bin");
        let mut f = File::create(&path).unwrap();
        for _ in 0..5 {
            f.write_all(&[0xAB; HASH_CHUNK_BYTES]).unwrap();
        }
        f.write_all(b"tail").unwrap();
        drop(f);
        // Stable digest for 5 * 8192 bytes of 0xAB plus "tail"
        let h1 = file_hash(&path).unwrap();
        let h2 = file_hash(&path).unwrap();
        assert_eq!(h1, h2);
        assert_eq!(h1.len(), 64);
    }

    #[test]
    fn created_date_is_populated() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("f.txt");
        std::fs::write(&path, "x").unwrap();
        let meta = std::fs::metadata(&path).unwrap();
        let dt = created_date(&meta);
        assert!(dt.timestamp() > 0);
    }
}
