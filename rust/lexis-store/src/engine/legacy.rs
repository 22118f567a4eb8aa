//! Migration from the single-file layout of older storages.
//!
//! The legacy file holds `[u64 hash_count][u64 hash × count][u64 size][bytes]`
//! records, one per distinct string with every link carrying it.

use std::{fs::File, io::BufReader, path::Path};

use lexis_common::{Result, error::Error};

use super::{DictionaryEngine, persist::RecordReader};
use crate::{index::Indices, link::LinkId};

pub const LEGACY_FILE: &str = "strings.scdb";

struct LegacyRecord {
    links: Vec<LinkId>,
    content: Vec<u8>,
}

fn read_record<R: std::io::BufRead>(
    reader: &mut RecordReader<R>,
) -> std::io::Result<Option<LegacyRecord>> {
    if reader.at_end()? {
        return Ok(None);
    }
    let count = reader.read_u64()?;
    let links = reader.read_u64s(count)?.into_iter().map(LinkId).collect();
    let size = reader.read_u64()?;
    let content = reader.read_bytes(size)?;
    Ok(Some(LegacyRecord { links, content }))
}

/// Links every record of the legacy file at `path` through the regular link
/// path, saves the indices and deletes the legacy file.
///
/// The caller holds the indices write lock.
pub(super) fn migrate(engine: &DictionaryEngine, indices: &mut Indices, path: &Path) -> Result<()> {
    let file = File::open(path).map_err(|e| Error::read(path.display().to_string(), e))?;
    let mut reader = RecordReader::new(BufReader::new(file));
    log::info!("migrating legacy strings file {}", path.display());

    let (mut records, mut links) = (0usize, 0usize);
    loop {
        let record = match read_record(&mut reader) {
            Ok(Some(record)) => record,
            Ok(None) => break,
            Err(e) => {
                log::warn!(
                    "legacy replay of {} stopped after {records} records: {e}",
                    path.display()
                );
                break;
            }
        };
        for &link in &record.links {
            engine.link_locked(indices, link, &record.content, true)?;
        }
        records += 1;
        links += record.links.len();
    }

    engine.save_locked(indices)?;
    std::fs::remove_file(path).map_err(|e| Error::io(path.display().to_string(), e))?;
    log::info!(
        "migrated {records} strings with {links} links from {}",
        path.display()
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{StoreOptions, StringEngine};

    fn legacy_record(links: &[u64], content: &[u8]) -> Vec<u8> {
        let mut bytes = (links.len() as u64).to_ne_bytes().to_vec();
        for link in links {
            bytes.extend_from_slice(&link.to_ne_bytes());
        }
        bytes.extend_from_slice(&(content.len() as u64).to_ne_bytes());
        bytes.extend_from_slice(content);
        bytes
    }

    #[test]
    fn test_migrate_on_load() {
        let tempdir = tempfile::tempdir().expect("tempdir");
        let mut bytes = legacy_record(&[112, 113], b"it is the first string");
        bytes.extend(legacy_record(&[518], b"it is the second string"));
        // Truncated trailing record.
        bytes.extend_from_slice(&1u64.to_ne_bytes());
        std::fs::write(tempdir.path().join(LEGACY_FILE), &bytes).expect("write");

        let engine = DictionaryEngine::open(StoreOptions::new(tempdir.path())).expect("open");
        engine.load().expect("load");

        assert!(!tempdir.path().join(LEGACY_FILE).exists());
        assert!(tempdir.path().join(super::super::TERMS_FILE).exists());
        assert_eq!(
            engine.get_string_by_link_hash(LinkId(113)).expect("get"),
            Some(b"it is the first string".to_vec())
        );
        assert_eq!(
            engine
                .get_link_hashes_by_string(b"it is the second string")
                .expect("search"),
            vec![LinkId(518)]
        );
        let stats = engine.stats();
        assert_eq!(stats.linked, 3);
        assert_eq!(stats.content_groups, 2);

        // The migrated state is what the next load sees.
        engine.load().expect("reload");
        assert_eq!(engine.stats(), stats);
    }
}
