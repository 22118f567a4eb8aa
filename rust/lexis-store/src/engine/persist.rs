//! Binary files holding the term and content group indices.
//!
//! Integers are fixed-width `u64` in native byte order, lengths precede
//! payloads. The terms file starts with the offset the next string will be
//! written at, then holds one `[size][term][count][offset × count]` record per
//! term. The groups file holds one `[offset][count][link × count]` record per
//! content group.

use std::{
    fs::File,
    io::{BufRead, BufReader, BufWriter, Read, Write},
    path::Path,
};

use lexis_common::{Result, error::Error, verify_data};

use crate::{index::Indices, link::LinkId};

pub const TERMS_FILE: &str = "term_string_offsets.scdb";

pub const GROUPS_FILE: &str = "string_offsets_link_hashes.scdb";

/// Sequential reader of length-prefixed records.
pub(super) struct RecordReader<R> {
    inner: R,
}

impl<R: BufRead> RecordReader<R> {
    pub fn new(inner: R) -> Self {
        Self { inner }
    }

    pub fn at_end(&mut self) -> std::io::Result<bool> {
        Ok(self.inner.fill_buf()?.is_empty())
    }

    pub fn read_u64(&mut self) -> std::io::Result<u64> {
        let mut buf = [0u8; 8];
        self.inner.read_exact(&mut buf)?;
        Ok(u64::from_ne_bytes(buf))
    }

    pub fn read_bytes(&mut self, len: u64) -> std::io::Result<Vec<u8>> {
        let mut buf = Vec::new();
        (&mut self.inner).take(len).read_to_end(&mut buf)?;
        if (buf.len() as u64) < len {
            return Err(std::io::ErrorKind::UnexpectedEof.into());
        }
        Ok(buf)
    }

    /// Reads `count` integers without trusting `count` for the allocation.
    pub fn read_u64s(&mut self, count: u64) -> std::io::Result<Vec<u64>> {
        let mut values = Vec::with_capacity(count.min(1024) as usize);
        for _ in 0..count {
            values.push(self.read_u64()?);
        }
        Ok(values)
    }
}

/// Opens `path` for replay, `None` when there is nothing to replay.
fn open_reader(path: &Path) -> Result<Option<RecordReader<BufReader<File>>>> {
    match File::open(path) {
        Ok(file) => Ok(Some(RecordReader::new(BufReader::new(file)))),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            log::info!("{} not found, starting empty", path.display());
            Ok(None)
        }
        Err(e) => Err(Error::read(path.display().to_string(), e)),
    }
}

/// Replays the terms file into `indices`. Returns the persisted next offset,
/// zero when the file does not exist.
///
/// A truncated or malformed record ends the replay; the records before it
/// stay loaded.
pub(super) fn load_terms(path: &Path, indices: &mut Indices) -> Result<u64> {
    let Some(mut reader) = open_reader(path)? else {
        return Ok(0);
    };
    if reader.at_end().map_err(|e| Error::read(path.display().to_string(), e))? {
        return Ok(0);
    }
    let last_offset = reader
        .read_u64()
        .map_err(|e| Error::read(path.display().to_string(), e))?;

    let mut records = 0usize;
    loop {
        match read_term_record(&mut reader, last_offset, indices) {
            Ok(true) => records += 1,
            Ok(false) => break,
            Err(e) => {
                log::warn!(
                    "term replay of {} stopped after {records} records: {e}",
                    path.display()
                );
                break;
            }
        }
    }
    log::debug!("replayed {records} term records from {}", path.display());
    Ok(last_offset)
}

/// Returns `false` at the end of the file.
fn read_term_record<R: BufRead>(
    reader: &mut RecordReader<R>,
    last_offset: u64,
    indices: &mut Indices,
) -> Result<bool> {
    if reader.at_end()? {
        return Ok(false);
    }
    let size = reader.read_u64()?;
    let term = reader.read_bytes(size)?;
    let count = reader.read_u64()?;
    let offsets = reader.read_u64s(count)?;
    // A record is applied whole or not at all.
    let max_offset = offsets.iter().copied().max().unwrap_or(0);
    verify_data!(max_offset, offsets.is_empty() || max_offset < last_offset);
    for offset in offsets {
        indices.add_term(&term, offset);
    }
    Ok(true)
}

/// Replays the groups file into `indices`, with the same truncation rule as
/// [`load_terms`].
pub(super) fn load_groups(path: &Path, indices: &mut Indices) -> Result<()> {
    let Some(mut reader) = open_reader(path)? else {
        return Ok(());
    };

    let mut records = 0usize;
    loop {
        match read_group_record(&mut reader, indices) {
            Ok(true) => records += 1,
            Ok(false) => break,
            Err(e) => {
                log::warn!(
                    "link replay of {} stopped after {records} records: {e}",
                    path.display()
                );
                break;
            }
        }
    }
    log::debug!("replayed {records} content groups from {}", path.display());
    Ok(())
}

fn read_group_record<R: BufRead>(
    reader: &mut RecordReader<R>,
    indices: &mut Indices,
) -> Result<bool> {
    if reader.at_end()? {
        return Ok(false);
    }
    let offset = reader.read_u64()?;
    let count = reader.read_u64()?;
    let members: Vec<LinkId> = reader.read_u64s(count)?.into_iter().map(LinkId).collect();
    indices.restore_group(offset, &members);
    Ok(true)
}

fn create_writer(path: &Path) -> Result<BufWriter<File>> {
    File::create(path)
        .map(BufWriter::new)
        .map_err(|e| Error::write(path.display().to_string(), e))
}

fn finish(path: &Path, mut writer: BufWriter<File>) -> Result<()> {
    writer
        .flush()
        .and_then(|_| writer.get_ref().sync_all())
        .map_err(|e| Error::write(path.display().to_string(), e))
}

/// Rewrites the terms file from `indices`.
pub(super) fn save_terms(path: &Path, last_offset: u64, indices: &Indices) -> Result<()> {
    let mut writer = create_writer(path)?;
    writer
        .write_all(&last_offset.to_ne_bytes())
        .map_err(|e| Error::write(path.display().to_string(), e))?;
    let mut status = Ok(());
    indices.visit_terms(|term, offsets| {
        status = write_term_record(&mut writer, term, offsets);
        status.is_ok()
    });
    status.map_err(|e| Error::write(path.display().to_string(), e))?;
    finish(path, writer)
}

fn write_term_record<W: Write>(
    writer: &mut W,
    term: &[u8],
    offsets: &[u64],
) -> std::io::Result<()> {
    writer.write_all(&(term.len() as u64).to_ne_bytes())?;
    writer.write_all(term)?;
    writer.write_all(&(offsets.len() as u64).to_ne_bytes())?;
    for offset in offsets {
        writer.write_all(&offset.to_ne_bytes())?;
    }
    Ok(())
}

/// Rewrites the groups file from `indices`. Empty groups are written too.
pub(super) fn save_groups(path: &Path, indices: &Indices) -> Result<()> {
    let mut writer = create_writer(path)?;
    let mut status = Ok(());
    indices.visit_groups(|offset, members| {
        status = write_group_record(&mut writer, offset, members);
        status.is_ok()
    });
    status.map_err(|e| Error::write(path.display().to_string(), e))?;
    finish(path, writer)
}

fn write_group_record<W: Write>(
    writer: &mut W,
    offset: u64,
    members: &[LinkId],
) -> std::io::Result<()> {
    writer.write_all(&offset.to_ne_bytes())?;
    writer.write_all(&(members.len() as u64).to_ne_bytes())?;
    for link in members {
        writer.write_all(&link.get().to_ne_bytes())?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use std::io::Cursor;

    use super::*;

    fn sample() -> Indices {
        let mut indices = Indices::new();
        for term in ["it", "is", "the", "first"] {
            indices.add_term(term.as_bytes(), 0);
        }
        for term in ["it", "is", "the", "second"] {
            indices.add_term(term.as_bytes(), 30);
        }
        indices.attach(LinkId(112), 0);
        indices.attach(LinkId(518), 30);
        indices.attach(LinkId(519), 30);
        indices.restore_group(70, &[]);
        indices
    }

    #[test]
    fn test_record_reader() {
        let mut bytes = 3u64.to_ne_bytes().to_vec();
        bytes.extend_from_slice(b"abc");
        bytes.extend_from_slice(&5u64.to_ne_bytes());
        bytes.extend_from_slice(b"de");
        let mut reader = RecordReader::new(Cursor::new(bytes));

        let len = reader.read_u64().expect("len");
        assert_eq!(reader.read_bytes(len).expect("bytes"), b"abc");
        let len = reader.read_u64().expect("len");
        let err = reader.read_bytes(len).unwrap_err();
        assert_eq!(err.kind(), std::io::ErrorKind::UnexpectedEof);
        assert!(reader.at_end().expect("at_end"));
    }

    #[test]
    fn test_save_and_load() {
        let tempdir = tempfile::tempdir().expect("tempdir");
        let terms_path = tempdir.path().join(TERMS_FILE);
        let groups_path = tempdir.path().join(GROUPS_FILE);
        let indices = sample();
        save_terms(&terms_path, 100, &indices).expect("save terms");
        save_groups(&groups_path, &indices).expect("save groups");

        let mut loaded = Indices::new();
        assert_eq!(load_terms(&terms_path, &mut loaded).expect("load terms"), 100);
        load_groups(&groups_path, &mut loaded).expect("load groups");

        assert_eq!(loaded.term_count(), 5);
        assert_eq!(loaded.offsets_by_term(b"it"), &[0, 30]);
        assert_eq!(loaded.group(30), &[LinkId(518), LinkId(519)]);
        assert_eq!(loaded.offset_of(LinkId(112)), Some(0));
        assert_eq!(loaded.group_count(), 3);
        assert!(loaded.group(70).is_empty());
    }

    #[test]
    fn test_missing_files_are_empty() {
        let tempdir = tempfile::tempdir().expect("tempdir");
        let mut indices = Indices::new();
        let last_offset =
            load_terms(&tempdir.path().join(TERMS_FILE), &mut indices).expect("load terms");
        assert_eq!(last_offset, 0);
        load_groups(&tempdir.path().join(GROUPS_FILE), &mut indices).expect("load groups");
        assert_eq!(indices.term_count(), 0);
    }

    #[test]
    fn test_truncated_file_keeps_leading_records() {
        let tempdir = tempfile::tempdir().expect("tempdir");
        let path = tempdir.path().join(GROUPS_FILE);
        save_groups(&path, &sample()).expect("save");

        let bytes = std::fs::read(&path).expect("read");
        // Cut the last group record in half.
        std::fs::write(&path, &bytes[..bytes.len() - 12]).expect("write");

        let mut loaded = Indices::new();
        load_groups(&path, &mut loaded).expect("load");
        assert_eq!(loaded.group_count(), 2);
        assert_eq!(loaded.offset_of(LinkId(112)), Some(0));
    }

    #[test]
    fn test_bad_record_is_not_partly_applied() {
        let tempdir = tempfile::tempdir().expect("tempdir");
        let path = tempdir.path().join(TERMS_FILE);
        let mut bytes = 100u64.to_ne_bytes().to_vec();
        let mut push_record = |term: &[u8], offsets: &[u64]| {
            bytes.extend_from_slice(&(term.len() as u64).to_ne_bytes());
            bytes.extend_from_slice(term);
            bytes.extend_from_slice(&(offsets.len() as u64).to_ne_bytes());
            for offset in offsets {
                bytes.extend_from_slice(&offset.to_ne_bytes());
            }
        };
        push_record(b"kept", &[0]);
        push_record(b"torn", &[10, 20, 500]);
        push_record(b"after", &[30]);
        std::fs::write(&path, &bytes).expect("write");

        let mut loaded = Indices::new();
        assert_eq!(load_terms(&path, &mut loaded).expect("load"), 100);
        assert_eq!(loaded.offsets_by_term(b"kept"), &[0]);
        assert!(loaded.offsets_by_term(b"torn").is_empty());
        assert!(loaded.offsets_by_term(b"after").is_empty());
        assert_eq!(loaded.term_count(), 1);
    }

    #[test]
    fn test_offsets_beyond_last_offset_stop_replay() {
        let tempdir = tempfile::tempdir().expect("tempdir");
        let path = tempdir.path().join(TERMS_FILE);
        save_terms(&path, 10, &sample()).expect("save");

        let mut loaded = Indices::new();
        assert_eq!(load_terms(&path, &mut loaded).expect("load"), 10);
        // "first" at offset 0 precedes every term carrying offset 30.
        assert_eq!(loaded.offsets_by_term(b"first"), &[0]);
        // "is" carries 0 and 30, neither is loaded.
        assert!(loaded.offsets_by_term(b"is").is_empty());
        assert!(loaded.offsets_by_term(b"second").is_empty());
    }
}
