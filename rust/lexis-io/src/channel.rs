//! Sharded append-only store for raw string records.
//!
//! Records are `[u64 length][bytes]`, addressed by a global logical offset.
//! The offset space is cut into `max_channels` slices of `max_channel_size`
//! bytes, slice `i` living in the file `strings{i + 1}.scdb`. A record starts
//! inside its channel's slice but may run past its end; the next record then
//! starts in the following channel.
//!
//! Locking: the channel table mutex guards offset allocation and lazy channel
//! opening, each channel has its own mutex for file I/O. The table lock is
//! always taken first. Appends hold both for the whole write, reads release
//! the table lock as soon as the channel is resolved.

use std::{
    fs::File,
    path::{Path, PathBuf},
    sync::{Arc, Mutex, MutexGuard, PoisonError},
};

use lexis_common::{Result, error::Error, verify_arg};

use crate::file::{
    file_read_at_exact, file_read_u64_at, file_write_at, open_existing, open_read_write,
    remove_if_exists,
};

/// Size of the length prefix of every record.
pub const RECORD_HEADER_SIZE: u64 = 8;

pub fn channel_file_name(index: usize) -> String {
    format!("strings{}.scdb", index + 1)
}

struct Channel {
    index: usize,
    path: PathBuf,
    file: Mutex<File>,
}

/// How a channel missing from the table is opened.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
enum OpenMode {
    /// Appends create the file.
    Create,
    /// Reads only open a file that is already there.
    Existing,
}

impl Channel {
    fn open(root: &Path, index: usize, mode: OpenMode) -> Result<Channel> {
        let path = root.join(channel_file_name(index));
        let file = match mode {
            OpenMode::Create => {
                open_read_write(&path).map_err(|e| Error::io(path.display().to_string(), e))?
            }
            OpenMode::Existing => {
                open_existing(&path).map_err(|e| Error::read(path.display().to_string(), e))?
            }
        };
        log::debug!("opened strings channel {}", path.display());
        Ok(Channel {
            index,
            path,
            file: Mutex::new(file),
        })
    }

    fn lock(&self) -> MutexGuard<'_, File> {
        self.file.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn sync(&self) -> Result<()> {
        self.lock()
            .sync_data()
            .map_err(|e| Error::write(self.path.display().to_string(), e))
    }
}

struct ChannelTable {
    last_offset: u64,
    channels: Vec<Option<Arc<Channel>>>,
    /// Channel the tail of the offset space currently lives in.
    current: Option<usize>,
}

impl ChannelTable {
    fn channel(&mut self, root: &Path, index: usize, mode: OpenMode) -> Result<Arc<Channel>> {
        if let Some(channel) = &self.channels[index] {
            return Ok(channel.clone());
        }
        let channel = Arc::new(Channel::open(root, index, mode)?);
        self.channels[index] = Some(channel.clone());
        Ok(channel)
    }
}

/// Bounded set of append-only channel files under one directory.
pub struct ChannelStore {
    root: PathBuf,
    max_channels: usize,
    max_channel_size: u64,
    table: Mutex<ChannelTable>,
}

impl ChannelStore {
    pub fn new(
        root: impl Into<PathBuf>,
        max_channels: usize,
        max_channel_size: u64,
    ) -> Result<ChannelStore> {
        verify_arg!(max_channels, max_channels > 0);
        verify_arg!(max_channel_size, max_channel_size > 0);
        Ok(ChannelStore {
            root: root.into(),
            max_channels,
            max_channel_size,
            table: Mutex::new(ChannelTable {
                last_offset: 0,
                channels: (0..max_channels).map(|_| None).collect(),
                current: None,
            }),
        })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn max_channels(&self) -> usize {
        self.max_channels
    }

    pub fn max_channel_size(&self) -> u64 {
        self.max_channel_size
    }

    /// Channel index and in-channel position of a logical offset.
    pub fn locate(&self, offset: u64) -> Result<(usize, u64)> {
        let index = offset / self.max_channel_size;
        if index >= self.max_channels as u64 {
            return Err(Error::storage_full(offset, self.max_channels));
        }
        Ok((index as usize, offset - index * self.max_channel_size))
    }

    /// Offset the next appended record will get.
    pub fn last_offset(&self) -> u64 {
        self.lock_table().last_offset
    }

    /// Restores the offset counter, e.g. from a persisted index header.
    pub fn set_last_offset(&self, offset: u64) {
        let mut table = self.lock_table();
        table.last_offset = offset;
        table.current = None;
    }

    /// Logical offset just past the data found in the channel files, for
    /// restoring the counter when no persisted value is usable.
    pub fn stored_end(&self) -> Result<u64> {
        for index in (0..self.max_channels).rev() {
            let path = self.root.join(channel_file_name(index));
            let len = match std::fs::metadata(&path) {
                Ok(metadata) => metadata.len(),
                Err(e) if e.kind() == std::io::ErrorKind::NotFound => continue,
                Err(e) => return Err(Error::io(path.display().to_string(), e)),
            };
            if len > 0 {
                return Ok(index as u64 * self.max_channel_size + len);
            }
        }
        Ok(0)
    }

    pub fn open_channels(&self) -> usize {
        self.lock_table().channels.iter().flatten().count()
    }

    /// Appends a record and returns its offset. The offset counter only moves
    /// once the record is fully written.
    pub fn append_record(&self, bytes: &[u8]) -> Result<u64> {
        let mut table = self.lock_table();
        let offset = table.last_offset;
        let (index, pos) = self.locate(offset)?;

        let channel = table.channel(&self.root, index, OpenMode::Create)?;
        if table.current != Some(index) {
            if let Some(previous) = table.current.and_then(|i| table.channels[i].clone()) {
                log::info!(
                    "strings channel {} is full, continuing in {}",
                    previous.path.display(),
                    channel.path.display()
                );
                previous.sync()?;
            }
            table.current = Some(index);
        }

        let mut record = Vec::with_capacity(RECORD_HEADER_SIZE as usize + bytes.len());
        record.extend_from_slice(&(bytes.len() as u64).to_ne_bytes());
        record.extend_from_slice(bytes);

        let file = channel.lock();
        if let Err(e) = file_write_at(&file, pos, &record) {
            log::error!(
                "failed to write {} bytes at {} to {}: {e}",
                record.len(),
                pos,
                channel.path.display()
            );
            return Err(Error::write(channel.path.display().to_string(), e));
        }
        table.last_offset = offset + record.len() as u64;
        Ok(offset)
    }

    /// Reads the record at `offset`.
    pub fn read_record(&self, offset: u64) -> Result<Vec<u8>> {
        let read = self.read_record_if(offset, |_| true)?;
        Ok(read.unwrap_or_default())
    }

    /// Reads the record at `offset` if `accept` approves of its length.
    /// Rejected records cost a single header read. Reading from a channel
    /// file that does not exist fails without creating it.
    pub fn read_record_if(
        &self,
        offset: u64,
        accept: impl FnOnce(u64) -> bool,
    ) -> Result<Option<Vec<u8>>> {
        let (index, pos) = self.locate(offset).map_err(|e| {
            Error::read(
                format!("record@{offset}"),
                std::io::Error::new(std::io::ErrorKind::InvalidData, e.to_string()),
            )
        })?;
        let channel = self.lock_table().channel(&self.root, index, OpenMode::Existing)?;

        let context = || format!("{}@{}", channel.path.display(), offset);
        let file = channel.lock();
        let len = file_read_u64_at(&file, pos).map_err(|e| Error::read(context(), e))?;
        if !accept(len) {
            return Ok(None);
        }

        let file_size = file.metadata().map_err(|e| Error::read(context(), e))?.len();
        let end = (pos + RECORD_HEADER_SIZE).checked_add(len);
        if end.is_none_or(|end| end > file_size) {
            return Err(Error::read(
                context(),
                std::io::Error::new(
                    std::io::ErrorKind::InvalidData,
                    format!("record length {len} runs past the end of the channel"),
                ),
            ));
        }

        let mut bytes = vec![0u8; len as usize];
        file_read_at_exact(&file, pos + RECORD_HEADER_SIZE, &mut bytes)
            .map_err(|e| Error::read(context(), e))?;
        Ok(Some(bytes))
    }

    /// Syncs every open channel to disk.
    pub fn flush(&self) -> Result<()> {
        let channels: Vec<Arc<Channel>> =
            self.lock_table().channels.iter().flatten().cloned().collect();
        for channel in channels {
            channel.sync()?;
            log::trace!("flushed strings channel {}", channel.index + 1);
        }
        Ok(())
    }

    /// Flushes and closes every open channel. Channels reopen lazily on the
    /// next access.
    pub fn close(&self) -> Result<()> {
        self.flush()?;
        let mut table = self.lock_table();
        table.channels.iter_mut().for_each(|c| *c = None);
        table.current = None;
        Ok(())
    }

    /// Deletes the channel files of a store rooted at `root`. Returns the
    /// number of files removed.
    pub fn remove_files(root: &Path, max_channels: usize) -> Result<usize> {
        let mut removed = 0;
        for index in 0..max_channels {
            let path = root.join(channel_file_name(index));
            if remove_if_exists(&path).map_err(|e| Error::io(path.display().to_string(), e))? {
                removed += 1;
            }
        }
        Ok(removed)
    }

    fn lock_table(&self) -> MutexGuard<'_, ChannelTable> {
        self.table.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl std::fmt::Debug for ChannelStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ChannelStore")
            .field("root", &self.root)
            .field("max_channels", &self.max_channels)
            .field("max_channel_size", &self.max_channel_size)
            .finish()
    }
}
