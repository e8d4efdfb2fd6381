use std::fs::File;
use std::io::{self, IoSlice, Read, Write};
use std::ops::Deref;
use std::path::Path;

use memmap2::{Mmap, MmapOptions};

/// Holds file data — either zero-copy mmap or an owned Vec.
/// Dereferences to `&[u8]` for transparent use.
#[derive(Debug)]
pub enum FileData {
    Mmap(Mmap),
    Owned(Vec<u8>),
}

impl Deref for FileData {
    type Target = [u8];

    fn deref(&self) -> &[u8] {
        match self {
            FileData::Mmap(m) => m,
            FileData::Owned(v) => v,
        }
    }
}

/// Threshold below which read() beats mmap: page table setup and the TLB
/// flush on munmap cost more than the copy for small files.
const MMAP_THRESHOLD: u64 = 1024 * 1024;

/// Read a whole file into memory: mmap for large regular files,
/// a plain read into an exact-size Vec otherwise.
pub fn read_file(path: &Path) -> io::Result<FileData> {
    let file = File::open(path)?;
    let metadata = file.metadata()?;
    let len = metadata.len();

    if len == 0 {
        return Ok(FileData::Owned(Vec::new()));
    }

    if metadata.file_type().is_file() && len >= MMAP_THRESHOLD {
        // SAFETY: read-only mapping; the file is not mutated while mapped.
        if let Ok(mmap) = unsafe { MmapOptions::new().map(&file) } {
            #[cfg(target_os = "linux")]
            {
                let _ = mmap.advise(memmap2::Advice::Sequential);
                let _ = mmap.advise(memmap2::Advice::WillNeed);
            }
            return Ok(FileData::Mmap(mmap));
        }
        // mmap failed — fall through to read()
    }

    let mut buf = Vec::with_capacity(len as usize);
    let mut reader = file;
    reader.read_to_end(&mut buf)?;
    Ok(FileData::Owned(buf))
}

/// Maximum IoSlices per writev call (Linux IOV_MAX = 1024).
pub const IOV_BATCH: usize = 1024;

/// Write every slice, batching writev calls and handling partial writes.
pub fn write_all_slices(out: &mut impl Write, slices: &[IoSlice<'_>]) -> io::Result<()> {
    let mut idx = 0;
    while idx < slices.len() {
        let end = (idx + IOV_BATCH).min(slices.len());
        let mut written = out.write_vectored(&slices[idx..end])?;
        if written == 0 {
            return Err(io::Error::new(
                io::ErrorKind::WriteZero,
                "failed to write any data",
            ));
        }
        // Advance past fully written slices, then finish a partial one.
        while idx < end && written >= slices[idx].len() {
            written -= slices[idx].len();
            idx += 1;
        }
        if written > 0 && idx < end {
            out.write_all(&slices[idx][written..])?;
            idx += 1;
        }
    }
    Ok(())
}
