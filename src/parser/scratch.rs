//! Scratch copies of compressed inputs
//!
//! Compressed FIT files are inflated into a named temporary file before
//! decoding. The returned [`NamedTempFile`] owns the scratch copy and deletes
//! it when dropped, so the copy is released on every exit path of the
//! caller, errors included.

use crate::error::Result;
use flate2::read::GzDecoder;
use log::debug;
use std::fs::File;
use std::io::{self, BufReader, Write};
use std::path::Path;
use tempfile::NamedTempFile;

/// True when the path carries a `.gz` extension (case-insensitive)
pub fn is_gzip_path(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| ext.eq_ignore_ascii_case("gz"))
        .unwrap_or(false)
}

/// Inflate a gzip file into a scratch file
///
/// The scratch file is created in `scratch_dir` when given, otherwise in the
/// system temp directory.
pub fn decompress_to_scratch(path: &Path, scratch_dir: Option<&Path>) -> Result<NamedTempFile> {
    let mut builder = tempfile::Builder::new();
    builder.prefix("temp_").suffix(".fit");
    let mut scratch = match scratch_dir {
        Some(dir) => builder.tempfile_in(dir)?,
        None => builder.tempfile()?,
    };

    let mut decoder = GzDecoder::new(BufReader::new(File::open(path)?));
    let bytes = io::copy(&mut decoder, &mut scratch)?;
    scratch.flush()?;

    debug!(
        "Decompressed {} ({} bytes) to {}",
        path.display(),
        bytes,
        scratch.path().display()
    );
    Ok(scratch)
}
