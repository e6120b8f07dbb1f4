//! File naming for segments and the temporary playlist.

use segmenter_common::{Error, Result};
use std::path::{Path, PathBuf};

/// Name of the segment file with the given sequence number.
///
/// ```
/// use segmenter_media::naming::segment_filename;
///
/// assert_eq!(segment_filename("live", 7, "ts"), "live-7.ts");
/// ```
pub fn segment_filename(prefix: &str, sequence: u64, extension: &str) -> String {
    format!("{}-{}.{}", prefix, sequence, extension)
}

/// Hidden sibling of the final playlist that receives writes until it is
/// renamed into place.
pub fn temp_playlist_path(final_path: &Path) -> Result<PathBuf> {
    let file_name = final_path.file_name().ok_or_else(|| {
        Error::invalid_argument(format!(
            "playlist path has no file name: {}",
            final_path.display()
        ))
    })?;

    let mut temp_name = std::ffi::OsString::from(".");
    temp_name.push(file_name);
    Ok(final_path.with_file_name(temp_name))
}
