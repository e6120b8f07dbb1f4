//! Output container selection.

use ffmpeg_the_third::ffi;
use segmenter_common::{Error, Result};
use std::ffi::{CStr, CString};
use std::ptr;

/// Muxer used when none is configured.
pub const DEFAULT_OUTPUT_FORMAT: &str = "mpegts";

/// A resolved output muxer and the extension its segment files get.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutputFormat {
    /// FFmpeg muxer name, e.g. `mpegts`.
    pub name: String,
    /// Segment file extension without the dot.
    pub extension: String,
}

impl OutputFormat {
    /// Look up the muxer `name` and pick the segment extension.
    ///
    /// `input_extension` is kept when the muxer lists it among its
    /// extensions; otherwise the muxer's first extension is used.
    pub fn resolve(name: &str, input_extension: Option<&str>) -> Result<Self> {
        crate::init()?;

        let c_name = CString::new(name)
            .map_err(|_| Error::invalid_argument(format!("invalid output format name {:?}", name)))?;

        // SAFETY: av_guess_format returns a pointer to a static muxer
        // description or null; extensions is a static C string or null.
        let extensions = unsafe {
            let format = ffi::av_guess_format(c_name.as_ptr(), ptr::null(), ptr::null());
            if format.is_null() {
                return Err(Error::format(format!(
                    "output format {:?} is not supported",
                    name
                )));
            }
            let extensions = (*format).extensions;
            if extensions.is_null() {
                String::new()
            } else {
                CStr::from_ptr(extensions).to_string_lossy().into_owned()
            }
        };

        let extension = choose_extension(&extensions, input_extension, name);
        tracing::debug!(
            "Output format {} (extensions {:?}), segments use .{}",
            name,
            extensions,
            extension
        );

        Ok(Self {
            name: name.to_string(),
            extension,
        })
    }
}

/// Pick a segment extension from a muxer's comma-separated extension list.
///
/// ```
/// use segmenter_av::choose_extension;
///
/// assert_eq!(choose_extension("ts,m2t,m2ts,mts", Some("m2ts"), "mpegts"), "m2ts");
/// assert_eq!(choose_extension("ts,m2t,m2ts,mts", Some("mkv"), "mpegts"), "ts");
/// ```
pub fn choose_extension(extensions: &str, input_extension: Option<&str>, format_name: &str) -> String {
    let listed: Vec<&str> = extensions
        .split(',')
        .map(str::trim)
        .filter(|ext| !ext.is_empty())
        .collect();

    if let Some(input) = input_extension {
        if let Some(ext) = listed.iter().find(|ext| ext.eq_ignore_ascii_case(input)) {
            return ext.to_string();
        }
    }

    match listed.first() {
        Some(first) => first.to_string(),
        // Muxers without an extension list (e.g. network-only ones).
        None if format_name == DEFAULT_OUTPUT_FORMAT => "ts".to_string(),
        None => format_name.to_string(),
    }
}
