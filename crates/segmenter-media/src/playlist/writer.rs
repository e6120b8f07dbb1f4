//! The playlist writer state machine.

use super::render;
use super::types::{PlaylistEntry, PlaylistOptions};
use crate::naming::{segment_filename, temp_playlist_path};
use segmenter_common::{Error, Result};
use std::collections::VecDeque;
use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::num::NonZeroUsize;
use std::path::{Path, PathBuf};

/// Where entries go while the writer is open.
#[derive(Debug)]
enum Sink {
    /// Entries are appended to the open temporary file.
    Append(BufWriter<File>),
    /// The visible window is rewritten and published after every entry.
    Window(VecDeque<PlaylistEntry>),
}

#[derive(Debug)]
enum State {
    Uninitialized,
    Open(Sink),
    /// A write failed mid-run. Entries are no longer written and the
    /// playlist will not be published. A rolling window keeps evicting so
    /// expired segments can still be deleted.
    Degraded(Option<VecDeque<PlaylistEntry>>),
    Finalized,
}

/// Owns the playlist file for one run.
///
/// Lifecycle: [`begin`](Self::begin) creates the temporary file and writes
/// the header, [`record`](Self::record) adds one entry per completed segment,
/// [`finalize`](Self::finalize) writes `#EXT-X-ENDLIST` and renames the
/// temporary file over the final path. Until that rename the final path is
/// never created or modified (except by rolling-window publication). Dropping
/// an unfinished writer deletes the temporary file.
#[derive(Debug)]
pub struct PlaylistWriter {
    final_path: PathBuf,
    temp_path: PathBuf,
    options: PlaylistOptions,
    sequence: u64,
    pending_filename: String,
    state: State,
}

impl PlaylistWriter {
    /// Create a writer for the playlist at `final_path`. Nothing is written
    /// until [`begin`](Self::begin).
    pub fn new(final_path: impl Into<PathBuf>, options: PlaylistOptions) -> Result<Self> {
        let final_path = final_path.into();
        let temp_path = temp_playlist_path(&final_path)?;

        if !options.target_duration.is_finite() || options.target_duration <= 0.0 {
            return Err(Error::invalid_argument(format!(
                "segment duration must be a positive number of seconds, got {}",
                options.target_duration
            )));
        }

        let sequence = options.first_sequence;
        let pending_filename = segment_filename(&options.output_prefix, sequence, &options.extension);

        Ok(Self {
            final_path,
            temp_path,
            options,
            sequence,
            pending_filename,
            state: State::Uninitialized,
        })
    }

    pub fn final_path(&self) -> &Path {
        &self.final_path
    }

    pub fn temp_path(&self) -> &Path {
        &self.temp_path
    }

    pub fn options(&self) -> &PlaylistOptions {
        &self.options
    }

    /// Sequence number the next recorded entry will get.
    pub fn sequence_number(&self) -> u64 {
        self.sequence
    }

    /// File name of the segment the next recorded entry will describe.
    pub fn pending_segment_filename(&self) -> &str {
        &self.pending_filename
    }

    pub fn is_open(&self) -> bool {
        matches!(self.state, State::Open(_))
    }

    pub fn is_degraded(&self) -> bool {
        matches!(self.state, State::Degraded(_))
    }

    pub fn is_finalized(&self) -> bool {
        matches!(self.state, State::Finalized)
    }

    /// Create the temporary file and write the header.
    ///
    /// On failure any partially written temporary file is removed and the
    /// writer stays uninitialized.
    pub fn begin(&mut self) -> Result<()> {
        if !matches!(self.state, State::Uninitialized) {
            return Err(Error::playlist("playlist writer has already begun"));
        }

        let sink = match self.create_sink() {
            Ok(sink) => sink,
            Err(e) => {
                remove_if_exists(&self.temp_path);
                return Err(e);
            }
        };

        tracing::debug!("Writing playlist to {:?}", self.temp_path);
        self.state = State::Open(sink);
        Ok(())
    }

    fn create_sink(&self) -> Result<Sink> {
        let target = self.options.declared_target_duration();

        match self.options.max_window {
            Some(window) => {
                let text = render::header(target, Some(self.sequence));
                fs::write(&self.temp_path, text)?;
                Ok(Sink::Window(VecDeque::with_capacity(window.get() + 1)))
            }
            None => {
                let media_sequence = (self.sequence != 1).then_some(self.sequence);
                let mut file = BufWriter::new(File::create(&self.temp_path)?);
                file.write_all(render::header(target, media_sequence).as_bytes())?;
                file.flush()?;
                Ok(Sink::Append(file))
            }
        }
    }

    /// Record the segment described by the pending file name and advance to
    /// the next sequence number.
    ///
    /// Returns the entry that fell out of the rolling window, if any, also
    /// once the playlist is degraded. The sequence number advances even when
    /// the playlist is degraded, so segment file names stay consistent with
    /// what a recovered playlist would list.
    pub fn record(&mut self, duration: f64) -> Result<Option<PlaylistEntry>> {
        let entry = PlaylistEntry {
            sequence: self.sequence,
            duration,
            uri: format!("{}{}", self.options.http_prefix, self.pending_filename),
            filename: self.pending_filename.clone(),
        };

        let result = match &mut self.state {
            State::Uninitialized => {
                return Err(Error::playlist("record called before begin"));
            }
            State::Finalized => {
                return Err(Error::playlist("record called after finalize"));
            }
            State::Degraded(window) => {
                tracing::debug!(
                    "Playlist degraded, not recording segment {}",
                    entry.sequence
                );
                Ok(window
                    .as_mut()
                    .and_then(|entries| push_windowed(entries, entry.clone(), self.options.max_window)))
            }
            State::Open(Sink::Append(file)) => append_entry(file, &entry, &self.options).map(|_| None),
            State::Open(Sink::Window(entries)) => {
                let evicted = push_windowed(entries, entry.clone(), self.options.max_window);
                publish_window(&self.temp_path, &self.final_path, entries, &self.options, false)
                    .map(|_| evicted)
            }
        };

        self.advance();

        if let Err(e) = &result {
            tracing::error!(
                "Failed to write playlist entry for segment {}: {}",
                entry.sequence,
                e
            );
            self.degrade();
        }

        result
    }

    /// Stop writing, keeping a rolling window's entries.
    fn degrade(&mut self) {
        let window = match std::mem::replace(&mut self.state, State::Uninitialized) {
            State::Open(Sink::Window(entries)) => Some(entries),
            State::Degraded(window) => window,
            _ => None,
        };
        self.state = State::Degraded(window);
    }

    fn advance(&mut self) {
        self.sequence += 1;
        self.pending_filename = segment_filename(
            &self.options.output_prefix,
            self.sequence,
            &self.options.extension,
        );
    }

    /// Write `#EXT-X-ENDLIST`, sync and atomically publish the playlist.
    ///
    /// Returns the published path. Fails without publishing when the writer
    /// is degraded, has not begun, or was already finalized.
    pub fn finalize(&mut self) -> Result<PathBuf> {
        let sink = match std::mem::replace(&mut self.state, State::Finalized) {
            State::Open(sink) => sink,
            State::Finalized => {
                return Err(Error::playlist("playlist has already been finalized"));
            }
            State::Uninitialized => {
                self.state = State::Uninitialized;
                return Err(Error::playlist("finalize called before begin"));
            }
            State::Degraded(window) => {
                self.state = State::Degraded(window);
                return Err(Error::playlist(format!(
                    "not publishing {:?}: an earlier playlist write failed",
                    self.final_path
                )));
            }
        };

        let published = match sink {
            Sink::Append(file) => self.finish_append(file),
            Sink::Window(entries) => {
                publish_window(&self.temp_path, &self.final_path, &entries, &self.options, true)
            }
        };

        if let Err(e) = published {
            self.state = State::Degraded(None);
            return Err(e);
        }

        tracing::info!("Published playlist {:?}", self.final_path);
        Ok(self.final_path.clone())
    }

    fn finish_append(&self, mut file: BufWriter<File>) -> Result<()> {
        file.write_all(render::END_LIST.as_bytes())?;
        file.flush()?;
        file.get_ref().sync_all()?;
        drop(file);

        fs::rename(&self.temp_path, &self.final_path)?;
        Ok(())
    }
}

impl Drop for PlaylistWriter {
    fn drop(&mut self) {
        if matches!(self.state, State::Uninitialized | State::Finalized) {
            return;
        }

        // Close the handle before deleting.
        self.state = State::Uninitialized;
        tracing::debug!("Discarding unfinished playlist {:?}", self.temp_path);
        remove_if_exists(&self.temp_path);
    }
}

/// Add `entry` to the window and return the entry that fell out of it.
fn push_windowed(
    entries: &mut VecDeque<PlaylistEntry>,
    entry: PlaylistEntry,
    max_window: Option<NonZeroUsize>,
) -> Option<PlaylistEntry> {
    entries.push_back(entry);
    match max_window {
        Some(window) if entries.len() > window.get() => entries.pop_front(),
        _ => None,
    }
}

fn append_entry(
    file: &mut BufWriter<File>,
    entry: &PlaylistEntry,
    options: &PlaylistOptions,
) -> Result<()> {
    file.write_all(render::entry(entry, options.duration_format).as_bytes())?;
    file.flush()?;
    Ok(())
}

/// Rewrite the temporary file with the visible window and rename it over the
/// final path.
fn publish_window(
    temp_path: &Path,
    final_path: &Path,
    entries: &VecDeque<PlaylistEntry>,
    options: &PlaylistOptions,
    ended: bool,
) -> Result<()> {
    let first_visible = entries
        .front()
        .map(|entry| entry.sequence)
        .unwrap_or(options.first_sequence);
    let text = render::window(
        options.declared_target_duration(),
        entries,
        first_visible,
        options.duration_format,
        ended,
    );

    let mut file = File::create(temp_path)?;
    file.write_all(text.as_bytes())?;
    file.sync_all()?;
    drop(file);

    fs::rename(temp_path, final_path)?;
    Ok(())
}

fn remove_if_exists(path: &Path) {
    match fs::remove_file(path) {
        Ok(()) => {}
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
        Err(e) => tracing::warn!("Failed to remove {:?}: {}", path, e),
    }
}
