use std::io::{self, Read};
use std::path::{Path, PathBuf};

use log::Level;

use super::encode::{EncoderSession, SessionFactory};
use super::output::segment_path;
use super::reformat::reformat_block;
use super::{ConvertEvent, ConvertOptions};
use crate::log_or_err;
use crate::structs::header::StreamParameters;
use crate::structs::manifest::{MAX_SEGMENTS, OutputManifest};
use crate::utils::errors::ConvertError;
use crate::utils::timing::{elapsed_seconds, interval_index};

/// Progress of a conversion through the split intervals.
#[derive(Debug)]
pub struct SplitState {
    /// Bytes of whole frames read from the data region.
    pub bytes_read: u64,
    /// Index of the segment currently being written.
    pub segment_index: usize,
    /// `crossed[k]` is set once the boundary ending interval `k` was handled.
    crossed: Vec<bool>,
}

impl Default for SplitState {
    fn default() -> Self {
        Self {
            bytes_read: 0,
            segment_index: 0,
            crossed: vec![false; MAX_SEGMENTS - 1],
        }
    }
}

impl SplitState {
    pub fn is_crossed(&self, boundary: u64) -> bool {
        usize::try_from(boundary)
            .ok()
            .and_then(|k| self.crossed.get(k))
            .copied()
            .unwrap_or(false)
    }

    /// Next boundary to handle, if `interval` has moved past it.
    fn pending_boundary(&self, interval: u64) -> Option<u64> {
        let next = self.segment_index as u64;
        (next < interval).then_some(next)
    }

    fn check_capacity(&self, boundary: u64) -> Result<usize, ConvertError> {
        usize::try_from(boundary)
            .ok()
            .filter(|&k| k < self.crossed.len())
            .ok_or(ConvertError::TooManySegments { max: MAX_SEGMENTS })
    }

    fn mark(&mut self, boundary: usize) {
        debug_assert!(!self.crossed[boundary], "boundary {boundary} crossed twice");
        debug_assert!(boundary == 0 || self.crossed[boundary - 1]);
        self.crossed[boundary] = true;
        self.segment_index = boundary + 1;
    }
}

/// Drives the read → reformat → encode loop and rotates output segments at
/// split boundaries.
///
/// Exactly one [`EncoderSession`] is open while encoding. Boundaries are
/// checked after each block, so segments start on block granularity rather
/// than on the exact boundary frame.
pub struct SplitOrchestrator<F, E>
where
    F: SessionFactory,
    E: FnMut(ConvertEvent<'_>),
{
    params: StreamParameters,
    output_base: PathBuf,
    options: ConvertOptions,
    factory: F,
    on_event: E,
    state: SplitState,
    manifest: OutputManifest,
}

impl<F, E> SplitOrchestrator<F, E>
where
    F: SessionFactory,
    E: FnMut(ConvertEvent<'_>),
{
    pub fn new(
        params: StreamParameters,
        output_base: &Path,
        options: ConvertOptions,
        factory: F,
        on_event: E,
    ) -> Self {
        Self {
            params,
            output_base: output_base.to_path_buf(),
            options,
            factory,
            on_event,
            state: SplitState::default(),
            manifest: OutputManifest::new(),
        }
    }

    /// Consumes the data region of `reader` until it is exhausted.
    pub fn run<R: Read>(mut self, reader: &mut R) -> Result<OutputManifest, ConvertError> {
        let block_align = self.params.block_align();
        let block_frames = self.options.block_frames.max(1);
        let mut buffer = vec![0u8; block_frames * block_align];
        let mut samples = Vec::with_capacity(block_frames * self.params.channels as usize);
        let mut trailing_bytes = 0usize;

        let mut session = self.open_segment(0)?;

        loop {
            let bytes_read = read_full(reader, &mut buffer)?;
            if bytes_read == 0 {
                break;
            }

            let whole = bytes_read - bytes_read % block_align;
            if whole < bytes_read {
                trailing_bytes = bytes_read - whole;
                log_or_err!(
                    self.options,
                    Level::Warn,
                    ConvertError::TrailingPartialFrame {
                        bytes: trailing_bytes
                    }
                );
            }
            if whole == 0 {
                break;
            }

            reformat_block(&buffer[..whole], self.params.bits_per_sample, &mut samples)?;
            session.feed(&samples, whole / block_align)?;

            self.state.bytes_read += whole as u64;
            (self.on_event)(ConvertEvent::Progress {
                bytes_read: self.state.bytes_read,
            });

            let interval = interval_index(
                self.state.bytes_read,
                &self.params,
                self.options.split_interval_seconds,
            );
            while let Some(boundary) = self.state.pending_boundary(interval) {
                if self.state.is_crossed(boundary) {
                    break;
                }
                session = self.rotate(session, boundary)?;
            }
        }

        log::debug!(
            "total bytes read: {}, bits per sample: {}, sample rate: {}",
            self.state.bytes_read,
            self.params.bits_per_sample,
            self.params.sample_rate
        );

        self.close_segment(session)?;

        let actual = self.state.bytes_read + trailing_bytes as u64;
        if actual != u64::from(self.params.data_size) {
            log_or_err!(
                self.options,
                Level::Warn,
                ConvertError::DataSizeMismatch {
                    declared: self.params.data_size,
                    actual,
                }
            );
        }

        Ok(self.manifest)
    }

    /// Closes `session` and opens the segment that follows `boundary`.
    fn rotate(&mut self, session: F::Session, boundary: u64) -> Result<F::Session, ConvertError> {
        let marker = self.state.check_capacity(boundary)?;

        self.close_segment(session)?;
        let next = self.open_segment(boundary + 1)?;
        self.state.mark(marker);

        log::info!(
            "Split at {:.3}s (interval {})",
            elapsed_seconds(self.state.bytes_read, &self.params),
            boundary + 1
        );

        Ok(next)
    }

    fn open_segment(&mut self, interval: u64) -> Result<F::Session, ConvertError> {
        let path = segment_path(&self.output_base, interval);
        log::info!("Writing to new FLAC file {}", path.display());

        let session = self.factory.open(&self.params, &path)?;
        (self.on_event)(ConvertEvent::SegmentOpened {
            index: self.manifest.len(),
            path: session.path(),
        });
        Ok(session)
    }

    fn close_segment(&mut self, session: F::Session) -> Result<(), ConvertError> {
        let path = session.finish()?;
        (self.on_event)(ConvertEvent::SegmentClosed {
            index: self.manifest.len(),
            path: &path,
        });
        self.manifest.push(path)
    }
}

/// Fills `buf` unless the stream ends first; returns the bytes read.
fn read_full<R: Read>(reader: &mut R, buf: &mut [u8]) -> io::Result<usize> {
    let mut filled = 0;
    while filled < buf.len() {
        match reader.read(&mut buf[filled..]) {
            Ok(0) => break,
            Ok(n) => filled += n,
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(e) => return Err(e),
        }
    }
    Ok(filled)
}
