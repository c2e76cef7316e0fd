use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;

use crate::structs::header::{StreamParameters, parse_header};
use crate::structs::manifest::OutputManifest;
use crate::utils::errors::ConvertError;

/// Encoder session abstraction and the FLAC implementation.
///
/// Provides the [`EncoderSession`](encode::EncoderSession) and
/// [`SessionFactory`](encode::SessionFactory) traits plus
/// [`FlacSessionFactory`](encode::FlacSessionFactory).
pub mod encode;

/// Output file naming.
pub mod output;

/// Packed PCM to signed sample conversion.
pub mod reformat;

/// The read/encode loop and split boundary handling.
///
/// Provides the [`SplitOrchestrator`](split::SplitOrchestrator).
pub mod split;

#[cfg(test)]
pub(crate) mod testing;

use encode::{FlacSessionFactory, SessionFactory};
use split::SplitOrchestrator;

/// Frames read from the data region per block.
pub const DEFAULT_BLOCK_FRAMES: usize = 1024;

/// Settings for a single conversion.
#[derive(Debug, Clone, Copy)]
pub struct ConvertOptions {
    /// Length of each output segment in seconds; 0 writes a single file.
    pub split_interval_seconds: u32,
    /// Frames read and fed to the encoder per block.
    pub block_frames: usize,
    /// Recoverable anomalies at or above this level abort the conversion.
    ///
    /// - `log::Level::Error`: only log them (default)
    /// - `log::Level::Warn`: fail on them (strict mode)
    pub fail_level: log::Level,
}

impl Default for ConvertOptions {
    fn default() -> Self {
        Self {
            split_interval_seconds: 0,
            block_frames: DEFAULT_BLOCK_FRAMES,
            fail_level: log::Level::Error,
        }
    }
}

impl ConvertOptions {
    pub fn with_split_interval(split_interval_seconds: u32) -> Self {
        Self {
            split_interval_seconds,
            ..Self::default()
        }
    }
}

/// Progress notifications emitted during a conversion.
#[derive(Debug, Clone, Copy)]
pub enum ConvertEvent<'a> {
    /// The header was parsed; sample data follows.
    Started { params: &'a StreamParameters },
    /// A new output segment was opened.
    SegmentOpened { index: usize, path: &'a Path },
    /// Total bytes of sample data consumed so far.
    Progress { bytes_read: u64 },
    /// A segment was finished and recorded in the manifest.
    SegmentClosed { index: usize, path: &'a Path },
}

/// Converts the FLLR capture at `input` into FLAC files next to
/// `output_base`.
///
/// With `split_interval_seconds` of 0 a single `<output_base>.flac` is
/// written; otherwise a new `<output_base>_<n>.flac` starts every
/// `split_interval_seconds` of audio. Returns every written path in creation
/// order. On failure no manifest is returned and files already written stay
/// on disk.
pub fn convert_wav_to_flac(
    input: &Path,
    output_base: &Path,
    split_interval_seconds: u32,
) -> Result<OutputManifest, ConvertError> {
    let mut reader = BufReader::new(File::open(input)?);
    convert_with(
        &mut reader,
        output_base,
        ConvertOptions::with_split_interval(split_interval_seconds),
        FlacSessionFactory::default(),
        |_| {},
    )
}

/// Runs the whole pipeline over `reader` with an arbitrary encoder.
///
/// `on_event` observes the conversion; see [`ConvertEvent`].
pub fn convert_with<R, F, E>(
    reader: &mut R,
    output_base: &Path,
    options: ConvertOptions,
    factory: F,
    mut on_event: E,
) -> Result<OutputManifest, ConvertError>
where
    R: Read,
    F: SessionFactory,
    E: FnMut(ConvertEvent<'_>),
{
    let params = parse_header(reader)?;
    on_event(ConvertEvent::Started { params: &params });

    let manifest = SplitOrchestrator::new(params, output_base, options, factory, on_event).run(reader)?;

    log::info!("Wrote {} FLAC file(s)", manifest.len());
    Ok(manifest)
}
