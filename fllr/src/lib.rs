#![doc = include_str!("../README.md")]
//!
//! ## Technical Overview
//!
//! Converter for linear PCM captures stored in Apple's `FLLR` variant of the
//! WAVE container.
//!
//! ### Container Layout
//!
//! **Fixed Header**: 44 bytes holding the `RIFF` tag, the `fmt ` fields and the
//! start of the vendor `FLLR` filler chunk.
//! **Filler**: padding of declared length, skipped without interpretation.
//! **Data**: `data` chunk header followed by interleaved little-endian PCM
//! until the end of the stream.
//!
//! ### Segmentation
//!
//! When a split interval is given, a new output file starts each time the
//! audio read so far completes another interval. Boundaries are checked
//! between read blocks, so segment lengths are approximate to one block.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use std::path::Path;
//! use fllr::process::convert_wav_to_flac;
//!
//! // 30 seconds of audio split every 10 seconds gives
//! // take.flac, take_1.flac and take_2.flac
//! let manifest = convert_wav_to_flac(Path::new("take.wav"), Path::new("take"), 10)?;
//!
//! for path in &manifest {
//!     println!("{}", path.display());
//! }
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

/// The conversion pipeline.
///
/// 1. **Reformatting** ([`process::reformat`]): packed PCM bytes to signed
///    samples.
///
/// 2. **Encoding** ([`process::encode`]): encoder sessions and the FLAC
///    adapter.
///
/// 3. **Splitting** ([`process::split`]): the read/encode loop and segment
///    rotation.
pub mod process;

/// Data structures of the container and conversion results.
///
/// - **Header** ([`structs::header`]): container header parsing
/// - **Manifest** ([`structs::manifest`]): produced output files
pub mod structs;

/// Utility functions and supporting infrastructure.
///
/// - **Error Handling** ([`utils::errors`]): Error types
/// - **Byte Order** ([`utils::byteorder`]): Little-endian serialization
/// - **Timing** ([`utils::timing`]): Byte count to playback time
pub mod utils;

pub use process::{ConvertEvent, ConvertOptions, convert_wav_to_flac, convert_with};
pub use structs::header::StreamParameters;
pub use structs::manifest::{MAX_SEGMENTS, OutputManifest};
pub use utils::errors::ConvertError;
