use std::fs::File;
use std::io::{BufWriter, Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};

use flacenc::bitsink::ByteSink;
use flacenc::component::{BitRepr, Stream, StreamInfo};
use flacenc::config::Encoder as FlacConfig;
use flacenc::constant::MIN_BLOCK_SIZE;
use flacenc::error::{Verified, Verify};
use flacenc::source::{Fill, FrameBuf};

use crate::structs::header::StreamParameters;
use crate::utils::errors::ConvertError;

/// One open compressed-output stream.
///
/// A session accepts any number of [`feed`](EncoderSession::feed) calls and is
/// closed exactly once by [`finish`](EncoderSession::finish), which consumes
/// it. Dropping an unfinished session releases its resources without
/// completing the output.
pub trait EncoderSession {
    /// Appends `frames` frames of interleaved samples.
    fn feed(&mut self, samples: &[i32], frames: usize) -> Result<(), ConvertError>;

    /// Completes the output and returns its path.
    fn finish(self) -> Result<PathBuf, ConvertError>;

    fn path(&self) -> &Path;
}

/// Opens [`EncoderSession`]s for new output segments.
pub trait SessionFactory {
    type Session: EncoderSession;

    fn open(
        &mut self,
        params: &StreamParameters,
        path: &Path,
    ) -> Result<Self::Session, ConvertError>;
}

/// Creates FLAC files with the `flacenc` encoder.
#[derive(Debug, Clone, Default)]
pub struct FlacSessionFactory {
    /// FLAC block size in frames; `None` keeps the encoder default.
    pub block_size: Option<usize>,
}

impl FlacSessionFactory {
    pub fn with_block_size(block_size: usize) -> Self {
        Self {
            block_size: Some(block_size),
        }
    }

    fn verified_config(&self) -> Result<Verified<FlacConfig>, ConvertError> {
        let mut config = FlacConfig::default();
        if let Some(block_size) = self.block_size {
            config.block_size = block_size;
        }
        config
            .into_verified()
            .map_err(|(_, e)| ConvertError::encoder(format!("invalid encoder config: {e}")))
    }
}

impl SessionFactory for FlacSessionFactory {
    type Session = FlacSession;

    fn open(&mut self, params: &StreamParameters, path: &Path) -> Result<FlacSession, ConvertError> {
        let config = self.verified_config()?;
        let tail_config = verbatim_config(&config)?;
        let block_size = config.block_size;
        let channels = params.channels as usize;

        let mut stream_info = StreamInfo::new(
            params.sample_rate as usize,
            channels,
            params.bits_per_sample as usize,
        )
        .map_err(|e| ConvertError::encoder(format!("unsupported stream parameters: {e}")))?;
        stream_info
            .set_block_sizes(block_size, block_size)
            .map_err(|e| ConvertError::encoder(format!("invalid block size: {e}")))?;
        let frame_buf = FrameBuf::with_size(channels, block_size)
            .map_err(|e| ConvertError::encoder(format!("frame buffer: {e}")))?;

        // frame sizes stay unknown until finish
        let mut provisional = stream_info.clone();
        provisional
            .set_frame_sizes(0, 0)
            .map_err(|e| ConvertError::encoder(format!("invalid frame size: {e}")))?;

        let mut file = BufWriter::new(File::create(path)?);
        file.write_all(&stream_header(&provisional)?)?;

        Ok(FlacSession {
            path: path.to_path_buf(),
            file,
            config,
            tail_config,
            stream_info,
            frame_buf,
            block_size,
            channels,
            pending: Vec::with_capacity(block_size * channels),
            frame_number: 0,
            frames_fed: 0,
        })
    }
}

/// Variant of `config` restricted to constant and verbatim subframes, for
/// final frames too short to predict.
fn verbatim_config(config: &FlacConfig) -> Result<Verified<FlacConfig>, ConvertError> {
    let mut tail = config.clone();
    tail.subframe_coding.use_fixed = false;
    tail.subframe_coding.use_lpc = false;
    tail.into_verified()
        .map_err(|(_, e)| ConvertError::encoder(format!("invalid encoder config: {e}")))
}

/// `fLaC` marker followed by the STREAMINFO block.
fn stream_header(stream_info: &StreamInfo) -> Result<Vec<u8>, ConvertError> {
    let mut sink = ByteSink::new();
    Stream::with_stream_info(stream_info.clone())
        .write(&mut sink)
        .map_err(|e| ConvertError::encoder(format!("header write failed: {e}")))?;
    Ok(sink.into_inner())
}

/// A FLAC output file being written.
///
/// The stream header is written when the session opens. Every complete
/// block of `block_size` frames is encoded and written as soon as it is fed;
/// only the remainder is held back. [`finish`](EncoderSession::finish)
/// writes the short final frame and rewrites STREAMINFO with the final
/// sample count and frame sizes. The MD5 signature is left unset.
pub struct FlacSession {
    path: PathBuf,
    file: BufWriter<File>,
    config: Verified<FlacConfig>,
    tail_config: Verified<FlacConfig>,
    stream_info: StreamInfo,
    frame_buf: FrameBuf,
    block_size: usize,
    channels: usize,
    /// Interleaved samples of the incomplete block.
    pending: Vec<i32>,
    frame_number: usize,
    frames_fed: usize,
}

impl FlacSession {
    /// Frames fed so far.
    pub fn frames(&self) -> usize {
        self.frames_fed
    }

    fn write_frame(&mut self, interleaved: &[i32]) -> Result<(), ConvertError> {
        let frames = interleaved.len() / self.channels;
        if frames != self.frame_buf.size() {
            self.frame_buf.resize(frames);
        }
        self.frame_buf
            .fill_interleaved(interleaved)
            .map_err(|e| ConvertError::encoder(format!("frame buffer: {e}")))?;

        let config = if frames < MIN_BLOCK_SIZE {
            &self.tail_config
        } else {
            &self.config
        };
        let frame = flacenc::encode_fixed_size_frame(
            config,
            &self.frame_buf,
            self.frame_number,
            &self.stream_info,
        )
        .map_err(|e| ConvertError::encoder(format!("encode failed: {e:?}")))?;
        self.stream_info.update_frame_info(&frame);

        let mut sink = ByteSink::new();
        frame
            .write(&mut sink)
            .map_err(|e| ConvertError::encoder(format!("frame write failed: {e}")))?;
        self.file.write_all(sink.as_slice())?;

        self.frame_number += 1;
        Ok(())
    }
}

impl EncoderSession for FlacSession {
    fn feed(&mut self, samples: &[i32], frames: usize) -> Result<(), ConvertError> {
        if samples.len() != frames * self.channels {
            return Err(ConvertError::encoder(format!(
                "sample count {} does not match {frames} frames of {} channels",
                samples.len(),
                self.channels
            )));
        }
        self.frames_fed += frames;
        self.pending.extend_from_slice(samples);

        let block_len = self.block_size * self.channels;
        if self.pending.len() < block_len {
            return Ok(());
        }

        let pending = std::mem::take(&mut self.pending);
        let mut blocks = pending.chunks_exact(block_len);
        for block in &mut blocks {
            self.write_frame(block)?;
        }
        self.pending = blocks.remainder().to_vec();
        Ok(())
    }

    fn finish(mut self) -> Result<PathBuf, ConvertError> {
        let tail = std::mem::take(&mut self.pending);
        if !tail.is_empty() {
            self.write_frame(&tail)?;
        }

        // min block size covers every frame but the last
        self.stream_info
            .set_block_sizes(self.block_size, self.block_size)
            .map_err(|e| ConvertError::encoder(format!("invalid block size: {e}")))?;
        if self.frame_number == 0 {
            self.stream_info
                .set_frame_sizes(0, 0)
                .map_err(|e| ConvertError::encoder(format!("invalid frame size: {e}")))?;
        }

        let header = stream_header(&self.stream_info)?;
        self.file.flush()?;
        let file = self.file.get_mut();
        file.seek(SeekFrom::Start(0))?;
        file.write_all(&header)?;
        file.flush()?;

        log::debug!(
            "Finished {}: {} frames in {} FLAC frames",
            self.path.display(),
            self.frames_fed,
            self.frame_number
        );

        Ok(self.path)
    }

    fn path(&self) -> &Path {
        &self.path
    }
}
