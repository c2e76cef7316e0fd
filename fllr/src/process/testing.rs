//! Test doubles shared by the pipeline tests.

use std::cell::RefCell;
use std::io;
use std::path::{Path, PathBuf};
use std::rc::Rc;

use bitstream_io::{BigEndian, BitRead, BitReader};

use super::encode::{EncoderSession, SessionFactory};
use crate::structs::header::{StreamParameters, encode_header};
use crate::utils::errors::ConvertError;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Call {
    Open(PathBuf),
    Feed(usize),
    Finish(PathBuf),
}

/// Session factory that records every call instead of encoding.
#[derive(Clone, Default)]
pub struct RecordingFactory {
    pub calls: Rc<RefCell<Vec<Call>>>,
    /// Fail the n-th feed call (0-based) across all sessions.
    pub fail_feed_at: Option<usize>,
}

impl RecordingFactory {
    pub fn calls(&self) -> Vec<Call> {
        self.calls.borrow().clone()
    }

    pub fn opened(&self) -> usize {
        self.count(|c| matches!(c, Call::Open(_)))
    }

    pub fn finished(&self) -> usize {
        self.count(|c| matches!(c, Call::Finish(_)))
    }

    /// Frames fed to each segment, in segment order.
    pub fn frames_per_segment(&self) -> Vec<usize> {
        let mut segments = Vec::new();
        for call in self.calls.borrow().iter() {
            match call {
                Call::Open(_) => segments.push(0),
                Call::Feed(frames) => {
                    if let Some(last) = segments.last_mut() {
                        *last += frames;
                    }
                }
                Call::Finish(_) => {}
            }
        }
        segments
    }

    fn count(&self, pred: impl Fn(&Call) -> bool) -> usize {
        self.calls.borrow().iter().filter(|c| pred(c)).count()
    }
}

pub struct RecordingSession {
    path: PathBuf,
    factory: RecordingFactory,
}

impl SessionFactory for RecordingFactory {
    type Session = RecordingSession;

    fn open(
        &mut self,
        _params: &StreamParameters,
        path: &Path,
    ) -> Result<RecordingSession, ConvertError> {
        self.calls.borrow_mut().push(Call::Open(path.to_path_buf()));
        Ok(RecordingSession {
            path: path.to_path_buf(),
            factory: self.clone(),
        })
    }
}

impl EncoderSession for RecordingSession {
    fn feed(&mut self, _samples: &[i32], frames: usize) -> Result<(), ConvertError> {
        let feeds = self
            .factory
            .count(|c| matches!(c, Call::Feed(_)));
        if self.factory.fail_feed_at == Some(feeds) {
            return Err(ConvertError::EncoderError("injected feed failure".into()));
        }
        self.factory.calls.borrow_mut().push(Call::Feed(frames));
        Ok(())
    }

    fn finish(self) -> Result<PathBuf, ConvertError> {
        self.factory
            .calls
            .borrow_mut()
            .push(Call::Finish(self.path.clone()));
        Ok(self.path)
    }

    fn path(&self) -> &Path {
        &self.path
    }
}

/// A complete capture of `frames` silent frames with no filler.
pub fn silent_capture(mut params: StreamParameters, frames: usize) -> Vec<u8> {
    params.filler_len = 0;
    params.data_size = (frames * params.block_align()) as u32;
    let mut bytes = encode_header(&params);
    bytes.resize(bytes.len() + params.data_size as usize, 0);
    bytes
}

/// Fields of a FLAC file's STREAMINFO block.
#[derive(Debug)]
pub struct StreamInfoFields {
    pub min_block_size: u16,
    pub max_block_size: u16,
    pub min_frame_size: u32,
    pub max_frame_size: u32,
    pub sample_rate: u32,
    pub channels: u8,
    pub bits_per_sample: u8,
    pub total_samples: u64,
}

pub fn read_stream_info(flac: &[u8]) -> io::Result<StreamInfoFields> {
    if flac.get(0..4) != Some(b"fLaC".as_slice()) {
        return Err(io::Error::new(io::ErrorKind::InvalidData, "missing fLaC marker"));
    }
    // skip the marker and the metadata block header
    let body = flac.get(8..).unwrap_or_default();
    let mut reader = BitReader::endian(body, BigEndian);

    Ok(StreamInfoFields {
        min_block_size: reader.read_unsigned_var(16)?,
        max_block_size: reader.read_unsigned_var(16)?,
        min_frame_size: reader.read_unsigned_var(24)?,
        max_frame_size: reader.read_unsigned_var(24)?,
        sample_rate: reader.read_unsigned_var(20)?,
        channels: reader.read_unsigned_var::<u8>(3)? + 1,
        bits_per_sample: reader.read_unsigned_var::<u8>(5)? + 1,
        total_samples: reader.read_unsigned_var(36)?,
    })
}
