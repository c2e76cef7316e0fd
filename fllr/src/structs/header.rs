//! Fixed-layout header of Apple `FLLR` WAVE captures.
//!
//! The container is a RIFF file whose `fmt ` chunk is immediately followed by
//! a vendor `FLLR` padding chunk and then the `data` chunk:
//!
//! | Offset | Size | Field                         |
//! |--------|------|-------------------------------|
//! | 0      | 4    | `RIFF`                        |
//! | 22     | 2    | channel count                 |
//! | 24     | 4    | sample rate                   |
//! | 34     | 2    | bits per sample               |
//! | 36     | 4    | `FLLR`                        |
//! | 40     | 2    | filler byte count             |
//! | 44     | n    | filler bytes                  |
//! | 44+n   | 4    | `data`                        |
//! | 48+n   | 4    | declared data size            |
//!
//! Any other chunk layout is rejected.

use std::io::{self, Cursor, Read};

use bitstream_io::{ByteRead, ByteReader, LittleEndian};

use crate::utils::errors::ConvertError;

pub const HEADER_LEN: usize = 44;
pub const DATA_CHUNK_HEADER_LEN: usize = 8;

pub const RIFF_TAG: [u8; 4] = *b"RIFF";
pub const WAVE_TAG: [u8; 4] = *b"WAVE";
pub const FMT_TAG: [u8; 4] = *b"fmt ";
pub const FLLR_TAG: [u8; 4] = *b"FLLR";
pub const DATA_TAG: [u8; 4] = *b"data";

const PCM_FORMAT_TAG: u16 = 1;

/// Audio format parameters of a parsed capture.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StreamParameters {
    pub channels: u16,
    pub sample_rate: u32,
    pub bits_per_sample: u16,
    /// Length of the `FLLR` padding region following the fixed header.
    pub filler_len: u16,
    /// Size of the sample region as declared by the `data` chunk.
    ///
    /// Informational only; captures are read until the stream ends.
    pub data_size: u32,
}

impl StreamParameters {
    pub fn new(channels: u16, sample_rate: u32, bits_per_sample: u16) -> Self {
        Self {
            channels,
            sample_rate,
            bits_per_sample,
            filler_len: 0,
            data_size: 0,
        }
    }

    pub fn bytes_per_sample(&self) -> usize {
        (self.bits_per_sample as usize).div_ceil(8)
    }

    /// Bytes per frame (one sample for every channel).
    pub fn block_align(&self) -> usize {
        self.channels as usize * self.bytes_per_sample()
    }

    pub fn byte_rate(&self) -> u64 {
        self.block_align() as u64 * u64::from(self.sample_rate)
    }

    /// Duration implied by the declared data size, in seconds.
    pub fn declared_duration(&self) -> f64 {
        crate::utils::timing::elapsed_seconds(u64::from(self.data_size), self)
    }

    fn validate(&self) -> Result<(), ConvertError> {
        if self.channels == 0 {
            return Err(ConvertError::invalid_header("channel count is zero"));
        }
        if self.sample_rate == 0 {
            return Err(ConvertError::invalid_header("sample rate is zero"));
        }
        if !matches!(self.bits_per_sample, 8 | 16 | 24) {
            return Err(ConvertError::invalid_header(format!(
                "unsupported bits per sample: {}",
                self.bits_per_sample
            )));
        }
        Ok(())
    }
}

/// Reads and validates the container header, leaving `reader` positioned at
/// the first byte of sample data.
pub fn parse_header<R: Read>(reader: &mut R) -> Result<StreamParameters, ConvertError> {
    let mut header = [0u8; HEADER_LEN];
    reader.read_exact(&mut header).map_err(|e| match e.kind() {
        io::ErrorKind::UnexpectedEof => {
            ConvertError::invalid_header(format!("header shorter than {HEADER_LEN} bytes"))
        }
        _ => ConvertError::Io(e),
    })?;

    if header[0..4] != RIFF_TAG || header[36..40] != FLLR_TAG {
        return Err(ConvertError::invalid_header(
            "expected RIFF header with FLLR filler chunk",
        ));
    }

    let mut fields = ByteReader::endian(Cursor::new(&header[20..]), LittleEndian);
    let format_tag: u16 = fields.read()?;
    let channels: u16 = fields.read()?;
    let sample_rate: u32 = fields.read()?;
    fields.skip(6)?; // byte rate, block align
    let bits_per_sample: u16 = fields.read()?;
    fields.skip(4)?; // FLLR
    let filler_len: u16 = fields.read()?;

    if format_tag != PCM_FORMAT_TAG {
        log::debug!("fmt chunk format tag is {format_tag:#06X}, reading samples as linear PCM");
    }

    let available = io::copy(&mut reader.by_ref().take(u64::from(filler_len)), &mut io::sink())?;
    if available != u64::from(filler_len) {
        return Err(ConvertError::TruncatedFiller {
            declared: filler_len,
            available,
        });
    }

    let mut data_header = [0u8; DATA_CHUNK_HEADER_LEN];
    reader
        .read_exact(&mut data_header)
        .map_err(|e| match e.kind() {
            io::ErrorKind::UnexpectedEof => ConvertError::MissingDataChunk,
            _ => ConvertError::Io(e),
        })?;
    if data_header[0..4] != DATA_TAG {
        return Err(ConvertError::MissingDataChunk);
    }
    let data_size = u32::from_le_bytes([
        data_header[4],
        data_header[5],
        data_header[6],
        data_header[7],
    ]);

    let params = StreamParameters {
        channels,
        sample_rate,
        bits_per_sample,
        filler_len,
        data_size,
    };
    params.validate()?;

    log::debug!(
        "Parsed header: {} ch, {} Hz, {} bits, {} filler bytes, {} data bytes declared",
        params.channels,
        params.sample_rate,
        params.bits_per_sample,
        params.filler_len,
        params.data_size
    );

    Ok(params)
}

/// Serializes `params` into a byte-exact container header, filler region
/// (zero bytes) and `data` chunk header included.
pub fn encode_header(params: &StreamParameters) -> Vec<u8> {
    let block_align = params.block_align() as u16;
    let byte_rate = params.byte_rate() as u32;
    let fllr_chunk_len = u32::from(params.filler_len);
    let riff_len = 4 + (8 + 16) + (8 + fllr_chunk_len) + 8 + params.data_size;

    let mut bytes = crate::join_bytes_le!(
        RIFF_TAG,
        riff_len,
        WAVE_TAG,
        FMT_TAG,
        16u32,
        PCM_FORMAT_TAG,
        params.channels,
        params.sample_rate,
        byte_rate,
        block_align,
        params.bits_per_sample,
        FLLR_TAG,
        fllr_chunk_len,
    );
    bytes.resize(bytes.len() + params.filler_len as usize, 0);
    bytes.extend_from_slice(&crate::join_bytes_le!(DATA_TAG, params.data_size));
    bytes
}

#[cfg(test)]
mod tests {
    use super::*;

    fn params(channels: u16, sample_rate: u32, bits: u16, filler: u16) -> StreamParameters {
        StreamParameters {
            channels,
            sample_rate,
            bits_per_sample: bits,
            filler_len: filler,
            data_size: 1234,
        }
    }

    #[test]
    fn fields_at_documented_offsets() {
        let bytes = encode_header(&params(2, 44100, 16, 4052));
        assert_eq!(&bytes[0..4], b"RIFF");
        assert_eq!(&bytes[22..24], &2u16.to_le_bytes());
        assert_eq!(&bytes[24..28], &44100u32.to_le_bytes());
        assert_eq!(&bytes[34..36], &16u16.to_le_bytes());
        assert_eq!(&bytes[36..40], b"FLLR");
        assert_eq!(&bytes[40..42], &4052u16.to_le_bytes());
        assert_eq!(&bytes[44 + 4052..48 + 4052], b"data");
        assert_eq!(bytes.len(), 44 + 4052 + 8);
    }

    #[test]
    fn parse_extracts_parameters() -> Result<(), ConvertError> {
        for (channels, rate, bits, filler) in [
            (1, 8000, 16, 0),
            (2, 44100, 16, 4052),
            (2, 48000, 24, 12),
            (6, 96000, 16, 65535),
            (1, 22050, 8, 1),
        ] {
            let expected = params(channels, rate, bits, filler);
            let mut input = encode_header(&expected);
            input.extend_from_slice(&[1, 2, 3, 4]);

            let mut cursor = Cursor::new(input);
            let parsed = parse_header(&mut cursor)?;
            assert_eq!(parsed, expected);

            // positioned at the first sample byte
            let mut rest = Vec::new();
            cursor.read_to_end(&mut rest)?;
            assert_eq!(rest, [1, 2, 3, 4]);
        }
        Ok(())
    }

    #[test]
    fn rejects_bad_magic() {
        let valid = encode_header(&params(2, 44100, 16, 0));

        for (offset, replacement) in [(0, *b"RIFX"), (36, *b"fmt "), (36, *b"LIST")] {
            let mut bytes = valid.clone();
            bytes[offset..offset + 4].copy_from_slice(&replacement);
            assert!(matches!(
                parse_header(&mut Cursor::new(bytes)),
                Err(ConvertError::InvalidHeader(_))
            ));
        }
    }

    #[test]
    fn rejects_bad_magic_before_field_checks() {
        let mut bytes = encode_header(&params(0, 0, 0, 0));
        bytes[36..40].copy_from_slice(b"JUNK");
        let err = parse_header(&mut Cursor::new(bytes)).unwrap_err();
        assert!(err.to_string().contains("FLLR"));
    }

    #[test]
    fn rejects_zero_and_unsupported_fields() {
        for bad in [
            params(0, 44100, 16, 0),
            params(2, 0, 16, 0),
            params(2, 44100, 0, 0),
            params(2, 44100, 12, 0),
            params(2, 44100, 32, 0),
        ] {
            assert!(matches!(
                parse_header(&mut Cursor::new(encode_header(&bad))),
                Err(ConvertError::InvalidHeader(_))
            ));
        }
    }

    #[test]
    fn rejects_short_header() {
        let bytes = encode_header(&params(2, 44100, 16, 0));
        assert!(matches!(
            parse_header(&mut Cursor::new(&bytes[..30])),
            Err(ConvertError::InvalidHeader(_))
        ));
    }

    #[test]
    fn truncated_filler() {
        let bytes = encode_header(&params(2, 44100, 16, 100));
        match parse_header(&mut Cursor::new(&bytes[..HEADER_LEN + 40])) {
            Err(ConvertError::TruncatedFiller {
                declared,
                available,
            }) => {
                assert_eq!(declared, 100);
                assert_eq!(available, 40);
            }
            other => panic!("expected TruncatedFiller, got {other:?}"),
        }
    }

    #[test]
    fn missing_data_chunk() {
        let mut bytes = encode_header(&params(2, 44100, 16, 8));
        let data_offset = HEADER_LEN + 8;
        bytes[data_offset..data_offset + 4].copy_from_slice(b"LIST");
        assert!(matches!(
            parse_header(&mut Cursor::new(bytes.clone())),
            Err(ConvertError::MissingDataChunk)
        ));

        assert!(matches!(
            parse_header(&mut Cursor::new(&bytes[..data_offset + 5])),
            Err(ConvertError::MissingDataChunk)
        ));
    }

    #[test]
    fn derived_sizes() {
        let p = params(2, 44100, 16, 0);
        assert_eq!(p.bytes_per_sample(), 2);
        assert_eq!(p.block_align(), 4);
        assert_eq!(p.byte_rate(), 176_400);

        let p = params(6, 48000, 24, 0);
        assert_eq!(p.block_align(), 18);
        assert_eq!(p.byte_rate(), 864_000);
    }
}
