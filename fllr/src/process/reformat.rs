use crate::utils::errors::ConvertError;

/// Converts a block of packed little-endian PCM into signed interleaved
/// samples for the encoder, replacing the contents of `out`.
///
/// Channel interleaving and sample order are preserved. `block` must hold a
/// whole number of samples of `bits_per_sample` width. Returns the number of
/// samples written.
///
/// Byte order is handled explicitly so the result does not depend on the
/// host's endianness.
pub fn reformat_block(
    block: &[u8],
    bits_per_sample: u16,
    out: &mut Vec<i32>,
) -> Result<usize, ConvertError> {
    out.clear();

    match bits_per_sample {
        8 => out.extend(block.iter().map(|&b| i32::from(b) - 128)),
        16 => out.extend(block.chunks_exact(2).map(|pair| sample_16(pair[0], pair[1]))),
        24 => out.extend(
            block
                .chunks_exact(3)
                .map(|triple| sample_24(triple[0], triple[1], triple[2])),
        ),
        other => {
            return Err(ConvertError::invalid_header(format!(
                "unsupported bits per sample: {other}"
            )));
        }
    }

    Ok(out.len())
}

/// `(lo, hi)` → `(hi as signed << 8) | lo`.
#[inline(always)]
fn sample_16(lo: u8, hi: u8) -> i32 {
    i32::from(((hi as i8 as i16) << 8) | i16::from(lo))
}

#[inline(always)]
fn sample_24(lo: u8, mid: u8, hi: u8) -> i32 {
    (i32::from(hi as i8) << 16) | (i32::from(mid) << 8) | i32::from(lo)
}
