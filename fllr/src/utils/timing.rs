//! Conversions between bytes of PCM data and playback time.

use crate::structs::header::StreamParameters;

/// Playback time, in seconds, covered by `bytes` of interleaved PCM.
pub fn elapsed_seconds(bytes: u64, params: &StreamParameters) -> f64 {
    bytes as f64 / params.byte_rate() as f64
}

/// Index of the split interval that `bytes` of PCM reach, i.e.
/// `floor(elapsed_seconds / split_interval_seconds)`.
///
/// Integer arithmetic keeps the boundary exact: the first byte count that
/// completes `n × split_interval_seconds` seconds of audio yields `n`.
/// Returns 0 when splitting is disabled.
pub fn interval_index(bytes: u64, params: &StreamParameters, split_interval_seconds: u32) -> u64 {
    if split_interval_seconds == 0 {
        return 0;
    }
    bytes / (params.byte_rate() * u64::from(split_interval_seconds))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn stereo_cd() -> StreamParameters {
        StreamParameters::new(2, 44100, 16)
    }

    #[test]
    fn elapsed_uses_channel_count_and_depth() {
        let params = stereo_cd();
        assert_eq!(elapsed_seconds(176_400, &params), 1.0);

        let mono24 = StreamParameters::new(1, 48000, 24);
        assert_eq!(elapsed_seconds(144_000 * 3, &mono24), 3.0);
    }

    #[test]
    fn interval_index_boundaries() {
        let params = stereo_cd();
        let two_seconds = 2 * 176_400;
        assert_eq!(interval_index(two_seconds - 4, &params, 2), 0);
        assert_eq!(interval_index(two_seconds, &params, 2), 1);
        assert_eq!(interval_index(5 * 176_400, &params, 2), 2);
        assert_eq!(interval_index(5 * 176_400, &params, 0), 0);
    }
}
