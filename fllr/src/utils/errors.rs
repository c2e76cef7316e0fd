/// Returns `$err` when `$level` is at or above the state's fail level,
/// otherwise logs it at `$level` and carries on.
#[macro_export]
macro_rules! log_or_err {
    ($state:expr, $level:expr, $err:expr $(,)?) => {{
        if $level <= $state.fail_level {
            return Err($err);
        } else {
            match $level {
                ::log::Level::Error => ::log::error!("{}", $err),
                ::log::Level::Warn => ::log::warn!("{}", $err),
                ::log::Level::Info => ::log::info!("{}", $err),
                ::log::Level::Debug => ::log::debug!("{}", $err),
                ::log::Level::Trace => ::log::trace!("{}", $err),
            }
        }
    }};
}

#[derive(thiserror::Error, Debug)]
pub enum ConvertError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid/unsupported WAVE header: {0}")]
    InvalidHeader(String),

    #[error("Invalid number of filler bytes: declared {declared}, only {available} available")]
    TruncatedFiller { declared: u16, available: u64 },

    #[error("Bad data start section: missing 'data' chunk")]
    MissingDataChunk,

    #[error("FLAC encoder error: {0}")]
    EncoderError(String),

    #[error("Too many output segments (maximum is {max})")]
    TooManySegments { max: usize },

    #[error("Data region ends with a partial frame of {bytes} bytes")]
    TrailingPartialFrame { bytes: usize },

    #[error("Declared data size {declared} does not match {actual} bytes read")]
    DataSizeMismatch { declared: u32, actual: u64 },
}

impl ConvertError {
    pub(crate) fn invalid_header(reason: impl Into<String>) -> Self {
        ConvertError::InvalidHeader(reason.into())
    }

    pub(crate) fn encoder(err: impl std::fmt::Display) -> Self {
        ConvertError::EncoderError(err.to_string())
    }
}

#[test]
fn test_log_or_err_respects_fail_level() {
    struct State {
        fail_level: log::Level,
    }

    fn check(state: &State) -> Result<(), ConvertError> {
        log_or_err!(
            state,
            log::Level::Warn,
            ConvertError::TrailingPartialFrame { bytes: 3 }
        );
        Ok(())
    }

    assert!(
        check(&State {
            fail_level: log::Level::Error
        })
        .is_ok()
    );
    assert!(matches!(
        check(&State {
            fail_level: log::Level::Warn
        }),
        Err(ConvertError::TrailingPartialFrame { bytes: 3 })
    ));
}
