use thiserror::Error;

/// CLI-level error categories mapped to exit codes.
#[derive(Debug, Error)]
pub enum CliError {
    #[error(transparent)]
    Tap(#[from] tap_tiktok_core::TapError),

    #[error("output error: {0}")]
    Io(#[from] std::io::Error),
}

impl CliError {
    pub const fn exit_code(&self) -> u8 {
        use tap_tiktok_core::TapError;

        match self {
            Self::Tap(TapError::Config(_) | TapError::UnknownStream(_)) => 2,
            Self::Tap(TapError::Http(_) | TapError::Status { .. }) => 3,
            Self::Tap(TapError::Api { .. }) => 4,
            Self::Tap(
                TapError::Decode { .. }
                | TapError::Pagination { .. }
                | TapError::MalformedRecord(_),
            ) => 5,
            Self::Io(_) => 10,
        }
    }
}
