use thiserror::Error;

#[derive(Debug, Error)]
pub enum MagnifierError {
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("overlay initialization failed: {0}")]
    OverlayInit(String),

    #[error("controller backend unavailable: {0}")]
    ControllerBackend(String),

    #[error("failed to write trace: {0}")]
    Trace(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, MagnifierError>;
