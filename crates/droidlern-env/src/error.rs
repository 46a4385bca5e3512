use droidlern_device::ControllerError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum EnvError {
    #[error("grid must have at least one row and one column")]
    ZeroGrid,
    #[error("invalid environment config: {0}")]
    Config(#[from] serde_json::Error),
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error(transparent)]
    Controller(#[from] ControllerError),
}

/// A `bounds` attribute that is not of the form `[x1,y1][x2,y2]`.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("malformed bounds: {0:?}")]
pub struct BoundsError(pub String);

pub type Result<T> = std::result::Result<T, EnvError>;
