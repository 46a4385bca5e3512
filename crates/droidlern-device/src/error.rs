use thiserror::Error;

#[derive(Debug, Error)]
pub enum ControllerError {
    #[error("could not determine screen size of device {serial}")]
    DeviceSize { serial: String },
    #[error("log capture failed: {0}")]
    LogStream(#[source] std::io::Error),
}

pub type Result<T> = std::result::Result<T, ControllerError>;
