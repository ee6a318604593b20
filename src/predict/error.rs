use thiserror::Error;

#[derive(Debug, Error)]
pub enum PredictError {
    #[error("TLE directory not found: {0}")]
    DirectoryNotFound(String),
    #[error("TLE file read error: {0}")]
    FileRead(#[from] std::io::Error),
    #[error("Invalid TLE for {satellite}: {message}")]
    InvalidTle { satellite: String, message: String },
    #[error("Propagation error: {0}")]
    Propagation(String),
    #[error("Unknown satellite: {0}")]
    UnknownSatellite(String),
    #[error("Invalid coordinates: latitude {latitude}, longitude {longitude}")]
    InvalidCoordinates { latitude: f64, longitude: f64 },
    #[error("No timezone found at latitude {latitude}, longitude {longitude}")]
    TimezoneNotFound { latitude: f64, longitude: f64 },
    #[error("Unknown timezone: {0}")]
    UnknownTimezone(String),
    #[error("Time out of range: {0}")]
    TimeOutOfRange(String),
}

impl From<sgp4::Error> for PredictError {
    fn from(err: sgp4::Error) -> Self {
        PredictError::Propagation(err.to_string())
    }
}
