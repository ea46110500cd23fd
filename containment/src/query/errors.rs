use thiserror::Error;

#[derive(Error, Debug)]
pub enum QueryError {
    #[error(transparent)]
    ParseError(#[from] spargebra::ParseError),
    #[error("Unsupported term pattern {0} at {1}")]
    UnsupportedTermPattern(String, String),
}
