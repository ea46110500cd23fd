use crate::query::errors::QueryError;
use shapes::ShapeError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ContainmentError {
    #[error(transparent)]
    ShapeError(#[from] ShapeError),
    #[error(transparent)]
    QueryError(#[from] QueryError),
}
