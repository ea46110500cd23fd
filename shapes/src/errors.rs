use rio_turtle::TurtleError;
use std::fmt::{Display, Formatter};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ShapeError {
    PositiveNegativeOverlap(String, Vec<String>),
    InvalidCardinality(String, u32, u32),
    TurtleParseError(TurtleError),
    ListMissingFirstElementError(String),
    ListMissingRestError(String),
    CyclicList(String),
    CyclicTripleExpression(String),
    ShapeNodeNotFound(String),
    UnsupportedTripleExpression(String, String),
    TripleConstraintMissingPredicate(String),
    InvalidIntegerLiteral(String, String),
}

impl Display for ShapeError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            ShapeError::PositiveNegativeOverlap(shape, predicates) => {
                write!(
                    f,
                    "Shape {} declares predicates both positive and negative: {}",
                    shape,
                    predicates.join(", ")
                )
            }
            ShapeError::InvalidCardinality(predicate, min, max) => {
                write!(
                    f,
                    "Cardinality of predicate {} has min {} greater than max {}",
                    predicate, min, max
                )
            }
            ShapeError::TurtleParseError(e) => {
                write!(f, "Turtle parse error while reading shapes: {}", e)
            }
            ShapeError::ListMissingFirstElementError(s) => {
                write!(f, "List is missing first element at {}", s)
            }
            ShapeError::ListMissingRestError(s) => {
                write!(f, "List is missing rest at {}", s)
            }
            ShapeError::CyclicList(s) => {
                write!(f, "List revisits node {}", s)
            }
            ShapeError::CyclicTripleExpression(s) => {
                write!(f, "Triple expression {} contains itself", s)
            }
            ShapeError::ShapeNodeNotFound(s) => {
                write!(f, "No shape description found for {}", s)
            }
            ShapeError::UnsupportedTripleExpression(node, kind) => {
                write!(f, "Triple expression {} has unsupported type {}", node, kind)
            }
            ShapeError::TripleConstraintMissingPredicate(node) => {
                write!(f, "Triple constraint {} has no predicate", node)
            }
            ShapeError::InvalidIntegerLiteral(node, value) => {
                write!(f, "Expected an integer at {}, got {}", node, value)
            }
        }
    }
}

impl From<TurtleError> for ShapeError {
    fn from(e: TurtleError) -> Self {
        ShapeError::TurtleParseError(e)
    }
}
