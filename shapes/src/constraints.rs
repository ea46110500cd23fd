use crate::errors::ShapeError;
use serde::Serialize;
use std::collections::BTreeSet;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum ConstraintType {
    /// Values must conform to one of the named shapes.
    #[serde(rename = "SHAPE")]
    Shape,
    /// Literal values must carry one of the listed datatypes.
    #[serde(rename = "TYPE")]
    Type,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Constraint {
    #[serde(rename = "type")]
    pub constraint_type: ConstraintType,
    pub value: BTreeSet<String>,
}

impl Constraint {
    pub fn shape<I, S>(targets: I) -> Constraint
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Constraint {
            constraint_type: ConstraintType::Shape,
            value: targets.into_iter().map(|s| s.into()).collect(),
        }
    }

    pub fn datatype<I, S>(types: I) -> Constraint
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Constraint {
            constraint_type: ConstraintType::Type,
            value: types.into_iter().map(|s| s.into()).collect(),
        }
    }

    /// The target shape when exactly one is named.
    pub fn single_shape_target(&self) -> Option<&str> {
        if self.constraint_type == ConstraintType::Shape && self.value.len() == 1 {
            self.value.iter().next().map(|s| s.as_str())
        } else {
            None
        }
    }
}

/// Carried for consumers, never enforced here.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Cardinality {
    min: u32,
    /// `None` is unbounded.
    #[serde(skip_serializing_if = "Option::is_none")]
    max: Option<u32>,
}

impl Cardinality {
    pub fn new(predicate: &str, min: u32, max: Option<u32>) -> Result<Cardinality, ShapeError> {
        if let Some(max) = max {
            if min > max {
                return Err(ShapeError::InvalidCardinality(
                    predicate.to_string(),
                    min,
                    max,
                ));
            }
        }
        Ok(Cardinality { min, max })
    }

    pub fn min(&self) -> u32 {
        self.min
    }

    pub fn max(&self) -> Option<u32> {
        self.max
    }
}

impl Default for Cardinality {
    fn default() -> Self {
        Cardinality {
            min: 1,
            max: Some(1),
        }
    }
}
