pub mod constraints;
pub mod errors;
mod instantiation;
pub mod shape;

pub use constraints::{Cardinality, Constraint, ConstraintType};
pub use errors::ShapeError;
pub use instantiation::{shape_from_triples, shapes_from_triples, shapes_from_turtle};
pub use shape::{OneOf, OneOfIndexed, Predicate, Shape, ShapeArgs};
