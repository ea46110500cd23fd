pub mod alignment;
pub mod binding;
pub mod errors;
pub mod query;
pub mod solver;

pub use alignment::{report_alignment, AlignmentOptions, AlignmentReport, AlignmentType};
pub use binding::{Binder, Bindings, LinkedShapes, NestedDependency, UnresolvedDependency};
pub use errors::ContainmentError;
pub use query::errors::QueryError;
pub use query::parse_query;
pub use solver::{
    solve_shape_query_containment, ConditionalLink, ContainmentResult, SolverInput, SolverOutput,
    StarPatternContainment,
};

use std::io::BufRead;

/// Parses a SPARQL query and a ShExR schema in Turtle, then solves containment
/// of the query against every shape in the schema.
pub fn solve_from_sources<R: BufRead>(
    sparql: &str,
    shapes_turtle: R,
) -> Result<SolverOutput, ContainmentError> {
    let query = parse_query(sparql)?;
    let shapes = shapes::shapes_from_turtle(shapes_turtle)?;
    Ok(solve_shape_query_containment(&SolverInput::new(
        &query, &shapes,
    )))
}
