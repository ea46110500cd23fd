use super::super::errors::QueryError;
use super::super::query_context::{Context, PathEntry};
use super::QueryBuilder;
use log::debug;
use spargebra::algebra::GraphPattern;

impl QueryBuilder {
    /// Both sides must be fetched to evaluate the difference.
    pub(crate) fn minus(
        &mut self,
        left: &GraphPattern,
        right: &GraphPattern,
        context: &Context,
    ) -> Result<(), QueryError> {
        debug!("Processing minus graph pattern");
        let left_context = context.extension_with(PathEntry::MinusLeftSide);
        let right_context = context.extension_with(PathEntry::MinusRightSide);
        self.graph_pattern(left, &left_context)?;
        self.graph_pattern(right, &right_context)
    }
}
