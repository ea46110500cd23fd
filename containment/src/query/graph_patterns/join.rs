use super::super::errors::QueryError;
use super::super::query_context::{Context, PathEntry};
use super::QueryBuilder;
use log::debug;
use spargebra::algebra::GraphPattern;

impl QueryBuilder {
    pub(crate) fn join(
        &mut self,
        left: &GraphPattern,
        right: &GraphPattern,
        context: &Context,
    ) -> Result<(), QueryError> {
        debug!("Processing join graph pattern");
        let left_context = context.extension_with(PathEntry::JoinLeftSide);
        let right_context = context.extension_with(PathEntry::JoinRightSide);
        self.graph_pattern(left, &left_context)?;
        self.graph_pattern(right, &right_context)
    }
}
