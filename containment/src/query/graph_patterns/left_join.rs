use super::super::errors::QueryError;
use super::super::query_context::{Context, PathEntry};
use super::QueryBuilder;
use log::debug;
use spargebra::algebra::GraphPattern;

impl QueryBuilder {
    /// Triples from the right side are flagged optional.
    pub(crate) fn left_join(
        &mut self,
        left: &GraphPattern,
        right: &GraphPattern,
        context: &Context,
    ) -> Result<(), QueryError> {
        debug!("Processing left join graph pattern");
        let left_context = context.extension_with(PathEntry::LeftJoinLeftSide);
        let right_context = context.extension_with(PathEntry::LeftJoinRightSide);
        self.graph_pattern(left, &left_context)?;
        self.graph_pattern(right, &right_context)
    }
}
