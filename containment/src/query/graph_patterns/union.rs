use super::super::errors::QueryError;
use super::super::query_context::{Context, PathEntry};
use super::QueryBuilder;
use log::debug;
use representation::UnionBranch;
use spargebra::algebra::GraphPattern;

impl QueryBuilder {
    /// Nested unions are flattened into a single group with one branch each.
    pub(crate) fn union(
        &mut self,
        left: &GraphPattern,
        right: &GraphPattern,
        context: &Context,
    ) -> Result<(), QueryError> {
        debug!("Processing union graph pattern");
        let mut branch_patterns = vec![];
        collect_branches(left, &mut branch_patterns);
        collect_branches(right, &mut branch_patterns);

        let mut branches: Vec<UnionBranch> = vec![];
        for (i, branch_pattern) in branch_patterns.into_iter().enumerate() {
            let mut branch_builder = QueryBuilder::new();
            branch_builder
                .graph_pattern(branch_pattern, &context.extension_with(PathEntry::UnionBranch(i)))?;
            let (branch, nested_unions) = branch_builder.into_branch();
            branches.push(branch);
            self.extend_unions(nested_unions);
        }
        self.push_union(branches);
        Ok(())
    }
}

fn collect_branches<'a>(graph_pattern: &'a GraphPattern, branches: &mut Vec<&'a GraphPattern>) {
    if let GraphPattern::Union { left, right } = graph_pattern {
        collect_branches(left, branches);
        collect_branches(right, branches);
    } else {
        branches.push(graph_pattern);
    }
}
