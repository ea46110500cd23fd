mod bgp;
mod join;
mod left_join;
mod minus;
mod union;

use super::errors::QueryError;
use super::query_context::{Context, PathEntry};
use super::QueryBuilder;
use log::{debug, warn};
use spargebra::algebra::GraphPattern;

impl QueryBuilder {
    pub(crate) fn graph_pattern(
        &mut self,
        graph_pattern: &GraphPattern,
        context: &Context,
    ) -> Result<(), QueryError> {
        #[allow(unreachable_patterns)]
        match graph_pattern {
            GraphPattern::Bgp { patterns } => self.bgp(patterns, context),
            GraphPattern::Path {
                subject,
                path,
                object,
            } => self.path(subject, path, object, context),
            GraphPattern::Join { left, right } => self.join(left, right, context),
            GraphPattern::LeftJoin { left, right, .. } => self.left_join(left, right, context),
            GraphPattern::Union { left, right } => self.union(left, right, context),
            GraphPattern::Minus { left, right } => self.minus(left, right, context),
            GraphPattern::Filter { inner, .. } => {
                debug!("Processing filter graph pattern");
                self.graph_pattern(inner, &context.extension_with(PathEntry::FilterInner))
            }
            GraphPattern::Graph { inner, .. } => {
                debug!("Processing graph graph pattern");
                self.graph_pattern(inner, &context.extension_with(PathEntry::GraphInner))
            }
            GraphPattern::Extend { inner, .. } => {
                debug!("Processing extend graph pattern");
                self.graph_pattern(inner, &context.extension_with(PathEntry::ExtendInner))
            }
            GraphPattern::OrderBy { inner, .. } => {
                debug!("Processing order by graph pattern");
                self.graph_pattern(inner, &context.extension_with(PathEntry::OrderByInner))
            }
            GraphPattern::Project { inner, .. } => {
                debug!("Processing project graph pattern");
                self.graph_pattern(inner, &context.extension_with(PathEntry::ProjectInner))
            }
            GraphPattern::Distinct { inner } => {
                debug!("Processing distinct graph pattern");
                self.graph_pattern(inner, &context.extension_with(PathEntry::DistinctInner))
            }
            GraphPattern::Reduced { inner } => {
                debug!("Processing reduced graph pattern");
                self.graph_pattern(inner, &context.extension_with(PathEntry::ReducedInner))
            }
            GraphPattern::Slice { inner, .. } => {
                debug!("Processing slice graph pattern");
                self.graph_pattern(inner, &context.extension_with(PathEntry::SliceInner))
            }
            GraphPattern::Group { inner, .. } => {
                debug!("Processing group graph pattern");
                self.graph_pattern(inner, &context.extension_with(PathEntry::GroupInner))
            }
            GraphPattern::Values { .. } => {
                debug!("Values graph pattern at {} has no triples", context.as_str());
                Ok(())
            }
            GraphPattern::Service { .. } => {
                warn!(
                    "Service graph pattern at {} is answered remotely, skipping",
                    context.as_str()
                );
                Ok(())
            }
            _ => {
                warn!("Unsupported graph pattern at {}, skipping", context.as_str());
                Ok(())
            }
        }
    }
}
