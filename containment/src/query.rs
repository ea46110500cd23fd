//! Flattening of SPARQL queries into star patterns.

pub mod errors;
mod graph_patterns;
pub mod query_context;

use errors::QueryError;
use indexmap::IndexMap;
use log::debug;
use query_context::Context;
use representation::{Query, StarPattern, Triple, UnionBranch};
use spargebra::Query as SparqlQuery;

/// Parses `sparql` and groups its triple patterns by subject.
///
/// Every query form is accepted; only the WHERE clause contributes triples.
pub fn parse_query(sparql: &str) -> Result<Query, QueryError> {
    let parsed = SparqlQuery::parse(sparql, None)?;
    let pattern = match &parsed {
        SparqlQuery::Select { pattern, .. }
        | SparqlQuery::Construct { pattern, .. }
        | SparqlQuery::Describe { pattern, .. }
        | SparqlQuery::Ask { pattern, .. } => pattern,
    };
    let mut builder = QueryBuilder::new();
    builder.graph_pattern(pattern, &Context::new())?;
    Ok(builder.build())
}

/// Accumulates star patterns while walking a query algebra.
#[derive(Default)]
pub(crate) struct QueryBuilder {
    star_patterns: IndexMap<String, StarPattern>,
    union: Vec<Vec<UnionBranch>>,
}

impl QueryBuilder {
    pub(crate) fn new() -> QueryBuilder {
        QueryBuilder::default()
    }

    pub(crate) fn insert_triple(&mut self, triple: Triple, subject_is_variable: bool) {
        debug!("Adding triple {}", triple);
        let name = triple.subject.clone();
        self.star_patterns
            .entry(name.clone())
            .or_insert_with(|| StarPattern::new(name, subject_is_variable))
            .insert(triple, None);
    }

    /// Star patterns of one UNION branch, plus any UNIONs nested in it.
    pub(crate) fn into_branch(self) -> (UnionBranch, Vec<Vec<UnionBranch>>) {
        (self.star_patterns, self.union)
    }

    pub(crate) fn push_union(&mut self, branches: Vec<UnionBranch>) {
        self.union.push(branches);
    }

    pub(crate) fn extend_unions(&mut self, unions: Vec<Vec<UnionBranch>>) {
        self.union.extend(unions);
    }

    pub(crate) fn build(self) -> Query {
        Query::new(self.star_patterns, self.union)
    }
}
