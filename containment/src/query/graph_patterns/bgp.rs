use super::super::errors::QueryError;
use super::super::query_context::{Context, PathEntry};
use super::QueryBuilder;
use log::{debug, warn};
use representation::{Term, Triple};
use spargebra::algebra::PropertyPathExpression;
use spargebra::term::{NamedNodePattern, TermPattern, TriplePattern};

impl QueryBuilder {
    pub(crate) fn bgp(
        &mut self,
        patterns: &[TriplePattern],
        context: &Context,
    ) -> Result<(), QueryError> {
        debug!("Processing bgp graph pattern");
        let bgp_context = context.extension_with(PathEntry::Bgp);
        for triple_pattern in patterns {
            let predicate = match &triple_pattern.predicate {
                NamedNodePattern::NamedNode(nn) => nn.as_str(),
                NamedNodePattern::Variable(v) => {
                    warn!(
                        "Triple pattern with variable predicate ?{} at {} cannot be keyed, skipping",
                        v.as_str(),
                        bgp_context.as_str()
                    );
                    continue;
                }
            };
            self.triple_pattern(
                &triple_pattern.subject,
                predicate,
                &triple_pattern.object,
                &bgp_context,
            )?;
        }
        Ok(())
    }

    pub(crate) fn path(
        &mut self,
        subject: &TermPattern,
        path: &PropertyPathExpression,
        object: &TermPattern,
        context: &Context,
    ) -> Result<(), QueryError> {
        debug!("Processing path graph pattern");
        let path_context = context.extension_with(PathEntry::Path);
        match path {
            PropertyPathExpression::NamedNode(nn) => {
                self.triple_pattern(subject, nn.as_str(), object, &path_context)
            }
            _ => {
                warn!(
                    "Complex property path {} at {} cannot be keyed, skipping",
                    path,
                    path_context.as_str()
                );
                Ok(())
            }
        }
    }

    fn triple_pattern(
        &mut self,
        subject: &TermPattern,
        predicate: &str,
        object: &TermPattern,
        context: &Context,
    ) -> Result<(), QueryError> {
        let (subject, subject_is_variable) = match convert_term_pattern(subject, context)? {
            Term::Literal(l) => {
                warn!("Literal subject {} at {}, skipping", l, context.as_str());
                return Ok(());
            }
            Term::NamedNode(nn) => (nn.as_str().to_string(), false),
            t => match t.star_pattern_name() {
                Some(name) => (name, true),
                None => return Ok(()),
            },
        };
        let object = convert_term_pattern(object, context)?;
        let triple = if context.in_optional() {
            Triple::new_optional(subject, predicate, object)
        } else {
            Triple::new(subject, predicate, object)
        };
        self.insert_triple(triple, subject_is_variable);
        Ok(())
    }
}

fn convert_term_pattern(term_pattern: &TermPattern, context: &Context) -> Result<Term, QueryError> {
    #[allow(unreachable_patterns)]
    match term_pattern {
        TermPattern::NamedNode(nn) => Ok(Term::named_node(nn.as_str())),
        TermPattern::BlankNode(bn) => Ok(Term::blank_node(bn.as_str())),
        TermPattern::Literal(l) => Ok(match l.language() {
            Some(language) => Term::language_literal(l.value(), language),
            None => Term::typed_literal(l.value(), l.datatype().as_str()),
        }),
        TermPattern::Variable(v) => Ok(Term::variable(v.as_str())),
        _ => Err(QueryError::UnsupportedTermPattern(
            term_pattern.to_string(),
            context.as_str().to_string(),
        )),
    }
}
