use crate::constraints::{Cardinality, Constraint};
use crate::errors::ShapeError;
use crate::shape::{OneOf, Predicate, Shape, ShapeArgs};
use indexmap::{IndexMap, IndexSet};
use log::{debug, warn};
use oxrdf::{Literal, NamedNode};
use representation::{Term, Triple, RDF_FIRST, RDF_NIL, RDF_REST, RDF_TYPE};
use rio_api::model::{Literal as RioLiteral, Subject as RioSubject, Term as RioTerm};
use rio_api::parser::TriplesParser;
use rio_turtle::TurtleParser;
use std::io::BufRead;

const SHEX_SHAPE: &str = "http://www.w3.org/ns/shex#Shape";
const SHEX_SHAPE_DECL: &str = "http://www.w3.org/ns/shex#ShapeDecl";
const SHEX_SHAPE_EXPR: &str = "http://www.w3.org/ns/shex#shapeExpr";
const SHEX_SHAPE_OR: &str = "http://www.w3.org/ns/shex#ShapeOr";
const SHEX_SHAPE_AND: &str = "http://www.w3.org/ns/shex#ShapeAnd";
const SHEX_SHAPE_EXPRS: &str = "http://www.w3.org/ns/shex#shapeExprs";
const SHEX_CLOSED: &str = "http://www.w3.org/ns/shex#closed";
const SHEX_EXPRESSION: &str = "http://www.w3.org/ns/shex#expression";
const SHEX_EXPRESSIONS: &str = "http://www.w3.org/ns/shex#expressions";
const SHEX_EACH_OF: &str = "http://www.w3.org/ns/shex#EachOf";
const SHEX_ONE_OF: &str = "http://www.w3.org/ns/shex#OneOf";
const SHEX_TRIPLE_CONSTRAINT: &str = "http://www.w3.org/ns/shex#TripleConstraint";
const SHEX_PREDICATE: &str = "http://www.w3.org/ns/shex#predicate";
const SHEX_VALUE_EXPR: &str = "http://www.w3.org/ns/shex#valueExpr";
const SHEX_MIN: &str = "http://www.w3.org/ns/shex#min";
const SHEX_MAX: &str = "http://www.w3.org/ns/shex#max";
const SHEX_NEGATED: &str = "http://www.w3.org/ns/shex#negated";
const SHEX_NODE_CONSTRAINT: &str = "http://www.w3.org/ns/shex#NodeConstraint";
const SHEX_DATATYPE: &str = "http://www.w3.org/ns/shex#datatype";
const SHEX_VALUES: &str = "http://www.w3.org/ns/shex#values";

/// Reads every shape of a ShExR document in Turtle.
pub fn shapes_from_turtle<R: BufRead>(reader: R) -> Result<Vec<Shape>, ShapeError> {
    let mut triples = vec![];
    TurtleParser::new(reader, None).parse_all(&mut |t| {
        if let Some(triple) = convert_rio_triple(&t.subject, t.predicate.iri, &t.object) {
            triples.push(triple);
        } else {
            debug!("Skipping RDF-star triple while reading shapes");
        }
        Ok(()) as Result<(), ShapeError>
    })?;
    shapes_from_triples(&triples)
}

/// Reads every shape described by a set of ShExR triples.
/// Blank nodes are expected as `_:id` subjects and [`Term::BlankNode`] objects.
pub fn shapes_from_triples(triples: &[Triple]) -> Result<Vec<Shape>, ShapeError> {
    let graph = ShapeGraph::new(triples);
    let declared_names = graph.declared_names();
    let mut shapes = vec![];
    for node in graph.nodes_of_type(SHEX_SHAPE) {
        let name = declared_names
            .get(node)
            .map(|n| n.as_str())
            .unwrap_or(node);
        shapes.push(graph.create_shape(node, name)?);
    }
    Ok(shapes)
}

/// Reads the single shape named `name` (a shape or shape declaration IRI).
pub fn shape_from_triples(name: &str, triples: &[Triple]) -> Result<Shape, ShapeError> {
    let graph = ShapeGraph::new(triples);
    let node = if graph.has_type(name, SHEX_SHAPE) {
        name.to_string()
    } else if let Some(expr) = graph.object(name, SHEX_SHAPE_EXPR).and_then(node_key) {
        expr
    } else {
        return Err(ShapeError::ShapeNodeNotFound(name.to_string()));
    };
    graph.create_shape(&node, name)
}

fn convert_rio_triple(subject: &RioSubject, predicate: &str, object: &RioTerm) -> Option<Triple> {
    let subject = match subject {
        RioSubject::NamedNode(nn) => nn.iri.to_string(),
        RioSubject::BlankNode(bn) => format!("_:{}", bn.id),
        #[allow(unreachable_patterns)]
        _ => return None,
    };
    let object = match object {
        RioTerm::NamedNode(nn) => Term::named_node(nn.iri),
        RioTerm::BlankNode(bn) => Term::blank_node(bn.id),
        RioTerm::Literal(RioLiteral::Simple { value }) => {
            Term::from(Literal::new_simple_literal(*value))
        }
        RioTerm::Literal(RioLiteral::LanguageTaggedString { value, language }) => {
            Term::from(Literal::new_language_tagged_literal_unchecked(*value, *language))
        }
        RioTerm::Literal(RioLiteral::Typed { value, datatype }) => Term::from(
            Literal::new_typed_literal(*value, NamedNode::new_unchecked(datatype.iri)),
        ),
        #[allow(unreachable_patterns)]
        _ => return None,
    };
    Some(Triple::new(subject, predicate, object))
}

fn node_key(term: &Term) -> Option<String> {
    match term {
        Term::NamedNode(_) | Term::BlankNode(_) => term.star_pattern_name(),
        _ => None,
    }
}

#[derive(Default)]
struct Collected {
    positive: Vec<Predicate>,
    negative: Vec<Predicate>,
    one_of: Vec<OneOf>,
}

struct ShapeGraph<'a> {
    props_map: IndexMap<&'a str, Vec<(&'a str, &'a Term)>>,
    first_map: IndexMap<&'a str, &'a Term>,
    rest_map: IndexMap<&'a str, &'a Term>,
}

impl<'a> ShapeGraph<'a> {
    fn new(triples: &'a [Triple]) -> ShapeGraph<'a> {
        let mut props_map: IndexMap<&str, Vec<(&str, &Term)>> = IndexMap::new();
        let mut first_map = IndexMap::new();
        let mut rest_map = IndexMap::new();
        for t in triples {
            if t.predicate == RDF_FIRST {
                first_map.insert(t.subject.as_str(), &t.object);
            } else if t.predicate == RDF_REST {
                rest_map.insert(t.subject.as_str(), &t.object);
            } else {
                props_map
                    .entry(t.subject.as_str())
                    .or_default()
                    .push((t.predicate.as_str(), &t.object));
            }
        }
        ShapeGraph {
            props_map,
            first_map,
            rest_map,
        }
    }

    fn objects<'b>(&'b self, node: &'b str, verb: &'b str) -> impl Iterator<Item = &'a Term> + 'b {
        self.props_map
            .get(node)
            .into_iter()
            .flat_map(|v| v.iter())
            .filter(move |(p, _)| *p == verb)
            .map(|(_, o)| *o)
    }

    fn object(&self, node: &str, verb: &str) -> Option<&'a Term> {
        self.objects(node, verb).next()
    }

    fn has_type(&self, node: &str, class: &str) -> bool {
        self.objects(node, RDF_TYPE)
            .any(|o| matches!(o.as_named_node(), Some(nn) if nn.as_str() == class))
    }

    fn nodes_of_type(&self, class: &str) -> Vec<&'a str> {
        self.props_map
            .keys()
            .copied()
            .filter(|n| self.has_type(n, class))
            .collect()
    }

    /// Shape node key → IRI of the declaration wrapping it.
    fn declared_names(&self) -> IndexMap<String, String> {
        let mut out = IndexMap::new();
        for decl in self.nodes_of_type(SHEX_SHAPE_DECL) {
            if let Some(expr) = self.object(decl, SHEX_SHAPE_EXPR).and_then(node_key) {
                out.insert(expr, decl.to_string());
            }
        }
        out
    }

    fn get_list_elems(&self, list: &'a Term) -> Result<Vec<&'a Term>, ShapeError> {
        let mut elems = vec![];
        let mut visited = IndexSet::new();
        let mut current = list;
        loop {
            let key = match node_key(current) {
                Some(k) => k,
                None => return Err(ShapeError::ListMissingRestError(current.to_string())),
            };
            if key == RDF_NIL {
                break;
            }
            if !visited.insert(key.clone()) {
                return Err(ShapeError::CyclicList(key));
            }
            if let Some(f) = self.first_map.get(key.as_str()) {
                elems.push(*f);
            } else {
                return Err(ShapeError::ListMissingFirstElementError(key));
            }
            if let Some(r) = self.rest_map.get(key.as_str()) {
                current = *r;
            } else {
                return Err(ShapeError::ListMissingRestError(key));
            }
        }
        Ok(elems)
    }

    fn create_shape(&self, node: &str, name: &str) -> Result<Shape, ShapeError> {
        debug!("Instantiating shape {}", name);
        let closed = self
            .object(node, SHEX_CLOSED)
            .map(is_true_literal)
            .unwrap_or(false);
        let mut collected = Collected::default();
        if let Some(expr) = self.object(node, SHEX_EXPRESSION) {
            self.collect_triple_expression(expr, &mut collected, &mut vec![])?;
        }
        Shape::new(ShapeArgs {
            name: name.to_string(),
            closed,
            positive_predicates: collected.positive,
            negative_predicates: collected.negative,
            one_of: collected.one_of,
        })
    }

    fn collect_triple_expression(
        &self,
        expr: &'a Term,
        collected: &mut Collected,
        path: &mut Vec<String>,
    ) -> Result<(), ShapeError> {
        let key = match node_key(expr) {
            Some(k) => k,
            None => {
                return Err(ShapeError::UnsupportedTripleExpression(
                    expr.to_string(),
                    "literal".to_string(),
                ))
            }
        };
        if path.contains(&key) {
            return Err(ShapeError::CyclicTripleExpression(key));
        }
        if self.has_type(&key, SHEX_TRIPLE_CONSTRAINT) {
            let (predicate, negative) = self.create_triple_constraint(&key)?;
            if negative {
                collected.negative.push(predicate);
            } else {
                collected.positive.push(predicate);
            }
        } else if self.has_type(&key, SHEX_EACH_OF) {
            path.push(key.clone());
            for e in self.expressions(&key)? {
                self.collect_triple_expression(e, collected, path)?;
            }
            path.pop();
        } else if self.has_type(&key, SHEX_ONE_OF) {
            path.push(key.clone());
            let mut alternatives = vec![];
            for e in self.expressions(&key)? {
                let mut alternative = Collected::default();
                self.collect_triple_expression(e, &mut alternative, path)?;
                alternatives.push(alternative.positive);
                collected.negative.extend(alternative.negative);
                collected.one_of.extend(alternative.one_of);
            }
            path.pop();
            collected.one_of.push(alternatives);
        } else {
            let types: Vec<String> = self.objects(&key, RDF_TYPE).map(|t| t.to_string()).collect();
            return Err(ShapeError::UnsupportedTripleExpression(key, types.join(" ")));
        }
        Ok(())
    }

    fn expressions(&self, key: &str) -> Result<Vec<&'a Term>, ShapeError> {
        self.list_objects(key, SHEX_EXPRESSIONS)
    }

    /// Elements of the RDF list at `verb`, empty when `node` has none.
    fn list_objects(&self, node: &str, verb: &str) -> Result<Vec<&'a Term>, ShapeError> {
        match self.object(node, verb) {
            Some(list) => self.get_list_elems(list),
            None => Ok(vec![]),
        }
    }

    fn create_triple_constraint(&self, key: &str) -> Result<(Predicate, bool), ShapeError> {
        let name = match self.object(key, SHEX_PREDICATE).and_then(|t| t.as_named_node()) {
            Some(nn) => nn.as_str(),
            None => return Err(ShapeError::TripleConstraintMissingPredicate(key.to_string())),
        };
        let min = match self.object(key, SHEX_MIN) {
            Some(t) => parse_integer(key, t)?,
            None => 1,
        };
        let max = match self.object(key, SHEX_MAX) {
            Some(t) => parse_integer(key, t)?,
            None => 1,
        };
        let min = u32::try_from(min)
            .map_err(|_| ShapeError::InvalidIntegerLiteral(key.to_string(), min.to_string()))?;
        // Negative max is ShExR's unbounded marker.
        let max = if max < 0 {
            None
        } else {
            Some(
                u32::try_from(max).map_err(|_| {
                    ShapeError::InvalidIntegerLiteral(key.to_string(), max.to_string())
                })?,
            )
        };
        let negative = self
            .object(key, SHEX_NEGATED)
            .map(is_true_literal)
            .unwrap_or(false)
            || max == Some(0);

        let mut predicate =
            Predicate::new(name).with_cardinality(Cardinality::new(name, min, max)?);
        if let Some(value_expr) = self.object(key, SHEX_VALUE_EXPR) {
            if let Some(constraint) = self.create_value_constraint(value_expr)? {
                predicate = predicate.with_constraint(constraint);
            } else {
                warn!(
                    "Value expression {} of predicate {} is not supported, leaving it unconstrained",
                    value_expr, name
                );
            }
        }
        Ok((predicate, negative))
    }

    fn create_value_constraint(
        &self,
        value_expr: &Term,
    ) -> Result<Option<Constraint>, ShapeError> {
        let key = match node_key(value_expr) {
            Some(k) => k,
            None => return Ok(None),
        };
        if self.has_type(&key, SHEX_NODE_CONSTRAINT) {
            return self.create_node_constraint(&key);
        }
        if self.has_type(&key, SHEX_SHAPE_OR) || self.has_type(&key, SHEX_SHAPE_AND) {
            let targets: Vec<String> = self
                .list_objects(&key, SHEX_SHAPE_EXPRS)?
                .into_iter()
                .filter_map(node_key)
                .collect();
            return Ok(if targets.is_empty() {
                None
            } else {
                Some(Constraint::shape(targets))
            });
        }
        Ok(match value_expr {
            Term::NamedNode(nn) => Some(Constraint::shape([nn.as_str()])),
            _ if self.has_type(&key, SHEX_SHAPE) => Some(Constraint::shape([key])),
            _ => None,
        })
    }

    fn create_node_constraint(&self, key: &str) -> Result<Option<Constraint>, ShapeError> {
        if let Some(dt) = self.object(key, SHEX_DATATYPE).and_then(|t| t.as_named_node()) {
            return Ok(Some(Constraint::datatype([dt.as_str()])));
        }
        let values: Vec<String> = self
            .list_objects(key, SHEX_VALUES)?
            .into_iter()
            .filter_map(|t| t.as_named_node().map(|nn| nn.as_str().to_string()))
            .collect();
        Ok(if values.is_empty() {
            None
        } else {
            Some(Constraint::datatype(values))
        })
    }
}

fn is_true_literal(t: &Term) -> bool {
    matches!(t.as_literal(), Some(l) if l.value() == "true" || l.value() == "1")
}

fn parse_integer(key: &str, t: &Term) -> Result<i64, ShapeError> {
    match t.as_literal() {
        Some(l) => l
            .value()
            .parse::<i64>()
            .map_err(|_| ShapeError::InvalidIntegerLiteral(key.to_string(), l.value().to_string())),
        None => Err(ShapeError::InvalidIntegerLiteral(key.to_string(), t.to_string())),
    }
}
