use crate::constraints::{Cardinality, Constraint, ConstraintType};
use crate::errors::ShapeError;
use indexmap::{IndexMap, IndexSet};
use serde::Serialize;
use serde_json::{json, Value};

/// One alternative group of a shape: a disjunction of predicate sets.
pub type OneOf = Vec<Vec<Predicate>>;
/// [`OneOf`] with every predicate set indexed by predicate name.
pub type OneOfIndexed = Vec<IndexMap<String, Predicate>>;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Predicate {
    name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    constraint: Option<Constraint>,
    #[serde(skip_serializing_if = "Option::is_none")]
    cardinality: Option<Cardinality>,
    #[serde(skip_serializing_if = "is_false")]
    negative: bool,
    #[serde(skip_serializing_if = "is_false")]
    optional: bool,
}

fn is_false(b: &bool) -> bool {
    !*b
}

impl Predicate {
    pub fn new(name: impl Into<String>) -> Predicate {
        Predicate {
            name: name.into(),
            constraint: None,
            cardinality: None,
            negative: false,
            optional: false,
        }
    }

    pub fn with_constraint(mut self, constraint: Constraint) -> Predicate {
        self.constraint = Some(constraint);
        self
    }

    /// A minimum of zero also marks the predicate optional.
    pub fn with_cardinality(mut self, cardinality: Cardinality) -> Predicate {
        if cardinality.min() == 0 {
            self.optional = true;
        }
        self.cardinality = Some(cardinality);
        self
    }

    pub fn optional(mut self) -> Predicate {
        self.optional = true;
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn constraint(&self) -> Option<&Constraint> {
        self.constraint.as_ref()
    }

    pub fn cardinality(&self) -> Option<&Cardinality> {
        self.cardinality.as_ref()
    }

    pub fn is_negative(&self) -> bool {
        self.negative
    }

    pub fn is_optional(&self) -> bool {
        self.optional
    }

    fn negated(mut self) -> Predicate {
        self.negative = true;
        self
    }
}

#[derive(Debug, Clone, Default)]
pub struct ShapeArgs {
    pub name: String,
    pub closed: bool,
    pub positive_predicates: Vec<Predicate>,
    pub negative_predicates: Vec<Predicate>,
    pub one_of: Vec<OneOf>,
}

/// A compiled shape. Immutable once built.
#[derive(Debug, Clone)]
pub struct Shape {
    name: String,
    closed: bool,
    positive_predicates: Vec<String>,
    negative_predicates: Vec<String>,
    one_of: Vec<OneOf>,
    one_of_indexed: Vec<OneOfIndexed>,
    predicate_index: IndexMap<String, Predicate>,
}

impl Shape {
    /// Predicates appearing in a `one_of` alternative are positive predicates too.
    /// A later declaration of the same predicate overwrites an earlier one.
    pub fn new(args: ShapeArgs) -> Result<Shape, ShapeError> {
        let ShapeArgs {
            name,
            closed,
            positive_predicates,
            negative_predicates,
            one_of,
        } = args;

        let mut positive: IndexMap<String, Predicate> = IndexMap::new();
        for p in positive_predicates {
            positive.insert(p.name.clone(), Predicate { negative: false, ..p });
        }
        for alternative in &one_of {
            for set in alternative {
                for p in set {
                    positive.insert(p.name.clone(), Predicate { negative: false, ..p.clone() });
                }
            }
        }
        let mut negative: IndexMap<String, Predicate> = IndexMap::new();
        for p in negative_predicates {
            negative.insert(p.name.clone(), p.negated());
        }

        let overlap: Vec<String> = positive
            .keys()
            .filter(|k| negative.contains_key(*k))
            .cloned()
            .collect();
        if !overlap.is_empty() {
            return Err(ShapeError::PositiveNegativeOverlap(name, overlap));
        }

        let one_of_indexed = one_of
            .iter()
            .map(|alternative| {
                alternative
                    .iter()
                    .map(|set| set.iter().map(|p| (p.name.clone(), p.clone())).collect())
                    .collect()
            })
            .collect();

        let positive_names = positive.keys().cloned().collect();
        let negative_names = negative.keys().cloned().collect();
        let mut predicate_index = positive;
        predicate_index.extend(negative);

        Ok(Shape {
            name,
            closed,
            positive_predicates: positive_names,
            negative_predicates: negative_names,
            one_of,
            one_of_indexed,
            predicate_index,
        })
    }

    pub fn closed(name: impl Into<String>, predicates: Vec<Predicate>) -> Result<Shape, ShapeError> {
        Shape::new(ShapeArgs {
            name: name.into(),
            closed: true,
            positive_predicates: predicates,
            ..Default::default()
        })
    }

    pub fn open(name: impl Into<String>, predicates: Vec<Predicate>) -> Result<Shape, ShapeError> {
        Shape::new(ShapeArgs {
            name: name.into(),
            closed: false,
            positive_predicates: predicates,
            ..Default::default()
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn is_closed(&self) -> bool {
        self.closed
    }

    pub fn positive_predicates(&self) -> &[String] {
        &self.positive_predicates
    }

    pub fn negative_predicates(&self) -> &[String] {
        &self.negative_predicates
    }

    pub fn one_of(&self) -> &[OneOf] {
        &self.one_of
    }

    pub fn one_of_indexed(&self) -> &[OneOfIndexed] {
        &self.one_of_indexed
    }

    pub fn get(&self, predicate: &str) -> Option<&Predicate> {
        self.predicate_index.get(predicate)
    }

    pub fn is_positive(&self, predicate: &str) -> bool {
        matches!(self.get(predicate), Some(p) if !p.negative)
    }

    pub fn is_negative(&self, predicate: &str) -> bool {
        matches!(self.get(predicate), Some(p) if p.negative)
    }

    /// Positive predicates followed by the negative ones.
    pub fn get_all(&self) -> Vec<&Predicate> {
        self.positive_predicates
            .iter()
            .chain(self.negative_predicates.iter())
            .filter_map(|n| self.predicate_index.get(n))
            .collect()
    }

    /// Every shape named by a SHAPE constraint of a positive predicate.
    pub fn get_linked_shape_iri(&self) -> IndexSet<String> {
        let mut out = IndexSet::new();
        for n in &self.positive_predicates {
            if let Some(Constraint {
                constraint_type: ConstraintType::Shape,
                value,
            }) = self.predicate_index.get(n).and_then(|p| p.constraint.as_ref())
            {
                out.extend(value.iter().cloned());
            }
        }
        out
    }

    pub fn to_object(&self) -> Value {
        let positive: Vec<&Predicate> = self
            .positive_predicates
            .iter()
            .filter_map(|n| self.predicate_index.get(n))
            .collect();
        let negative: Vec<&Predicate> = self
            .negative_predicates
            .iter()
            .filter_map(|n| self.predicate_index.get(n))
            .collect();
        json!({
            "name": self.name,
            "closed": self.closed,
            "positivePredicates": positive,
            "negativePredicates": negative,
            "oneOf": self.one_of,
        })
    }

    pub fn to_json(&self) -> String {
        self.to_object().to_string()
    }
}
