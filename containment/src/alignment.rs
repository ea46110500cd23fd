//! Coarse compatibility screening of star patterns against shapes.
//!
//! Much cheaper than [`crate::solve_shape_query_containment`]: no recursion into
//! SHAPE constraints, only predicate overlap and rdf:type evidence.

use indexmap::{IndexMap, IndexSet};
use log::debug;
use representation::{Query, Triple, RDF_TYPE};
use shapes::{ConstraintType, Shape};
use std::fmt::{Display, Formatter};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AlignmentType {
    Weak,
    Strong,
    None,
}

impl Display for AlignmentType {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            AlignmentType::Weak => write!(f, "WEAK"),
            AlignmentType::Strong => write!(f, "STRONG"),
            AlignmentType::None => write!(f, "None"),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AlignmentOptions {
    pub strong_alignment: bool,
    pub shape_intersection: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AlignmentReport {
    /// Star pattern name → shape name → alignment.
    pub alignments: IndexMap<String, IndexMap<String, AlignmentType>>,
    /// Shapes aligned with no star pattern.
    pub unaligned_shapes: IndexSet<String>,
}

pub fn report_alignment(
    query: &Query,
    shapes: &[Shape],
    options: &AlignmentOptions,
) -> AlignmentReport {
    let mut alignments = IndexMap::new();
    for (name, triples) in query.triples_by_subject() {
        let mut row: IndexMap<String, AlignmentType> = IndexMap::new();
        for shape in shapes {
            let alignment = if !is_weakly_aligned(shape, &triples) {
                AlignmentType::None
            } else if options.strong_alignment && is_strongly_aligned(shape, &triples) {
                AlignmentType::Strong
            } else {
                AlignmentType::Weak
            };
            row.insert(shape.name().to_string(), alignment);
        }

        if row.values().any(|a| *a == AlignmentType::Strong) {
            for a in row.values_mut() {
                if *a == AlignmentType::Weak {
                    *a = AlignmentType::None;
                }
            }
        } else if options.shape_intersection {
            intersect(name, &mut row, shapes, &triples);
        }
        alignments.insert(name.to_string(), row);
    }

    let unaligned_shapes = shapes
        .iter()
        .map(|s| s.name())
        .filter(|s| {
            alignments
                .values()
                .all(|row| row.get(*s).map_or(true, |a| *a == AlignmentType::None))
        })
        .map(|s| s.to_string())
        .collect();

    AlignmentReport {
        alignments,
        unaligned_shapes,
    }
}

fn is_weakly_aligned(shape: &Shape, triples: &[&Triple]) -> bool {
    !shape.is_closed() || triples.iter().any(|t| shape.is_positive(&t.predicate))
}

fn is_strongly_aligned(shape: &Shape, triples: &[&Triple]) -> bool {
    if let Some(c) = shape
        .get(RDF_TYPE)
        .and_then(|p| p.constraint())
        .filter(|c| c.constraint_type == ConstraintType::Type)
    {
        let typed = triples.iter().filter(|t| t.is_rdf_type()).any(|t| {
            t.object
                .as_named_node()
                .map_or(false, |class| c.value.contains(class.as_str()))
        });
        if typed {
            return true;
        }
    }

    let predicates: IndexSet<&str> = triples.iter().map(|t| t.predicate.as_str()).collect();
    let required_covered = shape
        .positive_predicates()
        .iter()
        .filter_map(|p| shape.get(p))
        .filter(|p| !p.is_optional())
        .all(|p| predicates.contains(p.name()));
    required_covered && predicates.len() <= shape.positive_predicates().len()
}

/// Keeps only the weakly aligned shapes matching the most predicates.
fn intersect(
    name: &str,
    row: &mut IndexMap<String, AlignmentType>,
    shapes: &[Shape],
    triples: &[&Triple],
) {
    let candidates: Vec<&Shape> = shapes
        .iter()
        .filter(|s| row.get(s.name()) == Some(&AlignmentType::Weak))
        .collect();
    if candidates.len() < 2 {
        return;
    }
    if candidates.iter().any(|s| !s.is_closed()) {
        debug!(
            "Open shape among candidates for star pattern {}, skipping intersection",
            name
        );
        return;
    }

    let degrees: Vec<i64> = candidates.iter().map(|s| match_degree(s, triples)).collect();
    let best = degrees.iter().copied().max().unwrap_or(-1);
    for (shape, degree) in candidates.iter().zip(degrees) {
        if degree < best {
            row.insert(shape.name().to_string(), AlignmentType::None);
        }
    }
}

fn match_degree(shape: &Shape, triples: &[&Triple]) -> i64 {
    let mut degree = 0;
    for t in triples {
        if shape.is_negative(&t.predicate) {
            return -1;
        }
        if shape.is_positive(&t.predicate) {
            degree += 1;
        }
    }
    degree
}
