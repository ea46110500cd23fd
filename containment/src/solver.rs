use crate::binding::{Binder, Bindings, LinkedShapes, NestedDependency, UnresolvedDependency};
use indexmap::{IndexMap, IndexSet};
use log::{debug, trace};
use representation::{Query, Triple};
use shapes::Shape;
use std::collections::HashSet;
use std::fmt::{Display, Formatter};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ContainmentResult {
    Contain,
    Aligned,
    Depend,
    PartiallyContain,
    Rejected,
}

impl Display for ContainmentResult {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            ContainmentResult::Contain => write!(f, "CONTAIN"),
            ContainmentResult::Aligned => write!(f, "ALIGNED"),
            ContainmentResult::Depend => write!(f, "DEPEND"),
            ContainmentResult::PartiallyContain => write!(f, "PARTIALY_CONTAIN"),
            ContainmentResult::Rejected => write!(f, "REJECTED"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StarPatternContainment {
    pub result: ContainmentResult,
    pub target: Option<Vec<String>>,
    /// Aligned shapes whose binding included a matching rdf:type triple.
    pub binding_by_rdf_class: Option<Vec<String>>,
    /// Shape name → binding of this star pattern against it.
    pub bindings: IndexMap<String, Bindings>,
}

impl StarPatternContainment {
    fn rejected() -> StarPatternContainment {
        StarPatternContainment {
            result: ContainmentResult::Rejected,
            target: None,
            binding_by_rdf_class: None,
            bindings: IndexMap::new(),
        }
    }

    fn contain(&mut self, shape_name: &str) {
        if self.result == ContainmentResult::Contain {
            push_target(&mut self.target, shape_name);
        } else {
            self.result = ContainmentResult::Contain;
            self.target = Some(vec![shape_name.to_string()]);
            self.binding_by_rdf_class = None;
        }
    }

    fn align(&mut self, shape_name: &str, bound_by_rdf_class: bool) {
        if self.result == ContainmentResult::Contain {
            return;
        }
        self.result = ContainmentResult::Aligned;
        push_target(&mut self.target, shape_name);
        if bound_by_rdf_class {
            push_target(&mut self.binding_by_rdf_class, shape_name);
        }
    }
}

fn push_target(target: &mut Option<Vec<String>>, shape_name: &str) {
    let names = target.get_or_insert_with(Vec::new);
    if !names.iter().any(|n| n == shape_name) {
        names.push(shape_name.to_string());
    }
}

/// A named node only reachable by dereferencing it directly.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ConditionalLink {
    pub link: String,
    pub star_pattern_name: String,
}

pub struct SolverInput<'a> {
    pub query: &'a Query,
    pub shapes: &'a [Shape],
    /// Usable when recursing into SHAPE constraints, never classified against directly.
    pub dependent_shapes: &'a [Shape],
    /// When set, full containment by these shapes only is reported as partial.
    pub deciding_shapes: Option<&'a HashSet<String>>,
}

impl<'a> SolverInput<'a> {
    pub fn new(query: &'a Query, shapes: &'a [Shape]) -> SolverInput<'a> {
        SolverInput {
            query,
            shapes,
            dependent_shapes: &[],
            deciding_shapes: None,
        }
    }

    pub fn with_dependent_shapes(mut self, dependent_shapes: &'a [Shape]) -> SolverInput<'a> {
        self.dependent_shapes = dependent_shapes;
        self
    }

    pub fn with_deciding_shapes(mut self, deciding_shapes: &'a HashSet<String>) -> SolverInput<'a> {
        self.deciding_shapes = Some(deciding_shapes);
        self
    }

    fn linked_shapes(&self) -> LinkedShapes<'a> {
        let mut linked: LinkedShapes = IndexMap::new();
        for s in self.shapes {
            linked.entry(s.name()).or_insert(s);
        }
        for s in self.dependent_shapes {
            linked.entry(s.name()).or_insert(s);
        }
        linked
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SolverOutput {
    pub star_patterns_containment: IndexMap<String, StarPatternContainment>,
    /// Shape name → whether its data source is worth fetching.
    pub visit_shape: IndexMap<String, bool>,
    pub conditional_links: Vec<ConditionalLink>,
    pub unresolved_dependencies: Vec<UnresolvedDependency>,
}

pub fn solve_shape_query_containment(input: &SolverInput) -> SolverOutput {
    let query = input.query;
    let linked_shapes = input.linked_shapes();

    let mut visit_shape: IndexMap<String, bool> = input
        .shapes
        .iter()
        .map(|s| (s.name().to_string(), false))
        .collect();
    let mut star_patterns_containment = IndexMap::new();
    let mut dependencies: IndexSet<NestedDependency> = IndexSet::new();
    let mut unresolved_dependencies: IndexSet<UnresolvedDependency> = IndexSet::new();

    let mut binder = Binder::new(query, &linked_shapes);
    for name in query.star_pattern_names() {
        let mut containment = StarPatternContainment::rejected();
        for shape in input.shapes {
            let bindings = match binder.bind(shape, name) {
                Some(b) => b,
                None => continue,
            };
            dependencies.extend(bindings.get_dependencies().iter().cloned());
            unresolved_dependencies.extend(bindings.get_unresolved_dependencies().iter().cloned());
            if bindings.should_visit_shape() {
                visit_shape.insert(shape.name().to_string(), true);
                if bindings.is_fully_bounded() {
                    containment.contain(shape.name());
                } else {
                    containment.align(shape.name(), bindings.is_bound_by_rdf_class());
                }
            }
            containment
                .bindings
                .insert(shape.name().to_string(), bindings);
        }
        trace!("Star pattern {} classified {}", name, containment.result);
        star_patterns_containment.insert(name.to_string(), containment);
    }

    let resolver = DependencyResolver {
        containment: &star_patterns_containment,
        dependencies: &dependencies,
    };
    let depending: Vec<(String, Vec<String>)> = star_patterns_containment
        .iter()
        .filter(|(_, c)| c.result != ContainmentResult::Contain)
        .filter_map(|(name, _)| {
            resolver
                .resolve(name, &mut IndexSet::new())
                .map(|targets| (name.clone(), targets))
        })
        .collect();
    for (name, targets) in depending {
        if let Some(c) = star_patterns_containment.get_mut(&name) {
            c.result = ContainmentResult::Depend;
            c.target = Some(targets);
            c.binding_by_rdf_class = None;
        }
    }

    if let Some(deciding_shapes) = input.deciding_shapes {
        for c in star_patterns_containment.values_mut() {
            let decided = c
                .target
                .as_ref()
                .map(|t| t.iter().all(|s| deciding_shapes.contains(s)))
                .unwrap_or(false);
            if c.result == ContainmentResult::Contain && decided {
                c.result = ContainmentResult::PartiallyContain;
            }
        }
    }

    let conditional_links = if input.shapes.is_empty() {
        vec![]
    } else {
        find_conditional_links(query, &star_patterns_containment)
    };

    SolverOutput {
        star_patterns_containment,
        visit_shape,
        conditional_links,
        unresolved_dependencies: unresolved_dependencies.into_iter().collect(),
    }
}

struct DependencyResolver<'a> {
    containment: &'a IndexMap<String, StarPatternContainment>,
    dependencies: &'a IndexSet<NestedDependency>,
}

impl DependencyResolver<'_> {
    /// Target shapes through which a grounded origin fully bound `name`.
    fn resolve(&self, name: &str, chain: &mut IndexSet<String>) -> Option<Vec<String>> {
        if !chain.insert(name.to_string()) {
            debug!("Breaking dependency cycle at star pattern {}", name);
            return None;
        }
        let mut targets: Vec<String> = vec![];
        for d in self.dependencies.iter() {
            if d.nested != name || !d.fully_bounded || d.origin == name {
                continue;
            }
            if targets.contains(&d.target_shape) {
                continue;
            }
            let grounded = match self.containment.get(&d.origin).map(|c| c.result) {
                Some(ContainmentResult::Contain) | Some(ContainmentResult::Aligned) => true,
                _ => self.resolve(&d.origin, chain).is_some(),
            };
            if grounded {
                targets.push(d.target_shape.clone());
            }
        }
        chain.shift_remove(name);
        if targets.is_empty() {
            None
        } else {
            Some(targets)
        }
    }
}

fn find_conditional_links(
    query: &Query,
    containment: &IndexMap<String, StarPatternContainment>,
) -> Vec<ConditionalLink> {
    let mut consumed: HashSet<&Triple> = HashSet::new();
    for c in containment.values() {
        for b in c.bindings.values() {
            consumed.extend(b.get_bound_triples());
            consumed.extend(b.get_nested_bound_triples());
        }
    }

    let mut links = IndexSet::new();
    for (name, triples) in query.triples_by_subject() {
        for t in triples {
            if consumed.contains(t) {
                continue;
            }
            if let Some(nn) = t.object.as_named_node() {
                links.insert(ConditionalLink {
                    link: nn.as_str().to_string(),
                    star_pattern_name: name.to_string(),
                });
            }
        }
    }
    links.into_iter().collect()
}
