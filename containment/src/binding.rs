use indexmap::IndexMap;
use log::{debug, trace};
use representation::{Query, StarPattern, StarPatternEntry, Term, Triple, RDF_TYPE};
use shapes::{Constraint, ConstraintType, Shape};

/// Every shape a SHAPE constraint may recurse into, by name.
pub type LinkedShapes<'a> = IndexMap<&'a str, &'a Shape>;

/// A triple bound through a SHAPE constraint against a nested star pattern.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct NestedDependency {
    pub origin: String,
    pub predicate: String,
    pub nested: String,
    pub target_shape: String,
    pub fully_bounded: bool,
}

/// A SHAPE constraint naming a shape that is not loaded.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct UnresolvedDependency {
    pub star_pattern_name: String,
    pub predicate: String,
    pub shape_name: String,
}

/// Result of matching one star pattern against one shape.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Bindings {
    shape_name: String,
    star_pattern_name: String,
    bindings: IndexMap<String, Option<Triple>>,
    unbound_triples: Vec<Triple>,
    fully_bounded: bool,
    bound_by_rdf_class: bool,
    /// predicate → nested star pattern consumed through it
    nested_contained_star_patterns: IndexMap<String, String>,
    nested_bound_triples: Vec<Triple>,
    dependencies: Vec<NestedDependency>,
    unresolved_dependencies: Vec<UnresolvedDependency>,
}

struct BindingContext<'a> {
    query: &'a Query,
    linked_shapes: &'a LinkedShapes<'a>,
    stack: Vec<(String, String)>,
    /// (shape, star pattern) → bindings that did not rely on an enclosing cycle break
    cache: IndexMap<(String, String), Bindings>,
    /// Lowest stack position a cycle break has assumed since the last reset.
    lowest_cycle_break: Option<usize>,
}

impl<'a> BindingContext<'a> {
    fn new(query: &'a Query, linked_shapes: &'a LinkedShapes<'a>) -> BindingContext<'a> {
        BindingContext {
            query,
            linked_shapes,
            stack: vec![],
            cache: IndexMap::new(),
            lowest_cycle_break: None,
        }
    }
}

/// Binds star patterns of one query by name, reusing results across calls.
pub struct Binder<'a> {
    context: BindingContext<'a>,
}

impl<'a> Binder<'a> {
    pub fn new(query: &'a Query, linked_shapes: &'a LinkedShapes<'a>) -> Binder<'a> {
        Binder {
            context: BindingContext::new(query, linked_shapes),
        }
    }

    /// Binds the star pattern `name` together with its UNION alternatives.
    /// `None` when the query has no star pattern of that name.
    pub fn bind(&mut self, shape: &Shape, name: &str) -> Option<Bindings> {
        bind_named(shape, name, &mut self.context)
    }
}

impl Bindings {
    pub fn new(
        shape: &Shape,
        star_pattern: &StarPattern,
        query: &Query,
        linked_shapes: &LinkedShapes,
    ) -> Bindings {
        let mut context = BindingContext::new(query, linked_shapes);
        bind(shape, star_pattern, &mut context)
    }

    /// Binds `star_pattern` alone and merged with each UNION alternative.
    /// The first fully bounded candidate wins, otherwise the one binding the most triples.
    /// `None` when there is neither a star pattern nor an alternative.
    pub fn with_union_alternatives(
        shape: &Shape,
        star_pattern: Option<&StarPattern>,
        union_alternatives: &[&StarPattern],
        query: &Query,
        linked_shapes: &LinkedShapes,
    ) -> Option<Bindings> {
        let mut context = BindingContext::new(query, linked_shapes);
        bind_with_alternatives(shape, star_pattern, union_alternatives, &mut context)
    }

    fn empty(shape: &Shape, star_pattern: &StarPattern) -> Bindings {
        Bindings {
            shape_name: shape.name().to_string(),
            star_pattern_name: star_pattern.name.clone(),
            bindings: shape
                .get_all()
                .into_iter()
                .map(|p| (p.name().to_string(), None))
                .collect(),
            unbound_triples: vec![],
            fully_bounded: false,
            bound_by_rdf_class: false,
            nested_contained_star_patterns: IndexMap::new(),
            nested_bound_triples: vec![],
            dependencies: vec![],
            unresolved_dependencies: vec![],
        }
    }

    pub fn shape_name(&self) -> &str {
        &self.shape_name
    }

    pub fn star_pattern_name(&self) -> &str {
        &self.star_pattern_name
    }

    pub fn get_bindings(&self) -> &IndexMap<String, Option<Triple>> {
        &self.bindings
    }

    pub fn get_bound_triples(&self) -> Vec<&Triple> {
        self.bindings.values().flatten().collect()
    }

    pub fn get_unbound_triples(&self) -> &[Triple] {
        &self.unbound_triples
    }

    pub fn is_fully_bounded(&self) -> bool {
        self.fully_bounded
    }

    /// Any bound triple is enough evidence to follow the shape's data source.
    pub fn should_visit_shape(&self) -> bool {
        self.bound_count() > 0
    }

    pub fn is_bound_by_rdf_class(&self) -> bool {
        self.bound_by_rdf_class
    }

    pub fn get_nested_contained_star_patterns(&self) -> &IndexMap<String, String> {
        &self.nested_contained_star_patterns
    }

    /// Triples of fully bounded nested star patterns, at any depth.
    pub fn get_nested_bound_triples(&self) -> &[Triple] {
        &self.nested_bound_triples
    }

    pub fn get_dependencies(&self) -> &[NestedDependency] {
        &self.dependencies
    }

    pub fn get_unresolved_dependencies(&self) -> &[UnresolvedDependency] {
        &self.unresolved_dependencies
    }

    fn bound_count(&self) -> usize {
        self.bindings.values().filter(|t| t.is_some()).count()
    }
}

fn bind_named(shape: &Shape, name: &str, context: &mut BindingContext) -> Option<Bindings> {
    let key = (shape.name().to_string(), name.to_string());
    if let Some(cached) = context.cache.get(&key) {
        trace!("Reusing bindings of star pattern {} against shape {}", name, shape.name());
        return Some(cached.clone());
    }

    let depth = context.stack.len();
    let outer_break = context.lowest_cycle_break.take();
    let query = context.query;
    let alternatives = query.union_alternatives(name);
    let result = bind_with_alternatives(
        shape,
        query.main_star_pattern(name),
        &alternatives,
        context,
    );
    // Breaks at or below `depth` were assumptions about this very computation.
    let inner_break = context.lowest_cycle_break.take().filter(|i| *i < depth);
    if inner_break.is_none() {
        if let Some(b) = &result {
            context.cache.insert(key, b.clone());
        }
    }
    context.lowest_cycle_break = match (outer_break, inner_break) {
        (Some(o), Some(i)) => Some(o.min(i)),
        (o, i) => o.or(i),
    };
    result
}

fn bind_with_alternatives(
    shape: &Shape,
    star_pattern: Option<&StarPattern>,
    union_alternatives: &[&StarPattern],
    context: &mut BindingContext,
) -> Option<Bindings> {
    let mut best = star_pattern.map(|sp| bind(shape, sp, context));
    if matches!(&best, Some(b) if b.fully_bounded) {
        return best;
    }
    for alternative in union_alternatives {
        let merged = match star_pattern {
            Some(sp) => sp.merged_with(alternative),
            None => (*alternative).clone(),
        };
        let candidate = bind(shape, &merged, context);
        if candidate.fully_bounded {
            return Some(candidate);
        }
        let better = match &best {
            Some(b) => candidate.bound_count() > b.bound_count(),
            None => true,
        };
        if better {
            best = Some(candidate);
        }
    }
    best
}

fn bind(shape: &Shape, star_pattern: &StarPattern, context: &mut BindingContext) -> Bindings {
    trace!(
        "Binding star pattern {} against shape {}",
        star_pattern.name,
        shape.name()
    );
    let mut bindings = Bindings::empty(shape, star_pattern);

    if !shape.is_closed() {
        for t in star_pattern.triples() {
            bindings.bindings.insert(t.predicate.clone(), Some(t.clone()));
        }
        bindings.fully_bounded = !star_pattern.is_empty();
        return bindings;
    }

    context
        .stack
        .push((shape.name().to_string(), star_pattern.name.clone()));
    for (predicate, entry) in &star_pattern.entries {
        let bound = match shape.get(predicate) {
            None => false,
            Some(p) if p.is_negative() => false,
            Some(p) => match p.constraint() {
                None => true,
                Some(c) if c.constraint_type == ConstraintType::Type => {
                    type_constraint_holds(c, &entry.triple.object)
                }
                Some(c) => {
                    bind_shape_constraint(c, star_pattern, predicate, entry, &mut bindings, context)
                }
            },
        };
        if bound {
            if entry.triple.is_rdf_type() && anchors_rdf_class(shape, &entry.triple) {
                bindings.bound_by_rdf_class = true;
            }
            bindings
                .bindings
                .insert(predicate.clone(), Some(entry.triple.clone()));
        } else {
            bindings.unbound_triples.push(entry.triple.clone());
        }
    }
    context.stack.pop();

    bindings.fully_bounded = bindings.unbound_triples.is_empty() && !star_pattern.is_empty();
    bindings
}

/// Non-literal objects cannot be rejected by a datatype.
fn type_constraint_holds(constraint: &Constraint, object: &Term) -> bool {
    match object.datatype() {
        Some(datatype) => constraint.value.contains(datatype.as_str()),
        None => true,
    }
}

fn anchors_rdf_class(shape: &Shape, triple: &Triple) -> bool {
    let class_constraint = shape
        .get(RDF_TYPE)
        .and_then(|p| p.constraint())
        .filter(|c| c.constraint_type == ConstraintType::Type);
    match (triple.object.as_named_node(), class_constraint) {
        (Some(class), Some(c)) => c.value.contains(class.as_str()),
        _ => true,
    }
}

fn bind_shape_constraint(
    constraint: &Constraint,
    star_pattern: &StarPattern,
    predicate: &str,
    entry: &StarPatternEntry,
    bindings: &mut Bindings,
    context: &mut BindingContext,
) -> bool {
    let target = match constraint.single_shape_target() {
        Some(t) => t,
        None => return true,
    };
    let nested_name = match &entry.dependency {
        Some(d) => d,
        None => return true,
    };
    let linked_shapes = context.linked_shapes;
    let target_shape = match linked_shapes.get(target) {
        Some(s) => *s,
        None => {
            debug!(
                "Shape {} referenced from star pattern {} is not loaded",
                target, star_pattern.name
            );
            bindings.unresolved_dependencies.push(UnresolvedDependency {
                star_pattern_name: star_pattern.name.clone(),
                predicate: predicate.to_string(),
                shape_name: target.to_string(),
            });
            return true;
        }
    };
    if let Some(position) = context
        .stack
        .iter()
        .position(|(s, sp)| s == target && sp == nested_name)
    {
        debug!(
            "Breaking cycle at star pattern {} against shape {}",
            nested_name, target
        );
        context.lowest_cycle_break = Some(
            context
                .lowest_cycle_break
                .map_or(position, |lowest| lowest.min(position)),
        );
        return true;
    }

    let nested = match bind_named(target_shape, nested_name, context) {
        Some(n) => n,
        None => return true,
    };

    push_unique(
        &mut bindings.dependencies,
        NestedDependency {
            origin: star_pattern.name.clone(),
            predicate: predicate.to_string(),
            nested: nested_name.clone(),
            target_shape: target.to_string(),
            fully_bounded: nested.fully_bounded,
        },
    );
    for d in &nested.dependencies {
        push_unique(&mut bindings.dependencies, d.clone());
    }
    for u in &nested.unresolved_dependencies {
        push_unique(&mut bindings.unresolved_dependencies, u.clone());
    }
    if nested.fully_bounded {
        bindings
            .nested_contained_star_patterns
            .insert(predicate.to_string(), nested_name.clone());
        for t in nested.get_bound_triples() {
            push_unique(&mut bindings.nested_bound_triples, t.clone());
        }
        for t in &nested.nested_bound_triples {
            push_unique(&mut bindings.nested_bound_triples, t.clone());
        }
    }
    nested.fully_bounded
}

fn push_unique<T: PartialEq>(items: &mut Vec<T>, item: T) {
    if !items.contains(&item) {
        items.push(item);
    }
}
