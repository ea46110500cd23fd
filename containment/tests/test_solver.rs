use containment::{
    solve_from_sources, solve_shape_query_containment, ConditionalLink, ContainmentResult,
    SolverInput, UnresolvedDependency,
};
use representation::{Query, StarPattern, Term, Triple, RDF_TYPE};
use rstest::*;
use shapes::{Constraint, Predicate, Shape};
use std::collections::HashSet;

fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

fn star_pattern(name: &str, triples: Vec<(&str, Term)>) -> StarPattern {
    let mut sp = StarPattern::new(name, true);
    for (p, o) in triples {
        sp.insert(Triple::new(name, p, o), None);
    }
    sp
}

fn targets(names: &[&str]) -> Option<Vec<String>> {
    Some(names.iter().map(|n| n.to_string()).collect())
}

#[fixture]
fn cyclic_query() -> Query {
    Query::from_star_patterns(vec![
        star_pattern(
            "x",
            vec![("p0", Term::variable("y")), ("p1", Term::variable("z"))],
        ),
        star_pattern("y", vec![("p1", Term::variable("x"))]),
        star_pattern("z", vec![("p0", Term::simple_literal("abc"))]),
    ])
}

#[fixture]
fn cyclic_shapes() -> Vec<Shape> {
    vec![
        Shape::closed("S0", vec![Predicate::new("p0")]).unwrap(),
        Shape::closed(
            "S1",
            vec![Predicate::new("p1").with_constraint(Constraint::shape(["S0", "S1"]))],
        )
        .unwrap(),
    ]
}

#[rstest]
fn test_cyclic_query_terminates(cyclic_query: Query, cyclic_shapes: Vec<Shape>) {
    init_logging();
    let output = solve_shape_query_containment(&SolverInput::new(&cyclic_query, &cyclic_shapes));
    let containment = &output.star_patterns_containment;

    let x = containment.get("x").unwrap();
    assert_eq!(x.result, ContainmentResult::Aligned);
    assert_eq!(x.target, targets(&["S0", "S1"]));
    let y = containment.get("y").unwrap();
    assert_eq!(y.result, ContainmentResult::Contain);
    assert_eq!(y.target, targets(&["S1"]));
    let z = containment.get("z").unwrap();
    assert_eq!(z.result, ContainmentResult::Contain);
    assert_eq!(z.target, targets(&["S0"]));

    assert_eq!(output.visit_shape.get("S0"), Some(&true));
    assert_eq!(output.visit_shape.get("S1"), Some(&true));
    assert!(output.conditional_links.is_empty());
}

#[rstest]
fn test_solving_is_idempotent(cyclic_query: Query, cyclic_shapes: Vec<Shape>) {
    let input = SolverInput::new(&cyclic_query, &cyclic_shapes);
    assert_eq!(
        solve_shape_query_containment(&input),
        solve_shape_query_containment(&input)
    );
}

#[rstest]
fn test_self_referencing_shape_contains_cycle() {
    let shapes = vec![Shape::closed(
        "K",
        vec![Predicate::new("p1").with_constraint(Constraint::shape(["K"]))],
    )
    .unwrap()];
    let query = Query::from_star_patterns(vec![
        star_pattern("x", vec![("p1", Term::variable("y"))]),
        star_pattern("y", vec![("p1", Term::variable("x"))]),
    ]);
    let output = solve_shape_query_containment(&SolverInput::new(&query, &shapes));
    for name in ["x", "y"] {
        let c = output.star_patterns_containment.get(name).unwrap();
        assert_eq!(c.result, ContainmentResult::Contain);
        assert_eq!(c.target, targets(&["K"]));
    }
}

#[rstest]
fn test_single_target_cycle_binds_optimistically(cyclic_query: Query) {
    init_logging();
    let shapes = vec![
        Shape::closed("S0", vec![Predicate::new("p0")]).unwrap(),
        Shape::closed(
            "S1",
            vec![
                Predicate::new("p0").with_constraint(Constraint::shape(["S1"])),
                Predicate::new("p1").with_constraint(Constraint::shape(["S1"])),
            ],
        )
        .unwrap(),
    ];
    let output = solve_shape_query_containment(&SolverInput::new(&cyclic_query, &shapes));
    let containment = &output.star_patterns_containment;

    let x = containment.get("x").unwrap();
    assert_eq!(x.result, ContainmentResult::Contain);
    assert_eq!(x.target, targets(&["S1"]));
    let x_s1 = x.bindings.get("S1").unwrap();
    assert_eq!(
        x_s1.get_nested_contained_star_patterns().get("p0"),
        Some(&"y".to_string())
    );
    assert_eq!(
        x_s1.get_nested_contained_star_patterns().get("p1"),
        Some(&"z".to_string())
    );
    let y = containment.get("y").unwrap();
    assert_eq!(y.result, ContainmentResult::Contain);
    assert_eq!(y.target, targets(&["S1"]));
    let z = containment.get("z").unwrap();
    assert_eq!(z.result, ContainmentResult::Contain);
    assert_eq!(z.target, targets(&["S0", "S1"]));

    assert_eq!(output.visit_shape.get("S0"), Some(&true));
    assert_eq!(output.visit_shape.get("S1"), Some(&true));
}

fn diamond_chain(length: usize) -> Query {
    let mut star_patterns = vec![];
    for i in 0..length - 1 {
        let next = Term::variable(format!("x{}", i + 1));
        star_patterns.push(star_pattern(
            &format!("x{}", i),
            vec![("a", next.clone()), ("b", next)],
        ));
    }
    star_patterns.push(star_pattern(
        &format!("x{}", length - 1),
        vec![("a", Term::simple_literal("end"))],
    ));
    Query::from_star_patterns(star_patterns)
}

#[rstest]
fn test_diamond_chain_is_bound_once_per_star_pattern() {
    init_logging();
    let length = 40;
    let query = diamond_chain(length);
    let shapes = vec![Shape::closed(
        "S",
        vec![
            Predicate::new("a").with_constraint(Constraint::shape(["S"])),
            Predicate::new("b").with_constraint(Constraint::shape(["S"])),
        ],
    )
    .unwrap()];
    let output = solve_shape_query_containment(&SolverInput::new(&query, &shapes));

    for i in 0..length {
        let c = output
            .star_patterns_containment
            .get(&format!("x{}", i))
            .unwrap();
        assert_eq!(c.result, ContainmentResult::Contain);
        assert_eq!(c.target, targets(&["S"]));
    }
    let head = output
        .star_patterns_containment
        .get("x0")
        .unwrap()
        .bindings
        .get("S")
        .unwrap();
    assert_eq!(head.get_dependencies().len(), 2 * (length - 1));
    assert_eq!(head.get_nested_bound_triples().len(), 2 * (length - 2) + 1);
}

#[rstest]
#[case(vec!["open", "partial"])]
#[case(vec!["partial", "open"])]
fn test_contain_is_never_downgraded(#[case] order: Vec<&str>) {
    let shapes: Vec<Shape> = order
        .iter()
        .map(|n| match *n {
            "open" => Shape::open("open", vec![]).unwrap(),
            _ => Shape::closed("partial", vec![Predicate::new("p0")]).unwrap(),
        })
        .collect();
    let query = Query::from_star_patterns(vec![star_pattern(
        "x",
        vec![("p0", Term::variable("a")), ("p1", Term::variable("b"))],
    )]);
    let output = solve_shape_query_containment(&SolverInput::new(&query, &shapes));
    let x = output.star_patterns_containment.get("x").unwrap();
    assert_eq!(x.result, ContainmentResult::Contain);
    assert_eq!(x.target, targets(&["open"]));
    assert_eq!(x.binding_by_rdf_class, None);
    assert_eq!(x.bindings.len(), 2);
}

#[rstest]
fn test_rejected_without_evidence() {
    let shapes = vec![Shape::closed("S", vec![Predicate::new("p9")]).unwrap()];
    let query = Query::from_star_patterns(vec![star_pattern(
        "x",
        vec![("p0", Term::variable("a"))],
    )]);
    let output = solve_shape_query_containment(&SolverInput::new(&query, &shapes));
    let x = output.star_patterns_containment.get("x").unwrap();
    assert_eq!(x.result, ContainmentResult::Rejected);
    assert_eq!(x.target, None);
    assert_eq!(output.visit_shape.get("S"), Some(&false));
}

#[rstest]
fn test_aligned_records_rdf_class_anchor() {
    let class = "http://example.com/Person";
    let shapes = vec![Shape::closed(
        "Person",
        vec![
            Predicate::new(RDF_TYPE).with_constraint(Constraint::datatype([class])),
            Predicate::new("name"),
        ],
    )
    .unwrap()];
    let query = Query::from_star_patterns(vec![star_pattern(
        "x",
        vec![
            (RDF_TYPE, Term::named_node(class)),
            ("name", Term::simple_literal("a")),
            ("extra", Term::simple_literal("b")),
        ],
    )]);
    let output = solve_shape_query_containment(&SolverInput::new(&query, &shapes));
    let x = output.star_patterns_containment.get("x").unwrap();
    assert_eq!(x.result, ContainmentResult::Aligned);
    assert_eq!(x.binding_by_rdf_class, targets(&["Person"]));
}

#[fixture]
fn knows_query() -> Query {
    Query::from_star_patterns(vec![
        star_pattern("x", vec![("knows", Term::variable("y"))]),
        star_pattern(
            "y",
            vec![
                ("name", Term::simple_literal("n")),
                ("mbox", Term::named_node("mailto:n@example.com")),
            ],
        ),
    ])
}

#[fixture]
fn dependent_shapes() -> Vec<Shape> {
    vec![Shape::closed("D", vec![Predicate::new("name"), Predicate::new("mbox")]).unwrap()]
}

fn person_shape() -> Shape {
    Shape::closed(
        "P",
        vec![Predicate::new("knows").with_constraint(Constraint::shape(["D"]))],
    )
    .unwrap()
}

#[rstest]
fn test_nested_star_pattern_depends_on_dependent_shape(
    knows_query: Query,
    dependent_shapes: Vec<Shape>,
) {
    init_logging();
    let shapes = vec![person_shape()];
    let input = SolverInput::new(&knows_query, &shapes).with_dependent_shapes(&dependent_shapes);
    let output = solve_shape_query_containment(&input);

    let x = output.star_patterns_containment.get("x").unwrap();
    assert_eq!(x.result, ContainmentResult::Contain);
    assert_eq!(x.target, targets(&["P"]));
    let y = output.star_patterns_containment.get("y").unwrap();
    assert_eq!(y.result, ContainmentResult::Depend);
    assert_eq!(y.target, targets(&["D"]));

    assert_eq!(output.visit_shape.len(), 1);
    assert!(output.conditional_links.is_empty());
}

#[rstest]
fn test_depend_takes_precedence_over_aligned(knows_query: Query, dependent_shapes: Vec<Shape>) {
    let shapes = vec![
        person_shape(),
        Shape::closed("Q", vec![Predicate::new("name")]).unwrap(),
    ];
    let input = SolverInput::new(&knows_query, &shapes).with_dependent_shapes(&dependent_shapes);
    let output = solve_shape_query_containment(&input);

    let y = output.star_patterns_containment.get("y").unwrap();
    assert_eq!(y.result, ContainmentResult::Depend);
    assert_eq!(y.target, targets(&["D"]));
    assert!(y.bindings.get("Q").unwrap().should_visit_shape());
    assert_eq!(output.visit_shape.get("Q"), Some(&true));
}

#[rstest]
fn test_missing_shape_is_reported_unresolved() {
    let shapes = vec![Shape::closed(
        "S",
        vec![Predicate::new("p0").with_constraint(Constraint::shape(["T"]))],
    )
    .unwrap()];
    let query = Query::from_star_patterns(vec![
        star_pattern("x", vec![("p0", Term::variable("y"))]),
        star_pattern("y", vec![("p1", Term::simple_literal("a"))]),
    ]);
    let output = solve_shape_query_containment(&SolverInput::new(&query, &shapes));
    assert_eq!(
        output.star_patterns_containment.get("x").unwrap().result,
        ContainmentResult::Contain
    );
    assert_eq!(
        output.star_patterns_containment.get("y").unwrap().result,
        ContainmentResult::Rejected
    );
    assert_eq!(
        output.unresolved_dependencies,
        vec![UnresolvedDependency {
            star_pattern_name: "x".to_string(),
            predicate: "p0".to_string(),
            shape_name: "T".to_string(),
        }]
    );
}

#[rstest]
#[case(vec!["S0"], ContainmentResult::PartiallyContain)]
#[case(vec!["other"], ContainmentResult::Contain)]
fn test_deciding_shapes(#[case] deciding: Vec<&str>, #[case] expected: ContainmentResult) {
    let shapes = vec![Shape::closed("S0", vec![Predicate::new("p0")]).unwrap()];
    let query = Query::from_star_patterns(vec![star_pattern(
        "x",
        vec![("p0", Term::simple_literal("a"))],
    )]);
    let deciding_shapes: HashSet<String> = deciding.iter().map(|s| s.to_string()).collect();
    let input = SolverInput::new(&query, &shapes).with_deciding_shapes(&deciding_shapes);
    let output = solve_shape_query_containment(&input);
    assert_eq!(output.star_patterns_containment.get("x").unwrap().result, expected);
}

#[rstest]
fn test_partially_contain_display() {
    assert_eq!(ContainmentResult::PartiallyContain.to_string(), "PARTIALY_CONTAIN");
    assert_eq!(ContainmentResult::Depend.to_string(), "DEPEND");
}

#[fixture]
fn linking_query() -> Query {
    Query::from_star_patterns(vec![star_pattern(
        "x",
        vec![
            ("p0", Term::named_node("http://example.com/bound")),
            ("p1", Term::named_node("http://example.com/doc")),
            ("p3", Term::simple_literal("lit")),
        ],
    )])
    .with_union(vec![vec![star_pattern(
        "x",
        vec![("p2", Term::named_node("http://example.com/other"))],
    )]])
}

#[rstest]
fn test_unclaimed_named_nodes_are_conditional_links(linking_query: Query) {
    let shapes = vec![Shape::closed("S", vec![Predicate::new("p0")]).unwrap()];
    let output = solve_shape_query_containment(&SolverInput::new(&linking_query, &shapes));
    assert_eq!(
        output.conditional_links,
        vec![
            ConditionalLink {
                link: "http://example.com/doc".to_string(),
                star_pattern_name: "x".to_string(),
            },
            ConditionalLink {
                link: "http://example.com/other".to_string(),
                star_pattern_name: "x".to_string(),
            },
        ]
    );
}

#[rstest]
fn test_no_shapes_no_conditional_links(linking_query: Query) {
    let output = solve_shape_query_containment(&SolverInput::new(&linking_query, &[]));
    assert!(output.conditional_links.is_empty());
    assert!(output.visit_shape.is_empty());
    assert_eq!(
        output.star_patterns_containment.get("x").unwrap().result,
        ContainmentResult::Rejected
    );
}

const SCHEMA: &str = r#"
@prefix sx: <http://www.w3.org/ns/shex#> .
@prefix ex: <http://example.com/> .

ex:S a sx:ShapeDecl ;
    sx:shapeExpr [
        a sx:Shape ;
        sx:closed true ;
        sx:expression [ a sx:TripleConstraint ; sx:predicate ex:p0 ]
    ] .
"#;

#[rstest]
fn test_solve_from_sources() {
    init_logging();
    let output = solve_from_sources(
        r#"SELECT * WHERE { ?x <http://example.com/p0> "a" . ?y <http://example.com/p1> ?x }"#,
        SCHEMA.as_bytes(),
    )
    .unwrap();
    let x = output.star_patterns_containment.get("x").unwrap();
    assert_eq!(x.result, ContainmentResult::Contain);
    assert_eq!(x.target, targets(&["http://example.com/S"]));
    assert_eq!(
        output.star_patterns_containment.get("y").unwrap().result,
        ContainmentResult::Rejected
    );
    assert!(solve_from_sources("SELECT WHERE {", SCHEMA.as_bytes()).is_err());
}
