use activity_overlap::datatype::Value;
use activity_overlap::filter::{self, Comparison, Operand, Predicate};
use activity_overlap::pattern::Binding;
use activity_overlap::OverlapError;

fn at(hm: &str) -> Value {
    Value::timestamp(&format!("2020-02-11T{}:00Z", hm)).unwrap()
}

fn overlap() -> Predicate {
    Predicate::and(vec![
        Predicate::vars("ed2", Comparison::Greater, "sd1"),
        Predicate::vars("sd1", Comparison::Greater, "sd2"),
    ])
}

fn intervals(sd1: Value, sd2: Value, ed2: Value) -> Binding {
    [("sd1", sd1), ("sd2", sd2), ("ed2", ed2)].into_iter().collect()
}

#[test]
fn overlap_holds_strictly() {
    let predicate = overlap();
    let binding = intervals(at("10:00"), at("09:45"), at("10:15"));
    assert!(filter::evaluate(&predicate, &binding).unwrap());

    // the other element ends exactly when this one starts
    let binding = intervals(at("10:00"), at("09:45"), at("10:00"));
    assert!(!filter::evaluate(&predicate, &binding).unwrap());

    // both start together
    let binding = intervals(at("10:00"), at("10:00"), at("10:15"));
    assert!(!filter::evaluate(&predicate, &binding).unwrap());
}

#[test]
fn every_comparison_operator() {
    let binding: Binding = [("x", Value::number("2").unwrap()), ("y", Value::number("3").unwrap())]
        .into_iter()
        .collect();
    let cases = [
        (Comparison::Less, true),
        (Comparison::LessOrEqual, true),
        (Comparison::Greater, false),
        (Comparison::GreaterOrEqual, false),
        (Comparison::Equal, false),
        (Comparison::NotEqual, true),
    ];
    for (comparison, expected) in cases {
        let predicate = Predicate::vars("x", comparison, "y");
        assert_eq!(filter::evaluate(&predicate, &binding).unwrap(), expected, "{predicate}");
    }
}

#[test]
fn numbers_compare_by_value() {
    let binding: Binding = [("x", Value::number("10").unwrap())].into_iter().collect();
    let predicate = Predicate::compare(
        Operand::Variable("x".into()),
        Comparison::Equal,
        Operand::Constant(Value::number("10.00").unwrap()),
    );
    assert!(filter::evaluate(&predicate, &binding).unwrap());
}

#[test]
fn timestamps_compare_as_instants() {
    let binding: Binding = [("t", Value::timestamp("2020-02-11T11:00:00+01:00").unwrap())]
        .into_iter()
        .collect();
    let predicate = Predicate::compare(
        Operand::Variable("t".into()),
        Comparison::Equal,
        Operand::Constant(at("10:00")),
    );
    assert!(filter::evaluate(&predicate, &binding).unwrap());
}

#[test]
fn mixed_tags_are_a_type_mismatch() {
    let binding = intervals(Value::text("10:00"), at("09:45"), at("10:15"));
    let predicate = Predicate::vars("ed2", Comparison::Greater, "sd1");
    match filter::evaluate(&predicate, &binding) {
        Err(OverlapError::TypeMismatch { left, right }) => {
            assert_eq!(left, "Timestamp");
            assert_eq!(right, "Text");
        }
        other => panic!("expected a type mismatch, got {other:?}"),
    }

    // equality does not coerce either
    let predicate = Predicate::vars("ed2", Comparison::NotEqual, "sd1");
    assert!(matches!(
        filter::evaluate(&predicate, &binding),
        Err(OverlapError::TypeMismatch { .. })
    ));
}

#[test]
fn missing_variable_is_an_error() {
    let binding: Binding = [("sd1", at("10:00"))].into_iter().collect();
    let predicate = Predicate::vars("sd1", Comparison::Greater, "sd2");
    match filter::evaluate(&predicate, &binding) {
        Err(OverlapError::UnboundVariable(name)) => assert_eq!(name, "sd2"),
        other => panic!("expected an unbound variable, got {other:?}"),
    }
}

#[test]
fn conjunction_short_circuits() {
    // the first operand fails, so the mismatch in the second is never seen
    let binding = intervals(Value::number("1").unwrap(), at("09:45"), at("09:00"));
    let predicate = Predicate::and(vec![
        Predicate::vars("ed2", Comparison::Greater, "sd2"),
        Predicate::vars("sd1", Comparison::Greater, "sd2"),
    ]);
    assert!(!filter::evaluate(&predicate, &binding).unwrap());
}

#[test]
fn retain_keeps_order_and_counts_mismatches() {
    let bindings = vec![
        intervals(at("10:00"), at("09:45"), at("10:15")),
        intervals(Value::text("noon"), at("09:45"), at("10:15")),
        intervals(at("08:00"), at("09:45"), at("10:15")),
        intervals(at("10:05"), at("09:50"), at("10:20")),
    ];
    let (retained, discarded) = filter::retain(bindings.clone(), Some(&overlap())).unwrap();
    assert_eq!(discarded, 1);
    assert_eq!(retained, vec![bindings[0].clone(), bindings[3].clone()]);

    let (all, none) = filter::retain(bindings.clone(), None).unwrap();
    assert_eq!(all, bindings);
    assert_eq!(none, 0);
}

#[test]
fn retain_aborts_on_unbound_variable() {
    let bindings = vec![[("sd1", at("10:00"))].into_iter().collect::<Binding>()];
    assert!(matches!(
        filter::retain(bindings, Some(&overlap())),
        Err(OverlapError::UnboundVariable(_))
    ));
}

#[test]
fn predicates_render_readably() {
    assert_eq!(overlap().to_string(), "(?ed2 > ?sd1) && (?sd1 > ?sd2)");
}
