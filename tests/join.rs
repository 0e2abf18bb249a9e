use activity_overlap::activity::{iri, Vocabulary};
use activity_overlap::construct::FactStore;
use activity_overlap::datatype::Value;
use activity_overlap::matcher::Matcher;
use activity_overlap::pattern::{Binding, Clause, Pattern, Term};

fn at(hm: &str) -> Value {
    Value::timestamp(&format!("2020-02-11T{}:00Z", hm)).unwrap()
}

fn setup() -> (FactStore, Vocabulary) {
    let mut store = FactStore::new();
    let vocabulary = Vocabulary::intern(&mut store);
    vocabulary.record(&mut store, "A1", "O1", "E1", at("10:00"), at("10:30"));
    vocabulary.record(&mut store, "A2", "O2", "E2", at("09:45"), at("10:15"));
    vocabulary.record(&mut store, "A3", "O3", "E3", at("09:50"), at("10:20"));
    (store, vocabulary)
}

#[test]
fn every_binding_satisfies_every_pattern() {
    let (store, vocabulary) = setup();
    let rule = vocabulary.overlap_rule().unwrap();
    let bindings = Matcher::new(&store).matches(rule.guard(), &Binding::new());
    assert!(!bindings.is_empty());
    for binding in &bindings {
        for variable in rule.guard().variables() {
            assert!(binding.contains(variable), "{variable} left unbound");
        }
        for pattern in rule.guard().patterns() {
            let fact = pattern.instantiate(binding).expect("fully bound pattern");
            assert!(store.contains(&fact), "{fact} is not in the store");
        }
    }
}

#[test]
fn unconnected_halves_are_cross_joined() {
    let (store, vocabulary) = setup();
    let rule = vocabulary.overlap_rule().unwrap();
    let components = rule.guard().components();
    assert_eq!(components.len(), 2);
    assert_eq!(components[0].len() + components[1].len(), rule.guard().len());

    let matcher = Matcher::new(&store);
    let left = matcher.join(&components[0], &Binding::new());
    let right = matcher.join(&components[1], &Binding::new());
    assert_eq!(left.len(), 3);
    assert_eq!(right.len(), 3);
    let bindings = matcher.matches(rule.guard(), &Binding::new());
    assert_eq!(bindings.len(), left.len() * right.len());
}

#[test]
fn cross_join_is_left_major() {
    let (store, vocabulary) = setup();
    let rule = vocabulary.overlap_rule().unwrap();
    let bindings = Matcher::new(&store).matches(rule.guard(), &Binding::new());
    let e1 = Value::Identifier(store.find(&iri("E1")).unwrap());
    let firsts: Vec<&Value> = bindings.iter().take(3).map(|b| b.get("e1").unwrap()).collect();
    assert!(firsts.iter().all(|v| **v == e1));
    let seconds: Vec<Value> = bindings.iter().take(3).map(|b| b.get("e2").unwrap().clone()).collect();
    let expected: Vec<Value> = ["E1", "E2", "E3"]
        .iter()
        .map(|n| Value::Identifier(store.find(&iri(n)).unwrap()))
        .collect();
    assert_eq!(seconds, expected, "right side follows store order");
}

#[test]
fn nested_loop_order_matches_cross_join_order() {
    let (store, vocabulary) = setup();
    let rule = vocabulary.overlap_rule().unwrap();
    let matcher = Matcher::new(&store);
    let crossed = matcher.matches(rule.guard(), &Binding::new());
    let nested = matcher.join(rule.guard(), &Binding::new());
    assert_eq!(crossed, nested);
}

#[test]
fn initial_binding_restricts_matches() {
    let (store, vocabulary) = setup();
    let rule = vocabulary.overlap_rule().unwrap();
    let e2 = Value::Identifier(store.find(&iri("E2")).unwrap());
    let initial: Binding = [("e1", e2.clone())].into_iter().collect();
    let bindings = Matcher::new(&store).matches(rule.guard(), &initial);
    assert_eq!(bindings.len(), 3);
    assert!(bindings.iter().all(|b| b.get("e1") == Some(&e2)));
}

#[test]
fn conflicting_branches_are_discarded() {
    let (mut store, vocabulary) = setup();
    // start and end must be the same value
    let clause = Clause::new(vec![
        Pattern::new(Term::var("e"), vocabulary.has_start_date, Term::var("t")),
        Pattern::new(Term::var("e"), vocabulary.has_end_date, Term::var("t")),
    ]);
    assert!(Matcher::new(&store).matches(&clause, &Binding::new()).is_empty());

    vocabulary.record(&mut store, "A4", "O4", "E4", at("12:00"), at("12:00"));
    let bindings = Matcher::new(&store).matches(&clause, &Binding::new());
    assert_eq!(bindings.len(), 1);
    assert_eq!(bindings[0].get("t"), Some(&at("12:00")));
}

#[test]
fn empty_component_empties_the_result() {
    let (mut store, vocabulary) = setup();
    let missing = store.resource(&iri("hasNothing"));
    let clause = Clause::new(vec![
        Pattern::new(Term::var("e"), vocabulary.a, vocabulary.element),
        Pattern::new(Term::var("x"), missing, Term::var("y")),
    ]);
    assert_eq!(clause.components().len(), 2);
    assert!(Matcher::new(&store).matches(&clause, &Binding::new()).is_empty());
}
