use activity_overlap::activity::{iri, Vocabulary};
use activity_overlap::construct::FactStore;
use activity_overlap::datatype::Value;
use activity_overlap::filter::{Comparison, Operand, Predicate};
use activity_overlap::pattern::{Clause, Pattern, Term};
use activity_overlap::project::{short_name, Cell, Column, Form, Projection, Projector};
use activity_overlap::OverlapError;

fn at(hm: &str) -> Value {
    Value::timestamp(&format!("2020-02-11T{}:00Z", hm)).unwrap()
}

// four elements an hour apart, none overlapping
fn setup() -> (FactStore, Vocabulary) {
    let mut store = FactStore::new();
    let vocabulary = Vocabulary::intern(&mut store);
    for (n, hour) in ["08", "09", "10", "11"].iter().enumerate() {
        vocabulary.record(
            &mut store,
            &format!("A{}", n),
            &format!("O{}", n),
            &format!("E{}", n),
            at(&format!("{}:00", hour)),
            at(&format!("{}:30", hour)),
        );
    }
    (store, vocabulary)
}

#[test]
fn interval_report_round_trips() {
    let (store, vocabulary) = setup();
    let report = vocabulary.interval_report().unwrap();
    let rows = Projector::new(&store).project(&report).unwrap();
    assert_eq!(rows.columns(), ["e", "start_date", "end_date"]);
    assert_eq!(rows.len(), 4);
    let texts: Vec<Vec<String>> = rows.map(|r| r.texts()).collect();
    assert_eq!(
        texts[0],
        ["E0", "2020-02-11T08:00:00Z", "2020-02-11T08:30:00Z"]
    );
    assert_eq!(
        texts[3],
        ["E3", "2020-02-11T11:00:00Z", "2020-02-11T11:30:00Z"]
    );
}

#[test]
fn report_keeps_the_stored_lexical_form() {
    let mut store = FactStore::new();
    let vocabulary = Vocabulary::intern(&mut store);
    vocabulary.record(
        &mut store,
        "A",
        "O",
        "E",
        Value::timestamp("2020-02-11T10:00:00").unwrap(),
        Value::timestamp("2020-02-11T10:30:00.000+00:00").unwrap(),
    );
    let report = vocabulary.interval_report().unwrap();
    let rows: Vec<Vec<String>> = Projector::new(&store).project(&report).unwrap().map(|r| r.texts()).collect();
    assert_eq!(rows, [["E", "2020-02-11T10:00:00", "2020-02-11T10:30:00.000+00:00"]]);
}

#[test]
fn non_overlapping_elements_are_left_alone() {
    let (mut store, vocabulary) = setup();
    let report = vocabulary.interval_report().unwrap();
    let before: Vec<_> = Projector::new(&store).project(&report).unwrap().collect();
    let rewrite = activity_overlap::rewrite::RewriteEngine::new(&mut store)
        .apply(&vocabulary.overlap_rule().unwrap())
        .unwrap();
    assert_eq!(rewrite.rewrites, 0);
    let after: Vec<_> = Projector::new(&store).project(&report).unwrap().collect();
    assert_eq!(before, after);
}

#[test]
fn projection_is_read_only_and_restartable() {
    let (store, vocabulary) = setup();
    let report = vocabulary.interval_report().unwrap();
    let generation = store.generation();
    let first: Vec<_> = Projector::new(&store).project(&report).unwrap().collect();
    let second: Vec<_> = Projector::new(&store).project(&report).unwrap().collect();
    assert_eq!(first, second);
    assert_eq!(store.generation(), generation);
}

#[test]
fn rows_are_pulled_one_at_a_time_and_rewind() {
    let (store, vocabulary) = setup();
    let report = vocabulary.interval_report().unwrap();
    let mut rows = Projector::new(&store).project(&report).unwrap();
    assert_eq!(rows.len(), 4);
    let first = rows.next().unwrap();
    assert_eq!(first.texts()[0], "E0");
    assert_eq!(rows.len(), 3);

    let rest: Vec<_> = rows.by_ref().collect();
    assert_eq!(rest.len(), 3);
    assert_eq!(rows.next(), None);

    rows.rewind();
    assert_eq!(rows.len(), 4);
    assert_eq!(rows.next(), Some(first));
}

#[test]
fn forms_render_differently() {
    let (store, vocabulary) = setup();
    let clause = Clause::new(vec![Pattern::new(Term::var("e"), vocabulary.has_start_date, Term::var("sd"))]);
    let projection = Projection::new(
        clause,
        None,
        vec![
            Column::new("short", "e", Form::ShortName),
            Column::new("full", "e", Form::Text),
            Column::new("start", "sd", Form::Value),
        ],
    )
    .unwrap();
    let row = Projector::new(&store).project(&projection).unwrap().next().unwrap();
    assert_eq!(row.get(0), Some(&Cell::Text("E0".into())));
    assert_eq!(row.get(1), Some(&Cell::Text(iri("E0"))));
    assert_eq!(row.get(2), Some(&Cell::Value(at("08:00"))));
    assert_eq!(row.get(3), None);
}

#[test]
fn filtered_projection() {
    let (store, vocabulary) = setup();
    let clause = Clause::new(vec![Pattern::new(Term::var("e"), vocabulary.has_start_date, Term::var("sd"))]);
    let filter = Predicate::compare(
        Operand::Variable("sd".into()),
        Comparison::GreaterOrEqual,
        Operand::Constant(at("10:00")),
    );
    let projection = Projection::new(clause, Some(filter), vec![Column::new("e", "e", Form::ShortName)]).unwrap();
    let names: Vec<String> = Projector::new(&store)
        .project(&projection)
        .unwrap()
        .map(|r| r.texts().remove(0))
        .collect();
    assert_eq!(names, ["E2", "E3"]);
}

#[test]
fn columns_must_be_bound() {
    let (_, vocabulary) = setup();
    let clause = Clause::new(vec![Pattern::new(Term::var("e"), vocabulary.has_start_date, Term::var("sd"))]);
    let projection = Projection::new(clause, None, vec![Column::new("end", "ed", Form::Text)]);
    assert!(matches!(projection, Err(OverlapError::UnboundVariable(v)) if v == "ed"));
}

#[test]
fn short_names() {
    assert_eq!(short_name(&iri("Element")), "Element");
    assert_eq!(short_name("http://example.org/things/lamp"), "lamp");
    assert_eq!(short_name("urn:plain"), "urn:plain");
    assert_eq!(short_name("http://example.org/"), "http://example.org/");
}
