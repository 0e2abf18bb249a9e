use activity_overlap::activity::Vocabulary;
use activity_overlap::construct::FactStore;
use activity_overlap::datatype::Value;
use activity_overlap::filter::{Comparison, Operand, Predicate};
use activity_overlap::pattern::{Clause, Pattern, Term};
use activity_overlap::project::{Column, Form, Projection};
use activity_overlap::sparql::{render_select, render_update};

fn setup() -> (FactStore, Vocabulary) {
    let mut store = FactStore::new();
    let vocabulary = Vocabulary::intern(&mut store);
    (store, vocabulary)
}

#[test]
fn overlap_rule_as_update() {
    let (store, vocabulary) = setup();
    let update = render_update(&vocabulary.overlap_rule().unwrap(), &store).unwrap();
    assert!(update.starts_with("PREFIX ac: <http://www.semanticweb.org/user/ontologies/2020/1/activity#>\n"));
    assert!(update.contains("DELETE {\n    ?e1 ac:hasStartDate ?sd1 .\n}"));
    assert!(update.contains("INSERT {\n    ?e1 ac:hasStartDate ?ed2 .\n} WHERE {\n"));
    assert!(update.contains("    ?e1 a ac:Element .\n"));
    assert!(update.contains("    ?a2 ac:hasObservation ?o2 .\n"));
    assert!(update.contains("    FILTER ((?ed2 > ?sd1) && (?sd1 > ?sd2))\n"));
    assert!(update.ends_with("}\n"));
}

#[test]
fn interval_report_as_select() {
    let (store, vocabulary) = setup();
    let query = render_select(&vocabulary.interval_report().unwrap(), &store).unwrap();
    assert!(query.contains("SELECT ?e (str(?sd) AS ?start_date) (str(?ed) AS ?end_date)\nWHERE {\n"));
    assert!(query.contains("    ?a a ac:Activity .\n"));
    assert!(!query.contains("FILTER"));
}

#[test]
fn literals_carry_their_datatype() {
    let (mut store, vocabulary) = setup();
    let lamp = store.resource("http://example.org/lamp");
    let clause = Clause::new(vec![Pattern::new(lamp, vocabulary.has_start_date, Term::var("sd"))]);
    let filter = Predicate::and(vec![
        Predicate::compare(
            Operand::Variable("sd".into()),
            Comparison::GreaterOrEqual,
            Operand::Constant(Value::timestamp("2020-02-11T10:00:00Z").unwrap()),
        ),
        Predicate::compare(
            Operand::Constant(Value::text("say \"hi\"")),
            Comparison::NotEqual,
            Operand::Constant(Value::number("1.5").unwrap()),
        ),
    ]);
    let projection = Projection::new(clause, Some(filter), vec![Column::new("start", "sd", Form::Value)]).unwrap();
    let query = render_select(&projection, &store).unwrap();
    assert!(query.contains("SELECT (?sd AS ?start)\n"));
    assert!(query.contains("    <http://example.org/lamp> ac:hasStartDate ?sd .\n"));
    assert!(query.contains("?sd >= \"2020-02-11T10:00:00Z\"^^xsd:dateTime"));
    assert!(query.contains("\"say \\\"hi\\\"\" != \"1.5\"^^xsd:decimal"));
}

#[test]
fn text_literals_escape_control_characters() {
    let (mut store, _) = setup();
    let note = store.resource("http://example.org/note");
    let clause = Clause::new(vec![Pattern::new(
        Term::var("e"),
        note,
        Value::text("line one\nline two\r\n\tindented \\ \"quoted\""),
    )]);
    let projection = Projection::new(clause, None, vec![Column::new("e", "e", Form::ShortName)]).unwrap();
    let query = render_select(&projection, &store).unwrap();
    assert!(query.contains(r#"?e <http://example.org/note> "line one\nline two\r\n\tindented \\ \"quoted\"" ."#));
    assert_eq!(query.lines().filter(|l| l.contains("example.org/note")).count(), 1);
}
