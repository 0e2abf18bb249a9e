//! The activity ontology: sensor activities own observations and elements,
//! and every element spans an interval given by a start and an end date.
//!
//! Two things are built on it here. The overlap rule moves the start of an
//! element forward to the end of another element whenever
//! `end2 > start1 > start2`, i.e. the other element started strictly earlier
//! and is still running when this one starts. The condition is strict and
//! one-directional: touching intervals never fire it, the earlier element is
//! never moved, and an element nested inside another gets its start moved
//! past its own end. The interval report lists every element of an observed
//! activity with its (possibly rewritten) start and end.

use crate::construct::{Fact, FactStore, Thing};
use crate::datatype::Value;
use crate::error::Result;
use crate::filter::{Comparison, Predicate};
use crate::pattern::{Clause, Pattern, Term};
use crate::project::{Column, Form, Projection};
use crate::rewrite::Rule;

pub const ACTIVITY_NS: &str = "http://www.semanticweb.org/user/ontologies/2020/1/activity#";
pub const RDF_TYPE: &str = "http://www.w3.org/1999/02/22-rdf-syntax-ns#type";
pub const XSD_NS: &str = "http://www.w3.org/2001/XMLSchema#";

pub const OVERLAP_RULE: &str = "overlapped-start";

/// A name in the activity namespace.
pub fn iri(local: &str) -> String {
    format!("{}{}", ACTIVITY_NS, local)
}

/// The resources of the ontology, interned in one store.
#[derive(Debug, Clone, Copy)]
pub struct Vocabulary {
    pub a: Thing,
    pub element: Thing,
    pub activity: Thing,
    pub observation: Thing,
    pub has_element: Thing,
    pub has_observation: Thing,
    pub has_start_date: Thing,
    pub has_end_date: Thing,
}
impl Vocabulary {
    pub fn intern(store: &mut FactStore) -> Self {
        Self {
            a: store.resource(RDF_TYPE),
            element: store.resource(&iri("Element")),
            activity: store.resource(&iri("Activity")),
            observation: store.resource(&iri("Observation")),
            has_element: store.resource(&iri("hasElement")),
            has_observation: store.resource(&iri("hasObservation")),
            has_start_date: store.resource(&iri("hasStartDate")),
            has_end_date: store.resource(&iri("hasEndDate")),
        }
    }

    // ?activity a Activity . ?activity hasElement ?element .
    // ?activity hasObservation ?observation . ?observation a Observation .
    fn observed(&self, activity: &str, element: &str, observation: &str) -> Vec<Pattern> {
        vec![
            Pattern::new(Term::var(activity), self.a, self.activity),
            Pattern::new(Term::var(activity), self.has_element, Term::var(element)),
            Pattern::new(Term::var(activity), self.has_observation, Term::var(observation)),
            Pattern::new(Term::var(observation), self.a, self.observation),
        ]
    }

    /// Start of `e1` becomes the end of `e2` when `ed2 > sd1` and `sd1 > sd2`.
    pub fn overlap_rule(&self) -> Result<Rule> {
        let mut guard = vec![Pattern::new(Term::var("e1"), self.a, self.element)];
        guard.extend(self.observed("a1", "e1", "o1"));
        guard.push(Pattern::new(Term::var("e1"), self.has_start_date, Term::var("sd1")));
        guard.extend(self.observed("a2", "e2", "o2"));
        guard.push(Pattern::new(Term::var("e2"), self.has_end_date, Term::var("ed2")));
        guard.push(Pattern::new(Term::var("e2"), self.has_start_date, Term::var("sd2")));
        let filter = Predicate::and(vec![
            Predicate::vars("ed2", Comparison::Greater, "sd1"),
            Predicate::vars("sd1", Comparison::Greater, "sd2"),
        ]);
        Rule::new(
            OVERLAP_RULE,
            Clause::new(guard),
            Some(filter),
            vec![Pattern::new(Term::var("e1"), self.has_start_date, Term::var("sd1"))],
            vec![Pattern::new(Term::var("e1"), self.has_start_date, Term::var("ed2"))],
        )
    }

    /// One row per element of an observed activity: short name, start, end.
    pub fn interval_report(&self) -> Result<Projection> {
        let mut clause = self.observed("a", "e", "o");
        clause.push(Pattern::new(Term::var("e"), self.has_start_date, Term::var("sd")));
        clause.push(Pattern::new(Term::var("e"), self.has_end_date, Term::var("ed")));
        Projection::new(
            Clause::new(clause),
            None,
            vec![
                Column::new("e", "e", Form::ShortName),
                Column::new("start_date", "sd", Form::Text),
                Column::new("end_date", "ed", Form::Text),
            ],
        )
    }

    /// Records an observed activity holding a single element with the given interval.
    pub fn record(
        &self,
        store: &mut FactStore,
        activity: &str,
        observation: &str,
        element: &str,
        start: Value,
        end: Value,
    ) {
        let activity = store.resource(&iri(activity));
        let observation = store.resource(&iri(observation));
        let element = store.resource(&iri(element));
        let facts = [
            (activity, self.a, Value::Identifier(self.activity)),
            (activity, self.has_observation, Value::Identifier(observation)),
            (observation, self.a, Value::Identifier(self.observation)),
            (activity, self.has_element, Value::Identifier(element)),
            (element, self.a, Value::Identifier(self.element)),
            (element, self.has_start_date, start),
            (element, self.has_end_date, end),
        ];
        for (subject, relation, object) in facts {
            store.insert(Fact::new(subject, relation, object));
        }
    }
}
