//! Activity overlap – a small fact store with a conditional rewrite engine,
//! used to straighten out overlapping sensor activity intervals.
//!
//! Facts are triples `(subject, relation, object)`, where:
//! * A [`construct::Thing`] is an opaque identity (a simple `u64`) standing for
//!   a resource named by an IRI.
//! * A [`datatype::Value`] is the object: an identifier, a text, a timestamp or
//!   a number. Values only compare within their own kind.
//! * A [`construct::FactStore`] keeps the facts as a set, with lookups by
//!   subject, by relation and by relation plus object.
//!
//! On top of the store sits a declarative engine:
//! * [`pattern`] – triple templates with variables, clauses and bindings.
//! * [`matcher`] – joins a clause against the store into bindings.
//! * [`filter`] – ordering predicates that prune bindings.
//! * [`rewrite`] – rules that delete and insert facts for every surviving
//!   binding, computed from one view of the store and applied in one step.
//! * [`project`] – read-only reports turning bindings into rows.
//!
//! [`session::Database`] hands out exclusive sessions so that a rewrite is
//! never observed half applied. [`activity`] holds the overlap rule and the
//! interval report, [`sparql`] renders both as SPARQL text for a remote graph
//! store, [`load`] reads JSON fact dumps, and [`settings`] and [`cli`] configure the
//! binary.
//!
//! ## Quick Start
//! ```
//! use activity_overlap::{activity::Vocabulary, construct::FactStore, datatype::Value, session::Database};
//! let mut store = FactStore::new();
//! let vocabulary = Vocabulary::intern(&mut store);
//! vocabulary.record(&mut store, "A1", "O1", "E1",
//!     Value::timestamp("2020-02-11T10:00:00Z").unwrap(), Value::timestamp("2020-02-11T10:30:00Z").unwrap());
//! vocabulary.record(&mut store, "A2", "O2", "E2",
//!     Value::timestamp("2020-02-11T09:45:00Z").unwrap(), Value::timestamp("2020-02-11T10:15:00Z").unwrap());
//! let db = Database::new(store);
//! let mut session = db.open().unwrap();
//! let rewrite = session.apply(&vocabulary.overlap_rule().unwrap()).unwrap();
//! assert_eq!(rewrite.rewrites, 1);
//! ```

pub mod activity;
pub mod cli;
pub mod construct;
pub mod datatype;
pub mod error;
pub mod filter;
pub mod load;
pub mod matcher;
pub mod pattern;
pub mod project;
pub mod rewrite;
pub mod session;
pub mod settings;
pub mod sparql;

pub use error::{OverlapError, Result};
