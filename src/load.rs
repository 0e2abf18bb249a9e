//! Populating a store from a JSON fact dump.
//!
//! ```json
//! {
//!   "prefixes": { "ac": "http://www.semanticweb.org/user/ontologies/2020/1/activity#" },
//!   "facts": [
//!     { "subject": "ac:E1", "relation": "a", "object": { "iri": "ac:Element" } },
//!     { "subject": "ac:E1", "relation": "ac:hasStartDate",
//!       "object": { "timestamp": "2020-02-11T10:00:00Z" } }
//!   ]
//! }
//! ```
//!
//! `a` stands for `rdf:type`. Names with a known prefix are expanded, anything
//! else is taken as a full IRI. Numbers are given as strings to keep their precision.

use std::collections::HashMap;
use std::path::Path;
use std::str::FromStr;

use serde::Deserialize;
use tracing::info;

use crate::activity::RDF_TYPE;
use crate::construct::{Fact, FactStore};
use crate::datatype::Value;
use crate::error::{OverlapError, Result};

#[derive(Debug, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ObjectRecord {
    Iri(String),
    Text(String),
    Timestamp(String),
    Number(String),
}

#[derive(Debug, Deserialize)]
pub struct FactRecord {
    pub subject: String,
    pub relation: String,
    pub object: ObjectRecord,
}

#[derive(Debug, Deserialize)]
pub struct FactDump {
    #[serde(default)]
    pub prefixes: HashMap<String, String>,
    pub facts: Vec<FactRecord>,
}
impl FromStr for FactDump {
    type Err = OverlapError;
    fn from_str(s: &str) -> Result<FactDump> {
        Ok(serde_json::from_str(s)?)
    }
}
impl FactDump {
    fn expand(&self, name: &str) -> String {
        if name == "a" {
            return RDF_TYPE.to_owned();
        }
        match name.split_once(':') {
            Some((prefix, local)) if !local.starts_with("//") => match self.prefixes.get(prefix) {
                Some(namespace) => format!("{}{}", namespace, local),
                None => name.to_owned(),
            },
            _ => name.to_owned(),
        }
    }

    /// Inserts every fact of the dump, returning how many were new.
    pub fn load(&self, store: &mut FactStore) -> Result<usize> {
        let mut inserted = 0;
        for record in &self.facts {
            let subject = store.resource(&self.expand(&record.subject));
            let relation = store.resource(&self.expand(&record.relation));
            let object = match &record.object {
                ObjectRecord::Iri(name) => Value::Identifier(store.resource(&self.expand(name))),
                ObjectRecord::Text(s) => Value::text(s),
                ObjectRecord::Timestamp(s) => Value::timestamp(s)?,
                ObjectRecord::Number(s) => Value::number(s)?,
            };
            if store.insert(Fact::new(subject, relation, object)) {
                inserted += 1;
            }
        }
        Ok(inserted)
    }
}

/// Reads a fact dump from disk into the store.
pub fn load_file(store: &mut FactStore, path: &Path) -> Result<usize> {
    let text = std::fs::read_to_string(path)
        .map_err(|e| OverlapError::Load(format!("{}: {}", path.display(), e)))?;
    let dump = FactDump::from_str(&text)?;
    let inserted = dump.load(store)?;
    info!(path = %path.display(), records = dump.facts.len(), inserted, "facts loaded");
    Ok(inserted)
}
