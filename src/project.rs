//! Read-only projection of matched bindings into rows.

use std::fmt;

use tracing::debug;

use crate::construct::{FactStore, Thing};
use crate::datatype::Value;
use crate::error::{OverlapError, Result};
use crate::filter::{self, Predicate};
use crate::matcher::Matcher;
use crate::pattern::{Binding, Clause};

/// The local part of an IRI, after the last `#` or `/`.
pub fn short_name(iri: &str) -> &str {
    match iri.rsplit(['#', '/']).next() {
        Some(local) if !local.is_empty() => local,
        _ => iri,
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Form {
    // the typed value itself
    Value,
    // the lexical form, identifiers as their full IRI
    Text,
    // identifiers by their local name, anything else by its lexical form
    ShortName,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Column {
    name: String,
    variable: String,
    form: Form,
}
impl Column {
    pub fn new(name: &str, variable: &str, form: Form) -> Self {
        Self {
            name: name.to_owned(),
            variable: variable.to_owned(),
            form,
        }
    }
    pub fn name(&self) -> &str {
        &self.name
    }
    pub fn variable(&self) -> &str {
        &self.variable
    }
    pub fn form(&self) -> Form {
        self.form
    }
}

#[derive(Debug, Clone)]
pub struct Projection {
    clause: Clause,
    filter: Option<Predicate>,
    columns: Vec<Column>,
}
impl Projection {
    pub fn new(clause: Clause, filter: Option<Predicate>, columns: Vec<Column>) -> Result<Projection> {
        if let Some(predicate) = &filter {
            predicate.check(&clause)?;
        }
        if let Some(column) = columns.iter().find(|c| !clause.binds(c.variable())) {
            return Err(OverlapError::UnboundVariable(column.variable().to_owned()));
        }
        Ok(Projection { clause, filter, columns })
    }
    pub fn clause(&self) -> &Clause {
        &self.clause
    }
    pub fn filter(&self) -> Option<&Predicate> {
        self.filter.as_ref()
    }
    pub fn columns(&self) -> &[Column] {
        &self.columns
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Cell {
    Value(Value),
    Text(String),
}
impl fmt::Display for Cell {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Cell::Value(v) => write!(f, "{}", v),
            Cell::Text(s) => write!(f, "{}", s),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Row {
    cells: Vec<Cell>,
}
impl Row {
    pub fn cells(&self) -> &[Cell] {
        &self.cells
    }
    pub fn get(&self, i: usize) -> Option<&Cell> {
        self.cells.get(i)
    }
    pub fn texts(&self) -> Vec<String> {
        self.cells.iter().map(Cell::to_string).collect()
    }
}

/// Rows in the enumeration order of the matcher. Cells are rendered as the
/// rows are pulled, against the store the projection was evaluated on, and
/// [`Rows::rewind`] starts the sequence over.
#[derive(Debug, Clone)]
pub struct Rows<'s> {
    store: &'s FactStore,
    columns: Vec<Column>,
    names: Vec<String>,
    bindings: Vec<Binding>,
    position: usize,
}
impl Rows<'_> {
    pub fn columns(&self) -> &[String] {
        &self.names
    }
    pub fn rewind(&mut self) {
        self.position = 0;
    }

    fn row(&self, binding: &Binding) -> Row {
        // every column variable was checked to be bound when the rows were made
        let cells = self
            .columns
            .iter()
            .filter_map(|column| binding.get(column.variable()).map(|value| (column.form(), value)))
            .map(|(form, value)| match (form, value) {
                (Form::Value, v) => Cell::Value(v.clone()),
                (Form::Text, Value::Identifier(t)) => Cell::Text(self.iri(*t)),
                (Form::ShortName, Value::Identifier(t)) => Cell::Text(short_name(&self.iri(*t)).to_owned()),
                (_, v) => Cell::Text(v.to_string()),
            })
            .collect();
        Row { cells }
    }

    fn iri(&self, thing: Thing) -> String {
        match self.store.iri(thing) {
            Some(iri) => iri.to_owned(),
            None => format!("#{}", thing),
        }
    }
}
impl Iterator for Rows<'_> {
    type Item = Row;
    fn next(&mut self) -> Option<Row> {
        let binding = self.bindings.get(self.position)?;
        let row = self.row(binding);
        self.position += 1;
        Some(row)
    }
    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = self.bindings.len() - self.position;
        (remaining, Some(remaining))
    }
}
impl ExactSizeIterator for Rows<'_> {}

pub struct Projector<'s> {
    store: &'s FactStore,
}
impl<'s> Projector<'s> {
    pub fn new(store: &'s FactStore) -> Self {
        Self { store }
    }
    pub fn project(&self, projection: &Projection) -> Result<Rows<'s>> {
        let candidates = Matcher::new(self.store).matches(projection.clause(), &Binding::new());
        let (bindings, discarded) = filter::retain(candidates, projection.filter())?;
        debug!(rows = bindings.len(), discarded, "projection evaluated");
        for column in projection.columns() {
            if bindings.iter().any(|b| !b.contains(column.variable())) {
                return Err(OverlapError::UnboundVariable(column.variable().to_owned()));
            }
        }
        Ok(Rows {
            store: self.store,
            columns: projection.columns().to_vec(),
            names: projection.columns().iter().map(|c| c.name().to_owned()).collect(),
            bindings,
            position: 0,
        })
    }
}
