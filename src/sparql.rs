//! SPARQL 1.1 text for rules and projections.
//!
//! A remote graph store receives a rule as a single `DELETE … INSERT … WHERE`
//! update, which the store executes as one transaction, and a projection as a
//! single `SELECT`. Identities are turned back into IRIs through the store's
//! resource keeper and abbreviated with the activity and XSD prefixes.

use std::fmt::Write;

use crate::activity::{ACTIVITY_NS, RDF_TYPE, XSD_NS};
use crate::construct::{FactStore, Thing};
use crate::datatype::Value;
use crate::error::{OverlapError, Result};
use crate::filter::{Operand, Predicate};
use crate::pattern::{Pattern, Term};
use crate::project::{Form, Projection};
use crate::rewrite::Rule;

fn prologue() -> String {
    format!("PREFIX ac: <{}>\nPREFIX xsd: <{}>\n", ACTIVITY_NS, XSD_NS)
}

fn resource(store: &FactStore, thing: Thing) -> Result<String> {
    let iri = store
        .iri(thing)
        .ok_or_else(|| OverlapError::Invariant(format!("thing {} has no IRI", thing)))?;
    Ok(if iri == RDF_TYPE {
        "a".to_owned()
    } else if let Some(local) = iri.strip_prefix(ACTIVITY_NS) {
        format!("ac:{}", local)
    } else {
        format!("<{}>", iri)
    })
}

// ECHAR escapes of a SPARQL string literal
fn escape(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '\\' => escaped.push_str("\\\\"),
            '"' => escaped.push_str("\\\""),
            '\n' => escaped.push_str("\\n"),
            '\r' => escaped.push_str("\\r"),
            '\t' => escaped.push_str("\\t"),
            c => escaped.push(c),
        }
    }
    escaped
}

fn literal(store: &FactStore, value: &Value) -> Result<String> {
    Ok(match value {
        Value::Identifier(thing) => resource(store, *thing)?,
        Value::Text(s) => format!("\"{}\"", escape(s)),
        Value::Timestamp(_) | Value::Number(_) => format!("\"{}\"^^{}", value, value.xsd()),
    })
}

fn term(store: &FactStore, term: &Term) -> Result<String> {
    match term {
        Term::Variable(name) => Ok(format!("?{}", name)),
        Term::Constant(value) => literal(store, value),
    }
}

fn triples(store: &FactStore, patterns: &[Pattern], out: &mut String) -> Result<()> {
    for pattern in patterns {
        let [s, r, o] = pattern.terms();
        writeln!(out, "    {} {} {} .", term(store, s)?, term(store, r)?, term(store, o)?)
            .map_err(|e| OverlapError::Invariant(e.to_string()))?;
    }
    Ok(())
}

fn operand(store: &FactStore, operand: &Operand) -> Result<String> {
    match operand {
        Operand::Variable(name) => Ok(format!("?{}", name)),
        Operand::Constant(value) => literal(store, value),
    }
}

fn expression(store: &FactStore, predicate: &Predicate) -> Result<String> {
    match predicate {
        Predicate::Compare { left, comparison, right } => Ok(format!(
            "{} {} {}",
            operand(store, left)?,
            comparison.symbol(),
            operand(store, right)?
        )),
        Predicate::And(predicates) => {
            let parts = predicates
                .iter()
                .map(|p| expression(store, p).map(|e| format!("({})", e)))
                .collect::<Result<Vec<String>>>()?;
            Ok(parts.join(" && "))
        }
    }
}

fn filter(store: &FactStore, predicate: Option<&Predicate>, out: &mut String) -> Result<()> {
    if let Some(predicate) = predicate {
        out.push_str(&format!("    FILTER ({})\n", expression(store, predicate)?));
    }
    Ok(())
}

/// The rule as one SPARQL update request.
pub fn render_update(rule: &Rule, store: &FactStore) -> Result<String> {
    let mut out = prologue();
    out.push_str("DELETE {\n");
    triples(store, rule.delete(), &mut out)?;
    out.push_str("}\nINSERT {\n");
    triples(store, rule.insert(), &mut out)?;
    out.push_str("} WHERE {\n");
    triples(store, rule.guard().patterns(), &mut out)?;
    filter(store, rule.filter(), &mut out)?;
    out.push_str("}\n");
    Ok(out)
}

/// The projection as one SPARQL select query. Text columns use `str()`;
/// short names are left to the client since SPARQL has no local-name function.
pub fn render_select(projection: &Projection, store: &FactStore) -> Result<String> {
    let mut out = prologue();
    let columns: Vec<String> = projection
        .columns()
        .iter()
        .map(|c| match c.form() {
            Form::Text => format!("(str(?{}) AS ?{})", c.variable(), c.name()),
            Form::Value | Form::ShortName if c.name() == c.variable() => format!("?{}", c.name()),
            Form::Value | Form::ShortName => format!("(?{} AS ?{})", c.variable(), c.name()),
        })
        .collect();
    out.push_str(&format!("SELECT {}\nWHERE {{\n", columns.join(" ")));
    triples(store, projection.clause().patterns(), &mut out)?;
    filter(store, projection.filter(), &mut out)?;
    out.push_str("}\n");
    Ok(out)
}
