//! Boolean predicates over a binding.
//!
//! Comparisons are tag-scoped: values of different tags never compare,
//! neither for ordering nor for equality, and a missing variable is an error
//! rather than a silent false.

use std::cmp::Ordering;
use std::fmt;

use tracing::debug;

use crate::datatype::Value;
use crate::error::{OverlapError, Result};
use crate::pattern::{Binding, Clause};

#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub enum Comparison {
    Less,
    LessOrEqual,
    Greater,
    GreaterOrEqual,
    Equal,
    NotEqual,
}
impl Comparison {
    fn holds(&self, ordering: Ordering) -> bool {
        match self {
            Comparison::Less => ordering == Ordering::Less,
            Comparison::LessOrEqual => ordering != Ordering::Greater,
            Comparison::Greater => ordering == Ordering::Greater,
            Comparison::GreaterOrEqual => ordering != Ordering::Less,
            Comparison::Equal => ordering == Ordering::Equal,
            Comparison::NotEqual => ordering != Ordering::Equal,
        }
    }
    pub fn symbol(&self) -> &'static str {
        match self {
            Comparison::Less => "<",
            Comparison::LessOrEqual => "<=",
            Comparison::Greater => ">",
            Comparison::GreaterOrEqual => ">=",
            Comparison::Equal => "=",
            Comparison::NotEqual => "!=",
        }
    }
}

#[derive(Debug, PartialEq, Eq, Clone)]
pub enum Operand {
    Variable(String),
    Constant(Value),
}
impl Operand {
    fn resolve<'b>(&'b self, binding: &'b Binding) -> Result<&'b Value> {
        match self {
            Operand::Variable(name) => binding
                .get(name)
                .ok_or_else(|| OverlapError::UnboundVariable(name.clone())),
            Operand::Constant(value) => Ok(value),
        }
    }
}
impl fmt::Display for Operand {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Operand::Variable(name) => write!(f, "?{}", name),
            Operand::Constant(value) => write!(f, "{}", value),
        }
    }
}

#[derive(Debug, PartialEq, Eq, Clone)]
pub enum Predicate {
    Compare {
        left: Operand,
        comparison: Comparison,
        right: Operand,
    },
    And(Vec<Predicate>),
}
impl Predicate {
    pub fn compare(left: Operand, comparison: Comparison, right: Operand) -> Predicate {
        Predicate::Compare { left, comparison, right }
    }
    // shorthand for the common variable-to-variable comparison
    pub fn vars(left: &str, comparison: Comparison, right: &str) -> Predicate {
        Predicate::compare(
            Operand::Variable(left.to_owned()),
            comparison,
            Operand::Variable(right.to_owned()),
        )
    }
    pub fn and(predicates: Vec<Predicate>) -> Predicate {
        Predicate::And(predicates)
    }
    pub fn variables(&self) -> Vec<&str> {
        match self {
            Predicate::Compare { left, right, .. } => [left, right]
                .into_iter()
                .filter_map(|o| match o {
                    Operand::Variable(name) => Some(name.as_str()),
                    Operand::Constant(_) => None,
                })
                .collect(),
            Predicate::And(predicates) => predicates.iter().flat_map(|p| p.variables()).collect(),
        }
    }
    /// Fails with `UnboundVariable` for the first variable the clause never binds.
    pub fn check(&self, clause: &Clause) -> Result<()> {
        match self.variables().into_iter().find(|v| !clause.binds(v)) {
            Some(v) => Err(OverlapError::UnboundVariable(v.to_owned())),
            None => Ok(()),
        }
    }
}
impl fmt::Display for Predicate {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Predicate::Compare { left, comparison, right } => {
                write!(f, "{} {} {}", left, comparison.symbol(), right)
            }
            Predicate::And(predicates) => {
                let parts: Vec<String> = predicates.iter().map(|p| format!("({})", p)).collect();
                write!(f, "{}", parts.join(" && "))
            }
        }
    }
}

/// Evaluates a predicate against a binding. A conjunction short-circuits on
/// the first false operand, so later operands are not type checked.
pub fn evaluate(predicate: &Predicate, binding: &Binding) -> Result<bool> {
    match predicate {
        Predicate::Compare { left, comparison, right } => {
            let ordering = left.resolve(binding)?.compare(right.resolve(binding)?)?;
            Ok(comparison.holds(ordering))
        }
        Predicate::And(predicates) => {
            for p in predicates {
                if !evaluate(p, binding)? {
                    return Ok(false);
                }
            }
            Ok(true)
        }
    }
}

/// Keeps the bindings that satisfy the predicate, in their original order.
/// Bindings whose comparison mixes tags are dropped and counted; any other
/// failure aborts.
pub fn retain(bindings: Vec<Binding>, predicate: Option<&Predicate>) -> Result<(Vec<Binding>, usize)> {
    let Some(predicate) = predicate else {
        return Ok((bindings, 0));
    };
    let mut retained = Vec::with_capacity(bindings.len());
    let mut discarded = 0;
    for binding in bindings {
        match evaluate(predicate, &binding) {
            Ok(true) => retained.push(binding),
            Ok(false) => (),
            Err(OverlapError::TypeMismatch { left, right }) => {
                debug!(left, right, "discarding binding with mismatched types");
                discarded += 1;
            }
            Err(e) => return Err(e),
        }
    }
    Ok((retained, discarded))
}
