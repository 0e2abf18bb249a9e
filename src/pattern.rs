//! Triple patterns, conjunctive clauses and variable bindings.
//!
//! A [`Pattern`] holds a constant or a variable in each slot. Unifying it with
//! a fact yields the substitution for its variables, and instantiating it with
//! a complete [`Binding`] yields a fact again. A [`Clause`] splits into
//! components that share no variables.
//!
//! ```
//! use activity_overlap::construct::Fact;
//! use activity_overlap::datatype::Value;
//! use activity_overlap::pattern::{Pattern, Term};
//! let pattern = Pattern::new(Term::var("e"), 2_u64, Term::var("t"));
//! let fact = Fact::new(1, 2, Value::text("kitchen"));
//! let binding = pattern.unify(&fact).unwrap();
//! assert_eq!(binding.get("t"), Some(&Value::text("kitchen")));
//! assert_eq!(pattern.instantiate(&binding), Some(fact));
//! ```

use std::collections::HashMap;
use std::fmt;

use crate::construct::{Fact, OtherHasher, Thing};
use crate::datatype::Value;

// ------------- Term -------------
// A slot of a pattern: either a constant to match or a variable to bind.
#[derive(Eq, PartialEq, Hash, Clone, Debug)]
pub enum Term {
    Constant(Value),
    Variable(String),
}
impl Term {
    pub fn var(name: &str) -> Term {
        Term::Variable(name.to_owned())
    }
    pub fn constant(&self) -> Option<&Value> {
        match self {
            Term::Constant(v) => Some(v),
            Term::Variable(_) => None,
        }
    }
    pub fn variable(&self) -> Option<&str> {
        match self {
            Term::Variable(name) => Some(name),
            Term::Constant(_) => None,
        }
    }
    // replaces a bound variable with its value, leaves the rest untouched
    pub fn substitute(&self, binding: &Binding) -> Term {
        match self {
            Term::Variable(name) => match binding.get(name) {
                Some(value) => Term::Constant(value.clone()),
                None => self.clone(),
            },
            Term::Constant(_) => self.clone(),
        }
    }
    fn unify(&self, value: &Value, binding: &mut Binding) -> bool {
        match self {
            Term::Constant(c) => c == value,
            Term::Variable(name) => binding.bind(name, value.clone()),
        }
    }
}
impl From<Value> for Term {
    fn from(v: Value) -> Term {
        Term::Constant(v)
    }
}
impl From<Thing> for Term {
    fn from(t: Thing) -> Term {
        Term::Constant(Value::Identifier(t))
    }
}
impl fmt::Display for Term {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Term::Constant(v) => write!(f, "{}", v),
            Term::Variable(name) => write!(f, "?{}", name),
        }
    }
}

// ------------- Pattern -------------
#[derive(Eq, PartialEq, Hash, Clone, Debug)]
pub struct Pattern {
    subject: Term,
    relation: Term,
    object: Term,
}
impl Pattern {
    pub fn new<S: Into<Term>, R: Into<Term>, O: Into<Term>>(subject: S, relation: R, object: O) -> Self {
        Self {
            subject: subject.into(),
            relation: relation.into(),
            object: object.into(),
        }
    }
    pub fn subject(&self) -> &Term {
        &self.subject
    }
    pub fn relation(&self) -> &Term {
        &self.relation
    }
    pub fn object(&self) -> &Term {
        &self.object
    }
    pub fn terms(&self) -> [&Term; 3] {
        [&self.subject, &self.relation, &self.object]
    }
    pub fn variables(&self) -> impl Iterator<Item = &str> {
        self.terms().into_iter().filter_map(Term::variable)
    }
    pub fn substitute(&self, binding: &Binding) -> Pattern {
        Pattern {
            subject: self.subject.substitute(binding),
            relation: self.relation.substitute(binding),
            object: self.object.substitute(binding),
        }
    }
    /// The substitution this pattern implies for a fact, if the fact fits its constant slots.
    /// A variable repeated across slots must take the same value in each.
    pub fn unify(&self, fact: &Fact) -> Option<Binding> {
        let mut binding = Binding::new();
        let fits = self.subject.unify(&Value::Identifier(fact.subject()), &mut binding)
            && self.relation.unify(&Value::Identifier(fact.relation()), &mut binding)
            && self.object.unify(fact.object(), &mut binding);
        fits.then_some(binding)
    }
    /// Turns a fully bound template into a fact. Subject and relation must be identifiers.
    pub fn instantiate(&self, binding: &Binding) -> Option<Fact> {
        let concrete = self.substitute(binding);
        let subject = concrete.subject.constant()?.thing()?;
        let relation = concrete.relation.constant()?.thing()?;
        let object = concrete.object.constant()?.clone();
        Some(Fact::new(subject, relation, object))
    }
}
impl fmt::Display for Pattern {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "({} {} {})", self.subject, self.relation, self.object)
    }
}

// ------------- Clause -------------
// A conjunction of patterns, matched in listed order.
#[derive(Clone, Debug, Default)]
pub struct Clause {
    patterns: Vec<Pattern>,
}
impl Clause {
    pub fn new(patterns: Vec<Pattern>) -> Self {
        Self { patterns }
    }
    pub fn patterns(&self) -> &[Pattern] {
        &self.patterns
    }
    pub fn len(&self) -> usize {
        self.patterns.len()
    }
    pub fn is_empty(&self) -> bool {
        self.patterns.is_empty()
    }
    /// Every variable the clause binds, in order of first appearance.
    pub fn variables(&self) -> Vec<&str> {
        let mut seen = Vec::new();
        for name in self.patterns.iter().flat_map(|p| p.variables()) {
            if !seen.contains(&name) {
                seen.push(name);
            }
        }
        seen
    }
    pub fn binds(&self, name: &str) -> bool {
        self.patterns.iter().flat_map(|p| p.variables()).any(|v| v == name)
    }
    /// Partitions the patterns into groups connected through shared variables.
    /// Groups are ordered by their first pattern and keep listed order internally,
    /// so the groups can be joined independently and then cross-joined.
    pub fn components(&self) -> Vec<Clause> {
        // union-find over pattern positions
        let mut parent: Vec<usize> = (0..self.patterns.len()).collect();
        fn root(parent: &mut Vec<usize>, mut i: usize) -> usize {
            while parent[i] != i {
                parent[i] = parent[parent[i]];
                i = parent[i];
            }
            i
        }
        let mut owner: HashMap<&str, usize, OtherHasher> = HashMap::default();
        for (i, pattern) in self.patterns.iter().enumerate() {
            for name in pattern.variables() {
                match owner.get(name) {
                    Some(&j) => {
                        let (a, b) = (root(&mut parent, i), root(&mut parent, j));
                        // the earlier pattern stays the representative
                        if a < b { parent[b] = a; } else { parent[a] = b; }
                    }
                    None => {
                        owner.insert(name, i);
                    }
                }
            }
        }
        let mut groups: Vec<(usize, Vec<Pattern>)> = Vec::new();
        for (i, pattern) in self.patterns.iter().enumerate() {
            let r = root(&mut parent, i);
            match groups.iter_mut().find(|(g, _)| *g == r) {
                Some((_, patterns)) => patterns.push(pattern.clone()),
                None => groups.push((r, vec![pattern.clone()])),
            }
        }
        groups.into_iter().map(|(_, patterns)| Clause::new(patterns)).collect()
    }
}
impl From<Vec<Pattern>> for Clause {
    fn from(patterns: Vec<Pattern>) -> Clause {
        Clause::new(patterns)
    }
}

// ------------- Binding -------------
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Binding {
    values: HashMap<String, Value, OtherHasher>,
}
impl Binding {
    pub fn new() -> Self {
        Self {
            values: HashMap::default(),
        }
    }
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.values.get(name)
    }
    pub fn contains(&self, name: &str) -> bool {
        self.values.contains_key(name)
    }
    /// Binds a variable, returning false if it is already bound to a different value.
    pub fn bind(&mut self, name: &str, value: Value) -> bool {
        match self.values.get(name) {
            Some(existing) => *existing == value,
            None => {
                self.values.insert(name.to_owned(), value);
                true
            }
        }
    }
    /// Extends this binding with another one, or None on conflict.
    pub fn merge(&self, other: &Binding) -> Option<Binding> {
        let mut merged = self.clone();
        for (name, value) in &other.values {
            if !merged.bind(name, value.clone()) {
                return None;
            }
        }
        Some(merged)
    }
    pub fn len(&self) -> usize {
        self.values.len()
    }
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.values.iter().map(|(k, v)| (k.as_str(), v))
    }
}
impl<'a> FromIterator<(&'a str, Value)> for Binding {
    fn from_iter<I: IntoIterator<Item = (&'a str, Value)>>(iter: I) -> Binding {
        let mut binding = Binding::new();
        for (name, value) in iter {
            binding.bind(name, value);
        }
        binding
    }
}
