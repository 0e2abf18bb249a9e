//! Conjunctive pattern matching against a [`FactStore`].
//!
//! A clause is first split into components that share no variables. Each
//! component is joined with a nested loop over its patterns in listed order:
//! bound variables are substituted into the next pattern, the store answers
//! the now partially constant pattern, and every answer extends the binding
//! unless it contradicts it. The components are then cross-joined, so a clause
//! made of two unconnected halves yields |left| × |right| bindings before any
//! filtering. When the components are contiguous in the clause, which is the
//! case for the overlap rule, the enumeration order equals that of a plain
//! nested loop over all patterns.

use tracing::debug;

use crate::construct::FactStore;
use crate::pattern::{Binding, Clause};

pub struct Matcher<'s> {
    store: &'s FactStore,
}
impl<'s> Matcher<'s> {
    pub fn new(store: &'s FactStore) -> Self {
        Self { store }
    }

    /// All bindings of the clause that extend `initial`, in enumeration order.
    pub fn matches(&self, clause: &Clause, initial: &Binding) -> Vec<Binding> {
        let components = clause.components();
        let mut joined: Vec<Vec<Binding>> = Vec::with_capacity(components.len());
        for component in &components {
            let bindings = self.join(component, initial);
            if bindings.is_empty() {
                debug!(patterns = component.len(), "component without matches");
                return Vec::new();
            }
            joined.push(bindings);
        }
        if joined.len() > 1 {
            let expected: usize = joined.iter().map(Vec::len).product();
            debug!(
                components = joined.len(),
                sizes = ?joined.iter().map(Vec::len).collect::<Vec<_>>(),
                expected,
                "cross-joining components"
            );
        }
        joined
            .into_iter()
            .fold(vec![initial.clone()], |left, right| cross_join(&left, &right))
    }

    /// Nested-loop join over the patterns of one component.
    pub fn join(&self, clause: &Clause, initial: &Binding) -> Vec<Binding> {
        let mut frontier = vec![initial.clone()];
        for pattern in clause.patterns() {
            let mut extended = Vec::new();
            for binding in &frontier {
                let concrete = pattern.substitute(binding);
                for (_fact, substitution) in self.store.match_one(&concrete) {
                    // the substituted pattern keeps only unbound variables,
                    // so a conflict can only come from a repeated variable
                    if let Some(next) = binding.merge(&substitution) {
                        extended.push(next);
                    }
                }
            }
            frontier = extended;
            if frontier.is_empty() {
                break;
            }
        }
        frontier
    }
}

// Every left binding paired with every right binding, left-major.
fn cross_join(left: &[Binding], right: &[Binding]) -> Vec<Binding> {
    let mut product = Vec::with_capacity(left.len() * right.len());
    for l in left {
        for r in right {
            if let Some(merged) = l.merge(r) {
                product.push(merged);
            }
        }
    }
    product
}
