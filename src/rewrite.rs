//! Conditional delete/insert rules.
//!
//! A rule is evaluated against one view of the store: the guard is matched,
//! the filter prunes the bindings, and the templates are instantiated for
//! every surviving binding into a delete-set and an insert-set. Only then is
//! the store touched, removals first, so nothing inserted during an
//! application can feed back into the same application.
//!
//! When several bindings insert different values into a slot (subject,
//! relation) that the rule also deletes from, the last binding in enumeration
//! order wins and the contest is reported as an [`Ambiguity`].

use std::collections::{HashMap, HashSet};

use tracing::{debug, info, warn};

use crate::construct::{Fact, FactStore, OtherHasher, Thing};
use crate::datatype::Value;
use crate::error::{OverlapError, Result};
use crate::filter::{self, Predicate};
use crate::matcher::Matcher;
use crate::pattern::{Binding, Clause, Pattern};

// ------------- Rule -------------
#[derive(Debug, Clone)]
pub struct Rule {
    name: String,
    guard: Clause,
    filter: Option<Predicate>,
    delete: Vec<Pattern>,
    insert: Vec<Pattern>,
}
impl Rule {
    /// Builds a rule, rejecting filters and templates that use variables the guard never binds.
    pub fn new(
        name: &str,
        guard: Clause,
        filter: Option<Predicate>,
        delete: Vec<Pattern>,
        insert: Vec<Pattern>,
    ) -> Result<Rule> {
        if let Some(predicate) = &filter {
            predicate.check(&guard)?;
        }
        for template in delete.iter().chain(insert.iter()) {
            if let Some(v) = template.variables().find(|v| !guard.binds(v)) {
                return Err(OverlapError::UnboundVariable(v.to_owned()));
            }
        }
        Ok(Rule {
            name: name.to_owned(),
            guard,
            filter,
            delete,
            insert,
        })
    }
    pub fn name(&self) -> &str {
        &self.name
    }
    pub fn guard(&self) -> &Clause {
        &self.guard
    }
    pub fn filter(&self) -> Option<&Predicate> {
        self.filter.as_ref()
    }
    pub fn delete(&self) -> &[Pattern] {
        &self.delete
    }
    pub fn insert(&self) -> &[Pattern] {
        &self.insert
    }
}

// ------------- Outcome -------------
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Ambiguity {
    pub subject: Thing,
    pub relation: Thing,
    /// Distinct competing values, in the order they were first produced.
    pub candidates: Vec<Value>,
    pub chosen: Value,
}

/// What an application of a rule would do, computed without touching the store.
#[derive(Debug, Clone, Default)]
pub struct Plan {
    /// Distinct delete/insert instantiations among the retained bindings.
    pub rewrites: usize,
    pub bindings: Vec<Binding>,
    pub discarded: usize,
    pub delete: Vec<Fact>,
    pub insert: Vec<Fact>,
    pub ambiguities: Vec<Ambiguity>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Rewrite {
    /// Distinct rewrites performed. Bindings that differ only in variables
    /// the templates never mention count once.
    pub rewrites: usize,
    /// Bindings dropped because their comparison mixed types.
    pub discarded: usize,
    pub deleted: usize,
    pub inserted: usize,
    pub ambiguities: Vec<Ambiguity>,
}

// ------------- Engine -------------
pub struct RewriteEngine<'s> {
    store: &'s mut FactStore,
}
impl<'s> RewriteEngine<'s> {
    pub fn new(store: &'s mut FactStore) -> Self {
        Self { store }
    }

    /// Evaluates the rule against the current store without modifying it.
    pub fn plan(store: &FactStore, rule: &Rule) -> Result<Plan> {
        let candidates = Matcher::new(store).matches(rule.guard(), &Binding::new());
        let considered = candidates.len();
        let (bindings, discarded) = filter::retain(candidates, rule.filter())?;
        debug!(rule = rule.name(), considered, retained = bindings.len(), discarded, "guard evaluated");

        let mut delete = Vec::new();
        let mut produced = Vec::new();
        let mut performed: HashSet<(Vec<Fact>, Vec<Fact>), OtherHasher> = HashSet::default();
        for binding in &bindings {
            let removed = instantiate(rule.delete(), binding);
            let added = instantiate(rule.insert(), binding);
            delete.extend(removed.iter().cloned());
            produced.extend(added.iter().cloned());
            performed.insert((removed, added));
        }
        let mut seen: HashSet<Fact, OtherHasher> = HashSet::default();
        let delete: Vec<Fact> = delete.into_iter().filter(|f| seen.insert(f.clone())).collect();
        let replaced: HashSet<(Thing, Thing), OtherHasher> =
            delete.iter().map(|f| (f.subject(), f.relation())).collect();
        let (insert, ambiguities) = resolve_insertions(produced, &replaced);

        Ok(Plan {
            rewrites: performed.len(),
            bindings,
            discarded,
            delete,
            insert,
            ambiguities,
        })
    }

    /// Applies the rule once. All removals and insertions come from one plan.
    pub fn apply(&mut self, rule: &Rule) -> Result<Rewrite> {
        let plan = Self::plan(&*self.store, rule)?;
        for ambiguity in &plan.ambiguities {
            warn!(
                rule = rule.name(),
                subject = ambiguity.subject,
                relation = ambiguity.relation,
                candidates = ambiguity.candidates.len(),
                chosen = %ambiguity.chosen,
                "ambiguous rewrite, last binding wins"
            );
        }
        let mut deleted = 0;
        for fact in &plan.delete {
            if self.store.remove(fact) {
                deleted += 1;
            }
        }
        let mut inserted = 0;
        for fact in plan.insert {
            if self.store.insert(fact) {
                inserted += 1;
            }
        }
        let rewrite = Rewrite {
            rewrites: plan.rewrites,
            discarded: plan.discarded,
            deleted,
            inserted,
            ambiguities: plan.ambiguities,
        };
        info!(
            rule = rule.name(),
            rewrites = rewrite.rewrites,
            deleted,
            inserted,
            generation = self.store.generation(),
            "rule applied"
        );
        Ok(rewrite)
    }

    /// Re-applies the rule until a pass rewrites nothing or `max_passes` is reached.
    /// Returns the outcome of every pass that ran.
    pub fn apply_until_stable(&mut self, rule: &Rule, max_passes: usize) -> Result<Vec<Rewrite>> {
        let mut passes = Vec::new();
        while passes.len() < max_passes {
            let rewrite = self.apply(rule)?;
            let done = rewrite.rewrites == 0;
            passes.push(rewrite);
            if done {
                break;
            }
        }
        if max_passes > 1 && passes.last().is_some_and(|r| r.rewrites > 0) {
            warn!(rule = rule.name(), passes = passes.len(), "rule still rewriting after the last pass");
        }
        Ok(passes)
    }
}

fn instantiate(templates: &[Pattern], binding: &Binding) -> Vec<Fact> {
    let mut facts = Vec::with_capacity(templates.len());
    for template in templates {
        match template.instantiate(binding) {
            Some(fact) => facts.push(fact),
            None => warn!(%template, "template did not yield a fact, subject or relation is not an identifier"),
        }
    }
    facts
}

// Deduplicates the insertions and settles contested slots: for every slot the
// rule deletes from, only the value produced last survives.
fn resolve_insertions(
    produced: Vec<Fact>,
    replaced: &HashSet<(Thing, Thing), OtherHasher>,
) -> (Vec<Fact>, Vec<Ambiguity>) {
    enum Entry {
        Plain(Fact),
        Slot(Thing, Thing),
    }
    let mut order: Vec<Entry> = Vec::new();
    let mut plain: HashSet<Fact, OtherHasher> = HashSet::default();
    let mut slots: HashMap<(Thing, Thing), Vec<Value>, OtherHasher> = HashMap::default();
    for fact in produced {
        let slot = (fact.subject(), fact.relation());
        if replaced.contains(&slot) {
            let values = slots.entry(slot).or_insert_with(|| {
                order.push(Entry::Slot(slot.0, slot.1));
                Vec::new()
            });
            values.push(fact.object().clone());
        } else if plain.insert(fact.clone()) {
            order.push(Entry::Plain(fact));
        }
    }
    let mut insert = Vec::with_capacity(order.len());
    let mut ambiguities = Vec::new();
    for entry in order {
        match entry {
            Entry::Plain(fact) => insert.push(fact),
            Entry::Slot(subject, relation) => {
                let values = slots.remove(&(subject, relation)).unwrap_or_default();
                let Some(chosen) = values.last().cloned() else {
                    continue;
                };
                let mut candidates: Vec<Value> = Vec::new();
                for value in values {
                    if !candidates.contains(&value) {
                        candidates.push(value);
                    }
                }
                if candidates.len() > 1 {
                    ambiguities.push(Ambiguity {
                        subject,
                        relation,
                        candidates,
                        chosen: chosen.clone(),
                    });
                }
                insert.push(Fact::new(subject, relation, chosen));
            }
        }
    }
    (insert, ambiguities)
}
