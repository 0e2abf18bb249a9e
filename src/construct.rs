//! The fact store: identities, facts, the keepers that own them and the
//! lookups used to answer single-pattern matches.
//!
//! Identities are plain integers ("things"). Resources (IRIs) and facts are
//! both things, kept one-to-one with their identity in bidirectional maps.
//! Every lookup maps a key to a roaring bitmap of fact things, which gives
//! cheap intersections and an ascending, stable iteration order.

use std::sync::Arc;

// used to keep the one-to-one mapping between facts/resources and their assigned identities
use bimap::BiMap;

// other keepers use HashSet or HashMap
use core::hash::BuildHasherDefault;
use seahash::SeaHasher;
use std::collections::{HashMap, HashSet};
use std::hash::Hash;

// used for internal result sets
use roaring::RoaringTreemap;

// used to print out readable forms of a construct
use std::fmt;

use tracing::trace;

use crate::datatype::Value;
use crate::pattern::{Binding, Pattern};

// ------------- Thing -------------
pub type Thing = u64;

pub type ThingHasher = BuildHasherDefault<SeaHasher>;
pub type OtherHasher = BuildHasherDefault<SeaHasher>;

pub const GENESIS: Thing = 0;

#[derive(Debug)]
pub struct ThingGenerator {
    lower_bound: Thing,
    retained: HashSet<Thing, ThingHasher>,
    released: Vec<Thing>,
}

impl ThingGenerator {
    pub fn new() -> Self {
        Self {
            lower_bound: GENESIS,
            retained: HashSet::<Thing, ThingHasher>::default(),
            released: Vec::new(),
        }
    }
    // Released things are handed out again before new ones are minted,
    // so a fact that is replaced tends to keep its place in the lookups.
    pub fn release(&mut self, t: Thing) {
        if self.retained.remove(&t) {
            self.released.push(t);
        }
    }
    pub fn generate(&mut self) -> Thing {
        match self.released.pop() {
            Some(t) => {
                self.retained.insert(t);
                t
            }
            None => {
                self.lower_bound += 1;
                self.retained.insert(self.lower_bound);
                self.lower_bound
            }
        }
    }
}
impl Default for ThingGenerator {
    fn default() -> Self {
        Self::new()
    }
}

// ------------- Resource -------------
// Resources are named by IRIs. Interning them lets facts hold plain things.
#[derive(Debug, Default)]
pub struct ResourceKeeper {
    kept: BiMap<String, Thing>,
}
impl ResourceKeeper {
    pub fn new() -> Self {
        Self { kept: BiMap::new() }
    }
    pub fn keep(&mut self, iri: &str, generator: &mut ThingGenerator) -> (Thing, bool) {
        match self.kept.get_by_left(iri) {
            Some(thing) => (*thing, true),
            None => {
                let thing = generator.generate();
                self.kept.insert(iri.to_owned(), thing);
                (thing, false)
            }
        }
    }
    pub fn thing(&self, iri: &str) -> Option<Thing> {
        self.kept.get_by_left(iri).copied()
    }
    pub fn iri(&self, thing: Thing) -> Option<&str> {
        self.kept.get_by_right(&thing).map(String::as_str)
    }
}

// ------------- Fact -------------
#[derive(PartialEq, Eq, Hash, Clone, Debug)]
pub struct Fact {
    subject: Thing,
    relation: Thing,
    object: Value,
}
impl Fact {
    pub fn new(subject: Thing, relation: Thing, object: Value) -> Self {
        Self {
            subject,
            relation,
            object,
        }
    }
    pub fn subject(&self) -> Thing {
        self.subject
    }
    pub fn relation(&self) -> Thing {
        self.relation
    }
    pub fn object(&self) -> &Value {
        &self.object
    }
}
impl fmt::Display for Fact {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "[#{}, #{}, {}::<{}>]",
            self.subject,
            self.relation,
            self.object,
            self.object.tag()
        )
    }
}

#[derive(Debug, Default)]
pub struct FactKeeper {
    kept: BiMap<Arc<Fact>, Thing>,
    all: RoaringTreemap,
}
impl FactKeeper {
    pub fn new() -> Self {
        Self {
            kept: BiMap::new(),
            all: RoaringTreemap::new(),
        }
    }
    pub fn keep(&mut self, fact: Fact, thing: Thing) -> Arc<Fact> {
        let keepsake = Arc::new(fact);
        self.kept.insert(Arc::clone(&keepsake), thing);
        self.all.insert(thing);
        keepsake
    }
    pub fn release(&mut self, fact: &Fact) -> Option<(Arc<Fact>, Thing)> {
        let (kept, thing) = self.kept.remove_by_left(fact)?;
        self.all.remove(thing);
        Some((kept, thing))
    }
    pub fn thing(&self, fact: &Fact) -> Option<Thing> {
        self.kept.get_by_left(fact).copied()
    }
    pub fn fact(&self, thing: Thing) -> Option<Arc<Fact>> {
        self.kept.get_by_right(&thing).map(Arc::clone)
    }
    pub fn things(&self) -> &RoaringTreemap {
        &self.all
    }
    pub fn len(&self) -> usize {
        self.kept.len()
    }
    pub fn is_empty(&self) -> bool {
        self.kept.is_empty()
    }
}

// ------------- Lookups -------------
#[derive(Debug)]
pub struct Lookup<K, H = OtherHasher> {
    index: HashMap<K, RoaringTreemap, H>,
}
impl<K: Eq + Hash, H: std::hash::BuildHasher + Default> Lookup<K, H> {
    pub fn new() -> Self {
        Self {
            index: HashMap::<K, RoaringTreemap, H>::default(),
        }
    }
    pub fn insert(&mut self, key: K, thing: Thing) {
        let postings = self.index.entry(key).or_default();
        postings.insert(thing);
    }
    pub fn remove(&mut self, key: &K, thing: Thing) {
        if let Some(postings) = self.index.get_mut(key) {
            postings.remove(thing);
            if postings.is_empty() {
                self.index.remove(key);
            }
        }
    }
    pub fn lookup(&self, key: &K) -> Option<&RoaringTreemap> {
        self.index.get(key)
    }
}
impl<K: Eq + Hash, H: std::hash::BuildHasher + Default> Default for Lookup<K, H> {
    fn default() -> Self {
        Self::new()
    }
}

// ------------- FactStore -------------
// Owns the generator, the keepers and the lookups (similar to database indexes).
#[derive(Debug, Default)]
pub struct FactStore {
    thing_generator: ThingGenerator,
    resource_keeper: ResourceKeeper,
    fact_keeper: FactKeeper,
    subject_to_fact_lookup: Lookup<Thing, ThingHasher>,
    relation_to_fact_lookup: Lookup<Thing, ThingHasher>,
    relation_object_to_fact_lookup: Lookup<(Thing, Value), OtherHasher>,
    generation: u64,
}

impl FactStore {
    pub fn new() -> Self {
        Self::default()
    }
    /// Interns an IRI, creating its identity on first sight.
    pub fn resource(&mut self, iri: &str) -> Thing {
        let (thing, _previously_kept) = self.resource_keeper.keep(iri, &mut self.thing_generator);
        thing
    }
    /// Finds the identity of an IRI without interning it.
    pub fn find(&self, iri: &str) -> Option<Thing> {
        self.resource_keeper.thing(iri)
    }
    pub fn iri(&self, thing: Thing) -> Option<&str> {
        self.resource_keeper.iri(thing)
    }
    /// Adds a fact; returns false when it was already present.
    pub fn insert(&mut self, fact: Fact) -> bool {
        if self.fact_keeper.thing(&fact).is_some() {
            return false;
        }
        let thing = self.thing_generator.generate();
        let kept = self.fact_keeper.keep(fact, thing);
        self.subject_to_fact_lookup.insert(kept.subject(), thing);
        self.relation_to_fact_lookup.insert(kept.relation(), thing);
        self.relation_object_to_fact_lookup
            .insert((kept.relation(), kept.object().clone()), thing);
        self.generation += 1;
        trace!(fact = %kept, thing, "inserted");
        true
    }
    /// Convenience for populating a store from IRIs.
    pub fn add(&mut self, subject: &str, relation: &str, object: Value) -> bool {
        let subject = self.resource(subject);
        let relation = self.resource(relation);
        self.insert(Fact::new(subject, relation, object))
    }
    /// Removes a fact; returns false when it was not present.
    pub fn remove(&mut self, fact: &Fact) -> bool {
        let Some((kept, thing)) = self.fact_keeper.release(fact) else {
            return false;
        };
        self.subject_to_fact_lookup.remove(&kept.subject(), thing);
        self.relation_to_fact_lookup.remove(&kept.relation(), thing);
        self.relation_object_to_fact_lookup
            .remove(&(kept.relation(), kept.object().clone()), thing);
        self.thing_generator.release(thing);
        self.generation += 1;
        trace!(fact = %kept, thing, "removed");
        true
    }
    pub fn contains(&self, fact: &Fact) -> bool {
        self.fact_keeper.thing(fact).is_some()
    }
    pub fn len(&self) -> usize {
        self.fact_keeper.len()
    }
    pub fn is_empty(&self) -> bool {
        self.fact_keeper.is_empty()
    }
    /// Bumped by every effective insert or removal.
    pub fn generation(&self) -> u64 {
        self.generation
    }

    // Narrows down the facts that could match the constant slots of a pattern.
    // Relation (and object) are served by their lookups, a constant subject
    // intersects with the subject lookup, anything else falls back to a full scan.
    fn candidates(&self, pattern: &Pattern) -> RoaringTreemap {
        let subject = pattern.subject().constant();
        let relation = pattern.relation().constant();
        // constant subjects and relations that are not identifiers match nothing
        if subject.is_some_and(|s| s.thing().is_none())
            || relation.is_some_and(|r| r.thing().is_none())
        {
            return RoaringTreemap::new();
        }
        let subject = subject.and_then(Value::thing);
        let relation = relation.and_then(Value::thing);
        let postings = |found: Option<&RoaringTreemap>| found.cloned().unwrap_or_default();
        let mut candidates = match (relation, pattern.object().constant()) {
            (Some(r), Some(o)) => Some(postings(
                self.relation_object_to_fact_lookup.lookup(&(r, o.clone())),
            )),
            (Some(r), None) => Some(postings(self.relation_to_fact_lookup.lookup(&r))),
            (None, _) => None,
        };
        if let Some(s) = subject {
            let by_subject = self.subject_to_fact_lookup.lookup(&s);
            candidates = Some(match (candidates, by_subject) {
                (Some(mut c), Some(b)) => {
                    c &= b;
                    c
                }
                (None, Some(b)) => b.clone(),
                (_, None) => RoaringTreemap::new(),
            });
        }
        candidates.unwrap_or_else(|| self.fact_keeper.things().clone())
    }

    /// Every stored fact fitting the constant slots of the pattern, together with
    /// the substitution it implies for the variable slots. The sequence follows
    /// ascending fact identity, so it is stable until the store is mutated.
    pub fn match_one<'s>(
        &'s self,
        pattern: &'s Pattern,
    ) -> impl Iterator<Item = (Arc<Fact>, Binding)> + 's {
        self.candidates(pattern)
            .into_iter()
            .filter_map(move |thing| {
                let fact = self.fact_keeper.fact(thing)?;
                let substitution = pattern.unify(&fact)?;
                Some((fact, substitution))
            })
    }
}
