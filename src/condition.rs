//! The condition tree: a closed tagged sum evaluated either against a
//! decoded record (`matches`) or against a collection's in-memory indexes
//! to produce a candidate identifier set (`evaluate`).

use std::collections::{HashMap, HashSet};

use serde_json::Map;
use serde_json::Value;

use crate::document::stringify;
use crate::index::Index;

/// A boolean predicate tree over a record's fields.
///
/// `True` and `False` are internal-only constants (design notes §9); the
/// S-expression grammar in [`crate::expression`] never produces them.
#[derive(Debug, Clone, PartialEq)]
pub enum Condition {
    And(Vec<Condition>),
    Or(Vec<Condition>),
    Equals { field: String, value: String },
    ById(i64),
    True,
    False,
}

impl Condition {
    pub fn equals(field: impl Into<String>, value: impl Into<String>) -> Condition {
        Condition::Equals {
            field: field.into(),
            value: value.into(),
        }
    }

    /// The union of every field name this condition (and its children)
    /// consults. Used by the planner to validate index coverage before
    /// evaluation.
    pub fn fields(&self) -> HashSet<String> {
        let mut out = HashSet::new();
        self.collect_fields(&mut out);
        out
    }

    fn collect_fields(&self, out: &mut HashSet<String>) {
        match self {
            Condition::And(cs) | Condition::Or(cs) => {
                for c in cs {
                    c.collect_fields(out);
                }
            }
            Condition::Equals { field, .. } => {
                out.insert(field.clone());
            }
            Condition::ById(_) | Condition::True | Condition::False => (),
        }
    }

    /// Evaluate this condition against a decoded record, comparing
    /// stringified field values exactly as they are compared at index
    /// insertion time.
    ///
    /// `And`/`Or` are only ever built with a non-empty child list by the
    /// S-expression grammar (empty `and`/`or` is a parse error, spec.md
    /// §4.5); a caller constructing `Condition::And(vec![])` directly is
    /// off the grammar's guarantees. This follows ordinary vacuous-truth
    /// boolean algebra for that case (empty `And` matches, empty `Or`
    /// doesn't) — [`Condition::evaluate`] cannot do the same for an empty
    /// `And`, since it only has index buckets to draw candidate ids from,
    /// never the full universe of ids in the collection.
    pub fn matches(&self, record: &Map<String, Value>) -> bool {
        match self {
            Condition::And(cs) => cs.iter().all(|c| c.matches(record)),
            Condition::Or(cs) => cs.iter().any(|c| c.matches(record)),
            Condition::Equals { field, value } => record
                .get(field)
                .map(|v| &stringify(v) == value)
                .unwrap_or(false),
            Condition::ById(_) => true,
            Condition::True => true,
            Condition::False => false,
        }
    }

    /// Compute the candidate identifier set by intersecting/unioning
    /// in-memory index buckets. The caller (`Collection::query`) must have
    /// already validated, via [`Condition::fields`], that every field this
    /// tree consults has a matching entry in `indexes` — `Equals` on an
    /// unindexed field yields an empty set here rather than an error.
    pub fn evaluate(&self, indexes: &HashMap<String, Index>) -> HashSet<i64> {
        match self {
            Condition::And(cs) => {
                let mut iter = cs.iter();
                let first = match iter.next() {
                    Some(c) => c.evaluate(indexes),
                    None => return HashSet::new(),
                };
                iter.fold(first, |acc, c| {
                    let next = c.evaluate(indexes);
                    acc.intersection(&next).cloned().collect()
                })
            }
            Condition::Or(cs) => cs.iter().fold(HashSet::new(), |mut acc, c| {
                acc.extend(c.evaluate(indexes));
                acc
            }),
            Condition::Equals { field, value } => match indexes.get(field) {
                Some(index) => index.bucket(value).iter().map(|e| e.id).collect(),
                None => HashSet::new(),
            },
            Condition::ById(id) => {
                let mut set = HashSet::new();
                set.insert(*id);
                set
            }
            Condition::True | Condition::False => HashSet::new(),
        }
    }
}

#[cfg(test)]
#[path = "condition_test.rs"]
mod condition_test;
