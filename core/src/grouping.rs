//! Combining clause predicates into the WHERE tree.
//!
//! Clauses are built first and grouped afterwards, so a clause that produced nothing never shifts
//! the combination of its neighbours nor counts toward the mixed-group tie-break.
use serde::{Deserialize, Serialize};
use sieveql::plan::Predicate;
use sieveql::Clause;
use tracing::debug;

/// Surviving columns of one raw filter value. Its predicates OR together; the unit joins the
/// preceding one with AND, or with OR when `combine_with_or` is set.
#[derive(Debug, Clone, PartialEq)]
pub struct ClauseUnit {
    pub predicates: Vec<Predicate>,
    pub combine_with_or: bool,
}

/// Conjunction of OR-terms.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PredicateGroup {
    terms: Vec<Vec<Predicate>>,
}

impl PredicateGroup {
    pub fn new() -> Self { Self::default() }

    /// An OR unit extends the last term; otherwise the unit starts a new one.
    pub fn push(mut self, unit: ClauseUnit) -> Self {
        if unit.predicates.is_empty() {
            return self;
        }
        match self.terms.last_mut() {
            Some(term) if unit.combine_with_or => term.extend(unit.predicates),
            _ => self.terms.push(unit.predicates),
        }
        self
    }

    /// Number of predicates pushed so far.
    pub fn len(&self) -> usize { self.terms.iter().map(Vec::len).sum() }

    pub fn is_empty(&self) -> bool { self.terms.is_empty() }

    pub fn into_predicate(self) -> Predicate { Predicate::and(self.terms.into_iter().map(Predicate::or).collect()) }
}

/// How a request's `filter` and `or` groups combine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum GroupingPolicy {
    /// With a non-empty filter group and more than one `or` clause, every clause is ANDed flat.
    #[default]
    FlattenMixed,
    /// `(filter group) AND (or group)`, each with its own combination modes.
    Nested,
}

impl GroupingPolicy {
    /// Takes the number of clauses in each group that produced a predicate.
    pub fn flattens(self, filter: usize, or: usize) -> bool { self == GroupingPolicy::FlattenMixed && filter > 0 && or > 1 }
}

/// Builds every clause through `build` and folds consecutive columns of one raw value into units.
/// Units left without a predicate are dropped.
pub fn units<E, F>(clauses: &[Clause], build: &mut F) -> Result<Vec<ClauseUnit>, E>
where F: FnMut(&Clause) -> Result<Option<Predicate>, E> {
    let mut units: Vec<ClauseUnit> = Vec::new();
    let mut open: Option<ClauseUnit> = None;
    for clause in clauses {
        let predicate = build(clause)?;
        if !clause.alternative || open.is_none() {
            units.extend(open.take().filter(|u| !u.predicates.is_empty()));
            open = Some(ClauseUnit { predicates: Vec::new(), combine_with_or: clause.combine_with_or });
        }
        if let (Some(unit), Some(predicate)) = (open.as_mut(), predicate) {
            unit.predicates.push(predicate);
        }
    }
    units.extend(open.filter(|u| !u.predicates.is_empty()));
    Ok(units)
}

/// Assembles the filter predicate. `build` turns one clause into its predicate and may fail only on schema errors.
pub fn assemble<E, F>(filter: &[Clause], or: &[Clause], policy: GroupingPolicy, mut build: F) -> Result<Predicate, E>
where F: FnMut(&Clause) -> Result<Option<Predicate>, E> {
    let filter = units(filter, &mut build)?;
    let or = units(or, &mut build)?;
    let count = |units: &[ClauseUnit]| units.iter().map(|u| u.predicates.len()).sum::<usize>();

    if policy.flattens(count(&filter), count(&or)) {
        debug!("flattening {} filter and {} or predicates into one conjunction", count(&filter), count(&or));
        return Ok(Predicate::and(filter.into_iter().chain(or).flat_map(|u| u.predicates).collect()));
    }

    let filter_group = filter.into_iter().fold(PredicateGroup::new(), PredicateGroup::push);
    let or_group = or.into_iter().fold(PredicateGroup::new(), PredicateGroup::push);
    Ok(Predicate::and(vec![filter_group.into_predicate(), or_group.into_predicate()]))
}
