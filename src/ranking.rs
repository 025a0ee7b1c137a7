// Top-N selection across independent ranking dimensions

use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::collections::BTreeMap;

/// An entity paired with the key it was ranked by.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RankedEntity<T> {
    pub key: f64,
    pub entity: T,
}

/// Named key function, e.g. "cpu" -> process cpu percent.
pub struct RankingDimension<T> {
    pub name: &'static str,
    pub key: fn(&T) -> f64,
}

impl<T> Clone for RankingDimension<T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T> Copy for RankingDimension<T> {}

impl<T> std::fmt::Debug for RankingDimension<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RankingDimension")
            .field("name", &self.name)
            .finish()
    }
}

impl<T> RankingDimension<T> {
    pub const fn new(name: &'static str, key: fn(&T) -> f64) -> Self {
        Self { name, key }
    }
}

/// Descending by key, NaN last.
fn descending(a: f64, b: f64) -> Ordering {
    match (a.is_nan(), b.is_nan()) {
        (true, true) => Ordering::Equal,
        (true, false) => Ordering::Greater,
        (false, true) => Ordering::Less,
        (false, false) => b.partial_cmp(&a).unwrap_or(Ordering::Equal),
    }
}

/// At most `n` entities by `key` descending. Ties keep input order; `entities` is not reordered.
pub fn top_n<T, F>(entities: &[T], key: F, n: usize) -> Vec<RankedEntity<T>>
where
    T: Clone,
    F: Fn(&T) -> f64,
{
    let mut keyed: Vec<(usize, f64)> = entities
        .iter()
        .enumerate()
        .map(|(i, e)| (i, key(e)))
        .collect();
    // sort_by is stable, so equal keys stay in discovery order
    keyed.sort_by(|a, b| descending(a.1, b.1));
    keyed
        .into_iter()
        .take(n)
        .map(|(i, key)| RankedEntity {
            key,
            entity: entities[i].clone(),
        })
        .collect()
}

#[derive(Debug, Clone)]
pub struct RankSelector<T> {
    n: usize,
    dimensions: Vec<RankingDimension<T>>,
}

impl<T: Clone> RankSelector<T> {
    pub fn new(n: usize, dimensions: Vec<RankingDimension<T>>) -> Self {
        Self { n, dimensions }
    }

    pub fn n(&self) -> usize {
        self.n
    }

    pub fn dimension_names(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.dimensions.iter().map(|d| d.name)
    }

    pub fn rank(&self, entities: &[T]) -> BTreeMap<String, Vec<RankedEntity<T>>> {
        self.dimensions
            .iter()
            .map(|d| (d.name.to_string(), top_n(entities, d.key, self.n)))
            .collect()
    }
}
