// RankSelector: descending order, stable ties, truncation, no input mutation

mod common;

use common::proc_entry;
use hostpulse::models::ProcessEntry;
use hostpulse::ranking::{RankSelector, RankingDimension, top_n};

fn cpu(p: &ProcessEntry) -> f64 {
    p.cpu_percent
}

fn memory(p: &ProcessEntry) -> f64 {
    p.memory_percent
}

fn five_entities() -> Vec<ProcessEntry> {
    [90.0, 10.0, 90.0, 50.0, 30.0]
        .iter()
        .enumerate()
        .map(|(i, c)| proc_entry(i as u32 + 1, None, *c, 0.0))
        .collect()
}

fn pids<T>(ranked: &[hostpulse::ranking::RankedEntity<T>], pid: fn(&T) -> u32) -> Vec<u32> {
    ranked.iter().map(|r| pid(&r.entity)).collect()
}

#[test]
fn top_three_keeps_tied_entities_in_input_order() {
    let entities = five_entities();
    let ranked = top_n(&entities, cpu, 3);
    assert_eq!(pids(&ranked, |p| p.pid), vec![1, 3, 4]);
    assert_eq!(
        ranked.iter().map(|r| r.key).collect::<Vec<_>>(),
        vec![90.0, 90.0, 50.0]
    );
}

#[test]
fn repeated_calls_are_identical_and_leave_input_untouched() {
    let entities = five_entities();
    let before = entities.clone();
    let a = top_n(&entities, cpu, 3);
    let b = top_n(&entities, cpu, 3);
    assert_eq!(a, b);
    assert_eq!(entities, before);
}

#[test]
fn n_larger_than_input_returns_everything_sorted() {
    let entities = five_entities();
    let ranked = top_n(&entities, cpu, 50);
    assert_eq!(ranked.len(), 5);
    assert_eq!(pids(&ranked, |p| p.pid), vec![1, 3, 4, 5, 2]);
    assert!(ranked.windows(2).all(|w| w[0].key >= w[1].key));
}

#[test]
fn empty_input_gives_empty_output() {
    let entities: Vec<ProcessEntry> = vec![];
    assert!(top_n(&entities, cpu, 10).is_empty());
}

#[test]
fn zero_n_gives_empty_output() {
    assert!(top_n(&five_entities(), cpu, 0).is_empty());
}

#[test]
fn nan_keys_rank_last() {
    let mut entities = five_entities();
    entities[0].cpu_percent = f64::NAN;
    let ranked = top_n(&entities, cpu, 5);
    assert_eq!(pids(&ranked, |p| p.pid), vec![3, 4, 5, 2, 1]);
}

#[test]
fn selector_ranks_each_dimension_independently() {
    let mut entities = five_entities();
    for (i, e) in entities.iter_mut().enumerate() {
        e.memory_percent = i as f64;
    }
    let selector = RankSelector::new(
        2,
        vec![
            RankingDimension::new("cpu", cpu),
            RankingDimension::new("memory", memory),
        ],
    );
    let rankings = selector.rank(&entities);
    assert_eq!(rankings.len(), 2);
    assert_eq!(pids(&rankings["cpu"], |p| p.pid), vec![1, 3]);
    assert_eq!(pids(&rankings["memory"], |p| p.pid), vec![5, 4]);
    assert_eq!(
        selector.dimension_names().collect::<Vec<_>>(),
        vec!["cpu", "memory"]
    );
}
