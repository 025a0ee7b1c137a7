// TreeBuilder: roots, dangling parents, cycles, depth truncation, completeness

use hostpulse::tree::{TreeEntity, TreeNode, build_forest, forest_ids, forest_size};

#[derive(Debug, Clone, PartialEq)]
struct Node {
    id: u32,
    parent: Option<u32>,
}

impl TreeEntity for Node {
    fn id(&self) -> u32 {
        self.id
    }

    fn parent_id(&self) -> Option<u32> {
        self.parent
    }
}

fn n(id: u32, parent: u32) -> Node {
    Node {
        id,
        parent: Some(parent),
    }
}

fn sorted(mut ids: Vec<u32>) -> Vec<u32> {
    ids.sort_unstable();
    ids
}

fn assert_invariants(node: &TreeNode<Node>) {
    assert_eq!(node.is_leaf, node.children.is_empty(), "node {}", node.id);
    for child in &node.children {
        assert_eq!(child.depth + 1, node.depth);
        assert_eq!(child.parent_id, Some(node.id));
        assert_invariants(child);
    }
}

#[test]
fn dangling_parent_is_promoted_to_root() {
    let forest = build_forest(&[n(1, 0), n(2, 1), n(3, 99)], 5);
    assert_eq!(forest.iter().map(|t| t.id).collect::<Vec<_>>(), vec![1, 3]);
    assert_eq!(forest[0].children.len(), 1);
    assert_eq!(forest[0].children[0].id, 2);
    assert!(forest[1].is_leaf);
    forest.iter().for_each(assert_invariants);
}

#[test]
fn root_depth_is_max_depth() {
    let forest = build_forest(&[n(1, 0), n(2, 1)], 5);
    assert_eq!(forest[0].depth, 5);
    assert_eq!(forest[0].children[0].depth, 4);
}

#[test]
fn siblings_keep_input_order() {
    let forest = build_forest(&[n(1, 0), n(4, 1), n(2, 1), n(3, 1)], 5);
    let kids: Vec<u32> = forest[0].children.iter().map(|c| c.id).collect();
    assert_eq!(kids, vec![4, 2, 3]);
}

#[test]
fn two_node_cycle_terminates_with_both_nodes_present() {
    let forest = build_forest(&[n(10, 11), n(11, 10)], 5);
    assert_eq!(forest.len(), 1);
    assert_eq!(forest[0].id, 10);
    assert_eq!(forest[0].children[0].id, 11);
    assert!(forest[0].children[0].is_leaf);
    assert_eq!(sorted(forest_ids(&forest)), vec![10, 11]);
}

#[test]
fn cycle_hanging_off_a_real_tree_still_appears() {
    // 3 -> 4 -> 5 -> 3 is closed; 1 -> 2 is a normal tree
    let entities = [n(1, 0), n(2, 1), n(3, 5), n(4, 3), n(5, 4)];
    let forest = build_forest(&entities, 10);
    assert_eq!(sorted(forest_ids(&forest)), vec![1, 2, 3, 4, 5]);
    assert_eq!(forest_size(&forest), entities.len());
    forest.iter().for_each(assert_invariants);
}

#[test]
fn self_parent_is_a_root() {
    let forest = build_forest(&[n(7, 7), n(8, 7)], 5);
    assert_eq!(forest.len(), 1);
    assert_eq!(forest[0].id, 7);
    assert_eq!(forest[0].children[0].id, 8);
}

#[test]
fn no_parent_is_a_root() {
    let forest = build_forest(
        &[Node {
            id: 1,
            parent: None,
        }],
        3,
    );
    assert_eq!(forest.len(), 1);
    assert!(forest[0].is_leaf);
}

#[test]
fn descendants_beyond_max_depth_are_truncated() {
    let chain = [n(1, 0), n(2, 1), n(3, 2), n(4, 3)];
    let forest = build_forest(&chain, 2);
    assert_eq!(forest_ids(&forest), vec![1, 2]);
    let child = &forest[0].children[0];
    assert_eq!(child.depth, 1);
    assert!(child.is_leaf);
}

#[test]
fn zero_depth_is_clamped_to_roots_only() {
    let forest = build_forest(&[n(1, 0), n(2, 1)], 0);
    assert_eq!(forest.len(), 1);
    assert_eq!(forest[0].depth, 1);
    assert!(forest[0].is_leaf);
}

#[test]
fn every_entity_appears_exactly_once_within_depth() {
    let entities: Vec<Node> = (1..=30).map(|i| n(i, i / 3)).collect();
    let forest = build_forest(&entities, 10);
    let ids = forest_ids(&forest);
    assert_eq!(sorted(ids), (1..=30).collect::<Vec<_>>());
    forest.iter().for_each(assert_invariants);
}

#[test]
fn empty_input_builds_empty_forest() {
    let forest = build_forest::<Node>(&[], 5);
    assert!(forest.is_empty());
}
