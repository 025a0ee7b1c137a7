// Forest reconstruction from flat parent-pointer records

use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};

/// Anything carrying a self id and an optional parent id.
pub trait TreeEntity {
    fn id(&self) -> u32;
    fn parent_id(&self) -> Option<u32>;
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TreeNode<T> {
    pub id: u32,
    pub parent_id: Option<u32>,
    pub payload: T,
    pub children: Vec<TreeNode<T>>,
    /// Roots carry the configured max depth; each level below is one less.
    pub depth: usize,
    pub is_leaf: bool,
}

impl<T> TreeNode<T> {
    /// Number of nodes in this subtree, self included.
    pub fn size(&self) -> usize {
        1 + self.children.iter().map(TreeNode::size).sum::<usize>()
    }

    pub fn visit<'a>(&'a self, f: &mut impl FnMut(&'a TreeNode<T>)) {
        f(self);
        for child in &self.children {
            child.visit(f);
        }
    }
}

/// Every id in the forest, depth first.
pub fn forest_ids<T>(forest: &[TreeNode<T>]) -> Vec<u32> {
    let mut ids = Vec::new();
    for root in forest {
        root.visit(&mut |n| ids.push(n.id));
    }
    ids
}

pub fn forest_size<T>(forest: &[TreeNode<T>]) -> usize {
    forest.iter().map(TreeNode::size).sum()
}

struct Builder<'a, T> {
    entities: &'a [T],
    children: HashMap<u32, Vec<usize>>,
    attached: Vec<bool>,
}

impl<T: TreeEntity + Clone> Builder<'_, T> {
    fn node(&mut self, idx: usize, depth: usize, chain: &mut Vec<u32>) -> TreeNode<T> {
        self.attached[idx] = true;
        let entity = &self.entities[idx];
        let id = entity.id();
        chain.push(id);

        let mut children = Vec::new();
        if depth > 1 {
            let candidates = self.children.get(&id).cloned().unwrap_or_default();
            for child in candidates {
                if self.attached[child] || chain.contains(&self.entities[child].id()) {
                    continue;
                }
                children.push(self.node(child, depth - 1, chain));
            }
        }

        chain.pop();
        TreeNode {
            id,
            parent_id: entity.parent_id(),
            payload: entity.clone(),
            is_leaf: children.is_empty(),
            children,
            depth,
        }
    }
}

/// Descendants of `idx` reachable through parent links, ignoring depth.
fn mark_reachable<T: TreeEntity>(
    entities: &[T],
    children: &HashMap<u32, Vec<usize>>,
    idx: usize,
    reachable: &mut [bool],
) {
    let mut stack = vec![idx];
    while let Some(i) = stack.pop() {
        if reachable[i] {
            continue;
        }
        reachable[i] = true;
        if let Some(kids) = children.get(&entities[i].id()) {
            stack.extend(kids.iter().copied().filter(|&k| !reachable[k]));
        }
    }
}

/// Builds one tree per root, `max_depth` levels deep (clamped to at least 1).
///
/// Roots are entities without a parent, with a parent id not present in the
/// set, or parented to themselves. Entities left unreachable after that (closed
/// cycles) become roots in input order. A branch stops at any id already on its
/// ancestor chain, and each entity is attached at most once. Siblings keep
/// input order. Entities deeper than `max_depth` are left out.
pub fn build_forest<T: TreeEntity + Clone>(entities: &[T], max_depth: usize) -> Vec<TreeNode<T>> {
    let max_depth = max_depth.max(1);
    let ids: HashSet<u32> = entities.iter().map(TreeEntity::id).collect();

    let mut children: HashMap<u32, Vec<usize>> = HashMap::new();
    let mut roots = Vec::new();
    for (i, e) in entities.iter().enumerate() {
        match e.parent_id() {
            Some(parent) if parent != e.id() && ids.contains(&parent) => {
                children.entry(parent).or_default().push(i);
            }
            _ => roots.push(i),
        }
    }

    let mut reachable = vec![false; entities.len()];
    for &r in &roots {
        mark_reachable(entities, &children, r, &mut reachable);
    }
    for i in 0..entities.len() {
        if !reachable[i] {
            roots.push(i);
            mark_reachable(entities, &children, i, &mut reachable);
        }
    }
    roots.sort_unstable();

    let mut builder = Builder {
        entities,
        children,
        attached: vec![false; entities.len()],
    };
    let mut chain = Vec::with_capacity(max_depth);
    let mut forest = Vec::with_capacity(roots.len());
    for r in roots {
        if builder.attached[r] {
            continue;
        }
        forest.push(builder.node(r, max_depth, &mut chain));
    }
    forest
}
