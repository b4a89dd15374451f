use std::collections::HashMap;

use log::warn;

use crate::model::item::ActionItem;

/// A forest built from one map's flat item set.
///
/// The forest is an arena over the input slice: nodes are positions into
/// `items`, with root and per-node child index lists ordered by `sort_order`
/// ascending (ties broken by id so the order is deterministic). It is rebuilt
/// freshly from the flat set on every read — no live back-pointers are kept,
/// so it can never drift from the backing collection.
#[derive(Debug)]
pub struct ItemForest<'a> {
    items: &'a [ActionItem],
    roots: Vec<usize>,
    children: Vec<Vec<usize>>,
}

impl<'a> ItemForest<'a> {
    /// Indices of the root items, in sibling order
    pub fn roots(&self) -> &[usize] {
        &self.roots
    }

    /// Child indices of the node at `index`, in sibling order
    pub fn children_of(&self, index: usize) -> &[usize] {
        &self.children[index]
    }

    /// The item at an arena index
    pub fn item(&self, index: usize) -> &'a ActionItem {
        &self.items[index]
    }

    /// Total number of items in the forest
    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Depth-first preorder walk yielding `(depth, item)`, roots first
    pub fn walk(&self) -> Vec<(usize, &'a ActionItem)> {
        let mut out = Vec::with_capacity(self.items.len());
        let mut stack: Vec<(usize, usize)> = Vec::new();
        for &root in self.roots.iter().rev() {
            stack.push((0, root));
        }
        while let Some((depth, index)) = stack.pop() {
            out.push((depth, &self.items[index]));
            for &child in self.children[index].iter().rev() {
                stack.push((depth + 1, child));
            }
        }
        out
    }
}

/// Build the forest for one map's item set.
///
/// An item is a root when its parent id is absent or does not resolve within
/// the set. Cyclic parent chains are corrupt data and must not block reads:
/// every member of a detected cycle is demoted to root, so each item still
/// appears in exactly one place and the walk always terminates.
pub fn build_forest(items: &[ActionItem]) -> ItemForest<'_> {
    let index_of: HashMap<&str, usize> = items
        .iter()
        .enumerate()
        .map(|(i, item)| (item.id.as_str(), i))
        .collect();

    // Resolve parent references; unresolvable ones mean root.
    let mut parent: Vec<Option<usize>> = items
        .iter()
        .map(|item| {
            item.parent_item_id
                .as_deref()
                .and_then(|pid| index_of.get(pid).copied())
        })
        .collect();

    break_cycles(items, &mut parent);

    let mut roots: Vec<usize> = Vec::new();
    let mut children: Vec<Vec<usize>> = vec![Vec::new(); items.len()];
    for (i, p) in parent.iter().enumerate() {
        match p {
            Some(p) => children[*p].push(i),
            None => roots.push(i),
        }
    }

    sort_siblings(items, &mut roots);
    for list in &mut children {
        sort_siblings(items, list);
    }

    ItemForest {
        items,
        roots,
        children,
    }
}

/// `sort_order` ascending, id as the deterministic tiebreak
fn sort_siblings(items: &[ActionItem], indices: &mut [usize]) {
    indices.sort_by(|&a, &b| {
        items[a]
            .sort_order
            .cmp(&items[b].sort_order)
            .then_with(|| items[a].id.cmp(&items[b].id))
    });
}

/// Walk up from every node and cut each detected cycle by demoting all of its
/// members to root. A node that merely points *into* a cycle keeps its parent
/// (the parent is a root afterwards).
fn break_cycles(items: &[ActionItem], parent: &mut [Option<usize>]) {
    #[derive(Clone, Copy, PartialEq)]
    enum Mark {
        Unvisited,
        OnPath,
        Settled,
    }

    let mut mark = vec![Mark::Unvisited; parent.len()];
    let mut path: Vec<usize> = Vec::new();

    for start in 0..parent.len() {
        if mark[start] != Mark::Unvisited {
            continue;
        }
        path.clear();
        let mut current = start;
        loop {
            mark[current] = Mark::OnPath;
            path.push(current);
            match parent[current] {
                None => break,
                Some(p) if mark[p] == Mark::Settled => break,
                Some(p) if mark[p] == Mark::OnPath => {
                    // p closes a cycle: every node from p onward is a member
                    let first = path.iter().position(|&n| n == p).unwrap_or(0);
                    for &member in &path[first..] {
                        warn!(
                            "cyclic parent chain: demoting item {} to root",
                            items[member].id
                        );
                        parent[member] = None;
                    }
                    break;
                }
                Some(p) => current = p,
            }
        }
        for &node in &path {
            mark[node] = Mark::Settled;
        }
    }
}
