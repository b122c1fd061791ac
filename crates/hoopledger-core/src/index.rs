// Red-black ordered index of player entries, keyed by full name.
//
// Entries live in an arena and refer to each other by `NodeId`. Rotations
// rewrite ids only; nothing is freed until the whole index is torn down.

use std::cmp::Ordering;
use std::fmt;

use serde::Serialize;
use thiserror::Error;
use tracing::debug;

use crate::leaders::LeaderBoard;
use crate::record::Record;

// ---------------------------------------------------------------------------
// Node types
// ---------------------------------------------------------------------------

/// Red-black node color.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Color {
    Red,
    Black,
}

impl Color {
    pub fn as_str(&self) -> &'static str {
        match self {
            Color::Red => "RED",
            Color::Black => "BLACK",
        }
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Stable handle to an entry inside one `OrderedIndex`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(usize);

/// A player's cumulative line plus its tree links.
#[derive(Debug, Clone)]
pub struct Entry {
    full_name: String,
    season: String,
    team: String,
    rebound: u64,
    assist: u64,
    point: u64,
    color: Color,
    parent: Option<NodeId>,
    left: Option<NodeId>,
    right: Option<NodeId>,
}

impl Entry {
    fn from_record(record: &Record, parent: Option<NodeId>) -> Self {
        Entry {
            full_name: record.full_name.clone(),
            season: record.season.clone(),
            team: record.team.clone(),
            rebound: u64::from(record.rebound),
            assist: u64::from(record.assist),
            point: u64::from(record.point),
            color: Color::Red,
            parent,
            left: None,
            right: None,
        }
    }

    /// Latest season and team win; counting stats accumulate.
    fn merge(&mut self, record: &Record) {
        self.season.clone_from(&record.season);
        self.team.clone_from(&record.team);
        self.rebound += u64::from(record.rebound);
        self.assist += u64::from(record.assist);
        self.point += u64::from(record.point);
    }

    pub fn full_name(&self) -> &str {
        &self.full_name
    }

    /// Most recent season this player appeared in.
    pub fn season(&self) -> &str {
        &self.season
    }

    /// Most recent team this player appeared for.
    pub fn team(&self) -> &str {
        &self.team
    }

    pub fn rebound(&self) -> u64 {
        self.rebound
    }

    pub fn assist(&self) -> u64 {
        self.assist
    }

    pub fn point(&self) -> u64 {
        self.point
    }

    pub fn color(&self) -> Color {
        self.color
    }

    pub fn parent(&self) -> Option<NodeId> {
        self.parent
    }

    pub fn left(&self) -> Option<NodeId> {
        self.left
    }

    pub fn right(&self) -> Option<NodeId> {
        self.right
    }
}

/// Outcome of `OrderedIndex::insert_or_merge`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Upsert {
    Inserted(NodeId),
    Merged(NodeId),
}

impl Upsert {
    pub fn id(self) -> NodeId {
        match self {
            Upsert::Inserted(id) | Upsert::Merged(id) => id,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Side {
    Left,
    Right,
}

// ---------------------------------------------------------------------------
// Invariant checking
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum InvariantViolation {
    #[error("root {name:?} is red")]
    RedRoot { name: String },

    #[error("root {name:?} has a parent link")]
    RootHasParent { name: String },

    #[error("red entry {parent:?} has red child {child:?}")]
    RedRed { parent: String, child: String },

    #[error("black height differs below {name:?}: left {left}, right {right}")]
    BlackHeight {
        name: String,
        left: usize,
        right: usize,
    },

    #[error("key {name:?} is out of order relative to {bound:?}")]
    OutOfOrder { name: String, bound: String },

    #[error("entry {name:?} does not point back to its parent {expected:?}")]
    ParentMismatch { name: String, expected: String },

    #[error("{reachable} entries reachable from the root but {stored} stored")]
    Unreachable { reachable: usize, stored: usize },
}

// ---------------------------------------------------------------------------
// OrderedIndex
// ---------------------------------------------------------------------------

/// Red-black tree of `Entry` values keyed by full name (byte-wise
/// lexicographic order). Entries are never removed individually.
#[derive(Debug, Default)]
pub struct OrderedIndex {
    nodes: Vec<Entry>,
    root: Option<NodeId>,
}

impl OrderedIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of distinct players.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn root(&self) -> Option<NodeId> {
        self.root
    }

    /// Borrow the entry behind `id`.
    ///
    /// Panics if `id` did not come from this index.
    pub fn entry(&self, id: NodeId) -> &Entry {
        &self.nodes[id.0]
    }

    pub fn get(&self, full_name: &str) -> Option<&Entry> {
        let mut current = self.root;
        while let Some(id) = current {
            let entry = &self.nodes[id.0];
            current = match full_name.cmp(entry.full_name.as_str()) {
                Ordering::Equal => return Some(entry),
                Ordering::Less => entry.left,
                Ordering::Greater => entry.right,
            };
        }
        None
    }

    /// Number of links between `id` and the root.
    pub fn depth(&self, id: NodeId) -> usize {
        let mut depth = 0;
        let mut current = self.nodes[id.0].parent;
        while let Some(parent) = current {
            depth += 1;
            current = self.nodes[parent.0].parent;
        }
        depth
    }

    /// Insert a new entry for `record.full_name`, or fold the record into the
    /// existing one. Either way the player's resulting totals are offered to
    /// `leaders`.
    pub fn insert_or_merge(&mut self, record: &Record, leaders: &mut LeaderBoard) -> Upsert {
        let Some(mut current) = self.root else {
            let id = self.push(Entry::from_record(record, None));
            self.nodes[id.0].color = Color::Black;
            self.root = Some(id);
            self.offer_to(leaders, id);
            return Upsert::Inserted(id);
        };

        let side = loop {
            let entry = &self.nodes[current.0];
            let (ordering, left, right) = (
                record.full_name.as_str().cmp(entry.full_name.as_str()),
                entry.left,
                entry.right,
            );
            match ordering {
                Ordering::Equal => {
                    self.nodes[current.0].merge(record);
                    self.offer_to(leaders, current);
                    return Upsert::Merged(current);
                }
                Ordering::Less => match left {
                    Some(next) => current = next,
                    None => break Side::Left,
                },
                Ordering::Greater => match right {
                    Some(next) => current = next,
                    None => break Side::Right,
                },
            }
        };

        let id = self.push(Entry::from_record(record, Some(current)));
        match side {
            Side::Left => self.nodes[current.0].left = Some(id),
            Side::Right => self.nodes[current.0].right = Some(id),
        }
        self.fix_up(id);
        self.offer_to(leaders, id);
        Upsert::Inserted(id)
    }

    fn push(&mut self, entry: Entry) -> NodeId {
        let id = NodeId(self.nodes.len());
        self.nodes.push(entry);
        id
    }

    fn offer_to(&self, leaders: &mut LeaderBoard, id: NodeId) {
        let entry = &self.nodes[id.0];
        leaders.update(&entry.full_name, entry.point, entry.assist, entry.rebound);
    }

    // -- rebalancing --

    fn is_red(&self, id: Option<NodeId>) -> bool {
        id.is_some_and(|id| self.nodes[id.0].color == Color::Red)
    }

    fn set_color(&mut self, id: NodeId, color: Color) {
        self.nodes[id.0].color = color;
    }

    fn child(&self, id: NodeId, side: Side) -> Option<NodeId> {
        match side {
            Side::Left => self.nodes[id.0].left,
            Side::Right => self.nodes[id.0].right,
        }
    }

    fn side_of(&self, child: NodeId, parent: NodeId) -> Side {
        if self.nodes[parent.0].left == Some(child) {
            Side::Left
        } else {
            Side::Right
        }
    }

    /// Repair red-red conflicts after `node` was linked in as a red leaf.
    /// Walks up through parent ids; only rotations touch the links.
    fn fix_up(&mut self, mut node: NodeId) {
        while let Some(parent) = self.nodes[node.0].parent {
            if !self.is_red(Some(parent)) {
                break;
            }
            // A red parent is never the root.
            let Some(grandparent) = self.nodes[parent.0].parent else {
                break;
            };
            let parent_side = self.side_of(parent, grandparent);
            let uncle = match parent_side {
                Side::Left => self.child(grandparent, Side::Right),
                Side::Right => self.child(grandparent, Side::Left),
            };

            if let Some(uncle) = uncle.filter(|&u| self.is_red(Some(u))) {
                self.set_color(parent, Color::Black);
                self.set_color(uncle, Color::Black);
                self.set_color(grandparent, Color::Red);
                node = grandparent;
                continue;
            }

            // Inner grandchild: rotate it into the outer position first.
            let mut top = parent;
            if self.side_of(node, parent) != parent_side {
                match parent_side {
                    Side::Left => self.rotate_left(parent),
                    Side::Right => self.rotate_right(parent),
                }
                top = node;
            }

            match parent_side {
                Side::Left => self.rotate_right(grandparent),
                Side::Right => self.rotate_left(grandparent),
            }
            self.set_color(top, Color::Black);
            self.set_color(grandparent, Color::Red);
            break;
        }

        if let Some(root) = self.root {
            self.set_color(root, Color::Black);
        }
    }

    /// Put `new` where `old` hung from its parent (or at the root).
    fn replace_child(&mut self, old: NodeId, new: NodeId) {
        let parent = self.nodes[old.0].parent;
        self.nodes[new.0].parent = parent;
        match parent {
            None => self.root = Some(new),
            Some(p) => {
                if self.nodes[p.0].left == Some(old) {
                    self.nodes[p.0].left = Some(new);
                } else {
                    self.nodes[p.0].right = Some(new);
                }
            }
        }
    }

    fn rotate_left(&mut self, x: NodeId) {
        let Some(y) = self.nodes[x.0].right else {
            return;
        };
        let inner = self.nodes[y.0].left;
        self.nodes[x.0].right = inner;
        if let Some(inner) = inner {
            self.nodes[inner.0].parent = Some(x);
        }
        self.replace_child(x, y);
        self.nodes[y.0].left = Some(x);
        self.nodes[x.0].parent = Some(y);
    }

    fn rotate_right(&mut self, y: NodeId) {
        let Some(x) = self.nodes[y.0].left else {
            return;
        };
        let inner = self.nodes[x.0].right;
        self.nodes[y.0].left = inner;
        if let Some(inner) = inner {
            self.nodes[inner.0].parent = Some(y);
        }
        self.replace_child(y, x);
        self.nodes[x.0].right = Some(y);
        self.nodes[y.0].parent = Some(x);
    }

    // -- traversal --

    /// Every entry in key order, with its depth below the root.
    pub fn traverse_in_order(&self) -> InOrder<'_> {
        InOrder::new(self)
    }

    /// Entries whose latest season is `season`, in key order. Depths are
    /// still measured in the full tree.
    pub fn traverse_filtered<'a>(&'a self, season: &'a str) -> impl Iterator<Item = Visit<'a>> + 'a {
        self.traverse_in_order()
            .filter(move |visit| visit.entry.season == season)
    }

    /// Children before parents.
    pub fn traverse_post_order(&self) -> PostOrder<'_> {
        PostOrder {
            index: self,
            stack: self.root.map(|root| (root, false)).into_iter().collect(),
        }
    }

    /// Release every entry, walking the tree in post-order. Returns how many
    /// entries were released.
    pub fn teardown(&mut self) -> usize {
        let released = self.traverse_post_order().count();
        debug_assert_eq!(released, self.nodes.len(), "entries unreachable from root");
        self.root = None;
        self.nodes.clear();
        self.nodes.shrink_to_fit();
        debug!(released, "ordered index torn down");
        released
    }

    // -- validation --

    /// Verify ordering, coloring, black-height and parent links. Returns the
    /// black height of the tree (0 for an empty tree).
    pub fn check_invariants(&self) -> Result<usize, InvariantViolation> {
        let Some(root) = self.root else {
            return if self.nodes.is_empty() {
                Ok(0)
            } else {
                Err(InvariantViolation::Unreachable {
                    reachable: 0,
                    stored: self.nodes.len(),
                })
            };
        };

        let root_entry = &self.nodes[root.0];
        if root_entry.parent.is_some() {
            return Err(InvariantViolation::RootHasParent {
                name: root_entry.full_name.clone(),
            });
        }
        if root_entry.color == Color::Red {
            return Err(InvariantViolation::RedRoot {
                name: root_entry.full_name.clone(),
            });
        }

        let mut reachable = 0;
        let height = self.check_subtree(root, None, None, &mut reachable)?;
        if reachable != self.nodes.len() {
            return Err(InvariantViolation::Unreachable {
                reachable,
                stored: self.nodes.len(),
            });
        }
        Ok(height)
    }

    fn check_subtree(
        &self,
        id: NodeId,
        lower: Option<&str>,
        upper: Option<&str>,
        reachable: &mut usize,
    ) -> Result<usize, InvariantViolation> {
        *reachable += 1;
        let entry = &self.nodes[id.0];
        let key = entry.full_name.as_str();

        if let Some(bound) = lower.filter(|&b| key <= b) {
            return Err(InvariantViolation::OutOfOrder {
                name: key.to_string(),
                bound: bound.to_string(),
            });
        }
        if let Some(bound) = upper.filter(|&b| key >= b) {
            return Err(InvariantViolation::OutOfOrder {
                name: key.to_string(),
                bound: bound.to_string(),
            });
        }

        let mut heights = [0usize; 2];
        for (slot, child) in [entry.left, entry.right].into_iter().enumerate() {
            let Some(child) = child else {
                continue;
            };
            let child_entry = &self.nodes[child.0];
            if child_entry.parent != Some(id) {
                return Err(InvariantViolation::ParentMismatch {
                    name: child_entry.full_name.clone(),
                    expected: key.to_string(),
                });
            }
            if entry.color == Color::Red && child_entry.color == Color::Red {
                return Err(InvariantViolation::RedRed {
                    parent: key.to_string(),
                    child: child_entry.full_name.clone(),
                });
            }
            heights[slot] = if slot == 0 {
                self.check_subtree(child, lower, Some(key), reachable)?
            } else {
                self.check_subtree(child, Some(key), upper, reachable)?
            };
        }

        if heights[0] != heights[1] {
            return Err(InvariantViolation::BlackHeight {
                name: key.to_string(),
                left: heights[0],
                right: heights[1],
            });
        }
        Ok(heights[0] + usize::from(entry.color == Color::Black))
    }
}

// ---------------------------------------------------------------------------
// Iterators
// ---------------------------------------------------------------------------

/// An entry reached during traversal.
#[derive(Debug, Clone, Copy)]
pub struct Visit<'a> {
    pub id: NodeId,
    pub depth: usize,
    pub entry: &'a Entry,
}

/// Lazy in-order walk over an explicit stack.
pub struct InOrder<'a> {
    index: &'a OrderedIndex,
    stack: Vec<(NodeId, usize)>,
}

impl<'a> InOrder<'a> {
    fn new(index: &'a OrderedIndex) -> Self {
        let mut walk = InOrder {
            index,
            stack: Vec::new(),
        };
        walk.descend_left(index.root, 0);
        walk
    }

    fn descend_left(&mut self, mut node: Option<NodeId>, mut depth: usize) {
        while let Some(id) = node {
            self.stack.push((id, depth));
            node = self.index.nodes[id.0].left;
            depth += 1;
        }
    }
}

impl<'a> Iterator for InOrder<'a> {
    type Item = Visit<'a>;

    fn next(&mut self) -> Option<Visit<'a>> {
        let (id, depth) = self.stack.pop()?;
        let entry = &self.index.nodes[id.0];
        self.descend_left(entry.right, depth + 1);
        Some(Visit { id, depth, entry })
    }
}

/// Lazy post-order walk; the flag marks nodes whose children are queued.
pub struct PostOrder<'a> {
    index: &'a OrderedIndex,
    stack: Vec<(NodeId, bool)>,
}

impl Iterator for PostOrder<'_> {
    type Item = NodeId;

    fn next(&mut self) -> Option<NodeId> {
        loop {
            let (id, expanded) = self.stack.pop()?;
            if expanded {
                return Some(id);
            }
            self.stack.push((id, true));
            let entry = &self.index.nodes[id.0];
            if let Some(right) = entry.right {
                self.stack.push((right, false));
            }
            if let Some(left) = entry.left {
                self.stack.push((left, false));
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
