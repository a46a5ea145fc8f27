// Copyright 2020 Xavier Gillard
//
// Permission is hereby granted, free of charge, to any person obtaining a copy of
// this software and associated documentation files (the "Software"), to deal in
// the Software without restriction, including without limitation the rights to
// use, copy, modify, merge, publish, distribute, sublicense, and/or sell copies of
// the Software, and to permit persons to whom the Software is furnished to do so,
// subject to the following conditions:
//
// The above copyright notice and this permission notice shall be included in all
// copies or substantial portions of the Software.
//
// THE SOFTWARE IS PROVIDED "AS IS", WITHOUT WARRANTY OF ANY KIND, EXPRESS OR
// IMPLIED, INCLUDING BUT NOT LIMITED TO THE WARRANTIES OF MERCHANTABILITY, FITNESS
// FOR A PARTICULAR PURPOSE AND NONINFRINGEMENT. IN NO EVENT SHALL THE AUTHORS OR
// COPYRIGHT HOLDERS BE LIABLE FOR ANY CLAIM, DAMAGES OR OTHER LIABILITY, WHETHER
// IN AN ACTION OF CONTRACT, TORT OR OTHERWISE, ARISING FROM, OUT OF OR IN
// CONNECTION WITH THE SOFTWARE OR THE USE OR OTHER DEALINGS IN THE SOFTWARE.

//! The RC tree store: two arenas (nodes, edges) indexed by dense integer
//! ids, with free-list reuse and a distinguished root. Cross-references
//! between nodes and edges are ids, never pointers, so there is no
//! ownership cycle to reason about: the arenas alone own the records.

use std::collections::HashMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::Error;
use crate::geometry::Point;

// ----------------------------------------------------------------------------
// --- IDS ----------------------------------------------------------------
// ----------------------------------------------------------------------------
/// The identifier of a node: its position in the tree store's node arena.
#[derive(Debug, Clone, Copy, Eq, PartialEq, Hash, PartialOrd, Ord)]
pub struct NodeId(usize);

/// The identifier of an edge: its position in the tree store's edge arena.
#[derive(Debug, Clone, Copy, Eq, PartialEq, Hash, PartialOrd, Ord)]
pub struct EdgeId(usize);

impl NodeId {
    /// The dense array index backing this id. Exposed crate-internally so
    /// the engine can index a `Vec`-based memo by node id without going
    /// through a hash map (§5: no hashing-iteration-order dependency).
    pub(crate) fn index(self) -> usize {
        self.0
    }
}
impl EdgeId {
    pub(crate) fn index(self) -> usize {
        self.0
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "n{}", self.0)
    }
}
impl fmt::Display for EdgeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "e{}", self.0)
    }
}

// ----------------------------------------------------------------------------
// --- NODE ----------------------------------------------------------------
// ----------------------------------------------------------------------------
/// The kind of a tree node. `Buffer` marks the driver on input and every
/// inserted repeater; `Steiner` is an internal branching point with no
/// electrical parameters of its own; `Point` is a sink leaf.
///
/// The `serde` tags are `spec.md` §6's single-letter node types
/// (`"b"`/`"s"`/`"t"`), not the Rust variant names — an external tree
/// reader/writer needs exactly those bytes on the wire.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash, Serialize, Deserialize)]
pub enum NodeKind {
    #[serde(rename = "b")]
    Buffer,
    #[serde(rename = "s")]
    Steiner,
    #[serde(rename = "t")]
    Point,
}

/// A node of the RC tree. `capacity` and `rat` are only meaningful for
/// `Point` (sink) nodes on input; the engine populates them on newly
/// inserted `Buffer` nodes during materialization (§4.F). They are unused
/// for `Steiner` nodes.
#[derive(Debug, Clone, PartialEq)]
pub struct Node {
    pub kind: NodeKind,
    pub name: String,
    pub p: Point,
    pub capacity: f32,
    pub rat: f32,
}
impl Node {
    pub fn sink(name: impl Into<String>, p: Point, capacity: f32, rat: f32) -> Self {
        Node { kind: NodeKind::Point, name: name.into(), p, capacity, rat }
    }
    pub fn steiner(name: impl Into<String>, p: Point) -> Self {
        Node { kind: NodeKind::Steiner, name: name.into(), p, capacity: 0.0, rat: 0.0 }
    }
    pub fn buffer(name: impl Into<String>, p: Point, capacity: f32, rat: f32) -> Self {
        Node { kind: NodeKind::Buffer, name: name.into(), p, capacity, rat }
    }
}

struct NodeEntry {
    node: Node,
    parent: Option<EdgeId>,
    children: Vec<EdgeId>,
}

// ----------------------------------------------------------------------------
// --- EDGE ----------------------------------------------------------------
// ----------------------------------------------------------------------------
/// A routed polyline of at least two points: the first coincides with the
/// parent node's position, the last with the child's, and each consecutive
/// pair of points shares exactly one coordinate (an axis-aligned Manhattan
/// segment).
#[derive(Debug, Clone, PartialEq)]
pub struct Edge {
    pub segments: Vec<Point>,
}
impl Edge {
    pub fn new(segments: Vec<Point>) -> Self {
        Edge { segments }
    }
    pub fn first(&self) -> Point {
        self.segments[0]
    }
    pub fn last(&self) -> Point {
        *self.segments.last().unwrap()
    }
}

struct EdgeEntry {
    first: NodeId,
    last: NodeId,
    edge: Edge,
}

// ----------------------------------------------------------------------------
// --- RC TREE STORE ---------------------------------------------------------
// ----------------------------------------------------------------------------
/// The arena-backed RC tree: nodes and edges are addressed by dense ids,
/// removed ids are tombstoned into a free list until reused, and exactly
/// one live node is designated root.
#[derive(Default)]
pub struct RcTree {
    nodes: Vec<Option<NodeEntry>>,
    free_nodes: Vec<NodeId>,
    edges: Vec<Option<EdgeEntry>>,
    free_edges: Vec<EdgeId>,
    root: Option<NodeId>,
}

impl RcTree {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a node to the store and returns its freshly minted or recycled
    /// id. The node starts out with no parent and no children.
    pub fn add_node(&mut self, node: Node) -> NodeId {
        let entry = NodeEntry { node, parent: None, children: Vec::new() };
        if let Some(id) = self.free_nodes.pop() {
            self.nodes[id.0] = Some(entry);
            id
        } else {
            let id = NodeId(self.nodes.len());
            self.nodes.push(Some(entry));
            id
        }
    }

    /// Connects `parent -> child` with the given routed polyline, failing
    /// if `parent` already owns an outgoing edge to that same child (§4.B:
    /// "`add_edge` fails if the same parent already has an edge with
    /// identical ordered endpoints").
    pub fn add_edge(&mut self, parent: NodeId, child: NodeId, edge: Edge) -> Result<EdgeId, Error> {
        if self
            .children(parent)
            .iter()
            .any(|&eid| self.edge_endpoints(eid) == (parent, child))
        {
            return Err(Error::Model(format!(
                "duplicate edge {} -> {}",
                parent, child
            )));
        }

        let entry = EdgeEntry { first: parent, last: child, edge };
        let id = if let Some(id) = self.free_edges.pop() {
            self.edges[id.0] = Some(entry);
            id
        } else {
            let id = EdgeId(self.edges.len());
            self.edges.push(Some(entry));
            id
        };

        self.node_entry_mut(parent).children.push(id);
        self.node_entry_mut(child).parent = Some(id);
        Ok(id)
    }

    /// Removes a node, cascading into the removal of its parent edge (if
    /// any) and every one of its outgoing edges.
    pub fn remove_node(&mut self, id: NodeId) {
        if let Some(parent) = self.node_entry(id).parent {
            self.remove_edge(parent);
        }
        let children: Vec<EdgeId> = self.node_entry(id).children.clone();
        for child_edge in children {
            self.remove_edge(child_edge);
        }
        self.nodes[id.0] = None;
        self.free_nodes.push(id);
    }

    /// Removes an edge, unlinking it from both endpoints' bookkeeping.
    pub fn remove_edge(&mut self, id: EdgeId) {
        let (first, last) = self.edge_endpoints(id);
        self.node_entry_mut(first).children.retain(|&e| e != id);
        self.node_entry_mut(last).parent = None;
        self.edges[id.0] = None;
        self.free_edges.push(id);
    }

    pub fn node(&self, id: NodeId) -> &Node {
        &self.node_entry(id).node
    }
    pub fn node_mut(&mut self, id: NodeId) -> &mut Node {
        &mut self.node_entry_mut(id).node
    }
    pub fn edge(&self, id: EdgeId) -> &Edge {
        &self.edge_entry(id).edge
    }
    pub fn edge_mut(&mut self, id: EdgeId) -> &mut Edge {
        &mut self.edge_entry_mut(id).edge
    }
    pub fn edge_endpoints(&self, id: EdgeId) -> (NodeId, NodeId) {
        let e = self.edge_entry(id);
        (e.first, e.last)
    }
    pub fn edge_first_node(&self, id: EdgeId) -> NodeId {
        self.edge_entry(id).first
    }
    pub fn edge_last_node(&self, id: EdgeId) -> NodeId {
        self.edge_entry(id).last
    }
    pub fn parent_edge(&self, id: NodeId) -> Option<EdgeId> {
        self.node_entry(id).parent
    }
    /// The outgoing edges of a node, in the order they were added. This
    /// order is stable and is what both the traversal and the
    /// multi-child merge policy (§4.E.2) iterate over.
    pub fn children(&self, id: NodeId) -> &[EdgeId] {
        &self.node_entry(id).children
    }

    pub fn set_root(&mut self, id: NodeId) {
        self.root = Some(id);
    }
    pub fn root(&self) -> Option<NodeId> {
        self.root
    }

    /// The number of node-id slots ever allocated (including tombstoned
    /// ones), i.e. one past the highest valid [`NodeId`] index. Used to
    /// size dense, `Vec`-based memoization tables.
    pub(crate) fn node_capacity(&self) -> usize {
        self.nodes.len()
    }

    fn node_entry(&self, id: NodeId) -> &NodeEntry {
        self.nodes[id.0].as_ref().expect("use of a removed/invalid NodeId")
    }
    fn node_entry_mut(&mut self, id: NodeId) -> &mut NodeEntry {
        self.nodes[id.0].as_mut().expect("use of a removed/invalid NodeId")
    }
    fn edge_entry(&self, id: EdgeId) -> &EdgeEntry {
        self.edges[id.0].as_ref().expect("use of a removed/invalid EdgeId")
    }
    fn edge_entry_mut(&mut self, id: EdgeId) -> &mut EdgeEntry {
        self.edges[id.0].as_mut().expect("use of a removed/invalid EdgeId")
    }

    /// Every live node id, in arena order. Used only to assign dense JSON
    /// ids on export; tombstoned slots are skipped.
    fn live_node_ids(&self) -> Vec<NodeId> {
        (0..self.nodes.len())
            .filter(|&i| self.nodes[i].is_some())
            .map(NodeId)
            .collect()
    }
    /// Every live edge id, in arena order.
    fn live_edge_ids(&self) -> Vec<EdgeId> {
        (0..self.edges.len())
            .filter(|&i| self.edges[i].is_some())
            .map(EdgeId)
            .collect()
    }

    /// Exports this tree into the wire shape `spec.md` §6 specifies for
    /// the tree JSON: a flat node list (with sink `capacitance`/`rat`, and
    /// the same fields on any `Buffer` node materialization filled in)
    /// and an edge list carrying each edge's sub-polyline. JSON ids are
    /// assigned densely over the live nodes/edges, independent of the
    /// arena's internal (and possibly tombstoned/reused) ids.
    pub fn to_tree_file(&self) -> TreeFile {
        let node_ids = self.live_node_ids();
        let mut json_id: HashMap<NodeId, u32> = HashMap::new();
        let mut node = Vec::with_capacity(node_ids.len());
        for (i, &id) in node_ids.iter().enumerate() {
            let jid = i as u32;
            json_id.insert(id, jid);
            let n = self.node(id);
            let (capacitance, rat) = match n.kind {
                NodeKind::Point | NodeKind::Buffer => (Some(n.capacity), Some(n.rat)),
                NodeKind::Steiner => (None, None),
            };
            node.push(NodeJson {
                id: jid,
                x: n.p.x,
                y: n.p.y,
                kind: n.kind,
                name: n.name.clone(),
                capacitance,
                rat,
            });
        }

        let edge = self
            .live_edge_ids()
            .into_iter()
            .map(|id| {
                let (first, last) = self.edge_endpoints(id);
                EdgeJson {
                    id: Some(id.index() as u32),
                    vertices: [json_id[&first], json_id[&last]],
                    segments: self.edge(id).segments.iter().map(|p| [p.x, p.y]).collect(),
                }
            })
            .collect();

        TreeFile { node, edge }
    }
}

// ----------------------------------------------------------------------------
// --- TREE JSON SHAPE (spec.md §6) -------------------------------------------
// ----------------------------------------------------------------------------
/// One entry of the tree JSON's `"node"` array.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NodeJson {
    pub id: u32,
    pub x: i32,
    pub y: i32,
    #[serde(rename = "type")]
    pub kind: NodeKind,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub capacitance: Option<f32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rat: Option<f32>,
}

/// One entry of the tree JSON's `"edge"` array. `vertices` is `[first,
/// last]` node ids; `segments` is the routed polyline.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EdgeJson {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<u32>,
    pub vertices: [u32; 2],
    pub segments: Vec<[i32; 2]>,
}

/// The full shape of a tree JSON file (input and output share this
/// schema, `spec.md` §6). This is the DTO an external reader/writer
/// serializes with `serde_json`; parsing `argv` and opening the file stay
/// an external caller's job (`spec.md` §1's Non-goals).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TreeFile {
    #[serde(default)]
    pub node: Vec<NodeJson>,
    #[serde(default)]
    pub edge: Vec<EdgeJson>,
}

impl TreeFile {
    /// Builds an [`RcTree`] from this DTO, validating the invariants
    /// `spec.md` §4.B and §6 require: every edge's endpoints reference a
    /// declared node, sink nodes carry `capacitance`/`rat`, and exactly
    /// one `"b"` node is present and becomes the root.
    pub fn into_tree(self) -> Result<RcTree, Error> {
        let mut tree = RcTree::new();
        let mut id_map: HashMap<u32, NodeId> = HashMap::with_capacity(self.node.len());
        let mut root: Option<NodeId> = None;

        for n in &self.node {
            let p = Point::new(n.x, n.y);
            let node = match n.kind {
                NodeKind::Point => {
                    let capacitance = n.capacitance.ok_or_else(|| {
                        Error::Parse(format!("sink node {} is missing \"capacitance\"", n.id))
                    })?;
                    let rat = n
                        .rat
                        .ok_or_else(|| Error::Parse(format!("sink node {} is missing \"rat\"", n.id)))?;
                    Node::sink(n.name.clone(), p, capacitance, rat)
                }
                NodeKind::Steiner => Node::steiner(n.name.clone(), p),
                NodeKind::Buffer => {
                    Node::buffer(n.name.clone(), p, n.capacitance.unwrap_or(0.0), n.rat.unwrap_or(0.0))
                }
            };
            let id = tree.add_node(node);
            if matches!(n.kind, NodeKind::Buffer) {
                if root.is_some() {
                    return Err(Error::Model("more than one \"b\" (buffer/root) node in tree".to_string()));
                }
                root = Some(id);
            }
            if id_map.insert(n.id, id).is_some() {
                return Err(Error::Parse(format!("duplicate node id {}", n.id)));
            }
        }

        for e in &self.edge {
            let lookup = |json_id: u32| {
                id_map
                    .get(&json_id)
                    .copied()
                    .ok_or_else(|| Error::Model(format!("edge references unknown node id {}", json_id)))
            };
            let first = lookup(e.vertices[0])?;
            let last = lookup(e.vertices[1])?;
            let segments = e.segments.iter().map(|&[x, y]| Point::new(x, y)).collect();
            tree.add_edge(first, last, Edge::new(segments))?;
        }

        let root = root.ok_or_else(|| Error::Model("tree has no \"b\" (buffer/root) node".to_string()))?;
        tree.set_root(root);
        Ok(tree)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn leaf(x: i32, y: i32) -> Node {
        Node::sink("t", Point::new(x, y), 1.0, 100.0)
    }

    #[test]
    fn add_node_reuses_freed_ids() {
        let mut t = RcTree::new();
        let a = t.add_node(leaf(0, 0));
        let b = t.add_node(leaf(1, 0));
        t.remove_node(a);
        let c = t.add_node(leaf(2, 0));
        assert_eq!(a, c);
        assert_ne!(a, b);
    }

    #[test]
    fn add_edge_rejects_duplicate_ordered_endpoints() {
        let mut t = RcTree::new();
        let u = t.add_node(Node::steiner("s", Point::new(0, 0)));
        let v = t.add_node(leaf(10, 0));
        t.add_edge(u, v, Edge::new(vec![Point::new(0, 0), Point::new(10, 0)])).unwrap();
        let again = t.add_edge(u, v, Edge::new(vec![Point::new(0, 0), Point::new(10, 0)]));
        assert!(again.is_err());
    }

    #[test]
    fn remove_node_cascades_edges() {
        let mut t = RcTree::new();
        let root = t.add_node(Node::buffer("b", Point::new(0, 0), 0.0, 0.0));
        let s = t.add_node(Node::steiner("s", Point::new(5, 0)));
        let t1 = t.add_node(leaf(5, 5));
        let t2 = t.add_node(leaf(10, 0));
        t.add_edge(root, s, Edge::new(vec![Point::new(0, 0), Point::new(5, 0)])).unwrap();
        t.add_edge(s, t1, Edge::new(vec![Point::new(5, 0), Point::new(5, 5)])).unwrap();
        t.add_edge(s, t2, Edge::new(vec![Point::new(5, 0), Point::new(10, 0)])).unwrap();

        t.remove_node(s);

        assert_eq!(0, t.children(root).len());
        assert!(t.parent_edge(t1).is_none());
        assert!(t.parent_edge(t2).is_none());
    }

    #[test]
    fn children_order_is_stable_insertion_order() {
        let mut t = RcTree::new();
        let root = t.add_node(Node::buffer("b", Point::new(0, 0), 0.0, 0.0));
        let a = t.add_node(leaf(1, 0));
        let b = t.add_node(leaf(2, 0));
        let c = t.add_node(leaf(3, 0));
        let ea = t.add_edge(root, a, Edge::new(vec![Point::new(0, 0), Point::new(1, 0)])).unwrap();
        let eb = t.add_edge(root, b, Edge::new(vec![Point::new(0, 0), Point::new(2, 0)])).unwrap();
        let ec = t.add_edge(root, c, Edge::new(vec![Point::new(0, 0), Point::new(3, 0)])).unwrap();
        assert_eq!(vec![ea, eb, ec], t.children(root).to_vec());
    }

    #[test]
    fn node_kind_json_tags_match_spec_letters() {
        assert_eq!(r#""b""#, serde_json::to_string(&NodeKind::Buffer).unwrap());
        assert_eq!(r#""s""#, serde_json::to_string(&NodeKind::Steiner).unwrap());
        assert_eq!(r#""t""#, serde_json::to_string(&NodeKind::Point).unwrap());
    }

    #[test]
    fn tree_file_round_trips_through_json() {
        // Invariant 6: read -> write yields an equal tree (up to id
        // renumbering, which §6 doesn't pin down across import/export).
        let mut t = RcTree::new();
        let root = t.add_node(Node::buffer("b", Point::new(0, 0), 0.0, 0.0));
        let s = t.add_node(Node::steiner("s", Point::new(5, 0)));
        let t1 = t.add_node(leaf(5, 5));
        let t2 = t.add_node(leaf(10, 0));
        t.add_edge(root, s, Edge::new(vec![Point::new(0, 0), Point::new(5, 0)])).unwrap();
        t.add_edge(s, t1, Edge::new(vec![Point::new(5, 0), Point::new(5, 5)])).unwrap();
        t.add_edge(s, t2, Edge::new(vec![Point::new(5, 0), Point::new(10, 0)])).unwrap();
        t.set_root(root);

        let file = t.to_tree_file();
        let json = serde_json::to_string(&file).unwrap();
        let parsed: TreeFile = serde_json::from_str(&json).unwrap();
        let round_tripped = parsed.into_tree().unwrap();

        assert_eq!(4, round_tripped.live_node_ids().len());
        assert_eq!(3, round_tripped.live_edge_ids().len());
        let new_root = round_tripped.root().unwrap();
        assert_eq!(NodeKind::Buffer, round_tripped.node(new_root).kind);
        assert_eq!(1, round_tripped.children(new_root).len());
    }

    #[test]
    fn into_tree_rejects_missing_root() {
        let file = TreeFile {
            node: vec![NodeJson {
                id: 0,
                x: 0,
                y: 0,
                kind: NodeKind::Steiner,
                name: "s".into(),
                capacitance: None,
                rat: None,
            }],
            edge: vec![],
        };
        assert!(file.into_tree().is_err());
    }

    #[test]
    fn into_tree_rejects_sink_missing_rat() {
        let file = TreeFile {
            node: vec![
                NodeJson { id: 0, x: 0, y: 0, kind: NodeKind::Buffer, name: "b".into(), capacitance: None, rat: None },
                NodeJson { id: 1, x: 10, y: 0, kind: NodeKind::Point, name: "t".into(), capacitance: Some(1.0), rat: None },
            ],
            edge: vec![EdgeJson { id: None, vertices: [0, 1], segments: vec![[0, 0], [10, 0]] }],
        };
        assert!(file.into_tree().is_err());
    }
}
