//! The search structure of a trapezoidal map.
//!
//! This is a rooted DAG whose internal nodes each ask a single geometric question
//! (is the query left or right of a point? above or below a segment?) and whose
//! leaves are trapezoids. Nodes are stored in an arena and refer to each other by
//! index; a node can have several parents because trapezoids that get merged
//! during insertion share a leaf.

use crate::{
    dataset::{PointIdx, SegIdx},
    trapezoid::TrapIdx,
};

/// An index into the node arena of a [`Dag`].
#[derive(Clone, Copy, PartialOrd, Ord, PartialEq, Eq, Hash)]
pub struct NodeIdx(pub usize);

impl NodeIdx {
    /// The root is always the first node.
    pub const ROOT: NodeIdx = NodeIdx(0);
}

impl std::fmt::Debug for NodeIdx {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "n_{}", self.0)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Node {
    /// Splits by the vertical line through `point`. Queries strictly to the left
    /// of it go `left`; everything else goes `right`.
    X {
        point: PointIdx,
        left: NodeIdx,
        right: NodeIdx,
    },
    /// Splits by the line through `segment`.
    Y {
        segment: SegIdx,
        above: NodeIdx,
        below: NodeIdx,
    },
    Leaf(TrapIdx),
}

impl Node {
    pub fn is_leaf(&self) -> bool {
        matches!(self, Node::Leaf(_))
    }

    pub fn children(&self) -> Option<(NodeIdx, NodeIdx)> {
        match *self {
            Node::X { left, right, .. } => Some((left, right)),
            Node::Y { above, below, .. } => Some((above, below)),
            Node::Leaf(_) => None,
        }
    }
}

#[derive(Clone, Debug, Default)]
pub struct Dag {
    nodes: Vec<Node>,
}

impl Dag {
    /// The index of the root. Point location starts here.
    ///
    /// The root never moves: inserting a segment that splits the first
    /// trapezoid overwrites its leaf in place.
    pub fn root(&self) -> NodeIdx {
        NodeIdx::ROOT
    }

    /// The root node itself. Panics if the DAG is empty.
    pub fn root_node(&self) -> &Node {
        self.get(self.root())
    }

    pub fn get(&self, idx: NodeIdx) -> &Node {
        &self.nodes[idx.0]
    }

    pub fn append(&mut self, node: Node) -> NodeIdx {
        self.nodes.push(node);
        NodeIdx(self.nodes.len() - 1)
    }

    pub fn overwrite(&mut self, idx: NodeIdx, node: Node) {
        assert!(idx.0 < self.nodes.len(), "overwriting unallocated {idx:?}");
        self.nodes[idx.0] = node;
    }

    /// Writes `node` to slot `idx`, which must be either allocated already or the
    /// next one to be allocated.
    pub(crate) fn put(&mut self, idx: NodeIdx, node: Node) {
        if idx.0 < self.nodes.len() {
            self.overwrite(idx, node);
        } else {
            let appended = self.append(node);
            assert_eq!(appended, idx, "node slots must be filled in order");
        }
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn clear(&mut self) {
        self.nodes.clear();
    }

    pub fn iter(&self) -> impl Iterator<Item = (NodeIdx, &Node)> {
        self.nodes.iter().enumerate().map(|(i, n)| (NodeIdx(i), n))
    }

    /// The length of the longest root-to-leaf path.
    pub fn depth(&self) -> usize {
        // Nodes can be shared, so memoize.
        let mut memo = vec![None; self.nodes.len()];
        self.depth_from(self.root(), &mut memo)
    }

    fn depth_from(&self, idx: NodeIdx, memo: &mut [Option<usize>]) -> usize {
        if let Some(d) = memo[idx.0] {
            return d;
        }
        let d = match self.get(idx).children() {
            Some((a, b)) => 1 + self.depth_from(a, memo).max(self.depth_from(b, memo)),
            None => 0,
        };
        memo[idx.0] = Some(d);
        d
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    #[test]
    fn arena() {
        let mut dag = Dag::default();
        assert!(dag.is_empty());
        assert_eq!(dag.append(Node::Leaf(TrapIdx(0))), NodeIdx::ROOT);
        let left = dag.append(Node::Leaf(TrapIdx(1)));
        let right = dag.append(Node::Leaf(TrapIdx(0)));
        dag.overwrite(
            NodeIdx::ROOT,
            Node::X {
                point: PointIdx(0),
                left,
                right,
            },
        );

        assert_eq!(dag.len(), 3);
        assert_matches!(dag.root_node(), Node::X { point: PointIdx(0), .. });
        assert_eq!(dag.root_node().children(), Some((left, right)));
        assert!(dag.get(left).is_leaf());
        assert_eq!(dag.depth(), 1);

        dag.clear();
        assert!(dag.is_empty());
    }

    #[test]
    fn put() {
        let mut dag = Dag::default();
        dag.put(NodeIdx(0), Node::Leaf(TrapIdx(0)));
        dag.put(NodeIdx(1), Node::Leaf(TrapIdx(1)));
        dag.put(
            NodeIdx(0),
            Node::Y {
                segment: SegIdx(0),
                above: NodeIdx(1),
                below: NodeIdx(1),
            },
        );
        assert_eq!(dag.len(), 2);
        assert_matches!(dag.get(NodeIdx(0)), Node::Y { .. });
    }

    #[test]
    #[should_panic(expected = "filled in order")]
    fn put_out_of_order() {
        let mut dag = Dag::default();
        dag.put(NodeIdx(2), Node::Leaf(TrapIdx(0)));
    }

    #[test]
    #[should_panic(expected = "overwriting unallocated")]
    fn overwrite_unallocated() {
        let mut dag = Dag::default();
        dag.overwrite(NodeIdx(0), Node::Leaf(TrapIdx(0)));
    }
}
