use crate::{
    code::CodeTable,
    error::{Error, Result},
    frequency::FrequencyTable,
    symbol::Symbol,
};
use bitvec::prelude::*;
use std::{
    cmp::{Ordering, Reverse},
    collections::BinaryHeap,
};

/// Node of an encoding tree. Children are owned by their parent.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Node {
    Leaf {
        symbol: Symbol,
        weight: u64,
    },
    Internal {
        weight: u64,
        zero: Box<Node>,
        one: Box<Node>,
    },
}

impl Node {
    /// Symbol of a leaf, `Symbol::NOT_A_SYMBOL` for internal nodes.
    pub fn symbol(&self) -> Symbol {
        match self {
            Node::Leaf { symbol, .. } => *symbol,
            Node::Internal { .. } => Symbol::NOT_A_SYMBOL,
        }
    }

    pub fn weight(&self) -> u64 {
        match self {
            Node::Leaf { weight, .. } | Node::Internal { weight, .. } => *weight,
        }
    }

    pub fn is_leaf(&self) -> bool {
        matches!(self, Node::Leaf { .. })
    }

    /// Zero and one child of an internal node.
    pub fn children(&self) -> Option<(&Node, &Node)> {
        match self {
            Node::Leaf { .. } => None,
            Node::Internal { zero, one, .. } => Some((&**zero, &**one)),
        }
    }

    /// Follows one edge, `None` on leaves.
    pub fn child(&self, bit: bool) -> Option<&Node> {
        let (zero, one) = self.children()?;
        Some(if bit { one } else { zero })
    }

    fn merge(zero: Node, one: Node) -> Self {
        Node::Internal {
            weight: zero.weight().saturating_add(one.weight()),
            zero: zero.into(),
            one: one.into(),
        }
    }

    fn leaf_count(&self) -> usize {
        match self.children() {
            None => 1,
            Some((zero, one)) => zero.leaf_count() + one.leaf_count(),
        }
    }

    fn depth(&self) -> usize {
        match self.children() {
            None => 0,
            Some((zero, one)) => 1 + zero.depth().max(one.depth()),
        }
    }

    fn collect_codes(
        &self,
        prefix: &mut BitVec<u8, Lsb0>,
        codes: &mut Vec<(Symbol, BitVec<u8, Lsb0>)>,
    ) {
        match self {
            Node::Leaf { symbol, .. } => codes.push((*symbol, prefix.clone())),
            Node::Internal { zero, one, .. } => {
                prefix.push(false);
                zero.collect_codes(prefix, codes);
                prefix.pop();
                prefix.push(true);
                one.collect_codes(prefix, codes);
                prefix.pop();
            }
        }
    }
}

/// Queue entry ordered by weight, then by enqueue sequence, so that equal
/// weights leave the queue first-in first-out.
#[derive(Debug)]
struct Queued {
    weight: u64,
    sequence: u64,
    node: Node,
}

impl PartialEq for Queued {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for Queued {}

impl PartialOrd for Queued {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Queued {
    fn cmp(&self, other: &Self) -> Ordering {
        (self.weight, self.sequence).cmp(&(other.weight, other.sequence))
    }
}

#[derive(Default)]
struct Queue {
    heap: BinaryHeap<Reverse<Queued>>,
    sequence: u64,
}

impl Queue {
    fn push(&mut self, node: Node) {
        let entry = Queued {
            weight: node.weight(),
            sequence: self.sequence,
            node,
        };
        self.sequence += 1;
        self.heap.push(Reverse(entry));
    }

    fn pop(&mut self) -> Option<Node> {
        self.heap.pop().map(|Reverse(entry)| entry.node)
    }
}

/// Binary tree built from a frequency table; leaves carry symbols.
///
/// Building twice from equal tables yields equal trees: leaves are queued
/// in ascending symbol order and ties leave the queue in the order they
/// entered it.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct EncodingTree {
    root: Node,
}

impl EncodingTree {
    pub fn new(table: &FrequencyTable) -> Result<Self> {
        let mut queue = Queue::default();
        for (symbol, weight) in table.iter() {
            queue.push(Node::Leaf { symbol, weight });
        }

        let root = loop {
            let zero = queue.pop().ok_or(Error::EmptyTree)?;
            match queue.pop() {
                None => break zero,
                Some(one) => queue.push(Node::merge(zero, one)),
            }
        };
        let tree = EncodingTree { root };
        tracing::debug!(
            symbols = table.len(),
            weight = tree.weight(),
            depth = tree.depth(),
            "built encoding tree"
        );
        Ok(tree)
    }

    pub fn root(&self) -> &Node {
        &self.root
    }

    pub fn weight(&self) -> u64 {
        self.root.weight()
    }

    pub fn is_leaf(&self) -> bool {
        self.root.is_leaf()
    }

    pub fn leaf_count(&self) -> usize {
        self.root.leaf_count()
    }

    /// Length of the longest root-to-leaf path.
    pub fn depth(&self) -> usize {
        self.root.depth()
    }

    /// Bit path of every leaf. A tree that is a single leaf gives it the
    /// empty code.
    pub fn code_table(&self) -> CodeTable {
        let mut codes = Vec::with_capacity(self.leaf_count());
        self.root.collect_codes(&mut BitVec::new(), &mut codes);
        codes
            .into_iter()
            .map(|(symbol, code)| (symbol, code.into_boxed_bitslice()))
            .collect()
    }
}
