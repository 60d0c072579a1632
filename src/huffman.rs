//! Weighted Huffman tree construction and token decoding
//!
//! Trees are built by repeatedly merging the two lightest live nodes until a
//! parent carries the full leaf weight. The order in which the two picks are
//! made differs between the byte alphabet and the transform alphabets, and the
//! tie-breaks must be reproduced exactly for a stream to decode.

use crate::bits::BitReader;
use crate::{CbgError, Result};

/// Pick order used while pairing nodes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TreeVariant {
    /// Both picks scan every live node for the strict minimum weight
    FullScan,
    /// Each pick seeds its minimum with the lowest-index live node, then scans
    /// the rest for a strictly lighter one
    IndexFirst,
}

#[derive(Debug, Clone, Copy)]
enum NodeKind {
    Leaf,
    Parent { left: usize, right: Option<usize> },
}

#[derive(Debug, Clone)]
struct HuffmanNode {
    weight: u32,
    valid: bool,
    kind: NodeKind,
}

/// Binary decode tree; leaves occupy the first `leaf_count` slots
#[derive(Debug, Clone)]
pub struct HuffmanTree {
    nodes: Vec<HuffmanNode>,
    leaf_count: usize,
}

impl HuffmanTree {
    /// Build a tree from a leaf weight table
    ///
    /// Zero weights mark unused symbols. Construction stops once a parent's
    /// weight reaches the sum of all leaf weights.
    pub fn new(weights: &[u32], variant: TreeVariant) -> Result<Self> {
        let mut nodes = Vec::with_capacity(weights.len() * 2);
        let mut root_weight = 0u32;
        for &weight in weights {
            nodes.push(HuffmanNode {
                weight,
                valid: weight != 0,
                kind: NodeKind::Leaf,
            });
            root_weight = root_weight.wrapping_add(weight);
        }

        loop {
            let left = Self::pick(&mut nodes, 0, variant).ok_or_else(|| {
                CbgError::CorruptTree(format!(
                    "no live node left after {} merges",
                    nodes.len() - weights.len()
                ))
            })?;
            let right = Self::pick(&mut nodes, 1, variant);

            let mut weight = nodes[left].weight;
            if let Some(right) = right {
                weight = weight.wrapping_add(nodes[right].weight);
            }

            nodes.push(HuffmanNode {
                weight,
                valid: true,
                kind: NodeKind::Parent { left, right },
            });

            if weight >= root_weight {
                break;
            }
            if right.is_none() {
                return Err(CbgError::CorruptTree(format!(
                    "single live node of weight {weight} below root weight {root_weight}"
                )));
            }
        }

        Ok(Self {
            nodes,
            leaf_count: weights.len(),
        })
    }

    /// Select, invalidate and return the next node to merge
    fn pick(nodes: &mut [HuffmanNode], ordinal: usize, variant: TreeVariant) -> Option<usize> {
        let mut min_weight = u32::MAX;
        let mut chosen = None;
        let mut n = 0;

        if variant == TreeVariant::IndexFirst {
            while n < nodes.len() {
                let node = &nodes[n];
                n += 1;
                if node.valid {
                    min_weight = node.weight;
                    chosen = Some(n - 1);
                    break;
                }
            }
            n = n.max(ordinal + 1);
        }

        for (index, node) in nodes.iter().enumerate().skip(n) {
            if node.valid && node.weight < min_weight {
                min_weight = node.weight;
                chosen = Some(index);
            }
        }

        if let Some(index) = chosen {
            nodes[index].valid = false;
        }
        chosen
    }

    /// Number of leaf symbols
    pub fn leaf_count(&self) -> usize {
        self.leaf_count
    }

    /// Total node count, leaves included
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Walk from the root one bit at a time and return the leaf symbol
    pub fn decode_token(&self, bits: &mut BitReader<'_>) -> Result<usize> {
        let mut index = self.nodes.len() - 1;
        loop {
            let NodeKind::Parent { left, right } = self.nodes[index].kind else {
                return Ok(index);
            };
            index = if bits.get_bit()? {
                right.ok_or_else(|| {
                    CbgError::CorruptTree(format!("node {index} has no right branch"))
                })?
            } else {
                left
            };
        }
    }

    /// Bit path from the root to every reachable leaf (`false` = left)
    pub fn leaf_paths(&self) -> Vec<Option<Vec<bool>>> {
        let mut paths = vec![None; self.leaf_count()];
        let mut stack = vec![(self.nodes.len() - 1, Vec::new())];
        while let Some((index, path)) = stack.pop() {
            match self.nodes[index].kind {
                NodeKind::Leaf => paths[index] = Some(path),
                NodeKind::Parent { left, right } => {
                    if let Some(right) = right {
                        let mut right_path = path.clone();
                        right_path.push(true);
                        stack.push((right, right_path));
                    }
                    let mut left_path = path;
                    left_path.push(false);
                    stack.push((left, left_path));
                }
            }
        }
        paths
    }
}
