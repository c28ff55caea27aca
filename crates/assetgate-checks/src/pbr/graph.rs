//! Shader-graph structural analysis.
//!
//! The graph arrives as plain node/link data from the capability interface;
//! orphan detection and cycle detection run here so the engine does not trust
//! the authoring tool's own judgment.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// One node in a material's shading graph.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShaderNode {
    /// Node name, unique within the graph.
    pub name: String,
    /// True for image-texture nodes.
    pub is_image_texture: bool,
}

/// A directed link between two nodes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NodeLink {
    /// Source node name.
    pub from_node: String,
    /// Destination node name.
    pub to_node: String,
}

/// A material's shading graph structure.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ShaderGraph {
    /// All nodes in the graph.
    pub nodes: Vec<ShaderNode>,
    /// All directed links.
    pub links: Vec<NodeLink>,
}

impl ShaderGraph {
    /// Counts image-texture nodes with no outgoing link at all.
    pub fn orphan_image_node_count(&self) -> usize {
        self.nodes
            .iter()
            .filter(|n| n.is_image_texture)
            .filter(|n| !self.links.iter().any(|l| l.from_node == n.name))
            .count()
    }

    /// Detects a directed cycle with an iterative depth-first search.
    ///
    /// Uses an explicit stack with visited and on-stack markers so stack
    /// usage stays bounded for arbitrarily large graphs; a back-edge to a
    /// node currently on the stack is a cycle.
    pub fn has_cycles(&self) -> bool {
        let index: HashMap<&str, usize> = self
            .nodes
            .iter()
            .enumerate()
            .map(|(i, n)| (n.name.as_str(), i))
            .collect();

        let mut successors: Vec<Vec<usize>> = vec![Vec::new(); self.nodes.len()];
        for link in &self.links {
            if let (Some(&from), Some(&to)) = (
                index.get(link.from_node.as_str()),
                index.get(link.to_node.as_str()),
            ) {
                successors[from].push(to);
            }
        }

        const UNVISITED: u8 = 0;
        const ON_STACK: u8 = 1;
        const DONE: u8 = 2;
        let mut state = vec![UNVISITED; self.nodes.len()];

        for start in 0..self.nodes.len() {
            if state[start] != UNVISITED {
                continue;
            }
            let mut stack: Vec<(usize, usize)> = vec![(start, 0)];
            state[start] = ON_STACK;

            while let Some(frame) = stack.last_mut() {
                let (node, child) = *frame;
                frame.1 += 1;
                match successors[node].get(child) {
                    Some(&succ) => match state[succ] {
                        UNVISITED => {
                            state[succ] = ON_STACK;
                            stack.push((succ, 0));
                        }
                        ON_STACK => return true,
                        _ => {}
                    },
                    None => {
                        state[node] = DONE;
                        stack.pop();
                    }
                }
            }
        }

        false
    }
}
