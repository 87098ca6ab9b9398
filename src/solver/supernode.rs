//! Supernodes: groups of nodes tied together by voltage sources.
//!
//! Inside a supernode the voltage differences are fixed by the sources, so
//! the group contributes a single current-balance equation. Each group is
//! explored as a tree rooted at its lowest-id member; every other member
//! records the source edge that pulled it in. Those edges later become the
//! voltage-constraint rows.
//!
//! The chain limit applies to the longest path of sources inside a group,
//! which does not depend on which member is the root.

use log::trace;

use super::nodes::Connection;
use super::reduce::ReducedNode;
use crate::circuit::NodeId;
use crate::error::{OhmgridError, Result};

/// Voltage-source forest over the reduced nodes.
#[derive(Debug, Clone)]
pub struct Supernodes {
    /// Group index of each node
    group_of: Vec<usize>,
    /// Members of each group, root first
    groups: Vec<Vec<NodeId>>,
    /// Source edge from a node to its parent, as seen from the node
    parent: Vec<Option<Connection>>,
}

impl Supernodes {
    /// Explore every group, rejecting source loops and groups whose longest
    /// chain of sources has more than `max_depth` links.
    pub fn build(nodes: &[ReducedNode], max_depth: usize) -> Result<Self> {
        let mut visited = vec![false; nodes.len()];
        let mut parent = vec![None; nodes.len()];
        let mut group_of = vec![0; nodes.len()];
        let mut groups = Vec::new();

        for start in 0..nodes.len() {
            if visited[start] {
                continue;
            }
            let members = gather_supernode(nodes, NodeId(start), &mut visited, &mut parent)?;
            if members.len() > 1 {
                let chain = longest_chain(nodes, NodeId(start));
                if chain > max_depth {
                    return Err(OhmgridError::RecursionLimitExceeded { limit: max_depth });
                }
                trace!(
                    "supernode rooted at {} spans {:?}, longest chain {}",
                    NodeId(start),
                    members,
                    chain
                );
            }
            for member in &members {
                group_of[member.0] = groups.len();
            }
            groups.push(members);
        }

        Ok(Self {
            group_of,
            groups,
            parent,
        })
    }

    /// Root of the group holding `node`.
    pub fn root_of(&self, node: NodeId) -> NodeId {
        self.groups[self.group_of[node.0]][0]
    }

    pub fn is_root(&self, node: NodeId) -> bool {
        self.root_of(node) == node
    }

    /// All members of the group holding `node`, root first.
    pub fn members(&self, node: NodeId) -> &[NodeId] {
        &self.groups[self.group_of[node.0]]
    }

    /// Source edge tying `node` to its parent, `None` for roots.
    pub fn parent_edge(&self, node: NodeId) -> Option<&Connection> {
        self.parent[node.0].as_ref()
    }

    /// `node` and every member whose path to the root passes through it.
    pub fn subtree(&self, node: NodeId) -> Vec<NodeId> {
        self.members(node)
            .iter()
            .copied()
            .filter(|&member| self.descends_from(member, node))
            .collect()
    }

    fn descends_from(&self, mut member: NodeId, ancestor: NodeId) -> bool {
        loop {
            if member == ancestor {
                return true;
            }
            match self.parent_edge(member) {
                Some(edge) => member = edge.other,
                None => return false,
            }
        }
    }
}

/// Collect the supernode containing `start` with an explicit stack.
///
/// `visited` is shared across calls so a node joins exactly one group.
/// Reaching an already visited node through anything but the parent edge
/// means the sources close a loop.
pub fn gather_supernode(
    nodes: &[ReducedNode],
    start: NodeId,
    visited: &mut [bool],
    parent: &mut [Option<Connection>],
) -> Result<Vec<NodeId>> {
    let mut members = vec![start];
    let mut stack = vec![start];
    visited[start.0] = true;

    while let Some(current) = stack.pop() {
        let came_from = parent[current.0].map(|edge| edge.other);

        for source in nodes[current.0].sources() {
            let next = source.other;
            if Some(next) == came_from {
                continue;
            }
            if visited[next.0] {
                return Err(OhmgridError::VoltageSourceLoop { node: next });
            }

            visited[next.0] = true;
            parent[next.0] = Some(source.mirrored(current));
            members.push(next);
            stack.push(next);
        }
    }

    Ok(members)
}

/// Number of sources on the longest source-only path through the group
/// holding `member`.
///
/// The group must already be known to be loop-free. The farthest node from
/// any member is one end of a longest path, so two sweeps find its length
/// whatever node the group was entered from.
pub fn longest_chain(nodes: &[ReducedNode], member: NodeId) -> usize {
    let (end, _) = farthest_from(nodes, member);
    farthest_from(nodes, end).1
}

fn farthest_from(nodes: &[ReducedNode], start: NodeId) -> (NodeId, usize) {
    let mut best = (start, 0);
    let mut stack = vec![(start, None, 0usize)];

    while let Some((current, came_from, hops)) = stack.pop() {
        if hops > best.1 {
            best = (current, hops);
        }
        for source in nodes[current.0].sources() {
            if Some(source.other) != came_from {
                stack.push((source.other, Some(current), hops + 1));
            }
        }
    }

    best
}
