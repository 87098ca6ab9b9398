//! Node reduction: collapse parallel elements between the same node pair.
//!
//! After reduction every pair of nodes shares at most one resistor connection
//! and at most one voltage-source connection. Resistance between a pair whose
//! total conductance is negligible is treated as an open circuit and removed,
//! whether it came from one resistor or several in parallel.

use log::debug;

use super::nodes::{AbstractNode, Connection};
use crate::circuit::{NodeId, Polarity};
use crate::error::{OhmgridError, Result};

/// An abstract node after parallel elements have been merged.
pub type ReducedNode = AbstractNode;

/// Reduce every ordered node pair.
pub fn reduce(mut nodes: Vec<AbstractNode>, min_conductance: f64) -> Result<Vec<ReducedNode>> {
    let before: usize = nodes.iter().map(|n| n.connections.len()).sum();

    for a in 0..nodes.len() {
        for b in 0..nodes.len() {
            if a != b {
                reduce_connection(&mut nodes, NodeId(a), NodeId(b), min_conductance)?;
            }
        }
    }

    let after: usize = nodes.iter().map(|n| n.connections.len()).sum();
    debug!("reduction: {} connections -> {}", before, after);
    Ok(nodes)
}

/// Merge the parallel connections between nodes `a` and `b`.
///
/// Resistors are replaced by one equivalent resistor, dropped entirely when
/// their total conductance does not exceed `min_conductance`. More than one
/// voltage source between the same pair is rejected.
pub fn reduce_connection(
    nodes: &mut [AbstractNode],
    a: NodeId,
    b: NodeId,
    min_conductance: f64,
) -> Result<()> {
    let forward: Vec<Connection> = nodes[a.0].connections_to(b).copied().collect();
    let backward = nodes[b.0].connections_to(a).count();

    if forward.len() != backward {
        return Err(OhmgridError::structural(format!(
            "nodes {} and {} disagree on their connections ({} vs {})",
            a,
            b,
            forward.len(),
            backward
        )));
    }

    match forward.as_slice() {
        [] => return Ok(()),
        [single] if single.is_source() || 1.0 / single.magnitude > min_conductance => {
            return Ok(())
        }
        _ => {}
    }

    let mut conductance = 0.0;
    let mut sources = 0usize;

    for connection in &forward {
        if connection.is_source() {
            sources += 1;
            if sources > 1 {
                return Err(OhmgridError::ParallelVoltageSources {
                    node_a: a,
                    node_b: b,
                });
            }
            continue;
        }

        conductance += 1.0 / connection.magnitude;
        nodes[a.0].remove_connection(connection);
        if !nodes[b.0].remove_connection(&connection.mirrored(a)) {
            return Err(OhmgridError::structural(format!(
                "resistor {}Ω from {} to {} has no mirror",
                connection.magnitude, a, b
            )));
        }
    }

    if conductance > min_conductance {
        let equivalent = Connection::resistor(b, 1.0 / conductance, Polarity::Positive);
        nodes[a.0].add_connection(equivalent);
        nodes[b.0].add_connection(equivalent.mirrored(a));
    }

    Ok(())
}
