//! Linear system assembly and solving.
//!
//! One row per node:
//!
//! - ground rows pin a node to 0 V (node 0, plus the first node of every
//!   other disconnected island);
//! - the root of every other supernode gets a current-balance (KCL) row
//!   summing the resistor currents leaving all of its members;
//! - every non-root supernode member gets the voltage-constraint row of the
//!   source edge that joined it to the group.

use log::{debug, trace};

use super::reduce::ReducedNode;
use super::supernode::Supernodes;
use crate::circuit::NodeId;
use crate::error::{OhmgridError, Result};

/// Dense square system Ax = z, one row per node.
#[derive(Debug, Clone)]
pub struct LinearSystem {
    /// Coefficients, row-major
    a: Vec<f64>,
    /// Right-hand side
    z: Vec<f64>,
    size: usize,
}

impl LinearSystem {
    /// Create a zero-filled system of the given size.
    pub fn new(size: usize) -> Self {
        Self {
            a: vec![0.0; size * size],
            z: vec![0.0; size],
            size,
        }
    }

    pub fn set(&mut self, row: usize, col: usize, value: f64) {
        self.a[row * self.size + col] = value;
    }

    pub fn add(&mut self, row: usize, col: usize, value: f64) {
        self.a[row * self.size + col] += value;
    }

    pub fn set_rhs(&mut self, row: usize, value: f64) {
        self.z[row] = value;
    }

    /// Solve by Gaussian elimination with partial pivoting.
    ///
    /// A best pivot at or below `tolerance` times the largest coefficient
    /// means the rows do not pin every node down, which is reported as
    /// [`OhmgridError::SingularMatrix`]. So is a non-finite solution.
    pub fn solve(mut self, tolerance: f64) -> Result<Vec<f64>> {
        let n = self.size;
        let scale = self.a.iter().fold(0.0f64, |m, v| m.max(v.abs()));
        let threshold = tolerance * scale.max(f64::MIN_POSITIVE);

        for col in 0..n {
            let pivot_row = (col..n)
                .max_by(|&i, &j| {
                    let (pi, pj) = (self.a[i * n + col].abs(), self.a[j * n + col].abs());
                    pi.total_cmp(&pj)
                })
                .unwrap_or(col);
            let pivot = self.a[pivot_row * n + col];
            if pivot.abs() <= threshold {
                trace!("column {} has no usable pivot ({:e})", col, pivot);
                return Err(OhmgridError::SingularMatrix);
            }
            if pivot_row != col {
                self.swap_rows(col, pivot_row);
            }

            for row in (col + 1)..n {
                let factor = self.a[row * n + col] / pivot;
                if factor == 0.0 {
                    continue;
                }
                for k in col..n {
                    self.a[row * n + k] -= factor * self.a[col * n + k];
                }
                self.z[row] -= factor * self.z[col];
            }
        }

        let mut x = vec![0.0; n];
        for row in (0..n).rev() {
            let known: f64 = ((row + 1)..n).map(|k| self.a[row * n + k] * x[k]).sum();
            x[row] = (self.z[row] - known) / self.a[row * n + row];
        }

        if x.iter().any(|v| !v.is_finite()) {
            return Err(OhmgridError::SingularMatrix);
        }
        Ok(x)
    }

    fn swap_rows(&mut self, r1: usize, r2: usize) {
        let n = self.size;
        for k in 0..n {
            self.a.swap(r1 * n + k, r2 * n + k);
        }
        self.z.swap(r1, r2);
    }
}

/// Lowest-id node of every connected piece of the node graph.
pub fn island_roots(nodes: &[ReducedNode]) -> Vec<NodeId> {
    let mut seen = vec![false; nodes.len()];
    let mut roots = Vec::new();

    for start in 0..nodes.len() {
        if seen[start] {
            continue;
        }
        roots.push(NodeId(start));
        seen[start] = true;
        let mut stack = vec![start];
        while let Some(current) = stack.pop() {
            for connection in &nodes[current].connections {
                let next = connection.other.0;
                if !seen[next] {
                    seen[next] = true;
                    stack.push(next);
                }
            }
        }
    }

    roots
}

/// Build the node-voltage system.
pub fn assemble(nodes: &[ReducedNode], supernodes: &Supernodes) -> LinearSystem {
    let size = nodes.len();
    let mut system = LinearSystem::new(size);
    let grounds = island_roots(nodes);

    for node in nodes {
        let row = node.id.0;

        if grounds.contains(&node.id) {
            system.set(row, row, 1.0);
            trace!("row {}: ground", row);
        } else if let Some(edge) = supernodes.parent_edge(node.id) {
            // V_pos - V_neg = E, written from this node's side
            let sign = edge.polarity.sign();
            system.add(row, row, sign);
            system.add(row, edge.other.0, -sign);
            system.set_rhs(row, edge.magnitude);
            trace!("row {}: source to {} ({} V)", row, edge.other, edge.magnitude);
        } else {
            stamp_kcl_row(&mut system, row, nodes, supernodes.members(node.id));
            trace!("row {}: KCL over {:?}", row, supernodes.members(node.id));
        }
    }

    system
}

/// Sum of resistor currents leaving every member of a supernode equals zero.
///
/// Resistors between two members appear once from each side with opposite
/// sign and cancel.
fn stamp_kcl_row(
    system: &mut LinearSystem,
    row: usize,
    nodes: &[ReducedNode],
    members: &[NodeId],
) {
    for member in members {
        for resistor in nodes[member.0].resistors() {
            let g = 1.0 / resistor.magnitude;
            system.add(row, member.0, g);
            system.add(row, resistor.other.0, -g);
        }
    }
}

/// Solve for node voltages, shifted so the lowest node sits at exactly 0 V.
pub fn solve(
    nodes: &[ReducedNode],
    supernodes: &Supernodes,
    pivot_tolerance: f64,
) -> Result<Vec<f64>> {
    if nodes.is_empty() {
        return Ok(Vec::new());
    }

    let mut voltages = assemble(nodes, supernodes).solve(pivot_tolerance)?;

    normalize(&mut voltages);
    debug!("solved {} node voltages", voltages.len());
    Ok(voltages)
}

/// Shift all voltages so the minimum is 0. Differences are unchanged.
pub fn normalize(voltages: &mut [f64]) {
    let min = voltages.iter().copied().fold(f64::INFINITY, f64::min);
    if min.is_finite() {
        for v in voltages.iter_mut() {
            *v -= min;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::circuit::Polarity;
    use crate::solver::nodes::{AbstractNode, Connection};
    use approx::assert_relative_eq;

    fn nodes(n: usize) -> Vec<ReducedNode> {
        (0..n).map(|i| AbstractNode::new(NodeId(i))).collect()
    }

    fn link(nodes: &mut [ReducedNode], c: Connection, from: usize) {
        nodes[from].add_connection(c);
        nodes[c.other.0].add_connection(c.mirrored(NodeId(from)));
    }

    fn solve_nodes(n: &[ReducedNode]) -> Vec<f64> {
        let s = Supernodes::build(n, 10).unwrap();
        solve(n, &s, 1e-12).unwrap()
    }

    #[test]
    fn test_elimination_solve() {
        let mut system = LinearSystem::new(2);
        system.set(0, 0, 2.0);
        system.set(0, 1, 1.0);
        system.set(1, 0, 1.0);
        system.set(1, 1, 3.0);
        system.set_rhs(0, 13.0);
        system.set_rhs(1, 24.0);

        let x = system.solve(1e-12).unwrap();
        assert_relative_eq!(x[0], 3.0, epsilon = 1e-12);
        assert_relative_eq!(x[1], 7.0, epsilon = 1e-12);
    }

    #[test]
    fn test_pivoting_on_zero_diagonal() {
        let mut system = LinearSystem::new(2);
        system.set(0, 1, 1.0);
        system.set(1, 0, 4.0);
        system.set_rhs(0, 2.0);
        system.set_rhs(1, 8.0);

        let x = system.solve(1e-12).unwrap();
        assert_relative_eq!(x[0], 2.0, epsilon = 1e-12);
        assert_relative_eq!(x[1], 2.0, epsilon = 1e-12);
    }

    #[test]
    fn test_singular_detected() {
        let mut system = LinearSystem::new(2);
        system.set(0, 0, 1.0);
        system.set(0, 1, 2.0);
        system.set(1, 0, 2.0);
        system.set(1, 1, 4.0);
        assert!(matches!(system.solve(1e-12), Err(OhmgridError::SingularMatrix)));
    }

    #[test]
    fn test_voltage_divider() {
        // Source 9 V with + on node 1, - on node 0; 1k from 1 to 2; 2k from 2 to 0.
        let mut n = nodes(3);
        link(&mut n, Connection::source(NodeId(0), 9.0, Polarity::Positive), 1);
        link(&mut n, Connection::resistor(NodeId(2), 1000.0, Polarity::Positive), 1);
        link(&mut n, Connection::resistor(NodeId(0), 2000.0, Polarity::Positive), 2);

        let v = solve_nodes(&n);
        assert_relative_eq!(v[NodeId::GROUND.0], 0.0);
        assert_relative_eq!(v[1], 9.0, epsilon = 1e-9);
        assert_relative_eq!(v[2], 6.0, epsilon = 1e-9);
    }

    #[test]
    fn test_normalization_when_ground_is_high() {
        // Node 0 is the source's positive side, so node 1 solves to -5 V.
        let mut n = nodes(2);
        link(&mut n, Connection::source(NodeId(1), 5.0, Polarity::Positive), 0);
        link(&mut n, Connection::resistor(NodeId(1), 10.0, Polarity::Positive), 0);

        let v = solve_nodes(&n);
        assert_relative_eq!(v[0], 5.0, epsilon = 1e-12);
        assert_relative_eq!(v[1], 0.0, epsilon = 1e-12);
    }

    #[test]
    fn test_floating_supernode() {
        // Source between nodes 1 and 2, neither grounded, tied to node 0
        // through resistors on both sides.
        let mut n = nodes(3);
        link(&mut n, Connection::source(NodeId(2), 4.0, Polarity::Positive), 1);
        link(&mut n, Connection::resistor(NodeId(0), 100.0, Polarity::Positive), 1);
        link(&mut n, Connection::resistor(NodeId(0), 300.0, Polarity::Positive), 2);

        let v = solve_nodes(&n);
        assert_relative_eq!(v[1] - v[2], 4.0, epsilon = 1e-9);
        // Same current through both resistors in opposite directions.
        let i1 = (v[1] - v[0]) / 100.0;
        let i2 = (v[2] - v[0]) / 300.0;
        assert_relative_eq!(i1 + i2, 0.0, epsilon = 1e-12);
    }

    #[test]
    fn test_islands_each_grounded() {
        let mut n = nodes(4);
        link(&mut n, Connection::resistor(NodeId(1), 10.0, Polarity::Positive), 0);
        link(&mut n, Connection::resistor(NodeId(3), 10.0, Polarity::Positive), 2);
        assert_eq!(island_roots(&n), vec![NodeId(0), NodeId(2)]);
    }

    #[test]
    fn test_normalize() {
        let mut v = vec![0.0, -3.0, 2.0];
        normalize(&mut v);
        assert_eq!(v, vec![3.0, 0.0, 5.0]);
    }
}
