//! Calculator: the editor-facing entry point.
//!
//! One call runs the whole pipeline on the current board snapshot:
//! completeness check, node building, reduction, supernode discovery,
//! assembly and solve, then write-back of per-component results.

use std::fmt;

use log::{debug, warn};

use super::nodes::{build_electrical_nodes, convert_to_abstract_nodes, NodeMap};
use super::reduce::{reduce, ReducedNode};
use super::supernode::Supernodes;
use super::system;
use super::{DEFAULT_MAX_CHAIN_DEPTH, DEFAULT_PIVOT_TOLERANCE, MIN_CONDUCTANCE};
use crate::circuit::{check_completeness, Circuit, ComponentId, Components, NodeId, Spot};
use crate::components::{Component, ComponentKind};
use crate::error::{OhmgridError, Result};

/// Configuration for the calculator.
#[derive(Debug, Clone)]
pub struct CalculatorConfig {
    /// Maximum number of voltage sources on any source-only path.
    pub max_chain_depth: usize,
    /// Resistance between two nodes whose total conductance is at or below
    /// this value is treated as an open circuit.
    pub min_conductance: f64,
    /// Relative pivot size below which the system counts as singular.
    pub pivot_tolerance: f64,
}

impl Default for CalculatorConfig {
    fn default() -> Self {
        Self {
            max_chain_depth: DEFAULT_MAX_CHAIN_DEPTH,
            min_conductance: MIN_CONDUCTANCE,
            pivot_tolerance: DEFAULT_PIVOT_TOLERANCE,
        }
    }
}

impl CalculatorConfig {
    /// Create a new configuration with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the voltage-source chain depth limit.
    pub fn with_max_chain_depth(mut self, max_chain_depth: usize) -> Self {
        self.max_chain_depth = max_chain_depth;
        self
    }

    /// Set the reduction conductance threshold (siemens).
    pub fn with_min_conductance(mut self, min_conductance: f64) -> Self {
        self.min_conductance = min_conductance;
        self
    }

    /// Set the singular-pivot tolerance.
    pub fn with_pivot_tolerance(mut self, pivot_tolerance: f64) -> Self {
        self.pivot_tolerance = pivot_tolerance;
        self
    }
}

/// Outcome of [`Circuit::recalculate`].
#[derive(Debug)]
pub enum CalculationStatus {
    /// Results were written to every component
    Solved,
    /// Empty board or dangling ends; results are zero
    Incomplete,
    /// The board could not be calculated; results are zero
    Failed(OhmgridError),
}

impl CalculationStatus {
    pub fn is_solved(&self) -> bool {
        matches!(self, Self::Solved)
    }

    pub fn is_failed(&self) -> bool {
        matches!(self, Self::Failed(_))
    }

    /// The failure, if any.
    pub fn error(&self) -> Option<&OhmgridError> {
        match self {
            Self::Failed(e) => Some(e),
            _ => None,
        }
    }
}

impl fmt::Display for CalculationStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Solved => write!(f, "solved"),
            Self::Incomplete => write!(f, "incomplete"),
            Self::Failed(e) => write!(f, "error calculating circuit values: {}", e),
        }
    }
}

/// Solved outputs for one component.
#[derive(Debug, Clone, Copy)]
struct ComponentResult {
    id: ComponentId,
    voltage_drop: f64,
    current_through: f64,
}

/// A resistor after solving, located by node.
#[derive(Debug, Clone, Copy)]
struct SolvedResistor {
    positive: NodeId,
    negative: NodeId,
    current: f64,
}

/// The circuit calculator.
#[derive(Debug, Clone, Default)]
pub struct Calculator {
    config: CalculatorConfig,
}

impl Calculator {
    /// Create a calculator with default configuration.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a calculator with custom configuration.
    pub fn with_config(config: CalculatorConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &CalculatorConfig {
        &self.config
    }

    /// Analyze the board and write voltage drop and current into every
    /// component.
    ///
    /// Returns `Ok(false)` for an empty board or one with dangling ends, with
    /// every result zeroed. On error every result is zeroed as well, so a
    /// component never holds a mix of old and new values.
    pub fn calculate(&self, spots: &[Spot], components: &mut Components) -> Result<bool> {
        let completeness = check_completeness(spots);
        if !completeness.is_complete() {
            debug!("board not solvable: {:?}", completeness);
            components.clear_results();
            return Ok(false);
        }

        match self.analyze(spots, components) {
            Ok(results) => {
                for result in results {
                    if let Some(component) = components.get_mut(result.id) {
                        component.set_results(result.voltage_drop, result.current_through);
                    }
                }
                Ok(true)
            }
            Err(e) => {
                components.clear_results();
                Err(e)
            }
        }
    }

    fn analyze(&self, spots: &[Spot], components: &Components) -> Result<Vec<ComponentResult>> {
        let (electrical, node_map) = build_electrical_nodes(spots, components)?;
        let abstract_nodes =
            convert_to_abstract_nodes(&electrical, &node_map, spots, components)?;
        let reduced = reduce(abstract_nodes, self.config.min_conductance)?;
        let supernodes = Supernodes::build(&reduced, self.config.max_chain_depth)?;
        let voltages = system::solve(&reduced, &supernodes, self.config.pivot_tolerance)?;

        back_propagate(components, &node_map, &reduced, &supernodes, &voltages)
    }
}

/// Compute per-component results from solved node voltages.
///
/// Resistors go first because source currents are derived from them. A
/// resistor whose node pair lost its resistance during reduction was an open
/// circuit in the solve and carries no current.
fn back_propagate(
    components: &Components,
    node_map: &NodeMap,
    reduced: &[ReducedNode],
    supernodes: &Supernodes,
    voltages: &[f64],
) -> Result<Vec<ComponentResult>> {
    let mut results = Vec::new();
    let mut resistors = Vec::new();

    for component in components.iter() {
        if component.kind != ComponentKind::Resistor {
            continue;
        }
        let positive = node_map.require(component.positive)?;
        let negative = node_map.require(component.negative)?;
        let voltage_drop = voltages[positive.0] - voltages[negative.0];
        let solved = reduced[positive.0]
            .resistors()
            .any(|r| r.other == negative);
        let current = if solved {
            voltage_drop * component.conductance()
        } else {
            0.0
        };

        resistors.push(SolvedResistor {
            positive,
            negative,
            current,
        });
        results.push(ComponentResult {
            id: component.id,
            voltage_drop,
            current_through: current,
        });
    }

    for component in components.iter() {
        match component.kind {
            ComponentKind::Resistor => {}
            ComponentKind::Wire => results.push(ComponentResult {
                id: component.id,
                voltage_drop: 0.0,
                current_through: 0.0,
            }),
            ComponentKind::VoltageSource => {
                let current = source_current(component, node_map, supernodes, &resistors)?;
                results.push(ComponentResult {
                    id: component.id,
                    voltage_drop: component.value,
                    current_through: current,
                });
            }
        }
    }

    Ok(results)
}

/// Current a source delivers out of its positive terminal.
///
/// Cutting the source out of its supernode tree splits the group in two.
/// Everything the resistors carry away from the side holding the positive
/// terminal must come through the source.
fn source_current(
    source: &Component,
    node_map: &NodeMap,
    supernodes: &Supernodes,
    resistors: &[SolvedResistor],
) -> Result<f64> {
    let positive = node_map.require(source.positive)?;
    let negative = node_map.require(source.negative)?;

    let is_edge = |child: NodeId, parent: NodeId| {
        supernodes
            .parent_edge(child)
            .is_some_and(|edge| edge.other == parent)
    };

    let (side, sign) = if is_edge(positive, negative) {
        (supernodes.subtree(positive), 1.0)
    } else if is_edge(negative, positive) {
        (supernodes.subtree(negative), -1.0)
    } else {
        return Err(OhmgridError::structural(format!(
            "voltage source {} is not part of any supernode",
            source.id
        )));
    };

    let leaving: f64 = resistors
        .iter()
        .map(|r| {
            let mut i = 0.0;
            if side.contains(&r.positive) {
                i += r.current;
            }
            if side.contains(&r.negative) {
                i -= r.current;
            }
            i
        })
        .sum();

    Ok(sign * leaving)
}

impl Circuit {
    /// Run the calculator with default configuration.
    pub fn calculate(&mut self) -> Result<bool> {
        Calculator::new().calculate(&self.spots, &mut self.components)
    }

    /// Run the calculator and fold the outcome into a status for display.
    pub fn recalculate(&mut self) -> CalculationStatus {
        self.recalculate_with(&Calculator::new())
    }

    /// Like [`Circuit::recalculate`] with a specific calculator.
    pub fn recalculate_with(&mut self, calculator: &Calculator) -> CalculationStatus {
        match calculator.calculate(&self.spots, &mut self.components) {
            Ok(true) => CalculationStatus::Solved,
            Ok(false) => CalculationStatus::Incomplete,
            Err(e) => {
                warn!("unable to calculate circuit: {}", e);
                CalculationStatus::Failed(e)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::circuit::SpotId;
    use approx::assert_relative_eq;

    fn place(c: &mut Circuit, kind: ComponentKind, a: usize, b: usize, value: f64) -> ComponentId {
        let name = format!("{}{}", kind.name(), c.components.len());
        c.add_named_component(name, kind, SpotId(a), SpotId(b), value)
            .unwrap()
    }

    fn results(c: &Circuit, id: ComponentId) -> (f64, f64) {
        let comp = c.component(id).unwrap();
        (comp.voltage_drop, comp.current_through)
    }

    #[test]
    fn test_empty_board_incomplete() {
        let mut c = Circuit::grid(3, 3);
        assert!(!c.calculate().unwrap());
        assert!(matches!(c.recalculate(), CalculationStatus::Incomplete));
    }

    #[test]
    fn test_dangling_end_zeroes_results() {
        let mut c = Circuit::grid(3, 1);
        let v = place(&mut c, ComponentKind::VoltageSource, 0, 1, 5.0);
        let r = place(&mut c, ComponentKind::Resistor, 0, 1, 100.0);
        assert!(c.calculate().unwrap());
        assert!(results(&c, r).1 != 0.0);

        let w = place(&mut c, ComponentKind::Wire, 1, 2, 0.0);
        assert!(!c.calculate().unwrap());
        for id in [v, r, w] {
            assert_eq!(results(&c, id), (0.0, 0.0));
        }
    }

    #[test]
    fn test_single_loop() {
        let mut c = Circuit::grid(2, 1);
        let v = place(&mut c, ComponentKind::VoltageSource, 0, 1, 10.0);
        let r = place(&mut c, ComponentKind::Resistor, 0, 1, 200.0);

        assert!(c.calculate().unwrap());
        let (vr, ir) = results(&c, r);
        let (vv, iv) = results(&c, v);
        assert_relative_eq!(vr, 10.0, epsilon = 1e-9);
        assert_relative_eq!(ir, 0.05, epsilon = 1e-12);
        assert_relative_eq!(vv, 10.0);
        assert_relative_eq!(iv, ir, epsilon = 1e-12);
    }

    #[test]
    fn test_parallel_resistors_across_source() {
        let mut c = Circuit::grid(6, 1);
        // Source on 0-1, resistors wired across it on their own spots.
        let v = place(&mut c, ComponentKind::VoltageSource, 0, 1, 12.0);
        place(&mut c, ComponentKind::Wire, 0, 2, 0.0);
        place(&mut c, ComponentKind::Wire, 1, 3, 0.0);
        place(&mut c, ComponentKind::Wire, 2, 4, 0.0);
        place(&mut c, ComponentKind::Wire, 3, 5, 0.0);
        let r1 = place(&mut c, ComponentKind::Resistor, 2, 3, 300.0);
        let r2 = place(&mut c, ComponentKind::Resistor, 4, 5, 600.0);

        assert!(c.calculate().unwrap());
        let req = 300.0 * 600.0 / 900.0;
        assert_relative_eq!(results(&c, v).1, 12.0 / req, epsilon = 1e-12);
        assert_relative_eq!(results(&c, r1).1, 0.04, epsilon = 1e-12);
        assert_relative_eq!(results(&c, r2).1, 0.02, epsilon = 1e-12);
    }

    #[test]
    fn test_parallel_sources_fail() {
        let mut c = Circuit::grid(2, 1);
        let v1 = place(&mut c, ComponentKind::VoltageSource, 0, 1, 5.0);
        let v2 = place(&mut c, ComponentKind::VoltageSource, 0, 1, 5.0);
        place(&mut c, ComponentKind::Resistor, 0, 1, 10.0);

        let err = c.calculate().unwrap_err();
        assert!(matches!(err, OhmgridError::ParallelVoltageSources { .. }));
        assert!(err.is_calculation_failure());
        for id in [v1, v2] {
            assert_eq!(results(&c, id), (0.0, 0.0));
        }
    }

    #[test]
    fn test_failure_leaves_no_stale_results() {
        let mut c = Circuit::grid(2, 1);
        let v = place(&mut c, ComponentKind::VoltageSource, 0, 1, 5.0);
        let r = place(&mut c, ComponentKind::Resistor, 0, 1, 10.0);
        assert!(c.recalculate().is_solved());

        place(&mut c, ComponentKind::VoltageSource, 1, 0, 3.0);
        let status = c.recalculate();
        assert!(status.is_failed());
        assert!(status.error().is_some_and(OhmgridError::is_calculation_failure));
        assert!(status.to_string().starts_with("error calculating"));
        assert_eq!(results(&c, v), (0.0, 0.0));
        assert_eq!(results(&c, r), (0.0, 0.0));
    }

    #[test]
    fn test_idempotent() {
        let mut c = Circuit::grid(4, 1);
        place(&mut c, ComponentKind::VoltageSource, 0, 1, 9.0);
        place(&mut c, ComponentKind::Resistor, 1, 2, 1000.0);
        place(&mut c, ComponentKind::Resistor, 2, 0, 2000.0);
        place(&mut c, ComponentKind::Resistor, 2, 3, 470.0);
        place(&mut c, ComponentKind::Resistor, 3, 0, 330.0);

        let snapshot = |c: &Circuit| -> Vec<(f64, f64)> {
            c.components
                .iter()
                .map(|x| (x.voltage_drop, x.current_through))
                .collect()
        };

        c.calculate().unwrap();
        let first = snapshot(&c);
        c.calculate().unwrap();
        assert_eq!(first, snapshot(&c));
    }

    /// Divider: source + on `a`, - on `c`; 1k from a to b; 2k from b to c.
    fn divider(order: [&str; 3]) -> (Circuit, [ComponentId; 3]) {
        let mut c = Circuit::new();
        for label in order {
            c.add_spot(label);
        }
        let (a, b, gnd) = (
            c.find_spot("a").unwrap(),
            c.find_spot("b").unwrap(),
            c.find_spot("c").unwrap(),
        );
        let v = c
            .add_named_component("V1".into(), ComponentKind::VoltageSource, a, gnd, 9.0)
            .unwrap();
        let r1 = c
            .add_named_component("R1".into(), ComponentKind::Resistor, a, b, 1000.0)
            .unwrap();
        let r2 = c
            .add_named_component("R2".into(), ComponentKind::Resistor, b, gnd, 2000.0)
            .unwrap();
        (c, [v, r1, r2])
    }

    #[test]
    fn test_ground_choice_does_not_matter() {
        let orders = [["a", "b", "c"], ["b", "c", "a"], ["c", "a", "b"]];
        let mut reference: Option<Vec<(f64, f64)>> = None;

        for order in orders {
            let (mut c, ids) = divider(order);
            assert!(c.calculate().unwrap());
            let got: Vec<_> = ids.iter().map(|&id| results(&c, id)).collect();

            assert_relative_eq!(got[1].0, 3.0, epsilon = 1e-9);
            assert_relative_eq!(got[2].0, 6.0, epsilon = 1e-9);
            assert_relative_eq!(got[0].1, 0.003, epsilon = 1e-12);

            if let Some(expected) = &reference {
                for (g, e) in got.iter().zip(expected) {
                    assert_relative_eq!(g.0, e.0, epsilon = 1e-9);
                    assert_relative_eq!(g.1, e.1, epsilon = 1e-12);
                }
            } else {
                reference = Some(got);
            }
        }

        // Supernode away from ground: R1 a-b, V b(+)-c(-), R2 c-d, Vs d(+)-a(-).
        let parts = [
            (ComponentKind::Resistor, "a", "b", 100.0),
            (ComponentKind::VoltageSource, "b", "c", 5.0),
            (ComponentKind::Resistor, "c", "d", 400.0),
            (ComponentKind::VoltageSource, "d", "a", 10.0),
        ];
        let orders = [
            ["a", "b", "c", "d"],
            ["c", "d", "a", "b"],
            ["d", "b", "a", "c"],
            ["b", "c", "d", "a"],
        ];
        for order in orders {
            let got = solved(&order, &parts, &Calculator::new()).unwrap();
            assert_relative_eq!(got[0].1, -0.03, epsilon = 1e-12);
            assert_relative_eq!(got[1].1, 0.03, epsilon = 1e-12);
            assert_relative_eq!(got[2].1, -0.03, epsilon = 1e-12);
            assert_relative_eq!(got[3].1, 0.03, epsilon = 1e-12);
        }

        // Chained sources: 3 V and 6 V stacked under a 90 ohm load.
        let parts = [
            (ComponentKind::VoltageSource, "m", "g", 3.0),
            (ComponentKind::VoltageSource, "t", "m", 6.0),
            (ComponentKind::Resistor, "t", "g", 90.0),
        ];
        for order in [["g", "m", "t"], ["m", "t", "g"], ["t", "g", "m"]] {
            let got = solved(&order, &parts, &Calculator::new()).unwrap();
            assert_relative_eq!(got[2].0, 9.0, epsilon = 1e-9);
            for (_, current) in got {
                assert_relative_eq!(current, 0.1, epsilon = 1e-12);
            }
        }
    }

    type Part<'a> = (ComponentKind, &'a str, &'a str, f64);

    /// Place `parts` on a board whose spots are created in `order`.
    fn board(order: &[&str], parts: &[Part]) -> (Circuit, Vec<ComponentId>) {
        let mut c = Circuit::new();
        for label in order {
            c.add_spot(*label);
        }
        let ids: Vec<_> = parts
            .iter()
            .enumerate()
            .map(|(i, &(kind, positive, negative, value))| {
                let positive = c.find_spot(positive).unwrap();
                let negative = c.find_spot(negative).unwrap();
                c.add_named_component(format!("P{}", i), kind, positive, negative, value)
                    .unwrap()
            })
            .collect();
        (c, ids)
    }

    /// Drop and current of every part, in `parts` order.
    fn solved(order: &[&str], parts: &[Part], calculator: &Calculator) -> Result<Vec<(f64, f64)>> {
        let (mut c, ids) = board(order, parts);
        let complete = calculator.calculate(&c.spots, &mut c.components)?;
        assert!(complete);
        Ok(ids.iter().map(|&id| results(&c, id)).collect())
    }

    /// Net current leaving every spot, counting sources as delivering out of
    /// their positive terminal. Boards here have no wires, so spots are nodes.
    fn assert_kcl(c: &Circuit) {
        let mut net = vec![0.0; c.spots.len()];
        for comp in c.components.iter() {
            let i = comp.current_through;
            let sign = match comp.kind {
                ComponentKind::Resistor => 1.0,
                ComponentKind::VoltageSource => -1.0,
                ComponentKind::Wire => panic!("board has wires"),
            };
            net[comp.positive.0] += sign * i;
            net[comp.negative.0] -= sign * i;
        }
        for (spot, n) in net.into_iter().enumerate() {
            assert!(n.abs() < 1e-15, "current imbalance {} at spot {}", n, spot);
        }
    }

    #[test]
    fn test_long_chain_same_outcome_in_any_spot_order() {
        // Eleven 1 V sources in series from s0 up to s11, closed by 11 ohm.
        let labels: Vec<String> = (0..12).map(|i| format!("s{}", i)).collect();
        let mut parts: Vec<Part> = (0..11)
            .map(|i| {
                (
                    ComponentKind::VoltageSource,
                    labels[i + 1].as_str(),
                    labels[i].as_str(),
                    1.0,
                )
            })
            .collect();
        parts.push((ComponentKind::Resistor, "s11", "s0", 11.0));

        let forward: Vec<&str> = labels.iter().map(String::as_str).collect();
        let backward: Vec<&str> = forward.iter().rev().copied().collect();
        let middle_first: Vec<&str> = forward[6..].iter().chain(&forward[..6]).copied().collect();

        let strict = Calculator::new();
        let loose = Calculator::with_config(CalculatorConfig::new().with_max_chain_depth(11));

        for order in [&forward, &backward, &middle_first] {
            let err = solved(order, &parts, &strict).unwrap_err();
            assert!(matches!(err, OhmgridError::RecursionLimitExceeded { limit: 10 }));

            let got = solved(order, &parts, &loose).unwrap();
            for (_, current) in got {
                assert_relative_eq!(current, 1.0, epsilon = 1e-9);
            }
        }
    }

    #[test]
    fn test_kcl_with_high_value_parallel_pair() {
        // 10 V across 1k in series with 1M || 1M.
        let parts = [
            (ComponentKind::VoltageSource, "top", "bot", 10.0),
            (ComponentKind::Resistor, "top", "mid", 1e3),
            (ComponentKind::Resistor, "mid", "bot", 1e6),
            (ComponentKind::Resistor, "mid", "bot", 1e6),
        ];
        let order = ["top", "mid", "bot"];

        let (mut c, ids) = board(&order, &parts);
        assert!(c.calculate().unwrap());
        assert_kcl(&c);
        let total = 10.0 / 501_000.0;
        assert_relative_eq!(results(&c, ids[0]).1, total, epsilon = 1e-15);
        assert_relative_eq!(results(&c, ids[1]).1, total, epsilon = 1e-15);
        assert_relative_eq!(results(&c, ids[2]).1, total / 2.0, epsilon = 1e-15);

        // With a coarse threshold the pair is an open circuit: no current anywhere.
        let coarse = Calculator::with_config(CalculatorConfig::new().with_min_conductance(1e-5));
        let (mut c, ids) = board(&order, &parts);
        assert!(coarse.calculate(&c.spots, &mut c.components).unwrap());
        assert_kcl(&c);
        for &id in &ids {
            assert_relative_eq!(results(&c, id).1, 0.0, epsilon = 1e-15);
        }
        assert_relative_eq!(results(&c, ids[2]).0, 10.0, epsilon = 1e-9);
    }

    #[test]
    fn test_series_sources() {
        // 3 V and 6 V stacked, 90 ohm load.
        let mut c = Circuit::grid(3, 1);
        let v1 = place(&mut c, ComponentKind::VoltageSource, 1, 0, 3.0);
        let v2 = place(&mut c, ComponentKind::VoltageSource, 2, 1, 6.0);
        let r = place(&mut c, ComponentKind::Resistor, 2, 0, 90.0);

        assert!(c.calculate().unwrap());
        assert_relative_eq!(results(&c, r).0, 9.0, epsilon = 1e-9);
        assert_relative_eq!(results(&c, r).1, 0.1, epsilon = 1e-12);
        assert_relative_eq!(results(&c, v1).1, 0.1, epsilon = 1e-12);
        assert_relative_eq!(results(&c, v2).1, 0.1, epsilon = 1e-12);
    }

    #[test]
    fn test_opposing_source_absorbs_current() {
        // 10 V driving through 5 ohm into a 4 V source: 1.2 A flows into the
        // 4 V source's positive terminal.
        let mut c = Circuit::grid(3, 1);
        let big = place(&mut c, ComponentKind::VoltageSource, 1, 0, 10.0);
        place(&mut c, ComponentKind::Resistor, 1, 2, 5.0);
        let small = place(&mut c, ComponentKind::VoltageSource, 2, 0, 4.0);

        assert!(c.calculate().unwrap());
        assert_relative_eq!(results(&c, big).1, 1.2, epsilon = 1e-12);
        assert_relative_eq!(results(&c, small).1, -1.2, epsilon = 1e-12);
    }

    #[test]
    fn test_supernode_away_from_ground() {
        // R1 0-1, V 1(+)-2(-) 5 V, R2 2-3, Vs 3(+)-0(-) 10 V
        let mut c = Circuit::grid(4, 1);
        let r1 = place(&mut c, ComponentKind::Resistor, 0, 1, 100.0);
        let v = place(&mut c, ComponentKind::VoltageSource, 1, 2, 5.0);
        let r2 = place(&mut c, ComponentKind::Resistor, 2, 3, 400.0);
        let vs = place(&mut c, ComponentKind::VoltageSource, 3, 0, 10.0);

        assert!(c.calculate().unwrap());
        // Loop: 10 + 5 = 15 V across 500 ohm, clockwise current 0.03 A.
        assert_relative_eq!(results(&c, r2).1, -0.03, epsilon = 1e-12);
        assert_relative_eq!(results(&c, r1).1, -0.03, epsilon = 1e-12);
        assert_relative_eq!(results(&c, v).1, 0.03, epsilon = 1e-12);
        assert_relative_eq!(results(&c, vs).1, 0.03, epsilon = 1e-12);
    }

    #[test]
    fn test_independent_loops() {
        let mut c = Circuit::grid(4, 1);
        place(&mut c, ComponentKind::VoltageSource, 0, 1, 2.0);
        let ra = place(&mut c, ComponentKind::Resistor, 0, 1, 4.0);
        place(&mut c, ComponentKind::VoltageSource, 2, 3, 6.0);
        let rb = place(&mut c, ComponentKind::Resistor, 2, 3, 3.0);

        assert!(c.calculate().unwrap());
        assert_relative_eq!(results(&c, ra).1, 0.5, epsilon = 1e-12);
        assert_relative_eq!(results(&c, rb).1, 2.0, epsilon = 1e-12);
    }

    #[test]
    fn test_chain_limit_from_config() {
        let mut c = Circuit::grid(4, 1);
        place(&mut c, ComponentKind::VoltageSource, 0, 1, 1.0);
        place(&mut c, ComponentKind::VoltageSource, 1, 2, 1.0);
        place(&mut c, ComponentKind::VoltageSource, 2, 3, 1.0);
        place(&mut c, ComponentKind::Resistor, 3, 0, 1.0);

        let tight = Calculator::with_config(CalculatorConfig::new().with_max_chain_depth(2));
        assert_eq!(tight.config().max_chain_depth, 2);
        let err = tight.calculate(&c.spots, &mut c.components).unwrap_err();
        assert!(matches!(err, OhmgridError::RecursionLimitExceeded { limit: 2 }));

        assert!(c.calculate().unwrap());
    }

    #[test]
    fn test_shorted_resistor_reads_zero() {
        let mut c = Circuit::grid(2, 1);
        place(&mut c, ComponentKind::VoltageSource, 0, 1, 5.0);
        place(&mut c, ComponentKind::Resistor, 0, 1, 50.0);
        place(&mut c, ComponentKind::Wire, 0, 1, 0.0);
        // The wire shorts the source: both source terminals share a node.
        let err = c.calculate().unwrap_err();
        assert!(matches!(err, OhmgridError::ShortedVoltageSource { .. }));

        let mut c2 = Circuit::grid(4, 1);
        place(&mut c2, ComponentKind::VoltageSource, 0, 1, 5.0);
        place(&mut c2, ComponentKind::Resistor, 0, 1, 50.0);
        let shorted = place(&mut c2, ComponentKind::Resistor, 2, 3, 10.0);
        place(&mut c2, ComponentKind::Wire, 2, 3, 0.0);
        assert!(c2.calculate().unwrap());
        assert_eq!(results(&c2, shorted), (0.0, 0.0));
    }
}
