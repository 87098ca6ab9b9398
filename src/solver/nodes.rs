//! Node building: spots to electrical nodes to abstract nodes.
//!
//! Wires are ideal conductors, so every spot reachable from another through
//! wires sits at the same potential. Those wire-equivalence classes become
//! electrical nodes. Each electrical node then becomes an [`AbstractNode`]
//! carrying one typed, polarized [`Connection`] per resistor or voltage source
//! leaving it.

use log::{debug, trace};

use crate::circuit::{ComponentId, Components, NodeId, Polarity, Spot, SpotId, Unit};
use crate::components::{Component, ComponentKind};
use crate::error::{OhmgridError, Result};

/// A set of spots joined by wires, all at one potential.
#[derive(Debug, Clone, PartialEq)]
pub struct ElectricalNode {
    pub id: NodeId,
    pub spots: Vec<SpotId>,
}

impl ElectricalNode {
    pub fn contains(&self, spot: SpotId) -> bool {
        self.spots.contains(&spot)
    }
}

/// Lookup from spot handle to the electrical node holding it.
#[derive(Debug, Clone)]
pub struct NodeMap {
    by_spot: Vec<Option<NodeId>>,
}

impl NodeMap {
    /// Node holding `spot`, if the spot is populated.
    pub fn node_of(&self, spot: SpotId) -> Option<NodeId> {
        self.by_spot.get(spot.0).copied().flatten()
    }

    /// Node holding `spot`, failing if the spot was never assigned.
    pub fn require(&self, spot: SpotId) -> Result<NodeId> {
        self.node_of(spot).ok_or_else(|| {
            OhmgridError::structural(format!("spot {} belongs to no electrical node", spot))
        })
    }
}

/// A typed, polarized edge from one abstract node to another.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Connection {
    /// Node at the other end
    pub other: NodeId,
    /// Ohms or volts depending on `unit`
    pub magnitude: f64,
    pub unit: Unit,
    /// Side of the component the owning node is on
    pub polarity: Polarity,
}

impl Connection {
    pub fn resistor(other: NodeId, ohms: f64, polarity: Polarity) -> Self {
        Self {
            other,
            magnitude: ohms,
            unit: Unit::Ohm,
            polarity,
        }
    }

    pub fn source(other: NodeId, volts: f64, polarity: Polarity) -> Self {
        Self {
            other,
            magnitude: volts,
            unit: Unit::Volt,
            polarity,
        }
    }

    pub fn is_resistor(&self) -> bool {
        self.unit == Unit::Ohm
    }

    pub fn is_source(&self) -> bool {
        self.unit == Unit::Volt
    }

    /// The same component seen from `owner`, the node at the other end.
    pub fn mirrored(&self, owner: NodeId) -> Self {
        Self {
            other: owner,
            polarity: self.polarity.flip(),
            ..*self
        }
    }

    /// Whether `other` holds the mirrored entry of this connection owned by
    /// `owner`.
    pub fn mirrors(&self, owner: NodeId, other: &Connection) -> bool {
        other.other == owner
            && other.unit == self.unit
            && other.polarity == self.polarity.flip()
            && other.magnitude == self.magnitude
    }
}

/// An electrical node with its connections to other nodes.
///
/// Several connections to the same neighbour are legal until reduction.
#[derive(Debug, Clone, PartialEq)]
pub struct AbstractNode {
    pub id: NodeId,
    pub connections: Vec<Connection>,
}

impl AbstractNode {
    pub fn new(id: NodeId) -> Self {
        Self {
            id,
            connections: Vec::new(),
        }
    }

    pub fn add_connection(&mut self, connection: Connection) {
        self.connections.push(connection);
    }

    /// All connections leading to `other`.
    pub fn connections_to(&self, other: NodeId) -> impl Iterator<Item = &Connection> {
        self.connections.iter().filter(move |c| c.other == other)
    }

    /// Remove the first connection equal to `connection`.
    pub fn remove_connection(&mut self, connection: &Connection) -> bool {
        match self.connections.iter().position(|c| c == connection) {
            Some(idx) => {
                self.connections.remove(idx);
                true
            }
            None => false,
        }
    }

    /// Resistor connections.
    pub fn resistors(&self) -> impl Iterator<Item = &Connection> {
        self.connections.iter().filter(|c| c.is_resistor())
    }

    /// Voltage-source connections.
    pub fn sources(&self) -> impl Iterator<Item = &Connection> {
        self.connections.iter().filter(|c| c.is_source())
    }
}

/// Group populated spots into wire-connected electrical nodes.
///
/// Spots are visited in handle order and each new group gets the next id,
/// so the first populated spot always lands in node 0 (ground). The closure
/// over wires uses an explicit stack.
pub fn build_electrical_nodes(
    spots: &[Spot],
    components: &Components,
) -> Result<(Vec<ElectricalNode>, NodeMap)> {
    let mut by_spot: Vec<Option<NodeId>> = vec![None; spots.len()];
    let mut nodes = Vec::new();

    for (start, spot) in spots.iter().enumerate() {
        if spot.is_unused() || by_spot[start].is_some() {
            continue;
        }

        let id = NodeId(nodes.len());
        let mut members = vec![SpotId(start)];
        let mut stack = vec![SpotId(start)];
        by_spot[start] = Some(id);

        while let Some(current) = stack.pop() {
            for neighbour in wire_neighbours(spots, components, current)? {
                if by_spot[neighbour.0].is_none() {
                    by_spot[neighbour.0] = Some(id);
                    members.push(neighbour);
                    stack.push(neighbour);
                }
            }
        }

        trace!("electrical node {} holds spots {:?}", id, members);
        nodes.push(ElectricalNode { id, spots: members });
    }

    debug!("found {} electrical nodes", nodes.len());
    Ok((nodes, NodeMap { by_spot }))
}

/// Spots one wire away from `spot`.
fn wire_neighbours(spots: &[Spot], components: &Components, spot: SpotId) -> Result<Vec<SpotId>> {
    let mut neighbours = Vec::new();
    for &id in &spots[spot.0].components {
        let component = lookup(components, id)?;
        if !component.is_wire() {
            continue;
        }
        let other = component.other(spot).ok_or_else(|| {
            OhmgridError::structural(format!(
                "wire {} listed on spot {} it does not touch",
                id, spot
            ))
        })?;
        if other.0 >= spots.len() {
            return Err(OhmgridError::spot_not_found(other));
        }
        neighbours.push(other);
    }
    Ok(neighbours)
}

fn lookup(components: &Components, id: ComponentId) -> Result<&Component> {
    components.get(id).ok_or_else(|| {
        OhmgridError::structural(format!("spot references removed component {}", id))
    })
}

/// Turn electrical nodes into abstract nodes with typed connections.
///
/// Every resistor and voltage source bridging two nodes appears once in each
/// of them with opposite polarity. A resistor shorted by wires (both ends in
/// one node) carries no current and is skipped; a shorted voltage source is an
/// error.
pub fn convert_to_abstract_nodes(
    electrical: &[ElectricalNode],
    node_map: &NodeMap,
    spots: &[Spot],
    components: &Components,
) -> Result<Vec<AbstractNode>> {
    let mut nodes: Vec<AbstractNode> =
        electrical.iter().map(|n| AbstractNode::new(n.id)).collect();

    for node in electrical {
        let mut seen: Vec<ComponentId> = Vec::new();

        for &spot in &node.spots {
            for &id in &spots[spot.0].components {
                if seen.contains(&id) {
                    continue;
                }
                seen.push(id);

                let component = lookup(components, id)?;
                let unit = match component.kind {
                    ComponentKind::Wire => continue,
                    ComponentKind::Resistor => Unit::Ohm,
                    ComponentKind::VoltageSource => Unit::Volt,
                };

                let other_spot = component.other(spot).ok_or_else(|| {
                    OhmgridError::structural(format!(
                        "component {} listed on spot {} it does not touch",
                        id, spot
                    ))
                })?;
                let other = node_map.require(other_spot)?;

                if other == node.id {
                    if unit == Unit::Volt {
                        return Err(OhmgridError::ShortedVoltageSource { component: id });
                    }
                    trace!("resistor {} shorted inside node {}", id, node.id);
                    continue;
                }

                let far = &electrical[other.0];
                let polarity = polarity_of(node, far, component.positive, component.negative)
                    .ok_or_else(|| {
                        OhmgridError::structural(format!(
                            "cannot tell polarity of component {} between nodes {} and {}",
                            id, node.id, other
                        ))
                    })?;

                nodes[node.id.0].add_connection(Connection {
                    other,
                    magnitude: component.value,
                    unit,
                    polarity,
                });
            }
        }
    }

    Ok(nodes)
}

/// Polarity of `node` relative to a component whose far end is in `other`.
fn polarity_of(
    node: &ElectricalNode,
    other: &ElectricalNode,
    positive: SpotId,
    negative: SpotId,
) -> Option<Polarity> {
    if other.contains(negative) && node.contains(positive) {
        Some(Polarity::Positive)
    } else if other.contains(positive) && node.contains(negative) {
        Some(Polarity::Negative)
    } else {
        None
    }
}
