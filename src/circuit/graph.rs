//! Board graph structure.
//!
//! Spots and components live in two arenas owned by [`Circuit`]. Spots hold
//! the handles of the components touching them, components hold the handles
//! of their two spots. Removing a component leaves an empty slot so every
//! other handle stays valid.

use std::collections::HashMap;

use log::debug;

use super::types::{ComponentId, SpotId};
use crate::components::{Component, ComponentKind};
use crate::dsl::{is_si_prefix, parse_value, BoardAst};
use crate::error::{OhmgridError, Result};

/// A connection point on the board.
#[derive(Debug, Clone, Default)]
pub struct Spot {
    /// Label used by the text format and for messages
    pub label: String,
    /// Components with a terminal on this spot
    pub components: Vec<ComponentId>,
}

impl Spot {
    /// Create an unused spot.
    pub fn new(label: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            components: Vec::new(),
        }
    }

    /// A spot nothing touches.
    pub fn is_unused(&self) -> bool {
        self.components.is_empty()
    }

    /// A spot with a single unterminated component end.
    pub fn is_dangling(&self) -> bool {
        self.components.len() == 1
    }
}

/// Arena of component slots, indexed by [`ComponentId`].
#[derive(Debug, Clone, Default)]
pub struct Components {
    slots: Vec<Option<Component>>,
}

impl Components {
    /// Look up a live component.
    pub fn get(&self, id: ComponentId) -> Option<&Component> {
        self.slots.get(id.0).and_then(Option::as_ref)
    }

    /// Look up a live component mutably.
    pub fn get_mut(&mut self, id: ComponentId) -> Option<&mut Component> {
        self.slots.get_mut(id.0).and_then(Option::as_mut)
    }

    /// Iterate over live components in handle order.
    pub fn iter(&self) -> impl Iterator<Item = &Component> {
        self.slots.iter().flatten()
    }

    /// Iterate mutably over live components in handle order.
    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut Component> {
        self.slots.iter_mut().flatten()
    }

    /// Number of live components.
    pub fn len(&self) -> usize {
        self.iter().count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Zero every component's solved outputs.
    pub fn clear_results(&mut self) {
        for component in self.iter_mut() {
            component.clear_results();
        }
    }

    fn next_id(&self) -> ComponentId {
        ComponentId(self.slots.len())
    }

    fn insert(&mut self, component: Component) {
        debug_assert_eq!(component.id.0, self.slots.len());
        self.slots.push(Some(component));
    }

    fn take(&mut self, id: ComponentId) -> Option<Component> {
        self.slots.get_mut(id.0).and_then(Option::take)
    }
}

/// A board of spots and the components placed between them.
#[derive(Debug, Clone, Default)]
pub struct Circuit {
    /// All spots, indexed by [`SpotId`]
    pub spots: Vec<Spot>,

    /// All components, indexed by [`ComponentId`]
    pub components: Components,

    /// Mapping from spot labels to spot handles
    spot_map: HashMap<String, SpotId>,
}

impl Circuit {
    /// Create an empty board with no spots.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a rectangular board of `cols` x `rows` spots labelled `x,y`.
    ///
    /// Spots are laid out row by row, so spot `(x, y)` has handle
    /// `y * cols + x`.
    pub fn grid(cols: usize, rows: usize) -> Self {
        let mut circuit = Self::new();
        for y in 0..rows {
            for x in 0..cols {
                circuit.add_spot(format!("{},{}", x, y));
            }
        }
        circuit
    }

    /// Build a board from a parsed text description.
    pub fn from_ast(ast: BoardAst) -> Result<Self> {
        let mut circuit = Self::new();

        for label in &ast.spots {
            circuit.spot_or_insert(label);
        }

        for def in ast.components {
            let positive = circuit.spot_or_insert(&def.spots[0]);
            let negative = circuit.spot_or_insert(&def.spots[1]);
            let value = def.value.unwrap_or_else(|| def.kind.default_value());
            circuit
                .add_named_component(def.name.clone(), def.kind, positive, negative, value)
                .map_err(|e| match e {
                    OhmgridError::InvalidComponent { message, .. }
                    | OhmgridError::InvalidValue { message, .. } => OhmgridError::parse(
                        def.line,
                        format!("component '{}': {}", def.name, message),
                    ),
                    other => other,
                })?;
        }

        debug!(
            "built board with {} spots and {} components",
            circuit.spots.len(),
            circuit.components.len()
        );

        Ok(circuit)
    }

    /// Add a spot and return its handle. Labels are expected to be unique;
    /// a repeated label resolves to the most recent spot.
    pub fn add_spot(&mut self, label: impl Into<String>) -> SpotId {
        let label = label.into();
        let id = SpotId(self.spots.len());
        self.spot_map.insert(label.clone(), id);
        self.spots.push(Spot::new(label));
        id
    }

    fn spot_or_insert(&mut self, label: &str) -> SpotId {
        match self.find_spot(label) {
            Some(id) => id,
            None => self.add_spot(label),
        }
    }

    /// Find a spot by label.
    pub fn find_spot(&self, label: &str) -> Option<SpotId> {
        self.spot_map.get(label).copied()
    }

    /// Find a spot on a board built with [`Circuit::grid`].
    pub fn spot_at(&self, x: usize, y: usize) -> Option<SpotId> {
        self.find_spot(&format!("{},{}", x, y))
    }

    /// Get a spot by handle.
    pub fn spot(&self, id: SpotId) -> Option<&Spot> {
        self.spots.get(id.0)
    }

    /// Get a component by handle.
    pub fn component(&self, id: ComponentId) -> Option<&Component> {
        self.components.get(id)
    }

    /// Place a component with the kind's default value and a generated name.
    pub fn add_component(
        &mut self,
        kind: ComponentKind,
        positive: SpotId,
        negative: SpotId,
    ) -> Result<ComponentId> {
        let prefix = kind.name().chars().next().unwrap_or('X');
        let name = format!("{}{}", prefix, self.components.next_id().0);
        self.add_named_component(name, kind, positive, negative, kind.default_value())
    }

    /// Place a component between two spots.
    pub fn add_named_component(
        &mut self,
        name: String,
        kind: ComponentKind,
        positive: SpotId,
        negative: SpotId,
        value: f64,
    ) -> Result<ComponentId> {
        for spot in [positive, negative] {
            if self.spot(spot).is_none() {
                return Err(OhmgridError::spot_not_found(spot));
            }
        }
        if positive == negative {
            return Err(OhmgridError::InvalidComponent {
                name,
                message: "both terminals on the same spot".to_string(),
            });
        }

        let id = self.components.next_id();
        let component = Component::new(id, name, kind, positive, negative, value);
        if kind.has_value() {
            if let Some(message) = component.check_value(value) {
                return Err(OhmgridError::InvalidComponent {
                    name: component.name,
                    message: message.to_string(),
                });
            }
        }

        self.spots[positive.0].components.push(id);
        self.spots[negative.0].components.push(id);
        self.components.insert(component);
        Ok(id)
    }

    /// Remove a component and detach it from its spots.
    pub fn remove_component(&mut self, id: ComponentId) -> Result<Component> {
        let component = self
            .components
            .take(id)
            .ok_or(OhmgridError::ComponentNotFound { component: id })?;
        for spot in component.terminals() {
            self.spots[spot.0].components.retain(|&c| c != id);
        }
        Ok(component)
    }

    /// Remove every component, keeping the spots.
    pub fn clear_components(&mut self) {
        self.components = Components::default();
        for spot in &mut self.spots {
            spot.components.clear();
        }
    }

    /// Change a resistor's resistance or a source's voltage.
    pub fn set_value(&mut self, id: ComponentId, value: f64) -> Result<()> {
        let component = self
            .components
            .get_mut(id)
            .ok_or(OhmgridError::ComponentNotFound { component: id })?;
        if let Some(message) = component.check_value(value) {
            return Err(OhmgridError::invalid_value(id, message));
        }
        component.value = value;
        Ok(())
    }

    /// Change a value from user text such as `4.7k` or `10 m`.
    pub fn set_value_str(&mut self, id: ComponentId, text: &str) -> Result<()> {
        let text = text.trim();
        // At most one space, and only between the number and its prefix.
        let joined = match text.split_once(' ') {
            Some((number, prefix)) if is_si_prefix(prefix) => Some(format!("{}{}", number, prefix)),
            Some(_) => None,
            None => Some(text.to_string()),
        };
        let value = joined.as_deref().and_then(parse_value).ok_or_else(|| {
            OhmgridError::invalid_value(id, format!("cannot parse '{}'", text))
        })?;
        self.set_value(id, value)
    }

    /// Spots with at least one incident component, in handle order.
    pub fn populated_spots(&self) -> Vec<SpotId> {
        self.spots
            .iter()
            .enumerate()
            .filter(|(_, spot)| !spot.is_unused())
            .map(|(idx, _)| SpotId(idx))
            .collect()
    }
}
