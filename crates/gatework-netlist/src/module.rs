//! Module, port, cell, and process representation.

use crate::value::Scalar;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// Port direction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PortDirection {
    Input,
    Output,
    Inout,
}

/// Module port
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Port {
    /// Port name
    pub name: String,
    /// Port direction
    pub direction: PortDirection,
    /// Port width in bits
    pub width: usize,
}

/// A cell instance inside a module.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Cell {
    /// Instance name
    pub name: String,
    /// Cell type being instantiated
    pub kind: String,
    /// Nets driving the cell inputs
    pub inputs: Vec<String>,
    /// Nets driven by the cell outputs
    pub outputs: Vec<String>,
}

/// A behavioral process inside a module.
///
/// Processes are imperative descriptions that gate-level passes cannot
/// operate on. A module containing any process is unmappable; passes
/// discover this, they never set it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Process {
    /// Process name
    pub name: String,
}

/// A named netlist unit within the design.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Module {
    /// Module name
    pub name: String,
    /// Boundary ports
    pub ports: Vec<Port>,
    /// Cell instances, keyed by instance name
    pub cells: IndexMap<String, Cell>,
    /// Behavioral processes
    pub processes: Vec<Process>,
    /// Module attributes
    pub attributes: IndexMap<String, Scalar>,
}

impl Module {
    /// Create an empty module with the given name.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ports: Vec::new(),
            cells: IndexMap::new(),
            processes: Vec::new(),
            attributes: IndexMap::new(),
        }
    }

    /// Whether the module contains behavioral processes.
    pub fn has_processes(&self) -> bool {
        !self.processes.is_empty()
    }

    /// Add a port to the module boundary.
    pub fn add_port(&mut self, name: impl Into<String>, direction: PortDirection, width: usize) {
        self.ports.push(Port {
            name: name.into(),
            direction,
            width,
        });
    }

    /// Add a cell instance.
    pub fn add_cell(&mut self, cell: Cell) {
        self.cells.insert(cell.name.clone(), cell);
    }

    /// Whether the attribute is present.
    pub fn has_attr(&self, key: &str) -> bool {
        self.attributes.contains_key(key)
    }

    /// Attribute value as an integer, if present and coercible.
    pub fn attr_int(&self, key: &str) -> Option<i64> {
        self.attributes.get(key).and_then(Scalar::as_int)
    }

    /// Set an attribute.
    pub fn set_attr(&mut self, key: impl Into<String>, value: impl Into<Scalar>) {
        self.attributes.insert(key.into(), value.into());
    }

    /// Remove an attribute, returning its previous value.
    pub fn remove_attr(&mut self, key: &str) -> Option<Scalar> {
        self.attributes.shift_remove(key)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn process_detection() {
        let mut m = Module::new("ctrl");
        assert!(!m.has_processes());
        m.processes.push(Process {
            name: "p0".to_string(),
        });
        assert!(m.has_processes());
    }

    #[test]
    fn attribute_round_trip() {
        let mut m = Module::new("alu");
        m.set_attr("depth", 3i64);
        assert!(m.has_attr("depth"));
        assert_eq!(m.attr_int("depth"), Some(3));
        assert_eq!(m.remove_attr("depth"), Some(Scalar::Int(3)));
        assert!(!m.has_attr("depth"));
    }
}
