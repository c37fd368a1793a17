//! Selection sets describing which design objects a pass applies to.

use indexmap::{IndexMap, IndexSet};
use serde::{Deserialize, Serialize};

/// The set of modules (and optionally individual cells) an operation
/// applies to.
///
/// A selection either covers the full design, or names modules wholly
/// and/or partially (a subset of a module's cells). Whether a partial
/// selection is acceptable is decided by each operation; operations that
/// require whole modules use [`crate::Design::selected_whole_module`].
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Selection {
    full_design: bool,
    modules: IndexSet<String>,
    partial: IndexMap<String, IndexSet<String>>,
}

impl Selection {
    /// A selection covering the whole design.
    pub fn full() -> Self {
        Self {
            full_design: true,
            ..Self::default()
        }
    }

    /// A selection covering nothing.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Whether this selection covers the whole design.
    pub fn is_full_design(&self) -> bool {
        self.full_design
    }

    /// Select a module in its entirety.
    pub fn select_module(&mut self, name: impl Into<String>) {
        let name = name.into();
        self.partial.shift_remove(&name);
        self.modules.insert(name);
    }

    /// Select individual cells of a module.
    ///
    /// Extends any previous partial selection of the same module; a module
    /// already wholly selected stays wholly selected.
    pub fn select_cells<I, S>(&mut self, module: impl Into<String>, cells: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let module = module.into();
        if self.modules.contains(&module) {
            return;
        }
        self.partial
            .entry(module)
            .or_default()
            .extend(cells.into_iter().map(Into::into));
    }

    /// Whether the module is covered at all (wholly or partially).
    pub fn contains_module(&self, name: &str) -> bool {
        self.full_design || self.modules.contains(name) || self.partial.contains_key(name)
    }

    /// Whether the module is selected as a whole, independent of its
    /// contents. Partial coverage is resolved by the design, which knows
    /// the module's cells.
    pub fn module_wholly_selected(&self, name: &str) -> bool {
        self.full_design || self.modules.contains(name)
    }

    /// The partially selected cells of a module, if any.
    pub fn partial_cells(&self, name: &str) -> Option<&IndexSet<String>> {
        self.partial.get(name)
    }

    /// Drop all module and cell entries, keeping the selection usable.
    pub fn clear(&mut self) {
        self.full_design = false;
        self.modules.clear();
        self.partial.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn full_selection_contains_everything() {
        let sel = Selection::full();
        assert!(sel.contains_module("anything"));
        assert!(sel.module_wholly_selected("anything"));
    }

    #[test]
    fn whole_beats_partial() {
        let mut sel = Selection::empty();
        sel.select_cells("alu", ["add0"]);
        assert!(sel.contains_module("alu"));
        assert!(!sel.module_wholly_selected("alu"));

        sel.select_module("alu");
        assert!(sel.module_wholly_selected("alu"));
        assert!(sel.partial_cells("alu").is_none());
    }

    #[test]
    fn clear_empties_the_selection() {
        let mut sel = Selection::full();
        sel.select_module("alu");
        sel.clear();
        assert!(!sel.contains_module("alu"));
    }
}
