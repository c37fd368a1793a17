//! Top-level design container.
//!
//! A [`Design`] holds the module table, the scratchpad, and the selection
//! stack. Passes receive it explicitly and use the selection stack to scope
//! their work: push on entry, pop on exit, always balanced. The bottom
//! entry is the whole-design selection and cannot be popped.

use crate::module::Module;
use crate::selection::Selection;
use crate::value::Scalar;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// A complete hardware design.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Design {
    modules: IndexMap<String, Module>,
    scratchpad: IndexMap<String, Scalar>,
    selection_stack: Vec<Selection>,
}

impl Design {
    /// Create an empty design with the whole-design selection active.
    pub fn new() -> Self {
        Self {
            modules: IndexMap::new(),
            scratchpad: IndexMap::new(),
            selection_stack: vec![Selection::full()],
        }
    }

    /// Add a module, replacing any module of the same name.
    pub fn add_module(&mut self, module: Module) {
        self.modules.insert(module.name.clone(), module);
    }

    /// Look up a module by name.
    pub fn module(&self, name: &str) -> Option<&Module> {
        self.modules.get(name)
    }

    /// Look up a module by name, mutably.
    pub fn module_mut(&mut self, name: &str) -> Option<&mut Module> {
        self.modules.get_mut(name)
    }

    /// Remove a module, returning it.
    pub fn remove_module(&mut self, name: &str) -> Option<Module> {
        self.modules.shift_remove(name)
    }

    /// All modules in design order.
    pub fn modules(&self) -> impl Iterator<Item = &Module> {
        self.modules.values()
    }

    // --- scratchpad -------------------------------------------------------

    /// Raw scratchpad entry.
    pub fn scratchpad(&self, key: &str) -> Option<&Scalar> {
        self.scratchpad.get(key)
    }

    /// Scratchpad entry as a boolean, falling back to `default` when the
    /// key is absent or not coercible.
    pub fn scratchpad_get_bool(&self, key: &str, default: bool) -> bool {
        self.scratchpad
            .get(key)
            .and_then(Scalar::as_bool)
            .unwrap_or(default)
    }

    /// Scratchpad entry as an integer, falling back to `default`.
    pub fn scratchpad_get_int(&self, key: &str, default: i64) -> i64 {
        self.scratchpad
            .get(key)
            .and_then(Scalar::as_int)
            .unwrap_or(default)
    }

    /// Store a scratchpad entry.
    pub fn scratchpad_set(&mut self, key: impl Into<String>, value: impl Into<Scalar>) {
        self.scratchpad.insert(key.into(), value.into());
    }

    // --- selection stack --------------------------------------------------

    /// The active selection.
    pub fn selection(&self) -> &Selection {
        self.selection_stack
            .last()
            .expect("selection stack never empties")
    }

    /// The active selection, mutably.
    pub fn selection_mut(&mut self) -> &mut Selection {
        self.selection_stack
            .last_mut()
            .expect("selection stack never empties")
    }

    /// Enter a scoped selection.
    pub fn push_selection(&mut self, selection: Selection) {
        self.selection_stack.push(selection);
    }

    /// Leave a scoped selection. The bottom whole-design entry is kept;
    /// popping it returns `None`.
    pub fn pop_selection(&mut self) -> Option<Selection> {
        if self.selection_stack.len() > 1 {
            self.selection_stack.pop()
        } else {
            None
        }
    }

    /// Current depth of the selection stack.
    pub fn selection_depth(&self) -> usize {
        self.selection_stack.len()
    }

    /// Modules covered by the active selection, in design order.
    pub fn selected_modules(&self) -> Vec<&Module> {
        let selection = self.selection();
        self.modules
            .values()
            .filter(|m| selection.contains_module(&m.name))
            .collect()
    }

    /// Whether the active selection covers the named module in its
    /// entirety. A partial selection counts as whole only when it names
    /// every cell of the module.
    pub fn selected_whole_module(&self, name: &str) -> bool {
        let selection = self.selection();
        if selection.module_wholly_selected(name) {
            return true;
        }
        match (selection.partial_cells(name), self.modules.get(name)) {
            (Some(cells), Some(module)) => module.cells.keys().all(|c| cells.contains(c)),
            _ => false,
        }
    }
}

impl Default for Design {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::module::{Cell, PortDirection};

    fn module_with_cells(name: &str, cells: &[&str]) -> Module {
        let mut m = Module::new(name);
        m.add_port("y", PortDirection::Output, 1);
        for c in cells {
            m.add_cell(Cell {
                name: (*c).to_string(),
                kind: "AND".to_string(),
                inputs: vec!["a".to_string(), "b".to_string()],
                outputs: vec!["y".to_string()],
            });
        }
        m
    }

    #[test]
    fn scratchpad_defaults_and_overrides() {
        let mut design = Design::new();
        assert!(!design.scratchpad_get_bool("lutmap.dff", false));
        assert!(design.scratchpad_get_bool("lutmap.dff", true));

        design.scratchpad_set("lutmap.dff", true);
        assert!(design.scratchpad_get_bool("lutmap.dff", false));

        design.scratchpad_set("count", 9i64);
        assert_eq!(design.scratchpad_get_int("count", 0), 9);
        assert_eq!(design.scratchpad_get_int("missing", -1), -1);
    }

    #[test]
    fn selection_stack_balances() {
        let mut design = Design::new();
        assert_eq!(design.selection_depth(), 1);

        design.push_selection(Selection::empty());
        assert_eq!(design.selection_depth(), 2);
        assert!(design.pop_selection().is_some());
        assert_eq!(design.selection_depth(), 1);

        // the base whole-design selection stays put
        assert!(design.pop_selection().is_none());
        assert_eq!(design.selection_depth(), 1);
        assert!(design.selection().is_full_design());
    }

    #[test]
    fn whole_module_detection() {
        let mut design = Design::new();
        design.add_module(module_with_cells("alu", &["add0", "add1"]));

        // full-design selection covers everything
        assert!(design.selected_whole_module("alu"));

        design.push_selection(Selection::empty());
        assert!(!design.selected_whole_module("alu"));

        design.selection_mut().select_cells("alu", ["add0"]);
        assert!(!design.selected_whole_module("alu"));

        design.selection_mut().select_cells("alu", ["add1"]);
        assert!(design.selected_whole_module("alu"));
        design.pop_selection();
    }

    #[test]
    fn design_serialization_round_trip() {
        let mut design = Design::new();
        design.add_module(module_with_cells("alu", &["add0"]));
        design.scratchpad_set("lutmap.dff", true);

        let json = serde_json::to_string(&design).unwrap();
        let restored: Design = serde_json::from_str(&json).unwrap();
        assert!(restored.module("alu").is_some());
        assert!(restored.scratchpad_get_bool("lutmap.dff", false));
        assert_eq!(restored.selection_depth(), 1);
    }

    #[test]
    fn selected_modules_follow_design_order() {
        let mut design = Design::new();
        design.add_module(module_with_cells("b", &[]));
        design.add_module(module_with_cells("a", &[]));

        let names: Vec<_> = design.selected_modules().iter().map(|m| m.name.clone()).collect();
        assert_eq!(names, ["b", "a"]);

        design.push_selection(Selection::empty());
        design.selection_mut().select_module("a");
        let names: Vec<_> = design.selected_modules().iter().map(|m| m.name.clone()).collect();
        assert_eq!(names, ["a"]);
        design.pop_selection();
    }
}
