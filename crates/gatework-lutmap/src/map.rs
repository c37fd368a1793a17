//! Per-unit mapping loop.
//!
//! Iterates the active selection's modules in presented order and pushes
//! each one through extract → export → engine → import → reintegrate.
//! Behavioral units and zero-output fragments are skipped; everything else
//! that goes wrong aborts the run. The scoped selection pushed at loop
//! entry is popped on every exit path, including aborts.

use crate::config::MapConfig;
use crate::engine;
use crate::error::{MapError, Result};
use crate::ops::{keys, DesignOps, MAPPED_SUFFIX};
use crate::workspace::{Retention, Workspace};
use gatework_netlist::{Design, Selection};
use tracing::{info, warn};

/// Run the mapping loop over the currently selected modules.
pub(crate) fn run_loop<O: DesignOps + ?Sized>(
    design: &mut Design,
    ops: &mut O,
    config: &MapConfig,
) -> Result<()> {
    // Snapshot the units and their whole-module status under the caller's
    // selection before scoping down to one unit at a time.
    let units: Vec<(String, bool)> = design
        .selected_modules()
        .iter()
        .map(|m| (m.name.clone(), design.selected_whole_module(&m.name)))
        .collect();

    let mut scope = SelectionScope::enter(design);
    for (unit, whole) in &units {
        map_unit(scope.design(), ops, config, unit, *whole)?;
        scope.design().selection_mut().clear();
    }
    Ok(())
}

/// Scoped selection frame: pushed on entry, popped when the scope drops,
/// so the stack stays balanced on the abort path too.
struct SelectionScope<'a> {
    design: &'a mut Design,
}

impl<'a> SelectionScope<'a> {
    fn enter(design: &'a mut Design) -> Self {
        design.push_selection(Selection::empty());
        Self { design }
    }

    fn design(&mut self) -> &mut Design {
        self.design
    }
}

impl Drop for SelectionScope<'_> {
    fn drop(&mut self) {
        self.design.pop_selection();
    }
}

fn map_unit<O: DesignOps + ?Sized>(
    design: &mut Design,
    ops: &mut O,
    config: &MapConfig,
    unit: &str,
    whole: bool,
) -> Result<()> {
    let Some(module) = design.module(unit) else {
        return Err(MapError::Op {
            op: "map".to_string(),
            message: format!("selected module {unit} vanished during the run"),
        });
    };
    if module.has_processes() {
        info!("skipping module {unit} as it contains processes");
        return Ok(());
    }
    if module.has_attr(keys::BOX_ID) {
        return Err(MapError::BoxInSelection(unit.to_string()));
    }
    let prepared = module.has_attr(keys::DECOMP_ID);

    design.selection_mut().select_module(unit);
    if !whole {
        return Err(MapError::PartialSelection(unit.to_string()));
    }
    if !prepared {
        return Err(MapError::Unprepared(unit.to_string()));
    }

    let retention = if config.cleanup {
        Retention::Remove
    } else {
        Retention::Keep
    };
    let workspace = Workspace::create(retention)?;

    match map_fragment(design, ops, config, unit, &workspace) {
        Ok(()) => workspace.release(),
        Err(err) => {
            // retained for diagnosis; later attempts draw fresh names
            warn!(
                path = %workspace.path().display(),
                "mapping {unit} failed, temp workspace retained"
            );
            Err(err)
        }
    }
}

fn map_fragment<O: DesignOps + ?Sized>(
    design: &mut Design,
    ops: &mut O,
    config: &MapConfig,
    unit: &str,
    workspace: &Workspace,
) -> Result<()> {
    ops.write_box(
        design,
        unit,
        config.box_file.as_deref(),
        &workspace.box_file(),
    )?;
    ops.write_fragment(
        design,
        unit,
        &workspace.fragment_file(),
        &workspace.symbol_file(),
    )?;

    let gates = design.scratchpad_get_int(keys::NUM_GATES, 0);
    let wires = design.scratchpad_get_int(keys::NUM_WIRES, 0);
    let inputs = design.scratchpad_get_int(keys::NUM_INPUTS, 0);
    let outputs = design.scratchpad_get_int(keys::NUM_OUTPUTS, 0);
    info!(
        "extracted {gates} gates and {wires} wires to a netlist network \
         with {inputs} inputs and {outputs} outputs"
    );

    if outputs == 0 {
        info!("not calling the engine as there is nothing to map");
        return Ok(());
    }

    engine::invoke(&config.engine, workspace.path(), &workspace.box_file())?;

    let mapped_name = format!("{unit}{MAPPED_SUFFIX}");
    ops.read_mapped(
        design,
        &mapped_name,
        &workspace.symbol_file(),
        &workspace.result_file(),
    )?;
    ops.reintegrate(design, unit)?;
    Ok(())
}
