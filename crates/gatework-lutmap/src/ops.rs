//! Delegated-operation seams.
//!
//! The mapping pass sequences work but owns none of the hard algorithms:
//! cycle breaking, timing preparation, hole flattening, AIG mapping, and the
//! interchange import/export all live in the surrounding toolkit, behind
//! [`DesignOps`]. The pass only relies on the contracts written down here.

use crate::error::Result;
use gatework_netlist::Design;
use std::path::Path;

/// Scratchpad and attribute keys shared between the pass and its
/// collaborators.
pub mod keys {
    /// Scratchpad fallback default for `-dff`.
    pub const DFF: &str = "lutmap.dff";
    /// Scratchpad fallback default for `-nocleanup`.
    pub const NOCLEANUP: &str = "lutmap.nocleanup";
    /// Module attribute holding the decomposition id assigned during `pre`
    /// and consumed during `post`.
    pub const DECOMP_ID: &str = "lutmap.decomp_id";
    /// Module attribute marking a box (boundary-only) module.
    pub const BOX_ID: &str = "lutmap.box_id";
    /// Gate count recorded by the fragment exporter.
    pub const NUM_GATES: &str = "write_xaig.num_gates";
    /// Wire count recorded by the fragment exporter.
    pub const NUM_WIRES: &str = "write_xaig.num_wires";
    /// Input count recorded by the fragment exporter.
    pub const NUM_INPUTS: &str = "write_xaig.num_inputs";
    /// Output count recorded by the fragment exporter.
    pub const NUM_OUTPUTS: &str = "write_xaig.num_outputs";
}

/// Suffix appended to a unit's name for its imported mapped result.
pub const MAPPED_SUFFIX: &str = "$lutmap";

/// A whole-design operation dispatched by the `pre` and `post` stages.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DesignOp {
    /// Validate that the selected units are ready for mapping.
    Check,
    /// Assign a unique [`keys::DECOMP_ID`] to every selected unit.
    AssignDecompIds,
    /// Break cyclic dependencies so fragments export acyclic.
    BreakCycles,
    /// Derive arrival/required-time metadata for unit boundaries.
    PrepTiming { with_ff: bool },
    /// Derive hole (black-box boundary) metadata.
    PrepHoles { with_ff: bool },
    /// Collect hole logic into its own selection.
    GroupHoles,
    /// Flatten the hole selection in place.
    FlattenHoles,
    /// Technology-map the hole selection in place.
    TechmapHoles,
    /// Insert sequential passthrough cells.
    PrepFf,
    /// Drop the hole selection and purge its scratch objects.
    PurgeHoles,
    /// Map remaining logic to the canonical 2-input gate form.
    AigMap,
    /// Restore port-direction flips made during hole extraction.
    UnflipHolePorts,
    /// Rebuild the original cyclic structure from decomposition ids.
    RestoreCycles,
}

impl DesignOp {
    /// Short name used in logs and error messages.
    pub fn name(self) -> &'static str {
        match self {
            DesignOp::Check => "check",
            DesignOp::AssignDecompIds => "assign_decomp_ids",
            DesignOp::BreakCycles => "break_cycles",
            DesignOp::PrepTiming { .. } => "prep_timing",
            DesignOp::PrepHoles { .. } => "prep_holes",
            DesignOp::GroupHoles => "group_holes",
            DesignOp::FlattenHoles => "flatten_holes",
            DesignOp::TechmapHoles => "techmap_holes",
            DesignOp::PrepFf => "prep_ff",
            DesignOp::PurgeHoles => "purge_holes",
            DesignOp::AigMap => "aigmap",
            DesignOp::UnflipHolePorts => "unflip_hole_ports",
            DesignOp::RestoreCycles => "restore_cycles",
        }
    }
}

/// Operations the mapping pass delegates to the surrounding toolkit.
///
/// Implementations operate on the design's *active selection*; the pass
/// arranges the selection stack so each call sees exactly the units it
/// should touch.
pub trait DesignOps {
    /// Run one whole-design decomposition step.
    fn run_op(&mut self, design: &mut Design, op: DesignOp) -> Result<()>;

    /// Apply trailing command tokens to the design's active selection.
    ///
    /// The pass does not validate these tokens; malformed ones surface
    /// through this method's own error path.
    fn select(&mut self, design: &mut Design, args: &[String]) -> Result<()>;

    /// Write the boundary/box description for `unit` to `dest`.
    ///
    /// `box_file` is the user-supplied box library; `None` means derive the
    /// description automatically from the design.
    fn write_box(
        &mut self,
        design: &Design,
        unit: &str,
        box_file: Option<&Path>,
        dest: &Path,
    ) -> Result<()>;

    /// Export `unit`'s logic fragment to `fragment` and its port-symbol map
    /// to `symbols`.
    ///
    /// Implementations must record the extracted gate, wire, input, and
    /// output counts into the design scratchpad under [`keys::NUM_GATES`],
    /// [`keys::NUM_WIRES`], [`keys::NUM_INPUTS`], and [`keys::NUM_OUTPUTS`].
    fn write_fragment(
        &mut self,
        design: &mut Design,
        unit: &str,
        fragment: &Path,
        symbols: &Path,
    ) -> Result<()>;

    /// Import the engine result at `source` into the design as a module
    /// named `name`, restoring wide ports through the `symbols` map written
    /// by [`DesignOps::write_fragment`].
    fn read_mapped(
        &mut self,
        design: &mut Design,
        name: &str,
        symbols: &Path,
        source: &Path,
    ) -> Result<()>;

    /// Replace `unit`'s mapped logic with the imported result.
    fn reintegrate(&mut self, design: &mut Design, unit: &str) -> Result<()>;
}
