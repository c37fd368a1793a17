//! External-engine LUT mapping pass.
//!
//! This crate sequences technology mapping of a design's combinational
//! logic through an external optimization engine, one module at a time:
//!
//! 1. `pre`: decompose the design into mappable acyclic fragments
//!    (cycle breaking, timing and hole preparation, 2-input canonical
//!    form), all delegated through [`DesignOps`];
//! 2. `map`: per selected module, export the fragment and its boundary
//!    description into a scoped temp workspace, run the engine as a
//!    blocking subprocess, import the result as `<module>$lutmap`, and
//!    reintegrate it;
//! 3. `post`: restore the decomposed structure.
//!
//! Stages are checkpointed and resumable through `-run <from>[:<to>]`.
//!
//! # Options
//!
//! | Flag | Effect |
//! |------|--------|
//! | `-exe <cmd>` | forwarded: override the engine executable |
//! | `-script <file>` | forwarded: engine script; a leading `+` marks an inline comma-separated command string |
//! | `-D <ps>` | forwarded: delay target in picoseconds |
//! | `-lut <w>` / `-lut <w1>:<w2>` / `-lut <file>` | forwarded: LUT cost model |
//! | `-luts <c1>,<c2>,..` | forwarded: per-input-count LUT costs |
//! | `-W <delay>` | forwarded: wire delay |
//! | `-fast` | forwarded: faster, lower-quality engine script |
//! | `-showtmp` | forwarded: engine logs its temp paths |
//! | `-nomfs` | forwarded: disable the mfs post-pass |
//! | `-dff` | include sequential cells in exported fragments |
//! | `-nocleanup` | retain temp workspaces |
//! | `-box <file>` | boundary/box library for the export |
//! | `-run <from>[:<to>]` | run only the given stage span |
//!
//! Scratchpad entries `lutmap.dff` and `lutmap.nocleanup` supply fallback
//! defaults for `-dff` and `-nocleanup`. Tokens after the first
//! unrecognized one select the design units to map.

pub mod config;
pub mod engine;
pub mod error;
mod map;
pub mod ops;
pub mod script;
pub mod workspace;

pub use config::{parse_args, MapConfig, ParsedArgs};
pub use engine::{EngineCommand, DEFAULT_ENGINE};
pub use error::{MapError, Result};
pub use ops::{keys, DesignOp, DesignOps, MAPPED_SUFFIX};
pub use script::{Stage, StageWindow};
pub use workspace::{Retention, Workspace};

use gatework_netlist::Design;
use tracing::info;

/// Execute the mapping pass.
///
/// Translates `args` into a fresh configuration, hands trailing tokens to
/// the selection mechanism, and runs the staged script. Fatal conditions
/// abort immediately; units already reintegrated stay reintegrated.
pub fn execute<O: DesignOps + ?Sized>(
    design: &mut Design,
    ops: &mut O,
    args: &[String],
) -> Result<()> {
    let parsed = config::parse_args(args, design)?;
    ops.select(design, &parsed.selection_args)?;

    info!("executing LUT mapping pass");
    script::run(design, ops, &parsed.config, parsed.window)
}

/// Render the staged script for the given arguments without executing
/// anything. Used for self-documentation.
pub fn describe(args: &[String], design: &Design) -> Result<String> {
    let parsed = config::parse_args(args, design)?;
    Ok(script::render(&parsed.config, parsed.window))
}
