//! Staged script runner.
//!
//! The pass runs as three checkpointed stages, `pre` (whole-design
//! decomposition), `map` (the per-unit loop), and `post` (restore the
//! decomposed structure), in fixed order, each independently selectable
//! through a start/end label window so a caller can resume mid-pipeline.
//!
//! Each stage is a list of step descriptions. Two strategies consume them,
//! chosen once at the top of the run: the executor dispatches every step's
//! operation, the renderer prints every step's command template and has no
//! side effects.

use crate::config::MapConfig;
use crate::error::{MapError, Result};
use crate::map;
use crate::ops::{DesignOp, DesignOps, MAPPED_SUFFIX};
use gatework_netlist::Design;
use std::fmt;
use std::fmt::Write as _;
use std::str::FromStr;
use tracing::debug;

/// Stage checkpoints, in fixed execution order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Stage {
    Pre,
    Map,
    Post,
}

impl Stage {
    /// All stages, in execution order.
    pub const ALL: [Stage; 3] = [Stage::Pre, Stage::Map, Stage::Post];

    /// The checkpoint label used on the command line.
    pub fn label(self) -> &'static str {
        match self {
            Stage::Pre => "pre",
            Stage::Map => "map",
            Stage::Post => "post",
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for Stage {
    type Err = MapError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "pre" => Ok(Stage::Pre),
            "map" => Ok(Stage::Map),
            "post" => Ok(Stage::Post),
            other => Err(MapError::UnknownStage(other.to_string())),
        }
    }
}

/// Start/end labels bounding which stages run. Stages outside the window
/// are skipped; the order of the ones inside never changes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StageWindow {
    from: Option<Stage>,
    to: Option<Stage>,
}

impl StageWindow {
    /// Run every stage.
    pub fn all() -> Self {
        Self {
            from: None,
            to: None,
        }
    }

    /// Run a single stage.
    pub fn only(stage: Stage) -> Self {
        Self {
            from: Some(stage),
            to: Some(stage),
        }
    }

    /// Run the inclusive span between two labels.
    pub fn span(from: Stage, to: Stage) -> Self {
        Self {
            from: Some(from),
            to: Some(to),
        }
    }

    /// Parse `<from>[:<to>]`. A bare label selects just that stage;
    /// `from:` and `:to` leave the other end open.
    pub fn parse(text: &str) -> Result<Self> {
        match text.split_once(':') {
            None => Ok(Self::only(text.parse()?)),
            Some((from, to)) => {
                let from = if from.is_empty() {
                    None
                } else {
                    Some(from.parse()?)
                };
                let to = if to.is_empty() { None } else { Some(to.parse()?) };
                Ok(Self { from, to })
            }
        }
    }

    /// Whether the stage falls inside the window.
    pub fn contains(&self, stage: Stage) -> bool {
        self.from.map_or(true, |f| stage >= f) && self.to.map_or(true, |t| stage <= t)
    }
}

/// One step of a stage: a command template for the rendered script plus
/// the operation the executor dispatches.
#[derive(Debug, Clone)]
struct Step {
    text: &'static str,
    note: Option<&'static str>,
    op: DesignOp,
}

impl Step {
    fn new(text: &'static str, op: DesignOp) -> Self {
        Self {
            text,
            note: None,
            op,
        }
    }

    fn annotated(text: &'static str, note: &'static str, op: DesignOp) -> Self {
        Self {
            text,
            note: Some(note),
            op,
        }
    }
}

/// The `pre` stage: whole-design decomposition into mappable fragments.
///
/// With `describing` set, configuration-dependent steps are always listed
/// (annotated) so the rendered script documents every variant.
fn pre_steps(config: &MapConfig, describing: bool) -> Vec<Step> {
    let with_ff = config.with_ff;
    let mut steps = vec![
        Step::new("check mapping preconditions", DesignOp::Check),
        Step::new("assign decomposition ids", DesignOp::AssignDecompIds),
        Step::new("break cycles", DesignOp::BreakCycles),
        Step::annotated(
            "prepare timing metadata [-dff]",
            "(option for -dff)",
            DesignOp::PrepTiming { with_ff },
        ),
        Step::annotated(
            "prepare hole boundaries [-dff]",
            "(option for -dff)",
            DesignOp::PrepHoles { with_ff },
        ),
        Step::new("group hole logic", DesignOp::GroupHoles),
        Step::new("flatten holes", DesignOp::FlattenHoles),
        Step::new("techmap holes", DesignOp::TechmapHoles),
    ];
    if with_ff || describing {
        steps.push(Step::annotated(
            "prepare ff passthrough",
            "(only with -dff)",
            DesignOp::PrepFf,
        ));
    }
    steps.push(Step::new("purge hole selection", DesignOp::PurgeHoles));
    steps.push(Step::new("map logic to 2-input gates", DesignOp::AigMap));
    steps.push(Step::new(
        "restore hole port directions",
        DesignOp::UnflipHolePorts,
    ));
    steps
}

/// The `post` stage: undo the decomposition using the ids assigned in
/// `pre`. Must only run after `map` has finished reintegrating.
fn post_steps() -> Vec<Step> {
    vec![Step::new("restore cycles", DesignOp::RestoreCycles)]
}

/// Strategy applied to each stage, chosen once per run.
trait StageStrategy {
    fn begin_stage(&mut self, stage: Stage) -> Result<()>;
    fn step(&mut self, step: &Step) -> Result<()>;
    fn map_stage(&mut self, config: &MapConfig) -> Result<()>;
}

/// Executes every step's operation against the design.
struct Executor<'a, O: DesignOps + ?Sized> {
    design: &'a mut Design,
    ops: &'a mut O,
}

impl<O: DesignOps + ?Sized> StageStrategy for Executor<'_, O> {
    fn begin_stage(&mut self, stage: Stage) -> Result<()> {
        debug!(stage = %stage, "entering stage");
        Ok(())
    }

    fn step(&mut self, step: &Step) -> Result<()> {
        self.ops.run_op(self.design, step.op)
    }

    fn map_stage(&mut self, config: &MapConfig) -> Result<()> {
        map::run_loop(self.design, self.ops, config)
    }
}

/// Renders every step's command template; no side effects.
struct Renderer<'a> {
    out: &'a mut String,
}

impl StageStrategy for Renderer<'_> {
    fn begin_stage(&mut self, stage: Stage) -> Result<()> {
        let _ = writeln!(self.out, "{}:", stage.label());
        Ok(())
    }

    fn step(&mut self, step: &Step) -> Result<()> {
        match step.note {
            Some(note) => {
                let _ = writeln!(self.out, "    {}    {}", step.text, note);
            }
            None => {
                let _ = writeln!(self.out, "    {}", step.text);
            }
        }
        Ok(())
    }

    fn map_stage(&mut self, config: &MapConfig) -> Result<()> {
        let _ = writeln!(self.out, "    foreach module in selection");
        let _ = writeln!(
            self.out,
            "        write_box [-box <file>] <workspace>/input.box"
        );
        let _ = writeln!(
            self.out,
            "        write_fragment <workspace>/input.xaig <workspace>/input.sym"
        );
        let _ = writeln!(
            self.out,
            "        {} -box <workspace>/input.box",
            config.engine.display()
        );
        let _ = writeln!(
            self.out,
            "        read_mapped -name <module>{MAPPED_SUFFIX} -map <workspace>/input.sym <workspace>/output.aig"
        );
        let _ = writeln!(self.out, "        reintegrate <module>");
        Ok(())
    }
}

fn drive<S: StageStrategy>(
    strategy: &mut S,
    config: &MapConfig,
    window: StageWindow,
    describing: bool,
) -> Result<()> {
    if window.contains(Stage::Pre) {
        strategy.begin_stage(Stage::Pre)?;
        for step in pre_steps(config, describing) {
            strategy.step(&step)?;
        }
    }
    if window.contains(Stage::Map) {
        strategy.begin_stage(Stage::Map)?;
        strategy.map_stage(config)?;
    }
    if window.contains(Stage::Post) {
        strategy.begin_stage(Stage::Post)?;
        for step in post_steps() {
            strategy.step(&step)?;
        }
    }
    Ok(())
}

/// Execute the staged script over the given window.
pub fn run<O: DesignOps + ?Sized>(
    design: &mut Design,
    ops: &mut O,
    config: &MapConfig,
    window: StageWindow,
) -> Result<()> {
    let mut strategy = Executor { design, ops };
    drive(&mut strategy, config, window, false)
}

/// Render the staged script as a human-readable template. No side effects.
pub fn render(config: &MapConfig, window: StageWindow) -> String {
    let mut out = String::new();
    let mut strategy = Renderer { out: &mut out };
    drive(&mut strategy, config, window, true).expect("rendering never fails");
    out
}
