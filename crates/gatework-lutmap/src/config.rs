//! Translation of pass options into the per-invocation configuration.
//!
//! Options come in as a flat token list from the host shell. Recognized
//! flags are either forwarded into the engine invocation template (with or
//! without a value) or consumed into pass-local configuration; the first
//! unrecognized token ends option parsing and everything after it belongs
//! to the design-unit selection mechanism.

use crate::engine::EngineCommand;
use crate::error::Result;
use crate::ops::keys;
use crate::script::StageWindow;
use gatework_netlist::Design;
use std::path::PathBuf;

/// Immutable per-invocation configuration of the mapping pass.
///
/// Built fresh by [`parse_args`] on every invocation and never mutated
/// mid-run.
#[derive(Debug, Clone)]
pub struct MapConfig {
    /// Accumulated engine invocation template.
    pub engine: EngineCommand,
    /// Include sequential elements in exported fragments (`-dff`).
    pub with_ff: bool,
    /// Remove temp workspaces after each unit (`-nocleanup` disables).
    pub cleanup: bool,
    /// Boundary/box library path (`-box`); `None` derives the description
    /// automatically.
    pub box_file: Option<PathBuf>,
}

impl Default for MapConfig {
    fn default() -> Self {
        Self {
            engine: EngineCommand::new(),
            with_ff: false,
            cleanup: true,
            box_file: None,
        }
    }
}

/// Outcome of option translation.
#[derive(Debug)]
pub struct ParsedArgs {
    /// The per-invocation configuration.
    pub config: MapConfig,
    /// Which stages to run (`-run <from>[:<to>]`).
    pub window: StageWindow,
    /// Tokens left for the design-unit selection mechanism.
    pub selection_args: Vec<String>,
}

/// Flags forwarded into the engine template together with their value.
const FORWARDED_WITH_VALUE: &[&str] = &["-exe", "-script", "-D", "-lut", "-luts", "-W"];

/// Switches forwarded into the engine template verbatim.
const FORWARDED_BARE: &[&str] = &["-fast", "-showtmp", "-nomfs"];

/// Translate the token list against the design's scratchpad defaults.
///
/// `lutmap.dff` and `lutmap.nocleanup` scratchpad entries provide fallback
/// defaults for `-dff` and `-nocleanup`; an explicit flag overrides the
/// scratchpad, never the other way around. Trailing tokens are not
/// validated here.
pub fn parse_args(args: &[String], design: &Design) -> Result<ParsedArgs> {
    let mut engine = EngineCommand::new();
    let mut with_ff = design.scratchpad_get_bool(keys::DFF, false);
    let mut cleanup = !design.scratchpad_get_bool(keys::NOCLEANUP, false);
    let mut box_file = None;
    let mut window = StageWindow::all();

    let mut idx = 0;
    while idx < args.len() {
        let arg = args[idx].as_str();
        if FORWARDED_WITH_VALUE.contains(&arg) && idx + 1 < args.len() {
            engine.push(arg);
            engine.push(&args[idx + 1]);
            idx += 2;
            continue;
        }
        if FORWARDED_BARE.contains(&arg) {
            engine.push(arg);
            idx += 1;
            continue;
        }
        match arg {
            "-dff" => {
                with_ff = true;
                idx += 1;
            }
            "-nocleanup" => {
                cleanup = false;
                idx += 1;
            }
            "-box" if idx + 1 < args.len() => {
                box_file = Some(PathBuf::from(&args[idx + 1]));
                idx += 2;
            }
            "-run" if idx + 1 < args.len() => {
                window = StageWindow::parse(&args[idx + 1])?;
                idx += 2;
            }
            _ => break,
        }
    }

    Ok(ParsedArgs {
        config: MapConfig {
            engine,
            with_ff,
            cleanup,
            box_file,
        },
        window,
        selection_args: args[idx..].to_vec(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::DEFAULT_ENGINE;
    use crate::script::Stage;
    use std::path::Path;

    fn tokens(args: &[&str]) -> Vec<String> {
        args.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn value_flags_are_forwarded_in_order() {
        let design = Design::new();
        let parsed =
            parse_args(&tokens(&["-lut", "4:6", "-D", "500", "-fast"]), &design).unwrap();
        assert_eq!(
            parsed.config.engine.display(),
            format!("{DEFAULT_ENGINE} -lut 4:6 -D 500 -fast")
        );
        assert!(parsed.selection_args.is_empty());
    }

    #[test]
    fn local_flags_are_consumed_not_forwarded() {
        let design = Design::new();
        let parsed = parse_args(
            &tokens(&["-dff", "-nocleanup", "-box", "cells.box"]),
            &design,
        )
        .unwrap();
        assert!(parsed.config.with_ff);
        assert!(!parsed.config.cleanup);
        assert_eq!(parsed.config.box_file.as_deref(), Some(Path::new("cells.box")));
        assert_eq!(parsed.config.engine.display(), DEFAULT_ENGINE);
    }

    #[test]
    fn scratchpad_provides_fallback_defaults() {
        let mut design = Design::new();
        design.scratchpad_set(keys::DFF, true);
        design.scratchpad_set(keys::NOCLEANUP, true);

        let parsed = parse_args(&[], &design).unwrap();
        assert!(parsed.config.with_ff);
        assert!(!parsed.config.cleanup);
    }

    #[test]
    fn explicit_flags_override_the_scratchpad() {
        let mut design = Design::new();
        design.scratchpad_set(keys::NOCLEANUP, false);
        let parsed = parse_args(&tokens(&["-nocleanup"]), &design).unwrap();
        assert!(!parsed.config.cleanup);
    }

    #[test]
    fn first_unknown_token_ends_option_parsing() {
        let design = Design::new();
        let parsed = parse_args(&tokens(&["-lut", "4", "top", "-dff"]), &design).unwrap();
        assert_eq!(parsed.selection_args, tokens(&["top", "-dff"]));
        // -dff after the cut belongs to selection, not to us
        assert!(!parsed.config.with_ff);
    }

    #[test]
    fn run_window_is_parsed() {
        let design = Design::new();
        let parsed = parse_args(&tokens(&["-run", "pre:map"]), &design).unwrap();
        assert!(parsed.window.contains(Stage::Pre));
        assert!(parsed.window.contains(Stage::Map));
        assert!(!parsed.window.contains(Stage::Post));
    }

    #[test]
    fn fresh_config_per_invocation() {
        let mut design = Design::new();
        let first = parse_args(&tokens(&["-dff"]), &design).unwrap();
        assert!(first.config.with_ff);

        // nothing from the first invocation leaks into the second
        let second = parse_args(&[], &design).unwrap();
        assert!(!second.config.with_ff);

        design.scratchpad_set(keys::DFF, true);
        let third = parse_args(&[], &design).unwrap();
        assert!(third.config.with_ff);
    }
}
