//! Command line harness that maps buffers into scatter-gather lists and copies bytes between
//! them inside a simulated memory arena.

use anyhow::Result;

use crate::{
    action::{copy::run_copy, map::run_map, splice::run_splice},
    cli::Action,
};

pub mod action;
pub mod cli;
pub mod common;
pub mod logger;

fn main() -> Result<()> {
    let (settings, action) = cli::get_action();
    logger::init(settings.verbosity);

    match action {
        Action::Map(config) => run_map(&settings, config),
        Action::Copy(config) => run_copy(&settings, config),
        Action::Splice(config) => run_splice(&settings, config),
    }
}
