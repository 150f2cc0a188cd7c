//! Implementation of [`Action::Map`][am].
//!
//! [am]: crate::cli::Action::Map

use anyhow::{Context, Result};
use memory::address::VirtualAddress;
use scatter_gather::{destroy, try_map};

use crate::{
    action::{print_destroy, print_list},
    cli::map::MapConfig,
    common::Settings,
};

/// Maps the buffer described by `config` and prints the resulting list.
///
/// # Errors
///
/// Returns an error if the buffer cannot be mapped.
pub fn run_map(settings: &Settings, config: MapConfig) -> Result<()> {
    let translator = settings.translator();
    let buffer = VirtualAddress::new(config.address);

    let list = try_map(&translator, buffer, config.length)
        .with_context(|| format!("failed to map {} bytes at {buffer}", config.length))?;
    println!(
        "page size {}, {} translation",
        settings.page_size,
        settings.translator.as_str()
    );
    print_list("list", &list);
    print_destroy("list", destroy(list));

    Ok(())
}
