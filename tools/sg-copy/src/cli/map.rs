//! Command line parsing and [`Action::Map`][am] construction.
//!
//! [am]: crate::cli::Action::Map

use clap::{Arg, ArgMatches, Command};

use crate::common::parse_u64;

/// Description of the buffer to map.
#[derive(Clone, Copy, Debug, Hash, PartialEq, Eq)]
pub struct MapConfig {
    /// The address of the first byte of the buffer.
    pub address: u64,
    /// The number of bytes in the buffer.
    pub length: u64,
}

/// Parses the arguments required to produce a valid [`MapConfig`].
pub fn parse_arguments(matches: &ArgMatches) -> MapConfig {
    let address = matches
        .get_one::<u64>("address")
        .copied()
        .unwrap_or_else(|| unreachable!("`address` should have a default value"));

    let length = matches
        .get_one::<u64>("length")
        .copied()
        .unwrap_or_else(|| unreachable!("`length` is a required argument"));

    MapConfig { address, length }
}

/// Returns the command parser for an [`Action::Map`][am].
///
/// [am]: crate::cli::Action::Map
pub fn subcommand_parser() -> Command {
    let address = Arg::new("address")
        .long("address")
        .value_parser(parse_u64)
        .default_value("0x1005");

    let length = Arg::new("length")
        .long("length")
        .value_parser(parse_u64)
        .required(true);

    Command::new("map")
        .about("Maps a buffer and prints the descriptors of its scatter-gather list")
        .arg(address)
        .arg(length)
}
