//! Command line parsing and [`Action::Splice`][as] construction.
//!
//! [as]: crate::cli::Action::Splice

use clap::{Arg, ArgMatches, Command};

use crate::common::parse_u64;

/// Description of the copy performed out of the spliced list.
#[derive(Clone, Copy, Debug, Hash, PartialEq, Eq)]
pub struct SpliceConfig {
    /// The offset into the spliced list of the first byte to copy.
    pub offset: u64,
    /// The number of bytes to copy, which is also the size of the destination buffer.
    pub count: u64,
}

/// Parses the arguments required to produce a valid [`SpliceConfig`].
pub fn parse_arguments(matches: &ArgMatches) -> SpliceConfig {
    let offset = matches
        .get_one::<u64>("offset")
        .copied()
        .unwrap_or_else(|| unreachable!("`offset` should have a default value"));

    let count = matches
        .get_one::<u64>("count")
        .copied()
        .unwrap_or_else(|| unreachable!("`count` should have a default value"));

    SpliceConfig { offset, count }
}

/// Returns the command parser for an [`Action::Splice`][as].
///
/// [as]: crate::cli::Action::Splice
pub fn subcommand_parser() -> Command {
    let offset = Arg::new("offset")
        .long("offset")
        .value_parser(parse_u64)
        .default_value("6");

    let count = Arg::new("count")
        .long("count")
        .value_parser(parse_u64)
        .default_value("84");

    Command::new("splice")
        .about("Replaces the tail of one mapped buffer's list with another list and copies from it")
        .arg(offset)
        .arg(count)
}
