//! Command line parsing and [`Action::Copy`][ac] construction.
//!
//! [ac]: crate::cli::Action::Copy

use clap::{Arg, ArgMatches, Command};

use crate::common::parse_u64;

/// Description of the buffers involved in a copy and the bytes to transfer.
#[derive(Clone, Copy, Debug, Hash, PartialEq, Eq)]
pub struct CopyConfig {
    /// The address of the first byte of the source buffer.
    pub src_address: u64,
    /// The number of bytes in the source buffer.
    pub src_length: u64,
    /// The address of the first byte of the destination buffer.
    pub dest_address: u64,
    /// The number of bytes in the destination buffer.
    pub dest_length: u64,
    /// The offset into the source list of the first byte to copy.
    pub offset: u64,
    /// The number of bytes to copy.
    pub count: u64,
}

/// Parses the arguments required to produce a valid [`CopyConfig`].
///
/// The destination length and the byte count default to the source length.
pub fn parse_arguments(matches: &ArgMatches) -> CopyConfig {
    let get = |name: &str| matches.get_one::<u64>(name).copied();

    let src_address = get("src-address")
        .unwrap_or_else(|| unreachable!("`src-address` should have a default value"));
    let src_length =
        get("src-length").unwrap_or_else(|| unreachable!("`src-length` is a required argument"));
    let dest_address = get("dest-address")
        .unwrap_or_else(|| unreachable!("`dest-address` should have a default value"));
    let dest_length = get("dest-length").unwrap_or(src_length);
    let offset =
        get("offset").unwrap_or_else(|| unreachable!("`offset` should have a default value"));
    let count = get("count").unwrap_or(src_length);

    CopyConfig {
        src_address,
        src_length,
        dest_address,
        dest_length,
        offset,
        count,
    }
}

/// Returns the command parser for an [`Action::Copy`][ac].
///
/// [ac]: crate::cli::Action::Copy
pub fn subcommand_parser() -> Command {
    let src_address = Arg::new("src-address")
        .long("src-address")
        .value_parser(parse_u64)
        .default_value("0x1006");

    let src_length = Arg::new("src-length")
        .long("src-length")
        .value_parser(parse_u64)
        .required(true);

    let dest_address = Arg::new("dest-address")
        .long("dest-address")
        .value_parser(parse_u64)
        .default_value("0x8013");

    let dest_length = Arg::new("dest-length")
        .long("dest-length")
        .value_parser(parse_u64);

    let offset = Arg::new("offset")
        .long("offset")
        .value_parser(parse_u64)
        .default_value("0");

    let count = Arg::new("count").long("count").value_parser(parse_u64);

    Command::new("copy")
        .about("Copies between two mapped buffers and verifies the result against a flat copy")
        .arg(src_address)
        .arg(src_length)
        .arg(dest_address)
        .arg(dest_length)
        .arg(offset)
        .arg(count)
}
