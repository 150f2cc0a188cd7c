//! Implementation of [`Action::Splice`][as].
//!
//! [as]: crate::cli::Action::Splice

use anyhow::{Context, Result, bail};
use memory::address::VirtualAddress;
use scatter_gather::{copy, destroy, try_map};

use crate::{
    action::{arena, gather, pattern, print_destroy, print_list, window},
    cli::splice::SpliceConfig,
    common::Settings,
};

/// The start of the arena holding every buffer.
const ARENA_BASE: u64 = 0x1000;
/// The buffer whose list keeps its first descriptor.
const HEAD_BUFFER: u64 = 0x1004;
/// The number of bytes in the head buffer.
const HEAD_LENGTH: u64 = 74;
/// The buffer whose list replaces the released tail.
const TAIL_BUFFER: u64 = 0x2008;
/// The number of bytes in the tail buffer.
const TAIL_LENGTH: u64 = 47;
/// The destination buffer.
const DEST_BUFFER: u64 = 0x3000;

/// Maps two buffers, releases everything but the first descriptor of the first list, attaches
/// the second list in its place, and copies out of the result.
///
/// # Errors
///
/// Returns an error if a buffer cannot be mapped, if the destination is too large to be
/// simulated, or if the copied bytes do not match.
pub fn run_splice(settings: &Settings, config: SpliceConfig) -> Result<()> {
    let translator = settings.translator();

    let arena_end = DEST_BUFFER
        .checked_add(config.count)
        .context("destination buffer extends past the end of the address space")?;
    let mut memory = arena(ARENA_BASE, arena_end)?;
    memory.write(VirtualAddress::new(HEAD_BUFFER), &pattern(0, HEAD_LENGTH)?)?;
    memory.write(VirtualAddress::new(TAIL_BUFFER), &pattern(100, TAIL_LENGTH)?)?;

    let mut head = try_map(&translator, VirtualAddress::new(HEAD_BUFFER), HEAD_LENGTH)
        .context("failed to map the head buffer")?;
    let tail = try_map(&translator, VirtualAddress::new(TAIL_BUFFER), TAIL_LENGTH)
        .context("failed to map the tail buffer")?;
    print_list("head", &head);
    print_list("tail", &tail);

    let released = head.release_from(1);
    println!("released {released} descriptors after the first descriptor of head");
    print_list("head", &head);

    head.append(tail);
    print_list("spliced", &head);

    let dest = try_map(&translator, VirtualAddress::new(DEST_BUFFER), config.count)
        .context("failed to map the destination buffer")?;

    let source_bytes = gather(&translator, &memory, &head)?;
    let copied = copy(
        &translator,
        &mut memory,
        &head,
        &dest,
        config.offset,
        config.count,
    );
    println!(
        "copied {copied} of {} requested bytes from offset {}",
        config.count, config.offset
    );

    let expected = window(&source_bytes, config.offset, config.count)?;
    if expected != memory.read(VirtualAddress::new(DEST_BUFFER), copied)? {
        bail!("destination does not match the spliced source");
    }
    println!("destination matches the spliced source");

    print_destroy("spliced", destroy(head));
    print_destroy("destination", destroy(dest));
    Ok(())
}
