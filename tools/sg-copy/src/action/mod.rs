//! Implementations of the [`Action`][action]s.
//!
//! [action]: crate::cli::Action

use anyhow::{Context, Result, bail};
use memory::{access::ArenaMemory, address::VirtualAddress, translation::AddressTranslator};
use scatter_gather::{DestroyReport, ScatterGatherList};

pub mod copy;
pub mod map;
pub mod splice;

/// The largest simulated arena, in bytes.
pub const MAX_ARENA_SIZE: u64 = 1 << 24;

/// Constructs a zero-filled [`ArenaMemory`] covering `[base, end)`.
///
/// # Errors
///
/// Returns an error if the range is empty or spans more than [`MAX_ARENA_SIZE`] bytes.
pub fn arena(base: u64, end: u64) -> Result<ArenaMemory> {
    let size = end.checked_sub(base).context("arena ends before it starts")?;
    if size > MAX_ARENA_SIZE {
        bail!(
            "buffers span {size:#x} bytes, more than the {MAX_ARENA_SIZE:#x} bytes that can be \
             simulated; place them closer together"
        );
    }

    Ok(ArenaMemory::new(VirtualAddress::new(base), usize::try_from(size)?))
}

/// Prints every descriptor of `list` under the heading `name`.
pub fn print_list(name: &str, list: &ScatterGatherList) {
    println!("{name}: {} descriptors, {} bytes", list.len(), list.extent());
    for (index, descriptor) in list.iter().enumerate() {
        println!(
            "  [{index:>3}] {:>#18x} {:>5} bytes",
            descriptor.address().value(),
            descriptor.length()
        );
    }
    if list.is_terminated_early() {
        println!("  [...] released");
    }
}

/// Prints the outcome of destroying the list called `name`.
pub fn print_destroy(name: &str, report: DestroyReport) {
    if report.severed {
        println!(
            "destroyed {name}: released {} descriptors, severed at a released marker",
            report.released
        );
    } else {
        println!("destroyed {name}: released {} descriptors", report.released);
    }
}

/// Returns `length` bytes of a repeating pattern starting at `seed`.
///
/// # Errors
///
/// Returns an error if `length` does not fit in memory.
pub fn pattern(seed: u8, length: u64) -> Result<Vec<u8>> {
    let length = usize::try_from(length)?;
    Ok((0..=250u8).cycle().skip(usize::from(seed)).take(length).collect())
}

/// Gathers the bytes described by `list` out of `memory`, in list order.
///
/// # Errors
///
/// Returns an error if a descriptor refers to bytes outside of `memory`.
pub fn gather<T: AddressTranslator>(
    translator: &T,
    memory: &ArenaMemory,
    list: &ScatterGatherList,
) -> Result<Vec<u8>> {
    let mut bytes = Vec::new();
    for descriptor in list {
        let address = translator.untranslate(descriptor.address());
        let chunk = memory
            .read(address, descriptor.length())
            .with_context(|| format!("descriptor at {} is not backed", descriptor.address()))?;
        bytes.extend_from_slice(chunk);
    }

    Ok(bytes)
}

/// Returns `count` bytes of `bytes` starting at `offset`, clamped to the end of `bytes`.
///
/// # Errors
///
/// Returns an error if `offset` or `count` do not fit in a `usize`.
pub fn window(bytes: &[u8], offset: u64, count: u64) -> Result<&[u8]> {
    let start = usize::try_from(offset)?.min(bytes.len());
    let end = start.saturating_add(usize::try_from(count)?).min(bytes.len());
    Ok(&bytes[start..end])
}

#[cfg(test)]
mod test {
    use memory::{
        address::{PageSize, VirtualAddress},
        translation::XorTranslator,
    };
    use scatter_gather::{ScatterGatherList, map};

    use super::{MAX_ARENA_SIZE, arena, gather, pattern, window};

    #[test]
    fn window_clamps_to_the_end() {
        let bytes = [1, 2, 3, 4, 5];

        assert_eq!(window(&bytes, 1, 3).unwrap(), &[2, 3, 4]);
        assert_eq!(window(&bytes, 3, 10).unwrap(), &[4, 5]);
        assert_eq!(window(&bytes, 5, 1).unwrap(), &[] as &[u8]);
        assert_eq!(window(&bytes, 9, 1).unwrap(), &[] as &[u8]);
        assert_eq!(window(&bytes, 2, u64::MAX).unwrap(), &[3, 4, 5]);
    }

    #[test]
    fn arena_size_is_capped() {
        assert_eq!(arena(0x1000, 0x1010).unwrap().size(), 0x10);
        assert!(arena(0, MAX_ARENA_SIZE).is_ok());

        let error = arena(0x1000, 0x1000 + MAX_ARENA_SIZE + 1).unwrap_err();
        assert!(error.to_string().contains("can be simulated"));
        assert!(arena(0x2000, 0x1000).is_err());
    }

    #[test]
    fn gather_follows_translated_descriptors() {
        let translator = XorTranslator::new(PageSize::DEFAULT);
        let buffer = VirtualAddress::new(0x1005);
        let bytes = pattern(3, 74).unwrap();

        let mut memory = arena(0x1000, 0x1100).unwrap();
        memory.write(buffer, &bytes).unwrap();

        let list = map(&translator, buffer, 74);
        assert_eq!(list.len(), 3);
        assert_eq!(gather(&translator, &memory, &list).unwrap(), bytes);

        assert!(gather(&translator, &memory, &ScatterGatherList::empty()).unwrap().is_empty());
        let outside = map(&translator, VirtualAddress::new(0x2000), 4);
        assert!(gather(&translator, &memory, &outside).is_err());
    }

    #[test]
    fn pattern_repeats() {
        let bytes = pattern(249, 4).unwrap();

        assert_eq!(bytes, [249, 250, 0, 1]);
    }
}
