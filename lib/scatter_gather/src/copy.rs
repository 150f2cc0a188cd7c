//! Byte transfer between two [`ScatterGatherList`]s with unrelated descriptor boundaries.

use memory::{access::MemoryAccess, address::VirtualAddress, translation::AddressTranslator};

use crate::list::{Descriptor, Link, ScatterGatherList};

/// Copies up to `count` bytes of `src`, starting `src_offset` bytes into its extent, into the
/// beginning of `dest`.
///
/// Returns the number of bytes actually copied. Fewer than `count` bytes are copied when either
/// list is exhausted first, and nothing is copied if `dest` is empty, `count` is zero, or
/// `src_offset` is at or past the end of `src`. Destination capacity is never extended.
pub fn copy<T: AddressTranslator + ?Sized, M: MemoryAccess + ?Sized>(
    translator: &T,
    memory: &mut M,
    src: &ScatterGatherList,
    dest: &ScatterGatherList,
    src_offset: u64,
    count: u64,
) -> u64 {
    let Some(dest_first) = dest.first() else {
        log::debug!("refusing to copy into an empty list");
        return 0;
    };
    if count == 0 {
        return 0;
    }

    let Some(mut src_cursor) = Cursor::locate(src, src_offset) else {
        log::debug!("source offset {src_offset} is past the end of the source list");
        return 0;
    };
    let mut dest_cursor = Cursor {
        descriptor: dest_first,
        offset: 0,
    };

    let mut remaining = count;
    let mut copied = 0;
    loop {
        let src_available = src_cursor.available();
        let dest_available = dest_cursor.available();
        let chunk = remaining.min(src_available).min(dest_available);

        let from = src_cursor.position(translator);
        let to = dest_cursor.position(translator);
        log::trace!("copying {chunk} bytes from {from} to {to}");
        memory.copy(from, to, chunk);

        remaining -= chunk;
        copied += chunk;
        if remaining == 0 {
            break;
        }

        if chunk == src_available {
            let Some(next) = src_cursor.next_descriptor("source") else {
                break;
            };
            src_cursor = next;
        } else {
            src_cursor.offset += chunk;
        }

        if chunk == dest_available {
            let Some(next) = dest_cursor.next_descriptor("destination") else {
                break;
            };
            dest_cursor = next;
        } else {
            dest_cursor.offset += chunk;
        }
    }

    log::debug!("copied {copied} of {count} requested bytes from offset {src_offset}");
    copied
}

/// A position inside one [`Descriptor`] of a list.
#[derive(Clone, Copy)]
struct Cursor<'list> {
    /// The [`Descriptor`] being read or written.
    descriptor: &'list Descriptor,
    /// The number of bytes of `descriptor` already consumed.
    offset: u64,
}

impl<'list> Cursor<'list> {
    /// Returns a [`Cursor`] at byte `offset` of the extent of `list`.
    ///
    /// Returns `None` if `offset` is at or past the end of the valid part of `list`.
    fn locate(list: &'list ScatterGatherList, offset: u64) -> Option<Self> {
        let mut skipped = 0u64;
        for descriptor in list.iter() {
            let end = skipped.saturating_add(descriptor.length());
            if end > offset {
                return Some(Self {
                    descriptor,
                    offset: offset - skipped,
                });
            }
            skipped = end;
        }

        None
    }

    /// Returns the number of bytes left in the current [`Descriptor`].
    fn available(&self) -> u64 {
        self.descriptor.length() - self.offset
    }

    /// Returns the buffer address of the current byte.
    fn position<T: AddressTranslator + ?Sized>(&self, translator: &T) -> VirtualAddress {
        translator
            .untranslate(self.descriptor.address())
            .strict_add(self.offset)
    }

    /// Returns a [`Cursor`] at the start of the following [`Descriptor`].
    ///
    /// Returns `None` at the end of the chain or at a released marker.
    fn next_descriptor(&self, side: &str) -> Option<Self> {
        match &self.descriptor.next {
            Link::Next(descriptor) => Some(Self {
                descriptor: &**descriptor,
                offset: 0,
            }),
            Link::End => None,
            Link::Released => {
                log::warn!("{side} list ends in a released marker");
                None
            }
        }
    }
}
