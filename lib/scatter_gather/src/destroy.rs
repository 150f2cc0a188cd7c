//! Release of a [`ScatterGatherList`].

use core::mem;

use crate::list::{Link, ScatterGatherList};

/// A summary of the work performed by [`destroy()`].
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct DestroyReport {
    /// The number of descriptors released.
    pub released: usize,
    /// `true` if the walk stopped at a released marker instead of the end of the chain.
    pub severed: bool,
}

/// Releases every descriptor owned by `list`.
///
/// A released marker is never followed: the link leading to it is severed before the descriptor
/// holding it is released, and the walk ends there.
pub fn destroy(mut list: ScatterGatherList) -> DestroyReport {
    let mut report = DestroyReport::default();

    let mut link = list.take_head();
    loop {
        match link {
            Link::End => break,
            Link::Released => {
                log::warn!("destroying a list whose head was already released");
                report.severed = true;
                break;
            }
            Link::Next(mut descriptor) => {
                let mut next = mem::take(&mut descriptor.next);
                if matches!(next, Link::Released) {
                    log::warn!(
                        "severing link after descriptor {} at a released marker",
                        report.released
                    );
                    next = Link::End;
                    report.severed = true;
                }

                log::trace!(
                    "releasing descriptor {}: {} ({} bytes)",
                    report.released,
                    descriptor.address(),
                    descriptor.length()
                );
                drop(descriptor);
                report.released += 1;
                link = next;
            }
        }
    }

    log::debug!("destroyed list of {} descriptors", report.released);
    report
}
