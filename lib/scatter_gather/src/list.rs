//! The [`ScatterGatherList`] descriptor chain and its ownership-preserving edits.

use alloc::boxed::Box;
use core::{fmt, mem, num::NonZeroU64};

use memory::address::PhysicalAddress;

/// One contiguous, physically-addressed region of a [`ScatterGatherList`].
#[derive(PartialEq, Eq)]
pub struct Descriptor {
    /// The physical address of the first byte in the region.
    address: PhysicalAddress,
    /// The number of bytes in the region.
    length: NonZeroU64,
    /// The link to the following region.
    pub(crate) next: Link,
}

impl Descriptor {
    /// Constructs an unlinked [`Descriptor`].
    pub(crate) const fn new(address: PhysicalAddress, length: NonZeroU64) -> Self {
        Self {
            address,
            length,
            next: Link::End,
        }
    }

    /// Returns the physical address of the first byte described by this [`Descriptor`].
    pub const fn address(&self) -> PhysicalAddress {
        self.address
    }

    /// Returns the number of bytes described by this [`Descriptor`].
    pub const fn length(&self) -> u64 {
        self.length.get()
    }

    /// Returns the [`Descriptor`] that follows this one, if it is valid.
    pub fn next(&self) -> Option<&Descriptor> {
        match &self.next {
            Link::Next(descriptor) => Some(&**descriptor),
            Link::End | Link::Released => None,
        }
    }
}

impl fmt::Debug for Descriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Descriptor")
            .field("address", &self.address)
            .field("length", &self.length)
            .finish_non_exhaustive()
    }
}

/// The state of an owning link in a descriptor chain.
#[derive(Debug, Default)]
pub(crate) enum Link {
    /// The chain ends here.
    #[default]
    End,
    /// The chain continues with an exclusively owned [`Descriptor`].
    Next(Box<Descriptor>),
    /// The remainder of the chain has been released.
    ///
    /// Readers treat this as a premature end of the chain and never look past it.
    Released,
}

impl Link {
    /// Stores `descriptor` in this link and returns the link that follows it.
    pub(crate) fn attach(&mut self, descriptor: Descriptor) -> &mut Link {
        *self = Link::Next(Box::new(descriptor));
        match self {
            Link::Next(descriptor) => &mut descriptor.next,
            Link::End | Link::Released => unreachable!("link was just attached"),
        }
    }
}

impl PartialEq for Link {
    fn eq(&self, other: &Self) -> bool {
        let (mut left, mut right) = (self, other);
        loop {
            match (left, right) {
                (Link::Next(a), Link::Next(b)) => {
                    if a.address != b.address || a.length != b.length {
                        return false;
                    }
                    left = &a.next;
                    right = &b.next;
                }
                (Link::End, Link::End) | (Link::Released, Link::Released) => return true,
                _ => return false,
            }
        }
    }
}

impl Eq for Link {}

/// An ordered chain of [`Descriptor`]s that jointly describe one logical byte extent.
///
/// The list exclusively owns its chain: moving the list moves every descriptor, and no two lists
/// ever share a descriptor.
#[derive(Default, PartialEq, Eq)]
pub struct ScatterGatherList {
    /// The first link of the chain.
    pub(crate) head: Link,
}

impl ScatterGatherList {
    /// Constructs an empty [`ScatterGatherList`].
    pub const fn empty() -> Self {
        Self { head: Link::End }
    }

    /// Constructs a [`ScatterGatherList`] from `(address, length)` pairs in chain order.
    pub fn from_descriptors<I: IntoIterator<Item = (PhysicalAddress, NonZeroU64)>>(
        descriptors: I,
    ) -> Self {
        let mut list = Self::empty();
        let mut tail = &mut list.head;
        for (address, length) in descriptors {
            tail = tail.attach(Descriptor::new(address, length));
        }

        list
    }

    /// Returns the first [`Descriptor`] in the chain.
    pub fn first(&self) -> Option<&Descriptor> {
        match &self.head {
            Link::Next(descriptor) => Some(&**descriptor),
            Link::End | Link::Released => None,
        }
    }

    /// Returns `true` if the list contains no valid [`Descriptor`]s.
    pub fn is_empty(&self) -> bool {
        self.first().is_none()
    }

    /// Returns the number of valid [`Descriptor`]s in the list.
    pub fn len(&self) -> usize {
        self.iter().count()
    }

    /// Returns the total number of bytes described by the list.
    ///
    /// Saturates at [`u64::MAX`].
    pub fn extent(&self) -> u64 {
        self.iter()
            .map(Descriptor::length)
            .fold(0, u64::saturating_add)
    }

    /// Returns `true` if the chain ends in a released marker rather than a proper end.
    pub fn is_terminated_early(&self) -> bool {
        let mut link = &self.head;
        while let Link::Next(descriptor) = link {
            link = &descriptor.next;
        }

        matches!(link, Link::Released)
    }

    /// Returns an [`Iterator`] over the valid [`Descriptor`]s of the list.
    pub fn iter(&self) -> Iter<'_> {
        Iter {
            next: self.first(),
        }
    }

    /// Detaches the descriptors starting at `index` and moves them into a new
    /// [`ScatterGatherList`].
    ///
    /// If `index` is at or past the end of the chain, `self` is unchanged and an empty list is
    /// returned.
    pub fn split_off(&mut self, index: usize) -> ScatterGatherList {
        let Some(link) = self.link_at(index) else {
            return Self::empty();
        };

        match mem::take(link) {
            Link::Next(descriptor) => Self {
                head: Link::Next(descriptor),
            },
            Link::Released => {
                *link = Link::Released;
                Self::empty()
            }
            Link::End => Self::empty(),
        }
    }

    /// Releases the descriptors starting at `index`, leaving a released marker in their place.
    ///
    /// Returns the number of descriptors released.
    pub fn release_from(&mut self, index: usize) -> usize {
        let Some(link) = self.link_at(index) else {
            return 0;
        };
        if !matches!(link, Link::Next(_)) {
            return 0;
        }

        let released = release_chain(mem::replace(link, Link::Released));
        log::debug!("released {released} descriptors starting at index {index}");
        released
    }

    /// Moves the chain of `other` onto the end of `self`.
    ///
    /// A released marker terminating `self` is replaced by the attached chain.
    pub fn append(&mut self, mut other: ScatterGatherList) {
        let mut link = &mut self.head;
        while let Link::Next(descriptor) = link {
            link = &mut descriptor.next;
        }

        *link = mem::take(&mut other.head);
    }

    /// Returns the link preceding the descriptor at `index`.
    ///
    /// Returns `None` if the chain ends before reaching `index`.
    fn link_at(&mut self, index: usize) -> Option<&mut Link> {
        let mut link = &mut self.head;
        for _ in 0..index {
            match link {
                Link::Next(descriptor) => link = &mut descriptor.next,
                Link::End | Link::Released => return None,
            }
        }

        Some(link)
    }

    /// Removes the chain from the list, leaving it empty.
    pub(crate) fn take_head(&mut self) -> Link {
        mem::take(&mut self.head)
    }
}

impl Drop for ScatterGatherList {
    fn drop(&mut self) {
        release_chain(self.take_head());
    }
}

impl fmt::Debug for ScatterGatherList {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut list = f.debug_list();
        for descriptor in self.iter() {
            list.entry(&format_args!(
                "{} ({} bytes)",
                descriptor.address(),
                descriptor.length()
            ));
        }
        if self.is_terminated_early() {
            list.entry(&format_args!("<released>"));
        }
        list.finish()
    }
}

impl<'list> IntoIterator for &'list ScatterGatherList {
    type Item = &'list Descriptor;
    type IntoIter = Iter<'list>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

/// An [`Iterator`] over the valid [`Descriptor`]s of a [`ScatterGatherList`].
#[derive(Clone, Debug)]
pub struct Iter<'list> {
    /// The next [`Descriptor`] to yield.
    next: Option<&'list Descriptor>,
}

impl<'list> Iterator for Iter<'list> {
    type Item = &'list Descriptor;

    fn next(&mut self) -> Option<Self::Item> {
        let descriptor = self.next?;
        self.next = descriptor.next();
        Some(descriptor)
    }
}

/// Frees every descriptor reachable from `link` without recursing.
///
/// Returns the number of descriptors freed.
pub(crate) fn release_chain(mut link: Link) -> usize {
    let mut released = 0;
    while let Link::Next(mut descriptor) = link {
        link = mem::take(&mut descriptor.next);
        released += 1;
    }

    released
}
