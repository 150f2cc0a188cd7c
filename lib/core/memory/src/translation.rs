//! Abstraction over buffer-to-physical address translation schemes.

use alloc::collections::BTreeMap;
use core::{error, fmt};

use crate::address::{PageSize, PhysicalAddress, VirtualAddress};

/// A trait representing the translation between buffer addresses and [`PhysicalAddress`]es.
///
/// Implementations must be offset-additive within a page: for an address `p` and a byte delta `d`
/// such that `p + d` lies in the same page as `p`, `translate(p + d)` must equal
/// `translate(p) + d`. Nothing is required across page boundaries, so consumers must re-invoke
/// [`AddressTranslator::translate()`] at every new page instead of adding lengths to an already
/// translated [`PhysicalAddress`].
pub trait AddressTranslator {
    /// Returns the size, in bytes, of the translation granule.
    fn page_size(&self) -> PageSize;

    /// Translates `address` into its corresponding [`PhysicalAddress`].
    fn translate(&self, address: VirtualAddress) -> PhysicalAddress;

    /// Translates `address` back into the [`VirtualAddress`] from which it was produced.
    ///
    /// This must be a left inverse of [`AddressTranslator::translate()`] for every
    /// [`PhysicalAddress`] it produced.
    fn untranslate(&self, address: PhysicalAddress) -> VirtualAddress;
}

impl<T: AddressTranslator + ?Sized> AddressTranslator for &T {
    fn page_size(&self) -> PageSize {
        (**self).page_size()
    }

    fn translate(&self, address: VirtualAddress) -> PhysicalAddress {
        (**self).translate(address)
    }

    fn untranslate(&self, address: PhysicalAddress) -> VirtualAddress {
        (**self).untranslate(address)
    }
}

/// An [`AddressTranslator`] where buffer addresses and physical addresses are identical.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct IdentityTranslator {
    /// The size of the translation granule.
    page_size: PageSize,
}

impl IdentityTranslator {
    /// Constructs a new [`IdentityTranslator`] with the provided [`PageSize`].
    pub const fn new(page_size: PageSize) -> Self {
        Self { page_size }
    }
}

impl AddressTranslator for IdentityTranslator {
    fn page_size(&self) -> PageSize {
        self.page_size
    }

    fn translate(&self, address: VirtualAddress) -> PhysicalAddress {
        PhysicalAddress::new(address.value())
    }

    fn untranslate(&self, address: PhysicalAddress) -> VirtualAddress {
        VirtualAddress::new(address.value())
    }
}

/// The reference stand-in translator.
///
/// Every bit above the page offset is inverted, so the translation is additive within a page but
/// runs backwards across pages: the page following a buffer's page maps to the frame preceding
/// its frame.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct XorTranslator {
    /// The size of the translation granule.
    page_size: PageSize,
}

impl XorTranslator {
    /// Constructs a new [`XorTranslator`] with the provided [`PageSize`].
    pub const fn new(page_size: PageSize) -> Self {
        Self { page_size }
    }

    /// Returns the mask applied to both directions of the translation.
    const fn mask(&self) -> u64 {
        !(self.page_size.get() - 1)
    }
}

impl AddressTranslator for XorTranslator {
    fn page_size(&self) -> PageSize {
        self.page_size
    }

    fn translate(&self, address: VirtualAddress) -> PhysicalAddress {
        PhysicalAddress::new(address.value() ^ self.mask())
    }

    fn untranslate(&self, address: PhysicalAddress) -> VirtualAddress {
        VirtualAddress::new(address.value() ^ self.mask())
    }
}

/// An [`AddressTranslator`] backed by an explicit table of page to frame mappings.
///
/// The table is always a permutation of the page numbers: pages without an entry translate to the
/// frame with the same number, and [`PageTableTranslator::map_page()`] swaps mappings so that no
/// two pages ever share a frame.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct PageTableTranslator {
    /// The size of the translation granule.
    page_size: PageSize,
    /// Page number to frame number, for pages that do not map onto themselves.
    pages: BTreeMap<u64, u64>,
    /// Frame number to page number, for frames that do not map onto themselves.
    frames: BTreeMap<u64, u64>,
}

impl PageTableTranslator {
    /// Constructs a new [`PageTableTranslator`] with no explicit mappings.
    pub const fn new(page_size: PageSize) -> Self {
        Self {
            page_size,
            pages: BTreeMap::new(),
            frames: BTreeMap::new(),
        }
    }

    /// Maps the page numbered `page` onto the frame numbered `frame`.
    ///
    /// The page that previously mapped onto `frame` takes over the frame `page` previously
    /// mapped onto.
    ///
    /// # Errors
    ///
    /// Returns [`PageNumberError`] if `page` or `frame` lies past the end of the address space.
    pub fn map_page(&mut self, page: u64, frame: u64) -> Result<(), PageNumberError> {
        let last = u64::MAX / self.page_size.get();
        for number in [page, frame] {
            if number > last {
                return Err(PageNumberError(number));
            }
        }

        let old_frame = self.frame_of(page);
        let displaced = self.page_of(frame);
        self.set(page, frame);
        self.set(displaced, old_frame);
        Ok(())
    }

    /// Returns the frame onto which `page` maps.
    fn frame_of(&self, page: u64) -> u64 {
        self.pages.get(&page).copied().unwrap_or(page)
    }

    /// Returns the page which maps onto `frame`.
    fn page_of(&self, frame: u64) -> u64 {
        self.frames.get(&frame).copied().unwrap_or(frame)
    }

    /// Records `page` as mapping onto `frame` in both directions.
    fn set(&mut self, page: u64, frame: u64) {
        if page == frame {
            self.pages.remove(&page);
            self.frames.remove(&frame);
        } else {
            self.pages.insert(page, frame);
            self.frames.insert(frame, page);
        }
    }
}

impl AddressTranslator for PageTableTranslator {
    fn page_size(&self) -> PageSize {
        self.page_size
    }

    fn translate(&self, address: VirtualAddress) -> PhysicalAddress {
        let frame = self.frame_of(address.page_number(self.page_size));

        PhysicalAddress::new(frame * self.page_size.get() + address.page_offset(self.page_size))
    }

    fn untranslate(&self, address: PhysicalAddress) -> VirtualAddress {
        let page = self.page_of(address.page_number(self.page_size));

        VirtualAddress::new(page * self.page_size.get() + address.page_offset(self.page_size))
    }
}

/// A page or frame number that lies past the end of the address space.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PageNumberError(pub u64);

impl fmt::Display for PageNumberError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "page number {:#x} lies past the end of the address space", self.0)
    }
}

impl error::Error for PageNumberError {}
