//! Shared abstractions for physical and buffer (virtual) addresses.

use core::{error, fmt, num::NonZeroU64};

/// The size of a translation granule, in bytes.
///
/// A [`PageSize`] is always a non-zero power of two.
#[derive(Clone, Copy, Debug, Hash, PartialEq, Eq, PartialOrd, Ord)]
pub struct PageSize(NonZeroU64);

impl PageSize {
    /// The page size used by the reference deployment.
    pub const DEFAULT: Self = match NonZeroU64::new(32) {
        Some(size) => Self(size),
        None => panic!("default page size must be non-zero"),
    };

    /// Constructs a new [`PageSize`] of `size` bytes.
    ///
    /// # Errors
    ///
    /// - [`PageSizeError::Zero`]: Returned if `size` is zero.
    /// - [`PageSizeError::NotPowerOfTwo`]: Returned if `size` is not a power of two.
    pub const fn new(size: u64) -> Result<Self, PageSizeError> {
        let Some(non_zero) = NonZeroU64::new(size) else {
            return Err(PageSizeError::Zero);
        };
        if !size.is_power_of_two() {
            return Err(PageSizeError::NotPowerOfTwo(size));
        }

        Ok(Self(non_zero))
    }

    /// Returns the number of bytes in a page.
    pub const fn get(self) -> u64 {
        self.0.get()
    }

    /// Returns the number of bytes in a page as a [`NonZeroU64`].
    pub const fn non_zero(self) -> NonZeroU64 {
        self.0
    }
}

impl Default for PageSize {
    fn default() -> Self {
        Self::DEFAULT
    }
}

impl fmt::Display for PageSize {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} bytes", self.0)
    }
}

/// Various errors that can occur while constructing a [`PageSize`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PageSizeError {
    /// The requested page size was zero.
    Zero,
    /// The requested page size was not a power of two.
    NotPowerOfTwo(u64),
}

impl fmt::Display for PageSizeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Zero => f.write_str("page size must not be zero"),
            Self::NotPowerOfTwo(size) => write!(f, "page size {size} is not a power of two"),
        }
    }
}

impl error::Error for PageSizeError {}

/// Constructs an address type with the specified underlying type.
macro_rules! implement_address {
    ($address_name:ident, $address_doc:expr, $impl_type:ident) => {
        #[doc = $address_doc]
        #[derive(Clone, Copy, Debug, Default, Hash, PartialEq, Eq, PartialOrd, Ord)]
        pub struct $address_name($impl_type);

        impl $address_name {
            /// Creates a new address with a value of 0.
            pub const fn zero() -> Self {
                Self(0)
            }

            /// Creates a new address with a value of `value`.
            pub const fn new(value: $impl_type) -> Self {
                Self(value)
            }

            /// Returns the underlying value for this address.
            pub const fn value(self) -> $impl_type {
                self.0
            }

            /// Returns `true` if this address is the null address.
            pub const fn is_null(self) -> bool {
                self.0 == 0
            }

            /// Returns `true` if the address is a multiple of `page_size`.
            pub const fn is_aligned(self, page_size: PageSize) -> bool {
                self.0.is_multiple_of(page_size.get())
            }

            /// Returns the number of the page containing this address.
            pub const fn page_number(self, page_size: PageSize) -> $impl_type {
                self.0 / page_size.get()
            }

            /// Returns the byte offset of this address within its page.
            pub const fn page_offset(self, page_size: PageSize) -> $impl_type {
                self.0 % page_size.get()
            }

            /// Returns `true` if `self` and `other` lie within the same page.
            pub const fn same_page(self, other: Self, page_size: PageSize) -> bool {
                self.page_number(page_size) == other.page_number(page_size)
            }
        }

        impl fmt::Display for $address_name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{:#x}", self.0)
            }
        }
    };
}

implement_address!(
    PhysicalAddress,
    "A physical address.\n\nThe scatter-gather core treats this as opaque: only an \
     [`AddressTranslator`][at] performs arithmetic on it.\n\n\
     [at]: crate::translation::AddressTranslator",
    u64
);

implement_address!(
    VirtualAddress,
    "An address of a byte in a buffer, as seen by the code that owns the buffer.",
    u64
);

impl VirtualAddress {
    /// Creates a new address that is `count` bytes higher.
    ///
    /// Returns `None` if the operation would overflow.
    pub const fn checked_add(self, count: u64) -> Option<Self> {
        let Some(new_address) = self.0.checked_add(count) else {
            return None;
        };

        Some(Self::new(new_address))
    }

    /// Creates a new address that is `count` bytes higher.
    ///
    /// # Panics
    ///
    /// Panics if the operation would overflow.
    pub const fn strict_add(self, count: u64) -> Self {
        Self::new(self.0.strict_add(count))
    }

    /// Returns the number of bytes from `base` to `self`.
    ///
    /// Returns `None` if `self` is below `base`.
    pub const fn checked_offset_from(self, base: Self) -> Option<u64> {
        self.0.checked_sub(base.0)
    }
}

#[cfg(test)]
mod test {
    use super::{PageSize, PageSizeError, PhysicalAddress, VirtualAddress};

    #[test]
    fn page_size_validation() {
        assert_eq!(PageSize::new(0), Err(PageSizeError::Zero));
        assert_eq!(PageSize::new(48), Err(PageSizeError::NotPowerOfTwo(48)));
        assert_eq!(PageSize::new(4096).map(PageSize::get), Ok(4096));
        assert_eq!(PageSize::default().get(), 32);
    }

    #[test]
    fn page_membership() {
        let page_size = PageSize::DEFAULT;
        let address = PhysicalAddress::new(0x47);

        assert_eq!(address.page_number(page_size), 2);
        assert_eq!(address.page_offset(page_size), 7);
        assert!(!address.is_aligned(page_size));
        assert!(PhysicalAddress::new(0x40).is_aligned(page_size));

        assert!(address.same_page(PhysicalAddress::new(0x5F), page_size));
        assert!(!address.same_page(PhysicalAddress::new(0x60), page_size));
    }

    #[test]
    fn virtual_offsets() {
        let base = VirtualAddress::new(0x1000);

        assert!(VirtualAddress::zero().is_null());
        assert_eq!(base.strict_add(5).value(), 0x1005);
        assert_eq!(VirtualAddress::new(u64::MAX).checked_add(1), None);
        assert_eq!(base.strict_add(9).checked_offset_from(base), Some(9));
        assert_eq!(base.checked_offset_from(base.strict_add(1)), None);
    }
}
