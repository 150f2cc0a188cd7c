//! Construction of a [`ScatterGatherList`] describing a buffer.

use core::{error, fmt, num::NonZeroU64};

use memory::{
    address::{PhysicalAddress, VirtualAddress},
    translation::AddressTranslator,
};

use crate::list::{Descriptor, ScatterGatherList};

/// Maps `length` bytes of the buffer at `buffer` into a [`ScatterGatherList`].
///
/// Invalid inputs produce an empty list; see [`try_map()`] for the reason a request was rejected.
pub fn map<T: AddressTranslator + ?Sized>(
    translator: &T,
    buffer: VirtualAddress,
    length: u64,
) -> ScatterGatherList {
    match try_map(translator, buffer, length) {
        Ok(list) => list,
        Err(error) => {
            log::debug!("refusing to map {length} bytes at {buffer}: {error}");
            ScatterGatherList::empty()
        }
    }
}

/// Maps `length` bytes of the buffer at `buffer` into a [`ScatterGatherList`].
///
/// The first descriptor covers the bytes up to the first page boundary (or a whole page if the
/// buffer is page aligned). Every following descriptor starts on a page boundary and covers at
/// most one page. Each descriptor address is obtained by translating the original buffer address
/// advanced by the bytes already mapped, so translators that are only additive within a page
/// are handled correctly.
///
/// # Errors
///
/// - [`MapError::NullBuffer`]: Returned if `buffer` is the null address.
/// - [`MapError::ZeroLength`]: Returned if `length` is zero.
/// - [`MapError::AddressOverflow`]: Returned if the buffer would extend past the end of the
///   address space.
pub fn try_map<T: AddressTranslator + ?Sized>(
    translator: &T,
    buffer: VirtualAddress,
    length: u64,
) -> Result<ScatterGatherList, MapError> {
    if buffer.is_null() {
        return Err(MapError::NullBuffer);
    }
    let Some(length) = NonZeroU64::new(length) else {
        return Err(MapError::ZeroLength);
    };
    if buffer.checked_add(length.get() - 1).is_none() {
        return Err(MapError::AddressOverflow);
    }

    let page_size = translator.page_size().non_zero();
    let base = translator.translate(buffer);
    let first_length = first_descriptor_length(translator, buffer, base, length);

    let mut list = ScatterGatherList::empty();
    log::trace!("descriptor 0: {base} ({first_length} bytes)");
    let mut tail = list.head.attach(Descriptor::new(base, first_length));

    let mut consumed = first_length.get();
    let mut index = 1usize;
    while let Some(remaining) = NonZeroU64::new(length.get() - consumed) {
        let chunk = remaining.min(page_size);
        let address = translator.translate(buffer.strict_add(consumed));

        log::trace!("descriptor {index}: {address} ({chunk} bytes)");
        tail = tail.attach(Descriptor::new(address, chunk));
        consumed += chunk.get();
        index += 1;
    }

    log::debug!("mapped {length} bytes at {buffer} into {index} descriptors");
    Ok(list)
}

/// Returns the number of bytes covered by the first descriptor of a buffer that translates to
/// `base`.
///
/// The count stops at the first byte whose translation leaves the page containing `base`.
fn first_descriptor_length<T: AddressTranslator + ?Sized>(
    translator: &T,
    buffer: VirtualAddress,
    base: PhysicalAddress,
    length: NonZeroU64,
) -> NonZeroU64 {
    let page_size = translator.page_size();
    if base.is_aligned(page_size) {
        return length.min(page_size.non_zero());
    }

    let mut count = NonZeroU64::MIN;
    while count < length
        && translator
            .translate(buffer.strict_add(count.get()))
            .same_page(base, page_size)
    {
        count = count.saturating_add(1);
    }

    count
}

/// Various reasons a buffer cannot be mapped.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MapError {
    /// The buffer address was null.
    NullBuffer,
    /// The requested length was zero.
    ZeroLength,
    /// The buffer extends past the end of the address space.
    AddressOverflow,
}

impl fmt::Display for MapError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NullBuffer => f.write_str("buffer address is null"),
            Self::ZeroLength => f.write_str("buffer length is zero"),
            Self::AddressOverflow => {
                f.write_str("buffer extends past the end of the address space")
            }
        }
    }
}

impl error::Error for MapError {}
