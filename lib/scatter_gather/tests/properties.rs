//! Property tests over mapping and copying arbitrary buffers.

use memory::{
    access::ArenaMemory,
    address::{PageSize, VirtualAddress},
    translation::{AddressTranslator, IdentityTranslator, PageTableTranslator, XorTranslator},
};
use proptest::prelude::*;
use scatter_gather::{copy, destroy, map};

const ARENA_BASE: u64 = 0x10_0000;
const ARENA_SIZE: u64 = 0x4000;
const DEST_BASE: u64 = ARENA_BASE + ARENA_SIZE / 2;

fn page_size() -> impl Strategy<Value = PageSize> {
    (3u32..=12).prop_map(|shift| PageSize::new(1 << shift).unwrap())
}

/// An arena whose lower half holds the bytes of `fill`, repeated.
fn arena(fill: &[u8]) -> ArenaMemory {
    let mut arena = ArenaMemory::new(VirtualAddress::new(ARENA_BASE), ARENA_SIZE as usize);
    let pattern: Vec<u8> = fill.iter().copied().cycle().take((ARENA_SIZE / 2) as usize).collect();
    arena
        .write(VirtualAddress::new(ARENA_BASE), &pattern)
        .unwrap();
    arena
}

fn check_layout<T: AddressTranslator>(translator: &T, buffer: u64, length: u64) {
    let page_size = translator.page_size();
    let list = map(translator, VirtualAddress::new(buffer), length);

    assert_eq!(list.extent(), length);
    for (index, descriptor) in list.iter().enumerate() {
        assert!(descriptor.length() <= page_size.get());
        assert!(
            descriptor.address().page_offset(page_size) + descriptor.length() <= page_size.get(),
            "descriptor {index} crosses a page boundary"
        );
        if index != 0 {
            assert!(descriptor.address().is_aligned(page_size));
        }
    }

    destroy(list);
}

proptest! {
    #[test]
    fn mapping_covers_and_aligns(
        page_size in page_size(),
        buffer in 1u64..0x1_0000,
        length in 1u64..0x4000,
    ) {
        check_layout(&IdentityTranslator::new(page_size), buffer, length);
        check_layout(&XorTranslator::new(page_size), buffer, length);
    }

    #[test]
    fn mapping_through_a_shuffled_page_table(
        frames in Just((0u64..16).collect::<Vec<_>>()).prop_shuffle(),
        offset in 0u64..0x40,
        length in 1u64..0x100,
    ) {
        let page_size = PageSize::new(32).unwrap();
        let mut translator = PageTableTranslator::new(page_size);
        for (page, frame) in frames.iter().enumerate() {
            translator.map_page(0x80 + page as u64, 0x400 + frame).unwrap();
        }

        check_layout(&translator, 0x80 * 32 + offset, length);
    }

    #[test]
    fn copy_matches_flat_copy(
        page_size in page_size(),
        fill in proptest::collection::vec(any::<u8>(), 1..64),
        src_start in 0u64..0x100,
        src_length in 1u64..0x1000,
        dest_start in 0u64..0x100,
        dest_length in 1u64..0x1000,
        src_offset in 0u64..0x1100,
        count in 1u64..0x1100,
    ) {
        let translator = XorTranslator::new(page_size);
        let mut memory = arena(&fill);
        let pristine = memory.clone();

        let src_buffer = VirtualAddress::new(ARENA_BASE + src_start);
        let dest_buffer = VirtualAddress::new(DEST_BASE + dest_start);
        let src = map(&translator, src_buffer, src_length);
        let dest = map(&translator, dest_buffer, dest_length);

        let copied = copy(&translator, &mut memory, &src, &dest, src_offset, count);

        let expected = if src_offset >= src_length {
            0
        } else {
            count.min(src_length - src_offset).min(dest_length)
        };
        prop_assert_eq!(copied, expected);

        let source = pristine
            .read(src_buffer.strict_add(src_offset.min(src_length)), copied)
            .unwrap();
        prop_assert_eq!(memory.read(dest_buffer, copied).unwrap(), source);

        // Nothing past the copied bytes of the destination buffer changes.
        let tail = dest_buffer.strict_add(copied);
        let tail_length = ARENA_BASE + ARENA_SIZE - tail.value();
        prop_assert_eq!(
            memory.read(tail, tail_length).unwrap(),
            pristine.read(tail, tail_length).unwrap()
        );
    }

    #[test]
    fn copy_truncates_at_source_extent(
        page_size in page_size(),
        src_length in 1u64..0x800,
        src_offset in 0u64..0x800,
        excess in 1u64..0x100,
    ) {
        prop_assume!(src_offset < src_length);

        let translator = IdentityTranslator::new(page_size);
        let mut memory = arena(&[0xA5, 0x5A, 0x3C]);
        let src = map(&translator, VirtualAddress::new(ARENA_BASE), src_length);
        let dest = map(&translator, VirtualAddress::new(DEST_BASE), 0x1000);

        let wanted = src_length - src_offset + excess;
        prop_assert_eq!(
            copy(&translator, &mut memory, &src, &dest, src_offset, wanted),
            src_length - src_offset
        );
    }
}
