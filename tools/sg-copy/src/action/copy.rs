//! Implementation of [`Action::Copy`][ac].
//!
//! [ac]: crate::cli::Action::Copy

use anyhow::{Context, Result, bail};
use memory::address::VirtualAddress;
use scatter_gather::{copy, destroy, try_map};

use crate::{
    action::{arena, gather, pattern, print_destroy, print_list, window},
    cli::copy::CopyConfig,
    common::Settings,
};

/// Maps the source and destination buffers described by `config` into one arena, copies between
/// them, and checks the destination against a flat copy of the source bytes.
///
/// # Errors
///
/// Returns an error if the buffers are invalid, overlap, or lie too far apart to be simulated, or
/// if the copied bytes do not match.
pub fn run_copy(settings: &Settings, config: CopyConfig) -> Result<()> {
    let translator = settings.translator();

    let src_end = config
        .src_address
        .checked_add(config.src_length)
        .context("source buffer extends past the end of the address space")?;
    let dest_end = config
        .dest_address
        .checked_add(config.dest_length)
        .context("destination buffer extends past the end of the address space")?;
    if config.src_address < dest_end && config.dest_address < src_end {
        bail!("source and destination buffers overlap");
    }

    let mut memory = arena(
        config.src_address.min(config.dest_address),
        src_end.max(dest_end),
    )?;

    let src_buffer = VirtualAddress::new(config.src_address);
    let dest_buffer = VirtualAddress::new(config.dest_address);
    memory.write(src_buffer, &pattern(0, config.src_length)?)?;

    let src = try_map(&translator, src_buffer, config.src_length)
        .context("failed to map the source buffer")?;
    let dest = try_map(&translator, dest_buffer, config.dest_length)
        .context("failed to map the destination buffer")?;
    print_list("source", &src);
    print_list("destination", &dest);

    let source_bytes = gather(&translator, &memory, &src)?;
    let copied = copy(
        &translator,
        &mut memory,
        &src,
        &dest,
        config.offset,
        config.count,
    );
    println!(
        "copied {copied} of {} requested bytes from offset {}",
        config.count, config.offset
    );

    let expected = window(&source_bytes, config.offset, config.count)?;
    let expected = window(expected, 0, config.dest_length)?;
    let actual = memory.read(dest_buffer, copied)?;
    if u64::try_from(expected.len())? != copied || expected != actual {
        bail!("destination does not match a flat copy of the source");
    }
    println!("destination matches a flat copy of the source");

    print_destroy("source", destroy(src));
    print_destroy("destination", destroy(dest));
    Ok(())
}

#[cfg(test)]
mod test {
    use memory::address::PageSize;

    use super::run_copy;
    use crate::{
        cli::copy::CopyConfig,
        common::{Settings, TranslatorKind},
    };

    fn settings(translator: TranslatorKind) -> Settings {
        Settings {
            page_size: PageSize::DEFAULT,
            translator,
            verbosity: 0,
        }
    }

    fn config(src_length: u64) -> CopyConfig {
        CopyConfig {
            src_address: 0x1006,
            src_length,
            dest_address: 0x8013,
            dest_length: src_length,
            offset: 0,
            count: src_length,
        }
    }

    #[test]
    fn whole_buffer() {
        for translator in [TranslatorKind::Identity, TranslatorKind::Xor] {
            run_copy(&settings(translator), config(74)).unwrap();
        }
    }

    #[test]
    fn truncated_by_destination() {
        let config = CopyConfig {
            dest_length: 20,
            ..config(74)
        };

        run_copy(&settings(TranslatorKind::Xor), config).unwrap();
    }

    #[test]
    fn truncated_by_source() {
        let config = CopyConfig {
            offset: 50,
            count: 60,
            dest_length: 100,
            ..config(74)
        };

        run_copy(&settings(TranslatorKind::Xor), config).unwrap();
    }

    #[test]
    fn offset_past_the_source() {
        let config = CopyConfig {
            offset: 74,
            ..config(74)
        };
        run_copy(&settings(TranslatorKind::Xor), config).unwrap();

        let config = CopyConfig {
            offset: 500,
            ..self::config(74)
        };
        run_copy(&settings(TranslatorKind::Identity), config).unwrap();
    }

    #[test]
    fn overlapping_buffers_are_rejected() {
        let config = CopyConfig {
            dest_address: 0x1040,
            ..config(74)
        };
        let error = run_copy(&settings(TranslatorKind::Xor), config).unwrap_err();

        assert!(error.to_string().contains("overlap"));
    }

    #[test]
    fn distant_buffers_are_rejected() {
        let config = CopyConfig {
            dest_address: 1 << 40,
            ..config(74)
        };
        let error = run_copy(&settings(TranslatorKind::Xor), config).unwrap_err();

        assert!(error.to_string().contains("can be simulated"));
    }

    #[test]
    fn empty_buffers_are_rejected() {
        assert!(run_copy(&settings(TranslatorKind::Xor), config(0)).is_err());

        let config = CopyConfig {
            dest_length: 0,
            ..config(74)
        };
        assert!(run_copy(&settings(TranslatorKind::Xor), config).is_err());
    }
}
