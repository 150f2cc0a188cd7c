//! Command line parsing and [`Action`] construction.

use clap::{Arg, ArgAction, ArgMatches, Command, builder::EnumValueParser};
use memory::address::PageSize;

use crate::{
    cli::{copy::CopyConfig, map::MapConfig, splice::SpliceConfig},
    common::{Settings, TranslatorKind, parse_page_size},
};

pub mod copy;
pub mod map;
pub mod splice;

/// The action to carry out.
#[derive(Clone, Copy, Debug, Hash, PartialEq, Eq)]
pub enum Action {
    /// Map a buffer and print its descriptors.
    Map(MapConfig),
    /// Copy between two mapped buffers and verify the result.
    Copy(CopyConfig),
    /// Build a list out of two mapped buffers and copy from it.
    Splice(SpliceConfig),
}

/// Parses `sg-copy`'s arguments to construct the [`Settings`] and the [`Action`].
pub fn get_action() -> (Settings, Action) {
    let matches = command_parser().get_matches();

    let Some((subcommand_name, subcommand_matches)) = matches.subcommand() else {
        unreachable!("subcommand is required");
    };
    let settings = parse_settings(subcommand_matches);
    let action = match subcommand_name {
        "map" => Action::Map(map::parse_arguments(subcommand_matches)),
        "copy" => Action::Copy(copy::parse_arguments(subcommand_matches)),
        "splice" => Action::Splice(splice::parse_arguments(subcommand_matches)),
        _ => unreachable!("unexpected subcommand: {subcommand_name:?}"),
    };

    (settings, action)
}

/// Parses the global arguments into [`Settings`].
fn parse_settings(matches: &ArgMatches) -> Settings {
    let page_size = matches
        .get_one::<PageSize>("page-size")
        .copied()
        .unwrap_or_else(|| unreachable!("`page-size` should have a default value"));

    let translator = matches
        .get_one::<TranslatorKind>("translator")
        .copied()
        .unwrap_or_else(|| unreachable!("`translator` should have a default value"));

    Settings {
        page_size,
        translator,
        verbosity: matches.get_count("verbose"),
    }
}

/// Returns the command parser for all [`Action`]s.
fn command_parser() -> Command {
    let page_size = Arg::new("page-size")
        .long("page-size")
        .env("SG_PAGE_SIZE")
        .help("Size of a page in bytes; must be a power of two")
        .value_parser(parse_page_size)
        .default_value("32")
        .global(true);

    let translator = Arg::new("translator")
        .long("translator")
        .help("Translation between buffer and physical addresses")
        .value_parser(EnumValueParser::<TranslatorKind>::new())
        .default_value("xor")
        .global(true);

    let verbose = Arg::new("verbose")
        .short('v')
        .long("verbose")
        .help("Log operations (-v) and individual descriptors (-vv)")
        .action(ArgAction::Count)
        .global(true);

    Command::new("sg-copy")
        .about("Maps buffers into scatter-gather lists and copies between them")
        .arg(page_size)
        .arg(translator)
        .arg(verbose)
        .subcommand(map::subcommand_parser())
        .subcommand(copy::subcommand_parser())
        .subcommand(splice::subcommand_parser())
        .subcommand_required(true)
        .arg_required_else_help(true)
}

#[cfg(test)]
mod test {
    use memory::address::PageSize;

    use super::{command_parser, copy, parse_settings};
    use crate::common::TranslatorKind;

    #[test]
    fn parser_is_consistent() {
        command_parser().debug_assert();
    }

    #[test]
    fn global_settings_follow_the_subcommand() {
        let matches = command_parser()
            .try_get_matches_from([
                "sg-copy",
                "copy",
                "--src-length",
                "74",
                "--page-size",
                "0x1000",
                "--translator",
                "identity",
                "-vv",
            ])
            .unwrap();
        let (_, subcommand_matches) = matches.subcommand().unwrap();

        let settings = parse_settings(subcommand_matches);
        assert_eq!(settings.page_size, PageSize::new(4096).unwrap());
        assert_eq!(settings.translator, TranslatorKind::Identity);
        assert_eq!(settings.verbosity, 2);

        let config = copy::parse_arguments(subcommand_matches);
        assert_eq!(config.src_length, 74);
        assert_eq!(config.dest_length, 74);
    }

    #[test]
    fn invalid_page_size_is_rejected() {
        let result =
            command_parser().try_get_matches_from(["sg-copy", "splice", "--page-size", "48"]);

        assert!(result.is_err());
    }
}
