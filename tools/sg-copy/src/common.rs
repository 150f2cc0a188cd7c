//! Various items that are common between [`Action`][a] parsing and execution.
//!
//! [a]: crate::cli::Action

use std::num::ParseIntError;

use memory::{
    address::{PageSize, PhysicalAddress, VirtualAddress},
    translation::{AddressTranslator, IdentityTranslator, XorTranslator},
};

/// Options shared by every [`Action`][a].
///
/// [a]: crate::cli::Action
#[derive(Clone, Copy, Debug, Hash, PartialEq, Eq)]
pub struct Settings {
    /// The page size of the simulated deployment.
    pub page_size: PageSize,
    /// The translation scheme between buffer and physical addresses.
    pub translator: TranslatorKind,
    /// The number of times `--verbose` was passed.
    pub verbosity: u8,
}

impl Settings {
    /// Constructs the [`AnyTranslator`] described by these [`Settings`].
    pub fn translator(&self) -> AnyTranslator {
        match self.translator {
            TranslatorKind::Identity => {
                AnyTranslator::Identity(IdentityTranslator::new(self.page_size))
            }
            TranslatorKind::Xor => AnyTranslator::Xor(XorTranslator::new(self.page_size)),
        }
    }
}

/// The translation schemes selectable from the command line.
#[derive(Clone, Copy, Debug, Default, Hash, PartialEq, Eq)]
pub enum TranslatorKind {
    /// Buffer addresses are physical addresses.
    Identity,
    /// The reference stand-in, which inverts every bit above the page offset.
    #[default]
    Xor,
}

impl TranslatorKind {
    /// Returns the textual representation of the [`TranslatorKind`].
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Identity => "identity",
            Self::Xor => "xor",
        }
    }
}

impl clap::ValueEnum for TranslatorKind {
    fn value_variants<'a>() -> &'a [Self] {
        static TRANSLATORS: &[TranslatorKind] = &[TranslatorKind::Identity, TranslatorKind::Xor];

        TRANSLATORS
    }

    fn to_possible_value(&self) -> Option<clap::builder::PossibleValue> {
        Some(clap::builder::PossibleValue::new(self.as_str()))
    }
}

/// One of the [`AddressTranslator`]s selectable from the command line.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AnyTranslator {
    /// An [`IdentityTranslator`].
    Identity(IdentityTranslator),
    /// A [`XorTranslator`].
    Xor(XorTranslator),
}

impl AddressTranslator for AnyTranslator {
    fn page_size(&self) -> PageSize {
        match self {
            Self::Identity(translator) => translator.page_size(),
            Self::Xor(translator) => translator.page_size(),
        }
    }

    fn translate(&self, address: VirtualAddress) -> PhysicalAddress {
        match self {
            Self::Identity(translator) => translator.translate(address),
            Self::Xor(translator) => translator.translate(address),
        }
    }

    fn untranslate(&self, address: PhysicalAddress) -> VirtualAddress {
        match self {
            Self::Identity(translator) => translator.untranslate(address),
            Self::Xor(translator) => translator.untranslate(address),
        }
    }
}

/// Parses a decimal or `0x`-prefixed hexadecimal integer.
///
/// # Errors
///
/// Returns [`ParseIntError`] if `value` is not a valid integer.
pub fn parse_u64(value: &str) -> Result<u64, ParseIntError> {
    match value.strip_prefix("0x").or_else(|| value.strip_prefix("0X")) {
        Some(hex) => u64::from_str_radix(hex, 16),
        None => value.parse(),
    }
}

/// Parses a [`PageSize`].
///
/// # Errors
///
/// Returns a description of the problem if `value` is not an integer or not a valid [`PageSize`].
pub fn parse_page_size(value: &str) -> Result<PageSize, String> {
    let size = parse_u64(value).map_err(|error| error.to_string())?;
    PageSize::new(size).map_err(|error| error.to_string())
}
