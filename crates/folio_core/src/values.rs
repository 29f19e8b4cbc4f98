//! Built-in preference kinds

use std::fmt;
use std::str::FromStr;

use crate::preference::PreferenceDef;
use crate::PreferenceError;

/// A preference kind backed by a closed enum.
///
/// `ALL` lists the members in declaration order; the first toggle target of
/// a value is the member after it (wrapping).
pub trait PreferenceValue: Copy + Eq + 'static {
    /// Storage key for this preference kind.
    const KEY: &'static str;
    const ALL: &'static [Self];
    const DEFAULT: Self;

    /// The persisted form of the value.
    fn as_str(self) -> &'static str;

    /// Parse the persisted form exactly.
    fn from_wire(s: &str) -> Option<Self> {
        Self::ALL.iter().copied().find(|v| v.as_str() == s)
    }

    fn definition() -> PreferenceDef {
        PreferenceDef::from_kind::<Self>()
    }
}

fn parse_loose<T: PreferenceValue>(s: &str) -> Result<T, PreferenceError> {
    let s = s.trim();
    T::ALL
        .iter()
        .copied()
        .find(|v| v.as_str().eq_ignore_ascii_case(s))
        .ok_or_else(|| PreferenceError::NotAllowed {
            key: T::KEY.to_string(),
            value: s.to_string(),
            allowed: T::ALL.iter().map(|v| v.as_str().to_string()).collect(),
        })
}

/// Color theme
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum Theme {
    #[default]
    Dark,
    Light,
}

impl PreferenceValue for Theme {
    const KEY: &'static str = "theme";
    const ALL: &'static [Self] = &[Theme::Dark, Theme::Light];
    const DEFAULT: Self = Theme::Dark;

    fn as_str(self) -> &'static str {
        match self {
            Theme::Dark => "dark",
            Theme::Light => "light",
        }
    }
}

/// UI language
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum Language {
    #[default]
    En,
    Id,
}

impl PreferenceValue for Language {
    const KEY: &'static str = "language";
    const ALL: &'static [Self] = &[Language::En, Language::Id];
    const DEFAULT: Self = Language::En;

    fn as_str(self) -> &'static str {
        match self {
            Language::En => "EN",
            Language::Id => "ID",
        }
    }
}

macro_rules! impl_text {
    ($($ty:ty),*) => {
        $(
            impl fmt::Display for $ty {
                fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                    f.write_str(self.as_str())
                }
            }

            /// Case-insensitive, for user input. Storage reads use
            /// [`PreferenceValue::from_wire`].
            impl FromStr for $ty {
                type Err = PreferenceError;

                fn from_str(s: &str) -> Result<Self, Self::Err> {
                    parse_loose(s)
                }
            }
        )*
    };
}

impl_text!(Theme, Language);
