use serde::{Deserialize, Serialize};
use strum_macros::{AsRefStr, Display, EnumIter, EnumString};
use utoipa::ToSchema;

/// Calendar month as stored on a salary slip.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    EnumIter,
    AsRefStr,
    ToSchema,
)]
pub enum Month {
    January,
    February,
    March,
    April,
    May,
    June,
    July,
    August,
    September,
    October,
    November,
    December,
}

impl Month {
    /// 1-based sort key kept next to the month name in the store.
    pub fn numeric(self) -> u8 {
        self as u8 + 1
    }

    pub fn from_numeric(n: u8) -> Option<Self> {
        use strum::IntoEnumIterator;
        Month::iter().find(|m| m.numeric() == n)
    }
}

impl TryFrom<String> for Month {
    type Error = strum::ParseError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}
