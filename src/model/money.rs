use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use utoipa::ToSchema;
use utoipa::openapi::{
    KnownFormat, ObjectBuilder, RefOr, Schema, SchemaFormat, SchemaType,
};

/// Currency amount held in paise so that sums never drift.
///
/// On the wire it is a plain rupee number (`1500.5`); inputs are rounded to
/// the nearest paisa.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, sqlx::Type)]
#[sqlx(transparent)]
pub struct Money(i64);

impl Money {
    pub const ZERO: Money = Money(0);

    /// Largest rupee amount accepted from a request. Summing every slip
    /// component at this size stays far inside `i64` paise.
    pub const MAX_RUPEES: f64 = 1e13;

    pub const fn from_paise(paise: i64) -> Self {
        Money(paise)
    }

    pub fn from_rupees(rupees: f64) -> Self {
        Money((rupees * 100.0).round() as i64)
    }

    pub const fn paise_total(self) -> i64 {
        self.0
    }

    /// Whole-rupee part of the absolute amount.
    pub const fn rupee_part(self) -> u64 {
        self.0.unsigned_abs() / 100
    }

    /// Paise part (0..=99) of the absolute amount.
    pub const fn paise_part(self) -> u64 {
        self.0.unsigned_abs() % 100
    }

    pub const fn is_negative(self) -> bool {
        self.0 < 0
    }

    pub fn as_rupees(self) -> f64 {
        self.0 as f64 / 100.0
    }

    pub const fn checked_add(self, rhs: Money) -> Option<Money> {
        match self.0.checked_add(rhs.0) {
            Some(paise) => Some(Money(paise)),
            None => None,
        }
    }

    pub const fn checked_sub(self, rhs: Money) -> Option<Money> {
        match self.0.checked_sub(rhs.0) {
            Some(paise) => Some(Money(paise)),
            None => None,
        }
    }
}

impl fmt::Display for Money {
    /// Always two decimals, e.g. `1500.50`.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sign = if self.is_negative() { "-" } else { "" };
        write!(f, "{sign}{}.{:02}", self.rupee_part(), self.paise_part())
    }
}

impl Serialize for Money {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_f64(self.as_rupees())
    }
}

impl<'de> Deserialize<'de> for Money {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let rupees = f64::deserialize(deserializer)?;
        if !rupees.is_finite() {
            return Err(serde::de::Error::custom("amount must be a finite number"));
        }
        if rupees.abs() > Money::MAX_RUPEES {
            return Err(serde::de::Error::custom(format!(
                "amount must not exceed {} in magnitude",
                Money::MAX_RUPEES
            )));
        }
        Ok(Money::from_rupees(rupees))
    }
}

impl<'s> ToSchema<'s> for Money {
    fn schema() -> (&'s str, RefOr<Schema>) {
        let schema = ObjectBuilder::new()
            .schema_type(SchemaType::Number)
            .format(Some(SchemaFormat::KnownFormat(KnownFormat::Double)))
            .description(Some("Amount in rupees, up to two decimal places"))
            .example(Some(serde_json::json!(1500.5)))
            .build();

        ("Money", RefOr::T(Schema::Object(schema)))
    }
}
