use rust_decimal::{prelude::ToPrimitive, Decimal};
use serde::Deserialize;
use time::{Date, Duration, OffsetDateTime};

#[derive(Debug, Deserialize)]
pub struct Pagination {
    #[serde(default = "default_limit")]
    pub limit: i64,
    #[serde(default)]
    pub offset: i64,
}
fn default_limit() -> i64 {
    50
}

impl Pagination {
    pub fn clamped(&self) -> (i64, i64) {
        (self.limit.clamp(1, 500), self.offset.max(0))
    }
}

/// Reads the wall clock once; everything downstream takes `today` explicitly.
pub fn today() -> Date {
    OffsetDateTime::now_utc().date()
}

pub fn start_of_week(day: Date) -> Date {
    day - Duration::days(day.weekday().number_days_from_monday() as i64)
}

pub fn round_to(value: f64, places: i32) -> f64 {
    let factor = 10f64.powi(places);
    (value * factor).round() / factor
}

/// `part / whole * 100`, or 0 when `whole` is zero.
pub fn percent(part: f64, whole: f64) -> f64 {
    if whole == 0.0 {
        0.0
    } else {
        part / whole * 100.0
    }
}

pub fn to_f64(value: Decimal) -> f64 {
    value.to_f64().unwrap_or(0.0)
}

/// Defines a string-backed enum stored as TEXT and serialized in snake_case.
///
/// Generates `as_str`, `label`, `ALL`, `Display`, `FromStr` and
/// `TryFrom<String>` (the latter is what `#[sqlx(try_from = "String")]` uses).
macro_rules! text_enum {
    (
        $(#[$meta:meta])*
        pub enum $name:ident {
            $( $variant:ident => ($text:literal, $label:literal) ),+ $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
        pub enum $name {
            $( #[serde(rename = $text)] $variant ),+
        }

        impl $name {
            pub const ALL: &'static [$name] = &[$($name::$variant),+];

            pub fn as_str(&self) -> &'static str {
                match self {
                    $( $name::$variant => $text ),+
                }
            }

            pub fn label(&self) -> &'static str {
                match self {
                    $( $name::$variant => $label ),+
                }
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl std::str::FromStr for $name {
            type Err = String;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s {
                    $( $text => Ok($name::$variant), )+
                    other => Err(format!("unknown {} '{}'", stringify!($name), other)),
                }
            }
        }

        impl TryFrom<String> for $name {
            type Error = String;

            fn try_from(value: String) -> Result<Self, Self::Error> {
                value.parse()
            }
        }
    };
}

pub(crate) use text_enum;

#[cfg(test)]
mod tests {
    use super::*;
    use time::macros::date;

    text_enum! {
        pub enum Colour {
            Red => ("red", "Red"),
            DarkBlue => ("dark_blue", "Dark Blue"),
        }
    }

    #[test]
    fn text_enum_roundtrips_through_text() {
        assert_eq!(Colour::DarkBlue.as_str(), "dark_blue");
        assert_eq!(Colour::DarkBlue.label(), "Dark Blue");
        assert_eq!("red".parse::<Colour>(), Ok(Colour::Red));
        assert!(Colour::try_from("green".to_string()).is_err());
        assert_eq!(serde_json::to_string(&Colour::DarkBlue).unwrap(), "\"dark_blue\"");
        assert_eq!(Colour::ALL.len(), 2);
    }

    #[test]
    fn week_starts_on_monday() {
        // 2026-10-15 is a Thursday
        assert_eq!(start_of_week(date!(2026 - 10 - 15)), date!(2026 - 10 - 12));
        assert_eq!(start_of_week(date!(2026 - 10 - 12)), date!(2026 - 10 - 12));
        assert_eq!(start_of_week(date!(2026 - 10 - 18)), date!(2026 - 10 - 12));
    }

    #[test]
    fn percent_guards_zero_denominator() {
        assert_eq!(percent(5.0, 0.0), 0.0);
        assert_eq!(percent(1.0, 4.0), 25.0);
        assert_eq!(round_to(33.333, 1), 33.3);
        assert_eq!(round_to(2.345, 0), 2.0);
    }

    #[test]
    fn pagination_is_clamped() {
        let p = Pagination { limit: 10_000, offset: -3 };
        assert_eq!(p.clamped(), (500, 0));
    }
}
