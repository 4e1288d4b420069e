//! The closed set of countries the gallery is partitioned by.

use serde::{Deserialize, Serialize};
use std::{fmt, str::FromStr};
use thiserror::Error;

/// A gallery partition. Images, folder metadata and storage buckets are all
/// scoped to exactly one country.
#[derive(Serialize, Deserialize, sqlx::Type, Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum Country {
    #[default]
    #[serde(rename = "gh")]
    #[sqlx(rename = "gh")]
    Ghana,
    #[serde(rename = "ng")]
    #[sqlx(rename = "ng")]
    Nigeria,
    #[serde(rename = "ke")]
    #[sqlx(rename = "ke")]
    Kenya,
    #[serde(rename = "gb", alias = "uk")]
    #[sqlx(rename = "gb")]
    UnitedKingdom,
    #[serde(rename = "us")]
    #[sqlx(rename = "us")]
    UnitedStates,
}

#[derive(Debug, Error, PartialEq, Eq)]
#[error("unknown country `{0}`")]
pub struct UnknownCountry(pub String);

impl Country {
    pub const ALL: [Country; 5] = [
        Country::Ghana,
        Country::Nigeria,
        Country::Kenya,
        Country::UnitedKingdom,
        Country::UnitedStates,
    ];

    /// Canonical lowercase code used in addresses, rows and bucket names.
    pub fn code(self) -> &'static str {
        match self {
            Country::Ghana => "gh",
            Country::Nigeria => "ng",
            Country::Kenya => "ke",
            Country::UnitedKingdom => "gb",
            Country::UnitedStates => "us",
        }
    }

    pub fn display_name(self) -> &'static str {
        match self {
            Country::Ghana => "Ghana",
            Country::Nigeria => "Nigeria",
            Country::Kenya => "Kenya",
            Country::UnitedKingdom => "United Kingdom",
            Country::UnitedStates => "United States",
        }
    }

    pub fn flag(self) -> &'static str {
        match self {
            Country::Ghana => "🇬🇭",
            Country::Nigeria => "🇳🇬",
            Country::Kenya => "🇰🇪",
            Country::UnitedKingdom => "🇬🇧",
            Country::UnitedStates => "🇺🇸",
        }
    }

    /// Name of the storage bucket holding this country's images.
    pub fn bucket(self) -> String {
        format!("gallery-{}", self.code())
    }
}

impl fmt::Display for Country {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

impl FromStr for Country {
    type Err = UnknownCountry;

    /// Case-insensitive. `uk` is accepted as an alias of `gb`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let lowered = s.trim().to_ascii_lowercase();
        let code = match lowered.as_str() {
            "uk" => "gb",
            other => other,
        };
        Country::ALL
            .into_iter()
            .find(|c| c.code() == code)
            .ok_or_else(|| UnknownCountry(s.to_string()))
    }
}

/// Listing entry for `GET /api/countries`.
#[derive(Serialize, Debug)]
pub struct CountryInfo {
    pub code: &'static str,
    pub name: &'static str,
    pub flag: &'static str,
    pub bucket: String,
}

impl From<Country> for CountryInfo {
    fn from(country: Country) -> Self {
        Self {
            code: country.code(),
            name: country.display_name(),
            flag: country.flag(),
            bucket: country.bucket(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_codes_case_insensitively() {
        assert_eq!("KE".parse::<Country>(), Ok(Country::Kenya));
        assert_eq!(" ng ".parse::<Country>(), Ok(Country::Nigeria));
    }

    #[test]
    fn uk_is_an_alias_for_gb() {
        assert_eq!("uk".parse::<Country>(), Ok(Country::UnitedKingdom));
        assert_eq!(Country::UnitedKingdom.code(), "gb");
    }

    #[test]
    fn unknown_code_is_rejected() {
        assert_eq!(
            "fr".parse::<Country>(),
            Err(UnknownCountry("fr".to_string()))
        );
    }

    #[test]
    fn bucket_names_are_per_country() {
        assert_eq!(Country::UnitedStates.bucket(), "gallery-us");
        assert_eq!(Country::default(), Country::Ghana);
    }

    #[test]
    fn serde_uses_codes() {
        let json = serde_json::to_string(&Country::UnitedKingdom).unwrap();
        assert_eq!(json, "\"gb\"");
        let parsed: Country = serde_json::from_str("\"uk\"").unwrap();
        assert_eq!(parsed, Country::UnitedKingdom);
    }
}
