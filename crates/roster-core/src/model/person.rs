use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Display format for birth dates (`DD.MM.YYYY`).
pub const BIRTH_DATE_DISPLAY_FORMAT: &str = "%d.%m.%Y";

/// One person as delivered by the data source.
///
/// Records are immutable once loaded; filtering clones them into the
/// filtered list and never edits the originals.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "PersonWire", into = "PersonWire")]
pub struct PersonRecord {
    pub id: u64,
    pub first_name: String,
    pub last_name: String,
    pub birth_date: NaiveDate,
    /// Residence city. An empty city is still a valid group key.
    pub city: String,
}

impl PersonRecord {
    pub fn new(
        id: u64,
        first_name: impl Into<String>,
        last_name: impl Into<String>,
        birth_date: NaiveDate,
        city: impl Into<String>,
    ) -> Self {
        Self {
            id,
            first_name: first_name.into(),
            last_name: last_name.into(),
            birth_date,
            city: city.into(),
        }
    }

    /// `"First Last"`, as shown in the name column.
    #[must_use]
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }

    /// Birth date rendered as `DD.MM.YYYY`.
    #[must_use]
    pub fn formatted_birth_date(&self) -> String {
        format_birth_date(self.birth_date)
    }
}

/// Render a date as `DD.MM.YYYY`.
#[must_use]
pub fn format_birth_date(date: NaiveDate) -> String {
    date.format(BIRTH_DATE_DISPLAY_FORMAT).to_string()
}

/// Parse an ISO-8601 birth date string and render it as `DD.MM.YYYY`.
///
/// # Errors
///
/// Returns [`BirthDateError`] if `raw` is not a calendar date.
pub fn format_iso_birth_date(raw: &str) -> Result<String, BirthDateError> {
    parse_birth_date(raw).map(format_birth_date)
}

/// Birth date string that could not be parsed into a calendar date.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid birth date '{raw}': expected YYYY-MM-DD")]
pub struct BirthDateError {
    pub raw: String,
}

/// Parse an ISO-8601 date, tolerating missing zero padding (`1996-5-30`)
/// and a trailing time component (`1996-05-30T00:00:00Z`).
///
/// # Errors
///
/// Returns [`BirthDateError`] when the value has no valid `year-month-day`
/// prefix.
pub fn parse_birth_date(raw: &str) -> Result<NaiveDate, BirthDateError> {
    let invalid = || BirthDateError {
        raw: raw.to_string(),
    };

    let trimmed = raw.trim();
    let date_part = trimmed
        .split(['T', ' '])
        .next()
        .filter(|part| !part.is_empty())
        .ok_or_else(invalid)?;

    let mut fields = date_part.splitn(3, '-');
    let year: i32 = fields
        .next()
        .and_then(|y| y.parse().ok())
        .ok_or_else(invalid)?;
    let month: u32 = fields
        .next()
        .and_then(|m| m.parse().ok())
        .ok_or_else(invalid)?;
    let day: u32 = fields
        .next()
        .and_then(|d| d.parse().ok())
        .ok_or_else(invalid)?;

    NaiveDate::from_ymd_opt(year, month, day).ok_or_else(invalid)
}

impl fmt::Display for PersonRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {} ({}, {})",
            self.first_name,
            self.last_name,
            self.city,
            self.formatted_birth_date()
        )
    }
}

// ---------------------------------------------------------------------------
// Wire shape
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
struct AddressWire {
    #[serde(default)]
    city: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PersonWire {
    id: u64,
    first_name: String,
    last_name: String,
    birth_date: String,
    #[serde(default)]
    address: Option<AddressWire>,
}

impl TryFrom<PersonWire> for PersonRecord {
    type Error = BirthDateError;

    fn try_from(wire: PersonWire) -> Result<Self, Self::Error> {
        let birth_date = parse_birth_date(&wire.birth_date)?;
        Ok(Self {
            id: wire.id,
            first_name: wire.first_name,
            last_name: wire.last_name,
            birth_date,
            city: wire.address.unwrap_or_default().city,
        })
    }
}

impl From<PersonRecord> for PersonWire {
    fn from(record: PersonRecord) -> Self {
        Self {
            id: record.id,
            first_name: record.first_name,
            last_name: record.last_name,
            birth_date: record.birth_date.format("%Y-%m-%d").to_string(),
            address: Some(AddressWire { city: record.city }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn formats_birth_dates_day_first() {
        assert_eq!(format_iso_birth_date("1990-05-15").unwrap(), "15.05.1990");
        assert_eq!(format_iso_birth_date("2000-12-01").unwrap(), "01.12.2000");
    }

    #[test]
    fn parses_unpadded_dates() {
        assert_eq!(parse_birth_date("1996-5-30").unwrap(), date(1996, 5, 30));
        assert_eq!(parse_birth_date("2001-1-2").unwrap(), date(2001, 1, 2));
    }

    #[test]
    fn parses_dates_with_time_component() {
        assert_eq!(
            parse_birth_date("1990-05-15T00:00:00.000Z").unwrap(),
            date(1990, 5, 15)
        );
        assert_eq!(parse_birth_date(" 1990-05-15 ").unwrap(), date(1990, 5, 15));
    }

    #[test]
    fn rejects_non_dates() {
        for raw in ["", "yesterday", "1990-13-01", "1990-02-30", "1990-05"] {
            let err = parse_birth_date(raw).unwrap_err();
            assert_eq!(err.raw, raw);
        }
    }

    #[test]
    fn deserializes_dummyjson_shape() {
        let json = r#"{
            "id": 7,
            "firstName": "Emily",
            "lastName": "Johnson",
            "maidenName": "Smith",
            "age": 28,
            "birthDate": "1996-5-30",
            "address": { "address": "626 Main Street", "city": "Phoenix", "state": "Mississippi" }
        }"#;
        let record: PersonRecord = serde_json::from_str(json).unwrap();
        assert_eq!(record.id, 7);
        assert_eq!(record.full_name(), "Emily Johnson");
        assert_eq!(record.city, "Phoenix");
        assert_eq!(record.formatted_birth_date(), "30.05.1996");
    }

    #[test]
    fn missing_address_means_empty_city() {
        let json = r#"{"id": 1, "firstName": "A", "lastName": "B", "birthDate": "1980-01-01"}"#;
        let record: PersonRecord = serde_json::from_str(json).unwrap();
        assert_eq!(record.city, "");
    }

    #[test]
    fn invalid_birth_date_fails_deserialization() {
        let json = r#"{"id": 1, "firstName": "A", "lastName": "B", "birthDate": "soon"}"#;
        let err = serde_json::from_str::<PersonRecord>(json).unwrap_err();
        assert!(err.to_string().contains("invalid birth date"));
    }

    #[test]
    fn serializes_back_to_wire_shape() {
        let record = PersonRecord::new(3, "Bob", "Johnson", date(1975, 3, 9), "New York");
        let value = serde_json::to_value(&record).unwrap();
        assert_eq!(value["firstName"], "Bob");
        assert_eq!(value["birthDate"], "1975-03-09");
        assert_eq!(value["address"]["city"], "New York");
    }
}
