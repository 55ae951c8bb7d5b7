use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use shared::{Error, Result};

pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// Hotel search parameters as they arrive from callers. Everything is optional
/// here; [`crate::HotelSearchService::search_hotels`] decides what is required.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HotelSearchQuery {
    pub dest_id: Option<String>,
    pub search_type: Option<String>,
    pub check_in: Option<String>,
    pub check_out: Option<String>,
    pub adults: Option<u32>,
    pub rooms: Option<u32>,
    pub page: Option<u32>,
    pub currency: Option<String>,
    pub language: Option<String>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RequestOptions {
    /// Bypass both cache tiers and refresh them from upstream.
    pub force_refresh: bool,
}

impl RequestOptions {
    pub fn refresh() -> Self {
        Self {
            force_refresh: true,
        }
    }
}

/// A validated check-in/check-out pair. Check-out is strictly after check-in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StayDates {
    pub check_in: NaiveDate,
    pub check_out: NaiveDate,
}

impl StayDates {
    pub fn new(check_in: NaiveDate, check_out: NaiveDate) -> Result<Self> {
        if check_out <= check_in {
            return Err(Error::validation(
                "checkOut",
                format!(
                    "check-out date ({}) must be after check-in date ({})",
                    check_out, check_in
                ),
            ));
        }
        Ok(Self {
            check_in,
            check_out,
        })
    }

    pub fn parse(check_in: Option<&str>, check_out: Option<&str>) -> Result<Self> {
        let check_in = parse_date("checkIn", check_in)?;
        let check_out = parse_date("checkOut", check_out)?;
        Self::new(check_in, check_out)
    }

    /// Both dates or neither.
    pub fn parse_optional(check_in: Option<&str>, check_out: Option<&str>) -> Result<Option<Self>> {
        match (non_blank(check_in), non_blank(check_out)) {
            (None, None) => Ok(None),
            (check_in, check_out) => Self::parse(check_in, check_out).map(Some),
        }
    }

    pub fn arrival(&self) -> String {
        self.check_in.format(DATE_FORMAT).to_string()
    }

    pub fn departure(&self) -> String {
        self.check_out.format(DATE_FORMAT).to_string()
    }
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}

fn parse_date(field: &'static str, value: Option<&str>) -> Result<NaiveDate> {
    let raw = non_blank(value).ok_or_else(|| Error::validation(field, "is required"))?;
    NaiveDate::parse_from_str(raw, DATE_FORMAT).map_err(|_| {
        Error::validation(field, format!("'{}' is not a valid YYYY-MM-DD date", raw))
    })
}
