//! Per-kind state shapes.
//!
//! Every field defaults when missing so partially written blobs from older
//! clients still decode. Neutral values (empty lists, empty strings) mean
//! the filter is configured but lets everything through.

use serde::{Deserialize, Serialize, de::DeserializeOwned};
use serde_json::Value;
use strum_macros::{AsRefStr, Display, EnumString};

use crate::FilterKind;

/// A typed state shape owned by one [`FilterKind`].
pub trait KindState: Serialize + DeserializeOwned {
    /// The kind this state belongs to.
    const KIND: FilterKind;

    /// Encodes the state as a node blob.
    fn to_value(&self) -> Value;
}

/// State of a `category` node.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CategoryState {
    /// Category ids to exclude.
    pub hidden_categories: Vec<String>,
    /// Type ids to exclude.
    pub hidden_types: Vec<String>,
}

impl KindState for CategoryState {
    const KIND: FilterKind = FilterKind::Category;

    fn to_value(&self) -> Value {
        serde_json::json!({
            "hiddenCategories": self.hidden_categories,
            "hiddenTypes": self.hidden_types,
        })
    }
}

/// State of a `country` node.
///
/// Department and municipality entries are composite keys
/// (`"<country> - <department>"`, `"<country> - <department> - <municipality>"`).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CountryState {
    /// Country names to exclude.
    pub hidden_countries: Vec<String>,
    /// Department composite keys to exclude.
    pub hidden_departments: Vec<String>,
    /// Municipality composite keys to exclude.
    pub hidden_municipalities: Vec<String>,
}

impl KindState for CountryState {
    const KIND: FilterKind = FilterKind::Country;

    fn to_value(&self) -> Value {
        serde_json::json!({
            "hiddenCountries": self.hidden_countries,
            "hiddenDepartments": self.hidden_departments,
            "hiddenMunicipalities": self.hidden_municipalities,
        })
    }
}

/// Comparator modes of the date filter.
///
/// The persisted tags are the Spanish labels the frontend writes; the
/// English names are accepted on input.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, AsRefStr)]
pub enum DateComparison {
    /// Same day as `date1`.
    #[strum(to_string = "es", serialize = "equals")]
    Equals,
    /// Strictly before `date1`.
    #[strum(to_string = "es anterior", serialize = "before")]
    Before,
    /// Strictly after `date1`.
    #[strum(to_string = "es posterior", serialize = "after")]
    After,
    /// Between `date1` and `date2`, both inclusive.
    #[strum(to_string = "es entre", serialize = "between")]
    Between,
}

/// State of a `date` node.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct DateState {
    /// Primary bound (`YYYY-MM-DD`); empty disables the filter.
    pub date1: String,
    /// Upper bound for [`DateComparison::Between`].
    pub date2: String,
    /// Comparator tag, see [`DateComparison`].
    pub selected_date_filter: String,
}

impl Default for DateState {
    fn default() -> Self {
        Self {
            date1: String::new(),
            date2: String::new(),
            selected_date_filter: DateComparison::Between.to_string(),
        }
    }
}

impl DateState {
    /// Builds a state for `comparison` with the given bounds.
    #[must_use]
    pub fn new(comparison: DateComparison, date1: &str, date2: &str) -> Self {
        Self {
            date1: date1.to_string(),
            date2: date2.to_string(),
            selected_date_filter: comparison.to_string(),
        }
    }

    /// Parsed comparator, `None` when the tag is unrecognized.
    #[must_use]
    pub fn comparison(&self) -> Option<DateComparison> {
        self.selected_date_filter.parse().ok()
    }
}

impl KindState for DateState {
    const KIND: FilterKind = FilterKind::Date;

    fn to_value(&self) -> Value {
        serde_json::json!({
            "date1": self.date1,
            "date2": self.date2,
            "selectedDateFilter": self.selected_date_filter,
        })
    }
}

/// State of a `desc` node.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DescState {
    /// Substring to look for, case-insensitively.
    pub search: String,
}

impl KindState for DescState {
    const KIND: FilterKind = FilterKind::Desc;

    fn to_value(&self) -> Value {
        serde_json::json!({ "search": self.search })
    }
}

/// State of a `latlong` node.
///
/// Values are kept as the strings typed into the inputs; they are parsed at
/// evaluation time.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LatLongState {
    /// Center latitude.
    pub latitude: String,
    /// Center longitude.
    pub longitude: String,
    /// Radius in kilometers.
    pub radius: String,
}

fn count_digits(bytes: &[u8]) -> usize {
    bytes.iter().take_while(|b| b.is_ascii_digit()).count()
}

/// Reads the longest decimal literal at the start of `input`, after leading
/// whitespace, the way the map's form inputs are read: `"10km"` is 10 and
/// `" -3.5e2 "` is -350. Named values such as `inf` or `NaN`, and literals
/// that overflow to infinity, yield `None`.
fn parse_leading_number(input: &str) -> Option<f64> {
    let s = input.trim_start();
    let bytes = s.as_bytes();

    let mut end = usize::from(matches!(bytes.first(), Some(b'+' | b'-')));
    let int_digits = count_digits(&bytes[end..]);
    end += int_digits;

    let mut frac_digits = 0;
    if bytes.get(end) == Some(&b'.') {
        frac_digits = count_digits(&bytes[end + 1..]);
        if int_digits + frac_digits > 0 {
            end += 1 + frac_digits;
        }
    }
    if int_digits + frac_digits == 0 {
        return None;
    }

    if matches!(bytes.get(end), Some(b'e' | b'E')) {
        let mut exp_end = end + 1;
        if matches!(bytes.get(exp_end), Some(b'+' | b'-')) {
            exp_end += 1;
        }
        let exp_digits = count_digits(&bytes[exp_end..]);
        if exp_digits > 0 {
            end = exp_end + exp_digits;
        }
    }

    s[..end].parse::<f64>().ok().filter(|v| v.is_finite())
}

impl LatLongState {
    /// `(latitude, longitude, radius_km)` once all three start with a
    /// finite decimal number. Trailing text after the number is ignored.
    #[must_use]
    pub fn parsed(&self) -> Option<(f64, f64, f64)> {
        Some((
            parse_leading_number(&self.latitude)?,
            parse_leading_number(&self.longitude)?,
            parse_leading_number(&self.radius)?,
        ))
    }
}

impl KindState for LatLongState {
    const KIND: FilterKind = FilterKind::LatLong;

    fn to_value(&self) -> Value {
        serde_json::json!({
            "latitude": self.latitude,
            "longitude": self.longitude,
            "radius": self.radius,
        })
    }
}
