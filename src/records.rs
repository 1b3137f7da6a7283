use std::fmt;

use serde::{de, Deserialize, Deserializer};

use smartstring::alias::{String as SmartString};

use chrono::naive::{NaiveDate, NaiveDateTime};


#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InvalidDate(pub String);

impl fmt::Display for InvalidDate {
	fn fmt<'f>(&self, f: &'f mut fmt::Formatter) -> fmt::Result {
		write!(f, "unrecognized date {:?}, expected YYYY-MM-DD, YYYY/MM/DD, DD-MM-YYYY, DD/MM/YYYY or YYYY-MM-DD HH:MM:SS", self.0)
	}
}

impl std::error::Error for InvalidDate {}


/// Parse the date formats found in the case sheets.
///
/// Accepts ISO dates with `-` or `/`, the day-first variants with `-` or `/`
/// and timestamps of the form `YYYY-MM-DD HH:MM:SS` or `YYYY/MM/DD HH:MM:SS`
/// (the time is dropped).
pub fn parse_report_date(s: &str) -> Result<NaiveDate, InvalidDate> {
	let s = s.trim();
	let invalid = || InvalidDate(s.into());
	if !s.is_ascii() {
		return Err(invalid())
	}
	let date = match s.len() {
		10 => s,
		// full pseudo-ISO timestamp
		19 => {
			let fmt = match s.as_bytes()[4] {
				b'-' => "%Y-%m-%d %H:%M:%S",
				b'/' => "%Y/%m/%d %H:%M:%S",
				_ => return Err(invalid()),
			};
			return NaiveDateTime::parse_from_str(s, fmt).map(|dt| dt.date()).map_err(|_| invalid())
		},
		_ => return Err(invalid()),
	};
	let b = date.as_bytes();
	let fmt = match (b[2], b[4]) {
		(_, b'-') => "%Y-%m-%d",
		(_, b'/') => "%Y/%m/%d",
		(b'-', _) => "%d-%m-%Y",
		(b'/', _) => "%d/%m/%Y",
		_ => return Err(invalid()),
	};
	NaiveDate::parse_from_str(date, fmt).map_err(|_| invalid())
}


fn report_date<'de, D>(deserializer: D) -> Result<NaiveDate, D::Error>
	where D: Deserializer<'de>
{
	let s = String::deserialize(deserializer)?;
	parse_report_date(&s).map_err(de::Error::custom)
}


fn travel_flag<'de, D>(deserializer: D) -> Result<bool, D::Error>
	where D: Deserializer<'de>
{
	let s = String::deserialize(deserializer)?;
	match s.trim().to_ascii_lowercase().as_str() {
		"1" | "y" | "yes" | "true" => Ok(true),
		"" | "0" | "n" | "no" | "false" | "na" | "not reported" => Ok(false),
		other => Err(de::Error::custom(format!("invalid travel flag {:?}", other))),
	}
}


fn maybe_count<'de, D>(deserializer: D) -> Result<Option<u64>, D::Error>
	where D: Deserializer<'de>
{
	let s = String::deserialize(deserializer)?;
	let s = s.trim();
	if s.is_empty() || s.eq_ignore_ascii_case("na") || s.eq_ignore_ascii_case("n/a") {
		return Ok(None)
	}
	if let Ok(v) = s.parse::<u64>() {
		return Ok(Some(v))
	}
	// sheets exports turn integer columns with holes into floats
	match s.parse::<f64>() {
		// u64::MAX rounds up to 2^64, the first float out of range
		Ok(v) if v >= 0.0 && v < u64::MAX as f64 && v.fract() == 0.0 => Ok(Some(v as u64)),
		_ => Err(de::Error::custom(format!("invalid count {:?}", s))),
	}
}


fn lenient_weight<'de, D>(deserializer: D) -> Result<f64, D::Error>
	where D: Deserializer<'de>
{
	// Non-numeric weights are passed on as NaN, the flow builder rejects them.
	let s = String::deserialize(deserializer)?;
	Ok(s.trim().parse::<f64>().unwrap_or(f64::NAN))
}


/// One confirmed case.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct CaseRecord {
	#[serde(alias = "date_report", deserialize_with = "report_date")]
	pub report_date: NaiveDate,
	pub province: SmartString,
	pub health_region: SmartString,
	pub provincial_case_id: SmartString,
	#[serde(rename = "travel_yn", deserialize_with = "travel_flag")]
	pub travel_history: bool,
}

/// One death. The sheet's first column is an unnamed case reference, the
/// loader renames it to `id`.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct MortalityRecord {
	pub id: SmartString,
	pub province: SmartString,
}

/// One row of the recovered sheet. Only the province and the running total
/// are read, the date column is left alone.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct RecoveredRecord {
	pub id: SmartString,
	pub province: SmartString,
	#[serde(deserialize_with = "maybe_count")]
	pub cumulative_recovered: Option<u64>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct TestingRecord {
	pub id: SmartString,
	pub province: SmartString,
	#[serde(deserialize_with = "maybe_count")]
	pub cumulative_testing: Option<u64>,
}

/// One weighted transition of the case origin flow.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct FlowRow {
	#[serde(rename = "from")]
	pub source: SmartString,
	#[serde(rename = "to")]
	pub target: SmartString,
	#[serde(rename = "count", deserialize_with = "lenient_weight")]
	pub weight: f64,
}

impl FlowRow {
	pub fn new<S: Into<SmartString>, T: Into<SmartString>>(source: S, target: T, weight: f64) -> Self {
		Self{
			source: source.into(),
			target: target.into(),
			weight,
		}
	}
}
