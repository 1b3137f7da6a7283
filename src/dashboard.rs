use std::fmt;
use std::io;
use std::path::Path;
use std::str::FromStr;

use log::debug;

use enum_map::{enum_map, Enum, EnumMap};

use serde::Serialize;

use smartstring::alias::{String as SmartString};

use chrono::NaiveDate;

use super::config::DashboardConfig;
use super::flow::{build_flow, FlowGraph};
use super::ioutil::{magic_open, open_optional};
use super::loader::{self, CaseTable, LoadError};
use super::progress::ProgressSink;
use super::records::{CaseRecord, FlowRow, MortalityRecord, RecoveredRecord, TestingRecord};
use super::summary::{self, MapPoint, RegionCount};
use super::timeseries::{aggregate, DailyPoint};


/// Everything loaded at startup. Never modified afterwards.
#[derive(Debug, Clone, Default)]
pub struct Snapshot {
	pub note: Option<String>,
	pub events: Vec<CaseRecord>,
	pub mortality: Vec<MortalityRecord>,
	pub recovered: Vec<RecoveredRecord>,
	pub testing: Vec<TestingRecord>,
	pub flow: Vec<FlowRow>,
}

fn load_file<T, S, F>(progress: &mut S, path: &Path, f: F) -> Result<T, LoadError>
	where S: ProgressSink + ?Sized, F: FnOnce(&mut S, Box<dyn io::Read>) -> Result<T, LoadError>
{
	let r = magic_open(path).map_err(|e| LoadError::from(e).in_file(path))?;
	f(progress, r).map_err(|e| e.in_file(path))
}

impl Snapshot {
	pub fn load<S: ProgressSink + ?Sized>(config: &DashboardConfig, progress: &mut S) -> Result<Self, LoadError> {
		let CaseTable{note, records: events} = load_file(progress, &config.cases_path(), loader::load_cases)?;
		let mortality = load_file(progress, &config.mortality_path(), loader::load_mortality)?;
		let recovered = load_file(progress, &config.recovered_path(), loader::load_recovered)?;
		let testing = load_file(progress, &config.testing_path(), loader::load_testing)?;

		let flow_path = config.flow_path();
		let flow = match open_optional(&flow_path).map_err(|e| LoadError::from(e).in_file(&flow_path))? {
			Some(r) => loader::load_flow_rows(progress, r).map_err(|e| e.in_file(&flow_path))?,
			None => {
				debug!("{} not found, flow diagram stays empty", flow_path.display());
				Vec::new()
			},
		};

		Ok(Self{
			note,
			events,
			mortality,
			recovered,
			testing,
			flow,
		})
	}
}


#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UnknownCalculationType;

impl fmt::Display for UnknownCalculationType {
	fn fmt<'f>(&self, f: &'f mut fmt::Formatter) -> fmt::Result {
		f.write_str("calculation type must be \"Cumulative Cases\" or \"New Cases\"")
	}
}

impl std::error::Error for UnknownCalculationType {}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CalculationType {
	Cumulative,
	New,
}

impl FromStr for CalculationType {
	type Err = UnknownCalculationType;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		match s {
			"Cumulative Cases" | "cumulative" => Ok(Self::Cumulative),
			"New Cases" | "new" => Ok(Self::New),
			_ => Err(UnknownCalculationType),
		}
	}
}

impl CalculationType {
	pub fn axis_title(&self) -> &'static str {
		match self {
			Self::Cumulative => "No. of cumulative cases",
			Self::New => "No. of new cases",
		}
	}
}


/// The tabs below the province section.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Enum)]
pub enum StatsTab {
	Mortality,
	Recovered,
	Testing,
}

impl FromStr for StatsTab {
	type Err = std::convert::Infallible;

	// Anything unrecognized shows the testing tab, like the page itself.
	fn from_str(s: &str) -> Result<Self, Self::Err> {
		Ok(match s {
			"mortality-tab" => Self::Mortality,
			"recover-tab" => Self::Recovered,
			_ => Self::Testing,
		})
	}
}


#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ChartPoint {
	pub date: NaiveDate,
	pub value: u64,
}

/// One series of the per-province chart.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProvinceChart {
	pub province: SmartString,
	pub calculation: CalculationType,
	pub axis_title: &'static str,
	pub points: Vec<ChartPoint>,
}


pub struct Dashboard {
	snapshot: Snapshot,
	other_stats: EnumMap<StatsTab, Vec<RegionCount>>,
}

impl Dashboard {
	pub fn new(snapshot: Snapshot) -> Self {
		let other_stats = enum_map!{
			StatsTab::Mortality => summary::mortality_by_province(&snapshot.mortality),
			StatsTab::Recovered => summary::max_by_province(
				snapshot.recovered.iter().map(|rec| (&*rec.province, rec.cumulative_recovered)),
			),
			StatsTab::Testing => summary::max_by_province(
				snapshot.testing.iter().map(|rec| (&*rec.province, rec.cumulative_testing)),
			),
		};
		Self{
			snapshot,
			other_stats,
		}
	}

	pub fn snapshot(&self) -> &Snapshot {
		&self.snapshot
	}

	pub fn note(&self) -> Option<&str> {
		self.snapshot.note.as_deref()
	}

	pub fn canada_curve(&self) -> Vec<DailyPoint> {
		aggregate(&self.snapshot.events, None)
	}

	pub fn province_series(&self, province: &str) -> Vec<DailyPoint> {
		aggregate(&self.snapshot.events, Some(province))
	}

	pub fn province_curve(&self, province: &str, calculation: CalculationType) -> ProvinceChart {
		let points = self.province_series(province).into_iter().map(|p| ChartPoint{
			date: p.date,
			value: match calculation {
				CalculationType::Cumulative => p.cumulative_count,
				CalculationType::New => p.new_count,
			},
		}).collect();
		ProvinceChart{
			province: province.into(),
			calculation,
			axis_title: calculation.axis_title(),
			points,
		}
	}

	pub fn region_table(&self, province: &str) -> Vec<RegionCount> {
		summary::health_region_counts(&self.snapshot.events, province)
	}

	pub fn other_stats(&self, tab: StatsTab) -> &[RegionCount] {
		&self.other_stats[tab]
	}

	pub fn map(&self) -> Vec<MapPoint> {
		summary::map_points(&self.snapshot.events)
	}

	pub fn province_options(&self) -> Vec<SmartString> {
		summary::provinces(&self.snapshot.events)
	}

	pub fn flow(&self) -> FlowGraph {
		build_flow(&self.snapshot.flow)
	}
}
