use std::collections::{HashMap, HashSet};

use log::warn;

use serde::Serialize;

use smartstring::alias::{String as SmartString};

use super::records::{CaseRecord, MortalityRecord};


#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RegionCount {
	pub region: SmartString,
	pub count: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct GeoPoint {
	pub lat: f64,
	pub lon: f64,
}

/// A province bubble on the country map.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MapPoint {
	pub province: SmartString,
	pub cases: u64,
	pub lat: f64,
	pub lon: f64,
}


// Largest first, ties by name so the output does not depend on hashing.
fn ranked(counts: HashMap<&str, u64>) -> Vec<RegionCount> {
	let mut result: Vec<RegionCount> = counts.into_iter().map(|(region, count)| {
		RegionCount{region: region.into(), count}
	}).collect();
	result.sort_by(|a, b| b.count.cmp(&a.count).then_with(|| a.region.cmp(&b.region)));
	result
}

fn value_counts<'x, I: Iterator<Item = &'x str>>(values: I) -> Vec<RegionCount> {
	let mut counts = HashMap::new();
	for v in values {
		*counts.entry(v).or_insert(0) += 1;
	}
	ranked(counts)
}


pub fn province_case_counts(events: &[CaseRecord]) -> Vec<RegionCount> {
	value_counts(events.iter().map(|rec| &*rec.province))
}

/// Cases per health region of one province.
pub fn health_region_counts(events: &[CaseRecord], province: &str) -> Vec<RegionCount> {
	value_counts(events.iter().filter(|rec| &*rec.province == province).map(|rec| &*rec.health_region))
}

pub fn mortality_by_province(records: &[MortalityRecord]) -> Vec<RegionCount> {
	value_counts(records.iter().map(|rec| &*rec.province))
}

/// Highest reported value per province, for cumulative columns.
///
/// Missing values are ignored; provinces without any value are left out.
pub fn max_by_province<'x, I: IntoIterator<Item = (&'x str, Option<u64>)>>(values: I) -> Vec<RegionCount> {
	let mut maxima: HashMap<&str, u64> = HashMap::new();
	for (province, v) in values {
		let v = match v {
			Some(v) => v,
			None => continue,
		};
		let slot = maxima.entry(province).or_insert(v);
		*slot = (*slot).max(v);
	}
	ranked(maxima)
}

/// Distinct provinces in order of first appearance.
pub fn provinces(events: &[CaseRecord]) -> Vec<SmartString> {
	let mut seen = HashSet::new();
	let mut result = Vec::new();
	for rec in events {
		if seen.insert(&*rec.province) {
			result.push(rec.province.clone());
		}
	}
	result
}

pub fn province_location(province: &str) -> Option<GeoPoint> {
	let (lat, lon) = match province {
		"Quebec" => (53.0, -70.0),
		"Ontario" => (50.0, -85.0),
		"BC" => (53.72669, -127.647621),
		"Alberta" => (55.0, -115.0),
		"Nova Scotia" => (45.0, -63.0),
		"NL" => (53.0, -60.0),
		"Saskatchewan" => (55.0, -106.0),
		"New Brunswick" => (46.498390, -66.159668),
		"PEI" => (46.25, -63.0),
		"Yukon" => (64.0, -135.0),
		"NWT" => (64.2667, -119.1833),
		"Manitoba" => (53.76086, -98.813873),
		_ => return None,
	};
	Some(GeoPoint{lat, lon})
}

/// Case counts per province placed on the map, largest first. Provinces
/// without coordinates are dropped.
pub fn map_points(events: &[CaseRecord]) -> Vec<MapPoint> {
	let mut result = Vec::new();
	for RegionCount{region, count} in province_case_counts(events) {
		match province_location(&region) {
			Some(loc) => result.push(MapPoint{
				province: region,
				cases: count,
				lat: loc.lat,
				lon: loc.lon,
			}),
			None => warn!("no map location for {:?}, dropping {} cases from the map", region, count),
		}
	}
	result
}
