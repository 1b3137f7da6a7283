use std::collections::HashMap;
use std::hash::Hash;

use num_traits::Zero;

use log::trace;

use serde::Serialize;

use smartstring::alias::{String as SmartString};

use chrono::NaiveDate;

use super::records::CaseRecord;


pub trait TimeSeriesKey: Hash + Eq + Clone + std::fmt::Debug {}
impl<T: Hash + Eq + Clone + std::fmt::Debug> TimeSeriesKey for T {}


/// Keyed daily values on one gapless calendar, `start` to `last` inclusive.
#[derive(Debug, Clone)]
pub struct TimeSeries<T: Hash + Eq, V: Copy> {
	start: NaiveDate,
	keys: HashMap<T, usize>,
	time_series: Vec<Vec<V>>,
	len: usize,
}

impl<T: Hash + Eq, V: Copy> TimeSeries<T, V> {
	pub fn new(start: NaiveDate, last: NaiveDate) -> Self {
		let len = (last - start).num_days() + 1;
		assert!(len > 0, "calendar ends before it starts");
		Self{
			start,
			len: len as usize,
			keys: HashMap::new(),
			time_series: Vec::new(),
		}
	}

	#[inline(always)]
	pub fn date_index(&self, other: NaiveDate) -> Option<usize> {
		let days = (other - self.start).num_days();
		if days < 0 || days as usize >= self.len {
			return None
		}
		Some(days as usize)
	}

	#[inline(always)]
	pub fn index_date(&self, i: usize) -> Option<NaiveDate> {
		if i >= self.len {
			return None
		}
		Some(self.start + chrono::Duration::days(i as i64))
	}

	#[inline(always)]
	pub fn start(&self) -> NaiveDate {
		self.start
	}

	#[inline(always)]
	pub fn last(&self) -> NaiveDate {
		self.start + chrono::Duration::days(self.len as i64 - 1)
	}

	#[inline(always)]
	pub fn len(&self) -> usize {
		self.len
	}

	pub fn dates(&self) -> impl Iterator<Item = NaiveDate> {
		self.start.iter_days().take(self.len)
	}
}

impl<T: TimeSeriesKey, V: Copy + Zero> TimeSeries<T, V> {
	pub fn get_or_create(&mut self, k: T) -> &mut [V] {
		let index = self.get_index_or_create(k);
		&mut self.time_series[index][..]
	}

	pub fn get_index_or_create(&mut self, k: T) -> usize {
		match self.keys.get(&k) {
			Some(v) => *v,
			None => {
				let v = self.time_series.len();
				self.time_series.push(vec![V::zero(); self.len]);
				self.keys.insert(k, v);
				v
			},
		}
	}

	pub fn get(&self, k: &T) -> Option<&[V]> {
		let index = *self.keys.get(k)?;
		Some(&self.time_series[index][..])
	}

	pub fn get_value(&self, k: &T, i: usize) -> Option<V> {
		self.get(k)?.get(i).copied()
	}

	pub fn keys(&self) -> std::collections::hash_map::Keys<'_, T, usize> {
		self.keys.keys()
	}
}

impl<T: TimeSeriesKey> TimeSeries<T, u64> {
	/// Merge series under a new key; keys mapped to `None` are dropped.
	pub fn rekeyed<U: TimeSeriesKey, F: Fn(&T) -> Option<U>>(&self, f: F) -> TimeSeries<U, u64> {
		let mut result = TimeSeries::<U, u64>{
			start: self.start,
			len: self.len,
			keys: HashMap::new(),
			time_series: Vec::new(),
		};
		for (k_old, index_old) in self.keys.iter() {
			let k_new = match f(k_old) {
				Some(k) => k,
				None => continue,
			};
			let ts_new = result.get_or_create(k_new);
			let ts_old = &self.time_series[*index_old][..];
			for (dst, src) in ts_new.iter_mut().zip(ts_old.iter()) {
				*dst += *src;
			}
		}
		result
	}

	pub fn cumsum(&mut self) {
		for vec in self.time_series.iter_mut() {
			let mut accum: u64 = 0;
			for v in vec.iter_mut() {
				accum += *v;
				*v = accum;
			}
		}
	}
}


pub type Counters<T> = TimeSeries<T, u64>;


/// One day of a case curve.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct DailyPoint {
	pub date: NaiveDate,
	pub new_count: u64,
	pub cumulative_count: u64,
}


/// Daily new cases together with their running totals.
#[derive(Debug, Clone)]
pub struct CaseCurve<T: TimeSeriesKey> {
	d1: Counters<T>,
	cum: Counters<T>,
}

impl<T: TimeSeriesKey> CaseCurve<T> {
	pub fn from_d1(d1: Counters<T>) -> Self {
		let mut cum = d1.clone();
		cum.cumsum();
		Self{
			d1,
			cum,
		}
	}

	pub fn rekeyed<U: TimeSeriesKey, F: Fn(&T) -> Option<U>>(&self, f: F) -> CaseCurve<U> {
		CaseCurve::from_d1(self.d1.rekeyed(f))
	}

	pub fn d1(&self) -> &Counters<T> {
		&self.d1
	}

	pub fn cum(&self) -> &Counters<T> {
		&self.cum
	}

	pub fn points(&self, k: &T) -> Option<Vec<DailyPoint>> {
		let d1 = self.d1.get(k)?;
		let cum = self.cum.get(k)?;
		Some(self.d1.dates().zip(d1.iter().zip(cum.iter())).map(|(date, (new_count, cumulative_count))| {
			DailyPoint{
				date,
				new_count: *new_count,
				cumulative_count: *cumulative_count,
			}
		}).collect())
	}
}

impl CaseCurve<SmartString> {
	/// All regions summed into one curve.
	pub fn national(&self) -> Vec<DailyPoint> {
		self.rekeyed(|_| Some(())).points(&()).unwrap_or_default()
	}
}


fn date_span<'x, I: Iterator<Item = &'x CaseRecord>>(events: I) -> Option<(NaiveDate, NaiveDate)> {
	events.fold(None, |span, rec| match span {
		None => Some((rec.report_date, rec.report_date)),
		Some((first, last)) => Some((first.min(rec.report_date), last.max(rec.report_date))),
	})
}

fn count_by<'x, T, I, F>(events: I, first: NaiveDate, last: NaiveDate, key: F) -> Counters<T>
	where T: TimeSeriesKey, I: Iterator<Item = &'x CaseRecord>, F: Fn(&CaseRecord) -> T
{
	trace!("counting cases from {} to {}", first, last);
	let mut counters = Counters::new(first, last);
	for rec in events {
		let index = counters.date_index(rec.report_date).expect("report date outside of the computed span");
		counters.get_or_create(key(rec))[index] += 1;
	}
	counters
}


/// Daily new and cumulative case counts, optionally restricted to one
/// province.
///
/// The result covers every day from the first to the last matching report,
/// days without reports count zero. No matching rows give an empty result.
pub fn aggregate(events: &[CaseRecord], region_filter: Option<&str>) -> Vec<DailyPoint> {
	let selected = |rec: &&CaseRecord| match region_filter {
		Some(region) => &*rec.province == region,
		None => true,
	};
	let (first, last) = match date_span(events.iter().filter(selected)) {
		Some(span) => span,
		None => return Vec::new(),
	};
	let d1 = count_by(events.iter().filter(selected), first, last, |_| ());
	CaseCurve::from_d1(d1).points(&()).unwrap_or_default()
}

/// Case curves for every province on the calendar of the whole event set.
///
/// Unlike [`aggregate`], a province's curve may start and end with zero days
/// here. `None` if there are no events.
pub fn aggregate_by_region(events: &[CaseRecord]) -> Option<CaseCurve<SmartString>> {
	let (first, last) = date_span(events.iter())?;
	Some(CaseCurve::from_d1(count_by(events.iter(), first, last, |rec| rec.province.clone())))
}
