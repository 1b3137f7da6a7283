use std::fmt;
use std::io;
use std::path::PathBuf;

use log::debug;

use serde::de::DeserializeOwned;

use super::progress::{CountMeter, ProgressSink};
use super::records::{CaseRecord, FlowRow, MortalityRecord, RecoveredRecord, TestingRecord};


#[derive(Debug)]
pub enum LoadError {
	Io(io::Error),
	Csv(csv::Error),
	InFile{path: PathBuf, error: Box<LoadError>},
}

impl LoadError {
	pub fn in_file<P: Into<PathBuf>>(self, path: P) -> Self {
		Self::InFile{path: path.into(), error: Box::new(self)}
	}
}

impl fmt::Display for LoadError {
	fn fmt<'f>(&self, f: &'f mut fmt::Formatter) -> fmt::Result {
		match self {
			Self::Io(e) => fmt::Display::fmt(e, f),
			Self::Csv(e) => fmt::Display::fmt(e, f),
			Self::InFile{path, error} => write!(f, "{}: {}", path.display(), error),
		}
	}
}

impl std::error::Error for LoadError {
	fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
		match self {
			Self::Io(e) => Some(e),
			Self::Csv(e) => Some(e),
			Self::InFile{error, ..} => Some(&**error),
		}
	}
}

impl From<io::Error> for LoadError {
	fn from(other: io::Error) -> Self {
		Self::Io(other)
	}
}

impl From<csv::Error> for LoadError {
	fn from(other: csv::Error) -> Self {
		Self::Csv(other)
	}
}


/// Case rows plus the data note the sheet hides in its first header cell.
#[derive(Debug, Clone, Default)]
pub struct CaseTable {
	pub note: Option<String>,
	pub records: Vec<CaseRecord>,
}


fn reader<R: io::Read>(r: R) -> csv::Reader<R> {
	csv::ReaderBuilder::new()
		.trim(csv::Trim::All)
		.from_reader(r)
}

fn read_records<T: DeserializeOwned, R: io::Read, S: ProgressSink + ?Sized>(
	progress: &mut S,
	mut r: csv::Reader<R>,
) -> Result<Vec<T>, LoadError> {
	let mut pm = CountMeter::new(progress);
	let mut result = Vec::new();
	for (i, row) in r.deserialize().enumerate() {
		let rec: T = row?;
		result.push(rec);
		if i % 10000 == 9999 {
			pm.update(i+1);
		}
	}
	pm.finish(result.len());
	Ok(result)
}

// The export prefixes the first column header with a data note, ending in
// "Please ...". Only that prefix is of interest.
fn data_note(first_header: &str) -> Option<String> {
	let (note, _) = first_header.split_once("Please")?;
	let note = note.trim();
	if note.is_empty() {
		return None
	}
	Some(note.into())
}

// The secondary sheets carry an unnamed reference column first.
fn rename_first_column<R: io::Read>(r: &mut csv::Reader<R>) -> Result<(), LoadError> {
	let mut renamed = csv::StringRecord::new();
	for (i, name) in r.headers()?.iter().enumerate() {
		renamed.push_field(if i == 0 { "id" } else { name });
	}
	r.set_headers(renamed);
	Ok(())
}


pub fn load_cases<R: io::Read, S: ProgressSink + ?Sized>(progress: &mut S, r: R) -> Result<CaseTable, LoadError> {
	let mut r = reader(r);
	let note = r.headers()?.get(0).and_then(data_note);
	let records = read_records(progress, r)?;
	debug!("loaded {} case records", records.len());
	Ok(CaseTable{note, records})
}

pub fn load_mortality<R: io::Read, S: ProgressSink + ?Sized>(progress: &mut S, r: R) -> Result<Vec<MortalityRecord>, LoadError> {
	let mut r = reader(r);
	rename_first_column(&mut r)?;
	let records = read_records(progress, r)?;
	debug!("loaded {} mortality records", records.len());
	Ok(records)
}

pub fn load_recovered<R: io::Read, S: ProgressSink + ?Sized>(progress: &mut S, r: R) -> Result<Vec<RecoveredRecord>, LoadError> {
	let mut r = reader(r);
	rename_first_column(&mut r)?;
	let records = read_records(progress, r)?;
	debug!("loaded {} recovered records", records.len());
	Ok(records)
}

pub fn load_testing<R: io::Read, S: ProgressSink + ?Sized>(progress: &mut S, r: R) -> Result<Vec<TestingRecord>, LoadError> {
	let mut r = reader(r);
	rename_first_column(&mut r)?;
	let records = read_records(progress, r)?;
	debug!("loaded {} testing records", records.len());
	Ok(records)
}

pub fn load_flow_rows<R: io::Read, S: ProgressSink + ?Sized>(progress: &mut S, r: R) -> Result<Vec<FlowRow>, LoadError> {
	let records = read_records(progress, reader(r))?;
	debug!("loaded {} flow rows", records.len());
	Ok(records)
}


#[cfg(test)]
mod tests {
	use super::*;

	use crate::progress::NullSink;

	#[test]
	fn extracts_the_data_note() {
		let data = b"Data as of 2020-04-01. Please cite the source,report_date,province,health_region,provincial_case_id,travel_yn\n\
			1,2020-03-01,Ontario,Toronto,5,0\n";
		let table = load_cases(&mut NullSink, &data[..]).unwrap();
		assert_eq!(table.note.as_deref(), Some("Data as of 2020-04-01."));
		assert_eq!(table.records.len(), 1);
	}

	#[test]
	fn plain_headers_have_no_note() {
		let data = b"case_id,report_date,province,health_region,provincial_case_id,travel_yn\n";
		let table = load_cases(&mut NullSink, &data[..]).unwrap();
		assert_eq!(table.note, None);
		assert!(table.records.is_empty());
	}

	#[test]
	fn secondary_sheets_get_an_id_column() {
		let data = b"death_id,province,age\n1, Ontario ,80\n2,Quebec,90\n";
		let rows = load_mortality(&mut NullSink, &data[..]).unwrap();
		assert_eq!(rows.len(), 2);
		assert_eq!(&*rows[0].id, "1");
		assert_eq!(&*rows[0].province, "Ontario");
	}

	#[test]
	fn bad_dates_are_fatal() {
		let data = b"case_id,report_date,province,health_region,provincial_case_id,travel_yn\n1,soon,Ontario,Toronto,1,0\n";
		match load_cases(&mut NullSink, &data[..]) {
			Err(LoadError::Csv(e)) => assert!(e.to_string().contains("soon")),
			other => panic!("unexpected result {:?}", other.map(|t| t.records.len())),
		}
	}

	#[test]
	fn date_column_may_come_first() {
		let data = b"date_recovered,province,cumulative_recovered\n01-03-2020,Ontario,4\n";
		let rows = load_recovered(&mut NullSink, &data[..]).unwrap();
		assert_eq!(rows.len(), 1);
		assert_eq!(&*rows[0].id, "01-03-2020");
		assert_eq!(rows[0].cumulative_recovered, Some(4));
	}

	#[test]
	fn unused_date_cells_are_not_parsed() {
		let data = b"testing_id,date_testing,province,cumulative_testing\n1,pending,Ontario,120\n";
		let rows = load_testing(&mut NullSink, &data[..]).unwrap();
		assert_eq!(&*rows[0].province, "Ontario");
		assert_eq!(rows[0].cumulative_testing, Some(120));
	}

	#[test]
	fn file_context_shows_in_message() {
		let err = LoadError::from(io::Error::new(io::ErrorKind::NotFound, "gone")).in_file("cases.csv");
		assert_eq!(err.to_string(), "cases.csv: gone");
	}
}
