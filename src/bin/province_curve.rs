use std::io;

use csv;

use covid_canada::{CalculationType, Dashboard, DashboardConfig, NullSink, Snapshot};


fn main() -> Result<(), Box<dyn std::error::Error>> {
	let argv: Vec<String> = std::env::args().collect();
	let config = DashboardConfig::from_env()?;
	let province = argv.get(1).map(|s| s.as_str()).unwrap_or(&config.default_province);
	let calculation = match argv.get(2) {
		Some(v) => v.parse::<CalculationType>()?,
		None => CalculationType::Cumulative,
	};

	// stdout carries the csv, keep progress output off it
	let snapshot = Snapshot::load(&config, &mut NullSink)?;
	let chart = Dashboard::new(snapshot).province_curve(province, calculation);
	if chart.points.is_empty() {
		eprintln!("no cases reported for {:?}", province);
	}

	let mut w = csv::Writer::from_writer(io::stdout());
	for p in chart.points.iter() {
		w.serialize(p)?;
	}
	w.flush()?;
	Ok(())
}
