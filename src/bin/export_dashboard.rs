use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use serde::Serialize;

use smartstring::alias::{String as SmartString};

use chrono::NaiveDate;

use csv;

use covid_canada::{Dashboard, DashboardConfig, DailyPoint, RegionCount, Snapshot, StatsTab};


#[derive(Debug, Clone, Serialize)]
struct ProvinceCurveRow<'x> {
	province: &'x str,
	date: NaiveDate,
	new_count: u64,
	cumulative_count: u64,
}

#[derive(Debug, Clone, Serialize)]
struct FlowNodeRow<'x> {
	index: usize,
	label: &'x str,
}

#[derive(Debug, Clone, Serialize)]
struct FlowEdgeRow<'x> {
	source: &'x str,
	target: &'x str,
	source_index: usize,
	target_index: usize,
	total_weight: f64,
}


fn write_rows<W: io::Write, T: Serialize, I: IntoIterator<Item = T>>(w: W, rows: I) -> Result<(), csv::Error> {
	let mut w = csv::Writer::from_writer(w);
	for row in rows {
		w.serialize(row)?;
	}
	w.flush()?;
	Ok(())
}

fn write_file<T: Serialize, I: IntoIterator<Item = T>>(outdir: &Path, name: &str, rows: I) -> Result<(), Box<dyn std::error::Error>> {
	println!("writing {} ...", name);
	let f = fs::File::create(outdir.join(name))?;
	write_rows(io::BufWriter::new(f), rows)?;
	Ok(())
}

fn write_region_table(outdir: &Path, province: &str, rows: &[RegionCount]) -> Result<(), Box<dyn std::error::Error>> {
	let slug: String = province.chars().map(|c| if c.is_alphanumeric() { c } else { '_' }).collect();
	let name = format!("regions_{}.csv", slug);
	println!("writing {} ...", name);
	let mut w = csv::Writer::from_path(outdir.join(name))?;
	w.write_record(&["REGION", "CONFIRMED CASES"])?;
	for row in rows {
		w.write_record(&[&*row.region, row.count.to_string().as_str()])?;
	}
	w.flush()?;
	Ok(())
}

fn province_curves(dashboard: &Dashboard, provinces: &[SmartString]) -> Vec<(SmartString, Vec<DailyPoint>)> {
	provinces.iter().map(|p| (p.clone(), dashboard.province_series(p))).collect()
}


fn main() -> Result<(), Box<dyn std::error::Error>> {
	let argv: Vec<String> = std::env::args().collect();
	let outdir = argv.get(1).map(PathBuf::from).unwrap_or_else(|| PathBuf::from("out"));
	let config = DashboardConfig::from_env()?;

	println!("loading sheets from {} ...", config.data_dir.display());
	let snapshot = Snapshot::load(&config, &mut *covid_canada::default_output())?;
	let dashboard = Dashboard::new(snapshot);
	if let Some(note) = dashboard.note() {
		println!("data note: {}", note);
	}

	fs::create_dir_all(&outdir)?;

	write_file(&outdir, "canada_curve.csv", dashboard.canada_curve())?;

	let provinces = dashboard.province_options();
	let curves = province_curves(&dashboard, &provinces);
	write_file(&outdir, "province_curves.csv", curves.iter().flat_map(|(province, points)| {
		points.iter().map(move |p| ProvinceCurveRow{
			province: &**province,
			date: p.date,
			new_count: p.new_count,
			cumulative_count: p.cumulative_count,
		})
	}))?;

	write_file(&outdir, "map.csv", dashboard.map())?;
	write_region_table(&outdir, &config.default_province, &dashboard.region_table(&config.default_province))?;

	write_file(&outdir, "mortality.csv", dashboard.other_stats(StatsTab::Mortality))?;
	write_file(&outdir, "recovered.csv", dashboard.other_stats(StatsTab::Recovered))?;
	write_file(&outdir, "testing.csv", dashboard.other_stats(StatsTab::Testing))?;

	let flow = dashboard.flow();
	if !flow.rejected.is_empty() {
		println!("skipped {} flow rows with invalid weights", flow.rejected.len());
	}
	write_file(&outdir, "flow_nodes.csv", flow.nodes.iter().enumerate().map(|(index, label)| FlowNodeRow{
		index,
		label: &**label,
	}))?;
	write_file(&outdir, "flow_edges.csv", flow.edges.iter().map(|e| FlowEdgeRow{
		source: &*flow.nodes[e.source_index],
		target: &*flow.nodes[e.target_index],
		source_index: e.source_index,
		target_index: e.target_index,
		total_weight: e.total_weight,
	}))?;

	Ok(())
}
