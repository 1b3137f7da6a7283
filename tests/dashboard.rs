use std::fs;
use std::path::PathBuf;

use chrono::NaiveDate;

use covid_canada::{
	load_cases, load_flow_rows, load_mortality, load_recovered, load_testing, CalculationType, Dashboard,
	DashboardConfig, DailyPoint, LoadError, NullSink, Snapshot, StatsTab,
};


static CASES: &[u8] = b"Data current to 2020-03-05. Please see the repository for details,report_date,province,health_region,provincial_case_id,travel_yn
1,01-03-2020,Ontario,Toronto,1,1
2,01-03-2020,Ontario,Toronto,2,0
3,03-03-2020,Ontario,Ottawa,3,0
4,02-03-2020,BC,Fraser,1,1
5,05-03-2020,Quebec,Montreal,1,
";

static MORTALITY: &[u8] = b"death_id,province_death_id,date,province
1,1,2020-03-08,BC
2,2,2020-03-10,BC
3,1,2020-03-11,Ontario
";

static RECOVERED: &[u8] = b"\"\",date_recovered,province,cumulative_recovered
1,01-03-2020,Ontario,4
2,02-03-2020,Ontario,5
3,02-03-2020,BC,7
4,03-03-2020,Quebec,
";

static TESTING: &[u8] = b"\"\",date_testing,province,cumulative_testing
1,01-03-2020,Ontario,100
2,02-03-2020,Ontario,250.0
3,01-03-2020,Quebec,300
";

static FLOW: &[u8] = b"from,to,count
travel,ON,5
travel,ON,3
community,ON,2
unknown,ON,n/a
";


fn ymd(y: i32, m: u32, d: u32) -> NaiveDate {
	NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

fn snapshot() -> Snapshot {
	let cases = load_cases(&mut NullSink, CASES).unwrap();
	Snapshot{
		note: cases.note,
		events: cases.records,
		mortality: load_mortality(&mut NullSink, MORTALITY).unwrap(),
		recovered: load_recovered(&mut NullSink, RECOVERED).unwrap(),
		testing: load_testing(&mut NullSink, TESTING).unwrap(),
		flow: load_flow_rows(&mut NullSink, FLOW).unwrap(),
	}
}


#[test]
fn ontario_curve_from_csv() {
	let db = Dashboard::new(snapshot());
	assert_eq!(db.province_series("Ontario"), vec![
		DailyPoint{date: ymd(2020, 3, 1), new_count: 2, cumulative_count: 2},
		DailyPoint{date: ymd(2020, 3, 2), new_count: 0, cumulative_count: 2},
		DailyPoint{date: ymd(2020, 3, 3), new_count: 1, cumulative_count: 3},
	]);
	let chart = db.province_curve("Ontario", "New Cases".parse().unwrap());
	assert_eq!(chart.calculation, CalculationType::New);
	assert_eq!(chart.points.iter().map(|p| p.value).collect::<Vec<_>>(), vec![2, 0, 1]);
}

#[test]
fn canada_curve_spans_all_reports() {
	let db = Dashboard::new(snapshot());
	let curve = db.canada_curve();
	assert_eq!(curve.len(), 5);
	assert_eq!(curve.first().unwrap().date, ymd(2020, 3, 1));
	assert_eq!(curve.last().unwrap().date, ymd(2020, 3, 5));
	assert_eq!(curve.iter().map(|p| p.new_count).collect::<Vec<_>>(), vec![2, 1, 1, 0, 1]);
	assert_eq!(curve.last().unwrap().cumulative_count, 5);
}

#[test]
fn unknown_province_gives_empty_views() {
	let db = Dashboard::new(snapshot());
	assert!(db.province_series("Nunavut").is_empty());
	assert!(db.region_table("Nunavut").is_empty());
}

#[test]
fn data_note_is_kept() {
	let db = Dashboard::new(snapshot());
	assert_eq!(db.note(), Some("Data current to 2020-03-05."));
}

#[test]
fn stats_tabs() {
	let db = Dashboard::new(snapshot());
	let tab = |name: &str| -> Vec<(String, u64)> {
		db.other_stats(name.parse::<StatsTab>().unwrap()).iter().map(|rc| (rc.region.to_string(), rc.count)).collect()
	};
	assert_eq!(tab("mortality-tab"), vec![("BC".to_string(), 2), ("Ontario".to_string(), 1)]);
	assert_eq!(tab("recover-tab"), vec![("BC".to_string(), 7), ("Ontario".to_string(), 5)]);
	assert_eq!(tab("testing-tab"), vec![("Quebec".to_string(), 300), ("Ontario".to_string(), 250)]);
}

#[test]
fn map_and_table() {
	let db = Dashboard::new(snapshot());
	let map = db.map();
	assert_eq!(map.len(), 3);
	assert_eq!(&*map[0].province, "Ontario");
	assert_eq!(map[0].cases, 3);

	let table = db.region_table("Ontario");
	assert_eq!(&*table[0].region, "Toronto");
	assert_eq!(table[0].count, 2);
	assert_eq!(&*table[1].region, "Ottawa");
}

#[test]
fn flow_from_csv() {
	let db = Dashboard::new(snapshot());
	let flow = db.flow();
	let nodes: Vec<&str> = flow.nodes.iter().map(|s| &**s).collect();
	assert_eq!(nodes, vec!["travel", "community", "ON"]);
	let edges: Vec<(&str, &str, f64)> = flow.labelled_edges().collect();
	assert_eq!(edges, vec![("travel", "ON", 8.0), ("community", "ON", 2.0)]);
	assert_eq!(flow.rejected.len(), 1);
	assert_eq!(flow.rejected[0].row_index, 3);
	assert!(flow.validate().is_err());
}

#[test]
fn load_from_directory() {
	let dir = std::env::temp_dir().join(format!("covid-canada-snapshot-{}", std::process::id()));
	fs::create_dir_all(&dir).unwrap();
	fs::write(dir.join("cases.csv"), CASES).unwrap();
	fs::write(dir.join("mortality.csv"), MORTALITY).unwrap();
	fs::write(dir.join("recovered.csv"), RECOVERED).unwrap();
	fs::write(dir.join("testing.csv"), TESTING).unwrap();

	let config = DashboardConfig{
		data_dir: dir.clone(),
		..DashboardConfig::default()
	};
	// no flow.csv: the diagram is empty
	let snapshot = Snapshot::load(&config, &mut NullSink).unwrap();
	assert_eq!(snapshot.events.len(), 5);
	assert!(snapshot.flow.is_empty());

	let config = DashboardConfig{
		data_dir: dir.clone(),
		testing: PathBuf::from("missing.csv"),
		..DashboardConfig::default()
	};
	match Snapshot::load(&config, &mut NullSink) {
		Err(e @ LoadError::InFile{..}) => assert!(e.to_string().contains("missing.csv")),
		other => panic!("unexpected {:?}", other.map(|s| s.events.len())),
	}

	fs::remove_dir_all(&dir).unwrap();
}
