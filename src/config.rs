use std::env;
use std::ffi::OsString;
use std::fmt;
use std::path::PathBuf;

use smartstring::alias::{String as SmartString};


#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
	NotUnicode{key: &'static str},
	Empty{key: &'static str},
}

impl fmt::Display for ConfigError {
	fn fmt<'f>(&self, f: &'f mut fmt::Formatter) -> fmt::Result {
		match self {
			Self::NotUnicode{key} => write!(f, "{} is not valid unicode", key),
			Self::Empty{key} => write!(f, "{} must not be empty", key),
		}
	}
}

impl std::error::Error for ConfigError {}


/// Where the sheets live and what the dashboard shows first.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DashboardConfig {
	pub data_dir: PathBuf,
	pub cases: PathBuf,
	pub mortality: PathBuf,
	pub recovered: PathBuf,
	pub testing: PathBuf,
	/// Optional; a missing file yields an empty flow diagram.
	pub flow: PathBuf,
	pub default_province: SmartString,
}

impl Default for DashboardConfig {
	fn default() -> Self {
		Self{
			data_dir: ".".into(),
			cases: "cases.csv".into(),
			mortality: "mortality.csv".into(),
			recovered: "recovered.csv".into(),
			testing: "testing.csv".into(),
			flow: "flow.csv".into(),
			default_province: "Ontario".into(),
		}
	}
}

fn path_var<F: Fn(&str) -> Option<OsString>>(lookup: &F, key: &'static str, slot: &mut PathBuf) -> Result<(), ConfigError> {
	if let Some(v) = lookup(key) {
		if v.is_empty() {
			return Err(ConfigError::Empty{key})
		}
		*slot = v.into();
	}
	Ok(())
}

impl DashboardConfig {
	pub fn from_env() -> Result<Self, ConfigError> {
		Self::from_lookup(|key| env::var_os(key))
	}

	/// Build the configuration from `COVID_CA_*` variables supplied by
	/// `lookup`; unset variables keep their defaults.
	pub fn from_lookup<F: Fn(&str) -> Option<OsString>>(lookup: F) -> Result<Self, ConfigError> {
		let mut config = Self::default();
		path_var(&lookup, "COVID_CA_DATA_DIR", &mut config.data_dir)?;
		path_var(&lookup, "COVID_CA_CASES", &mut config.cases)?;
		path_var(&lookup, "COVID_CA_MORTALITY", &mut config.mortality)?;
		path_var(&lookup, "COVID_CA_RECOVERED", &mut config.recovered)?;
		path_var(&lookup, "COVID_CA_TESTING", &mut config.testing)?;
		path_var(&lookup, "COVID_CA_FLOW", &mut config.flow)?;
		if let Some(v) = lookup("COVID_CA_PROVINCE") {
			let key = "COVID_CA_PROVINCE";
			let v = v.into_string().map_err(|_| ConfigError::NotUnicode{key})?;
			let v = v.trim();
			if v.is_empty() {
				return Err(ConfigError::Empty{key})
			}
			config.default_province = v.into();
		}
		Ok(config)
	}

	pub fn cases_path(&self) -> PathBuf {
		self.data_dir.join(&self.cases)
	}

	pub fn mortality_path(&self) -> PathBuf {
		self.data_dir.join(&self.mortality)
	}

	pub fn recovered_path(&self) -> PathBuf {
		self.data_dir.join(&self.recovered)
	}

	pub fn testing_path(&self) -> PathBuf {
		self.data_dir.join(&self.testing)
	}

	pub fn flow_path(&self) -> PathBuf {
		self.data_dir.join(&self.flow)
	}
}


#[cfg(test)]
mod tests {
	use super::*;

	use std::collections::HashMap;

	fn lookup_in(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<OsString> {
		let vars: HashMap<String, OsString> = vars.iter().map(|(k, v)| (k.to_string(), OsString::from(v))).collect();
		move |key| vars.get(key).cloned()
	}

	#[test]
	fn defaults_without_environment() {
		let config = DashboardConfig::from_lookup(lookup_in(&[])).unwrap();
		assert_eq!(config, DashboardConfig::default());
		assert_eq!(config.cases_path(), PathBuf::from("./cases.csv"));
		assert_eq!(&*config.default_province, "Ontario");
	}

	#[test]
	fn variables_override_defaults() {
		let config = DashboardConfig::from_lookup(lookup_in(&[
			("COVID_CA_DATA_DIR", "/srv/covid"),
			("COVID_CA_CASES", "cases.csv.gz"),
			("COVID_CA_FLOW", "/elsewhere/origin.csv"),
			("COVID_CA_PROVINCE", " Quebec "),
		])).unwrap();
		assert_eq!(config.cases_path(), PathBuf::from("/srv/covid/cases.csv.gz"));
		assert_eq!(config.testing_path(), PathBuf::from("/srv/covid/testing.csv"));
		// absolute paths are not joined onto the data dir
		assert_eq!(config.flow_path(), PathBuf::from("/elsewhere/origin.csv"));
		assert_eq!(&*config.default_province, "Quebec");
	}

	#[test]
	fn empty_values_are_errors() {
		assert_eq!(
			DashboardConfig::from_lookup(lookup_in(&[("COVID_CA_TESTING", "")])),
			Err(ConfigError::Empty{key: "COVID_CA_TESTING"}),
		);
		assert_eq!(
			DashboardConfig::from_lookup(lookup_in(&[("COVID_CA_PROVINCE", "  ")])),
			Err(ConfigError::Empty{key: "COVID_CA_PROVINCE"}),
		);
	}
}
