//! Data core of the Canadian COVID-19 case dashboard.
//!
//! Loads the case sheets into typed records and derives the chart data:
//! daily and cumulative case curves, province and health region tallies and
//! the case origin flow diagram.

mod ioutil;
mod config;
mod records;
mod loader;
mod progress;
mod timeseries;
mod flow;
mod summary;
mod dashboard;

pub use ioutil::{magic_open, open_optional};
pub use config::*;
pub use records::*;
pub use loader::*;
pub use progress::*;
pub use timeseries::*;
pub use flow::*;
pub use summary::*;
pub use dashboard::*;
