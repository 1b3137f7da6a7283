use std::io;
use std::io::Write;
use std::time;


/// Receives progress readings from a meter.
pub trait ProgressSink {
	fn update(&mut self, done: usize, total: Option<usize>, rate: f64);
	fn finish(&mut self, done: usize, total: Option<usize>, rate: f64);
}


/// Rewrites a single status line on stdout.
pub struct TerminalSink;

impl ProgressSink for TerminalSink {
	fn update(&mut self, done: usize, total: Option<usize>, rate: f64) {
		match total {
			Some(n) if n > 0 => {
				let frac = (done as f64) / (n as f64);
				print!("{:6.0}% [{:6.2}/s]\r", frac * 100.0, rate);
			},
			_ => {
				print!("{:12} [{:6.2}/s]\r", done, rate);
			},
		}
		let _ = io::stdout().flush();
	}

	fn finish(&mut self, done: usize, total: Option<usize>, rate: f64) {
		match total {
			Some(_) => println!("{:6.0}% [{:6.2}/s]", 100.0, rate),
			None => println!("{:12} [{:6.2}/s]", done, rate),
		}
	}
}


pub struct NullSink;

impl ProgressSink for NullSink {
	fn update(&mut self, _done: usize, _total: Option<usize>, _rate: f64) {}
	fn finish(&mut self, _done: usize, _total: Option<usize>, _rate: f64) {}
}


/// Progress output for the current process: the status line on a terminal,
/// nothing when stdout is redirected.
pub fn default_output() -> Box<dyn ProgressSink> {
	if isatty::stdout_isatty() {
		Box::new(TerminalSink)
	} else {
		Box::new(NullSink)
	}
}


fn rate(n: usize, dt: time::Duration) -> f64 {
	let secs = dt.as_secs_f64();
	if secs > 0.0 {
		n as f64 / secs
	} else {
		0.0
	}
}


/// Counts processed items of unknown total and forwards the throughput to a
/// sink.
pub struct CountMeter<'s, S: ProgressSink + ?Sized> {
	sink: &'s mut S,
	t0: time::Instant,
	tprev: time::Instant,
	iprev: usize,
}

impl<'s, S: ProgressSink + ?Sized> CountMeter<'s, S> {
	pub fn new(sink: &'s mut S) -> Self {
		let now = time::Instant::now();
		sink.update(0, None, 0.0);
		Self{
			sink,
			t0: now,
			tprev: now,
			iprev: 0,
		}
	}

	pub fn update(&mut self, inow: usize) {
		let now = time::Instant::now();
		let r = rate(inow.saturating_sub(self.iprev), now - self.tprev);
		self.sink.update(inow, None, r);
		self.iprev = inow;
		self.tprev = now;
	}

	pub fn finish(self, n: usize) {
		let r = rate(n, self.t0.elapsed());
		self.sink.finish(n, None, r);
	}
}
