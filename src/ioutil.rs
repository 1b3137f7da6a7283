use std::io;
use std::io::Read;
use std::fs;
use std::path::Path;

use flate2;


/// Open a data file, transparently decompressing `.gz` exports.
pub fn magic_open<P: AsRef<Path>>(path: P) -> io::Result<Box<dyn Read>> {
	let path = path.as_ref();
	match path.extension() {
		Some(x) if x == "gz" => {
			Ok(Box::new(flate2::read::GzDecoder::new(fs::File::open(path)?)))
		},
		_ => Ok(Box::new(fs::File::open(path)?)),
	}
}

/// Like [`magic_open`], but a missing file is `Ok(None)`.
pub fn open_optional<P: AsRef<Path>>(path: P) -> io::Result<Option<Box<dyn Read>>> {
	match magic_open(path) {
		Ok(r) => Ok(Some(r)),
		Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
		Err(other) => Err(other),
	}
}
