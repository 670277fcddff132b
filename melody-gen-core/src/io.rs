use std::fs::File;
use std::io::Read;
use std::path::Path;
use std::{fs, io};

/// Reads a whole text file into a `String`.
pub fn read_file<P: AsRef<Path>>(filename: P) -> io::Result<String> {
	let mut contents = String::new();
	File::open(filename)?.read_to_string(&mut contents)?;
	Ok(contents)
}

/// Lists all files with a given extension in a directory.
///
/// Returns file names only (no paths).
pub fn list_files<P: AsRef<Path>>(dir: P, extension: &str) -> io::Result<Vec<String>> {
	let mut files = Vec::new();

	for entry in fs::read_dir(dir)? {
		let entry = entry?;
		let path = entry.path();

		if path.is_file() {
			if path.extension() == Some(std::ffi::OsStr::new(extension)) {
				if let Some(name) = path.file_name() {
					files.push(name.to_string_lossy().to_string());
				}
			}
		}
	}

	Ok(files)
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn read_file_and_list_files_by_extension() {
		let dir = std::env::temp_dir().join(format!("melody-gen-io-{}", std::process::id()));
		fs::create_dir_all(&dir).unwrap();

		fs::write(dir.join("classical.dat"), b"model").unwrap();
		fs::write(dir.join("folk.dat"), b"model").unwrap();
		fs::write(dir.join("mapping.json"), "{ \"/\": 0 }").unwrap();

		let mut files = list_files(&dir, "dat").unwrap();
		files.sort();
		assert_eq!(files, vec!["classical.dat", "folk.dat"]);

		let contents = read_file(dir.join("mapping.json")).unwrap();
		assert_eq!(contents, "{ \"/\": 0 }");

		fs::remove_dir_all(&dir).unwrap();
	}

	#[test]
	fn missing_file_is_an_error() {
		assert!(read_file("./does-not-exist/mapping.json").is_err());
		assert!(list_files("./does-not-exist", "dat").is_err());
	}
}
