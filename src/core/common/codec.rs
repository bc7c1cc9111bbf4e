//! Binary encoding shared by every on-disk artifact.

use crate::core::common::WordVecError;
use bincode::Options;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::fs::File;
use std::io::{BufReader, BufWriter, Write};
use std::path::Path;

/// Bincode with fixed-width little-endian integers.
pub fn options() -> impl Options {
    bincode::DefaultOptions::new().with_fixint_encoding()
}

/// Encodes `value` into a fresh file at `path`.
pub fn save_to_file<T: Serialize + ?Sized>(path: &Path, value: &T) -> Result<(), WordVecError> {
    let mut writer = BufWriter::new(File::create(path)?);
    options().serialize_into(&mut writer, value)?;
    writer.flush()?;
    Ok(())
}

/// Decodes one value from `path`. Length prefixes larger than the file are
/// rejected before anything is allocated.
pub fn load_from_file<T: DeserializeOwned>(path: &Path) -> Result<T, WordVecError> {
    let file = File::open(path)?;
    let limit = file.metadata()?.len();
    Ok(options().with_limit(limit).deserialize_from(BufReader::new(file))?)
}
