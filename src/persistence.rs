//! MessagePack persistence for value tables.
//!
//! Only the state → row map is written. Action order, hyperparameters and the
//! exploration counter are not part of the blob, so a table must be loaded
//! into an agent built with the same action sequence it was trained with.

use std::collections::HashMap;
use std::fs::File;
use std::hash::Hash;
use std::io::{BufReader, BufWriter, Read, Write};
use std::path::Path;

use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::{debug, warn};

use crate::error::{Error, LoadFailure, Result};
use crate::table::ValueTable;

pub fn write_table<S, W>(table: &ValueTable<S>, writer: &mut W) -> Result<()>
where
    S: Eq + Hash + Clone + Serialize,
    W: Write + ?Sized,
{
    table.check_rows()?;
    rmp_serde::encode::write(writer, table.rows()).map_err(|e| Error::Serialization {
        message: e.to_string(),
    })
}

pub fn read_table<S, R>(reader: R, row_len: usize) -> std::result::Result<ValueTable<S>, LoadFailure>
where
    S: Eq + Hash + Clone + DeserializeOwned,
    R: Read,
{
    let rows: HashMap<S, Vec<f32>> = rmp_serde::decode::from_read(reader)?;
    ValueTable::from_rows(rows, row_len)
}

pub fn save_table<S>(table: &ValueTable<S>, path: &Path) -> Result<()>
where
    S: Eq + Hash + Clone + Serialize,
{
    // Check before touching the file so a corrupt table never truncates it.
    table.check_rows()?;

    let file = File::create(path).map_err(|source| Error::Io {
        operation: format!("create file {path:?}"),
        source,
    })?;
    let mut writer = BufWriter::new(file);
    write_table(table, &mut writer)?;
    writer.flush().map_err(|source| Error::Io {
        operation: format!("write file {path:?}"),
        source,
    })?;

    debug!(entries = table.len(), ?path, "saved value table");
    Ok(())
}

pub fn load_table<S>(path: &Path, row_len: usize) -> Result<ValueTable<S>>
where
    S: Eq + Hash + Clone + DeserializeOwned,
{
    let loaded = File::open(path)
        .map_err(|e| load_error(format!("open file {path:?}"), e.into()))
        .and_then(|file| {
            read_table(BufReader::new(file), row_len)
                .map_err(|e| load_error(format!("load value table from {path:?}"), e))
        })?;

    debug!(entries = loaded.len(), ?path, "loaded value table");
    Ok(loaded)
}

pub(crate) fn load_error(operation: String, source: LoadFailure) -> Error {
    warn!(%operation, error = %source, "value table load failed");
    Error::Load { operation, source }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_xoshiro::Xoshiro256PlusPlus;
    use tempfile::TempDir;

    fn sample_table() -> ValueTable<(i32, i32)> {
        let mut rng = Xoshiro256PlusPlus::seed_from_u64(5);
        let mut table = ValueTable::new(3);
        for x in -2..3 {
            for y in 0..4 {
                table.row_mut(&(x, y), &mut rng)[1] = (x * y) as f32 / 7.0;
            }
        }
        table
    }

    #[test]
    fn test_file_round_trip_is_exact() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("table.msgpack");
        let table = sample_table();

        save_table(&table, &path).unwrap();
        let loaded: ValueTable<(i32, i32)> = load_table(&path, 3).unwrap();

        assert_eq!(loaded.len(), table.len());
        for (state, row) in table.rows() {
            let other = loaded.get(state).unwrap();
            let bits: Vec<u32> = row.iter().map(|v| v.to_bits()).collect();
            let other_bits: Vec<u32> = other.iter().map(|v| v.to_bits()).collect();
            assert_eq!(bits, other_bits, "row {:?} changed", state);
        }
    }

    #[test]
    fn test_writer_round_trip_with_string_keys() {
        let mut rng = Xoshiro256PlusPlus::seed_from_u64(1);
        let mut table: ValueTable<String> = ValueTable::new(2);
        table.row_mut(&"left-wall".to_string(), &mut rng);
        table.row_mut(&"open".to_string(), &mut rng);

        let mut blob = Vec::new();
        write_table(&table, &mut blob).unwrap();
        let loaded: ValueTable<String> = read_table(blob.as_slice(), 2).unwrap();
        assert_eq!(
            loaded.get(&"open".to_string()),
            table.get(&"open".to_string())
        );
    }

    #[test]
    fn test_missing_file_is_load_error() {
        let dir = TempDir::new().unwrap();
        let result = load_table::<u32>(&dir.path().join("nope.msgpack"), 2);
        assert!(matches!(
            result,
            Err(Error::Load {
                source: LoadFailure::Io(_),
                ..
            })
        ));
    }

    #[test]
    fn test_garbage_is_load_error() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("garbage.msgpack");
        std::fs::write(&path, b"\xc1 definitely not msgpack").unwrap();
        let result = load_table::<u32>(&path, 2);
        assert!(matches!(
            result,
            Err(Error::Load {
                source: LoadFailure::Decode(_),
                ..
            })
        ));
    }

    #[test]
    fn test_row_length_mismatch_is_load_error() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("three.msgpack");
        save_table(&sample_table(), &path).unwrap();

        let result = load_table::<(i32, i32)>(&path, 2);
        assert!(matches!(
            result,
            Err(Error::Load {
                source: LoadFailure::RowLength {
                    expected: 2,
                    got: 3
                },
                ..
            })
        ));
    }

    #[test]
    fn test_save_into_missing_directory_is_io_error() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("missing").join("table.msgpack");
        let result = save_table(&sample_table(), &path);
        assert!(matches!(result, Err(Error::Io { .. })));
    }
}
