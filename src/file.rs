// Copyright (c) 2024-present, fjall-rs
// This source code is licensed under both the Apache 2.0 and MIT License
// (found in the LICENSE-* files in the repository)

use std::{
    fs::File,
    io::{BufWriter, Write},
    path::{Path, PathBuf},
};

/// Extension of enumerated state files
pub const STATES_EXTENSION: &str = "states";

/// Extension of serialized bucket tables
pub const HASH_EXTENSION: &str = "c4hash";

/// Derives the bucket table path that belongs to a state file.
///
/// `positions.states` becomes `positions.c4hash`.
#[must_use]
pub fn hash_file_path<P: AsRef<Path>>(states_path: P) -> PathBuf {
    states_path.as_ref().with_extension(HASH_EXTENSION)
}

/// Atomically writes a file
///
/// The content is streamed into a temporary file next to `path`, which
/// is only moved into place once `write` returned successfully. On error,
/// `path` is left untouched.
pub fn write_atomic<F>(path: &Path, write: F) -> crate::Result<()>
where
    F: FnOnce(&mut BufWriter<&mut File>) -> crate::Result<()>,
{
    let folder = match path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p,
        _ => Path::new("."),
    };

    let mut temp_file = tempfile::NamedTempFile::new_in(folder)?;

    {
        let mut writer = BufWriter::new(temp_file.as_file_mut());
        write(&mut writer)?;
        writer.flush()?;
    }

    temp_file.as_file().sync_all()?;
    temp_file.persist(path)?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Error;
    use std::fs::File;
    use std::io::Write;
    use test_log::test;

    #[test]
    fn atomic_write() -> crate::Result<()> {
        let dir = tempfile::tempdir()?;

        let path = dir.path().join("test.c4hash");
        {
            let mut file = File::create(&path)?;
            write!(file, "asdasdasdasdasd")?;
        }

        write_atomic(&path, |writer| {
            writer.write_all(b"newcontent")?;
            Ok(())
        })?;

        let content = std::fs::read_to_string(&path)?;
        assert_eq!("newcontent", content);

        Ok(())
    }

    #[test]
    fn atomic_write_failure_leaves_nothing() -> crate::Result<()> {
        let dir = tempfile::tempdir()?;
        let path = dir.path().join("test.c4hash");

        let result = write_atomic(&path, |writer| {
            writer.write_all(b"partial")?;
            Err(Error::InvalidConfig("abort"))
        });

        assert!(result.is_err());
        assert!(!path.try_exists()?);
        assert_eq!(0, std::fs::read_dir(dir.path())?.count());

        Ok(())
    }

    #[test]
    fn hash_path_from_states_path() {
        assert_eq!(
            PathBuf::from("data/positions.c4hash"),
            hash_file_path("data/positions.states")
        );
        assert_eq!(PathBuf::from("positions.c4hash"), hash_file_path("positions"));
    }
}
