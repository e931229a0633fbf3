// Copyright (c) 2025 Felix Kahle.
//
// Permission is hereby granted, free of charge, to any person obtaining
// a copy of this software and associated documentation files (the
// "Software"), to deal in the Software without restriction, including
// without limitation the rights to use, copy, modify, merge, publish,
// distribute, sublicense, and/or sell copies of the Software, and to
// permit persons to whom the Software is furnished to do so, subject to
// the following conditions:
//
// The above copyright notice and this permission notice shall be
// included in all copies or substantial portions of the Software.
//
// THE SOFTWARE IS PROVIDED "AS IS", WITHOUT WARRANTY OF ANY KIND,
// EXPRESS OR IMPLIED, INCLUDING BUT NOT LIMITED TO THE WARRANTIES OF
// MERCHANTABILITY, FITNESS FOR A PARTICULAR PURPOSE AND
// NONINFRINGEMENT. IN NO EVENT SHALL THE AUTHORS OR COPYRIGHT HOLDERS BE
// LIABLE FOR ANY CLAIM, DAMAGES OR OTHER LIABILITY, WHETHER IN AN ACTION
// OF CONTRACT, TORT OR OTHERWISE, ARISING FROM, OUT OF OR IN CONNECTION
// WITH THE SOFTWARE OR THE USE OR OTHER DEALINGS IN THE SOFTWARE.

//! Sources of problem instances for successive episodes.

use crate::random;
use log::debug;
use rand::Rng;
use rudder_bnb::{error::SolverError, model::Model};
use rudder_core::random::{RandomEngine, Seed};
use std::{
    fs, io,
    path::{Path, PathBuf},
};

/// Errors raised by instance sources.
#[derive(Debug, thiserror::Error)]
pub enum InstanceError {
    #[error("cannot list instances in {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("no instances left")]
    Exhausted,
    #[error("cannot load instance {path}: {source}")]
    Load {
        path: PathBuf,
        #[source]
        source: SolverError,
    },
}

/// Yields one model per episode.
pub trait InstanceSource {
    fn next(&mut self) -> Result<Model, InstanceError>;

    fn seed(&mut self, seed: Seed);
}

/// How a [`FileInstanceSource`] picks its next file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SamplingMode {
    /// Uniformly from all files, independently every time.
    Replace,
    /// Uniformly from the files not yet returned; exhausted after one pass.
    Remove,
    /// Like `Remove`, starting a new pass when all files were returned.
    #[default]
    RemoveAndRepeat,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct FileSourceOptions {
    /// Also list files in subdirectories.
    pub recursive: bool,
    pub sampling_mode: SamplingMode,
}

/// Problem files of a directory, sampled at random.
///
/// Files are kept sorted by path after every re-seed, so the sequence
/// returned after `seed(s)` depends only on `s` and the directory contents.
#[derive(Debug)]
pub struct FileInstanceSource {
    files: Vec<PathBuf>,
    /// `files[..remaining]` are not yet returned in the current pass.
    remaining: usize,
    mode: SamplingMode,
    rng: RandomEngine,
}

fn list_files(dir: &Path, recursive: bool, out: &mut Vec<PathBuf>) -> Result<(), InstanceError> {
    let io_err = |source| InstanceError::Io {
        path: dir.to_path_buf(),
        source,
    };
    for entry in fs::read_dir(dir).map_err(io_err)? {
        let path = entry.map_err(io_err)?.path();
        // Follows symlinks; dangling ones are skipped.
        match fs::metadata(&path) {
            Ok(meta) if meta.is_file() => out.push(path),
            Ok(meta) if meta.is_dir() && recursive => list_files(&path, recursive, out)?,
            _ => {}
        }
    }
    Ok(())
}

impl FileInstanceSource {
    /// Lists the files of `dir`, with a generator from the process-wide
    /// random context.
    pub fn new<P: AsRef<Path>>(dir: P, options: FileSourceOptions) -> Result<Self, InstanceError> {
        Self::with_engine(dir, options, random::spawn_engine())
    }

    pub fn with_engine<P: AsRef<Path>>(
        dir: P,
        options: FileSourceOptions,
        rng: RandomEngine,
    ) -> Result<Self, InstanceError> {
        let mut files = Vec::new();
        list_files(dir.as_ref(), options.recursive, &mut files)?;
        debug!(
            target: "rudder_env::instance",
            files = files.len();
            "listed instances in {}", dir.as_ref().display()
        );
        let mut source = Self {
            files,
            remaining: 0,
            mode: options.sampling_mode,
            rng,
        };
        source.reset_file_list();
        Ok(source)
    }

    fn reset_file_list(&mut self) {
        self.files.sort();
        self.remaining = self.files.len();
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.files.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }

    /// Whether `next` would fail with [`InstanceError::Exhausted`].
    pub fn is_done(&self) -> bool {
        self.files.is_empty() || (self.mode == SamplingMode::Remove && self.remaining == 0)
    }

    /// Picks the next file without loading it.
    pub fn next_path(&mut self) -> Result<&Path, InstanceError> {
        if self.is_done() {
            return Err(InstanceError::Exhausted);
        }
        if self.remaining == 0 {
            self.remaining = self.files.len();
        }
        let idx = self.rng.random_range(0..self.remaining);
        if self.mode == SamplingMode::Replace {
            return Ok(&self.files[idx]);
        }
        self.remaining -= 1;
        self.files.swap(idx, self.remaining);
        Ok(&self.files[self.remaining])
    }
}

impl InstanceSource for FileInstanceSource {
    fn next(&mut self) -> Result<Model, InstanceError> {
        let path = self.next_path()?.to_path_buf();
        Model::from_file(&path).map_err(|source| InstanceError::Load { path, source })
    }

    fn seed(&mut self, seed: Seed) {
        self.reset_file_list();
        self.rng = rudder_core::random::engine_from_seed(seed);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rudder_core::random::engine_from_seed;
    use std::collections::HashSet;

    fn dir_with(names: &[&str]) -> tempfile::TempDir {
        let dir = tempfile::tempdir().unwrap();
        for name in names {
            let path = dir.path().join(name);
            if let Some(parent) = path.parent() {
                fs::create_dir_all(parent).unwrap();
            }
            fs::write(path, "").unwrap();
        }
        dir
    }

    fn source(dir: &Path, recursive: bool, mode: SamplingMode) -> FileInstanceSource {
        let options = FileSourceOptions {
            recursive,
            sampling_mode: mode,
        };
        FileInstanceSource::with_engine(dir, options, engine_from_seed(0)).unwrap()
    }

    #[test]
    fn test_recursive_listing() {
        let dir = dir_with(&["a.lp", "sub/b.lp", "sub/deeper/c.lp"]);
        assert_eq!(source(dir.path(), false, SamplingMode::Replace).len(), 1);
        assert_eq!(source(dir.path(), true, SamplingMode::Replace).len(), 3);
    }

    #[test]
    fn test_remove_mode_exhausts_after_one_pass() {
        let dir = dir_with(&["a", "b", "c"]);
        let mut src = source(dir.path(), false, SamplingMode::Remove);
        let seen: HashSet<_> = (0..3)
            .map(|_| src.next_path().unwrap().to_path_buf())
            .collect();
        assert_eq!(seen.len(), 3);
        assert!(src.is_done());
        assert!(matches!(src.next_path(), Err(InstanceError::Exhausted)));
    }

    #[test]
    fn test_remove_and_repeat_starts_new_pass() {
        let dir = dir_with(&["a", "b"]);
        let mut src = source(dir.path(), false, SamplingMode::RemoveAndRepeat);
        for _ in 0..2 {
            let pass: HashSet<_> = (0..2)
                .map(|_| src.next_path().unwrap().to_path_buf())
                .collect();
            assert_eq!(pass.len(), 2);
        }
    }

    #[test]
    fn test_seed_restarts_sequence() {
        let dir = dir_with(&["a", "b", "c", "d"]);
        let mut src = source(dir.path(), false, SamplingMode::RemoveAndRepeat);
        src.seed(9);
        let first: Vec<_> = (0..4)
            .map(|_| src.next_path().unwrap().to_path_buf())
            .collect();
        src.seed(9);
        let second: Vec<_> = (0..4)
            .map(|_| src.next_path().unwrap().to_path_buf())
            .collect();
        assert_eq!(first, second);
    }

    #[test]
    fn test_empty_and_missing_directories() {
        let dir = dir_with(&[]);
        let mut src = source(dir.path(), false, SamplingMode::Replace);
        assert!(src.is_empty());
        assert!(matches!(src.next(), Err(InstanceError::Exhausted)));

        let missing = dir.path().join("missing");
        let err = FileInstanceSource::new(&missing, FileSourceOptions::default()).unwrap_err();
        assert!(matches!(err, InstanceError::Io { .. }));
    }

    #[test]
    fn test_unreadable_instance_is_load_error() {
        let dir = dir_with(&["broken.lp"]);
        fs::write(dir.path().join("broken.lp"), "problem p\nsideways\n").unwrap();
        let mut src = source(dir.path(), false, SamplingMode::Replace);
        assert!(matches!(src.next(), Err(InstanceError::Load { .. })));
    }
}
