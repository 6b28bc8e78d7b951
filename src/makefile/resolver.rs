use std::{
    fs::File,
    io::{self, BufRead, BufReader},
    path::{Component, Path, PathBuf},
};

use log::{debug, trace};

use crate::makefile::{
    line::{classify, is_special_target, Line},
    TargetList,
};

/// Knobs of the [`Resolver`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ResolveOptions {
    /// Follow `include` directives into other files.
    pub follow_includes: bool,
    /// Keep special targets such as `.PHONY` in the results.
    pub keep_special: bool,
}

impl Default for ResolveOptions {
    fn default() -> Self {
        Self {
            follow_includes: true,
            keep_special: false,
        }
    }
}

/// Collects the targets declared by a makefile and by everything it includes.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct Resolver {
    options: ResolveOptions,
}

impl Resolver {
    pub fn new(options: ResolveOptions) -> Self {
        Self { options }
    }

    pub fn options(&self) -> ResolveOptions {
        self.options
    }

    /// Returns the sorted, deduplicated targets of `path` and of all the
    /// files it includes, directly or transitively.
    ///
    /// Any failure, in the file itself or in one of its includes, aborts the
    /// whole resolution.
    pub fn resolve(&self, path: impl AsRef<Path>) -> Result<Vec<String>, ResolveError> {
        let mut stack = Vec::new();
        let targets = self.resolve_file(path.as_ref(), &mut stack)?;
        debug_assert!(stack.is_empty());
        Ok(targets.into_vec())
    }

    /// `stack` holds the canonical paths of the files being scanned, from the
    /// root down to the includer of `path`.
    fn resolve_file(&self, path: &Path, stack: &mut Vec<PathBuf>) -> Result<TargetList, ResolveError> {
        let file = open_makefile(path)?;

        let canonical = path.canonicalize().unwrap_or_else(|_| path.to_path_buf());
        if stack.contains(&canonical) {
            let mut chain = stack.clone();
            chain.push(canonical);
            return Err(ResolveError::CircularInclude {
                path: path.to_path_buf(),
                chain,
            });
        }

        debug!("scanning {}", path.display());
        stack.push(canonical);
        let result = self.scan(path, BufReader::new(file), stack);
        stack.pop();
        result
    }

    fn scan(
        &self,
        path: &Path,
        mut reader: impl BufRead,
        stack: &mut Vec<PathBuf>,
    ) -> Result<TargetList, ResolveError> {
        let mut targets = TargetList::new();
        let mut buf = Vec::new();

        for index in 0.. {
            buf.clear();
            let read = reader
                .read_until(b'\n', &mut buf)
                .map_err(|source| ResolveError::Read {
                    path: path.to_path_buf(),
                    line: index + 1,
                    source,
                })?;
            if read == 0 {
                break;
            }

            // makefiles are not required to be UTF-8, comments in particular
            let line = String::from_utf8_lossy(trim_line_ending(&buf));

            match classify(&line) {
                Line::Target(name) => {
                    if self.options.keep_special || !is_special_target(name) {
                        targets.insert(name);
                    } else {
                        trace!("{}:{}: skipping special target {name}", path.display(), index + 1);
                    }
                }
                Line::Include(reference) if self.options.follow_includes => {
                    let included = resolve_include_path(path, reference);
                    trace!("{}:{}: including {}", path.display(), index + 1, included.display());

                    let included_targets = self
                        .resolve_file(&included, stack)
                        .map_err(|e| ResolveError::Include {
                            path: included.clone(),
                            source: Box::new(e),
                        })?;
                    targets.merge(included_targets);
                }
                Line::Include(_) | Line::Other => {}
            }
        }

        Ok(targets.sorted())
    }
}

fn trim_line_ending(line: &[u8]) -> &[u8] {
    let line = line.strip_suffix(b"\n").unwrap_or(line);
    line.strip_suffix(b"\r").unwrap_or(line)
}

/// Shorthand for [`Resolver::resolve`] with the default options.
pub fn resolve(path: impl AsRef<Path>) -> Result<Vec<String>, ResolveError> {
    Resolver::default().resolve(path)
}

/// Resolves an include reference against the directory of the including
/// file, not against the working directory.
///
/// The result is absolute and lexically clean: `.` components are dropped
/// and `..` removes the preceding component whether or not it exists on disk.
/// An absolute reference is taken as is.
pub fn resolve_include_path(including: &Path, reference: &str) -> PathBuf {
    let joined = including
        .parent()
        .unwrap_or_else(|| Path::new(""))
        .join(reference);
    let absolute = std::path::absolute(&joined).unwrap_or(joined);
    clean_path(&absolute)
}

fn clean_path(path: &Path) -> PathBuf {
    let mut clean = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                // `..` at the root stays at the root
                if matches!(clean.components().next_back(), Some(Component::Normal(_))) {
                    clean.pop();
                } else if !clean.has_root() {
                    clean.push(component);
                }
            }
            Component::Prefix(_) | Component::RootDir | Component::Normal(_) => clean.push(component),
        }
    }
    clean
}

fn open_makefile(path: &Path) -> Result<File, ResolveError> {
    let access_error = |source| ResolveError::Access {
        path: path.to_path_buf(),
        source,
    };

    let file = File::open(path).map_err(access_error)?;
    let metadata = file.metadata().map_err(access_error)?;
    if metadata.is_dir() {
        return Err(access_error(io::Error::new(
            io::ErrorKind::InvalidInput,
            "is a directory",
        )));
    }
    Ok(file)
}

#[derive(Debug, thiserror::Error)]
pub enum ResolveError {
    #[error("failed to open makefile {}: {source}", path.display())]
    Access {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("failed to read makefile {} at line {line}: {source}", path.display())]
    Read {
        path: PathBuf,
        line: usize,
        #[source]
        source: io::Error,
    },
    #[error("error processing included file {}: {source}", path.display())]
    Include {
        path: PathBuf,
        #[source]
        source: Box<ResolveError>,
    },
    #[error("circular include of {}", path.display())]
    CircularInclude {
        path: PathBuf,
        /// Canonical paths from the root to the file included twice.
        chain: Vec<PathBuf>,
    },
}

impl ResolveError {
    /// The file this error is about.
    pub fn path(&self) -> &Path {
        match self {
            ResolveError::Access { path, .. }
            | ResolveError::Read { path, .. }
            | ResolveError::Include { path, .. }
            | ResolveError::CircularInclude { path, .. } => path,
        }
    }

    /// Follows the include chain down to the error that started it.
    pub fn root_cause(&self) -> &ResolveError {
        match self {
            ResolveError::Include { source, .. } => source.root_cause(),
            other => other,
        }
    }
}
