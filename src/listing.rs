use std::path::{Path, PathBuf};

use linked_hash_map::LinkedHashMap;
use linked_hash_set::LinkedHashSet;
use log::{debug, warn};
use tokio::task::JoinSet;

use crate::makefile::{ResolveError, Resolver};

/// Targets of a set of root makefiles.
#[derive(Debug, Default)]
pub struct Listing {
    /// Targets of every root that was resolved successfully, in the order the
    /// roots were given.
    pub targets: LinkedHashMap<PathBuf, Vec<String>>,

    /// Roots that could not be resolved, in the order the roots were given.
    pub failures: Vec<ListError>,
}

impl Listing {
    pub fn is_success(&self) -> bool {
        self.failures.is_empty()
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ListError {
    #[error("Makefile {} does not exist", .0.display())]
    NotFound(PathBuf),
    #[error("error reading Makefile {}: {source}", path.display())]
    Resolve {
        path: PathBuf,
        #[source]
        source: ResolveError,
    },
    #[error("resolution of {} was aborted", .0.display())]
    Aborted(PathBuf),
}

impl ListError {
    pub fn path(&self) -> &Path {
        match self {
            ListError::NotFound(path) | ListError::Aborted(path) => path,
            ListError::Resolve { path, .. } => path,
        }
    }
}

/// Resolves every root independently, at most `max_concurrency` at a time.
///
/// A failing root does not prevent the others from being listed. Duplicate
/// roots are resolved once.
pub async fn list_targets(
    roots: impl IntoIterator<Item = PathBuf>,
    resolver: Resolver,
    max_concurrency: usize,
) -> Listing {
    let roots: Vec<PathBuf> = roots
        .into_iter()
        .collect::<LinkedHashSet<_>>()
        .into_iter()
        .collect();
    let max_concurrency = max_concurrency.max(1);

    let mut outcomes: Vec<Option<Result<Vec<String>, ListError>>> =
        std::iter::repeat_with(|| None).take(roots.len()).collect();
    let mut pending = roots.iter().cloned().enumerate();
    let mut running = JoinSet::new();

    loop {
        // feed the pool
        while running.len() < max_concurrency {
            let Some((index, path)) = pending.next() else {
                break;
            };
            running.spawn_blocking(move || (index, list_root(&resolver, path)));
        }

        let Some(joined) = running.join_next().await else {
            break;
        };

        match joined {
            Ok((index, outcome)) => outcomes[index] = Some(outcome),
            Err(e) => warn!("makefile resolution task failed: {e}"),
        }
    }

    let mut listing = Listing::default();
    for (path, outcome) in roots.into_iter().zip(outcomes) {
        match outcome {
            Some(Ok(targets)) => {
                listing.targets.insert(path, targets);
            }
            Some(Err(e)) => listing.failures.push(e),
            None => listing.failures.push(ListError::Aborted(path)),
        }
    }
    listing
}

fn list_root(resolver: &Resolver, path: PathBuf) -> Result<Vec<String>, ListError> {
    if !path.exists() {
        return Err(ListError::NotFound(path));
    }

    match resolver.resolve(&path) {
        Ok(targets) => {
            debug!("{}: {} targets", path.display(), targets.len());
            Ok(targets)
        }
        Err(source) => Err(ListError::Resolve { path, source }),
    }
}

#[cfg(test)]
mod tests {
    use std::fs;

    use super::*;

    #[tokio::test]
    async fn empty() {
        let listing = list_targets(Vec::new(), Resolver::default(), 1).await;
        assert!(listing.targets.is_empty());
        assert!(listing.is_success());
    }

    #[tokio::test]
    async fn roots_keep_their_order() {
        let dir = tempfile::tempdir().unwrap();
        let names = ["z.mk", "a.mk", "m.mk", "b.mk", "y.mk"];
        for name in names {
            fs::write(dir.path().join(name), format!("{name}-target:\n")).unwrap();
        }
        let roots = names.iter().map(|name| dir.path().join(name)).collect::<Vec<_>>();

        let listing = list_targets(roots.clone(), Resolver::default(), 3).await;

        assert!(listing.is_success());
        assert_eq!(listing.targets.keys().cloned().collect::<Vec<_>>(), roots);
        assert_eq!(listing.targets[&roots[0]], ["z.mk-target"]);
    }

    #[tokio::test]
    async fn failures_do_not_stop_other_roots() {
        let dir = tempfile::tempdir().unwrap();
        let good = dir.path().join("Makefile");
        let missing = dir.path().join("Missing.mk");
        let broken = dir.path().join("broken.mk");
        fs::write(&good, "all:\n").unwrap();
        fs::write(&broken, "include nowhere.mk\n").unwrap();

        let listing = list_targets(
            [missing.clone(), good.clone(), broken.clone()],
            Resolver::default(),
            2,
        )
        .await;

        assert_eq!(listing.targets.len(), 1);
        assert_eq!(listing.targets[&good], ["all"]);

        assert_eq!(listing.failures.len(), 2);
        assert!(matches!(&listing.failures[0], ListError::NotFound(path) if *path == missing));
        assert!(matches!(&listing.failures[1], ListError::Resolve { path, .. } if *path == broken));
        assert!(listing.failures[1].to_string().contains("nowhere.mk"));
    }

    #[tokio::test]
    async fn duplicate_roots_are_listed_once() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("Makefile");
        fs::write(&path, "all:\n").unwrap();

        let listing = list_targets([path.clone(), path.clone()], Resolver::default(), 4).await;
        assert_eq!(listing.targets.len(), 1);
    }
}
