use std::{
    path::{Path, PathBuf},
    sync::{Arc, OnceLock},
    thread::{self, JoinHandle},
};

use log::{info, warn};

use crate::{cache, move_tables::MoveTables, pruning::PruningTables, start, success};

/// Everything a search reads: move transition tables and pruning tables.
/// Immutable once built and shared by reference between solvers.
pub struct Tables {
    moves: MoveTables,
    pruning: PruningTables,
}

impl Tables {
    /// Builds every table in memory on the calling thread.
    #[must_use]
    pub fn build() -> Self {
        let moves = MoveTables::build();
        let pruning = PruningTables::new_unbuilt();
        pruning.build_all(&moves);
        Tables { moves, pruning }
    }

    /// Loads the pruning tables from `path`, or builds them and writes the
    /// cache if it is missing or does not match. Cache failures are logged
    /// and never fatal.
    #[must_use]
    pub fn load_or_build(path: &Path) -> Self {
        let moves = MoveTables::build();
        let pruning = PruningTables::new_unbuilt();
        if let Err(e) = cache::load(path, &pruning) {
            warn!("Rebuilding pruning tables: {e}");
            pruning.build_all(&moves);
            if let Err(e) = cache::save(path, &pruning) {
                warn!("Could not write the table cache: {e}");
            }
        }
        Tables { moves, pruning }
    }

    /// Builds the move tables, then returns while the pruning tables fill on
    /// a background thread. Searches may start right away; their heuristic
    /// tightens as the tables fill.
    #[must_use]
    pub fn spawn_background() -> (Arc<Self>, JoinHandle<()>) {
        let tables = Arc::new(Tables {
            moves: MoveTables::build(),
            pruning: PruningTables::new_unbuilt(),
        });
        let builder = Arc::clone(&tables);
        let handle = thread::spawn(move || {
            info!(start!("Building pruning tables in the background"));
            builder.pruning.build_all(&builder.moves);
            info!(success!("Background table build finished"));
        });
        (tables, handle)
    }

    /// Move tables only, with every pruning table left unbuilt.
    #[cfg(test)]
    pub(crate) fn unbuilt() -> Self {
        Tables {
            moves: MoveTables::build(),
            pruning: PruningTables::new_unbuilt(),
        }
    }

    #[must_use]
    pub fn moves(&self) -> &MoveTables {
        &self.moves
    }

    #[must_use]
    pub fn pruning(&self) -> &PruningTables {
        &self.pruning
    }

    /// Whether every pruning table is finished.
    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.pruning.is_complete()
    }
}

/// The default cache location, `<cache dir>/twophase/tables.bin`.
#[must_use]
pub fn default_cache_path() -> Option<PathBuf> {
    dirs::cache_dir().map(|dir| dir.join("twophase").join("tables.bin"))
}

/// Builds [`Tables`] the first time they are requested and hands out the
/// same instance afterwards. Concurrent first requests block until the one
/// build finishes.
#[derive(Default)]
pub struct SharedTables {
    cell: OnceLock<Arc<Tables>>,
    cache_path: Option<PathBuf>,
}

impl SharedTables {
    #[must_use]
    pub const fn new() -> Self {
        SharedTables {
            cell: OnceLock::new(),
            cache_path: None,
        }
    }

    /// Like [`SharedTables::new`], but loading and saving through the cache
    /// at `path`.
    #[must_use]
    pub fn with_cache(path: PathBuf) -> Self {
        SharedTables {
            cell: OnceLock::new(),
            cache_path: Some(path),
        }
    }

    pub fn get(&self) -> Arc<Tables> {
        Arc::clone(self.cell.get_or_init(|| {
            Arc::new(match &self.cache_path {
                Some(path) => Tables::load_or_build(path),
                None => Tables::build(),
            })
        }))
    }

    #[must_use]
    pub fn is_initialized(&self) -> bool {
        self.cell.get().is_some()
    }
}
