//! JSON file backed store.

use std::{
    collections::BTreeMap,
    fs,
    io::{self, Write},
    path::{Path, PathBuf},
    time::SystemTime,
};

use autoinput_ids::{ApplicationId, InputSourceId};
use parking_lot::{Mutex, MutexGuard};
use tempfile::NamedTempFile;
use tracing::{debug, info, warn};

use crate::{
    Error, PreferenceStore, Result,
    schema::{self, Document, Origin},
};

/// Identity of the file contents last seen: modification time and length.
type Stamp = Option<(SystemTime, u64)>;

/// In-memory copy of the file and the stamp it was read at.
#[derive(Debug, Default)]
struct Cached {
    /// Parsed contents.
    doc: Document,
    /// `None` when the file did not exist.
    stamp: Stamp,
}

/// Preferences persisted as a JSON document.
///
/// Other processes may edit the file at any time. Every read checks the
/// file's stamp and reloads it when it changed; a file that no longer parses
/// is reported and the previous contents are kept. Mutations reload first,
/// then rewrite the file through a uniquely named temporary sibling and an
/// atomic rename, so a crash mid-write leaves either the old or the new
/// contents. The in-memory copy only changes after the write succeeds.
pub struct FileStore {
    /// Location of the preference file.
    path: PathBuf,
    /// Last successfully loaded or written contents.
    cached: Mutex<Cached>,
}

/// Current stamp of `path`.
fn stamp_of(path: &Path) -> io::Result<Stamp> {
    match fs::metadata(path) {
        Ok(meta) => Ok(Some((meta.modified()?, meta.len()))),
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
        Err(e) => Err(e),
    }
}

/// Read and parse `path`, returning the document and the stamp it was read at.
fn load(path: &Path) -> Result<Cached> {
    let io_err = |source| Error::Io {
        path: path.to_path_buf(),
        source,
    };
    let stamp = stamp_of(path).map_err(io_err)?;
    if stamp.is_none() {
        debug!(path = %path.display(), "no preference file yet");
        return Ok(Cached::default());
    }
    let text = match fs::read_to_string(path) {
        Ok(text) => text,
        Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(Cached::default()),
        Err(e) => return Err(io_err(e)),
    };
    let (doc, origin) = schema::parse(&text, path)?;
    match origin {
        Origin::Legacy => info!(
            path = %path.display(),
            mappings = doc.mappings.len(),
            "migrated legacy preference file"
        ),
        Origin::Empty => debug!(path = %path.display(), "preference file is blank"),
        Origin::Current => debug!(
            path = %path.display(),
            mappings = doc.mappings.len(),
            "loaded preferences"
        ),
    }
    Ok(Cached { doc, stamp })
}

impl FileStore {
    /// Open the store at `path`. A missing file is an empty store; it is
    /// created on the first write.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        let cached = load(&path)?;
        Ok(Self {
            path,
            cached: Mutex::new(cached),
        })
    }

    /// Location of the backing file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Lock the cache, reloading it first if the file changed on disk.
    fn fresh(&self) -> Result<MutexGuard<'_, Cached>> {
        let mut guard = self.cached.lock();
        let now = stamp_of(&self.path).map_err(|source| Error::Io {
            path: self.path.clone(),
            source,
        })?;
        if now != guard.stamp {
            debug!(path = %self.path.display(), "preference file changed on disk");
            // Recorded before parsing: a broken file is reported once.
            guard.stamp = now;
            *guard = load(&self.path)?;
        }
        Ok(guard)
    }

    /// Snapshot for readers. Reload failures keep the previous contents.
    fn read<T>(&self, f: impl FnOnce(&Document) -> T) -> T {
        match self.fresh() {
            Ok(guard) => f(&guard.doc),
            Err(e) => {
                warn!(error = %e, "keeping previous preferences");
                f(&self.cached.lock().doc)
            }
        }
    }

    /// Apply `edit` to a copy of the current document and persist it.
    /// Nothing is written when the edit leaves the document unchanged.
    fn update(&self, edit: impl FnOnce(&mut Document)) -> Result<()> {
        let mut guard = self.fresh()?;
        let mut next = guard.doc.clone();
        edit(&mut next);
        if next == guard.doc {
            return Ok(());
        }
        self.write(&next)?;
        let stamp = stamp_of(&self.path).map_err(|source| Error::Io {
            path: self.path.clone(),
            source,
        })?;
        *guard = Cached { doc: next, stamp };
        Ok(())
    }

    /// Atomically replace the file with `doc`.
    fn write(&self, doc: &Document) -> Result<()> {
        let io_err = |source| Error::Io {
            path: self.path.clone(),
            source,
        };
        let parent = match self.path.parent() {
            Some(p) if !p.as_os_str().is_empty() => p,
            _ => Path::new("."),
        };
        fs::create_dir_all(parent).map_err(io_err)?;
        let text = schema::render(doc).map_err(|source| Error::Parse {
            path: self.path.clone(),
            source,
        })?;
        let mut tmp = NamedTempFile::new_in(parent).map_err(io_err)?;
        tmp.write_all(text.as_bytes()).map_err(io_err)?;
        tmp.as_file().sync_all().map_err(io_err)?;
        tmp.persist(&self.path).map_err(|e| io_err(e.error))?;
        debug!(path = %self.path.display(), "wrote preferences");
        Ok(())
    }
}

impl PreferenceStore for FileStore {
    fn get(&self, app: &ApplicationId) -> Option<InputSourceId> {
        self.read(|doc| doc.mappings.get(app).cloned())
    }

    fn set(&self, app: ApplicationId, source: InputSourceId) -> Result<()> {
        self.update(|doc| {
            doc.mappings.insert(app, source);
        })
    }

    fn remove(&self, app: &ApplicationId) -> Result<()> {
        self.update(|doc| {
            doc.mappings.remove(app);
        })
    }

    fn get_default(&self) -> Option<InputSourceId> {
        self.read(|doc| doc.default_source.clone())
    }

    fn set_default(&self, source: Option<InputSourceId>) -> Result<()> {
        self.update(|doc| doc.default_source = source)
    }

    fn mappings(&self) -> BTreeMap<ApplicationId, InputSourceId> {
        self.read(|doc| doc.mappings.clone())
    }
}
