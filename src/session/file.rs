//! File-persisted session store.

use std::fs::{self, File};
use std::io::{BufReader, BufWriter, ErrorKind, Write};
use std::path::{Path, PathBuf};
use std::sync::{Mutex, PoisonError};

use crate::session::store::{MemorySessionStore, SessionStore};
use crate::session::{AuthTokens, Session, SessionError};

/// Session store that mirrors every mutation to a JSON file.
///
/// The file holds `{"access_token": ..., "refresh_token": ...}`. A failed write
/// leaves the in-memory snapshot updated and returns the error.
#[derive(Debug)]
pub struct FileSessionStore {
    memory: MemorySessionStore,
    path: PathBuf,
    /// Serializes writers of the temp file and the rename.
    write_lock: Mutex<()>,
}

impl FileSessionStore {
    /// Open the store, loading tokens if the file exists.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self, SessionError> {
        let path = path.into();
        let session = load(&path)?;
        if session.is_authenticated() {
            tracing::info!(path = %path.display(), "Loaded persisted session");
        }
        Ok(Self {
            memory: MemorySessionStore::with_session(session),
            path,
            write_lock: Mutex::new(()),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn persist(&self) -> Result<(), SessionError> {
        let _guard = self.write_lock.lock().unwrap_or_else(PoisonError::into_inner);
        // Snapshot under the lock so the last writer persists the latest state.
        let session = self.memory.snapshot();
        let io_err = |source| SessionError::Io {
            path: self.path.display().to_string(),
            source,
        };

        if session == Session::default() {
            return match fs::remove_file(&self.path) {
                Err(e) if e.kind() != ErrorKind::NotFound => Err(io_err(e)),
                _ => Ok(()),
            };
        }

        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(io_err)?;
        }

        let tmp = self.path.with_extension("tmp");
        let mut writer = BufWriter::new(File::create(&tmp).map_err(io_err)?);
        serde_json::to_writer(&mut writer, &session).map_err(|source| SessionError::Corrupt {
            path: tmp.display().to_string(),
            source,
        })?;
        writer.flush().map_err(io_err)?;
        drop(writer);
        fs::rename(&tmp, &self.path).map_err(io_err)?;

        tracing::debug!(path = %self.path.display(), "Session persisted");
        Ok(())
    }
}

fn load(path: &Path) -> Result<Session, SessionError> {
    let file = match File::open(path) {
        Ok(file) => file,
        Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Session::default()),
        Err(source) => {
            return Err(SessionError::Io {
                path: path.display().to_string(),
                source,
            })
        }
    };

    serde_json::from_reader(BufReader::new(file)).map_err(|source| SessionError::Corrupt {
        path: path.display().to_string(),
        source,
    })
}

impl SessionStore for FileSessionStore {
    fn snapshot(&self) -> Session {
        self.memory.snapshot()
    }

    fn set_access_token(&self, token: String) -> Result<(), SessionError> {
        self.memory.set_access_token(token)?;
        self.persist()
    }

    fn set_tokens(&self, tokens: AuthTokens) -> Result<(), SessionError> {
        self.memory.set_tokens(tokens)?;
        self.persist()
    }

    fn clear(&self) -> Result<(), SessionError> {
        self.memory.clear()?;
        self.persist()
    }
}
