use std::collections::HashMap;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, PoisonError};

use serde::Serialize;
use serde::de::DeserializeOwned;

use super::{EntryKind, Scope};
use crate::core::Snapshot;
use crate::errors::Result;

pub trait EntryCache {
    fn store(&mut self, scope: &Scope, kind: EntryKind, entries: &Snapshot) -> Result<()>;
    fn restore(&self, scope: &Scope) -> Result<Snapshot>;
}

#[derive(Debug, Clone)]
pub struct JsonFileCache {
    dir: PathBuf,
}

impl JsonFileCache {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn path(&self, scope: &Scope, kind: EntryKind) -> PathBuf {
        self.dir.join(format!("{}.{}.json", scope.key(), kind.as_str()))
    }

    fn write<T: Serialize>(&self, path: &Path, value: &T) -> Result<()> {
        fs::create_dir_all(&self.dir)?;
        fs::write(path, serde_json::to_vec(value)?)?;
        Ok(())
    }

    fn read<T: DeserializeOwned + Default>(&self, path: &Path) -> Result<T> {
        match fs::read(path) {
            Ok(bytes) => Ok(serde_json::from_slice(&bytes)?),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(T::default()),
            Err(e) => Err(e.into()),
        }
    }
}

impl EntryCache for JsonFileCache {
    fn store(&mut self, scope: &Scope, kind: EntryKind, entries: &Snapshot) -> Result<()> {
        let path = self.path(scope, kind);
        match kind {
            EntryKind::HumanCapital => self.write(&path, &entries.human_capital),
            EntryKind::Property => self.write(&path, &entries.properties),
            EntryKind::ExtraExpense => self.write(&path, &entries.extra_expenses),
            EntryKind::Investment => self.write(&path, &entries.investments),
        }
    }

    fn restore(&self, scope: &Scope) -> Result<Snapshot> {
        Ok(Snapshot {
            human_capital: self.read(&self.path(scope, EntryKind::HumanCapital))?,
            properties: self.read(&self.path(scope, EntryKind::Property))?,
            extra_expenses: self.read(&self.path(scope, EntryKind::ExtraExpense))?,
            investments: self.read(&self.path(scope, EntryKind::Investment))?,
        })
    }
}

#[derive(Debug, Clone, Default)]
pub struct MemoryCache {
    scopes: Arc<Mutex<HashMap<Scope, Snapshot>>>,
}

impl EntryCache for MemoryCache {
    fn store(&mut self, scope: &Scope, kind: EntryKind, entries: &Snapshot) -> Result<()> {
        let mut scopes = self.scopes.lock().unwrap_or_else(PoisonError::into_inner);
        let cached = scopes.entry(scope.clone()).or_default();
        match kind {
            EntryKind::HumanCapital => cached.human_capital = entries.human_capital.clone(),
            EntryKind::Property => cached.properties = entries.properties.clone(),
            EntryKind::ExtraExpense => cached.extra_expenses = entries.extra_expenses.clone(),
            EntryKind::Investment => cached.investments = entries.investments.clone(),
        }
        Ok(())
    }

    fn restore(&self, scope: &Scope) -> Result<Snapshot> {
        let scopes = self.scopes.lock().unwrap_or_else(PoisonError::into_inner);
        Ok(scopes.get(scope).cloned().unwrap_or_default())
    }
}
