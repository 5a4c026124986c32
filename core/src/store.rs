// core/src/store.rs
//
// Generisk dokumentlager (get/set/query-by-field). Appen bruker en ekstern
// backend; her finnes en minnevariant (tester) og en JSON-fil-variant.

use std::collections::{BTreeMap, HashMap};
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use log::{debug, info};
use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::error::{FitTrackError, Result};

/// Endring for `DocumentStore::update`: får nåværende dokument (om det finnes)
/// og returnerer det nye.
pub type UpdateFn<'a> = dyn FnMut(Option<Value>) -> Result<Value> + 'a;

pub trait DocumentStore {
    fn get(&self, collection: &str, id: &str) -> Result<Option<Value>>;
    fn set(&self, collection: &str, id: &str, doc: Value) -> Result<()>;
    /// Les-endre-skriv under lagerets lås, uten at andre skrivere kommer
    /// imellom. Feiler `f`, lagres ingenting. Returnerer det lagrede dokumentet.
    fn update(&self, collection: &str, id: &str, f: &mut UpdateFn<'_>) -> Result<Value>;
    /// Alle dokumenter der `field == value` (toppnivåfelt).
    fn query_eq(&self, collection: &str, field: &str, value: &Value) -> Result<Vec<Value>>;
}

pub fn get_typed<T: DeserializeOwned>(
    store: &dyn DocumentStore,
    collection: &str,
    id: &str,
) -> Result<Option<T>> {
    match store.get(collection, id)? {
        Some(v) => {
            let parsed = serde_path_to_error::deserialize(v)?;
            Ok(Some(parsed))
        }
        None => Ok(None),
    }
}

type Collections = BTreeMap<String, BTreeMap<String, Value>>;

fn lock_err<T>(_: std::sync::PoisonError<T>) -> FitTrackError {
    FitTrackError::Store("store lock poisoned".into())
}

fn matches(doc: &Value, field: &str, value: &Value) -> bool {
    doc.get(field).map(|v| v == value).unwrap_or(false)
}

/// Minnebasert lager.
#[derive(Debug, Default)]
pub struct MemoryStore {
    docs: Mutex<HashMap<String, HashMap<String, Value>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl DocumentStore for MemoryStore {
    fn get(&self, collection: &str, id: &str) -> Result<Option<Value>> {
        let docs = self.docs.lock().map_err(lock_err)?;
        Ok(docs.get(collection).and_then(|c| c.get(id)).cloned())
    }

    fn set(&self, collection: &str, id: &str, doc: Value) -> Result<()> {
        let mut docs = self.docs.lock().map_err(lock_err)?;
        docs.entry(collection.to_string()).or_default().insert(id.to_string(), doc);
        Ok(())
    }

    fn update(&self, collection: &str, id: &str, f: &mut UpdateFn<'_>) -> Result<Value> {
        let mut docs = self.docs.lock().map_err(lock_err)?;
        let current = docs.get(collection).and_then(|c| c.get(id)).cloned();
        let next = f(current)?;
        docs.entry(collection.to_string()).or_default().insert(id.to_string(), next.clone());
        Ok(next)
    }

    fn query_eq(&self, collection: &str, field: &str, value: &Value) -> Result<Vec<Value>> {
        let docs = self.docs.lock().map_err(lock_err)?;
        Ok(docs
            .get(collection)
            .map(|c| c.values().filter(|d| matches(d, field, value)).cloned().collect())
            .unwrap_or_default())
    }
}

/// Én JSON-fil med alle samlinger; skrives (pretty) ved hver `set`/`update`.
/// Minnet endres først når filen er skrevet; feilet skriving etterlater
/// både fil og minne som før.
#[derive(Debug)]
pub struct JsonFileStore {
    path: PathBuf,
    docs: Mutex<Collections>,
}

impl JsonFileStore {
    /// Åpner filen, eller starter tomt hvis den ikke finnes.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        let docs: Collections = if path.exists() {
            let contents = std::fs::read_to_string(&path)?;
            let mut de = serde_json::Deserializer::from_str(&contents);
            let docs: Collections = serde_path_to_error::deserialize(&mut de)?;
            de.end()?;
            docs
        } else {
            Collections::new()
        };
        info!("dokumentlager åpnet: {} ({} samlinger)", path.display(), docs.len());
        Ok(Self { path, docs: Mutex::new(docs) })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    // temp-fil + rename: en avbrutt skriving trunkerer aldri lageret
    fn flush(&self, docs: &Collections) -> Result<()> {
        let json = serde_json::to_string_pretty(docs)?;
        let mut tmp = self.path.clone().into_os_string();
        tmp.push(".tmp");
        let tmp = PathBuf::from(tmp);
        if let Err(e) = std::fs::write(&tmp, json).and_then(|_| std::fs::rename(&tmp, &self.path)) {
            let _ = std::fs::remove_file(&tmp);
            return Err(e.into());
        }
        debug!("dokumentlager skrevet til {}", self.path.display());
        Ok(())
    }

    /// Skriver `next` til disk og bytter det inn i minnet først etterpå.
    fn commit(&self, docs: &mut Collections, next: Collections) -> Result<()> {
        self.flush(&next)?;
        *docs = next;
        Ok(())
    }
}

impl DocumentStore for JsonFileStore {
    fn get(&self, collection: &str, id: &str) -> Result<Option<Value>> {
        let docs = self.docs.lock().map_err(lock_err)?;
        Ok(docs.get(collection).and_then(|c| c.get(id)).cloned())
    }

    fn set(&self, collection: &str, id: &str, doc: Value) -> Result<()> {
        let mut docs = self.docs.lock().map_err(lock_err)?;
        let mut next = docs.clone();
        next.entry(collection.to_string()).or_default().insert(id.to_string(), doc);
        self.commit(&mut docs, next)
    }

    fn update(&self, collection: &str, id: &str, f: &mut UpdateFn<'_>) -> Result<Value> {
        let mut docs = self.docs.lock().map_err(lock_err)?;
        let current = docs.get(collection).and_then(|c| c.get(id)).cloned();
        let doc = f(current)?;
        let mut next = docs.clone();
        next.entry(collection.to_string()).or_default().insert(id.to_string(), doc.clone());
        self.commit(&mut docs, next)?;
        Ok(doc)
    }

    fn query_eq(&self, collection: &str, field: &str, value: &Value) -> Result<Vec<Value>> {
        let docs = self.docs.lock().map_err(lock_err)?;
        Ok(docs
            .get(collection)
            .map(|c| c.values().filter(|d| matches(d, field, value)).cloned().collect())
            .unwrap_or_default())
    }
}
