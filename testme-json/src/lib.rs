use chrono::{DateTime, Utc};
use parking_lot::RwLock;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;
use testme_core::keys;
use testme_core::{
    replace_card, Card, CardId, CardRepository, CoreError, LearningSettings, StorageProvider, TodayLearningStats,
};

pub mod paths;

const FILE_VERSION: u32 = 1;

/// On-disk layout: one JSON value per key, decoded lazily so a single bad
/// value does not take the rest of the store down with it.
#[derive(Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct FileImage {
    version: u32,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
    #[serde(default)]
    entries: BTreeMap<String, Value>,
}

impl FileImage {
    fn new_empty() -> Self {
        let now = Utc::now();
        Self {
            version: FILE_VERSION,
            created_at: now,
            updated_at: now,
            entries: BTreeMap::new(),
        }
    }
}

pub struct JsonStore {
    path: PathBuf,
    backups_dir: PathBuf,
    max_backups: usize,
    image: RwLock<FileImage>,
}

impl JsonStore {
    pub fn open_with(path: PathBuf, backups_dir: PathBuf, max_backups: usize) -> Result<Self, CoreError> {
        ensure_parent_dirs(&path)?;
        ensure_dir(&backups_dir)?;
        let image = load_or_init(&path, &backups_dir)?;
        log::info!("opened store {} ({} keys)", path.display(), image.entries.len());
        Ok(Self {
            path,
            backups_dir,
            max_backups: max_backups.max(1),
            image: RwLock::new(image),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn get<T: DeserializeOwned>(&self, key: &'static str) -> Result<Option<T>, CoreError> {
        let image = self.image.read();
        let Some(raw) = image.entries.get(key) else {
            return Ok(None);
        };
        serde_json::from_value(raw.clone()).map(Some).map_err(|e| {
            log::warn!("stored value for {key} does not decode: {e}");
            CoreError::CorruptPersistedState(key)
        })
    }

    /// Updates the in-memory image first; a failed write leaves the value
    /// readable for the rest of the process.
    fn put<T: Serialize>(&self, key: &'static str, value: &T) -> Result<(), CoreError> {
        let raw = serde_json::to_value(value).map_err(io_error)?;
        self.image.write().entries.insert(key.to_string(), raw);
        self.save()
    }

    fn save(&self) -> Result<(), CoreError> {
        let snapshot = {
            let mut image = self.image.write();
            image.updated_at = Utc::now();
            image.clone()
        };
        write_with_backup(&self.path, &self.backups_dir, self.max_backups, &snapshot).map_err(io_error)
    }
}

fn io_error(e: impl std::fmt::Display) -> CoreError {
    CoreError::PersistenceUnavailable(e.to_string())
}

fn ensure_parent_dirs(path: &Path) -> Result<(), CoreError> {
    if let Some(parent) = path.parent() {
        ensure_dir(parent)?;
    }
    Ok(())
}

fn ensure_dir(path: &Path) -> Result<(), CoreError> {
    fs::create_dir_all(path).map_err(io_error)
}

fn load_or_init(path: &Path, backups_dir: &Path) -> Result<FileImage, CoreError> {
    if !path.exists() {
        let image = FileImage::new_empty();
        write_with_backup(path, backups_dir, 1, &image).map_err(io_error)?;
        return Ok(image);
    }

    let buf = fs::read_to_string(path).map_err(io_error)?;
    match serde_json::from_str::<FileImage>(&buf) {
        Ok(image) => Ok(image),
        Err(e) => {
            let ts = Utc::now().format("%Y%m%d-%H%M%S");
            let aside = backups_dir.join(format!("testme-{ts}.corrupt"));
            log::warn!("store {} is unreadable ({e}); moved to {}", path.display(), aside.display());
            fs::rename(path, &aside).map_err(io_error)?;
            Ok(FileImage::new_empty())
        }
    }
}

fn write_with_backup(path: &Path, backups_dir: &Path, max_backups: usize, image: &FileImage) -> std::io::Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    fs::create_dir_all(backups_dir)?;

    let json = serde_json::to_vec_pretty(image).map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidData, e))?;
    let mut tmp = NamedTempFile::new_in(path.parent().unwrap_or_else(|| Path::new(".")))?;
    tmp.write_all(&json)?;
    tmp.flush()?;
    tmp.persist(path)?;

    let ts = chrono::Local::now().format("%Y%m%d-%H%M%S");
    let backup_path = backups_dir.join(format!("testme-{ts}.json"));
    let mut btmp = NamedTempFile::new_in(backups_dir)?;
    btmp.write_all(&json)?;
    btmp.flush()?;
    btmp.persist(&backup_path)?;

    rotate_backups(backups_dir, max_backups)
}

fn rotate_backups(dir: &Path, keep: usize) -> std::io::Result<()> {
    let mut entries: Vec<_> = fs::read_dir(dir)?
        .filter_map(|e| e.ok())
        .filter(|e| e.path().extension().and_then(|s| s.to_str()) == Some("json"))
        .collect();
    entries.sort_by_key(|e| e.metadata().and_then(|m| m.modified()).ok());
    if entries.len() > keep {
        for e in &entries[0..entries.len() - keep] {
            let _ = fs::remove_file(e.path());
        }
    }
    Ok(())
}

impl StorageProvider for JsonStore {
    fn get_cards(&self) -> Result<Vec<Card>, CoreError> {
        Ok(self.get(keys::FLASHCARDS)?.unwrap_or_default())
    }

    fn save_cards(&self, cards: &[Card]) -> Result<(), CoreError> {
        self.put(keys::FLASHCARDS, &cards)
    }

    fn get_settings(&self) -> Result<Option<LearningSettings>, CoreError> {
        self.get(keys::LEARNING_SETTINGS)
    }

    fn save_settings(&self, settings: &LearningSettings) -> Result<(), CoreError> {
        self.put(keys::LEARNING_SETTINGS, settings)
    }

    fn get_daily_stats(&self) -> Result<Option<TodayLearningStats>, CoreError> {
        self.get(keys::DAILY_LEARNING_STATS)
    }

    fn save_daily_stats(&self, stats: &TodayLearningStats) -> Result<(), CoreError> {
        self.put(keys::DAILY_LEARNING_STATS, stats)
    }

    fn get_last_session_date(&self) -> Result<Option<DateTime<Utc>>, CoreError> {
        self.get(keys::LAST_SESSION_DATE)
    }

    fn save_last_session_date(&self, at: DateTime<Utc>) -> Result<(), CoreError> {
        self.put(keys::LAST_SESSION_DATE, &at)
    }
}

impl CardRepository for JsonStore {
    fn all_cards(&self) -> Result<Vec<Card>, CoreError> {
        self.get_cards()
    }

    fn update(&self, card: &Card) -> Result<(), CoreError> {
        let mut cards = self.get_cards()?;
        replace_card(&mut cards, card)?;
        self.save_cards(&cards)
    }

    fn insert(&self, card: &Card) -> Result<(), CoreError> {
        let mut cards = self.get_cards()?;
        if cards.iter().any(|c| c.id == card.id) {
            return Err(CoreError::Conflict("card id already exists"));
        }
        cards.push(card.clone());
        self.save_cards(&cards)
    }

    fn remove(&self, id: CardId) -> Result<(), CoreError> {
        let mut cards = self.get_cards()?;
        let before = cards.len();
        cards.retain(|c| c.id != id);
        if cards.len() == before {
            return Err(CoreError::NotFound("card"));
        }
        self.save_cards(&cards)
    }
}
