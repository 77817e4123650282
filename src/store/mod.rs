//! Flat-file record store for the tools catalogue.
//!
//! The whole table is the unit of mutation: every save writes a sibling
//! temporary file and renames it over the tools file, so readers see either
//! the old table or the new one. Reads go through a [`SnapshotCache`] that every save invalidates. Loading
//! never writes; a stale header is reported as a [`Migration`] and the caller
//! decides whether to persist it.

pub mod cache;
pub mod codec;
pub mod schema;

use std::collections::BTreeSet;
use std::fmt;
use std::fs::{self, File};
use std::io::{BufReader, Write};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use chrono::{Local, Timelike};
use serde::Serialize;
use tempfile::NamedTempFile;

use crate::models::tool::{NewTool, ToolRecord, PREDEFINED_CATEGORIES};
use cache::SnapshotCache;
pub use schema::{next_serial_number, Migration, EXPECTED_COLUMNS};

/// Field on which a new tool collided with an existing one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum DuplicateField {
    Name,
    Link,
}

impl fmt::Display for DuplicateField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DuplicateField::Name => f.write_str("name"),
            DuplicateField::Link => f.write_str("link"),
        }
    }
}

/// Record store failures.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("A tool with the {field} '{value}' already exists")]
    Duplicate { field: DuplicateField, value: String },

    #[error("Serial numbers are exhausted")]
    SerialsExhausted,
}

impl StoreError {
    pub fn is_duplicate(&self) -> bool {
        matches!(self, Self::Duplicate { .. })
    }
}

/// Result of reading the tools file.
#[derive(Debug, Default)]
pub struct Loaded {
    /// Canonical, serial-repaired table, most recent first.
    pub table: Vec<ToolRecord>,
    /// Set when the on-disk header is not the canonical one.
    pub migration: Option<Migration>,
    /// Rows that were given a fresh serial number by the normalization pass.
    pub repaired_serials: usize,
    /// Non-fatal problems met while reading.
    pub warnings: Vec<String>,
}

/// A possibly cached view of the table.
#[derive(Debug, Clone)]
pub struct Snapshot {
    pub table: Arc<Vec<ToolRecord>>,
    pub migration: Option<Migration>,
    pub warnings: Vec<String>,
}

/// Owner of the tools file.
pub struct RecordStore {
    path: PathBuf,
    cache: SnapshotCache,
}

impl fmt::Debug for RecordStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RecordStore")
            .field("path", &self.path)
            .finish_non_exhaustive()
    }
}

impl RecordStore {
    pub fn new(path: impl Into<PathBuf>, cache_ttl: Duration) -> Self {
        Self {
            path: path.into(),
            cache: SnapshotCache::new(cache_ttl),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Create the file with just the header when it is absent or empty.
    pub fn initialize(&self) -> Result<(), StoreError> {
        if fs::metadata(&self.path).is_ok_and(|meta| meta.len() > 0) {
            return Ok(());
        }
        fs::create_dir_all(self.parent_dir())?;
        self.replace_file(&[])?;
        tracing::info!(path = %self.path.display(), "Initialized empty tools file");
        Ok(())
    }

    /// Read and normalize the table, propagating I/O and CSV errors.
    pub fn try_load(&self) -> Result<Loaded, StoreError> {
        self.initialize()?;
        let file = File::open(&self.path)?;
        let decoded = codec::read_records(BufReader::new(file))?;

        let mut table = decoded.records;
        let repaired_serials = schema::normalize(&mut table);
        if repaired_serials > 0 {
            tracing::warn!(
                path = %self.path.display(),
                repaired = repaired_serials,
                "Assigned serial numbers to rows without a valid one"
            );
        }
        for warning in &decoded.warnings {
            tracing::warn!(path = %self.path.display(), warning = %warning, "Tools file row warning");
        }

        Ok(Loaded {
            table,
            migration: decoded.migration,
            repaired_serials,
            warnings: decoded.warnings,
        })
    }

    /// Read the table, degrading any failure to an empty table plus a warning.
    pub fn load(&self) -> Loaded {
        match self.try_load() {
            Ok(loaded) => loaded,
            Err(e) => {
                tracing::warn!(path = %self.path.display(), error = %e, "Failed to load tools file");
                Loaded {
                    warnings: vec![format!("Error loading data from CSV: {e}")],
                    ..Loaded::default()
                }
            }
        }
    }

    /// Cached [`load`](Self::load). Failed reads are never cached.
    pub fn snapshot(&self) -> Snapshot {
        if let Some(table) = self.cache.get() {
            return Snapshot {
                table,
                migration: None,
                warnings: Vec::new(),
            };
        }

        let generation = self.cache.generation();
        match self.try_load() {
            Ok(loaded) => {
                let table = Arc::new(loaded.table);
                self.cache.put(Arc::clone(&table), generation);
                Snapshot {
                    table,
                    migration: loaded.migration,
                    warnings: loaded.warnings,
                }
            }
            Err(e) => {
                tracing::warn!(path = %self.path.display(), error = %e, "Failed to load tools file");
                Snapshot {
                    table: Arc::new(Vec::new()),
                    migration: None,
                    warnings: vec![format!("Error loading data from CSV: {e}")],
                }
            }
        }
    }

    /// Overwrite the file with `records` in the canonical layout.
    pub fn save(&self, records: &[ToolRecord]) -> Result<(), StoreError> {
        let result = self.replace_file(records);
        self.cache.invalidate();
        if let Err(e) = &result {
            tracing::error!(path = %self.path.display(), error = %e, "Failed to save tools file");
        }
        result
    }

    fn parent_dir(&self) -> &Path {
        self.path
            .parent()
            .filter(|p| !p.as_os_str().is_empty())
            .unwrap_or_else(|| Path::new("."))
    }

    /// Write `records` to a temporary file next to the tools file, then
    /// rename it into place.
    fn replace_file(&self, records: &[ToolRecord]) -> Result<(), StoreError> {
        let mut tmp = NamedTempFile::new_in(self.parent_dir())?;
        codec::write_records(&mut tmp, records)?;
        tmp.flush()?;
        tmp.as_file().sync_all()?;
        tmp.persist(&self.path).map_err(|e| e.error)?;
        Ok(())
    }

    /// Append a tool, returning the stored record.
    ///
    /// Reloads from disk first and refuses Name or Link values that already
    /// exist (case-insensitive). There is no write lock: two overlapping adds
    /// may read the same table and the later save wins.
    pub fn add_entry(&self, tool: NewTool) -> Result<ToolRecord, StoreError> {
        let mut table = self.try_load()?.table;
        check_duplicate(&table, &tool)?;

        let now = Local::now().naive_local();
        let subscription_cost = if tool.pricing_type.requires_cost() {
            tool.subscription_cost
        } else {
            String::new()
        };
        let record = ToolRecord {
            serial_number: next_serial_number(&table).ok_or(StoreError::SerialsExhausted)?,
            name: tool.name,
            link: Some(tool.link),
            category: tool.category,
            pricing_type: Some(tool.pricing_type),
            unknown_pricing: None,
            subscription_cost,
            uploaded_by: tool.uploaded_by,
            timestamp: Some(now.with_nanosecond(0).unwrap_or(now)),
            purpose: tool.purpose,
        };

        table.push(record.clone());
        self.save(&table)?;

        tracing::info!(
            serial_number = record.serial_number,
            name = %record.name,
            category = %record.category,
            "Added tool"
        );
        Ok(record)
    }
}

/// Reject `tool` when its name or link matches an existing record.
pub fn check_duplicate(records: &[ToolRecord], tool: &NewTool) -> Result<(), StoreError> {
    let name = tool.name.trim().to_lowercase();
    if records
        .iter()
        .any(|r| r.name.trim().to_lowercase() == name)
    {
        return Err(StoreError::Duplicate {
            field: DuplicateField::Name,
            value: tool.name.trim().to_string(),
        });
    }

    let link = tool.link.trim().to_lowercase();
    if records
        .iter()
        .filter_map(|r| r.link.as_deref())
        .any(|existing| existing.trim().to_lowercase() == link)
    {
        return Err(StoreError::Duplicate {
            field: DuplicateField::Link,
            value: tool.link.trim().to_string(),
        });
    }

    Ok(())
}

/// Predefined categories plus every distinct non-empty category in use.
pub fn all_categories(records: &[ToolRecord]) -> BTreeSet<String> {
    PREDEFINED_CATEGORIES
        .iter()
        .map(|c| c.to_string())
        .chain(
            records
                .iter()
                .map(|r| r.category.trim())
                .filter(|c| !c.is_empty())
                .map(str::to_string),
        )
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::tool::PricingType;
    use tempfile::TempDir;

    fn store_in(dir: &TempDir) -> RecordStore {
        RecordStore::new(dir.path().join("tools.csv"), Duration::from_secs(600))
    }

    fn new_tool(name: &str, link: &str, pricing: PricingType, cost: &str) -> NewTool {
        NewTool {
            name: name.to_string(),
            link: link.to_string(),
            category: "Chatbots".to_string(),
            pricing_type: pricing,
            subscription_cost: cost.to_string(),
            uploaded_by: "Jane".to_string(),
            purpose: "Drafts copy".to_string(),
        }
    }

    #[test]
    fn initialize_writes_header_only() {
        let dir = tempfile::tempdir().unwrap();
        let store = store_in(&dir);
        store.initialize().unwrap();
        let text = fs::read_to_string(store.path()).unwrap();
        assert_eq!(text.trim_end(), EXPECTED_COLUMNS.join(","));

        // Idempotent: existing content is left alone.
        fs::write(store.path(), format!("{}\n", EXPECTED_COLUMNS.join(","))).unwrap();
        store.initialize().unwrap();
        assert_eq!(
            fs::read_to_string(store.path()).unwrap().trim_end(),
            EXPECTED_COLUMNS.join(",")
        );
    }

    #[test]
    fn initialize_creates_parent_directories() {
        let dir = tempfile::tempdir().unwrap();
        let store = RecordStore::new(dir.path().join("data/nested/tools.csv"), Duration::ZERO);
        store.initialize().unwrap();
        assert!(store.path().exists());
    }

    #[test]
    fn load_of_missing_file_is_empty_and_canonical() {
        let dir = tempfile::tempdir().unwrap();
        let store = store_in(&dir);
        let loaded = store.load();
        assert!(loaded.table.is_empty());
        assert!(loaded.migration.is_none());
        assert!(loaded.warnings.is_empty());
    }

    #[test]
    fn load_of_zero_length_file_is_empty() {
        let dir = tempfile::tempdir().unwrap();
        let store = store_in(&dir);
        File::create(store.path()).unwrap();
        let loaded = store.load();
        assert!(loaded.table.is_empty());
    }

    #[test]
    fn add_to_empty_store_assigns_serial_one() {
        let dir = tempfile::tempdir().unwrap();
        let store = store_in(&dir);
        store
            .add_entry(new_tool("ChatGPT", "https://chat.openai.com", PricingType::Free, ""))
            .unwrap();

        let loaded = store.load();
        assert_eq!(loaded.table.len(), 1);
        let record = &loaded.table[0];
        assert_eq!(record.serial_number, 1);
        assert_eq!(record.subscription_cost, "");
        assert_eq!(record.link.as_deref(), Some("https://chat.openai.com"));
        assert!(record.timestamp.is_some());
    }

    #[test]
    fn sequential_adds_number_in_call_order() {
        let dir = tempfile::tempdir().unwrap();
        let store = store_in(&dir);
        let first = store
            .add_entry(new_tool("Jasper", "https://jasper.ai", PricingType::Paid, "$49/month"))
            .unwrap();
        let second = store
            .add_entry(new_tool("Canva", "https://canva.com", PricingType::Freemium, "$12/month"))
            .unwrap();
        assert_eq!(first.serial_number, 1);
        assert_eq!(second.serial_number, 2);

        let table = store.load().table;
        assert_eq!(table[0].name, "Canva");
        assert_eq!(table[1].name, "Jasper");
    }

    #[test]
    fn free_pricing_drops_subscription_cost() {
        let dir = tempfile::tempdir().unwrap();
        let store = store_in(&dir);
        let record = store
            .add_entry(new_tool("Bard", "https://bard.google.com", PricingType::Free, "$10"))
            .unwrap();
        assert_eq!(record.subscription_cost, "");
        assert_eq!(store.load().table[0].subscription_cost, "");
    }

    #[test]
    fn duplicate_name_is_rejected_case_insensitively() {
        let dir = tempfile::tempdir().unwrap();
        let store = store_in(&dir);
        store
            .add_entry(new_tool("ChatGPT", "https://chat.openai.com", PricingType::Free, ""))
            .unwrap();
        let err = store
            .add_entry(new_tool("chatgpt", "https://other.ai", PricingType::Free, ""))
            .unwrap_err();
        assert!(matches!(
            err,
            StoreError::Duplicate {
                field: DuplicateField::Name,
                ..
            }
        ));
        assert_eq!(store.load().table.len(), 1);
    }

    #[test]
    fn duplicate_link_is_rejected_case_insensitively() {
        let dir = tempfile::tempdir().unwrap();
        let store = store_in(&dir);
        store
            .add_entry(new_tool("ChatGPT", "https://chat.openai.com", PricingType::Free, ""))
            .unwrap();
        let err = store
            .add_entry(new_tool("Other Bot", "HTTPS://CHAT.OPENAI.COM", PricingType::Free, ""))
            .unwrap_err();
        assert!(err.is_duplicate());
        assert_eq!(
            err.to_string(),
            "A tool with the link 'HTTPS://CHAT.OPENAI.COM' already exists"
        );
    }

    #[test]
    fn save_of_loaded_table_is_a_fixed_point() {
        let dir = tempfile::tempdir().unwrap();
        let store = store_in(&dir);
        store
            .add_entry(new_tool("Jasper", "https://jasper.ai", PricingType::Paid, "$49/month"))
            .unwrap();
        store
            .add_entry(new_tool("Midjourney", "https://midjourney.com", PricingType::Paid, "$10/month"))
            .unwrap();

        let before = fs::read_to_string(store.path()).unwrap();
        let first = store.load().table;
        store.save(&first).unwrap();
        let second = store.load().table;
        assert_eq!(first, second);

        // Rows are written most-recent-first after a save, which is still stable.
        store.save(&second).unwrap();
        assert_eq!(store.load().table, second);
        assert_eq!(before.lines().count(), 3);
    }

    #[test]
    fn legacy_file_is_migrated_only_when_saved() {
        let dir = tempfile::tempdir().unwrap();
        let store = store_in(&dir);
        let legacy = "Serial_Number,Name,Category,Uploaded_By,Date_Time,Purpose\n\
                      1,Jasper,Content Creation,Rayna,2024-01-02 10:00:00,Writes long-form posts\n\
                      2,Canva,Design Tools,Sneha,2024-02-03 11:30:00,Designs social creatives\n";
        fs::write(store.path(), legacy).unwrap();

        let loaded = store.load();
        let migration = loaded.migration.expect("legacy header must be reported");
        assert!(migration.added_columns.contains(&"Link"));
        assert!(loaded.table.iter().all(|r| r.link.is_none()));
        assert_eq!(fs::read_to_string(store.path()).unwrap(), legacy);

        store.save(&loaded.table).unwrap();
        let text = fs::read_to_string(store.path()).unwrap();
        assert!(text.starts_with(&EXPECTED_COLUMNS.join(",")));
        assert!(store.load().migration.is_none());
    }

    #[test]
    fn missing_serial_column_is_renumbered() {
        let dir = tempfile::tempdir().unwrap();
        let store = store_in(&dir);
        fs::write(
            store.path(),
            "Name,Category,Uploaded_By,Date_Time,Purpose\n\
             Jasper,Content Creation,Rayna,2024-01-02 10:00:00,Writes long-form posts\n\
             Canva,Design Tools,Sneha,2024-02-03 11:30:00,Designs social creatives\n",
        )
        .unwrap();

        let loaded = store.load();
        assert_eq!(loaded.repaired_serials, 2);
        let jasper = loaded.table.iter().find(|r| r.name == "Jasper").unwrap();
        let canva = loaded.table.iter().find(|r| r.name == "Canva").unwrap();
        assert_eq!(jasper.serial_number, 1);
        assert_eq!(canva.serial_number, 2);

        let added = store
            .add_entry(new_tool("Synthesia", "https://synthesia.io", PricingType::Paid, "$22/month"))
            .unwrap();
        assert_eq!(added.serial_number, 3);
    }

    #[test]
    fn snapshot_is_cached_until_save() {
        let dir = tempfile::tempdir().unwrap();
        let store = store_in(&dir);
        store
            .add_entry(new_tool("Jasper", "https://jasper.ai", PricingType::Paid, "$49/month"))
            .unwrap();
        let first = store.snapshot();
        assert_eq!(first.table.len(), 1);

        // Out-of-band edits are not observed while the snapshot is fresh.
        fs::write(store.path(), format!("{}\n", EXPECTED_COLUMNS.join(","))).unwrap();
        assert_eq!(store.snapshot().table.len(), 1);

        // A save through the store invalidates it.
        store
            .add_entry(new_tool("Canva", "https://canva.com", PricingType::Free, ""))
            .unwrap();
        assert_eq!(store.snapshot().table.len(), 1);
        assert_eq!(store.snapshot().table[0].name, "Canva");
    }

    #[test]
    fn corrupt_file_degrades_to_empty_table_with_warning() {
        let dir = tempfile::tempdir().unwrap();
        let store = store_in(&dir);
        fs::write(store.path(), b"SerialNumber,Name\n1,\xff\xfe broken\n").unwrap();

        let loaded = store.load();
        assert!(loaded.table.is_empty());
        assert_eq!(loaded.warnings.len(), 1);

        let snapshot = store.snapshot();
        assert!(snapshot.table.is_empty());
        assert!(!snapshot.warnings.is_empty());
    }

    #[test]
    fn add_refuses_to_overwrite_unreadable_file() {
        let dir = tempfile::tempdir().unwrap();
        let store = store_in(&dir);
        let corrupt: &[u8] = b"SerialNumber,Name\n1,\xff\xfe broken\n";
        fs::write(store.path(), corrupt).unwrap();

        let err = store
            .add_entry(new_tool("Jasper", "https://jasper.ai", PricingType::Free, ""))
            .unwrap_err();
        assert!(matches!(err, StoreError::Csv(_)));
        assert_eq!(fs::read(store.path()).unwrap(), corrupt);
    }

    #[test]
    fn save_to_unwritable_path_returns_error() {
        let dir = tempfile::tempdir().unwrap();
        let store = RecordStore::new(dir.path().join("missing/dir/tools.csv"), Duration::ZERO);
        let err = store.save(&[]).unwrap_err();
        assert!(matches!(err, StoreError::Io(_)));
    }

    #[test]
    fn categories_include_predefined_and_observed() {
        let mut record = ToolRecord {
            serial_number: 1,
            name: "Notion AI".to_string(),
            link: None,
            category: "  Productivity ".to_string(),
            pricing_type: None,
            unknown_pricing: None,
            subscription_cost: String::new(),
            uploaded_by: "Jane".to_string(),
            timestamp: None,
            purpose: "Summarizes meeting notes".to_string(),
        };
        let mut records = vec![record.clone()];
        record.category = "Chatbots".to_string();
        records.push(record.clone());
        record.category = "   ".to_string();
        records.push(record);

        let categories = all_categories(&records);
        assert!(PREDEFINED_CATEGORIES.iter().all(|c| categories.contains(*c)));
        assert!(categories.contains("Productivity"));
        assert!(!categories.contains(""));
        assert_eq!(categories.len(), PREDEFINED_CATEGORIES.len() + 1);
        let ordered: Vec<&String> = categories.iter().collect();
        let mut sorted = ordered.clone();
        sorted.sort();
        assert_eq!(ordered, sorted);
    }

    fn seeded_table(rows: u32) -> Vec<ToolRecord> {
        let added = chrono::NaiveDate::from_ymd_opt(2024, 1, 2)
            .and_then(|d| d.and_hms_opt(10, 0, 0));
        (1..=rows)
            .map(|n| ToolRecord {
                serial_number: n,
                name: format!("Seed {n}"),
                link: Some(format!("https://seed{n}.example.com")),
                category: "Analytics".to_string(),
                pricing_type: Some(PricingType::Free),
                unknown_pricing: None,
                subscription_cost: String::new(),
                uploaded_by: "Shamanth".to_string(),
                timestamp: added,
                purpose: "Tracks campaign performance".to_string(),
            })
            .collect()
    }

    fn add_numbered(store: &RecordStore, round: u32) -> ToolRecord {
        store
            .add_entry(new_tool(
                &format!("Tool {round}"),
                &format!("https://tool{round}.ai"),
                PricingType::Free,
                "",
            ))
            .unwrap()
    }

    #[test]
    fn readers_never_observe_a_partial_table() {
        let dir = tempfile::tempdir().unwrap();
        let store = RecordStore::new(dir.path().join("tools.csv"), Duration::ZERO);
        store.save(&seeded_table(2000)).unwrap();

        std::thread::scope(|scope| {
            let writer = scope.spawn(|| {
                for round in 0..20 {
                    add_numbered(&store, round);
                }
            });
            while !writer.is_finished() {
                let rows = store.try_load().unwrap().table.len();
                assert!(rows >= 2000, "read {rows} rows mid-save");
            }
        });

        let table = store.try_load().unwrap().table;
        assert_eq!(table.len(), 2020);
        let serials: BTreeSet<u32> = table.iter().map(|r| r.serial_number).collect();
        assert_eq!(serials.len(), 2020);
        // Only the tools file remains; temporaries are renamed or removed.
        assert_eq!(fs::read_dir(dir.path()).unwrap().count(), 1);
    }

    #[test]
    fn snapshot_racing_a_save_never_outlives_it() {
        let dir = tempfile::tempdir().unwrap();
        let store = store_in(&dir);
        store.save(&seeded_table(2000)).unwrap();

        std::thread::scope(|scope| {
            let writer = scope.spawn(|| {
                for round in 0..10 {
                    add_numbered(&store, round);
                }
            });
            while !writer.is_finished() {
                store.snapshot();
            }
        });

        let on_disk = store.try_load().unwrap().table;
        assert_eq!(on_disk.len(), 2010);
        assert_eq!(*store.snapshot().table, on_disk);
    }

    #[test]
    fn add_keeps_unrecognized_pricing_of_other_rows() {
        let dir = tempfile::tempdir().unwrap();
        let store = store_in(&dir);
        fs::write(
            store.path(),
            format!(
                "{}\n1,Tool,https://tool.ai,Chatbots,Lifetime Deal,$99,Sneha,2024-01-02 10:00:00,Answers customer chats\n",
                EXPECTED_COLUMNS.join(",")
            ),
        )
        .unwrap();

        store
            .add_entry(new_tool("Jasper", "https://jasper.ai", PricingType::Free, ""))
            .unwrap();

        let text = fs::read_to_string(store.path()).unwrap();
        assert!(text.contains("1,Tool,https://tool.ai,Chatbots,Lifetime Deal,$99,Sneha,"));
        let table = store.try_load().unwrap().table;
        let legacy = table.iter().find(|r| r.name == "Tool").unwrap();
        assert_eq!(legacy.unknown_pricing.as_deref(), Some("Lifetime Deal"));
    }

    #[test]
    fn add_fails_once_serial_numbers_run_out() {
        let dir = tempfile::tempdir().unwrap();
        let store = store_in(&dir);
        let mut table = seeded_table(1);
        table[0].serial_number = u32::MAX;
        store.save(&table).unwrap();
        let before = fs::read_to_string(store.path()).unwrap();

        let err = store
            .add_entry(new_tool("Jasper", "https://jasper.ai", PricingType::Free, ""))
            .unwrap_err();
        assert!(matches!(err, StoreError::SerialsExhausted));
        assert_eq!(fs::read_to_string(store.path()).unwrap(), before);
    }
}
