//! Durable tabular storage for accounts, the food catalog, and the meal
//! journal.
//!
//! Three relations live under one data directory:
//! - `accounts.json`: registered accounts, in registration order
//! - `foods.json`: normalized catalog names
//! - `meals.jsonl`: append-only journal, one JSON line per meal
//!
//! Uniqueness and referential constraints are enforced here, at the storage
//! boundary, so no caller can corrupt them even when the services above have
//! already validated. Table writes replace the whole file atomically (temp
//! file + rename) under an exclusive lock; journal appends hold an exclusive
//! lock for the duration of the single written line.

use crate::{Account, AccountSummary, Error, LogEntry, Result};
use chrono::{DateTime, Utc};
use fs2::FileExt;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::fs::{File, OpenOptions};
use std::io::{BufRead, BufReader, Read, Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;

/// Explicitly passed storage handle.
///
/// Holds only file paths, never cached rows: every operation reads or writes
/// the underlying files, so separate handles over the same directory always
/// observe each other's writes.
pub struct Store {
    accounts_path: PathBuf,
    foods_path: PathBuf,
    meals_path: PathBuf,
}

impl Store {
    /// Open a store rooted at `data_dir`, creating the directory if needed.
    pub fn open(data_dir: impl Into<PathBuf>) -> Result<Self> {
        let data_dir = data_dir.into();
        std::fs::create_dir_all(&data_dir)?;
        tracing::debug!("Opened store at {:?}", data_dir);
        Ok(Self {
            accounts_path: data_dir.join("accounts.json"),
            foods_path: data_dir.join("foods.json"),
            meals_path: data_dir.join("meals.jsonl"),
        })
    }

    // ========================================================================
    // accounts
    // ========================================================================

    /// Persist a new account; the e-mail is the primary key.
    pub fn insert_account(&mut self, account: &Account) -> Result<()> {
        let mut accounts = self.load_accounts()?;
        if accounts.iter().any(|a| a.email == account.email) {
            return Err(Error::DuplicateKey {
                table: "accounts",
                key: account.email.clone(),
            });
        }
        accounts.push(account.clone());
        write_table(&self.accounts_path, &accounts)?;
        tracing::debug!(email = %account.email, "account row persisted");
        Ok(())
    }

    /// Exact-match lookup by e-mail.
    pub fn find_account(&self, email: &str) -> Result<Option<Account>> {
        Ok(self.load_accounts()?.into_iter().find(|a| a.email == email))
    }

    /// All accounts as audit rows, in registration order.
    pub fn list_accounts(&self) -> Result<Vec<AccountSummary>> {
        Ok(self
            .load_accounts()?
            .into_iter()
            .map(|a| AccountSummary {
                email: a.email,
                diet: a.diet,
                bmi: a.bmi,
            })
            .collect())
    }

    fn load_accounts(&self) -> Result<Vec<Account>> {
        read_table(&self.accounts_path)
    }

    // ========================================================================
    // foods
    // ========================================================================

    /// Persist a catalog name. Callers pass the normalized form.
    pub fn insert_food(&mut self, name: &str) -> Result<()> {
        let mut foods = self.load_foods()?;
        if foods.iter().any(|f| f == name) {
            return Err(Error::DuplicateKey {
                table: "foods",
                key: name.to_string(),
            });
        }
        foods.push(name.to_string());
        write_table(&self.foods_path, &foods)?;
        tracing::debug!(food = %name, "catalog row persisted");
        Ok(())
    }

    /// Existence check against the catalog.
    pub fn food_exists(&self, name: &str) -> Result<bool> {
        Ok(self.load_foods()?.iter().any(|f| f == name))
    }

    /// Catalog names in insertion order.
    pub fn list_foods(&self) -> Result<Vec<String>> {
        self.load_foods()
    }

    fn load_foods(&self) -> Result<Vec<String>> {
        read_table(&self.foods_path)
    }

    // ========================================================================
    // meal journal
    // ========================================================================

    /// Append one meal to the journal, assigning the next id.
    ///
    /// Both references are re-checked here even though the services validate
    /// first, so a direct caller cannot write a dangling row.
    pub fn insert_meal(
        &mut self,
        email: &str,
        food: &str,
        grams: f64,
        logged_at: DateTime<Utc>,
    ) -> Result<LogEntry> {
        if self.find_account(email)?.is_none() {
            return Err(Error::ForeignKeyViolation {
                table: "accounts",
                key: email.to_string(),
            });
        }
        if !self.food_exists(food)? {
            return Err(Error::ForeignKeyViolation {
                table: "foods",
                key: food.to_string(),
            });
        }

        let id = self
            .all_meals()?
            .iter()
            .map(|e| e.id)
            .max()
            .unwrap_or(0)
            + 1;
        let entry = LogEntry {
            id,
            email: email.to_string(),
            food: food.to_string(),
            grams,
            logged_at,
        };
        append_journal_line(&self.meals_path, &entry)?;
        tracing::debug!(id = entry.id, email = %entry.email, "journal row appended");
        Ok(entry)
    }

    /// Journal entries for one account, in append order.
    pub fn meals_for(&self, email: &str) -> Result<Vec<LogEntry>> {
        Ok(self
            .all_meals()?
            .into_iter()
            .filter(|e| e.email == email)
            .collect())
    }

    /// The whole journal, in append order.
    pub fn all_meals(&self) -> Result<Vec<LogEntry>> {
        read_journal(&self.meals_path)
    }
}

/// Read a whole JSON table under a shared lock.
///
/// A missing file is an empty table. A file that exists but does not parse
/// is an error: tables are authoritative, so a corrupt one must surface
/// rather than be silently replaced by an empty table.
fn read_table<T: DeserializeOwned>(path: &Path) -> Result<Vec<T>> {
    if !path.exists() {
        return Ok(Vec::new());
    }

    let file = File::open(path)?;
    file.lock_shared()?;

    let mut contents = String::new();
    let mut reader = BufReader::new(&file);
    let read = reader.read_to_string(&mut contents);
    file.unlock()?;
    read?;

    Ok(serde_json::from_str(&contents)?)
}

/// Replace a whole JSON table atomically.
///
/// Writes to a unique temp file in the same directory, fsyncs, then renames
/// over the table, so a reader sees either the old rows or the new rows and
/// never a partial write.
fn write_table<T: Serialize>(path: &Path, rows: &[T]) -> Result<()> {
    let parent = path.parent().ok_or_else(|| {
        Error::Io(std::io::Error::new(
            std::io::ErrorKind::Other,
            "table path missing parent",
        ))
    })?;
    std::fs::create_dir_all(parent)?;

    let temp = NamedTempFile::new_in(parent)?;

    // Exclusive lock on the temp file serializes concurrent writers
    temp.as_file().lock_exclusive()?;

    {
        let mut writer = std::io::BufWriter::new(temp.as_file());
        let contents = serde_json::to_string(rows)?;
        writer.write_all(contents.as_bytes())?;
        writer.flush()?;
    }

    temp.as_file().sync_all()?;
    temp.as_file().unlock()?;

    temp.persist(path).map_err(|e| Error::Io(e.error))?;
    Ok(())
}

/// Append one entry to the JSONL journal under an exclusive lock.
fn append_journal_line(path: &Path, entry: &LogEntry) -> Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    let mut file = OpenOptions::new()
        .create(true)
        .read(true)
        .append(true)
        .open(path)?;
    file.lock_exclusive()?;

    // Heal a missing trailing newline (torn final append) so the new line
    // cannot be glued onto a partial one.
    let len = file.metadata()?.len();
    let needs_newline = if len == 0 {
        false
    } else {
        let mut last = [0u8; 1];
        file.seek(SeekFrom::End(-1))?;
        file.read_exact(&mut last)?;
        last[0] != b'\n'
    };

    let mut writer = std::io::BufWriter::new(&file);
    if needs_newline {
        writer.write_all(b"\n")?;
    }
    let line = serde_json::to_string(entry)?;
    writer.write_all(line.as_bytes())?;
    writer.write_all(b"\n")?;
    writer.flush()?;

    file.unlock()?;
    Ok(())
}

/// Read the whole journal under a shared lock.
///
/// A missing file is an empty journal. Unparseable lines (a torn tail line
/// after a crash mid-append) are skipped with a warning instead of failing
/// the read.
fn read_journal(path: &Path) -> Result<Vec<LogEntry>> {
    if !path.exists() {
        return Ok(Vec::new());
    }

    let file = File::open(path)?;
    file.lock_shared()?;

    let reader = BufReader::new(&file);
    let mut entries = Vec::new();

    for (line_num, line_result) in reader.lines().enumerate() {
        let line = line_result?;
        if line.trim().is_empty() {
            continue;
        }

        match serde_json::from_str::<LogEntry>(&line) {
            Ok(entry) => entries.push(entry),
            Err(e) => {
                tracing::warn!("Skipping malformed journal line {}: {}", line_num + 1, e);
            }
        }
    }

    file.unlock()?;
    Ok(entries)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{DietPlan, Sex};

    fn test_account(email: &str) -> Account {
        Account {
            email: email.into(),
            password: "pw".into(),
            weight_kg: 70.0,
            height_m: 1.75,
            sex: Sex::M,
            diet: DietPlan::Bulking,
            bmi: 22.86,
        }
    }

    fn open_store(dir: &tempfile::TempDir) -> Store {
        Store::open(dir.path()).unwrap()
    }

    #[test]
    fn test_insert_and_find_account() {
        let dir = tempfile::tempdir().unwrap();
        let mut store = open_store(&dir);

        store.insert_account(&test_account("a@b.com")).unwrap();

        let found = store.find_account("a@b.com").unwrap();
        assert!(found.is_some());
        assert_eq!(found.unwrap().bmi, 22.86);
        assert!(store.find_account("missing@b.com").unwrap().is_none());
    }

    #[test]
    fn test_account_email_lookup_is_exact() {
        let dir = tempfile::tempdir().unwrap();
        let mut store = open_store(&dir);

        store.insert_account(&test_account("A@b.com")).unwrap();
        assert!(store.find_account("a@b.com").unwrap().is_none());
        assert!(store.find_account("A@b.com").unwrap().is_some());
    }

    #[test]
    fn test_duplicate_account_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let mut store = open_store(&dir);

        store.insert_account(&test_account("a@b.com")).unwrap();
        let err = store.insert_account(&test_account("a@b.com")).unwrap_err();
        assert!(matches!(
            err,
            Error::DuplicateKey { table: "accounts", .. }
        ));

        // Still exactly one row
        assert_eq!(store.list_accounts().unwrap().len(), 1);
    }

    #[test]
    fn test_list_accounts_preserves_insertion_order() {
        let dir = tempfile::tempdir().unwrap();
        let mut store = open_store(&dir);

        for email in ["c@x.com", "a@x.com", "b@x.com"] {
            store.insert_account(&test_account(email)).unwrap();
        }

        let emails: Vec<String> = store
            .list_accounts()
            .unwrap()
            .into_iter()
            .map(|s| s.email)
            .collect();
        assert_eq!(emails, vec!["c@x.com", "a@x.com", "b@x.com"]);
    }

    #[test]
    fn test_insert_and_check_food() {
        let dir = tempfile::tempdir().unwrap();
        let mut store = open_store(&dir);

        store.insert_food("rice").unwrap();
        assert!(store.food_exists("rice").unwrap());
        assert!(!store.food_exists("beans").unwrap());

        let err = store.insert_food("rice").unwrap_err();
        assert!(matches!(err, Error::DuplicateKey { table: "foods", .. }));
    }

    #[test]
    fn test_insert_meal_assigns_increasing_ids() {
        let dir = tempfile::tempdir().unwrap();
        let mut store = open_store(&dir);

        store.insert_account(&test_account("a@b.com")).unwrap();
        store.insert_food("rice").unwrap();

        let first = store
            .insert_meal("a@b.com", "rice", 100.0, Utc::now())
            .unwrap();
        let second = store
            .insert_meal("a@b.com", "rice", 50.0, Utc::now())
            .unwrap();
        assert_eq!(first.id, 1);
        assert_eq!(second.id, 2);
        assert_eq!(store.all_meals().unwrap().len(), 2);
    }

    #[test]
    fn test_insert_meal_rejects_unknown_account() {
        let dir = tempfile::tempdir().unwrap();
        let mut store = open_store(&dir);

        store.insert_food("rice").unwrap();
        let err = store
            .insert_meal("ghost@b.com", "rice", 100.0, Utc::now())
            .unwrap_err();
        assert!(matches!(
            err,
            Error::ForeignKeyViolation { table: "accounts", .. }
        ));
        assert!(store.all_meals().unwrap().is_empty());
    }

    #[test]
    fn test_insert_meal_rejects_unknown_food() {
        let dir = tempfile::tempdir().unwrap();
        let mut store = open_store(&dir);

        store.insert_account(&test_account("a@b.com")).unwrap();
        let err = store
            .insert_meal("a@b.com", "rice", 100.0, Utc::now())
            .unwrap_err();
        assert!(matches!(
            err,
            Error::ForeignKeyViolation { table: "foods", .. }
        ));
        assert!(store.all_meals().unwrap().is_empty());
    }

    #[test]
    fn test_meals_for_filters_by_account() {
        let dir = tempfile::tempdir().unwrap();
        let mut store = open_store(&dir);

        store.insert_account(&test_account("a@b.com")).unwrap();
        store.insert_account(&test_account("b@b.com")).unwrap();
        store.insert_food("rice").unwrap();

        store
            .insert_meal("a@b.com", "rice", 100.0, Utc::now())
            .unwrap();
        store
            .insert_meal("b@b.com", "rice", 80.0, Utc::now())
            .unwrap();
        store
            .insert_meal("a@b.com", "rice", 60.0, Utc::now())
            .unwrap();

        let mine = store.meals_for("a@b.com").unwrap();
        assert_eq!(mine.len(), 2);
        assert!(mine.iter().all(|e| e.email == "a@b.com"));
    }

    #[test]
    fn test_table_write_leaves_no_temp_files() {
        let dir = tempfile::tempdir().unwrap();
        let mut store = open_store(&dir);

        store.insert_account(&test_account("a@b.com")).unwrap();
        store.insert_food("rice").unwrap();

        let extras: Vec<_> = std::fs::read_dir(dir.path())
            .unwrap()
            .filter_map(|e| e.ok())
            .map(|e| e.file_name().to_string_lossy().into_owned())
            .filter(|name| name != "accounts.json" && name != "foods.json")
            .collect();
        assert!(extras.is_empty(), "unexpected files: {:?}", extras);
    }

    #[test]
    fn test_journal_skips_torn_tail_line() {
        let dir = tempfile::tempdir().unwrap();
        let mut store = open_store(&dir);

        store.insert_account(&test_account("a@b.com")).unwrap();
        store.insert_food("rice").unwrap();
        store
            .insert_meal("a@b.com", "rice", 100.0, Utc::now())
            .unwrap();

        // Simulate a crash mid-append: partial line, no trailing newline
        let meals_path = dir.path().join("meals.jsonl");
        let mut contents = std::fs::read_to_string(&meals_path).unwrap();
        contents.push_str("{\"id\":2,\"email\":\"a@b.c");
        std::fs::write(&meals_path, contents).unwrap();

        let entries = store.all_meals().unwrap();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].id, 1);

        // The next insert gets a fresh id and lands on its own line rather
        // than being glued onto the torn fragment
        let next = store
            .insert_meal("a@b.com", "rice", 60.0, Utc::now())
            .unwrap();
        assert_eq!(next.id, 2);

        let ids: Vec<u64> = store.all_meals().unwrap().iter().map(|e| e.id).collect();
        assert_eq!(ids, vec![1, 2]);
    }

    #[test]
    fn test_corrupt_table_is_an_error_not_a_reset() {
        let dir = tempfile::tempdir().unwrap();
        let mut store = open_store(&dir);

        store.insert_account(&test_account("a@b.com")).unwrap();
        std::fs::write(dir.path().join("accounts.json"), "{ not json }").unwrap();

        assert!(matches!(
            store.find_account("a@b.com").unwrap_err(),
            Error::Json(_)
        ));
        // And no write path may run either, so the data is not clobbered
        assert!(store.insert_account(&test_account("b@b.com")).is_err());
    }

    #[test]
    fn test_missing_files_read_as_empty() {
        let dir = tempfile::tempdir().unwrap();
        let store = open_store(&dir);

        assert!(store.list_accounts().unwrap().is_empty());
        assert!(!store.food_exists("rice").unwrap());
        assert!(store.all_meals().unwrap().is_empty());
    }
}
