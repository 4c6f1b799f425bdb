//! SQLite-backed storage for cats.

mod schema;

use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

use anyhow::{anyhow, Context, Result};
use directories::ProjectDirs;
use rusqlite::types::Type;
use rusqlite::{named_params, Connection, OptionalExtension, Row};

use crate::models::{Cat, CatFilter, CreateCatInput, UpdateCatInput, STATUS_CONTENT};

const BUSY_TIMEOUT: Duration = Duration::from_secs(5);

const SELECT_CAT_BY_ID: &str = "SELECT id, name, age, status, temperment, photoUrls
     FROM cat
     WHERE id = :id";

const SELECT_CATS: &str = "SELECT id, name, age, status, temperment, photoUrls
     FROM cat
     WHERE (status = :status OR :status IS NULL)
       AND (name = :name OR :name IS NULL)
     ORDER BY id";

const INSERT_CAT: &str = "INSERT INTO cat (name, age, status, temperment, photoUrls)
     VALUES (:name, :age, :status, :temperment, :photoUrls)";

// Each optional column is only overwritten when its flag is bound true.
const UPDATE_CAT: &str = "UPDATE cat SET
         name = CASE WHEN :set_name THEN :name ELSE name END,
         age = CASE WHEN :set_age THEN :age ELSE age END,
         status = CASE WHEN :set_status THEN :status ELSE status END,
         temperment = CASE WHEN :set_temperment THEN :temperment ELSE temperment END,
         photoUrls = :photoUrls
     WHERE id = :id";

const UPDATE_CAT_STATUS: &str = "UPDATE cat SET status = :status WHERE id = :id";

const DELETE_CAT: &str = "DELETE FROM cat WHERE id = :id";

/// Handle to the cat database. Clones share one connection.
#[derive(Clone)]
pub struct Database {
    conn: Arc<Mutex<Connection>>,
}

impl Database {
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let conn = Connection::open(path)
            .with_context(|| format!("failed to open database at {}", path.display()))?;
        Self::from_connection(conn)
    }

    pub fn open_in_memory() -> Result<Self> {
        Self::from_connection(Connection::open_in_memory()?)
    }

    /// Open `catfarm.db` in the platform data directory, creating the
    /// directory if needed.
    pub fn open_default() -> Result<Self> {
        let path = Self::default_path()?;
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("failed to create {}", parent.display()))?;
        }

        tracing::info!(path = %path.display(), "Opening database");
        Self::open(&path)
    }

    pub fn default_path() -> Result<PathBuf> {
        let dirs = ProjectDirs::from("", "", "catfarm")
            .context("could not determine a data directory for catfarm")?;
        Ok(dirs.data_dir().join("catfarm.db"))
    }

    fn from_connection(conn: Connection) -> Result<Self> {
        conn.busy_timeout(BUSY_TIMEOUT)?;
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    fn lock(&self) -> Result<MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|_| anyhow!("database connection lock poisoned"))
    }

    /// Apply the schema. Safe to run on every start.
    pub fn migrate(&self) -> Result<()> {
        let conn = self.lock()?;
        conn.execute_batch(schema::SCHEMA)
            .context("failed to apply database schema")?;
        tracing::debug!("Database schema applied");
        Ok(())
    }

    // ─────────────────────────────────────────────────────────────────────
    // Cats
    // ─────────────────────────────────────────────────────────────────────

    /// Insert a cat and return its new id.
    pub fn create_cat(&self, input: &CreateCatInput) -> Result<i64> {
        let photo_urls = serde_json::to_string(&input.photo_urls)?;

        let conn = self.lock()?;
        conn.execute(
            INSERT_CAT,
            named_params! {
                ":name": input.name,
                ":age": input.age,
                ":status": input.status,
                ":temperment": input.temperment,
                ":photoUrls": photo_urls,
            },
        )?;

        Ok(conn.last_insert_rowid())
    }

    pub fn get_cat(&self, id: i64) -> Result<Option<Cat>> {
        let conn = self.lock()?;
        let cat = conn
            .query_row(SELECT_CAT_BY_ID, named_params! { ":id": id }, row_to_cat)
            .optional()?;
        Ok(cat)
    }

    /// List cats matching the filter. An unset filter field matches anything.
    pub fn list_cats(&self, filter: &CatFilter) -> Result<Vec<Cat>> {
        let conn = self.lock()?;
        let mut stmt = conn.prepare(SELECT_CATS)?;
        let cats = stmt
            .query_map(
                named_params! {
                    ":status": filter.status,
                    ":name": filter.name,
                },
                row_to_cat,
            )?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(cats)
    }

    /// Apply a patch. Returns false if no row was changed.
    pub fn update_cat(&self, id: i64, input: &UpdateCatInput) -> Result<bool> {
        let photo_urls = serde_json::to_string(&input.photo_urls)?;

        let conn = self.lock()?;
        let changed = conn.execute(
            UPDATE_CAT,
            named_params! {
                ":set_name": input.name.is_some(),
                ":name": input.name.as_deref(),
                ":set_age": input.age.is_some(),
                ":age": input.age.flatten(),
                ":set_status": input.status.is_some(),
                ":status": input.status.as_deref(),
                ":set_temperment": input.temperment.is_some(),
                ":temperment": input.temperment.as_ref().and_then(|t| t.as_deref()),
                ":photoUrls": photo_urls,
                ":id": id,
            },
        )?;

        Ok(changed > 0)
    }

    pub fn delete_cat(&self, id: i64) -> Result<bool> {
        let conn = self.lock()?;
        let changed = conn.execute(DELETE_CAT, named_params! { ":id": id })?;
        Ok(changed > 0)
    }

    /// Mark a cat as fed. Callers check the hungry precondition.
    pub fn feed_cat(&self, id: i64) -> Result<bool> {
        let conn = self.lock()?;
        let changed = conn.execute(
            UPDATE_CAT_STATUS,
            named_params! {
                ":status": STATUS_CONTENT,
                ":id": id,
            },
        )?;
        Ok(changed > 0)
    }
}

fn row_to_cat(row: &Row<'_>) -> rusqlite::Result<Cat> {
    let photo_urls = match row.get::<_, Option<String>>("photoUrls")? {
        Some(json) => serde_json::from_str(&json)
            .map_err(|e| rusqlite::Error::FromSqlConversionFailure(5, Type::Text, Box::new(e)))?,
        None => Vec::new(),
    };

    Ok(Cat {
        id: row.get("id")?,
        name: row.get("name")?,
        age: row.get("age")?,
        status: row.get("status")?,
        temperment: row.get("temperment")?,
        photo_urls,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::STATUS_HUNGRY;
    use tempfile::TempDir;

    fn test_db() -> Database {
        let db = Database::open_in_memory().unwrap();
        db.migrate().unwrap();
        db
    }

    fn new_cat(name: &str, status: &str) -> CreateCatInput {
        CreateCatInput {
            name: name.into(),
            status: status.into(),
            ..Default::default()
        }
    }

    #[test]
    fn migrate_is_idempotent() {
        let db = test_db();
        db.migrate().unwrap();
    }

    #[test]
    fn create_and_get_round_trip() {
        let db = test_db();
        let input = CreateCatInput {
            name: "Tom".into(),
            age: Some(4),
            status: STATUS_HUNGRY.into(),
            temperment: Some("grumpy".into()),
            photo_urls: vec!["a".into(), "b".into()],
        };

        let id = db.create_cat(&input).unwrap();
        let cat = db.get_cat(id).unwrap().unwrap();

        assert_eq!(cat.id, id);
        assert_eq!(cat.name, "Tom");
        assert_eq!(cat.age, Some(4));
        assert_eq!(cat.temperment.as_deref(), Some("grumpy"));
        assert_eq!(cat.photo_urls, vec!["a", "b"]);
    }

    #[test]
    fn get_missing_cat_returns_none() {
        let db = test_db();
        assert!(db.get_cat(42).unwrap().is_none());
    }

    #[test]
    fn photo_urls_are_stored_as_json_text() {
        let db = test_db();
        let mut input = new_cat("Tom", STATUS_HUNGRY);
        input.photo_urls = vec!["x".into()];
        let id = db.create_cat(&input).unwrap();

        let stored: String = db
            .lock()
            .unwrap()
            .query_row("SELECT photoUrls FROM cat WHERE id = ?1", [id], |row| row.get(0))
            .unwrap();
        assert_eq!(stored, r#"["x"]"#);
    }

    #[test]
    fn null_photo_urls_read_as_empty_list() {
        let db = test_db();
        db.lock()
            .unwrap()
            .execute(
                "INSERT INTO cat (name, status, photoUrls) VALUES ('Tom', 'hungry', NULL)",
                [],
            )
            .unwrap();

        let cats = db.list_cats(&CatFilter::default()).unwrap();
        assert_eq!(cats.len(), 1);
        assert!(cats[0].photo_urls.is_empty());
    }

    #[test]
    fn corrupt_photo_urls_is_an_error() {
        let db = test_db();
        db.lock()
            .unwrap()
            .execute(
                "INSERT INTO cat (name, status, photoUrls) VALUES ('Tom', 'hungry', 'not json')",
                [],
            )
            .unwrap();

        assert!(db.list_cats(&CatFilter::default()).is_err());
    }

    #[test]
    fn list_applies_only_set_filters() {
        let db = test_db();
        db.create_cat(&new_cat("tom", STATUS_HUNGRY)).unwrap();
        db.create_cat(&new_cat("felix", STATUS_HUNGRY)).unwrap();
        db.create_cat(&new_cat("tom", STATUS_CONTENT)).unwrap();

        let all = db.list_cats(&CatFilter::default()).unwrap();
        assert_eq!(all.len(), 3);
        assert!(all.windows(2).all(|w| w[0].id < w[1].id));

        let hungry = db
            .list_cats(&CatFilter {
                status: Some(STATUS_HUNGRY.into()),
                name: None,
            })
            .unwrap();
        assert_eq!(hungry.len(), 2);

        let hungry_tom = db
            .list_cats(&CatFilter {
                status: Some(STATUS_HUNGRY.into()),
                name: Some("tom".into()),
            })
            .unwrap();
        assert_eq!(hungry_tom.len(), 1);
        assert_eq!(hungry_tom[0].name, "tom");
    }

    #[test]
    fn update_writes_present_fields_and_resets_photo_urls() {
        let db = test_db();
        let mut input = new_cat("Tom", STATUS_HUNGRY);
        input.age = Some(2);
        input.temperment = Some("calm".into());
        input.photo_urls = vec!["a".into()];
        let id = db.create_cat(&input).unwrap();

        let patch = UpdateCatInput {
            name: Some("Thomas".into()),
            ..Default::default()
        };
        assert!(db.update_cat(id, &patch).unwrap());

        let cat = db.get_cat(id).unwrap().unwrap();
        assert_eq!(cat.name, "Thomas");
        assert_eq!(cat.age, Some(2));
        assert_eq!(cat.status, STATUS_HUNGRY);
        assert_eq!(cat.temperment.as_deref(), Some("calm"));
        assert!(cat.photo_urls.is_empty());
    }

    #[test]
    fn update_can_clear_nullable_fields() {
        let db = test_db();
        let mut input = new_cat("Tom", STATUS_HUNGRY);
        input.age = Some(2);
        input.temperment = Some("calm".into());
        let id = db.create_cat(&input).unwrap();

        let patch = UpdateCatInput {
            age: Some(None),
            temperment: Some(None),
            ..Default::default()
        };
        db.update_cat(id, &patch).unwrap();

        let cat = db.get_cat(id).unwrap().unwrap();
        assert_eq!(cat.age, None);
        assert_eq!(cat.temperment, None);
    }

    #[test]
    fn update_missing_cat_changes_nothing() {
        let db = test_db();
        assert!(!db.update_cat(7, &UpdateCatInput::default()).unwrap());
    }

    #[test]
    fn delete_removes_row_and_ids_are_not_reused() {
        let db = test_db();
        let first = db.create_cat(&new_cat("Tom", STATUS_HUNGRY)).unwrap();
        let second = db.create_cat(&new_cat("Felix", STATUS_HUNGRY)).unwrap();

        assert!(db.delete_cat(second).unwrap());
        assert!(db.get_cat(second).unwrap().is_none());
        assert!(!db.delete_cat(second).unwrap());

        let third = db.create_cat(&new_cat("Garfield", STATUS_HUNGRY)).unwrap();
        assert!(third > second);
        assert!(db.get_cat(first).unwrap().is_some());
    }

    #[test]
    fn feed_sets_status_to_content() {
        let db = test_db();
        let id = db.create_cat(&new_cat("Tom", STATUS_HUNGRY)).unwrap();

        assert!(db.feed_cat(id).unwrap());
        let cat = db.get_cat(id).unwrap().unwrap();
        assert_eq!(cat.status, STATUS_CONTENT);
        assert!(!cat.is_hungry());

        assert!(!db.feed_cat(id + 100).unwrap());
    }

    #[test]
    fn open_persists_to_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("cats.db");

        let id = {
            let db = Database::open(&path).unwrap();
            db.migrate().unwrap();
            db.create_cat(&new_cat("Tom", STATUS_HUNGRY)).unwrap()
        };

        let reopened = Database::open(&path).unwrap();
        reopened.migrate().unwrap();
        assert_eq!(reopened.get_cat(id).unwrap().unwrap().name, "Tom");
    }
}
