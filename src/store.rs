// SQLite-backed user registry.

use std::path::Path;

use rusqlite::{ffi, params, Connection, ErrorCode, OpenFlags};
use tracing::{debug, warn};

use crate::error::StoreError;

const CREATE_USERS_TABLE: &str = "
    CREATE TABLE IF NOT EXISTS users (
        id       INTEGER PRIMARY KEY,
        username VARCHAR(32) NOT NULL UNIQUE
    );";

/// A row of the `users` table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct User {
    pub id: i64,
    pub username: String,
}

/// Result of a registration attempt. A taken username is an expected
/// outcome, not a storage fault.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AddOutcome {
    Inserted,
    AlreadyExists,
}

impl AddOutcome {
    pub fn is_inserted(self) -> bool {
        matches!(self, AddOutcome::Inserted)
    }
}

/// Usernames are compared case-insensitively by storing and looking them up
/// in lowercase.
pub fn normalize_username(username: &str) -> String {
    username.to_lowercase()
}

/// Owns the single connection to the user database for the lifetime of a
/// run. Dropping the store closes the connection.
pub struct UserStore {
    conn: Connection,
}

impl UserStore {
    /// Open (or create) the database file at `path`.
    ///
    /// SQLite opens files lazily, so this also reads the schema once; an
    /// unreadable or corrupt file is reported here rather than on the first
    /// real query.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, StoreError> {
        Self::connect(path.as_ref(), |path| Connection::open(path))
    }

    /// Open an existing database file without write access. A missing file
    /// is an error instead of being created.
    pub fn open_read_only(path: impl AsRef<Path>) -> Result<Self, StoreError> {
        Self::connect(path.as_ref(), |path| {
            Connection::open_with_flags(
                path,
                OpenFlags::SQLITE_OPEN_READ_ONLY | OpenFlags::SQLITE_OPEN_NO_MUTEX,
            )
        })
    }

    fn connect<F>(path: &Path, open: F) -> Result<Self, StoreError>
    where
        F: FnOnce(&Path) -> rusqlite::Result<Connection>,
    {
        let connection_error = |source| StoreError::Connection {
            path: path.to_path_buf(),
            source,
        };

        let conn = open(path).map_err(connection_error)?;
        probe(&conn).map_err(connection_error)?;

        debug!(path = %path.display(), "opened user database");
        Ok(Self { conn })
    }

    /// Open an ephemeral database that disappears with the store.
    pub fn open_in_memory() -> Result<Self, StoreError> {
        let conn = Connection::open_in_memory().map_err(|source| StoreError::Connection {
            path: ":memory:".into(),
            source,
        })?;
        Ok(Self { conn })
    }

    /// Create the `users` table if it does not exist yet. Existing rows are
    /// left untouched, so this is safe to run on every start.
    pub fn ensure_schema(&self) -> Result<(), StoreError> {
        self.conn.execute_batch(CREATE_USERS_TABLE)?;
        Ok(())
    }

    /// Register `username`. Uniqueness is left to the table's UNIQUE
    /// constraint; a violation comes back as `AddOutcome::AlreadyExists`.
    pub fn add_user(&self, username: &str) -> Result<AddOutcome, StoreError> {
        let username = normalize_username(username);
        match self
            .conn
            .execute("INSERT INTO users (username) VALUES (?1)", params![username])
        {
            Ok(_) => {
                debug!(%username, "user registered");
                Ok(AddOutcome::Inserted)
            }
            Err(err) if is_unique_violation(&err) => {
                debug!(%username, "username already taken");
                Ok(AddOutcome::AlreadyExists)
            }
            Err(err) => {
                warn!(%username, error = %err, "failed to insert user");
                Err(err.into())
            }
        }
    }

    /// Whether a user with this name exists.
    pub fn check_user(&self, username: &str) -> Result<bool, StoreError> {
        let username = normalize_username(username);
        let exists = self.conn.query_row(
            "SELECT EXISTS(SELECT 1 FROM users WHERE username = ?1)",
            params![username],
            |row| row.get(0),
        )?;
        Ok(exists)
    }

    /// Names of all tables in the database.
    pub fn list_tables(&self) -> Result<Vec<String>, StoreError> {
        let mut stmt = self
            .conn
            .prepare("SELECT name FROM sqlite_master WHERE type = 'table'")?;
        let names = stmt
            .query_map([], |row| row.get(0))?
            .collect::<Result<Vec<String>, _>>()?;
        Ok(names)
    }

    /// Every registered user, oldest first.
    pub fn list_users(&self) -> Result<Vec<User>, StoreError> {
        let mut stmt = self
            .conn
            .prepare("SELECT id, username FROM users ORDER BY id")?;
        let users = stmt
            .query_map([], |row| {
                Ok(User {
                    id: row.get(0)?,
                    username: row.get(1)?,
                })
            })?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(users)
    }

    /// Close the connection, reporting any error SQLite raises while doing so.
    pub fn close(self) -> Result<(), StoreError> {
        self.conn.close().map_err(|(_, err)| StoreError::Query(err))
    }
}

fn probe(conn: &Connection) -> rusqlite::Result<()> {
    conn.query_row("SELECT count(*) FROM sqlite_master", [], |row| {
        row.get::<_, i64>(0)
    })?;
    Ok(())
}

fn is_unique_violation(err: &rusqlite::Error) -> bool {
    match err {
        rusqlite::Error::SqliteFailure(e, _) => {
            e.code == ErrorCode::ConstraintViolation
                && (e.extended_code == ffi::SQLITE_CONSTRAINT_UNIQUE
                    || e.extended_code == ffi::SQLITE_CONSTRAINT_PRIMARYKEY)
        }
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_store() -> UserStore {
        let store = UserStore::open_in_memory().expect("in-memory database should open");
        store.ensure_schema().unwrap();
        store
    }

    #[test]
    fn ensure_schema_creates_users_table() {
        let store = test_store();
        assert_eq!(store.list_tables().unwrap(), vec!["users".to_string()]);
    }

    #[test]
    fn duplicate_is_rejected_case_insensitively() {
        let store = test_store();
        assert_eq!(store.add_user("Foo").unwrap(), AddOutcome::Inserted);
        assert_eq!(store.add_user("foo").unwrap(), AddOutcome::AlreadyExists);
        assert_eq!(store.add_user("FOO").unwrap(), AddOutcome::AlreadyExists);
        assert_eq!(store.list_users().unwrap().len(), 1);
    }

    #[test]
    fn usernames_are_stored_lowercase() {
        let store = test_store();
        store.add_user("Alice").unwrap();
        let users = store.list_users().unwrap();
        assert_eq!(users[0].username, "alice");
    }

    #[test]
    fn check_user_matches_any_case() {
        let store = test_store();
        assert!(!store.check_user("alice").unwrap());
        store.add_user("alice").unwrap();
        assert!(store.check_user("Alice").unwrap());
        assert!(store.check_user("ALICE").unwrap());
        assert!(!store.check_user("bob").unwrap());
    }

    #[test]
    fn ids_are_assigned_in_insertion_order() {
        let store = test_store();
        store.add_user("a").unwrap();
        store.add_user("b").unwrap();
        store.add_user("a").unwrap();
        store.add_user("c").unwrap();

        let users = store.list_users().unwrap();
        let names: Vec<_> = users.iter().map(|u| u.username.as_str()).collect();
        assert_eq!(names, vec!["a", "b", "c"]);
        assert!(users.windows(2).all(|w| w[0].id < w[1].id));
    }

    #[test]
    fn missing_table_is_a_query_error_not_a_duplicate() {
        let store = UserStore::open_in_memory().unwrap();
        let err = store.add_user("alice").unwrap_err();
        assert!(matches!(err, StoreError::Query(_)));
        assert!(store.check_user("alice").is_err());
    }

    #[test]
    fn other_constraint_failures_are_not_duplicates() {
        let store = test_store();
        let err = store
            .conn
            .execute("INSERT INTO users (username) VALUES (NULL)", [])
            .unwrap_err();
        assert!(!is_unique_violation(&err));
    }

    #[test]
    fn normalize_lowercases_unicode() {
        assert_eq!(normalize_username("ÉLODIE"), "élodie");
        assert_eq!(normalize_username("bob"), "bob");
    }
}
