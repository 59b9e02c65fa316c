//! Helpers for integration tests.
#![allow(dead_code)]

use std::io::{Seek, SeekFrom, Write};

use actix_multipart::form::tempfile::TempFile;
use chrono::NaiveTime;
use diesel_migrations::{EmbeddedMigrations, MigrationHarness, embed_migrations};
use pushkind_common::db::{DbPool, establish_connection_pool};
use pushkind_common::domain::auth::AuthenticatedUser;
use pushkind_marketplace::domain::store::{NewStore, Store};
use pushkind_marketplace::repository::{DieselRepository, StoreWriter};
use tempfile::NamedTempFile;

pub const MIGRATIONS: EmbeddedMigrations = embed_migrations!();

/// Temporary database used in integration tests.
pub struct TestDb {
    filename: String,
    pool: DbPool,
}

impl TestDb {
    pub fn new(filename: &str) -> Self {
        std::fs::remove_file(filename).ok(); // Clean up old DB

        let pool =
            establish_connection_pool(filename).expect("Failed to establish SQLite connection.");
        let mut conn = pool
            .get()
            .expect("Failed to get SQLite connection from pool.");
        conn.run_pending_migrations(MIGRATIONS)
            .expect("Migrations failed");
        TestDb {
            filename: filename.to_string(),
            pool,
        }
    }

    pub fn pool(&self) -> DbPool {
        self.pool.clone()
    }

    pub fn repository(&self) -> DieselRepository {
        DieselRepository::new(self.pool())
    }
}

impl Drop for TestDb {
    fn drop(&mut self) {
        std::fs::remove_file(&self.filename).ok();
        std::fs::remove_file(format!("{}-shm", &self.filename)).ok();
        std::fs::remove_file(format!("{}-wal", &self.filename)).ok();
    }
}

pub fn user(hub_id: i32, email: &str, roles: &[&str]) -> AuthenticatedUser {
    AuthenticatedUser {
        sub: email.into(),
        email: email.into(),
        hub_id,
        name: "Test User".into(),
        roles: roles.iter().map(|role| role.to_string()).collect(),
        exp: 0,
    }
}

/// Insert a store open from 9 to 21 owned by `owner_email`.
pub fn seed_store(repo: &DieselRepository, hub_id: i32, owner_email: &str, name: &str) -> Store {
    let new_store = NewStore::new(hub_id, owner_email, name, "1 Market Street")
        .with_location(12.97, 77.59)
        .with_hours(
            NaiveTime::from_hms_opt(9, 0, 0).expect("time"),
            NaiveTime::from_hms_opt(21, 0, 0).expect("time"),
        );
    repo.create_store(&new_store).expect("create store")
}

/// Multipart file part with the given name and content.
pub fn upload(name: &str, bytes: &[u8]) -> TempFile {
    let mut file = NamedTempFile::new().expect("temp file");
    file.write_all(bytes).expect("write upload");
    file.as_file_mut()
        .seek(SeekFrom::Start(0))
        .expect("rewind");

    TempFile {
        file,
        content_type: None,
        file_name: Some(name.to_string()),
        size: bytes.len(),
    }
}
