//! In-memory repository implementations.
//!
//! # Responsibility
//! - Satisfy the `CondoRepository` / `UserRepository` contracts without SQLite.
//! - Serve as test doubles for service-level tests.
//!
//! # Invariants
//! - Ids are assigned from a monotonic counter starting at 1 and never reused.
//! - Uniqueness (condo name, user RFID) is reported with the same
//!   constraint-violation error kind the SQLite store produces.
//! - Foreign keys are not emulated; the services own referential checks.

use crate::db::DbError;
use crate::model::condo::{Condo, CondoId};
use crate::model::user::{User, UserId};
use crate::repo::condo_repo::CondoRepository;
use crate::repo::user_repo::UserRepository;
use crate::repo::{RepoError, RepoResult};
use std::cell::RefCell;
use std::collections::BTreeMap;

#[derive(Debug)]
struct Table<T> {
    rows: BTreeMap<i64, T>,
    next_id: i64,
}

impl<T> Default for Table<T> {
    fn default() -> Self {
        Self {
            rows: BTreeMap::new(),
            next_id: 1,
        }
    }
}

impl<T> Table<T> {
    fn allocate_id(&mut self) -> i64 {
        let id = self.next_id;
        self.next_id += 1;
        id
    }
}

/// Condo repository backed by an ordered map.
#[derive(Debug, Default)]
pub struct MemoryCondoRepository {
    table: RefCell<Table<Condo>>,
}

impl MemoryCondoRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

impl CondoRepository for MemoryCondoRepository {
    fn create(&self, condo: &Condo) -> RepoResult<CondoId> {
        condo.validate()?;
        let mut table = self.table.borrow_mut();
        if table.rows.values().any(|row| row.name == condo.name) {
            return Err(DbError::unique_violation("condos", "name").into());
        }

        let id = table.allocate_id();
        let mut stored = condo.clone();
        stored.id = Some(id);
        table.rows.insert(id, stored);
        Ok(id)
    }

    fn get_by_id(&self, id: CondoId) -> RepoResult<Option<Condo>> {
        Ok(self.table.borrow().rows.get(&id).cloned())
    }

    fn get_by_name(&self, name: &str) -> RepoResult<Option<Condo>> {
        Ok(self
            .table
            .borrow()
            .rows
            .values()
            .find(|row| row.name == name)
            .cloned())
    }

    fn list_all(&self) -> RepoResult<Vec<Condo>> {
        Ok(self.table.borrow().rows.values().cloned().collect())
    }

    fn update(&self, condo: &Condo) -> RepoResult<()> {
        let id = condo.id.ok_or(RepoError::MissingId("condo"))?;
        condo.validate()?;
        let mut table = self.table.borrow_mut();
        if table
            .rows
            .iter()
            .any(|(row_id, row)| *row_id != id && row.name == condo.name)
        {
            return Err(DbError::unique_violation("condos", "name").into());
        }

        if let Some(row) = table.rows.get_mut(&id) {
            *row = condo.clone();
        }
        Ok(())
    }

    fn delete(&self, id: CondoId) -> RepoResult<()> {
        self.table.borrow_mut().rows.remove(&id);
        Ok(())
    }
}

/// User repository backed by an ordered map.
#[derive(Debug, Default)]
pub struct MemoryUserRepository {
    table: RefCell<Table<User>>,
}

impl MemoryUserRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

impl UserRepository for MemoryUserRepository {
    fn create(&self, user: &User) -> RepoResult<UserId> {
        user.validate()?;
        let mut table = self.table.borrow_mut();
        if table.rows.values().any(|row| row.rfid_code == user.rfid_code) {
            return Err(DbError::unique_violation("users", "rfid_code").into());
        }

        let id = table.allocate_id();
        let mut stored = user.clone();
        stored.id = Some(id);
        table.rows.insert(id, stored);
        Ok(id)
    }

    fn get_by_id(&self, id: UserId) -> RepoResult<Option<User>> {
        Ok(self.table.borrow().rows.get(&id).cloned())
    }

    fn get_by_name(&self, name: &str) -> RepoResult<Option<User>> {
        Ok(self
            .table
            .borrow()
            .rows
            .values()
            .find(|row| row.name == name)
            .cloned())
    }

    fn list_all(&self) -> RepoResult<Vec<User>> {
        Ok(self.table.borrow().rows.values().cloned().collect())
    }

    fn update(&self, user: &User) -> RepoResult<()> {
        let id = user.id.ok_or(RepoError::MissingId("user"))?;
        user.validate()?;
        let mut table = self.table.borrow_mut();
        if table
            .rows
            .iter()
            .any(|(row_id, row)| *row_id != id && row.rfid_code == user.rfid_code)
        {
            return Err(DbError::unique_violation("users", "rfid_code").into());
        }

        if let Some(row) = table.rows.get_mut(&id) {
            *row = user.clone();
        }
        Ok(())
    }

    fn delete(&self, id: UserId) -> RepoResult<()> {
        self.table.borrow_mut().rows.remove(&id);
        Ok(())
    }

    fn count_by_condo(&self, condo_name: &str) -> RepoResult<u64> {
        let count = self
            .table
            .borrow()
            .rows
            .values()
            .filter(|row| row.condo == condo_name)
            .count();
        Ok(count as u64)
    }
}
