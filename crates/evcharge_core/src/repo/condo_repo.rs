//! Condo repository contract and SQLite implementation.
//!
//! # Responsibility
//! - Provide stable CRUD APIs over the `condos` table.
//! - Keep SQL details inside the core persistence boundary.
//!
//! # Invariants
//! - `list_all` is ordered by ascending id.
//! - `update` replaces every mutable column; it never patches.
//! - `delete` of an absent id is a no-op.

use crate::model::condo::{Condo, CondoId};
use crate::repo::{RepoError, RepoResult};
use log::debug;
use rusqlite::{params, Connection, OptionalExtension, Row};

const CONDO_SELECT_SQL: &str = "SELECT
    id,
    name,
    apartments_count,
    chargers_count,
    charger_type,
    state,
    energy_price
FROM condos";

/// Repository interface for condo persistence.
pub trait CondoRepository {
    /// Inserts a condo and returns the storage-assigned id.
    fn create(&self, condo: &Condo) -> RepoResult<CondoId>;
    fn get_by_id(&self, id: CondoId) -> RepoResult<Option<Condo>>;
    fn get_by_name(&self, name: &str) -> RepoResult<Option<Condo>>;
    fn list_all(&self) -> RepoResult<Vec<Condo>>;
    /// Replaces all fields of the condo identified by `condo.id`.
    fn update(&self, condo: &Condo) -> RepoResult<()>;
    fn delete(&self, id: CondoId) -> RepoResult<()>;
}

impl<R: CondoRepository + ?Sized> CondoRepository for &R {
    fn create(&self, condo: &Condo) -> RepoResult<CondoId> {
        (**self).create(condo)
    }

    fn get_by_id(&self, id: CondoId) -> RepoResult<Option<Condo>> {
        (**self).get_by_id(id)
    }

    fn get_by_name(&self, name: &str) -> RepoResult<Option<Condo>> {
        (**self).get_by_name(name)
    }

    fn list_all(&self) -> RepoResult<Vec<Condo>> {
        (**self).list_all()
    }

    fn update(&self, condo: &Condo) -> RepoResult<()> {
        (**self).update(condo)
    }

    fn delete(&self, id: CondoId) -> RepoResult<()> {
        (**self).delete(id)
    }
}

/// SQLite-backed condo repository.
pub struct SqliteCondoRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteCondoRepository<'conn> {
    pub fn new(conn: &'conn Connection) -> Self {
        Self { conn }
    }
}

impl CondoRepository for SqliteCondoRepository<'_> {
    fn create(&self, condo: &Condo) -> RepoResult<CondoId> {
        condo.validate()?;

        self.conn.execute(
            "INSERT INTO condos (
                name,
                apartments_count,
                chargers_count,
                charger_type,
                state,
                energy_price
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6);",
            params![
                condo.name.as_str(),
                condo.apartments_count,
                condo.chargers_count,
                condo.charger_type.as_str(),
                condo.state.as_str(),
                condo.energy_price,
            ],
        )?;

        let id = self.conn.last_insert_rowid();
        debug!("event=condo_create module=repo status=ok id={id}");
        Ok(id)
    }

    fn get_by_id(&self, id: CondoId) -> RepoResult<Option<Condo>> {
        let condo = self
            .conn
            .query_row(
                &format!("{CONDO_SELECT_SQL} WHERE id = ?1;"),
                [id],
                parse_condo_row,
            )
            .optional()?;
        Ok(condo)
    }

    fn get_by_name(&self, name: &str) -> RepoResult<Option<Condo>> {
        let condo = self
            .conn
            .query_row(
                &format!("{CONDO_SELECT_SQL} WHERE name = ?1 ORDER BY id ASC LIMIT 1;"),
                [name],
                parse_condo_row,
            )
            .optional()?;
        Ok(condo)
    }

    fn list_all(&self) -> RepoResult<Vec<Condo>> {
        let mut stmt = self
            .conn
            .prepare(&format!("{CONDO_SELECT_SQL} ORDER BY id ASC;"))?;
        let mut rows = stmt.query([])?;
        let mut condos = Vec::new();

        while let Some(row) = rows.next()? {
            condos.push(parse_condo_row(row)?);
        }

        Ok(condos)
    }

    fn update(&self, condo: &Condo) -> RepoResult<()> {
        let id = condo.id.ok_or(RepoError::MissingId("condo"))?;
        condo.validate()?;

        let changed = self.conn.execute(
            "UPDATE condos
             SET
                name = ?1,
                apartments_count = ?2,
                chargers_count = ?3,
                charger_type = ?4,
                state = ?5,
                energy_price = ?6
             WHERE id = ?7;",
            params![
                condo.name.as_str(),
                condo.apartments_count,
                condo.chargers_count,
                condo.charger_type.as_str(),
                condo.state.as_str(),
                condo.energy_price,
                id,
            ],
        )?;

        debug!("event=condo_update module=repo status=ok id={id} changed={changed}");
        Ok(())
    }

    fn delete(&self, id: CondoId) -> RepoResult<()> {
        let changed = self.conn.execute("DELETE FROM condos WHERE id = ?1;", [id])?;
        debug!("event=condo_delete module=repo status=ok id={id} changed={changed}");
        Ok(())
    }
}

fn parse_condo_row(row: &Row<'_>) -> rusqlite::Result<Condo> {
    Ok(Condo {
        id: Some(row.get("id")?),
        name: row.get("name")?,
        apartments_count: row.get("apartments_count")?,
        chargers_count: row.get("chargers_count")?,
        charger_type: row.get("charger_type")?,
        state: row.get("state")?,
        energy_price: row.get("energy_price")?,
    })
}
