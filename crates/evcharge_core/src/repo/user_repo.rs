//! User repository contract and SQLite implementation.
//!
//! # Responsibility
//! - Provide stable CRUD APIs over the `users` table.
//! - Answer the per-condo occupancy count used by the condo delete guard.
//!
//! # Invariants
//! - `list_all` is ordered by ascending id.
//! - `update` replaces every mutable column, measurement fields included.
//! - Rows with a non-canonical `vehicle_type` are rejected, not masked.

use crate::model::user::{User, UserId, VehicleType};
use crate::repo::{RepoError, RepoResult};
use log::debug;
use rusqlite::{params, Connection, Row, ToSql};

const USER_SELECT_SQL: &str = "SELECT
    id,
    name,
    apartment,
    condo,
    plate_ending,
    vehicle_type,
    rfid_code,
    last_cost,
    last_energy,
    last_time_minutes
FROM users";

/// Repository interface for user persistence.
pub trait UserRepository {
    /// Inserts a user and returns the storage-assigned id.
    fn create(&self, user: &User) -> RepoResult<UserId>;
    fn get_by_id(&self, id: UserId) -> RepoResult<Option<User>>;
    fn get_by_name(&self, name: &str) -> RepoResult<Option<User>>;
    fn list_all(&self) -> RepoResult<Vec<User>>;
    /// Replaces all fields of the user identified by `user.id`.
    fn update(&self, user: &User) -> RepoResult<()>;
    fn delete(&self, id: UserId) -> RepoResult<()>;
    /// Counts users whose `condo` equals `condo_name`.
    fn count_by_condo(&self, condo_name: &str) -> RepoResult<u64>;
}

impl<R: UserRepository + ?Sized> UserRepository for &R {
    fn create(&self, user: &User) -> RepoResult<UserId> {
        (**self).create(user)
    }

    fn get_by_id(&self, id: UserId) -> RepoResult<Option<User>> {
        (**self).get_by_id(id)
    }

    fn get_by_name(&self, name: &str) -> RepoResult<Option<User>> {
        (**self).get_by_name(name)
    }

    fn list_all(&self) -> RepoResult<Vec<User>> {
        (**self).list_all()
    }

    fn update(&self, user: &User) -> RepoResult<()> {
        (**self).update(user)
    }

    fn delete(&self, id: UserId) -> RepoResult<()> {
        (**self).delete(id)
    }

    fn count_by_condo(&self, condo_name: &str) -> RepoResult<u64> {
        (**self).count_by_condo(condo_name)
    }
}

/// SQLite-backed user repository.
pub struct SqliteUserRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteUserRepository<'conn> {
    pub fn new(conn: &'conn Connection) -> Self {
        Self { conn }
    }

    fn query_users(&self, sql: &str, bind: &[&dyn ToSql]) -> RepoResult<Vec<User>> {
        let mut stmt = self.conn.prepare(sql)?;
        let mut rows = stmt.query(bind)?;
        let mut users = Vec::new();

        while let Some(row) = rows.next()? {
            users.push(parse_user_row(row)?);
        }

        Ok(users)
    }
}

impl UserRepository for SqliteUserRepository<'_> {
    fn create(&self, user: &User) -> RepoResult<UserId> {
        user.validate()?;

        self.conn.execute(
            "INSERT INTO users (
                name,
                apartment,
                condo,
                plate_ending,
                vehicle_type,
                rfid_code,
                last_cost,
                last_energy,
                last_time_minutes
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9);",
            params![
                user.name.as_str(),
                user.apartment.as_str(),
                user.condo.as_str(),
                user.plate_ending.as_str(),
                user.vehicle_type.as_str(),
                user.rfid_code.as_str(),
                user.last_cost,
                user.last_energy,
                user.last_time_minutes,
            ],
        )?;

        let id = self.conn.last_insert_rowid();
        debug!("event=user_create module=repo status=ok id={id}");
        Ok(id)
    }

    fn get_by_id(&self, id: UserId) -> RepoResult<Option<User>> {
        let users = self.query_users(&format!("{USER_SELECT_SQL} WHERE id = ?1;"), &[&id])?;
        Ok(users.into_iter().next())
    }

    fn get_by_name(&self, name: &str) -> RepoResult<Option<User>> {
        let users = self.query_users(
            &format!("{USER_SELECT_SQL} WHERE name = ?1 ORDER BY id ASC LIMIT 1;"),
            &[&name],
        )?;
        Ok(users.into_iter().next())
    }

    fn list_all(&self) -> RepoResult<Vec<User>> {
        self.query_users(&format!("{USER_SELECT_SQL} ORDER BY id ASC;"), &[])
    }

    fn update(&self, user: &User) -> RepoResult<()> {
        let id = user.id.ok_or(RepoError::MissingId("user"))?;
        user.validate()?;

        let changed = self.conn.execute(
            "UPDATE users
             SET
                name = ?1,
                apartment = ?2,
                condo = ?3,
                plate_ending = ?4,
                vehicle_type = ?5,
                rfid_code = ?6,
                last_cost = ?7,
                last_energy = ?8,
                last_time_minutes = ?9
             WHERE id = ?10;",
            params![
                user.name.as_str(),
                user.apartment.as_str(),
                user.condo.as_str(),
                user.plate_ending.as_str(),
                user.vehicle_type.as_str(),
                user.rfid_code.as_str(),
                user.last_cost,
                user.last_energy,
                user.last_time_minutes,
                id,
            ],
        )?;

        debug!("event=user_update module=repo status=ok id={id} changed={changed}");
        Ok(())
    }

    fn delete(&self, id: UserId) -> RepoResult<()> {
        let changed = self.conn.execute("DELETE FROM users WHERE id = ?1;", [id])?;
        debug!("event=user_delete module=repo status=ok id={id} changed={changed}");
        Ok(())
    }

    fn count_by_condo(&self, condo_name: &str) -> RepoResult<u64> {
        let count = self.conn.query_row(
            "SELECT COUNT(*) FROM users WHERE condo = ?1;",
            [condo_name],
            |row| row.get::<_, i64>(0),
        )?;
        u64::try_from(count)
            .map_err(|_| RepoError::InvalidData(format!("negative user count `{count}`")))
    }
}

fn parse_user_row(row: &Row<'_>) -> RepoResult<User> {
    let type_text: String = row.get("vehicle_type")?;
    let vehicle_type = parse_vehicle_type(&type_text).ok_or_else(|| {
        RepoError::InvalidData(format!(
            "invalid vehicle type `{type_text}` in users.vehicle_type"
        ))
    })?;

    Ok(User {
        id: Some(row.get("id")?),
        name: row.get("name")?,
        apartment: row.get("apartment")?,
        condo: row.get("condo")?,
        plate_ending: row.get("plate_ending")?,
        vehicle_type,
        rfid_code: row.get("rfid_code")?,
        last_energy: row.get("last_energy")?,
        last_cost: row.get("last_cost")?,
        last_time_minutes: row.get("last_time_minutes")?,
    })
}

fn parse_vehicle_type(value: &str) -> Option<VehicleType> {
    [VehicleType::Hybrid, VehicleType::Electric]
        .into_iter()
        .find(|kind| kind.as_str() == value)
}
