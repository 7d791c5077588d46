use evcharge_core::db::open_db_in_memory;
use evcharge_core::{
    Condo, CondoRepository, RepoError, SqliteCondoRepository, SqliteUserRepository, User,
    UserRepository, VehicleType,
};
use rusqlite::Connection;

fn setup() -> Connection {
    let conn = open_db_in_memory().unwrap();
    let condos = SqliteCondoRepository::new(&conn);
    condos
        .create(&Condo::new("Alpha", 50, 2, "slow", "SP", 0.75))
        .unwrap();
    condos
        .create(&Condo::new("Beta", 20, 1, "fast", "MG", 0.9))
        .unwrap();
    conn
}

fn ana() -> User {
    User::new("Ana", "12B", "Alpha", "34", VehicleType::Electric, "b3950a25")
}

#[test]
fn create_and_get_roundtrip() {
    let conn = setup();
    let repo = SqliteUserRepository::new(&conn);

    let mut user = ana();
    user.last_energy = Some(10.0);
    user.last_cost = Some(7.5);
    user.last_time_minutes = Some(30.0);
    let id = repo.create(&user).unwrap();

    let loaded = repo.get_by_id(id).unwrap().unwrap();
    assert_eq!(loaded, User { id: Some(id), ..user });
}

#[test]
fn duplicate_rfid_surfaces_as_constraint_violation() {
    let conn = setup();
    let repo = SqliteUserRepository::new(&conn);
    repo.create(&ana()).unwrap();

    let mut other = ana();
    other.name = "Bob".to_string();
    let err = repo.create(&other).unwrap_err();
    assert!(err.is_constraint_violation());
    assert_eq!(err.unique_target(), Some("users.rfid_code"));
}

#[test]
fn count_by_condo_tracks_references() {
    let conn = setup();
    let repo = SqliteUserRepository::new(&conn);
    let first = repo.create(&ana()).unwrap();
    let mut bob = User::new("Bob", "1001", "Alpha", "56", VehicleType::Hybrid, "0fbb65a9");
    repo.create(&bob).unwrap();
    bob.rfid_code = "deadbeef".to_string();
    bob.condo = "Beta".to_string();
    repo.create(&bob).unwrap();

    assert_eq!(repo.count_by_condo("Alpha").unwrap(), 2);
    assert_eq!(repo.count_by_condo("Beta").unwrap(), 1);
    assert_eq!(repo.count_by_condo("Gamma").unwrap(), 0);

    repo.delete(first).unwrap();
    assert_eq!(repo.count_by_condo("Alpha").unwrap(), 1);
}

#[test]
fn update_replaces_measurement_fields_wholesale() {
    let conn = setup();
    let repo = SqliteUserRepository::new(&conn);
    let mut user = ana();
    user.last_energy = Some(1.0);
    user.last_cost = Some(1.0);
    user.last_time_minutes = Some(1.0);
    let id = repo.create(&user).unwrap();

    let mut updated = repo.get_by_id(id).unwrap().unwrap();
    updated.last_cost = None;
    updated.vehicle_type = VehicleType::Hybrid;
    repo.update(&updated).unwrap();

    let loaded = repo.get_by_id(id).unwrap().unwrap();
    assert_eq!(loaded.last_energy, Some(1.0));
    assert_eq!(loaded.last_cost, None);
    assert_eq!(loaded.vehicle_type, VehicleType::Hybrid);
}

#[test]
fn list_all_and_get_by_name() {
    let conn = setup();
    let repo = SqliteUserRepository::new(&conn);
    let first = repo.create(&ana()).unwrap();
    let second = repo
        .create(&User::new(
            "Bob",
            "1001",
            "Beta",
            "56",
            VehicleType::Hybrid,
            "0fbb65a9",
        ))
        .unwrap();

    let ids: Vec<i64> = repo
        .list_all()
        .unwrap()
        .into_iter()
        .filter_map(|user| user.id)
        .collect();
    assert_eq!(ids, vec![first, second]);
    assert_eq!(repo.get_by_name("Bob").unwrap().unwrap().id, Some(second));
    assert!(repo.get_by_name("Carla").unwrap().is_none());
}

#[test]
fn non_canonical_vehicle_type_in_storage_is_rejected() {
    let conn = setup();
    let repo = SqliteUserRepository::new(&conn);
    let id = repo.create(&ana()).unwrap();
    conn.execute(
        "UPDATE users SET vehicle_type = 'diesel' WHERE id = ?1;",
        [id],
    )
    .unwrap();

    let err = repo.get_by_id(id).unwrap_err();
    assert!(matches!(err, RepoError::InvalidData(_)));
}

#[test]
fn update_without_id_fails() {
    let conn = setup();
    let repo = SqliteUserRepository::new(&conn);
    assert!(matches!(
        repo.update(&ana()),
        Err(RepoError::MissingId("user"))
    ));
}
