use evcharge_core::db::open_db_in_memory;
use evcharge_core::{
    Condo, CondoRepository, MemoryCondoRepository, MemoryUserRepository, SqliteCondoRepository,
    SqliteUserRepository, User, UserRepository, VehicleType,
};

fn check_condo_contract(repo: &impl CondoRepository) {
    let alpha = repo
        .create(&Condo::new("Alpha", 50, 2, "slow", "SP", 0.75))
        .unwrap();
    let beta = repo
        .create(&Condo::new("Beta", 20, 1, "fast", "MG", 0.9))
        .unwrap();
    assert!(alpha < beta);

    let err = repo
        .create(&Condo::new("Alpha", 1, 1, "slow", "SP", 0.1))
        .unwrap_err();
    assert_eq!(err.unique_target(), Some("condos.name"));

    let names: Vec<String> = repo
        .list_all()
        .unwrap()
        .into_iter()
        .map(|condo| condo.name)
        .collect();
    assert_eq!(names, vec!["Alpha", "Beta"]);

    let mut condo = repo.get_by_name("Beta").unwrap().unwrap();
    condo.energy_price = 1.25;
    repo.update(&condo).unwrap();
    assert_eq!(repo.get_by_id(beta).unwrap().unwrap().energy_price, 1.25);

    repo.delete(beta).unwrap();
    repo.delete(beta).unwrap();
    assert!(repo.get_by_id(beta).unwrap().is_none());
}

fn check_user_contract(repo: &impl UserRepository) {
    let ana = User::new("Ana", "12B", "Alpha", "34", VehicleType::Electric, "b3950a25");
    let id = repo.create(&ana).unwrap();
    assert_eq!(repo.get_by_id(id).unwrap().unwrap(), User { id: Some(id), ..ana.clone() });

    let err = repo.create(&ana).unwrap_err();
    assert_eq!(err.unique_target(), Some("users.rfid_code"));

    let bob = User::new("Bob", "1001", "Alpha", "56", VehicleType::Hybrid, "0fbb65a9");
    let bob_id = repo.create(&bob).unwrap();
    assert_eq!(repo.count_by_condo("Alpha").unwrap(), 2);

    repo.delete(bob_id).unwrap();
    assert_eq!(repo.count_by_condo("Alpha").unwrap(), 1);
    assert_eq!(repo.list_all().unwrap().len(), 1);
}

#[test]
fn sqlite_repositories_satisfy_contract() {
    let conn = open_db_in_memory().unwrap();
    check_condo_contract(&SqliteCondoRepository::new(&conn));

    // Users reference condos by name; a fresh store needs the condo first.
    let conn = open_db_in_memory().unwrap();
    SqliteCondoRepository::new(&conn)
        .create(&Condo::new("Alpha", 50, 2, "slow", "SP", 0.75))
        .unwrap();
    check_user_contract(&SqliteUserRepository::new(&conn));
}

#[test]
fn memory_repositories_satisfy_contract() {
    check_condo_contract(&MemoryCondoRepository::new());
    check_user_contract(&MemoryUserRepository::new());
}
