use chrono::{FixedOffset, TimeZone, Utc};
use roster_core::db::open_db_in_memory;
use roster_core::{Address, AddressRepository, Person, PersonRepository, Region, RepoError};
use rusqlite::Connection;

fn john() -> Person {
    Person::new(
        "John",
        "Smith",
        FixedOffset::east_opt(-6 * 3600)
            .unwrap()
            .with_ymd_and_hms(1980, 11, 15, 15, 15, 0)
            .unwrap()
            .with_timezone(&Utc),
    )
}

fn beale_street() -> Address {
    let mut address = Address::new(
        "123 Beale St.",
        "Walla Walla",
        "WA",
        "90210",
        Region::West,
        "United States",
    );
    address.address2 = Some("Apt. 1A".to_string());
    address.county = Some("Fulton County".to_string());
    address
}

#[test]
fn saving_a_person_cascades_to_the_unsaved_home_address() {
    let conn = open_db_in_memory().unwrap();
    let repo = PersonRepository::new(&conn).unwrap();

    let mut person = john();
    person.home_address = Some(beale_street());
    repo.save(&mut person).unwrap();

    let address_id = person.home_address.as_ref().unwrap().id.unwrap();
    assert!(address_id > 0);
    assert_eq!(fk_column(&conn, person.id.unwrap(), "home_address"), Some(address_id));
}

#[test]
fn saving_a_person_cascades_to_the_unsaved_business_address() {
    let conn = open_db_in_memory().unwrap();
    let repo = PersonRepository::new(&conn).unwrap();

    let mut person = john();
    person.business_address = Some(beale_street());
    repo.save(&mut person).unwrap();

    let address_id = person.business_address.as_ref().unwrap().id.unwrap();
    assert!(address_id > 0);
    assert_eq!(fk_column(&conn, person.id.unwrap(), "biz_address"), Some(address_id));
}

#[test]
fn found_person_materializes_the_home_address() {
    let conn = open_db_in_memory().unwrap();
    let repo = PersonRepository::new(&conn).unwrap();

    let mut person = john();
    person.home_address = Some(beale_street());
    repo.save(&mut person).unwrap();

    let found = repo.find_by_id(person.id.unwrap()).unwrap().unwrap();
    let home = found.home_address.unwrap();
    assert_eq!(home.id, person.home_address.as_ref().unwrap().id);
    assert_eq!(home.street_address, "123 Beale St.");
    assert_eq!(home.state, "WA");
    assert_eq!(home.region, Region::West);
    assert!(found.business_address.is_none());
}

#[test]
fn found_person_materializes_the_business_address() {
    let conn = open_db_in_memory().unwrap();
    let repo = PersonRepository::new(&conn).unwrap();

    let mut person = john();
    person.business_address = Some(beale_street());
    repo.save(&mut person).unwrap();

    let found = repo.find_by_id(person.id.unwrap()).unwrap().unwrap();
    assert_eq!(
        found.business_address.as_ref().map(|a| a.state.as_str()),
        Some("WA")
    );
    assert!(found.home_address.is_none());
}

#[test]
fn absent_associations_stay_absent_through_a_round_trip() {
    let conn = open_db_in_memory().unwrap();
    let repo = PersonRepository::new(&conn).unwrap();

    let mut person = john();
    repo.save(&mut person).unwrap();

    assert_eq!(fk_column(&conn, person.id.unwrap(), "home_address"), None);

    let found = repo.find_by_id(person.id.unwrap()).unwrap().unwrap();
    assert!(found.home_address.is_none());
    assert!(found.business_address.is_none());
}

#[test]
fn already_saved_address_is_linked_without_a_second_insert() {
    let conn = open_db_in_memory().unwrap();
    let people = PersonRepository::new(&conn).unwrap();
    let addresses = AddressRepository::new(&conn).unwrap();

    let mut address = beale_street();
    addresses.save(&mut address).unwrap();
    let address_id = address.id.unwrap();

    let mut person = john();
    person.home_address = Some(address);
    people.save(&mut person).unwrap();

    assert_eq!(person.home_address.as_ref().unwrap().id, Some(address_id));
    let address_rows: i64 = conn
        .query_row("SELECT COUNT(*) FROM addresses;", [], |row| row.get(0))
        .unwrap();
    assert_eq!(address_rows, 1);
}

#[test]
fn address_repository_finds_cascaded_rows() {
    let conn = open_db_in_memory().unwrap();
    let people = PersonRepository::new(&conn).unwrap();
    let addresses = AddressRepository::new(&conn).unwrap();

    let mut person = john();
    person.home_address = Some(beale_street());
    people.save(&mut person).unwrap();

    let address_id = person.home_address.as_ref().unwrap().id.unwrap();
    let found = addresses.find_by_id(address_id).unwrap().unwrap();
    assert_eq!(found.city, "Walla Walla");
    assert_eq!(found.address2.as_deref(), Some("Apt. 1A"));
    assert_eq!(found.county.as_deref(), Some("Fulton County"));
}

#[test]
fn unknown_region_value_is_a_mapping_error() {
    let conn = open_db_in_memory().unwrap();
    let repo = PersonRepository::new(&conn).unwrap();

    let mut person = john();
    person.home_address = Some(beale_street());
    repo.save(&mut person).unwrap();

    conn.execute("UPDATE addresses SET region = 'equatorial';", [])
        .unwrap();

    let err = repo.find_by_id(person.id.unwrap()).unwrap_err();
    assert!(matches!(err, RepoError::InvalidData(message) if message.contains("equatorial")));
}

#[test]
fn malformed_salary_value_is_a_mapping_error() {
    let conn = open_db_in_memory().unwrap();
    let repo = PersonRepository::new(&conn).unwrap();

    let mut person = john();
    repo.save(&mut person).unwrap();

    conn.execute("UPDATE people SET salary = 'lots';", [])
        .unwrap();

    let err = repo.find_by_id(person.id.unwrap()).unwrap_err();
    assert!(matches!(err, RepoError::InvalidData(message) if message.contains("lots")));
}

#[test]
fn mapping_error_does_not_poison_later_operations() {
    let conn = open_db_in_memory().unwrap();
    let repo = PersonRepository::new(&conn).unwrap();

    let mut broken = john();
    repo.save(&mut broken).unwrap();
    conn.execute(
        "UPDATE people SET salary = 'lots' WHERE id = ?;",
        [broken.id.unwrap()],
    )
    .unwrap();

    let mut fine = john();
    repo.save(&mut fine).unwrap();

    assert!(repo.find_by_id(broken.id.unwrap()).is_err());
    let found = repo.find_by_id(fine.id.unwrap()).unwrap().unwrap();
    assert_eq!(found.id, fine.id);
}

fn fk_column(conn: &Connection, person_id: i64, column: &str) -> Option<i64> {
    conn.query_row(
        &format!("SELECT {column} FROM people WHERE id = ?;"),
        [person_id],
        |row| row.get(0),
    )
    .unwrap()
}
