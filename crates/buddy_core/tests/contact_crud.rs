use buddy_core::db::open_db_in_memory;
use buddy_core::{
    Contact, ContactDraft, ContactRepository, ContactService, ContactServiceError,
    ContactValidationError, Gender, RepoError, SqliteContactRepository,
};
use uuid::Uuid;

#[test]
fn create_and_get_roundtrip() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteContactRepository::new(&conn);

    let mut contact = Contact::new(7, "Ada", Gender::Female).born("1990-07-04");
    contact.phone = "555-0100".to_string();
    contact.email = Some("ada@example.com".to_string());
    let id = repo.create_contact(&contact).unwrap();

    let loaded = repo.get_contact(id).unwrap().unwrap();
    assert_eq!(loaded, contact);
}

#[test]
fn get_missing_contact_returns_none() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteContactRepository::new(&conn);

    assert!(repo.get_contact(Uuid::new_v4()).unwrap().is_none());
}

#[test]
fn create_rejects_invalid_contacts() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteContactRepository::new(&conn);

    let blank = Contact::new(1, "   ", Gender::Male);
    assert!(matches!(
        repo.create_contact(&blank),
        Err(RepoError::Validation(ContactValidationError::EmptyName))
    ));

    let impossible = Contact::new(1, "Bo", Gender::Male).born("1990-02-30");
    assert!(matches!(
        repo.create_contact(&impossible),
        Err(RepoError::Validation(ContactValidationError::InvalidBirthdate(_)))
    ));

    let mut bad_email = Contact::new(1, "Bo", Gender::Male);
    bad_email.email = Some("bo.example.com".to_string());
    assert!(matches!(
        repo.create_contact(&bad_email),
        Err(RepoError::Validation(ContactValidationError::InvalidEmail(_)))
    ));

    assert_eq!(repo.count_for_owner(1).unwrap(), 0);
}

#[test]
fn update_replaces_fields_but_keeps_owner() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteContactRepository::new(&conn);

    let mut contact = Contact::new(3, "Cy", Gender::Male).born("2001-03-30");
    repo.create_contact(&contact).unwrap();

    contact.name = "Cyrus".to_string();
    contact.birthdate = None;
    contact.owner_id = 99;
    repo.update_contact(&contact).unwrap();

    let loaded = repo.get_contact(contact.uuid).unwrap().unwrap();
    assert_eq!(loaded.name, "Cyrus");
    assert_eq!(loaded.birthdate, None);
    assert_eq!(loaded.owner_id, 3);
}

#[test]
fn update_and_delete_missing_contact_return_not_found() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteContactRepository::new(&conn);

    let ghost = Contact::new(1, "Ghost", Gender::Other);
    assert!(matches!(
        repo.update_contact(&ghost),
        Err(RepoError::NotFound(id)) if id == ghost.uuid
    ));
    assert!(matches!(
        repo.delete_contact(ghost.uuid),
        Err(RepoError::NotFound(id)) if id == ghost.uuid
    ));
}

#[test]
fn delete_removes_row() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteContactRepository::new(&conn);

    let contact = Contact::new(1, "Dee", Gender::Female);
    repo.create_contact(&contact).unwrap();
    repo.delete_contact(contact.uuid).unwrap();

    assert!(repo.get_contact(contact.uuid).unwrap().is_none());
    assert_eq!(repo.count_for_owner(1).unwrap(), 0);
}

#[test]
fn listing_is_owner_scoped_and_name_ordered() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteContactRepository::new(&conn);

    for name in ["zoe", "Bob", "alice"] {
        repo.create_contact(&Contact::new(1, name, Gender::Female))
            .unwrap();
    }
    repo.create_contact(&Contact::new(2, "Aaron", Gender::Male))
        .unwrap();

    let names: Vec<String> = repo
        .list_contacts_for_owner(1)
        .unwrap()
        .into_iter()
        .map(|contact| contact.name)
        .collect();
    assert_eq!(names, vec!["alice", "Bob", "zoe"]);
    assert_eq!(repo.count_for_owner(2).unwrap(), 1);
}

#[test]
fn birthdate_listing_skips_missing_and_empty_values() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteContactRepository::new(&conn);

    repo.create_contact(&Contact::new(1, "A", Gender::Male).born("1990-01-01"))
        .unwrap();
    repo.create_contact(&Contact::new(1, "B", Gender::Male).born(""))
        .unwrap();
    repo.create_contact(&Contact::new(1, "C", Gender::Male))
        .unwrap();

    let with_birthdate = repo.list_contacts_with_birthdate(1).unwrap();
    assert_eq!(with_birthdate.len(), 1);
    assert_eq!(with_birthdate[0].name, "A");
}

#[test]
fn search_matches_name_or_phone_and_escapes_wildcards() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteContactRepository::new(&conn);

    let mut ada = Contact::new(1, "Ada Lovelace", Gender::Female);
    ada.phone = "555-0100".to_string();
    let mut percent = Contact::new(1, "100% Bo", Gender::Male);
    percent.phone = "555-0200".to_string();
    repo.create_contact(&ada).unwrap();
    repo.create_contact(&percent).unwrap();

    assert_eq!(repo.search_contacts(1, "LOVE").unwrap().len(), 1);
    assert_eq!(repo.search_contacts(1, "0200").unwrap()[0].uuid, percent.uuid);
    assert_eq!(repo.search_contacts(1, "%").unwrap()[0].uuid, percent.uuid);
    assert_eq!(repo.search_contacts(1, "  ").unwrap().len(), 2);
    assert!(repo.search_contacts(2, "Ada").unwrap().is_empty());
}

#[test]
fn month_queries_read_the_month_segment() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteContactRepository::new(&conn);

    repo.create_contact(&Contact::new(1, "A", Gender::Male).born("1990-03-01"))
        .unwrap();
    repo.create_contact(&Contact::new(1, "B", Gender::Female).born("2004-03-31"))
        .unwrap();
    repo.create_contact(&Contact::new(1, "C", Gender::Female).born("1970-12-25"))
        .unwrap();

    assert_eq!(repo.count_by_month(1, 3).unwrap(), 2);
    assert_eq!(repo.count_by_month(1, 12).unwrap(), 1);
    assert_eq!(repo.count_by_month(1, 13).unwrap(), 0);
    assert_eq!(repo.count_by_month(1, 0).unwrap(), 0);
    assert_eq!(repo.list_contacts_by_month(1, 3).unwrap().len(), 2);
    assert!(repo.list_contacts_by_month(1, 7).unwrap().is_empty());
}

#[test]
fn legacy_malformed_birthdates_are_read_verbatim_and_not_counted() {
    let conn = open_db_in_memory().unwrap();
    conn.execute(
        "INSERT INTO buddies (uuid, owner_id, name, gender, dob, phone)
         VALUES (?1, 1, 'Legacy', 'Male', '07/04/1990', '');",
        [Uuid::new_v4().to_string()],
    )
    .unwrap();
    let repo = SqliteContactRepository::new(&conn);

    let listed = repo.list_contacts_for_owner(1).unwrap();
    assert_eq!(listed[0].birthdate.as_deref(), Some("07/04/1990"));
    assert_eq!(repo.count_by_month(1, 7).unwrap(), 0);
    assert_eq!(repo.count_by_month(1, 4).unwrap(), 0);
}

#[test]
fn corrupt_uuid_rows_surface_as_invalid_data() {
    let conn = open_db_in_memory().unwrap();
    conn.execute(
        "INSERT INTO buddies (uuid, owner_id, name, gender, phone)
         VALUES ('not-a-uuid', 1, 'Broken', 'Male', '');",
        [],
    )
    .unwrap();
    let repo = SqliteContactRepository::new(&conn);

    assert!(matches!(
        repo.list_contacts_for_owner(1),
        Err(RepoError::InvalidData(_))
    ));
}

#[test]
fn gender_counts_come_from_the_store() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteContactRepository::new(&conn);

    for gender in [Gender::Male, Gender::Male, Gender::Female, Gender::Other] {
        repo.create_contact(&Contact::new(1, "X", gender)).unwrap();
    }

    assert_eq!(repo.count_by_gender(1, Gender::Male).unwrap(), 2);
    assert_eq!(repo.count_by_gender(1, Gender::Female).unwrap(), 1);
    assert_eq!(repo.count_by_gender(1, Gender::Other).unwrap(), 1);
}

#[test]
fn service_normalizes_drafts_and_maps_not_found() {
    let conn = open_db_in_memory().unwrap();
    let service = ContactService::new(SqliteContactRepository::new(&conn));

    let mut draft = ContactDraft::new("  Eve  ", Gender::Female);
    draft.birthdate = Some("   ".to_string());
    draft.email = Some(String::new());
    draft.phone = " 555-0300 ".to_string();
    let created = service.add_contact(5, draft).unwrap();

    assert_eq!(created.name, "Eve");
    assert_eq!(created.birthdate, None);
    assert_eq!(created.email, None);
    assert_eq!(created.phone, "555-0300");
    assert_eq!(service.get_contact(created.uuid).unwrap(), Some(created.clone()));

    let mut edit = ContactDraft::new("Eve", Gender::Female);
    edit.birthdate = Some("1995-05-05".to_string());
    let updated = service.update_contact(created.uuid, edit).unwrap();
    assert_eq!(updated.birthdate.as_deref(), Some("1995-05-05"));
    assert_eq!(updated.owner_id, 5);

    service.delete_contact(created.uuid).unwrap();
    let missing = service.update_contact(created.uuid, ContactDraft::new("Eve", Gender::Female));
    assert!(matches!(
        missing,
        Err(ContactServiceError::ContactNotFound(id)) if id == created.uuid
    ));
    assert!(matches!(
        service.delete_contact(created.uuid),
        Err(ContactServiceError::ContactNotFound(_))
    ));
}

#[test]
fn service_rejects_invalid_drafts() {
    let conn = open_db_in_memory().unwrap();
    let service = ContactService::new(SqliteContactRepository::new(&conn));

    let mut draft = ContactDraft::new("Fay", Gender::Female);
    draft.birthdate = Some("1990-7-4".to_string());
    assert!(matches!(
        service.add_contact(1, draft),
        Err(ContactServiceError::Repo(RepoError::Validation(_)))
    ));
    assert!(service.list_contacts(1).unwrap().is_empty());
}
