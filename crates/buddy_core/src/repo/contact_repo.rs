//! Contact repository contracts and SQLite implementation.
//!
//! # Responsibility
//! - Provide CRUD APIs over the `buddies` table.
//! - Provide the read contract consumed by reports: owner listings,
//!   birthdate-only listings and pre-aggregated gender/month counts.
//!
//! # Invariants
//! - Write paths must call `Contact::validate()` before SQL mutations.
//! - Read paths reject unknown gender text or bad ids, but keep birthdate
//!   text verbatim so malformed legacy values are excluded downstream.
//! - Month matching in SQL is positional and agrees with
//!   `model::contact::birth_month`.

use crate::db::DbError;
use crate::model::contact::{Contact, ContactId, ContactValidationError, Gender, OwnerId};
use rusqlite::{params, Connection, Row};
use std::error::Error;
use std::fmt::{Display, Formatter};
use uuid::Uuid;

const CONTACT_SELECT_SQL: &str = "SELECT
    uuid,
    owner_id,
    name,
    gender,
    dob,
    phone,
    email
FROM buddies";

const CONTACT_ORDER_SQL: &str = " ORDER BY name COLLATE NOCASE ASC, uuid ASC";

/// Digit-shape guard shared by month filters.
const CANONICAL_DOB_GLOB: &str = "[0-9][0-9][0-9][0-9]-[0-9][0-9]-[0-9][0-9]";

pub type RepoResult<T> = Result<T, RepoError>;

/// Generic repository error for contact persistence and query operations.
#[derive(Debug)]
pub enum RepoError {
    Validation(ContactValidationError),
    Db(DbError),
    NotFound(ContactId),
    InvalidData(String),
}

impl Display for RepoError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Validation(err) => write!(f, "{err}"),
            Self::Db(err) => write!(f, "{err}"),
            Self::NotFound(id) => write!(f, "contact not found: {id}"),
            Self::InvalidData(message) => write!(f, "invalid persisted contact data: {message}"),
        }
    }
}

impl Error for RepoError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Validation(err) => Some(err),
            Self::Db(err) => Some(err),
            Self::NotFound(_) | Self::InvalidData(_) => None,
        }
    }
}

impl From<ContactValidationError> for RepoError {
    fn from(value: ContactValidationError) -> Self {
        Self::Validation(value)
    }
}

impl From<DbError> for RepoError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<rusqlite::Error> for RepoError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::Sqlite(value))
    }
}

/// Repository interface for buddy storage.
///
/// The write half backs `ContactService`; the read half is the narrow
/// contract reports consume.
pub trait ContactRepository {
    fn create_contact(&self, contact: &Contact) -> RepoResult<ContactId>;
    fn update_contact(&self, contact: &Contact) -> RepoResult<()>;
    fn delete_contact(&self, id: ContactId) -> RepoResult<()>;
    fn get_contact(&self, id: ContactId) -> RepoResult<Option<Contact>>;

    /// All contacts of one owner, ordered by name.
    fn list_contacts_for_owner(&self, owner: OwnerId) -> RepoResult<Vec<Contact>>;
    /// Contacts whose birthdate is non-null and non-empty, ordered by name.
    fn list_contacts_with_birthdate(&self, owner: OwnerId) -> RepoResult<Vec<Contact>>;
    /// Name or phone substring search, ordered by name.
    fn search_contacts(&self, owner: OwnerId, query: &str) -> RepoResult<Vec<Contact>>;
    /// Contacts born in `month` (1..=12), ordered by name.
    fn list_contacts_by_month(&self, owner: OwnerId, month: u32) -> RepoResult<Vec<Contact>>;

    fn count_for_owner(&self, owner: OwnerId) -> RepoResult<u32>;
    fn count_by_gender(&self, owner: OwnerId, gender: Gender) -> RepoResult<u32>;
    /// Count of contacts born in `month` (1..=12). Out-of-range months count 0.
    fn count_by_month(&self, owner: OwnerId, month: u32) -> RepoResult<u32>;
}

impl<T: ContactRepository + ?Sized> ContactRepository for &T {
    fn create_contact(&self, contact: &Contact) -> RepoResult<ContactId> {
        (**self).create_contact(contact)
    }

    fn update_contact(&self, contact: &Contact) -> RepoResult<()> {
        (**self).update_contact(contact)
    }

    fn delete_contact(&self, id: ContactId) -> RepoResult<()> {
        (**self).delete_contact(id)
    }

    fn get_contact(&self, id: ContactId) -> RepoResult<Option<Contact>> {
        (**self).get_contact(id)
    }

    fn list_contacts_for_owner(&self, owner: OwnerId) -> RepoResult<Vec<Contact>> {
        (**self).list_contacts_for_owner(owner)
    }

    fn list_contacts_with_birthdate(&self, owner: OwnerId) -> RepoResult<Vec<Contact>> {
        (**self).list_contacts_with_birthdate(owner)
    }

    fn search_contacts(&self, owner: OwnerId, query: &str) -> RepoResult<Vec<Contact>> {
        (**self).search_contacts(owner, query)
    }

    fn list_contacts_by_month(&self, owner: OwnerId, month: u32) -> RepoResult<Vec<Contact>> {
        (**self).list_contacts_by_month(owner, month)
    }

    fn count_for_owner(&self, owner: OwnerId) -> RepoResult<u32> {
        (**self).count_for_owner(owner)
    }

    fn count_by_gender(&self, owner: OwnerId, gender: Gender) -> RepoResult<u32> {
        (**self).count_by_gender(owner, gender)
    }

    fn count_by_month(&self, owner: OwnerId, month: u32) -> RepoResult<u32> {
        (**self).count_by_month(owner, month)
    }
}

/// SQLite-backed contact repository.
pub struct SqliteContactRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteContactRepository<'conn> {
    pub fn new(conn: &'conn Connection) -> Self {
        Self { conn }
    }

    fn query_contacts(
        &self,
        filter_sql: &str,
        params: impl rusqlite::Params,
    ) -> RepoResult<Vec<Contact>> {
        let sql = format!("{CONTACT_SELECT_SQL} WHERE {filter_sql}{CONTACT_ORDER_SQL};");
        let mut stmt = self.conn.prepare(&sql)?;
        let mut rows = stmt.query(params)?;
        let mut contacts = Vec::new();

        while let Some(row) = rows.next()? {
            contacts.push(parse_contact_row(row)?);
        }

        Ok(contacts)
    }

    fn count(&self, filter_sql: &str, params: impl rusqlite::Params) -> RepoResult<u32> {
        let sql = format!("SELECT COUNT(*) FROM buddies WHERE {filter_sql};");
        let count = self.conn.query_row(&sql, params, |row| row.get::<_, u32>(0))?;
        Ok(count)
    }
}

impl ContactRepository for SqliteContactRepository<'_> {
    fn create_contact(&self, contact: &Contact) -> RepoResult<ContactId> {
        contact.validate()?;

        self.conn.execute(
            "INSERT INTO buddies (
                uuid,
                owner_id,
                name,
                gender,
                dob,
                phone,
                email
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7);",
            params![
                contact.uuid.to_string(),
                contact.owner_id,
                contact.name.as_str(),
                contact.gender.as_str(),
                contact.birthdate.as_deref(),
                contact.phone.as_str(),
                contact.email.as_deref(),
            ],
        )?;

        Ok(contact.uuid)
    }

    fn update_contact(&self, contact: &Contact) -> RepoResult<()> {
        contact.validate()?;

        // Owner is immutable; it is deliberately absent from the SET list.
        let changed = self.conn.execute(
            "UPDATE buddies
             SET
                name = ?1,
                gender = ?2,
                dob = ?3,
                phone = ?4,
                email = ?5,
                updated_at = (strftime('%s', 'now') * 1000)
             WHERE uuid = ?6;",
            params![
                contact.name.as_str(),
                contact.gender.as_str(),
                contact.birthdate.as_deref(),
                contact.phone.as_str(),
                contact.email.as_deref(),
                contact.uuid.to_string(),
            ],
        )?;

        if changed == 0 {
            return Err(RepoError::NotFound(contact.uuid));
        }

        Ok(())
    }

    fn delete_contact(&self, id: ContactId) -> RepoResult<()> {
        let changed = self
            .conn
            .execute("DELETE FROM buddies WHERE uuid = ?1;", [id.to_string()])?;

        if changed == 0 {
            return Err(RepoError::NotFound(id));
        }

        Ok(())
    }

    fn get_contact(&self, id: ContactId) -> RepoResult<Option<Contact>> {
        let mut stmt = self
            .conn
            .prepare(&format!("{CONTACT_SELECT_SQL} WHERE uuid = ?1;"))?;

        let mut rows = stmt.query([id.to_string()])?;
        if let Some(row) = rows.next()? {
            return Ok(Some(parse_contact_row(row)?));
        }

        Ok(None)
    }

    fn list_contacts_for_owner(&self, owner: OwnerId) -> RepoResult<Vec<Contact>> {
        self.query_contacts("owner_id = ?1", params![owner])
    }

    fn list_contacts_with_birthdate(&self, owner: OwnerId) -> RepoResult<Vec<Contact>> {
        self.query_contacts(
            "owner_id = ?1 AND dob IS NOT NULL AND dob != ''",
            params![owner],
        )
    }

    fn search_contacts(&self, owner: OwnerId, query: &str) -> RepoResult<Vec<Contact>> {
        let trimmed = query.trim();
        if trimmed.is_empty() {
            return self.list_contacts_for_owner(owner);
        }

        let pattern = format!("%{}%", escape_like(trimmed));
        self.query_contacts(
            "owner_id = ?1 AND (name LIKE ?2 ESCAPE '\\' OR phone LIKE ?2 ESCAPE '\\')",
            params![owner, pattern],
        )
    }

    fn list_contacts_by_month(&self, owner: OwnerId, month: u32) -> RepoResult<Vec<Contact>> {
        if !(1..=12).contains(&month) {
            return Ok(Vec::new());
        }

        self.query_contacts(
            "owner_id = ?1 AND dob GLOB ?2 AND substr(dob, 6, 2) = ?3",
            params![owner, CANONICAL_DOB_GLOB, month_segment(month)],
        )
    }

    fn count_for_owner(&self, owner: OwnerId) -> RepoResult<u32> {
        self.count("owner_id = ?1", params![owner])
    }

    fn count_by_gender(&self, owner: OwnerId, gender: Gender) -> RepoResult<u32> {
        self.count(
            "owner_id = ?1 AND gender = ?2",
            params![owner, gender.as_str()],
        )
    }

    fn count_by_month(&self, owner: OwnerId, month: u32) -> RepoResult<u32> {
        if !(1..=12).contains(&month) {
            return Ok(0);
        }

        self.count(
            "owner_id = ?1 AND dob GLOB ?2 AND substr(dob, 6, 2) = ?3",
            params![owner, CANONICAL_DOB_GLOB, month_segment(month)],
        )
    }
}

fn parse_contact_row(row: &Row<'_>) -> RepoResult<Contact> {
    let uuid_text: String = row.get("uuid")?;
    let uuid = Uuid::parse_str(&uuid_text).map_err(|_| {
        RepoError::InvalidData(format!("invalid uuid value `{uuid_text}` in buddies.uuid"))
    })?;

    let gender_text: String = row.get("gender")?;
    let gender = Gender::parse(&gender_text).ok_or_else(|| {
        RepoError::InvalidData(format!(
            "invalid gender `{gender_text}` in buddies.gender"
        ))
    })?;

    Ok(Contact {
        uuid,
        owner_id: row.get("owner_id")?,
        name: row.get("name")?,
        gender,
        birthdate: row.get("dob")?,
        phone: row.get("phone")?,
        email: row.get("email")?,
    })
}

fn month_segment(month: u32) -> String {
    format!("{month:02}")
}

fn escape_like(raw: &str) -> String {
    let mut escaped = String::with_capacity(raw.len());
    for ch in raw.chars() {
        if matches!(ch, '%' | '_' | '\\') {
            escaped.push('\\');
        }
        escaped.push(ch);
    }
    escaped
}
