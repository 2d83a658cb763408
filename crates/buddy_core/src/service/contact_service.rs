//! Contact use-case service.
//!
//! # Responsibility
//! - Provide add/update/delete/get/list/search entry points for callers.
//! - Normalize form input (`ContactDraft`) before it reaches the repository.
//!
//! # Invariants
//! - Updates replace every mutable field at once; the owner never changes.
//! - Service APIs never bypass repository validation.

use crate::model::contact::{Contact, ContactId, Gender, OwnerId};
use crate::repo::contact_repo::{ContactRepository, RepoError};
use log::{error, info};
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Service error for contact use-cases.
#[derive(Debug)]
pub enum ContactServiceError {
    /// Target contact does not exist.
    ContactNotFound(ContactId),
    /// Persistence-layer failure, including validation.
    Repo(RepoError),
}

impl Display for ContactServiceError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::ContactNotFound(id) => write!(f, "contact not found: {id}"),
            Self::Repo(err) => write!(f, "{err}"),
        }
    }
}

impl Error for ContactServiceError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Repo(err) => Some(err),
            Self::ContactNotFound(_) => None,
        }
    }
}

impl From<RepoError> for ContactServiceError {
    fn from(value: RepoError) -> Self {
        match value {
            RepoError::NotFound(id) => Self::ContactNotFound(id),
            other => Self::Repo(other),
        }
    }
}

pub type ContactServiceResult<T> = Result<T, ContactServiceError>;

/// Mutable contact fields as entered in an add/update form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContactDraft {
    pub name: String,
    pub gender: Gender,
    pub birthdate: Option<String>,
    pub phone: String,
    pub email: Option<String>,
}

impl ContactDraft {
    pub fn new(name: impl Into<String>, gender: Gender) -> Self {
        Self {
            name: name.into(),
            gender,
            birthdate: None,
            phone: String::new(),
            email: None,
        }
    }

    fn apply_to(self, contact: &mut Contact) {
        contact.name = self.name.trim().to_string();
        contact.gender = self.gender;
        contact.birthdate = non_blank(self.birthdate);
        contact.phone = self.phone.trim().to_string();
        contact.email = non_blank(self.email);
    }
}

/// Contact service facade over repository implementations.
pub struct ContactService<R: ContactRepository> {
    repo: R,
}

impl<R: ContactRepository> ContactService<R> {
    pub fn new(repo: R) -> Self {
        Self { repo }
    }

    /// Creates a contact for `owner` and returns the stored record.
    pub fn add_contact(&self, owner: OwnerId, draft: ContactDraft) -> ContactServiceResult<Contact> {
        let mut contact = Contact::new(owner, String::new(), draft.gender);
        draft.apply_to(&mut contact);

        let result = self.repo.create_contact(&contact);
        log_write("create", contact.uuid, &result);
        result?;
        Ok(contact)
    }

    /// Replaces every mutable field of an existing contact.
    pub fn update_contact(
        &self,
        id: ContactId,
        draft: ContactDraft,
    ) -> ContactServiceResult<Contact> {
        let mut contact = self
            .repo
            .get_contact(id)?
            .ok_or(ContactServiceError::ContactNotFound(id))?;
        draft.apply_to(&mut contact);

        let result = self.repo.update_contact(&contact);
        log_write("update", id, &result);
        result?;
        Ok(contact)
    }

    pub fn delete_contact(&self, id: ContactId) -> ContactServiceResult<()> {
        let result = self.repo.delete_contact(id);
        log_write("delete", id, &result);
        Ok(result?)
    }

    pub fn get_contact(&self, id: ContactId) -> ContactServiceResult<Option<Contact>> {
        Ok(self.repo.get_contact(id)?)
    }

    /// Owner's contacts in name order.
    pub fn list_contacts(&self, owner: OwnerId) -> ContactServiceResult<Vec<Contact>> {
        Ok(self.repo.list_contacts_for_owner(owner)?)
    }

    /// Name/phone substring search; a blank query lists everything.
    pub fn search_contacts(
        &self,
        owner: OwnerId,
        query: &str,
    ) -> ContactServiceResult<Vec<Contact>> {
        Ok(self.repo.search_contacts(owner, query)?)
    }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|text| text.trim().to_string())
        .filter(|text| !text.is_empty())
}

fn log_write<T>(action: &str, id: ContactId, result: &Result<T, RepoError>) {
    match result {
        Ok(_) => info!(
            "event=contact_write module=service status=ok action={} contact_id={}",
            action, id
        ),
        Err(err) => error!(
            "event=contact_write module=service status=error action={} contact_id={} error={}",
            action, id, err
        ),
    }
}
