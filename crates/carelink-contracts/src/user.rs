//! User accounts and roles.
//!
//! A `User` is the identity record every other entity references by id.
//! Role-specific clinical data lives in the companion profile entities
//! (`PatientProfile`, `VolunteerProfile`); doctors carry their sequential
//! display code directly on the account.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// The three portal roles.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    Doctor,
    Patient,
    Volunteer,
}

impl Role {
    /// Display label used in messages and logs.
    pub fn label(self) -> &'static str {
        match self {
            Role::Doctor => "doctor",
            Role::Patient => "patient",
            Role::Volunteer => "volunteer",
        }
    }
}

/// A user account.
///
/// The password is stored in plaintext. This is a documented weakness of
/// the deployed portal, not a design goal; nothing in the store pretends
/// otherwise.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    pub id: Uuid,
    pub role: Role,
    /// Full display name.
    pub name: String,
    pub email: String,
    pub password: String,
    pub photo_url: Option<String>,
    pub phone: Option<String>,
    pub date_of_birth: Option<NaiveDate>,
    /// Sequential `DOC-` display code; present only for doctors created
    /// through the staff invite flow.
    pub doctor_code: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Fields supplied when creating a user.
///
/// The store assigns the id, timestamps, and (for doctors) the display code.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewUser {
    pub role: Role,
    pub name: String,
    pub email: String,
    pub password: String,
    pub photo_url: Option<String>,
    pub phone: Option<String>,
    pub date_of_birth: Option<NaiveDate>,
}

/// Partial update for a user record.
///
/// `None` fields are left untouched by the merge.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UserUpdate {
    pub name: Option<String>,
    pub email: Option<String>,
    pub password: Option<String>,
    pub photo_url: Option<String>,
    pub phone: Option<String>,
    pub date_of_birth: Option<NaiveDate>,
}

impl UserUpdate {
    /// Merge the supplied fields over `user`. Timestamps are the store's job.
    pub fn apply(self, user: &mut User) {
        if let Some(name) = self.name {
            user.name = name;
        }
        if let Some(email) = self.email {
            user.email = email;
        }
        if let Some(password) = self.password {
            user.password = password;
        }
        if let Some(photo_url) = self.photo_url {
            user.photo_url = Some(photo_url);
        }
        if let Some(phone) = self.phone {
            user.phone = Some(phone);
        }
        if let Some(dob) = self.date_of_birth {
            user.date_of_birth = Some(dob);
        }
    }
}
