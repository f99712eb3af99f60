//! Direct messages and broadcast announcements.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::task::Priority;

/// One direct message between two users.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Message {
    pub id: Uuid,
    pub sender_id: Uuid,
    pub recipient_id: Uuid,
    pub content: String,
    /// Optional embedded image as a base64 data URL.
    pub image_data: Option<String>,
    /// Set when the recipient has seen the message.
    #[serde(default)]
    pub read: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Fields supplied when sending a message. `read` starts false.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewMessage {
    pub sender_id: Uuid,
    pub recipient_id: Uuid,
    pub content: String,
    pub image_data: Option<String>,
}

/// A doctor-authored broadcast visible to every role.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Announcement {
    pub id: Uuid,
    /// Authoring doctor's user id.
    pub author_id: Uuid,
    pub title: String,
    pub content: String,
    pub priority: Priority,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Fields supplied when posting an announcement.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewAnnouncement {
    pub author_id: Uuid,
    pub title: String,
    pub content: String,
    pub priority: Priority,
}

/// Partial update for an announcement. `None` fields are left untouched.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AnnouncementUpdate {
    pub title: Option<String>,
    pub content: Option<String>,
    pub priority: Option<Priority>,
}

impl AnnouncementUpdate {
    /// Merge the supplied fields over `announcement`.
    pub fn apply(self, announcement: &mut Announcement) {
        if let Some(title) = self.title {
            announcement.title = title;
        }
        if let Some(content) = self.content {
            announcement.content = content;
        }
        if let Some(priority) = self.priority {
            announcement.priority = priority;
        }
    }
}
