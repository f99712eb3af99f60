//! Direct messages and broadcast announcements.
//!
//! Conversation views sort ascending by send time (a chat transcript);
//! every other list sorts newest first like the rest of the store.

use chrono::Utc;
use tracing::{debug, info};
use uuid::Uuid;

use carelink_contracts::error::{StoreError, StoreResult};
use carelink_contracts::message::{
    Announcement, AnnouncementUpdate, Message, NewAnnouncement, NewMessage,
};

use crate::backend::keys;
use crate::store::{touch_after, RecordStore, State};
use crate::views::{AnnouncementView, MessageView};

impl RecordStore {
    // ── Messages ──────────────────────────────────────────────────────────────

    /// Send a direct message. Content may be empty only when an image is
    /// attached.
    pub fn send_message(&self, new: NewMessage) -> StoreResult<Message> {
        if new.content.trim().is_empty() && new.image_data.is_none() {
            return Err(StoreError::validation(
                "a message needs content or an image",
            ));
        }

        let mut state = self.lock();
        let now = Utc::now();
        let message = Message {
            id: Uuid::new_v4(),
            sender_id: new.sender_id,
            recipient_id: new.recipient_id,
            content: new.content,
            image_data: new.image_data,
            read: false,
            created_at: now,
            updated_at: now,
        };

        state.data.messages.push(message.clone());
        self.persist(keys::MESSAGES, &state.data.messages)?;

        debug!(
            message_id = %message.id,
            sender = %message.sender_id,
            recipient = %message.recipient_id,
            "message sent"
        );
        Ok(message)
    }

    /// The transcript between two users, joined, oldest first.
    pub fn conversation(&self, a: Uuid, b: Uuid) -> Vec<MessageView> {
        let state = self.lock();
        let mut messages: Vec<Message> = state
            .data
            .messages
            .iter()
            .filter(|m| {
                (m.sender_id == a && m.recipient_id == b)
                    || (m.sender_id == b && m.recipient_id == a)
            })
            .cloned()
            .collect();
        messages.sort_by(|x, y| x.created_at.cmp(&y.created_at));
        messages
            .into_iter()
            .map(|m| message_view(&state, m))
            .collect()
    }

    /// Everything sent to or by one user, joined, newest first.
    pub fn messages_for_user(&self, user_id: Uuid) -> Vec<MessageView> {
        let state = self.lock();
        let mut messages: Vec<Message> = state
            .data
            .messages
            .iter()
            .filter(|m| m.sender_id == user_id || m.recipient_id == user_id)
            .cloned()
            .collect();
        messages.sort_by(|x, y| y.created_at.cmp(&x.created_at));
        messages
            .into_iter()
            .map(|m| message_view(&state, m))
            .collect()
    }

    /// Unread messages addressed to `user_id`.
    pub fn unread_count(&self, user_id: Uuid) -> usize {
        self.lock()
            .data
            .messages
            .iter()
            .filter(|m| m.recipient_id == user_id && !m.read)
            .count()
    }

    /// Mark one message read.
    pub fn mark_message_read(&self, id: Uuid) -> StoreResult<Message> {
        let mut state = self.lock();
        let message = state
            .data
            .messages
            .iter_mut()
            .find(|m| m.id == id)
            .ok_or_else(|| StoreError::not_found("message", id))?;

        if !message.read {
            message.read = true;
            message.updated_at = touch_after(message.updated_at);
        }
        let message = message.clone();

        self.persist(keys::MESSAGES, &state.data.messages)?;
        Ok(message)
    }

    /// Mark everything `sender_id` sent to `recipient_id` as read. Returns
    /// how many messages changed.
    pub fn mark_conversation_read(
        &self,
        recipient_id: Uuid,
        sender_id: Uuid,
    ) -> StoreResult<usize> {
        let mut state = self.lock();
        let mut changed = 0;
        for message in state.data.messages.iter_mut() {
            if message.recipient_id == recipient_id
                && message.sender_id == sender_id
                && !message.read
            {
                message.read = true;
                message.updated_at = touch_after(message.updated_at);
                changed += 1;
            }
        }
        if changed > 0 {
            self.persist(keys::MESSAGES, &state.data.messages)?;
        }
        Ok(changed)
    }

    /// Hard delete.
    pub fn delete_message(&self, id: Uuid) -> StoreResult<()> {
        let mut state = self.lock();
        let before = state.data.messages.len();
        state.data.messages.retain(|m| m.id != id);
        if state.data.messages.len() == before {
            return Err(StoreError::not_found("message", id));
        }
        self.persist(keys::MESSAGES, &state.data.messages)
    }

    // ── Announcements ─────────────────────────────────────────────────────────

    /// Post a broadcast announcement.
    pub fn post_announcement(&self, new: NewAnnouncement) -> StoreResult<Announcement> {
        if new.title.trim().is_empty() {
            return Err(StoreError::validation("announcement title is required"));
        }

        let mut state = self.lock();
        let now = Utc::now();
        let announcement = Announcement {
            id: Uuid::new_v4(),
            author_id: new.author_id,
            title: new.title,
            content: new.content,
            priority: new.priority,
            created_at: now,
            updated_at: now,
        };

        state.data.announcements.push(announcement.clone());
        self.persist(keys::ANNOUNCEMENTS, &state.data.announcements)?;

        info!(announcement_id = %announcement.id, title = %announcement.title, "announcement posted");
        Ok(announcement)
    }

    /// Every announcement, joined with its author, newest first.
    pub fn list_announcements(&self) -> Vec<AnnouncementView> {
        let state = self.lock();
        let mut announcements = state.data.announcements.clone();
        announcements.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        announcements
            .into_iter()
            .map(|a| AnnouncementView {
                author: state.user_by_id(a.author_id),
                announcement: a,
            })
            .collect()
    }

    /// Merge `update` over the announcement.
    pub fn update_announcement(
        &self,
        id: Uuid,
        update: AnnouncementUpdate,
    ) -> StoreResult<Announcement> {
        let mut state = self.lock();
        let announcement = state
            .data
            .announcements
            .iter_mut()
            .find(|a| a.id == id)
            .ok_or_else(|| StoreError::not_found("announcement", id))?;

        let prev_updated = announcement.updated_at;
        update.apply(announcement);
        announcement.updated_at = touch_after(prev_updated);
        let announcement = announcement.clone();

        self.persist(keys::ANNOUNCEMENTS, &state.data.announcements)?;
        Ok(announcement)
    }

    /// Hard delete.
    pub fn delete_announcement(&self, id: Uuid) -> StoreResult<()> {
        let mut state = self.lock();
        let before = state.data.announcements.len();
        state.data.announcements.retain(|a| a.id != id);
        if state.data.announcements.len() == before {
            return Err(StoreError::not_found("announcement", id));
        }
        self.persist(keys::ANNOUNCEMENTS, &state.data.announcements)
    }
}

// ── Join helper ───────────────────────────────────────────────────────────────

fn message_view(state: &State, message: Message) -> MessageView {
    let sender = state.user_by_id(message.sender_id);
    let recipient = state.user_by_id(message.recipient_id);
    MessageView {
        message,
        sender,
        recipient,
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
