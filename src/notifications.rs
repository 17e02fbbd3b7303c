//! Notifications

use std::collections::VecDeque;

use jiff::{SignedDuration, Timestamp};
use slotmap::{SlotMap, new_key_type};
use smallvec::SmallVec;

use crate::profile::UserId;

new_key_type! {
    /// Notification Key
    pub struct NotificationKey;
}

/// A short-lived message for one user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    /// Who the message is for
    pub recipient: UserId,

    /// Message text
    pub message: String,

    /// When it was raised
    pub created_at: Timestamp,

    /// When it disappears on its own
    pub expires_at: Timestamp,
}

/// Live notifications, newest first.
///
/// Keys are generational: once a notification is gone, its key never matches
/// anything again, so a late expiry can't remove a newer entry.
#[derive(Debug, Clone)]
pub struct NotificationQueue {
    entries: SlotMap<NotificationKey, Notification>,
    order: VecDeque<NotificationKey>,
    ttl: SignedDuration,
}

impl NotificationQueue {
    /// Create an empty queue whose entries live for `ttl`.
    pub fn new(ttl: SignedDuration) -> Self {
        Self {
            entries: SlotMap::with_key(),
            order: VecDeque::new(),
            ttl,
        }
    }

    /// Raise a notification at `now`.
    ///
    /// # Errors
    ///
    /// Returns a [`jiff::Error`] if the expiry time is out of range.
    pub fn push(
        &mut self,
        recipient: UserId,
        message: impl Into<String>,
        now: Timestamp,
    ) -> Result<NotificationKey, jiff::Error> {
        let expires_at = self.expiry(now)?;

        Ok(self.insert(recipient, message, now, expires_at))
    }

    /// When a notification raised at `now` would expire.
    ///
    /// # Errors
    ///
    /// Returns a [`jiff::Error`] if that is out of range.
    pub fn expiry(&self, now: Timestamp) -> Result<Timestamp, jiff::Error> {
        now.checked_add(self.ttl)
    }

    /// Raise a notification with an expiry worked out beforehand by
    /// [`NotificationQueue::expiry`].
    pub fn insert(
        &mut self,
        recipient: UserId,
        message: impl Into<String>,
        created_at: Timestamp,
        expires_at: Timestamp,
    ) -> NotificationKey {
        let key = self.entries.insert(Notification {
            recipient,
            message: message.into(),
            created_at,
            expires_at,
        });

        self.order.push_front(key);

        key
    }

    /// Remove one notification. Unknown or stale keys are ignored.
    pub fn dismiss(&mut self, key: NotificationKey) -> Option<Notification> {
        let removed = self.entries.remove(key)?;
        self.order.retain(|k| *k != key);
        Some(removed)
    }

    /// Remove everything due at `now`, returning the removed keys.
    pub fn expire(&mut self, now: Timestamp) -> SmallVec<[NotificationKey; 4]> {
        let due: SmallVec<[NotificationKey; 4]> = self
            .entries
            .iter()
            .filter(|(_, n)| n.expires_at <= now)
            .map(|(key, _)| key)
            .collect();

        for key in &due {
            self.dismiss(*key);
        }

        due
    }

    /// Look up a notification.
    pub fn get(&self, key: NotificationKey) -> Option<&Notification> {
        self.entries.get(key)
    }

    /// Whether `key` is still live.
    pub fn contains(&self, key: NotificationKey) -> bool {
        self.entries.contains_key(key)
    }

    /// All live notifications, newest first.
    pub fn iter(&self) -> impl Iterator<Item = (NotificationKey, &Notification)> {
        self.order
            .iter()
            .filter_map(|key| self.entries.get(*key).map(|n| (*key, n)))
    }

    /// Live notifications for one user, newest first.
    pub fn for_recipient(
        &self,
        recipient: UserId,
    ) -> impl Iterator<Item = (NotificationKey, &Notification)> {
        self.iter().filter(move |(_, n)| n.recipient == recipient)
    }

    /// Keys of every live notification.
    pub fn keys(&self) -> impl Iterator<Item = NotificationKey> + '_ {
        self.entries.keys()
    }

    /// Number of live notifications.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Check if there are no live notifications.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// How long each notification lives.
    pub fn ttl(&self) -> SignedDuration {
        self.ttl
    }
}
