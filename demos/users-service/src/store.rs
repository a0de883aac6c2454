//! In-memory user store.

use indexmap::IndexMap;
use parking_lot::RwLock;
use serde_json::Number;

/// A stored user.
#[derive(Debug, Clone, PartialEq)]
pub struct User {
    /// Display name.
    pub name: String,
    /// Unique login.
    pub username: String,
    /// Password, as supplied.
    pub password: String,
    /// Address.
    pub address: Address,
    /// Age in years.
    pub age: Option<Number>,
    /// Call events, oldest first.
    pub call_events: Vec<CallEvent>,
}

/// A stored address.
#[derive(Debug, Clone, PartialEq)]
pub struct Address {
    /// First line.
    pub line1: String,
    /// Second line.
    pub line2: Option<String>,
    /// Whether `line1` is a street address.
    pub street: bool,
    /// Country code.
    pub country: String,
    /// Postal code.
    pub code: Number,
}

/// A recorded call.
#[derive(Debug, Clone, PartialEq)]
pub struct CallEvent {
    /// Start time, epoch milliseconds.
    pub time: Number,
    /// Duration in seconds.
    pub duration: Number,
}

/// Outcome of [`UserStore::upsert`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Upsert {
    /// The user did not exist.
    Created,
    /// An existing user was replaced; call events are kept.
    Updated,
}

/// Users keyed by username, in insertion order.
#[derive(Debug, Default)]
pub struct UserStore {
    users: RwLock<IndexMap<String, User>>,
}

impl UserStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts `user` unless the username is taken.
    pub fn create(&self, user: User) -> bool {
        let mut users = self.users.write();
        if users.contains_key(&user.username) {
            return false;
        }
        users.insert(user.username.clone(), user);
        true
    }

    /// Creates or replaces `user`.
    pub fn upsert(&self, mut user: User) -> (Upsert, User) {
        let mut users = self.users.write();
        match users.get_mut(&user.username) {
            Some(existing) => {
                user.call_events = std::mem::take(&mut existing.call_events);
                *existing = user.clone();
                (Upsert::Updated, user)
            }
            None => {
                users.insert(user.username.clone(), user.clone());
                (Upsert::Created, user)
            }
        }
    }

    /// A copy of one user.
    pub fn get(&self, username: &str) -> Option<User> {
        self.users.read().get(username).cloned()
    }

    /// Returns `true` if the username is taken.
    pub fn contains(&self, username: &str) -> bool {
        self.users.read().contains_key(username)
    }

    /// All users, or those of exactly `age` years.
    pub fn list(&self, age: Option<i64>) -> Vec<User> {
        self.users
            .read()
            .values()
            .filter(|user| age.map_or(true, |age| user.age.as_ref().and_then(Number::as_i64) == Some(age)))
            .cloned()
            .collect()
    }

    /// Appends a call event, returning the updated user.
    pub fn add_call_event(&self, username: &str, event: CallEvent) -> Option<User> {
        let mut users = self.users.write();
        let user = users.get_mut(username)?;
        user.call_events.push(event);
        Some(user.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn user(username: &str, age: Option<i64>) -> User {
        User {
            name: username.to_uppercase(),
            username: username.into(),
            password: "x".into(),
            address: Address {
                line1: "1 Rd".into(),
                line2: None,
                street: true,
                country: "US".into(),
                code: 1.into(),
            },
            age: age.map(Number::from),
            call_events: Vec::new(),
        }
    }

    #[test]
    fn test_create_rejects_taken_username() {
        let store = UserStore::new();
        assert!(store.create(user("ann", Some(30))));
        assert!(!store.create(user("ann", Some(31))));
        assert_eq!(store.get("ann").and_then(|u| u.age), Some(30.into()));
    }

    #[test]
    fn test_list_filters_by_age() {
        let store = UserStore::new();
        store.create(user("ann", Some(30)));
        store.create(user("bob", Some(40)));
        store.create(user("cid", None));
        assert_eq!(store.list(None).len(), 3);
        let thirty: Vec<_> = store.list(Some(30)).into_iter().map(|u| u.username).collect();
        assert_eq!(thirty, ["ann"]);
    }

    #[test]
    fn test_upsert_keeps_call_events() {
        let store = UserStore::new();
        store.create(user("ann", Some(30)));
        store.add_call_event(
            "ann",
            CallEvent {
                time: 1.into(),
                duration: 2.into(),
            },
        );
        let (outcome, updated) = store.upsert(user("ann", Some(31)));
        assert_eq!(outcome, Upsert::Updated);
        assert_eq!(updated.call_events.len(), 1);

        let (outcome, _) = store.upsert(user("bob", None));
        assert_eq!(outcome, Upsert::Created);
        assert!(store.contains("bob"));
    }

    #[test]
    fn test_add_call_event_to_missing_user() {
        let store = UserStore::new();
        let event = CallEvent {
            time: 1.into(),
            duration: 2.into(),
        };
        assert!(store.add_call_event("ann", event).is_none());
    }
}
