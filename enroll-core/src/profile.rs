//! Registration profiles
//!
//! A profile ties an inactive user to the activation key mailed to them. Each
//! registered user has exactly one profile.
use crate::{
    User, UserId,
    crypto::generate_activation_key,
    id::{generate_prefixed_id, validate_prefixed_id},
    user::NewUser,
};
use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Hash)]
pub struct ProfileId(String);

impl ProfileId {
    pub fn new(id: &str) -> Self {
        ProfileId(id.to_string())
    }

    pub fn new_random() -> Self {
        ProfileId(generate_prefixed_id("rpf"))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_valid(&self) -> bool {
        validate_prefixed_id(&self.0, "rpf")
    }
}

impl Default for ProfileId {
    fn default() -> Self {
        Self::new_random()
    }
}

impl From<String> for ProfileId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl std::fmt::Display for ProfileId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegistrationProfile {
    pub id: ProfileId,
    pub user_id: UserId,
    pub activation_key: String,
    pub created_at: DateTime<Utc>,
    pub activated_at: Option<DateTime<Utc>>,
}

impl RegistrationProfile {
    pub fn is_activated(&self) -> bool {
        self.activated_at.is_some()
    }

    /// Whether the key can no longer be used to activate `user`.
    ///
    /// A key expires `expiration_days` after the user joined. Used keys count as expired.
    pub fn activation_key_expired(&self, user: &User, expiration_days: i64) -> bool {
        self.is_activated()
            || user.date_joined + Duration::days(expiration_days) <= Utc::now()
    }
}

/// A profile about to be inserted into storage
#[derive(Debug, Clone)]
pub struct NewRegistrationProfile {
    pub id: ProfileId,
    pub user_id: UserId,
    pub activation_key: String,
}

impl NewRegistrationProfile {
    /// A profile for `user` with a freshly generated activation key
    pub fn for_user(user: &User) -> Self {
        Self::with_key(&user.id, &user.username)
    }

    /// Same as [`for_user`](Self::for_user), for a user that has not been stored yet
    pub fn for_new_user(user: &NewUser) -> Self {
        Self::with_key(&user.id, &user.username)
    }

    fn with_key(user_id: &UserId, username: &str) -> Self {
        Self {
            id: ProfileId::new_random(),
            user_id: user_id.clone(),
            activation_key: generate_activation_key(username),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crypto::is_activation_key;

    fn user(joined: DateTime<Utc>) -> User {
        User::builder()
            .username("alice".to_string())
            .email("alice@example.com".to_string())
            .date_joined(joined)
            .build()
            .unwrap()
    }

    fn profile(user: &User) -> RegistrationProfile {
        let new = NewRegistrationProfile::for_user(user);
        RegistrationProfile {
            id: new.id,
            user_id: new.user_id,
            activation_key: new.activation_key,
            created_at: user.date_joined,
            activated_at: None,
        }
    }

    #[test]
    fn test_new_profile_for_user() {
        let user = user(Utc::now());
        let new = NewRegistrationProfile::for_user(&user);

        assert_eq!(new.user_id, user.id);
        assert!(new.id.is_valid());
        assert!(is_activation_key(&new.activation_key));
    }

    #[test]
    fn test_new_profile_for_unsaved_user() {
        let user = NewUser::builder()
            .username("alice".to_string())
            .email("alice@example.com".to_string())
            .password_hash("hash".to_string())
            .build()
            .unwrap();
        let new = NewRegistrationProfile::for_new_user(&user);

        assert_eq!(new.user_id, user.id);
        assert!(is_activation_key(&new.activation_key));
        assert_ne!(
            new.activation_key,
            NewRegistrationProfile::for_new_user(&user).activation_key
        );
    }

    #[test]
    fn test_activation_key_not_expired() {
        let user = user(Utc::now());
        assert!(!profile(&user).activation_key_expired(&user, 7));
    }

    #[test]
    fn test_activation_key_expired_after_window() {
        let user = user(Utc::now() - Duration::days(8));
        assert!(profile(&user).activation_key_expired(&user, 7));
    }

    #[test]
    fn test_zero_day_window_is_expired() {
        let user = user(Utc::now() - Duration::seconds(1));
        assert!(profile(&user).activation_key_expired(&user, 0));
    }

    #[test]
    fn test_used_key_counts_as_expired() {
        let user = user(Utc::now());
        let mut profile = profile(&user);
        profile.activated_at = Some(Utc::now());

        assert!(profile.is_activated());
        assert!(profile.activation_key_expired(&user, 7));
    }
}
