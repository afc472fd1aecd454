//! Identity provider boundary.
//!
//! The provider authenticates credentials and issues [`User`] records. The
//! rest of the crate treats it as an external collaborator; the in-memory
//! implementation backs the API server and tests.

use std::collections::HashMap;
use std::sync::{PoisonError, RwLock};

use argon2::{
    Argon2, PasswordHash, PasswordVerifier,
    password_hash::{PasswordHasher, SaltString},
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use dashgate_core::UserId;

use crate::{Role, User, UserStatus};

/// Password shared by the seeded demo accounts.
pub const DEMO_PASSWORD: &str = "password123";

#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoginCredentials {
    pub email: String,
    pub password: String,
}

impl core::fmt::Debug for LoginCredentials {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("LoginCredentials")
            .field("email", &self.email)
            .finish_non_exhaustive()
    }
}

#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegisterCredentials {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub password: String,
    pub confirm_password: String,
}

impl core::fmt::Debug for RegisterCredentials {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("RegisterCredentials")
            .field("first_name", &self.first_name)
            .field("last_name", &self.last_name)
            .field("email", &self.email)
            .finish_non_exhaustive()
    }
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum IdentityError {
    /// Unknown email or wrong password (deliberately indistinguishable).
    #[error("invalid email or password")]
    InvalidCredentials,

    #[error("account is {0}")]
    AccountNotActive(UserStatus),

    #[error("user with this email already exists")]
    EmailTaken,

    #[error("passwords do not match")]
    PasswordMismatch,

    #[error("validation failed: {0}")]
    Validation(String),

    #[error("user not found")]
    NotFound,

    #[error("failed to hash password: {0}")]
    PasswordHash(String),
}

/// Authenticates credentials and owns user records.
pub trait IdentityProvider: Send + Sync {
    /// Verify credentials and stamp `last_login`.
    fn authenticate(
        &self,
        credentials: &LoginCredentials,
        now: DateTime<Utc>,
    ) -> Result<User, IdentityError>;

    /// Create a new `viewer` account.
    fn register(
        &self,
        credentials: &RegisterCredentials,
        now: DateTime<Utc>,
    ) -> Result<User, IdentityError>;

    fn find_user(&self, id: UserId) -> Option<User>;

    /// All users, oldest first.
    fn list_users(&self) -> Vec<User>;

    /// Replace an existing record.
    fn save_user(&self, user: User) -> Result<(), IdentityError>;
}

#[derive(Debug, Clone)]
struct Account {
    user: User,
    /// Argon2id hash in PHC string form.
    password_hash: String,
}

impl Account {
    fn new(user: User, password: &str) -> Result<Self, IdentityError> {
        let password_hash = hash_password(password)?;
        Ok(Self {
            user,
            password_hash,
        })
    }

    fn verify(&self, password: &str) -> bool {
        PasswordHash::new(&self.password_hash)
            .map(|parsed| {
                Argon2::default()
                    .verify_password(password.as_bytes(), &parsed)
                    .is_ok()
            })
            .unwrap_or(false)
    }
}

fn hash_password(password: &str) -> Result<String, IdentityError> {
    let salt = SaltString::generate(rand::thread_rng());
    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| IdentityError::PasswordHash(e.to_string()))
}

fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

fn validate_registration(credentials: &RegisterCredentials) -> Result<String, IdentityError> {
    if credentials.first_name.trim().is_empty() {
        return Err(IdentityError::Validation("first name is required".into()));
    }
    if credentials.last_name.trim().is_empty() {
        return Err(IdentityError::Validation("last name is required".into()));
    }

    let email = normalize_email(&credentials.email);
    match email.split_once('@') {
        Some((local, domain)) if !local.is_empty() && !domain.is_empty() => {}
        _ => return Err(IdentityError::Validation("invalid email format".into())),
    }

    if credentials.password.is_empty() {
        return Err(IdentityError::Validation("password is required".into()));
    }
    if credentials.password != credentials.confirm_password {
        return Err(IdentityError::PasswordMismatch);
    }

    Ok(email)
}

/// In-process identity provider with Argon2id password hashes.
#[derive(Debug, Default)]
pub struct InMemoryIdentityProvider {
    accounts: RwLock<HashMap<UserId, Account>>,
}

impl InMemoryIdentityProvider {
    pub fn new() -> Self {
        Self::default()
    }

    /// Provider seeded with one account per role plus a pending viewer, all
    /// using [`DEMO_PASSWORD`].
    pub fn with_demo_users(now: DateTime<Utc>) -> Result<Self, IdentityError> {
        let provider = Self::new();
        let seed = [
            ("admin@example.com", "Admin", "User", Role::Admin, UserStatus::Active),
            ("editor@example.com", "Editor", "Smith", Role::Editor, UserStatus::Active),
            ("viewer@example.com", "John", "Viewer", Role::Viewer, UserStatus::Active),
            ("pending@example.com", "Pending", "User", Role::Viewer, UserStatus::Pending),
        ];
        for (email, first, last, role, status) in seed {
            let user = User::new(UserId::new(), email, first, last, role, status, now);
            provider.insert(user, DEMO_PASSWORD)?;
        }
        Ok(provider)
    }

    /// Insert a user with the given password, replacing any record with the
    /// same id. The email is normalized like sign-in input.
    pub fn insert(&self, mut user: User, password: &str) -> Result<(), IdentityError> {
        user.email = normalize_email(&user.email);
        let account = Account::new(user, password)?;
        let mut accounts = self.accounts.write().unwrap_or_else(PoisonError::into_inner);
        accounts.insert(account.user.id, account);
        Ok(())
    }

    pub fn find_by_email(&self, email: &str) -> Option<User> {
        let email = normalize_email(email);
        let accounts = self.accounts.read().unwrap_or_else(PoisonError::into_inner);
        accounts
            .values()
            .find(|a| a.user.email == email)
            .map(|a| a.user.clone())
    }
}

impl IdentityProvider for InMemoryIdentityProvider {
    fn authenticate(
        &self,
        credentials: &LoginCredentials,
        now: DateTime<Utc>,
    ) -> Result<User, IdentityError> {
        let email = normalize_email(&credentials.email);
        let mut accounts = self.accounts.write().unwrap_or_else(PoisonError::into_inner);

        let account = accounts
            .values_mut()
            .find(|a| a.user.email == email)
            .filter(|a| a.verify(&credentials.password))
            .ok_or(IdentityError::InvalidCredentials)?;

        if !account.user.is_active() {
            tracing::warn!(
                user_id = %account.user.id,
                status = %account.user.status,
                "sign-in refused"
            );
            return Err(IdentityError::AccountNotActive(account.user.status));
        }

        account.user.last_login = Some(now);
        tracing::info!(user_id = %account.user.id, role = %account.user.role, "user signed in");
        Ok(account.user.clone())
    }

    fn register(
        &self,
        credentials: &RegisterCredentials,
        now: DateTime<Utc>,
    ) -> Result<User, IdentityError> {
        let email = validate_registration(credentials)?;
        let mut accounts = self.accounts.write().unwrap_or_else(PoisonError::into_inner);

        if accounts.values().any(|a| a.user.email == email) {
            return Err(IdentityError::EmailTaken);
        }

        let user = User::new(
            UserId::new(),
            email,
            credentials.first_name.trim(),
            credentials.last_name.trim(),
            Role::Viewer,
            UserStatus::Active,
            now,
        );
        accounts.insert(user.id, Account::new(user.clone(), &credentials.password)?);
        tracing::info!(user_id = %user.id, "user registered");
        Ok(user)
    }

    fn find_user(&self, id: UserId) -> Option<User> {
        let accounts = self.accounts.read().unwrap_or_else(PoisonError::into_inner);
        accounts.get(&id).map(|a| a.user.clone())
    }

    fn list_users(&self) -> Vec<User> {
        let accounts = self.accounts.read().unwrap_or_else(PoisonError::into_inner);
        let mut users: Vec<User> = accounts.values().map(|a| a.user.clone()).collect();
        users.sort_by(|a, b| a.created_at.cmp(&b.created_at).then(a.id.cmp(&b.id)));
        users
    }

    fn save_user(&self, user: User) -> Result<(), IdentityError> {
        let mut accounts = self.accounts.write().unwrap_or_else(PoisonError::into_inner);
        let account = accounts.get_mut(&user.id).ok_or(IdentityError::NotFound)?;
        account.user = user;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn login(email: &str, password: &str) -> LoginCredentials {
        LoginCredentials {
            email: email.to_string(),
            password: password.to_string(),
        }
    }

    fn registration(email: &str) -> RegisterCredentials {
        RegisterCredentials {
            first_name: "Ada".to_string(),
            last_name: "Lovelace".to_string(),
            email: email.to_string(),
            password: "s3cret".to_string(),
            confirm_password: "s3cret".to_string(),
        }
    }

    fn demo() -> InMemoryIdentityProvider {
        InMemoryIdentityProvider::with_demo_users(Utc::now()).unwrap()
    }

    #[test]
    fn demo_admin_can_sign_in() {
        let now = Utc::now();
        let provider = InMemoryIdentityProvider::with_demo_users(now).unwrap();

        let user = provider
            .authenticate(&login("Admin@Example.com ", DEMO_PASSWORD), now)
            .unwrap();
        assert_eq!(user.role, Role::Admin);
        assert_eq!(user.last_login, Some(now));
        assert_eq!(provider.find_user(user.id).unwrap().last_login, Some(now));
    }

    #[test]
    fn wrong_password_and_unknown_email_look_the_same() {
        let provider = demo();
        let wrong_password = provider.authenticate(&login("admin@example.com", "nope"), Utc::now());
        let unknown = provider.authenticate(&login("ghost@example.com", DEMO_PASSWORD), Utc::now());
        assert_eq!(wrong_password, Err(IdentityError::InvalidCredentials));
        assert_eq!(unknown, Err(IdentityError::InvalidCredentials));
    }

    #[test]
    fn pending_accounts_cannot_sign_in() {
        let provider = demo();
        let result =
            provider.authenticate(&login("pending@example.com", DEMO_PASSWORD), Utc::now());
        assert_eq!(result, Err(IdentityError::AccountNotActive(UserStatus::Pending)));
    }

    #[test]
    fn registration_creates_active_viewer() {
        let provider = InMemoryIdentityProvider::new();
        let user = provider.register(&registration(" Ada@Example.com"), Utc::now()).unwrap();
        assert_eq!(user.role, Role::Viewer);
        assert_eq!(user.status, UserStatus::Active);
        assert_eq!(user.email, "ada@example.com");

        let again = provider.authenticate(&login("ada@example.com", "s3cret"), Utc::now());
        assert_eq!(again.unwrap().id, user.id);
    }

    #[test]
    fn duplicate_email_is_rejected_case_insensitively() {
        let provider = demo();
        let result = provider.register(&registration("EDITOR@example.com"), Utc::now());
        assert_eq!(result, Err(IdentityError::EmailTaken));
    }

    #[test]
    fn registration_validation() {
        let provider = InMemoryIdentityProvider::new();

        let mut creds = registration("ada@example.com");
        creds.confirm_password = "different".to_string();
        assert_eq!(provider.register(&creds, Utc::now()), Err(IdentityError::PasswordMismatch));

        let creds = registration("not-an-email");
        assert!(matches!(provider.register(&creds, Utc::now()), Err(IdentityError::Validation(_))));

        let mut creds = registration("ada@example.com");
        creds.first_name = "  ".to_string();
        assert!(matches!(provider.register(&creds, Utc::now()), Err(IdentityError::Validation(_))));

        assert!(provider.list_users().is_empty());
    }

    #[test]
    fn save_user_requires_existing_record() {
        let provider = demo();
        let mut viewer = provider.find_by_email("viewer@example.com").unwrap();
        viewer.role = Role::Editor;
        provider.save_user(viewer.clone()).unwrap();
        assert_eq!(provider.find_user(viewer.id).unwrap().role, Role::Editor);

        let stranger = User::new(
            UserId::new(),
            "x@example.com",
            "X",
            "Y",
            Role::Admin,
            UserStatus::Active,
            Utc::now(),
        );
        assert_eq!(provider.save_user(stranger), Err(IdentityError::NotFound));
    }

    #[test]
    fn credentials_debug_hides_passwords() {
        let rendered = format!("{:?}", login("a@example.com", "hunter2"));
        assert!(!rendered.contains("hunter2"));
    }

    #[test]
    fn list_is_ordered_and_complete() {
        let provider = demo();
        let users = provider.list_users();
        assert_eq!(users.len(), 4);
        assert!(users.windows(2).all(|w| (w[0].created_at, w[0].id) <= (w[1].created_at, w[1].id)));
    }

    #[test]
    fn passwords_are_stored_as_argon2_hashes() {
        let provider = InMemoryIdentityProvider::new();
        let user = provider.register(&registration("ada@example.com"), Utc::now()).unwrap();

        let accounts = provider.accounts.read().unwrap();
        let stored = &accounts[&user.id].password_hash;
        assert!(stored.starts_with("$argon2id$"));
        assert!(!stored.contains("s3cret"));
    }

    #[test]
    fn same_password_gets_distinct_salts() {
        let first = hash_password("s3cret").unwrap();
        let second = hash_password("s3cret").unwrap();
        assert_ne!(first, second);
    }

    #[test]
    fn inserted_emails_are_normalized() {
        let provider = InMemoryIdentityProvider::new();
        let user = User::new(
            UserId::new(),
            " Grace@Example.COM",
            "Grace",
            "Hopper",
            Role::Editor,
            UserStatus::Active,
            Utc::now(),
        );
        provider.insert(user, "cobol").unwrap();

        let signed_in = provider
            .authenticate(&login("grace@example.com", "cobol"), Utc::now())
            .unwrap();
        assert_eq!(signed_in.email, "grace@example.com");
        assert!(provider.find_by_email("GRACE@example.com").is_some());
    }
}
