use crate::domain::errors::DomainResult;
use crate::domain::models::User;
use async_trait::async_trait;

/// Repository port for user accounts
#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Insert a new user; a duplicate email yields `EmailAlreadyRegistered`
    async fn insert(&self, user: &User) -> DomainResult<()>;

    /// Look up a user by email
    async fn find_by_email(&self, email: &str) -> DomainResult<Option<User>>;
}
