//! Users service.

use async_trait::async_trait;
use mockall::automock;

use crate::{
    database::Db,
    domain::users::{
        errors::UsersServiceError,
        models::{Address, AddressUuid, Contact, NewAddress, NewUser, User, UserUuid},
        repository::PgUsersRepository,
        token::hash_api_token,
    },
};

#[derive(Debug, Clone)]
pub struct PgUsersService {
    db: Db,
    repository: PgUsersRepository,
}

impl PgUsersService {
    #[must_use]
    pub fn new(db: Db) -> Self {
        Self {
            db,
            repository: PgUsersRepository::new(),
        }
    }
}

#[async_trait]
impl UsersService for PgUsersService {
    #[tracing::instrument(
        name = "users.service.create_user",
        skip(self, user),
        fields(user_uuid = %user.uuid, role = %user.role),
        err
    )]
    async fn create_user(&self, user: NewUser) -> Result<User, UsersServiceError> {
        let mut tx = self.db.begin().await?;

        let created = self.repository.create_user(&mut tx, &user).await?;

        tx.commit().await?;

        Ok(created)
    }

    async fn get_user(&self, user: UserUuid) -> Result<User, UsersServiceError> {
        let mut tx = self.db.begin().await?;

        let user = self.repository.get_user(&mut tx, user).await?;

        tx.commit().await?;

        Ok(user)
    }

    async fn find_user_by_contact(&self, contact: Contact) -> Result<User, UsersServiceError> {
        let mut tx = self.db.begin().await?;

        let user = self
            .repository
            .find_user_by_contact(&mut tx, &contact)
            .await?;

        tx.commit().await?;

        Ok(user)
    }

    async fn authenticate_token(&self, token: &str) -> Result<User, UsersServiceError> {
        let token_hash = hash_api_token(token);

        let mut tx = self.db.begin().await?;

        let user = self
            .repository
            .find_user_by_token_hash(&mut tx, &token_hash)
            .await?;

        tx.commit().await?;

        Ok(user)
    }

    async fn create_address(
        &self,
        user: UserUuid,
        address: NewAddress,
    ) -> Result<Address, UsersServiceError> {
        let mut tx = self.db.begin().await?;

        let created = self
            .repository
            .create_address(&mut tx, user, &address)
            .await?;

        tx.commit().await?;

        Ok(created)
    }

    async fn find_owned_address(
        &self,
        user: UserUuid,
        address: AddressUuid,
    ) -> Result<Option<Address>, UsersServiceError> {
        let mut tx = self.db.begin().await?;

        let address = self
            .repository
            .find_owned_address(&mut tx, user, address)
            .await?;

        tx.commit().await?;

        Ok(address)
    }
}

#[automock]
#[async_trait]
pub trait UsersService: Send + Sync {
    /// Creates a directory user.
    async fn create_user(&self, user: NewUser) -> Result<User, UsersServiceError>;

    /// Retrieve a single user.
    async fn get_user(&self, user: UserUuid) -> Result<User, UsersServiceError>;

    /// Find a user by email address or phone number.
    async fn find_user_by_contact(&self, contact: Contact) -> Result<User, UsersServiceError>;

    /// Resolve the user owning a raw bearer token.
    async fn authenticate_token(&self, token: &str) -> Result<User, UsersServiceError>;

    /// Adds an address to a user.
    async fn create_address(
        &self,
        user: UserUuid,
        address: NewAddress,
    ) -> Result<Address, UsersServiceError>;

    /// Find an address, only if it belongs to `user`.
    async fn find_owned_address(
        &self,
        user: UserUuid,
        address: AddressUuid,
    ) -> Result<Option<Address>, UsersServiceError>;
}

#[cfg(test)]
mod tests {
    use testresult::TestResult;

    use crate::{
        domain::users::{
            models::{AddressUuid, UserRole},
            token::generate_api_token,
        },
        test::{TestContext, helpers::new_user},
    };

    use super::*;

    #[tokio::test]
    #[ignore = "requires a Docker daemon for the Postgres test container"]
    async fn authenticate_token_resolves_the_owner() -> TestResult {
        let ctx = TestContext::new().await;
        let token = generate_api_token();

        let created = ctx
            .users
            .create_user(NewUser {
                token_hash: hash_api_token(&token),
                ..new_user("Ada", UserRole::Admin)
            })
            .await?;

        let user = ctx.users.authenticate_token(&token).await?;

        assert_eq!(user, created);
        assert!(user.is_admin());

        Ok(())
    }

    #[tokio::test]
    #[ignore = "requires a Docker daemon for the Postgres test container"]
    async fn unknown_token_is_not_found() {
        let ctx = TestContext::new().await;

        let result = ctx.users.authenticate_token("mt_unknown").await;

        assert!(
            matches!(result, Err(UsersServiceError::NotFound)),
            "expected NotFound, got {result:?}"
        );
    }

    #[tokio::test]
    #[ignore = "requires a Docker daemon for the Postgres test container"]
    async fn find_user_by_contact_matches_email_or_phone() -> TestResult {
        let ctx = TestContext::new().await;
        let created = ctx
            .users
            .create_user(new_user("Grace", UserRole::Customer))
            .await?;

        let by_email = ctx
            .users
            .find_user_by_contact(Contact::Email(created.email.clone().unwrap_or_default()))
            .await?;

        let by_phone = ctx
            .users
            .find_user_by_contact(Contact::Phone(created.phone.clone().unwrap_or_default()))
            .await?;

        assert_eq!(by_email.uuid, created.uuid);
        assert_eq!(by_phone.uuid, created.uuid);

        Ok(())
    }

    #[tokio::test]
    #[ignore = "requires a Docker daemon for the Postgres test container"]
    async fn addresses_are_only_found_for_their_owner() -> TestResult {
        let ctx = TestContext::new().await;
        let owner = ctx
            .users
            .create_user(new_user("Owner", UserRole::Customer))
            .await?;
        let stranger = ctx
            .users
            .create_user(new_user("Stranger", UserRole::Customer))
            .await?;

        let address = ctx
            .users
            .create_address(
                owner.uuid,
                NewAddress {
                    uuid: AddressUuid::new(),
                    lines: vec!["1 Main Street".to_string(), "Springfield".to_string()],
                },
            )
            .await?;

        let owned = ctx
            .users
            .find_owned_address(owner.uuid, address.uuid)
            .await?;
        let foreign = ctx
            .users
            .find_owned_address(stranger.uuid, address.uuid)
            .await?;

        assert_eq!(owned, Some(address));
        assert!(foreign.is_none(), "address must not resolve for another user");

        Ok(())
    }
}
