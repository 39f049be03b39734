//! Users Repository

use jiff_sqlx::Timestamp as SqlxTimestamp;
use sqlx::{FromRow, Postgres, Row, Transaction, postgres::PgRow, query_as};

use crate::domain::users::models::{
    Address, AddressUuid, Contact, NewAddress, NewUser, User, UserRole, UserUuid,
};

const CREATE_USER_SQL: &str = include_str!("sql/create_user.sql");
const GET_USER_SQL: &str = include_str!("sql/get_user.sql");
const FIND_USER_BY_EMAIL_SQL: &str = include_str!("sql/find_user_by_email.sql");
const FIND_USER_BY_PHONE_SQL: &str = include_str!("sql/find_user_by_phone.sql");
const FIND_USER_BY_TOKEN_HASH_SQL: &str = include_str!("sql/find_user_by_token_hash.sql");
const CREATE_ADDRESS_SQL: &str = include_str!("sql/create_address.sql");
const FIND_OWNED_ADDRESS_SQL: &str = include_str!("sql/find_owned_address.sql");

#[derive(Debug, Clone, Default)]
pub(crate) struct PgUsersRepository;

impl PgUsersRepository {
    #[must_use]
    pub(crate) fn new() -> Self {
        Self
    }

    pub(crate) async fn create_user(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        user: &NewUser,
    ) -> Result<User, sqlx::Error> {
        query_as::<Postgres, User>(CREATE_USER_SQL)
            .bind(user.uuid.into_uuid())
            .bind(&user.name)
            .bind(user.email.as_deref())
            .bind(user.phone.as_deref())
            .bind(user.role.as_str())
            .bind(&user.token_hash)
            .fetch_one(&mut **tx)
            .await
    }

    pub(crate) async fn get_user(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        user: UserUuid,
    ) -> Result<User, sqlx::Error> {
        query_as::<Postgres, User>(GET_USER_SQL)
            .bind(user.into_uuid())
            .fetch_one(&mut **tx)
            .await
    }

    pub(crate) async fn find_user_by_contact(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        contact: &Contact,
    ) -> Result<User, sqlx::Error> {
        let (sql, value) = match contact {
            Contact::Email(email) => (FIND_USER_BY_EMAIL_SQL, email),
            Contact::Phone(phone) => (FIND_USER_BY_PHONE_SQL, phone),
        };

        query_as::<Postgres, User>(sql)
            .bind(value)
            .fetch_one(&mut **tx)
            .await
    }

    pub(crate) async fn find_user_by_token_hash(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        token_hash: &str,
    ) -> Result<User, sqlx::Error> {
        query_as::<Postgres, User>(FIND_USER_BY_TOKEN_HASH_SQL)
            .bind(token_hash)
            .fetch_one(&mut **tx)
            .await
    }

    pub(crate) async fn create_address(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        user: UserUuid,
        address: &NewAddress,
    ) -> Result<Address, sqlx::Error> {
        query_as::<Postgres, Address>(CREATE_ADDRESS_SQL)
            .bind(address.uuid.into_uuid())
            .bind(user.into_uuid())
            .bind(&address.lines)
            .fetch_one(&mut **tx)
            .await
    }

    pub(crate) async fn find_owned_address(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        user: UserUuid,
        address: AddressUuid,
    ) -> Result<Option<Address>, sqlx::Error> {
        query_as::<Postgres, Address>(FIND_OWNED_ADDRESS_SQL)
            .bind(address.into_uuid())
            .bind(user.into_uuid())
            .fetch_optional(&mut **tx)
            .await
    }
}

impl<'r> FromRow<'r, PgRow> for User {
    fn from_row(row: &'r PgRow) -> sqlx::Result<Self> {
        let role: String = row.try_get("role")?;

        let role = role
            .parse::<UserRole>()
            .map_err(|error| sqlx::Error::ColumnDecode {
                index: "role".to_string(),
                source: Box::new(error),
            })?;

        Ok(Self {
            uuid: UserUuid::from_uuid(row.try_get("uuid")?),
            name: row.try_get("name")?,
            email: row.try_get("email")?,
            phone: row.try_get("phone")?,
            role,
            created_at: row.try_get::<SqlxTimestamp, _>("created_at")?.to_jiff(),
        })
    }
}

impl<'r> FromRow<'r, PgRow> for Address {
    fn from_row(row: &'r PgRow) -> sqlx::Result<Self> {
        Ok(Self {
            uuid: AddressUuid::from_uuid(row.try_get("uuid")?),
            user: UserUuid::from_uuid(row.try_get("user_uuid")?),
            lines: row.try_get("lines")?,
            created_at: row.try_get::<SqlxTimestamp, _>("created_at")?.to_jiff(),
        })
    }
}
