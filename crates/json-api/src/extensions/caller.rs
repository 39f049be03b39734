//! Authenticated caller stored in the depot.

use martina_app::domain::users::models::User;
use salvo::prelude::Depot;

use crate::envelope::ApiError;

/// Stores and reads the user the bearer token resolved to.
pub(crate) trait CallerExt {
    fn insert_caller(&mut self, caller: User);

    fn caller_or_401(&self) -> Result<&User, ApiError>;
}

impl CallerExt for Depot {
    fn insert_caller(&mut self, caller: User) {
        self.inject(caller);
    }

    fn caller_or_401(&self) -> Result<&User, ApiError> {
        self.obtain::<User>()
            .map_err(|_ignored| ApiError::unauthorized("Authentication required"))
    }
}
