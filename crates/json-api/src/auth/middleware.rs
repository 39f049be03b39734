//! Auth middleware.

use std::sync::Arc;

use martina_app::domain::users::UsersServiceError;
use salvo::{http::header::AUTHORIZATION, prelude::*};
use tracing::error;

use crate::{envelope::ApiError, extensions::*, state::State};

#[salvo::handler]
pub(crate) async fn handler(
    req: &mut Request,
    depot: &mut Depot,
    res: &mut Response,
    ctrl: &mut FlowCtrl,
) {
    let Some(token) = extract_bearer_token(req) else {
        res.render(ApiError::unauthorized(
            "Missing or invalid Authorization header",
        ));
        ctrl.skip_rest();

        return;
    };

    let state = match depot.obtain_or_500::<Arc<State>>() {
        Ok(state) => state,
        Err(api_error) => {
            res.render(api_error);
            ctrl.skip_rest();

            return;
        }
    };

    let caller = match state.app.users.authenticate_token(token).await {
        Ok(caller) => caller,
        Err(UsersServiceError::NotFound) => {
            res.render(ApiError::unauthorized("Invalid API token"));
            ctrl.skip_rest();

            return;
        }
        Err(source) => {
            error!("failed to validate api token: {source}");

            res.render(ApiError::internal("token_validation_failed"));
            ctrl.skip_rest();

            return;
        }
    };

    depot.insert_caller(caller);

    ctrl.call_next(req, depot, res).await;
}

fn extract_bearer_token(req: &Request) -> Option<&str> {
    let value = req.headers().get(AUTHORIZATION)?.to_str().ok()?;
    let (scheme, token) = value.split_once(' ')?;
    let token = token.trim();

    if !scheme.eq_ignore_ascii_case("bearer") || token.is_empty() {
        return None;
    }

    Some(token)
}
