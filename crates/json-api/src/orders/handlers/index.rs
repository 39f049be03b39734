//! User Orders Handler

use std::sync::Arc;

use martina_app::domain::users::models::UserUuid;
use salvo::{oapi::extract::QueryParam, prelude::*};
use uuid::Uuid;

use crate::{
    envelope::{ApiError, ApiResponse},
    extensions::*,
    orders::models::OrderResponse,
    state::State,
};

/// User Orders Handler
///
/// Lists the orders of any user. Only admins may call it.
#[endpoint(
    tags("orders"),
    summary = "List User Orders",
    security(("bearer_auth" = [])),
)]
pub(crate) async fn handler(
    user_id: QueryParam<Uuid, true>,
    depot: &mut Depot,
) -> Result<ApiResponse<Vec<OrderResponse>>, ApiError> {
    let state = depot.obtain_or_500::<Arc<State>>()?;
    let caller = depot.caller_or_401()?;

    let orders = state
        .app
        .placement
        .user_orders(caller, UserUuid::from_uuid(user_id.into_inner()))
        .await?;

    Ok(ApiResponse::ok(
        "Orders fetched",
        orders.into_iter().map(OrderResponse::from).collect(),
    ))
}
