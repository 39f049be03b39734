//! My Orders Handler

use std::sync::Arc;

use salvo::prelude::*;

use crate::{
    envelope::{ApiError, ApiResponse},
    extensions::*,
    orders::models::OrderResponse,
    state::State,
};

/// My Orders Handler
#[endpoint(
    tags("orders"),
    summary = "List My Orders",
    security(("bearer_auth" = [])),
)]
pub(crate) async fn handler(
    depot: &mut Depot,
) -> Result<ApiResponse<Vec<OrderResponse>>, ApiError> {
    let state = depot.obtain_or_500::<Arc<State>>()?;
    let caller = depot.caller_or_401()?;

    let orders = state.app.placement.my_orders(caller).await?;

    Ok(ApiResponse::ok(
        "Orders fetched",
        orders.into_iter().map(OrderResponse::from).collect(),
    ))
}
