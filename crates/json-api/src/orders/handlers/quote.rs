//! Quote Order Handler

use std::sync::Arc;

use salvo::{oapi::extract::JsonBody, prelude::*};

use crate::{
    envelope::{ApiError, ApiResponse},
    extensions::*,
    orders::models::{QuoteRequest, QuoteResponse},
    state::State,
};

/// Quote Order Handler
///
/// Prices a draft the same way placement would, without reserving stock or
/// persisting anything.
#[endpoint(
    tags("orders"),
    summary = "Quote Order",
    security(("bearer_auth" = [])),
)]
pub(crate) async fn handler(
    json: JsonBody<QuoteRequest>,
    depot: &mut Depot,
) -> Result<ApiResponse<QuoteResponse>, ApiError> {
    let state = depot.obtain_or_500::<Arc<State>>()?;
    let caller = depot.caller_or_401()?;

    let quote = state
        .app
        .placement
        .quote(caller, json.into_inner().into())
        .await?;

    Ok(ApiResponse::ok("Quote computed", quote.into()))
}
