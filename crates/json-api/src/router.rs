//! App Router

use salvo::Router;

use crate::{auth, orders, payments};

/// Routes that require a bearer token.
pub(crate) fn app_router() -> Router {
    Router::new()
        .hoop(auth::middleware::handler)
        .push(
            Router::with_path("orders")
                .get(orders::index::handler)
                .post(orders::place::handler)
                .push(Router::with_path("quote").post(orders::quote::handler))
                .push(Router::with_path("mine").get(orders::mine::handler)),
        )
        .push(
            Router::with_path("payments/paypal/orders")
                .post(payments::create::handler)
                .push(
                    Router::with_path("{paypal_order_id}/capture")
                        .post(payments::capture::handler),
                ),
        )
}
