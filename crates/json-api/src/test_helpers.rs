//! Test helpers.

use std::sync::Arc;

use jiff::Timestamp;
use martina::orders::{OrderStatus, OrderTotals};
use martina_app::{
    context::AppContext,
    domain::{
        orders::models::{Order, OrderUuid},
        placement::MockPlacementService,
        users::{
            MockUsersService,
            models::{AddressUuid, User, UserRole, UserUuid},
        },
    },
};
use salvo::{affix_state::inject, prelude::*};
use serde::Deserialize;

use crate::state::State;

/// Success envelope as clients see it.
#[derive(Debug, Deserialize)]
pub(crate) struct Envelope<T> {
    pub success: bool,
    pub message: String,
    pub data: T,
}

pub(crate) fn make_user(name: &str) -> User {
    User {
        uuid: UserUuid::new(),
        name: name.to_string(),
        email: Some(format!("{}@example.com", name.to_lowercase())),
        phone: None,
        role: UserRole::Customer,
        created_at: Timestamp::UNIX_EPOCH,
    }
}

/// An order without lines, enough for listing responses.
pub(crate) fn make_order(customer: UserUuid, total: i64) -> Order {
    Order {
        uuid: OrderUuid::new(),
        customer,
        address: AddressUuid::new(),
        vendors: Vec::new(),
        lines: Vec::new(),
        totals: OrderTotals {
            subtotal: total,
            shipping_cost: 0,
            discount: 0,
            total,
        },
        status: OrderStatus::PendingApproval,
        created_at: Timestamp::UNIX_EPOCH,
    }
}

fn strict_users_mock() -> MockUsersService {
    let mut users = MockUsersService::new();

    users.expect_authenticate_token().never();

    users
}

fn strict_placement_mock() -> MockPlacementService {
    let mut placement = MockPlacementService::new();

    placement.expect_place_order().never();
    placement.expect_quote().never();
    placement.expect_create_external_payment().never();
    placement.expect_capture_external_payment().never();
    placement.expect_my_orders().never();
    placement.expect_user_orders().never();

    placement
}

pub(crate) fn state_with_users(users: MockUsersService) -> Arc<State> {
    State::from_app_context(AppContext {
        users: Arc::new(users),
        placement: Arc::new(strict_placement_mock()),
    })
}

pub(crate) fn state_with_placement(placement: MockPlacementService) -> Arc<State> {
    State::from_app_context(AppContext {
        users: Arc::new(strict_users_mock()),
        placement: Arc::new(placement),
    })
}

/// Serves `route` as `caller`, skipping token authentication. The caller is
/// injected by type, the same way the auth middleware stores it.
pub(crate) fn placement_service(
    placement: MockPlacementService,
    caller: User,
    route: Router,
) -> Service {
    Service::new(
        Router::new()
            .hoop(inject(state_with_placement(placement)))
            .hoop(inject(caller))
            .push(route),
    )
}
