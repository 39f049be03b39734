//! Placement Orchestrator

use std::sync::Arc;

use async_trait::async_trait;
use jiff::Timestamp;
use martina::{
    catalog::{AttributeSelection, AttributeUuid, CategoryUuid, Product, ProductUuid},
    discounts::{Discount, DiscountUuid, resolve_discounts},
    inventory::{StockRequest, any_tracked, check_availability},
    orders::{AssembledOrder, Quote, assemble_order, quote},
    pricing::{PricedLine, PricingError, payable_amount, price_line},
};
use rustc_hash::FxHashSet;
use tracing::{info, warn};

use crate::domain::{
    catalog::{CatalogService, CatalogServiceError, models::SoldUnits},
    discounts::{DiscountsService, DiscountsServiceError},
    inventory::{InventoryService, InventoryServiceError},
    orders::{
        OrdersService,
        models::{NewOrder, Order},
    },
    payments::{
        CapturedPayment, ExternalPaymentOrder, PaymentGateway, PaymentsService,
        models::{NewTransaction, PaymentMethod, TransactionStatus, TransactionUuid},
    },
    placement::{
        errors::PlacementError,
        models::{
            ExternalPaymentRequest, OrderDraft, PaymentDetails, PlacementOutcome,
            PlacementRequest, PlacementState,
        },
        saga::{Compensation, Saga},
        service::PlacementService,
    },
    trackings::{TrackingsService, models::NewTracking},
    users::{
        UsersService,
        models::{AddressUuid, User, UserUuid},
    },
};

/// Drives order placement across the domain services.
#[derive(Clone)]
pub struct Orchestrator {
    pub(super) users: Arc<dyn UsersService>,
    pub(super) catalog: Arc<dyn CatalogService>,
    pub(super) discounts: Arc<dyn DiscountsService>,
    pub(super) inventory: Arc<dyn InventoryService>,
    pub(super) orders: Arc<dyn OrdersService>,
    pub(super) payments: Arc<dyn PaymentsService>,
    pub(super) trackings: Arc<dyn TrackingsService>,
    pub(super) gateway: Arc<dyn PaymentGateway>,
}

impl std::fmt::Debug for Orchestrator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Orchestrator").finish_non_exhaustive()
    }
}

/// Product lines that passed validation, in request order.
#[derive(Debug)]
struct CheckedLines {
    products: Vec<Product>,
    quantities: Vec<u32>,
}

impl CheckedLines {
    fn stock_requests(&self) -> Vec<StockRequest> {
        self.products
            .iter()
            .zip(&self.quantities)
            .map(|(product, &quantity)| StockRequest {
                product: product.uuid,
                quantity,
            })
            .collect()
    }

    fn sold_units(&self) -> Vec<SoldUnits> {
        self.products
            .iter()
            .zip(&self.quantities)
            .map(|(product, &quantity)| SoldUnits {
                product: product.uuid,
                quantity: i64::from(quantity),
            })
            .collect()
    }
}

/// A placement that passed validation and pricing.
#[derive(Debug)]
struct Prepared {
    lines: CheckedLines,
    address: AddressUuid,
    payment: PaymentDetails,
    coupons: Vec<Discount>,
    assembled: AssembledOrder,
}

/// Tracks the state a placement has reached and logs each transition.
#[derive(Debug)]
struct Progress {
    state: PlacementState,
}

impl Progress {
    fn received() -> Self {
        info!(state = %PlacementState::Received, "placement received");

        Self {
            state: PlacementState::Received,
        }
    }

    fn advance(&mut self, to: PlacementState) {
        info!(from = %self.state, to = %to, "placement transition");

        self.state = to;
    }

    /// Moves to `REJECTED` or `FAILED`, depending on whether anything was
    /// committed, and stamps the error with it.
    fn fail(&mut self, error: PlacementError) -> PlacementError {
        let terminal = if self.state.has_committed() {
            PlacementState::Failed
        } else {
            PlacementState::Rejected
        };

        self.advance(terminal);

        error.in_state(terminal)
    }
}

impl Orchestrator {
    #[expect(clippy::too_many_arguments, reason = "one handle per collaborating service")]
    #[must_use]
    pub fn new(
        users: Arc<dyn UsersService>,
        catalog: Arc<dyn CatalogService>,
        discounts: Arc<dyn DiscountsService>,
        inventory: Arc<dyn InventoryService>,
        orders: Arc<dyn OrdersService>,
        payments: Arc<dyn PaymentsService>,
        trackings: Arc<dyn TrackingsService>,
        gateway: Arc<dyn PaymentGateway>,
    ) -> Self {
        Self {
            users,
            catalog,
            discounts,
            inventory,
            orders,
            payments,
            trackings,
            gateway,
        }
    }

    /// Checks the requested lines and reads their products.
    async fn check_lines(&self, draft: &OrderDraft) -> Result<CheckedLines, PlacementError> {
        if draft.products.is_empty() {
            return Err(PlacementError::validation(
                "Products are required!",
                "products_missing",
            ));
        }

        let quantities = draft
            .products
            .iter()
            .map(|line| u32::try_from(line.quantity).ok().filter(|quantity| *quantity > 0))
            .collect::<Option<Vec<u32>>>()
            .ok_or_else(|| {
                PlacementError::validation("Quantities are not valid!", "quantities_invalid")
            })?;

        let ids: Vec<ProductUuid> = draft.products.iter().map(|line| line.product_id).collect();
        let distinct: FxHashSet<ProductUuid> = ids.iter().copied().collect();

        if distinct.len() != ids.len() {
            return Err(invalid_products());
        }

        let products = self
            .catalog
            .read_products(&ids)
            .await
            .map_err(|error| match error {
                CatalogServiceError::NotFound => invalid_products(),
                error => {
                    warn!(%error, "failed to read products");
                    PlacementError::internal("catalog_unavailable")
                }
            })?;

        if products.len() != ids.len() {
            return Err(invalid_products());
        }

        Ok(CheckedLines {
            products,
            quantities,
        })
    }

    async fn check_address(
        &self,
        caller: &User,
        address: Option<AddressUuid>,
    ) -> Result<AddressUuid, PlacementError> {
        let missing = || PlacementError::validation("No address found!", "address_missing");

        let address = address.ok_or_else(missing)?;

        let owned = self
            .users
            .find_owned_address(caller.uuid, address)
            .await
            .map_err(|error| {
                warn!(%error, "failed to look up address");
                PlacementError::internal("users_unavailable")
            })?;

        owned.map(|owned| owned.uuid).ok_or_else(missing)
    }

    async fn check_attributes(&self, attributes: &[AttributeUuid]) -> Result<(), PlacementError> {
        if attributes.is_empty() {
            return Ok(());
        }

        let invalid = || {
            PlacementError::validation(
                "No attributes found with some AttributeIds!",
                "attribute_ids_invalid",
            )
        };

        let distinct: FxHashSet<AttributeUuid> = attributes.iter().copied().collect();

        if distinct.len() != attributes.len() {
            return Err(invalid());
        }

        let found = self
            .catalog
            .find_attributes(attributes)
            .await
            .map_err(|error| {
                warn!(%error, "failed to look up attributes");
                PlacementError::internal("catalog_unavailable")
            })?;

        if found.len() != attributes.len() {
            return Err(invalid());
        }

        Ok(())
    }

    /// Returns the active coupon discounts behind the supplied codes.
    async fn check_coupons(
        &self,
        codes: &[String],
        now: Timestamp,
    ) -> Result<Vec<Discount>, PlacementError> {
        if codes.is_empty() {
            return Ok(Vec::new());
        }

        let coupons = self
            .discounts
            .find_active_coupons(codes, now)
            .await
            .map_err(|error| {
                warn!(%error, "failed to look up coupons");
                PlacementError::internal("discounts_unavailable")
            })?;

        if coupons.len() != codes.len() {
            return Err(PlacementError::validation(
                "Coupons are invalid!",
                "coupons_invalid",
            ));
        }

        Ok(coupons)
    }

    /// Resolves discounts for and prices every checked line.
    async fn price_lines(
        &self,
        lines: &CheckedLines,
        draft: &OrderDraft,
        now: Timestamp,
    ) -> Result<Vec<PricedLine>, PlacementError> {
        let product_ids: Vec<ProductUuid> =
            lines.products.iter().map(|product| product.uuid).collect();

        let mut seen: FxHashSet<CategoryUuid> = FxHashSet::default();
        let category_ids: Vec<CategoryUuid> = lines
            .products
            .iter()
            .flat_map(Product::category_uuids)
            .filter(|category| seen.insert(*category))
            .collect();

        let candidates = self
            .discounts
            .candidate_discounts(&product_ids, &category_ids, &draft.coupons)
            .await
            .map_err(|error| {
                warn!(%error, "failed to load discounts");
                PlacementError::internal("discounts_unavailable")
            })?;

        let selection = AttributeSelection::from_ids(&draft.attributes);

        lines
            .products
            .iter()
            .zip(&lines.quantities)
            .map(|(product, &quantity)| {
                let discounts = resolve_discounts(
                    &candidates,
                    product.uuid,
                    &product.category_uuids(),
                    &draft.coupons,
                    now,
                );

                price_line(product, quantity, &selection, discounts, &draft.coupons)
                    .map_err(pricing_failed)
            })
            .collect()
    }

    /// Checks and prices a draft, leaving stock alone.
    async fn priced_draft(
        &self,
        caller: &User,
        draft: &OrderDraft,
        address: Option<Option<AddressUuid>>,
        now: Timestamp,
    ) -> Result<(CheckedLines, Vec<PricedLine>), PlacementError> {
        let lines = self.check_lines(draft).await?;

        if let Some(address) = address {
            self.check_address(caller, address).await?;
        }

        self.check_attributes(&draft.attributes).await?;
        self.check_coupons(&draft.coupons, now).await?;

        let priced = self.price_lines(&lines, draft, now).await?;

        Ok((lines, priced))
    }

    /// Validates and prices a placement request.
    async fn prepare(
        &self,
        caller: &User,
        request: PlacementRequest,
        now: Timestamp,
        progress: &mut Progress,
    ) -> Result<Prepared, PlacementError> {
        let PlacementRequest {
            draft,
            address,
            payment,
        } = request;

        let lines = self.check_lines(&draft).await?;
        let address = self.check_address(caller, address).await?;
        self.check_attributes(&draft.attributes).await?;
        let coupons = self.check_coupons(&draft.coupons, now).await?;

        if payment.method == PaymentMethod::Paypal
            && payment
                .transaction_id
                .as_deref()
                .is_none_or(|id| id.trim().is_empty())
        {
            return Err(PlacementError::validation(
                "TransactionId is required!",
                "transaction_id_missing",
            ));
        }

        progress.advance(PlacementState::Validated);

        let priced = self.price_lines(&lines, &draft, now).await?;
        let assembled = assemble_order(&priced).map_err(pricing_failed)?;

        progress.advance(PlacementState::Priced);

        Ok(Prepared {
            lines,
            address,
            payment,
            coupons,
            assembled,
        })
    }

    /// Runs the steps after stock is reserved, registering how to undo each.
    async fn persist(
        &self,
        caller: &User,
        prepared: Prepared,
        now: Timestamp,
        progress: &mut Progress,
        saga: &mut Saga,
    ) -> Result<PlacementOutcome, PlacementError> {
        let Prepared {
            lines,
            address,
            payment,
            coupons,
            assembled,
        } = prepared;

        let applied: FxHashSet<DiscountUuid> = assembled
            .lines
            .iter()
            .flat_map(|line| line.discounts.iter().map(|discount| discount.uuid))
            .collect();

        let redeemed: Vec<DiscountUuid> = coupons
            .iter()
            .map(|coupon| coupon.uuid)
            .filter(|uuid| applied.contains(uuid))
            .collect();

        let order = self
            .orders
            .create_order(NewOrder::from_assembled(caller.uuid, address, assembled))
            .await
            .map_err(|error| {
                warn!(%error, "failed to create order");
                PlacementError::internal("order_not_persisted")
            })?;

        saga.register(Compensation::DeleteOrder(order.uuid));
        progress.advance(PlacementState::Persisted);

        let sold = lines.sold_units();

        self.catalog
            .increment_sold_counts(&sold)
            .await
            .map_err(|error| {
                warn!(%error, "failed to increment sold counts");
                PlacementError::internal("sold_counts_not_updated")
            })?;

        saga.register(Compensation::DecrementSoldCounts(sold));

        if !redeemed.is_empty() {
            self.discounts
                .redeem_coupons(&redeemed)
                .await
                .map_err(|error| match error {
                    DiscountsServiceError::Exhausted => PlacementError::conflict(
                        "Coupon usage limit reached!",
                        "coupons_exhausted",
                    ),
                    error => {
                        warn!(%error, "failed to redeem coupons");
                        PlacementError::internal("coupons_not_redeemed")
                    }
                })?;

            saga.register(Compensation::ReleaseCoupons(redeemed));
        }

        let transaction = self
            .payments
            .create_transaction(new_transaction(&order, &payment))
            .await
            .map_err(|error| {
                warn!(%error, "failed to record transaction");
                PlacementError::internal("transaction_not_recorded")
            })?;

        let tracking = NewTracking::received(order.uuid, now).map_err(|error| {
            warn!(%error, "failed to compute shipping date");
            PlacementError::internal("tracking_not_created")
        })?;

        let tracking = self
            .trackings
            .create_tracking(tracking)
            .await
            .map_err(|error| {
                warn!(%error, "failed to create tracking");
                PlacementError::internal("tracking_not_created")
            })?;

        progress.advance(PlacementState::SideEffectsApplied);

        Ok(PlacementOutcome {
            order,
            transaction,
            tracking,
            state: progress.state,
        })
    }
}

#[async_trait]
impl PlacementService for Orchestrator {
    #[tracing::instrument(
        name = "placement.place_order",
        skip(self, caller, request),
        fields(
            user_uuid = %caller.uuid,
            line_count = request.draft.products.len(),
            payment_method = %request.payment.method,
            order_uuid = tracing::field::Empty,
            total = tracing::field::Empty
        ),
        err
    )]
    async fn place_order(
        &self,
        caller: &User,
        request: PlacementRequest,
    ) -> Result<PlacementOutcome, PlacementError> {
        let now = Timestamp::now();
        let mut progress = Progress::received();

        let prepared = match self.prepare(caller, request, now, &mut progress).await {
            Ok(prepared) => prepared,
            Err(error) => return Err(progress.fail(error)),
        };

        tracing::Span::current().record("total", prepared.assembled.totals.total);

        let mut saga = Saga::default();

        let reservation = match self.inventory.reserve(&prepared.lines.stock_requests()).await {
            Ok(reservation) => reservation,
            Err(error) => return Err(progress.fail(stock_error(error))),
        };

        if reservation.is_empty() {
            info!("no stock tracked for the requested products");
        } else {
            saga.register(Compensation::RestoreStock(reservation));
        }

        progress.advance(PlacementState::StockReserved);

        match self
            .persist(caller, prepared, now, &mut progress, &mut saga)
            .await
        {
            Ok(outcome) => {
                tracing::Span::current().record(
                    "order_uuid",
                    tracing::field::display(outcome.order.uuid),
                );

                info!(
                    order_uuid = %outcome.order.uuid,
                    total = outcome.order.totals.total,
                    "order placed"
                );

                Ok(outcome)
            }
            Err(error) => {
                warn!(
                    state = %progress.state,
                    reason = error.reason(),
                    "placement failed, compensating"
                );

                saga.compensate(self).await;

                Err(progress.fail(error))
            }
        }
    }

    #[tracing::instrument(
        name = "placement.quote",
        skip(self, caller, draft),
        fields(user_uuid = %caller.uuid, line_count = draft.products.len()),
        err
    )]
    async fn quote(&self, caller: &User, draft: OrderDraft) -> Result<Quote, PlacementError> {
        let now = Timestamp::now();

        let (_, priced) = self.priced_draft(caller, &draft, None, now).await?;

        quote(&priced, &draft.coupons).map_err(pricing_failed)
    }

    #[tracing::instrument(
        name = "placement.create_external_payment",
        skip(self, caller, request),
        fields(user_uuid = %caller.uuid, line_count = request.draft.products.len()),
        err
    )]
    async fn create_external_payment(
        &self,
        caller: &User,
        request: ExternalPaymentRequest,
    ) -> Result<ExternalPaymentOrder, PlacementError> {
        let now = Timestamp::now();

        let (lines, priced) = self
            .priced_draft(caller, &request.draft, Some(request.address), now)
            .await?;

        let requests = lines.stock_requests();
        let products: Vec<ProductUuid> = requests.iter().map(|request| request.product).collect();

        let batches = self
            .inventory
            .current_batches(&products)
            .await
            .map_err(stock_error)?;

        if any_tracked(&requests, &batches) {
            check_availability(&requests, &batches)
                .map_err(|error| stock_error(InventoryServiceError::InsufficientStock(error)))?;
        }

        let assembled = assemble_order(&priced).map_err(pricing_failed)?;

        let amount = payable_amount(assembled.totals.total).map_err(|error| match error {
            PricingError::NonPositiveTotal(_) => {
                PlacementError::validation("Nothing to pay for!", "total_not_payable")
            }
            error => pricing_failed(error),
        })?;

        let order = self
            .gateway
            .create_order(amount.value(), amount.currency_code().to_string())
            .await
            .map_err(|error| {
                warn!(%error, "payment gateway refused the order");
                PlacementError::external_service(
                    "Payment provider is unavailable!",
                    "payment_gateway_failed",
                )
            })?;

        info!(external_order_id = %order.id, value = %order.value, "opened external payment");

        Ok(order)
    }

    #[tracing::instrument(name = "placement.capture_external_payment", skip(self), err)]
    async fn capture_external_payment(
        &self,
        external_order_id: String,
    ) -> Result<CapturedPayment, PlacementError> {
        if external_order_id.trim().is_empty() {
            return Err(PlacementError::validation(
                "PaypalOrderId is required!",
                "paypal_order_id_missing",
            ));
        }

        self.gateway
            .capture_order(external_order_id)
            .await
            .map_err(|error| {
                warn!(%error, "payment gateway refused the capture");
                PlacementError::external_service(
                    "Payment could not be captured!",
                    "payment_capture_failed",
                )
            })
    }

    async fn my_orders(&self, caller: &User) -> Result<Vec<Order>, PlacementError> {
        self.customer_orders(caller.uuid).await
    }

    #[tracing::instrument(
        name = "placement.user_orders",
        skip(self, caller),
        fields(caller_uuid = %caller.uuid),
        err
    )]
    async fn user_orders(
        &self,
        caller: &User,
        user: UserUuid,
    ) -> Result<Vec<Order>, PlacementError> {
        if !caller.is_admin() {
            return Err(PlacementError::authorization(
                "You have no permission to access this area!",
                "permission_denied",
            ));
        }

        self.customer_orders(user).await
    }
}

impl Orchestrator {
    async fn customer_orders(&self, customer: UserUuid) -> Result<Vec<Order>, PlacementError> {
        self.orders
            .list_customer_orders(customer)
            .await
            .map_err(|error| {
                warn!(%error, "failed to list orders");
                PlacementError::internal("orders_unavailable")
            })
    }
}

fn new_transaction(order: &Order, payment: &PaymentDetails) -> NewTransaction {
    let external_id = match payment.method {
        PaymentMethod::Paypal => payment.transaction_id.clone(),
        PaymentMethod::CashOnDelivery => None,
    };

    NewTransaction {
        uuid: TransactionUuid::new(),
        order: order.uuid,
        method: payment.method,
        external_id,
        amount: order.totals.total,
        status: TransactionStatus::initial_for(payment.method),
    }
}

fn invalid_products() -> PlacementError {
    PlacementError::validation(
        "ProductIds are invalid or duplicate!",
        "product_ids_invalid",
    )
}

fn pricing_failed(error: PricingError) -> PlacementError {
    warn!(%error, "failed to price order");

    PlacementError::internal("pricing_failed")
}

fn stock_error(error: InventoryServiceError) -> PlacementError {
    match error {
        InventoryServiceError::InsufficientStock(_) | InventoryServiceError::StockChanged(_) => {
            info!(%error, "stock rejected");

            PlacementError::conflict("Product stock is insufficient!", "stock_insufficient")
        }
        error => {
            warn!(%error, "failed to reserve stock");

            PlacementError::internal("inventory_unavailable")
        }
    }
}
