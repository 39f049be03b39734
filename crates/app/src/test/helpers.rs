//! Test Helpers

use jiff::Timestamp;
use jiff_sqlx::Timestamp as SqlxTimestamp;
use martina::{
    catalog::{AttributeSelection, AttributeUuid, CategoryUuid, ProductUuid, VendorUuid},
    discounts::{DiscountKind, DiscountUuid},
    inventory::BatchUuid,
    orders::assemble_order,
    pricing::price_line,
};
use rust_decimal::Decimal;
use sqlx::{query, query_scalar};
use uuid::Uuid;

use crate::{
    domain::{
        catalog::CatalogService,
        orders::{
            OrdersService,
            models::{NewOrder, Order},
        },
        users::{
            UsersService,
            models::{AddressUuid, NewAddress, NewUser, UserRole, UserUuid},
            token::{generate_api_token, hash_api_token},
        },
    },
    test::TestContext,
};

/// A user with a unique email, phone and token.
pub(crate) fn new_user(name: &str, role: UserRole) -> NewUser {
    let unique = Uuid::now_v7().simple().to_string();

    NewUser {
        uuid: UserUuid::new(),
        name: name.to_string(),
        email: Some(format!("{}.{unique}@example.com", name.to_lowercase())),
        phone: Some(format!("+1{unique}")),
        role,
        token_hash: hash_api_token(&generate_api_token()),
    }
}

/// Creates a customer with one address.
pub(crate) async fn create_customer(
    ctx: &TestContext,
    name: &str,
) -> Result<(UserUuid, AddressUuid), Box<dyn std::error::Error>> {
    let user = ctx
        .users
        .create_user(new_user(name, UserRole::Customer))
        .await?;

    let address = ctx
        .users
        .create_address(
            user.uuid,
            NewAddress {
                uuid: AddressUuid::new(),
                lines: vec!["1 Market Street".to_string(), "Springfield".to_string()],
            },
        )
        .await?;

    Ok((user.uuid, address.uuid))
}

pub(crate) async fn create_vendor(ctx: &TestContext) -> Result<VendorUuid, Box<dyn std::error::Error>> {
    let owner = ctx
        .users
        .create_user(new_user("Vendor", UserRole::Vendor))
        .await?;

    let vendor = VendorUuid::new();

    query("INSERT INTO vendors (uuid, user_uuid, name) VALUES ($1, $2, $3)")
        .bind(vendor.into_uuid())
        .bind(owner.uuid.into_uuid())
        .bind("Lumen & Co")
        .execute(ctx.db.pool())
        .await?;

    Ok(vendor)
}

pub(crate) async fn create_product(
    ctx: &TestContext,
    vendor: VendorUuid,
    name: &str,
    price: i64,
) -> Result<ProductUuid, sqlx::Error> {
    let product = ProductUuid::new();

    query(
        "INSERT INTO products (uuid, vendor_uuid, name, price, images) \
         VALUES ($1, $2, $3, $4, $5)",
    )
    .bind(product.into_uuid())
    .bind(vendor.into_uuid())
    .bind(name)
    .bind(price)
    .bind(serde_json::json!([{
        "url": format!("https://media.example.com/{product}.png"),
        "public_id": product.to_string(),
    }]))
    .execute(ctx.db.pool())
    .await?;

    Ok(product)
}

pub(crate) async fn create_category(
    ctx: &TestContext,
    vendor: VendorUuid,
    product: ProductUuid,
    name: &str,
) -> Result<CategoryUuid, sqlx::Error> {
    let category = CategoryUuid::new();

    query("INSERT INTO categories (uuid, product_uuid, vendor_uuid, name) VALUES ($1, $2, $3, $4)")
        .bind(category.into_uuid())
        .bind(product.into_uuid())
        .bind(vendor.into_uuid())
        .bind(name)
        .execute(ctx.db.pool())
        .await?;

    Ok(category)
}

pub(crate) async fn create_attribute(
    ctx: &TestContext,
    product: ProductUuid,
    name: &str,
    value: &str,
    extra_price: Option<i64>,
) -> Result<AttributeUuid, sqlx::Error> {
    let attribute = AttributeUuid::new();

    query(
        "INSERT INTO attributes (uuid, product_uuid, name, value, extra_price) \
         VALUES ($1, $2, $3, $4, $5)",
    )
    .bind(attribute.into_uuid())
    .bind(product.into_uuid())
    .bind(name)
    .bind(value)
    .bind(extra_price)
    .execute(ctx.db.pool())
    .await?;

    Ok(attribute)
}

/// Discount row to seed. The kind follows from which amount is set.
#[derive(Debug, Clone)]
pub(crate) struct SeedDiscount {
    pub vendor: VendorUuid,
    pub products: Vec<ProductUuid>,
    pub categories: Vec<CategoryUuid>,
    pub coupon_code: Option<String>,
    pub coupon_percentage: Option<i64>,
    pub coupon_fixed: Option<i64>,
    pub percentage: Option<i64>,
    pub fixed: Option<i64>,
    pub usage_limit: Option<i64>,
    pub used: i64,
    pub expiry_date: Option<Timestamp>,
}

impl SeedDiscount {
    pub(crate) fn new(vendor: VendorUuid) -> Self {
        Self {
            vendor,
            products: Vec::new(),
            categories: Vec::new(),
            coupon_code: None,
            coupon_percentage: None,
            coupon_fixed: None,
            percentage: None,
            fixed: None,
            usage_limit: None,
            used: 0,
            expiry_date: None,
        }
    }

    fn kind(&self) -> DiscountKind {
        if self.coupon_code.is_some() {
            DiscountKind::Coupon
        } else if self.percentage.is_some() {
            DiscountKind::Percentage
        } else if self.fixed.is_some() {
            DiscountKind::Fixed
        } else {
            DiscountKind::FreeShipping
        }
    }
}

pub(crate) async fn create_discount(
    ctx: &TestContext,
    seed: SeedDiscount,
) -> Result<DiscountUuid, sqlx::Error> {
    let discount = DiscountUuid::new();
    let mut tx = ctx.db.pool().begin().await?;

    query(
        "INSERT INTO discounts (uuid, kind, discounter_uuid, coupon_code, coupon_percentage, \
         coupon_fixed, percentage, fixed, free_shipping, usage_limit, used, expiry_date) \
         VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12)",
    )
    .bind(discount.into_uuid())
    .bind(seed.kind().as_str())
    .bind(seed.vendor.into_uuid())
    .bind(seed.coupon_code.as_deref())
    .bind(seed.coupon_percentage.map(Decimal::from))
    .bind(seed.coupon_fixed)
    .bind(seed.percentage.map(Decimal::from))
    .bind(seed.fixed)
    .bind(seed.kind() == DiscountKind::FreeShipping)
    .bind(seed.usage_limit)
    .bind(seed.used)
    .bind(seed.expiry_date.map(SqlxTimestamp::from))
    .execute(&mut *tx)
    .await?;

    for product in &seed.products {
        query("INSERT INTO discount_products (discount_uuid, product_uuid) VALUES ($1, $2)")
            .bind(discount.into_uuid())
            .bind(product.into_uuid())
            .execute(&mut *tx)
            .await?;
    }

    for category in &seed.categories {
        query("INSERT INTO discount_categories (discount_uuid, category_uuid) VALUES ($1, $2)")
            .bind(discount.into_uuid())
            .bind(category.into_uuid())
            .execute(&mut *tx)
            .await?;
    }

    tx.commit().await?;

    Ok(discount)
}

pub(crate) async fn discount_used(
    ctx: &TestContext,
    discount: DiscountUuid,
) -> Result<i64, sqlx::Error> {
    query_scalar("SELECT used FROM discounts WHERE uuid = $1")
        .bind(discount.into_uuid())
        .fetch_one(ctx.db.pool())
        .await
}

pub(crate) async fn create_batch(
    ctx: &TestContext,
    product: ProductUuid,
    quantity: i64,
    is_current: bool,
) -> Result<BatchUuid, sqlx::Error> {
    let batch = BatchUuid::new();

    query(
        "INSERT INTO inventory_batches (uuid, product_uuid, quantity, is_current, created_at) \
         VALUES ($1, $2, $3, $4, clock_timestamp())",
    )
    .bind(batch.into_uuid())
    .bind(product.into_uuid())
    .bind(quantity)
    .bind(is_current)
    .execute(ctx.db.pool())
    .await?;

    Ok(batch)
}

pub(crate) async fn batch_quantity(ctx: &TestContext, batch: BatchUuid) -> Result<i64, sqlx::Error> {
    query_scalar("SELECT quantity FROM inventory_batches WHERE uuid = $1")
        .bind(batch.into_uuid())
        .fetch_one(ctx.db.pool())
        .await
}

/// Places a one line order for a fresh customer, straight through the
/// orders service.
pub(crate) async fn create_order(ctx: &TestContext) -> Result<Order, Box<dyn std::error::Error>> {
    let (customer, address) = create_customer(ctx, "Grace").await?;
    let vendor = create_vendor(ctx).await?;
    let lamp = create_product(ctx, vendor, "Desk Lamp", 5_000).await?;

    let products = ctx.catalog.read_products(&[lamp]).await?;

    let lines = products
        .iter()
        .map(|product| price_line(product, 1, &AttributeSelection::None, Vec::new(), &[]))
        .collect::<Result<Vec<_>, _>>()?;

    let assembled = assemble_order(&lines)?;

    let order = ctx
        .orders
        .create_order(NewOrder::from_assembled(customer, address, assembled))
        .await?;

    Ok(order)
}
