//! Catalog

use jiff::Timestamp;
use serde::{Deserialize, Serialize};

use crate::uuids::TypedUuid;

/// Product UUID
pub type ProductUuid = TypedUuid<Product>;

/// Vendor UUID
pub type VendorUuid = TypedUuid<Vendor>;

/// Category UUID
pub type CategoryUuid = TypedUuid<Category>;

/// Attribute UUID
pub type AttributeUuid = TypedUuid<Attribute>;

/// Vendor marker, vendors are only ever referenced by id here.
#[derive(Debug, Clone, Copy)]
pub struct Vendor;

/// Opaque reference to an image held by the media store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImageRef {
    /// Public URL of the image
    pub url: String,

    /// Media store identifier
    pub public_id: String,
}

/// Category a product is listed under.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Category {
    /// Category id
    pub uuid: CategoryUuid,

    /// Category name
    pub name: String,
}

/// Selectable product attribute, optionally carrying a surcharge.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Attribute {
    /// Attribute id
    pub uuid: AttributeUuid,

    /// Owning product
    pub product: ProductUuid,

    /// Attribute name, e.g. "colour"
    pub name: String,

    /// Attribute value, e.g. "red"
    pub value: String,

    /// Surcharge in minor units, added to the base price when selected
    pub extra_price: Option<i64>,
}

impl Attribute {
    /// Surcharge in minor units, zero when the attribute has none.
    pub fn extra_price_or_zero(&self) -> i64 {
        self.extra_price.unwrap_or_default()
    }
}

/// Product as read from the catalog, with everything pricing needs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Product {
    /// Product id
    pub uuid: ProductUuid,

    /// Selling vendor
    pub vendor: VendorUuid,

    /// Product name
    pub name: String,

    /// Base price in minor units
    pub price: i64,

    /// Units sold so far
    pub sold_count: i64,

    /// Product images, the first one is used for order snapshots
    pub images: Vec<ImageRef>,

    /// Categories the product is listed under
    pub categories: Vec<Category>,

    /// Every attribute defined for the product
    pub attributes: Vec<Attribute>,

    /// Creation time
    pub created_at: Timestamp,
}

impl Product {
    /// Category ids, used as join keys for category-scoped discounts.
    pub fn category_uuids(&self) -> Vec<CategoryUuid> {
        self.categories.iter().map(|category| category.uuid).collect()
    }
}

/// Which of a product's attributes a line selects.
///
/// Selection is always explicit: without an allowlist nothing is selected and
/// the line carries no surcharge.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum AttributeSelection {
    /// No attributes selected.
    #[default]
    None,

    /// Only attributes whose id appears in the list are selected.
    Allowlist(Vec<AttributeUuid>),
}

impl AttributeSelection {
    /// Builds a selection from caller supplied ids, empty meaning none.
    pub fn from_ids(ids: &[AttributeUuid]) -> Self {
        if ids.is_empty() {
            Self::None
        } else {
            Self::Allowlist(ids.to_vec())
        }
    }

    /// Returns the attributes of `product` picked by this selection.
    pub fn select<'a>(&self, product: &'a Product) -> Vec<&'a Attribute> {
        match self {
            Self::None => Vec::new(),
            Self::Allowlist(ids) => product
                .attributes
                .iter()
                .filter(|attribute| ids.contains(&attribute.uuid))
                .collect(),
        }
    }
}
