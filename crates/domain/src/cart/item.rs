//! Catalog entities and cart line items.

use common::{ItemId, Money};
use serde::{Deserialize, Deserializer, Serialize};

/// Reads a unit price, rejecting negative amounts.
fn unit_price<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Money, D::Error> {
    let price = Money::deserialize(deserializer)?;
    if price.is_negative() {
        return Err(serde::de::Error::custom(format!(
            "unit price must not be negative, got {price}"
        )));
    }
    Ok(price)
}

/// A product bundled inside a package.
///
/// Listings populate the product; freshly created packages may reference
/// it by id only, in which case `name` is empty.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "IncludedRepr")]
pub struct IncludedItem {
    #[serde(rename = "_id", default, skip_serializing_if = "Option::is_none")]
    pub id: Option<ItemId>,

    pub name: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub price: Option<Money>,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum IncludedRepr {
    Reference(ItemId),
    Populated {
        #[serde(rename = "_id", default)]
        id: Option<ItemId>,
        name: String,
        #[serde(default)]
        description: Option<String>,
        #[serde(default)]
        price: Option<Money>,
    },
}

impl From<IncludedRepr> for IncludedItem {
    fn from(repr: IncludedRepr) -> Self {
        match repr {
            IncludedRepr::Reference(id) => Self {
                id: Some(id),
                name: String::new(),
                description: None,
                price: None,
            },
            IncludedRepr::Populated {
                id,
                name,
                description,
                price,
            } => Self {
                id,
                name,
                description,
                price,
            },
        }
    }
}

impl IncludedItem {
    /// Creates an included item with just a name.
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            id: None,
            name: name.into(),
            description: None,
            price: None,
        }
    }
}

/// A product or package as served by the catalog API.
///
/// Packages are recognised by the presence of `include`; that shape is only
/// inspected here, when the entity becomes a line item.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CatalogEntity {
    #[serde(rename = "_id")]
    pub id: ItemId,

    pub name: String,

    #[serde(deserialize_with = "unit_price")]
    pub price: Money,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub include: Option<Vec<IncludedItem>>,
}

impl CatalogEntity {
    /// Creates a standalone product entity.
    pub fn product(id: impl Into<ItemId>, name: impl Into<String>, price: Money) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            price,
            description: None,
            include: None,
        }
    }

    /// Creates a package entity bundling `include`.
    pub fn package(
        id: impl Into<ItemId>,
        name: impl Into<String>,
        price: Money,
        include: Vec<IncludedItem>,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            price,
            description: None,
            include: Some(include),
        }
    }

    /// Returns the explicit kind of this entity.
    pub fn kind(&self) -> ItemKind {
        match &self.include {
            Some(include) => ItemKind::Package {
                include: include.clone(),
            },
            None => ItemKind::Product,
        }
    }
}

/// Whether a line item is a standalone product or a bundled package.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum ItemKind {
    Product,
    Package { include: Vec<IncludedItem> },
}

impl ItemKind {
    /// Returns the kind tag used in order lines.
    pub fn line_kind(&self) -> LineKind {
        match self {
            ItemKind::Product => LineKind::Product,
            ItemKind::Package { .. } => LineKind::Package,
        }
    }
}

/// Kind tag of an order line reference.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LineKind {
    Product,
    Package,
}

impl LineKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            LineKind::Product => "product",
            LineKind::Package => "package",
        }
    }
}

impl std::fmt::Display for LineKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One catalog selection inside the cart, with its chosen quantity.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CartLineItem {
    #[serde(rename = "_id")]
    pub id: ItemId,

    pub name: String,

    /// Price per unit.
    #[serde(deserialize_with = "unit_price")]
    pub price: Money,

    /// Always at least 1 while the item is in a cart.
    pub quantity: u32,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    #[serde(flatten)]
    pub kind: ItemKind,
}

impl CartLineItem {
    /// Creates a line item with quantity 1 from a catalog entity.
    pub fn from_entity(entity: &CatalogEntity) -> Self {
        Self {
            id: entity.id.clone(),
            name: entity.name.clone(),
            price: entity.price,
            quantity: 1,
            description: entity.description.clone(),
            kind: entity.kind(),
        }
    }

    /// Returns the total price for this line (quantity * price).
    pub fn total_price(&self) -> Money {
        self.price.multiply(self.quantity)
    }

    pub fn is_package(&self) -> bool {
        matches!(self.kind, ItemKind::Package { .. })
    }
}
