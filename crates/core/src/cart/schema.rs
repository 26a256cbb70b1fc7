//! Persisted cart envelope and schema migration.
//!
//! A cart is stored in a single slot as
//! `{"state": {"items": [...]}, "version": N}`. Version 2 is current.
//! Version 1 (and the untagged version 0) predate `originalPrice`; loading
//! them back-fills `originalPrice := price` on every line.
//!
//! Known versions are a closed set ([`CartSchema`]). A blob tagged with a
//! version newer than [`CURRENT_SCHEMA_VERSION`] is never reinterpreted: the
//! load reports [`ResetReason::UnsupportedVersion`] and yields an empty cart.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::{Cart, CartLineItem};
use crate::types::{Money, ProductId};

/// Name of the durable slot holding the cart.
pub const CART_STORAGE_KEY: &str = "liahna-cart";

/// Schema version written by this code.
pub const CURRENT_SCHEMA_VERSION: u32 = 2;

/// Errors decoding a persisted blob.
#[derive(thiserror::Error, Debug)]
pub enum SchemaError {
    /// The blob is not a valid envelope for its version.
    #[error("malformed cart data: {0}")]
    Malformed(#[from] serde_json::Error),

    /// The blob was written by a newer release.
    #[error("unsupported cart schema version {0} (current is {CURRENT_SCHEMA_VERSION})")]
    UnsupportedVersion(u32),
}

/// The current persisted shape.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PersistedCart {
    pub state: PersistedState<CartLineItem>,
    pub version: u32,
}

/// `state` member of the envelope.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PersistedState<T> {
    #[serde(default = "Vec::new")]
    pub items: Vec<T>,
}

impl PersistedCart {
    /// Snapshot a cart at the current schema version.
    #[must_use]
    pub fn from_cart(cart: &Cart) -> Self {
        Self {
            state: PersistedState {
                items: cart.items().to_vec(),
            },
            version: CURRENT_SCHEMA_VERSION,
        }
    }

    /// Rebuild the cart.
    #[must_use]
    pub fn into_cart(self) -> Cart {
        Cart::from_items(self.state.items)
    }
}

/// A line as written before `originalPrice` existed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LegacyLineItem {
    pub id: ProductId,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub slug: Option<String>,
    pub price: Money,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub original_price: Option<Money>,
    pub quantity: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub variant: Option<String>,
    #[serde(flatten, default, skip_serializing_if = "BTreeMap::is_empty")]
    pub extra: BTreeMap<String, Value>,
}

/// Every schema version this code understands.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CartSchema {
    /// Versions 0 and 1: `originalPrice` may be missing.
    V1(Vec<LegacyLineItem>),
    /// Version 2: current.
    V2(Vec<CartLineItem>),
}

/// Envelope read before the version is known.
#[derive(Deserialize)]
struct RawEnvelope {
    #[serde(default)]
    state: Option<Value>,
    #[serde(default)]
    version: Option<u32>,
}

impl CartSchema {
    /// Decode a persisted blob into its schema version.
    ///
    /// # Errors
    ///
    /// [`SchemaError::Malformed`] if the blob does not match its version's
    /// shape, [`SchemaError::UnsupportedVersion`] if the version is newer
    /// than [`CURRENT_SCHEMA_VERSION`].
    pub fn decode(blob: Value) -> Result<Self, SchemaError> {
        let envelope: RawEnvelope = serde_json::from_value(blob)?;
        let version = envelope.version.unwrap_or(0);
        let state = envelope.state.unwrap_or_else(|| Value::Object(serde_json::Map::new()));

        match version {
            0 | 1 => {
                let state: PersistedState<LegacyLineItem> = serde_json::from_value(state)?;
                Ok(Self::V1(state.items))
            }
            CURRENT_SCHEMA_VERSION => {
                let state: PersistedState<CartLineItem> = serde_json::from_value(state)?;
                Ok(Self::V2(state.items))
            }
            newer => Err(SchemaError::UnsupportedVersion(newer)),
        }
    }

    /// Version number of this schema.
    #[must_use]
    pub const fn version(&self) -> u32 {
        match self {
            Self::V1(_) => 1,
            Self::V2(_) => CURRENT_SCHEMA_VERSION,
        }
    }

    /// Bring the data to the current shape. Never drops lines or fields.
    #[must_use]
    pub fn migrate(self) -> Vec<CartLineItem> {
        match self {
            Self::V1(items) => backfill_original_price(items)
                .into_iter()
                .map(upgrade_line)
                .collect(),
            Self::V2(items) => items,
        }
    }
}

/// Fill in `originalPrice := price` where it is missing.
///
/// Idempotent: lines that already carry an original price are untouched.
#[must_use]
pub fn backfill_original_price(items: Vec<LegacyLineItem>) -> Vec<LegacyLineItem> {
    items
        .into_iter()
        .map(|mut item| {
            item.original_price.get_or_insert(item.price);
            item
        })
        .collect()
}

fn upgrade_line(item: LegacyLineItem) -> CartLineItem {
    CartLineItem {
        original_price: item.original_price.unwrap_or(item.price),
        id: item.id,
        name: item.name,
        slug: item.slug,
        price: item.price,
        quantity: item.quantity,
        image: item.image,
        variant: item.variant,
        extra: item.extra,
    }
}

/// Why a stored cart was discarded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResetReason {
    /// The blob could not be parsed.
    Malformed(String),
    /// The blob was written by a newer release.
    UnsupportedVersion(u32),
}

/// Result of restoring a cart from its slot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoadOutcome {
    /// Nothing stored yet.
    Empty,
    /// Restored, possibly after migrating from an older version.
    Loaded {
        cart: Cart,
        migrated_from: Option<u32>,
    },
    /// The stored data was unusable; the session starts with an empty cart.
    Reset { reason: ResetReason },
}

impl LoadOutcome {
    /// The cart to continue the session with.
    #[must_use]
    pub fn into_cart(self) -> Cart {
        match self {
            Self::Loaded { cart, .. } => cart,
            Self::Empty | Self::Reset { .. } => Cart::new(),
        }
    }
}

/// Restore a cart from an optional persisted blob.
///
/// Never fails: unusable data degrades to an empty cart with the reason
/// reported in the outcome.
#[must_use]
pub fn load_cart(blob: Option<Value>) -> LoadOutcome {
    let Some(blob) = blob else {
        return LoadOutcome::Empty;
    };

    match CartSchema::decode(blob) {
        Ok(schema) => {
            let version = schema.version();
            let migrated_from = (version != CURRENT_SCHEMA_VERSION).then_some(version);
            LoadOutcome::Loaded {
                cart: Cart::from_items(schema.migrate()),
                migrated_from,
            }
        }
        Err(SchemaError::UnsupportedVersion(version)) => LoadOutcome::Reset {
            reason: ResetReason::UnsupportedVersion(version),
        },
        Err(SchemaError::Malformed(err)) => LoadOutcome::Reset {
            reason: ResetReason::Malformed(err.to_string()),
        },
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::cart::tests::snapshot;

    fn legacy_blob() -> Value {
        json!({
            "state": {
                "items": [
                    {"id": "prd-a", "name": "A", "price": 36, "quantity": 2, "image": "/a.jpg"},
                    {"id": "prd-b", "name": "B", "price": 28, "originalPrice": 30, "quantity": 1,
                     "engraving": "L"}
                ]
            },
            "version": 1
        })
    }

    #[test]
    fn test_missing_blob_is_empty() {
        assert_eq!(load_cart(None), LoadOutcome::Empty);
    }

    #[test]
    fn test_v1_backfills_original_price() {
        let LoadOutcome::Loaded { cart, migrated_from } = load_cart(Some(legacy_blob())) else {
            panic!("expected a loaded cart");
        };

        assert_eq!(migrated_from, Some(1));
        let items = cart.items();
        assert_eq!(items.len(), 2);
        assert_eq!(items[0].price, Money::from_cents(3600));
        assert_eq!(items[0].original_price, Money::from_cents(3600));
        assert_eq!(items[0].quantity, 2);
        assert_eq!(items[1].original_price, Money::from_cents(3000));
    }

    #[test]
    fn test_migration_keeps_unknown_fields() {
        let cart = load_cart(Some(legacy_blob())).into_cart();
        assert_eq!(cart.items()[1].extra.get("engraving"), Some(&json!("L")));

        let written = serde_json::to_value(PersistedCart::from_cart(&cart)).unwrap();
        assert_eq!(written["state"]["items"][1]["engraving"], json!("L"));
        assert_eq!(written["version"], json!(CURRENT_SCHEMA_VERSION));
    }

    #[test]
    fn test_backfill_is_idempotent() {
        let CartSchema::V1(items) = CartSchema::decode(legacy_blob()).unwrap() else {
            panic!("expected v1");
        };
        let once = backfill_original_price(items);
        let twice = backfill_original_price(once.clone());
        assert_eq!(once, twice);
    }

    #[test]
    fn test_untagged_blob_is_treated_as_v1() {
        let blob = json!({"state": {"items": [{"id": "a", "name": "A", "price": "10.00", "quantity": 1}]}});
        let outcome = load_cart(Some(blob));
        let LoadOutcome::Loaded { cart, migrated_from } = outcome else {
            panic!("expected a loaded cart");
        };
        assert_eq!(migrated_from, Some(1));
        assert_eq!(cart.items()[0].original_price, Money::from_cents(1000));
    }

    #[test]
    fn test_current_version_roundtrip_is_not_migrated() {
        let mut cart = Cart::new();
        cart.add_item(snapshot("a", 4200, Some(3600)), 2);
        let blob = serde_json::to_value(PersistedCart::from_cart(&cart)).unwrap();

        assert_eq!(
            load_cart(Some(blob)),
            LoadOutcome::Loaded {
                cart,
                migrated_from: None
            }
        );
    }

    #[test]
    fn test_newer_version_resets() {
        let blob = json!({"state": {"items": []}, "version": 3});
        assert_eq!(
            load_cart(Some(blob)),
            LoadOutcome::Reset {
                reason: ResetReason::UnsupportedVersion(3)
            }
        );
    }

    #[test]
    fn test_malformed_blob_resets() {
        for blob in [
            json!("not an envelope"),
            json!({"state": {"items": [{"id": "a"}]}, "version": 2}),
            json!({"state": {"items": "nope"}, "version": 1}),
        ] {
            let outcome = load_cart(Some(blob));
            assert!(matches!(
                outcome,
                LoadOutcome::Reset {
                    reason: ResetReason::Malformed(_)
                }
            ));
            assert!(outcome.into_cart().is_empty());
        }
    }
}
