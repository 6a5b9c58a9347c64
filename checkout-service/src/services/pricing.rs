//! Cart validation and pricing.
//!
//! Everything here is a pure function of the submitted cart and the static
//! [`PricingRules`]. Validation stops at the first violation and nothing is
//! priced until the whole cart has passed.

use serde::Deserialize;
use thiserror::Error;

use crate::dtos::CartItemInput;
use crate::models::{CartItem, PricedCart, ShippingRegion};

pub const DEFAULT_CURRENCY: &str = "INR";

/// Spellings and abbreviations of the discounted shipping region, matched
/// case-insensitively as substrings of the submitted state name.
pub const DISCOUNTED_REGION_SPELLINGS: [&str; 4] = ["tamil nadu", "tamil nadoo", "tamilnadu", "tn"];

#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
pub struct PricingRules {
    pub max_item_price: f64,
    pub max_item_quantity: u32,
    pub max_cart_subtotal: f64,
    pub tax_rate: f64,
    pub discounted_shipping_rate: f64,
    pub standard_shipping_rate: f64,
}

impl Default for PricingRules {
    fn default() -> Self {
        Self {
            max_item_price: 100_000.0,
            max_item_quantity: 100,
            max_cart_subtotal: 10_000_000.0,
            tax_rate: 0.1,
            discounted_shipping_rate: 70.0,
            standard_shipping_rate: 100.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum PricingError {
    #[error("Invalid cartItems: cart is empty")]
    EmptyCart,

    #[error("Invalid productId for item {index}: must be a non-empty string")]
    InvalidProductId { index: usize },

    #[error("Invalid price for item {index}: must be a positive number not exceeding {max}")]
    InvalidPrice { index: usize, max: f64 },

    #[error("Invalid quantity for item {index}: must be a positive integer not exceeding {max}")]
    InvalidQuantity { index: usize, max: u32 },

    #[error("Invalid cart subtotal: must be positive and not exceed {max}")]
    InvalidSubtotal { max: f64 },

    #[error("Invalid currency: {0}")]
    InvalidCurrency(String),
}

impl ShippingRegion {
    /// Classify a free-text state name. `None` or `""` means the address is
    /// not known yet; any other string is a real, if unrecognised, address.
    pub fn classify(shipping_state: Option<&str>) -> Self {
        let state = match shipping_state {
            Some(state) if !state.is_empty() => state.trim().to_lowercase(),
            _ => return ShippingRegion::Unknown,
        };

        if DISCOUNTED_REGION_SPELLINGS
            .iter()
            .any(|spelling| state.contains(spelling))
        {
            ShippingRegion::Discounted
        } else {
            ShippingRegion::Standard
        }
    }

    pub fn shipping_cost(self, rules: &PricingRules) -> f64 {
        match self {
            ShippingRegion::Unknown => 0.0,
            ShippingRegion::Discounted => rules.discounted_shipping_rate,
            ShippingRegion::Standard => rules.standard_shipping_rate,
        }
    }
}

/// Check every line of the cart and turn it into [`CartItem`]s.
pub fn validate_cart(
    items: &[CartItemInput],
    rules: &PricingRules,
) -> Result<Vec<CartItem>, PricingError> {
    if items.is_empty() {
        return Err(PricingError::EmptyCart);
    }

    items
        .iter()
        .enumerate()
        .map(|(index, item)| validate_item(index, item, rules))
        .collect()
}

fn validate_item(
    index: usize,
    item: &CartItemInput,
    rules: &PricingRules,
) -> Result<CartItem, PricingError> {
    let product_id = match item.product_id.as_deref() {
        Some(id) if !id.trim().is_empty() => id.to_string(),
        _ => return Err(PricingError::InvalidProductId { index }),
    };

    let price = match item.price {
        Some(price) if price.is_finite() && price > 0.0 && price <= rules.max_item_price => price,
        _ => {
            return Err(PricingError::InvalidPrice {
                index,
                max: rules.max_item_price,
            })
        }
    };

    let quantity = match item.quantity {
        Some(q) if q.fract() == 0.0 && q >= 1.0 && q <= f64::from(rules.max_item_quantity) => {
            q as u32
        }
        _ => {
            return Err(PricingError::InvalidQuantity {
                index,
                max: rules.max_item_quantity,
            })
        }
    };

    Ok(CartItem {
        product_id,
        price,
        quantity,
    })
}

/// Resolve the requested currency, defaulting to INR.
pub fn resolve_currency(currency: Option<&str>) -> Result<String, PricingError> {
    match currency.map(str::trim) {
        None | Some("") => Ok(DEFAULT_CURRENCY.to_string()),
        Some(code) if code.len() == 3 && code.chars().all(|c| c.is_ascii_alphabetic()) => {
            Ok(code.to_ascii_uppercase())
        }
        Some(code) => Err(PricingError::InvalidCurrency(code.to_string())),
    }
}

/// Price an already validated cart.
pub fn price_items(
    items: &[CartItem],
    shipping_state: Option<&str>,
    rules: &PricingRules,
) -> Result<PricedCart, PricingError> {
    let subtotal: f64 = items.iter().map(CartItem::line_total).sum();

    if !(subtotal > 0.0 && subtotal <= rules.max_cart_subtotal) {
        return Err(PricingError::InvalidSubtotal {
            max: rules.max_cart_subtotal,
        });
    }

    let shipping_cost = ShippingRegion::classify(shipping_state).shipping_cost(rules);
    let tax = subtotal * rules.tax_rate;
    let total = round_to_cents(subtotal + shipping_cost + tax);

    Ok(PricedCart {
        subtotal,
        shipping_cost,
        tax,
        total,
        item_count: items.len(),
    })
}

/// Validate and price a submitted cart in one step.
pub fn price_cart(
    items: &[CartItemInput],
    shipping_state: Option<&str>,
    rules: &PricingRules,
) -> Result<PricedCart, PricingError> {
    let items = validate_cart(items, rules)?;
    price_items(&items, shipping_state, rules)
}

fn round_to_cents(amount: f64) -> f64 {
    (amount * 100.0).round() / 100.0
}
