use serde::Serialize;

/// A cart line that passed validation. Built only by
/// [`crate::services::pricing::validate_cart`].
#[derive(Debug, Clone, PartialEq)]
pub struct CartItem {
    pub product_id: String,
    /// Unit price in the base currency unit (rupees).
    pub price: f64,
    pub quantity: u32,
}

impl CartItem {
    pub fn line_total(&self) -> f64 {
        self.price * f64::from(self.quantity)
    }
}

/// Server-side price breakdown for a validated cart. Never persisted.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PricedCart {
    pub subtotal: f64,
    pub shipping_cost: f64,
    pub tax: f64,
    pub total: f64,
    #[serde(skip)]
    pub item_count: usize,
}

impl PricedCart {
    /// Amount to charge in the gateway's minor unit (paise for INR).
    pub fn amount_minor(&self) -> u64 {
        (self.total * 100.0).round() as u64
    }
}

/// Shipping bucket a free-text state name falls into.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShippingRegion {
    /// No address yet (price preview).
    Unknown,
    /// The home state, shipped at the low flat rate.
    Discounted,
    Standard,
}
