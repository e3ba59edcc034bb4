use std::fmt;

use super::errors::OrderEventError;

// ============================================================================
// Order Value Objects
// ============================================================================
//
// All value objects validate on construction and expose read-only accessors.
// Once built they cannot be changed; downstream stages only read them or
// produce re-encoded copies.
//
// ============================================================================

/// Largest legal `nanos` value (one whole unit minus one billionth)
pub const MAX_NANOS: i32 = 999_999_999;

/// A monetary amount: whole `units` plus billionths in `nanos`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Money {
    currency_code: String,
    units: i64,
    nanos: i32,
}

impl Money {
    pub fn new(currency_code: impl Into<String>, units: i64, nanos: i32) -> Result<Self, OrderEventError> {
        let currency_code = currency_code.into();

        if currency_code.is_empty() {
            return Err(OrderEventError::EmptyField("currencyCode"));
        }
        if currency_code.len() != 3 || !currency_code.bytes().all(|b| b.is_ascii_uppercase()) {
            return Err(OrderEventError::InvalidCurrencyCode(currency_code));
        }
        if !(0..=MAX_NANOS).contains(&nanos) {
            return Err(OrderEventError::NanosOutOfRange(nanos));
        }
        // nanos is never negative, so a fractional part only pairs with a non-negative amount
        if nanos > 0 && units < 0 {
            return Err(OrderEventError::SignMismatch { units, nanos });
        }

        Ok(Self { currency_code, units, nanos })
    }

    pub fn currency_code(&self) -> &str {
        &self.currency_code
    }

    pub fn units(&self) -> i64 {
        self.units
    }

    pub fn nanos(&self) -> i32 {
        self.nanos
    }
}

impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}.{:09}", self.currency_code, self.units, self.nanos)
    }
}

/// Postal address the order ships to
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Address {
    street_address: String,
    city: String,
    state: String,
    country: String,
    zip_code: String,
}

impl Address {
    pub fn new(
        street_address: impl Into<String>,
        city: impl Into<String>,
        state: impl Into<String>,
        country: impl Into<String>,
        zip_code: impl Into<String>,
    ) -> Result<Self, OrderEventError> {
        let address = Self {
            street_address: street_address.into(),
            city: city.into(),
            state: state.into(),
            country: country.into(),
            zip_code: zip_code.into(),
        };

        let fields = [
            ("streetAddress", &address.street_address),
            ("city", &address.city),
            ("state", &address.state),
            ("country", &address.country),
            ("zipCode", &address.zip_code),
        ];
        for (name, value) in fields {
            if value.is_empty() {
                return Err(OrderEventError::EmptyField(name));
            }
        }

        Ok(address)
    }

    pub fn street_address(&self) -> &str {
        &self.street_address
    }

    pub fn city(&self) -> &str {
        &self.city
    }

    pub fn state(&self) -> &str {
        &self.state
    }

    pub fn country(&self) -> &str {
        &self.country
    }

    pub fn zip_code(&self) -> &str {
        &self.zip_code
    }
}

/// One line of a completed order: a product, how many, and the line's total cost
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrderLineItem {
    product_id: String,
    quantity: i32,
    cost: Money,
}

impl OrderLineItem {
    pub fn new(product_id: impl Into<String>, quantity: i32, cost: Money) -> Result<Self, OrderEventError> {
        let product_id = product_id.into();

        if product_id.is_empty() {
            return Err(OrderEventError::EmptyField("productId"));
        }
        if quantity <= 0 {
            return Err(OrderEventError::InvalidQuantity(quantity));
        }

        Ok(Self { product_id, quantity, cost })
    }

    pub fn product_id(&self) -> &str {
        &self.product_id
    }

    pub fn quantity(&self) -> i32 {
        self.quantity
    }

    pub fn cost(&self) -> &Money {
        &self.cost
    }
}

// ============================================================================
// Unit Tests
// ============================================================================
