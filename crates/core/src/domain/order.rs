use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::domain::product::ProductId;
use crate::errors::DomainError;

/// Order total at or above this amount ships free.
pub fn free_shipping_threshold() -> Decimal {
    Decimal::new(10_000, 2)
}

/// Flat fee applied below the free-shipping threshold.
pub fn shipping_fee() -> Decimal {
    Decimal::new(2_000, 2)
}

/// One extracted line of an order. Immutable once extracted for a given
/// utterance; re-extraction during the modify flow appends new items.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderItem {
    pub product_id: ProductId,
    pub display_name: String,
    pub quantity: u32,
    pub unit_price: Decimal,
}

impl OrderItem {
    pub fn subtotal(&self) -> Decimal {
        self.unit_price * Decimal::from(self.quantity)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum PaymentMethod {
    Cash,
    Transfer,
    Card,
}

impl PaymentMethod {
    pub fn label(&self) -> &'static str {
        match self {
            Self::Cash => "Efectivo",
            Self::Transfer => "Transferencia",
            Self::Card => "Tarjeta",
        }
    }

    /// Resolves "1"/"2"/"3" or the method name itself, as typed by the party.
    pub fn resolve(sanitized_text: &str) -> Option<Self> {
        if sanitized_text.contains('1') || sanitized_text.contains("efectivo") {
            Some(Self::Cash)
        } else if sanitized_text.contains('2') || sanitized_text.contains("transferencia") {
            Some(Self::Transfer)
        } else if sanitized_text.contains('3') || sanitized_text.contains("tarjeta") {
            Some(Self::Card)
        } else {
            None
        }
    }
}

/// The in-progress order assembled across dialogue turns. Fields fill
/// incrementally; the draft is discarded on confirm, cancel, or expiry.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderDraft {
    pub items: Vec<OrderItem>,
    pub address: Option<String>,
    pub phone: Option<String>,
    pub payment_method: Option<PaymentMethod>,
}

impl OrderDraft {
    pub fn is_complete(&self) -> bool {
        !self.items.is_empty()
            && self.address.is_some()
            && self.phone.is_some()
            && self.payment_method.is_some()
    }

    pub fn ensure_has_items(&self) -> Result<(), DomainError> {
        if self.items.is_empty() {
            return Err(DomainError::EmptyDraft);
        }
        Ok(())
    }
}

/// Shallow-merge patch for a draft; later writes of a field win.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct DraftPatch {
    pub items: Option<Vec<OrderItem>>,
    pub address: Option<String>,
    pub phone: Option<String>,
    pub payment_method: Option<PaymentMethod>,
}

impl DraftPatch {
    pub fn items(items: Vec<OrderItem>) -> Self {
        Self { items: Some(items), ..Self::default() }
    }

    pub fn address(address: impl Into<String>) -> Self {
        Self { address: Some(address.into()), ..Self::default() }
    }

    pub fn phone(phone: impl Into<String>) -> Self {
        Self { phone: Some(phone.into()), ..Self::default() }
    }

    pub fn payment_method(method: PaymentMethod) -> Self {
        Self { payment_method: Some(method), ..Self::default() }
    }

    pub fn apply_to(self, draft: &mut OrderDraft) {
        if let Some(items) = self.items {
            draft.items = items;
        }
        if let Some(address) = self.address {
            draft.address = Some(address);
        }
        if let Some(phone) = self.phone {
            draft.phone = Some(phone);
        }
        if let Some(payment_method) = self.payment_method {
            draft.payment_method = Some(payment_method);
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderTotals {
    pub total: Decimal,
    pub shipping_fee: Decimal,
    pub grand_total: Decimal,
}

impl OrderTotals {
    pub fn for_items(items: &[OrderItem]) -> Self {
        let total: Decimal = items.iter().map(OrderItem::subtotal).sum();
        let shipping_fee =
            if total >= free_shipping_threshold() { Decimal::ZERO } else { shipping_fee() };

        Self { total, shipping_fee, grand_total: total + shipping_fee }
    }

    pub fn free_shipping(&self) -> bool {
        self.shipping_fee.is_zero()
    }
}
