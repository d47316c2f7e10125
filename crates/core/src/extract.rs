use crate::catalog::ProductCatalog;
use crate::domain::order::OrderItem;
use crate::text::{sanitize, tokenize};

/// Parses free text into priced order items using the fixed product
/// lexicon. An empty result means "could not understand the order" and
/// must be answered with a clarification prompt, never treated as an
/// order of zero items.
#[derive(Clone, Debug, Default)]
pub struct OrderExtractor {
    catalog: ProductCatalog,
}

impl OrderExtractor {
    pub fn new(catalog: ProductCatalog) -> Self {
        Self { catalog }
    }

    pub fn catalog(&self) -> &ProductCatalog {
        &self.catalog
    }

    /// Scans for `<digits> <alias>` occurrences; every match emits one
    /// item, so one utterance may order several products at once.
    pub fn extract(&self, text: &str) -> Vec<OrderItem> {
        let sanitized = sanitize(text);
        let tokens = tokenize(&sanitized);
        let mut items = Vec::new();

        for window in tokens.windows(2) {
            let [quantity_token, alias_token] = window else {
                continue;
            };

            let Ok(quantity) = quantity_token.parse::<u32>() else {
                continue;
            };
            if quantity == 0 {
                continue;
            }

            if let Some(product) = self.catalog.find_alias(alias_token) {
                items.push(OrderItem {
                    product_id: product.id.clone(),
                    display_name: product.name.clone(),
                    quantity,
                    unit_price: product.unit_price,
                });
            }
        }

        items
    }
}
