use rust_decimal::Decimal;

use crate::domain::product::{Product, ProductId};
use crate::text::sanitize;

/// One lexicon entry: the aliases a party may type for a product.
/// Aliases are stored pre-sanitized (lowercase, no diacritics).
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CatalogEntry {
    pub product: Product,
    pub aliases: Vec<&'static str>,
}

/// Fixed, read-only mapping from lexical aliases to products with unit
/// prices. The lexicon is static for the lifetime of the process.
#[derive(Clone, Debug)]
pub struct ProductCatalog {
    entries: Vec<CatalogEntry>,
}

impl Default for ProductCatalog {
    fn default() -> Self {
        Self {
            entries: vec![
                CatalogEntry {
                    product: Product {
                        id: ProductId("garrafon-20l".to_string()),
                        name: "Garrafón 20L".to_string(),
                        unit_price: Decimal::new(3_500, 2),
                    },
                    aliases: vec!["garrafon", "garrafones", "garrafa", "garrafas"],
                },
                CatalogEntry {
                    product: Product {
                        id: ProductId("botella-1l".to_string()),
                        name: "Botella 1L".to_string(),
                        unit_price: Decimal::new(1_000, 2),
                    },
                    aliases: vec!["botella", "botellas", "litro", "litros"],
                },
                CatalogEntry {
                    product: Product {
                        id: ProductId("paquete-12".to_string()),
                        name: "Paquete 12 botellas".to_string(),
                        unit_price: Decimal::new(9_500, 2),
                    },
                    aliases: vec!["paquete", "paquetes", "caja", "cajas"],
                },
            ],
        }
    }
}

impl ProductCatalog {
    pub fn new(entries: Vec<CatalogEntry>) -> Self {
        Self { entries }
    }

    pub fn entries(&self) -> &[CatalogEntry] {
        &self.entries
    }

    pub fn find_alias(&self, mention: &str) -> Option<&Product> {
        let sanitized_mention = sanitize(mention);
        self.entries
            .iter()
            .find(|entry| entry.aliases.iter().any(|alias| *alias == sanitized_mention))
            .map(|entry| &entry.product)
    }

    pub fn find(&self, product_id: &ProductId) -> Option<&Product> {
        self.entries
            .iter()
            .find(|entry| &entry.product.id == product_id)
            .map(|entry| &entry.product)
    }
}

#[cfg(test)]
mod tests {
    use rust_decimal::Decimal;

    use super::ProductCatalog;

    #[test]
    fn finds_products_through_any_alias() {
        let catalog = ProductCatalog::default();
        let garrafon = catalog.find_alias("garrafones").expect("alias should resolve");
        assert_eq!(garrafon.name, "Garrafón 20L");
        assert_eq!(garrafon.unit_price, Decimal::new(3_500, 2));

        assert_eq!(catalog.find_alias("Garrafón").map(|p| p.name.as_str()), Some("Garrafón 20L"));
        assert_eq!(catalog.find_alias("caja").map(|p| p.name.as_str()), Some("Paquete 12 botellas"));
        assert!(catalog.find_alias("refresco").is_none());
    }
}
