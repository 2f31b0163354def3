use serde::{Deserialize, Serialize};

/// One catalog position: a SKU code and its unit price
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CatalogItem {
    pub sku: String,
    pub unit_price: u64,
}

/// A priced line within an order quote
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QuoteLine {
    pub sku: String,
    pub quantity: u32,
    pub line_price: u64,
}

/// Result of pricing a whole quantity vector against the catalog
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderQuote {
    pub lines: Vec<QuoteLine>,
    pub total_price: u64,
    pub total_units: u32,
}

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum CatalogError {
    #[error("SKU index {index} out of catalog range (len {len})")]
    InvalidSku { index: usize, len: usize },
}

/// Position-indexed SKU price table, fixed at construction.
///
/// Orders reference catalog positions by index; the index range configured
/// here defines the valid SKU range for every future order.
#[derive(Debug, Clone)]
pub struct Catalog {
    items: Vec<CatalogItem>,
}

impl Catalog {
    pub fn new(items: Vec<CatalogItem>) -> Self {
        Self { items }
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn sku(&self, index: usize) -> Result<&str, CatalogError> {
        self.items
            .get(index)
            .map(|item| item.sku.as_str())
            .ok_or(CatalogError::InvalidSku {
                index,
                len: self.items.len(),
            })
    }

    /// Price a single catalog position. Pure, no side effects.
    pub fn price_of(&self, sku_index: usize, quantity: u32) -> Result<u64, CatalogError> {
        let item = self
            .items
            .get(sku_index)
            .ok_or(CatalogError::InvalidSku {
                index: sku_index,
                len: self.items.len(),
            })?;
        Ok(item.unit_price * quantity as u64)
    }

    /// Price a whole order. The quantity vector is position-indexed and must
    /// cover every catalog position, zero quantities included.
    pub fn quote(&self, quantities: &[u32]) -> Result<OrderQuote, CatalogError> {
        if quantities.len() != self.items.len() {
            return Err(CatalogError::InvalidSku {
                index: quantities.len(),
                len: self.items.len(),
            });
        }

        let mut lines = Vec::with_capacity(self.items.len());
        let mut total_price = 0u64;
        let mut total_units = 0u32;

        for (item, &quantity) in self.items.iter().zip(quantities) {
            let line_price = item.unit_price * quantity as u64;
            total_price += line_price;
            total_units += quantity;
            lines.push(QuoteLine {
                sku: item.sku.clone(),
                quantity,
                line_price,
            });
        }

        Ok(OrderQuote {
            lines,
            total_price,
            total_units,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn five_sku_catalog() -> Catalog {
        let skus = ["01500", "02500", "03150", "04100", "05100"];
        let prices = [500, 500, 150, 100, 100];
        Catalog::new(
            skus.iter()
                .zip(prices)
                .map(|(sku, unit_price)| CatalogItem {
                    sku: sku.to_string(),
                    unit_price,
                })
                .collect(),
        )
    }

    #[test]
    fn test_price_of_single_position() {
        let catalog = five_sku_catalog();
        assert_eq!(catalog.price_of(0, 3).unwrap(), 1500);
        assert_eq!(catalog.price_of(2, 0).unwrap(), 0);
    }

    #[test]
    fn test_price_of_out_of_range() {
        let catalog = five_sku_catalog();
        let result = catalog.price_of(5, 1);
        assert_eq!(result, Err(CatalogError::InvalidSku { index: 5, len: 5 }));
    }

    #[test]
    fn test_quote_totals() {
        let catalog = five_sku_catalog();
        let quote = catalog.quote(&[3, 5, 0, 3, 0]).unwrap();

        assert_eq!(quote.total_units, 11);
        assert_eq!(quote.total_price, 3 * 500 + 5 * 500 + 3 * 100);
        assert_eq!(quote.lines.len(), 5);
        assert_eq!(quote.lines[0].sku, "01500");
        assert_eq!(quote.lines[0].line_price, 1500);
    }

    #[test]
    fn test_quote_length_mismatch() {
        let catalog = five_sku_catalog();
        assert!(catalog.quote(&[1, 2]).is_err());
    }
}
