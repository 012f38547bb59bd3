use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::domain::region::Region;

/// Low-stock projection used by the inventory and reorder bundles.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct LowStockItem {
    pub sku: String,
    pub name: String,
    pub category: String,
    pub region: Region,
    pub quantity: i64,
    pub reorder_threshold: i64,
    pub vendor_id: String,
}

/// Aggregated inventory report: totals plus the low-stock list.
/// Well-typed when empty so downstream formatting has a defined
/// empty-state.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct InventoryStatus {
    pub total_items: usize,
    pub low_stock: Vec<LowStockItem>,
    pub by_category: BTreeMap<String, i64>,
    pub by_region: BTreeMap<Region, i64>,
}

impl InventoryStatus {
    pub fn low_stock_count(&self) -> usize {
        self.low_stock.len()
    }
}

/// Restock-to-target quantity: `threshold * multiplier` minus what is
/// already on hand, clamped at zero.
pub fn reorder_quantity(current_qty: i64, threshold: i64, multiplier: f64) -> i64 {
    let target = (threshold as f64 * multiplier) as i64;
    (target - current_qty).max(0)
}
