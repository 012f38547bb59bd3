use serde::{Deserialize, Serialize};

use crate::domain::finance::FinanceSummary;
use crate::domain::inventory::{InventoryStatus, LowStockItem};
use crate::domain::sales::SalesPatterns;
use crate::domain::ticket::{Ticket, TicketStats};
use crate::domain::vendor::Vendor;

/// Gathered context for a reorder recommendation: low-stock items
/// joined with vendor candidates ranked best-first.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct ReorderContext {
    pub low_stock: Vec<LowStockItem>,
    pub vendors: Vec<Vendor>,
}

/// Result of the gather stage. Each intent maps to exactly one
/// variant; an empty store yields the variant with empty contents,
/// never an error, so formatting always has a defined empty state.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum DataBundle {
    Inventory(InventoryStatus),
    Sales(SalesPatterns),
    Finance(FinanceSummary),
    Tickets { tickets: Vec<Ticket>, stats: TicketStats },
    Reorder(ReorderContext),
    Vendors(Vec<Vendor>),
    Empty,
}

impl DataBundle {
    /// Primary row count used by the ambiguity predicate of the
    /// decision policy.
    pub fn row_count(&self) -> usize {
        match self {
            Self::Inventory(status) => status.total_items,
            Self::Sales(patterns) => patterns.transaction_count.max(0) as usize,
            Self::Finance(summary) => summary.transaction_count.max(0) as usize,
            Self::Tickets { tickets, .. } => tickets.len(),
            Self::Reorder(context) => context.low_stock.len(),
            Self::Vendors(vendors) => vendors.len(),
            Self::Empty => 0,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.row_count() == 0
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::Inventory(_) => "inventory",
            Self::Sales(_) => "sales",
            Self::Finance(_) => "finance",
            Self::Tickets { .. } => "tickets",
            Self::Reorder(_) => "reorder",
            Self::Vendors(_) => "vendors",
            Self::Empty => "empty",
        }
    }
}
