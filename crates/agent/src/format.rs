//! Pure response formatting. No network or database access;
//! deterministic given its inputs.

use stockwise_core::domain::finance::FinanceSummary;
use stockwise_core::domain::inventory::InventoryStatus;
use stockwise_core::domain::sales::SalesPatterns;
use stockwise_core::domain::ticket::{Ticket, TicketStats};
use stockwise_core::domain::vendor::Vendor;
use stockwise_core::{DataBundle, Decision, DecisionOutcome, Intent, QuerySlots, Region, ReorderContext};

use crate::prompts::{format_low_stock_items, format_vendor_lines};

pub const DATA_ONLY_NOTE: &str = "Data-only response: no AI recommendation was produced.";

/// Currency-agnostic money rendering with thousands separators.
pub fn fmt_money(value: f64) -> String {
    let negative = value < 0.0;
    let cents = (value.abs() * 100.0).round() as u64;
    let whole = cents / 100;
    let fraction = cents % 100;

    let digits = whole.to_string();
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (index, digit) in digits.chars().enumerate() {
        if index > 0 && (digits.len() - index) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(digit);
    }

    let sign = if negative { "-" } else { "" };
    format!("{sign}{grouped}.{fraction:02}")
}

pub fn greeting() -> String {
    "I'm the Stockwise assistant. Ask me about inventory, sales, finances, vendors, or \
     restocking tickets."
        .to_string()
}

pub fn format_inventory(status: &InventoryStatus, region: Option<Region>) -> String {
    let region_scope =
        region.map(|region| format!(" in {} region", region.display_name())).unwrap_or_default();
    let mut lines = vec![format!("INVENTORY STATUS{region_scope}"), String::new()];

    lines.push(format!("Total items: {}", status.total_items));
    lines.push(format!("Low stock alerts: {}", status.low_stock_count()));
    lines.push(String::new());

    if !status.by_category.is_empty() {
        lines.push("INVENTORY BY CATEGORY:".to_string());
        for (category, quantity) in &status.by_category {
            lines.push(format!("- {category}: {quantity} units"));
        }
        lines.push(String::new());
    }

    if region.is_none() && !status.by_region.is_empty() {
        lines.push("INVENTORY BY REGION:".to_string());
        for (region, quantity) in &status.by_region {
            lines.push(format!("- {}: {} units", region.display_name(), quantity));
        }
        lines.push(String::new());
    }

    if status.low_stock.is_empty() {
        lines.push("All items adequately stocked!".to_string());
    } else {
        lines.push("LOW STOCK ITEMS:".to_string());
        for item in status.low_stock.iter().take(10) {
            lines.push(format!(
                "- {} ({}): {} units (threshold: {})",
                item.name, item.sku, item.quantity, item.reorder_threshold
            ));
        }
    }

    lines.join("\n")
}

pub fn format_sales(patterns: &SalesPatterns) -> String {
    if patterns.transaction_count == 0 {
        return "No sales data found.".to_string();
    }

    let mut lines = vec![
        format!("SALES ANALYSIS (last {} days)", patterns.period_days),
        String::new(),
        format!("Total sales: {} units", patterns.total_units),
        format!("Total revenue: {}", fmt_money(patterns.total_revenue)),
        format!("Avg daily sales: {:.1} units", patterns.avg_daily_units),
    ];

    if !patterns.revenue_by_region.is_empty() {
        lines.push(String::new());
        lines.push("REVENUE BY REGION:".to_string());
        for (region, revenue) in &patterns.revenue_by_region {
            lines.push(format!("- {}: {}", region.display_name(), fmt_money(*revenue)));
        }
    }

    if !patterns.units_by_condition.is_empty() {
        lines.push(String::new());
        lines.push("UNITS BY WEATHER CONDITION:".to_string());
        for (condition, units) in &patterns.units_by_condition {
            lines.push(format!("- {condition}: {units} units"));
        }
    }

    lines.join("\n")
}

pub fn format_financial(summary: &FinanceSummary, region: Option<Region>) -> String {
    if summary.transaction_count == 0 {
        return "No finance data found.".to_string();
    }

    let region_scope =
        region.map(|region| format!(" for {} region", region.display_name())).unwrap_or_default();
    let mut lines = vec![
        format!("FINANCIAL SUMMARY (last {} days){region_scope}", summary.period_days),
        String::new(),
        format!("Total sales: {}", fmt_money(summary.total_sales)),
        format!("Total purchases: {}", fmt_money(summary.total_purchases)),
        format!("Net profit: {}", fmt_money(summary.net_profit)),
    ];

    if summary.total_sales > 0.0 {
        lines.push(format!("Profit margin: {:.1}%", summary.profit_margin_pct()));
    }

    lines.join("\n")
}

pub fn format_tickets(tickets: &[Ticket], stats: &TicketStats) -> String {
    if tickets.is_empty() {
        return "No pending tickets.".to_string();
    }

    let mut lines = vec![
        "TICKET STATUS".to_string(),
        String::new(),
        format!("Total pending: {}", stats.total_pending),
        format!("Total value: {}", fmt_money(stats.pending_value)),
        String::new(),
        "RECENT TICKETS:".to_string(),
    ];

    for ticket in tickets.iter().take(10) {
        let product_name = ticket.product_name.as_deref().unwrap_or("N/A");
        lines.push(format!(
            "#{:3} | {} | {} | Qty: {} | {}",
            ticket.id, ticket.sku, product_name, ticket.recommended_qty, ticket.priority
        ));
    }

    lines.join("\n")
}

pub fn format_reorder_data(context: &ReorderContext) -> String {
    if context.low_stock.is_empty() {
        return "Nothing is below its reorder threshold.".to_string();
    }

    format!(
        "REORDER CHECK\n\nLOW STOCK ITEMS:\n{}\n\nTOP VENDORS:\n{}",
        format_low_stock_items(&context.low_stock),
        format_vendor_lines(&context.vendors),
    )
}

pub fn format_vendor_data(vendors: &[Vendor]) -> String {
    if vendors.is_empty() {
        return "No vendors on file.".to_string();
    }

    format!("VENDOR PERFORMANCE\n\n{}", format_vendor_lines(vendors))
}

fn format_bundle(intent: Intent, slots: &QuerySlots, bundle: &DataBundle) -> String {
    match bundle {
        DataBundle::Inventory(status) => format_inventory(status, slots.region),
        DataBundle::Sales(patterns) => format_sales(patterns),
        DataBundle::Finance(summary) => format_financial(summary, slots.region),
        DataBundle::Tickets { tickets, stats } => format_tickets(tickets, stats),
        DataBundle::Reorder(context) => format_reorder_data(context),
        DataBundle::Vendors(vendors) => format_vendor_data(vendors),
        DataBundle::Empty if intent == Intent::GeneralQuery => greeting(),
        DataBundle::Empty => "No data available for this query.".to_string(),
    }
}

fn format_decided(intent: Intent, slots: &QuerySlots, bundle: &DataBundle, decision: &Decision) -> String {
    let mut body = match bundle {
        DataBundle::Reorder(_) | DataBundle::Vendors(_) => decision.analysis.clone(),
        other => {
            format!("{}\n\nRECOMMENDATION\n{}", format_bundle(intent, slots, other), decision.analysis)
        }
    };

    if !decision.actions.is_empty() {
        body.push_str("\n\nTICKETS RAISED:");
        for action in &decision.actions {
            body.push_str(&format!(
                "\n- {}: {} units from {} ({})",
                action.sku, action.quantity, action.vendor_id, action.priority
            ));
        }
    }

    body
}

/// The respond stage: pure formatting of everything gathered upstream,
/// with warnings appended so partial failures are never silent.
pub fn compose_reply(
    intent: Intent,
    slots: &QuerySlots,
    bundle: &DataBundle,
    decision: &DecisionOutcome,
    warnings: &[String],
) -> String {
    let mut text = match decision {
        DecisionOutcome::Decided(decision) => format_decided(intent, slots, bundle, decision),
        DecisionOutcome::Degraded { .. } => {
            format!("{}\n\n{DATA_ONLY_NOTE}", format_bundle(intent, slots, bundle))
        }
        DecisionOutcome::Skipped => format_bundle(intent, slots, bundle),
    };

    for warning in warnings {
        text.push_str(&format!("\nNote: {warning}"));
    }

    text
}

#[cfg(test)]
mod tests {
    use super::{compose_reply, fmt_money, format_inventory, format_tickets, DATA_ONLY_NOTE};
    use stockwise_core::domain::inventory::{InventoryStatus, LowStockItem};
    use stockwise_core::domain::ticket::TicketStats;
    use stockwise_core::{
        DataBundle, Decision, DecisionOutcome, Intent, QuerySlots, Region, ReorderAction,
        ReorderContext, TicketPriority,
    };

    fn low_stock_item(sku: &str, quantity: i64) -> LowStockItem {
        LowStockItem {
            sku: sku.to_string(),
            name: format!("Item {sku}"),
            category: "snacks".to_string(),
            region: Region::North,
            quantity,
            reorder_threshold: 20,
            vendor_id: "VEND-001".to_string(),
        }
    }

    #[test]
    fn money_grouping_and_negatives() {
        assert_eq!(fmt_money(0.0), "0.00");
        assert_eq!(fmt_money(7.5), "7.50");
        assert_eq!(fmt_money(1234.56), "1,234.56");
        assert_eq!(fmt_money(9_876_543.21), "9,876,543.21");
        assert_eq!(fmt_money(-1200.0), "-1,200.00");
    }

    #[test]
    fn inventory_report_counts_low_stock_and_lists_skus() {
        let mut status = InventoryStatus { total_items: 20, ..InventoryStatus::default() };
        for index in 0..8 {
            status.low_stock.push(low_stock_item(&format!("SKU-{index}"), index));
        }

        let text = format_inventory(&status, None);
        assert!(text.contains("Total items: 20"));
        assert!(text.contains("Low stock alerts: 8"));
        assert!(text.contains("SKU-0"));
        assert!(text.contains("SKU-7"));
    }

    #[test]
    fn fully_stocked_inventory_has_a_friendly_empty_state() {
        let status = InventoryStatus { total_items: 5, ..InventoryStatus::default() };
        let text = format_inventory(&status, Some(Region::West));
        assert!(text.contains("in West region"));
        assert!(text.contains("All items adequately stocked!"));
    }

    #[test]
    fn no_pending_tickets_has_an_explicit_empty_state() {
        let text = format_tickets(&[], &TicketStats::default());
        assert_eq!(text, "No pending tickets.");
    }

    #[test]
    fn degraded_decision_appends_the_data_only_note() {
        let bundle = DataBundle::Reorder(ReorderContext {
            low_stock: vec![low_stock_item("SKU-BEV-004", 4)],
            vendors: Vec::new(),
        });
        let text = compose_reply(
            Intent::ReorderRecommendation,
            &QuerySlots::default(),
            &bundle,
            &DecisionOutcome::Degraded { reason: "timeout".to_string() },
            &[],
        );

        assert!(text.contains("SKU-BEV-004"), "gathered data must survive degradation");
        assert!(text.contains(DATA_ONLY_NOTE));
    }

    #[test]
    fn decided_reorder_lists_raised_tickets() {
        let bundle = DataBundle::Reorder(ReorderContext {
            low_stock: vec![low_stock_item("SKU-BEV-004", 4)],
            vendors: Vec::new(),
        });
        let decision = Decision {
            analysis: "Restock the iced tea first.".to_string(),
            actions: vec![ReorderAction {
                sku: "SKU-BEV-004".to_string(),
                quantity: 36,
                vendor_id: "VEND-001".to_string(),
                priority: TicketPriority::High,
                rationale: "low stock".to_string(),
            }],
        };

        let text = compose_reply(
            Intent::ReorderRecommendation,
            &QuerySlots::default(),
            &bundle,
            &DecisionOutcome::Decided(decision),
            &[],
        );
        assert!(text.starts_with("Restock the iced tea first."));
        assert!(text.contains("TICKETS RAISED:"));
        assert!(text.contains("- SKU-BEV-004: 36 units from VEND-001 (high)"));
    }

    #[test]
    fn warnings_are_appended_as_notes() {
        let text = compose_reply(
            Intent::GeneralQuery,
            &QuerySlots::default(),
            &DataBundle::Empty,
            &DecisionOutcome::Skipped,
            &["recommendation generated, ticket not saved for SKU-X".to_string()],
        );
        assert!(text.contains("Note: recommendation generated, ticket not saved for SKU-X"));
    }

    #[test]
    fn general_query_greets() {
        let text = compose_reply(
            Intent::GeneralQuery,
            &QuerySlots::default(),
            &DataBundle::Empty,
            &DecisionOutcome::Skipped,
            &[],
        );
        assert!(text.contains("Stockwise assistant"));
    }
}
