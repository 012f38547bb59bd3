use std::collections::BTreeMap;

use async_trait::async_trait;
use chrono::{Duration, NaiveDate, Utc};

use stockwise_core::domain::finance::{FinanceSummary, TransactionKind};
use stockwise_core::domain::inventory::{InventoryStatus, LowStockItem};
use stockwise_core::domain::region::Region;
use stockwise_core::domain::sales::{SalesPatterns, TopSellingDay};
use stockwise_core::domain::ticket::{Ticket, TicketStats};
use stockwise_core::domain::vendor::Vendor;
use stockwise_core::ReorderContext;

use super::tickets::ticket_from_row;
use super::{ReportCollector, RepositoryError};
use crate::DbPool;

pub struct SqlReportCollector {
    pool: DbPool,
}

impl SqlReportCollector {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn parse_region(value: &str) -> Result<Region, RepositoryError> {
    Region::parse(value)
        .ok_or_else(|| RepositoryError::Decode(format!("unknown region `{value}`")))
}

fn cutoff_date(days: u32) -> NaiveDate {
    Utc::now().date_naive() - Duration::days(i64::from(days))
}

#[derive(sqlx::FromRow)]
struct InventoryRow {
    sku: String,
    name: String,
    category: String,
    region: String,
    quantity: i64,
    reorder_threshold: i64,
    vendor_id: String,
}

#[derive(sqlx::FromRow)]
struct SalesRow {
    date: NaiveDate,
    sku: String,
    quantity: i64,
    revenue: f64,
    region: String,
    weather_condition: Option<String>,
}

#[derive(sqlx::FromRow)]
struct FinanceRow {
    amount: f64,
    #[sqlx(rename = "type")]
    kind: String,
}

#[derive(sqlx::FromRow)]
struct VendorRow {
    vendor_id: String,
    name: String,
    lead_time_days: i64,
    unit_price: f64,
    on_time_rate: f64,
    quality_score: f64,
    reliability_rating: f64,
}

impl VendorRow {
    fn into_vendor(self) -> Vendor {
        Vendor {
            vendor_id: self.vendor_id,
            name: self.name,
            lead_time_days: self.lead_time_days,
            unit_price: self.unit_price,
            on_time_rate: self.on_time_rate,
            quality_score: self.quality_score,
            reliability_rating: self.reliability_rating,
        }
    }
}

fn build_inventory_status(rows: Vec<InventoryRow>) -> Result<InventoryStatus, RepositoryError> {
    let mut status = InventoryStatus { total_items: rows.len(), ..InventoryStatus::default() };

    for row in rows {
        let region = parse_region(&row.region)?;
        *status.by_category.entry(row.category.clone()).or_insert(0) += row.quantity;
        *status.by_region.entry(region).or_insert(0) += row.quantity;

        if row.quantity <= row.reorder_threshold {
            status.low_stock.push(LowStockItem {
                sku: row.sku,
                name: row.name,
                category: row.category,
                region,
                quantity: row.quantity,
                reorder_threshold: row.reorder_threshold,
                vendor_id: row.vendor_id,
            });
        }
    }

    Ok(status)
}

fn aggregate_sales(rows: Vec<SalesRow>, days: u32) -> Result<SalesPatterns, RepositoryError> {
    let mut patterns = SalesPatterns {
        transaction_count: rows.len() as i64,
        period_days: days,
        ..SalesPatterns::default()
    };

    let mut ranked: Vec<TopSellingDay> = Vec::with_capacity(rows.len());
    for row in rows {
        let region = parse_region(&row.region)?;
        patterns.total_units += row.quantity;
        patterns.total_revenue += row.revenue;
        *patterns.revenue_by_region.entry(region).or_insert(0.0) += row.revenue;
        if let Some(condition) = row.weather_condition {
            *patterns.units_by_condition.entry(condition).or_insert(0) += row.quantity;
        }
        ranked.push(TopSellingDay { date: row.date, sku: row.sku, quantity: row.quantity });
    }

    ranked.sort_by(|a, b| b.quantity.cmp(&a.quantity).then(a.date.cmp(&b.date)));
    ranked.truncate(5);
    patterns.top_days = ranked;
    patterns.avg_daily_units = patterns.total_units as f64 / f64::from(days.max(1));

    Ok(patterns)
}

fn aggregate_finance(rows: Vec<FinanceRow>, days: u32) -> Result<FinanceSummary, RepositoryError> {
    let mut summary =
        FinanceSummary { transaction_count: rows.len() as i64, period_days: days, ..Default::default() };
    let mut amount_total = 0.0;

    for row in rows {
        let kind = TransactionKind::parse(&row.kind).ok_or_else(|| {
            RepositoryError::Decode(format!("unknown transaction type `{}`", row.kind))
        })?;
        amount_total += row.amount;
        match kind {
            TransactionKind::Sale => summary.total_sales += row.amount,
            TransactionKind::Purchase => summary.total_purchases += row.amount,
        }
    }

    summary.net_profit = summary.total_sales - summary.total_purchases;
    if summary.transaction_count > 0 {
        summary.avg_transaction_value = amount_total / summary.transaction_count as f64;
    }

    Ok(summary)
}

#[async_trait]
impl ReportCollector for SqlReportCollector {
    async fn inventory_status(
        &self,
        region: Option<Region>,
    ) -> Result<InventoryStatus, RepositoryError> {
        let base = "SELECT sku, name, category, region, quantity, reorder_threshold, vendor_id \
                    FROM inventory";
        let rows = match region {
            Some(region) => {
                sqlx::query_as::<_, InventoryRow>(&format!(
                    "{base} WHERE region = ? ORDER BY category, name"
                ))
                .bind(region.as_str())
                .fetch_all(&self.pool)
                .await?
            }
            None => {
                sqlx::query_as::<_, InventoryRow>(&format!("{base} ORDER BY category, name"))
                    .fetch_all(&self.pool)
                    .await?
            }
        };

        build_inventory_status(rows)
    }

    async fn sales_patterns(
        &self,
        sku: Option<&str>,
        days: u32,
    ) -> Result<SalesPatterns, RepositoryError> {
        let cutoff = cutoff_date(days).to_string();
        let rows = self.fetch_sales(Some(&cutoff), sku).await?;
        // Empty window falls back to all-time history so demo data
        // with old dates still produces an answer.
        let rows = if rows.is_empty() { self.fetch_sales(None, sku).await? } else { rows };

        aggregate_sales(rows, days)
    }

    async fn financial_summary(
        &self,
        region: Option<Region>,
        days: u32,
    ) -> Result<FinanceSummary, RepositoryError> {
        let cutoff = cutoff_date(days).to_string();
        let rows = self.fetch_finance(Some(&cutoff), region).await?;
        let rows = if rows.is_empty() { self.fetch_finance(None, region).await? } else { rows };

        aggregate_finance(rows, days)
    }

    async fn vendor_performance(&self) -> Result<Vec<Vendor>, RepositoryError> {
        let rows = sqlx::query_as::<_, VendorRow>(
            "SELECT vendor_id, name, lead_time_days, unit_price, on_time_rate, quality_score, \
                    reliability_rating \
             FROM vendors \
             ORDER BY quality_score DESC, reliability_rating DESC, lead_time_days ASC",
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(VendorRow::into_vendor).collect())
    }

    async fn pending_tickets(&self, limit: i64) -> Result<Vec<Ticket>, RepositoryError> {
        let rows = sqlx::query_as::<_, super::tickets::TicketRow>(
            "SELECT t.id, t.sku, t.reason, t.recommended_qty, t.vendor_id, t.priority, t.status, \
                    t.created_at, i.name AS product_name, v.name AS vendor_name \
             FROM tickets t \
             LEFT JOIN inventory i ON t.sku = i.sku \
             LEFT JOIN vendors v ON t.vendor_id = v.vendor_id \
             WHERE t.status = 'pending' \
             ORDER BY CASE t.priority \
                 WHEN 'high' THEN 3 WHEN 'medium' THEN 2 WHEN 'low' THEN 1 ELSE 0 END DESC, \
                 t.created_at DESC, t.id DESC \
             LIMIT ?",
        )
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(ticket_from_row).collect()
    }

    async fn ticket_stats(&self) -> Result<TicketStats, RepositoryError> {
        let mut stats = TicketStats::default();

        let by_status = sqlx::query_as::<_, (String, i64)>(
            "SELECT status, COUNT(*) FROM tickets GROUP BY status",
        )
        .fetch_all(&self.pool)
        .await?;
        stats.by_status = by_status.into_iter().collect::<BTreeMap<_, _>>();
        stats.total_pending = stats.by_status.get("pending").copied().unwrap_or(0);

        let by_priority = sqlx::query_as::<_, (String, i64)>(
            "SELECT priority, COUNT(*) FROM tickets WHERE status = 'pending' GROUP BY priority",
        )
        .fetch_all(&self.pool)
        .await?;
        stats.by_priority = by_priority.into_iter().collect::<BTreeMap<_, _>>();

        let (pending_value,): (Option<f64>,) = sqlx::query_as(
            "SELECT SUM(t.recommended_qty * v.unit_price) \
             FROM tickets t \
             JOIN vendors v ON t.vendor_id = v.vendor_id \
             WHERE t.status = 'pending'",
        )
        .fetch_one(&self.pool)
        .await?;
        stats.pending_value = pending_value.unwrap_or(0.0);

        Ok(stats)
    }

    async fn reorder_context(
        &self,
        region: Option<Region>,
    ) -> Result<ReorderContext, RepositoryError> {
        let base = "SELECT sku, name, category, region, quantity, reorder_threshold, vendor_id \
                    FROM inventory WHERE quantity <= reorder_threshold";
        let rows = match region {
            Some(region) => {
                sqlx::query_as::<_, InventoryRow>(&format!(
                    "{base} AND region = ? ORDER BY quantity - reorder_threshold ASC, sku"
                ))
                .bind(region.as_str())
                .fetch_all(&self.pool)
                .await?
            }
            None => {
                sqlx::query_as::<_, InventoryRow>(&format!(
                    "{base} ORDER BY quantity - reorder_threshold ASC, sku"
                ))
                .fetch_all(&self.pool)
                .await?
            }
        };

        let mut low_stock = Vec::with_capacity(rows.len());
        for row in rows {
            let region = parse_region(&row.region)?;
            low_stock.push(LowStockItem {
                sku: row.sku,
                name: row.name,
                category: row.category,
                region,
                quantity: row.quantity,
                reorder_threshold: row.reorder_threshold,
                vendor_id: row.vendor_id,
            });
        }

        Ok(ReorderContext { low_stock, vendors: self.vendor_performance().await? })
    }
}

impl SqlReportCollector {
    async fn fetch_sales(
        &self,
        cutoff: Option<&str>,
        sku: Option<&str>,
    ) -> Result<Vec<SalesRow>, RepositoryError> {
        let base = "SELECT date, sku, quantity, revenue, region, weather_condition FROM sales";
        let rows = match (cutoff, sku) {
            (Some(cutoff), Some(sku)) => {
                sqlx::query_as::<_, SalesRow>(&format!("{base} WHERE date >= ? AND sku = ?"))
                    .bind(cutoff)
                    .bind(sku)
                    .fetch_all(&self.pool)
                    .await?
            }
            (Some(cutoff), None) => {
                sqlx::query_as::<_, SalesRow>(&format!("{base} WHERE date >= ?"))
                    .bind(cutoff)
                    .fetch_all(&self.pool)
                    .await?
            }
            (None, Some(sku)) => {
                sqlx::query_as::<_, SalesRow>(&format!("{base} WHERE sku = ?"))
                    .bind(sku)
                    .fetch_all(&self.pool)
                    .await?
            }
            (None, None) => sqlx::query_as::<_, SalesRow>(base).fetch_all(&self.pool).await?,
        };
        Ok(rows)
    }

    async fn fetch_finance(
        &self,
        cutoff: Option<&str>,
        region: Option<Region>,
    ) -> Result<Vec<FinanceRow>, RepositoryError> {
        let base = "SELECT amount, type FROM finance";
        let rows = match (cutoff, region) {
            (Some(cutoff), Some(region)) => {
                sqlx::query_as::<_, FinanceRow>(&format!(
                    "{base} WHERE date >= ? AND region = ?"
                ))
                .bind(cutoff)
                .bind(region.as_str())
                .fetch_all(&self.pool)
                .await?
            }
            (Some(cutoff), None) => {
                sqlx::query_as::<_, FinanceRow>(&format!("{base} WHERE date >= ?"))
                    .bind(cutoff)
                    .fetch_all(&self.pool)
                    .await?
            }
            (None, Some(region)) => {
                sqlx::query_as::<_, FinanceRow>(&format!("{base} WHERE region = ?"))
                    .bind(region.as_str())
                    .fetch_all(&self.pool)
                    .await?
            }
            (None, None) => sqlx::query_as::<_, FinanceRow>(base).fetch_all(&self.pool).await?,
        };
        Ok(rows)
    }
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;

    use super::{aggregate_finance, aggregate_sales, build_inventory_status};
    use super::{FinanceRow, InventoryRow, SalesRow, SqlReportCollector};
    use crate::repositories::ReportCollector;
    use crate::test_support::seeded_pool;
    use stockwise_core::domain::region::Region;

    fn inventory_row(sku: &str, region: &str, quantity: i64, threshold: i64) -> InventoryRow {
        InventoryRow {
            sku: sku.to_string(),
            name: format!("Item {sku}"),
            category: "snacks".to_string(),
            region: region.to_string(),
            quantity,
            reorder_threshold: threshold,
            vendor_id: "VEND-001".to_string(),
        }
    }

    fn sales_row(date: &str, sku: &str, quantity: i64, revenue: f64, condition: &str) -> SalesRow {
        SalesRow {
            date: date.parse::<NaiveDate>().expect("date"),
            sku: sku.to_string(),
            quantity,
            revenue,
            region: "north".to_string(),
            weather_condition: Some(condition.to_string()),
        }
    }

    #[test]
    fn inventory_aggregation_flags_items_at_or_below_threshold() {
        let status = build_inventory_status(vec![
            inventory_row("SKU-1", "north", 5, 20),
            inventory_row("SKU-2", "north", 20, 20),
            inventory_row("SKU-3", "south", 90, 20),
        ])
        .expect("aggregate");

        assert_eq!(status.total_items, 3);
        assert_eq!(status.low_stock_count(), 2);
        assert_eq!(status.by_region.get(&Region::North), Some(&25));
        assert_eq!(status.by_category.get("snacks"), Some(&115));
    }

    #[test]
    fn inventory_aggregation_rejects_unknown_regions() {
        let error = build_inventory_status(vec![inventory_row("SKU-1", "midlands", 5, 20)])
            .expect_err("unknown region must fail decode");
        assert!(error.to_string().contains("midlands"));
    }

    #[test]
    fn sales_aggregation_ranks_top_days_and_sums_conditions() {
        let patterns = aggregate_sales(
            vec![
                sales_row("2024-03-01", "SKU-1", 5, 50.0, "Clear"),
                sales_row("2024-03-02", "SKU-1", 30, 300.0, "Rain"),
                sales_row("2024-03-03", "SKU-2", 12, 144.0, "Rain"),
                sales_row("2024-03-04", "SKU-2", 12, 144.0, "Clear"),
                sales_row("2024-03-05", "SKU-1", 7, 70.0, "Clouds"),
                sales_row("2024-03-06", "SKU-3", 2, 24.0, "Clear"),
            ],
            30,
        )
        .expect("aggregate");

        assert_eq!(patterns.total_units, 68);
        assert_eq!(patterns.transaction_count, 6);
        assert_eq!(patterns.top_days.len(), 5);
        assert_eq!(patterns.top_days[0].quantity, 30);
        // Equal quantities rank by earlier date.
        assert_eq!(patterns.top_days[1].date.to_string(), "2024-03-03");
        assert_eq!(patterns.units_by_condition.get("Rain"), Some(&42));
        assert!((patterns.avg_daily_units - 68.0 / 30.0).abs() < 1e-9);
    }

    #[test]
    fn empty_sales_window_produces_well_typed_zeroes() {
        let patterns = aggregate_sales(Vec::new(), 30).expect("aggregate");
        assert_eq!(patterns.total_units, 0);
        assert!(patterns.top_days.is_empty());
        assert_eq!(patterns.avg_daily_units, 0.0);
    }

    #[test]
    fn finance_aggregation_splits_sales_from_purchases() {
        let summary = aggregate_finance(
            vec![
                FinanceRow { amount: 1000.0, kind: "sale".to_string() },
                FinanceRow { amount: 400.0, kind: "purchase".to_string() },
                FinanceRow { amount: 600.0, kind: "sale".to_string() },
            ],
            90,
        )
        .expect("aggregate");

        assert_eq!(summary.total_sales, 1600.0);
        assert_eq!(summary.total_purchases, 400.0);
        assert_eq!(summary.net_profit, 1200.0);
        assert_eq!(summary.transaction_count, 3);
        assert!((summary.avg_transaction_value - 2000.0 / 3.0).abs() < 1e-9);
    }

    #[tokio::test]
    async fn seeded_store_reports_eight_low_stock_items() {
        let pool = seeded_pool().await;
        let collector = SqlReportCollector::new(pool);

        let status = collector.inventory_status(None).await.expect("inventory status");
        assert_eq!(status.total_items, 20);
        assert_eq!(status.low_stock_count(), 8);
    }

    #[tokio::test]
    async fn gather_is_idempotent_against_unchanged_store() {
        let pool = seeded_pool().await;
        let collector = SqlReportCollector::new(pool);

        let first = collector.inventory_status(Some(Region::North)).await.expect("first");
        let second = collector.inventory_status(Some(Region::North)).await.expect("second");
        assert_eq!(first, second);

        let sales_first = collector.sales_patterns(None, 365).await.expect("sales first");
        let sales_second = collector.sales_patterns(None, 365).await.expect("sales second");
        assert_eq!(sales_first, sales_second);
    }

    #[tokio::test]
    async fn old_demo_data_is_reachable_through_the_all_time_fallback() {
        let pool = seeded_pool().await;
        let collector = SqlReportCollector::new(pool);

        // Seed dates are all historical, so a short window relies on
        // the fallback path.
        let patterns = collector.sales_patterns(None, 30).await.expect("sales patterns");
        assert!(patterns.total_units > 0);
        assert_eq!(patterns.period_days, 30);

        let summary = collector.financial_summary(None, 30).await.expect("finance summary");
        assert!(summary.transaction_count > 0);
    }

    #[tokio::test]
    async fn vendors_are_ranked_best_first() {
        let pool = seeded_pool().await;
        let collector = SqlReportCollector::new(pool);

        let vendors = collector.vendor_performance().await.expect("vendors");
        assert_eq!(vendors.len(), 5);
        for pair in vendors.windows(2) {
            let better = (&pair[0].quality_score, &pair[0].reliability_rating);
            let worse = (&pair[1].quality_score, &pair[1].reliability_rating);
            assert!(better >= worse, "vendor ranking must be quality/reliability descending");
        }
    }

    #[tokio::test]
    async fn reorder_context_joins_low_stock_with_ranked_vendors() {
        let pool = seeded_pool().await;
        let collector = SqlReportCollector::new(pool);

        let context = collector.reorder_context(None).await.expect("reorder context");
        assert_eq!(context.low_stock.len(), 8);
        assert_eq!(context.vendors.len(), 5);
        assert!(context.low_stock.iter().all(|item| item.quantity <= item.reorder_threshold));
    }

    #[tokio::test]
    async fn empty_store_yields_empty_but_typed_reports() {
        let pool = crate::test_support::memory_pool().await;
        let collector = SqlReportCollector::new(pool);

        let status = collector.inventory_status(None).await.expect("inventory");
        assert_eq!(status.total_items, 0);
        assert!(status.low_stock.is_empty());

        let stats = collector.ticket_stats().await.expect("ticket stats");
        assert_eq!(stats.total_pending, 0);
        assert_eq!(stats.pending_value, 0.0);

        let tickets = collector.pending_tickets(10).await.expect("tickets");
        assert!(tickets.is_empty());
    }
}
