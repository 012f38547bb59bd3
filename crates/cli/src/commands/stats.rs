use crate::commands::{init_logging, runtime, CommandResult};
use stockwise_agent::format::fmt_money;
use stockwise_core::config::LoadOptions;
use stockwise_db::repositories::{ReportCollector, SqlReportCollector};

pub fn run() -> CommandResult {
    let tokio_runtime = match tokio::runtime::Builder::new_current_thread().enable_all().build() {
        Ok(tokio_runtime) => tokio_runtime,
        Err(error) => {
            return CommandResult::failure(
                "stats",
                "runtime_init",
                format!("failed to initialize async runtime: {error}"),
                3,
            );
        }
    };

    tokio_runtime.block_on(async {
        let app = match runtime::bootstrap(LoadOptions::default()).await {
            Ok(app) => app,
            Err(error) => {
                return CommandResult::failure("stats", "bootstrap", error.to_string(), 2);
            }
        };
        init_logging(&app.config.logging);

        let collector = SqlReportCollector::new(app.pool.clone());
        let output = match collect_stats(&collector).await {
            Ok(output) => output,
            Err(error) => {
                app.pool.close().await;
                return CommandResult::failure("stats", "report_query", error.to_string(), 4);
            }
        };

        app.pool.close().await;
        CommandResult { exit_code: 0, output }
    })
}

async fn collect_stats(
    collector: &SqlReportCollector,
) -> Result<String, stockwise_db::RepositoryError> {
    let mut lines = vec!["STOCKWISE SYSTEM STATISTICS".to_string(), String::new()];

    let inventory = collector.inventory_status(None).await?;
    lines.push("INVENTORY:".to_string());
    lines.push(format!("  Total items: {}", inventory.total_items));
    lines.push(format!("  Low stock alerts: {}", inventory.low_stock_count()));
    lines.push(String::new());

    let sales = collector.sales_patterns(None, 30).await?;
    if sales.transaction_count > 0 {
        lines.push("SALES (last 30 days):".to_string());
        lines.push(format!("  Total sales: {} units", sales.total_units));
        lines.push(format!("  Revenue: {}", fmt_money(sales.total_revenue)));
        lines.push(String::new());
    }

    let finance = collector.financial_summary(None, 90).await?;
    if finance.transaction_count > 0 {
        lines.push("FINANCIALS (last 90 days):".to_string());
        lines.push(format!("  Total sales: {}", fmt_money(finance.total_sales)));
        lines.push(format!("  Total purchases: {}", fmt_money(finance.total_purchases)));
        lines.push(format!("  Net profit: {}", fmt_money(finance.net_profit)));
        lines.push(format!("  Profit margin: {:.1}%", finance.profit_margin_pct()));
        lines.push(String::new());
    }

    let ticket_stats = collector.ticket_stats().await?;
    lines.push("TICKETS:".to_string());
    lines.push(format!("  Pending: {}", ticket_stats.total_pending));
    lines.push(format!("  Total value: {}", fmt_money(ticket_stats.pending_value)));

    Ok(lines.join("\n"))
}
