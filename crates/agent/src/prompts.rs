use stockwise_core::domain::inventory::LowStockItem;
use stockwise_core::domain::vendor::Vendor;
use stockwise_core::{DataBundle, Intent, Region, ReorderContext};

use crate::weather::RegionForecast;

/// Low-stock lines for advisory context, capped at ten rows.
pub fn format_low_stock_items(items: &[LowStockItem]) -> String {
    if items.is_empty() {
        return "None".to_string();
    }

    items
        .iter()
        .take(10)
        .map(|item| {
            format!(
                "- {}: {} ({}) - {} units (threshold: {})",
                item.sku, item.name, item.category, item.quantity, item.reorder_threshold
            )
        })
        .collect::<Vec<_>>()
        .join("\n")
}

pub fn format_vendor_lines(vendors: &[Vendor]) -> String {
    vendors
        .iter()
        .enumerate()
        .map(|(index, vendor)| {
            format!(
                "{}. {}\n   - Vendor ID: {}\n   - Quality Score: {}/5.0\n   - Reliability: {}\n   - Lead Time: {} days",
                index + 1,
                vendor.name,
                vendor.vendor_id,
                vendor.quality_score,
                vendor.reliability_rating,
                vendor.lead_time_days
            )
        })
        .collect::<Vec<_>>()
        .join("\n")
}

fn format_forecast_lines(forecast: &RegionForecast) -> String {
    forecast
        .days
        .iter()
        .map(|day| {
            format!(
                "  {}: {:.1}C, {:.1}mm rain, {:.0}% humidity, {}",
                day.date, day.temperature, day.rainfall, day.humidity, day.condition
            )
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// Prompt for the reorder recommendation: low-stock context, vendor
/// ranking, and the cached forecast when one was available.
pub fn build_reorder_prompt(
    context: &ReorderContext,
    forecast: Option<&RegionForecast>,
    region: Option<Region>,
) -> String {
    let region_scope = region
        .map(|region| format!(" for the {} region", region.display_name()))
        .unwrap_or_default();

    let weather_section = match forecast {
        Some(forecast) => format!(
            "Weather forecast for {}:\n{}",
            forecast.region.display_name(),
            format_forecast_lines(forecast)
        ),
        None => "Weather forecast: unavailable".to_string(),
    };

    format!(
        "Analyze the inventory situation{region_scope}:\n\n\
         Low Stock Items:\n{low_stock}\n\n\
         Top Available Vendors:\n{vendors}\n\n\
         {weather_section}\n\n\
         Task: recommend which items to restock first and why, factoring in the \
         weather outlook, vendor quality, and lead times. Quantities and vendor \
         assignments are already fixed by policy; focus the narrative on priorities \
         and risks. Keep it concise and actionable.",
        low_stock = format_low_stock_items(&context.low_stock),
        vendors = format_vendor_lines(&context.vendors),
    )
}

pub fn build_vendor_prompt(vendors: &[Vendor], sku: Option<&str>) -> String {
    let sku_scope = sku.map(|sku| format!(" for SKU {sku}")).unwrap_or_default();

    format!(
        "Recommend optimal vendor selection{sku_scope}:\n\n\
         Vendors ranked by performance:\n{vendors}\n\n\
         Task: name the best overall vendor, backup options, the trade-offs \
         between quality, lead time, and reliability, and any risk mitigation \
         worth noting.",
        vendors = format_vendor_lines(vendors),
    )
}

/// Prompt for ambiguity-triggered decisions: the bundle was larger
/// than the configured threshold, so ask for a summary rather than a
/// restocking plan.
pub fn build_ambiguous_bundle_prompt(intent: Intent, bundle: &DataBundle) -> String {
    format!(
        "A {intent} query returned a large result set ({rows} rows of {label} data). \
         Summarize the most decision-relevant findings in a few sentences and \
         recommend what the operator should look at first.",
        intent = intent.label(),
        rows = bundle.row_count(),
        label = bundle.label(),
    )
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;

    use super::{
        build_ambiguous_bundle_prompt, build_reorder_prompt, build_vendor_prompt,
        format_low_stock_items,
    };
    use crate::weather::{DailyForecast, RegionForecast};
    use stockwise_core::domain::inventory::{InventoryStatus, LowStockItem};
    use stockwise_core::domain::vendor::Vendor;
    use stockwise_core::{DataBundle, Intent, Region, ReorderContext};

    fn low_stock_item(sku: &str) -> LowStockItem {
        LowStockItem {
            sku: sku.to_string(),
            name: format!("Item {sku}"),
            category: "snacks".to_string(),
            region: Region::North,
            quantity: 4,
            reorder_threshold: 20,
            vendor_id: "VEND-001".to_string(),
        }
    }

    fn vendor(id: &str, quality: f64) -> Vendor {
        Vendor {
            vendor_id: id.to_string(),
            name: format!("Vendor {id}"),
            lead_time_days: 3,
            unit_price: 12.0,
            on_time_rate: 0.95,
            quality_score: quality,
            reliability_rating: 4.5,
        }
    }

    #[test]
    fn low_stock_lines_are_capped_at_ten() {
        let items: Vec<_> = (0..15).map(|index| low_stock_item(&format!("SKU-{index}"))).collect();
        let formatted = format_low_stock_items(&items);
        assert_eq!(formatted.lines().count(), 10);
    }

    #[test]
    fn empty_low_stock_renders_none() {
        assert_eq!(format_low_stock_items(&[]), "None");
    }

    #[test]
    fn reorder_prompt_carries_items_vendors_and_weather() {
        let context = ReorderContext {
            low_stock: vec![low_stock_item("SKU-BEV-004")],
            vendors: vec![vendor("VEND-001", 4.8)],
        };
        let forecast = RegionForecast {
            region: Region::North,
            days: vec![DailyForecast {
                date: NaiveDate::from_ymd_opt(2026, 8, 8).expect("date"),
                temperature: 27.5,
                rainfall: 12.0,
                humidity: 80.0,
                condition: "Rain".to_string(),
            }],
        };

        let prompt = build_reorder_prompt(&context, Some(&forecast), Some(Region::North));
        assert!(prompt.contains("for the North region"));
        assert!(prompt.contains("SKU-BEV-004"));
        assert!(prompt.contains("VEND-001"));
        assert!(prompt.contains("12.0mm rain"));
    }

    #[test]
    fn reorder_prompt_marks_missing_weather() {
        let context = ReorderContext::default();
        let prompt = build_reorder_prompt(&context, None, None);
        assert!(prompt.contains("Weather forecast: unavailable"));
        assert!(!prompt.contains("for the"));
    }

    #[test]
    fn vendor_prompt_scopes_to_sku_when_present() {
        let prompt = build_vendor_prompt(&[vendor("VEND-002", 4.6)], Some("SKU-SNK-003"));
        assert!(prompt.contains("for SKU SKU-SNK-003"));
        assert!(prompt.contains("VEND-002"));
    }

    #[test]
    fn ambiguous_prompt_names_intent_and_row_count() {
        let bundle = DataBundle::Inventory(InventoryStatus {
            total_items: 120,
            ..InventoryStatus::default()
        });
        let prompt = build_ambiguous_bundle_prompt(Intent::InventoryStatus, &bundle);
        assert!(prompt.contains("inventory_status"));
        assert!(prompt.contains("120 rows"));
    }
}
