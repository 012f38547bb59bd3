use sqlx::Executor;

use crate::repositories::RepositoryError;
use crate::DbPool;

/// Expected row counts after a clean seed. `verify` re-checks these so
/// a partial load never passes silently.
const SEED_TABLE_CONTRACT: &[TableSeedContract] = &[
    TableSeedContract { table: "vendors", expected_rows: 5 },
    TableSeedContract { table: "inventory", expected_rows: 20 },
    TableSeedContract { table: "finance", expected_rows: 24 },
    TableSeedContract { table: "sales", expected_rows: 30 },
];

/// Exactly this many seeded inventory rows sit at or below their
/// reorder threshold; the low-stock demo scenarios depend on it.
const EXPECTED_LOW_STOCK_ROWS: i64 = 8;

#[derive(Clone, Copy, Debug)]
struct TableSeedContract {
    table: &'static str,
    expected_rows: i64,
}

#[derive(Clone, Debug)]
pub struct TableSeedInfo {
    pub table: &'static str,
    pub rows: i64,
}

#[derive(Clone, Debug)]
pub struct SeedResult {
    pub tables_seeded: Vec<TableSeedInfo>,
}

#[derive(Clone, Debug)]
pub struct VerificationResult {
    pub all_present: bool,
    pub checks: Vec<(&'static str, bool)>,
}

/// Deterministic demo dataset powering the seed command, the demo
/// chat flows, and the repository tests.
pub struct DemoDataset;

impl DemoDataset {
    pub const SQL: &str = include_str!("../../../config/fixtures/demo_seed.sql");

    pub async fn load(pool: &DbPool) -> Result<SeedResult, RepositoryError> {
        let mut tx = pool.begin().await?;
        tx.execute(sqlx::query(Self::SQL)).await?;
        tx.commit().await?;

        let tables_seeded = SEED_TABLE_CONTRACT
            .iter()
            .map(|contract| TableSeedInfo { table: contract.table, rows: contract.expected_rows })
            .collect();

        Ok(SeedResult { tables_seeded })
    }

    pub async fn verify(pool: &DbPool) -> Result<VerificationResult, RepositoryError> {
        let mut checks = Vec::new();

        for contract in SEED_TABLE_CONTRACT {
            let (count,): (i64,) =
                sqlx::query_as(&format!("SELECT COUNT(*) FROM {}", contract.table))
                    .fetch_one(pool)
                    .await?;
            checks.push((contract.table, count == contract.expected_rows));
        }

        let (low_stock,): (i64,) = sqlx::query_as(
            "SELECT COUNT(*) FROM inventory WHERE quantity <= reorder_threshold",
        )
        .fetch_one(pool)
        .await?;
        checks.push(("inventory-low-stock", low_stock == EXPECTED_LOW_STOCK_ROWS));

        let (dangling_vendors,): (i64,) = sqlx::query_as(
            "SELECT COUNT(*) FROM inventory i \
             LEFT JOIN vendors v ON i.vendor_id = v.vendor_id \
             WHERE v.vendor_id IS NULL",
        )
        .fetch_one(pool)
        .await?;
        checks.push(("inventory-vendor-refs", dangling_vendors == 0));

        let all_present = checks.iter().all(|(_, passed)| *passed);
        Ok(VerificationResult { all_present, checks })
    }
}
