//! SQLite-backed `SignalRepository`, storing fired CHoCH signals in the
//! `alerts` table contract.

use crate::domain::market::pattern::{Direction, Group};
use crate::domain::market::signal::Signal;
use crate::domain::market::timeframe::Timeframe;
use crate::domain::ports::SignalRepository;
use crate::infrastructure::persistence::database::Database;
use anyhow::Result;
use async_trait::async_trait;
use rust_decimal::Decimal;
use sqlx::Row;
use std::str::FromStr;

pub struct SqliteAlertRepository {
    db: Database,
}

impl SqliteAlertRepository {
    pub fn new(db: Database) -> Self {
        Self { db }
    }

    fn direction_label(direction: Direction) -> &'static str {
        match direction {
            Direction::Up => "Long",
            Direction::Down => "Short",
        }
    }

    fn signal_type_label(direction: Direction) -> &'static str {
        match direction {
            Direction::Up => "CHoCH Up",
            Direction::Down => "CHoCH Down",
        }
    }
}

#[async_trait]
impl SignalRepository for SqliteAlertRepository {
    async fn save(&self, signal: &Signal) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO alerts (symbol, timeframe, direction, pattern_group, signal_type, price, signal_time)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
            "#,
        )
        .bind(&signal.symbol)
        .bind(signal.timeframe.label())
        .bind(Self::direction_label(signal.direction))
        .bind(signal.group.label())
        .bind(Self::signal_type_label(signal.direction))
        .bind(signal.price.to_string())
        .bind(signal.signal_time)
        .execute(&self.db.pool)
        .await?;
        Ok(())
    }

    async fn find_by_symbol_timeframe(
        &self,
        symbol: &str,
        timeframe: Timeframe,
        limit: usize,
    ) -> Result<Vec<Signal>> {
        let rows = sqlx::query(
            r#"
            SELECT direction, pattern_group, price, signal_time
            FROM alerts
            WHERE symbol = ?1 AND timeframe = ?2
            ORDER BY signal_time DESC
            LIMIT ?3
            "#,
        )
        .bind(symbol)
        .bind(timeframe.label())
        .bind(limit as i64)
        .fetch_all(&self.db.pool)
        .await?;

        // The `alerts` table only stores the decision, not the pattern's
        // eight pivot prices/bar indices; those are reconstructed as zero
        // since only the signal itself is persisted by this contract.
        let mut signals = Vec::with_capacity(rows.len());
        for row in rows {
            let direction_label: String = row.try_get("direction")?;
            let group_label: Option<String> = row.try_get("pattern_group")?;
            let price: String = row.try_get("price")?;
            let signal_time: i64 = row.try_get("signal_time")?;

            let direction = match direction_label.as_str() {
                "Long" => Direction::Up,
                _ => Direction::Down,
            };
            let group = match group_label.as_deref() {
                Some("G1") => Group::G1,
                Some("G2") => Group::G2,
                _ => Group::G3,
            };
            signals.push(Signal {
                symbol: symbol.to_string(),
                timeframe,
                direction,
                group,
                price: Decimal::from_str(&price)?,
                signal_time,
                pattern_pivot_prices: [Decimal::ZERO; 8],
                pattern_bar_indices: [0; 8],
            });
        }
        Ok(signals)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    async fn memory_db() -> Database {
        Database::new("sqlite::memory:").await.unwrap()
    }

    fn sample_signal() -> Signal {
        Signal {
            symbol: "BTCUSDT".to_string(),
            timeframe: Timeframe::FiveMin,
            direction: Direction::Up,
            group: Group::G1,
            price: dec!(99.0),
            signal_time: 1_700_000_000,
            pattern_pivot_prices: [dec!(1); 8],
            pattern_bar_indices: [0; 8],
        }
    }

    #[tokio::test]
    async fn save_then_find_round_trips_core_fields() {
        let repo = SqliteAlertRepository::new(memory_db().await);
        repo.save(&sample_signal()).await.unwrap();

        let found = repo
            .find_by_symbol_timeframe("BTCUSDT", Timeframe::FiveMin, 10)
            .await
            .unwrap();
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].direction, Direction::Up);
        assert_eq!(found[0].group, Group::G1);
        assert_eq!(found[0].price, dec!(99.0));
    }

    #[tokio::test]
    async fn find_filters_by_symbol_and_timeframe() {
        let repo = SqliteAlertRepository::new(memory_db().await);
        repo.save(&sample_signal()).await.unwrap();

        let other = repo
            .find_by_symbol_timeframe("ETHUSDT", Timeframe::FiveMin, 10)
            .await
            .unwrap();
        assert!(other.is_empty());
    }
}
