use anyhow::Result;
use futures_util::TryStreamExt;
use moka::future::Cache;
use sqlx::MySqlPool;
use std::time::Duration;
use tracing::info;

use crate::model::employee_config::EmployeeConfig;

const CONFIG_COLUMNS: &str = "employee_id, employee_name, office_start_time, office_end_time, \
     required_hours, flexible_start, grace_period_minutes, max_break_duration_minutes";

/// Read-only lookup from employee id to office-hours configuration, fronted
/// by an in-memory cache. Injected into handlers so the engine never depends
/// on how configuration is sourced.
#[derive(Clone)]
pub struct EmployeeDirectory {
    pool: MySqlPool,
    cache: Cache<String, EmployeeConfig>,
}

impl EmployeeDirectory {
    pub fn new(pool: MySqlPool, ttl_secs: u64) -> Self {
        let cache = Cache::builder()
            .max_capacity(10_000)
            .time_to_live(Duration::from_secs(ttl_secs))
            .build();
        Self { pool, cache }
    }

    pub async fn lookup(&self, employee_id: &str) -> Result<Option<EmployeeConfig>, sqlx::Error> {
        if let Some(config) = self.cache.get(employee_id).await {
            return Ok(Some(config));
        }

        let config = sqlx::query_as::<_, EmployeeConfig>(&format!(
            "SELECT {CONFIG_COLUMNS} FROM employee_configs WHERE employee_id = ?"
        ))
        .bind(employee_id)
        .fetch_optional(&self.pool)
        .await?;

        if let Some(config) = &config {
            self.cache
                .insert(config.employee_id.clone(), config.clone())
                .await;
        }
        Ok(config)
    }

    pub async fn list(&self) -> Result<Vec<EmployeeConfig>, sqlx::Error> {
        sqlx::query_as::<_, EmployeeConfig>(&format!(
            "SELECT {CONFIG_COLUMNS} FROM employee_configs ORDER BY employee_id"
        ))
        .fetch_all(&self.pool)
        .await
    }

    /// Provision (or replace) an employee's configuration.
    pub async fn upsert(&self, config: &EmployeeConfig) -> Result<(), sqlx::Error> {
        sqlx::query(
            r#"
            INSERT INTO employee_configs
                (employee_id, employee_name, office_start_time, office_end_time,
                 required_hours, flexible_start, grace_period_minutes, max_break_duration_minutes)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?)
            ON DUPLICATE KEY UPDATE
                employee_name = VALUES(employee_name),
                office_start_time = VALUES(office_start_time),
                office_end_time = VALUES(office_end_time),
                required_hours = VALUES(required_hours),
                flexible_start = VALUES(flexible_start),
                grace_period_minutes = VALUES(grace_period_minutes),
                max_break_duration_minutes = VALUES(max_break_duration_minutes)
            "#,
        )
        .bind(&config.employee_id)
        .bind(&config.employee_name)
        .bind(config.office_start_time)
        .bind(config.office_end_time)
        .bind(config.required_hours)
        .bind(config.flexible_start)
        .bind(config.grace_period_minutes)
        .bind(config.max_break_duration_minutes)
        .execute(&self.pool)
        .await?;

        self.cache
            .insert(config.employee_id.clone(), config.clone())
            .await;
        Ok(())
    }

    /// Preload every configuration row into the cache at startup, in batches.
    pub async fn warmup(&self, batch_size: usize) -> Result<()> {
        let sql = format!("SELECT {CONFIG_COLUMNS} FROM employee_configs ORDER BY employee_id");
        let mut stream = sqlx::query_as::<_, EmployeeConfig>(&sql).fetch(&self.pool);

        let mut batch = Vec::with_capacity(batch_size);
        let mut count = 0usize;

        while let Some(config) = stream.try_next().await? {
            batch.push(config);
            if batch.len() >= batch_size {
                count += batch.len();
                self.insert_batch(std::mem::take(&mut batch)).await;
            }
        }
        if !batch.is_empty() {
            count += batch.len();
            self.insert_batch(batch).await;
        }

        info!(count, "employee directory cache warmed");
        Ok(())
    }

    async fn insert_batch(&self, configs: Vec<EmployeeConfig>) {
        let inserts: Vec<_> = configs
            .into_iter()
            .map(|config| self.cache.insert(config.employee_id.clone(), config))
            .collect();

        // Await all insertions concurrently
        futures::future::join_all(inserts).await;
    }
}
