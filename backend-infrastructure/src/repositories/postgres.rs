// Postgres-backed stores
// Single-row operations only; the store's row-level last-write-wins is the
// serialization point for racing updates to the same anomaly id.

use std::time::Duration;

use anyhow::Result;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::postgres::{PgPool, PgPoolOptions};
use sqlx::types::Json;
use sqlx::{FromRow, Postgres, QueryBuilder};

use backend_domain::ports::{AnomalyStore, TransactionStore};
use backend_domain::{
    Anomaly,
    AnomalyComment,
    AnomalyFilter,
    AnomalyStatus,
    AnomalyUpdate,
    DbConfig,
    PagedResult,
    Severity,
    TransactionPatch,
    TransactionRecord,
    TriggeredBy,
};

const ANOMALY_COLUMNS: &str = r#"id, transaction_id, user_id, rule_name, description, severity, status, risk_score, triggered_by, transaction_data, comments, resolved_by, resolved_at, resolution_notes, "timestamp", created_at, updated_at"#;

#[derive(Clone)]
pub struct PostgresStore {
    pool: PgPool,
}

#[derive(FromRow)]
struct AnomalyRow {
    id: String,
    transaction_id: String,
    user_id: Option<String>,
    rule_name: String,
    description: String,
    severity: String,
    status: String,
    risk_score: f64,
    triggered_by: Json<TriggeredBy>,
    transaction_data: Json<serde_json::Value>,
    comments: Json<Vec<AnomalyComment>>,
    resolved_by: Option<String>,
    resolved_at: Option<DateTime<Utc>>,
    resolution_notes: Option<String>,
    timestamp: DateTime<Utc>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl From<AnomalyRow> for Anomaly {
    fn from(row: AnomalyRow) -> Self {
        Anomaly {
            id: row.id,
            transaction_id: row.transaction_id,
            user_id: row.user_id,
            rule_name: row.rule_name,
            description: row.description,
            severity: Severity::from(row.severity.as_str()),
            status: AnomalyStatus::from(row.status.as_str()),
            risk_score: row.risk_score,
            triggered_by: row.triggered_by.0,
            transaction_data: row.transaction_data.0,
            comments: row.comments.0,
            resolved_by: row.resolved_by,
            resolved_at: row.resolved_at,
            resolution_notes: row.resolution_notes,
            timestamp: row.timestamp,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

#[derive(FromRow)]
struct TransactionRow {
    transaction_id: String,
    user_id: Option<String>,
    amount: f64,
    timestamp: DateTime<Utc>,
    is_fraud: bool,
    risk_score: f64,
}

impl From<TransactionRow> for TransactionRecord {
    fn from(row: TransactionRow) -> Self {
        TransactionRecord {
            transaction_id: row.transaction_id,
            user_id: row.user_id,
            amount: row.amount,
            timestamp: row.timestamp,
            is_fraud: row.is_fraud,
            risk_score: row.risk_score,
        }
    }
}

impl PostgresStore {
    pub async fn connect(config: &DbConfig) -> Result<Self> {
        let pool = PgPoolOptions::new()
            .max_connections(config.max_connections)
            .acquire_timeout(Duration::from_secs(30))
            .connect(&config.database_url)
            .await?;
        Ok(Self { pool })
    }

    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn ensure_schema(&self) -> Result<()> {
        let create_transactions = r#"
CREATE TABLE IF NOT EXISTS transactions (
    transaction_id TEXT PRIMARY KEY,
    user_id TEXT,
    amount DOUBLE PRECISION NOT NULL DEFAULT 0,
    "timestamp" TIMESTAMPTZ NOT NULL DEFAULT NOW(),
    is_fraud BOOLEAN NOT NULL DEFAULT FALSE,
    risk_score DOUBLE PRECISION NOT NULL DEFAULT 0
)
"#;
        sqlx::query(create_transactions).execute(&self.pool).await?;

        let create_anomalies = r#"
CREATE TABLE IF NOT EXISTS anomalies (
    id TEXT PRIMARY KEY,
    transaction_id TEXT NOT NULL,
    user_id TEXT,
    rule_name TEXT NOT NULL,
    description TEXT NOT NULL DEFAULT '',
    severity TEXT NOT NULL,
    status TEXT NOT NULL,
    risk_score DOUBLE PRECISION NOT NULL DEFAULT 0,
    triggered_by JSONB NOT NULL DEFAULT '{}'::jsonb,
    transaction_data JSONB NOT NULL DEFAULT '{}'::jsonb,
    comments JSONB NOT NULL DEFAULT '[]'::jsonb,
    resolved_by TEXT,
    resolved_at TIMESTAMPTZ,
    resolution_notes TEXT,
    "timestamp" TIMESTAMPTZ NOT NULL,
    created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
    updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
)
"#;
        sqlx::query(create_anomalies).execute(&self.pool).await?;

        sqlx::query(
            "CREATE INDEX IF NOT EXISTS idx_anomalies_transaction_id ON anomalies (transaction_id)",
        )
        .execute(&self.pool)
        .await?;
        sqlx::query(
            r#"CREATE INDEX IF NOT EXISTS idx_anomalies_timestamp ON anomalies ("timestamp" DESC)"#,
        )
        .execute(&self.pool)
        .await?;
        Ok(())
    }
}

fn push_anomaly_filters(builder: &mut QueryBuilder<'_, Postgres>, filter: &AnomalyFilter) {
    if let Some(status) = filter.status {
        builder.push(" AND status = ");
        builder.push_bind(status.as_str());
    }
    if let Some(min) = filter.min_risk_score {
        builder.push(" AND risk_score >= ");
        builder.push_bind(min);
    }
    if let Some(max) = filter.max_risk_score {
        builder.push(" AND risk_score <= ");
        builder.push_bind(max);
    }
    if let Some(start) = filter.start_date {
        builder.push(r#" AND "timestamp" >= "#);
        builder.push_bind(start);
    }
    if let Some(end) = filter.end_date {
        builder.push(r#" AND "timestamp" <= "#);
        builder.push_bind(end);
    }
    if let Some(algorithm) = &filter.algorithm {
        builder.push(" AND triggered_by->>'algorithm' = ");
        builder.push_bind(algorithm.clone());
    }
    if let Some(search) = &filter.search {
        let needle = format!("%{}%", search.trim());
        builder.push(" AND (description ILIKE ");
        builder.push_bind(needle.clone());
        builder.push(" OR transaction_id ILIKE ");
        builder.push_bind(needle);
        builder.push(")");
    }
}

#[async_trait]
impl AnomalyStore for PostgresStore {
    async fn create(&self, anomaly: &Anomaly) -> Result<Anomaly> {
        let sql = format!(
            r#"INSERT INTO anomalies (id, transaction_id, user_id, rule_name, description, severity, status, risk_score, triggered_by, transaction_data, comments, resolved_by, resolved_at, resolution_notes, "timestamp", created_at, updated_at)
VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $16, $17)
RETURNING {}"#,
            ANOMALY_COLUMNS
        );
        let row = sqlx::query_as::<_, AnomalyRow>(&sql)
            .bind(&anomaly.id)
            .bind(&anomaly.transaction_id)
            .bind(&anomaly.user_id)
            .bind(&anomaly.rule_name)
            .bind(&anomaly.description)
            .bind(anomaly.severity.as_str())
            .bind(anomaly.status.as_str())
            .bind(anomaly.risk_score)
            .bind(Json(&anomaly.triggered_by))
            .bind(Json(&anomaly.transaction_data))
            .bind(Json(&anomaly.comments))
            .bind(&anomaly.resolved_by)
            .bind(anomaly.resolved_at)
            .bind(&anomaly.resolution_notes)
            .bind(anomaly.timestamp)
            .bind(anomaly.created_at)
            .bind(anomaly.updated_at)
            .fetch_one(&self.pool)
            .await?;
        Ok(row.into())
    }

    async fn update(&self, id: &str, update: &AnomalyUpdate) -> Result<Option<Anomaly>> {
        if update.is_empty() {
            return AnomalyStore::find_by_id(self, id).await;
        }

        let mut builder =
            QueryBuilder::<Postgres>::new("UPDATE anomalies SET updated_at = NOW()");
        if let Some(status) = update.status {
            builder.push(", status = ");
            builder.push_bind(status.as_str());
        }
        if let Some(severity) = update.severity {
            builder.push(", severity = ");
            builder.push_bind(severity.as_str());
        }
        if let Some(risk_score) = update.risk_score {
            builder.push(", risk_score = ");
            builder.push_bind(risk_score);
        }
        if let Some(description) = &update.description {
            builder.push(", description = ");
            builder.push_bind(description.clone());
        }
        if let Some(resolved_by) = &update.resolved_by {
            builder.push(", resolved_by = ");
            builder.push_bind(resolved_by.clone());
        }
        if let Some(resolved_at) = &update.resolved_at {
            builder.push(", resolved_at = ");
            builder.push_bind(*resolved_at);
        }
        if let Some(notes) = &update.resolution_notes {
            builder.push(", resolution_notes = ");
            builder.push_bind(notes.clone());
        }
        builder.push(" WHERE id = ");
        builder.push_bind(id.to_string());
        builder.push(format!(" RETURNING {}", ANOMALY_COLUMNS));

        let row = builder
            .build_query_as::<AnomalyRow>()
            .fetch_optional(&self.pool)
            .await?;
        Ok(row.map(Into::into))
    }

    async fn add_comment(&self, id: &str, comment: &AnomalyComment) -> Result<Option<Anomaly>> {
        let sql = format!(
            "UPDATE anomalies SET comments = comments || $1::jsonb, updated_at = NOW() WHERE id = $2 RETURNING {}",
            ANOMALY_COLUMNS
        );
        let row = sqlx::query_as::<_, AnomalyRow>(&sql)
            .bind(Json(comment))
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row.map(Into::into))
    }

    async fn delete(&self, id: &str) -> Result<Option<Anomaly>> {
        let sql = format!(
            "DELETE FROM anomalies WHERE id = $1 RETURNING {}",
            ANOMALY_COLUMNS
        );
        let row = sqlx::query_as::<_, AnomalyRow>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row.map(Into::into))
    }

    async fn find_by_id(&self, id: &str) -> Result<Option<Anomaly>> {
        let sql = format!("SELECT {} FROM anomalies WHERE id = $1", ANOMALY_COLUMNS);
        let row = sqlx::query_as::<_, AnomalyRow>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row.map(Into::into))
    }

    async fn find_by_transaction_id(&self, transaction_id: &str) -> Result<Vec<Anomaly>> {
        let sql = format!(
            r#"SELECT {} FROM anomalies WHERE transaction_id = $1 ORDER BY "timestamp" DESC"#,
            ANOMALY_COLUMNS
        );
        let rows = sqlx::query_as::<_, AnomalyRow>(&sql)
            .bind(transaction_id)
            .fetch_all(&self.pool)
            .await?;
        Ok(rows.into_iter().map(Into::into).collect())
    }

    async fn list(&self, filter: &AnomalyFilter) -> Result<PagedResult<Anomaly>> {
        let mut count_builder =
            QueryBuilder::<Postgres>::new("SELECT COUNT(*) FROM anomalies WHERE 1=1");
        push_anomaly_filters(&mut count_builder, filter);
        let total_count: i64 = count_builder
            .build_query_scalar()
            .fetch_one(&self.pool)
            .await?;

        let mut data_builder = QueryBuilder::<Postgres>::new(format!(
            "SELECT {} FROM anomalies WHERE 1=1",
            ANOMALY_COLUMNS
        ));
        push_anomaly_filters(&mut data_builder, filter);
        data_builder.push(r#" ORDER BY "timestamp" DESC"#);
        if let Some(limit) = filter.limit {
            data_builder.push(" LIMIT ");
            data_builder.push_bind(limit as i64);
        }
        if let Some(offset) = filter.offset {
            data_builder.push(" OFFSET ");
            data_builder.push_bind(offset as i64);
        }

        let rows = data_builder
            .build_query_as::<AnomalyRow>()
            .fetch_all(&self.pool)
            .await?;
        Ok(PagedResult {
            rows: rows.into_iter().map(Into::into).collect(),
            total_count: total_count.max(0) as u64,
        })
    }

    async fn ping(&self) -> Result<()> {
        let _: i32 = sqlx::query_scalar("SELECT 1").fetch_one(&self.pool).await?;
        Ok(())
    }
}

#[async_trait]
impl TransactionStore for PostgresStore {
    async fn find_by_id(&self, transaction_id: &str) -> Result<Option<TransactionRecord>> {
        let row = sqlx::query_as::<_, TransactionRow>(
            r#"SELECT transaction_id, user_id, amount, "timestamp", is_fraud, risk_score FROM transactions WHERE transaction_id = $1"#,
        )
        .bind(transaction_id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row.map(Into::into))
    }

    async fn update(&self, transaction_id: &str, patch: &TransactionPatch) -> Result<()> {
        if patch.is_empty() {
            return Ok(());
        }
        let mut builder = QueryBuilder::<Postgres>::new("UPDATE transactions SET ");
        let mut first = true;
        if let Some(is_fraud) = patch.is_fraud {
            builder.push("is_fraud = ");
            builder.push_bind(is_fraud);
            first = false;
        }
        if let Some(risk_score) = patch.risk_score {
            if !first {
                builder.push(", ");
            }
            builder.push("risk_score = ");
            builder.push_bind(risk_score);
        }
        builder.push(" WHERE transaction_id = ");
        builder.push_bind(transaction_id.to_string());
        builder.build().execute(&self.pool).await?;
        Ok(())
    }
}
