use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{FromRow, PgPool};
use uuid::Uuid;

use super::{AccountStore, HistoryQuery, RecordStore, SortOrder, StoreError, StoreResult};
use crate::models::garden::{GardenState, MAX_STAGE};
use crate::models::mood::MoodEntry;
use crate::models::sleep::SleepEntry;
use crate::models::user::{RefreshToken, User};

#[derive(Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn migrate(&self) -> StoreResult<()> {
        sqlx::migrate!("./migrations").run(&self.pool).await?;
        Ok(())
    }
}

/// `LIMIT NULL` is unbounded in Postgres, so the cap binds as an Option.
fn history_sql(table: &str, columns: &str, order: SortOrder) -> String {
    format!(
        "SELECT {columns} FROM {table} \
         WHERE user_id = $1 AND ($2::timestamptz IS NULL OR recorded_at >= $2) \
         ORDER BY recorded_at {order} \
         LIMIT $3",
        columns = columns,
        table = table,
        order = order.as_sql(),
    )
}

/// Appended to a data-modifying CTE named `changed` that returns `user_id`:
/// bumps each changed owner's revision in the same statement.
const BUMP_REVISION: &str = r#"
    INSERT INTO revisions (user_id, revision)
    SELECT user_id, 1 FROM changed
    ON CONFLICT (user_id) DO UPDATE SET revision = revisions.revision + 1
"#;

fn with_revision_bump(change: &str) -> String {
    format!(
        "WITH changed AS ({change}) {bump} RETURNING revision",
        change = change,
        bump = BUMP_REVISION,
    )
}

fn to_revision(raw: i64) -> u64 {
    u64::try_from(raw).unwrap_or(0)
}

#[derive(FromRow)]
struct RevisedGarden {
    #[sqlx(flatten)]
    garden: GardenState,
    revision: i64,
}

fn map_unique_violation(e: sqlx::Error, what: &str) -> StoreError {
    match &e {
        sqlx::Error::Database(db) if db.is_unique_violation() => {
            StoreError::Conflict(what.to_string())
        }
        _ => StoreError::Database(e),
    }
}

#[async_trait]
impl RecordStore for PgStore {
    async fn insert_mood(&self, entry: &MoodEntry) -> StoreResult<u64> {
        let sql = with_revision_bump(
            "INSERT INTO moods (id, user_id, mood, recorded_at) \
             VALUES ($1, $2, $3, $4) RETURNING user_id",
        );
        let revision = sqlx::query_scalar::<_, i64>(&sql)
            .bind(entry.id)
            .bind(entry.user_id)
            .bind(&entry.mood)
            .bind(entry.recorded_at)
            .fetch_one(&self.pool)
            .await?;
        Ok(to_revision(revision))
    }

    async fn select_moods(&self, query: &HistoryQuery) -> StoreResult<Vec<MoodEntry>> {
        let sql = history_sql("moods", "id, user_id, mood, recorded_at", query.order);
        let rows = sqlx::query_as::<_, MoodEntry>(&sql)
            .bind(query.owner)
            .bind(query.since)
            .bind(query.limit.map(i64::from))
            .fetch_all(&self.pool)
            .await?;
        Ok(rows)
    }

    async fn insert_sleep(&self, entry: &SleepEntry) -> StoreResult<u64> {
        let sql = with_revision_bump(
            "INSERT INTO sleep_logs (id, user_id, hours, recorded_at) \
             VALUES ($1, $2, $3, $4) RETURNING user_id",
        );
        let revision = sqlx::query_scalar::<_, i64>(&sql)
            .bind(entry.id)
            .bind(entry.user_id)
            .bind(entry.hours)
            .bind(entry.recorded_at)
            .fetch_one(&self.pool)
            .await?;
        Ok(to_revision(revision))
    }

    async fn select_sleep(&self, query: &HistoryQuery) -> StoreResult<Vec<SleepEntry>> {
        let sql = history_sql("sleep_logs", "id, user_id, hours, recorded_at", query.order);
        let rows = sqlx::query_as::<_, SleepEntry>(&sql)
            .bind(query.owner)
            .bind(query.since)
            .bind(query.limit.map(i64::from))
            .fetch_all(&self.pool)
            .await?;
        Ok(rows)
    }

    async fn visit_garden(&self, owner: Uuid, now: DateTime<Utc>) -> StoreResult<GardenState> {
        let initial = GardenState::new(owner, now);
        let garden = sqlx::query_as::<_, GardenState>(
            r#"
            INSERT INTO trees (id, user_id, stage, health, happiness, last_visited_at, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $6, $6)
            ON CONFLICT (user_id) DO UPDATE SET last_visited_at = EXCLUDED.last_visited_at
            RETURNING *
            "#,
        )
        .bind(initial.id)
        .bind(owner)
        .bind(initial.stage)
        .bind(initial.health)
        .bind(initial.happiness)
        .bind(now)
        .fetch_one(&self.pool)
        .await?;
        Ok(garden)
    }

    async fn find_garden(&self, owner: Uuid) -> StoreResult<Option<GardenState>> {
        let garden = sqlx::query_as::<_, GardenState>("SELECT * FROM trees WHERE user_id = $1")
            .bind(owner)
            .fetch_optional(&self.pool)
            .await?;
        Ok(garden)
    }

    async fn update_garden(&self, garden: &GardenState) -> StoreResult<(GardenState, u64)> {
        let sql = format!(
            r#"
            WITH changed AS (
                UPDATE trees SET
                    stage = $3,
                    health = $4,
                    happiness = $5,
                    updated_at = $6
                WHERE id = $1 AND user_id = $2
                RETURNING *
            ),
            bumped AS ({bump} RETURNING revision)
            SELECT changed.*, bumped.revision FROM changed CROSS JOIN bumped
            "#,
            bump = BUMP_REVISION,
        );
        let row = sqlx::query_as::<_, RevisedGarden>(&sql)
            .bind(garden.id)
            .bind(garden.user_id)
            .bind(garden.stage)
            .bind(garden.health)
            .bind(garden.happiness)
            .bind(garden.updated_at)
            .fetch_optional(&self.pool)
            .await?
            .ok_or(StoreError::NotFound)?;
        Ok((row.garden, to_revision(row.revision)))
    }

    async fn advance_active_gardens(
        &self,
        visited_since: DateTime<Utc>,
        now: DateTime<Utc>,
    ) -> StoreResult<u64> {
        // one garden per owner, so bumped revisions == grown gardens
        let sql = format!(
            "WITH changed AS (\
                 UPDATE trees SET stage = stage + 1, updated_at = $3 \
                 WHERE last_visited_at >= $1 AND stage < $2 \
                 RETURNING user_id\
             ) {}",
            BUMP_REVISION
        );
        let result = sqlx::query(&sql)
            .bind(visited_since)
            .bind(MAX_STAGE)
            .bind(now)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected())
    }

    async fn current_revision(&self, owner: Uuid) -> StoreResult<u64> {
        let revision =
            sqlx::query_scalar::<_, i64>("SELECT revision FROM revisions WHERE user_id = $1")
                .bind(owner)
                .fetch_optional(&self.pool)
                .await?;
        Ok(revision.map(to_revision).unwrap_or(0))
    }

    async fn ping(&self) -> StoreResult<()> {
        sqlx::query_scalar::<_, i32>("SELECT 1")
            .fetch_one(&self.pool)
            .await?;
        Ok(())
    }
}

#[async_trait]
impl AccountStore for PgStore {
    async fn create_user(&self, user: &User) -> StoreResult<()> {
        sqlx::query(
            r#"
            INSERT INTO users (id, email, password_hash, name, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6)
            "#,
        )
        .bind(user.id)
        .bind(&user.email)
        .bind(&user.password_hash)
        .bind(&user.name)
        .bind(user.created_at)
        .bind(user.updated_at)
        .execute(&self.pool)
        .await
        .map_err(|e| map_unique_violation(e, "email already registered"))?;
        Ok(())
    }

    async fn find_user(&self, id: Uuid) -> StoreResult<Option<User>> {
        let user = sqlx::query_as::<_, User>("SELECT * FROM users WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(user)
    }

    async fn find_user_by_email(&self, email: &str) -> StoreResult<Option<User>> {
        let user = sqlx::query_as::<_, User>("SELECT * FROM users WHERE email = $1")
            .bind(email)
            .fetch_optional(&self.pool)
            .await?;
        Ok(user)
    }

    async fn insert_refresh_token(&self, token: &RefreshToken) -> StoreResult<()> {
        sqlx::query(
            r#"
            INSERT INTO refresh_tokens (id, user_id, token_hash, expires_at, revoked, parent_token_id, created_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            "#,
        )
        .bind(token.id)
        .bind(token.user_id)
        .bind(&token.token_hash)
        .bind(token.expires_at)
        .bind(token.revoked)
        .bind(token.parent_token_id)
        .bind(token.created_at)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn find_refresh_token(&self, token_hash: &str) -> StoreResult<Option<RefreshToken>> {
        let token = sqlx::query_as::<_, RefreshToken>(
            r#"
            SELECT id, user_id, token_hash, expires_at, revoked, parent_token_id, created_at
            FROM refresh_tokens
            WHERE token_hash = $1
            "#,
        )
        .bind(token_hash)
        .fetch_optional(&self.pool)
        .await?;
        Ok(token)
    }

    async fn revoke_refresh_token(&self, id: Uuid) -> StoreResult<()> {
        sqlx::query(
            r#"
            UPDATE refresh_tokens
            SET revoked = true, revoked_at = NOW()
            WHERE id = $1
            "#,
        )
        .bind(id)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn revoke_all_refresh_tokens(&self, user_id: Uuid) -> StoreResult<u64> {
        let result = sqlx::query(
            r#"
            UPDATE refresh_tokens
            SET revoked = true, revoked_at = NOW()
            WHERE user_id = $1 AND revoked = false
            "#,
        )
        .bind(user_id)
        .execute(&self.pool)
        .await?;
        Ok(result.rows_affected())
    }
}
