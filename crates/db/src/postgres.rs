//! PostgreSQL implementation of [`Store`] on a `sqlx` pool.

use std::time::Duration;

use async_trait::async_trait;
use passin_kernel::settings::DatabaseSettings;
use passin_kernel::Migration;
use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;
use uuid::Uuid;

use crate::error::{StoreError, StoreResult};
use crate::migrate::run_migrations;
use crate::models::{
    Attendee, AttendeeBadge, AttendeeFilter, AttendeeListItem, AttendeePage, CheckIn, Event,
    EventCapacity, EventSummary, NewAttendee, NewEvent, PAGE_SIZE,
};
use crate::store::Store;

/// Column list for `events` queries.
const EVENT_COLUMNS: &str = "id, title, slug, details, maximum_attendees";

/// Column list for `attendees` queries.
const ATTENDEE_COLUMNS: &str = "id, name, email, event_id, created_at";

const CHECK_IN_COLUMNS: &str = "id, attendee_id, created_at";

/// Matches every attendee when `$2` is NULL, otherwise a case-insensitive
/// substring of the name (`$2` is an escaped `%term%` pattern).
const ATTENDEE_FILTER: &str = "a.event_id = $1 AND ($2::text IS NULL OR a.name ILIKE $2)";

pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Create a connection pool from the database settings.
    pub async fn connect(settings: &DatabaseSettings) -> Result<Self, sqlx::Error> {
        let pool = PgPoolOptions::new()
            .max_connections(settings.max_connections)
            .acquire_timeout(Duration::from_millis(settings.acquire_timeout_ms))
            .connect(&settings.url)
            .await?;
        Ok(Self::new(pool))
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }
}

/// Escape `LIKE` metacharacters and wrap the term for substring matching.
fn like_pattern(term: &str) -> String {
    let mut pattern = String::with_capacity(term.len() + 2);
    pattern.push('%');
    for ch in term.chars() {
        if matches!(ch, '%' | '_' | '\\') {
            pattern.push('\\');
        }
        pattern.push(ch);
    }
    pattern.push('%');
    pattern
}

#[async_trait]
impl Store for PgStore {
    fn backend(&self) -> &'static str {
        "postgres"
    }

    async fn migrate(&self, migrations: &[(String, Migration)]) -> StoreResult<usize> {
        Ok(run_migrations(&self.pool, migrations).await?)
    }

    async fn ping(&self) -> StoreResult<()> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }

    async fn close(&self) {
        self.pool.close().await;
        tracing::info!("database pool closed");
    }

    async fn find_event_by_slug(&self, slug: &str) -> StoreResult<Option<Event>> {
        let query = format!("SELECT {EVENT_COLUMNS} FROM events WHERE slug = $1");
        let event = sqlx::query_as::<_, Event>(&query)
            .bind(slug)
            .fetch_optional(&self.pool)
            .await?;
        Ok(event)
    }

    async fn insert_event(&self, event: NewEvent) -> StoreResult<Event> {
        let query = format!(
            "INSERT INTO events (id, title, slug, details, maximum_attendees) \
             VALUES ($1, $2, $3, $4, $5) \
             RETURNING {EVENT_COLUMNS}"
        );
        sqlx::query_as::<_, Event>(&query)
            .bind(event.id)
            .bind(&event.title)
            .bind(&event.slug)
            .bind(&event.details)
            .bind(event.maximum_attendees)
            .fetch_one(&self.pool)
            .await
            .map_err(|err| StoreError::classify(err, "event"))
    }

    async fn find_event_summary(&self, event_id: Uuid) -> StoreResult<Option<EventSummary>> {
        let summary = sqlx::query_as::<_, EventSummary>(
            "SELECT e.id, e.title, e.slug, e.details, e.maximum_attendees, \
                    (SELECT COUNT(*) FROM attendees a WHERE a.event_id = e.id) AS attendees_amount \
             FROM events e WHERE e.id = $1",
        )
        .bind(event_id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(summary)
    }

    async fn event_capacity(&self, event_id: Uuid) -> StoreResult<Option<EventCapacity>> {
        let capacity = sqlx::query_as::<_, EventCapacity>(
            "SELECT e.maximum_attendees, \
                    (SELECT COUNT(*) FROM attendees a WHERE a.event_id = e.id) AS attendees_amount \
             FROM events e WHERE e.id = $1",
        )
        .bind(event_id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(capacity)
    }

    async fn find_attendee_by_email(
        &self,
        event_id: Uuid,
        email: &str,
    ) -> StoreResult<Option<Attendee>> {
        let query =
            format!("SELECT {ATTENDEE_COLUMNS} FROM attendees WHERE event_id = $1 AND email = $2");
        let attendee = sqlx::query_as::<_, Attendee>(&query)
            .bind(event_id)
            .bind(email)
            .fetch_optional(&self.pool)
            .await?;
        Ok(attendee)
    }

    async fn insert_attendee(&self, attendee: NewAttendee) -> StoreResult<Attendee> {
        let mut tx = self.pool.begin().await?;

        // Row lock serializes concurrent registrations for the same event.
        let maximum: Option<Option<i32>> =
            sqlx::query_scalar("SELECT maximum_attendees FROM events WHERE id = $1 FOR UPDATE")
                .bind(attendee.event_id)
                .fetch_optional(&mut *tx)
                .await?;

        let Some(maximum) = maximum else {
            return Err(StoreError::MissingReference { entity: "event" });
        };

        if let Some(maximum) = maximum {
            let amount: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM attendees WHERE event_id = $1")
                .bind(attendee.event_id)
                .fetch_one(&mut *tx)
                .await?;
            if amount >= i64::from(maximum) {
                return Err(StoreError::CapacityExceeded {
                    event_id: attendee.event_id,
                });
            }
        }

        let query = format!(
            "INSERT INTO attendees (event_id, name, email) VALUES ($1, $2, $3) \
             RETURNING {ATTENDEE_COLUMNS}"
        );
        let created = sqlx::query_as::<_, Attendee>(&query)
            .bind(attendee.event_id)
            .bind(&attendee.name)
            .bind(&attendee.email)
            .fetch_one(&mut *tx)
            .await
            .map_err(|err| StoreError::classify(err, "event"))?;

        tx.commit().await?;
        Ok(created)
    }

    async fn find_badge(&self, attendee_id: i32) -> StoreResult<Option<AttendeeBadge>> {
        let badge = sqlx::query_as::<_, AttendeeBadge>(
            "SELECT a.id, a.name, a.email, e.title AS event_title, e.slug AS event_slug \
             FROM attendees a JOIN events e ON e.id = a.event_id \
             WHERE a.id = $1",
        )
        .bind(attendee_id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(badge)
    }

    async fn find_check_in(&self, attendee_id: i32) -> StoreResult<Option<CheckIn>> {
        let query = format!("SELECT {CHECK_IN_COLUMNS} FROM check_ins WHERE attendee_id = $1");
        let check_in = sqlx::query_as::<_, CheckIn>(&query)
            .bind(attendee_id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(check_in)
    }

    async fn insert_check_in(&self, attendee_id: i32) -> StoreResult<CheckIn> {
        let query =
            format!("INSERT INTO check_ins (attendee_id) VALUES ($1) RETURNING {CHECK_IN_COLUMNS}");
        sqlx::query_as::<_, CheckIn>(&query)
            .bind(attendee_id)
            .fetch_one(&self.pool)
            .await
            .map_err(|err| StoreError::classify(err, "attendee"))
    }

    async fn list_attendees(&self, filter: &AttendeeFilter) -> StoreResult<AttendeePage> {
        let pattern = filter.search_term().map(like_pattern);

        let mut tx = self.pool.begin().await?;
        sqlx::query("SET TRANSACTION ISOLATION LEVEL REPEATABLE READ READ ONLY")
            .execute(&mut *tx)
            .await?;

        let count_query = format!("SELECT COUNT(*) FROM attendees a WHERE {ATTENDEE_FILTER}");
        let count: i64 = sqlx::query_scalar(&count_query)
            .bind(filter.event_id)
            .bind(pattern.as_deref())
            .fetch_one(&mut *tx)
            .await?;

        let page_query = format!(
            "SELECT a.id, a.name, a.email, a.created_at, c.created_at AS check_in_at \
             FROM attendees a LEFT JOIN check_ins c ON c.attendee_id = a.id \
             WHERE {ATTENDEE_FILTER} \
             ORDER BY a.created_at DESC, a.id DESC \
             LIMIT $3 OFFSET $4"
        );
        let attendees = sqlx::query_as::<_, AttendeeListItem>(&page_query)
            .bind(filter.event_id)
            .bind(pattern.as_deref())
            .bind(PAGE_SIZE)
            .bind(filter.offset())
            .fetch_all(&mut *tx)
            .await?;

        tx.commit().await?;

        Ok(AttendeePage { count, attendees })
    }
}
