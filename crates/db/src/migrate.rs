//! Applies module-contributed migrations and records them in
//! `_passin_migrations`.

use passin_kernel::Migration;
use sqlx::{Executor, PgConnection, PgPool};

const CREATE_LEDGER: &str = "CREATE TABLE IF NOT EXISTS _passin_migrations (\
        module TEXT NOT NULL, \
        id TEXT NOT NULL, \
        applied_at TIMESTAMPTZ NOT NULL DEFAULT now(), \
        PRIMARY KEY (module, id)\
    )";

/// Run every migration not yet recorded, each in its own transaction.
pub async fn run_migrations(
    pool: &PgPool,
    migrations: &[(String, Migration)],
) -> Result<usize, sqlx::Error> {
    sqlx::query(CREATE_LEDGER).execute(pool).await?;

    let mut applied = 0;
    for (module, migration) in migrations {
        let already: bool = sqlx::query_scalar(
            "SELECT EXISTS (SELECT 1 FROM _passin_migrations WHERE module = $1 AND id = $2)",
        )
        .bind(module)
        .bind(migration.id)
        .fetch_one(pool)
        .await?;

        if already {
            tracing::debug!(module = %module, migration = migration.id, "migration already applied");
            continue;
        }

        let mut tx = pool.begin().await?;
        let conn: &mut PgConnection = &mut tx;
        conn.execute(sqlx::raw_sql(migration.up)).await?;
        sqlx::query("INSERT INTO _passin_migrations (module, id) VALUES ($1, $2)")
            .bind(module)
            .bind(migration.id)
            .execute(&mut *tx)
            .await?;
        tx.commit().await?;

        tracing::info!(module = %module, migration = migration.id, "migration applied");
        applied += 1;
    }

    Ok(applied)
}
