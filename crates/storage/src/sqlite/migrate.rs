use chrono::Utc;
use sqlx::SqlitePool;

use super::SqliteInitError;

struct Migration {
    version: i64,
    statements: &'static [&'static str],
}

/// Ordered by version; each one runs in its own transaction.
const MIGRATIONS: &[Migration] = &[Migration {
    version: 1,
    statements: &[
        r"
        CREATE TABLE IF NOT EXISTS quiz_scores (
            quiz_id TEXT PRIMARY KEY,
            score INTEGER NOT NULL CHECK (score >= 0),
            total INTEGER NOT NULL CHECK (total > 0),
            percentage REAL NOT NULL,
            recorded_at TEXT NOT NULL,
            previous_score INTEGER CHECK (previous_score >= 0),
            CHECK (score <= total)
        );
        ",
        r"
        CREATE INDEX IF NOT EXISTS idx_quiz_scores_recorded_at
            ON quiz_scores (recorded_at);
        ",
    ],
}];

async fn applied_versions(pool: &SqlitePool) -> Result<Vec<i64>, sqlx::Error> {
    sqlx::query_scalar("SELECT version FROM schema_migrations ORDER BY version")
        .fetch_all(pool)
        .await
}

pub async fn run_migrations(pool: &SqlitePool) -> Result<(), SqliteInitError> {
    sqlx::query(
        r"
        CREATE TABLE IF NOT EXISTS schema_migrations (
            version INTEGER PRIMARY KEY,
            applied_at TEXT NOT NULL
        );
        ",
    )
    .execute(pool)
    .await?;

    let applied = applied_versions(pool).await?;
    for migration in MIGRATIONS.iter().filter(|m| !applied.contains(&m.version)) {
        let mut tx = pool.begin().await?;
        for statement in migration.statements {
            sqlx::query(statement).execute(&mut *tx).await?;
        }
        sqlx::query(
            "INSERT INTO schema_migrations (version, applied_at) VALUES (?1, ?2) \
             ON CONFLICT(version) DO NOTHING",
        )
        .bind(migration.version)
        .bind(Utc::now())
        .execute(&mut *tx)
        .await?;
        tx.commit().await?;
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn versions_are_strictly_increasing() {
        assert!(MIGRATIONS.windows(2).all(|w| w[0].version < w[1].version));
        assert_eq!(MIGRATIONS.first().map(|m| m.version), Some(1));
    }
}
