//! SQLite persistence gateway.
//!
//! [`Store`] owns the schema and is the only component that issues SQL. All
//! writes of a fetch cycle go through [`Store::upsert_cycle`], which runs them
//! in a single transaction, so readers either see every artist, genre and rank
//! row of a cycle or none of them.
//!
//! Schema:
//!
//! ```text
//! users(id PK, username)
//! artists(id PK, name, popularity, followers)
//! genres(artist_id -> artists, genre)              PK (artist_id, genre)
//! user_artists(user_id -> users, artist_id -> artists, rank, observed_at)
//!                                                  PK (user_id, artist_id)
//! ```
//!
//! `observed_at` is stored as unix seconds.

mod schema;

use std::{collections::BTreeMap, str::FromStr, time::Duration};

use chrono::{DateTime, Utc};
use sqlx::{
    Pool, Sqlite, SqliteConnection,
    sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions, SqliteSynchronous},
};

use crate::{
    Res,
    types::{GenreCount, RankedArtist, StoredArtist, UserRank},
};

#[derive(Debug, Clone)]
pub struct Store {
    pool: Pool<Sqlite>,
}

impl Store {
    /// Connects to `database_url`, creating the database file and the schema
    /// when they do not exist yet.
    pub async fn open(database_url: &str) -> Res<Self> {
        let is_memory = database_url.contains(":memory:") || database_url.contains("mode=memory");

        let mut opts = SqliteConnectOptions::from_str(database_url)?
            .create_if_missing(true)
            .foreign_keys(true);

        // WAL is file-only
        if !is_memory {
            opts = opts
                .journal_mode(SqliteJournalMode::Wal)
                .synchronous(SqliteSynchronous::Normal);
        }

        // every connection to an in-memory url is its own database
        let mut pool_opts = SqlitePoolOptions::new().min_connections(1);
        pool_opts = if is_memory {
            pool_opts
                .max_connections(1)
                .idle_timeout(None)
                .max_lifetime(None)
        } else {
            pool_opts.max_connections(8)
        };
        let pool = pool_opts.connect_with(opts).await?;

        schema::ensure_schema(&pool).await?;
        tracing::info!(url = %database_url, "store.open");
        Ok(Self { pool })
    }

    /// Inserts a user or refreshes their display name.
    pub async fn upsert_user(&self, user_id: &str, display_name: &str) -> Res<()> {
        sqlx::query(
            r#"
            INSERT INTO users (id, username) VALUES (?1, ?2)
            ON CONFLICT(id) DO UPDATE SET username = excluded.username;
            "#,
        )
        .bind(user_id)
        .bind(display_name)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    /// Writes one fetch cycle for `user_id` atomically.
    ///
    /// For each artist, in rank order: the artist row is inserted or
    /// overwritten, each genre membership is inserted unless already present,
    /// and the (user, artist) rank row is inserted or replaced with the new
    /// rank and `observed_at`. Any failure rolls the whole cycle back.
    pub async fn upsert_cycle(
        &self,
        user_id: &str,
        artists: &[RankedArtist],
        observed_at: DateTime<Utc>,
    ) -> Res<()> {
        let mut tx = self.pool.begin().await?;

        if let Err(e) = write_cycle(&mut tx, user_id, artists, observed_at.timestamp()).await {
            tracing::warn!(user_id, error = %e, "store.cycle.rollback");
            // the write error is what the caller needs to see
            if let Err(rollback) = tx.rollback().await {
                tracing::error!(user_id, error = %rollback, "store.cycle.rollback.failed");
            }
            return Err(e);
        }

        tx.commit().await?;
        tracing::debug!(user_id, artists = artists.len(), "store.cycle.commit");
        Ok(())
    }

    /// Counts, per genre, the artists with a rank observed within `window`
    /// of now. Ordered by count, highest first, then by genre name.
    pub async fn aggregate_genres_since(&self, window: Duration) -> Res<Vec<GenreCount>> {
        let window_secs = i64::try_from(window.as_secs()).unwrap_or(i64::MAX);
        let cutoff = Utc::now().timestamp().saturating_sub(window_secs);

        let rows: Vec<(String, i64)> = sqlx::query_as(
            r#"
            SELECT g.genre, COUNT(DISTINCT g.artist_id) AS count
              FROM genres g
              JOIN user_artists ua ON ua.artist_id = g.artist_id
             WHERE ua.observed_at >= ?1
             GROUP BY g.genre
             ORDER BY count DESC, g.genre ASC;
            "#,
        )
        .bind(cutoff)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows
            .into_iter()
            .map(|(name, count)| GenreCount { name, count })
            .collect())
    }

    pub async fn list_stored_artists(&self) -> Res<Vec<StoredArtist>> {
        let artists = sqlx::query_as::<_, StoredArtist>(
            "SELECT id, name, popularity, followers FROM artists ORDER BY id;",
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(artists)
    }

    /// Number of stored memberships per genre, across the whole store.
    pub async fn list_stored_genre_counts(&self) -> Res<BTreeMap<String, i64>> {
        let rows: Vec<(String, i64)> =
            sqlx::query_as("SELECT genre, COUNT(*) FROM genres GROUP BY genre;")
                .fetch_all(&self.pool)
                .await?;
        Ok(rows.into_iter().collect())
    }

    /// Stored ranks of one user ordered by rank. Rows left over from older
    /// cycles keep their old rank and sort after fresher rows of equal rank.
    pub async fn list_user_ranks(&self, user_id: &str) -> Res<Vec<UserRank>> {
        let rows: Vec<(String, String, String, u32, i64)> = sqlx::query_as(
            r#"
            SELECT ua.user_id, ua.artist_id, a.name, ua.rank, ua.observed_at
              FROM user_artists ua
              JOIN artists a ON a.id = ua.artist_id
             WHERE ua.user_id = ?1
             ORDER BY ua.rank ASC, ua.observed_at DESC;
            "#,
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows
            .into_iter()
            .map(|(user_id, artist_id, artist_name, rank, observed_at)| UserRank {
                user_id,
                artist_id,
                artist_name,
                rank,
                observed_at: DateTime::from_timestamp(observed_at, 0).unwrap_or_default(),
            })
            .collect())
    }
}

async fn write_cycle(
    conn: &mut SqliteConnection,
    user_id: &str,
    artists: &[RankedArtist],
    observed_at: i64,
) -> Res<()> {
    // ranks reference users; make sure the row exists even before a login stored a name
    sqlx::query("INSERT INTO users (id) VALUES (?1) ON CONFLICT(id) DO NOTHING;")
        .bind(user_id)
        .execute(&mut *conn)
        .await?;

    for ranked in artists {
        let artist = &ranked.artist;

        sqlx::query(
            r#"
            INSERT INTO artists (id, name, popularity, followers) VALUES (?1, ?2, ?3, ?4)
            ON CONFLICT(id) DO UPDATE SET
                name = excluded.name,
                popularity = excluded.popularity,
                followers = excluded.followers;
            "#,
        )
        .bind(&artist.id)
        .bind(&artist.name)
        .bind(artist.popularity)
        .bind(artist.followers.total)
        .execute(&mut *conn)
        .await?;

        for genre in &artist.genres {
            sqlx::query(
                "INSERT INTO genres (artist_id, genre) VALUES (?1, ?2) \
                 ON CONFLICT(artist_id, genre) DO NOTHING;",
            )
            .bind(&artist.id)
            .bind(genre)
            .execute(&mut *conn)
            .await?;
        }

        sqlx::query(
            r#"
            INSERT INTO user_artists (user_id, artist_id, rank, observed_at) VALUES (?1, ?2, ?3, ?4)
            ON CONFLICT(user_id, artist_id) DO UPDATE SET
                rank = excluded.rank,
                observed_at = excluded.observed_at;
            "#,
        )
        .bind(user_id)
        .bind(&artist.id)
        .bind(ranked.rank)
        .bind(observed_at)
        .execute(&mut *conn)
        .await?;
    }

    Ok(())
}
