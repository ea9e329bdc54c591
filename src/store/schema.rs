use sqlx::{Pool, Sqlite};

use crate::Res;

const TABLES: [&str; 4] = [
    r#"
    CREATE TABLE IF NOT EXISTS users (
      id        TEXT PRIMARY KEY,
      username  TEXT
    );
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS artists (
      id          TEXT PRIMARY KEY,
      name        TEXT NOT NULL,
      popularity  INTEGER NOT NULL,
      followers   INTEGER NOT NULL
    );
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS genres (
      artist_id  TEXT NOT NULL REFERENCES artists(id),
      genre      TEXT NOT NULL,
      PRIMARY KEY (artist_id, genre)
    );
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS user_artists (
      user_id      TEXT NOT NULL REFERENCES users(id),
      artist_id    TEXT NOT NULL REFERENCES artists(id),
      rank         INTEGER NOT NULL,
      observed_at  INTEGER NOT NULL,
      PRIMARY KEY (user_id, artist_id)
    );
    "#,
];

pub(super) async fn ensure_schema(pool: &Pool<Sqlite>) -> Res<()> {
    for ddl in TABLES {
        sqlx::query(ddl).execute(pool).await?;
    }

    sqlx::query("CREATE INDEX IF NOT EXISTS idx_genres_genre ON genres(genre);")
        .execute(pool)
        .await?;

    sqlx::query(
        "CREATE INDEX IF NOT EXISTS idx_user_artists_observed ON user_artists(observed_at);",
    )
    .execute(pool)
    .await?;

    Ok(())
}
