use tabled::Table;

use crate::{
    cli::open_store,
    config::{self, Config},
    error, info,
    types::{GenreTableRow, RankTableRow},
    warning,
};

pub async fn list_genres(cfg: &Config, days: Option<u64>) {
    let window = match days {
        Some(0) => error!("--days must be at least 1"),
        Some(d) => match config::days(d) {
            Some(window) => window,
            None => error!("--days {} is too large", d),
        },
        None => cfg.report_window,
    };
    let store = open_store(cfg).await;

    let genres = match store.aggregate_genres_since(window).await {
        Ok(genres) => genres,
        Err(e) => error!("Failed to aggregate genres. Err: {}", e),
    };

    let window_days = window.as_secs() / (24 * 60 * 60);
    if genres.is_empty() {
        warning!("No artists observed in the last {} days.", window_days);
        return;
    }

    info!("Genres of the last {} days:", window_days);
    let table_rows: Vec<GenreTableRow> = genres
        .into_iter()
        .map(|g| GenreTableRow {
            genre: g.name,
            count: g.count,
        })
        .collect();

    println!("{}", Table::new(table_rows));
}

pub async fn list_ranks(cfg: &Config, user_id: &str) {
    let store = open_store(cfg).await;

    let ranks = match store.list_user_ranks(user_id).await {
        Ok(ranks) => ranks,
        Err(e) => error!("Failed to load ranks. Err: {}", e),
    };

    if ranks.is_empty() {
        warning!("No ranks stored for user {}.", user_id);
        return;
    }

    let table_rows: Vec<RankTableRow> = ranks
        .into_iter()
        .map(|r| RankTableRow {
            rank: r.rank,
            artist: r.artist_name,
            observed: r.observed_at.format("%Y-%m-%d %H:%M").to_string(),
        })
        .collect();

    println!("{}", Table::new(table_rows));
}
