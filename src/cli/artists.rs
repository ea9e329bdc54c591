use tabled::Table;

use crate::{cli::open_store, config::Config, error, types::ArtistTableRow, warning};

pub async fn list_artists(cfg: &Config, search: Option<String>) {
    let store = open_store(cfg).await;

    let mut artists = match store.list_stored_artists().await {
        Ok(artists) => artists,
        Err(e) => error!("Failed to load artists. Err: {}", e),
    };

    // sort artists by name
    artists.sort_by(|a, b| a.name.to_lowercase().cmp(&b.name.to_lowercase()));

    if let Some(artist_search) = search {
        let search_term = artist_search.to_lowercase();
        artists.retain(|a| a.name.to_lowercase().contains(&search_term));
    }

    if artists.is_empty() {
        warning!("No artists stored yet. Run `tunetrail serve` and log in first.");
        return;
    }

    let table_rows: Vec<ArtistTableRow> = artists
        .into_iter()
        .map(|a| ArtistTableRow {
            name: a.name,
            popularity: a.popularity,
            followers: a.followers,
        })
        .collect();

    println!("{}", Table::new(table_rows));
}
