use std::collections::HashMap;

use base64::{Engine, engine::general_purpose::URL_SAFE_NO_PAD};
use rand::{Rng, distr::Alphanumeric};
use sha2::{Digest, Sha256};

use crate::types::{ArtistRecord, GenreCount, RankedArtist};

fn random_alphanumeric(len: usize) -> String {
    rand::rng()
        .sample_iter(&Alphanumeric)
        .take(len)
        .map(char::from)
        .collect()
}

pub fn generate_code_verifier() -> String {
    random_alphanumeric(128)
}

pub fn generate_code_challenge(verifier: &str) -> String {
    let hash = Sha256::digest(verifier.as_bytes());
    URL_SAFE_NO_PAD.encode(hash)
}

/// Opaque value round-tripped through the authorize redirect to tie a
/// callback to the login that started it.
pub fn generate_state() -> String {
    random_alphanumeric(32)
}

/// Assigns dense 1-based ranks in the order the provider returned the artists.
///
/// The input order is the listening order; it is never re-sorted.
pub fn rank_artists(artists: Vec<ArtistRecord>) -> Vec<RankedArtist> {
    artists
        .into_iter()
        .zip(1u32..)
        .map(|(artist, rank)| RankedArtist { rank, artist })
        .collect()
}

/// Counts how many of the given artists carry each genre.
///
/// The result is sorted by count, highest first. Genres with the same count
/// keep the order in which they were first seen while walking the artists in
/// rank order.
pub fn genre_frequency(artists: &[RankedArtist]) -> Vec<GenreCount> {
    let mut summary: Vec<GenreCount> = Vec::new();
    let mut index: HashMap<&str, usize> = HashMap::new();

    for ranked in artists {
        for genre in &ranked.artist.genres {
            match index.get(genre.as_str()) {
                Some(&i) => summary[i].count += 1,
                None => {
                    index.insert(genre.as_str(), summary.len());
                    summary.push(GenreCount {
                        name: genre.clone(),
                        count: 1,
                    });
                }
            }
        }
    }

    // sort_by is stable, so first-seen order survives among equal counts
    summary.sort_by(|a, b| b.count.cmp(&a.count));
    summary
}
