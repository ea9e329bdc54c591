use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tabled::Tabled;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Token {
    pub access_token: String,
    pub refresh_token: Option<String>,
    pub scope: String,
    pub expires_in: u64,
    pub obtained_at: u64,
}

/// Raw body of the token endpoint for both the `authorization_code` and the
/// `refresh_token` grants. Spotify leaves `refresh_token` out on refresh when
/// it does not rotate it.
#[derive(Debug, Clone, Deserialize)]
pub struct TokenResponse {
    pub access_token: String,
    pub refresh_token: Option<String>,
    #[serde(default)]
    pub scope: String,
    pub expires_in: u64,
}

/// A login that has been started at `/login` and not yet completed.
#[derive(Debug, Clone)]
pub struct PkceLogin {
    pub state: String,
    pub code_verifier: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserProfile {
    pub id: String,
    pub display_name: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Followers {
    #[serde(default)]
    pub total: i64,
}

/// One artist as returned by the top-artists endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArtistRecord {
    pub id: String,
    pub name: String,
    pub popularity: u32,
    #[serde(default)]
    pub followers: Followers,
    #[serde(default)]
    pub genres: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TopArtistsResponse {
    pub items: Vec<ArtistRecord>,
}

/// An artist with its 1-based position in the listing it came from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RankedArtist {
    pub rank: u32,
    #[serde(flatten)]
    pub artist: ArtistRecord,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GenreCount {
    pub name: String,
    pub count: i64,
}

/// Result of one fetch cycle: the artists in rank order and the genre
/// frequency summary over them.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FetchSummary {
    pub artists: Vec<RankedArtist>,
    pub genres: Vec<GenreCount>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
pub struct StoredArtist {
    pub id: String,
    pub name: String,
    pub popularity: u32,
    pub followers: i64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserRank {
    pub user_id: String,
    pub artist_id: String,
    pub artist_name: String,
    pub rank: u32,
    pub observed_at: DateTime<Utc>,
}

#[derive(Tabled)]
pub struct ArtistTableRow {
    pub name: String,
    pub popularity: u32,
    pub followers: i64,
}

#[derive(Tabled)]
pub struct GenreTableRow {
    pub genre: String,
    pub count: i64,
}

#[derive(Tabled)]
pub struct RankTableRow {
    pub rank: u32,
    pub artist: String,
    pub observed: String,
}
