use async_trait::async_trait;

use crate::{
    Res,
    spotify::{SpotifyClient, TopArtistsProvider, decode_response},
    types::{ArtistRecord, TopArtistsResponse},
};

impl SpotifyClient {
    /// Retrieves the current user's top artists from the Spotify Web API.
    ///
    /// Issues a single `GET /me/top/artists` with the configured `limit` and
    /// `time_range`. The order of `items` in the response is the listening
    /// order, most played first, and is returned untouched.
    ///
    /// # Arguments
    ///
    /// * `token` - Valid access token with the `user-top-read` scope
    ///
    /// # Errors
    ///
    /// - [`crate::Error::Auth`] for 401/403, usually an expired or revoked token
    /// - [`crate::Error::Network`] for other statuses, timeouts and connection failures
    /// - [`crate::Error::Parse`] when the body is not a top-artists document
    ///
    /// # Example
    ///
    /// ```
    /// let artists = client.get_top_artists("BQC...").await?;
    /// println!("Most listened: {}", artists[0].name);
    /// ```
    pub async fn get_top_artists(&self, token: &str) -> Res<Vec<ArtistRecord>> {
        let response = self
            .http
            .get(self.url("me/top/artists"))
            .bearer_auth(token)
            .query(&[
                ("limit", self.limit.to_string()),
                ("time_range", self.time_range.clone()),
            ])
            .send()
            .await?;

        let page: TopArtistsResponse = decode_response(response).await?;
        tracing::debug!(count = page.items.len(), "spotify.top_artists");
        Ok(page.items)
    }
}

#[async_trait]
impl TopArtistsProvider for SpotifyClient {
    async fn fetch_top_artists(&self, access_token: &str) -> Res<Vec<ArtistRecord>> {
        self.get_top_artists(access_token).await
    }
}
