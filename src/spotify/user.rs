use crate::{
    Res,
    spotify::{SpotifyClient, decode_response},
    types::UserProfile,
};

impl SpotifyClient {
    /// Retrieves the id and display name of the user the token belongs to.
    ///
    /// Called once per login so that every stored rank is keyed on the
    /// provider's stable user id.
    pub async fn current_user(&self, token: &str) -> Res<UserProfile> {
        let response = self.http.get(self.url("me")).bearer_auth(token).send().await?;
        decode_response(response).await
    }
}
