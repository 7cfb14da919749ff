use crate::error::Error;
use log::debug;
use reqwest::header::AUTHORIZATION;
use reqwest::Client;
use std::env;

/// Spotify Web API client using the client-credentials flow.
/// Endpoints may be overridden by SPOTIFY_AUTH_BASE and SPOTIFY_API_BASE env vars (useful for tests).
pub struct SpotifyClient {
    client: Client,
    auth_base: String,
    api_base: String,
}

impl SpotifyClient {
    pub fn new() -> Self {
        Self::with_bases(Self::auth_base(), Self::api_base())
    }

    /// Construct against explicit base addresses. Tests point both at a
    /// local imposter server.
    pub fn with_bases(auth_base: impl Into<String>, api_base: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            auth_base: auth_base.into(),
            api_base: api_base.into(),
        }
    }

    fn auth_base() -> String {
        env::var("SPOTIFY_AUTH_BASE").unwrap_or_else(|_| "https://accounts.spotify.com".into())
    }
    fn api_base() -> String {
        env::var("SPOTIFY_API_BASE").unwrap_or_else(|_| "https://api.spotify.com".into())
    }

    /// Exchange client credentials for a bearer token.
    /// No caching: every call performs the exchange again.
    pub async fn get_access_token(
        &self,
        client_id: &str,
        client_secret: &str,
    ) -> Result<String, Error> {
        let url = format!("{}/api/token", self.auth_base);
        let params = [
            ("grant_type", "client_credentials"),
            ("client_id", client_id),
            ("client_secret", client_secret),
        ];
        let resp = self.client.post(&url).form(&params).send().await?;
        let status = resp.status();
        if status != reqwest::StatusCode::OK {
            let body = resp.text().await.unwrap_or_default();
            return Err(Error::Token { status, body });
        }
        let j: serde_json::Value = resp.json().await?;
        let access_token = j["access_token"]
            .as_str()
            .ok_or(Error::MalformedResponse("access_token"))?
            .to_string();
        debug!("obtained access token");
        Ok(access_token)
    }

    /// Look up the first artist matching `artist_name` and return its id.
    /// An empty result list is a typed not-found error.
    pub async fn get_artist(&self, artist_name: &str, access_token: &str) -> Result<String, Error> {
        let url = format!(
            "{}/v1/search?q={}&type=artist&limit=1",
            self.api_base,
            urlencoding::encode(artist_name)
        );
        let resp = self
            .client
            .get(&url)
            .header(AUTHORIZATION, format!("Bearer {}", access_token))
            .send()
            .await?;
        let status = resp.status();
        if status != reqwest::StatusCode::OK {
            let body = resp.text().await.unwrap_or_default();
            return Err(Error::ArtistSearch { status, body });
        }
        let j: serde_json::Value = resp.json().await?;
        let first = j["artists"]["items"]
            .as_array()
            .and_then(|items| items.first())
            .ok_or_else(|| Error::ArtistNotFound {
                query: artist_name.to_string(),
            })?;
        let id = first["id"]
            .as_str()
            .ok_or(Error::MalformedResponse("artists.items[0].id"))?
            .to_string();
        debug!("resolved artist {:?} to id {}", artist_name, id);
        Ok(id)
    }

    /// List an artist's albums: a single page of up to 50 records,
    /// passed through verbatim.
    pub async fn get_albums(
        &self,
        artist_id: &str,
        access_token: &str,
    ) -> Result<Vec<serde_json::Value>, Error> {
        let url = format!(
            "{}/v1/artists/{}/albums?include_groups=album&market=US&limit=50",
            self.api_base, artist_id
        );
        let resp = self
            .client
            .get(&url)
            .header(AUTHORIZATION, format!("Bearer {}", access_token))
            .send()
            .await?;
        let status = resp.status();
        if status != reqwest::StatusCode::OK {
            let body = resp.text().await.unwrap_or_default();
            return Err(Error::AlbumList { status, body });
        }
        let j: serde_json::Value = resp.json().await?;
        let items = j["items"]
            .as_array()
            .ok_or(Error::MalformedResponse("items"))?
            .clone();
        debug!("fetched {} albums for artist {}", items.len(), artist_id);
        Ok(items)
    }
}

impl Default for SpotifyClient {
    fn default() -> Self {
        Self::new()
    }
}
