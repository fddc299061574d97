// Identity realm authentication
//
// OpenID token endpoint flows against the vendor's brand/country realm:
// password login, refresh-token rotation, and best-effort logout.
// The returned `AuthSession` carries the tokens and their expiry; the
// caller decides when to refresh.

use chrono::{DateTime, Duration, Utc};
use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;
use tracing::debug;

use crate::client::CloudClient;
use crate::error::Error;

/// OAuth client id registered for the end-user app.
const CLIENT_ID: &str = "myvaillant";

/// An authenticated vendor session: tokens plus expiry instant.
///
/// Created by [`CloudClient::login`], replaced wholesale by
/// [`CloudClient::refresh`]. Never mutated in place.
#[derive(Debug, Clone)]
pub struct AuthSession {
    access_token: SecretString,
    refresh_token: SecretString,
    /// Instant at which the access token stops being accepted.
    pub expires_at: DateTime<Utc>,
}

impl AuthSession {
    /// True when the access token has expired as of `now`.
    ///
    /// Expiry is inclusive: a token expiring exactly now is expired.
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        self.expires_at <= now
    }

    /// True when the access token has expired as of the current time.
    pub fn is_expired(&self) -> bool {
        self.is_expired_at(Utc::now())
    }

    /// The `Authorization` header value for API requests.
    pub(crate) fn bearer(&self) -> String {
        format!("Bearer {}", self.access_token.expose_secret())
    }
}

/// Token endpoint response shape (OpenID Connect).
#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    refresh_token: String,
    /// Access token lifetime in seconds.
    expires_in: i64,
}

impl TokenResponse {
    fn into_session(self, now: DateTime<Utc>) -> AuthSession {
        AuthSession {
            access_token: SecretString::from(self.access_token),
            refresh_token: SecretString::from(self.refresh_token),
            expires_at: now + Duration::seconds(self.expires_in),
        }
    }
}

impl CloudClient {
    /// Authenticate with username/password against the realm's token
    /// endpoint.
    ///
    /// Fails with [`Error::Authentication`] when the realm rejects the
    /// credentials or the realm itself is unknown (bad brand/country).
    pub async fn login(&self, username: &str, password: &SecretString) -> Result<AuthSession, Error> {
        let url = self.token_url()?;
        debug!(%url, "logging in");

        let form = [
            ("grant_type", "password"),
            ("client_id", CLIENT_ID),
            ("scope", "openid"),
            ("username", username),
            ("password", password.expose_secret()),
        ];

        let resp = self.http().post(url).form(&form).send().await?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(Error::Authentication {
                message: format!("login failed (HTTP {status}): {body}"),
            });
        }

        let token: TokenResponse = Self::decode(resp).await?;
        debug!("login successful");
        Ok(token.into_session(Utc::now()))
    }

    /// Exchange the session's refresh token for a fresh access token.
    ///
    /// Returns a new [`AuthSession`]; the old one is dead either way --
    /// the realm rotates refresh tokens on every exchange.
    pub async fn refresh(&self, session: &AuthSession) -> Result<AuthSession, Error> {
        let url = self.token_url()?;
        debug!(%url, "refreshing token");

        let form = [
            ("grant_type", "refresh_token"),
            ("client_id", CLIENT_ID),
            ("refresh_token", session.refresh_token.expose_secret()),
        ];

        let resp = self.http().post(url).form(&form).send().await?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(Error::RefreshRefused {
                message: format!("HTTP {status}: {body}"),
            });
        }

        let token: TokenResponse = Self::decode(resp).await?;
        debug!("token refreshed");
        Ok(token.into_session(Utc::now()))
    }

    /// End the session at the realm.
    ///
    /// The realm's response status is ignored -- a failed logout leaves
    /// nothing for the caller to do, and the session is discarded
    /// regardless. Transport errors still surface.
    pub async fn logout(&self, session: &AuthSession) -> Result<(), Error> {
        let url = self.logout_url()?;
        debug!(%url, "logging out");

        let form = [
            ("client_id", CLIENT_ID),
            ("refresh_token", session.refresh_token.expose_secret()),
        ];

        let _resp = self.http().post(url).form(&form).send().await?;

        debug!("logout complete");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]

    use super::*;
    use chrono::TimeZone;

    fn session(expires_at: DateTime<Utc>) -> AuthSession {
        AuthSession {
            access_token: SecretString::from("at".to_string()),
            refresh_token: SecretString::from("rt".to_string()),
            expires_at,
        }
    }

    #[test]
    fn expiry_is_inclusive() {
        let now = Utc.with_ymd_and_hms(2025, 6, 1, 12, 0, 0).unwrap();
        assert!(session(now).is_expired_at(now));
        assert!(session(now - Duration::seconds(1)).is_expired_at(now));
        assert!(!session(now + Duration::seconds(1)).is_expired_at(now));
    }

    #[test]
    fn token_response_expiry_math() {
        let now = Utc.with_ymd_and_hms(2025, 6, 1, 12, 0, 0).unwrap();
        let token = TokenResponse {
            access_token: "at".into(),
            refresh_token: "rt".into(),
            expires_in: 600,
        };
        let session = token.into_session(now);
        assert_eq!(session.expires_at, now + Duration::seconds(600));
    }
}
