//! Refresh token cookie

use time::Duration;
use tower_cookies::{cookie::SameSite, Cookie, Cookies};

use crate::config::RefreshCookieConfig;

/// Build the cookie carrying `token` with the configured attributes
pub fn refresh_cookie(config: &RefreshCookieConfig, token: String) -> Cookie<'static> {
    let mut builder = Cookie::build((config.name.clone(), token))
        .path(config.path.clone())
        .secure(config.secure)
        .http_only(config.http_only)
        .same_site(SameSite::Strict)
        .max_age(Duration::seconds(config.max_age_secs));

    if let Some(domain) = &config.domain {
        builder = builder.domain(domain.clone());
    }

    builder.build()
}

/// Refresh token presented with the request, if any
pub fn read_refresh_token(cookies: &Cookies, config: &RefreshCookieConfig) -> Option<String> {
    cookies
        .get(&config.name)
        .map(|c| c.value().to_string())
        .filter(|v| !v.is_empty())
}

/// Instruct the client to drop the refresh cookie
pub fn clear_refresh_cookie(cookies: &Cookies, config: &RefreshCookieConfig) {
    // Removal only matches when path and domain are the same as when set
    let mut builder = Cookie::build((config.name.clone(), "")).path(config.path.clone());
    if let Some(domain) = &config.domain {
        builder = builder.domain(domain.clone());
    }
    cookies.remove(builder.build());
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> RefreshCookieConfig {
        RefreshCookieConfig {
            name: "refresh-token".to_string(),
            path: "/api/v1/auth".to_string(),
            domain: Some("example.com".to_string()),
            secure: true,
            http_only: true,
            max_age_secs: 7200,
        }
    }

    #[test]
    fn cookie_carries_configured_attributes() {
        let cookie = refresh_cookie(&config(), "abc123".to_string());

        assert_eq!(cookie.name(), "refresh-token");
        assert_eq!(cookie.value(), "abc123");
        assert_eq!(cookie.path(), Some("/api/v1/auth"));
        assert_eq!(cookie.domain(), Some("example.com"));
        assert_eq!(cookie.secure(), Some(true));
        assert_eq!(cookie.http_only(), Some(true));
        assert_eq!(cookie.same_site(), Some(SameSite::Strict));
        assert_eq!(cookie.max_age(), Some(Duration::hours(2)));
    }

    #[test]
    fn domain_is_optional() {
        let mut config = config();
        config.domain = None;
        config.secure = false;

        let cookie = refresh_cookie(&config, "abc123".to_string());
        assert_eq!(cookie.domain(), None);
        assert_eq!(cookie.secure(), Some(false));
    }
}
