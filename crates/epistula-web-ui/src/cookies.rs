use epistula_core::SessionStorage;
use tower_cookies::cookie::SameSite;
use tower_cookies::{Cookie, Cookies};
use tracing::debug;

use crate::LOG_TARGET;

/// How long the browser keeps the session cookies.
const SESSION_COOKIE_MAX_AGE: time::Duration = time::Duration::days(30);

/// Session storage living in the browser's cookie jar.
///
/// Values are percent-encoded, so json blobs survive cookie syntax.
#[derive(Clone)]
pub(crate) struct CookieStorage {
    cookies: Cookies,
}

impl CookieStorage {
    pub(crate) fn new(cookies: Cookies) -> Self {
        Self { cookies }
    }
}

impl SessionStorage for CookieStorage {
    fn get_item(&self, key: &str) -> Option<String> {
        let cookie = self.cookies.get(key)?;
        urlencoding::decode(cookie.value())
            .inspect_err(|err| {
                debug!(target: LOG_TARGET, %key, %err, "Invalid cookie value");
            })
            .ok()
            .map(|v| v.into_owned())
    }

    fn set_item(&mut self, key: &str, value: &str) {
        let mut cookie = Cookie::new(key.to_owned(), urlencoding::encode(value).into_owned());
        cookie.set_path("/");
        cookie.set_http_only(true);
        cookie.set_same_site(SameSite::Lax);
        cookie.set_max_age(SESSION_COOKIE_MAX_AGE);
        self.cookies.add(cookie);
    }

    fn remove_item(&mut self, key: &str) {
        let mut cookie = Cookie::new(key.to_owned(), "");
        cookie.set_path("/");
        self.cookies.remove(cookie);
    }
}
