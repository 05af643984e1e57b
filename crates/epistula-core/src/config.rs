//! Resolution of the backend location and related settings from the
//! environment.

use std::env;

pub const DEFAULT_BACKEND_URL: &str = "http://localhost:8000";
pub const DEFAULT_ROOT_EMAIL: &str = "root@localhost.localdomain";

/// Env vars holding the backend URL, in order of precedence.
pub const BACKEND_URL_ENV: &[&str] = &["NEXT_PUBLIC_BACKEND_URL", "BACKEND_URL"];
/// Env vars holding the root account's email, in order of precedence.
pub const ROOT_EMAIL_ENV: &[&str] = &["NEXT_PUBLIC_ROOT_EMAIL", "EPISTULA_ROOT_EMAIL"];

/// First non-blank value of `keys` according to `lookup`.
pub fn first_set(keys: &[&str], lookup: impl Fn(&str) -> Option<String>) -> Option<String> {
    keys.iter()
        .filter_map(|key| lookup(key))
        .map(|v| v.trim().to_owned())
        .find(|v| !v.is_empty())
}

/// Backend base URL, without a trailing slash.
pub fn resolve_backend_url(lookup: impl Fn(&str) -> Option<String>) -> String {
    let url = first_set(BACKEND_URL_ENV, lookup).unwrap_or_else(|| DEFAULT_BACKEND_URL.to_owned());
    url.trim_end_matches('/').to_owned()
}

pub fn resolve_root_email(lookup: impl Fn(&str) -> Option<String>) -> String {
    first_set(ROOT_EMAIL_ENV, lookup).unwrap_or_else(|| DEFAULT_ROOT_EMAIL.to_owned())
}

/// [`resolve_backend_url`] over the process environment.
pub fn backend_url_from_env() -> String {
    resolve_backend_url(|key| env::var(key).ok())
}

/// [`resolve_root_email`] over the process environment.
pub fn root_email_from_env() -> String {
    resolve_root_email(|key| env::var(key).ok())
}
