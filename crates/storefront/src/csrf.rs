//! CSRF token lookup from the `Cookie` header.

/// Cookie carrying the marketplace's CSRF token.
pub const CSRF_COOKIE: &str = "csrftoken";

/// Header the marketplace expects the token in.
pub const CSRF_HEADER: &str = "X-CSRFToken";

/// Find a cookie's value in a `document.cookie` style string.
///
/// Entries are split on `;` and trimmed; the first entry starting with
/// `name=` wins and its value is percent-decoded. A value that does not
/// decode is returned as-is.
#[must_use]
pub fn cookie_value(cookies: &str, name: &str) -> Option<String> {
    if cookies.is_empty() {
        return None;
    }

    cookies
        .split(';')
        .map(str::trim)
        .find_map(|cookie| cookie.strip_prefix(name)?.strip_prefix('='))
        .map(|raw| {
            urlencoding::decode(raw).map_or_else(|_| raw.to_string(), std::borrow::Cow::into_owned)
        })
}
