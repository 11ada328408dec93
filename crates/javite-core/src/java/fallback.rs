//! Fallback page for the root document.
//!
//! The backend renders pages; the dev server only serves assets. Requests for
//! the root document get a 404 with a page pointing at the application.

use crate::host::MiddlewareResponse;

/// Path of the root document after the host's HTML fallback.
pub const ROOT_DOCUMENT_PATH: &str = "/index.html";

const TEMPLATE: &str = include_str!("../../assets/dev-server-index.html");
const APP_URL_TOKEN: &str = "{{ APP_URL }}";

/// Render the fallback page for `app_url`.
#[must_use]
pub fn render_fallback_page(app_url: &str) -> String {
    TEMPLATE.replace(APP_URL_TOKEN, app_url)
}

/// Answer requests for the root document; pass everything else through.
#[must_use]
pub fn fallback_response(path: &str, app_url: &str) -> Option<MiddlewareResponse> {
    if path != ROOT_DOCUMENT_PATH {
        return None;
    }
    Some(MiddlewareResponse {
        status: 404,
        content_type: "text/html; charset=utf-8".to_string(),
        body: render_fallback_page(app_url),
    })
}
