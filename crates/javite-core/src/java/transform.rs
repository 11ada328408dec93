//! Dev-mode rewriting of served modules.

use super::compose::ORIGIN_PLACEHOLDER;
use super::options::TransformOnServe;
use super::url::DevServerUrl;

/// Replace every origin placeholder in `code` with `url`, then hand the
/// result to the user's hook.
#[must_use]
pub fn serve_transform(code: &str, url: &DevServerUrl, hook: &TransformOnServe) -> String {
    let code = code.replace(ORIGIN_PLACEHOLDER, url.as_str());
    hook(&code, url)
}
