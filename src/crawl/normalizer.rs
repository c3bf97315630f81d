//! URL canonicalization and same-domain admission.

use url::Url;

/// Normalize a discovered link against the page it came from.
///
/// Resolves relative references, strips the fragment, and rejects anything
/// that is not http(s) on the same host as `base`. Pure and idempotent:
/// normalizing an already-normalized URL returns it unchanged.
pub fn normalize(candidate: &str, base: &Url) -> Option<Url> {
    let mut resolved = base.join(candidate.trim()).ok()?;

    match resolved.scheme() {
        "http" | "https" => {}
        _ => return None,
    }

    if resolved.host_str()? != base.host_str()?
        || resolved.port_or_known_default() != base.port_or_known_default()
    {
        return None;
    }

    resolved.set_fragment(None);
    Some(resolved)
}
