use std::sync::OnceLock;

use regex::Regex;

use crate::config::TrackingConfig;

/// Placeholder substituted for identifier-like path segments.
pub const ID_PLACEHOLDER: &str = ":id";

fn id_segment() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(
            r"^(?:\d+|[0-9a-fA-F]{8}-[0-9a-fA-F]{4}-[0-9a-fA-F]{4}-[0-9a-fA-F]{4}-[0-9a-fA-F]{12})$",
        )
        .expect("static regex")
    })
}

/// Collapse numeric and UUID segments, e.g. `/users/42/orders` becomes
/// `/users/:id/orders`.
pub fn normalize_path(path: &str) -> String {
    path.split('/')
        .map(|seg| {
            if id_segment().is_match(seg) {
                ID_PLACEHOLDER
            } else {
                seg
            }
        })
        .collect::<Vec<_>>()
        .join("/")
}

/// Build the endpoint key the collector buckets a request under.
///
/// `path_and_query` is the raw request target (`/a/b?x=1`).
pub fn endpoint_key(method: &str, path_and_query: &str, tracking: &TrackingConfig) -> String {
    let (path, query) = match path_and_query.split_once('?') {
        Some((path, query)) => (path, Some(query)),
        None => (path_and_query, None),
    };
    let path = if path.is_empty() { "/" } else { path };

    let mut key = if tracking.normalize_paths {
        normalize_path(path)
    } else {
        path.to_owned()
    };

    if tracking.include_query_params {
        if let Some(query) = query.filter(|q| !q.is_empty()) {
            key.push('?');
            key.push_str(query);
        }
    }

    if tracking.group_by_method {
        format!("{method} {key}")
    } else {
        key
    }
}
