//! Route labels for spans and metrics.

use uuid::Uuid;

/// Collapses identifiers in `path` so every order, user or PayPal order maps
/// onto one route label.
pub(super) fn route_label(path: &str) -> String {
    if path == "/" {
        return "/".to_owned();
    }

    let segments: Vec<&str> = path.trim_start_matches('/').split('/').collect();
    let mut label = String::new();

    for (index, segment) in segments.iter().enumerate() {
        label.push('/');

        let parent = index.checked_sub(1).and_then(|prev| segments.get(prev));

        if Uuid::parse_str(segment).is_ok() {
            label.push_str("{uuid}");
        } else if parent == Some(&"orders") && segments.first() == Some(&"payments") {
            label.push_str("{paypal_order_id}");
        } else {
            label.push_str(segment);
        }
    }

    label
}
