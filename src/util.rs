/// Returns `base` with exactly one trailing slash.
pub(crate) fn normalize_base(base: &str) -> String {
    format!("{}/", base.trim_end_matches('/'))
}

pub(crate) fn urljoin(base: &str, path: &str) -> String {
    if path.starts_with("http://") || path.starts_with("https://") {
        return path.to_string();
    }
    format!("{}{}", normalize_base(base), path.trim_start_matches('/'))
}

pub(crate) fn exports_url(base: &str) -> String {
    urljoin(base, "exports/")
}

/// URL of the asset an export is created from, sent as the `source` form field.
pub(crate) fn asset_source_url(base: &str, asset_id: &str) -> String {
    urljoin(base, &format!("assets/{}/", asset_id))
}

pub(crate) fn source_filter(asset_id: &str) -> String {
    format!("source:{}", asset_id)
}
