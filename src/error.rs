use anyhow::anyhow;
use reqwest::StatusCode;

/// Error body returned by the Kobo API, usually `{"detail": "..."}`.
#[derive(Debug, serde::Deserialize)]
pub(crate) struct KoboErrorResponse {
    #[serde(default)]
    pub(crate) detail: Option<String>,
    // Validation failures come back keyed by field name instead.
    #[serde(flatten)]
    pub(crate) fields: serde_json::Map<String, serde_json::Value>,
}

impl KoboErrorResponse {
    fn message(&self) -> String {
        if let Some(detail) = self.detail.as_deref() {
            return detail.to_string();
        }
        self.fields
            .iter()
            .map(|(k, v)| match v {
                serde_json::Value::Array(items) => format!(
                    "{}: {}",
                    k,
                    items
                        .iter()
                        .map(|i| i.as_str().map(str::to_string).unwrap_or_else(|| i.to_string()))
                        .collect::<Vec<_>>()
                        .join("; ")
                ),
                serde_json::Value::String(s) => format!("{}: {}", k, s),
                other => format!("{}: {}", k, other),
            })
            .collect::<Vec<_>>()
            .join("\n")
    }
}

pub(crate) fn format_api_error(status: StatusCode, url: &str, body: &str) -> anyhow::Error {
    let message = serde_json::from_str::<KoboErrorResponse>(body)
        .map(|e| e.message())
        .unwrap_or_else(|_| body.trim().to_string());

    if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN {
        return anyhow!(
            "Kobo authentication/authorization failed (HTTP {}).\n- Check KOBO_USER and KOBO_PASSW\n- Ensure the account can access the asset set in KOBO_ASSET\n\nServer message: {}\nrequest: {}",
            status.as_u16(),
            message,
            url
        );
    }

    if status == StatusCode::NOT_FOUND {
        return anyhow!(
            "Kobo API endpoint not found (HTTP 404).\n- Check that KOBO_URL points at the API root and ends with '/'\n- Check that KOBO_ASSET is a valid asset uid\n\nServer message: {}\nrequest: {}",
            message,
            url
        );
    }

    anyhow!(
        "API request failed: HTTP {} for url ({})\n{}",
        status.as_u16(),
        url,
        message
    )
}
