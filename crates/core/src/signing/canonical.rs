//! Canonical parameter ordering and escaping

/// Percent-encode a value, leaving only `A-Z a-z 0-9 - _ . ~` as-is.
///
/// Spaces always come out as `%20`, never `+`.
pub fn url_escape(value: &str) -> String {
    urlencoding::encode(value).replace('+', "%20")
}

/// Sort pairs by key, case-insensitively, with the exact key as tie-breaker.
pub fn sort_params(params: &[(String, String)]) -> Vec<&(String, String)> {
    let mut sorted: Vec<&(String, String)> = params.iter().collect();
    sorted.sort_by(|(a, _), (b, _)| a.to_lowercase().cmp(&b.to_lowercase()).then_with(|| a.cmp(b)));
    sorted
}

/// The string that is actually signed: lowercased keys and lowercased
/// escaped values.
pub fn hash_input(params: &[(String, String)]) -> String {
    sort_params(params)
        .into_iter()
        .map(|(key, value)| format!("{}={}", key.to_lowercase(), url_escape(value).to_lowercase()))
        .collect::<Vec<_>>()
        .join("&")
}

/// The string that is sent: same order, original case.
pub fn wire_query(params: &[(String, String)]) -> String {
    sort_params(params)
        .into_iter()
        .map(|(key, value)| format!("{key}={}", url_escape(value)))
        .collect::<Vec<_>>()
        .join("&")
}
