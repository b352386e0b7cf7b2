use actix_web::HttpRequest;

/// Extract the client's address from proxy headers.
///
/// `CF-Connecting-IP` wins, then the first entry of `X-Forwarded-For`;
/// anything else is bucketed as `"unknown"`.
pub fn get_client_ip(req: &HttpRequest) -> String {
    let headers = req.headers();

    if let Some(ip) = headers
        .get("cf-connecting-ip")
        .and_then(|v| v.to_str().ok())
        .map(str::trim)
        .filter(|s| !s.is_empty())
    {
        return ip.to_string();
    }

    headers
        .get("x-forwarded-for")
        .and_then(|v| v.to_str().ok())
        .and_then(|s| s.split(',').next())
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .unwrap_or_else(|| "unknown".to_string())
}
