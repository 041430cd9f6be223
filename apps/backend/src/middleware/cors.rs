use actix_cors::Cors;
use actix_web::http::header;

const DEV_ORIGINS: [&str; 2] = ["http://localhost:3000", "http://127.0.0.1:3000"];

/// Keep only http(s) origins; drop blanks and the literal `null`.
pub fn parse_origins(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty() && *s != "null")
        .filter(|s| s.starts_with("http://") || s.starts_with("https://"))
        .map(str::to_string)
        .collect()
}

/// CORS for the browser client. Falls back to the local dev origins when
/// nothing usable is configured.
pub fn cors_middleware(allowed_origins: &[String]) -> Cors {
    let mut cors = Cors::default()
        .allowed_methods(vec!["GET", "POST", "OPTIONS"])
        .allowed_headers(vec![header::CONTENT_TYPE, header::ACCEPT])
        .expose_headers(vec![
            header::HeaderName::from_static("x-trace-id"),
            header::HeaderName::from_static("x-request-id"),
        ])
        .max_age(3600);

    if allowed_origins.is_empty() {
        for origin in DEV_ORIGINS {
            cors = cors.allowed_origin(origin);
        }
    } else {
        for origin in allowed_origins {
            cors = cors.allowed_origin(origin);
        }
    }

    cors
}
