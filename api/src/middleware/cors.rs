//! Cross-origin policy wrapped around the whole app.
//!
//! Sits outside the pipeline so preflight requests are answered before
//! authentication runs.

use actix_cors::Cors;
use actix_web::http::Method;
use tg_shared::config::CorsConfig;

/// Build the CORS middleware from configuration
pub fn create_cors(config: &CorsConfig) -> Cors {
    let mut cors = Cors::default()
        .allowed_methods(vec![
            Method::HEAD,
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::PATCH,
            Method::DELETE,
        ])
        .allow_any_header()
        .max_age(config.max_age);

    if config.allows_any_origin() {
        cors = cors.allow_any_origin();
    } else {
        for origin in &config.allowed_origins {
            tracing::info!(origin = %origin, "Allowing CORS origin");
            cors = cors.allowed_origin(origin);
        }
    }

    if config.allow_credentials {
        cors = cors.supports_credentials();
    }
    cors
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::{dev::Service, http::header, test, web, App, HttpResponse};

    fn config(origins: &[&str]) -> CorsConfig {
        CorsConfig {
            enabled: true,
            allowed_origins: origins.iter().map(|o| o.to_string()).collect(),
            ..Default::default()
        }
    }

    #[actix_rt::test]
    async fn test_preflight_allowed_origin() {
        let app = test::init_service(
            App::new()
                .wrap(create_cors(&config(&["https://app.example.com"])))
                .route("/", web::post().to(|| async { HttpResponse::Ok().finish() })),
        )
        .await;

        let req = test::TestRequest::default()
            .method(Method::OPTIONS)
            .uri("/")
            .insert_header((header::ORIGIN, "https://app.example.com"))
            .insert_header((header::ACCESS_CONTROL_REQUEST_METHOD, "POST"))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert!(resp.status().is_success());
        assert_eq!(
            resp.headers().get(header::ACCESS_CONTROL_ALLOW_ORIGIN).unwrap(),
            "https://app.example.com"
        );
        assert_eq!(
            resp.headers().get(header::ACCESS_CONTROL_ALLOW_CREDENTIALS).unwrap(),
            "true"
        );
    }

    #[actix_rt::test]
    async fn test_unknown_origin_gets_no_allow_header() {
        let app = test::init_service(
            App::new()
                .wrap(create_cors(&config(&["https://app.example.com"])))
                .route("/", web::get().to(|| async { HttpResponse::Ok().finish() })),
        )
        .await;

        let req = test::TestRequest::get()
            .uri("/")
            .insert_header((header::ORIGIN, "https://evil.example.com"))
            .to_request();
        let resp = app.call(req).await;
        let allowed = resp
            .ok()
            .and_then(|r| r.headers().get(header::ACCESS_CONTROL_ALLOW_ORIGIN).cloned());
        assert!(allowed.is_none());
    }
}
