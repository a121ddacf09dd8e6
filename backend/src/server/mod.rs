//! Server construction and middleware wiring.

mod config;
mod state_builders;

pub use config::ServerConfig;

use state_builders::build_http_state;

use actix_session::{
    SessionMiddleware,
    config::{CookieContentSecurity, PersistentSession},
    storage::CookieSessionStore,
};
use actix_web::cookie::{Key, SameSite};
use actix_web::dev::{Server, ServiceFactory, ServiceRequest, ServiceResponse};
use actix_web::{App, HttpServer, web};

use clinic::Trace;
#[cfg(debug_assertions)]
use clinic::doc::ApiDoc;
use clinic::inbound::http::configure_api;
use clinic::inbound::http::health::{HealthState, live, ready};
use clinic::inbound::http::state::HttpState;
#[cfg(debug_assertions)]
use utoipa::OpenApi;
#[cfg(debug_assertions)]
use utoipa_swagger_ui::SwaggerUi;

const SESSION_TTL_HOURS: i64 = 2;

#[derive(Clone)]
struct AppDependencies {
    health_state: web::Data<HealthState>,
    http_state: web::Data<HttpState>,
    key: Key,
    cookie_secure: bool,
    same_site: SameSite,
}

fn build_app(
    deps: AppDependencies,
) -> App<
    impl ServiceFactory<
        ServiceRequest,
        Config = (),
        Response = ServiceResponse,
        Error = actix_web::Error,
        InitError = (),
    >,
> {
    let AppDependencies {
        health_state,
        http_state,
        key,
        cookie_secure,
        same_site,
    } = deps;

    let session = SessionMiddleware::builder(CookieSessionStore::default(), key)
        .cookie_name("session".into())
        .cookie_path("/".into())
        .cookie_secure(cookie_secure)
        .cookie_http_only(true)
        .cookie_content_security(CookieContentSecurity::Private)
        .cookie_same_site(same_site)
        .session_lifecycle(PersistentSession::default().session_ttl(
            actix_web::cookie::time::Duration::hours(SESSION_TTL_HOURS),
        ))
        .build();

    let api = web::scope("/api/v1").wrap(session).configure(configure_api);

    let app = App::new()
        .app_data(health_state)
        .app_data(http_state)
        .wrap(Trace)
        .service(api)
        .service(ready)
        .service(live);

    #[cfg(debug_assertions)]
    let app = app.service(SwaggerUi::new("/docs").url("/api-docs/openapi.json", ApiDoc::openapi()));

    app
}

/// Construct an Actix HTTP server using the provided health state and configuration.
///
/// # Errors
/// Propagates [`std::io::Error`] when binding the socket fails.
pub fn create_server(
    health_state: web::Data<HealthState>,
    config: ServerConfig,
) -> std::io::Result<Server> {
    let server_health_state = health_state.clone();
    let http_state = build_http_state(&config);
    let ServerConfig {
        key,
        cookie_secure,
        same_site,
        bind_addr,
        ..
    } = config;

    let server = HttpServer::new(move || {
        build_app(AppDependencies {
            health_state: server_health_state.clone(),
            http_state: http_state.clone(),
            key: key.clone(),
            cookie_secure,
            same_site,
        })
    })
    .bind(bind_addr)?
    .run();

    health_state.mark_ready();
    Ok(server)
}

#[cfg(test)]
mod tests {
    //! Bootstrap checks: readiness signalling and route wiring.

    use super::*;
    use actix_web::test as actix_test;
    use clinic::inbound::http::session_config::SessionSettings;
    use rstest::{fixture, rstest};
    use serde_json::Value;

    #[fixture]
    fn health_state() -> web::Data<HealthState> {
        web::Data::new(HealthState::new())
    }

    #[fixture]
    fn config() -> ServerConfig {
        ServerConfig::new(
            SessionSettings {
                key: Key::generate(),
                cookie_secure: false,
                same_site: SameSite::Lax,
            },
            "127.0.0.1:0".parse().expect("loopback address"),
        )
    }

    #[rstest]
    #[actix_rt::test]
    async fn create_server_marks_ready(health_state: web::Data<HealthState>, config: ServerConfig) {
        assert!(!health_state.is_ready());

        let server = create_server(health_state.clone(), config).expect("server should bind");

        assert!(health_state.is_ready());
        server.handle().stop(false).await;
    }

    #[rstest]
    #[actix_rt::test]
    async fn api_routes_sit_behind_the_session(
        health_state: web::Data<HealthState>,
        config: ServerConfig,
    ) {
        let http_state = build_http_state(&config);
        let app = actix_test::init_service(build_app(AppDependencies {
            health_state,
            http_state,
            key: config.key.clone(),
            cookie_secure: config.cookie_secure,
            same_site: config.same_site,
        }))
        .await;

        let response = actix_test::call_service(
            &app,
            actix_test::TestRequest::get().uri("/api/v1/dashboard").to_request(),
        )
        .await;
        assert_eq!(response.status(), actix_web::http::StatusCode::UNAUTHORIZED);
        assert!(response.headers().contains_key("trace-id"));
        let body: Value = actix_test::read_body_json(response).await;
        assert_eq!(body["code"], "unauthorized");

        let response = actix_test::call_service(
            &app,
            actix_test::TestRequest::get().uri("/health/live").to_request(),
        )
        .await;
        assert!(response.status().is_success());
    }
}
