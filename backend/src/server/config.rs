//! HTTP server configuration object and helpers.

use actix_web::cookie::{Key, SameSite};
use clinic::domain::LoginSettings;
use clinic::inbound::http::session_config::SessionSettings;
use clinic::outbound::persistence::DbPool;
use std::net::SocketAddr;

/// Builder-style configuration for creating the HTTP server.
pub struct ServerConfig {
    pub(crate) key: Key,
    pub(crate) cookie_secure: bool,
    pub(crate) same_site: SameSite,
    pub(crate) bind_addr: SocketAddr,
    pub(crate) login: LoginSettings,
    pub(crate) db_pool: Option<DbPool>,
}

impl ServerConfig {
    /// Construct a server configuration from the session cookie settings.
    #[must_use]
    pub fn new(session: SessionSettings, bind_addr: SocketAddr) -> Self {
        let SessionSettings {
            key,
            cookie_secure,
            same_site,
        } = session;
        Self {
            key,
            cookie_secure,
            same_site,
            bind_addr,
            login: LoginSettings::default(),
            db_pool: None,
        }
    }

    /// Override the lockout and redirect settings used at login.
    #[must_use]
    pub fn with_login_settings(mut self, login: LoginSettings) -> Self {
        self.login = login;
        self
    }

    /// Attach a database connection pool.
    ///
    /// Without one the server runs on the in-memory store.
    #[must_use]
    pub fn with_db_pool(mut self, pool: DbPool) -> Self {
        self.db_pool = Some(pool);
        self
    }
}
