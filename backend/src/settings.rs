//! Service configuration loaded via OrthoConfig.
//!
//! Values layer CLI flags over `CLINIC_*` environment variables over an
//! optional configuration file. The tenant port carries its default on the
//! field; the remaining fields are optional and their accessors supply the
//! defaults.

use std::net::{Ipv4Addr, SocketAddr};

use chrono::Duration;
use ortho_config::OrthoConfig;
use serde::Deserialize;

use crate::domain::{DEFAULT_LOCKOUT_MINUTES, DEFAULT_MAX_ATTEMPTS, LockoutPolicy, LoginSettings};

const DEFAULT_BIND_PORT: u16 = 8080;

/// Runtime settings for the clinic server.
#[derive(Debug, Clone, Deserialize, OrthoConfig)]
#[ortho_config(prefix = "CLINIC")]
pub struct ClinicSettings {
    /// Socket address the HTTP server binds to.
    pub bind_addr: Option<SocketAddr>,
    /// PostgreSQL connection string. Without one the server keeps its data
    /// in memory.
    pub database_url: Option<String>,
    /// Port appended to staff login redirects.
    #[ortho_config(default = 8000)]
    pub tenant_port: u16,
    /// Consecutive failures before an account locks.
    pub lockout_attempts: Option<u32>,
    /// Minutes an account stays locked.
    pub lockout_minutes: Option<u32>,
    /// Upper bound on pooled database connections.
    pub db_pool_size: Option<u32>,
}

impl ClinicSettings {
    pub fn bind_addr(&self) -> SocketAddr {
        self.bind_addr
            .unwrap_or_else(|| SocketAddr::from((Ipv4Addr::UNSPECIFIED, DEFAULT_BIND_PORT)))
    }

    /// The configured database URL, ignoring blank values.
    pub fn database_url(&self) -> Option<&str> {
        self.database_url
            .as_deref()
            .map(str::trim)
            .filter(|url| !url.is_empty())
    }

    /// Lockout and redirect settings for the authentication service.
    pub fn login_settings(&self) -> LoginSettings {
        let minutes = self
            .lockout_minutes
            .map_or(DEFAULT_LOCKOUT_MINUTES, i64::from);
        LoginSettings {
            lockout: LockoutPolicy::new(
                self.lockout_attempts.unwrap_or(DEFAULT_MAX_ATTEMPTS),
                Duration::minutes(minutes),
            ),
            tenant_port: self.tenant_port,
        }
    }
}
