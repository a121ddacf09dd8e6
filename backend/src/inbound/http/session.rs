//! Cookie session wrapper.
//!
//! A session records who signed in and through which portal. Role and tenant
//! are not cached here; the actor extractor reloads them on every request.

use actix_session::{Session, SessionGetError};
use actix_web::{FromRequest, HttpRequest, dev::Payload};
use futures_util::future::LocalBoxFuture;
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::domain::{Error, Role, UserId};

pub(crate) const USER_ID_KEY: &str = "user_id";
pub(crate) const PORTAL_KEY: &str = "portal";

/// Login surface a session was opened through.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Portal {
    Staff,
    Patient,
}

impl Portal {
    /// Whether an account with `role` may hold a session on this portal.
    pub fn admits(self, role: Role) -> bool {
        match self {
            Self::Staff => role.is_staff_member(),
            Self::Patient => role == Role::Patient,
        }
    }
}

/// Identity stored in a live session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SignedIn {
    pub user_id: UserId,
    pub portal: Portal,
}

/// Clinic view over the Actix session.
#[derive(Clone)]
pub struct SessionContext(Session);

impl SessionContext {
    pub fn new(session: Session) -> Self {
        Self(session)
    }

    /// Open a session for `user_id` on `portal`.
    ///
    /// The session key is renewed so a cookie issued before login cannot be
    /// replayed afterwards.
    pub fn sign_in(&self, user_id: &UserId, portal: Portal) -> Result<(), Error> {
        self.0.renew();
        self.0
            .insert(USER_ID_KEY, user_id.to_string())
            .and_then(|()| self.0.insert(PORTAL_KEY, portal))
            .map_err(|error| Error::internal(format!("failed to write session: {error}")))
    }

    /// Drop every value and expire the cookie.
    pub fn clear(&self) {
        self.0.purge();
    }

    /// The signed-in identity, if the cookie carries a complete one.
    ///
    /// Unparseable values are logged and treated as signed out.
    pub fn signed_in(&self) -> Result<Option<SignedIn>, Error> {
        let raw_id = self.0.get::<String>(USER_ID_KEY).map_err(read_failed)?;
        let portal = self.0.get::<Portal>(PORTAL_KEY).map_err(read_failed)?;
        let (Some(raw_id), Some(portal)) = (raw_id, portal) else {
            return Ok(None);
        };
        match UserId::new(raw_id) {
            Ok(user_id) => Ok(Some(SignedIn { user_id, portal })),
            Err(error) => {
                warn!(%error, "invalid user id in session cookie");
                Ok(None)
            }
        }
    }

    /// Require a signed-in identity or return `401 Unauthorized`.
    pub fn require_signed_in(&self) -> Result<SignedIn, Error> {
        self.signed_in()?
            .ok_or_else(|| Error::unauthorized("login required"))
    }
}

fn read_failed(error: SessionGetError) -> Error {
    Error::internal(format!("failed to read session: {error}"))
}

impl FromRequest for SessionContext {
    type Error = actix_web::Error;
    type Future = LocalBoxFuture<'static, Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, payload: &mut Payload) -> Self::Future {
        let fut = Session::from_request(req, payload);
        Box::pin(async move { fut.await.map(SessionContext::new) })
    }
}
