//! Extractor resolving the signed-in [`Actor`] for a request.
//!
//! The session only carries a user id and portal; role and tenant are
//! reloaded on every request so a deactivated account loses access
//! immediately.

use actix_web::{FromRequest, HttpRequest, dev::Payload, web};
use futures_util::future::LocalBoxFuture;
use tracing::debug;

use crate::domain::{Actor, Error, ErrorCode};
use crate::inbound::http::session::{Portal, SessionContext};
use crate::inbound::http::state::HttpState;

/// Authenticated caller resolved through [`crate::domain::ports::ActorResolver`].
#[derive(Debug, Clone)]
pub struct CurrentActor(pub Actor);

impl CurrentActor {
    pub fn into_inner(self) -> Actor {
        self.0
    }
}

impl std::ops::Deref for CurrentActor {
    type Target = Actor;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl FromRequest for CurrentActor {
    type Error = actix_web::Error;
    type Future = LocalBoxFuture<'static, Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, payload: &mut Payload) -> Self::Future {
        let session = SessionContext::from_request(req, payload);
        let state = req.app_data::<web::Data<HttpState>>().cloned();
        Box::pin(async move {
            let session = session.await?;
            let state = state.ok_or_else(|| Error::internal("HTTP state is not configured"))?;
            let signed_in = session.require_signed_in()?;
            let resolved = state
                .actors
                .resolve(&signed_in.user_id)
                .await
                .and_then(|actor| admitted(actor, signed_in.portal));
            match resolved {
                Ok(actor) => Ok(Self(actor)),
                Err(error) => {
                    if error.code() == ErrorCode::Unauthorized {
                        debug!(user_id = %signed_in.user_id, "clearing stale session");
                        session.clear();
                    }
                    Err(error.into())
                }
            }
        })
    }
}

/// Reject a session whose portal no longer fits the account's role.
fn admitted(actor: Actor, portal: Portal) -> Result<Actor, Error> {
    if portal.admits(actor.role) {
        Ok(actor)
    } else {
        Err(Error::unauthorized("session does not match the account"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Membership, Role, UserId};

    fn patient_actor() -> Actor {
        Actor {
            user_id: UserId::random(),
            role: Role::Patient,
            membership: Membership::Unaffiliated,
        }
    }

    #[test]
    fn patients_cannot_ride_a_staff_session() {
        let err = admitted(patient_actor(), Portal::Staff).expect_err("portal mismatch");
        assert_eq!(err.code(), ErrorCode::Unauthorized);
    }

    #[test]
    fn patients_keep_their_own_portal() {
        let actor = patient_actor();
        assert_eq!(admitted(actor, Portal::Patient), Ok(actor));
    }
}
