//! Doctor-only writes to a visit's clinical notes.

use actix_web::{HttpResponse, delete, post, put, web};
use serde::Deserialize;

use crate::domain::{AppointmentId, NoteId, NoteKind};
use crate::inbound::http::ApiResult;
use crate::inbound::http::actor::CurrentActor;
use crate::inbound::http::dto::NoteResponse;
use crate::inbound::http::schemas::ErrorSchema;
use crate::inbound::http::state::HttpState;
use crate::inbound::http::validation::{FieldName, missing_field_error, parse_uuid};

const NOTE_ID: FieldName = FieldName::new("noteId");

#[derive(Debug, Deserialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct NewNoteBody {
    #[schema(example = "diagnosis")]
    pub kind: Option<String>,
    #[serde(default)]
    pub text: String,
}

#[derive(Debug, Deserialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct NoteTextBody {
    #[serde(default)]
    pub text: String,
}

/// Record a diagnosis, prescription, or requirement.
#[utoipa::path(
    post,
    path = "/api/v1/appointments/{appointment_id}/notes",
    params(("appointment_id" = String, Path, description = "Appointment id")),
    request_body = NewNoteBody,
    responses(
        (status = 201, description = "Note recorded", body = NoteResponse),
        (status = 400, description = "Invalid request", body = ErrorSchema),
        (status = 403, description = "Doctors only", body = ErrorSchema),
        (status = 404, description = "Appointment not found", body = ErrorSchema)
    ),
    tags = ["notes"],
    operation_id = "createNote"
)]
#[post("/appointments/{appointment_id}/notes")]
pub async fn create_note(
    state: web::Data<HttpState>,
    actor: CurrentActor,
    path: web::Path<String>,
    payload: web::Json<NewNoteBody>,
) -> ApiResult<HttpResponse> {
    let appointment_id = AppointmentId::from_uuid(parse_uuid(
        &path.into_inner(),
        FieldName::new("appointmentId"),
    )?);
    let body = payload.into_inner();
    let kind: NoteKind = body
        .kind
        .ok_or_else(|| missing_field_error(FieldName::new("kind")))?
        .parse()?;
    let note = state
        .notes
        .create(&actor, &appointment_id, kind, &body.text)
        .await?;
    Ok(HttpResponse::Created().json(NoteResponse::from(&note)))
}

/// Replace a note's text; its kind is fixed.
#[utoipa::path(
    put,
    path = "/api/v1/notes/{note_id}",
    params(("note_id" = String, Path, description = "Note id")),
    request_body = NoteTextBody,
    responses(
        (status = 200, description = "Note updated", body = NoteResponse),
        (status = 400, description = "Invalid request", body = ErrorSchema),
        (status = 403, description = "Doctors only", body = ErrorSchema),
        (status = 404, description = "Note not found", body = ErrorSchema)
    ),
    tags = ["notes"],
    operation_id = "updateNote"
)]
#[put("/notes/{note_id}")]
pub async fn update_note(
    state: web::Data<HttpState>,
    actor: CurrentActor,
    path: web::Path<String>,
    payload: web::Json<NoteTextBody>,
) -> ApiResult<web::Json<NoteResponse>> {
    let id = NoteId::from_uuid(parse_uuid(&path.into_inner(), NOTE_ID)?);
    let note = state.notes.update(&actor, &id, &payload.text).await?;
    Ok(web::Json(NoteResponse::from(&note)))
}

#[utoipa::path(
    delete,
    path = "/api/v1/notes/{note_id}",
    params(("note_id" = String, Path, description = "Note id")),
    responses(
        (status = 204, description = "Note deleted"),
        (status = 403, description = "Doctors only", body = ErrorSchema),
        (status = 404, description = "Note not found", body = ErrorSchema)
    ),
    tags = ["notes"],
    operation_id = "deleteNote"
)]
#[delete("/notes/{note_id}")]
pub async fn delete_note(
    state: web::Data<HttpState>,
    actor: CurrentActor,
    path: web::Path<String>,
) -> ApiResult<HttpResponse> {
    let id = NoteId::from_uuid(parse_uuid(&path.into_inner(), NOTE_ID)?);
    state.notes.delete(&actor, &id).await?;
    Ok(HttpResponse::NoContent().finish())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ports::AppointmentRepository;
    use crate::domain::{Appointment, NewAppointment};
    use crate::inbound::http::test_utils::{
        TestClinic, json_body, session_cookie, staff_login_request, test_app, test_clinic,
    };
    use crate::test_support::FIXTURE_RATES;
    use actix_web::http::StatusCode;
    use actix_web::test as actix_test;
    use mockable::Clock;
    use serde_json::json;

    async fn visit(world: &TestClinic) -> AppointmentId {
        let today = world.clock.today();
        let appointment = Appointment::schedule(
            NewAppointment {
                id: AppointmentId::random(),
                patient_id: world.clinic.patient.id,
                tenant_id: world.clinic.tenant.id,
                date: today,
                is_prior: false,
            },
            FIXTURE_RATES,
            today,
            world.clock.utc(),
        )
        .expect("valid appointment");
        AppointmentRepository::insert(world.store.as_ref(), &appointment)
            .await
            .expect("insert appointment");
        appointment.id()
    }

    #[actix_web::test]
    async fn doctors_manage_notes_end_to_end() {
        let world = test_clinic().await;
        let appointment_id = visit(&world).await;
        let app = actix_test::init_service(test_app(world.state.clone())).await;
        let login =
            actix_test::call_service(&app, staff_login_request("dr_mona").to_request()).await;
        let cookie = session_cookie(&login);

        let res = actix_test::call_service(
            &app,
            actix_test::TestRequest::post()
                .uri(&format!("/api/v1/appointments/{appointment_id}/notes"))
                .cookie(cookie.clone())
                .set_json(json!({ "kind": "prescription", "text": "paracetamol" }))
                .to_request(),
        )
        .await;
        assert_eq!(res.status(), StatusCode::CREATED);
        let note_id = json_body(res).await["id"]
            .as_str()
            .expect("id")
            .to_owned();

        let res = actix_test::call_service(
            &app,
            actix_test::TestRequest::put()
                .uri(&format!("/api/v1/notes/{note_id}"))
                .cookie(cookie.clone())
                .set_json(json!({ "text": "ibuprofen" }))
                .to_request(),
        )
        .await;
        assert_eq!(res.status(), StatusCode::OK);
        assert_eq!(json_body(res).await["text"], "ibuprofen");

        let res = actix_test::call_service(
            &app,
            actix_test::TestRequest::delete()
                .uri(&format!("/api/v1/notes/{note_id}"))
                .cookie(cookie)
                .to_request(),
        )
        .await;
        assert_eq!(res.status(), StatusCode::NO_CONTENT);
    }

    #[actix_web::test]
    async fn reception_cannot_write_notes() {
        let world = test_clinic().await;
        let appointment_id = visit(&world).await;
        let app = actix_test::init_service(test_app(world.state.clone())).await;
        let login =
            actix_test::call_service(&app, staff_login_request("desk_mona").to_request()).await;

        let res = actix_test::call_service(
            &app,
            actix_test::TestRequest::post()
                .uri(&format!("/api/v1/appointments/{appointment_id}/notes"))
                .cookie(session_cookie(&login))
                .set_json(json!({ "kind": "diagnosis", "text": "flu" }))
                .to_request(),
        )
        .await;
        assert_eq!(res.status(), StatusCode::FORBIDDEN);
    }

    #[actix_web::test]
    async fn unknown_kinds_are_rejected() {
        let world = test_clinic().await;
        let appointment_id = visit(&world).await;
        let app = actix_test::init_service(test_app(world.state.clone())).await;
        let login =
            actix_test::call_service(&app, staff_login_request("dr_mona").to_request()).await;

        let res = actix_test::call_service(
            &app,
            actix_test::TestRequest::post()
                .uri(&format!("/api/v1/appointments/{appointment_id}/notes"))
                .cookie(session_cookie(&login))
                .set_json(json!({ "kind": "horoscope", "text": "stars" }))
                .to_request(),
        )
        .await;
        assert_eq!(res.status(), StatusCode::BAD_REQUEST);
        assert_eq!(json_body(res).await["details"]["code"], "unknown_note_kind");
    }
}
