use axum::{
    extract::State,
    middleware,
    routing::{delete, get, post, put},
    Extension, Json, Router,
};
use tracing::{info, instrument, warn};
use uuid::Uuid;

use crate::appointments::dto::{
    Ack, AppointmentResponse, AppointmentsResponse, PostAppointmentRequest,
    UpdateAppointmentRequest,
};
use crate::auth::guard::{require_admin, require_patient, CurrentUser};
use crate::error::{AppJson, AppPath, HttpError};
use crate::state::AppState;

pub fn patient_routes(state: AppState) -> Router<AppState> {
    Router::new()
        .route("/post", post(post_appointment))
        .route_layer(middleware::from_fn_with_state(state, require_patient))
}

pub fn admin_routes(state: AppState) -> Router<AppState> {
    Router::new()
        .route("/getall", get(get_all_appointments))
        .route("/update/:id", put(update_appointment_status))
        .route("/delete/:id", delete(delete_appointment))
        .route_layer(middleware::from_fn_with_state(state, require_admin))
}

/// The doctor is resolved from the submitted name and department. The form
/// has no doctor id field, so an ambiguous name is a hard stop.
#[instrument(skip_all)]
pub async fn post_appointment(
    State(state): State<AppState>,
    Extension(CurrentUser(patient)): Extension<CurrentUser>,
    AppJson(payload): AppJson<PostAppointmentRequest>,
) -> Result<Json<AppointmentResponse>, HttpError> {
    payload.validate()?;

    let doctors = state
        .users
        .find_doctors_by_name(
            &payload.doctor_first_name,
            &payload.doctor_last_name,
            &payload.department,
        )
        .await?;
    let doctor_id = match doctors.as_slice() {
        [] => return Err(HttpError::NotFound("Doctor Not Found!".into())),
        [doctor] => doctor.id,
        _ => {
            warn!(count = doctors.len(), "ambiguous doctor reference");
            return Err(HttpError::Conflict(
                "Doctors Conflict! Please Contact Through Email Or Phone!".into(),
            ));
        }
    };

    let appointment = state
        .appointments
        .insert(payload.into_new_appointment(doctor_id, patient.id))
        .await?;

    info!(appointment_id = %appointment.id, patient_id = %patient.id, "appointment submitted");
    Ok(Json(AppointmentResponse {
        success: true,
        appointment,
        message: "Appointment Sent Successfully!".to_string(),
    }))
}

#[instrument(skip(state))]
pub async fn get_all_appointments(
    State(state): State<AppState>,
) -> Result<Json<AppointmentsResponse>, HttpError> {
    let appointments = state.appointments.list_all().await?;
    Ok(Json(AppointmentsResponse {
        success: true,
        appointments,
    }))
}

#[instrument(skip(state, payload))]
pub async fn update_appointment_status(
    State(state): State<AppState>,
    AppPath(id): AppPath<Uuid>,
    AppJson(payload): AppJson<UpdateAppointmentRequest>,
) -> Result<Json<AppointmentResponse>, HttpError> {
    let appointment = state
        .appointments
        .update_status(id, payload.status)
        .await?
        .ok_or_else(|| HttpError::NotFound("Appointment Not Found!".into()))?;

    info!(appointment_id = %id, status = ?payload.status, "appointment status updated");
    Ok(Json(AppointmentResponse {
        success: true,
        appointment,
        message: "Appointment Status Updated!".to_string(),
    }))
}

#[instrument(skip(state))]
pub async fn delete_appointment(
    State(state): State<AppState>,
    AppPath(id): AppPath<Uuid>,
) -> Result<Json<Ack>, HttpError> {
    if !state.appointments.delete(id).await? {
        return Err(HttpError::NotFound("Appointment Not Found!".into()));
    }

    info!(appointment_id = %id, "appointment deleted");
    Ok(Json(Ack {
        success: true,
        message: "Appointment Deleted!".to_string(),
    }))
}

#[cfg(test)]
mod handlers_tests {
    use super::*;
    use crate::auth::jwt::TokenIssuer;
    use crate::users::repo_types::{NewUser, Role};
    use axum::body::{to_bytes, Body};
    use axum::extract::FromRef;
    use axum::http::{header, Request, StatusCode};
    use serde_json::{json, Value};
    use tower::util::ServiceExt;

    async fn request(
        app: &Router,
        method: &str,
        path: &str,
        cookie: Option<&str>,
        body: Option<Value>,
    ) -> axum::response::Response {
        let mut builder = Request::builder().method(method).uri(path);
        if let Some(cookie) = cookie {
            builder = builder.header(header::COOKIE, cookie);
        }
        let request = match body {
            Some(json) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(json.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };
        app.clone().oneshot(request).await.unwrap()
    }

    async fn json_body(response: axum::response::Response) -> Value {
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    async fn seed_user(state: &AppState, role: Role, department: Option<&str>) -> (Uuid, String) {
        let cookie_name = match role {
            Role::Admin => "adminToken",
            _ => "patientToken",
        };
        let user = state
            .users
            .insert(NewUser {
                first_name: "Rey".into(),
                last_name: "Field".into(),
                email: format!("{}-{}@clinic.test", cookie_name, Uuid::new_v4()),
                phone: "5550000".into(),
                national_id: None,
                dob: None,
                gender: "Other".into(),
                password_hash: "$argon2id$unused".into(),
                role,
                doctor_department: department.map(|d| d.to_string()),
                avatar: None,
            })
            .await
            .unwrap();
        let token = TokenIssuer::from_ref(state).issue(user.id).unwrap();
        (user.id, format!("{cookie_name}={token}"))
    }

    fn appointment_payload(doctor_first: &str, doctor_last: &str, department: &str) -> Value {
        json!({
            "firstName": "Pat",
            "lastName": "Ward",
            "email": "pat@clinic.test",
            "phone": "5550042",
            "nationalId": "12121212",
            "dob": "1991-02-03",
            "gender": "Other",
            "appointmentDate": "2026-09-14",
            "department": department,
            "doctorFirstName": doctor_first,
            "doctorLastName": doctor_last,
            "hasVisited": false,
            "address": "12 Ward Lane",
        })
    }

    #[tokio::test]
    async fn booking_resolves_the_doctor_and_starts_pending() {
        let state = AppState::fake();
        let (doctor_id, _) = seed_user(&state, Role::Doctor, Some("Cardiology")).await;
        let (patient_id, patient_cookie) = seed_user(&state, Role::Patient, None).await;
        let app = crate::app::build_app(state);

        let response = request(
            &app,
            "POST",
            "/api/v1/appointment/post",
            Some(&patient_cookie),
            Some(appointment_payload("Rey", "Field", "Cardiology")),
        )
        .await;

        assert_eq!(response.status(), StatusCode::OK);
        let body = json_body(response).await;
        assert_eq!(body["message"], "Appointment Sent Successfully!");
        assert_eq!(body["appointment"]["status"], "Pending");
        assert_eq!(body["appointment"]["doctorId"], doctor_id.to_string());
        assert_eq!(body["appointment"]["patientId"], patient_id.to_string());
        assert_eq!(body["appointment"]["hasVisited"], false);
    }

    #[tokio::test]
    async fn unknown_doctor_is_a_not_found() {
        let state = AppState::fake();
        let (_, patient_cookie) = seed_user(&state, Role::Patient, None).await;
        let app = crate::app::build_app(state);

        let response = request(
            &app,
            "POST",
            "/api/v1/appointment/post",
            Some(&patient_cookie),
            Some(appointment_payload("Nobody", "Here", "Cardiology")),
        )
        .await;

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        assert_eq!(json_body(response).await["message"], "Doctor Not Found!");
    }

    #[tokio::test]
    async fn ambiguous_doctor_names_are_a_conflict() {
        let state = AppState::fake();
        seed_user(&state, Role::Doctor, Some("Cardiology")).await;
        seed_user(&state, Role::Doctor, Some("Cardiology")).await;
        let (_, patient_cookie) = seed_user(&state, Role::Patient, None).await;
        let app = crate::app::build_app(state);

        let response = request(
            &app,
            "POST",
            "/api/v1/appointment/post",
            Some(&patient_cookie),
            Some(appointment_payload("Rey", "Field", "Cardiology")),
        )
        .await;

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(
            json_body(response).await["message"],
            "Doctors Conflict! Please Contact Through Email Or Phone!"
        );
    }

    #[tokio::test]
    async fn incomplete_booking_form_is_rejected_before_doctor_lookup() {
        let state = AppState::fake();
        let (_, patient_cookie) = seed_user(&state, Role::Patient, None).await;
        let app = crate::app::build_app(state);

        let mut payload = appointment_payload("Rey", "Field", "Cardiology");
        payload.as_object_mut().unwrap().remove("address");
        let response = request(
            &app,
            "POST",
            "/api/v1/appointment/post",
            Some(&patient_cookie),
            Some(payload),
        )
        .await;

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(json_body(response).await["message"], "Please Fill Full Form!");
    }

    #[tokio::test]
    async fn booking_requires_a_patient_session() {
        let app = crate::app::build_app(AppState::fake());

        let response = request(
            &app,
            "POST",
            "/api/v1/appointment/post",
            None,
            Some(appointment_payload("Rey", "Field", "Cardiology")),
        )
        .await;

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(json_body(response).await["message"], "User is not authenticated!");
    }

    #[tokio::test]
    async fn listing_requires_an_admin_session() {
        let app = crate::app::build_app(AppState::fake());

        let response = request(&app, "GET", "/api/v1/appointment/getall", None, None).await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(
            json_body(response).await["message"],
            "Dashboard User is not authenticated!"
        );
    }

    #[tokio::test]
    async fn admin_sees_every_booked_appointment() {
        let state = AppState::fake();
        seed_user(&state, Role::Doctor, Some("Cardiology")).await;
        let (_, patient_cookie) = seed_user(&state, Role::Patient, None).await;
        let (_, admin_cookie) = seed_user(&state, Role::Admin, None).await;
        let app = crate::app::build_app(state);

        request(
            &app,
            "POST",
            "/api/v1/appointment/post",
            Some(&patient_cookie),
            Some(appointment_payload("Rey", "Field", "Cardiology")),
        )
        .await;

        let response =
            request(&app, "GET", "/api/v1/appointment/getall", Some(&admin_cookie), None).await;
        assert_eq!(response.status(), StatusCode::OK);
        let body = json_body(response).await;
        assert_eq!(body["appointments"].as_array().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn status_update_round_trips() {
        let state = AppState::fake();
        seed_user(&state, Role::Doctor, Some("Cardiology")).await;
        let (_, patient_cookie) = seed_user(&state, Role::Patient, None).await;
        let (_, admin_cookie) = seed_user(&state, Role::Admin, None).await;
        let app = crate::app::build_app(state);

        let booked = request(
            &app,
            "POST",
            "/api/v1/appointment/post",
            Some(&patient_cookie),
            Some(appointment_payload("Rey", "Field", "Cardiology")),
        )
        .await;
        let id = json_body(booked).await["appointment"]["id"].as_str().unwrap().to_string();

        let response = request(
            &app,
            "PUT",
            &format!("/api/v1/appointment/update/{id}"),
            Some(&admin_cookie),
            Some(json!({ "status": "Accepted" })),
        )
        .await;

        assert_eq!(response.status(), StatusCode::OK);
        let body = json_body(response).await;
        assert_eq!(body["message"], "Appointment Status Updated!");
        assert_eq!(body["appointment"]["status"], "Accepted");
    }

    #[tokio::test]
    async fn updating_a_missing_appointment_is_a_not_found() {
        let state = AppState::fake();
        let (_, admin_cookie) = seed_user(&state, Role::Admin, None).await;
        let app = crate::app::build_app(state);

        let response = request(
            &app,
            "PUT",
            &format!("/api/v1/appointment/update/{}", Uuid::new_v4()),
            Some(&admin_cookie),
            Some(json!({ "status": "Rejected" })),
        )
        .await;

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        assert_eq!(json_body(response).await["message"], "Appointment Not Found!");
    }

    #[tokio::test]
    async fn malformed_ids_and_statuses_keep_the_error_envelope() {
        let state = AppState::fake();
        let (_, admin_cookie) = seed_user(&state, Role::Admin, None).await;
        let app = crate::app::build_app(state);

        let bad_id = request(
            &app,
            "PUT",
            "/api/v1/appointment/update/not-a-uuid",
            Some(&admin_cookie),
            Some(json!({ "status": "Accepted" })),
        )
        .await;
        assert_eq!(bad_id.status(), StatusCode::BAD_REQUEST);
        assert_eq!(json_body(bad_id).await["success"], false);

        let bad_status = request(
            &app,
            "PUT",
            &format!("/api/v1/appointment/update/{}", Uuid::new_v4()),
            Some(&admin_cookie),
            Some(json!({ "status": "Done" })),
        )
        .await;
        assert_eq!(bad_status.status(), StatusCode::BAD_REQUEST);
        assert_eq!(json_body(bad_status).await["success"], false);
    }

    #[tokio::test]
    async fn delete_removes_the_appointment() {
        let state = AppState::fake();
        seed_user(&state, Role::Doctor, Some("Cardiology")).await;
        let (_, patient_cookie) = seed_user(&state, Role::Patient, None).await;
        let (_, admin_cookie) = seed_user(&state, Role::Admin, None).await;
        let app = crate::app::build_app(state);

        let booked = request(
            &app,
            "POST",
            "/api/v1/appointment/post",
            Some(&patient_cookie),
            Some(appointment_payload("Rey", "Field", "Cardiology")),
        )
        .await;
        let id = json_body(booked).await["appointment"]["id"].as_str().unwrap().to_string();

        let deleted = request(
            &app,
            "DELETE",
            &format!("/api/v1/appointment/delete/{id}"),
            Some(&admin_cookie),
            None,
        )
        .await;
        assert_eq!(deleted.status(), StatusCode::OK);
        assert_eq!(json_body(deleted).await["message"], "Appointment Deleted!");

        let listed =
            request(&app, "GET", "/api/v1/appointment/getall", Some(&admin_cookie), None).await;
        assert!(json_body(listed).await["appointments"].as_array().unwrap().is_empty());

        let again = request(
            &app,
            "DELETE",
            &format!("/api/v1/appointment/delete/{id}"),
            Some(&admin_cookie),
            None,
        )
        .await;
        assert_eq!(again.status(), StatusCode::NOT_FOUND);
        assert_eq!(json_body(again).await["message"], "Appointment Not Found!");
    }
}
