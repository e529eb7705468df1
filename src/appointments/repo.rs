use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

use crate::appointments::repo_types::{Appointment, AppointmentStatus, NewAppointment};

/// Persistence seam for appointments.
#[async_trait]
pub trait AppointmentStore: Send + Sync {
    async fn insert(&self, appointment: NewAppointment) -> anyhow::Result<Appointment>;
    async fn list_all(&self) -> anyhow::Result<Vec<Appointment>>;
    /// None when no row has that id.
    async fn update_status(
        &self,
        id: Uuid,
        status: AppointmentStatus,
    ) -> anyhow::Result<Option<Appointment>>;
    /// False when no row had that id.
    async fn delete(&self, id: Uuid) -> anyhow::Result<bool>;
}

pub struct PgAppointmentStore {
    db: PgPool,
}

impl PgAppointmentStore {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }
}

#[async_trait]
impl AppointmentStore for PgAppointmentStore {
    async fn insert(&self, appointment: NewAppointment) -> anyhow::Result<Appointment> {
        let row = sqlx::query_as::<_, Appointment>(
            r#"
            INSERT INTO appointments
                (first_name, last_name, email, phone, national_id, dob, gender,
                 appointment_date, department, doctor_first_name, doctor_last_name,
                 has_visited, address, doctor_id, patient_id)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15)
            RETURNING id, first_name, last_name, email, phone, national_id, dob, gender,
                      appointment_date, department, doctor_first_name, doctor_last_name,
                      has_visited, address, doctor_id, patient_id, status, created_at
            "#,
        )
        .bind(&appointment.first_name)
        .bind(&appointment.last_name)
        .bind(&appointment.email)
        .bind(&appointment.phone)
        .bind(&appointment.national_id)
        .bind(&appointment.dob)
        .bind(&appointment.gender)
        .bind(&appointment.appointment_date)
        .bind(&appointment.department)
        .bind(&appointment.doctor_first_name)
        .bind(&appointment.doctor_last_name)
        .bind(appointment.has_visited)
        .bind(&appointment.address)
        .bind(appointment.doctor_id)
        .bind(appointment.patient_id)
        .fetch_one(&self.db)
        .await?;
        Ok(row)
    }

    async fn list_all(&self) -> anyhow::Result<Vec<Appointment>> {
        let rows = sqlx::query_as::<_, Appointment>(
            r#"
            SELECT id, first_name, last_name, email, phone, national_id, dob, gender,
                   appointment_date, department, doctor_first_name, doctor_last_name,
                   has_visited, address, doctor_id, patient_id, status, created_at
            FROM appointments
            ORDER BY created_at
            "#,
        )
        .fetch_all(&self.db)
        .await?;
        Ok(rows)
    }

    async fn update_status(
        &self,
        id: Uuid,
        status: AppointmentStatus,
    ) -> anyhow::Result<Option<Appointment>> {
        let row = sqlx::query_as::<_, Appointment>(
            r#"
            UPDATE appointments
            SET status = $2
            WHERE id = $1
            RETURNING id, first_name, last_name, email, phone, national_id, dob, gender,
                      appointment_date, department, doctor_first_name, doctor_last_name,
                      has_visited, address, doctor_id, patient_id, status, created_at
            "#,
        )
        .bind(id)
        .bind(status)
        .fetch_optional(&self.db)
        .await?;
        Ok(row)
    }

    async fn delete(&self, id: Uuid) -> anyhow::Result<bool> {
        let result = sqlx::query("DELETE FROM appointments WHERE id = $1")
            .bind(id)
            .execute(&self.db)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}

/// In-memory store backing `AppState::fake()`.
#[derive(Default)]
pub struct MemoryAppointmentStore {
    appointments: std::sync::RwLock<Vec<Appointment>>,
}

#[async_trait]
impl AppointmentStore for MemoryAppointmentStore {
    async fn insert(&self, appointment: NewAppointment) -> anyhow::Result<Appointment> {
        let row = Appointment {
            id: Uuid::new_v4(),
            first_name: appointment.first_name,
            last_name: appointment.last_name,
            email: appointment.email,
            phone: appointment.phone,
            national_id: appointment.national_id,
            dob: appointment.dob,
            gender: appointment.gender,
            appointment_date: appointment.appointment_date,
            department: appointment.department,
            doctor_first_name: appointment.doctor_first_name,
            doctor_last_name: appointment.doctor_last_name,
            has_visited: appointment.has_visited,
            address: appointment.address,
            doctor_id: appointment.doctor_id,
            patient_id: appointment.patient_id,
            status: AppointmentStatus::Pending,
            created_at: time::OffsetDateTime::now_utc(),
        };
        let mut appointments = self.appointments.write().expect("appointments lock");
        appointments.push(row.clone());
        Ok(row)
    }

    async fn list_all(&self) -> anyhow::Result<Vec<Appointment>> {
        let appointments = self.appointments.read().expect("appointments lock");
        Ok(appointments.clone())
    }

    async fn update_status(
        &self,
        id: Uuid,
        status: AppointmentStatus,
    ) -> anyhow::Result<Option<Appointment>> {
        let mut appointments = self.appointments.write().expect("appointments lock");
        let Some(row) = appointments.iter_mut().find(|a| a.id == id) else {
            return Ok(None);
        };
        row.status = status;
        Ok(Some(row.clone()))
    }

    async fn delete(&self, id: Uuid) -> anyhow::Result<bool> {
        let mut appointments = self.appointments.write().expect("appointments lock");
        let before = appointments.len();
        appointments.retain(|a| a.id != id);
        Ok(appointments.len() < before)
    }
}

#[cfg(test)]
mod repo_tests {
    use super::*;

    fn new_appointment() -> NewAppointment {
        NewAppointment {
            first_name: "Pat".into(),
            last_name: "Ward".into(),
            email: "pat@clinic.test".into(),
            phone: "5550042".into(),
            national_id: "12121212".into(),
            dob: "1991-02-03".into(),
            gender: "Other".into(),
            appointment_date: "2026-09-14".into(),
            department: "Cardiology".into(),
            doctor_first_name: "Rey".into(),
            doctor_last_name: "Field".into(),
            has_visited: false,
            address: "12 Ward Lane".into(),
            doctor_id: Uuid::new_v4(),
            patient_id: Uuid::new_v4(),
        }
    }

    #[tokio::test]
    async fn new_appointments_start_pending() {
        let store = MemoryAppointmentStore::default();
        let row = store.insert(new_appointment()).await.unwrap();
        assert_eq!(row.status, AppointmentStatus::Pending);
        assert_eq!(store.list_all().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn update_status_touches_only_the_named_row() {
        let store = MemoryAppointmentStore::default();
        let first = store.insert(new_appointment()).await.unwrap();
        let second = store.insert(new_appointment()).await.unwrap();

        let updated = store
            .update_status(first.id, AppointmentStatus::Accepted)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(updated.status, AppointmentStatus::Accepted);

        let all = store.list_all().await.unwrap();
        let untouched = all.iter().find(|a| a.id == second.id).unwrap();
        assert_eq!(untouched.status, AppointmentStatus::Pending);
    }

    #[tokio::test]
    async fn unknown_ids_report_as_missing() {
        let store = MemoryAppointmentStore::default();
        assert!(store
            .update_status(Uuid::new_v4(), AppointmentStatus::Rejected)
            .await
            .unwrap()
            .is_none());
        assert!(!store.delete(Uuid::new_v4()).await.unwrap());
    }

    #[tokio::test]
    async fn delete_removes_the_row() {
        let store = MemoryAppointmentStore::default();
        let row = store.insert(new_appointment()).await.unwrap();
        assert!(store.delete(row.id).await.unwrap());
        assert!(store.list_all().await.unwrap().is_empty());
    }
}
