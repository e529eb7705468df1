use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

use crate::error::HttpError;
use crate::users::repo_types::{NewUser, Role, User};

/// Store failures the handlers care to tell apart. Everything that is not a
/// duplicate email is a backend fault.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("email already registered")]
    DuplicateEmail,
    #[error(transparent)]
    Backend(#[from] anyhow::Error),
}

impl From<sqlx::Error> for StoreError {
    fn from(e: sqlx::Error) -> Self {
        match &e {
            sqlx::Error::Database(db) if db.kind() == sqlx::error::ErrorKind::UniqueViolation => {
                StoreError::DuplicateEmail
            }
            _ => StoreError::Backend(e.into()),
        }
    }
}

impl From<StoreError> for HttpError {
    fn from(e: StoreError) -> Self {
        match e {
            StoreError::DuplicateEmail => HttpError::Conflict("User already Registered!".into()),
            StoreError::Backend(e) => HttpError::Internal(e),
        }
    }
}

/// Persistence seam for accounts. Postgres in production, in-memory in
/// tests.
#[async_trait]
pub trait UserStore: Send + Sync {
    async fn find_by_email(&self, email: &str) -> Result<Option<User>, StoreError>;
    async fn find_by_id(&self, id: Uuid) -> Result<Option<User>, StoreError>;
    async fn insert(&self, new_user: NewUser) -> Result<User, StoreError>;
    async fn list_by_role(&self, role: Role) -> Result<Vec<User>, StoreError>;
    /// Doctors matching a patient-supplied full name and department.
    async fn find_doctors_by_name(
        &self,
        first_name: &str,
        last_name: &str,
        department: &str,
    ) -> Result<Vec<User>, StoreError>;
}

pub struct PgUserStore {
    db: PgPool,
}

impl PgUserStore {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }
}

#[async_trait]
impl UserStore for PgUserStore {
    async fn find_by_email(&self, email: &str) -> Result<Option<User>, StoreError> {
        let user = sqlx::query_as::<_, User>(
            r#"
            SELECT id, first_name, last_name, email, phone, national_id, dob, gender,
                   password_hash, role, doctor_department, avatar, created_at
            FROM users
            WHERE email = $1
            "#,
        )
        .bind(email)
        .fetch_optional(&self.db)
        .await?;
        Ok(user)
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<User>, StoreError> {
        let user = sqlx::query_as::<_, User>(
            r#"
            SELECT id, first_name, last_name, email, phone, national_id, dob, gender,
                   password_hash, role, doctor_department, avatar, created_at
            FROM users
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.db)
        .await?;
        Ok(user)
    }

    async fn insert(&self, new_user: NewUser) -> Result<User, StoreError> {
        let user = sqlx::query_as::<_, User>(
            r#"
            INSERT INTO users
                (first_name, last_name, email, phone, national_id, dob, gender,
                 password_hash, role, doctor_department, avatar)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)
            RETURNING id, first_name, last_name, email, phone, national_id, dob, gender,
                      password_hash, role, doctor_department, avatar, created_at
            "#,
        )
        .bind(&new_user.first_name)
        .bind(&new_user.last_name)
        .bind(&new_user.email)
        .bind(&new_user.phone)
        .bind(&new_user.national_id)
        .bind(&new_user.dob)
        .bind(&new_user.gender)
        .bind(&new_user.password_hash)
        .bind(new_user.role)
        .bind(&new_user.doctor_department)
        .bind(new_user.avatar.map(sqlx::types::Json))
        .fetch_one(&self.db)
        .await?;
        Ok(user)
    }

    async fn list_by_role(&self, role: Role) -> Result<Vec<User>, StoreError> {
        let users = sqlx::query_as::<_, User>(
            r#"
            SELECT id, first_name, last_name, email, phone, national_id, dob, gender,
                   password_hash, role, doctor_department, avatar, created_at
            FROM users
            WHERE role = $1
            ORDER BY created_at
            "#,
        )
        .bind(role)
        .fetch_all(&self.db)
        .await?;
        Ok(users)
    }

    async fn find_doctors_by_name(
        &self,
        first_name: &str,
        last_name: &str,
        department: &str,
    ) -> Result<Vec<User>, StoreError> {
        let doctors = sqlx::query_as::<_, User>(
            r#"
            SELECT id, first_name, last_name, email, phone, national_id, dob, gender,
                   password_hash, role, doctor_department, avatar, created_at
            FROM users
            WHERE role = 'Doctor'
              AND first_name = $1
              AND last_name = $2
              AND doctor_department = $3
            "#,
        )
        .bind(first_name)
        .bind(last_name)
        .bind(department)
        .fetch_all(&self.db)
        .await?;
        Ok(doctors)
    }
}

/// In-memory store backing `AppState::fake()`. The duplicate check and the
/// insert happen under one write lock, the moral equivalent of the unique
/// index on `users.email`.
#[derive(Default)]
pub struct MemoryUserStore {
    users: std::sync::RwLock<Vec<User>>,
}

#[async_trait]
impl UserStore for MemoryUserStore {
    async fn find_by_email(&self, email: &str) -> Result<Option<User>, StoreError> {
        let users = self.users.read().expect("users lock");
        Ok(users.iter().find(|u| u.email == email).cloned())
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<User>, StoreError> {
        let users = self.users.read().expect("users lock");
        Ok(users.iter().find(|u| u.id == id).cloned())
    }

    async fn insert(&self, new_user: NewUser) -> Result<User, StoreError> {
        let mut users = self.users.write().expect("users lock");
        if users.iter().any(|u| u.email == new_user.email) {
            return Err(StoreError::DuplicateEmail);
        }
        let user = User {
            id: Uuid::new_v4(),
            first_name: new_user.first_name,
            last_name: new_user.last_name,
            email: new_user.email,
            phone: new_user.phone,
            national_id: new_user.national_id,
            dob: new_user.dob,
            gender: new_user.gender,
            password_hash: new_user.password_hash,
            role: new_user.role,
            doctor_department: new_user.doctor_department,
            avatar: new_user.avatar.map(sqlx::types::Json),
            created_at: time::OffsetDateTime::now_utc(),
        };
        users.push(user.clone());
        Ok(user)
    }

    async fn list_by_role(&self, role: Role) -> Result<Vec<User>, StoreError> {
        let users = self.users.read().expect("users lock");
        Ok(users.iter().filter(|u| u.role == role).cloned().collect())
    }

    async fn find_doctors_by_name(
        &self,
        first_name: &str,
        last_name: &str,
        department: &str,
    ) -> Result<Vec<User>, StoreError> {
        let users = self.users.read().expect("users lock");
        Ok(users
            .iter()
            .filter(|u| {
                u.role == Role::Doctor
                    && u.first_name == first_name
                    && u.last_name == last_name
                    && u.doctor_department.as_deref() == Some(department)
            })
            .cloned()
            .collect())
    }
}
