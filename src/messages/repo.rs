use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

use crate::messages::repo_types::{ContactMessage, NewMessage};

/// Persistence seam for contact-form messages.
#[async_trait]
pub trait MessageStore: Send + Sync {
    async fn insert(&self, message: NewMessage) -> anyhow::Result<ContactMessage>;
    async fn list_all(&self) -> anyhow::Result<Vec<ContactMessage>>;
}

pub struct PgMessageStore {
    db: PgPool,
}

impl PgMessageStore {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }
}

#[async_trait]
impl MessageStore for PgMessageStore {
    async fn insert(&self, message: NewMessage) -> anyhow::Result<ContactMessage> {
        let row = sqlx::query_as::<_, ContactMessage>(
            r#"
            INSERT INTO messages (first_name, last_name, email, phone, message)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING id, first_name, last_name, email, phone, message, created_at
            "#,
        )
        .bind(&message.first_name)
        .bind(&message.last_name)
        .bind(&message.email)
        .bind(&message.phone)
        .bind(&message.message)
        .fetch_one(&self.db)
        .await?;
        Ok(row)
    }

    async fn list_all(&self) -> anyhow::Result<Vec<ContactMessage>> {
        let rows = sqlx::query_as::<_, ContactMessage>(
            r#"
            SELECT id, first_name, last_name, email, phone, message, created_at
            FROM messages
            ORDER BY created_at
            "#,
        )
        .fetch_all(&self.db)
        .await?;
        Ok(rows)
    }
}

/// In-memory store backing `AppState::fake()`.
#[derive(Default)]
pub struct MemoryMessageStore {
    messages: std::sync::RwLock<Vec<ContactMessage>>,
}

#[async_trait]
impl MessageStore for MemoryMessageStore {
    async fn insert(&self, message: NewMessage) -> anyhow::Result<ContactMessage> {
        let row = ContactMessage {
            id: Uuid::new_v4(),
            first_name: message.first_name,
            last_name: message.last_name,
            email: message.email,
            phone: message.phone,
            message: message.message,
            created_at: time::OffsetDateTime::now_utc(),
        };
        let mut messages = self.messages.write().expect("messages lock");
        messages.push(row.clone());
        Ok(row)
    }

    async fn list_all(&self) -> anyhow::Result<Vec<ContactMessage>> {
        let messages = self.messages.read().expect("messages lock");
        Ok(messages.clone())
    }
}
