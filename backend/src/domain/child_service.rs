use chrono::Utc;
use tracing::info;
use uuid::Uuid;

use crate::domain::commands::children::AddChildCommand;
use crate::domain::errors::{DomainError, DomainResult};
use crate::domain::models::{Child, Guardian, Principal};
use crate::storage::{ChildRepository, DbConnection};

/// Service for registering children under the acting guardian
#[derive(Clone)]
pub struct ChildService {
    db: DbConnection,
    child_repository: ChildRepository,
}

impl ChildService {
    pub fn new(db: DbConnection) -> Self {
        Self {
            child_repository: ChildRepository::new(db.clone()),
            db,
        }
    }

    /// Register a child. The acting user becomes (or stays) its guardian.
    pub async fn add_child(
        &self,
        command: AddChildCommand,
        principal: &Principal,
    ) -> DomainResult<Child> {
        let first_name = command.first_name.trim();
        if first_name.is_empty() {
            return Err(DomainError::validation("Child first name cannot be empty"));
        }
        let email = command.guardian_email.trim();
        if !email.contains('@') {
            return Err(DomainError::validation(format!(
                "Invalid guardian email: {}",
                command.guardian_email
            )));
        }

        let now = Utc::now();
        let guardian = Guardian {
            id: principal.user_id,
            email: email.to_string(),
            language: command.guardian_language,
        };
        let child = Child {
            id: Uuid::new_v4(),
            first_name: first_name.to_string(),
        };

        let mut tx = self.db.begin_write().await?;
        let result = async {
            self.child_repository
                .upsert_guardian(tx.conn(), &guardian, now)
                .await?;
            self.child_repository
                .store_child(tx.conn(), &child, guardian.id, now)
                .await
        }
        .await;

        if let Err(e) = result {
            tx.abandon().await;
            return Err(e.into());
        }
        tx.commit().await?;

        info!("Registered child {} for guardian {}", child.id, guardian.id);
        Ok(child)
    }
}
