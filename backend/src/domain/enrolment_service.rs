//! # Enrolment Admission
//!
//! Decides whether a child may take a place in an occurrence and records the
//! decision atomically.
//!
//! ## Admission Rules
//!
//! Checked in this order, the first failing rule wins:
//!
//! 1. The occurrence exists
//! 2. The child exists and the acting user is one of its guardians
//! 3. The child is not already enrolled in any occurrence of the same event
//! 4. The occurrence still has room (`enrolments < capacity_per_occurrence`)
//! 5. The occurrence has not started yet
//!
//! All checks and the insert run inside a single write transaction. The
//! enrolment count is always read live from the enrolments table, so two
//! requests racing for the last place resolve to one success and one
//! `CapacityExceeded`.

use chrono::{DateTime, Utc};
use tracing::{info, warn};
use uuid::Uuid;

use crate::domain::commands::enrolments::{EnrolCommand, UnenrolCommand};
use crate::domain::errors::{DomainError, DomainResult};
use crate::domain::models::{Enrolment, Principal};
use crate::domain::time_utils::is_past;
use crate::storage::{
    ChildRepository, DbConnection, EnrolmentRepository, EventRepository, OccurrenceRepository,
    WriteTransaction,
};

pub const ALREADY_JOINED: &str = "Child already joined this event";
pub const CAPACITY_REACHED: &str = "Maximum enrolments created";
pub const OCCURRENCE_IN_PAST: &str = "Cannot join occurrence in the past";

#[derive(Clone)]
pub struct EnrolmentService {
    db: DbConnection,
    event_repository: EventRepository,
    occurrence_repository: OccurrenceRepository,
    child_repository: ChildRepository,
    enrolment_repository: EnrolmentRepository,
}

impl EnrolmentService {
    pub fn new(db: DbConnection) -> Self {
        Self {
            event_repository: EventRepository::new(db.clone()),
            occurrence_repository: OccurrenceRepository::new(db.clone()),
            child_repository: ChildRepository::new(db.clone()),
            enrolment_repository: EnrolmentRepository::new(db.clone()),
            db,
        }
    }

    /// Enrol a child into an occurrence on behalf of its guardian
    pub async fn enrol_occurrence(
        &self,
        command: EnrolCommand,
        principal: &Principal,
    ) -> DomainResult<Enrolment> {
        self.enrol_occurrence_at(command, principal, Utc::now()).await
    }

    /// Same as [`Self::enrol_occurrence`] with an explicit clock
    pub async fn enrol_occurrence_at(
        &self,
        command: EnrolCommand,
        principal: &Principal,
        now: DateTime<Utc>,
    ) -> DomainResult<Enrolment> {
        info!(
            "Enrolment requested: child={}, occurrence={}, user={}",
            command.child_id, command.occurrence_id, principal.user_id
        );

        let mut tx = self.db.begin_write().await?;

        match self.admit(&mut tx, command, principal, now).await {
            Ok(enrolment) => {
                tx.commit().await?;
                info!(
                    "Enrolled child {} into occurrence {} ({})",
                    enrolment.child_id, enrolment.occurrence_id, enrolment.id
                );
                Ok(enrolment)
            }
            Err(e) => {
                tx.abandon().await;
                warn!(
                    "Enrolment rejected: child={}, occurrence={}: {}",
                    command.child_id, command.occurrence_id, e
                );
                Err(e)
            }
        }
    }

    async fn admit(
        &self,
        tx: &mut WriteTransaction,
        command: EnrolCommand,
        principal: &Principal,
        now: DateTime<Utc>,
    ) -> DomainResult<Enrolment> {
        let occurrence = self
            .occurrence_repository
            .get_occurrence_in(tx.conn(), command.occurrence_id)
            .await?
            .ok_or_else(|| DomainError::not_found("Occurrence"))?;

        let child = self
            .child_repository
            .get_child_for_guardian(tx.conn(), command.child_id, principal.user_id)
            .await?
            .ok_or_else(|| DomainError::not_found("Child"))?;

        if self
            .enrolment_repository
            .child_has_event_enrolment(tx.conn(), child.id, occurrence.event_id)
            .await?
        {
            return Err(DomainError::conflict(ALREADY_JOINED));
        }

        let event = self
            .event_repository
            .get_event_in(tx.conn(), occurrence.event_id)
            .await?
            .ok_or_else(|| DomainError::not_found("Event"))?;

        let enrolled = self
            .enrolment_repository
            .count_for_occurrence(tx.conn(), occurrence.id)
            .await?;
        if enrolled >= event.capacity_per_occurrence {
            return Err(DomainError::CapacityExceeded(CAPACITY_REACHED.to_string()));
        }

        if is_past(occurrence.time, now) {
            return Err(DomainError::conflict(OCCURRENCE_IN_PAST));
        }

        let enrolment = Enrolment {
            id: Uuid::new_v4(),
            child_id: child.id,
            occurrence_id: occurrence.id,
            created_at: now,
        };
        self.enrolment_repository
            .insert_enrolment(tx.conn(), &enrolment)
            .await?;

        Ok(enrolment)
    }

    /// Remove a child's enrolment. No capacity or time restriction applies.
    pub async fn unenrol_occurrence(
        &self,
        command: UnenrolCommand,
        principal: &Principal,
    ) -> DomainResult<()> {
        info!(
            "Unenrolment requested: child={}, occurrence={}, user={}",
            command.child_id, command.occurrence_id, principal.user_id
        );

        let mut tx = self.db.begin_write().await?;

        let result = async {
            let child = self
                .child_repository
                .get_child_for_guardian(tx.conn(), command.child_id, principal.user_id)
                .await?
                .ok_or_else(|| DomainError::not_found("Child"))?;

            // Looked up among the child's own enrolments only
            let deleted = self
                .enrolment_repository
                .delete_for_child(tx.conn(), child.id, command.occurrence_id)
                .await?;
            if !deleted {
                return Err(DomainError::not_found("Occurrence"));
            }
            Ok::<_, DomainError>(())
        }
        .await;

        match result {
            Ok(()) => {
                tx.commit().await?;
                info!(
                    "Unenrolled child {} from occurrence {}",
                    command.child_id, command.occurrence_id
                );
                Ok(())
            }
            Err(e) => {
                tx.abandon().await;
                warn!(
                    "Unenrolment rejected: child={}, occurrence={}: {}",
                    command.child_id, command.occurrence_id, e
                );
                Err(e)
            }
        }
    }
}
