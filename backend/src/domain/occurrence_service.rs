//! # Occurrence Service
//!
//! Occurrence CRUD and the filtered occurrence listing.
//!
//! ## Filters
//!
//! All filters are optional and combined with AND:
//!
//! - `date`: the occurrence starts on that calendar date in the local zone
//! - `time`: the occurrence's local time-of-day equals the given time once
//!   that time has been converted from its offset into the local zone
//! - `upcoming`: the occurrence has not started yet
//! - `venue_id`, `event_id`: identity match
//! - `occurrence_language`: case-insensitive language match; an unsupported
//!   code yields an empty page
//!
//! Results are ordered by start time, ties broken by id.

use chrono::{DateTime, Utc};
use tracing::{info, warn};
use uuid::Uuid;

use crate::domain::commands::occurrences::{
    AddOccurrenceCommand, LanguageFilter, OccurrenceListQuery, OccurrenceListResult,
    UpdateOccurrenceCommand,
};
use crate::domain::errors::{DomainError, DomainResult};
use crate::domain::models::{Language, Occurrence, OccurrenceWithStats, Principal};
use crate::domain::time_utils::LocalTimeZone;
use crate::storage::repositories::occurrence_repository::OccurrenceRowFilter;
use crate::storage::{
    DbConnection, EventRepository, OccurrenceRepository, VenueRepository, WriteTransaction,
};

#[derive(Clone)]
pub struct OccurrenceService {
    db: DbConnection,
    time_zone: LocalTimeZone,
    event_repository: EventRepository,
    occurrence_repository: OccurrenceRepository,
    venue_repository: VenueRepository,
}

impl OccurrenceService {
    pub fn new(db: DbConnection, time_zone: LocalTimeZone) -> Self {
        Self {
            time_zone,
            event_repository: EventRepository::new(db.clone()),
            occurrence_repository: OccurrenceRepository::new(db.clone()),
            venue_repository: VenueRepository::new(db.clone()),
            db,
        }
    }

    /// Schedule an occurrence. The start time may lie in the past.
    pub async fn add_occurrence(
        &self,
        command: AddOccurrenceCommand,
        principal: &Principal,
    ) -> DomainResult<OccurrenceWithStats> {
        principal.require_staff()?;
        info!(
            "Adding occurrence: event={}, venue={}, time={}",
            command.event_id, command.venue_id, command.time
        );

        let now = Utc::now();
        let occurrence = Occurrence {
            id: Uuid::new_v4(),
            event_id: command.event_id,
            venue_id: command.venue_id,
            time: command.time,
            occurrence_language: command.occurrence_language.unwrap_or(Language::DEFAULT),
            created_at: now,
            updated_at: now,
        };

        let mut tx = self.db.begin_write().await?;
        let result = async {
            self.ensure_references(&mut tx, occurrence.event_id, occurrence.venue_id)
                .await?;
            self.occurrence_repository
                .store_occurrence(tx.conn(), &occurrence)
                .await?;
            Ok::<_, DomainError>(())
        }
        .await;
        self.finish_write(tx, result).await?;

        info!("Created occurrence {}", occurrence.id);
        self.get_occurrence(occurrence.id, principal).await
    }

    pub async fn update_occurrence(
        &self,
        command: UpdateOccurrenceCommand,
        principal: &Principal,
    ) -> DomainResult<OccurrenceWithStats> {
        principal.require_staff()?;
        info!("Updating occurrence {}", command.id);

        let mut tx = self.db.begin_write().await?;
        let result = async {
            let mut occurrence = self
                .occurrence_repository
                .get_occurrence_in(tx.conn(), command.id)
                .await?
                .ok_or_else(|| DomainError::not_found("Occurrence"))?;

            if let Some(time) = command.time {
                occurrence.time = time;
            }
            if let Some(event_id) = command.event_id {
                occurrence.event_id = event_id;
            }
            if let Some(venue_id) = command.venue_id {
                occurrence.venue_id = venue_id;
            }
            if let Some(language) = command.occurrence_language {
                occurrence.occurrence_language = language;
            }
            occurrence.updated_at = Utc::now();

            self.ensure_references(&mut tx, occurrence.event_id, occurrence.venue_id)
                .await?;
            self.occurrence_repository
                .update_occurrence(tx.conn(), &occurrence)
                .await?;
            Ok::<_, DomainError>(())
        }
        .await;
        self.finish_write(tx, result).await?;

        self.get_occurrence(command.id, principal).await
    }

    /// Delete an occurrence and its enrolments
    pub async fn delete_occurrence(&self, id: Uuid, principal: &Principal) -> DomainResult<()> {
        principal.require_staff()?;
        info!("Deleting occurrence {}", id);

        let mut tx = self.db.begin_write().await?;
        let result = async {
            if !self.occurrence_repository.delete_occurrence(tx.conn(), id).await? {
                return Err(DomainError::not_found("Occurrence"));
            }
            Ok::<_, DomainError>(())
        }
        .await;
        self.finish_write(tx, result).await
    }

    /// Get an occurrence with its enrolment count and remaining capacity
    pub async fn get_occurrence(
        &self,
        id: Uuid,
        _principal: &Principal,
    ) -> DomainResult<OccurrenceWithStats> {
        self.occurrence_repository
            .get_with_stats(id)
            .await?
            .ok_or_else(|| DomainError::not_found("Occurrence"))
    }

    pub async fn list_occurrences(
        &self,
        query: OccurrenceListQuery,
        principal: &Principal,
    ) -> DomainResult<OccurrenceListResult> {
        self.list_occurrences_at(query, principal, Utc::now()).await
    }

    /// Same as [`Self::list_occurrences`] with an explicit clock for
    /// `upcoming` and for anchoring the time-of-day conversion.
    pub async fn list_occurrences_at(
        &self,
        query: OccurrenceListQuery,
        _principal: &Principal,
        now: DateTime<Utc>,
    ) -> DomainResult<OccurrenceListResult> {
        let filter = &query.filter;
        let page = query.page;

        let occurrence_language = match &filter.occurrence_language {
            Some(LanguageFilter::Is(language)) => Some(*language),
            Some(LanguageFilter::Unsupported(code)) => {
                info!("No occurrences in unsupported language '{}'", code);
                let (occurrences, pagination) = page.finish(Vec::new());
                return Ok(OccurrenceListResult {
                    occurrences,
                    pagination,
                });
            }
            None => None,
        };

        let mut row_filter = OccurrenceRowFilter {
            venue_id: filter.venue_id,
            event_id: filter.event_id,
            occurrence_language,
            ..Default::default()
        };
        if let Some(date) = filter.date {
            let (start, end) = self.time_zone.local_date_bounds(date);
            row_filter.starts_at_or_after.push(start);
            row_filter.starts_before = Some(end);
        }
        if filter.upcoming {
            row_filter.starts_at_or_after.push(now);
        }

        let occurrences = match filter.time {
            // Time-of-day depends on the zone's offset at each instant, so it
            // is matched here rather than in SQL.
            Some(time_filter) => {
                let wanted = self
                    .time_zone
                    .time_to_local(time_filter.time, time_filter.offset, now);
                self.occurrence_repository
                    .list_occurrences(&row_filter, None)
                    .await?
                    .into_iter()
                    .filter(|o| self.time_zone.local_time_of_day(o.occurrence.time) == wanted)
                    .skip(page.offset as usize)
                    .take(page.limit as usize + 1)
                    .collect()
            }
            None => {
                self.occurrence_repository
                    .list_occurrences(&row_filter, Some((page.limit + 1, page.offset)))
                    .await?
            }
        };

        let (occurrences, pagination) = page.finish(occurrences);
        info!("Listed {} occurrences", occurrences.len());

        Ok(OccurrenceListResult {
            occurrences,
            pagination,
        })
    }

    async fn ensure_references(
        &self,
        tx: &mut WriteTransaction,
        event_id: Uuid,
        venue_id: Uuid,
    ) -> DomainResult<()> {
        if self
            .event_repository
            .get_event_in(tx.conn(), event_id)
            .await?
            .is_none()
        {
            return Err(DomainError::not_found("Event"));
        }
        if !self.venue_repository.venue_exists(tx.conn(), venue_id).await? {
            return Err(DomainError::not_found("Venue"));
        }
        Ok(())
    }

    async fn finish_write(
        &self,
        tx: WriteTransaction,
        result: DomainResult<()>,
    ) -> DomainResult<()> {
        match result {
            Ok(()) => {
                tx.commit().await?;
                Ok(())
            }
            Err(e) => {
                tx.abandon().await;
                warn!("Occurrence write rejected: {}", e);
                Err(e)
            }
        }
    }
}
