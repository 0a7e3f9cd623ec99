use std::sync::Arc;
use chrono::NaiveDate;
use serde::Serialize;
use tracing::{info, warn};
use crate::domain::{
    models::{
        assignment::{Actor, Assignment, AssignmentStatus},
        event::EventRecord,
        notification::{Notification, KIND_ASSIGNED, KIND_EVENT_UPDATED},
        user::User,
    },
    ports::{AssignmentRepository, EventRepository, NotificationRepository},
    services::matching::{can_apply, ApplyDecision},
};
use crate::error::AppError;

#[derive(Debug, Clone, Serialize)]
#[serde(tag = "outcome", content = "assignment", rename_all = "snake_case")]
pub enum ApplyOutcome {
    Applied(Assignment),
    AlreadyApplied(Assignment),
    EventClosed,
}

pub struct AssignmentService {
    assignments: Arc<dyn AssignmentRepository>,
    events: Arc<dyn EventRepository>,
    notifications: Arc<dyn NotificationRepository>,
}

impl AssignmentService {
    pub fn new(
        assignments: Arc<dyn AssignmentRepository>,
        events: Arc<dyn EventRepository>,
        notifications: Arc<dyn NotificationRepository>,
    ) -> Self {
        Self { assignments, events, notifications }
    }

    /// Volunteer applies to an event. Safe to call repeatedly or concurrently:
    /// the pair converges to a single row.
    pub async fn apply(&self, volunteer_id: &str, event: &EventRecord, today: NaiveDate) -> Result<ApplyOutcome, AppError> {
        let outcome = self.place(volunteer_id, event, today).await?;
        if let ApplyOutcome::Applied(a) = &outcome {
            info!("Volunteer {} applied to event {} ({})", volunteer_id, event.id, a.id);
        }
        Ok(outcome)
    }

    /// Admin pairs a volunteer with an event; a new pairing notifies the volunteer.
    pub async fn assign(&self, volunteer_id: &str, event: &EventRecord, today: NaiveDate) -> Result<ApplyOutcome, AppError> {
        let outcome = self.place(volunteer_id, event, today).await?;
        if let ApplyOutcome::Applied(a) = &outcome {
            info!("Volunteer {} assigned to event {} ({})", volunteer_id, event.id, a.id);
            let note = Notification::new(
                volunteer_id.to_string(),
                Some(event.id.clone()),
                KIND_ASSIGNED,
                format!("You have been assigned to '{}' on {}.", event.name, event.date),
            );
            if let Err(e) = self.notifications.create(&note).await {
                warn!("Failed to record assignment notification for {}: {:?}", volunteer_id, e);
            }
        }
        Ok(outcome)
    }

    async fn place(&self, volunteer_id: &str, event: &EventRecord, today: NaiveDate) -> Result<ApplyOutcome, AppError> {
        let existing = self.assignments.find_by_pair(&event.id, volunteer_id).await.map_err(apply_failed)?;

        match (can_apply(volunteer_id, event, existing.as_slice(), today), existing) {
            (ApplyDecision::AlreadyApplied, Some(current)) => Ok(ApplyOutcome::AlreadyApplied(current)),
            (ApplyDecision::EventClosed, _) => Ok(ApplyOutcome::EventClosed),
            _ => {
                let candidate = Assignment::new(event.id.clone(), volunteer_id.to_string());
                let (stored, created) = self.assignments.insert_if_absent(&candidate).await.map_err(apply_failed)?;
                if created {
                    Ok(ApplyOutcome::Applied(stored))
                } else {
                    Ok(ApplyOutcome::AlreadyApplied(stored))
                }
            }
        }
    }

    pub async fn update_status(
        &self,
        assignment_id: &str,
        target: AssignmentStatus,
        requester: &User,
        today: NaiveDate,
    ) -> Result<Assignment, AppError> {
        let assignment = self.assignments.find_by_id(assignment_id).await?
            .ok_or(AppError::NotFound("Assignment not found".into()))?;

        let actor = Actor::from(requester.role);
        if actor == Actor::Volunteer && assignment.volunteer_id != requester.id {
            return Err(AppError::NotFound("Assignment not found".into()));
        }

        let event = self.events.find_by_id(&assignment.event_id).await?
            .ok_or(AppError::Internal)?;

        let next = assignment.status.transition(target, actor, event.date, today)?;

        let updated = self.assignments.update_status(&assignment.id, assignment.status, next).await?
            .ok_or_else(|| AppError::InvalidTransition(format!(
                "assignment {} changed while moving {} -> {}", assignment.id, assignment.status, next
            )))?;

        info!("Assignment {} moved {} -> {} by {:?}", updated.id, assignment.status, updated.status, actor);
        Ok(updated)
    }

    /// Batch step of the status machine: everything still active for a past event is completed.
    pub async fn complete_past(&self, today: NaiveDate) -> Result<u64, AppError> {
        self.assignments.complete_before(today).await
    }

    /// Notifies every volunteer still active on the event. A failed write is logged
    /// and skipped; the return value counts the notices actually stored.
    pub async fn notify_event_updated(&self, event: &EventRecord) -> Result<usize, AppError> {
        let active = self.assignments.list_active_by_event(&event.id).await?;
        let mut written = 0;
        for assignment in &active {
            let note = Notification::new(
                assignment.volunteer_id.clone(),
                Some(event.id.clone()),
                KIND_EVENT_UPDATED,
                format!("Event '{}' has been updated.", event.name),
            );
            match self.notifications.create(&note).await {
                Ok(_) => written += 1,
                Err(e) => warn!("Failed to record update notification for {}: {:?}", assignment.volunteer_id, e),
            }
        }
        if written < active.len() {
            warn!("Event {} update reached {} of {} volunteers", event.id, written, active.len());
        }
        Ok(written)
    }
}

fn apply_failed(e: AppError) -> AppError {
    match e {
        AppError::Database(db) => AppError::ApplyFailed(db.to_string()),
        other => other,
    }
}
