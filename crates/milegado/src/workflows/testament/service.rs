use chrono::NaiveDate;
use serde::Serialize;
use std::sync::Arc;
use tracing::info;

use super::auth::{AuthSession, SessionContext};
use super::composer::{self, OutputMode, RenderedWill};
use super::domain::{Beneficiary, RecordId, WillRecord};
use super::inheritance::{
    calculate_distribution, review_distribution, DistributionError, DistributionResult,
    DistributionReview,
};
use super::repository::{RepositoryError, WillRepository};
use super::validation::{ValidationErrors, WillGuard, WillSubmission};

/// Facade composing the guard, composer, calculator and persistence gateway.
pub struct WillService<R> {
    guard: Arc<WillGuard>,
    repository: Arc<R>,
}

/// Outcome of a submission: the printable document, plus the stored row
/// when the caller was signed in.
#[derive(Debug, Clone)]
pub struct SubmittedWill {
    pub record: Option<WillRecord>,
    pub document: RenderedWill,
}

#[derive(Debug, Clone, Serialize)]
pub struct DistributionReport {
    pub distribution: DistributionResult,
    pub review: DistributionReview,
    pub messages: Vec<String>,
}

impl<R> WillService<R>
where
    R: WillRepository + 'static,
{
    pub fn new(repository: Arc<R>) -> Self {
        Self::with_guard(WillGuard::new(), repository)
    }

    pub fn with_guard(guard: WillGuard, repository: Arc<R>) -> Self {
        Self {
            guard: Arc::new(guard),
            repository,
        }
    }

    /// Validated HTML preview; nothing is stored.
    pub fn preview(
        &self,
        submission: &WillSubmission,
        today: NaiveDate,
    ) -> Result<String, WillServiceError> {
        let content = self.guard.validate(submission, today)?;
        Ok(composer::render_preview(&content.document(today)))
    }

    /// Anonymous callers get the document only; signed-in callers get it
    /// persisted first. A failed write aborts the whole submission.
    pub async fn submit(
        &self,
        session: &SessionContext,
        submission: &WillSubmission,
        today: NaiveDate,
    ) -> Result<SubmittedWill, WillServiceError> {
        let content = self.guard.validate(submission, today)?;

        let record = match session.session() {
            Some(auth) => {
                let stored = self
                    .repository
                    .insert(auth, content.new_record(auth.owner_id()))
                    .await?;
                info!(record = %stored.id, owner = %stored.owner_id, "will record created");
                Some(stored)
            }
            None => None,
        };

        Ok(SubmittedWill {
            record,
            document: composer::render(&content.document(today), OutputMode::Printable),
        })
    }

    /// Edit-and-resubmit of an existing record.
    pub async fn resubmit(
        &self,
        session: &SessionContext,
        id: RecordId,
        submission: &WillSubmission,
        today: NaiveDate,
    ) -> Result<SubmittedWill, WillServiceError> {
        let auth = require_session(session)?;
        let content = self.guard.validate(submission, today)?;

        let stored = self.repository.update(auth, id, content.changes()).await?;
        info!(record = %stored.id, owner = %stored.owner_id, "will record updated");

        Ok(SubmittedWill {
            record: Some(stored),
            document: composer::render(&content.document(today), OutputMode::Printable),
        })
    }

    pub async fn list(&self, session: &SessionContext) -> Result<Vec<WillRecord>, WillServiceError> {
        let auth = require_session(session)?;
        Ok(self.repository.list_by_owner(auth).await?)
    }

    pub async fn get(
        &self,
        session: &SessionContext,
        id: RecordId,
    ) -> Result<WillRecord, WillServiceError> {
        let auth = require_session(session)?;
        Ok(self.repository.get_by_id(auth, id).await?)
    }

    pub async fn delete(&self, session: &SessionContext, id: RecordId) -> Result<(), WillServiceError> {
        let auth = require_session(session)?;
        self.repository.delete(auth, id).await?;
        info!(record = %id, owner = %auth.owner_id(), "will record deleted");
        Ok(())
    }

    /// Regenerates the document of a stored record, dated `today`.
    pub async fn render_record(
        &self,
        session: &SessionContext,
        id: RecordId,
        mode: OutputMode,
        today: NaiveDate,
    ) -> Result<RenderedWill, WillServiceError> {
        let record = self.get(session, id).await?;
        Ok(composer::render(&record.document(today), mode))
    }

    pub fn distribution(
        &self,
        beneficiaries: &[Beneficiary],
        total_estate_value: f64,
    ) -> Result<DistributionReport, WillServiceError> {
        let distribution = calculate_distribution(beneficiaries, total_estate_value)?;
        let review = review_distribution(beneficiaries);
        let messages = review.messages();
        Ok(DistributionReport {
            distribution,
            review,
            messages,
        })
    }
}

fn require_session(session: &SessionContext) -> Result<&AuthSession, WillServiceError> {
    session.session().ok_or(WillServiceError::Unauthenticated)
}

#[derive(Debug, thiserror::Error)]
pub enum WillServiceError {
    #[error(transparent)]
    Validation(#[from] ValidationErrors),
    #[error("a signed-in session is required")]
    Unauthenticated,
    #[error(transparent)]
    Repository(#[from] RepositoryError),
    #[error(transparent)]
    Distribution(#[from] DistributionError),
}
