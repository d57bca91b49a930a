//! Will drafting: guided capture, validation, inheritance arithmetic, document
//! composition and per-user storage.

pub mod auth;
pub mod composer;
pub mod domain;
pub mod format;
pub mod import;
pub mod inheritance;
pub mod repository;
pub mod router;
pub mod service;
pub mod supabase;
pub mod validation;
pub mod wizard;

#[cfg(test)]
mod tests;

pub use auth::{
    AuthError, AuthGateway, AuthSession, AuthUser, Credentials, SessionContext, SessionManager,
    SessionSubscription, SignUpOutcome, SignUpRequest,
};
pub use composer::{OutputMode, RenderedWill};
pub use domain::{
    AssetCategory, AssetItem, Beneficiary, MaritalStatus, OwnerId, RecordId, Relationship,
    Testator, WillContent, WillDocument, WillRecord,
};
pub use inheritance::{
    calculate_distribution, review_distribution, DistributionError, DistributionResult,
    DistributionReview, DistributionViolation, EstatePool,
};
pub use repository::{RepositoryError, WillRepository};
pub use router::{will_router, WillRouterState};
pub use service::{DistributionReport, SubmittedWill, WillService, WillServiceError};
pub use validation::{is_valid_rut, FieldError, ValidationErrors, WillGuard, WillSubmission};
pub use wizard::{WizardAdvance, WizardProgress, WizardStep};
