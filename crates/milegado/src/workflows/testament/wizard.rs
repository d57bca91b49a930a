use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::domain::WillContent;
use super::validation::{fields, ValidationErrors, WillGuard, WillSubmission};

/// Linear four-step form flow.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WizardStep {
    PersonalData = 1,
    Assets = 2,
    Beneficiaries = 3,
    Review = 4,
}

impl WizardStep {
    pub const fn number(self) -> u8 {
        self as u8
    }

    pub fn from_number(number: u8) -> Option<Self> {
        match number {
            1 => Some(Self::PersonalData),
            2 => Some(Self::Assets),
            3 => Some(Self::Beneficiaries),
            4 => Some(Self::Review),
            _ => None,
        }
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::PersonalData => "Datos Personales",
            Self::Assets => "Bienes",
            Self::Beneficiaries => "Beneficiarios",
            Self::Review => "Revisión",
        }
    }

    /// Fields whose errors block leaving this step.
    pub const fn fields(self) -> &'static [&'static str] {
        match self {
            Self::PersonalData => &[
                fields::GIVEN_NAMES,
                fields::SURNAMES,
                fields::NATIONAL_ID,
                fields::BIRTH_DATE,
                fields::MARITAL_STATUS,
                fields::ADDRESS,
                fields::CITY,
            ],
            Self::Assets => &[fields::ASSETS, fields::ASSET_ITEMS],
            Self::Beneficiaries => &[fields::BENEFICIARIES, fields::BENEFICIARY_LIST],
            Self::Review => &[fields::SPECIAL_INSTRUCTIONS],
        }
    }

    pub fn next(self) -> Option<Self> {
        Self::from_number(self.number() + 1)
    }

    pub fn previous(self) -> Option<Self> {
        self.number().checked_sub(1).and_then(Self::from_number)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum WizardAdvance {
    Moved(WizardStep),
    /// Advancing from review submits the whole record.
    Completed(WillContent),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct WizardProgress {
    step: WizardStep,
}

impl Default for WizardProgress {
    fn default() -> Self {
        Self {
            step: WizardStep::PersonalData,
        }
    }
}

impl WizardProgress {
    pub fn at(step: WizardStep) -> Self {
        Self { step }
    }

    pub fn step(&self) -> WizardStep {
        self.step
    }

    pub fn is_completed(&self, step: WizardStep) -> bool {
        step < self.step
    }

    /// Moves forward unless the current step has field errors. Errors that
    /// belong to later steps are ignored until those steps are reached.
    pub fn advance(
        &mut self,
        guard: &WillGuard,
        submission: &WillSubmission,
        today: NaiveDate,
    ) -> Result<WizardAdvance, ValidationErrors> {
        let outcome = guard.validate(submission, today);

        match self.step.next() {
            None => outcome.map(WizardAdvance::Completed),
            Some(next) => {
                if let Err(errors) = outcome {
                    let blocking = errors.restricted_to(self.step.fields());
                    if !blocking.is_empty() {
                        return Err(blocking);
                    }
                }
                self.step = next;
                Ok(WizardAdvance::Moved(next))
            }
        }
    }

    pub fn back(&mut self) -> WizardStep {
        if let Some(previous) = self.step.previous() {
            self.step = previous;
        }
        self.step
    }
}
