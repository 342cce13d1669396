//! Nine-step record builder
//!
//! The builder owns a working copy of one record. Steps only drive
//! navigation: there is no validation gate, and every section can be edited
//! from any step. The working copy becomes durable through the facade on a
//! forced save or on finalization.
//!
//! New records are drafted: every edit reschedules a debounced draft write so
//! an interrupted session can be resumed. Records opened for editing are not
//! drafted.

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use fhi_common::model::{
    FamilyInfoPatch, GeneralDataPatch, HousingPatch, MemberPatch, OccupationPatch, RecordPatch,
    SocioeconomicPatch, PSYCHOLOGICAL_QUESTIONS,
};
use fhi_common::{Error, FamilyRecord, MatrixSection, MatrixValue, MemberRole, Result};
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::draft::{DraftAutosaver, DraftStore};
use crate::sync::SyncFacade;

/// Wizard steps, in order
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum WizardStep {
    GeneralData = 1,
    FamilyGroup,
    History,
    Disabilities,
    HabitsAndRisks,
    Psychological,
    Socioeconomic,
    Housing,
    Occupation,
}

impl WizardStep {
    pub const ALL: [WizardStep; 9] = [
        WizardStep::GeneralData,
        WizardStep::FamilyGroup,
        WizardStep::History,
        WizardStep::Disabilities,
        WizardStep::HabitsAndRisks,
        WizardStep::Psychological,
        WizardStep::Socioeconomic,
        WizardStep::Housing,
        WizardStep::Occupation,
    ];

    pub const FIRST: WizardStep = WizardStep::GeneralData;
    pub const LAST: WizardStep = WizardStep::Occupation;

    /// 1-based step number
    pub fn number(self) -> u8 {
        self as u8
    }

    pub fn from_number(n: u8) -> Option<WizardStep> {
        Self::ALL.get(usize::from(n).checked_sub(1)?).copied()
    }

    pub fn title(self) -> &'static str {
        match self {
            WizardStep::GeneralData => "Datos Generales",
            WizardStep::FamilyGroup => "Grupo Familiar",
            WizardStep::History => "Antecedentes",
            WizardStep::Disabilities => "Discapacidades",
            WizardStep::HabitsAndRisks => "Hábitos y Riesgos",
            WizardStep::Psychological => "Factor Psicológico",
            WizardStep::Socioeconomic => "Socioeconómico",
            WizardStep::Housing => "Vivienda",
            WizardStep::Occupation => "Finalización",
        }
    }

    /// Following step, clamped at the last one
    pub fn next(self) -> WizardStep {
        Self::from_number(self.number() + 1).unwrap_or(Self::LAST)
    }

    /// Preceding step, clamped at the first one
    pub fn prev(self) -> WizardStep {
        Self::from_number(self.number() - 1).unwrap_or(Self::FIRST)
    }

    pub fn is_last(self) -> bool {
        self == Self::LAST
    }
}

impl fmt::Display for WizardStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}. {}", self.number(), self.title())
    }
}

/// Operator's answer when an unfinished draft is found
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DraftChoice {
    Resume,
    Discard,
}

/// Working copy of one record plus wizard position
pub struct RecordBuilder {
    facade: Arc<SyncFacade>,
    step: WizardStep,
    record: FamilyRecord,
    editing: Option<Uuid>,
    autosaver: DraftAutosaver,
}

impl RecordBuilder {
    /// Start a new record. If a draft is pending, `choose` decides whether
    /// to resume it or discard it.
    pub async fn open_new<F>(facade: Arc<SyncFacade>, quiet: Duration, choose: F) -> Result<Self>
    where
        F: FnOnce(&FamilyRecord) -> DraftChoice,
    {
        let mut record = FamilyRecord::blank();

        if let Some(draft) = facade.load_draft().await? {
            match choose(&draft) {
                DraftChoice::Resume => {
                    info!(record_id = %draft.id, "Resuming draft");
                    record = draft;
                }
                DraftChoice::Discard => {
                    info!(record_id = %draft.id, "Discarding draft");
                    facade.clear_draft().await?;
                }
            }
        }

        Ok(Self::with_record(facade, quiet, record, None))
    }

    /// Open a saved record for editing. An unknown id yields a fresh blank
    /// record instead of an error.
    pub async fn open_existing(facade: Arc<SyncFacade>, quiet: Duration, id: Uuid) -> Result<Self> {
        let records = facade.list().await?;
        let record = match records.into_iter().find(|r| r.id == id) {
            Some(record) => record,
            None => {
                warn!(record_id = %id, "Record to edit not found; starting blank");
                FamilyRecord::blank()
            }
        };
        let editing = Some(record.id);
        Ok(Self::with_record(facade, quiet, record, editing))
    }

    fn with_record(
        facade: Arc<SyncFacade>,
        quiet: Duration,
        record: FamilyRecord,
        editing: Option<Uuid>,
    ) -> Self {
        let drafts: Arc<dyn DraftStore> = facade.clone();
        Self {
            facade,
            step: WizardStep::FIRST,
            record,
            editing,
            autosaver: DraftAutosaver::new(drafts, quiet),
        }
    }

    pub fn step(&self) -> WizardStep {
        self.step
    }

    pub fn record(&self) -> &FamilyRecord {
        &self.record
    }

    /// Id of the saved record being edited, if this is not a new record
    pub fn editing_id(&self) -> Option<Uuid> {
        self.editing
    }

    pub fn next(&mut self) -> WizardStep {
        self.step = self.step.next();
        self.step
    }

    pub fn prev(&mut self) -> WizardStep {
        self.step = self.step.prev();
        self.step
    }

    // ------------------------------------------------------------------
    // Section edits
    // ------------------------------------------------------------------

    pub fn update_general(&mut self, patch: &GeneralDataPatch) {
        patch.apply(&mut self.record.general_data);
        self.touched();
    }

    pub fn update_family(&mut self, patch: &FamilyInfoPatch) {
        patch.apply(&mut self.record.family_info);
        self.touched();
    }

    /// Append a member with the next role in sequence
    pub fn add_member(&mut self) -> Result<MemberRole> {
        let role = self.record.family_info.members.append()?.role;
        self.touched();
        Ok(role)
    }

    pub fn update_member(&mut self, role: MemberRole, patch: &MemberPatch) -> Result<()> {
        let member = self
            .record
            .family_info
            .members
            .get_mut(role)
            .ok_or_else(|| Error::NotFound(format!("member {}", role)))?;
        patch.apply(member);
        self.touched();
        Ok(())
    }

    /// Remove a member. Other members keep their roles; matrix cells of the
    /// removed role are left as recorded.
    pub fn remove_member(&mut self, role: MemberRole) -> Result<()> {
        self.record.family_info.members.remove(role)?;
        self.touched();
        Ok(())
    }

    pub fn set_matrix_cell(
        &mut self,
        section: MatrixSection,
        condition: &str,
        role: MemberRole,
        value: MatrixValue,
    ) -> Result<()> {
        self.check_cell(section, condition, role)?;
        self.record.matrix_mut(section).set(condition, role, value);
        self.touched();
        Ok(())
    }

    /// Return a cell to "not recorded"
    pub fn clear_matrix_cell(&mut self, section: MatrixSection, condition: &str, role: MemberRole) {
        if self.record.matrix_mut(section).clear(condition, role).is_some() {
            self.touched();
        }
    }

    pub fn answer_psychological(&mut self, question: u8, answer: MatrixValue) -> Result<()> {
        if usize::from(question) >= PSYCHOLOGICAL_QUESTIONS.len() {
            return Err(Error::InvalidInput(format!(
                "psychological question {} does not exist",
                question
            )));
        }
        self.record.psychological_factors.insert(question, answer);
        self.touched();
        Ok(())
    }

    pub fn update_socioeconomic(&mut self, patch: &SocioeconomicPatch) {
        patch.apply(&mut self.record.socioeconomic);
        self.touched();
    }

    pub fn update_housing(&mut self, patch: &HousingPatch) {
        patch.apply(&mut self.record.housing_conditions);
        self.touched();
    }

    pub fn set_public_service(&mut self, service: &str, available: bool) {
        self.record
            .housing_conditions
            .public_services
            .insert(service.to_string(), available);
        self.touched();
    }

    pub fn update_occupation(&mut self, patch: &OccupationPatch) {
        patch.apply(&mut self.record.occupation);
        self.touched();
    }

    /// Apply every section present in `patch`
    pub fn apply_patch(&mut self, patch: &RecordPatch) {
        if let Some(p) = &patch.general_data {
            self.update_general(p);
        }
        if let Some(p) = &patch.family_info {
            self.update_family(p);
        }
        if let Some(p) = &patch.socioeconomic {
            self.update_socioeconomic(p);
        }
        if let Some(p) = &patch.housing_conditions {
            self.update_housing(p);
        }
        if let Some(p) = &patch.occupation {
            self.update_occupation(p);
        }
    }

    // ------------------------------------------------------------------
    // Persistence
    // ------------------------------------------------------------------

    /// Save the working copy at any step. The draft is kept.
    /// Returns whether the record store accepted it.
    pub async fn force_save(&mut self) -> Result<bool> {
        self.facade.save(&self.record).await
    }

    /// Write the draft now instead of after the quiet period
    pub async fn save_draft(&mut self) -> Result<()> {
        self.autosaver.cancel_and_wait().await;
        self.facade.store_draft(&self.record).await
    }

    /// Save from the last step and clear the draft, whatever the remote
    /// outcome. Returns whether the record store accepted the record.
    pub async fn finalize(&mut self) -> Result<bool> {
        if !self.step.is_last() {
            return Err(Error::InvalidInput(format!(
                "cannot finalize from step {}",
                self.step
            )));
        }

        self.autosaver.cancel_and_wait().await;
        let synced = self.facade.save(&self.record).await?;
        self.facade.clear_draft().await?;
        info!(record_id = %self.record.id, synced, "Record finalized");
        Ok(synced)
    }

    fn check_cell(&self, section: MatrixSection, condition: &str, role: MemberRole) -> Result<()> {
        if !section.accepts(condition) {
            return Err(Error::InvalidInput(format!(
                "'{}' is not a {} item",
                condition, section
            )));
        }
        if self.record.family_info.members.get(role).is_none() {
            return Err(Error::NotFound(format!("member {}", role)));
        }
        Ok(())
    }

    fn touched(&mut self) {
        if self.editing.is_some() {
            return;
        }
        debug!(step = self.step.number(), "Working copy changed");
        self.autosaver.schedule(self.record.clone());
    }
}
