//! # Institution Records
//!
//! The `Institution` aggregate root and its localized child records.
//!
//! ```text
//! Institution (id, year, contacts)
//!   ├── InstitutionDetails            one per language
//!   ├── InstitutionAccreditation      *
//!   ├── InstitutionAchievement        *
//!   ├── InstitutionConference         *
//!   ├── InstitutionLicence            *
//!   ├── InstitutionMagazine           *
//!   ├── InstitutionMainResearchDirection *
//!   ├── InstitutionPartnership        *
//!   ├── InstitutionPatent             *
//!   ├── InstitutionProject            *
//!   │     └── InstitutionProjectPartner  1..*
//!   ├── InstitutionRanking            *
//!   ├── InstitutionResearchSupportInfrastructure *
//!   └── InstitutionSocial             *
//! ```

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::error::ValidationError;
use crate::patch::{double_option, merge, Patch};
use crate::validation::{validate_id, Localized, ValidationResult};

// =============================================================================
// Institution (root)
// =============================================================================

/// A research institution. Not localized: names and descriptions live in
/// [`InstitutionDetails`].
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct Institution {
    /// Storage-assigned identifier, `0` until persisted.
    pub id: i64,
    pub year_of_establishment: i32,
    pub email: String,
    pub fax: String,
    pub phone_number: String,
    pub mail_index: String,
    pub created_at: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,
}

impl Institution {
    /// Checks a new institution before insert.
    pub fn validate_new(&self) -> ValidationResult<()> {
        if self.year_of_establishment <= 0 {
            return Err(ValidationError::must_be_positive(
                "year_of_establishment",
                i64::from(self.year_of_establishment),
            ));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct InstitutionPatch {
    pub id: i64,
    pub year_of_establishment: Option<i32>,
    pub email: Option<String>,
    pub fax: Option<String>,
    pub phone_number: Option<String>,
    pub mail_index: Option<String>,
}

impl Patch for InstitutionPatch {
    type Target = Institution;

    fn id(&self) -> i64 {
        self.id
    }

    fn validate(&self) -> ValidationResult<()> {
        validate_id("id", self.id)?;
        if let Some(year) = self.year_of_establishment {
            if year <= 0 {
                return Err(ValidationError::must_be_positive(
                    "year_of_establishment",
                    i64::from(year),
                ));
            }
        }
        Ok(())
    }

    fn merge_into(self, stored: &mut Institution) {
        merge(&mut stored.year_of_establishment, self.year_of_establishment);
        merge(&mut stored.email, self.email);
        merge(&mut stored.fax, self.fax);
        merge(&mut stored.phone_number, self.phone_number);
        merge(&mut stored.mail_index, self.mail_index);
    }
}

// =============================================================================
// Details
// =============================================================================

/// Localized description of an institution. At most one per language.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct InstitutionDetails {
    pub id: i64,
    pub institution_id: i64,
    pub language_code: String,
    pub institution_title: String,
    pub institution_type: String,
    pub legal_status: String,
    pub mission: String,
    pub founder: String,
    pub legal_address: String,
    pub factual_address: String,
    pub city: String,
    pub created_at: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct InstitutionDetailsPatch {
    pub id: i64,
    pub language_code: Option<String>,
    pub institution_title: Option<String>,
    pub institution_type: Option<String>,
    pub legal_status: Option<String>,
    pub mission: Option<String>,
    pub founder: Option<String>,
    pub legal_address: Option<String>,
    pub factual_address: Option<String>,
    pub city: Option<String>,
}

impl Patch for InstitutionDetailsPatch {
    type Target = InstitutionDetails;

    fn id(&self) -> i64 {
        self.id
    }

    fn language_code(&self) -> Option<&str> {
        self.language_code.as_deref()
    }

    fn merge_into(self, stored: &mut InstitutionDetails) {
        merge(&mut stored.language_code, self.language_code);
        merge(&mut stored.institution_title, self.institution_title);
        // Each column merges from its own stored field; type is never seeded
        // from title.
        merge(&mut stored.institution_type, self.institution_type);
        merge(&mut stored.legal_status, self.legal_status);
        merge(&mut stored.mission, self.mission);
        merge(&mut stored.founder, self.founder);
        merge(&mut stored.legal_address, self.legal_address);
        merge(&mut stored.factual_address, self.factual_address);
        merge(&mut stored.city, self.city);
    }
}

// =============================================================================
// Accreditation
// =============================================================================

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct InstitutionAccreditation {
    pub id: i64,
    pub institution_id: i64,
    pub language_code: String,
    pub accreditation_type: String,
    pub given_by: String,
    pub created_at: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct InstitutionAccreditationPatch {
    pub id: i64,
    pub language_code: Option<String>,
    pub accreditation_type: Option<String>,
    pub given_by: Option<String>,
}

impl Patch for InstitutionAccreditationPatch {
    type Target = InstitutionAccreditation;

    fn id(&self) -> i64 {
        self.id
    }

    fn language_code(&self) -> Option<&str> {
        self.language_code.as_deref()
    }

    fn merge_into(self, stored: &mut InstitutionAccreditation) {
        merge(&mut stored.language_code, self.language_code);
        merge(&mut stored.accreditation_type, self.accreditation_type);
        merge(&mut stored.given_by, self.given_by);
    }
}

// =============================================================================
// Achievement
// =============================================================================

/// An award or recognition received by the institution.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct InstitutionAchievement {
    pub id: i64,
    pub institution_id: i64,
    pub language_code: String,
    pub achievement_title: String,
    pub date_of_achievement: NaiveDate,
    /// Awarding body, e.g. a ministry.
    pub given_by: String,
    pub link_to_achievement_document: String,
    pub description: String,
    pub created_at: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct InstitutionAchievementPatch {
    pub id: i64,
    pub language_code: Option<String>,
    pub achievement_title: Option<String>,
    pub date_of_achievement: Option<NaiveDate>,
    pub given_by: Option<String>,
    pub link_to_achievement_document: Option<String>,
    pub description: Option<String>,
}

impl Patch for InstitutionAchievementPatch {
    type Target = InstitutionAchievement;

    fn id(&self) -> i64 {
        self.id
    }

    fn language_code(&self) -> Option<&str> {
        self.language_code.as_deref()
    }

    fn merge_into(self, stored: &mut InstitutionAchievement) {
        merge(&mut stored.language_code, self.language_code);
        merge(&mut stored.achievement_title, self.achievement_title);
        merge(&mut stored.date_of_achievement, self.date_of_achievement);
        merge(&mut stored.given_by, self.given_by);
        merge(
            &mut stored.link_to_achievement_document,
            self.link_to_achievement_document,
        );
        merge(&mut stored.description, self.description);
    }
}

// =============================================================================
// Conference
// =============================================================================

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct InstitutionConference {
    pub id: i64,
    pub institution_id: i64,
    pub language_code: String,
    pub conference_title: String,
    pub link: String,
    pub date_of_conference: NaiveDate,
    pub description: String,
    pub created_at: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct InstitutionConferencePatch {
    pub id: i64,
    pub language_code: Option<String>,
    pub conference_title: Option<String>,
    pub link: Option<String>,
    pub date_of_conference: Option<NaiveDate>,
    pub description: Option<String>,
}

impl Patch for InstitutionConferencePatch {
    type Target = InstitutionConference;

    fn id(&self) -> i64 {
        self.id
    }

    fn language_code(&self) -> Option<&str> {
        self.language_code.as_deref()
    }

    fn merge_into(self, stored: &mut InstitutionConference) {
        merge(&mut stored.language_code, self.language_code);
        merge(&mut stored.conference_title, self.conference_title);
        merge(&mut stored.link, self.link);
        merge(&mut stored.date_of_conference, self.date_of_conference);
        merge(&mut stored.description, self.description);
    }
}

// =============================================================================
// Licence
// =============================================================================

/// An operating licence. `date_end` is `None` for open-ended licences.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct InstitutionLicence {
    pub id: i64,
    pub institution_id: i64,
    pub language_code: String,
    pub licence_type: String,
    pub licence_provider: String,
    pub date_start: NaiveDate,
    pub date_end: Option<NaiveDate>,
    pub link: String,
    pub created_at: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct InstitutionLicencePatch {
    pub id: i64,
    pub language_code: Option<String>,
    pub licence_type: Option<String>,
    pub licence_provider: Option<String>,
    pub date_start: Option<NaiveDate>,
    #[serde(deserialize_with = "double_option")]
    pub date_end: Option<Option<NaiveDate>>,
    pub link: Option<String>,
}

impl Patch for InstitutionLicencePatch {
    type Target = InstitutionLicence;

    fn id(&self) -> i64 {
        self.id
    }

    fn language_code(&self) -> Option<&str> {
        self.language_code.as_deref()
    }

    fn merge_into(self, stored: &mut InstitutionLicence) {
        merge(&mut stored.language_code, self.language_code);
        merge(&mut stored.licence_type, self.licence_type);
        merge(&mut stored.licence_provider, self.licence_provider);
        merge(&mut stored.date_start, self.date_start);
        merge(&mut stored.date_end, self.date_end);
        merge(&mut stored.link, self.link);
    }
}

// =============================================================================
// Magazine
// =============================================================================

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct InstitutionMagazine {
    pub id: i64,
    pub institution_id: i64,
    pub language_code: String,
    pub name: String,
    pub link: String,
    pub created_at: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct InstitutionMagazinePatch {
    pub id: i64,
    pub language_code: Option<String>,
    pub name: Option<String>,
    pub link: Option<String>,
}

impl Patch for InstitutionMagazinePatch {
    type Target = InstitutionMagazine;

    fn id(&self) -> i64 {
        self.id
    }

    fn language_code(&self) -> Option<&str> {
        self.language_code.as_deref()
    }

    fn merge_into(self, stored: &mut InstitutionMagazine) {
        merge(&mut stored.language_code, self.language_code);
        merge(&mut stored.name, self.name);
        merge(&mut stored.link, self.link);
    }
}

// =============================================================================
// Main Research Direction
// =============================================================================

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct InstitutionMainResearchDirection {
    pub id: i64,
    pub institution_id: i64,
    pub language_code: String,
    pub research_direction_title: String,
    pub discipline: String,
    pub area_of_research: String,
    pub created_at: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct InstitutionMainResearchDirectionPatch {
    pub id: i64,
    pub language_code: Option<String>,
    pub research_direction_title: Option<String>,
    pub discipline: Option<String>,
    pub area_of_research: Option<String>,
}

impl Patch for InstitutionMainResearchDirectionPatch {
    type Target = InstitutionMainResearchDirection;

    fn id(&self) -> i64 {
        self.id
    }

    fn language_code(&self) -> Option<&str> {
        self.language_code.as_deref()
    }

    fn merge_into(self, stored: &mut InstitutionMainResearchDirection) {
        merge(&mut stored.language_code, self.language_code);
        merge(&mut stored.research_direction_title, self.research_direction_title);
        merge(&mut stored.discipline, self.discipline);
        merge(&mut stored.area_of_research, self.area_of_research);
    }
}

// =============================================================================
// Partnership
// =============================================================================

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct InstitutionPartnership {
    pub id: i64,
    pub institution_id: i64,
    pub language_code: String,
    pub partner_name: String,
    pub partner_type: String,
    pub date_of_contract: NaiveDate,
    pub link_to_partner: String,
    pub goal: String,
    pub created_at: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct InstitutionPartnershipPatch {
    pub id: i64,
    pub language_code: Option<String>,
    pub partner_name: Option<String>,
    pub partner_type: Option<String>,
    pub date_of_contract: Option<NaiveDate>,
    pub link_to_partner: Option<String>,
    pub goal: Option<String>,
}

impl Patch for InstitutionPartnershipPatch {
    type Target = InstitutionPartnership;

    fn id(&self) -> i64 {
        self.id
    }

    fn language_code(&self) -> Option<&str> {
        self.language_code.as_deref()
    }

    fn merge_into(self, stored: &mut InstitutionPartnership) {
        merge(&mut stored.language_code, self.language_code);
        merge(&mut stored.partner_name, self.partner_name);
        merge(&mut stored.partner_type, self.partner_type);
        merge(&mut stored.date_of_contract, self.date_of_contract);
        merge(&mut stored.link_to_partner, self.link_to_partner);
        merge(&mut stored.goal, self.goal);
    }
}

// =============================================================================
// Patent
// =============================================================================

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct InstitutionPatent {
    pub id: i64,
    pub institution_id: i64,
    pub language_code: String,
    pub patent_title: String,
    pub discipline: String,
    pub description: String,
    pub implemented_in: String,
    pub link_to_patent_file: String,
    pub created_at: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct InstitutionPatentPatch {
    pub id: i64,
    pub language_code: Option<String>,
    pub patent_title: Option<String>,
    pub discipline: Option<String>,
    pub description: Option<String>,
    pub implemented_in: Option<String>,
    pub link_to_patent_file: Option<String>,
}

impl Patch for InstitutionPatentPatch {
    type Target = InstitutionPatent;

    fn id(&self) -> i64 {
        self.id
    }

    fn language_code(&self) -> Option<&str> {
        self.language_code.as_deref()
    }

    fn merge_into(self, stored: &mut InstitutionPatent) {
        merge(&mut stored.language_code, self.language_code);
        merge(&mut stored.patent_title, self.patent_title);
        merge(&mut stored.discipline, self.discipline);
        merge(&mut stored.description, self.description);
        merge(&mut stored.implemented_in, self.implemented_in);
        merge(&mut stored.link_to_patent_file, self.link_to_patent_file);
    }
}

// =============================================================================
// Project + Partners (aggregate)
// =============================================================================

/// A funded research project with its partner organisations.
///
/// ## Aggregate Rule
/// A project is never persisted without its partners and a partner never
/// outlives or changes its project. Both are written in one transaction.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct InstitutionProject {
    pub id: i64,
    pub institution_id: i64,
    pub language_code: String,
    pub project_type: String,
    pub project_title: String,
    pub date_start: NaiveDate,
    pub date_end: Option<NaiveDate>,
    /// Funding amount in the smallest currency unit.
    pub fund: i64,
    pub institution_role: String,
    pub coordinator: String,
    /// Loaded separately; not a column of the project row.
    #[cfg_attr(feature = "sqlx", sqlx(skip))]
    #[serde(default)]
    pub partners: Vec<InstitutionProjectPartner>,
    pub created_at: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,
}

impl InstitutionProject {
    /// Checks the whole aggregate before any store call.
    ///
    /// Partners may leave `project_id` at zero; it is assigned from the new
    /// project row inside the create transaction.
    pub fn validate_new(&self) -> ValidationResult<()> {
        Localized::validate_new(self)?;
        crate::validation::validate_not_empty("partners", &self.partners)?;
        for partner in &self.partners {
            crate::validation::validate_language_code(&partner.language_code)?;
        }
        Ok(())
    }
}

/// A partner organisation on an [`InstitutionProject`].
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct InstitutionProjectPartner {
    pub id: i64,
    pub project_id: i64,
    pub language_code: String,
    pub partner_type: String,
    pub partner_name: String,
    pub link_to_partner: String,
    pub created_at: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct InstitutionProjectPatch {
    pub id: i64,
    pub language_code: Option<String>,
    pub project_type: Option<String>,
    pub project_title: Option<String>,
    pub date_start: Option<NaiveDate>,
    #[serde(deserialize_with = "double_option")]
    pub date_end: Option<Option<NaiveDate>>,
    pub fund: Option<i64>,
    pub institution_role: Option<String>,
    pub coordinator: Option<String>,
    /// Partner updates applied in the same transaction as the project.
    pub partners: Vec<InstitutionProjectPartnerPatch>,
}

impl Patch for InstitutionProjectPatch {
    type Target = InstitutionProject;

    fn id(&self) -> i64 {
        self.id
    }

    fn language_code(&self) -> Option<&str> {
        self.language_code.as_deref()
    }

    /// Validates the project patch and every partner patch it carries.
    fn validate(&self) -> ValidationResult<()> {
        validate_id("id", self.id)?;
        if let Some(code) = self.language_code.as_deref() {
            crate::validation::validate_language_code(code)?;
        }
        for partner in &self.partners {
            validate_id("partner id", partner.id)?;
            if let Some(code) = partner.language_code.as_deref() {
                crate::validation::validate_language_code(code)?;
            }
        }
        Ok(())
    }

    /// Merges project columns only. Partner patches are merged one by one
    /// against their own stored rows by the repository.
    fn merge_into(self, stored: &mut InstitutionProject) {
        merge(&mut stored.language_code, self.language_code);
        merge(&mut stored.project_type, self.project_type);
        merge(&mut stored.project_title, self.project_title);
        merge(&mut stored.date_start, self.date_start);
        merge(&mut stored.date_end, self.date_end);
        merge(&mut stored.fund, self.fund);
        merge(&mut stored.institution_role, self.institution_role);
        merge(&mut stored.coordinator, self.coordinator);
    }
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct InstitutionProjectPartnerPatch {
    pub id: i64,
    pub language_code: Option<String>,
    pub partner_type: Option<String>,
    pub partner_name: Option<String>,
    pub link_to_partner: Option<String>,
}

impl Patch for InstitutionProjectPartnerPatch {
    type Target = InstitutionProjectPartner;

    fn id(&self) -> i64 {
        self.id
    }

    fn language_code(&self) -> Option<&str> {
        self.language_code.as_deref()
    }

    fn merge_into(self, stored: &mut InstitutionProjectPartner) {
        merge(&mut stored.language_code, self.language_code);
        merge(&mut stored.partner_type, self.partner_type);
        merge(&mut stored.partner_name, self.partner_name);
        merge(&mut stored.link_to_partner, self.link_to_partner);
    }
}

// =============================================================================
// Ranking
// =============================================================================

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct InstitutionRanking {
    pub id: i64,
    pub institution_id: i64,
    pub language_code: String,
    pub ranking_title: String,
    pub ranking_type: String,
    pub date_of_ranking: NaiveDate,
    pub description: String,
    pub link_to_ranking_file: String,
    pub created_at: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct InstitutionRankingPatch {
    pub id: i64,
    pub language_code: Option<String>,
    pub ranking_title: Option<String>,
    pub ranking_type: Option<String>,
    pub date_of_ranking: Option<NaiveDate>,
    pub description: Option<String>,
    pub link_to_ranking_file: Option<String>,
}

impl Patch for InstitutionRankingPatch {
    type Target = InstitutionRanking;

    fn id(&self) -> i64 {
        self.id
    }

    fn language_code(&self) -> Option<&str> {
        self.language_code.as_deref()
    }

    fn merge_into(self, stored: &mut InstitutionRanking) {
        merge(&mut stored.language_code, self.language_code);
        merge(&mut stored.ranking_title, self.ranking_title);
        merge(&mut stored.ranking_type, self.ranking_type);
        merge(&mut stored.date_of_ranking, self.date_of_ranking);
        merge(&mut stored.description, self.description);
        merge(&mut stored.link_to_ranking_file, self.link_to_ranking_file);
    }
}

// =============================================================================
// Research Support Infrastructure
// =============================================================================

/// Shared equipment or facilities offered to outside researchers.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct InstitutionResearchSupportInfrastructure {
    pub id: i64,
    pub institution_id: i64,
    pub language_code: String,
    pub research_infrastructure_title: String,
    pub type_of_research_infrastructure: String,
    pub tariff: String,
    pub link: String,
    pub created_at: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct InstitutionResearchSupportInfrastructurePatch {
    pub id: i64,
    pub language_code: Option<String>,
    pub research_infrastructure_title: Option<String>,
    pub type_of_research_infrastructure: Option<String>,
    pub tariff: Option<String>,
    pub link: Option<String>,
}

impl Patch for InstitutionResearchSupportInfrastructurePatch {
    type Target = InstitutionResearchSupportInfrastructure;

    fn id(&self) -> i64 {
        self.id
    }

    fn language_code(&self) -> Option<&str> {
        self.language_code.as_deref()
    }

    fn merge_into(self, stored: &mut InstitutionResearchSupportInfrastructure) {
        merge(&mut stored.language_code, self.language_code);
        merge(
            &mut stored.research_infrastructure_title,
            self.research_infrastructure_title,
        );
        merge(
            &mut stored.type_of_research_infrastructure,
            self.type_of_research_infrastructure,
        );
        merge(&mut stored.tariff, self.tariff);
        merge(&mut stored.link, self.link);
    }
}

// =============================================================================
// Social
// =============================================================================

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct InstitutionSocial {
    pub id: i64,
    pub institution_id: i64,
    pub language_code: String,
    pub link_name: String,
    pub link: String,
    pub created_at: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct InstitutionSocialPatch {
    pub id: i64,
    pub language_code: Option<String>,
    pub link_name: Option<String>,
    pub link: Option<String>,
}

impl Patch for InstitutionSocialPatch {
    type Target = InstitutionSocial;

    fn id(&self) -> i64 {
        self.id
    }

    fn language_code(&self) -> Option<&str> {
        self.language_code.as_deref()
    }

    fn merge_into(self, stored: &mut InstitutionSocial) {
        merge(&mut stored.language_code, self.language_code);
        merge(&mut stored.link_name, self.link_name);
        merge(&mut stored.link, self.link);
    }
}

// =============================================================================
// Localized impls
// =============================================================================

macro_rules! localized_under_institution {
    ($($record:ty),+ $(,)?) => {
        $(
            impl Localized for $record {
                const PARENT_FIELD: &'static str = "institution_id";

                fn parent_id(&self) -> i64 {
                    self.institution_id
                }

                fn language_code(&self) -> &str {
                    &self.language_code
                }
            }
        )+
    };
}

localized_under_institution!(
    InstitutionDetails,
    InstitutionAccreditation,
    InstitutionAchievement,
    InstitutionConference,
    InstitutionLicence,
    InstitutionMagazine,
    InstitutionMainResearchDirection,
    InstitutionPartnership,
    InstitutionPatent,
    InstitutionProject,
    InstitutionRanking,
    InstitutionResearchSupportInfrastructure,
    InstitutionSocial,
);

impl Localized for InstitutionProjectPartner {
    const PARENT_FIELD: &'static str = "project_id";

    fn parent_id(&self) -> i64 {
        self.project_id
    }

    fn language_code(&self) -> &str {
        &self.language_code
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn stored_achievement() -> InstitutionAchievement {
        InstitutionAchievement {
            id: 7,
            institution_id: 1,
            language_code: "en".to_string(),
            achievement_title: "Best lab".to_string(),
            date_of_achievement: NaiveDate::from_ymd_opt(2019, 5, 1).unwrap(),
            given_by: "Ministry".to_string(),
            link_to_achievement_document: "https://example.tj/doc.pdf".to_string(),
            description: "old text".to_string(),
            ..Default::default()
        }
    }

    #[test]
    fn test_achievement_merge_retains_unset_fields() {
        let mut stored = stored_achievement();
        let patch = InstitutionAchievementPatch {
            id: 7,
            given_by: None,
            description: Some("new text".to_string()),
            ..Default::default()
        };

        patch.merge_into(&mut stored);

        assert_eq!(stored.given_by, "Ministry");
        assert_eq!(stored.description, "new text");
        assert_eq!(stored.achievement_title, "Best lab");
    }

    #[test]
    fn test_empty_patch_is_a_no_op() {
        let mut stored = stored_achievement();
        let before = stored.clone();

        InstitutionAchievementPatch {
            id: 7,
            ..Default::default()
        }
        .merge_into(&mut stored);

        assert_eq!(stored, before);
    }

    #[test]
    fn test_sparse_json_patch() {
        let patch: InstitutionAchievementPatch =
            serde_json::from_str(r#"{"id": 7, "description": "new text"}"#).unwrap();
        assert_eq!(patch.id, 7);
        assert_eq!(patch.given_by, None);
        assert_eq!(patch.description.as_deref(), Some("new text"));
    }

    #[test]
    fn test_details_merge_keeps_type_and_title_independent() {
        let mut stored = InstitutionDetails {
            id: 3,
            institution_title: "Institute of Physics".to_string(),
            institution_type: "State".to_string(),
            ..Default::default()
        };
        InstitutionDetailsPatch {
            id: 3,
            institution_title: Some("Physics Institute".to_string()),
            ..Default::default()
        }
        .merge_into(&mut stored);

        assert_eq!(stored.institution_title, "Physics Institute");
        assert_eq!(stored.institution_type, "State");
    }

    #[test]
    fn test_licence_date_end_can_be_cleared() {
        let mut stored = InstitutionLicence {
            id: 2,
            date_end: NaiveDate::from_ymd_opt(2030, 1, 1),
            ..Default::default()
        };
        InstitutionLicencePatch {
            id: 2,
            date_end: Some(None),
            ..Default::default()
        }
        .merge_into(&mut stored);

        assert_eq!(stored.date_end, None);
    }

    #[test]
    fn test_patch_validation() {
        let patch = InstitutionAchievementPatch::default();
        assert!(patch.validate().is_err());

        let patch = InstitutionAchievementPatch {
            id: 7,
            language_code: Some("fr".to_string()),
            ..Default::default()
        };
        assert!(matches!(
            patch.validate().unwrap_err(),
            ValidationError::NotAllowed { .. }
        ));
    }

    #[test]
    fn test_project_requires_partners() {
        let project = InstitutionProject {
            institution_id: 1,
            language_code: "en".to_string(),
            ..Default::default()
        };
        assert_eq!(
            project.validate_new().unwrap_err(),
            ValidationError::EmptyCollection {
                field: "partners".to_string()
            }
        );
    }

    #[test]
    fn test_project_rejects_partner_with_bad_language() {
        let project = InstitutionProject {
            institution_id: 1,
            language_code: "en".to_string(),
            partners: vec![InstitutionProjectPartner {
                language_code: "xx".to_string(),
                ..Default::default()
            }],
            ..Default::default()
        };
        assert!(project.validate_new().is_err());
    }

    #[test]
    fn test_project_patch_requires_partner_ids() {
        let patch = InstitutionProjectPatch {
            id: 4,
            partners: vec![InstitutionProjectPartnerPatch::default()],
            ..Default::default()
        };
        assert_eq!(
            patch.validate().unwrap_err(),
            ValidationError::must_be_positive("partner id", 0)
        );
    }

    #[test]
    fn test_project_patch_reports_partner_id_under_one_name() {
        let patch = InstitutionProjectPatch {
            id: 4,
            partners: vec![
                InstitutionProjectPartnerPatch {
                    id: 9,
                    ..Default::default()
                },
                InstitutionProjectPartnerPatch {
                    id: -3,
                    language_code: Some("xx".to_string()),
                    ..Default::default()
                },
            ],
            ..Default::default()
        };
        assert_eq!(
            patch.validate().unwrap_err(),
            ValidationError::must_be_positive("partner id", -3)
        );

        let patch = InstitutionProjectPatch {
            id: 4,
            partners: vec![InstitutionProjectPartnerPatch {
                id: 9,
                language_code: Some("xx".to_string()),
                ..Default::default()
            }],
            ..Default::default()
        };
        assert!(matches!(
            patch.validate().unwrap_err(),
            ValidationError::NotAllowed { .. }
        ));
    }

    #[test]
    fn test_institution_year_must_be_positive() {
        assert!(Institution::default().validate_new().is_err());
        let institution = Institution {
            year_of_establishment: 1951,
            ..Default::default()
        };
        assert!(institution.validate_new().is_ok());
    }
}
