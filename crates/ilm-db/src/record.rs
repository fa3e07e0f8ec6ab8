//! # Table Mapping
//!
//! Binds each `ilm-core` record to its table. The generic statements in
//! [`crate::queries`] are built from this mapping, so a record family needs
//! no hand-written SQL beyond its migration.
//!
//! ```text
//! InstitutionAchievement ──► table   "institution_achievements"
//!                            columns [institution_id, language_code,
//!                                     achievement_title, …]
//!                            id / created_at / updated_at  (store-assigned)
//! ```

use chrono::{DateTime, Utc};
use sqlx::query::QueryAs;
use sqlx::sqlite::{SqliteArguments, SqliteRow};
use sqlx::{FromRow, Sqlite};

use ilm_core::*;

/// Query returning the store-assigned identity of a written row.
pub type StampQuery<'q> = QueryAs<'q, Sqlite, Stamp, SqliteArguments<'q>>;

/// Store-assigned identity and timestamps, read back with `RETURNING`.
#[derive(Debug, Clone, PartialEq, FromRow)]
pub struct Stamp {
    pub id: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A record persisted in one table.
pub trait Record: for<'r> FromRow<'r, SqliteRow> + Send + Sync + Unpin + 'static {
    /// Entity name used in errors and logs.
    const ENTITY: &'static str;

    const TABLE: &'static str;

    /// Writable columns, in bind order. Excludes `id` and the timestamps.
    const COLUMNS: &'static [&'static str];

    fn id(&self) -> i64;

    /// Binds the values of [`Record::COLUMNS`], in order.
    fn bind_columns<'q>(&'q self, query: StampQuery<'q>) -> StampQuery<'q>;

    /// Copies the store-assigned identity back onto the record.
    fn apply_stamp(&mut self, stamp: Stamp);
}

/// A localized record with no children of its own, served by
/// [`crate::repository::LocalizedRepository`].
///
/// Aggregates (`InstitutionProject`, `EmployeeMainResearchArea`) are left
/// out so their child rules cannot be bypassed.
pub trait LocalizedRecord: Record + Localized {}

macro_rules! impl_record {
    ($record:ty, $table:literal, [$($column:ident),+ $(,)?]) => {
        impl Record for $record {
            const ENTITY: &'static str = stringify!($record);
            const TABLE: &'static str = $table;
            const COLUMNS: &'static [&'static str] = &[$(stringify!($column)),+];

            fn id(&self) -> i64 {
                self.id
            }

            fn bind_columns<'q>(&'q self, query: StampQuery<'q>) -> StampQuery<'q> {
                query$(.bind(&self.$column))+
            }

            fn apply_stamp(&mut self, stamp: Stamp) {
                self.id = stamp.id;
                self.created_at = Some(stamp.created_at);
                self.updated_at = Some(stamp.updated_at);
            }
        }
    };
}

// =============================================================================
// Institution
// =============================================================================

impl_record!(
    Institution,
    "institutions",
    [year_of_establishment, email, fax, phone_number, mail_index]
);

impl_record!(
    InstitutionDetails,
    "institution_details",
    [
        institution_id,
        language_code,
        institution_title,
        institution_type,
        legal_status,
        mission,
        founder,
        legal_address,
        factual_address,
        city,
    ]
);

impl_record!(
    InstitutionAccreditation,
    "institution_accreditations",
    [institution_id, language_code, accreditation_type, given_by]
);

impl_record!(
    InstitutionAchievement,
    "institution_achievements",
    [
        institution_id,
        language_code,
        achievement_title,
        date_of_achievement,
        given_by,
        link_to_achievement_document,
        description,
    ]
);

impl_record!(
    InstitutionConference,
    "institution_conferences",
    [
        institution_id,
        language_code,
        conference_title,
        link,
        date_of_conference,
        description,
    ]
);

impl_record!(
    InstitutionLicence,
    "institution_licences",
    [
        institution_id,
        language_code,
        licence_type,
        licence_provider,
        date_start,
        date_end,
        link,
    ]
);

impl_record!(
    InstitutionMagazine,
    "institution_magazines",
    [institution_id, language_code, name, link]
);

impl_record!(
    InstitutionMainResearchDirection,
    "institution_main_research_directions",
    [
        institution_id,
        language_code,
        research_direction_title,
        discipline,
        area_of_research,
    ]
);

impl_record!(
    InstitutionPartnership,
    "institution_partnerships",
    [
        institution_id,
        language_code,
        partner_name,
        partner_type,
        date_of_contract,
        link_to_partner,
        goal,
    ]
);

impl_record!(
    InstitutionPatent,
    "institution_patents",
    [
        institution_id,
        language_code,
        patent_title,
        discipline,
        description,
        implemented_in,
        link_to_patent_file,
    ]
);

impl_record!(
    InstitutionProject,
    "institution_projects",
    [
        institution_id,
        language_code,
        project_type,
        project_title,
        date_start,
        date_end,
        fund,
        institution_role,
        coordinator,
    ]
);

impl_record!(
    InstitutionProjectPartner,
    "institution_project_partners",
    [project_id, language_code, partner_type, partner_name, link_to_partner]
);

impl_record!(
    InstitutionRanking,
    "institution_rankings",
    [
        institution_id,
        language_code,
        ranking_title,
        ranking_type,
        date_of_ranking,
        description,
        link_to_ranking_file,
    ]
);

impl_record!(
    InstitutionResearchSupportInfrastructure,
    "institution_research_support_infrastructures",
    [
        institution_id,
        language_code,
        research_infrastructure_title,
        type_of_research_infrastructure,
        tariff,
        link,
    ]
);

impl_record!(
    InstitutionSocial,
    "institution_socials",
    [institution_id, language_code, link_name, link]
);

// =============================================================================
// Employee
// =============================================================================

impl_record!(Employee, "employees", [unique_id]);

impl_record!(
    EmployeeDegree,
    "employee_degrees",
    [
        employee_id,
        language_code,
        degree_level,
        university_name,
        speciality,
        date_start,
        date_end,
        given_by,
        date_degree_received,
    ]
);

impl_record!(
    EmployeeDetails,
    "employee_details",
    [employee_id, language_code, surname, name, patronymic_name]
);

impl_record!(
    EmployeeMainResearchArea,
    "employee_main_research_areas",
    [employee_id, language_code, area, discipline]
);

impl_record!(
    ResearchAreaKeyTopic,
    "research_area_key_topics",
    [main_research_area_id, key_topic_title]
);

impl_record!(
    EmployeeParticipationInEvent,
    "employee_participation_in_events",
    [employee_id, language_code, event_title, event_date]
);

impl_record!(
    EmployeeParticipationInProfessionalCommunity,
    "employee_participation_in_professional_communities",
    [
        employee_id,
        language_code,
        professional_community_title,
        role_in_professional_community,
    ]
);

impl_record!(
    EmployeePatent,
    "employee_patents",
    [employee_id, language_code, patent_title, description]
);

impl_record!(
    EmployeePublication,
    "employee_publications",
    [employee_id, language_code, publication_title, link_to_publication]
);

impl_record!(
    EmployeeRefresherCourse,
    "employee_refresher_courses",
    [employee_id, language_code, course_title, date_start, date_end]
);

impl_record!(
    EmployeeResearchActivity,
    "employee_research_activities",
    [
        employee_id,
        language_code,
        research_activity_title,
        employee_position,
    ]
);

impl_record!(
    EmployeeScientificAward,
    "employee_scientific_awards",
    [employee_id, language_code, scientific_award_title, given_by]
);

impl_record!(
    EmployeeSocial,
    "employee_socials",
    [employee_id, language_code, social_name, link_to_social]
);

impl_record!(
    EmployeeWorkExperience,
    "employee_work_experiences",
    [
        employee_id,
        language_code,
        workplace,
        job_title,
        description,
        date_start,
        date_end,
    ]
);

macro_rules! impl_localized_record {
    ($($record:ty),+ $(,)?) => {
        $(impl LocalizedRecord for $record {})+
    };
}

impl_localized_record!(
    InstitutionDetails,
    InstitutionAccreditation,
    InstitutionAchievement,
    InstitutionConference,
    InstitutionLicence,
    InstitutionMagazine,
    InstitutionMainResearchDirection,
    InstitutionPartnership,
    InstitutionPatent,
    InstitutionRanking,
    InstitutionResearchSupportInfrastructure,
    InstitutionSocial,
    EmployeeDegree,
    EmployeeDetails,
    EmployeeParticipationInEvent,
    EmployeeParticipationInProfessionalCommunity,
    EmployeePatent,
    EmployeePublication,
    EmployeeRefresherCourse,
    EmployeeResearchActivity,
    EmployeeScientificAward,
    EmployeeSocial,
    EmployeeWorkExperience,
);

// =============================================================================
// Users
// =============================================================================

impl_record!(User, "users", [email, password_hash, role]);

impl_record!(
    UserSession,
    "user_sessions",
    [user_id, refresh_token, expires_at]
);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_columns_follow_field_names() {
        assert_eq!(InstitutionAchievement::ENTITY, "InstitutionAchievement");
        assert_eq!(InstitutionAchievement::TABLE, "institution_achievements");
        assert_eq!(InstitutionAchievement::COLUMNS[0], "institution_id");
        assert_eq!(InstitutionAchievement::COLUMNS.len(), 7);
        assert!(!InstitutionProject::COLUMNS.contains(&"partners"));
        assert!(!EmployeeMainResearchArea::COLUMNS.contains(&"key_topics"));
    }

    #[test]
    fn test_apply_stamp() {
        let now = Utc::now();
        let mut social = InstitutionSocial::default();
        social.apply_stamp(Stamp {
            id: 12,
            created_at: now,
            updated_at: now,
        });
        assert_eq!(social.id(), 12);
        assert_eq!(social.created_at, Some(now));
    }
}
