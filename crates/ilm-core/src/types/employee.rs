//! # Employee Records
//!
//! The `Employee` aggregate root and its localized child records. Shapes
//! mirror the institution side: every child carries `employee_id` and a
//! `language_code`.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::patch::{double_option, merge, Patch};
use crate::validation::{validate_id, validate_required, Localized, ValidationResult};

// =============================================================================
// Employee (root)
// =============================================================================

/// A researcher. Identified externally by `unique_id` (e.g. a staff number).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct Employee {
    pub id: i64,
    pub unique_id: String,
    pub created_at: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,
}

impl Employee {
    pub fn validate_new(&self) -> ValidationResult<()> {
        validate_required("unique_id", &self.unique_id)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct EmployeePatch {
    pub id: i64,
    pub unique_id: Option<String>,
}

impl Patch for EmployeePatch {
    type Target = Employee;

    fn id(&self) -> i64 {
        self.id
    }

    fn validate(&self) -> ValidationResult<()> {
        validate_id("id", self.id)?;
        if let Some(unique_id) = self.unique_id.as_deref() {
            validate_required("unique_id", unique_id)?;
        }
        Ok(())
    }

    fn merge_into(self, stored: &mut Employee) {
        merge(&mut stored.unique_id, self.unique_id);
    }
}

// =============================================================================
// Degree
// =============================================================================

/// An academic degree. `date_end` is `None` while studies are ongoing.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct EmployeeDegree {
    pub id: i64,
    pub employee_id: i64,
    pub language_code: String,
    pub degree_level: String,
    pub university_name: String,
    pub speciality: String,
    pub date_start: NaiveDate,
    pub date_end: Option<NaiveDate>,
    pub given_by: String,
    pub date_degree_received: Option<NaiveDate>,
    pub created_at: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct EmployeeDegreePatch {
    pub id: i64,
    pub language_code: Option<String>,
    pub degree_level: Option<String>,
    pub university_name: Option<String>,
    pub speciality: Option<String>,
    pub date_start: Option<NaiveDate>,
    #[serde(deserialize_with = "double_option")]
    pub date_end: Option<Option<NaiveDate>>,
    pub given_by: Option<String>,
    #[serde(deserialize_with = "double_option")]
    pub date_degree_received: Option<Option<NaiveDate>>,
}

impl Patch for EmployeeDegreePatch {
    type Target = EmployeeDegree;

    fn id(&self) -> i64 {
        self.id
    }

    fn language_code(&self) -> Option<&str> {
        self.language_code.as_deref()
    }

    fn merge_into(self, stored: &mut EmployeeDegree) {
        merge(&mut stored.language_code, self.language_code);
        merge(&mut stored.degree_level, self.degree_level);
        merge(&mut stored.university_name, self.university_name);
        merge(&mut stored.speciality, self.speciality);
        merge(&mut stored.date_start, self.date_start);
        merge(&mut stored.date_end, self.date_end);
        merge(&mut stored.given_by, self.given_by);
        merge(&mut stored.date_degree_received, self.date_degree_received);
    }
}

// =============================================================================
// Details
// =============================================================================

/// Localized name of an employee. At most one per language.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct EmployeeDetails {
    pub id: i64,
    pub employee_id: i64,
    pub language_code: String,
    pub surname: String,
    pub name: String,
    pub patronymic_name: String,
    pub created_at: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct EmployeeDetailsPatch {
    pub id: i64,
    pub language_code: Option<String>,
    pub surname: Option<String>,
    pub name: Option<String>,
    pub patronymic_name: Option<String>,
}

impl Patch for EmployeeDetailsPatch {
    type Target = EmployeeDetails;

    fn id(&self) -> i64 {
        self.id
    }

    fn language_code(&self) -> Option<&str> {
        self.language_code.as_deref()
    }

    fn merge_into(self, stored: &mut EmployeeDetails) {
        merge(&mut stored.language_code, self.language_code);
        merge(&mut stored.surname, self.surname);
        merge(&mut stored.name, self.name);
        merge(&mut stored.patronymic_name, self.patronymic_name);
    }
}

// =============================================================================
// Main Research Area + Key Topics (aggregate)
// =============================================================================

/// A research area with the key topics the employee works on inside it.
///
/// Written together with its topics, exactly like a project and its partners.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct EmployeeMainResearchArea {
    pub id: i64,
    pub employee_id: i64,
    pub language_code: String,
    pub area: String,
    pub discipline: String,
    #[cfg_attr(feature = "sqlx", sqlx(skip))]
    #[serde(default)]
    pub key_topics: Vec<ResearchAreaKeyTopic>,
    pub created_at: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,
}

impl EmployeeMainResearchArea {
    pub fn validate_new(&self) -> ValidationResult<()> {
        Localized::validate_new(self)?;
        crate::validation::validate_not_empty("key_topics", &self.key_topics)
    }
}

/// A key topic inside a research area. Shares the area's language.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct ResearchAreaKeyTopic {
    pub id: i64,
    pub main_research_area_id: i64,
    pub key_topic_title: String,
    pub created_at: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct EmployeeMainResearchAreaPatch {
    pub id: i64,
    pub language_code: Option<String>,
    pub area: Option<String>,
    pub discipline: Option<String>,
    pub key_topics: Vec<ResearchAreaKeyTopicPatch>,
}

impl Patch for EmployeeMainResearchAreaPatch {
    type Target = EmployeeMainResearchArea;

    fn id(&self) -> i64 {
        self.id
    }

    fn language_code(&self) -> Option<&str> {
        self.language_code.as_deref()
    }

    fn validate(&self) -> ValidationResult<()> {
        validate_id("id", self.id)?;
        if let Some(code) = self.language_code.as_deref() {
            crate::validation::validate_language_code(code)?;
        }
        for topic in &self.key_topics {
            validate_id("key topic id", topic.id)?;
        }
        Ok(())
    }

    fn merge_into(self, stored: &mut EmployeeMainResearchArea) {
        merge(&mut stored.language_code, self.language_code);
        merge(&mut stored.area, self.area);
        merge(&mut stored.discipline, self.discipline);
    }
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct ResearchAreaKeyTopicPatch {
    pub id: i64,
    pub key_topic_title: Option<String>,
}

impl Patch for ResearchAreaKeyTopicPatch {
    type Target = ResearchAreaKeyTopic;

    fn id(&self) -> i64 {
        self.id
    }

    fn merge_into(self, stored: &mut ResearchAreaKeyTopic) {
        merge(&mut stored.key_topic_title, self.key_topic_title);
    }
}

// =============================================================================
// Participation In Event
// =============================================================================

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct EmployeeParticipationInEvent {
    pub id: i64,
    pub employee_id: i64,
    pub language_code: String,
    pub event_title: String,
    pub event_date: NaiveDate,
    pub created_at: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct EmployeeParticipationInEventPatch {
    pub id: i64,
    pub language_code: Option<String>,
    pub event_title: Option<String>,
    pub event_date: Option<NaiveDate>,
}

impl Patch for EmployeeParticipationInEventPatch {
    type Target = EmployeeParticipationInEvent;

    fn id(&self) -> i64 {
        self.id
    }

    fn language_code(&self) -> Option<&str> {
        self.language_code.as_deref()
    }

    fn merge_into(self, stored: &mut EmployeeParticipationInEvent) {
        merge(&mut stored.language_code, self.language_code);
        merge(&mut stored.event_title, self.event_title);
        merge(&mut stored.event_date, self.event_date);
    }
}

// =============================================================================
// Participation In Professional Community
// =============================================================================

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct EmployeeParticipationInProfessionalCommunity {
    pub id: i64,
    pub employee_id: i64,
    pub language_code: String,
    pub professional_community_title: String,
    pub role_in_professional_community: String,
    pub created_at: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct EmployeeParticipationInProfessionalCommunityPatch {
    pub id: i64,
    pub language_code: Option<String>,
    pub professional_community_title: Option<String>,
    pub role_in_professional_community: Option<String>,
}

impl Patch for EmployeeParticipationInProfessionalCommunityPatch {
    type Target = EmployeeParticipationInProfessionalCommunity;

    fn id(&self) -> i64 {
        self.id
    }

    fn language_code(&self) -> Option<&str> {
        self.language_code.as_deref()
    }

    fn merge_into(self, stored: &mut EmployeeParticipationInProfessionalCommunity) {
        merge(&mut stored.language_code, self.language_code);
        merge(
            &mut stored.professional_community_title,
            self.professional_community_title,
        );
        merge(
            &mut stored.role_in_professional_community,
            self.role_in_professional_community,
        );
    }
}

// =============================================================================
// Patent
// =============================================================================

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct EmployeePatent {
    pub id: i64,
    pub employee_id: i64,
    pub language_code: String,
    pub patent_title: String,
    pub description: String,
    pub created_at: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct EmployeePatentPatch {
    pub id: i64,
    pub language_code: Option<String>,
    pub patent_title: Option<String>,
    pub description: Option<String>,
}

impl Patch for EmployeePatentPatch {
    type Target = EmployeePatent;

    fn id(&self) -> i64 {
        self.id
    }

    fn language_code(&self) -> Option<&str> {
        self.language_code.as_deref()
    }

    fn merge_into(self, stored: &mut EmployeePatent) {
        merge(&mut stored.language_code, self.language_code);
        merge(&mut stored.patent_title, self.patent_title);
        merge(&mut stored.description, self.description);
    }
}

// =============================================================================
// Publication
// =============================================================================

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct EmployeePublication {
    pub id: i64,
    pub employee_id: i64,
    pub language_code: String,
    pub publication_title: String,
    pub link_to_publication: String,
    pub created_at: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct EmployeePublicationPatch {
    pub id: i64,
    pub language_code: Option<String>,
    pub publication_title: Option<String>,
    pub link_to_publication: Option<String>,
}

impl Patch for EmployeePublicationPatch {
    type Target = EmployeePublication;

    fn id(&self) -> i64 {
        self.id
    }

    fn language_code(&self) -> Option<&str> {
        self.language_code.as_deref()
    }

    fn merge_into(self, stored: &mut EmployeePublication) {
        merge(&mut stored.language_code, self.language_code);
        merge(&mut stored.publication_title, self.publication_title);
        merge(&mut stored.link_to_publication, self.link_to_publication);
    }
}

// =============================================================================
// Refresher Course
// =============================================================================

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct EmployeeRefresherCourse {
    pub id: i64,
    pub employee_id: i64,
    pub language_code: String,
    pub course_title: String,
    pub date_start: NaiveDate,
    pub date_end: Option<NaiveDate>,
    pub created_at: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct EmployeeRefresherCoursePatch {
    pub id: i64,
    pub language_code: Option<String>,
    pub course_title: Option<String>,
    pub date_start: Option<NaiveDate>,
    #[serde(deserialize_with = "double_option")]
    pub date_end: Option<Option<NaiveDate>>,
}

impl Patch for EmployeeRefresherCoursePatch {
    type Target = EmployeeRefresherCourse;

    fn id(&self) -> i64 {
        self.id
    }

    fn language_code(&self) -> Option<&str> {
        self.language_code.as_deref()
    }

    fn merge_into(self, stored: &mut EmployeeRefresherCourse) {
        merge(&mut stored.language_code, self.language_code);
        merge(&mut stored.course_title, self.course_title);
        merge(&mut stored.date_start, self.date_start);
        merge(&mut stored.date_end, self.date_end);
    }
}

// =============================================================================
// Research Activity
// =============================================================================

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct EmployeeResearchActivity {
    pub id: i64,
    pub employee_id: i64,
    pub language_code: String,
    pub research_activity_title: String,
    pub employee_position: String,
    pub created_at: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct EmployeeResearchActivityPatch {
    pub id: i64,
    pub language_code: Option<String>,
    pub research_activity_title: Option<String>,
    pub employee_position: Option<String>,
}

impl Patch for EmployeeResearchActivityPatch {
    type Target = EmployeeResearchActivity;

    fn id(&self) -> i64 {
        self.id
    }

    fn language_code(&self) -> Option<&str> {
        self.language_code.as_deref()
    }

    fn merge_into(self, stored: &mut EmployeeResearchActivity) {
        merge(&mut stored.language_code, self.language_code);
        merge(&mut stored.research_activity_title, self.research_activity_title);
        merge(&mut stored.employee_position, self.employee_position);
    }
}

// =============================================================================
// Scientific Award
// =============================================================================

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct EmployeeScientificAward {
    pub id: i64,
    pub employee_id: i64,
    pub language_code: String,
    pub scientific_award_title: String,
    pub given_by: String,
    pub created_at: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct EmployeeScientificAwardPatch {
    pub id: i64,
    pub language_code: Option<String>,
    pub scientific_award_title: Option<String>,
    pub given_by: Option<String>,
}

impl Patch for EmployeeScientificAwardPatch {
    type Target = EmployeeScientificAward;

    fn id(&self) -> i64 {
        self.id
    }

    fn language_code(&self) -> Option<&str> {
        self.language_code.as_deref()
    }

    fn merge_into(self, stored: &mut EmployeeScientificAward) {
        merge(&mut stored.language_code, self.language_code);
        merge(&mut stored.scientific_award_title, self.scientific_award_title);
        merge(&mut stored.given_by, self.given_by);
    }
}

// =============================================================================
// Social
// =============================================================================

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct EmployeeSocial {
    pub id: i64,
    pub employee_id: i64,
    pub language_code: String,
    pub social_name: String,
    pub link_to_social: String,
    pub created_at: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct EmployeeSocialPatch {
    pub id: i64,
    pub language_code: Option<String>,
    pub social_name: Option<String>,
    pub link_to_social: Option<String>,
}

impl Patch for EmployeeSocialPatch {
    type Target = EmployeeSocial;

    fn id(&self) -> i64 {
        self.id
    }

    fn language_code(&self) -> Option<&str> {
        self.language_code.as_deref()
    }

    fn merge_into(self, stored: &mut EmployeeSocial) {
        merge(&mut stored.language_code, self.language_code);
        merge(&mut stored.social_name, self.social_name);
        merge(&mut stored.link_to_social, self.link_to_social);
    }
}

// =============================================================================
// Work Experience
// =============================================================================

/// A past or current position. `date_end` is `None` for the current job.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct EmployeeWorkExperience {
    pub id: i64,
    pub employee_id: i64,
    pub language_code: String,
    pub workplace: String,
    pub job_title: String,
    pub description: String,
    pub date_start: NaiveDate,
    pub date_end: Option<NaiveDate>,
    pub created_at: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct EmployeeWorkExperiencePatch {
    pub id: i64,
    pub language_code: Option<String>,
    pub workplace: Option<String>,
    pub job_title: Option<String>,
    pub description: Option<String>,
    pub date_start: Option<NaiveDate>,
    #[serde(deserialize_with = "double_option")]
    pub date_end: Option<Option<NaiveDate>>,
}

impl Patch for EmployeeWorkExperiencePatch {
    type Target = EmployeeWorkExperience;

    fn id(&self) -> i64 {
        self.id
    }

    fn language_code(&self) -> Option<&str> {
        self.language_code.as_deref()
    }

    fn merge_into(self, stored: &mut EmployeeWorkExperience) {
        merge(&mut stored.language_code, self.language_code);
        merge(&mut stored.workplace, self.workplace);
        merge(&mut stored.job_title, self.job_title);
        merge(&mut stored.description, self.description);
        merge(&mut stored.date_start, self.date_start);
        merge(&mut stored.date_end, self.date_end);
    }
}

// =============================================================================
// Localized impls
// =============================================================================

macro_rules! localized_under_employee {
    ($($record:ty),+ $(,)?) => {
        $(
            impl Localized for $record {
                const PARENT_FIELD: &'static str = "employee_id";

                fn parent_id(&self) -> i64 {
                    self.employee_id
                }

                fn language_code(&self) -> &str {
                    &self.language_code
                }
            }
        )+
    };
}

localized_under_employee!(
    EmployeeDegree,
    EmployeeDetails,
    EmployeeMainResearchArea,
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

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ValidationError;

    #[test]
    fn test_employee_requires_unique_id() {
        assert_eq!(
            Employee::default().validate_new().unwrap_err(),
            ValidationError::required("unique_id")
        );
        let employee = Employee {
            unique_id: "EMP-0001".to_string(),
            ..Default::default()
        };
        assert!(employee.validate_new().is_ok());
    }

    #[test]
    fn test_employee_patch_rejects_blank_unique_id() {
        let patch = EmployeePatch {
            id: 1,
            unique_id: Some("  ".to_string()),
        };
        assert!(patch.validate().is_err());
    }

    #[test]
    fn test_research_area_requires_key_topics() {
        let area = EmployeeMainResearchArea {
            employee_id: 2,
            language_code: "tg".to_string(),
            area: "Physics".to_string(),
            ..Default::default()
        };
        assert!(matches!(
            area.validate_new().unwrap_err(),
            ValidationError::EmptyCollection { .. }
        ));
    }

    #[test]
    fn test_work_experience_merge() {
        let mut stored = EmployeeWorkExperience {
            id: 5,
            employee_id: 2,
            language_code: "ru".to_string(),
            workplace: "Academy of Sciences".to_string(),
            job_title: "Researcher".to_string(),
            date_start: NaiveDate::from_ymd_opt(2015, 9, 1).unwrap(),
            ..Default::default()
        };

        EmployeeWorkExperiencePatch {
            id: 5,
            job_title: Some("Senior Researcher".to_string()),
            date_end: Some(NaiveDate::from_ymd_opt(2024, 6, 30)),
            ..Default::default()
        }
        .merge_into(&mut stored);

        assert_eq!(stored.workplace, "Academy of Sciences");
        assert_eq!(stored.job_title, "Senior Researcher");
        assert_eq!(stored.date_end, NaiveDate::from_ymd_opt(2024, 6, 30));
    }

    #[test]
    fn test_degree_patch_from_json_with_null_date() {
        let patch: EmployeeDegreePatch =
            serde_json::from_str(r#"{"id": 3, "date_end": null}"#).unwrap();
        assert_eq!(patch.date_end, Some(None));
        assert_eq!(patch.date_degree_received, None);
    }
}
