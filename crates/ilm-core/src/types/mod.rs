//! # Domain Types
//!
//! Persisted records and their update patches.
//!
//! ```text
//! Institution ─┬─ Details / Accreditation / Achievement / Conference / Licence
//!              ├─ Magazine / MainResearchDirection / Partnership / Patent
//!              ├─ Ranking / ResearchSupportInfrastructure / Social
//!              └─ Project ── Partner*            (aggregate, ≥ 1 partner)
//!
//! Employee ────┬─ Degree / Details / ParticipationInEvent / Patent
//!              ├─ ParticipationInProfessionalCommunity / Publication
//!              ├─ RefresherCourse / ResearchActivity / ScientificAward
//!              ├─ Social / WorkExperience
//!              └─ MainResearchArea ── KeyTopic*  (aggregate, ≥ 1 topic)
//!
//! User ── Session*
//! ```
//!
//! Every record carries `id` (0 until persisted) plus `created_at` and
//! `updated_at`, which are assigned by the store and ignored on input.

mod employee;
mod institution;
mod user;

pub use employee::*;
pub use institution::*;
pub use user::*;
