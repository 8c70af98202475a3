use std::future::Future;
use std::sync::Arc;

use time::OffsetDateTime;
use time::macros::format_description;
use uuid::Uuid;

use super::{Editable, ListEntity};
use crate::cache::QueryKey;
use crate::context::{AdminContext, UNIVERSITY_FILTER_PARAM};
use crate::error::Result;
use crate::forms::{ProgramForm, UniversityForm};
use crate::model::{Program, University, User};

const UNSET: &str = "-";

/// Render an optional value; unset is `-`, never `0`.
pub fn format_optional<T: ToString>(value: Option<T>) -> String {
    value.map_or_else(|| UNSET.to_string(), |v| v.to_string())
}

/// `YYYY-MM-DD`.
pub fn format_date(at: OffsetDateTime) -> String {
    at.format(format_description!("[year]-[month]-[day]"))
        .unwrap_or_else(|_| at.date().to_string())
}

fn contains(haystack: &str, needle: &str) -> bool {
    haystack.to_lowercase().contains(needle)
}

impl ListEntity for University {
    const PLURAL: &'static str = "universities";
    const DELETE_PROMPT: &'static str = "Are you sure you want to delete this university?";

    fn load(ctx: &AdminContext, _key: &QueryKey) -> impl Future<Output = Result<Arc<Vec<Self>>>> {
        ctx.universities()
    }

    fn matches(&self, needle: &str) -> bool {
        contains(&self.name, needle)
            || self
                .name_local
                .as_deref()
                .is_some_and(|n| contains(n, needle))
    }

    fn columns() -> &'static [&'static str] {
        &["ID", "Name", "Location", "QS", "Times", "National", "Type"]
    }

    fn cells(&self) -> Vec<String> {
        let location: Vec<&str> = [self.city.as_deref(), self.country.as_deref()]
            .into_iter()
            .flatten()
            .collect();
        vec![
            self.id.to_string(),
            self.name.clone(),
            if location.is_empty() {
                UNSET.to_string()
            } else {
                location.join(", ")
            },
            format_optional(self.ranking_qs),
            format_optional(self.ranking_times),
            format_optional(self.ranking_national),
            format_optional(self.university_type.as_deref()),
        ]
    }
}

impl Editable for University {
    type Form = UniversityForm;

    fn edit_form(&self) -> UniversityForm {
        UniversityForm::edit(self)
    }
}

impl ListEntity for Program {
    const PLURAL: &'static str = "programs";
    const DELETE_PROMPT: &'static str = "Are you sure you want to delete this program?";

    fn load(ctx: &AdminContext, key: &QueryKey) -> impl Future<Output = Result<Arc<Vec<Self>>>> {
        let filter = key
            .param(UNIVERSITY_FILTER_PARAM)
            .and_then(|v| Uuid::parse_str(v).ok());
        ctx.programs(filter)
    }

    fn matches(&self, needle: &str) -> bool {
        contains(&self.name, needle)
            || self
                .university
                .as_ref()
                .is_some_and(|u| contains(&u.name, needle))
    }

    fn columns() -> &'static [&'static str] {
        &["ID", "Program Name", "University", "Degree", "Duration"]
    }

    fn cells(&self) -> Vec<String> {
        vec![
            self.id.to_string(),
            self.name.clone(),
            format_optional(self.university.as_ref().map(|u| u.name.as_str())),
            self.degree_type
                .as_deref()
                .filter(|d| !d.is_empty())
                .map_or_else(|| "N/A".to_string(), |d| d.replace('_', " ")),
            self.duration_months
                .map_or_else(|| UNSET.to_string(), |m| format!("{m} mo")),
        ]
    }
}

impl Editable for Program {
    type Form = ProgramForm;

    fn edit_form(&self) -> ProgramForm {
        ProgramForm::edit(self)
    }
}

impl ListEntity for User {
    const PLURAL: &'static str = "users";
    const DELETE_PROMPT: &'static str =
        "Are you sure you want to delete this user? This action is irreversible.";

    fn load(ctx: &AdminContext, _key: &QueryKey) -> impl Future<Output = Result<Arc<Vec<Self>>>> {
        ctx.users()
    }

    fn matches(&self, needle: &str) -> bool {
        contains(&self.email, needle)
    }

    fn columns() -> &'static [&'static str] {
        &["ID", "Email Address", "Status", "Joined Date"]
    }

    fn cells(&self) -> Vec<String> {
        vec![
            self.id.to_string(),
            self.email.clone(),
            if self.email_verified {
                "Verified".to_string()
            } else {
                "Pending".to_string()
            },
            format_date(self.created_at),
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::views::filter_rows;
    use time::macros::datetime;

    fn university(name: &str, local: Option<&str>) -> University {
        University {
            id: Uuid::new_v4(),
            name: name.into(),
            name_local: local.map(str::to_string),
            website_url: None,
            logo_url: None,
            country: Some("Japan".into()),
            city: None,
            region: None,
            ranking_qs: None,
            ranking_times: Some(0),
            ranking_national: None,
            university_type: None,
            primary_language: None,
            description: None,
            created_at: datetime!(2025-03-04 10:00 UTC),
            updated_at: datetime!(2025-03-04 10:00 UTC),
        }
    }

    fn user(email: &str, verified: bool) -> User {
        User {
            id: Uuid::new_v4(),
            email: email.into(),
            email_verified: verified,
            created_at: datetime!(2024-11-30 23:59 UTC),
            updated_at: datetime!(2024-11-30 23:59 UTC),
        }
    }

    #[test]
    fn test_unset_rankings_render_as_dash() {
        let cells = university("Test U", None).cells();
        assert_eq!(cells[1], "Test U");
        assert_eq!(cells[2], "Japan");
        assert_eq!(cells[3], "-");
        assert_eq!(cells[4], "0");
        assert_eq!(cells[5], "-");
    }

    #[test]
    fn test_filter_is_case_insensitive_substring() {
        let rows = vec![
            university("University of Tokyo", Some("東京大学")),
            university("Kyoto University", None),
        ];
        assert_eq!(filter_rows(&rows, "TOKYO").len(), 1);
        assert_eq!(filter_rows(&rows, "東京").len(), 1);
        assert_eq!(filter_rows(&rows, "university").len(), 2);
        assert_eq!(filter_rows(&rows, "  ").len(), 2);
        assert!(filter_rows(&rows, "sorbonne").is_empty());
    }

    #[test]
    fn test_users_filter_by_email() {
        let rows = vec![user("Ana@Example.com", true), user("bo@test.dev", false)];
        let hits = filter_rows(&rows, "example");
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].cells()[2], "Verified");
        assert_eq!(rows[1].cells()[2], "Pending");
        assert_eq!(rows[1].cells()[3], "2024-11-30");
    }

    #[test]
    fn test_program_cells() {
        let uni = university("ETH", None);
        let program = Program {
            id: Uuid::new_v4(),
            university_id: uni.id,
            name: "MSc Robotics".into(),
            degree_type: Some("masters_degree".into()),
            degree_name: None,
            major_categories: None,
            duration_months: Some(18),
            delivery_mode: None,
            language: None,
            scholarship_available: false,
            scholarship_notes: None,
            application_fee_usd: None,
            admissions_url: None,
            program_url: None,
            description: None,
            university: Some(uni),
            created_at: datetime!(2025-01-01 0:00 UTC),
            updated_at: datetime!(2025-01-01 0:00 UTC),
        };
        let cells = program.cells();
        assert_eq!(cells[2], "ETH");
        assert_eq!(cells[3], "masters degree");
        assert_eq!(cells[4], "18 mo");
        assert!(program.matches("eth"));

        let bare = Program {
            degree_type: None,
            duration_months: None,
            university: None,
            ..program
        };
        assert_eq!(bare.cells()[2..], ["-", "N/A", "-"]);

        let zero = Program {
            duration_months: Some(0),
            ..bare
        };
        assert_eq!(zero.cells()[4], "0 mo");
    }
}
