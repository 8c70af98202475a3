use uuid::Uuid;

use super::{
    FormOutcome, SubmitMode, ValidationErrors, number_text, optional_int, optional_text,
    optional_url, required_text, text_of,
};
use crate::context::AdminContext;
use crate::error::Result;
use crate::model::{EntityKind, University, UniversityPayload};

/// Working copy of a university being created or edited.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UniversityForm {
    /// Present when editing an existing record.
    pub id: Option<Uuid>,
    pub name: String,
    pub name_local: String,
    pub website_url: String,
    pub logo_url: String,
    pub country: String,
    pub city: String,
    pub region: String,
    pub ranking_qs: String,
    pub ranking_times: String,
    pub ranking_national: String,
    pub university_type: String,
    pub primary_language: String,
    pub description: String,
}

impl UniversityForm {
    pub fn new() -> Self {
        Self::default()
    }

    /// Pre-populate from an existing record. Unset fields stay blank.
    pub fn edit(university: &University) -> Self {
        Self {
            id: Some(university.id),
            name: university.name.clone(),
            name_local: text_of(university.name_local.as_ref()),
            website_url: text_of(university.website_url.as_ref()),
            logo_url: text_of(university.logo_url.as_ref()),
            country: text_of(university.country.as_ref()),
            city: text_of(university.city.as_ref()),
            region: text_of(university.region.as_ref()),
            ranking_qs: number_text(university.ranking_qs),
            ranking_times: number_text(university.ranking_times),
            ranking_national: number_text(university.ranking_national),
            university_type: text_of(university.university_type.as_ref()),
            primary_language: text_of(university.primary_language.as_ref()),
            description: text_of(university.description.as_ref()),
        }
    }

    pub fn mode(&self) -> SubmitMode {
        if self.id.is_some() {
            SubmitMode::Update
        } else {
            SubmitMode::Create
        }
    }

    pub fn validate(&self) -> std::result::Result<UniversityPayload, ValidationErrors> {
        let mut errors = ValidationErrors::default();

        let payload = UniversityPayload {
            name: required_text(&mut errors, "name", &self.name, "Name is required"),
            name_local: optional_text(&self.name_local),
            website_url: optional_url(&mut errors, "website_url", &self.website_url),
            logo_url: optional_url(&mut errors, "logo_url", &self.logo_url),
            country: optional_text(&self.country),
            city: optional_text(&self.city),
            region: optional_text(&self.region),
            ranking_qs: optional_int(&mut errors, "ranking_qs", &self.ranking_qs),
            ranking_times: optional_int(&mut errors, "ranking_times", &self.ranking_times),
            ranking_national: optional_int(&mut errors, "ranking_national", &self.ranking_national),
            university_type: optional_text(&self.university_type),
            primary_language: optional_text(&self.primary_language),
            description: optional_text(&self.description),
        };

        errors.into_result(payload)
    }

    /// Validate, create or update, then invalidate cached university lists.
    ///
    /// # Errors
    ///
    /// Validation failures are returned before any request is made. Request
    /// failures leave the cache untouched; show them with
    /// [`Notification::from_error`](super::Notification::from_error).
    pub async fn submit(&self, ctx: &AdminContext) -> Result<FormOutcome> {
        let payload = self.validate()?;

        match self.id {
            Some(id) => ctx.client.update_university(id, &payload).await?,
            None => ctx.client.create_university(&payload).await?,
        }
        tracing::info!(name = %payload.name, mode = ?self.mode(), "university saved");

        ctx.cache.invalidate(EntityKind::University).await;
        Ok(FormOutcome::saved(self.mode(), "University"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::macros::datetime;

    fn sample() -> University {
        University {
            id: Uuid::nil(),
            name: "ETH Zurich".into(),
            name_local: Some("ETH Zürich".into()),
            website_url: Some("https://ethz.ch".into()),
            logo_url: None,
            country: Some("Switzerland".into()),
            city: Some("Zurich".into()),
            region: None,
            ranking_qs: Some(7),
            ranking_times: None,
            ranking_national: Some(0),
            university_type: Some("Public".into()),
            primary_language: None,
            description: None,
            created_at: datetime!(2025-01-01 0:00 UTC),
            updated_at: datetime!(2025-01-01 0:00 UTC),
        }
    }

    #[test]
    fn test_name_is_required() {
        let errors = UniversityForm::new().validate().unwrap_err();
        assert_eq!(errors.get("name"), Some("Name is required"));
    }

    #[test]
    fn test_blank_optionals_become_unset() {
        let form = UniversityForm {
            name: "Test U".into(),
            ..Default::default()
        };
        let payload = form.validate().unwrap();
        assert_eq!(payload.name, "Test U");
        assert_eq!(payload.ranking_qs, None);
        assert_eq!(payload.ranking_times, None);
        assert_eq!(payload.website_url, None);
        assert_eq!(form.mode(), SubmitMode::Create);
    }

    #[test]
    fn test_edit_round_trips_unset_and_zero() {
        let uni = sample();
        let form = UniversityForm::edit(&uni);
        assert_eq!(form.mode(), SubmitMode::Update);
        assert_eq!(form.ranking_times, "");
        assert_eq!(form.ranking_national, "0");

        let payload = form.validate().unwrap();
        assert_eq!(payload.ranking_qs, Some(7));
        assert_eq!(payload.ranking_times, None);
        assert_eq!(payload.ranking_national, Some(0));
        assert_eq!(payload.logo_url, None);
        assert_eq!(payload.name_local.as_deref(), Some("ETH Zürich"));
    }

    #[test]
    fn test_field_errors_are_collected() {
        let form = UniversityForm {
            name: "X".into(),
            website_url: "not a url".into(),
            ranking_qs: "first".into(),
            ..Default::default()
        };
        let errors = form.validate().unwrap_err();
        assert_eq!(errors.get("website_url"), Some("Invalid url"));
        assert_eq!(errors.get("ranking_qs"), Some("Expected an integer"));
        assert_eq!(errors.get("name"), None);
    }
}
