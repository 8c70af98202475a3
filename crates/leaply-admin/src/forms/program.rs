use uuid::Uuid;

use super::{
    FormOutcome, SubmitMode, ValidationErrors, number_text, optional_int, optional_number,
    optional_text, optional_url, required_text, text_of,
};
use crate::context::AdminContext;
use crate::error::Result;
use crate::model::{EntityKind, Program, ProgramPayload, University};

pub const DEFAULT_DEGREE_TYPE: &str = "undergraduate";
pub const DEFAULT_DELIVERY_MODE: &str = "on_campus";
pub const DEFAULT_LANGUAGE: &str = "English";

/// Working copy of a program being created or edited.
///
/// The owning university is picked from the live university list, never
/// typed freely; `university_id` holds the picked id as text.
#[derive(Debug, Clone, PartialEq)]
pub struct ProgramForm {
    pub id: Option<Uuid>,
    pub university_id: String,
    pub name: String,
    pub degree_type: String,
    pub degree_name: String,
    /// Comma-separated.
    pub major_categories: String,
    pub duration_months: String,
    pub delivery_mode: String,
    pub language: String,
    pub scholarship_available: bool,
    pub scholarship_notes: String,
    pub application_fee_usd: String,
    pub admissions_url: String,
    pub program_url: String,
    pub description: String,
}

impl Default for ProgramForm {
    fn default() -> Self {
        Self {
            id: None,
            university_id: String::new(),
            name: String::new(),
            degree_type: DEFAULT_DEGREE_TYPE.to_string(),
            degree_name: String::new(),
            major_categories: String::new(),
            duration_months: String::new(),
            delivery_mode: DEFAULT_DELIVERY_MODE.to_string(),
            language: DEFAULT_LANGUAGE.to_string(),
            scholarship_available: false,
            scholarship_notes: String::new(),
            application_fee_usd: String::new(),
            admissions_url: String::new(),
            program_url: String::new(),
            description: String::new(),
        }
    }
}

impl ProgramForm {
    pub fn new() -> Self {
        Self::default()
    }

    /// A new program pre-assigned to `university_id`.
    pub fn for_university(university_id: Uuid) -> Self {
        Self {
            university_id: university_id.to_string(),
            ..Self::default()
        }
    }

    pub fn edit(program: &Program) -> Self {
        Self {
            id: Some(program.id),
            university_id: program.university_id.to_string(),
            name: program.name.clone(),
            degree_type: text_of(program.degree_type.as_ref()),
            degree_name: text_of(program.degree_name.as_ref()),
            major_categories: program
                .major_categories
                .as_ref()
                .map(|c| c.join(", "))
                .unwrap_or_default(),
            duration_months: number_text(program.duration_months),
            delivery_mode: text_of(program.delivery_mode.as_ref()),
            language: text_of(program.language.as_ref()),
            scholarship_available: program.scholarship_available,
            scholarship_notes: text_of(program.scholarship_notes.as_ref()),
            application_fee_usd: number_text(program.application_fee_usd),
            admissions_url: text_of(program.admissions_url.as_ref()),
            program_url: text_of(program.program_url.as_ref()),
            description: text_of(program.description.as_ref()),
        }
    }

    pub fn mode(&self) -> SubmitMode {
        if self.id.is_some() {
            SubmitMode::Update
        } else {
            SubmitMode::Create
        }
    }

    /// Pick the owning university.
    pub fn select_university(&mut self, university: &University) {
        self.university_id = university.id.to_string();
    }

    /// Name of the picked university, looked up in `universities`.
    pub fn selected_university<'a>(&self, universities: &'a [University]) -> Option<&'a University> {
        let id = Uuid::parse_str(self.university_id.trim()).ok()?;
        universities.iter().find(|u| u.id == id)
    }

    /// Validate against the currently known universities.
    pub fn validate(
        &self,
        universities: &[University],
    ) -> std::result::Result<ProgramPayload, ValidationErrors> {
        let mut errors = ValidationErrors::default();

        let university_id = match Uuid::parse_str(self.university_id.trim()) {
            Ok(id) if universities.iter().any(|u| u.id == id) => id,
            Ok(id) => {
                errors.add("university_id", "Selected university does not exist");
                id
            }
            Err(_) => {
                errors.add("university_id", "Please select a university");
                Uuid::nil()
            }
        };

        let payload = ProgramPayload {
            university_id,
            name: required_text(&mut errors, "name", &self.name, "Name is required"),
            degree_type: optional_text(&self.degree_type),
            degree_name: optional_text(&self.degree_name),
            major_categories: split_categories(&self.major_categories),
            duration_months: optional_int(&mut errors, "duration_months", &self.duration_months),
            delivery_mode: optional_text(&self.delivery_mode),
            language: optional_text(&self.language),
            scholarship_available: self.scholarship_available,
            scholarship_notes: optional_text(&self.scholarship_notes),
            application_fee_usd: optional_number(
                &mut errors,
                "application_fee_usd",
                &self.application_fee_usd,
            ),
            admissions_url: optional_url(&mut errors, "admissions_url", &self.admissions_url),
            program_url: optional_url(&mut errors, "program_url", &self.program_url),
            description: optional_text(&self.description),
        };

        errors.into_result(payload)
    }

    /// Fetch the university list through the cache, validate against it,
    /// then create or update and invalidate cached program lists.
    ///
    /// # Errors
    ///
    /// An unknown or missing university is rejected before the program
    /// request is sent.
    pub async fn submit(&self, ctx: &AdminContext) -> Result<FormOutcome> {
        let universities = ctx.universities().await?;
        let payload = self.validate(&universities)?;

        match self.id {
            Some(id) => ctx.client.update_program(id, &payload).await?,
            None => ctx.client.create_program(&payload).await?,
        }
        tracing::info!(name = %payload.name, university_id = %payload.university_id, mode = ?self.mode(), "program saved");

        ctx.cache.invalidate(EntityKind::Program).await;
        Ok(FormOutcome::saved(self.mode(), "Program"))
    }
}

/// Blank input stays unset.
fn split_categories(input: &str) -> Option<Vec<String>> {
    if input.trim().is_empty() {
        return None;
    }
    Some(
        input
            .split(',')
            .map(str::trim)
            .filter(|c| !c.is_empty())
            .map(str::to_string)
            .collect(),
    )
}
