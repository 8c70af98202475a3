use anyhow::Result;
use leaply_admin::forms::{FormOutcome, OPERATION_FAILED, ProgramForm, UniversityForm};
use leaply_admin::model::{Program, University};
use leaply_admin::views::ListView;
use leaply_admin::{AdminContext, Route};
use uuid::Uuid;

use crate::cli::{ListArgs, OutputFormat, ProgramFields, UniversityFields};
use crate::commands::{self, failure};
use crate::output::print_success;

fn assign(target: &mut String, value: &Option<String>) {
    if let Some(value) = value {
        target.clone_from(value);
    }
}

fn apply_university(form: &mut UniversityForm, fields: &UniversityFields) {
    assign(&mut form.name, &fields.name);
    assign(&mut form.name_local, &fields.name_local);
    assign(&mut form.website_url, &fields.website_url);
    assign(&mut form.logo_url, &fields.logo_url);
    assign(&mut form.country, &fields.country);
    assign(&mut form.city, &fields.city);
    assign(&mut form.region, &fields.region);
    assign(&mut form.ranking_qs, &fields.ranking_qs);
    assign(&mut form.ranking_times, &fields.ranking_times);
    assign(&mut form.ranking_national, &fields.ranking_national);
    assign(&mut form.university_type, &fields.university_type);
    assign(&mut form.primary_language, &fields.primary_language);
    assign(&mut form.description, &fields.description);
}

fn apply_program(form: &mut ProgramForm, fields: &ProgramFields) {
    assign(&mut form.university_id, &fields.university);
    assign(&mut form.name, &fields.name);
    assign(&mut form.degree_type, &fields.degree_type);
    assign(&mut form.degree_name, &fields.degree_name);
    assign(&mut form.major_categories, &fields.major_categories);
    assign(&mut form.duration_months, &fields.duration_months);
    assign(&mut form.delivery_mode, &fields.delivery_mode);
    assign(&mut form.language, &fields.language);
    if let Some(available) = fields.scholarship_available {
        form.scholarship_available = available;
    }
    assign(&mut form.scholarship_notes, &fields.scholarship_notes);
    assign(&mut form.application_fee_usd, &fields.application_fee_usd);
    assign(&mut form.admissions_url, &fields.admissions_url);
    assign(&mut form.program_url, &fields.program_url);
    assign(&mut form.description, &fields.description);
}

fn report(result: leaply_admin::Result<FormOutcome>) -> Result<()> {
    let outcome = result.map_err(|err| failure(err, OPERATION_FAILED))?;
    print_success(&outcome.notification.message);
    Ok(())
}

// --- Universities ---

pub async fn list_universities(ctx: &AdminContext, args: &ListArgs, format: OutputFormat) -> Result<()> {
    let mut view = ListView::<University>::new(ctx.clone());
    if let Some(term) = &args.search {
        view.set_search(term.as_str());
    }
    commands::list(ctx, &view, &Route::Universities, format).await
}

pub async fn create_university(ctx: &AdminContext, fields: &UniversityFields) -> Result<()> {
    let mut form = UniversityForm::new();
    apply_university(&mut form, fields);
    report(form.submit(ctx).await)
}

pub async fn update_university(ctx: &AdminContext, id: Uuid, fields: &UniversityFields) -> Result<()> {
    let view = ListView::<University>::new(ctx.clone());
    let mut form = view
        .edit(id)
        .await
        .map_err(|err| failure(err, "Failed to load universities"))?
        .ok_or_else(|| anyhow::anyhow!("University {id} not found"))?;
    apply_university(&mut form, fields);
    report(form.submit(ctx).await)
}

// --- Programs ---

pub async fn list_programs(
    ctx: &AdminContext,
    university: Option<Uuid>,
    args: &ListArgs,
    format: OutputFormat,
) -> Result<()> {
    let mut view = ListView::<Program>::for_university(ctx.clone(), university);
    if let Some(term) = &args.search {
        view.set_search(term.as_str());
    }
    let route = Route::Programs {
        university_id: view.university_filter(),
    };
    commands::list(ctx, &view, &route, format).await
}

pub async fn create_program(ctx: &AdminContext, fields: &ProgramFields) -> Result<()> {
    let mut form = ProgramForm::new();
    apply_program(&mut form, fields);
    report(form.submit(ctx).await)
}

pub async fn update_program(ctx: &AdminContext, id: Uuid, fields: &ProgramFields) -> Result<()> {
    let view = ListView::<Program>::new(ctx.clone());
    let mut form = view
        .edit(id)
        .await
        .map_err(|err| failure(err, "Failed to load programs"))?
        .ok_or_else(|| anyhow::anyhow!("Program {id} not found"))?;
    apply_program(&mut form, fields);
    report(form.submit(ctx).await)
}
