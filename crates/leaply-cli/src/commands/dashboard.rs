use anyhow::Result;
use leaply_admin::shell::sidebar;
use leaply_admin::views::DashboardStats;
use leaply_admin::{AdminContext, Route};
use serde_json::json;

use crate::cli::OutputFormat;
use crate::commands::failure;
use crate::output::{print_heading, print_json, print_table};

pub async fn show(ctx: &AdminContext, format: OutputFormat) -> Result<()> {
    let stats = DashboardStats::load(ctx)
        .await
        .map_err(|err| failure(err, "Failed to load dashboard"))?;

    if format == OutputFormat::Json {
        return print_json(&json!({
            "universities": stats.universities,
            "programs": stats.programs,
            "users": stats.users,
        }));
    }

    print_heading(&Route::Dashboard);
    let rows = sidebar().into_iter().filter_map(|item| {
        let count = match item.route {
            Route::Universities => stats.universities,
            Route::Programs { .. } => stats.programs,
            Route::Users => stats.users,
            Route::Dashboard | Route::Login => return None,
        };
        Some(vec![
            item.title.to_string(),
            count.to_string(),
            item.route.path(),
        ])
    });
    print_table(&["Section", "Records", "Path"], rows);
    Ok(())
}
