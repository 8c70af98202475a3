use anyhow::Result;
use leaply_admin::model::User;
use leaply_admin::views::ListView;
use leaply_admin::{AdminContext, Route};

use crate::cli::{ListArgs, OutputFormat};
use crate::commands;

pub async fn list(ctx: &AdminContext, args: &ListArgs, format: OutputFormat) -> Result<()> {
    let mut view = ListView::<User>::new(ctx.clone());
    if let Some(term) = &args.search {
        view.set_search(term.as_str());
    }
    commands::list(ctx, &view, &Route::Users, format).await
}
