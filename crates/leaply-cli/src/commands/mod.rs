pub mod auth;
pub mod catalog;
pub mod dashboard;
pub mod users;

use std::io::{self, BufRead, Write};

use anyhow::Result;
use leaply_admin::forms::Notification;
use leaply_admin::views::{DeleteOutcome, ListEntity, ListView, ViewState};
use leaply_admin::{AdminContext, AdminError, Route};
use serde::Serialize;
use uuid::Uuid;

use crate::cli::OutputFormat;
use crate::output::{print_heading, print_json, print_rows, print_success};

/// Turn a library error into the message a notification would show.
pub(crate) fn failure(err: AdminError, fallback: &str) -> anyhow::Error {
    let message = Notification::from_error(&err, fallback).message;
    match err.redirect() {
        Some(Route::Login) => anyhow::anyhow!("{message} (session expired, run: leaply-admin login)"),
        _ => anyhow::anyhow!(message),
    }
}

/// Ask on stdin; anything but y/yes declines.
fn prompt(question: &str) -> bool {
    print!("{question} [y/N] ");
    if io::stdout().flush().is_err() {
        return false;
    }
    let mut answer = String::new();
    if io::stdin().lock().read_line(&mut answer).is_err() {
        return false;
    }
    matches!(answer.trim().to_lowercase().as_str(), "y" | "yes")
}

pub(crate) async fn list<E>(
    ctx: &AdminContext,
    view: &ListView<E>,
    route: &Route,
    format: OutputFormat,
) -> Result<()>
where
    E: ListEntity + Serialize,
{
    match view.load().await {
        ViewState::Rows(rows) => {
            if format == OutputFormat::Table {
                print_heading(route);
            }
            print_rows(&rows, format)
        }
        ViewState::Empty(message) => match format {
            OutputFormat::Json => print_json(&[] as &[E]),
            OutputFormat::Table => {
                println!("{message}");
                Ok(())
            }
        },
        ViewState::Failed(message) => {
            if !ctx.session().is_authenticated() {
                anyhow::bail!("{message} (not logged in, run: leaply-admin login)");
            }
            anyhow::bail!(message)
        }
    }
}

pub(crate) async fn delete<E: ListEntity>(ctx: &AdminContext, id: Uuid, yes: bool) -> Result<()> {
    let view = ListView::<E>::new(ctx.clone());
    let confirm = |question: &str| yes || prompt(question);
    match view.delete(id, &confirm).await {
        Ok(DeleteOutcome::Deleted(notification)) => {
            print_success(&notification.message);
            Ok(())
        }
        Ok(DeleteOutcome::Cancelled) => {
            println!("Cancelled");
            Ok(())
        }
        Err(err) => {
            tracing::debug!(error = %err, "delete failed");
            Err(failure(err, &ListView::<E>::delete_failed().message))
        }
    }
}
