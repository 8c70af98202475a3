use anyhow::Result;
use colored::Colorize;
use leaply_admin::forms::{LOGIN_FAILED, LoginForm};
use leaply_admin::session::FileTokenStore;
use leaply_admin::{AdminContext, AdminError, Session};

use crate::cli::LoginArgs;
use crate::commands::failure;
use crate::output::{print_error, print_success};

pub async fn login(ctx: &AdminContext, args: &LoginArgs) -> Result<()> {
    let form = LoginForm::new(args.username.as_str(), args.password.as_str());
    match form.submit(&ctx.client).await {
        Ok(route) => {
            print_success(&format!(
                "Logged in to {} as {}",
                ctx.client.base_url().as_str().cyan(),
                args.username.trim().cyan()
            ));
            tracing::debug!(%route, "login complete");
            Ok(())
        }
        Err(AdminError::Validation(errors)) => {
            for (_, message) in errors.iter() {
                print_error(message);
            }
            anyhow::bail!(LOGIN_FAILED)
        }
        Err(err) => Err(failure(err, LOGIN_FAILED)),
    }
}

pub fn logout(session: &Session, profile: &str) -> Result<()> {
    if !session.is_authenticated() {
        println!("No session found for profile \"{profile}\"");
        return Ok(());
    }
    session.logout()?;
    print_success("Logged out (session token removed)");
    Ok(())
}

pub fn whoami(
    profile: &str,
    server: Option<&str>,
    authenticated: bool,
    store: &FileTokenStore,
) -> Result<()> {
    println!("{}: {}", "Profile".cyan(), profile);
    println!("{}: {}", "Server".cyan(), server.unwrap_or("(not set)"));
    println!("{}: {}", "Token file".cyan(), store.path().display());
    if authenticated {
        println!("{}: signed in", "Session".cyan());
    } else {
        print_error(&format!("Not logged in (profile: \"{profile}\")"));
    }
    Ok(())
}
