mod cli;
mod commands;
mod config;
mod logging;
mod output;

use std::sync::Arc;

use anyhow::Result;
use clap::Parser;
use colored::Colorize;
use leaply_admin::session::FileTokenStore;
use leaply_admin::shell::guard;
use leaply_admin::{
    AdminContext, ApiClient, CacheConfig, ClientConfig, EntityCache, Route, Session, TokenStore,
};

use cli::{Cli, Commands, ConfigCommands, ProgramCommands, UniversityCommands, UserCommands};
use config::ProfileConfig;
use output::print_error;

#[tokio::main]
async fn main() {
    if let Err(e) = run().await {
        print_error(&format!("{e:#}"));
        std::process::exit(1);
    }
}

async fn run() -> Result<()> {
    let cli = Cli::parse();
    logging::init_tracing(&cli.log_level);

    let profile = cli.profile.as_str();
    let profile_config = config::load_profile(profile)?;
    let format = cli.format.unwrap_or_else(|| profile_config.output_format());
    let connect = || -> Result<AdminContext> {
        let server = config::resolve_server(cli.server.as_deref(), &profile_config)?;
        make_context(&server, profile, &profile_config)
    };

    match &cli.command {
        Commands::Login(args) => {
            let ctx = connect()?;
            commands::auth::login(&ctx, args).await?;
        }
        Commands::Logout => {
            let session = Session::restore(Arc::new(FileTokenStore::for_profile(profile)?))?;
            commands::auth::logout(&session, profile)?;
        }
        Commands::Whoami => {
            let store = FileTokenStore::for_profile(profile)?;
            let authenticated = store.load()?.is_some();
            let server = config::resolve_server(cli.server.as_deref(), &profile_config).ok();
            commands::auth::whoami(profile, server.as_deref(), authenticated, &store)?;
        }
        Commands::Dashboard => {
            let ctx = authorized(connect()?, Route::Dashboard, profile)?;
            commands::dashboard::show(&ctx, format).await?;
        }
        Commands::Universities(command) => {
            let ctx = authorized(connect()?, Route::Universities, profile)?;
            match command {
                UniversityCommands::List(args) => {
                    commands::catalog::list_universities(&ctx, args, format).await?;
                }
                UniversityCommands::Create(fields) => {
                    commands::catalog::create_university(&ctx, fields).await?;
                }
                UniversityCommands::Update { id, fields } => {
                    commands::catalog::update_university(&ctx, *id, fields).await?;
                }
                UniversityCommands::Delete(args) => {
                    commands::delete::<leaply_admin::model::University>(&ctx, args.id, args.yes)
                        .await?;
                }
            }
        }
        Commands::Programs(command) => {
            let route = Route::Programs {
                university_id: None,
            };
            let ctx = authorized(connect()?, route, profile)?;
            match command {
                ProgramCommands::List { university, list } => {
                    commands::catalog::list_programs(&ctx, *university, list, format).await?;
                }
                ProgramCommands::Create(fields) => {
                    commands::catalog::create_program(&ctx, fields).await?;
                }
                ProgramCommands::Update { id, fields } => {
                    commands::catalog::update_program(&ctx, *id, fields).await?;
                }
                ProgramCommands::Delete(args) => {
                    commands::delete::<leaply_admin::model::Program>(&ctx, args.id, args.yes)
                        .await?;
                }
            }
        }
        Commands::Users(command) => {
            let ctx = authorized(connect()?, Route::Users, profile)?;
            match command {
                UserCommands::List(args) => commands::users::list(&ctx, args, format).await?,
                UserCommands::Delete(args) => {
                    commands::delete::<leaply_admin::model::User>(&ctx, args.id, args.yes).await?;
                }
            }
        }
        Commands::Config(args) => match &args.command {
            ConfigCommands::Show => {
                println!("{}: {}", "Profile".cyan(), profile);
                println!(
                    "{}: {}",
                    "Server".cyan(),
                    profile_config.server.as_deref().unwrap_or("(not set)")
                );
                println!(
                    "{}: {}",
                    "Format".cyan(),
                    profile_config.format.as_deref().unwrap_or("table")
                );
                println!(
                    "{}: {}",
                    "Stale secs".cyan(),
                    profile_config.stale_secs.unwrap_or(0)
                );
                println!("{}: {}", "File".cyan(), config::config_path()?.display());
            }
            ConfigCommands::Set(set_args) => {
                let mut cfg = profile_config.clone();
                cfg.set(&set_args.key, &set_args.value)?;
                config::save_profile(profile, &cfg)?;
                output::print_success(&format!("Set {} = {}", set_args.key, set_args.value));
            }
        },
    }

    Ok(())
}

fn make_context(server: &str, profile: &str, cfg: &ProfileConfig) -> Result<AdminContext> {
    let session = Session::restore(Arc::new(FileTokenStore::for_profile(profile)?))?;
    let client = ApiClient::new(ClientConfig::new(server)?, session)?;
    let cache = EntityCache::new(CacheConfig::new().with_stale_time(cfg.stale_time()));
    Ok(AdminContext::new(client, cache))
}

/// Refuse pages that need a session when none is stored.
fn authorized(ctx: AdminContext, route: Route, profile: &str) -> Result<AdminContext> {
    if guard(route, ctx.session()) == Route::Login {
        anyhow::bail!("Not logged in (profile: \"{profile}\"). Run: leaply-admin login");
    }
    Ok(ctx)
}
