use clap::{Parser, Subcommand, ValueEnum};
use uuid::Uuid;

#[derive(Parser)]
#[command(name = "leaply-admin")]
#[command(about = "Leaply Admin: manage universities, programs and users")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// API base URL (overrides config and LEAPLY_URL env var)
    #[arg(short, long, global = true, env = "LEAPLY_URL")]
    pub server: Option<String>,

    /// Config profile name
    #[arg(short, long, global = true, env = "LEAPLY_PROFILE", default_value = "default")]
    pub profile: String,

    /// Output format
    #[arg(short, long, global = true)]
    pub format: Option<OutputFormat>,

    /// Log level when RUST_LOG is not set (e.g. debug, leaply_admin=trace)
    #[arg(long, global = true, default_value = "warn")]
    pub log_level: String,
}

#[derive(Clone, Copy, ValueEnum, Default, PartialEq, Eq, Debug)]
pub enum OutputFormat {
    #[default]
    Table,
    Json,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Sign in and store the session token
    Login(LoginArgs),
    /// Sign out (remove the stored session token)
    Logout,
    /// Show the current profile and session
    Whoami,
    /// Record counts per section
    Dashboard,
    /// Manage universities
    #[command(subcommand)]
    Universities(UniversityCommands),
    /// Manage programs
    #[command(subcommand)]
    Programs(ProgramCommands),
    /// Manage user accounts
    #[command(subcommand)]
    Users(UserCommands),
    /// Manage CLI configuration
    Config(ConfigArgs),
}

#[derive(clap::Args)]
pub struct LoginArgs {
    /// Username
    #[arg(short, long, default_value = "")]
    pub username: String,
    /// Password
    #[arg(long, env = "LEAPLY_PASSWORD", hide_env_values = true, default_value = "")]
    pub password: String,
}

#[derive(clap::Args)]
pub struct ListArgs {
    /// Case-insensitive search term
    #[arg(long)]
    pub search: Option<String>,
}

#[derive(clap::Args)]
pub struct DeleteArgs {
    /// Record id
    pub id: Uuid,
    /// Skip the confirmation prompt
    #[arg(short, long)]
    pub yes: bool,
}

#[derive(Subcommand)]
pub enum UniversityCommands {
    /// List universities
    List(ListArgs),
    /// Create a university
    Create(UniversityFields),
    /// Update a university; omitted fields keep their value, "" clears one
    Update {
        id: Uuid,
        #[command(flatten)]
        fields: UniversityFields,
    },
    /// Delete a university
    Delete(DeleteArgs),
}

/// University form fields. Numbers are kept as entered and validated
/// by the form.
#[derive(clap::Args, Default)]
pub struct UniversityFields {
    #[arg(long)]
    pub name: Option<String>,
    #[arg(long)]
    pub name_local: Option<String>,
    #[arg(long)]
    pub website_url: Option<String>,
    #[arg(long)]
    pub logo_url: Option<String>,
    #[arg(long)]
    pub country: Option<String>,
    #[arg(long)]
    pub city: Option<String>,
    #[arg(long)]
    pub region: Option<String>,
    /// QS world ranking
    #[arg(long)]
    pub ranking_qs: Option<String>,
    /// Times Higher Education ranking
    #[arg(long)]
    pub ranking_times: Option<String>,
    #[arg(long)]
    pub ranking_national: Option<String>,
    /// Public, Private, ...
    #[arg(long = "type")]
    pub university_type: Option<String>,
    #[arg(long)]
    pub primary_language: Option<String>,
    #[arg(long)]
    pub description: Option<String>,
}

#[derive(Subcommand)]
pub enum ProgramCommands {
    /// List programs, optionally for one university
    List {
        /// Only programs of this university
        #[arg(long)]
        university: Option<Uuid>,
        #[command(flatten)]
        list: ListArgs,
    },
    /// Create a program
    Create(ProgramFields),
    /// Update a program; omitted fields keep their value, "" clears one
    Update {
        id: Uuid,
        #[command(flatten)]
        fields: ProgramFields,
    },
    /// Delete a program
    Delete(DeleteArgs),
}

#[derive(clap::Args, Default)]
pub struct ProgramFields {
    /// Owning university id
    #[arg(long)]
    pub university: Option<String>,
    #[arg(long)]
    pub name: Option<String>,
    #[arg(long)]
    pub degree_type: Option<String>,
    #[arg(long)]
    pub degree_name: Option<String>,
    /// Comma-separated list
    #[arg(long)]
    pub major_categories: Option<String>,
    #[arg(long)]
    pub duration_months: Option<String>,
    #[arg(long)]
    pub delivery_mode: Option<String>,
    #[arg(long)]
    pub language: Option<String>,
    #[arg(long)]
    pub scholarship_available: Option<bool>,
    #[arg(long)]
    pub scholarship_notes: Option<String>,
    #[arg(long)]
    pub application_fee_usd: Option<String>,
    #[arg(long)]
    pub admissions_url: Option<String>,
    #[arg(long)]
    pub program_url: Option<String>,
    #[arg(long)]
    pub description: Option<String>,
}

#[derive(Subcommand)]
pub enum UserCommands {
    /// List user accounts
    List(ListArgs),
    /// Delete a user account
    Delete(DeleteArgs),
}

#[derive(clap::Args)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub command: ConfigCommands,
}

#[derive(Subcommand)]
pub enum ConfigCommands {
    /// Show current config
    Show,
    /// Set config value
    Set(ConfigSetArgs),
}

#[derive(clap::Args)]
pub struct ConfigSetArgs {
    /// Key to set (server, format, stale_secs)
    pub key: String,
    /// Value
    pub value: String,
}
