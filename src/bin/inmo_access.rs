//! `inmo-access` CLI.
//!
//! Evaluates plan-limit and role-access decisions against the access policy,
//! for operators and for scripting:
//!
//! ```text
//! inmo-access can-add --role admin --plan 2 --resource users --count 9
//! inmo-access migrate-role "Super Admin"
//! inmo-access paths gestor
//! ```
//!
//! Results go to stdout, logs (bunyan JSON) to stderr.

use std::path::PathBuf;

use anyhow::anyhow;
use clap::{Parser, Subcommand};
use inmo_access::configuration::{get_configuration, resolve_settings};
use inmo_access::console::commands::{self, CallableTrait};
use inmo_access::models::Resource;
use inmo_access::telemetry::{get_subscriber, init_subscriber};

#[derive(Parser, Debug)]
#[command(
    name = "inmo-access",
    version,
    about = "Inspect plan limits and role access for the brokerage back office"
)]
struct Cli {
    /// Policy file (YAML). Defaults to INMO_POLICY_FILE, then the built-in policy
    #[arg(long, global = true, value_name = "FILE")]
    config: Option<PathBuf>,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Whether the user may create one more user/property
    CanAdd {
        /// Role of the acting user (legacy spellings accepted)
        #[arg(long)]
        role: String,
        /// Plan id of the user's tenant
        #[arg(long)]
        plan: Option<String>,
        /// users or properties
        #[arg(long)]
        resource: Resource,
        /// Number of resources that already exist
        #[arg(long, default_value_t = 0)]
        count: u32,
    },
    /// Plan consumption for a resource, as JSON
    Usage {
        #[arg(long)]
        role: String,
        #[arg(long)]
        plan: Option<String>,
        #[arg(long)]
        resource: Resource,
        #[arg(long, default_value_t = 0)]
        count: u32,
    },
    /// Print the plan catalog
    Plans,
    /// Map a legacy role name to its canonical id
    MigrateRole { raw: String },
    /// Landing route for a role
    Route { role: String },
    /// Default permission flags for a role
    Permissions { role: String },
    /// Navigation paths visible to a role
    Paths {
        role: String,
        /// Permission flags as JSON, e.g. '{"operaciones": true}'. Defaults to the role's defaults
        #[arg(long, value_name = "JSON")]
        permissions: Option<String>,
    },
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let (settings, settings_error) = resolve_settings(get_configuration(), cli.config.is_some())?;

    let subscriber =
        get_subscriber("inmo-access".into(), settings.log_filter.clone(), std::io::stderr);
    init_subscriber(subscriber);
    if let Some(err) = settings_error {
        tracing::warn!(error = %err, "Ignoring settings, using defaults");
    }

    let command = get_command(cli);
    command.call(&settings).map_err(|err| anyhow!("{}", err))
}

fn get_command(cli: Cli) -> Box<dyn CallableTrait> {
    let config = cli.config;
    match cli.command {
        Commands::CanAdd {
            role,
            plan,
            resource,
            count,
        } => Box::new(commands::plan::CanAddCommand::new(
            config, role, plan, resource, count,
        )),
        Commands::Usage {
            role,
            plan,
            resource,
            count,
        } => Box::new(commands::plan::UsageCommand::new(
            config, role, plan, resource, count,
        )),
        Commands::Plans => Box::new(commands::plan::PlansCommand::new(config)),
        Commands::MigrateRole { raw } => {
            Box::new(commands::role::MigrateRoleCommand::new(config, raw))
        }
        Commands::Route { role } => Box::new(commands::role::RouteCommand::new(config, role)),
        Commands::Permissions { role } => {
            Box::new(commands::role::PermissionsCommand::new(config, role))
        }
        Commands::Paths { role, permissions } => Box::new(commands::role::PathsCommand::new(
            config,
            role,
            permissions,
        )),
    }
}
