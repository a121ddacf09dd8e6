//! Create or remove a clinic tenant together with its doctor account, or add
//! an administrator.
//!
//! ```text
//! provision-doctor --database-url postgres://... create \
//!     --username dr_mona --phone 01001000001 --major Dermatology \
//!     --addresses "12 Nile St" --schema-name mona --domain mona.clinic.example \
//!     --default-cost 100 --default-prior-cost 250
//! provision-doctor --database-url postgres://... delete <tenant-uuid>
//! provision-doctor --database-url postgres://... superuser --username root --phone 01000000001
//! ```
//!
//! Passwords are read from the first line of standard input.
#![cfg_attr(not(any(test, doctest)), deny(clippy::unwrap_used))]
#![cfg_attr(not(any(test, doctest)), deny(clippy::expect_used))]

use std::env;
use std::io::{self, BufRead};
use std::sync::Arc;

use clap::{Args, Parser, Subcommand};
use clinic::domain::{IdentityService, ProvisionDoctorRequest, TenantId, TenantService};
use clinic::outbound::persistence::{
    DbPool, DieselTenantRepository, DieselUserRepository, PoolConfig, run_pending_migrations,
};
use clinic::outbound::security::Pbkdf2CredentialHasher;
use color_eyre::eyre::{Context, Result, eyre};
use mockable::DefaultClock;
use tokio::runtime::Builder;
use uuid::Uuid;
use zeroize::Zeroizing;

const DATABASE_URL_ENV: &str = "CLINIC_DATABASE_URL";

/// `provision-doctor` command arguments.
#[derive(Debug, Parser)]
#[command(
    name = "provision-doctor",
    about = "Provision or delete clinic tenants and administrator accounts",
    version
)]
struct CliArgs {
    /// Database connection URL. Falls back to `CLINIC_DATABASE_URL`.
    #[arg(long = "database-url", value_name = "url")]
    database_url: Option<String>,
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Create a doctor, their tenant, and its primary domain.
    Create(CreateArgs),
    /// Delete a tenant and everything it owns.
    Delete {
        #[arg(value_name = "tenant-id")]
        tenant_id: Uuid,
    },
    /// Create an administrator account outside any tenant.
    Superuser {
        #[arg(long)]
        username: String,
        #[arg(long)]
        phone: String,
    },
}

#[derive(Debug, Args)]
struct CreateArgs {
    #[arg(long)]
    username: String,
    #[arg(long)]
    phone: String,
    /// Medical speciality shown on the clinic.
    #[arg(long)]
    major: String,
    #[arg(long)]
    addresses: String,
    /// Tenant partition name: lowercase letters, digits, underscores.
    #[arg(long = "schema-name")]
    schema_name: String,
    /// Primary domain the clinic is served on.
    #[arg(long)]
    domain: String,
    #[arg(long = "default-cost")]
    default_cost: u32,
    #[arg(long = "default-prior-cost")]
    default_prior_cost: u32,
}

fn main() -> Result<()> {
    color_eyre::install()?;
    let args = CliArgs::parse();
    let runtime = Builder::new_current_thread()
        .enable_all()
        .build()
        .wrap_err("failed to create Tokio runtime")?;
    runtime.block_on(run(args))
}

async fn run(args: CliArgs) -> Result<()> {
    let database_url = resolve_database_url(args.database_url)?;
    run_pending_migrations(&database_url)
        .await
        .wrap_err("failed to apply migrations")?;
    let pool = DbPool::new(PoolConfig::new(&database_url))
        .await
        .wrap_err("failed to create database pool")?;
    let hasher = Arc::new(Pbkdf2CredentialHasher::default());
    let service = TenantService::new(
        Arc::new(DieselTenantRepository::new(pool.clone())),
        Arc::clone(&hasher),
        Arc::new(DefaultClock),
    );

    match args.command {
        Command::Create(create) => {
            let password = read_password()?;
            let provision = service
                .provision_doctor(ProvisionDoctorRequest {
                    username: create.username,
                    phone: create.phone,
                    password,
                    major: create.major,
                    addresses: create.addresses,
                    schema_name: create.schema_name,
                    domain: create.domain,
                    default_cost: create.default_cost,
                    default_prior_cost: create.default_prior_cost,
                })
                .await
                .map_err(|err| eyre!("provisioning failed: {err}"))?;
            println!("tenant_id={}", provision.tenant.id);
            println!("doctor_user_id={}", provision.doctor.id());
            println!("domain={}", provision.domain.domain);
        }
        Command::Delete { tenant_id } => {
            service
                .delete_tenant(&TenantId::from_uuid(tenant_id))
                .await
                .map_err(|err| eyre!("deletion failed: {err}"))?;
            println!("deleted tenant_id={tenant_id}");
        }
        Command::Superuser { username, phone } => {
            let identity = IdentityService::new(
                Arc::new(DieselUserRepository::new(pool)),
                hasher,
                Arc::new(DefaultClock),
            );
            let user = identity
                .provision_superuser(&username, &phone, read_password()?)
                .await
                .map_err(|err| eyre!("superuser creation failed: {err}"))?;
            println!("user_id={}", user.id());
        }
    }
    Ok(())
}

fn resolve_database_url(cli_value: Option<String>) -> Result<String> {
    cli_value
        .or_else(|| env::var(DATABASE_URL_ENV).ok())
        .filter(|url| !url.trim().is_empty())
        .ok_or_else(|| eyre!("pass --database-url or set {DATABASE_URL_ENV}"))
}

fn read_password() -> Result<Zeroizing<String>> {
    let mut line = Zeroizing::new(String::new());
    io::stdin()
        .lock()
        .read_line(&mut *line)
        .wrap_err("failed to read password from stdin")?;
    let trimmed = line.trim_end_matches(['\r', '\n']);
    Ok(Zeroizing::new(trimmed.to_owned()))
}
