//! IdentityRegistry CLI — `idr` command.
//!
//! An operator console over a persisted registry state file: issue
//! credentials, maintain the attribute schema, write and read attribute
//! values, suspend accounts and administer roles.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{anyhow, bail, Context, Result};
use base64::Engine as _;
use clap::{Parser, Subcommand};
use log::debug;
use serde::Serialize;

use identity_registry::storage::{load_state, save_state, upgrade_state};
use identity_registry::time::secs_to_datetime;
use identity_registry::{
    Account, AttributeDefinition, AttributeId, AttributeType, AttributeValue, Clock, CredentialId,
    IdentityRegistry, IssueRequest, ManualClock, RegistryConfig, RegistryEvent, Role, SystemClock,
    Uint256,
};

// ── Directory helpers ─────────────────────────────────────────────────────────

fn default_state_path() -> PathBuf {
    let home = std::env::var_os("HOME").map_or_else(|| PathBuf::from("."), PathBuf::from);
    home.join(".identity-registry").join("registry.json")
}

// ── Time parsing helpers ──────────────────────────────────────────────────────

/// Parse a duration string like "24h", "30d", "1d12h", or plain seconds.
fn parse_duration_secs(s: &str) -> Result<u64> {
    let s = s.trim();

    if let Ok(n) = s.parse::<u64>() {
        return Ok(n);
    }

    let mut total: u64 = 0;
    let mut current = String::new();

    for ch in s.chars() {
        if ch.is_ascii_digit() {
            current.push(ch);
        } else {
            let val: u64 = current
                .parse()
                .map_err(|_| anyhow!("invalid duration: {s}"))?;
            current.clear();
            let unit = match ch {
                'y' => 365 * 86400,
                'd' => 86400,
                'h' => 3600,
                'm' => 60,
                's' => 1,
                _ => bail!("unknown duration unit '{ch}' in '{s}'"),
            };
            total = total
                .checked_add(val.saturating_mul(unit))
                .ok_or_else(|| anyhow!("duration '{s}' overflows"))?;
        }
    }

    if !current.is_empty() {
        bail!("duration '{s}' is missing a unit (y/d/h/m/s)");
    }

    Ok(total)
}

/// An expiry is either an absolute unix timestamp (`1767225600`) or a
/// duration from now prefixed with `+` (`+730d`).
fn parse_expiry(s: &str, now: u64) -> Result<u64> {
    match s.strip_prefix('+') {
        Some(rel) => now
            .checked_add(parse_duration_secs(rel)?)
            .ok_or_else(|| anyhow!("expiry '{s}' overflows")),
        None => s
            .trim()
            .parse::<u64>()
            .map_err(|_| anyhow!("invalid expiry '{s}': expected unix seconds or +DURATION")),
    }
}

fn parse_bool(s: &str) -> Result<bool> {
    match s.to_ascii_lowercase().as_str() {
        "true" | "yes" | "1" => Ok(true),
        "false" | "no" | "0" => Ok(false),
        _ => bail!("invalid bool '{s}'"),
    }
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

// ── CLI structure ─────────────────────────────────────────────────────────────

/// IdentityRegistry CLI — issue non-transferable identity credentials and
/// manage their expiring attributes.
#[derive(Parser, Debug)]
#[command(
    name = "idr",
    about = "IdentityRegistry CLI",
    version,
    long_about = "idr — IdentityRegistry CLI\n\nIssue one non-transferable credential per account, maintain typed\nexpiring attributes, and suspend accounts."
)]
struct Cli {
    /// Registry state file (default: ~/.identity-registry/registry.json)
    #[arg(long, global = true)]
    state: Option<PathBuf>,

    /// Account performing the operation
    #[arg(long = "as", global = true, value_name = "ACCOUNT")]
    caller: Option<String>,

    /// Use this unix time instead of the system clock
    #[arg(long, global = true, value_name = "SECS")]
    now: Option<u64>,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Create a new registry state file
    Init {
        /// Account receiving ADMIN and OPERATOR
        #[arg(long)]
        foundation: Option<String>,

        /// Account receiving OPERATOR
        #[arg(long)]
        operator: Option<String>,

        /// Read foundation/operator from a JSON config file instead
        #[arg(long)]
        config: Option<PathBuf>,

        /// Do not create the five standard attributes
        #[arg(long)]
        no_bootstrap: bool,

        /// Overwrite an existing state file
        #[arg(long)]
        force: bool,
    },

    /// Inspect and maintain the attribute schema
    Schema {
        #[command(subcommand)]
        subcommand: SchemaCommands,
    },

    /// Issue a credential and its core attributes
    Issue {
        /// Account to verify
        account: String,

        #[arg(long)]
        primary_id: String,

        /// Country code, e.g. "sg"
        #[arg(long)]
        country: String,

        #[arg(long)]
        liveliness: String,

        #[arg(long)]
        user_type: Uint256,

        /// Expiry for all four core attributes (unix seconds or +DURATION)
        #[arg(long, allow_hyphen_values = true)]
        expires: String,

        /// Metadata URI for the credential
        #[arg(long, default_value = "")]
        uri: String,
    },

    /// Write and read attribute values
    Attr {
        #[command(subcommand)]
        subcommand: AttrCommands,
    },

    /// Suspend an account
    Suspend {
        account: String,

        #[arg(long)]
        reason: String,
    },

    /// Lift an account's suspension
    Unsuspend { account: String },

    /// Show an account's credential, suspension and attributes
    Status { account: String },

    /// Administer roles
    Role {
        #[command(subcommand)]
        subcommand: RoleCommands,
    },

    /// Credential metadata URI
    Uri {
        #[command(subcommand)]
        subcommand: UriCommands,
    },

    /// Attempt to transfer a credential (always refused)
    Transfer {
        from: String,
        to: String,
        credential_id: u64,
    },

    /// Storage layout upgrades
    Migrate {
        #[command(subcommand)]
        subcommand: MigrateCommands,
    },
}

#[derive(Subcommand, Debug)]
enum SchemaCommands {
    /// List visible attribute definitions
    List,

    /// Append a new attribute
    Add {
        name: String,
        /// bool, string, uint or bytes
        attribute_type: AttributeType,
    },

    /// Correct an attribute's name
    Rename { attribute: String, name: String },

    /// Correct an attribute's declared type
    Retype {
        attribute: String,
        attribute_type: AttributeType,
    },

    /// Force the attribute count (hides or exposes ids)
    SetCount { count: u64 },
}

#[derive(Subcommand, Debug)]
enum AttrCommands {
    /// Write an attribute value for a verified account
    Set {
        account: String,
        /// Attribute id or name
        attribute: String,
        /// Value; bytes attributes take base64
        value: String,

        /// Expiry (unix seconds or +DURATION)
        #[arg(long, allow_hyphen_values = true)]
        expires: String,
    },

    /// Read an attribute value
    Get { account: String, attribute: String },
}

#[derive(Subcommand, Debug)]
enum RoleCommands {
    /// Grant a role (ADMIN only)
    Grant { role: Role, account: String },

    /// Revoke a role (ADMIN only)
    Revoke { role: Role, account: String },

    /// Drop one of your own roles
    Renounce { role: Role },

    /// List role members
    List { role: Option<Role> },
}

#[derive(Subcommand, Debug)]
enum UriCommands {
    /// Replace a credential's metadata URI
    Set {
        account: String,
        credential_id: u64,
        uri: String,
    },

    /// Show a credential's metadata URI
    Get { credential_id: u64 },
}

#[derive(Subcommand, Debug)]
enum MigrateCommands {
    /// Approve a newer storage layout (ADMIN only)
    Authorize { to_layout: u32 },

    /// Replace the state with an upgraded state file after checking that
    /// it only extends the current one
    Import { file: PathBuf },
}

// ── Session ───────────────────────────────────────────────────────────────────

/// Global options shared by every command.
struct Session {
    state: PathBuf,
    caller: Option<Account>,
    now: Option<u64>,
    verbose: bool,
}

impl Session {
    fn clock(&self) -> Arc<dyn Clock> {
        match self.now {
            Some(secs) => Arc::new(ManualClock::new(secs)),
            None => Arc::new(SystemClock),
        }
    }

    fn caller(&self) -> Result<&Account> {
        self.caller
            .as_ref()
            .ok_or_else(|| anyhow!("this command needs --as <ACCOUNT>"))
    }

    fn open(&self) -> Result<IdentityRegistry> {
        if !self.state.exists() {
            bail!(
                "no registry at {} (run `idr init` first)",
                self.state.display()
            );
        }
        debug!("loading registry state from {}", self.state.display());
        let state = load_state(&self.state)
            .with_context(|| format!("failed to load {}", self.state.display()))?;
        Ok(IdentityRegistry::from_state(state, self.clock()))
    }

    fn save(&self, registry: &mut IdentityRegistry) -> Result<()> {
        let events = registry.drain_events();
        save_state(registry.state(), &self.state).context("failed to save registry state")?;
        if self.verbose {
            print_events(&events)?;
        }
        Ok(())
    }

    /// Load, apply one operation as `--as`, save.
    fn mutate<T>(
        &self,
        op: impl FnOnce(&mut IdentityRegistry, &Account) -> identity_registry::Result<T>,
    ) -> Result<T> {
        let caller = self.caller()?.clone();
        let mut registry = self.open()?;
        let out = op(&mut registry, &caller)?;
        self.save(&mut registry)?;
        Ok(out)
    }
}

fn print_events(events: &[RegistryEvent]) -> Result<()> {
    for event in events {
        println!("  event: {}", serde_json::to_string(event)?);
    }
    Ok(())
}

/// Accept an attribute id or a schema name.
fn resolve_attribute(registry: &IdentityRegistry, attribute: &str) -> Result<AttributeId> {
    if let Ok(n) = attribute.parse::<u64>() {
        return Ok(AttributeId(n));
    }
    registry
        .state()
        .attributes
        .find(attribute)
        .ok_or_else(|| anyhow!("no attribute named '{attribute}'"))
}

fn parse_value(attribute_type: AttributeType, raw: &str) -> Result<AttributeValue> {
    Ok(match attribute_type {
        AttributeType::Bool => AttributeValue::Bool(parse_bool(raw)?),
        AttributeType::String => AttributeValue::Str(raw.to_string()),
        AttributeType::UInt => AttributeValue::UInt(
            raw.parse::<Uint256>()
                .with_context(|| format!("invalid uint '{raw}'"))?,
        ),
        AttributeType::Bytes => AttributeValue::Bytes(
            base64::engine::general_purpose::STANDARD
                .decode(raw)
                .with_context(|| format!("invalid base64 '{raw}'"))?,
        ),
    })
}

fn format_value(value: &AttributeValue) -> String {
    match value {
        AttributeValue::Bool(b) => b.to_string(),
        AttributeValue::Str(s) => format!("{s:?}"),
        AttributeValue::UInt(v) => v.to_string(),
        AttributeValue::Bytes(b) => base64::engine::general_purpose::STANDARD.encode(b),
    }
}

// ── Main ──────────────────────────────────────────────────────────────────────

fn main() {
    env_logger::init();

    let cli = Cli::parse();
    let session = Session {
        state: cli.state.unwrap_or_else(default_state_path),
        caller: cli.caller.map(Account::from),
        now: cli.now,
        verbose: cli.verbose,
    };

    let result = match cli.command {
        Commands::Init {
            foundation,
            operator,
            config,
            no_bootstrap,
            force,
        } => cmd_init(&session, foundation, operator, config.as_deref(), no_bootstrap, force),
        Commands::Schema { subcommand } => match subcommand {
            SchemaCommands::List => cmd_schema_list(&session),
            SchemaCommands::Add {
                name,
                attribute_type,
            } => cmd_schema_add(&session, &name, attribute_type),
            SchemaCommands::Rename { attribute, name } => {
                cmd_schema_rename(&session, &attribute, &name)
            }
            SchemaCommands::Retype {
                attribute,
                attribute_type,
            } => cmd_schema_retype(&session, &attribute, attribute_type),
            SchemaCommands::SetCount { count } => cmd_schema_set_count(&session, count),
        },
        Commands::Issue {
            account,
            primary_id,
            country,
            liveliness,
            user_type,
            expires,
            uri,
        } => cmd_issue(
            &session,
            &account,
            &primary_id,
            country,
            &liveliness,
            user_type,
            &expires,
            uri,
        ),
        Commands::Attr { subcommand } => match subcommand {
            AttrCommands::Set {
                account,
                attribute,
                value,
                expires,
            } => cmd_attr_set(&session, &account, &attribute, &value, &expires),
            AttrCommands::Get { account, attribute } => {
                cmd_attr_get(&session, &account, &attribute)
            }
        },
        Commands::Suspend { account, reason } => cmd_suspend(&session, &account, reason),
        Commands::Unsuspend { account } => cmd_unsuspend(&session, &account),
        Commands::Status { account } => cmd_status(&session, &account),
        Commands::Role { subcommand } => match subcommand {
            RoleCommands::Grant { role, account } => cmd_role_grant(&session, role, &account),
            RoleCommands::Revoke { role, account } => cmd_role_revoke(&session, role, &account),
            RoleCommands::Renounce { role } => cmd_role_renounce(&session, role),
            RoleCommands::List { role } => cmd_role_list(&session, role),
        },
        Commands::Uri { subcommand } => match subcommand {
            UriCommands::Set {
                account,
                credential_id,
                uri,
            } => cmd_uri_set(&session, &account, credential_id, uri),
            UriCommands::Get { credential_id } => cmd_uri_get(&session, credential_id),
        },
        Commands::Transfer {
            from,
            to,
            credential_id,
        } => cmd_transfer(&session, &from, &to, credential_id),
        Commands::Migrate { subcommand } => match subcommand {
            MigrateCommands::Authorize { to_layout } => cmd_migrate_authorize(&session, to_layout),
            MigrateCommands::Import { file } => cmd_migrate_import(&session, &file),
        },
    };

    if let Err(e) = result {
        eprintln!("error: {e:#}");
        std::process::exit(1);
    }
}

// ── Command implementations ───────────────────────────────────────────────────

/// `idr init --foundation F --operator O`
fn cmd_init(
    session: &Session,
    foundation: Option<String>,
    operator: Option<String>,
    config: Option<&Path>,
    no_bootstrap: bool,
    force: bool,
) -> Result<()> {
    if session.state.exists() && !force {
        bail!(
            "registry already exists at {} (use --force to overwrite)",
            session.state.display()
        );
    }

    let mut config = match (config, foundation, operator) {
        (Some(path), None, None) => RegistryConfig::load(path)
            .with_context(|| format!("failed to read config {}", path.display()))?,
        (None, Some(f), Some(o)) => RegistryConfig::new(f, o),
        (Some(_), _, _) => bail!("--config cannot be combined with --foundation/--operator"),
        _ => bail!("init needs --foundation and --operator (or --config)"),
    };
    if no_bootstrap {
        config = config.without_bootstrap_attributes();
    }

    let registry = IdentityRegistry::new(&config, session.clock());
    save_state(registry.state(), &session.state).context("failed to save registry state")?;

    println!("Created registry");
    println!("  Foundation: {}", config.foundation);
    println!("  Operator:   {}", config.network_operator);
    println!("  Attributes: {}", registry.attribute_count());
    println!("  File:       {}", session.state.display());
    Ok(())
}

/// `idr schema list`
fn cmd_schema_list(session: &Session) -> Result<()> {
    let registry = session.open()?;
    println!("Attributes ({}):", registry.attribute_count());
    for row in schema_rows(registry.attribute_count(), &registry.attribute_definitions()) {
        println!("  {row}");
    }
    Ok(())
}

/// One row per definition, and one row per run of undefined ids below
/// `count`.
fn schema_rows(count: u64, definitions: &[AttributeDefinition]) -> Vec<String> {
    let undefined = |from: u64, to: u64| -> String {
        if from == to {
            format!("[{from}] <undefined> (bool)")
        } else {
            format!("[{from}..={to}] <undefined> (bool)")
        }
    };
    let mut rows = Vec::with_capacity(definitions.len() + 1);
    let mut next = 0u64;
    for d in definitions {
        if d.id.0 > next {
            rows.push(undefined(next, d.id.0 - 1));
        }
        rows.push(format!("[{}] {} ({})", d.id, d.name, d.attribute_type));
        next = d.id.0.saturating_add(1);
    }
    if count > next {
        rows.push(undefined(next, count - 1));
    }
    rows
}

/// `idr schema add NAME TYPE`
fn cmd_schema_add(session: &Session, name: &str, attribute_type: AttributeType) -> Result<()> {
    let id = session.mutate(|r, caller| r.add_attribute(caller, name, attribute_type))?;
    println!("Added attribute {id}: {name} ({attribute_type})");
    Ok(())
}

/// `idr schema rename ATTRIBUTE NAME`
fn cmd_schema_rename(session: &Session, attribute: &str, name: &str) -> Result<()> {
    let id = resolve_attribute(&session.open()?, attribute)?;
    session.mutate(|r, caller| r.set_attribute_name(caller, id, name))?;
    println!("Renamed attribute {id} to {name}");
    Ok(())
}

/// `idr schema retype ATTRIBUTE TYPE`
fn cmd_schema_retype(
    session: &Session,
    attribute: &str,
    attribute_type: AttributeType,
) -> Result<()> {
    let id = resolve_attribute(&session.open()?, attribute)?;
    session.mutate(|r, caller| r.set_attribute_type(caller, id, attribute_type))?;
    println!("Attribute {id} is now {attribute_type}");
    println!("  Values written under the old type are unreadable until rewritten.");
    Ok(())
}

/// `idr schema set-count N`
fn cmd_schema_set_count(session: &Session, count: u64) -> Result<()> {
    session.mutate(|r, caller| r.set_attribute_count(caller, count))?;
    println!("Attribute count set to {count}");
    Ok(())
}

/// `idr issue ACCOUNT --primary-id B --country C --liveliness B --user-type N --expires E`
#[allow(clippy::too_many_arguments)]
fn cmd_issue(
    session: &Session,
    account: &str,
    primary_id: &str,
    country: String,
    liveliness: &str,
    user_type: Uint256,
    expires: &str,
    uri: String,
) -> Result<()> {
    let account = Account::new(account);
    let expiry = parse_expiry(expires, session.clock().now())?;
    let request = IssueRequest {
        primary_id: parse_bool(primary_id)?,
        country_code: country,
        proof_of_liveliness: parse_bool(liveliness)?,
        user_type,
        expiries: [expiry; 4],
        uri,
    };
    let credential_id = session.mutate(|r, caller| r.issue_identity(caller, &account, request))?;
    println!("Issued credential {credential_id} to {account}");
    Ok(())
}

/// `idr attr set ACCOUNT ATTRIBUTE VALUE --expires E`
fn cmd_attr_set(
    session: &Session,
    account: &str,
    attribute: &str,
    raw: &str,
    expires: &str,
) -> Result<()> {
    let account = Account::new(account);
    let registry = session.open()?;
    let id = resolve_attribute(&registry, attribute)?;
    let attribute_type = registry
        .attribute_type(id)
        .with_context(|| format!("attribute {attribute}"))?;
    let value = parse_value(attribute_type, raw)?;
    let expiry = parse_expiry(expires, registry.now())?;

    session.mutate(|r, caller| r.set_attribute(caller, &account, id, value, expiry))?;
    println!(
        "Set {} for {account} (expires {})",
        registry.attribute_name(id),
        secs_to_datetime(expiry)
    );
    Ok(())
}

/// `idr attr get ACCOUNT ATTRIBUTE`
fn cmd_attr_get(session: &Session, account: &str, attribute: &str) -> Result<()> {
    let account = Account::new(account);
    let registry = session.open()?;
    let id = resolve_attribute(&registry, attribute)?;
    let attribute_type = registry.attribute_type(id)?;
    let reading = registry.get_attribute(&account, id, attribute_type)?;

    if session.verbose {
        return print_json(&reading);
    }
    println!("{} [{id}] for {account}", registry.attribute_name(id));
    println!("  Value:   {}", format_value(&reading.value));
    if reading.is_set() {
        let status = if reading.is_valid_at(registry.now()) {
            "valid"
        } else {
            "EXPIRED"
        };
        println!("  Expiry:  {} ({status})", secs_to_datetime(reading.expiry));
        println!("  Updated: {}", secs_to_datetime(reading.updated_at));
    } else {
        println!("  (never set)");
    }
    Ok(())
}

/// `idr suspend ACCOUNT --reason R`
fn cmd_suspend(session: &Session, account: &str, reason: String) -> Result<()> {
    let account = Account::new(account);
    session.mutate(|r, caller| r.suspend_account(caller, &account, reason))?;
    println!("Suspended {account}");
    Ok(())
}

/// `idr unsuspend ACCOUNT`
fn cmd_unsuspend(session: &Session, account: &str) -> Result<()> {
    let account = Account::new(account);
    session.mutate(|r, caller| r.unsuspend_account(caller, &account))?;
    println!("Unsuspended {account}");
    Ok(())
}

/// `idr status ACCOUNT`
fn cmd_status(session: &Session, account: &str) -> Result<()> {
    let account = Account::new(account);
    let registry = session.open()?;
    let now = registry.now();

    println!("Account: {account}");
    match registry.credential_of(&account) {
        Some(record) => {
            println!("  Credential: {}", record.credential_id);
            println!("  Issued:     {}", secs_to_datetime(record.issued_at));
        }
        None => println!("  Credential: none"),
    }
    let suspension = registry.suspension(&account);
    if suspension.suspended {
        println!("  Suspended:  yes ({})", suspension.reason);
    } else {
        println!("  Suspended:  no");
    }

    let roles: Vec<String> = registry
        .roles_of(&account)
        .iter()
        .map(ToString::to_string)
        .collect();
    if !roles.is_empty() {
        println!("  Roles:      {}", roles.join(", "));
    }

    println!("  Attributes:");
    for definition in registry.attribute_definitions() {
        let line = match registry.get_attribute(&account, definition.id, definition.attribute_type)
        {
            Ok(reading) if !reading.is_set() => continue,
            Ok(reading) => {
                let flag = if reading.is_valid_at(now) { "" } else { " EXPIRED" };
                format!(
                    "{} = {} (until {}){flag}",
                    definition.name,
                    format_value(&reading.value),
                    secs_to_datetime(reading.expiry)
                )
            }
            Err(e) => format!("{} unreadable: {e}", definition.name),
        };
        println!("    [{}] {line}", definition.id);
    }
    Ok(())
}

/// `idr role grant ROLE ACCOUNT`
fn cmd_role_grant(session: &Session, role: Role, account: &str) -> Result<()> {
    let account = Account::new(account);
    session.mutate(|r, caller| r.grant_role(caller, role, &account))?;
    println!("{account} has {role}");
    Ok(())
}

/// `idr role revoke ROLE ACCOUNT`
fn cmd_role_revoke(session: &Session, role: Role, account: &str) -> Result<()> {
    let account = Account::new(account);
    session.mutate(|r, caller| r.revoke_role(caller, role, &account))?;
    println!("{account} no longer has {role}");
    Ok(())
}

/// `idr role renounce ROLE`
fn cmd_role_renounce(session: &Session, role: Role) -> Result<()> {
    let caller = session.mutate(|r, caller| {
        r.renounce_role(caller, role);
        Ok(caller.clone())
    })?;
    println!("{caller} renounced {role}");
    Ok(())
}

/// `idr role list [ROLE]`
fn cmd_role_list(session: &Session, role: Option<Role>) -> Result<()> {
    let registry = session.open()?;
    let roles: Vec<Role> = match role {
        Some(role) => vec![role],
        None => Role::ALL.to_vec(),
    };
    for role in roles {
        let members = registry.role_members(role);
        println!("{role} ({}):", members.len());
        for member in members {
            println!("  {member}");
        }
    }
    Ok(())
}

/// `idr uri set ACCOUNT CREDENTIAL_ID URI`
fn cmd_uri_set(session: &Session, account: &str, credential_id: u64, uri: String) -> Result<()> {
    let account = Account::new(account);
    let id = CredentialId(credential_id);
    session.mutate(|r, caller| r.set_token_uri(caller, &account, id, uri))?;
    println!("Updated URI of credential {id}");
    Ok(())
}

/// `idr uri get CREDENTIAL_ID`
fn cmd_uri_get(session: &Session, credential_id: u64) -> Result<()> {
    let registry = session.open()?;
    println!("{}", registry.token_uri(CredentialId(credential_id))?);
    Ok(())
}

/// `idr transfer FROM TO CREDENTIAL_ID`
fn cmd_transfer(session: &Session, from: &str, to: &str, credential_id: u64) -> Result<()> {
    let registry = session.open()?;
    let caller = session
        .caller
        .clone()
        .unwrap_or_else(|| Account::new(from));
    registry.transfer_credential(
        &caller,
        &Account::new(from),
        &Account::new(to),
        CredentialId(credential_id),
    )?;
    Ok(())
}

/// `idr migrate authorize TO_LAYOUT`
fn cmd_migrate_authorize(session: &Session, to_layout: u32) -> Result<()> {
    session.mutate(|r, caller| r.authorize_migration(caller, to_layout))?;
    println!("Authorized migration to layout {to_layout}");
    Ok(())
}

/// `idr migrate import FILE`
fn cmd_migrate_import(session: &Session, file: &Path) -> Result<()> {
    let caller = session.caller()?;
    let current = session.open()?;
    if !current.has_role(Role::Admin, caller) {
        bail!("{caller} is missing role {}", Role::Admin);
    }
    let candidate =
        load_state(file).with_context(|| format!("failed to load {}", file.display()))?;
    let upgraded = upgrade_state(current.state(), candidate).context("upgrade refused")?;
    save_state(&upgraded, &session.state).context("failed to save registry state")?;
    println!("Imported {} (layout {})", file.display(), upgraded.layout_version);
    Ok(())
}

// ── Tests ─────────────────────────────────────────────────────────────────────
