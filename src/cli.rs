use std::path::PathBuf;
use std::sync::Arc;

use clap::{Args, Parser, Subcommand};
use color_eyre::eyre::{Result, WrapErr, eyre};

use crate::app::{LayerHooks, TableRename, TableRenamer, affected_table_names};
use crate::domain::layer::QUERY;
use crate::domain::{ActingUser, Layer, LayerKind};
use crate::infra::adapters::{JsonTableCatalog, TracingInvalidationSink, load_layer, save_layer};
use crate::infra::config::{Settings, TomlSettingsStore};

/// Find and rename the tables map layers read.
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Settings file to use instead of the default location
    #[arg(long, global = true, value_name = "FILE")]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Print the qualified table names a query or layer reads
    Names(NamesArgs),
    /// Print the catalog tables a layer reads, as JSON
    Affected(AffectedArgs),
    /// Rename a table inside a layer's query, style and table name
    Rename(RenameArgs),
    /// Write a settings file with the default values
    InitConfig(InitConfigArgs),
}

#[derive(Args, Debug)]
pub struct UserArgs {
    /// Username of the acting user
    #[arg(long)]
    pub user: String,

    /// Organization the acting user belongs to
    #[arg(long)]
    pub org: Option<String>,
}

impl UserArgs {
    pub fn acting_user(&self) -> ActingUser {
        match &self.org {
            Some(org) => ActingUser::in_organization(self.user.clone(), org.clone()),
            None => ActingUser::new(self.user.clone()),
        }
    }
}

#[derive(Args, Debug)]
pub struct NamesArgs {
    #[command(flatten)]
    pub user: UserArgs,

    #[arg(long, conflicts_with = "layer", required_unless_present = "layer")]
    pub query: Option<String>,

    #[arg(long, value_name = "FILE")]
    pub layer: Option<PathBuf>,
}

#[derive(Args, Debug)]
pub struct AffectedArgs {
    #[command(flatten)]
    pub user: UserArgs,

    #[arg(long, value_name = "FILE")]
    pub layer: PathBuf,

    /// Catalog snapshot; falls back to `catalog.path` in the settings
    #[arg(long, value_name = "FILE")]
    pub catalog: Option<PathBuf>,
}

#[derive(Args, Debug)]
pub struct RenameArgs {
    #[arg(long, value_name = "FILE")]
    pub layer: PathBuf,

    #[arg(long)]
    pub from: String,

    #[arg(long)]
    pub to: String,

    /// Only rename references qualified with this schema, or unqualified ones
    #[arg(long)]
    pub schema: Option<String>,

    /// Write the renamed layer back instead of printing it
    #[arg(long)]
    pub write: bool,
}

#[derive(Args, Debug)]
pub struct InitConfigArgs {
    /// Replace an existing settings file
    #[arg(long)]
    pub force: bool,
}

impl Cli {
    /// `None` when there is no `--config` and no config directory.
    pub fn settings_store(&self) -> Option<TomlSettingsStore> {
        match &self.config {
            Some(path) => Some(TomlSettingsStore::with_path(path.clone())),
            None => TomlSettingsStore::new().ok(),
        }
    }

    /// `init-config` starts from defaults so it can replace a broken file.
    pub fn load_settings(&self) -> Result<Settings> {
        if matches!(self.command, Command::InitConfig(_)) {
            return Ok(Settings::default());
        }
        let Some(store) = self.settings_store() else {
            return Ok(Settings::default());
        };
        store
            .load()
            .wrap_err_with(|| format!("loading {}", store.storage_path().display()))
    }
}

/// Runs a command and returns what it prints.
pub fn run(command: &Command, settings: &Settings, store: Option<&TomlSettingsStore>) -> Result<String> {
    match command {
        Command::Names(args) => names(args),
        Command::Affected(args) => affected(args, settings),
        Command::Rename(args) => rename(args),
        Command::InitConfig(args) => init_config(args, store),
    }
}

fn names(args: &NamesArgs) -> Result<String> {
    let user = args.user.acting_user();
    user.validate()?;

    let layer = match (&args.query, &args.layer) {
        (Some(query), _) => Layer::new(LayerKind::Carto).with_option(QUERY, query.as_str()),
        (None, Some(path)) => load_layer(path)?,
        (None, None) => return Err(eyre!("either --query or --layer is required")),
    };

    let mut names: Vec<String> = affected_table_names(&layer, &user)
        .iter()
        .map(ToString::to_string)
        .collect();
    names.sort();
    Ok(names.join("\n"))
}

fn affected(args: &AffectedArgs, settings: &Settings) -> Result<String> {
    let catalog_path = args
        .catalog
        .as_ref()
        .or(settings.catalog.path.as_ref())
        .ok_or_else(|| eyre!("no catalog given: pass --catalog or set catalog.path"))?;
    let catalog = JsonTableCatalog::load(catalog_path)?;
    let layer = load_layer(&args.layer)?;

    let hooks = LayerHooks::new(Arc::new(catalog), Arc::new(TracingInvalidationSink));
    let outcome = hooks.before_save(&layer, &args.user.acting_user())?;

    Ok(serde_json::to_string_pretty(&outcome.affected)?)
}

fn rename(args: &RenameArgs) -> Result<String> {
    let mut layer = load_layer(&args.layer)?;
    let mut table_rename = TableRename::new(args.from.as_str(), args.to.as_str());
    if let Some(schema) = &args.schema {
        table_rename = table_rename.in_schema(schema.as_str());
    }

    let outcome = TableRenamer::new().rename(&mut layer, &table_rename);

    if args.write {
        if outcome.changed() {
            save_layer(&args.layer, &layer)?;
        }
        return Ok(format!(
            "query: {}, tile_style: {}, table_name: {}",
            changed_label(outcome.query),
            changed_label(outcome.tile_style),
            changed_label(outcome.table_name),
        ));
    }

    Ok(serde_json::to_string_pretty(&layer)?)
}

fn init_config(args: &InitConfigArgs, store: Option<&TomlSettingsStore>) -> Result<String> {
    let store = store.ok_or_else(|| eyre!("no config directory: pass --config"))?;
    let path = store.storage_path();
    if path.exists() && !args.force {
        return Err(eyre!(
            "{} already exists: pass --force to overwrite",
            path.display()
        ));
    }

    store.save(&Settings::default())?;
    Ok(format!("wrote {}", path.display()))
}

fn changed_label(changed: bool) -> &'static str {
    if changed { "renamed" } else { "unchanged" }
}
