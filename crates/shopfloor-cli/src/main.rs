// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

mod config;
mod runtime;

use anyhow::{Context, Result, anyhow, bail};
use config::Config;
use runtime::{Action, Plan};
use shopfloor_app::{EntityKind, ResourceId};
use shopfloor_client::Client;
use std::env;
use std::io;
use std::path::PathBuf;
use tracing::debug;
use tracing_subscriber::EnvFilter;

fn main() {
    if let Err(error) = run() {
        eprintln!("{error:#}");
        std::process::exit(1);
    }
}

fn run() -> Result<()> {
    let options = parse_cli_args(env::args().skip(1), Config::default_path()?)?;
    if options.show_help {
        print_help();
        return Ok(());
    }

    if options.print_config_path {
        println!("{}", options.config_path.display());
        return Ok(());
    }

    if options.print_example {
        print!("{}", Config::example_config(&options.config_path));
        return Ok(());
    }

    let config = Config::load(&options.config_path).with_context(|| {
        format!(
            "load config {}; run `shopfloor --print-example-config` to generate a v1 template",
            options.config_path.display()
        )
    })?;
    init_tracing(config.log_filter());

    let kind = match &options.entity {
        Some(name) => parse_entity(name)?,
        None => config.default_entity(),
    };

    let token = config.api_token();
    let client = Client::new(config.api_base_url(), token.as_deref(), config.api_timeout()?)
        .with_context(|| {
            format!(
                "invalid [api] config in {}; fix base_url/timeout values",
                options.config_path.display()
            )
        })?;
    debug!(
        base_url = client.base_url(),
        token = client.has_token(),
        timeout_ms = u64::try_from(client.timeout().as_millis()).unwrap_or(u64::MAX),
        entity = kind.as_str(),
        "configured API client"
    );
    let mut controller = runtime::rest_controller(&client, kind)?;

    if options.check_only {
        let count = runtime::check(&mut controller).with_context(|| {
            format!("API check against {} failed", client.base_url())
        })?;
        println!("ok: {} answered with {count} {}", client.base_url(), kind.as_str());
        return Ok(());
    }

    let plan = options.plan()?;
    let stdout = io::stdout();
    runtime::execute(&mut controller, &plan, &mut stdout.lock())
}

/// `RUST_LOG` wins; otherwise the config filter. Logs go to stderr so table
/// output stays pipeable.
fn init_tracing(config_filter: &str) {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(config_filter))
        .unwrap_or_else(|_| EnvFilter::new("warn"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .try_init();
}

fn parse_entity(name: &str) -> Result<EntityKind> {
    EntityKind::parse(name).ok_or_else(|| {
        let known: Vec<&str> = EntityKind::ALL.iter().map(|kind| kind.as_str()).collect();
        anyhow!(
            "unknown entity {name:?}; expected one of: {}",
            known.join(", ")
        )
    })
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct CliOptions {
    config_path: PathBuf,
    print_config_path: bool,
    print_example: bool,
    check_only: bool,
    show_help: bool,
    entity: Option<String>,
    search: Option<String>,
    sorts: Vec<String>,
    cards: bool,
    create: bool,
    edit: Option<String>,
    delete: Option<String>,
    sets: Vec<(String, String)>,
}

impl CliOptions {
    fn new(config_path: PathBuf) -> Self {
        Self {
            config_path,
            print_config_path: false,
            print_example: false,
            check_only: false,
            show_help: false,
            entity: None,
            search: None,
            sorts: Vec::new(),
            cards: false,
            create: false,
            edit: None,
            delete: None,
            sets: Vec::new(),
        }
    }

    fn plan(&self) -> Result<Plan> {
        let mutations = usize::from(self.create)
            + usize::from(self.edit.is_some())
            + usize::from(self.delete.is_some());
        if mutations > 1 {
            bail!("--create, --edit and --delete are mutually exclusive");
        }
        if !self.sets.is_empty() && !self.create && self.edit.is_none() {
            bail!("--set only applies with --create or --edit");
        }

        let action = if self.create {
            Action::Create(self.sets.clone())
        } else if let Some(raw) = &self.edit {
            Action::Edit(parse_id("--edit", raw)?, self.sets.clone())
        } else if let Some(raw) = &self.delete {
            Action::Delete(parse_id("--delete", raw)?)
        } else {
            Action::List
        };

        Ok(Plan {
            search: self.search.clone(),
            sorts: self.sorts.clone(),
            cards: self.cards,
            action,
        })
    }
}

fn parse_id(flag: &str, raw: &str) -> Result<ResourceId> {
    ResourceId::parse(raw).ok_or_else(|| anyhow!("{flag} requires a record id"))
}

fn parse_assignment(raw: &str) -> Result<(String, String)> {
    let (key, value) = raw
        .split_once('=')
        .ok_or_else(|| anyhow!("--set expects key=value, got {raw:?}"))?;
    let key = key.trim();
    if key.is_empty() {
        bail!("--set expects key=value, got {raw:?}");
    }
    Ok((key.to_owned(), value.to_owned()))
}

fn parse_cli_args<I, S>(args: I, default_config_path: PathBuf) -> Result<CliOptions>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut options = CliOptions::new(default_config_path);

    let mut iter = args.into_iter();
    while let Some(arg) = iter.next() {
        let mut value_for = |flag: &str, what: &str| -> Result<String> {
            iter.next()
                .map(|value| value.as_ref().to_owned())
                .ok_or_else(|| anyhow!("{flag} requires {what}"))
        };
        match arg.as_ref() {
            "--config" => {
                options.config_path = PathBuf::from(value_for("--config", "a file path")?);
            }
            "--print-config-path" => {
                options.print_config_path = true;
            }
            "--print-example-config" => {
                options.print_example = true;
            }
            "--check" => {
                options.check_only = true;
            }
            "--help" | "-h" => {
                options.show_help = true;
            }
            "--search" => {
                options.search = Some(value_for("--search", "a search term")?);
            }
            "--sort" => {
                options.sorts.push(value_for("--sort", "a field key")?);
            }
            "--cards" => {
                options.cards = true;
            }
            "--create" => {
                options.create = true;
            }
            "--edit" => {
                options.edit = Some(value_for("--edit", "a record id")?);
            }
            "--delete" => {
                options.delete = Some(value_for("--delete", "a record id")?);
            }
            "--set" => {
                let raw = value_for("--set", "key=value")?;
                options.sets.push(parse_assignment(&raw)?);
            }
            unknown if unknown.starts_with('-') => {
                return Err(anyhow!(
                    "unknown argument {unknown:?}; run with --help to see supported options"
                ));
            }
            entity => {
                if let Some(previous) = &options.entity {
                    bail!("entity given twice ({previous:?} and {entity:?})");
                }
                options.entity = Some(entity.to_owned());
            }
        }
    }

    Ok(options)
}

fn print_help() {
    println!("shopfloor [entity] [options]");
    println!();
    println!("  entity                   One of: workstations, materials, products, work-orders,");
    println!("                           workstation-efficiency (default from [ui].default_entity)");
    println!("  --config <path>          Use a specific config path");
    println!("  --print-config-path      Print resolved config path");
    println!("  --print-example-config   Print a v1 config template");
    println!("  --check                  Validate config and fetch the list once");
    println!("  --search <term>          Case-insensitive filter over the search fields");
    println!("  --sort <key>             Sort by key; repeat the same key to flip direction");
    println!("  --cards                  Render cards when the entity defines them");
    println!("  --create                 Create a record from --set values");
    println!("  --edit <id>              Update a record with --set values");
    println!("  --set <key=value>        Field value for --create/--edit (repeatable)");
    println!("  --delete <id>            Delete a record");
    println!("  --help                   Show this help");
}
