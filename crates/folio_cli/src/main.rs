//! Folio CLI
//!
//! Reads and changes the persisted theme and language, looks up UI strings
//! and lists the bundled projects.

mod config;
mod context;

use anyhow::{bail, Result};
use clap::{Parser, Subcommand};
use folio_core::{Language, PreferenceError, PreferenceStore, PreferenceValue, Theme};
use std::fmt::Display;
use std::path::PathBuf;
use std::str::FromStr;
use tracing_subscriber::EnvFilter;

use crate::config::{FolioConfig, CONFIG_FILE};
use crate::context::{AppContext, THEME_ATTRIBUTE};

/// Portfolio preferences, strings and projects
#[derive(Parser, Debug)]
#[command(name = "folio")]
#[command(about = "Portfolio preferences, strings and projects")]
#[command(version)]
struct Args {
    /// Configuration file or directory containing folio.toml
    #[arg(short, long, default_value = CONFIG_FILE)]
    config: PathBuf,

    /// Log debug output
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    #[command(flatten)]
    App(AppCommand),
    /// Print the effective configuration
    Config,
}

/// Commands that run against the preference stores and tables
#[derive(Subcommand, Debug)]
enum AppCommand {
    /// Show or change the color theme
    Theme {
        #[command(subcommand)]
        action: Option<PrefAction>,
    },
    /// Show or change the UI language
    Lang {
        #[command(subcommand)]
        action: Option<PrefAction>,
    },
    /// Translate a dotted key
    T {
        key: String,
        /// Locale to use instead of the stored language
        #[arg(short, long)]
        locale: Option<String>,
    },
    /// Inspect translation catalogs
    I18n {
        #[command(subcommand)]
        action: I18nAction,
    },
    /// Browse projects
    Projects {
        #[command(subcommand)]
        action: ProjectAction,
    },
}

#[derive(Subcommand, Debug)]
enum PrefAction {
    /// Print the current value
    Get,
    /// Store a new value
    Set { value: String },
    /// Switch to the other value
    Toggle,
}

#[derive(Subcommand, Debug)]
enum I18nAction {
    /// List every key of a locale
    Keys {
        #[arg(short, long, default_value = "EN")]
        locale: String,
    },
    /// Fail if any locale lacks keys another one has
    Check,
}

#[derive(Subcommand, Debug)]
enum ProjectAction {
    /// List projects
    List {
        /// Only featured projects
        #[arg(long)]
        featured: bool,
    },
    /// Show one project
    Show { slug: String },
}

fn main() -> Result<()> {
    let args = Args::parse();

    let default_level = if args.verbose { "debug" } else { "warn" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .with_writer(std::io::stderr)
        .init();

    let config = FolioConfig::load(&args.config)?;
    execute(&config, args.command)
}

fn execute(config: &FolioConfig, command: Command) -> Result<()> {
    match command {
        Command::Config => print!("{}", config.to_toml()?),
        Command::App(command) => run(&AppContext::from_config(config)?, command)?,
    }
    Ok(())
}

fn run(ctx: &AppContext, command: AppCommand) -> Result<()> {
    match command {
        AppCommand::Theme { action } => {
            preference::<Theme>(&ctx.theme, action)?;
            tracing::debug!(
                "{}={}",
                THEME_ATTRIBUTE,
                ctx.document.get(THEME_ATTRIBUTE).unwrap_or_default()
            );
        }
        AppCommand::Lang { action } => preference::<Language>(&ctx.language, action)?,
        AppCommand::T { key, locale } => {
            let text = match locale {
                Some(locale) => ctx.translations.resolve(&locale, &key).to_string(),
                None => ctx.t(&key),
            };
            println!("{text}");
        }
        AppCommand::I18n { action } => match action {
            I18nAction::Keys { locale } => {
                for key in ctx.translations.key_paths(&locale) {
                    println!("{key}");
                }
            }
            I18nAction::Check => {
                let report = ctx.translations.check_parity();
                if !report.is_complete() {
                    for (locale, keys) in &report.missing {
                        for key in keys {
                            println!("{locale}: missing {key}");
                        }
                    }
                    bail!("translation catalogs are incomplete");
                }
                println!(
                    "all {} locales provide the same keys",
                    ctx.translations.locales().count()
                );
            }
        },
        AppCommand::Projects { action } => match action {
            ProjectAction::List { featured } => {
                let tr = ctx.translator();
                let heading = if featured { "nav.projects" } else { "projects.all" };
                println!("{}", tr.t(heading));
                for p in ctx.projects.all().iter().filter(|p| !featured || p.featured) {
                    println!("  {:<32} {}", p.slug, p.title);
                }
            }
            ProjectAction::Show { slug } => {
                let p = ctx.projects.by_slug(&slug)?;
                println!("{} ({})", p.title, p.published_date);
                for paragraph in &p.description {
                    println!("\n{paragraph}");
                }
                println!("\n[{}]", p.tags.join(", "));
                if let Some(url) = &p.github_url {
                    println!("{url}");
                }
                if let Some(start) = p.media_start_time {
                    println!("media starts at {start}");
                }
            }
        },
    }
    Ok(())
}

/// Get, set or toggle one preference. User input is parsed as `T`, so any
/// letter case is accepted.
fn preference<T>(store: &PreferenceStore, action: Option<PrefAction>) -> Result<()>
where
    T: PreferenceValue + FromStr<Err = PreferenceError> + Display,
{
    match action.unwrap_or(PrefAction::Get) {
        PrefAction::Get => println!("{}", store.get()),
        PrefAction::Set { value } => {
            let value: T = value.parse()?;
            store.set_as(value)?;
            println!("{value}");
        }
        PrefAction::Toggle => println!("{}", store.toggle()),
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use folio_core::MemoryStorage;
    use std::sync::Arc;

    fn ctx() -> AppContext {
        AppContext::with_storage(Arc::new(MemoryStorage::new())).unwrap()
    }

    #[test]
    fn args_parse() {
        let args = Args::try_parse_from(["folio", "theme", "set", "light"]).unwrap();
        assert!(matches!(
            args.command,
            Command::App(AppCommand::Theme {
                action: Some(PrefAction::Set { .. })
            })
        ));

        let args = Args::try_parse_from(["folio", "t", "nav.home", "-l", "ID"]).unwrap();
        assert!(matches!(
            args.command,
            Command::App(AppCommand::T {
                locale: Some(_),
                ..
            })
        ));

        let args = Args::try_parse_from(["folio", "-c", "site", "config"]).unwrap();
        assert!(matches!(args.command, Command::Config));
        assert_eq!(args.config, PathBuf::from("site"));
    }

    #[test]
    fn config_runs_without_building_a_context() {
        let mut config = FolioConfig::default();
        config.storage.backend = crate::config::StorageBackend::None;
        // An invalid default only fails once the stores are built.
        config.preferences.default_theme = "sepia".into();

        execute(&config, Command::Config).unwrap();
        assert!(execute(
            &config,
            Command::App(AppCommand::Theme { action: None })
        )
        .is_err());
    }

    #[test]
    fn set_accepts_any_case() {
        let ctx = ctx();
        run(
            &ctx,
            AppCommand::Lang {
                action: Some(PrefAction::Set { value: "id".into() }),
            },
        )
        .unwrap();
        assert_eq!(ctx.language.get(), "ID");
    }

    #[test]
    fn set_rejects_unknown_values() {
        let ctx = ctx();
        let err = run(
            &ctx,
            AppCommand::Theme {
                action: Some(PrefAction::Set {
                    value: "sepia".into(),
                }),
            },
        )
        .unwrap_err();
        assert!(err.to_string().contains("sepia"));
        assert!(matches!(
            err.downcast_ref::<PreferenceError>(),
            Some(PreferenceError::NotAllowed { .. })
        ));
        assert_eq!(ctx.theme.get(), "dark");
    }

    #[test]
    fn set_trims_and_folds_case_for_theme() {
        let ctx = ctx();
        run(
            &ctx,
            AppCommand::Theme {
                action: Some(PrefAction::Set {
                    value: " LIGHT ".into(),
                }),
            },
        )
        .unwrap();
        assert_eq!(ctx.theme.get_as::<Theme>(), Some(Theme::Light));
        assert_eq!(ctx.document.get(THEME_ATTRIBUTE).as_deref(), Some("light"));
    }

    #[test]
    fn missing_project_is_an_error() {
        let ctx = ctx();
        let err = run(
            &ctx,
            AppCommand::Projects {
                action: ProjectAction::Show {
                    slug: "nope".into(),
                },
            },
        )
        .unwrap_err();
        assert!(err.to_string().contains("nope"));
    }

    #[test]
    fn builtin_catalogs_pass_check() {
        run(
            &ctx(),
            AppCommand::I18n {
                action: I18nAction::Check,
            },
        )
        .unwrap();
    }
}
