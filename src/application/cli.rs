use std::io;
use std::path;

use anyhow::bail;
use anyhow::Result;
use clap::value_parser;
use clap::Arg;
use clap::ArgAction;
use clap::ArgMatches;
use clap::Command;
use clap_complete::generate;
use clap_complete::Generator;
use clap_complete::Shell;
use strum::VariantNames;
use tokio::fs;
use tokio::io::AsyncWriteExt;
use yansi::Paint;

use crate::application::ui::help_text;
use crate::configuration::Config;
use crate::configuration::ConfigKey;
use crate::domain::models::Catalog;
use crate::domain::models::CategoryFilter;
use crate::domain::models::Product;
use crate::domain::models::Role;
use crate::domain::models::RoutineError;
use crate::domain::services::ConversationEngine;
use crate::domain::services::SelectionStore;
use crate::infrastructure::catalogs::CatalogManager;
use crate::infrastructure::completions::CompletionManager;
use crate::infrastructure::storage::StorageManager;

fn print_completions<G: Generator>(gen: G, cmd: &mut Command) {
    generate(gen, cmd, cmd.get_name().to_string(), &mut io::stdout());
    std::process::exit(0);
}

fn format_product(product: &Product) -> String {
    return format!(
        "- (ID: {}) {} by {} [{}]",
        product.id, product.name, product.brand, product.category
    );
}

async fn load_catalog() -> Result<Catalog> {
    let source = CatalogManager::get(&Config::get(ConfigKey::Catalog));
    tracing::debug!(source = %source.name(), "Loading catalog");
    return source.load().await;
}

async fn print_categories() -> Result<()> {
    let categories = load_catalog().await?.categories();
    if categories.is_empty() {
        println!("The catalog has no categories.");
    } else {
        println!("{}", categories.join("\n"));
    }

    return Ok(());
}

async fn print_products(category: Option<&String>) -> Result<()> {
    let catalog = load_catalog().await?;
    let products = match category {
        Some(category) => catalog.filter(&CategoryFilter::Category(category.to_string())),
        None => catalog.products().to_vec(),
    };

    if products.is_empty() {
        println!("No products found in this category");
        return Ok(());
    }

    let lines = products
        .iter()
        .map(|product| {
            return format_product(product);
        })
        .collect::<Vec<String>>();

    println!("{}", lines.join("\n"));
    return Ok(());
}

fn selection_store() -> SelectionStore {
    return SelectionStore::load(StorageManager::get(&Config::get(ConfigKey::StateDir)));
}

fn print_selection() {
    let store = selection_store();
    if store.selection().is_empty() {
        println!("No products selected");
        return;
    }

    let lines = store
        .selection()
        .products()
        .iter()
        .map(|product| {
            return format_product(product);
        })
        .collect::<Vec<String>>();

    println!("{}", lines.join("\n"));
}

fn clear_selection() -> Result<()> {
    let mut store = selection_store();
    store.clear()?;
    println!("Cleared all selected products");

    return Ok(());
}

fn print_reply(engine: &ConversationEngine) {
    if let Some(turn) = engine.transcript().turns().last() {
        if turn.role == Role::Assistant {
            println!("{}\n", turn.content);
        }
    }
}

async fn generate_routine(follow_ups: Vec<String>) -> Result<()> {
    let store = selection_store();
    let mut engine = ConversationEngine::with_topics(&Config::get(ConfigKey::AllowedTopics));

    let completion = CompletionManager::get()?;
    completion.health_check().await?;

    let mut req = engine.generate_routine(&store.snapshot())?;
    for follow_up in follow_ups.iter().map(Some).chain([None]) {
        let res = completion
            .get_completion(&req.turns)
            .await
            .map_err(|err| return RoutineError::GenerationFailed(err.to_string()));
        engine.handle_completion(req.id, res)?;
        print_reply(&engine);

        let Some(text) = follow_up else {
            break;
        };
        println!("{}\n", Paint::new(format!("> {text}")).bold());
        req = engine.submit_follow_up(text)?;
    }

    return Ok(());
}

async fn create_config_file() -> Result<()> {
    let config_file_path_str = Config::default(ConfigKey::ConfigFile);
    let config_file_path = path::PathBuf::from(&config_file_path_str);
    if config_file_path.exists() {
        bail!(format!(
            "Config file already exists at {config_file_path_str}"
        ));
    }

    if let Some(parent) = config_file_path.parent() {
        fs::create_dir_all(parent).await?;
    }

    let mut file = fs::File::create(&config_file_path).await?;
    file.write_all(Config::serialize_default(build()).as_bytes())
        .await?;

    println!("Created default config file at {config_file_path_str}");
    return Ok(());
}

fn subcommand_completions() -> Command {
    return Command::new("completions")
        .about("Generates shell completions.")
        .arg(
            clap::Arg::new("shell")
                .short('s')
                .long("shell")
                .help("Which shell to generate completions for.")
                .action(ArgAction::Set)
                .value_parser(value_parser!(Shell))
                .required(true),
        );
}

fn subcommand_config() -> Command {
    return Command::new("config")
        .about("Configuration file options.")
        .subcommand(
            Command::new("create").about("Saves the default config file to the configuration file path. This command will fail if the file exists already.")
        )
        .subcommand(
            Command::new("default").about("Outputs the default configuration file to stdout.")
        )
        .subcommand(
            Command::new("path").about("Returns the default path for the configuration file.")
        );
}

fn subcommand_debug() -> Command {
    return Command::new("debug")
        .about("Debug helpers for Routinely")
        .hide(true)
        .subcommand(
            Command::new("log-path").about("Output path to debug log file generated when running Routinely with environment variable RUST_LOG=routinely")
        )
        .subcommand(
            Command::new("enum-config").about("List all config keys as strings.")
        );
}

fn subcommand_catalog() -> Command {
    return Command::new("catalog")
        .about("Browse the product catalog.")
        .arg_required_else_help(true)
        .subcommand(Command::new("categories").about("List all product categories."))
        .subcommand(
            Command::new("list")
                .about("List products, optionally limited to a single category.")
                .arg(
                    Arg::new("category")
                        .long("category")
                        .help("Only list products in this category.")
                        .num_args(1),
                ),
        );
}

fn subcommand_selection() -> Command {
    return Command::new("selection")
        .about("Manage the persisted product selection.")
        .arg_required_else_help(true)
        .subcommand(Command::new("show").about("Print the selected products in the order they were picked."))
        .subcommand(Command::new("clear").about("Remove all selected products."));
}

fn subcommand_routine() -> Command {
    return Command::new("routine")
        .about("Generate a routine for the selected products without starting the picker.")
        .arg(
            Arg::new("follow-up")
                .short('f')
                .long("follow-up")
                .help("Follow-up question to ask after the routine is generated. Can be repeated.")
                .action(ArgAction::Append)
                .num_args(1),
        );
}

pub fn build() -> Command {
    let about = format!(
        "{}\n\nVersion: {}\nCommit: {}",
        env!("CARGO_PKG_DESCRIPTION"),
        env!("CARGO_PKG_VERSION"),
        option_env!("VERGEN_GIT_DESCRIBE").unwrap_or("unknown")
    );

    let keys_text = help_text()
        .split('\n')
        .map(|line| {
            if line.starts_with("KEYS:") || line.starts_with("MOUSE:") {
                return Paint::new(format!("PICKER {line}"))
                    .underline()
                    .bold()
                    .to_string();
            }
            if line.starts_with('-') {
                return format!("  {line}");
            }
            return line.to_string();
        })
        .collect::<Vec<String>>()
        .join("\n");

    return Command::new("routinely")
        .about(about)
        .author(env!("CARGO_PKG_AUTHORS"))
        .version(env!("CARGO_PKG_VERSION"))
        .after_help(keys_text)
        .arg_required_else_help(false)
        .subcommand(Command::new("pick").about("Start the product picker. This is the default."))
        .subcommand(subcommand_catalog())
        .subcommand(subcommand_selection())
        .subcommand(subcommand_routine())
        .subcommand(subcommand_completions())
        .subcommand(subcommand_config())
        .subcommand(subcommand_debug())
        .subcommand(Command::new("manpages").about("Generates manpages and outputs to stdout."))
        .arg(
            Arg::new(ConfigKey::ConfigFile.to_string())
                .short('c')
                .long(ConfigKey::ConfigFile.to_string())
                .env("ROUTINELY_CONFIG_FILE")
                .num_args(1)
                .help(format!("Path to configuration file [default: {}]", Config::default(ConfigKey::ConfigFile)))
                .global(true)
        )
        .arg(
            Arg::new(ConfigKey::Catalog.to_string())
                .long(ConfigKey::Catalog.to_string())
                .env("ROUTINELY_CATALOG")
                .num_args(1)
                .help("Product catalog location, either a JSON file path or an http(s) URL. Uses the bundled catalog when empty.")
                .global(true),
        )
        .arg(
            Arg::new(ConfigKey::CompletionURL.to_string())
                .long(ConfigKey::CompletionURL.to_string())
                .env("ROUTINELY_COMPLETION_URL")
                .num_args(1)
                .help(format!("Chat completion endpoint used to generate routines. [default: {}]", Config::default(ConfigKey::CompletionURL)))
                .global(true),
        )
        .arg(
            Arg::new(ConfigKey::CompletionTimeout.to_string())
                .long(ConfigKey::CompletionTimeout.to_string())
                .env("ROUTINELY_COMPLETION_TIMEOUT")
                .num_args(1)
                .help(format!("Time to wait in milliseconds before a completion request is abandoned. [default: {}]", Config::default(ConfigKey::CompletionTimeout)))
                .global(true),
        )
        .arg(
            Arg::new(ConfigKey::StateDir.to_string())
                .long(ConfigKey::StateDir.to_string())
                .env("ROUTINELY_STATE_DIR")
                .num_args(1)
                .help(format!("Directory where the product selection is saved. [default: {}]", Config::default(ConfigKey::StateDir)))
                .global(true),
        )
        .arg(
            Arg::new(ConfigKey::AllowedTopics.to_string())
                .long(ConfigKey::AllowedTopics.to_string())
                .env("ROUTINELY_ALLOWED_TOPICS")
                .num_args(1)
                .help("Comma separated keywords a follow-up question must mention. Uses the built-in beauty and personal care list when empty.")
                .global(true),
        );
}

async fn load_config(matches: &ArgMatches, subcmd_matches: Option<&ArgMatches>) -> Result<()> {
    let mut all_matches = vec![matches];
    if let Some(subcmd_matches) = subcmd_matches {
        all_matches.push(subcmd_matches);
    }

    return Config::load(build(), all_matches).await;
}

/// Returns true when the picker should be started.
pub async fn parse() -> Result<bool> {
    let matches = build().get_matches();

    match matches.subcommand() {
        Some(("debug", debug_matches)) => {
            match debug_matches.subcommand() {
                Some(("log-path", _)) => {
                    let log_path = Config::log_dir().join("debug.log");
                    println!("{}", log_path.to_string_lossy());
                }
                Some(("enum-config", _)) => {
                    let res = ConfigKey::VARIANTS.join("\n");
                    println!("{}", res);
                }
                _ => {
                    subcommand_debug().print_long_help()?;
                }
            }

            return Ok(false);
        }
        Some(("pick", subcmd_matches)) => {
            load_config(&matches, Some(subcmd_matches)).await?;
        }
        Some(("catalog", subcmd_matches)) => {
            load_config(&matches, Some(subcmd_matches)).await?;
            match subcmd_matches.subcommand() {
                Some(("categories", _)) => {
                    print_categories().await?;
                }
                Some(("list", list_matches)) => {
                    print_products(list_matches.get_one::<String>("category")).await?;
                }
                _ => {
                    subcommand_catalog().print_long_help()?;
                }
            }

            return Ok(false);
        }
        Some(("selection", subcmd_matches)) => {
            load_config(&matches, Some(subcmd_matches)).await?;
            match subcmd_matches.subcommand() {
                Some(("show", _)) => {
                    print_selection();
                }
                Some(("clear", _)) => {
                    clear_selection()?;
                }
                _ => {
                    subcommand_selection().print_long_help()?;
                }
            }

            return Ok(false);
        }
        Some(("routine", subcmd_matches)) => {
            load_config(&matches, Some(subcmd_matches)).await?;
            let follow_ups = subcmd_matches
                .get_many::<String>("follow-up")
                .map(|values| {
                    return values
                        .map(|e| return e.to_string())
                        .collect::<Vec<String>>();
                })
                .unwrap_or_default();
            generate_routine(follow_ups).await?;

            return Ok(false);
        }
        Some(("completions", subcmd_matches)) => {
            if let Some(completions) = subcmd_matches.get_one::<Shell>("shell").copied() {
                let mut app = build();
                print_completions(completions, &mut app);
            }
            return Ok(false);
        }
        Some(("config", subcmd_matches)) => match subcmd_matches.subcommand() {
            Some(("create", _)) => {
                create_config_file().await?;
                return Ok(false);
            }
            Some(("default", _)) => {
                println!("{}", Config::serialize_default(build()));
                return Ok(false);
            }
            Some(("path", _)) => {
                println!("{}", Config::default(ConfigKey::ConfigFile));
                return Ok(false);
            }
            _ => {
                subcommand_config().print_long_help()?;
                return Ok(false);
            }
        },
        Some(("manpages", _)) => {
            clap_mangen::Man::new(build()).render(&mut io::stdout())?;
            return Ok(false);
        }
        _ => {
            load_config(&matches, None).await?;
        }
    }

    return Ok(true);
}
