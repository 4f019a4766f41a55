#[cfg(test)]
#[path = "cli_test.rs"]
mod tests;

use std::io;
use std::path;

use anyhow::bail;
use anyhow::Result;
use clap::builder::PossibleValuesParser;
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
use tokio::sync::mpsc;
use tokio::task;
use yansi::Paint;

use crate::application::ui::HOTKEYS;
use crate::configuration::log_dir;
use crate::configuration::Config;
use crate::configuration::ConfigKey;
use crate::domain::models::Action;
use crate::domain::models::AgentMode;
use crate::domain::models::BackendBox;
use crate::domain::models::Event;
use crate::domain::models::GenerationConfig;
use crate::domain::models::GenerationMode;
use crate::domain::models::KeyValueStore;
use crate::domain::models::NotificationKind;
use crate::domain::models::StoreBox;
use crate::domain::models::ViewState;
use crate::domain::models::MODELS;
use crate::domain::services::actions::ActionsService;
use crate::domain::services::clipboard::ClipboardService;
use crate::domain::services::resolve_backend_port;
use crate::domain::services::Controller;
use crate::domain::services::Credentials;
use crate::domain::services::Endpoint;
use crate::domain::services::GenerationPhase;
use crate::domain::services::Syntaxes;
use crate::infrastructure::backends::RagService;
use crate::infrastructure::stores::FileStore;
use crate::infrastructure::stores::MemoryStore;

fn print_completions<G: Generator>(gen: G, cmd: &mut Command) {
    generate(gen, cmd, cmd.get_name().to_string(), &mut io::stdout());
    std::process::exit(0);
}

/// Opens the persisted store. An unreadable store is replaced by an in-memory
/// one so the session keeps working.
pub fn open_store() -> StoreBox {
    let store_path = path::PathBuf::from(Config::get(ConfigKey::StoreFile));
    match FileStore::open(store_path) {
        Ok(store) => {
            tracing::debug!(path = ?store.path(), "Using store file");
            return Box::new(store);
        }
        Err(err) => {
            tracing::warn!(error = ?err, "Failed to open store, falling back to memory");
            return Box::<MemoryStore>::default();
        }
    }
}

/// Resolves the backend port once and builds the HTTP client for it.
pub fn build_backend(store: &mut dyn KeyValueStore) -> Result<BackendBox> {
    let port = resolve_backend_port(Config::backend_port()?, store);
    let endpoint = Endpoint::new(&Config::get(ConfigKey::BackendHost), port);
    tracing::debug!(url = endpoint.base_url(), "Resolved generation backend");

    return Ok(Box::new(RagService::new(
        endpoint,
        Config::health_check_timeout()?,
    )));
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
        if !parent.exists() {
            fs::create_dir_all(parent).await?;
        }
    }

    let mut file = fs::File::create(&config_file_path).await?;
    file.write_all(Config::serialize_default(build()).as_bytes())
        .await?;

    println!("Created default config file at {config_file_path_str}");
    return Ok(());
}

/// Reads `--input`. A leading `@` names a file to read the description from.
async fn read_input(raw: &str) -> Result<String> {
    if let Some(file_path) = raw.strip_prefix('@') {
        return Ok(fs::read_to_string(file_path).await?);
    }

    return Ok(raw.to_string());
}

fn print_notifications(view: &ViewState) {
    for notification in &view.notifications {
        let message = match notification.kind {
            NotificationKind::Info => Paint::cyan(&notification.message),
            NotificationKind::Success => Paint::green(&notification.message),
            NotificationKind::Warning => Paint::yellow(&notification.message),
            NotificationKind::Error => Paint::red(&notification.message),
        };
        eprintln!("{message}");
    }
}

/// Feeds worker events into the controller until the generation settles. Fails
/// if the worker exits first.
async fn await_generation(
    controller: &mut Controller,
    event_rx: &mut mpsc::UnboundedReceiver<Event>,
    worker: &mut task::JoinHandle<Result<()>>,
) -> Result<()> {
    while controller.phase() != GenerationPhase::Idle {
        tokio::select! {
            biased;
            event = event_rx.recv() => match event {
                Some(Event::GenerationProgress(increment)) => {
                    controller.on_generation_progress(increment);
                }
                Some(Event::GenerationSettling()) => {
                    controller.on_generation_settling();
                }
                Some(Event::GenerationSettled(outcome)) => {
                    controller.on_generation_settled(outcome);
                }
                Some(_) => (),
                None => break,
            },
            res = &mut *worker => match res {
                Ok(Ok(())) => bail!("Actions worker stopped before the generation settled"),
                Ok(Err(err)) => return Err(err.context("Actions worker failed")),
                Err(err) => bail!("Actions worker crashed: {err}"),
            },
        }
    }

    return Ok(());
}

async fn run_generate(generate_matches: &ArgMatches) -> Result<()> {
    let mut store = open_store();
    let backend = build_backend(store.as_mut())?;
    let input = match generate_matches.get_one::<String>("input") {
        Some(raw) => read_input(raw).await?,
        None => "".to_string(),
    };

    let (action_tx, mut action_rx) = mpsc::unbounded_channel::<Action>();
    let (event_tx, mut event_rx) = mpsc::unbounded_channel::<Event>();

    let worker_tx = event_tx.clone();
    let mut worker = tokio::spawn(async move {
        return ActionsService::start(backend, worker_tx, &mut action_rx).await;
    });

    let mut controller = Controller::new(
        Config::generation_config()?,
        store,
        Box::<ClipboardService>::default(),
        path::PathBuf::from(Config::get(ConfigKey::DownloadDir)),
        action_tx,
        event_tx,
    );
    controller.view.set_description(&input);
    if let Some(npc_tags) = generate_matches.get_one::<String>("npc-tags") {
        controller.view.npc_tags = npc_tags.to_string();
    }

    if let Err(err) = controller.generate() {
        worker.abort();
        bail!(err);
    }

    let res = await_generation(&mut controller, &mut event_rx, &mut worker).await;
    worker.abort();
    res?;

    if generate_matches.get_flag("format") {
        controller.format()?;
    }

    print_notifications(&controller.view);
    let script = controller.view.output.script().unwrap_or_default();
    if let Some(output) = generate_matches.get_one::<String>("output") {
        fs::write(output, script).await?;
        eprintln!("Saved {output}");
    } else {
        println!("{script}");
    }

    return Ok(());
}

fn run_key(key_matches: &ArgMatches) -> Result<()> {
    let mut store = open_store();
    let mut config = GenerationConfig::default();
    let mut view = ViewState::default();

    match key_matches.subcommand() {
        Some(("save", save_matches)) => {
            let raw = save_matches
                .get_one::<String>("key")
                .map(|e| return e.to_string())
                .unwrap_or_default();
            Credentials::save(store.as_mut(), &mut config, &mut view, &raw)?;
            println!("API key saved: {}", view.key_field);
        }
        Some(("clear", _)) => {
            Credentials::clear(store.as_mut(), &mut config, &mut view)?;
            println!("API key cleared");
        }
        Some(("show", _)) => match Credentials::load(store.as_ref(), &mut config, &mut view) {
            Some(masked) => println!("Saved API key: {masked}"),
            None => println!("No API key saved"),
        },
        _ => {
            subcommand_key().print_long_help()?;
        }
    }

    return Ok(());
}

async fn run_health() -> Result<()> {
    let mut store = open_store();
    let backend = build_backend(store.as_mut())?;
    backend.health_check().await?;
    println!("Generation backend is healthy");

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
        .about("Debug helpers for mapscribe")
        .hide(true)
        .subcommand(
            Command::new("log-path").about("Output path to debug log file generated when running mapscribe with environment variable RUST_LOG=mapscribe")
        )
        .subcommand(
            Command::new("enum-config").about("List all config keys as strings.")
        );
}

fn subcommand_generate() -> Command {
    return Command::new("generate")
        .about("Runs a single generation without the terminal UI and prints the script.")
        .arg(
            Arg::new("input")
                .short('i')
                .long("input")
                .help("Description of the map or encounter. Prefix with @ to read it from a file.")
                .num_args(1)
                .required(true),
        )
        .arg(
            Arg::new("npc-tags")
                .long("npc-tags")
                .help("Comma separated NPC tags, only sent for encounters.")
                .num_args(1),
        )
        .arg(
            Arg::new("format")
                .long("format")
                .help("Normalizes whitespace in the script before output.")
                .action(ArgAction::SetTrue),
        )
        .arg(
            Arg::new("output")
                .short('o')
                .long("output")
                .help("Writes the script to a file instead of stdout.")
                .num_args(1),
        );
}

fn subcommand_key() -> Command {
    return Command::new("key")
        .about("Manage the saved API key.")
        .arg_required_else_help(true)
        .subcommand(
            Command::new("save")
                .about("Saves an API key that is sent with every generation request.")
                .arg(Arg::new("key").help("The raw API key.").required(true)),
        )
        .subcommand(Command::new("clear").about("Removes the saved API key."))
        .subcommand(Command::new("show").about("Prints the masked form of the saved API key."));
}

fn arg_config(key: ConfigKey, help: &str) -> Arg {
    let env_name = format!(
        "MAPSCRIBE_{}",
        key.to_string().to_uppercase().replace('-', "_")
    );

    let mut help = help.to_string();
    let default = Config::default(key);
    if !default.is_empty() && key != ConfigKey::DownloadDir {
        help = format!("{help} [default: {default}]");
    }

    return Arg::new(key.to_string())
        .long(key.to_string())
        .env(env_name)
        .num_args(1)
        .help(help)
        .global(true);
}

pub fn build() -> Command {
    let about = format!(
        "{}\n\nVersion: {}",
        env!("CARGO_PKG_DESCRIPTION"),
        env!("CARGO_PKG_VERSION"),
    );

    let hotkeys_text = HOTKEYS
        .split('\n')
        .map(|line| {
            if line.starts_with("HOTKEYS:") {
                return Paint::new(line).underline().bold().to_string();
            }
            return format!("  {line}");
        })
        .collect::<Vec<String>>()
        .join("\n");

    return Command::new("mapscribe")
        .about(about)
        .author(env!("CARGO_PKG_AUTHORS"))
        .version(env!("CARGO_PKG_VERSION"))
        .after_help(hotkeys_text)
        .arg_required_else_help(false)
        .subcommand(Command::new("ui").about("Start the generation form. This is the default."))
        .subcommand(subcommand_generate())
        .subcommand(subcommand_key())
        .subcommand(Command::new("health").about("Checks whether the generation backend is reachable."))
        .subcommand(subcommand_completions())
        .subcommand(subcommand_config())
        .subcommand(subcommand_debug())
        .arg(
            arg_config(ConfigKey::ConfigFile, "Path to configuration file")
                .short('c'),
        )
        .arg(arg_config(
            ConfigKey::BackendHost,
            "Host of the generation backend.",
        ))
        .arg(
            arg_config(
                ConfigKey::BackendPort,
                "Port of the generation backend. Remembered for later runs, defaults to the remembered port or 5000.",
            )
            .short('p'),
        )
        .arg(arg_config(
            ConfigKey::BackendHealthCheckTimeout,
            "Time to wait in milliseconds before timing out when doing a healthcheck for the backend.",
        ))
        .arg(arg_config(
            ConfigKey::StoreFile,
            "Path to the file holding the saved API key and backend port.",
        ))
        .arg(arg_config(
            ConfigKey::DownloadDir,
            "Directory downloaded scripts are written to. Defaults to the current directory.",
        ))
        .arg(
            arg_config(ConfigKey::Mode, "Initial generation mode.")
                .short('m')
                .value_parser(PossibleValuesParser::new(GenerationMode::VARIANTS)),
        )
        .arg(arg_config(
            ConfigKey::Model,
            &format!(
                "Model used by the backend. Known models: {}.",
                MODELS.join(", ")
            ),
        ))
        .arg(arg_config(ConfigKey::Temperature, "Sampling temperature, 0 to 2."))
        .arg(arg_config(ConfigKey::MaxTokens, "Maximum tokens to generate, 100 to 16000."))
        .arg(arg_config(ConfigKey::TopP, "Nucleus sampling, 0 to 1."))
        .arg(arg_config(ConfigKey::FrequencyPenalty, "Frequency penalty, -2 to 2."))
        .arg(arg_config(ConfigKey::PresencePenalty, "Presence penalty, -2 to 2."))
        .arg(
            arg_config(ConfigKey::AgentMode, "Strategy the backend agent uses.")
                .value_parser(PossibleValuesParser::new(AgentMode::VARIANTS)),
        )
        .arg(arg_config(
            ConfigKey::MaxIterations,
            "Maximum agent iterations, 1 to 10.",
        ))
        .arg(
            arg_config(
                ConfigKey::Theme,
                "Sets the syntax highlighting theme of the output.",
            )
            .short('t')
            .value_parser(PossibleValuesParser::new(Syntaxes::themes())),
        );
}

/// Handles the subcommands. Returns true when the terminal UI should start.
pub async fn parse() -> Result<bool> {
    let matches = build().get_matches();

    match matches.subcommand() {
        Some(("debug", debug_matches)) => {
            match debug_matches.subcommand() {
                Some(("log-path", _)) => {
                    let log_path = log_dir().join("debug.log");
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
        Some(("ui", subcmd_matches)) => {
            Config::load(build(), vec![&matches, subcmd_matches]).await?;
        }
        Some(("generate", subcmd_matches)) => {
            Config::load(build(), vec![&matches, subcmd_matches]).await?;
            run_generate(subcmd_matches).await?;
            return Ok(false);
        }
        Some(("key", subcmd_matches)) => {
            Config::load(build(), vec![&matches, subcmd_matches]).await?;
            run_key(subcmd_matches)?;
            return Ok(false);
        }
        Some(("health", subcmd_matches)) => {
            Config::load(build(), vec![&matches, subcmd_matches]).await?;
            run_health().await?;
            return Ok(false);
        }
        Some(("completions", subcmd_matches)) => {
            if let Some(completions) = subcmd_matches.get_one::<Shell>("shell").copied() {
                let mut app = build();
                print_completions(completions, &mut app);
            }
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
        _ => {
            Config::load(build(), vec![&matches]).await?;
        }
    }

    return Ok(true);
}
