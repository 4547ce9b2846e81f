#[cfg(test)]
#[path = "cli_test.rs"]
mod tests;

use std::env;
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
use tokio::io::AsyncWrite;
use tokio::io::AsyncWriteExt;
use yansi::Paint;

use crate::configuration::Config;
use crate::configuration::ConfigKey;
use crate::domain::services::help_text;
use crate::domain::services::SessionController;
use crate::domain::services::TurnUpdate;
use crate::infrastructure::attachments;
use crate::infrastructure::backends::BackendManager;

fn print_completions<G: Generator>(gen: G, cmd: &mut Command) {
    generate(gen, cmd, cmd.get_name().to_string(), &mut io::stdout());
    std::process::exit(0);
}

/// Directory the debug log is written to when `RUST_LOG` enables it.
pub fn debug_log_dir() -> path::PathBuf {
    if let Ok(dir) = env::var("VISION_CHAT_LOG_DIR") {
        return path::PathBuf::from(dir);
    }

    return dirs::cache_dir()
        .unwrap_or_else(env::temp_dir)
        .join("vision-chat");
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

    println!(
        "Created default config file at {}",
        config_file_path.display()
    );
    return Ok(());
}

/// Runs a single turn and streams the reply to stdout.
async fn run_prompt(text: &str, image_path: Option<&String>) -> Result<()> {
    let mut session = SessionController::new(BackendManager::get()?);

    if let Some(image_path) = image_path {
        let file_path = path::PathBuf::from(image_path);
        match attachments::load_image(&file_path).await? {
            Some(image) => {
                session.stage(image);
            }
            None => bail!(format!("{image_path} is not an image")),
        }
    }

    if !session.send(text) {
        bail!("Nothing to send, pass a prompt or an image");
    }

    let mut stdout = tokio::io::stdout();
    return write_reply(&mut session, &mut stdout).await;
}

/// Writes fragments of the in-flight turn as they arrive, ending with a
/// newline.
async fn write_reply<W: AsyncWrite + Unpin>(
    session: &mut SessionController,
    out: &mut W,
) -> Result<()> {
    while let Some(update) = session.next_update().await {
        match update {
            TurnUpdate::Fragment(fragment) => {
                out.write_all(fragment.as_bytes()).await?;
                out.flush().await?;
            }
            TurnUpdate::Completed => {
                out.write_all(b"\n").await?;
                out.flush().await?;
                break;
            }
            TurnUpdate::Failed(err) => {
                out.write_all(b"\n").await?;
                out.flush().await?;
                bail!(format!("Request failed: {err}"));
            }
        }
    }

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
    let mut cmd = Command::new("debug");
    cmd = cmd.about("Debug helpers for Vision Chat")
        .hide(true)
        .subcommand(
            Command::new("log-path").about("Output path to debug log file generated when running Vision Chat with environment variable RUST_LOG=vision_chat")
        )
        .subcommand(
            Command::new("enum-config").about("List all config keys as strings.")
        );

    return cmd;
}

fn subcommand_chat() -> Command {
    return Command::new("chat").about("Start a new chat session.");
}

fn subcommand_prompt() -> Command {
    return Command::new("prompt")
        .about("Sends a single prompt, optionally with an image, and prints the streamed reply.")
        .arg(
            Arg::new("image")
                .short('i')
                .long("image")
                .help("Path to an image to send with the prompt.")
                .num_args(1),
        )
        .arg(
            Arg::new("text")
                .help("Prompt text.")
                .num_args(1..)
                .required(true),
        );
}

fn prompt_text(matches: &ArgMatches) -> String {
    return matches
        .get_many::<String>("text")
        .map(|words| return words.cloned().collect::<Vec<String>>().join(" "))
        .unwrap_or_default();
}

fn arg_api_key() -> Arg {
    return Arg::new(ConfigKey::ApiKey.to_string())
        .long(ConfigKey::ApiKey.to_string())
        .env("VISION_CHAT_API_KEY")
        .hide_env_values(true)
        .num_args(1)
        .help("Gemini API key. Read when a request is sent.")
        .global(true);
}

fn arg_api_url() -> Arg {
    return Arg::new(ConfigKey::ApiURL.to_string())
        .long(ConfigKey::ApiURL.to_string())
        .env("VISION_CHAT_API_URL")
        .num_args(1)
        .help(format!(
            "Gemini API URL. Can be swapped to a compatible proxy. [default: {}]",
            Config::default(ConfigKey::ApiURL)
        ))
        .global(true);
}

fn arg_backend_health_check_timeout() -> Arg {
    return Arg::new(ConfigKey::BackendHealthCheckTimeout.to_string())
        .long(ConfigKey::BackendHealthCheckTimeout.to_string())
        .env("VISION_CHAT_BACKEND_HEALTH_CHECK_TIMEOUT")
        .num_args(1)
        .help(
            format!("Time to wait in milliseconds before timing out when doing a healthcheck for the backend. [default: {}]", Config::default(ConfigKey::BackendHealthCheckTimeout)),
        )
        .global(true);
}

fn arg_model() -> Arg {
    return Arg::new(ConfigKey::Model.to_string())
        .short('m')
        .long(ConfigKey::Model.to_string())
        .env("VISION_CHAT_MODEL")
        .num_args(1)
        .help(format!(
            "The vision capable model to chat with. [default: {}]",
            Config::default(ConfigKey::Model)
        ))
        .global(true);
}

pub fn build() -> Command {
    let commands_text = help_text()
        .split('\n')
        .map(|line| {
            if line.starts_with('-') {
                return format!("  {line}");
            }
            if line.starts_with("COMMANDS:") || line.starts_with("HOTKEYS:") {
                return Paint::new(format!("CHAT {line}"))
                    .underline()
                    .bold()
                    .to_string();
            }
            return line.to_string();
        })
        .collect::<Vec<String>>()
        .join("\n");

    let about = format!(
        "{}\n\nVersion: {}",
        env!("CARGO_PKG_DESCRIPTION"),
        env!("CARGO_PKG_VERSION"),
    );

    return Command::new("vision-chat")
        .about(about)
        .author(env!("CARGO_PKG_AUTHORS"))
        .version(env!("CARGO_PKG_VERSION"))
        .after_help(commands_text)
        .arg_required_else_help(false)
        .subcommand(subcommand_chat())
        .subcommand(subcommand_completions())
        .subcommand(subcommand_config())
        .subcommand(subcommand_debug())
        .subcommand(subcommand_prompt())
        .arg(arg_api_key())
        .arg(arg_api_url())
        .arg(arg_backend_health_check_timeout())
        .arg(arg_model())
        .arg(
            Arg::new(ConfigKey::ConfigFile.to_string())
                .short('c')
                .long(ConfigKey::ConfigFile.to_string())
                .env("VISION_CHAT_CONFIG_FILE")
                .num_args(1)
                .help(format!("Path to configuration file [default: {}]", Config::default(ConfigKey::ConfigFile)))
                .global(true)
        )
        .arg(
            Arg::new(ConfigKey::ExportDir.to_string())
                .long(ConfigKey::ExportDir.to_string())
                .env("VISION_CHAT_EXPORT_DIR")
                .num_args(1)
                .help(format!("Directory /export writes chat transcripts to. [default: {}]", Config::default(ConfigKey::ExportDir)))
                .global(true),
        )
        .arg(
            Arg::new(ConfigKey::SystemInstruction.to_string())
                .long(ConfigKey::SystemInstruction.to_string())
                .env("VISION_CHAT_SYSTEM_INSTRUCTION")
                .num_args(1)
                .help("System instruction sent with every request. Defaults to a visual analyst instruction.")
                .global(true),
        )
        .arg(
            Arg::new(ConfigKey::Username.to_string())
                .short('u')
                .long(ConfigKey::Username.to_string())
                .env("VISION_CHAT_USERNAME")
                .num_args(1)
                .help("Your user name displayed in your chat bubbles. Defaults to $USER.")
                .global(true),
        );
}

/// Parses the command line and loads configuration. Returns true when the
/// chat UI should start.
pub async fn parse() -> Result<bool> {
    let matches = build().get_matches();

    match matches.subcommand() {
        Some(("debug", debug_matches)) => {
            match debug_matches.subcommand() {
                Some(("log-path", _)) => {
                    let log_path = debug_log_dir().join("debug.log");
                    println!("{}", log_path.display());
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
        Some(("chat", subcmd_matches)) => {
            Config::load(build(), vec![&matches, subcmd_matches]).await?;
        }
        Some(("prompt", subcmd_matches)) => {
            Config::load(build(), vec![&matches, subcmd_matches]).await?;
            run_prompt(
                &prompt_text(subcmd_matches),
                subcmd_matches.get_one::<String>("image"),
            )
            .await?;
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
