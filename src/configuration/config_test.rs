use anyhow::Result;

use super::Config;
use super::ConfigKey;
use crate::application::cli;

#[test]
fn it_serializes_to_valid_toml() {
    let res = Config::serialize_default(cli::build());
    let toml_res = res.parse::<toml_edit::Document>();
    assert!(toml_res.is_ok());

    assert!(res.contains("model = \"gemini-2.5-flash\""));
    assert!(res.contains("backend-health-check-timeout = 1000"));
    assert!(res.contains("# api-key = \"\""));
    assert!(res.contains("# system-instruction = \"\""));
    assert!(!res.contains("config-file"));
}

#[test]
fn it_has_a_default_model() {
    assert_eq!(Config::default(ConfigKey::Model), "gemini-2.5-flash");
    assert!(Config::default(ConfigKey::SystemInstruction).contains("ASCII art"));
}

#[tokio::test]
async fn it_loads_config_from_file() -> Result<()> {
    let matches = cli::build().try_get_matches_from(vec![
        "vision-chat",
        "chat",
        "-c",
        "./config.example.toml",
    ])?;
    let subcmd_matches = matches.subcommand_matches("chat").unwrap();
    Config::load(cli::build(), vec![&matches, subcmd_matches]).await?;
    return Ok(());
}

#[tokio::test]
async fn it_fails_to_loads_config_from_file() -> Result<()> {
    let matches = cli::build().try_get_matches_from(vec![
        "vision-chat",
        "chat",
        "-c",
        "./test/bad-config.toml",
    ])?;
    let subcmd_matches = matches.subcommand_matches("chat").unwrap();
    let res = Config::load(cli::build(), vec![&matches, subcmd_matches]).await;
    assert!(res.is_err());
    return Ok(());
}
