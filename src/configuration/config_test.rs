use std::fs;

use anyhow::Result;

use super::Config;
use super::ConfigKey;
use crate::application::cli;
use crate::domain::models::AgentMode;
use crate::domain::models::GenerationMode;

#[test]
fn it_serializes_to_valid_toml() -> Result<()> {
    let res = Config::serialize_default(cli::build());
    let doc = res.parse::<toml_edit::Document>()?;

    assert_eq!(doc["model"].as_str(), Some("gpt-4.1"));
    assert_eq!(doc["mode"].as_str(), Some("map"));
    assert_eq!(doc["agent-mode"].as_str(), Some("standard"));
    assert_eq!(doc["temperature"].as_float(), Some(0.7));
    assert_eq!(doc["max-tokens"].as_integer(), Some(4000));
    assert_eq!(doc["backend-health-check-timeout"].as_integer(), Some(1000));
    assert!(doc.get("backend-port").is_none());
    assert!(doc.get("store-file").is_none());
    assert!(res.contains("# backend-port = \"\""));
    assert!(res.contains("[possible values: standard, iterative, multi-agent]"));

    return Ok(());
}

#[test]
fn it_uses_generation_defaults() {
    assert_eq!(Config::default(ConfigKey::TopP), "0.90");
    assert_eq!(Config::default(ConfigKey::MaxIterations), "3");
    assert_eq!(Config::default(ConfigKey::BackendHost), "localhost");
    assert_eq!(Config::default(ConfigKey::BackendPort), "");
    assert!(Config::default(ConfigKey::StoreFile).ends_with("store.json"));
}

// Config is process wide, so every load runs in this one test.
#[tokio::test]
async fn it_loads_config_layers() -> Result<()> {
    let dir = tempfile::tempdir()?;
    let config_path = dir.path().join("config.toml");
    fs::write(
        &config_path,
        r#"
mode = "encounter"
model = "gpt-4o"
temperature = 1.5
max-tokens = 99999
top-p = 1
agent-mode = "iterative"
backend-port = 6000
"#,
    )?;
    let config_arg = config_path.to_string_lossy().to_string();

    let matches = cli::build().try_get_matches_from(vec![
        "mapscribe",
        "-c",
        &config_arg,
        "--model",
        "gpt-4o-mini",
    ])?;
    Config::load(cli::build(), vec![&matches]).await?;

    let config = Config::generation_config()?;
    assert_eq!(config.mode, GenerationMode::Encounter);
    assert_eq!(config.model, "gpt-4o-mini");
    assert_eq!(config.temperature, 1.5);
    assert_eq!(config.max_tokens, 16000);
    assert_eq!(config.top_p, 1.0);
    assert_eq!(config.agent_mode, AgentMode::Iterative);
    assert_eq!(config.max_iterations, 3);
    assert_eq!(Config::backend_port()?, Some(6000));
    assert_eq!(Config::health_check_timeout()?, 1000);

    let bad_path = dir.path().join("bad-config.toml");
    fs::write(&bad_path, "agent-mode = \"swarm\"\n")?;
    let bad_arg = bad_path.to_string_lossy().to_string();
    let matches = cli::build().try_get_matches_from(vec!["mapscribe", "-c", &bad_arg])?;
    let res = Config::load(cli::build(), vec![&matches]).await;
    assert!(res.is_err());

    let matches =
        cli::build().try_get_matches_from(vec!["mapscribe", "--temperature", "warm"])?;
    Config::load(cli::build(), vec![&matches]).await?;
    assert!(Config::generation_config().is_err());

    let matches =
        cli::build().try_get_matches_from(vec!["mapscribe", "--backend-port", "99999"])?;
    Config::load(cli::build(), vec![&matches]).await?;
    assert!(Config::backend_port().is_err());

    return Ok(());
}
