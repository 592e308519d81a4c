//! Effective configuration command.

use anyhow::Result;
use console::style;
use secrecy::{ExposeSecret, SecretString};

use crate::state::AppState;

fn key_state(key: Option<&SecretString>) -> &'static str {
    match key {
        Some(k) if !k.expose_secret().is_empty() => "set",
        _ => "unset",
    }
}

/// Print the configuration after file and environment overrides.
///
/// Keys are never printed; only whether they are set.
pub fn show_config(state: &AppState, json: bool) -> Result<()> {
    let config = &state.config;
    let api_key = key_state(Some(&state.secrets.api_key));
    let store_key = key_state(state.secrets.store_key.as_ref());

    if json {
        let out = serde_json::json!({
            "data_dir": state.data_dir.display().to_string(),
            "config": &**config,
            "secrets": {
                "api_key": api_key,
                "store_key": store_key,
            },
        });
        println!("{}", serde_json::to_string_pretty(&out)?);
        return Ok(());
    }

    let endpoint = if config.inference.endpoint_url.is_empty() {
        "(not configured)"
    } else {
        config.inference.endpoint_url.as_str()
    };

    println!();
    println!("  {}", style("Configuration").bold());
    println!();
    println!("  {}  {}", style("Data dir:").bold(), style(state.data_dir.display()).dim());
    println!("  {}    {}", style("Locale:").bold(), config.locale);
    println!();
    println!("  {}", style("Inference").cyan().bold());
    println!("    {}  {}", style("Endpoint:").bold(), endpoint);
    println!("    {}   {}", style("API key:").bold(), api_key);
    println!();
    println!("  {}", style("Persistence").cyan().bold());
    println!("    {}   {}", style("Backend:").bold(), config.persistence.backend);
    println!("    {}     {}", style("Table:").bold(), config.persistence.table);
    if let Some(url) = &config.persistence.rest_url {
        println!("    {}  {}", style("REST URL:").bold(), url);
    }
    println!("    {} {}", style("Store key:").bold(), store_key);
    println!();
    println!("  {}", style("Server").cyan().bold());
    println!(
        "    {}    {}:{}",
        style("Listen:").bold(),
        config.server.host,
        config.server.port
    );
    if let Some(dir) = &config.server.web_dir {
        println!("    {}   {}", style("Web dir:").bold(), dir);
    }
    println!();

    Ok(())
}
