//! Config command handlers

use crate::cli::ConfigInitArgs;
use crate::config::ReceiverConfig;
use std::fs;

const EXAMPLE_CONFIG: &str = include_str!("../../alert-receiver.example.toml");

/// Handle `alert-receiver config init` command
pub fn handle_config_init(args: &ConfigInitArgs) -> Result<(), Box<dyn std::error::Error>> {
    if args.output.exists() && !args.force {
        return Err(format!(
            "File already exists: {}. Use --force to overwrite.",
            args.output.display()
        )
        .into());
    }

    let template: ReceiverConfig =
        toml::from_str(EXAMPLE_CONFIG).map_err(|e| format!("bundled template: {}", e))?;
    fs::write(&args.output, EXAMPLE_CONFIG)?;

    println!("✓ Receiver configuration written: {}", args.output.display());
    for line in init_summary(&template) {
        println!("  {}", line);
    }
    println!("  Edit [[backends]] and [evidence], then run `alert-receiver serve`.");

    Ok(())
}

/// Where Grafana should post, where evidence comes from, who gets asked.
fn init_summary(config: &ReceiverConfig) -> Vec<String> {
    let webhook = format!(
        "Webhook:  POST http://{}:{}/alerts/grafana",
        config.server.host, config.server.port
    );

    let evidence = if config.evidence.is_enabled() {
        format!(
            "Evidence: {} ({} queries, {} lookback)",
            config.evidence.prometheus_url,
            config.effective_queries().len(),
            humantime::format_duration(config.evidence.lookback)
        )
    } else {
        "Evidence: disabled".to_string()
    };

    let backends = if config.backends.is_empty() {
        "Backends: none configured".to_string()
    } else {
        let names: Vec<String> = config
            .backends
            .iter()
            .map(|b| format!("{} ({}, {})", b.display_name(), b.family, b.model))
            .collect();
        format!("Backends: {}", names.join(", "))
    };

    vec![webhook, evidence, backends]
}
