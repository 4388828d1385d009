//! `service-config` command-line entry point.

use anyhow::{Context, Result};
use clap::Parser;
use kms_client::{AwsKms, KmsConfig};
use rust_common::{HttpConfig, TracingConfig, init_tracing};
use serde_json::{Map, Value};
use service_config::{
    Cli, ConsulClient, Directive, SecretPipeline, ServiceConfigError, ServiceConfigResolver,
    ServiceDefinition, Settings,
};
use std::process::ExitCode;
use std::sync::Arc;
use tracing::{debug, info};
use vault_client::{VaultClient, VaultConfig, VaultToken};

#[tokio::main]
async fn main() -> ExitCode {
    match run().await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            match err.downcast_ref::<ServiceConfigError>() {
                Some(e) => eprintln!("error[{}]: {err:#}", e.code()),
                None => eprintln!("error: {err:#}"),
            }
            ExitCode::FAILURE
        }
    }
}

async fn run() -> Result<()> {
    // Loads .env before clap reads its env fallbacks
    let settings = Settings::from_env()?;
    let cli = Cli::parse();

    let mut tracing_config = TracingConfig::default().with_log_level(settings.log_level.clone());
    if settings.json_logs {
        tracing_config = tracing_config.with_json_output();
    }
    init_tracing(&tracing_config).context("failed to initialise tracing")?;

    let definition = cli.apply(ServiceDefinition::load(&cli.config)?);
    info!(stage = definition.stage(), "Resolving directives");

    let directives = cli
        .directives
        .iter()
        .map(|raw| Directive::parse(raw))
        .collect::<service_config::Result<Vec<_>>>()?;

    let resolver = build_resolver(definition, &settings, cli.consul_token.clone()).await?;
    let values = resolver.resolve_all(&directives).await?;
    debug!(count = values.len(), "Directives resolved");

    if cli.json {
        let resolved: Map<String, Value> = cli
            .directives
            .iter()
            .zip(&values)
            .map(|(raw, value)| (raw.clone(), Value::String(value.to_string())))
            .collect();
        println!("{}", serde_json::to_string_pretty(&Value::Object(resolved))?);
    } else {
        for value in &values {
            println!("{value}");
        }
    }

    Ok(())
}

async fn build_resolver(
    definition: ServiceDefinition,
    settings: &Settings,
    consul_token: Option<String>,
) -> Result<ServiceConfigResolver> {
    let http = HttpConfig::default()
        .with_timeout(settings.http_timeout)
        .with_connect_timeout(settings.http_connect_timeout);
    let consul = ConsulClient::new(&http)
        .context("failed to build Consul client")?
        .with_token(consul_token);

    let vault = VaultClient::new(
        &VaultConfig::default()
            .with_timeout(settings.http_timeout)
            .with_connect_timeout(settings.http_connect_timeout),
    )?;
    let secrets = SecretPipeline::new(Arc::new(vault), VaultToken::from_env());

    let mut kms_config = KmsConfig::default()
        .with_operation_timeout(settings.kms_timeout)
        .with_connect_timeout(settings.http_connect_timeout);
    if let Some(region) = &definition.provider.region {
        kms_config = kms_config.with_region(region.clone());
    }
    if let Some(endpoint) = &settings.kms_endpoint {
        kms_config = kms_config.with_endpoint_url(endpoint.clone());
    }
    let kms = AwsKms::connect(&kms_config).await;

    Ok(ServiceConfigResolver::new(definition, consul, secrets, Arc::new(kms)))
}
