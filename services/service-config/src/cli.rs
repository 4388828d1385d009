//! Command-line arguments of the `service-config` binary.

use crate::config::ServiceDefinition;
use clap::Parser;
use std::path::PathBuf;

/// Resolve serviceConfig and secretConfig directives.
#[derive(Debug, Parser)]
#[command(name = "service-config", version, about)]
pub struct Cli {
    /// Deployment definition file
    #[arg(short, long, env = "SERVICE_CONFIG_FILE", default_value = "serverless.yml")]
    pub config: PathBuf,

    /// Deployment stage, overrides provider.stage
    #[arg(short, long, env = "SERVICE_CONFIG_STAGE")]
    pub stage: Option<String>,

    /// AWS region for KMS, overrides provider.region
    #[arg(short, long)]
    pub region: Option<String>,

    /// Consul address used when the definition has no consulAddr
    #[arg(long, env = "CONSUL_HTTP_ADDR")]
    pub consul_addr: Option<String>,

    /// Consul ACL token
    #[arg(long, env = "CONSUL_HTTP_TOKEN", hide_env_values = true)]
    pub consul_token: Option<String>,

    /// Vault address used when the definition has no vaultAddr
    #[arg(long, env = "VAULT_ADDR")]
    pub vault_addr: Option<String>,

    /// Print a JSON object mapping each directive to its value
    #[arg(long)]
    pub json: bool,

    /// Directives such as `serviceConfig:app/url` or `secretConfig:app/key, fallback`
    #[arg(required = true)]
    pub directives: Vec<String>,
}

impl Cli {
    /// Apply command-line overrides to a loaded definition.
    ///
    /// Stage and region replace the definition's values. Addresses only fill
    /// in what the definition leaves unset.
    #[must_use]
    pub fn apply(&self, mut definition: ServiceDefinition) -> ServiceDefinition {
        if let Some(stage) = &self.stage {
            definition = definition.with_stage(stage.clone());
        }
        if let Some(region) = &self.region {
            definition = definition.with_region(region.clone());
        }

        let mut plugin = definition.plugin().clone();
        if plugin.consul_addr.is_none() {
            plugin.consul_addr.clone_from(&self.consul_addr);
        }
        if plugin.vault_addr.is_none() {
            plugin.vault_addr.clone_from(&self.vault_addr);
        }
        definition.with_plugin(plugin)
    }
}
