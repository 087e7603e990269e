use anyhow::{Context, Result};
use clap::{ArgAction, Args, Parser};
use std::{env, path::PathBuf};

pub const DEFAULT_ENDPOINT: &str = "minio.hyperplane-minio.svc.cluster.local:9000";
pub const DEFAULT_REPORT_FILE: &str = "bucket-objects-report.txt";

/// Connection settings for the object store, shared by both binaries.
#[derive(Debug, Clone)]
pub struct StoreConfig {
    pub endpoint: String,
    pub access_key: String,
    pub secret_key: String,
    pub secure: bool,
    pub region: String,
}

/// Gateway server configuration.
#[derive(Debug, Clone)]
pub struct GatewayConfig {
    pub host: String,
    pub port: u16,
    pub in_memory: bool,
    pub store: StoreConfig,
}

/// Inventory report job configuration.
#[derive(Debug, Clone)]
pub struct ReportConfig {
    pub output_bucket: String,
    pub local_file: PathBuf,
    pub store: StoreConfig,
}

/// Store connection flags (override MINIO_* environment variables).
#[derive(Args, Debug, Default)]
pub struct StoreArgs {
    /// Store endpoint, `host:port` or full URL (overrides MINIO_ENDPOINT)
    #[arg(long)]
    pub endpoint: Option<String>,

    /// Access key (overrides MINIO_ACCESS_KEY)
    #[arg(long)]
    pub access_key: Option<String>,

    /// Secret key (overrides MINIO_SECRET_KEY)
    #[arg(long)]
    pub secret_key: Option<String>,

    /// Use TLS when the endpoint has no scheme, `true` or `false`
    /// (overrides MINIO_SECURE)
    #[arg(long, action = ArgAction::Set)]
    pub secure: Option<bool>,

    /// Region sent with signed requests (overrides MINIO_REGION)
    #[arg(long)]
    pub region: Option<String>,
}

#[derive(Parser, Debug)]
#[command(author, version, about = "HTTP gateway for bucket and object operations on MinIO")]
pub struct GatewayArgs {
    /// Host to bind to (overrides GATEWAY_HOST)
    #[arg(long)]
    pub host: Option<String>,

    /// Port to bind to (overrides GATEWAY_PORT)
    #[arg(long)]
    pub port: Option<u16>,

    /// Serve from an in-process store instead of a remote one
    #[arg(long)]
    pub in_memory: bool,

    #[command(flatten)]
    pub store: StoreArgs,
}

#[derive(Parser, Debug)]
#[command(author, version, about = "Build a bucket inventory report and archive it in MinIO")]
pub struct ReportArgs {
    /// Bucket receiving the report (overrides OUTPUT_BUCKET)
    #[arg(long)]
    pub output_bucket: Option<String>,

    /// Local path the report is written to
    #[arg(long, default_value = DEFAULT_REPORT_FILE)]
    pub local_file: PathBuf,

    #[command(flatten)]
    pub store: StoreArgs,
}

impl StoreConfig {
    /// Merge CLI flags over environment values read through `var`.
    pub fn resolve(args: StoreArgs, var: impl Fn(&str) -> Option<String>) -> Self {
        let env_secure = || {
            var("MINIO_SECURE")
                .map(|v| v.eq_ignore_ascii_case("true"))
                .unwrap_or(false)
        };

        Self {
            endpoint: args
                .endpoint
                .or_else(|| var("MINIO_ENDPOINT"))
                .unwrap_or_else(|| DEFAULT_ENDPOINT.into()),
            access_key: args
                .access_key
                .or_else(|| var("MINIO_ACCESS_KEY"))
                .unwrap_or_else(|| "minioadmin".into()),
            secret_key: args
                .secret_key
                .or_else(|| var("MINIO_SECRET_KEY"))
                .unwrap_or_else(|| "minioadmin".into()),
            secure: args.secure.unwrap_or_else(env_secure),
            region: args
                .region
                .or_else(|| var("MINIO_REGION"))
                .unwrap_or_else(|| "us-east-1".into()),
        }
    }

    /// Endpoint as a URL; a bare `host:port` gets a scheme from `secure`.
    pub fn endpoint_url(&self) -> String {
        if self.endpoint.contains("://") {
            self.endpoint.clone()
        } else {
            let scheme = if self.secure { "https" } else { "http" };
            format!("{}://{}", scheme, self.endpoint)
        }
    }
}

impl GatewayConfig {
    /// Parse CLI args and environment variables into a GatewayConfig.
    pub fn from_env_and_args() -> Result<Self> {
        Self::resolve(GatewayArgs::parse(), env_var)
    }

    pub fn resolve(args: GatewayArgs, var: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let env_host = var("GATEWAY_HOST").unwrap_or_else(|| "0.0.0.0".into());
        let env_port = match var("GATEWAY_PORT") {
            Some(value) => value
                .parse::<u16>()
                .with_context(|| format!("parsing GATEWAY_PORT value `{}`", value))?,
            None => 8787,
        };

        Ok(Self {
            host: args.host.unwrap_or(env_host),
            port: args.port.unwrap_or(env_port),
            in_memory: args.in_memory,
            store: StoreConfig::resolve(args.store, var),
        })
    }

    pub fn addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

impl ReportConfig {
    /// Parse CLI args and environment variables into a ReportConfig.
    pub fn from_env_and_args() -> Result<Self> {
        Ok(Self::resolve(ReportArgs::parse(), env_var))
    }

    pub fn resolve(args: ReportArgs, var: impl Fn(&str) -> Option<String>) -> Self {
        Self {
            output_bucket: args
                .output_bucket
                .or_else(|| var("OUTPUT_BUCKET"))
                .unwrap_or_else(|| "reports".into()),
            local_file: args.local_file,
            store: StoreConfig::resolve(args.store, var),
        }
    }
}

fn env_var(key: &str) -> Option<String> {
    env::var(key).ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn store_defaults_without_env() {
        let cfg = StoreConfig::resolve(StoreArgs::default(), lookup(&[]));
        assert_eq!(cfg.endpoint, DEFAULT_ENDPOINT);
        assert_eq!(cfg.access_key, "minioadmin");
        assert!(!cfg.secure);
        assert_eq!(cfg.endpoint_url(), format!("http://{}", DEFAULT_ENDPOINT));
    }

    #[test]
    fn secure_flag_is_case_insensitive() {
        let cfg = StoreConfig::resolve(StoreArgs::default(), lookup(&[("MINIO_SECURE", "TRUE")]));
        assert!(cfg.secure);
        let cfg = StoreConfig::resolve(StoreArgs::default(), lookup(&[("MINIO_SECURE", "yes")]));
        assert!(!cfg.secure);
    }

    #[test]
    fn cli_can_turn_tls_off_over_env() {
        let args = ReportArgs::parse_from(["inventory-report", "--secure", "false"]);
        let cfg = ReportConfig::resolve(args, lookup(&[("MINIO_SECURE", "true")]));
        assert!(!cfg.store.secure);

        let args = ReportArgs::parse_from(["inventory-report", "--secure", "true"]);
        let cfg = ReportConfig::resolve(args, lookup(&[]));
        assert!(cfg.store.secure);
    }

    #[test]
    fn cli_overrides_env() {
        let args = GatewayArgs::parse_from(["minio-gateway", "--port", "9100", "--endpoint", "a:1"]);
        let cfg = GatewayConfig::resolve(
            args,
            lookup(&[("GATEWAY_PORT", "8000"), ("MINIO_ENDPOINT", "b:2")]),
        )
        .unwrap();
        assert_eq!(cfg.port, 9100);
        assert_eq!(cfg.store.endpoint, "a:1");
        assert_eq!(cfg.addr(), "0.0.0.0:9100");
    }

    #[test]
    fn bad_port_is_reported() {
        let args = GatewayArgs::parse_from(["minio-gateway"]);
        let err = GatewayConfig::resolve(args, lookup(&[("GATEWAY_PORT", "http")])).unwrap_err();
        assert!(err.to_string().contains("GATEWAY_PORT"));
    }

    #[test]
    fn report_defaults() {
        let args = ReportArgs::parse_from(["inventory-report"]);
        let cfg = ReportConfig::resolve(args, lookup(&[]));
        assert_eq!(cfg.output_bucket, "reports");
        assert_eq!(cfg.local_file, PathBuf::from(DEFAULT_REPORT_FILE));
    }
}
