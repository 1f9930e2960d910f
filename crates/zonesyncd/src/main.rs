// # zonesyncd - DNS reconciliation daemon
//
// Thin integration layer around `zonesync-core`. The daemon is
// responsible for:
// 1. Reading configuration from environment variables
// 2. Initializing logging and the runtime
// 3. Registering zone providers and constructing the controller
// 4. Seeding the `static` scope from configured records
// 5. Running the controller until SIGTERM/SIGINT
//
// All reconciliation logic lives in zonesync-core; do not add any
// here.
//
// ## Configuration
//
// All configuration is done via environment variables:
//
// ### Provider
// - `ZONESYNC_PROVIDER_TYPE`: Provider type (memory)
// - `ZONESYNC_ZONES`: Comma-separated hosted zone names (memory
//   provider only)
//
// ### Records
// - `ZONESYNC_RECORDS`: Comma-separated record entries of the form
//   `fqdn=TYPE:value[|value...]`, e.g.
//   `api.example.com=A:10.0.0.1|10.0.0.2,www.example.com=CNAME:api.example.com`
//
// ### Controller
// - `ZONESYNC_DEBOUNCE_SECS`: Sleep between idle/successful iterations
// - `ZONESYNC_ERROR_BACKOFF_SECS`: Sleep after a failed iteration
// - `ZONESYNC_TTL_SECS`: TTL for authored record sets
//
// ### Logging
// - `ZONESYNC_LOG_LEVEL`: trace, debug, info, warn, error
//
// ## Example
//
// ```bash
// export ZONESYNC_PROVIDER_TYPE=memory
// export ZONESYNC_ZONES=example.com
// export ZONESYNC_RECORDS=api.example.com=A:10.0.0.1
//
// zonesyncd
// ```

use std::env;
use std::process::ExitCode;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use tracing::{Level, debug, error, info, warn};
use tracing_subscriber::FmtSubscriber;
use zonesync_core::provider::memory;
use zonesync_core::{
    ControllerConfig, ControllerEvent, DnsController, ProviderConfig, ProviderRegistry, Record,
    RecordType,
};

#[cfg(unix)]
use tokio::signal::unix::{SignalKind, signal};

/// How long to wait for the reconcile loop to wind down after a stop
/// request before giving up
const SHUTDOWN_GRACE: Duration = Duration::from_secs(10);

/// Exit codes for different termination scenarios
///
/// These codes follow systemd conventions:
/// - 0: Clean shutdown
/// - 1: Configuration or startup error
/// - 2: Runtime error (unexpected)
#[derive(Debug, Clone, Copy)]
enum ZonesyncExitCode {
    /// Clean shutdown (normal exit)
    CleanShutdown = 0,
    /// Configuration error or startup failure
    ConfigError = 1,
    /// Runtime error (unexpected failure)
    RuntimeError = 2,
}

impl From<ZonesyncExitCode> for ExitCode {
    fn from(code: ZonesyncExitCode) -> Self {
        ExitCode::from(code as u8)
    }
}

/// Application configuration
struct Config {
    provider_type: String,
    zones: Vec<String>,
    records: Vec<String>,
    debounce_secs: Option<u64>,
    error_backoff_secs: Option<u64>,
    ttl_secs: Option<u32>,
    log_level: String,
}

impl Config {
    /// Load configuration from environment variables
    fn from_env() -> Result<Self> {
        Ok(Self {
            provider_type: env::var("ZONESYNC_PROVIDER_TYPE")
                .unwrap_or_else(|_| "memory".to_string()),
            zones: split_csv(&env::var("ZONESYNC_ZONES").unwrap_or_default()),
            records: split_csv(&env::var("ZONESYNC_RECORDS").unwrap_or_default()),
            debounce_secs: env::var("ZONESYNC_DEBOUNCE_SECS")
                .ok()
                .map(|s| s.parse())
                .transpose()?,
            error_backoff_secs: env::var("ZONESYNC_ERROR_BACKOFF_SECS")
                .ok()
                .map(|s| s.parse())
                .transpose()?,
            ttl_secs: env::var("ZONESYNC_TTL_SECS")
                .ok()
                .map(|s| s.parse())
                .transpose()?,
            log_level: env::var("ZONESYNC_LOG_LEVEL").unwrap_or_else(|_| "info".to_string()),
        })
    }

    /// Validate the configuration
    fn validate(&self) -> Result<()> {
        match self.provider_type.as_str() {
            "memory" => {
                if self.zones.is_empty() {
                    anyhow::bail!(
                        "ZONESYNC_ZONES must name at least one zone when \
                        ZONESYNC_PROVIDER_TYPE=memory. \
                        Set it via: export ZONESYNC_ZONES=example.com"
                    );
                }
            }
            other => anyhow::bail!(
                "ZONESYNC_PROVIDER_TYPE '{}' is not supported. \
                Supported providers: memory",
                other
            ),
        }

        for zone in &self.zones {
            validate_domain_name(zone)?;
        }

        for entry in &self.records {
            let (fqdn, _) = parse_record_entry(entry)?;
            validate_domain_name(&fqdn)?;
        }

        if let Some(secs) = self.debounce_secs
            && !(1..=3600).contains(&secs)
        {
            anyhow::bail!(
                "ZONESYNC_DEBOUNCE_SECS must be between 1 and 3600 seconds. Got: {}",
                secs
            );
        }

        if let Some(secs) = self.error_backoff_secs
            && !(1..=3600).contains(&secs)
        {
            anyhow::bail!(
                "ZONESYNC_ERROR_BACKOFF_SECS must be between 1 and 3600 seconds. Got: {}",
                secs
            );
        }

        if let Some(ttl) = self.ttl_secs
            && !(1..=86400).contains(&ttl)
        {
            anyhow::bail!(
                "ZONESYNC_TTL_SECS must be between 1 and 86400 seconds. Got: {}",
                ttl
            );
        }

        match self.log_level.to_lowercase().as_str() {
            "trace" | "debug" | "info" | "warn" | "error" => {}
            _ => anyhow::bail!(
                "ZONESYNC_LOG_LEVEL '{}' is not valid. \
                Valid levels: trace, debug, info, warn, error",
                self.log_level
            ),
        }

        Ok(())
    }

    /// Controller configuration with the configured overrides applied
    fn controller_config(&self) -> ControllerConfig {
        let mut config = ControllerConfig::default();
        if let Some(secs) = self.debounce_secs {
            config.debounce_interval_secs = secs;
        }
        if let Some(secs) = self.error_backoff_secs {
            config.error_backoff_secs = secs;
        }
        if let Some(ttl) = self.ttl_secs {
            config.default_ttl_secs = ttl;
        }
        config
    }
}

fn split_csv(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect()
}

/// Parse a `fqdn=TYPE:value[|value...]` record entry
fn parse_record_entry(entry: &str) -> Result<(String, Vec<Record>)> {
    let (fqdn, rest) = entry.split_once('=').ok_or_else(|| {
        anyhow::anyhow!("record entry '{}' is missing '='; expected fqdn=TYPE:value", entry)
    })?;
    let (type_name, values) = rest.split_once(':').ok_or_else(|| {
        anyhow::anyhow!("record entry '{}' is missing ':'; expected fqdn=TYPE:value", entry)
    })?;

    let record_type = match type_name {
        "A" => RecordType::A,
        "AAAA" => RecordType::Aaaa,
        "CNAME" => RecordType::Cname,
        "ALIAS" => RecordType::Alias,
        other => anyhow::bail!(
            "record entry '{}' has unknown type '{}'. Supported: A, AAAA, CNAME, ALIAS",
            entry,
            other
        ),
    };

    let records: Vec<Record> = values
        .split('|')
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(|value| Record::new(fqdn.trim(), record_type, value))
        .collect();
    if records.is_empty() {
        anyhow::bail!("record entry '{}' has no values", entry);
    }

    Ok((fqdn.trim().to_string(), records))
}

/// Validate that a string is a valid domain name
///
/// This implements basic DNS domain name validation per RFC 1035.
/// It's not comprehensive but catches common errors. A single
/// trailing dot (the canonical form) is accepted.
fn validate_domain_name(domain: &str) -> Result<()> {
    if domain.is_empty() {
        anyhow::bail!("domain name cannot be empty");
    }

    // Total length limit (RFC 1035: 253 chars max)
    if domain.len() > 253 {
        anyhow::bail!(
            "domain name too long: {} chars (max 253). Got: {}",
            domain.len(),
            domain
        );
    }

    let unqualified = domain.strip_suffix('.').unwrap_or(domain);
    for label in unqualified.split('.') {
        if label.is_empty() {
            anyhow::bail!("domain name has empty label: '{}'", domain);
        }

        if label.len() > 63 {
            anyhow::bail!(
                "domain label too long: {} chars (max 63). Label: '{}'",
                label.len(),
                label
            );
        }

        if !label.chars().all(|c| c.is_alphanumeric() || c == '-') {
            anyhow::bail!(
                "domain label contains invalid characters. Label: '{}'. \
                Valid: alphanumeric and hyphen only.",
                label
            );
        }

        if label.starts_with('-') || label.ends_with('-') {
            anyhow::bail!(
                "domain label cannot start or end with hyphen. Label: '{}'",
                label
            );
        }
    }

    Ok(())
}

fn main() -> ExitCode {
    // Load configuration from environment
    let config = match Config::from_env() {
        Ok(cfg) => cfg,
        Err(e) => {
            eprintln!("Configuration error: {e}");
            return ZonesyncExitCode::ConfigError.into();
        }
    };

    // Validate configuration
    if let Err(e) = config.validate() {
        eprintln!("Configuration validation error: {e}");
        return ZonesyncExitCode::ConfigError.into();
    }

    // Initialize tracing
    let log_level = match config.log_level.to_lowercase().as_str() {
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "info" => Level::INFO,
        "warn" => Level::WARN,
        "error" => Level::ERROR,
        _ => Level::INFO,
    };

    let subscriber = FmtSubscriber::builder().with_max_level(log_level).finish();

    if let Err(e) = tracing::subscriber::set_global_default(subscriber) {
        eprintln!("Failed to set tracing subscriber: {e}");
        return ZonesyncExitCode::ConfigError.into();
    }

    info!("starting zonesyncd daemon");
    info!(
        "configuration loaded: {} zone(s), {} record entr(ies)",
        config.zones.len(),
        config.records.len()
    );

    // Enter tokio runtime
    let rt = match tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
    {
        Ok(runtime) => runtime,
        Err(e) => {
            error!("failed to create tokio runtime: {e}");
            return ZonesyncExitCode::RuntimeError.into();
        }
    };

    rt.block_on(async {
        match run_daemon(config).await {
            Ok(()) => ZonesyncExitCode::CleanShutdown,
            Err(e) => {
                error!("daemon error: {e}");
                ZonesyncExitCode::RuntimeError
            }
        }
    })
    .into()
}

/// Run the daemon
async fn run_daemon(config: Config) -> Result<()> {
    // Create provider registry and register built-in providers
    let registry = ProviderRegistry::new();
    memory::register(&registry);

    let provider_config = ProviderConfig::Memory {
        zones: config.zones.clone(),
    };
    let provider = registry.create_provider(&provider_config)?;
    info!("zone provider ready: {}", provider.provider_name());

    let (controller, mut events) = DnsController::new(provider, config.controller_config())?;
    let controller = Arc::new(controller);

    // Surface controller events in the logs
    tokio::spawn(async move {
        while let Some(event) = events.recv().await {
            match event {
                ControllerEvent::ApplySucceeded {
                    version,
                    updated,
                    deleted,
                } => info!(
                    "applied snapshot version {} ({} updated, {} deleted)",
                    version, updated, deleted
                ),
                ControllerEvent::ApplyFailed { version, error } => {
                    warn!("apply of snapshot version {} failed: {}", version, error)
                }
                other => debug!("controller event: {:?}", other),
            }
        }
    });

    // Seed the static scope from the environment; validation already
    // checked every entry parses
    for entry in &config.records {
        let (record_name, records) = parse_record_entry(entry)?;
        info!("managing record: {}", record_name);
        controller.replace("static", &record_name, records);
    }
    controller.mark_ready("static", true);

    let run_handle = tokio::spawn({
        let controller = Arc::clone(&controller);
        async move { controller.run().await }
    });

    let signal_name = wait_for_shutdown().await?;
    info!("received shutdown signal: {signal_name}");

    controller.stop();
    match tokio::time::timeout(SHUTDOWN_GRACE, run_handle).await {
        Ok(joined) => {
            joined??;
            info!("controller stopped cleanly");
        }
        Err(_) => warn!(
            "controller did not stop within {:?}; exiting anyway",
            SHUTDOWN_GRACE
        ),
    }

    Ok(())
}

/// Wait for shutdown signals (SIGTERM, SIGINT)
#[cfg(unix)]
async fn wait_for_shutdown() -> Result<&'static str> {
    let mut sigterm = signal(SignalKind::terminate())
        .map_err(|e| anyhow::anyhow!("failed to setup SIGTERM handler: {e}"))?;
    let mut sigint = signal(SignalKind::interrupt())
        .map_err(|e| anyhow::anyhow!("failed to setup SIGINT handler: {e}"))?;

    let name = tokio::select! {
        _ = sigterm.recv() => "SIGTERM",
        _ = sigint.recv() => "SIGINT",
    };
    Ok(name)
}

/// Wait for shutdown signals (SIGINT only)
///
/// Fallback implementation for non-Unix platforms.
#[cfg(not(unix))]
async fn wait_for_shutdown() -> Result<&'static str> {
    tokio::signal::ctrl_c()
        .await
        .map_err(|e| anyhow::anyhow!("failed to wait for CTRL-C: {e}"))?;
    Ok("SIGINT")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_record_entry() {
        let (name, records) = parse_record_entry("api.example.com=A:10.0.0.1|10.0.0.2").unwrap();
        assert_eq!(name, "api.example.com");
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].record_type, RecordType::A);
        assert_eq!(records[0].fqdn, "api.example.com");
        assert_eq!(records[1].value, "10.0.0.2");

        let (_, records) = parse_record_entry("www.example.com=CNAME:api.example.com").unwrap();
        assert_eq!(records[0].record_type, RecordType::Cname);

        assert!(parse_record_entry("no-equals").is_err());
        assert!(parse_record_entry("a.example.com=A").is_err());
        assert!(parse_record_entry("a.example.com=TXT:hello").is_err());
        assert!(parse_record_entry("a.example.com=A:").is_err());
    }

    #[test]
    fn test_validate_domain_name() {
        validate_domain_name("example.com").unwrap();
        validate_domain_name("example.com.").unwrap();
        validate_domain_name("api-1.sub.example.com").unwrap();

        assert!(validate_domain_name("").is_err());
        assert!(validate_domain_name("exa mple.com").is_err());
        assert!(validate_domain_name("-bad.example.com").is_err());
        assert!(validate_domain_name("bad..example.com").is_err());
        assert!(validate_domain_name(&"x".repeat(254)).is_err());
        assert!(validate_domain_name(&format!("{}.com", "y".repeat(64))).is_err());
    }
}
