use log::{error, info, warn};
use sprinkler_dash::client::ControllerClient;
use sprinkler_dash::config::Config;
use sprinkler_dash::models::controller::ZoneMode;
use sprinkler_dash::services::poller::{self, PollerContext};
use std::path::{Path, PathBuf};

#[derive(Debug)]
struct LoadedEnvFile {
    path: PathBuf,
    explicit: bool,
}

pub fn run() -> Result<(), String> {
    // 1) Load config
    let cfg = Config::from_env()?;
    info!(
        "Config loaded (controller_url={}, poll_interval={}s, request_timeout={}s)",
        cfg.controller_url,
        cfg.poll_interval.as_secs(),
        cfg.request_timeout.as_secs()
    );

    // 2) Init controller client
    let client = ControllerClient::new(cfg.controller_url.clone(), cfg.request_timeout);

    // 3) Settings drive the duration multiplier and the resolver location
    let settings = client.settings().map_err(|e| format!("settings fetch failed: {}", e))?;
    if settings.uses_legacy_coords() {
        info!("Settings carry the legacy coords array; reading it as [lon, lat]");
    }
    match settings.location() {
        Some((lat, lon)) => info!("Resolver location: lat={}, lon={}", lat, lon),
        None => warn!("No GPS location configured; solar time codes will not resolve"),
    }
    info!("Duration multiplier: {}", settings.timer_multiplier);

    // 4) GPIO layout is optional; without it no zone is flagged as the pump
    let gpio = match client.gpio_config() {
        Ok(g) => Some(g),
        Err(e) => {
            warn!("gpio config unavailable: {}", e);
            None
        }
    };

    // 5) Fetch and filter the schedule
    let all_zones = client.schedule().map_err(|e| format!("schedule fetch failed: {}", e))?;
    info!("Fetched {} zone(s)", all_zones.len());

    let mut zones = Vec::with_capacity(all_zones.len());
    for zone in all_zones {
        match zone.mode {
            ZoneMode::Disabled => info!("Zone {} is disabled; skipping", zone.zone_id.0),
            ZoneMode::Manual => zones.push(zone),
            ZoneMode::Smart => match zone.validate_shape() {
                Ok(()) => zones.push(zone),
                Err(e) => warn!("Excluding zone with unusable schedule: {}", e),
            },
        }
    }
    if zones.is_empty() {
        return Err("no usable zones in schedule".to_string());
    }

    // 6) Poll until interrupted (steady cadence)
    info!(
        "Starting poll loop: zones={}, interval={}s",
        zones.len(),
        cfg.poll_interval.as_secs()
    );
    let mut ctx = PollerContext::new(zones, settings, gpio);
    let (handle, stop) = poller::shutdown_channel();
    // dropping the sender stops the loop, so it must outlive run_loop
    let _handle = handle;
    poller::run_loop(&client, &mut ctx, cfg.poll_interval, &stop);

    Ok(())
}

fn configure_env_from_cli() -> Result<Option<LoadedEnvFile>, String> {
    let mut args = std::env::args_os();
    args.next(); // skip program name

    let mut env_file: Option<PathBuf> = None;

    while let Some(arg) = args.next() {
        match arg.to_str() {
            Some("--env-file") => {
                let value = args
                    .next()
                    .ok_or_else(|| "`--env-file` requires a path argument".to_string())?;
                env_file = Some(PathBuf::from(value));
            }
            Some(s) if s.starts_with("--env-file=") => {
                let path_str = &s["--env-file=".len()..];
                if path_str.is_empty() {
                    return Err("`--env-file` requires a path argument".to_string());
                }
                env_file = Some(PathBuf::from(path_str));
            }
            Some("--") => break,
            Some(other) => return Err(format!("unrecognised argument: {}", other)),
            None => return Err("argument contains invalid UTF-8".to_string()),
        }
    }

    if let Some(path) = env_file {
        if !path.is_file() {
            return Err(format!("env file not found: {}", path.display()));
        }
        load_env_file(&path)?;
        Ok(Some(LoadedEnvFile { path, explicit: true }))
    } else {
        let default_path = std::env::current_dir()
            .map_err(|e| format!("unable to read current directory: {}", e))?
            .join(".env");
        if default_path.is_file() {
            load_env_file(&default_path)?;
            Ok(Some(LoadedEnvFile { path: default_path, explicit: false }))
        } else {
            Ok(None)
        }
    }
}

fn load_env_file(path: &Path) -> Result<(), String> {
    let contents = std::fs::read_to_string(path)
        .map_err(|e| format!("failed to read {}: {}", path.display(), e))?;

    for (index, line) in contents.lines().enumerate() {
        let parsed =
            parse_env_line(line).map_err(|e| format!("{}:{}: {}", path.display(), index + 1, e))?;
        let Some((key, value)) = parsed else { continue };
        // values already present in the process environment win
        if std::env::var_os(&key).is_none() {
            // mutating the process environment is unsafe on some targets
            unsafe {
                std::env::set_var(key, value);
            }
        }
    }

    Ok(())
}

/// Parses one `KEY=value` line. Comments and blank lines yield `None`;
/// quoted values keep everything between the matching quotes, unquoted
/// values end at the first `#`.
fn parse_env_line(line: &str) -> Result<Option<(String, String)>, String> {
    let trimmed = line.trim();
    if trimmed.is_empty() || trimmed.starts_with('#') {
        return Ok(None);
    }
    let assignment = trimmed.strip_prefix("export ").map(str::trim_start).unwrap_or(trimmed);

    let Some((key, raw_value)) = assignment.split_once('=') else {
        return Err("missing '=' in assignment".to_string());
    };
    let key = key.trim();
    if key.is_empty() {
        return Err("environment variable name cannot be empty".to_string());
    }
    if key.chars().any(char::is_whitespace) {
        return Err(format!("environment variable name contains whitespace: {}", key));
    }

    let value = raw_value.trim();
    let value = if value.len() >= 2
        && ((value.starts_with('"') && value.ends_with('"'))
            || (value.starts_with('\'') && value.ends_with('\'')))
    {
        value[1..value.len() - 1].to_string()
    } else {
        value.split('#').next().unwrap_or_default().trim_end().to_string()
    };
    Ok(Some((key.to_string(), value)))
}

fn main() {
    let loaded_env = match configure_env_from_cli() {
        Ok(info) => info,
        Err(err) => {
            eprintln!("fatal: {}", err);
            std::process::exit(1);
        }
    };

    // Init logging after environment so RUST_LOG from .env is respected.
    let default_filter = env_logger::Env::default().default_filter_or("info");
    env_logger::Builder::from_env(default_filter)
        .format_timestamp_secs()
        .init();

    if let Some(info) = loaded_env.as_ref() {
        let origin = if info.explicit { "CLI-specified" } else { "default" };
        info!("Environment loaded from {} .env file: {}", origin, info.path.display());
    }

    info!(
        "sprinkler-dash {} (git {}) starting",
        env!("CARGO_PKG_VERSION"),
        env!("BUILD_TIME_GIT_HASH")
    );
    if let Err(e) = run() {
        error!("fatal: {}", e);
        std::process::exit(1);
    }
}
