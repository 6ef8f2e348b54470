//! # CLI command implementations
//!
//! `init` prepares a filesystem-backed data directory and a notary
//! identity; `serve` boots the repository over that directory and starts
//! the HTTP semantics engine. `main` itself never touches a subsystem
//! directly — it only calls [`run_command`].

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use serde_json::json;

use crate::http::{HttpServer, HttpServerConfig};
use crate::model::Name;
use crate::notary::ReferenceNotary;
use crate::observability::{log_event, Event};
use crate::repository::{DocumentRepository, Reaper, EVENTS_BAG};
use crate::storage::{FilesystemBackend, Location};

use super::args::Command;
use super::errors::{CliError, CliResult};

const BACKEND_LOCATIONS: [Location; 4] = [Location::Names, Location::Documents, Location::Contracts, Location::Messages];

/// On-disk configuration, loaded from the path passed via `--config`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Root of the filesystem backend.
    pub data_dir: String,

    /// Where the notary's Ed25519 keypair is persisted across restarts.
    #[serde(default = "default_notary_key_path")]
    pub notary_key_path: String,

    #[serde(default, flatten)]
    pub http: HttpServerConfig,
}

fn default_notary_key_path() -> String {
    "./notary.key".to_string()
}

impl Config {
    pub fn load(path: &Path) -> CliResult<Self> {
        let content = fs::read_to_string(path).map_err(|e| CliError::config_error(format!("failed to read config: {e}")))?;
        let config: Config = serde_json::from_str(&content).map_err(|e| CliError::config_error(format!("invalid config JSON: {e}")))?;
        Ok(config)
    }

    pub fn data_path(&self) -> &Path {
        Path::new(&self.data_dir)
    }

    pub fn notary_key_path(&self) -> &Path {
        Path::new(&self.notary_key_path)
    }
}

/// The only function `main.rs` calls: dispatch to the requested command.
pub fn run_command(cmd: Command) -> CliResult<()> {
    match cmd {
        Command::Init { config } => init(&config),
        Command::Serve { config } => serve(&config),
    }
}

fn is_initialized(data_dir: &Path) -> bool {
    BACKEND_LOCATIONS.iter().all(|loc| data_dir.join(loc.as_str()).is_dir())
}

/// Create the filesystem backend's subdirectories and, if absent,
/// generate a notary identity. Never starts the server.
pub fn init(config_path: &Path) -> CliResult<()> {
    let config = Config::load(config_path)?;
    let data_dir = config.data_path();

    if is_initialized(data_dir) {
        return Err(CliError::already_initialized(data_dir.display()));
    }

    for loc in BACKEND_LOCATIONS {
        let dir = data_dir.join(loc.as_str());
        fs::create_dir_all(&dir).map_err(|e| CliError::config_error(format!("failed to create {dir:?}: {e}")))?;
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            let _ = fs::set_permissions(&dir, fs::Permissions::from_mode(0o700));
        }
    }

    let key_path = config.notary_key_path();
    let generated = if key_path.exists() {
        false
    } else {
        let notary = ReferenceNotary::generate();
        write_notary_key(key_path, &notary)?;
        true
    };

    println!(
        "{}",
        json!({"status": "ok", "data": {"initialized": true, "data_dir": config.data_dir, "notary_key_generated": generated}})
    );
    Ok(())
}

fn write_notary_key(path: &Path, notary: &ReferenceNotary) -> CliResult<()> {
    fs::write(path, notary.to_bytes()).map_err(|e| CliError::config_error(format!("failed to write notary key: {e}")))?;
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        let _ = fs::set_permissions(path, fs::Permissions::from_mode(0o600));
    }
    Ok(())
}

fn load_notary(path: &Path) -> CliResult<ReferenceNotary> {
    let bytes = fs::read(path).map_err(|_| CliError::boot_failed(format!("no notary key at {path:?}; run 'init' first")))?;
    ReferenceNotary::from_bytes(&bytes).map_err(|e| CliError::boot_failed(format!("malformed notary key: {e}")))
}

/// Boot the repository over `config`'s data directory and serve the HTTP
/// semantics engine until the process is killed.
pub fn serve(config_path: &Path) -> CliResult<()> {
    let config = Config::load(config_path)?;
    let data_dir: PathBuf = config.data_path().to_path_buf();

    if !is_initialized(&data_dir) {
        return Err(CliError::boot_failed(format!("{data_dir:?} is not initialized; run 'init' first")));
    }

    let notary = load_notary(config.notary_key_path())?;
    let backend = FilesystemBackend::new(data_dir);
    let repository = Arc::new(DocumentRepository::new(backend, notary));

    let runtime = tokio::runtime::Runtime::new().map_err(|e| CliError::boot_failed(format!("failed to start async runtime: {e}")))?;

    runtime.block_on(async move {
        log_event(Event::RepositoryStart);

        if config.http.reaper_enabled() {
            if let Ok(events_bag) = Name::parse(EVENTS_BAG) {
                let reaper = Reaper::new(repository.clone(), vec![events_bag], std::time::Duration::from_secs(config.http.reaper_interval_seconds));
                reaper.spawn();
            }
        }

        log_event(Event::RepositoryReady);
        let server = HttpServer::with_config(repository, config.http);
        server.start().await.map_err(|e| CliError::boot_failed(format!("server error: {e}")))
    })
}
