use std::{path::PathBuf, sync::Arc};

use parking_lot::RwLock;
use tokio::sync::Mutex;
use tracing::info;

use crate::bot::{
    audio::player::AudioPlayer,
    commands::{commands::BotResult, CommandRegistry},
    config::loader::{load_config, LoadedConfig},
    dispatcher::dispatcher::Resolver,
    ratelimit::clock::Clock,
    runtime::lifecycle::Lifecycle,
    state::def::AppState,
};

impl AppState {
    pub async fn load(config_path: PathBuf, registry: Arc<CommandRegistry>, player: Arc<dyn AudioPlayer>, clock: Arc<dyn Clock>) -> BotResult<Self> {
        let loaded = load_config(&config_path, &registry.names()).await?;
        Ok(Self::from_loaded(config_path, loaded, registry, player, clock))
    }

    pub fn from_loaded(
        config_path: PathBuf,
        loaded: LoadedConfig,
        registry: Arc<CommandRegistry>,
        player: Arc<dyn AudioPlayer>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        info!(spam_interval = loaded.spam_interval, "Initialized");
        Self {
            config_path,
            resolver: Resolver::new(loaded.snapshot, loaded.spam_interval),
            registry,
            sounds: RwLock::new(loaded.sounds),
            player,
            clock,
            lifecycle: Lifecycle::default(),
            reload_lock: Mutex::new(()),
        }
    }

    /// Re-reads the config file and swaps it in. If anything about the file
    /// is wrong the running configuration is left exactly as it was.
    ///
    /// Cooldowns and the live spam interval survive a reload; the interval
    /// in the file only matters at startup. Reloads run one at a time.
    pub async fn reload(&self) -> BotResult<()> {
        let _reloading = self.reload_lock.lock().await;
        let loaded = load_config(&self.config_path, &self.registry.names()).await?;

        self.resolver.reconfigure(loaded.snapshot);
        *self.sounds.write() = loaded.sounds;

        info!(path = %self.config_path.display(), "Reloaded configuration");
        Ok(())
    }
}
