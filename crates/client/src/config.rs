//! Client configuration loaded from the process environment.
use std::env;
use std::path::PathBuf;

/// Settings of one headless session.
#[derive(Clone, Debug, PartialEq)]
pub struct ClientConfig {
    /// Directory holding `config.toml` and the card list.
    pub data_dir: PathBuf,
    /// Sprite root. Without one every asset resolves in memory.
    pub asset_dir: Option<PathBuf>,
    pub frames: u32,
    /// Seconds simulated per frame.
    pub frame_dt: f32,
    pub spawn_seed: u64,
    /// Also write logs to `<log_dir>/client.log`.
    pub log_dir: Option<PathBuf>,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from("data"),
            asset_dir: None,
            frames: 1800,
            frame_dt: 1.0 / 60.0,
            spawn_seed: 0,
            log_dir: None,
        }
    }
}

impl ClientConfig {
    /// Construct configuration from process environment variables.
    ///
    /// Environment variables:
    /// - `DATA_DIR` - Card list and game config directory (default: data)
    /// - `ASSET_DIR` - Sprite root directory (default: in-memory assets)
    /// - `FRAMES` - Frames to simulate (default: 1800)
    /// - `FRAME_DT` - Seconds per frame (default: 1/60)
    /// - `SPAWN_SEED` - Enemy spawner seed (default: 0)
    /// - `LOG_DIR` - Directory for the log file (default: stderr only)
    pub fn from_env() -> Self {
        let mut config = Self::default();

        if let Ok(dir) = env::var("DATA_DIR") {
            config.data_dir = PathBuf::from(dir);
        }
        config.asset_dir = env::var("ASSET_DIR").ok().map(PathBuf::from);

        if let Some(frames) = read_env::<u32>("FRAMES") {
            config.frames = frames;
        }
        if let Some(dt) = read_env::<f32>("FRAME_DT")
            && dt > 0.0
        {
            config.frame_dt = dt;
        }
        if let Some(seed) = read_env::<u64>("SPAWN_SEED") {
            config.spawn_seed = seed;
        }
        config.log_dir = env::var("LOG_DIR").ok().map(PathBuf::from);

        config
    }
}

fn read_env<T>(key: &str) -> Option<T>
where
    T: std::str::FromStr,
{
    env::var(key).ok()?.parse().ok()
}
