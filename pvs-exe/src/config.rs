//! User configuration options.

use crate::{BASE_DIR, CLIOptions};
use dirs::config_dir;
use pvs::log::{info, warn};
use pvs::{BuildConfig, default_threads};
use serde::{Deserialize, Serialize};
use std::{
    fs::{File, OpenOptions, create_dir_all},
    io::{self, Read, Write},
    path::PathBuf,
    time::Duration,
};

const LOG_TAG: &str = "UserConfig";

fn get_cfg_file() -> io::Result<PathBuf> {
    let mut dir = config_dir().ok_or_else(|| {
        io::Error::new(
            io::ErrorKind::NotFound,
            format!("{LOG_TAG}: Couldn't open user config dir"),
        )
    })?;
    dir.push(BASE_DIR);
    if !dir.exists() {
        create_dir_all(&dir)?;
    }
    dir.push("config.toml");
    Ok(dir)
}

#[derive(Debug, Default, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserConfig {
    /// Worker threads, 0 for one per CPU
    pub threads: usize,
    pub interactive: bool,
    /// Overrides the preset's portals-between-reports
    pub report_every: Option<usize>,
    /// Overrides the preset's minimum time between reports
    pub report_interval_ms: Option<u64>,
}

impl UserConfig {
    /// `load` reads the config, recreating it with defaults if it is empty or
    /// can't be parsed
    pub fn load() -> io::Result<Self> {
        let path = get_cfg_file()?;

        let mut file = OpenOptions::new()
            .read(true)
            .write(true)
            .create(true)
            .truncate(false)
            .open(&path)?;
        let mut buf = String::new();
        if file.read_to_string(&mut buf)? == 0 {
            return UserConfig::create_default(&mut file);
        }
        match toml::from_str(&buf) {
            Ok(data) => {
                info!(target: LOG_TAG, "Loaded user config file");
                Ok(data)
            }
            Err(e) => {
                warn!("Could not deserialise {:?} ({}), recreating config", path, e);
                let mut file = File::create(&path)?;
                UserConfig::create_default(&mut file)
            }
        }
    }

    fn create_default(file: &mut File) -> io::Result<Self> {
        let config = UserConfig::default();
        let data = toml::to_string_pretty(&config).map_err(io::Error::other)?;
        file.write_all(data.as_bytes())?;
        info!("Created default user config file");
        Ok(config)
    }

    pub fn write(&self) -> io::Result<()> {
        let path = get_cfg_file()?;
        let data = toml::to_string_pretty(self).map_err(io::Error::other)?;
        File::create(&path)?.write_all(data.as_bytes())?;
        info!("Saved user config to {:?}", path);
        Ok(())
    }

    /// Sync the CLI options and UserOptions with each other
    pub fn sync_cli(&mut self, cli: &mut CLIOptions) {
        info!("Checking CLI options");

        if let Some(threads) = cli.threads {
            if threads != self.threads {
                self.threads = threads;
                info!("Threads changed to: {}", threads);
            }
        } else {
            cli.threads = Some(self.threads);
        }

        if let Some(f) = cli.interactive {
            if f != self.interactive {
                self.interactive = f;
            }
        } else {
            cli.interactive = Some(self.interactive);
        }
    }

    /// The build settings this config asks for
    pub fn build_config(&self) -> BuildConfig {
        let mut config = if self.interactive {
            BuildConfig::interactive()
        } else {
            BuildConfig::batch()
        };
        config.threads = match self.threads {
            0 => default_threads(),
            n => n,
        };
        if let Some(every) = self.report_every {
            config.report_every = every;
        }
        if let Some(ms) = self.report_interval_ms {
            config.report_interval = Duration::from_millis(ms);
        }
        config
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cli(threads: Option<usize>, interactive: Option<bool>) -> CLIOptions {
        CLIOptions {
            verbose: None,
            threads,
            width: 4,
            height: 4,
            seed: None,
            interactive,
            compare: None,
            no_vis: false,
        }
    }

    #[test]
    fn cli_overrides_config() {
        let mut config = UserConfig::default();
        let mut options = cli(Some(6), Some(true));
        config.sync_cli(&mut options);
        assert_eq!(config.threads, 6);
        assert!(config.interactive);
    }

    #[test]
    fn config_fills_cli() {
        let mut config = UserConfig {
            threads: 3,
            ..UserConfig::default()
        };
        let mut options = cli(None, None);
        config.sync_cli(&mut options);
        assert_eq!(options.threads, Some(3));
        assert_eq!(options.interactive, Some(false));
    }

    #[test]
    fn build_config_from_user_config() {
        let config = UserConfig {
            threads: 2,
            interactive: true,
            report_every: Some(7),
            report_interval_ms: None,
        };
        let build = config.build_config();
        assert_eq!(build.threads, 2);
        assert_eq!(build.report_every, 7);
        assert_eq!(build.report_interval, Duration::from_millis(50));

        let all_cpus = UserConfig::default().build_config();
        assert_eq!(all_cpus.threads, default_threads());
        assert_eq!(all_cpus.report_every, 512);
    }

    #[test]
    fn toml_round_trip_skips_unset() {
        let data = toml::to_string_pretty(&UserConfig::default()).unwrap();
        assert!(!data.contains("report_every"));
        let back: UserConfig = toml::from_str("threads = 4\ninteractive = true\n").unwrap();
        assert_eq!(back.threads, 4);
        assert_eq!(back.report_interval_ms, None);
    }
}
