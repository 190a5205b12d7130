use clap::Parser;

/// Command-line surface for webrd-server (spec §6).
#[derive(Parser, Debug)]
#[command(name = "webrd-server", version, about = "Web-accessible remote desktop server")]
pub struct Cli {
    /// Port to listen on.
    #[arg(long, default_value_t = 7417)]
    pub port: u16,

    /// Shared secret that grants a control (mouse/keyboard) session.
    #[arg(long)]
    pub password: String,

    /// Shared secret that grants a view-only session.
    #[arg(long = "view-password")]
    pub view_password: Option<String>,

    /// Capture the union of all monitors instead of just the primary one.
    #[arg(long)]
    pub fullscreen: bool,

    /// Frame pacing cap, in frames per second.
    #[arg(long, default_value_t = 30)]
    pub max_fps: u32,

    /// Input dispatch cap, in events per second.
    #[arg(long, default_value_t = 60)]
    pub max_ips: u32,

    /// Lower bound clamp for client-requested JPEG quality.
    #[arg(long, default_value_t = 30)]
    pub min_quality: u8,

    /// Upper bound clamp for client-requested JPEG quality.
    #[arg(long, default_value_t = 80)]
    pub max_quality: u8,

    /// Consecutive partial frames allowed before a forced full repaint (N_P).
    #[arg(long, default_value_t = 20)]
    pub partial_frames_before_full_repaint: u32,

    /// Consecutive empty frames allowed before a forced full repaint (N_E).
    #[arg(long, default_value_t = 60)]
    pub empty_frames_before_full_repaint: u32,
}

/// Process-wide immutable configuration (spec §3).
///
/// Built once from [`Cli`] via [`Config::try_from_cli`] and shared
/// read-only (`Arc<Config>`) across every session; nothing mutates it
/// after startup.
#[derive(Debug, Clone)]
pub struct Config {
    pub port: u16,
    pub control_password: String,
    pub view_password: Option<String>,
    pub fullscreen: bool,
    pub max_fps: u32,
    pub max_ips: u32,
    pub min_quality: u8,
    pub max_quality: u8,
    pub partial_frames_before_full_repaint: u32,
    pub empty_frames_before_full_repaint: u32,
}

/// Fatal configuration problems, surfaced to `main` as a nonzero exit
/// (spec §6).
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("port must be nonzero")]
    ZeroPort,

    #[error("--password is required and must be non-empty")]
    EmptyControlPassword,

    #[error("--view-password must differ from --password")]
    ViewPasswordMatchesControl,

    #[error("quality bounds must satisfy 1 <= min <= max <= 100, got min={min} max={max}")]
    InvalidQualityBounds { min: u8, max: u8 },

    #[error("--max-fps must be nonzero")]
    ZeroMaxFps,

    #[error("--max-ips must be nonzero")]
    ZeroMaxIps,

    #[error("--partial-frames-before-full-repaint must be nonzero")]
    ZeroPartialBudget,

    #[error("--empty-frames-before-full-repaint must be nonzero")]
    ZeroEmptyBudget,
}

impl Config {
    /// Validate a parsed [`Cli`] into an immutable [`Config`].
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] for any combination the spec forbids:
    /// an empty control password, a view password equal to the control
    /// password, inverted or out-of-range quality bounds, or a zero
    /// rate/budget cap.
    pub fn try_from_cli(cli: Cli) -> Result<Self, ConfigError> {
        if cli.port == 0 {
            return Err(ConfigError::ZeroPort);
        }
        if cli.password.is_empty() {
            return Err(ConfigError::EmptyControlPassword);
        }
        if let Some(view) = &cli.view_password {
            if *view == cli.password {
                return Err(ConfigError::ViewPasswordMatchesControl);
            }
        }
        if cli.min_quality == 0
            || cli.max_quality == 0
            || cli.min_quality > cli.max_quality
            || cli.max_quality > 100
        {
            return Err(ConfigError::InvalidQualityBounds {
                min: cli.min_quality,
                max: cli.max_quality,
            });
        }
        if cli.max_fps == 0 {
            return Err(ConfigError::ZeroMaxFps);
        }
        if cli.max_ips == 0 {
            return Err(ConfigError::ZeroMaxIps);
        }
        if cli.partial_frames_before_full_repaint == 0 {
            return Err(ConfigError::ZeroPartialBudget);
        }
        if cli.empty_frames_before_full_repaint == 0 {
            return Err(ConfigError::ZeroEmptyBudget);
        }

        Ok(Self {
            port: cli.port,
            control_password: cli.password,
            view_password: cli.view_password,
            fullscreen: cli.fullscreen,
            max_fps: cli.max_fps,
            max_ips: cli.max_ips,
            min_quality: cli.min_quality,
            max_quality: cli.max_quality,
            partial_frames_before_full_repaint: cli.partial_frames_before_full_repaint,
            empty_frames_before_full_repaint: cli.empty_frames_before_full_repaint,
        })
    }

    #[must_use]
    pub fn clamp_quality(&self, requested: u8) -> u8 {
        requested.clamp(self.min_quality, self.max_quality)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn base_cli() -> Cli {
        Cli {
            port: 7417,
            password: "secret".into(),
            view_password: None,
            fullscreen: false,
            max_fps: 30,
            max_ips: 60,
            min_quality: 30,
            max_quality: 80,
            partial_frames_before_full_repaint: 20,
            empty_frames_before_full_repaint: 60,
        }
    }

    #[test]
    fn valid_cli_builds_config() {
        assert!(Config::try_from_cli(base_cli()).is_ok());
    }

    #[test]
    fn empty_password_is_rejected() {
        let mut cli = base_cli();
        cli.password = String::new();
        assert!(matches!(
            Config::try_from_cli(cli),
            Err(ConfigError::EmptyControlPassword)
        ));
    }

    #[test]
    fn matching_view_password_is_rejected() {
        let mut cli = base_cli();
        cli.view_password = Some("secret".into());
        assert!(matches!(
            Config::try_from_cli(cli),
            Err(ConfigError::ViewPasswordMatchesControl)
        ));
    }

    #[test]
    fn inverted_quality_bounds_are_rejected() {
        let mut cli = base_cli();
        cli.min_quality = 90;
        cli.max_quality = 10;
        assert!(matches!(
            Config::try_from_cli(cli),
            Err(ConfigError::InvalidQualityBounds { .. })
        ));
    }

    #[test]
    fn clamp_quality_respects_bounds() {
        let config = Config::try_from_cli(base_cli()).unwrap();
        assert_eq!(config.clamp_quality(5), 30);
        assert_eq!(config.clamp_quality(95), 80);
        assert_eq!(config.clamp_quality(50), 50);
    }
}
