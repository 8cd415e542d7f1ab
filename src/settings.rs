//! Start-up settings
//!
//! Defaults, optionally overlaid by a JSON document, then by command line
//! flags. Everything is validated here so the simulation never sees a
//! negative count or an empty canvas.

use serde::{Deserialize, Serialize};

use crate::consts::*;
use crate::error::{ConfigError, ConfigResult};
use crate::sim::{CenterSampled, ContourExtractor, SaddlePolicy, SeparateSaddles};

/// How the ambiguous saddle cells are contoured
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum SaddleMode {
    /// Two corner cuts straight from the case table
    #[default]
    Separate,
    /// Sample the cell center to decide which corners stay joined
    Center,
}

impl SaddleMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            SaddleMode::Separate => "separate",
            SaddleMode::Center => "center",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "separate" | "two" => Some(SaddleMode::Separate),
            "center" | "centre" => Some(SaddleMode::Center),
            _ => None,
        }
    }

    pub fn policy(&self) -> Box<dyn SaddlePolicy> {
        match self {
            SaddleMode::Separate => Box::new(SeparateSaddles),
            SaddleMode::Center => Box::new(CenterSampled),
        }
    }
}

/// Run configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Number of balls
    pub ball_count: usize,
    /// Base tick interval in milliseconds
    pub refresh_ms: u32,
    /// Initial speed; divides the tick interval
    pub speed: u32,
    /// RNG seed, time-derived when absent
    pub seed: Option<u64>,
    /// Canvas size for the native runner
    pub width: u32,
    pub height: u32,
    /// Frames to run natively before exiting, `None` for no limit
    pub frames: Option<u64>,
    pub saddle: SaddleMode,
    /// Field grid spacing in pixels
    pub cell_size: u32,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            ball_count: DEFAULT_BALL_COUNT,
            refresh_ms: DEFAULT_REFRESH_MS,
            speed: MIN_SPEED,
            seed: None,
            width: DEFAULT_WIDTH,
            height: DEFAULT_HEIGHT,
            frames: None,
            saddle: SaddleMode::Separate,
            cell_size: CELL_SIZE,
        }
    }
}

pub const USAGE: &str = "\
The classic metaball screensaver.

Usage: metaballs [OPTIONS]

Options:
  -c, --balls <number>        Number of balls to draw (default = 6)
  -r, --rate <milliseconds>   Refresh rate (default = 16)
  -s, --speed <number>        Speed (default = 1)
      --seed <number>         RNG seed (default = current time)
      --width <pixels>        Canvas width (default = 800)
      --height <pixels>       Canvas height (default = 600)
      --frames <number>       Stop after this many frames
      --saddle <mode>         Saddle handling: separate | center
      --cell-size <pixels>    Field grid spacing (default = 3)
      --config <path>         Load settings from a JSON file first
  -h, --help                  Print help
";

impl Settings {
    /// Parse settings from a JSON document; missing keys keep their defaults
    pub fn from_json(json: &str) -> ConfigResult<Self> {
        let settings: Settings =
            serde_json::from_str(json).map_err(|e| ConfigError::Json(e.to_string()))?;
        settings.validate()?;
        Ok(settings)
    }

    /// Build settings from command line arguments (program name excluded)
    pub fn from_args<I, S>(args: I) -> ConfigResult<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let args: Vec<String> = args.into_iter().map(Into::into).collect();

        // A config file is the base layer whatever its position on the line
        let mut settings = match find_config_path(&args)? {
            Some(path) => {
                let json = std::fs::read_to_string(path).map_err(|e| ConfigError::Read {
                    path: path.to_string(),
                    reason: e.to_string(),
                })?;
                serde_json::from_str(&json).map_err(|e| ConfigError::Json(e.to_string()))?
            }
            None => Settings::default(),
        };

        let mut iter = args.iter();
        while let Some(arg) = iter.next() {
            let (flag, inline) = match arg.split_once('=') {
                Some((flag, value)) if flag.starts_with("--") => (flag, Some(value)),
                _ => (arg.as_str(), None),
            };
            let mut value = || take_value(flag, inline, &mut iter);

            match flag {
                "-c" | "--balls" => settings.ball_count = parse_value(flag, value()?)?,
                "-r" | "--rate" => settings.refresh_ms = parse_value(flag, value()?)?,
                "-s" | "--speed" => settings.speed = parse_value(flag, value()?)?,
                "--seed" => settings.seed = Some(parse_value(flag, value()?)?),
                "--width" => settings.width = parse_value(flag, value()?)?,
                "--height" => settings.height = parse_value(flag, value()?)?,
                "--frames" => settings.frames = Some(parse_value(flag, value()?)?),
                "--cell-size" => settings.cell_size = parse_value(flag, value()?)?,
                "--saddle" => {
                    let raw = value()?;
                    settings.saddle =
                        SaddleMode::from_str(raw).ok_or_else(|| ConfigError::InvalidValue {
                            option: flag.to_string(),
                            value: raw.to_string(),
                        })?;
                }
                "--config" => {
                    // Already applied
                    value()?;
                }
                _ => return Err(ConfigError::UnknownOption(arg.clone())),
            }
        }

        settings.validate()?;
        Ok(settings)
    }

    /// Reject values the simulation cannot run with
    pub fn validate(&self) -> ConfigResult<()> {
        if self.refresh_ms == 0 {
            return Err(out_of_range("refresh_ms", "must be at least 1"));
        }
        if self.cell_size == 0 {
            return Err(out_of_range("cell_size", "must be at least 1"));
        }
        if self.width == 0 || self.height == 0 {
            return Err(out_of_range("canvas", "must have non-zero width and height"));
        }
        if self.width.max(self.height) > MAX_CANVAS_DIM {
            return Err(out_of_range(
                "canvas",
                &format!("must be at most {MAX_CANVAS_DIM} pixels on each side"),
            ));
        }
        if !(MIN_SPEED..=MAX_SPEED).contains(&self.speed) {
            return Err(out_of_range(
                "speed",
                &format!("must be within {MIN_SPEED}..={MAX_SPEED}"),
            ));
        }
        if self.ball_count > 0 && self.width.min(self.height) < MIN_CANVAS_DIM {
            return Err(out_of_range(
                "canvas",
                &format!("must be at least {MIN_CANVAS_DIM} pixels on each side to hold balls"),
            ));
        }
        Ok(())
    }

    /// Explicit seed, or `fallback` when none was configured
    pub fn resolved_seed(&self, fallback: u64) -> u64 {
        self.seed.unwrap_or(fallback)
    }

    /// Contour extractor configured with this run's saddle policy
    pub fn extractor(&self) -> ContourExtractor {
        ContourExtractor::new(self.saddle.policy())
    }
}

/// Whether the arguments ask for usage text
pub fn wants_help<S: AsRef<str>>(args: &[S]) -> bool {
    args.iter().any(|a| matches!(a.as_ref(), "-h" | "--help"))
}

fn find_config_path(args: &[String]) -> ConfigResult<Option<&str>> {
    let mut path = None;
    let mut iter = args.iter();
    while let Some(arg) = iter.next() {
        if arg == "--config" {
            let value = iter
                .next()
                .ok_or_else(|| ConfigError::MissingValue("--config".to_string()))?;
            path = Some(value.as_str());
        } else if let Some(value) = arg.strip_prefix("--config=") {
            path = Some(value);
        }
    }
    Ok(path)
}

fn take_value<'a>(
    flag: &str,
    inline: Option<&'a str>,
    rest: &mut std::slice::Iter<'a, String>,
) -> ConfigResult<&'a str> {
    match inline {
        Some(v) => Ok(v),
        None => rest
            .next()
            .map(String::as_str)
            .ok_or_else(|| ConfigError::MissingValue(flag.to_string())),
    }
}

fn parse_value<T: std::str::FromStr>(option: &str, raw: &str) -> ConfigResult<T> {
    raw.parse().map_err(|_| ConfigError::InvalidValue {
        option: option.to_string(),
        value: raw.to_string(),
    })
}

fn out_of_range(field: &'static str, reason: &str) -> ConfigError {
    ConfigError::OutOfRange {
        field,
        reason: reason.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let settings = Settings::from_args(Vec::<String>::new()).unwrap();
        assert_eq!(settings, Settings::default());
        assert_eq!(settings.ball_count, 6);
        assert_eq!(settings.refresh_ms, 16);
        assert_eq!(settings.speed, 1);
        assert_eq!(settings.cell_size, 3);
    }

    #[test]
    fn test_short_and_long_flags() {
        let settings =
            Settings::from_args(["-c", "10", "--rate=33", "-s", "2", "--seed", "99"]).unwrap();
        assert_eq!(settings.ball_count, 10);
        assert_eq!(settings.refresh_ms, 33);
        assert_eq!(settings.speed, 2);
        assert_eq!(settings.seed, Some(99));
    }

    #[test]
    fn test_negative_count_rejected() {
        let err = Settings::from_args(["--balls", "-1"]).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidValue { .. }));
    }

    #[test]
    fn test_zero_balls_allowed() {
        let settings = Settings::from_args(["-c", "0", "--width", "10", "--height", "10"]).unwrap();
        assert_eq!(settings.ball_count, 0);
    }

    #[test]
    fn test_zero_canvas_rejected() {
        let err = Settings::from_args(["--width", "0"]).unwrap_err();
        assert!(matches!(err, ConfigError::OutOfRange { field: "canvas", .. }));
    }

    #[test]
    fn test_small_canvas_rejected_with_balls() {
        let err = Settings::from_args(["--width", "100", "--height", "100"]).unwrap_err();
        assert!(matches!(err, ConfigError::OutOfRange { field: "canvas", .. }));
    }

    #[test]
    fn test_oversized_canvas_rejected() {
        let err = Settings::from_args([
            "--width",
            "4000000000",
            "--height",
            "4000000000",
            "-c",
            "0",
        ])
        .unwrap_err();
        assert!(matches!(err, ConfigError::OutOfRange { field: "canvas", .. }));

        let wide = (MAX_CANVAS_DIM + 1).to_string();
        assert!(Settings::from_args(["--width", wide.as_str()]).is_err());
        let largest = MAX_CANVAS_DIM.to_string();
        let settings =
            Settings::from_args(["-c", "0", "--width", largest.as_str(), "--height", largest.as_str()]);
        assert!(settings.is_ok());
    }

    #[test]
    fn test_speed_bounds() {
        assert!(Settings::from_args(["-s", "0"]).is_err());
        let too_fast = (MAX_SPEED + 1).to_string();
        assert!(Settings::from_args(["-s", too_fast.as_str()]).is_err());
    }

    #[test]
    fn test_missing_value() {
        let err = Settings::from_args(["--rate"]).unwrap_err();
        assert_eq!(err, ConfigError::MissingValue("--rate".to_string()));
    }

    #[test]
    fn test_unknown_option() {
        let err = Settings::from_args(["--turbo"]).unwrap_err();
        assert_eq!(err, ConfigError::UnknownOption("--turbo".to_string()));
    }

    #[test]
    fn test_saddle_mode() {
        let settings = Settings::from_args(["--saddle", "center"]).unwrap();
        assert_eq!(settings.saddle, SaddleMode::Center);
        assert!(Settings::from_args(["--saddle", "diagonal"]).is_err());
    }

    #[test]
    fn test_saddle_mode_names() {
        for mode in [SaddleMode::Separate, SaddleMode::Center] {
            assert_eq!(SaddleMode::from_str(mode.as_str()), Some(mode));
        }
    }

    #[test]
    fn test_from_json_partial() {
        let settings = Settings::from_json(r#"{ "ball_count": 12, "saddle": "center" }"#).unwrap();
        assert_eq!(settings.ball_count, 12);
        assert_eq!(settings.saddle, SaddleMode::Center);
        assert_eq!(settings.refresh_ms, DEFAULT_REFRESH_MS);
    }

    #[test]
    fn test_from_json_malformed() {
        assert!(matches!(
            Settings::from_json("{ ball_count: }"),
            Err(ConfigError::Json(_))
        ));
    }

    #[test]
    fn test_help_detection() {
        assert!(wants_help(&["-c", "3", "--help"]));
        assert!(!wants_help(&["-c", "3"]));
    }
}
