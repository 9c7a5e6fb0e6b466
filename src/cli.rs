use crate::config::ZoneToolsConfigOverrides;
use anyhow::{anyhow, bail, Context, Result};
use std::env;
use std::path::PathBuf;

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct CliOverrides {
    config_path: Option<PathBuf>,
    frames: Option<u32>,
    block_depth: Option<i32>,
    auto_open: Option<bool>,
    debug: Option<bool>,
}

impl CliOverrides {
    pub fn parse_from_env() -> Result<Self> {
        Self::parse(env::args())
    }

    pub fn parse<I, S>(args: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut overrides = CliOverrides::default();
        let mut iter = args.into_iter();
        let _ = iter.next(); // skip program name if present
        while let Some(raw_flag) = iter.next() {
            let flag = raw_flag.as_ref();
            let Some(key) = flag.strip_prefix("--") else {
                bail!("Unexpected argument '{flag}'. Flags take the form --name value.");
            };
            let value =
                iter.next().ok_or_else(|| anyhow!("Expected a value after '{flag}'"))?.as_ref().to_string();
            match key {
                "config" => overrides.config_path = Some(PathBuf::from(value)),
                "frames" => {
                    overrides.frames =
                        Some(value.parse::<u32>().with_context(|| format!("Invalid frame count '{value}'"))?);
                }
                "block-depth" => {
                    let depth =
                        value.parse::<i32>().with_context(|| format!("Invalid block depth '{value}'"))?;
                    if depth < 0 {
                        bail!("Block depth must not be negative (got {depth}).");
                    }
                    overrides.block_depth = Some(depth);
                }
                "auto-open" => overrides.auto_open = Some(parse_bool_flag("auto-open", &value)?),
                "debug" => overrides.debug = Some(parse_bool_flag("debug", &value)?),
                _ => bail!(
                    "Unknown flag '{flag}'. Supported flags: --config, --frames, --block-depth, --auto-open, --debug."
                ),
            }
        }
        Ok(overrides)
    }

    pub fn config_path(&self) -> Option<&PathBuf> {
        self.config_path.as_ref()
    }

    pub fn frames(&self) -> Option<u32> {
        self.frames
    }

    pub fn into_config_overrides(self) -> ZoneToolsConfigOverrides {
        ZoneToolsConfigOverrides {
            block_depth: self.block_depth,
            auto_open_panel_for_road_tools: self.auto_open,
            debug: self.debug,
        }
    }
}

fn parse_bool_flag(flag: &str, value: &str) -> Result<bool> {
    match value.to_ascii_lowercase().as_str() {
        "1" | "true" | "on" | "yes" => Ok(true),
        "0" | "false" | "off" | "no" => Ok(false),
        other => bail!("Invalid {flag} value '{other}'. Use on/off or true/false."),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_all_flags() {
        let args =
            ["zone_tools", "--config", "zt.json", "--frames", "40", "--block-depth", "4", "--auto-open", "off"];
        let cli = CliOverrides::parse(args).expect("parse overrides");
        assert_eq!(cli.config_path(), Some(&PathBuf::from("zt.json")));
        assert_eq!(cli.frames(), Some(40));
        let overrides = cli.into_config_overrides();
        assert_eq!(overrides.block_depth, Some(4));
        assert_eq!(overrides.auto_open_panel_for_road_tools, Some(false));
        assert_eq!(overrides.debug, None);
    }

    #[test]
    fn latest_flag_wins() {
        let cli = CliOverrides::parse(["zone_tools", "--debug", "on", "--debug", "off"]).expect("parse");
        assert_eq!(cli.into_config_overrides().debug, Some(false));
    }

    #[test]
    fn missing_value_errors() {
        let err = CliOverrides::parse(["zone_tools", "--frames"]).unwrap_err();
        assert!(err.to_string().contains("Expected a value"), "error should mention missing value");
    }

    #[test]
    fn rejects_unknown_flags_and_negative_depth() {
        let err = CliOverrides::parse(["zone_tools", "--foo", "bar"]).unwrap_err();
        assert!(err.to_string().contains("Unknown flag"));
        let err = CliOverrides::parse(["zone_tools", "--block-depth", "-1"]).unwrap_err();
        assert!(err.to_string().contains("negative"));
    }
}
