use crate::config::EditorConfigOverrides;
use crate::project::PROJECT_EXTENSION;
use anyhow::{anyhow, bail, Context, Result};
use std::env;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct CliOverrides {
    width: Option<u32>,
    height: Option<u32>,
    project: Option<PathBuf>,
    config: Option<PathBuf>,
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
                // a bare `.project` path opens that project
                if Path::new(flag).extension().is_some_and(|ext| ext == PROJECT_EXTENSION) {
                    overrides.project = Some(PathBuf::from(flag));
                    continue;
                }
                bail!("'{flag}' is not a .{PROJECT_EXTENSION} file; pass options as --name value");
            };
            let value = iter.next().ok_or_else(|| anyhow!("'{flag}' needs a value"))?.as_ref().to_string();
            match key {
                "width" => {
                    overrides.width =
                        Some(value.parse::<u32>().with_context(|| format!("Invalid width '{value}'"))?);
                }
                "height" => {
                    overrides.height =
                        Some(value.parse::<u32>().with_context(|| format!("Invalid height '{value}'"))?);
                }
                "project" => overrides.project = Some(PathBuf::from(value)),
                "config" => overrides.config = Some(PathBuf::from(value)),
                _ => bail!("'{flag}' is not an editor option (expected --project, --config, --width or --height)"),
            }
        }
        Ok(overrides)
    }

    pub fn config_path(&self) -> Option<&PathBuf> {
        self.config.as_ref()
    }

    pub fn into_config_overrides(self) -> EditorConfigOverrides {
        EditorConfigOverrides { width: self.width, height: self.height, project: self.project }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_project_and_window_flags() {
        let args = ["app", "--project", "demo.project", "--width", "1600", "--height", "900"];
        let overrides = CliOverrides::parse(args).expect("parse overrides");
        let config = overrides.into_config_overrides();
        assert_eq!(config.width, Some(1600));
        assert_eq!(config.height, Some(900));
        assert_eq!(config.project, Some(PathBuf::from("demo.project")));
    }

    #[test]
    fn latest_flag_wins() {
        let args = ["app", "--width", "800", "--width", "1920", "--config", "a.json", "--config", "b.json"];
        let overrides = CliOverrides::parse(args).expect("parse overrides");
        assert_eq!(overrides.config_path(), Some(&PathBuf::from("b.json")));
        assert_eq!(overrides.into_config_overrides().width, Some(1920));
    }

    #[test]
    fn project_flag_without_path_errors() {
        let err = CliOverrides::parse(["editor", "--project"]).unwrap_err();
        assert_eq!(err.to_string(), "'--project' needs a value");
    }

    #[test]
    fn scenes_cannot_be_opened_from_the_command_line() {
        let err = CliOverrides::parse(["editor", "--scene", "Level.scene"]).unwrap_err();
        assert!(err.to_string().contains("'--scene' is not an editor option"));

        let err = CliOverrides::parse(["editor", "Level.scene"]).unwrap_err();
        assert!(err.to_string().contains("not a .project file"));
    }

    #[test]
    fn bare_project_path_is_the_project() {
        let overrides = CliOverrides::parse(["editor", "--width", "1024", "Etc/Yard.project"]).expect("parse");
        let config = overrides.into_config_overrides();
        assert_eq!(config.project, Some(PathBuf::from("Etc/Yard.project")));
        assert_eq!(config.width, Some(1024));
    }
}
