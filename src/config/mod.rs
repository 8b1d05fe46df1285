pub mod loader;

use std::path::PathBuf;

pub use loader::load;
use serde::{Deserialize, Deserializer, Serialize};

use crate::cli::Args;
use crate::provider::aws::DEFAULT_REGIONS;
use crate::provider::gcp::parse_projects;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AwsConfig {
    /// Regions crossed with every profile.
    #[serde(default = "default_regions", deserialize_with = "deserialize_list")]
    pub regions: Vec<String>,
    /// Shared config file to read profiles from.
    #[serde(default)]
    pub config_file: Option<PathBuf>,
}

fn default_regions() -> Vec<String> {
    DEFAULT_REGIONS.iter().map(ToString::to_string).collect()
}

/// A string list with entries trimmed and blanks dropped, matching how the
/// comma separated flags are read.
fn deserialize_list<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let list = Vec::<String>::deserialize(deserializer)?;
    Ok(list
        .iter()
        .map(|entry| entry.trim())
        .filter(|entry| !entry.is_empty())
        .map(ToString::to_string)
        .collect())
}

impl Default for AwsConfig {
    fn default() -> Self {
        Self {
            regions: default_regions(),
            config_file: None,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GcpConfig {
    /// Projects listed when `--projects` is not given.
    #[serde(default, deserialize_with = "deserialize_list")]
    pub projects: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PromptConfig {
    pub prefix: String,
    pub title: String,
}

impl Default for PromptConfig {
    fn default() -> Self {
        Self {
            prefix: "(.exit)> ".to_string(),
            title: "K8S connector".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ThemeConfig {
    pub name: String,
}

impl Default for ThemeConfig {
    fn default() -> Self {
        Self {
            name: "Catppuccin Mocha".to_string(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub aws: AwsConfig,
    #[serde(default)]
    pub gcp: GcpConfig,
    #[serde(default)]
    pub prompt: PromptConfig,
    #[serde(default)]
    pub theme: ThemeConfig,
}

impl AppConfig {
    /// Let command line flags override file settings.
    ///
    /// `--projects ""` clears the configured projects, which skips GKE.
    pub fn apply_cli_args(&mut self, args: &Args) {
        if let Some(projects) = &args.projects {
            self.gcp.projects = parse_projects(projects);
        }
        if let Some(regions) = &args.regions {
            self.aws.regions = regions
                .split(',')
                .map(str::trim)
                .filter(|region| !region.is_empty())
                .map(ToString::to_string)
                .collect();
        }
    }
}

#[cfg(test)]
mod tests {
    use clap::Parser;

    use super::*;

    #[test]
    fn test_defaults() {
        let config = AppConfig::default();

        assert_eq!(config.aws.regions.len(), 17);
        assert_eq!(config.aws.regions[0], "us-east-1");
        assert!(config.gcp.projects.is_empty());
        assert_eq!(config.prompt.prefix, "(.exit)> ");
    }

    #[test]
    fn test_partial_file() {
        let config: AppConfig = toml::from_str(
            r#"
            [gcp]
            projects = ["proj-a"]

            [aws]
            config_file = "/tmp/aws-config"
            "#,
        )
        .unwrap();

        assert_eq!(config.gcp.projects, vec!["proj-a"]);
        assert_eq!(config.aws.regions.len(), 17);
        assert_eq!(config.aws.config_file, Some(PathBuf::from("/tmp/aws-config")));
        assert_eq!(config.theme, ThemeConfig::default());
    }

    #[test]
    fn test_file_lists_are_trimmed() {
        let config: AppConfig = toml::from_str(
            r#"
            [gcp]
            projects = [" proj-a ", "", "  ", "proj-b"]

            [aws]
            regions = ["eu-west-1 ", ""]
            "#,
        )
        .unwrap();

        assert_eq!(config.gcp.projects, vec!["proj-a", "proj-b"]);
        assert_eq!(config.aws.regions, vec!["eu-west-1"]);
    }

    #[test]
    fn test_blank_file_projects_skip_gcp() {
        let config: AppConfig = toml::from_str("[gcp]\nprojects = [\" \"]\n").unwrap();

        assert!(config.gcp.projects.is_empty());
    }

    #[test]
    fn test_projects_flag_overrides_file() {
        let mut config = AppConfig::default();
        config.gcp.projects = vec!["from-file".to_string()];

        let args = Args::parse_from(["k8s-connector", "--projects", "proj-a,proj-b"]);
        config.apply_cli_args(&args);

        assert_eq!(config.gcp.projects, vec!["proj-a", "proj-b"]);
    }

    #[test]
    fn test_empty_projects_flag_skips_gcp() {
        let mut config = AppConfig::default();
        config.gcp.projects = vec!["from-file".to_string()];

        let args = Args::parse_from(["k8s-connector", "--projects", " "]);
        config.apply_cli_args(&args);

        assert!(config.gcp.projects.is_empty());
    }

    #[test]
    fn test_regions_flag() {
        let mut config = AppConfig::default();

        let args = Args::parse_from(["k8s-connector", "--regions", "eu-west-1, us-east-1"]);
        config.apply_cli_args(&args);

        assert_eq!(config.aws.regions, vec!["eu-west-1", "us-east-1"]);
    }

    #[test]
    fn test_without_flags_keeps_file_settings() {
        let mut config = AppConfig::default();
        config.gcp.projects = vec!["from-file".to_string()];

        config.apply_cli_args(&Args::parse_from(["k8s-connector"]));

        assert_eq!(config.gcp.projects, vec!["from-file"]);
        assert_eq!(config.aws.regions.len(), 17);
    }
}
