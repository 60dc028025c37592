pub mod toml_config;

use crate::domain::model::{Identity, LayoutConfig};
use crate::utils::error::{FamilyTreeError, Result};
use crate::utils::validation::{self, Validate};

#[cfg(feature = "cli")]
use clap::Parser;
#[cfg(feature = "cli")]
use toml_config::TomlConfig;

#[cfg(feature = "cli")]
#[derive(Debug, Clone, Parser)]
#[command(name = "family-tree")]
#[command(about = "Resolve, analyze and lay out the family tree of a member")]
pub struct CliConfig {
    /// Any member of the family to draw
    #[arg(short, long)]
    pub member: String,

    /// JSON file holding the relationship records
    #[arg(short, long)]
    pub records: Option<String>,

    /// Optional TOML configuration file
    #[arg(short, long)]
    pub config: Option<String>,

    #[arg(long)]
    pub box_size: Option<f64>,

    #[arg(long)]
    pub gap: Option<f64>,

    #[arg(long)]
    pub row_gap: Option<f64>,

    /// Pretty-print the JSON output
    #[arg(long)]
    pub pretty: bool,

    #[arg(short, long, help = "Enable verbose output")]
    pub verbose: bool,
}

#[cfg(feature = "cli")]
impl CliConfig {
    pub fn load_toml(&self) -> Result<TomlConfig> {
        match &self.config {
            Some(path) => TomlConfig::from_file(path),
            None => Ok(TomlConfig::default()),
        }
    }

    /// Merges command line flags over the file configuration.
    pub fn settings(&self, file: &TomlConfig) -> Result<Settings> {
        let records_path = self
            .records
            .clone()
            .or_else(|| file.records_path().map(str::to_string));
        let records_path = validation::validate_required_field("records", &records_path)?.clone();

        let mut layout = file.layout;
        if let Some(box_size) = self.box_size {
            layout.box_size = box_size;
        }
        if let Some(gap) = self.gap {
            layout.gap = gap;
        }
        if let Some(row_gap) = self.row_gap {
            layout.row_gap = row_gap;
        }

        Ok(Settings {
            records_path,
            member: self.member.clone(),
            layout,
        })
    }
}

/// Fully resolved settings for one tree request.
#[derive(Debug, Clone)]
pub struct Settings {
    pub records_path: String,
    pub member: String,
    pub layout: LayoutConfig,
}

impl Settings {
    pub fn member(&self) -> Identity {
        Identity::new(self.member.trim())
    }
}

impl Validate for Settings {
    fn validate(&self) -> Result<()> {
        validation::validate_path("records", &self.records_path)?;
        validation::validate_non_empty_string("member", &self.member)?;
        self.layout.validate().map_err(|e| match e {
            FamilyTreeError::InvalidConfigValueError { field, value, reason } => {
                FamilyTreeError::InvalidConfigValueError {
                    field: field.replace("layout.", "--").replace('_', "-"),
                    value,
                    reason,
                }
            }
            other => other,
        })
    }
}

#[cfg(all(test, feature = "cli"))]
mod tests {
    use super::*;

    #[test]
    fn test_flags_override_file() {
        let cli = CliConfig::parse_from([
            "family-tree",
            "--member",
            "ann",
            "--gap",
            "10",
        ]);
        let file = TomlConfig::from_toml_str(
            r#"
[store]
records_path = "from-file.json"

[layout]
gap = 99.0
box_size = 50.0
"#,
        )
        .unwrap();

        let settings = cli.settings(&file).unwrap();
        assert_eq!(settings.records_path, "from-file.json");
        assert_eq!(settings.layout.gap, 10.0);
        assert_eq!(settings.layout.box_size, 50.0);
        assert_eq!(settings.member(), Identity::new("ann"));
        assert!(settings.validate().is_ok());
    }

    #[test]
    fn test_records_are_required() {
        let cli = CliConfig::parse_from(["family-tree", "--member", "ann"]);
        let err = cli.settings(&TomlConfig::default()).unwrap_err();
        assert!(matches!(err, FamilyTreeError::MissingConfigError { .. }));
    }

    #[test]
    fn test_invalid_flag_names_the_flag() {
        let cli = CliConfig::parse_from([
            "family-tree",
            "--member",
            "ann",
            "--records",
            "r.json",
            "--box-size",
            "0",
        ]);
        let err = cli.settings(&TomlConfig::default()).unwrap().validate().unwrap_err();
        assert!(err.to_string().contains("--box-size"));
    }
}
