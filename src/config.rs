use std::path::{Path, PathBuf};

use figment::providers::{Env, Format, Serialized, Yaml};
use figment::Figment;
use serde::{Deserialize, Serialize};

use crate::batch::{Batch, DownloadTask};
use crate::encoder::{OutputFormat, DEFAULT_JPEG_QUALITY};

pub const DEFAULT_CONFIG_PATH: &str = "pixfetch.yaml";
const ENV_PREFIX: &str = "PIXFETCH_";

#[derive(Serialize, Debug, Deserialize, PartialEq, Clone)]
pub struct ImageSource {
    pub path: String,
    pub url: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub format: Option<OutputFormat>,
}

#[derive(Serialize, Debug, Deserialize, PartialEq, Clone)]
pub struct Config {
    pub output_root: PathBuf,
    pub jpeg_quality: u8,
    pub log_level: String,
    pub fail_on_error: bool,
    pub images: Vec<ImageSource>,
}

impl Default for Config {
    fn default() -> Self {
        let image = |path: &str, url: &str| ImageSource {
            path: String::from(path),
            url: String::from(url),
            format: None,
        };
        Config {
            output_root: PathBuf::from("."),
            jpeg_quality: DEFAULT_JPEG_QUALITY,
            log_level: String::from("info"),
            fail_on_error: false,
            images: vec![
                image(
                    "static/images/nurses/team.jpg",
                    "https://dummyimage.com/800x600/FFD700/000000&text=Expert+Nurses+Team",
                ),
                image(
                    "static/images/nurses/facility.jpg",
                    "https://dummyimage.com/800x600/FFD700/000000&text=Modern+Facilities",
                ),
                image(
                    "static/images/nurses/care.jpg",
                    "https://dummyimage.com/800x600/FFD700/000000&text=24/7+Care",
                ),
            ],
        }
    }
}

impl Config {
    /// Defaults, then the YAML file (if present), then `PIXFETCH_*` variables.
    pub fn load(path: &Path) -> Result<Config, figment::Error> {
        let config: Config = Figment::from(Serialized::defaults(Config::default()))
            .merge(Yaml::file(path))
            .merge(Env::prefixed(ENV_PREFIX))
            .extract()?;

        if config.jpeg_quality > 100 {
            return Err(figment::Error::from(format!(
                "jpeg_quality must be between 0 (worst) and 100 (best), got {}",
                config.jpeg_quality
            )));
        }
        Ok(config)
    }

    pub fn batch(&self) -> Batch {
        Batch::new(
            self.images
                .iter()
                .map(|image| {
                    let task = DownloadTask::new(&image.path, &image.url);
                    match image.format {
                        Some(format) => task.with_format(format),
                        None => task,
                    }
                })
                .collect(),
        )
    }
}

#[cfg(test)]
mod tests {
    use figment::Jail;

    use super::*;

    #[test]
    fn test_defaults_without_file() {
        Jail::expect_with(|_jail| {
            let config = Config::load(Path::new(DEFAULT_CONFIG_PATH))?;

            assert_eq!(config, Config::default());
            assert_eq!(config.images.len(), 3);
            assert_eq!(config.images[0].path, "static/images/nurses/team.jpg");
            Ok(())
        });
    }

    #[test]
    fn test_yaml_overrides_defaults_and_keeps_order() {
        Jail::expect_with(|jail| {
            jail.create_file(
                DEFAULT_CONFIG_PATH,
                r#"
output_root: public
jpeg_quality: 90
images:
  - path: b/second.png
    url: https://example.com/2
  - path: a/first.jpg
    url: https://example.com/1
"#,
            )?;

            let config = Config::load(Path::new(DEFAULT_CONFIG_PATH))?;

            assert_eq!(config.output_root, PathBuf::from("public"));
            assert_eq!(config.jpeg_quality, 90);
            assert_eq!(config.log_level, "info");
            let batch = config.batch();
            assert_eq!(batch.len(), 2);
            assert_eq!(batch.tasks()[0].destination(), Path::new("b/second.png"));
            assert_eq!(batch.tasks()[1].url(), "https://example.com/1");
            Ok(())
        });
    }

    #[test]
    fn test_env_overrides_yaml() {
        Jail::expect_with(|jail| {
            jail.create_file(DEFAULT_CONFIG_PATH, "output_root: public\nfail_on_error: false")?;
            jail.set_env("PIXFETCH_OUTPUT_ROOT", "dist");
            jail.set_env("PIXFETCH_FAIL_ON_ERROR", "true");

            let config = Config::load(Path::new(DEFAULT_CONFIG_PATH))?;

            assert_eq!(config.output_root, PathBuf::from("dist"));
            assert!(config.fail_on_error);
            Ok(())
        });
    }

    #[test]
    fn test_invalid_quality_is_rejected() {
        Jail::expect_with(|jail| {
            jail.create_file(DEFAULT_CONFIG_PATH, "jpeg_quality: 101")?;

            assert!(Config::load(Path::new(DEFAULT_CONFIG_PATH)).is_err());
            Ok(())
        });
    }

    #[test]
    fn test_quality_bounds_are_accepted() {
        Jail::expect_with(|jail| {
            jail.create_file(DEFAULT_CONFIG_PATH, "jpeg_quality: 100")?;
            assert_eq!(Config::load(Path::new(DEFAULT_CONFIG_PATH))?.jpeg_quality, 100);

            jail.create_file(DEFAULT_CONFIG_PATH, "jpeg_quality: 0")?;
            assert_eq!(Config::load(Path::new(DEFAULT_CONFIG_PATH))?.jpeg_quality, 0);
            Ok(())
        });
    }

    #[test]
    fn test_per_image_format() {
        Jail::expect_with(|jail| {
            jail.create_file(
                DEFAULT_CONFIG_PATH,
                r#"
images:
  - path: nurses/team.jpg
    url: https://example.com/team
    format: png
  - path: nurses/care.png
    url: https://example.com/care
    format: jpeg85
  - path: nurses/facility.jpg
    url: https://example.com/facility
"#,
            )?;

            let batch = Config::load(Path::new(DEFAULT_CONFIG_PATH))?.batch();

            assert_eq!(batch.tasks()[0].format(), Some(OutputFormat::Png));
            assert_eq!(batch.tasks()[1].format(), Some(OutputFormat::Jpeg(85)));
            assert_eq!(batch.tasks()[2].format(), None);
            Ok(())
        });
    }

    #[test]
    fn test_invalid_per_image_format_is_rejected() {
        Jail::expect_with(|jail| {
            for format in ["gif", "jpeg101"] {
                jail.create_file(
                    DEFAULT_CONFIG_PATH,
                    &format!("images:\n  - path: team.jpg\n    url: https://example.com/team\n    format: {}\n", format),
                )?;

                assert!(Config::load(Path::new(DEFAULT_CONFIG_PATH)).is_err());
            }
            Ok(())
        });
    }
}
