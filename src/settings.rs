use std::collections::HashSet;
use std::fs::File;
use std::path::{Path, PathBuf};

use log::info;

use serde::{Deserialize, Serialize};

use crate::cpu_params::DEFAULT_INIT_RANGE;
use crate::dataloader::SimpleDataLoader;
use crate::err::{NetError, NetResult};
use crate::layer_fabric::ParamSource;
use crate::util::{Activation, Float};

/// Where the labeled images come from
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum InputSource {
    /// MNIST style rows, `label,p0,p1,...`
    Csv { train: Vec<PathBuf>, test: PathBuf },
    /// `<root>/training/<category>/*.png` and `<root>/testing/<category>/*.png`
    Png { root: PathBuf },
}

fn default_init_range() -> Float {
    DEFAULT_INIT_RANGE
}

/// Model configuration file (yaml)
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ModelSettings {
    pub input: InputSource,
    pub width: usize,
    pub height: usize,
    pub categories: Vec<String>,
    #[serde(default)]
    pub hidden_layers: Vec<usize>,
    pub activation: String,
    pub learning_rate: Float,
    #[serde(default = "default_init_range")]
    pub init_range: Float,

    /// Folder relative paths resolve against
    #[serde(skip)]
    pub base_dir: PathBuf,
}

impl ModelSettings {
    pub fn from_file(filepath: &Path) -> NetResult<Self> {
        let cfg_file = File::open(filepath)
            .map_err(|e| NetError::config("model_cfg", format!("{} : {}", filepath.display(), e)))?;

        let mut settings: ModelSettings = serde_yaml::from_reader(cfg_file)?;
        settings.base_dir = filepath
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or_default();
        settings.validate()?;

        info!(
            "Layers : {:?}, activation : {}, learning rate : {}",
            settings.layer_sizes(),
            settings.activation,
            settings.learning_rate
        );

        Ok(settings)
    }

    pub fn from_yaml_str(s: &str) -> NetResult<Self> {
        let settings: ModelSettings = serde_yaml::from_str(s)?;
        settings.validate()?;
        Ok(settings)
    }

    pub fn validate(&self) -> NetResult<()> {
        if self.width == 0 {
            return Err(NetError::config("width", "must be positive"));
        }
        if self.height == 0 {
            return Err(NetError::config("height", "must be positive"));
        }
        if self.categories.is_empty() {
            return Err(NetError::config("categories", "at least one category is required"));
        }

        let mut seen = HashSet::new();
        for c in self.categories.iter() {
            if !seen.insert(c) {
                return Err(NetError::config(
                    "categories",
                    format!("duplicate category '{}'", c),
                ));
            }
        }

        if let Some(pos) = self.hidden_layers.iter().position(|s| *s == 0) {
            return Err(NetError::config(
                &format!("hidden_layers[{}]", pos),
                "layer size must be positive",
            ));
        }
        if !(self.learning_rate.is_finite() && self.learning_rate > 0.0) {
            return Err(NetError::config(
                "learning_rate",
                format!("must be a positive number, got {}", self.learning_rate),
            ));
        }
        if !(self.init_range.is_finite() && self.init_range > 0.0) {
            return Err(NetError::config(
                "init_range",
                format!("must be a positive number, got {}", self.init_range),
            ));
        }

        self.activation()?;

        Ok(())
    }

    pub fn activation(&self) -> NetResult<Activation> {
        self.activation.parse()
    }

    pub fn input_size(&self) -> usize {
        self.width * self.height
    }

    pub fn category_count(&self) -> usize {
        self.categories.len()
    }

    /// Input width followed by every layer size, the last one is the category count
    pub fn layer_sizes(&self) -> Vec<usize> {
        let mut sizes = Vec::with_capacity(self.hidden_layers.len() + 2);
        sizes.push(self.input_size());
        sizes.extend_from_slice(&self.hidden_layers);
        sizes.push(self.category_count());
        sizes
    }

    pub fn resolve(&self, p: &Path) -> PathBuf {
        if p.is_absolute() {
            p.to_path_buf()
        } else {
            self.base_dir.join(p)
        }
    }

    /// Parameter folders live next to the config file, like the
    /// `parameters-<timestamp>` folders written after training
    pub fn param_source(&self, params_dir: Option<&str>) -> ParamSource {
        match params_dir {
            Some(dir) => ParamSource::Folder(self.resolve(Path::new(dir))),
            None => ParamSource::Random {
                range: self.init_range,
            },
        }
    }

    pub fn train_loader(&self) -> NetResult<SimpleDataLoader> {
        match &self.input {
            InputSource::Csv { train, .. } => {
                let paths: Vec<PathBuf> = train.iter().map(|p| self.resolve(p)).collect();
                SimpleDataLoader::from_csv_files(&paths, self.input_size(), self.category_count())
            }
            InputSource::Png { root } => SimpleDataLoader::from_image_dir(
                &self.resolve(root).join("training"),
                &self.categories,
                self.width,
                self.height,
                None,
            ),
        }
    }

    /// `limit` caps the examples per category for image folders and the
    /// total count for csv files
    pub fn test_loader(&self, limit: Option<usize>) -> NetResult<SimpleDataLoader> {
        match &self.input {
            InputSource::Csv { test, .. } => {
                let mut dl = SimpleDataLoader::from_csv_files(
                    &[self.resolve(test)],
                    self.input_size(),
                    self.category_count(),
                )?;
                if let Some(limit) = limit {
                    dl.truncate(limit);
                }
                Ok(dl)
            }
            InputSource::Png { root } => SimpleDataLoader::from_image_dir(
                &self.resolve(root).join("testing"),
                &self.categories,
                self.width,
                self.height,
                limit,
            ),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const CSV_CFG: &str = r#"
input:
  kind: csv
  train: [train_0.csv, train_1.csv]
  test: test.csv
width: 28
height: 28
categories: ["0", "1", "2", "3", "4", "5", "6", "7", "8", "9"]
hidden_layers: [64, 32]
activation: sigmoid
learning_rate: 0.1
"#;

    #[test]
    fn parses_csv_model() {
        let s = ModelSettings::from_yaml_str(CSV_CFG).unwrap();

        assert_eq!(s.layer_sizes(), vec![784, 64, 32, 10]);
        assert_eq!(s.activation().unwrap(), Activation::Sigmoid);
        assert_eq!(s.init_range, DEFAULT_INIT_RANGE);
        assert!(matches!(s.input, InputSource::Csv { ref train, .. } if train.len() == 2));
    }

    #[test]
    fn parses_png_model() {
        let s = ModelSettings::from_yaml_str(
            r#"
input: { kind: png, root: images }
width: 16
height: 8
categories: [cat, dog, bird]
activation: GELU
learning_rate: 0.01
init_range: 1.0
"#,
        )
        .unwrap();

        assert_eq!(s.layer_sizes(), vec![128, 3]);
        assert_eq!(s.activation().unwrap(), Activation::Gelu);
        assert_eq!(s.input, InputSource::Png { root: PathBuf::from("images") });
    }

    fn config_key(cfg: &str) -> String {
        match ModelSettings::from_yaml_str(cfg) {
            Err(NetError::Configuration { key, .. }) => key,
            other => panic!("expected configuration error, got {:?}", other),
        }
    }

    #[test]
    fn invalid_values_name_the_key() {
        assert_eq!(
            config_key(&CSV_CFG.replace("learning_rate: 0.1", "learning_rate: -1")),
            "learning_rate"
        );
        assert_eq!(
            config_key(&CSV_CFG.replace("hidden_layers: [64, 32]", "hidden_layers: [64, 0]")),
            "hidden_layers[1]"
        );
        assert_eq!(config_key(&CSV_CFG.replace("width: 28", "width: 0")), "width");
        assert_eq!(
            config_key(&CSV_CFG.replace(r#""8", "9""#, r#""8", "8""#)),
            "categories"
        );
    }

    #[test]
    fn missing_field_is_format_error() {
        let cfg = CSV_CFG.replace("learning_rate: 0.1\n", "");

        match ModelSettings::from_yaml_str(&cfg) {
            Err(NetError::ConfigFormat(e)) => assert!(e.to_string().contains("learning_rate")),
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn unknown_activation() {
        let cfg = CSV_CFG.replace("activation: sigmoid", "activation: softplus");

        assert!(matches!(
            ModelSettings::from_yaml_str(&cfg),
            Err(NetError::UnknownActivation(_))
        ));
    }

    #[test]
    fn params_folder_resolves_against_model_dir() {
        let mut s = ModelSettings::from_yaml_str(CSV_CFG).unwrap();
        s.base_dir = PathBuf::from("demos/models/digits");

        assert_eq!(
            s.param_source(Some("parameters-2024-01-02-03-04-05")),
            ParamSource::Folder(PathBuf::from(
                "demos/models/digits/parameters-2024-01-02-03-04-05"
            ))
        );
        assert_eq!(
            s.param_source(Some("/abs/params")),
            ParamSource::Folder(PathBuf::from("/abs/params"))
        );
        assert_eq!(
            s.param_source(None),
            ParamSource::Random {
                range: DEFAULT_INIT_RANGE
            }
        );
    }

    #[test]
    fn relative_paths_follow_config_dir() {
        let mut s = ModelSettings::from_yaml_str(CSV_CFG).unwrap();
        s.base_dir = PathBuf::from("/models/digits");

        assert_eq!(
            s.resolve(Path::new("test.csv")),
            PathBuf::from("/models/digits/test.csv")
        );
        assert_eq!(s.resolve(Path::new("/data/x.csv")), PathBuf::from("/data/x.csv"));
    }
}
