//! Top-level configuration and its loaders.

use crate::{EncodeConfig, ImageConfig, NarrationConfig, PipelineConfig, TextConfig};
use config::{Config, ConfigBuilder, Environment, File, FileFormat, builder::DefaultState};
use serde::{Deserialize, Serialize};
use std::path::Path;
use storyreel_error::{ConfigError, ConfigErrorKind, StoryreelResult};
use tracing::{debug, instrument};

const DEFAULT_CONFIG: &str = include_str!("../../../storyreel.toml");

/// Complete Storyreel configuration.
///
/// # Example
///
/// ```no_run
/// use storyreel_config::StoryreelConfig;
///
/// # fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let config = StoryreelConfig::load()?;
/// println!("Rendering at {}", config.pipeline.frame_rate);
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct StoryreelConfig {
    /// Run-level settings
    pub pipeline: PipelineConfig,
    /// Text-generation client
    pub text: TextConfig,
    /// Image-generation client
    pub image: ImageConfig,
    /// Narration synthesizer
    pub narration: NarrationConfig,
    /// Encoder
    pub encode: EncodeConfig,
}

impl StoryreelConfig {
    /// Load with the standard precedence and no explicit file.
    ///
    /// User config files are optional and silently skipped if absent.
    #[instrument]
    pub fn load() -> StoryreelResult<Self> {
        Self::load_with(None)
    }

    /// Load with the standard precedence, layering `explicit` above the
    /// discovered user files and below the environment.
    #[instrument(skip(explicit), fields(explicit = ?explicit.map(|p| p.display().to_string())))]
    pub fn load_with(explicit: Option<&Path>) -> StoryreelResult<Self> {
        debug!("Loading configuration: env > explicit > current dir > home dir > bundled defaults");

        let mut builder = Self::defaults();

        if let Some(home) = dirs::home_dir() {
            let home_config = home.join(".config/storyreel/storyreel.toml");
            builder = builder.add_source(File::from(home_config).required(false));
        }

        builder = builder.add_source(File::with_name("storyreel").required(false));

        if let Some(path) = explicit {
            builder = builder.add_source(File::from(path));
        }

        builder = builder.add_source(
            Environment::with_prefix("STORYREEL")
                .prefix_separator("__")
                .separator("__")
                .try_parsing(true),
        );

        Self::finish(builder)
    }

    /// Load bundled defaults overlaid with a single file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read, parsed or validated.
    #[instrument(skip(path), fields(path = %path.as_ref().display()))]
    pub fn from_file(path: impl AsRef<Path>) -> StoryreelResult<Self> {
        debug!("Loading configuration from file");
        Self::finish(Self::defaults().add_source(File::from(path.as_ref())))
    }

    /// Load bundled defaults overlaid with TOML text.
    pub fn from_toml_str(toml: &str) -> StoryreelResult<Self> {
        Self::finish(Self::defaults().add_source(File::from_str(toml, FileFormat::Toml)))
    }

    fn defaults() -> ConfigBuilder<DefaultState> {
        Config::builder().add_source(File::from_str(DEFAULT_CONFIG, FileFormat::Toml))
    }

    fn finish(builder: ConfigBuilder<DefaultState>) -> StoryreelResult<Self> {
        let config: Self = builder
            .build()
            .map_err(|e| ConfigError::new(ConfigErrorKind::Load(e.to_string())))?
            .try_deserialize()
            .map_err(|e| ConfigError::new(ConfigErrorKind::Parse(e.to_string())))?;
        config.validate()?;
        Ok(config)
    }

    /// Reject values the pipeline cannot run with.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.pipeline.frame_rate.fps() == 0 {
            return Err(ConfigError::invalid("pipeline.frame_rate", "must be positive"));
        }
        if self.pipeline.work_dir.as_os_str().is_empty() {
            return Err(ConfigError::invalid("pipeline.work_dir", "must not be empty"));
        }
        if self.pipeline.output_dir.as_os_str().is_empty() {
            return Err(ConfigError::invalid("pipeline.output_dir", "must not be empty"));
        }

        for (field, value) in [
            ("text.endpoint", &self.text.endpoint),
            ("text.model", &self.text.model),
            ("image.endpoint", &self.image.endpoint),
            ("narration.endpoint", &self.narration.endpoint),
            ("encode.ffmpeg", &self.encode.ffmpeg),
            ("encode.ffprobe", &self.encode.ffprobe),
        ] {
            if value.trim().is_empty() {
                return Err(ConfigError::invalid(field, "must not be empty"));
            }
        }

        self.image.submission.validate("image.submission")?;
        self.image.polling.validate("image.polling")?;
        self.image.portrait.validate("image.portrait")?;

        if self.narration.chunk_chars == 0 {
            return Err(ConfigError::invalid("narration.chunk_chars", "must be positive"));
        }
        if self.encode.crf > 51 {
            return Err(ConfigError::invalid("encode.crf", "must be between 0 and 51"));
        }
        for (field, value) in [
            ("encode.width", self.encode.width),
            ("encode.height", self.encode.height),
        ] {
            if let Some(v) = value.filter(|v| *v == 0 || v % 2 != 0) {
                return Err(ConfigError::invalid(
                    field,
                    format!("must be even and positive, got {}", v),
                ));
            }
        }
        Ok(())
    }
}
