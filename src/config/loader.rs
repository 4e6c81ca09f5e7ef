// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use crate::config::consts::{DEFAULT_WORD_COUNT, DEFAULT_WORD_WIDTH};
use crate::config::TranslatorConfig;
use crate::errors::ConfigError;
use serde::Deserialize;
use std::collections::HashMap;
use std::fs;
use std::path::Path;

/// Configuration for a loopback pipeline.
///
/// Stimulus words are pulled through the `generation` chain (active
/// translators, each pulling from the previous one), carried across a
/// loopback link and pushed into the `analysis` chain (passive translators,
/// each pushing into the next one).
///
/// # Fields
/// * `stimulus` - how many random words to generate and how wide they are
/// * `link` - how the loopback link pulls from the generation chain
/// * `generation` - stages in pull order, first stage reads the stimulus
/// * `analysis` - stages in push order, last stage feeds the result collector
///
/// # Example
/// ```yaml
/// stimulus:
///   words: 2400
///   seed: 7
/// link:
///   polled: false
/// generation:
///   - id: pack_32_to_8
///     transform: regroup
///     options: { from_width: 32, to_width: 8 }
///     translator: { active: true }
///   - id: pack_8_to_3
///     transform: regroup
///     options: { from_width: 8, to_width: 3 }
///     translator: { active: true }
/// analysis:
///   - id: unpack_3_to_8
///     transform: regroup
///     options: { from_width: 3, to_width: 8 }
///   - id: unpack_8_to_32
///     transform: regroup
///     options: { from_width: 8, to_width: 32 }
///     translator: { outbound_log: logs/words.log }
/// ```
#[derive(Debug, Clone, Deserialize)]
pub struct LoopbackConfig {
    #[serde(default)]
    pub stimulus: StimulusConfig,
    #[serde(default)]
    pub link: LinkConfig,
    pub generation: Vec<StageConfig>,
    pub analysis: Vec<StageConfig>,
}

/// Stimulus generation options.
///
/// # Fields
/// * `words` - number of random words (defaults to 2400)
/// * `width` - bits per word (defaults to 32)
/// * `seed` - RNG seed; a random seed is drawn when absent
#[derive(Debug, Clone, Deserialize)]
pub struct StimulusConfig {
    #[serde(default = "default_word_count")]
    pub words: usize,
    #[serde(default = "default_word_width")]
    pub width: u8,
    pub seed: Option<u64>,
}

impl Default for StimulusConfig {
    fn default() -> Self {
        Self {
            words: DEFAULT_WORD_COUNT,
            width: DEFAULT_WORD_WIDTH,
            seed: None,
        }
    }
}

fn default_word_count() -> usize {
    DEFAULT_WORD_COUNT
}

fn default_word_width() -> u8 {
    DEFAULT_WORD_WIDTH
}

/// Loopback link options.
///
/// # Fields
/// * `polled` - pull with non-blocking `try_next` polls (exercising the
///   background coordinator) instead of blocking `get_next`
#[derive(Debug, Clone, Default, Deserialize)]
pub struct LinkConfig {
    #[serde(default)]
    pub polled: bool,
}

/// One translator in a chain.
///
/// # Fields
/// * `id` - unique stage name, used as the translator name in logs
/// * `transform` - stock transform name (`identity`, `regroup`)
/// * `options` - transform-specific options
/// * `translator` - mode, taps and item logs for the translator
#[derive(Debug, Clone, Deserialize)]
pub struct StageConfig {
    pub id: String,
    pub transform: String,
    #[serde(default)]
    pub options: HashMap<String, serde_yaml::Value>,
    #[serde(default)]
    pub translator: TranslatorConfig,
}

/// Load a loopback config from a YAML file
pub fn load_config<P: AsRef<Path>>(path: P) -> Result<LoopbackConfig, ConfigError> {
    let path = path.as_ref();
    let content = fs::read_to_string(path).map_err(|source| ConfigError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    let cfg: LoopbackConfig = serde_yaml::from_str(&content)?;
    Ok(cfg)
}

/// Load and validate a loopback config from a YAML file
///
/// On top of parsing, this checks that the stage chain is wired consistently
/// (see [`validate_loopback_config`](crate::config::validate_loopback_config)).
pub fn load_and_validate_config<P: AsRef<Path>>(path: P) -> Result<LoopbackConfig, ConfigError> {
    let cfg = load_config(path)?;
    crate::config::validate_loopback_config(&cfg).map_err(ConfigError::Validation)?;
    Ok(cfg)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Mode;
    use std::io::Write;

    const VALID: &str = r#"
stimulus:
  words: 16
  seed: 42
generation:
  - id: pack
    transform: regroup
    options: { from_width: 32, to_width: 8 }
    translator: { active: true }
analysis:
  - id: unpack
    transform: regroup
    options: { from_width: 8, to_width: 32 }
"#;

    fn write_temp(content: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(content.as_bytes()).unwrap();
        file
    }

    #[test]
    fn parse_basic_config() {
        let cfg: LoopbackConfig = serde_yaml::from_str(VALID).unwrap();
        assert_eq!(cfg.stimulus.words, 16);
        assert_eq!(cfg.stimulus.width, 32);
        assert_eq!(cfg.stimulus.seed, Some(42));
        assert!(!cfg.link.polled);
        assert_eq!(cfg.generation.len(), 1);
        assert_eq!(cfg.generation[0].translator.mode(), Mode::ActiveDirect);
        assert_eq!(cfg.analysis[0].translator.mode(), Mode::Passive);
        assert_eq!(cfg.analysis[0].options.len(), 2);
    }

    #[test]
    fn test_stimulus_defaults() {
        let yaml = r#"
generation: []
analysis: []
"#;
        let cfg: LoopbackConfig = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(cfg.stimulus.words, DEFAULT_WORD_COUNT);
        assert_eq!(cfg.stimulus.width, DEFAULT_WORD_WIDTH);
        assert_eq!(cfg.stimulus.seed, None);
    }

    #[test]
    fn test_load_and_validate_valid_config() {
        let file = write_temp(VALID);
        let result = load_and_validate_config(file.path());
        assert!(result.is_ok());
    }

    #[test]
    fn test_load_missing_file() {
        let result = load_config("/definitely/not/here.yaml");
        assert!(matches!(result, Err(ConfigError::Read { .. })));
    }

    #[test]
    fn test_load_malformed_yaml() {
        let file = write_temp("generation: [unclosed");
        let result = load_config(file.path());
        assert!(matches!(result, Err(ConfigError::Parse(_))));
    }

    #[test]
    fn test_load_and_validate_rejects_passive_generation() {
        let file = write_temp(&VALID.replace("translator: { active: true }", "translator: {}"));
        let error = load_and_validate_config(file.path()).unwrap_err().to_string();
        assert!(error.contains("Configuration validation failed"));
        assert!(error.contains("generation stage 'pack' must be ActiveDirect"));
    }
}
