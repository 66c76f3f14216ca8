use super::{types::Config, ConfigError};

/// Validate configuration
/// Currently validates:
/// - Narrative names at most one graph source
/// - Playback rate is finite and positive
/// - Clip frame counts are not 0
/// - Notice capacity is not 0
pub fn validate_config(config: &Config) -> Result<(), ConfigError> {
    if config.narrative.builtin.is_some() && config.narrative.graph_path.is_some() {
        return Err(ConfigError::ValidationError(
            "narrative.builtin and narrative.graph_path are mutually exclusive".to_string(),
        ));
    }

    // Playback validation
    let playback = &config.playback;
    if !playback.fps.is_finite() || playback.fps <= 0.0 {
        return Err(ConfigError::ValidationError(format!(
            "playback.fps must be positive, got {}",
            playback.fps
        )));
    }
    if playback.default_clip_frames == 0 {
        return Err(ConfigError::ValidationError(
            "playback.default_clip_frames cannot be 0".to_string(),
        ));
    }
    if let Some((asset, _)) = playback.clip_frames.iter().find(|(_, frames)| **frames == 0) {
        return Err(ConfigError::ValidationError(format!(
            "playback.clip_frames.\"{}\" cannot be 0",
            asset
        )));
    }

    if config.controller.notice_capacity == 0 {
        return Err(ConfigError::ValidationError(
            "controller.notice_capacity cannot be 0".to_string(),
        ));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::NarrativeConfig;
    use crate::scene::BuiltinGraph;
    use std::path::PathBuf;

    #[test]
    fn test_validate_valid_config() {
        assert!(validate_config(&Config::default()).is_ok());
    }

    #[test]
    fn test_validate_both_graph_sources_fails() {
        let config = Config {
            narrative: NarrativeConfig {
                builtin: Some(BuiltinGraph::TapRevealLoop),
                graph_path: Some(PathBuf::from("graph.toml")),
            },
            ..Config::default()
        };
        let result = validate_config(&config);
        assert!(matches!(result, Err(ConfigError::ValidationError(_))));
    }

    #[test]
    fn test_validate_zero_fps_fails() {
        let mut config = Config::default();
        config.playback.fps = 0.0;
        assert!(validate_config(&config).is_err());

        config.playback.fps = f32::NAN;
        assert!(validate_config(&config).is_err());
    }

    #[test]
    fn test_validate_zero_frames_fails() {
        let mut config = Config::default();
        config.playback.clip_frames.insert("Intro.m4v".to_string(), 0);
        let err = validate_config(&config).unwrap_err();
        assert!(err.to_string().contains("Intro.m4v"));
    }

    #[test]
    fn test_validate_zero_notice_capacity_fails() {
        let mut config = Config::default();
        config.controller.notice_capacity = 0;
        assert!(validate_config(&config).is_err());
    }
}
