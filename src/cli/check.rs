//! `plume check`: validate the configuration without rendering.

use crate::{config::PlumeConfig, debug, log, pipeline::Renderer};
use anyhow::Result;

/// Build the renderer and print the resolved stages in run order.
pub fn check_config(config: &PlumeConfig) -> Result<Vec<String>> {
    if config.config_path.as_os_str().is_empty() {
        log!("check"; "no config file, using defaults");
    } else {
        log!("check"; "{}", config.config_path.display());
    }

    let renderer = Renderer::from_config(&config.markdown)?;
    let stages = renderer.stages();
    for (i, stage) in stages.iter().enumerate() {
        log!("check"; "{}. {}", i + 1, stage);
    }

    debug!("check"; "content: {}", config.build.content.display());
    debug!("check"; "output: {}", config.build.output.display());
    Ok(stages)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::test_parse_config;

    #[test]
    fn test_check_lists_stages() {
        let config = test_parse_config("[markdown.anchor]\nbehavior = \"wrap\"\n[markdown.code]\nenable = false");
        let stages = check_config(&config).unwrap();
        assert_eq!(stages, vec!["convert", "heading-ids", "anchors (wrap)"]);
    }

    #[test]
    fn test_check_reports_invalid_options() {
        let config = test_parse_config("[markdown.code]\ntransformers = [\"title\", \"title\"]");
        let err = check_config(&config).unwrap_err();
        assert!(err.to_string().contains("markdown.code.transformers"));
    }
}
