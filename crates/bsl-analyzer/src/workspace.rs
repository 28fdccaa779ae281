//! Workspace inspection: where the 1C metadata lives and which platform
//! version it targets.

use bsl_analyzer_core::CompatibilityMode;
use roxmltree::Document;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// Metadata root files, relative to the configuration root: a designer
/// dump and an EDT project.
const METADATA_FILES: &[&str] = &[
    "Configuration.xml",
    "Configuration/Configuration.mdo",
    "src/Configuration/Configuration.mdo",
];

/// Detects the compatibility mode of the configuration under `root`.
///
/// `configuration_root` is resolved against `root`. Returns `None` when no
/// metadata file is found or it carries no readable compatibility mode.
#[must_use]
pub fn detect_compatibility_mode(
    root: &Path,
    configuration_root: Option<&Path>,
) -> Option<CompatibilityMode> {
    let base = configuration_root.map_or_else(|| root.to_path_buf(), |dir| root.join(dir));
    let file = find_metadata_file(&base)?;

    let content = match std::fs::read_to_string(&file) {
        Ok(content) => content,
        Err(e) => {
            warn!("Failed to read {}: {e}", file.display());
            return None;
        }
    };

    let mode = compatibility_mode_from_xml(&content);
    match mode {
        Some(mode) => debug!("Compatibility mode {mode} from {}", file.display()),
        None => debug!("No compatibility mode in {}", file.display()),
    }
    mode
}

fn find_metadata_file(base: &Path) -> Option<PathBuf> {
    METADATA_FILES
        .iter()
        .map(|name| base.join(name))
        .find(|path| path.is_file())
}

/// Reads `<CompatibilityMode>` (designer) or `<compatibilityMode>` (EDT).
fn compatibility_mode_from_xml(content: &str) -> Option<CompatibilityMode> {
    let doc = match Document::parse(content) {
        Ok(doc) => doc,
        Err(e) => {
            warn!("Invalid configuration metadata: {e}");
            return None;
        }
    };

    let text = doc
        .descendants()
        .find(|node| {
            node.is_element() && node.tag_name().name().eq_ignore_ascii_case("compatibilityMode")
        })?
        .text()?;

    match text.parse() {
        Ok(mode) => Some(mode),
        Err(e) => {
            warn!("{e}");
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const DESIGNER: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<MetaDataObject xmlns="http://v8.1c.ru/8.3/MDClasses" version="2.10">
  <Configuration uuid="0b2b2c5e-0000-0000-0000-000000000000">
    <Properties>
      <Name>Бухгалтерия</Name>
      <CompatibilityMode>Version8_3_14</CompatibilityMode>
      <ConfigurationExtensionCompatibilityMode>Version8_3_14</ConfigurationExtensionCompatibilityMode>
    </Properties>
  </Configuration>
</MetaDataObject>"#;

    const EDT: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<mdclass:Configuration xmlns:mdclass="http://g5.1c.ru/v8/dt/metadata/mdclass">
  <name>Demo</name>
  <compatibilityMode>8.3.10</compatibilityMode>
</mdclass:Configuration>"#;

    #[test]
    fn reads_designer_dump() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("Configuration.xml"), DESIGNER).unwrap();

        assert_eq!(
            detect_compatibility_mode(dir.path(), None),
            Some(CompatibilityMode::new(8, 3, 14))
        );
    }

    #[test]
    fn reads_edt_project_under_configuration_root() {
        let dir = tempfile::tempdir().unwrap();
        let mdo = dir.path().join("src/cf/Configuration");
        std::fs::create_dir_all(&mdo).unwrap();
        std::fs::write(mdo.join("Configuration.mdo"), EDT).unwrap();

        assert_eq!(detect_compatibility_mode(dir.path(), None), None);
        assert_eq!(
            detect_compatibility_mode(dir.path(), Some(Path::new("src/cf"))),
            Some(CompatibilityMode::new(8, 3, 10))
        );
    }

    #[test]
    fn dont_use_means_latest() {
        let xml = "<Configuration><CompatibilityMode>DontUse</CompatibilityMode></Configuration>";
        assert_eq!(compatibility_mode_from_xml(xml), Some(CompatibilityMode::LATEST));
    }

    #[test]
    fn unreadable_metadata_yields_none() {
        assert_eq!(compatibility_mode_from_xml("<Configuration>"), None);
        assert_eq!(
            compatibility_mode_from_xml("<C><CompatibilityMode>Version8</CompatibilityMode></C>"),
            None
        );
        assert_eq!(compatibility_mode_from_xml("<C><Name>X</Name></C>"), None);
    }
}
