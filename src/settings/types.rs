use serde::{Deserialize, Serialize};

use crate::capture::DummySourceConfig;
use crate::display::TargetSize;

/// Preview configuration as stored on disk.
///
/// Missing fields fall back to their defaults, so older or hand-written
/// files keep loading.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default, rename_all = "camelCase")]
pub struct PreviewSettings {
    /// Width of the visible preview in pixels.
    pub target_width: u32,
    /// Height of the visible preview in pixels.
    pub target_height: u32,
    /// Resize rendered surfaces to the target size before presenting.
    pub scale_to_target: bool,
    /// Band threads used to render one frame.
    pub workers: usize,
    /// Drive the preview from the simulated camera.
    pub use_dummy_source: bool,
    pub dummy_width: u32,
    pub dummy_height: u32,
    pub dummy_fps: u32,
}

impl Default for PreviewSettings {
    fn default() -> Self {
        Self {
            target_width: 640,
            target_height: 480,
            scale_to_target: false,
            workers: 1,
            use_dummy_source: false,
            dummy_width: 640,
            dummy_height: 480,
            dummy_fps: 30,
        }
    }
}

impl PreviewSettings {
    pub fn target(&self) -> TargetSize {
        TargetSize::new(self.target_width, self.target_height)
    }

    pub fn dummy_config(&self) -> DummySourceConfig {
        DummySourceConfig {
            width: self.dummy_width,
            height: self.dummy_height,
            fps: self.dummy_fps,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_vga_preview() {
        let settings = PreviewSettings::default();
        assert_eq!(settings.target(), TargetSize::new(640, 480));
        assert_eq!(settings.workers, 1);
        assert!(!settings.scale_to_target);
        assert!(!settings.use_dummy_source);
    }

    #[test]
    fn serialises_to_camelcase_json() {
        let json = serde_json::to_value(PreviewSettings::default()).unwrap();
        assert_eq!(json["targetWidth"], 640);
        assert_eq!(json["targetHeight"], 480);
        assert_eq!(json["scaleToTarget"], false);
        assert_eq!(json["dummyFps"], 30);
    }

    #[test]
    fn missing_fields_use_defaults() {
        let settings: PreviewSettings =
            serde_json::from_str(r#"{ "workers": 4, "useDummySource": true }"#).unwrap();
        assert_eq!(settings.workers, 4);
        assert!(settings.use_dummy_source);
        assert_eq!(settings.target_width, 640);
        assert_eq!(settings.dummy_fps, 30);
    }

    #[test]
    fn dummy_config_reflects_settings() {
        let settings = PreviewSettings {
            dummy_width: 320,
            dummy_height: 240,
            dummy_fps: 15,
            ..Default::default()
        };
        assert_eq!(
            settings.dummy_config(),
            DummySourceConfig {
                width: 320,
                height: 240,
                fps: 15,
            }
        );
    }
}
