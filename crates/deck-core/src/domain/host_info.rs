//! Host description passed to the plugin at launch.
//!
//! The host starts the plugin process with an `-info` argument containing a
//! JSON blob like:
//!
//! ```json
//! {
//!   "application": {"language":"en","platform":"mac","version":"6.4.0"},
//!   "plugin": {"uuid":"com.acme.counter","version":"1.0"},
//!   "devicePixelRatio": 2,
//!   "devices": [{"id":"D1","name":"Deck","size":{"columns":5,"rows":3},"type":0}]
//! }
//! ```
//!
//! Every field is optional on the way in: a host that omits one should not
//! stop the plugin from starting.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// The host application version prefix on which the legacy `dialPress`
/// event is still delivered to actions.
///
/// This is a fixed wire contract: later hosts send `dialDown`/`dialUp` *and*
/// the deprecated `dialPress`, so forwarding both would double-deliver every
/// dial press.  The match is a plain string prefix test.
pub const LEGACY_DIAL_PRESS_VERSION_PREFIX: &str = "6.0";

/// Everything the host tells the plugin about itself at launch.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct HostInfo {
    pub application: ApplicationInfo,
    pub plugin: PluginInfo,
    pub device_pixel_ratio: f64,
    pub colors: Map<String, Value>,
    pub devices: Vec<DeviceEntry>,
}

impl HostInfo {
    /// Returns `true` if the host still expects plugins to act on the legacy
    /// `dialPress` event.
    pub fn delivers_legacy_dial_press(&self) -> bool {
        self.application
            .version
            .starts_with(LEGACY_DIAL_PRESS_VERSION_PREFIX)
    }

    /// Looks up a device attached at launch by its identifier.
    pub fn device(&self, id: &str) -> Option<&DeviceEntry> {
        self.devices.iter().find(|d| d.id == id)
    }
}

/// Host application details.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ApplicationInfo {
    pub font: String,
    pub language: String,
    pub platform: String,
    pub platform_version: String,
    pub version: String,
}

/// The plugin's own identity as registered with the host.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PluginInfo {
    pub uuid: String,
    pub version: String,
}

/// A device listed in the launch blob.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DeviceEntry {
    pub id: String,
    pub name: String,
    #[serde(rename = "type")]
    pub device_type: DeviceType,
    pub size: DeviceSize,
}

/// The `deviceInfo` object carried by `deviceDidConnect`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DeviceInfo {
    pub name: String,
    #[serde(rename = "type")]
    pub device_type: DeviceType,
    pub size: DeviceSize,
}

/// Key grid dimensions of a device.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DeviceSize {
    pub columns: u32,
    pub rows: u32,
}

/// Hardware model reported by the host as a small integer.
///
/// Unrecognised values are preserved in [`DeviceType::Unknown`] rather than
/// rejected, so a newer host never breaks decoding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(from = "u8", into = "u8")]
pub enum DeviceType {
    #[default]
    StreamDeck,
    StreamDeckMini,
    StreamDeckXl,
    StreamDeckMobile,
    CorsairGKeys,
    StreamDeckPedal,
    CorsairVoyager,
    StreamDeckPlus,
    ScufController,
    StreamDeckNeo,
    Unknown(u8),
}

impl From<u8> for DeviceType {
    fn from(value: u8) -> Self {
        match value {
            0 => DeviceType::StreamDeck,
            1 => DeviceType::StreamDeckMini,
            2 => DeviceType::StreamDeckXl,
            3 => DeviceType::StreamDeckMobile,
            4 => DeviceType::CorsairGKeys,
            5 => DeviceType::StreamDeckPedal,
            6 => DeviceType::CorsairVoyager,
            7 => DeviceType::StreamDeckPlus,
            8 => DeviceType::ScufController,
            9 => DeviceType::StreamDeckNeo,
            other => DeviceType::Unknown(other),
        }
    }
}

impl From<DeviceType> for u8 {
    fn from(value: DeviceType) -> Self {
        match value {
            DeviceType::StreamDeck => 0,
            DeviceType::StreamDeckMini => 1,
            DeviceType::StreamDeckXl => 2,
            DeviceType::StreamDeckMobile => 3,
            DeviceType::CorsairGKeys => 4,
            DeviceType::StreamDeckPedal => 5,
            DeviceType::CorsairVoyager => 6,
            DeviceType::StreamDeckPlus => 7,
            DeviceType::ScufController => 8,
            DeviceType::StreamDeckNeo => 9,
            DeviceType::Unknown(other) => other,
        }
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE_INFO: &str = r##"{
        "application": {"font":".AppleSystemUIFont","language":"en","platform":"mac",
                        "platformVersion":"14.2.1","version":"6.0.1.17722"},
        "plugin": {"uuid":"com.acme.counter","version":"1.2"},
        "devicePixelRatio": 2,
        "colors": {"buttonPressedBackgroundColor":"#303030FF"},
        "devices": [
            {"id":"D1","name":"Deck","size":{"columns":5,"rows":3},"type":0},
            {"id":"D2","name":"Plus","size":{"columns":4,"rows":2},"type":7}
        ]
    }"##;

    #[test]
    fn test_host_info_parses_full_launch_blob() {
        // Arrange / Act
        let info: HostInfo = serde_json::from_str(SAMPLE_INFO).unwrap();

        // Assert
        assert_eq!(info.application.version, "6.0.1.17722");
        assert_eq!(info.application.platform_version, "14.2.1");
        assert_eq!(info.plugin.uuid, "com.acme.counter");
        assert_eq!(info.devices.len(), 2);
        assert_eq!(info.devices[1].device_type, DeviceType::StreamDeckPlus);
        assert_eq!(info.devices[0].size, DeviceSize { columns: 5, rows: 3 });
    }

    #[test]
    fn test_host_info_tolerates_empty_object() {
        let info: HostInfo = serde_json::from_str("{}").unwrap();
        assert!(info.devices.is_empty());
        assert_eq!(info.application.version, "");
    }

    #[test]
    fn test_legacy_dial_press_is_delivered_on_6_0_hosts() {
        let info: HostInfo = serde_json::from_str(SAMPLE_INFO).unwrap();
        assert!(info.delivers_legacy_dial_press());
    }

    #[test]
    fn test_legacy_dial_press_is_not_delivered_on_later_hosts() {
        let mut info = HostInfo::default();
        info.application.version = "6.1.0.18000".to_string();
        assert!(!info.delivers_legacy_dial_press());

        // The match is a literal prefix: "60.0" must not be treated as 6.0.
        info.application.version = "60.0".to_string();
        assert!(!info.delivers_legacy_dial_press());
    }

    #[test]
    fn test_device_lookup_by_id() {
        let info: HostInfo = serde_json::from_str(SAMPLE_INFO).unwrap();
        assert_eq!(info.device("D2").map(|d| d.name.as_str()), Some("Plus"));
        assert!(info.device("missing").is_none());
    }

    #[test]
    fn test_unknown_device_type_is_preserved() {
        let entry: DeviceEntry = serde_json::from_str(r#"{"id":"X","type":42}"#).unwrap();
        assert_eq!(entry.device_type, DeviceType::Unknown(42));
        assert_eq!(u8::from(entry.device_type), 42);
    }
}
