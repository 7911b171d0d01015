//! User-agent sniffing for device, browser and OS.

use serde::{Deserialize, Serialize};

/// Coarse device class.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DeviceType {
    Mobile,
    Tablet,
    #[default]
    Desktop,
}

/// Device summary derived from a user-agent string.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeviceInfo {
    #[serde(rename = "type")]
    pub device_type: DeviceType,
    pub browser: String,
    pub os: String,
}

impl Default for DeviceInfo {
    fn default() -> Self {
        Self {
            device_type: DeviceType::Desktop,
            browser: "Unknown".to_string(),
            os: "Unknown".to_string(),
        }
    }
}

impl DeviceInfo {
    #[must_use]
    pub fn from_user_agent(user_agent: &str) -> Self {
        let ua = user_agent.to_ascii_lowercase();
        Self {
            device_type: device_type(&ua),
            browser: browser(&ua).to_string(),
            os: os(&ua).to_string(),
        }
    }
}

const MOBILE_MARKERS: &[&str] = &[
    "mobi",
    "iphone",
    "ipod",
    "android",
    "blackberry",
    "opera mini",
    "iemobile",
];

// Android tablets omit "mobile"; checked before the mobile markers.
fn device_type(ua: &str) -> DeviceType {
    if ua.contains("ipad")
        || ua.contains("tablet")
        || (ua.contains("android") && !ua.contains("mobile"))
    {
        return DeviceType::Tablet;
    }
    if MOBILE_MARKERS.iter().any(|marker| ua.contains(marker)) {
        DeviceType::Mobile
    } else {
        DeviceType::Desktop
    }
}

// Order matters: Edge, Opera and Samsung all claim to be Chrome, and Chrome
// claims to be Safari.
fn browser(ua: &str) -> &'static str {
    if ua.contains("edg/") || ua.contains("edge/") {
        "Edge"
    } else if ua.contains("opr/") || ua.contains("opera") {
        "Opera"
    } else if ua.contains("samsungbrowser") {
        "Samsung Internet"
    } else if ua.contains("chrome") || ua.contains("crios") {
        "Chrome"
    } else if ua.contains("firefox") || ua.contains("fxios") {
        "Firefox"
    } else if ua.contains("safari") {
        "Safari"
    } else {
        "Unknown"
    }
}

fn os(ua: &str) -> &'static str {
    if ua.contains("windows") {
        "Windows"
    } else if ua.contains("iphone") || ua.contains("ipad") || ua.contains("ipod") {
        "iOS"
    } else if ua.contains("mac os") || ua.contains("macintosh") {
        "macOS"
    } else if ua.contains("android") {
        "Android"
    } else if ua.contains("cros") {
        "ChromeOS"
    } else if ua.contains("linux") {
        "Linux"
    } else {
        "Unknown"
    }
}
