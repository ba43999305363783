use serde::Serialize;
use std::fmt;

/// Operating-system family, detected once per process.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PlatformFamily {
    MacOs,
    Linux,
    Windows,
    Unsupported,
}

impl PlatformFamily {
    pub fn detect() -> Self {
        Self::from_os(std::env::consts::OS)
    }

    pub fn from_os(os: &str) -> Self {
        match os {
            "macos" => PlatformFamily::MacOs,
            "linux" => PlatformFamily::Linux,
            "windows" => PlatformFamily::Windows,
            _ => PlatformFamily::Unsupported,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            PlatformFamily::MacOs => "macOS",
            PlatformFamily::Linux => "Linux",
            PlatformFamily::Windows => "Windows",
            PlatformFamily::Unsupported => "unsupported",
        }
    }
}

impl fmt::Display for PlatformFamily {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
