//! Device-bridge command construction.
//!
//! Builds `adb shell am start` invocations for fuzz candidates. adb joins
//! the words after `shell` and hands them to the device's `sh`, so every
//! value taken from the manifest or wordlist is single-quoted for that
//! remote shell.

use std::path::PathBuf;

use crate::candidates::Candidate;
use crate::runner::CommandSpec;

/// Intent action used for every launch.
pub const VIEW_ACTION: &str = "android.intent.action.VIEW";

/// Quote `value` as one word for a POSIX shell on the device.
///
/// `'` becomes `'\''`; everything else is literal inside single quotes.
pub fn quote_for_device_shell(value: &str) -> String {
    let mut quoted = String::with_capacity(value.len() + 2);
    quoted.push('\'');
    for ch in value.chars() {
        if ch == '\'' {
            quoted.push_str("'\\''");
        } else {
            quoted.push(ch);
        }
    }
    quoted.push('\'');
    quoted
}

/// Builds device-bridge commands for one target device.
#[derive(Debug, Clone)]
pub struct AdbBridge {
    adb: PathBuf,
    serial: Option<String>,
}

impl Default for AdbBridge {
    fn default() -> Self {
        Self::new("adb")
    }
}

impl AdbBridge {
    pub fn new(adb: impl Into<PathBuf>) -> Self {
        Self {
            adb: adb.into(),
            serial: None,
        }
    }

    /// Target a specific device serial (`adb -s`).
    pub fn with_serial(mut self, serial: Option<String>) -> Self {
        self.serial = serial.filter(|s| !s.trim().is_empty());
        self
    }

    pub fn serial(&self) -> Option<&str> {
        self.serial.as_deref()
    }

    /// `am start` for a candidate. A bound activity adds `-n package/activity`.
    pub fn start_command(&self, package: &str, candidate: &Candidate) -> CommandSpec {
        let mut spec = CommandSpec::new(&self.adb);
        if let Some(serial) = &self.serial {
            spec = spec.arg("-s").arg(serial.as_str());
        }
        spec = spec.args(["shell", "am", "start", "-W"]);
        if let Some(activity) = &candidate.target {
            let component = format!("{}/{}", package, activity.qualified_name);
            spec = spec.arg("-n").arg(quote_for_device_shell(&component));
        }
        spec.arg("-a")
            .arg(VIEW_ACTION)
            .arg("-d")
            .arg(quote_for_device_shell(&candidate.uri))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::manifest::Activity;

    #[test]
    fn test_quote_plain() {
        assert_eq!(quote_for_device_shell("myapp://open/admin"), "'myapp://open/admin'");
    }

    #[test]
    fn test_quote_metacharacters_are_literal() {
        assert_eq!(
            quote_for_device_shell("x://h/a;reboot&$(id)`id`"),
            "'x://h/a;reboot&$(id)`id`'"
        );
        assert_eq!(quote_for_device_shell(""), "''");
    }

    #[test]
    fn test_quote_single_quote() {
        assert_eq!(quote_for_device_shell("it's"), "'it'\\''s'");
    }

    #[test]
    fn test_routed_command() {
        let bridge = AdbBridge::default();
        let spec = bridge.start_command("com.example", &Candidate::routed("myapp://open/x".into()));
        assert_eq!(spec.program, PathBuf::from("adb"));
        assert_eq!(
            spec.args,
            vec![
                "shell",
                "am",
                "start",
                "-W",
                "-a",
                "android.intent.action.VIEW",
                "-d",
                "'myapp://open/x'"
            ]
        );
    }

    #[test]
    fn test_targeted_command_with_serial() {
        let bridge = AdbBridge::new("/opt/sdk/adb").with_serial(Some("emulator-5554".into()));
        let candidate = Candidate::targeted(
            Activity::new("com.example.Outer$Inner", true),
            "myapp://x".into(),
        );
        let spec = bridge.start_command("com.example", &candidate);
        assert_eq!(
            spec.to_string(),
            "/opt/sdk/adb -s emulator-5554 shell am start -W \
             -n 'com.example/com.example.Outer$Inner' \
             -a android.intent.action.VIEW -d 'myapp://x'"
        );
    }

    #[test]
    fn test_blank_serial_is_ignored() {
        let bridge = AdbBridge::default().with_serial(Some("  ".into()));
        assert_eq!(bridge.serial(), None);
    }
}
