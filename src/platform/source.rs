use std::io;
use std::process::Command;
use tracing::debug;

/// Linux processor information interface, one `processor` stanza per logical CPU
pub const CPUINFO_PATH: &str = "/proc/cpuinfo";

/// Where the prober reads host facts from.
///
/// [`LiveSystem`] reads the running host; tests hand in fixed answers.
pub trait SystemSource {
    /// Kernel/OS name as `uname -s` would print it, or `None` when unknown
    fn kernel_name(&self) -> Option<String>;

    /// Raw contents of the processor information interface
    fn cpuinfo(&self) -> io::Result<String>;
}

/// The host this process runs on
#[derive(Debug, Clone, Copy, Default)]
pub struct LiveSystem;

impl SystemSource for LiveSystem {
    fn kernel_name(&self) -> Option<String> {
        match Command::new("uname").arg("-s").output() {
            Ok(out) if out.status.success() => {
                let name = String::from_utf8_lossy(&out.stdout).trim().to_string();
                if !name.is_empty() {
                    return Some(name);
                }
            }
            Ok(out) => debug!("uname -s exited with {}", out.status),
            Err(e) => debug!("uname -s unavailable: {e}"),
        }

        Some(kernel_name_for_target(std::env::consts::OS))
    }

    fn cpuinfo(&self) -> io::Result<String> {
        std::fs::read_to_string(CPUINFO_PATH)
    }
}

/// Kernel name matching a compile-time target OS, used when `uname` can't run.
pub fn kernel_name_for_target(target_os: &str) -> String {
    match target_os {
        "linux" => "Linux".to_string(),
        "macos" => "Darwin".to_string(),
        other => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kernel_name_for_target() {
        assert_eq!(kernel_name_for_target("linux"), "Linux");
        assert_eq!(kernel_name_for_target("macos"), "Darwin");
        assert_eq!(kernel_name_for_target("windows"), "windows");
    }

    #[test]
    fn test_live_kernel_name_is_reported() {
        // Falls back to the target OS, so a name is always available
        let name = LiveSystem.kernel_name();
        assert!(name.is_some_and(|n| !n.is_empty()));
    }
}
