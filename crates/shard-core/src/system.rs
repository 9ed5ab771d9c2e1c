use std::sync::OnceLock;

use shard_model::Platform;

static MACHINE_ID: OnceLock<String> = OnceLock::new();

/// Environment variable that pins the machine id reported to the authority.
pub const MACHINE_ID_ENV: &str = "SHARD_MACHINE_ID";

/// Stable identifier of this runner for the lifetime of the process.
///
/// Resolution order: `SHARD_MACHINE_ID`, the host name, a random uuid.
pub fn machine_id() -> &'static str {
    MACHINE_ID.get_or_init(|| {
        if let Ok(id) = std::env::var(MACHINE_ID_ENV)
            && !id.trim().is_empty()
        {
            return id.trim().to_string();
        }
        if let Ok(name) = hostname::get()
            && let Some(name) = name.to_str()
            && !name.is_empty()
        {
            return name.to_string();
        }
        uuid::Uuid::new_v4().to_string()
    })
}

/// Host platform as reported in every claim.
pub fn platform() -> Platform {
    Platform {
        os_name: std::env::consts::OS.to_string(),
        os_version: os_info(),
        arch: std::env::consts::ARCH.to_string(),
    }
}

/// OS release string, best effort.
///
/// Reads `VERSION_ID` from `/etc/os-release` on Linux, otherwise the OS family.
pub fn os_info() -> String {
    #[cfg(target_os = "linux")]
    {
        if let Ok(content) = std::fs::read_to_string("/etc/os-release")
            && let Some(v) = parse_os_release(&content)
        {
            return v;
        }
    }

    std::env::consts::OS.to_string()
}

#[cfg_attr(not(target_os = "linux"), allow(dead_code))]
fn parse_os_release(content: &str) -> Option<String> {
    content.lines().find_map(|line| {
        line.strip_prefix("VERSION_ID=")
            .map(|v| v.trim_matches('"').to_string())
            .filter(|v| !v.is_empty())
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn machine_id_is_stable() {
        let a = machine_id();
        let b = machine_id();
        assert_eq!(a, b);
        assert!(!a.is_empty());
    }

    #[test]
    fn platform_is_populated() {
        let p = platform();
        assert!(!p.os_name.is_empty());
        assert!(!p.arch.is_empty());
    }

    #[test]
    fn os_release_version_id() {
        let content = "NAME=\"Debian GNU/Linux\"\nVERSION_ID=\"12\"\nID=debian\n";
        assert_eq!(parse_os_release(content).as_deref(), Some("12"));
        assert_eq!(parse_os_release("NAME=x"), None);
    }
}
