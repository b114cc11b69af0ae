// src/platform.rs

//! Target platform and package format descriptors
//!
//! Conditional directives in list files compare against normalized names:
//! `solaris` rather than `SunOS`, `tru64` rather than `OSF1`, `intel`
//! rather than `i686`. [`Platform::new`] and [`Platform::detect`] both
//! apply the same normalization so a simulated target behaves exactly like
//! a detected one.

use crate::error::{Error, Result};
use serde::Serialize;
use std::fmt;
use std::path::Path;
use std::str::FromStr;

/// Operating system name, release and CPU architecture of the build target
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Platform {
    pub sysname: String,
    pub release: String,
    pub machine: String,
}

impl Platform {
    /// Build a platform descriptor from raw uname-style values
    pub fn new(sysname: &str, release: &str, machine: &str) -> Self {
        let mut sysname = normalize_sysname(sysname);
        let mut release = normalize_release(release);

        // SunOS 5.x is Solaris 2.x
        if sysname == "sunos" && release.starts_with(|c: char| c >= '5' && c.is_ascii_digit()) {
            sysname = "solaris".to_string();
            release = solaris_release(&release);
        }

        Self {
            sysname,
            release,
            machine: normalize_machine(machine),
        }
    }

    /// Detect the host platform with uname(2)
    pub fn detect() -> Result<Self> {
        let uts = nix::sys::utsname::uname().map_err(std::io::Error::from)?;
        let platform = Self::new(
            &uts.sysname().to_string_lossy(),
            &uts.release().to_string_lossy(),
            &uts.machine().to_string_lossy(),
        );
        tracing::debug!("Detected platform {}", platform);
        Ok(platform)
    }

    /// Override the CPU architecture, normalizing it like a detected one
    pub fn with_machine(mut self, machine: &str) -> Self {
        self.machine = normalize_machine(machine);
        self
    }

    /// The `os-release` string `%system` identifiers are prefix-matched against
    pub fn name_and_release(&self) -> String {
        format!("{}-{}", self.sysname, self.release)
    }

    /// Group name that replaces `sys` on this platform, if any
    pub fn sys_group(&self) -> Option<&'static str> {
        match self.sysname.as_str() {
            "tru64" => Some("system"),
            "linux" => Some("root"),
            _ => None,
        }
    }
}

impl fmt::Display for Platform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}-{}", self.sysname, self.release, self.machine)
    }
}

/// Lowercase, drop `-`/`_`, and map historical aliases to their current name
pub fn normalize_sysname(name: &str) -> String {
    let name: String = name
        .chars()
        .filter(|c| *c != '-' && *c != '_')
        .flat_map(char::to_lowercase)
        .collect();

    match name.as_str() {
        "osf1" | "dunix" => "tru64".to_string(),
        "irix64" => "irix".to_string(),
        "darwin" => "macosx".to_string(),
        _ => name,
    }
}

fn normalize_release(release: &str) -> String {
    release
        .trim_start_matches(|c: char| !c.is_ascii_digit())
        .to_string()
}

/// Convert a SunOS 5.x release into the matching Solaris 2.x release
fn solaris_release(release: &str) -> String {
    let (major, rest) = release.split_at(release.find('.').unwrap_or(release.len()));
    match major.parse::<u32>() {
        Ok(major) => format!("{}{}", major.saturating_sub(3), rest),
        Err(_) => release.to_string(),
    }
}

pub(crate) fn normalize_machine(machine: &str) -> String {
    let lower = machine.to_lowercase();
    if lower == "x86_64" || lower == "amd64" {
        return "x86_64".to_string();
    }

    let stripped: String = lower.chars().filter(|c| *c != '-' && *c != '_').collect();
    if stripped.contains("86") {
        "intel".to_string()
    } else if stripped.starts_with("sun") {
        "sparc".to_string()
    } else {
        stripped
    }
}

/// Package formats a distribution can be generated for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum PackageFormat {
    Portable,
    Aix,
    Bsd,
    Deb,
    Inst,
    Osx,
    Pkg,
    Rpm,
    Setld,
    Slackware,
    Swinstall,
}

impl PackageFormat {
    /// Every format, in the order they are listed in help output
    pub const ALL: [PackageFormat; 11] = [
        Self::Portable,
        Self::Aix,
        Self::Bsd,
        Self::Deb,
        Self::Inst,
        Self::Osx,
        Self::Pkg,
        Self::Rpm,
        Self::Setld,
        Self::Slackware,
        Self::Swinstall,
    ];

    /// Parse a format name, accepting the historical aliases
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "portable" => Some(Self::Portable),
            "aix" => Some(Self::Aix),
            "bsd" => Some(Self::Bsd),
            "deb" => Some(Self::Deb),
            "inst" | "tardist" => Some(Self::Inst),
            "osx" => Some(Self::Osx),
            "pkg" => Some(Self::Pkg),
            "rpm" => Some(Self::Rpm),
            "setld" => Some(Self::Setld),
            "slackware" => Some(Self::Slackware),
            "swinstall" | "depot" => Some(Self::Swinstall),
            _ => None,
        }
    }

    /// Canonical lowercase name
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Portable => "portable",
            Self::Aix => "aix",
            Self::Bsd => "bsd",
            Self::Deb => "deb",
            Self::Inst => "inst",
            Self::Osx => "osx",
            Self::Pkg => "pkg",
            Self::Rpm => "rpm",
            Self::Setld => "setld",
            Self::Slackware => "slackware",
            Self::Swinstall => "swinstall",
        }
    }

    /// The format packages are normally built in on the host
    pub fn native() -> Self {
        if cfg!(target_os = "linux") {
            if Path::new("/usr/bin/dpkg").exists() {
                Self::Deb
            } else {
                Self::Rpm
            }
        } else if cfg!(target_os = "macos") {
            Self::Osx
        } else if cfg!(target_os = "aix") {
            Self::Aix
        } else if cfg!(any(
            target_os = "freebsd",
            target_os = "netbsd",
            target_os = "openbsd"
        )) {
            Self::Bsd
        } else if cfg!(any(target_os = "solaris", target_os = "illumos")) {
            Self::Pkg
        } else {
            Self::Portable
        }
    }
}

impl FromStr for PackageFormat {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        if s.eq_ignore_ascii_case("native") {
            return Ok(Self::native());
        }
        Self::parse(s).ok_or_else(|| Error::UnknownFormat(s.to_string()))
    }
}

impl fmt::Display for PackageFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_linux_platform() {
        let platform = Platform::new("Linux", "6.1.0-13-amd64", "x86_64");
        assert_eq!(platform.sysname, "linux");
        assert_eq!(platform.release, "6.1.0-13-amd64");
        assert_eq!(platform.machine, "x86_64");
        assert_eq!(platform.name_and_release(), "linux-6.1.0-13-amd64");
    }

    #[test]
    fn test_sunos_becomes_solaris() {
        let platform = Platform::new("SunOS", "5.10", "sun4u");
        assert_eq!(platform.sysname, "solaris");
        assert_eq!(platform.release, "2.10");
        assert_eq!(platform.machine, "sparc");
    }

    #[test]
    fn test_old_sunos_stays_sunos() {
        let platform = Platform::new("SunOS", "4.1.4", "sun4m");
        assert_eq!(platform.sysname, "sunos");
        assert_eq!(platform.release, "4.1.4");
    }

    #[test]
    fn test_tru64_aliases() {
        assert_eq!(Platform::new("OSF1", "V5.1", "alpha").sysname, "tru64");
        assert_eq!(Platform::new("dunix", "4.0", "alpha").sysname, "tru64");
        assert_eq!(Platform::new("OSF1", "V5.1", "alpha").release, "5.1");
    }

    #[test]
    fn test_machine_normalization() {
        assert_eq!(Platform::new("linux", "1", "i686").machine, "intel");
        assert_eq!(Platform::new("linux", "1", "AMD64").machine, "x86_64");
        assert_eq!(Platform::new("linux", "1", "aarch64").machine, "aarch64");
        assert_eq!(Platform::new("hp-ux", "1", "9000_785").machine, "9000785");
        assert_eq!(Platform::new("HP-UX", "B.11.00", "x").sysname, "hpux");
    }

    #[test]
    fn test_sys_group() {
        assert_eq!(Platform::new("linux", "6", "x86_64").sys_group(), Some("root"));
        assert_eq!(Platform::new("osf1", "5", "alpha").sys_group(), Some("system"));
        assert_eq!(Platform::new("aix", "5", "powerpc").sys_group(), None);
    }

    #[test]
    fn test_format_parse() {
        assert_eq!(PackageFormat::parse("RPM"), Some(PackageFormat::Rpm));
        assert_eq!(PackageFormat::parse("tardist"), Some(PackageFormat::Inst));
        assert_eq!(PackageFormat::parse("depot"), Some(PackageFormat::Swinstall));
        assert_eq!(PackageFormat::parse("zip"), None);
        assert!("zip".parse::<PackageFormat>().is_err());
        assert!("native".parse::<PackageFormat>().is_ok());
    }

    #[test]
    fn test_format_names_round_trip() {
        for format in PackageFormat::ALL {
            assert_eq!(PackageFormat::parse(format.as_str()), Some(format));
        }
    }
}
