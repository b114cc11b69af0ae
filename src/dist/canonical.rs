// src/dist/canonical.rs

//! Finalization pass run on a freshly parsed distribution

use super::{Distribution, File};
use tracing::debug;

/// Sort files by destination and drop duplicate destinations
///
/// The sort is stable, and of each run of equal destinations only the last
/// one survives. Package generators rely on this "last wins" behavior.
pub fn sort_and_dedup(files: &mut Vec<File>) {
    files.sort_by(|a, b| a.dst.as_bytes().cmp(b.dst.as_bytes()));

    // dedup_by keeps the earlier element, so swap the later one into its slot
    files.dedup_by(|later, kept| {
        if later.dst == kept.dst {
            debug!("Dropping duplicate entry for {}", kept.dst);
            std::mem::swap(later, kept);
            true
        } else {
            false
        }
    });
}

/// Packager identity used when the list file has no `%packager`
pub fn default_packager() -> String {
    let user = nix::unistd::User::from_uid(nix::unistd::getuid())
        .ok()
        .flatten()
        .map(|u| u.name)
        .unwrap_or_else(|| "unknown".to_string());

    let host = nix::unistd::gethostname()
        .ok()
        .and_then(|h| h.into_string().ok())
        .filter(|h| !h.is_empty())
        .unwrap_or_else(|| "localhost".to_string());

    format!("{}@{}", user, host)
}

/// Canonicalize a distribution before it is handed to a package generator
pub fn finalize(dist: &mut Distribution) {
    sort_and_dedup(&mut dist.files);

    if dist.packager.is_empty() {
        dist.packager = default_packager();
    }

    if dist.release.is_empty() {
        dist.release = "0".to_string();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dist::FileType;

    fn file(dst: &str, src: &str) -> File {
        File {
            file_type: FileType::from_char('f').unwrap(),
            mode: 0o644,
            user: "root".to_string(),
            group: "sys".to_string(),
            dst: dst.to_string(),
            src: src.to_string(),
            options: String::new(),
            subpackage: None,
        }
    }

    fn dsts(files: &[File]) -> Vec<&str> {
        files.iter().map(|f| f.dst.as_str()).collect()
    }

    #[test]
    fn test_sort_by_destination() {
        let mut files = vec![file("/usr/bin/b", "b"), file("/etc/a", "a"), file("/opt/c", "c")];
        sort_and_dedup(&mut files);
        assert_eq!(dsts(&files), vec!["/etc/a", "/opt/c", "/usr/bin/b"]);
    }

    #[test]
    fn test_sort_is_bytewise() {
        let mut files = vec![file("/a/b", "1"), file("/a-b", "2"), file("/A", "3")];
        sort_and_dedup(&mut files);
        assert_eq!(dsts(&files), vec!["/A", "/a-b", "/a/b"]);
    }

    #[test]
    fn test_dedup_keeps_last_of_run() {
        // Known quirk: after the stable sort the later duplicate wins
        let mut files = vec![
            file("/usr/bin/app", "first"),
            file("/etc/app.conf", "conf"),
            file("/usr/bin/app", "second"),
            file("/usr/bin/app", "third"),
        ];
        sort_and_dedup(&mut files);

        assert_eq!(dsts(&files), vec!["/etc/app.conf", "/usr/bin/app"]);
        assert_eq!(files[1].src, "third");
    }

    #[test]
    fn test_destinations_strictly_increasing() {
        let mut files: Vec<File> = ["/z", "/a", "/m", "/a", "/z", "/b", "/m"]
            .iter()
            .enumerate()
            .map(|(i, d)| file(d, &i.to_string()))
            .collect();
        sort_and_dedup(&mut files);

        assert!(files.windows(2).all(|w| w[0].dst < w[1].dst));
        assert_eq!(files.len(), 4);
    }

    #[test]
    fn test_empty_list() {
        let mut files = Vec::new();
        sort_and_dedup(&mut files);
        assert!(files.is_empty());
    }

    #[test]
    fn test_default_packager_shape() {
        let packager = default_packager();
        let (user, host) = packager.split_once('@').unwrap();
        assert!(!user.is_empty());
        assert!(!host.is_empty());
    }

    #[test]
    fn test_finalize_keeps_explicit_packager() {
        let mut dist = Distribution {
            packager: "builder@example.com".to_string(),
            release: "3".to_string(),
            ..Distribution::default()
        };
        finalize(&mut dist);
        assert_eq!(dist.packager, "builder@example.com");
        assert_eq!(dist.release, "3");
    }

    #[test]
    fn test_finalize_defaults() {
        let mut dist = Distribution::new();
        finalize(&mut dist);
        assert!(dist.packager.contains('@'));
        assert_eq!(dist.release, "0");
    }
}
