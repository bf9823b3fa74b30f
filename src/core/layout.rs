use crate::utils::error::{DownstreamError, Result};
use percent_encoding::percent_decode_str;
use std::path::{Path, PathBuf};
use url::{ParseError, Url};

pub const DEFAULT_BUILD_DIR: &str = ".downstream";

/// Where clones live: `<working dir>/<build dir>/<checkout name>`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuildLayout {
    root: PathBuf,
}

impl BuildLayout {
    pub fn new<P: AsRef<Path>>(working_dir: P, build_dir: &str) -> Self {
        Self {
            root: working_dir.as_ref().join(build_dir),
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn checkout_dir(&self, origin_url: &str) -> Result<PathBuf> {
        Ok(self.root.join(derive_checkout_dir_name(origin_url)?))
    }
}

/// Final path segment of the origin with any `.git` suffix removed, decoded the
/// way `git clone` names its target directory.
///
/// URLs use their path; plain paths such as `/srv/git/repo.git` or
/// `../repo.git` are taken as-is. scp-style `host:org/repo.git` is rejected.
pub fn derive_checkout_dir_name(origin_url: &str) -> Result<String> {
    let malformed = |reason: String| DownstreamError::MalformedOrigin {
        url: origin_url.to_string(),
        reason,
    };

    let path = match Url::parse(origin_url) {
        Ok(parsed) => parsed.path().to_string(),
        Err(ParseError::RelativeUrlWithoutBase) => {
            let first_segment = origin_url.split('/').next().unwrap_or_default();
            if first_segment.contains(':') {
                return Err(malformed("first path segment cannot contain a colon".to_string()));
            }
            origin_url.to_string()
        }
        Err(e) => return Err(malformed(e.to_string())),
    };

    let decoded = percent_decode_str(&path).decode_utf8_lossy();
    let last = Path::new(&*decoded)
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_default();
    let name = last.strip_suffix(".git").unwrap_or(&last);

    if name.is_empty() {
        return Err(malformed("origin has no repository path".to_string()));
    }
    Ok(name.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strips_git_suffix() {
        assert_eq!(
            derive_checkout_dir_name("https://example.com/org/repo.git").unwrap(),
            "repo"
        );
    }

    #[test]
    fn test_keeps_name_without_suffix() {
        assert_eq!(
            derive_checkout_dir_name("https://example.com/org/repo").unwrap(),
            "repo"
        );
    }

    #[test]
    fn test_ssh_url_and_trailing_slash() {
        assert_eq!(
            derive_checkout_dir_name("ssh://git@github.com/org/widget.git").unwrap(),
            "widget"
        );
        assert_eq!(
            derive_checkout_dir_name("https://example.com/org/repo/").unwrap(),
            "repo"
        );
    }

    #[test]
    fn test_plain_path_origins() {
        assert_eq!(derive_checkout_dir_name("/srv/git/repo.git").unwrap(), "repo");
        assert_eq!(derive_checkout_dir_name("../repo.git").unwrap(), "repo");
        assert_eq!(derive_checkout_dir_name("/srv/git/widget/").unwrap(), "widget");
        assert_eq!(
            derive_checkout_dir_name("file:///srv/git/tools.git").unwrap(),
            "tools"
        );
    }

    #[test]
    fn test_percent_encoded_name_is_decoded() {
        assert_eq!(
            derive_checkout_dir_name("https://example.com/org/my%20repo.git").unwrap(),
            "my repo"
        );
        assert_eq!(derive_checkout_dir_name("/srv/git/my%20repo.git").unwrap(), "my repo");
    }

    #[test]
    fn test_malformed_urls() {
        for url in ["", "git@github.com:org/repo.git", "https://example.com", "..", "http://[::1"] {
            let err = derive_checkout_dir_name(url).unwrap_err();
            assert!(
                matches!(err, DownstreamError::MalformedOrigin { .. }),
                "{} should be malformed",
                url
            );
        }
    }

    #[test]
    fn test_checkout_dir_under_build_root() {
        let layout = BuildLayout::new("/code/lib", DEFAULT_BUILD_DIR);
        assert_eq!(layout.root(), Path::new("/code/lib/.downstream"));
        assert_eq!(
            layout.checkout_dir("https://example.com/org/app.git").unwrap(),
            PathBuf::from("/code/lib/.downstream/app")
        );
    }
}
