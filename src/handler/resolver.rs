//! Request path resolution module
//!
//! Maps a request path onto a file below the site root. Anything that is not
//! an existing regular file inside the root resolves to the fallback document,
//! so the caller never needs a "not found" branch.

use crate::error::ConfigError;
use std::io;
use std::path::{Component, Path, PathBuf};
use tokio::fs;

/// Why a request path fell back to the index document
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Miss {
    /// Nothing exists at the candidate path
    NotFound,
    /// Candidate exists but is a directory or special file
    NotAFile,
    /// Candidate would leave the site root
    Traversal,
    /// Percent-decoding did not produce valid UTF-8
    Undecodable,
}

/// How a resolved path was chosen
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResolutionKind {
    /// Request for the site root itself
    Index,
    /// Request matched an existing file
    File,
    /// Request did not match a file; the index document is served instead
    Fallback(Miss),
}

/// Outcome of resolving one request path
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Resolution {
    path: PathBuf,
    kind: ResolutionKind,
}

impl Resolution {
    /// File to serve
    pub fn path(&self) -> &Path {
        &self.path
    }

    pub const fn kind(&self) -> ResolutionKind {
        self.kind
    }

    pub const fn is_fallback(&self) -> bool {
        matches!(self.kind, ResolutionKind::Fallback(_))
    }
}

/// Resolves request paths against a fixed site root
#[derive(Debug, Clone)]
pub struct StaticResolver {
    root: PathBuf,
    index: PathBuf,
}

impl StaticResolver {
    /// Build a resolver for `root`, verifying that `root/index_file` exists.
    ///
    /// The root is canonicalized here, so later containment checks compare
    /// against the real location even when `root` is relative or a symlink.
    pub fn new(root: impl AsRef<Path>, index_file: &str) -> Result<Self, ConfigError> {
        let given = root.as_ref();
        let root = given
            .canonicalize()
            .map_err(|source| ConfigError::RootUnavailable {
                path: given.to_path_buf(),
                source,
            })?;
        if !root.is_dir() {
            return Err(ConfigError::RootNotDirectory(root));
        }

        let mut components = Path::new(index_file).components();
        if !matches!(
            (components.next(), components.next()),
            (Some(Component::Normal(_)), None)
        ) {
            return Err(ConfigError::InvalidIndexFile(index_file.to_string()));
        }

        let index = root.join(index_file);
        if !index.is_file() {
            return Err(ConfigError::IndexMissing(index));
        }

        Ok(Self { root, index })
    }

    /// Canonical site root
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Path of the fallback document
    pub fn index(&self) -> &Path {
        &self.index
    }

    /// Resolve a percent-encoded request path (query string excluded).
    ///
    /// Returns `Err` only for filesystem failures other than "does not exist",
    /// such as permission errors while inspecting the candidate.
    pub async fn resolve(&self, request_path: &str) -> io::Result<Resolution> {
        let trimmed = request_path.trim_start_matches('/');
        if trimmed.is_empty() {
            return Ok(self.index_as(ResolutionKind::Index));
        }

        let Ok(decoded) = urlencoding::decode(trimmed) else {
            return Ok(self.fallback(Miss::Undecodable));
        };

        let relative = match normalize(&decoded) {
            Ok(relative) => relative,
            Err(miss) => return Ok(self.fallback(miss)),
        };

        let candidate = self.root.join(relative);
        match fs::metadata(&candidate).await {
            Ok(meta) if meta.is_file() => {}
            Ok(_) => return Ok(self.fallback(Miss::NotAFile)),
            Err(e) if is_missing(&e) => return Ok(self.fallback(Miss::NotFound)),
            Err(e) => return Err(e),
        }

        // Symlinks may point anywhere; only the real location counts
        let real = match fs::canonicalize(&candidate).await {
            Ok(real) => real,
            Err(e) if is_missing(&e) => return Ok(self.fallback(Miss::NotFound)),
            Err(e) => return Err(e),
        };
        if !real.starts_with(&self.root) {
            return Ok(self.fallback(Miss::Traversal));
        }

        Ok(Resolution {
            path: candidate,
            kind: ResolutionKind::File,
        })
    }

    fn index_as(&self, kind: ResolutionKind) -> Resolution {
        Resolution {
            path: self.index.clone(),
            kind,
        }
    }

    fn fallback(&self, miss: Miss) -> Resolution {
        self.index_as(ResolutionKind::Fallback(miss))
    }
}

/// Collapse `.` and `..` segments of a decoded request path.
///
/// Fails with `Miss::Traversal` when a `..` would climb above the root or a
/// segment carries a separator the platform could reinterpret.
fn normalize(decoded: &str) -> Result<PathBuf, Miss> {
    let mut segments: Vec<&str> = Vec::new();
    for segment in decoded.split('/') {
        match segment {
            "" | "." => {}
            ".." => {
                if segments.pop().is_none() {
                    return Err(Miss::Traversal);
                }
            }
            s if is_unsafe_segment(s) => return Err(Miss::Traversal),
            s => segments.push(s),
        }
    }
    Ok(segments.iter().collect())
}

fn is_unsafe_segment(segment: &str) -> bool {
    segment.contains('\\') || segment.contains('\0') || (cfg!(windows) && segment.contains(':'))
}

fn is_missing(err: &io::Error) -> bool {
    matches!(
        err.kind(),
        io::ErrorKind::NotFound | io::ErrorKind::NotADirectory | io::ErrorKind::InvalidFilename
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs as std_fs;
    use tempfile::TempDir;

    /// Layout: `<tmp>/secret.txt` outside the site, `<tmp>/site/` as root.
    fn site() -> (TempDir, StaticResolver) {
        let tmp = tempfile::tempdir().unwrap();
        let root = tmp.path().join("site");
        std_fs::create_dir_all(root.join("assets/img")).unwrap();
        std_fs::write(root.join("index.html"), "<html>app</html>").unwrap();
        std_fs::write(root.join("assets/logo.png"), [0x89, b'P', b'N', b'G']).unwrap();
        std_fs::write(root.join("assets/my file.txt"), "spaced").unwrap();
        std_fs::write(tmp.path().join("secret.txt"), "top secret").unwrap();
        let resolver = StaticResolver::new(&root, "index.html").unwrap();
        (tmp, resolver)
    }

    #[tokio::test]
    async fn test_root_serves_index() {
        let (_tmp, resolver) = site();
        for path in ["", "/", "//"] {
            let res = resolver.resolve(path).await.unwrap();
            assert_eq!(res.path(), resolver.index());
            assert_eq!(res.kind(), ResolutionKind::Index);
        }
    }

    #[tokio::test]
    async fn test_existing_file_passthrough() {
        let (_tmp, resolver) = site();
        let res = resolver.resolve("/assets/logo.png").await.unwrap();
        assert_eq!(res.kind(), ResolutionKind::File);
        assert_eq!(res.path(), resolver.root().join("assets/logo.png"));
        assert_eq!(
            std_fs::read(res.path()).unwrap(),
            vec![0x89, b'P', b'N', b'G']
        );

        let res = resolver.resolve("assets/logo.png").await.unwrap();
        assert_eq!(res.path(), resolver.root().join("assets/logo.png"));
    }

    #[tokio::test]
    async fn test_index_requested_by_name() {
        let (_tmp, resolver) = site();
        let res = resolver.resolve("/index.html").await.unwrap();
        assert_eq!(res.kind(), ResolutionKind::File);
        assert_eq!(res.path(), resolver.index());
    }

    #[tokio::test]
    async fn test_missing_file_falls_back() {
        let (_tmp, resolver) = site();
        let res = resolver.resolve("/dashboard/settings").await.unwrap();
        assert_eq!(res.path(), resolver.index());
        assert_eq!(res.kind(), ResolutionKind::Fallback(Miss::NotFound));
    }

    #[tokio::test]
    async fn test_path_below_a_file_falls_back() {
        let (_tmp, resolver) = site();
        let res = resolver.resolve("/index.html/extra").await.unwrap();
        assert_eq!(res.path(), resolver.index());
        assert!(res.is_fallback());
    }

    #[tokio::test]
    async fn test_directory_falls_back() {
        let (_tmp, resolver) = site();
        for path in ["/assets", "/assets/", "/assets/img/", "/assets/.."] {
            let res = resolver.resolve(path).await.unwrap();
            assert_eq!(res.path(), resolver.index(), "path {path}");
            assert_eq!(res.kind(), ResolutionKind::Fallback(Miss::NotAFile));
        }
    }

    #[tokio::test]
    async fn test_traversal_is_contained() {
        let (_tmp, resolver) = site();
        for path in [
            "../secret.txt",
            "/../secret.txt",
            "/assets/../../secret.txt",
            "/%2e%2e/secret.txt",
            "/assets/%2E%2E/%2e%2e/secret.txt",
            "/..%2fsecret.txt",
            "/assets\\..\\..\\secret.txt",
        ] {
            let res = resolver.resolve(path).await.unwrap();
            assert_eq!(res.path(), resolver.index(), "path {path}");
            assert_eq!(res.kind(), ResolutionKind::Fallback(Miss::Traversal));
        }
    }

    #[tokio::test]
    async fn test_dot_segments_inside_root_are_collapsed() {
        let (_tmp, resolver) = site();
        let res = resolver.resolve("/assets/img/../logo.png").await.unwrap();
        assert_eq!(res.kind(), ResolutionKind::File);
        assert_eq!(res.path(), resolver.root().join("assets/logo.png"));

        let res = resolver.resolve("/./assets/./logo.png").await.unwrap();
        assert_eq!(res.path(), resolver.root().join("assets/logo.png"));
    }

    #[tokio::test]
    async fn test_percent_encoded_names() {
        let (_tmp, resolver) = site();
        let res = resolver.resolve("/assets/my%20file.txt").await.unwrap();
        assert_eq!(res.kind(), ResolutionKind::File);
        assert_eq!(res.path(), resolver.root().join("assets/my file.txt"));

        let res = resolver.resolve("/assets/%FF%FE").await.unwrap();
        assert_eq!(res.kind(), ResolutionKind::Fallback(Miss::Undecodable));
    }

    #[tokio::test]
    async fn test_resolution_is_idempotent() {
        let (_tmp, resolver) = site();
        for path in ["/", "/assets/logo.png", "/nope", "../secret.txt", "/assets"] {
            let first = resolver.resolve(path).await.unwrap();
            let second = resolver.resolve(path).await.unwrap();
            assert_eq!(first, second);
        }
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_symlink_leaving_root_falls_back() {
        let (tmp, resolver) = site();
        std::os::unix::fs::symlink(
            tmp.path().join("secret.txt"),
            resolver.root().join("leak.txt"),
        )
        .unwrap();
        std::os::unix::fs::symlink(
            resolver.root().join("assets/logo.png"),
            resolver.root().join("alias.png"),
        )
        .unwrap();

        let res = resolver.resolve("/leak.txt").await.unwrap();
        assert_eq!(res.kind(), ResolutionKind::Fallback(Miss::Traversal));
        assert_eq!(res.path(), resolver.index());

        let res = resolver.resolve("/alias.png").await.unwrap();
        assert_eq!(res.kind(), ResolutionKind::File);
        assert_eq!(res.path(), resolver.root().join("alias.png"));
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_unreadable_directory_is_an_error() {
        use std::os::unix::fs::PermissionsExt;

        let (_tmp, resolver) = site();
        let locked = resolver.root().join("locked");
        std_fs::create_dir(&locked).unwrap();
        std_fs::write(locked.join("app.js"), "run()").unwrap();
        std_fs::set_permissions(&locked, std_fs::Permissions::from_mode(0o000)).unwrap();

        // Root ignores permission bits, nothing to observe in that case
        let blocked = std_fs::metadata(locked.join("app.js")).is_err();
        let result = resolver.resolve("/locked/app.js").await;
        std_fs::set_permissions(&locked, std_fs::Permissions::from_mode(0o755)).unwrap();
        if !blocked {
            return;
        }

        let err = result.unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::PermissionDenied);
    }

    #[test]
    fn test_missing_root_is_rejected() {
        let tmp = tempfile::tempdir().unwrap();
        let err = StaticResolver::new(tmp.path().join("nope"), "index.html").unwrap_err();
        assert!(matches!(err, ConfigError::RootUnavailable { .. }));
    }

    #[test]
    fn test_root_must_be_directory() {
        let tmp = tempfile::tempdir().unwrap();
        let file = tmp.path().join("plain.txt");
        std_fs::write(&file, "x").unwrap();
        let err = StaticResolver::new(&file, "index.html").unwrap_err();
        assert!(matches!(err, ConfigError::RootNotDirectory(_)));
    }

    #[test]
    fn test_missing_index_is_rejected() {
        let tmp = tempfile::tempdir().unwrap();
        let err = StaticResolver::new(tmp.path(), "index.html").unwrap_err();
        assert!(matches!(err, ConfigError::IndexMissing(_)));

        std_fs::create_dir(tmp.path().join("index.html")).unwrap();
        let err = StaticResolver::new(tmp.path(), "index.html").unwrap_err();
        assert!(matches!(err, ConfigError::IndexMissing(_)));
    }

    #[test]
    fn test_index_file_must_be_plain_name() {
        let (_tmp, resolver) = site();
        for name in ["", "../index.html", "assets/logo.png", "/etc/passwd", "."] {
            let err = StaticResolver::new(resolver.root(), name).unwrap_err();
            assert!(matches!(err, ConfigError::InvalidIndexFile(_)), "name {name:?}");
        }
    }

    #[test]
    fn test_normalize() {
        assert_eq!(normalize("a/./b//c"), Ok(PathBuf::from("a/b/c")));
        assert_eq!(normalize("a/b/../c"), Ok(PathBuf::from("a/c")));
        assert_eq!(normalize("a/.."), Ok(PathBuf::new()));
        assert_eq!(normalize(".."), Err(Miss::Traversal));
        assert_eq!(normalize("a/../../b"), Err(Miss::Traversal));
        assert_eq!(normalize("a\0b"), Err(Miss::Traversal));
    }
}
