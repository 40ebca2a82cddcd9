//! Lock path resolution for gatewarden.
//!
//! Every command goes through [`GatewayContext::resolve`] so that a given
//! gateway configuration always maps to the same lock file, no matter which
//! directory the command is invoked from.
//!
//! # Layout
//!
//! ```text
//! <lock dir>/gateway.<first 8 hex chars of sha256(absolute config path)>.lock
//! ```
//!
//! The lock directory is `GATEWARDEN_LOCK_DIR` when set, otherwise a
//! per-user directory under the system temp dir.

use crate::config::EnvOverrides;
use crate::error::{GatewardenError, Result};
use sha2::{Digest, Sha256};
use std::fmt::Write;
use std::fs;
use std::path::{Component, Path, PathBuf};

/// Default config location relative to the home directory.
pub const DEFAULT_CONFIG_DIR: &str = ".gatewarden";

/// Default config file name.
pub const DEFAULT_CONFIG_FILE: &str = "gateway.yaml";

/// Number of hex characters of the config hash embedded in the lock filename.
pub const LOCK_HASH_LEN: usize = 8;

/// Resolved paths for one gateway configuration. All paths are absolute.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GatewayContext {
    /// Absolute path of the configuration this lock protects.
    pub config_path: PathBuf,

    /// Directory holding all gateway lock files for this user.
    pub lock_dir: PathBuf,

    /// The lock file for `config_path`.
    pub lock_path: PathBuf,
}

impl GatewayContext {
    /// Resolve the context from an explicit `--config` flag and the environment.
    ///
    /// Precedence for the config path: flag, `GATEWARDEN_CONFIG_PATH`, then
    /// `~/.gatewarden/gateway.yaml`. Does not touch the filesystem.
    pub fn resolve(config_flag: Option<&Path>, env: &EnvOverrides) -> Result<Self> {
        let config_path = match config_flag.or(env.config_path.as_deref()) {
            Some(path) => path.to_path_buf(),
            None => default_config_path()?,
        };

        let lock_dir = match &env.lock_dir {
            Some(dir) => absolutize(dir)?,
            None => default_lock_dir(),
        };

        Self::for_config(&config_path, &lock_dir)
    }

    /// Build the context for a config path inside a specific lock directory.
    pub fn for_config(config_path: &Path, lock_dir: &Path) -> Result<Self> {
        let config_path = absolutize(config_path)?;
        let lock_path = lock_dir.join(lock_file_name(&config_path));

        Ok(Self {
            config_path,
            lock_dir: lock_dir.to_path_buf(),
            lock_path,
        })
    }

    /// Create the lock directory if it is missing.
    ///
    /// On Unix the directory is created with mode `0700`.
    pub fn ensure_lock_dir(&self) -> std::io::Result<()> {
        if self.lock_dir.is_dir() {
            return Ok(());
        }

        let mut builder = fs::DirBuilder::new();
        builder.recursive(true);
        #[cfg(unix)]
        {
            use std::os::unix::fs::DirBuilderExt;
            builder.mode(0o700);
        }

        builder.create(&self.lock_dir)
    }
}

/// The lock filename for an absolute config path: `gateway.<hash>.lock`.
pub fn lock_file_name(config_path: &Path) -> String {
    let digest = Sha256::digest(config_path.as_os_str().as_encoded_bytes());
    let mut hash = String::with_capacity(LOCK_HASH_LEN);
    for byte in digest.iter().take(LOCK_HASH_LEN / 2) {
        let _ = write!(&mut hash, "{byte:02x}");
    }
    format!("gateway.{}.lock", hash)
}

/// The per-user lock directory under the system temp dir.
pub fn default_lock_dir() -> PathBuf {
    let tmp = std::env::temp_dir();
    #[cfg(unix)]
    {
        tmp.join(format!("gatewarden-{}", nix::unistd::getuid()))
    }
    #[cfg(not(unix))]
    {
        tmp.join("gatewarden")
    }
}

fn default_config_path() -> Result<PathBuf> {
    let home = dirs::home_dir().ok_or_else(|| {
        GatewardenError::UserError(
            "cannot determine home directory; pass --config or set GATEWARDEN_CONFIG_PATH"
                .to_string(),
        )
    })?;
    Ok(home.join(DEFAULT_CONFIG_DIR).join(DEFAULT_CONFIG_FILE))
}

/// Make a path absolute without touching the filesystem (the file may not exist yet).
///
/// `.` and `..` are folded lexically so every spelling of a path hashes alike.
fn absolutize(path: &Path) -> Result<PathBuf> {
    let absolute = std::path::absolute(path).map_err(|e| {
        GatewardenError::io(format!("failed to resolve path '{}'", path.display()), e)
    })?;
    Ok(normalize_lexically(&absolute))
}

fn normalize_lexically(path: &Path) -> PathBuf {
    let mut normalized = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            // Popping the root is a no-op, so `/..` stays `/`.
            Component::ParentDir => {
                normalized.pop();
            }
            other => normalized.push(other),
        }
    }
    normalized
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn env_with_lock_dir(dir: &Path) -> EnvOverrides {
        EnvOverrides {
            lock_dir: Some(dir.to_path_buf()),
            ..EnvOverrides::default()
        }
    }

    #[test]
    fn same_config_resolves_to_same_lock_path() {
        let temp_dir = TempDir::new().unwrap();
        let env = env_with_lock_dir(temp_dir.path());

        let a = GatewayContext::resolve(Some(Path::new("/cfg.json")), &env).unwrap();
        let b = GatewayContext::resolve(Some(Path::new("/cfg.json")), &env).unwrap();
        assert_eq!(a, b);
        assert_eq!(a.config_path, PathBuf::from("/cfg.json"));
        assert_eq!(a.lock_path.parent().unwrap(), temp_dir.path());
    }

    #[test]
    fn different_configs_resolve_to_different_lock_paths() {
        let temp_dir = TempDir::new().unwrap();
        let env = env_with_lock_dir(temp_dir.path());

        let a = GatewayContext::resolve(Some(Path::new("/srv/a/gateway.yaml")), &env).unwrap();
        let b = GatewayContext::resolve(Some(Path::new("/srv/b/gateway.yaml")), &env).unwrap();
        assert_ne!(a.lock_path, b.lock_path);
    }

    #[test]
    fn lock_file_name_shape() {
        let name = lock_file_name(Path::new("/cfg.json"));
        assert!(name.starts_with("gateway."));
        assert!(name.ends_with(".lock"));

        let hash = name
            .strip_prefix("gateway.")
            .and_then(|s| s.strip_suffix(".lock"))
            .unwrap();
        assert_eq!(hash.len(), LOCK_HASH_LEN);
        assert!(hash.chars().all(|c| c.is_ascii_hexdigit() && !c.is_ascii_uppercase()));
    }

    #[test]
    fn relative_config_is_made_absolute() {
        let temp_dir = TempDir::new().unwrap();
        let env = env_with_lock_dir(temp_dir.path());

        let ctx = GatewayContext::resolve(Some(Path::new("conf/gateway.yaml")), &env).unwrap();
        assert!(ctx.config_path.is_absolute());
        assert!(ctx.config_path.ends_with("conf/gateway.yaml"));
    }

    #[test]
    fn parent_and_current_dir_components_share_a_lock() {
        let temp_dir = TempDir::new().unwrap();
        let lock_dir = temp_dir.path();

        let direct = GatewayContext::for_config(Path::new("/srv/cfg.yaml"), lock_dir).unwrap();
        let dotted =
            GatewayContext::for_config(Path::new("/srv/gw/../cfg.yaml"), lock_dir).unwrap();
        let current =
            GatewayContext::for_config(Path::new("/srv/./gw/./../cfg.yaml"), lock_dir).unwrap();

        assert_eq!(dotted.config_path, PathBuf::from("/srv/cfg.yaml"));
        assert_eq!(direct.lock_path, dotted.lock_path);
        assert_eq!(direct.lock_path, current.lock_path);
    }

    #[test]
    fn relative_parent_config_matches_absolute() {
        let temp_dir = TempDir::new().unwrap();
        let cwd = std::env::current_dir().unwrap();
        let parent = cwd.parent().unwrap_or(&cwd).join("cfg.yaml");

        let relative =
            GatewayContext::for_config(Path::new("../cfg.yaml"), temp_dir.path()).unwrap();
        let absolute = GatewayContext::for_config(&parent, temp_dir.path()).unwrap();
        assert_eq!(relative.lock_path, absolute.lock_path);
    }

    #[test]
    fn parent_of_root_stays_root() {
        assert_eq!(
            normalize_lexically(Path::new("/../../cfg.yaml")),
            PathBuf::from("/cfg.yaml")
        );
    }

    #[test]
    #[cfg(unix)]
    fn non_utf8_paths_get_distinct_locks() {
        use std::ffi::OsStr;
        use std::os::unix::ffi::OsStrExt;

        let a = Path::new(OsStr::from_bytes(b"/srv/cfg-\xff.yaml"));
        let b = Path::new(OsStr::from_bytes(b"/srv/cfg-\xfe.yaml"));
        assert_ne!(lock_file_name(a), lock_file_name(b));
    }

    #[test]
    fn flag_wins_over_env_config_path() {
        let temp_dir = TempDir::new().unwrap();
        let env = EnvOverrides {
            config_path: Some(PathBuf::from("/from/env.yaml")),
            ..env_with_lock_dir(temp_dir.path())
        };

        let ctx = GatewayContext::resolve(Some(Path::new("/from/flag.yaml")), &env).unwrap();
        assert_eq!(ctx.config_path, PathBuf::from("/from/flag.yaml"));

        let ctx = GatewayContext::resolve(None, &env).unwrap();
        assert_eq!(ctx.config_path, PathBuf::from("/from/env.yaml"));
    }

    #[test]
    fn default_lock_dir_is_under_temp() {
        let dir = default_lock_dir();
        assert!(dir.starts_with(std::env::temp_dir()));
        assert!(
            dir.file_name()
                .unwrap()
                .to_string_lossy()
                .starts_with("gatewarden")
        );
    }

    #[test]
    fn ensure_lock_dir_creates_nested_directory() {
        let temp_dir = TempDir::new().unwrap();
        let lock_dir = temp_dir.path().join("nested").join("locks");
        let ctx = GatewayContext::for_config(Path::new("/cfg.json"), &lock_dir).unwrap();

        ctx.ensure_lock_dir().unwrap();
        assert!(lock_dir.is_dir());
        // Idempotent
        ctx.ensure_lock_dir().unwrap();
    }

    #[test]
    #[cfg(unix)]
    fn ensure_lock_dir_is_private() {
        use std::os::unix::fs::PermissionsExt;

        let temp_dir = TempDir::new().unwrap();
        let lock_dir = temp_dir.path().join("private");
        let ctx = GatewayContext::for_config(Path::new("/cfg.json"), &lock_dir).unwrap();
        ctx.ensure_lock_dir().unwrap();

        let mode = fs::metadata(&lock_dir).unwrap().permissions().mode();
        assert_eq!(mode & 0o777, 0o700);
    }
}
