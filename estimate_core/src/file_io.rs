//! # File I/O Module
//!
//! Local-file form of the two persisted stores the engine reads from:
//! projects (saved calculations) and per-user settings (price overrides and
//! estimate defaults).
//!
//! - **Atomic saves**: write to `.tmp`, fsync, rename over the target
//! - **File locking**: `.lock` sidecar with holder metadata plus an OS lock
//! - **Version validation**: files from a newer schema are refused
//!
//! ## File Formats
//!
//! Projects are saved as `.tly` files and user settings as `settings.json`,
//! both pretty-printed JSON.
//!
//! ## Example
//!
//! ```rust,no_run
//! use estimate_core::file_io::{load_user_settings, save_user_settings, UserSettings};
//! use std::path::Path;
//!
//! let path = Path::new("settings.json");
//! let mut settings = UserSettings::new("ana@example.com");
//! settings.price_overrides.set("concrete", 0, 32.0)?;
//! save_user_settings(&settings, path)?;
//!
//! let loaded = load_user_settings(path)?;
//! assert_eq!(loaded.price_overrides.len(), 1);
//! # Ok::<(), estimate_core::errors::CalcError>(())
//! ```

use std::fs::{self, File, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use fs2::FileExt;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::errors::{CalcError, CalcResult};
use crate::estimate::{DEFAULT_COMPLEXITY, DEFAULT_OVERHEAD_PERCENTAGE};
use crate::overrides::PriceOverrides;
use crate::project::{Project, SCHEMA_VERSION};

/// Locks older than this are considered abandoned
const STALE_LOCK_HOURS: i64 = 24;

// ============================================================================
// User Settings
// ============================================================================

/// Per-user settings persisted between sessions.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserSettings {
    /// Schema version (for migration compatibility)
    pub version: String,
    pub user_id: String,
    #[serde(default)]
    pub price_overrides: PriceOverrides,
    pub default_overhead_percentage: f64,
    pub default_complexity: String,
}

impl UserSettings {
    pub fn new(user_id: impl Into<String>) -> Self {
        UserSettings {
            version: SCHEMA_VERSION.to_string(),
            user_id: user_id.into(),
            price_overrides: PriceOverrides::new(),
            default_overhead_percentage: DEFAULT_OVERHEAD_PERCENTAGE,
            default_complexity: DEFAULT_COMPLEXITY.to_string(),
        }
    }
}

// ============================================================================
// Locking
// ============================================================================

/// Lock file metadata stored in `.lock` files
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LockInfo {
    /// User identifier (email or username)
    pub user_id: String,
    pub machine: String,
    pub pid: u32,
    pub locked_at: DateTime<Utc>,
}

impl LockInfo {
    /// Lock info for the current process
    pub fn new(user_id: impl Into<String>) -> Self {
        LockInfo {
            user_id: user_id.into(),
            machine: hostname().unwrap_or_else(|| "unknown".to_string()),
            pid: std::process::id(),
            locked_at: Utc::now(),
        }
    }

    /// True when the holder is gone or the lock is too old to trust.
    pub fn is_stale(&self) -> bool {
        if Utc::now() - self.locked_at > chrono::Duration::hours(STALE_LOCK_HOURS) {
            return true;
        }
        hostname().is_some_and(|machine| machine == self.machine) && !process_alive(self.pid)
    }
}

fn hostname() -> Option<String> {
    #[cfg(windows)]
    {
        std::env::var("COMPUTERNAME").ok()
    }
    #[cfg(not(windows))]
    {
        std::env::var("HOSTNAME").ok().or_else(|| std::env::var("HOST").ok())
    }
}

#[cfg(unix)]
fn process_alive(pid: u32) -> bool {
    Path::new(&format!("/proc/{}", pid)).exists()
}

#[cfg(not(unix))]
fn process_alive(_pid: u32) -> bool {
    // without a cheap liveness probe only the age check applies
    true
}

/// Exclusive lock on a project or settings file, released on drop.
///
/// Combines an OS-level lock (via fs2) with a `.lock` sidecar that tells
/// other users who holds the file.
pub struct FileLock {
    target: PathBuf,
    lock_path: PathBuf,
    _handle: File,
    pub info: LockInfo,
}

impl FileLock {
    /// Acquire an exclusive lock on `path`.
    ///
    /// # Errors
    ///
    /// * `FileLocked` - a live holder already has the file
    /// * `FileError` - the lock file could not be written
    pub fn acquire(path: &Path, user_id: impl Into<String>) -> CalcResult<Self> {
        let lock_path = lock_path_for(path);

        if let Some(existing) = read_lock_info(&lock_path) {
            if !existing.is_stale() {
                return Err(CalcError::file_locked(
                    path.display().to_string(),
                    format!("{} ({})", existing.user_id, existing.machine),
                    existing.locked_at.to_rfc3339(),
                ));
            }
            tracing::warn!(
                path = %path.display(),
                holder = %existing.user_id,
                "taking over stale lock"
            );
        }

        let mut handle = OpenOptions::new()
            .read(true)
            .write(true)
            .create(true)
            .truncate(true)
            .open(&lock_path)
            .map_err(|e| CalcError::file_error("create lock", lock_path.display().to_string(), e.to_string()))?;

        handle
            .try_lock_exclusive()
            .map_err(|_| CalcError::file_locked(path.display().to_string(), "another process", "unknown"))?;

        let info = LockInfo::new(user_id);
        let body = to_json(&info)?;
        handle
            .write_all(body.as_bytes())
            .and_then(|_| handle.sync_all())
            .map_err(|e| CalcError::file_error("write lock", lock_path.display().to_string(), e.to_string()))?;

        tracing::debug!(path = %path.display(), "lock acquired");
        Ok(FileLock {
            target: path.to_path_buf(),
            lock_path,
            _handle: handle,
            info,
        })
    }

    /// Current live holder of `path`, if any, without acquiring.
    pub fn check(path: &Path) -> Option<LockInfo> {
        read_lock_info(&lock_path_for(path)).filter(|info| !info.is_stale())
    }

    /// The locked file
    pub fn target(&self) -> &Path {
        &self.target
    }
}

impl Drop for FileLock {
    fn drop(&mut self) {
        let _ = fs::remove_file(&self.lock_path);
    }
}

/// `project.tly` -> `project.tly.lock`
fn lock_path_for(path: &Path) -> PathBuf {
    suffixed(path, "lock")
}

fn suffixed(path: &Path, suffix: &str) -> PathBuf {
    let extension = match path.extension() {
        Some(ext) => format!("{}.{}", ext.to_string_lossy(), suffix),
        None => suffix.to_string(),
    };
    path.with_extension(extension)
}

fn read_lock_info(lock_path: &Path) -> Option<LockInfo> {
    let contents = fs::read_to_string(lock_path).ok()?;
    serde_json::from_str(&contents).ok()
}

// ============================================================================
// JSON Files
// ============================================================================

fn to_json<T: Serialize>(value: &T) -> CalcResult<String> {
    serde_json::to_string_pretty(value).map_err(|e| CalcError::SerializationError { reason: e.to_string() })
}

/// Serialize `value` and replace `path` atomically.
fn write_json_atomic<T: Serialize>(value: &T, path: &Path) -> CalcResult<()> {
    let json = to_json(value)?;
    let tmp_path = suffixed(path, "tmp");

    let mut tmp = File::create(&tmp_path)
        .map_err(|e| CalcError::file_error("create temp file", tmp_path.display().to_string(), e.to_string()))?;
    tmp.write_all(json.as_bytes())
        .and_then(|_| tmp.sync_all())
        .map_err(|e| CalcError::file_error("write temp file", tmp_path.display().to_string(), e.to_string()))?;

    fs::rename(&tmp_path, path).map_err(|e| {
        let _ = fs::remove_file(&tmp_path);
        CalcError::file_error("rename to final", path.display().to_string(), e.to_string())
    })?;

    tracing::debug!(path = %path.display(), bytes = json.len(), "saved");
    Ok(())
}

fn read_json<T: DeserializeOwned>(path: &Path) -> CalcResult<T> {
    let contents =
        fs::read_to_string(path).map_err(|e| CalcError::file_error("read", path.display().to_string(), e.to_string()))?;
    serde_json::from_str(&contents).map_err(|e| CalcError::SerializationError {
        reason: format!("Invalid JSON in {}: {}", path.display(), e),
    })
}

/// Save a project with atomic write semantics.
pub fn save_project(project: &Project, path: &Path) -> CalcResult<()> {
    write_json_atomic(project, path)
}

/// Load a project, refusing files written by a newer schema.
///
/// # Errors
///
/// * `VersionMismatch` - file version is incompatible
/// * `SerializationError` - invalid JSON
/// * `FileError` - I/O error
pub fn load_project(path: &Path) -> CalcResult<Project> {
    let project: Project = read_json(path)?;
    validate_version(&project.meta.version)?;
    Ok(project)
}

/// Load a project together with the current lock holder, if any.
///
/// A locked project can still be opened read-only.
pub fn load_project_with_lock_check(path: &Path) -> CalcResult<(Project, Option<LockInfo>)> {
    let project = load_project(path)?;
    Ok((project, FileLock::check(path)))
}

/// Save user settings with atomic write semantics.
pub fn save_user_settings(settings: &UserSettings, path: &Path) -> CalcResult<()> {
    write_json_atomic(settings, path)
}

/// Load user settings, refusing files written by a newer schema.
pub fn load_user_settings(path: &Path) -> CalcResult<UserSettings> {
    let settings: UserSettings = read_json(path)?;
    validate_version(&settings.version)?;
    Ok(settings)
}

/// Load user settings, or fresh defaults when the file does not exist yet.
pub fn load_user_settings_or_default(path: &Path, user_id: &str) -> CalcResult<UserSettings> {
    if path.exists() {
        load_user_settings(path)
    } else {
        Ok(UserSettings::new(user_id))
    }
}

/// Major versions must match; within 0.x a newer minor is refused.
fn validate_version(file_version: &str) -> CalcResult<()> {
    let parse = |v: &str| -> Vec<u32> { v.split('.').filter_map(|p| p.parse().ok()).collect() };
    let file = parse(file_version);
    let current = parse(SCHEMA_VERSION);

    let mismatch = || CalcError::VersionMismatch {
        file_version: file_version.to_string(),
        expected_version: SCHEMA_VERSION.to_string(),
    };

    match (file.as_slice(), current.as_slice()) {
        ([file_major, rest @ ..], [current_major, current_rest @ ..]) => {
            if file_major != current_major {
                return Err(mismatch());
            }
            if *current_major == 0 {
                if let (Some(file_minor), Some(current_minor)) = (rest.first(), current_rest.first()) {
                    if file_minor > current_minor {
                        return Err(mismatch());
                    }
                }
            }
            Ok(())
        }
        _ => Err(mismatch()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::Catalog;
    use crate::estimate::EstimateRequest;
    use crate::overrides::{NoOverrides, PriceLookup};
    use crate::validation::Inputs;
    use std::env::temp_dir;

    fn temp_path(name: &str, ext: &str) -> PathBuf {
        temp_dir().join(format!("tally_test_{}_{}.{}", name, std::process::id(), ext))
    }

    #[test]
    fn test_lock_path_generation() {
        assert_eq!(
            lock_path_for(Path::new("/path/to/project.tly")),
            Path::new("/path/to/project.tly.lock")
        );
        assert_eq!(lock_path_for(Path::new("/path/to/project")), Path::new("/path/to/project.lock"));
    }

    #[test]
    fn test_project_roundtrip() {
        let path = temp_path("roundtrip", "tly");
        let catalog = Catalog::builtin().unwrap();
        let mut project = Project::new("Smith house", "Ana Smith", "J. Builder");
        let request = EstimateRequest::new("concrete", Inputs::new().with("area", 50.0));
        project.add_estimate(&catalog, "Slab", request, &NoOverrides).unwrap();

        save_project(&project, &path).unwrap();
        assert!(!suffixed(&path, "tmp").exists());

        let loaded = load_project(&path).unwrap();
        assert_eq!(loaded.meta.name, "Smith house");
        assert_eq!(loaded.item_count(), 1);

        let _ = fs::remove_file(&path);
    }

    #[test]
    fn test_user_settings_roundtrip() {
        let path = temp_path("settings", "json");
        let mut settings = UserSettings::new("ana@example.com");
        settings.price_overrides.set("concrete", 0, 32.0).unwrap();
        settings.default_complexity = "medium".into();

        save_user_settings(&settings, &path).unwrap();
        let loaded = load_user_settings(&path).unwrap();
        assert_eq!(loaded.user_id, "ana@example.com");
        assert_eq!(loaded.default_complexity, "medium");
        assert_eq!(loaded.price_overrides.unit_price("concrete", 0), Some(32.0));

        let _ = fs::remove_file(&path);
    }

    #[test]
    fn test_missing_settings_fall_back_to_defaults() {
        let path = temp_path("absent", "json");
        let settings = load_user_settings_or_default(&path, "new@example.com").unwrap();
        assert_eq!(settings.user_id, "new@example.com");
        assert!(settings.price_overrides.is_empty());
        assert_eq!(settings.default_overhead_percentage, 20.0);
    }

    #[test]
    fn test_invalid_json_is_serialization_error() {
        let path = temp_path("garbage", "json");
        fs::write(&path, "{ not json").unwrap();
        let err = load_user_settings(&path).unwrap_err();
        assert_eq!(err.error_code(), "SERIALIZATION_ERROR");
        let _ = fs::remove_file(&path);
    }

    #[test]
    fn test_file_lock_acquire_and_release() {
        let path = temp_path("lock", "tly");
        File::create(&path).unwrap();

        let lock = FileLock::acquire(&path, "ana@example.com").unwrap();
        assert_eq!(lock.info.user_id, "ana@example.com");
        assert_eq!(lock.target(), path.as_path());
        let lock_path = lock_path_for(&path);
        assert!(lock_path.exists());

        drop(lock);
        assert!(!lock_path.exists());

        let _ = fs::remove_file(&path);
    }

    #[test]
    fn test_old_lock_is_stale() {
        let mut info = LockInfo::new("someone");
        assert!(!info.is_stale());
        info.locked_at = Utc::now() - chrono::Duration::hours(STALE_LOCK_HOURS + 1);
        assert!(info.is_stale());
    }

    #[test]
    fn test_stale_lock_is_taken_over() {
        let path = temp_path("stale", "tly");
        let mut old = LockInfo::new("gone@example.com");
        old.locked_at = Utc::now() - chrono::Duration::hours(48);
        fs::write(lock_path_for(&path), serde_json::to_string(&old).unwrap()).unwrap();

        assert!(FileLock::check(&path).is_none());
        let lock = FileLock::acquire(&path, "ana@example.com").unwrap();
        assert_eq!(lock.info.user_id, "ana@example.com");
        drop(lock);
    }

    #[test]
    fn test_version_validation() {
        assert!(validate_version(SCHEMA_VERSION).is_ok());
        assert!(validate_version("0.1.5").is_ok());
        assert!(validate_version("0.0.9").is_ok());
        assert!(validate_version("1.0.0").is_err());
        assert!(validate_version("0.2.0").is_err());
        assert!(validate_version("garbage").is_err());
    }

    #[test]
    fn test_load_with_lock_check() {
        let path = temp_path("lock_check", "tly");
        save_project(&Project::new("Test", "Client", "Author"), &path).unwrap();

        let (loaded, holder) = load_project_with_lock_check(&path).unwrap();
        assert_eq!(loaded.meta.client, "Client");
        assert!(holder.is_none());

        let _ = fs::remove_file(&path);
    }
}
