//! Helpers for tests that touch process-wide environment variables.

use std::path::Path;
use std::sync::{Mutex, MutexGuard};

static ENV_LOCK: Mutex<()> = Mutex::new(());

/// Serialize tests that read or write environment variables.
pub fn lock_env() -> MutexGuard<'static, ()> {
    ENV_LOCK.lock().unwrap_or_else(|e| e.into_inner())
}

/// Restores the previous values of the overridden variables on drop.
struct RestoreEnv(Vec<(&'static str, Option<String>)>);

impl Drop for RestoreEnv {
    fn drop(&mut self) {
        for (name, value) in &self.0 {
            match value {
                Some(v) => unsafe { std::env::set_var(name, v) },
                None => unsafe { std::env::remove_var(name) },
            }
        }
    }
}

/// Run `f` with `XDG_CONFIG_HOME` and `XDG_DATA_HOME` pointing into a fresh
/// temp dir. `f` receives the temp root. Callers must hold [`lock_env`].
pub fn with_isolated_dirs(f: impl FnOnce(&Path)) {
    let tmp = tempfile::TempDir::new().unwrap();
    let _restore = RestoreEnv(
        ["XDG_CONFIG_HOME", "XDG_DATA_HOME"]
            .into_iter()
            .map(|name| (name, std::env::var(name).ok()))
            .collect(),
    );
    unsafe { std::env::set_var("XDG_CONFIG_HOME", tmp.path().join("config")) };
    unsafe { std::env::set_var("XDG_DATA_HOME", tmp.path().join("data")) };

    f(tmp.path());
}
