//! Helpers shared by the binary's unit tests.

use std::ffi::{OsStr, OsString};
use std::sync::{Mutex, MutexGuard};

static ENV_LOCK: Mutex<()> = Mutex::new(());

/// Serialize tests that read or write process environment variables.
pub fn lock_env() -> MutexGuard<'static, ()> {
    ENV_LOCK.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

/// Clears a set of environment variables and restores them on drop.
///
/// Hold [`lock_env`] for the lifetime of this value.
pub struct ScopedEnv {
    saved: Vec<(String, Option<OsString>)>,
}

impl ScopedEnv {
    pub fn new(keys: &[&str]) -> Self {
        let saved = keys
            .iter()
            .map(|key| {
                let old = std::env::var_os(key);
                unsafe { std::env::remove_var(key) };
                (key.to_string(), old)
            })
            .collect();
        Self { saved }
    }

    pub fn set(&mut self, key: &str, value: impl AsRef<OsStr>) {
        if !self.saved.iter().any(|(k, _)| k == key) {
            self.saved.push((key.to_string(), std::env::var_os(key)));
        }
        unsafe { std::env::set_var(key, value) };
    }
}

impl Drop for ScopedEnv {
    fn drop(&mut self) {
        for (key, old) in self.saved.drain(..).rev() {
            match old {
                Some(value) => unsafe { std::env::set_var(&key, value) },
                None => unsafe { std::env::remove_var(&key) },
            }
        }
    }
}
