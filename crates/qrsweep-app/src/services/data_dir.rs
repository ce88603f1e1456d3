// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Platform-aware data directory resolution.

use std::ffi::OsString;
use std::path::PathBuf;

const APP_DIR: &str = "qrsweep";

/// Return the application data directory. It is not created here.
pub fn data_dir() -> PathBuf {
    resolve(std::env::var_os("XDG_DATA_HOME"), std::env::var_os("HOME"))
}

/// XDG data dir, then `~/.local/share`, then `/tmp` as a last resort.
fn resolve(xdg_data_home: Option<OsString>, home: Option<OsString>) -> PathBuf {
    let base = match (xdg_data_home, home) {
        (Some(xdg), _) if !xdg.is_empty() => PathBuf::from(xdg),
        (_, Some(home)) if !home.is_empty() => PathBuf::from(home).join(".local").join("share"),
        _ => PathBuf::from("/tmp"),
    };
    base.join(APP_DIR)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn xdg_wins_over_home() {
        let dir = resolve(Some("/xdg".into()), Some("/home/ada".into()));
        assert_eq!(dir, PathBuf::from("/xdg/qrsweep"));
    }

    #[test]
    fn home_fallback() {
        let dir = resolve(None, Some("/home/ada".into()));
        assert_eq!(dir, PathBuf::from("/home/ada/.local/share/qrsweep"));
    }

    #[test]
    fn empty_xdg_is_ignored() {
        let dir = resolve(Some(OsString::new()), Some("/home/ada".into()));
        assert_eq!(dir, PathBuf::from("/home/ada/.local/share/qrsweep"));
    }

    #[test]
    fn last_resort_is_tmp() {
        assert_eq!(resolve(None, None), PathBuf::from("/tmp/qrsweep"));
    }
}
