use super::load::{default_config_path, resolve_config_path};
use super::schema::*;
use crate::audio::PlayMode;
use crate::error::SettingsError;
use std::sync::{Mutex, OnceLock};

static ENV_LOCK: OnceLock<Mutex<()>> = OnceLock::new();

fn env_lock() -> std::sync::MutexGuard<'static, ()> {
    ENV_LOCK
        .get_or_init(|| Mutex::new(()))
        .lock()
        .unwrap_or_else(|poisoned| poisoned.into_inner())
}

struct EnvGuard {
    key: &'static str,
    old: Option<std::ffi::OsString>,
}

impl EnvGuard {
    fn set(key: &'static str, val: &str) -> Self {
        let old = std::env::var_os(key);
        unsafe {
            std::env::set_var(key, val);
        }
        Self { key, old }
    }

    fn remove(key: &'static str) -> Self {
        let old = std::env::var_os(key);
        unsafe {
            std::env::remove_var(key);
        }
        Self { key, old }
    }
}

impl Drop for EnvGuard {
    fn drop(&mut self) {
        match self.old.take() {
            Some(v) => unsafe {
                std::env::set_var(self.key, v);
            },
            None => unsafe {
                std::env::remove_var(self.key);
            },
        }
    }
}

#[test]
fn resolve_config_path_prefers_lyra_config_path() {
    let _lock = env_lock();
    let _g1 = EnvGuard::set("LYRA_CONFIG_PATH", "/tmp/lyra-test-config.toml");
    assert_eq!(
        resolve_config_path().unwrap(),
        std::path::PathBuf::from("/tmp/lyra-test-config.toml")
    );
}

#[test]
fn default_config_path_prefers_xdg_config_home() {
    let _lock = env_lock();
    let _g1 = EnvGuard::set("XDG_CONFIG_HOME", "/tmp/xdg-config-home");
    let _g2 = EnvGuard::set("HOME", "/tmp/home-should-not-win");

    assert_eq!(
        default_config_path().unwrap(),
        std::path::PathBuf::from("/tmp/xdg-config-home")
            .join("lyra")
            .join("config.toml")
    );
}

#[test]
fn default_config_path_falls_back_to_home_dot_config() {
    let _lock = env_lock();
    let _g1 = EnvGuard::remove("XDG_CONFIG_HOME");
    let _g2 = EnvGuard::set("HOME", "/tmp/home-dir");

    assert_eq!(
        default_config_path().unwrap(),
        std::path::PathBuf::from("/tmp/home-dir")
            .join(".config")
            .join("lyra")
            .join("config.toml")
    );
}

#[test]
fn defaults_match_the_documented_values() {
    let s = Settings::default();
    assert_eq!(s.playback.play_mode, PlayModeSetting::ListRepeat);
    assert_eq!(s.playback.volume, 80);
    assert_eq!(s.display, DisplaySettings::default());
    assert!(s.display.show_artist && s.display.show_file_type);
    assert_eq!(s.lyrics.scroll_quiet_ms, 1500);
    assert_eq!(s.lyrics.browsing_hold_ms, 1000);
    assert_eq!(s.controls.scrub_seconds, 5);
    assert!(s.validate().is_ok());
}

#[test]
fn settings_load_from_config_file_and_parse_aliases() {
    let _lock = env_lock();

    let dir = tempfile::tempdir().unwrap();
    let cfg_path = dir.path().join("config.toml");
    std::fs::write(
        &cfg_path,
        r#"
[playback]
playMode = "repeat-one"
volume = 35

[display]
showAlbum = false
show_bitrate = false

[lyrics]
scroll_quiet_ms = 2000
browsing_hold_ms = 2500
lyrics_dir = "/srv/lyrics"
placeholder_text = "nothing here"

[audio]
quit_fade_out_ms = 123

[controls]
scrub_seconds = 9
volume_step = 10

[ui]
header_text = "hello"

[library]
extensions = ["mp3"]
recursive = false
include_hidden = false
follow_links = false
"#,
    )
    .unwrap();

    let _g1 = EnvGuard::set("LYRA_CONFIG_PATH", cfg_path.to_str().unwrap());
    let _g2 = EnvGuard::remove("LYRA__PLAYBACK__VOLUME");

    let s = Settings::load().unwrap();
    assert_eq!(s.playback.play_mode, PlayModeSetting::SingleRepeat);
    assert_eq!(s.playback.volume, 35);
    assert!(!s.display.show_album);
    assert!(!s.display.show_bitrate);
    assert!(s.display.show_artist);
    assert_eq!(s.lyrics.scroll_quiet_ms, 2000);
    assert_eq!(s.lyrics.browsing_hold_ms, 2500);
    assert_eq!(
        s.lyrics.lyrics_dir.as_deref(),
        Some(std::path::Path::new("/srv/lyrics"))
    );
    assert_eq!(s.lyrics.placeholder_text, "nothing here");
    assert_eq!(s.audio.quit_fade_out_ms, 123);
    assert_eq!(s.controls.scrub_seconds, 9);
    assert_eq!(s.controls.volume_step, 10);
    assert_eq!(s.ui.header_text, "hello");
    assert_eq!(s.library.extensions, vec!["mp3".to_string()]);
    assert!(!s.library.recursive);
    assert!(!s.library.include_hidden);
    assert!(!s.library.follow_links);
    assert!(s.validate().is_ok());
}

#[test]
fn settings_env_overrides_config_file() {
    let _lock = env_lock();

    let dir = tempfile::tempdir().unwrap();
    let cfg_path = dir.path().join("config.toml");
    std::fs::write(
        &cfg_path,
        r#"
[playback]
volume = 40
"#,
    )
    .unwrap();

    let _g1 = EnvGuard::set("LYRA_CONFIG_PATH", cfg_path.to_str().unwrap());
    let _g2 = EnvGuard::set("LYRA__PLAYBACK__VOLUME", "65");

    let s = Settings::load().unwrap();
    assert_eq!(s.playback.volume, 65);
}

#[test]
fn validate_rejects_out_of_range_values() {
    let mut s = Settings::default();
    s.lyrics.browsing_hold_ms = 500;
    assert!(matches!(s.validate(), Err(SettingsError::Invalid(_))));

    let mut s = Settings::default();
    s.lyrics.browsing_hold_ms = 3001;
    assert!(s.validate().is_err());

    let mut s = Settings::default();
    s.playback.volume = 101;
    assert!(s.validate().is_err());

    let mut s = Settings::default();
    s.lyrics.scroll_quiet_ms = 0;
    assert!(s.validate().is_err());
}

#[test]
fn saved_settings_load_back() {
    let _lock = env_lock();

    let dir = tempfile::tempdir().unwrap();
    let cfg_path = dir.path().join("nested").join("config.toml");

    let mut s = Settings::default();
    s.playback.play_mode = PlayModeSetting::Shuffle;
    s.playback.volume = 12;
    s.display.show_filename = false;
    s.save_to(&cfg_path).unwrap();

    let _g1 = EnvGuard::set("LYRA_CONFIG_PATH", cfg_path.to_str().unwrap());
    let _g2 = EnvGuard::remove("LYRA__PLAYBACK__VOLUME");
    let loaded = Settings::load().unwrap();
    assert_eq!(loaded.playback.play_mode, PlayModeSetting::Shuffle);
    assert_eq!(loaded.playback.volume, 12);
    assert!(!loaded.display.show_filename);
    assert_eq!(loaded.lyrics.lyrics_dir, None);
}

#[test]
fn play_mode_setting_maps_both_ways() {
    for mode in [
        PlayMode::Sequential,
        PlayMode::SingleRepeat,
        PlayMode::ListRepeat,
        PlayMode::Shuffle,
    ] {
        assert_eq!(PlayMode::from(PlayModeSetting::from(mode)), mode);
    }
}
