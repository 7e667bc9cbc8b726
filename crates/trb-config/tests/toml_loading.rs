//! Integration tests for TOML configuration loading.
//!
//! Uses figment::Jail for safe, sandboxed file and env manipulation.

use figment::{
    Figment, Jail,
    providers::{Format, Serialized, Toml},
};
use pretty_assertions::assert_eq;
use trb_config::TribunalConfig;

#[test]
fn loads_database_config_from_toml() {
    Jail::expect_with(|jail| {
        jail.create_file(
            "config.toml",
            r#"
[database]
path = "/var/lib/tribunal/board.db"
retry_attempts = 6
retry_base_delay_ms = 10
retry_max_delay_ms = 200
"#,
        )?;

        let config: TribunalConfig = Figment::from(Serialized::defaults(TribunalConfig::default()))
            .merge(Toml::file("config.toml"))
            .extract()?;

        assert_eq!(config.database.path, "/var/lib/tribunal/board.db");
        assert_eq!(config.database.retry_attempts, 6);
        assert_eq!(config.database.retry_base_delay_ms, 10);
        assert_eq!(config.database.retry_max_delay_ms, 200);
        assert!(config.validate().is_ok());
        Ok(())
    });
}

#[test]
fn partial_section_keeps_defaults() {
    Jail::expect_with(|jail| {
        jail.create_file(
            "config.toml",
            r#"
[trail]
enabled = true
"#,
        )?;

        let config: TribunalConfig = Figment::from(Serialized::defaults(TribunalConfig::default()))
            .merge(Toml::file("config.toml"))
            .extract()?;

        assert!(config.trail.enabled);
        assert_eq!(config.trail.dir, ".tribunal/trail");
        assert_eq!(config.database.retry_attempts, 4);
        Ok(())
    });
}

#[test]
fn loads_full_config_from_toml() {
    Jail::expect_with(|jail| {
        jail.create_file(
            "config.toml",
            r#"
[database]
path = ":memory:"

[trail]
enabled = true
dir = "audit/trail"

[general]
actor_id = "mem-0badcafe"
default_limit = 50
"#,
        )?;

        let config: TribunalConfig = Figment::from(Serialized::defaults(TribunalConfig::default()))
            .merge(Toml::file("config.toml"))
            .extract()?;

        assert!(config.database.is_in_memory());
        assert_eq!(config.trail.dir, "audit/trail");
        assert_eq!(config.general.actor(), Some("mem-0badcafe"));
        assert_eq!(config.general.default_limit, 50);
        Ok(())
    });
}

#[test]
fn project_file_is_picked_up_by_figment() {
    Jail::expect_with(|jail| {
        jail.create_dir(".tribunal")?;
        jail.create_file(
            ".tribunal/config.toml",
            r#"
[general]
default_limit = 5
"#,
        )?;

        let config = TribunalConfig::load().expect("config loads");
        assert_eq!(config.general.default_limit, 5);
        Ok(())
    });
}
