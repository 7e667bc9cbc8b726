//! Environment variable layering, sandboxed with `figment::Jail`.

use figment::Jail;
use trb_config::TribunalConfig;

#[test]
fn env_overrides_nested_fields() {
    Jail::expect_with(|jail| {
        jail.set_env("TRIBUNAL_DATABASE__PATH", ":memory:");
        jail.set_env("TRIBUNAL_DATABASE__RETRY_ATTEMPTS", "7");
        jail.set_env("TRIBUNAL_TRAIL__ENABLED", "true");
        jail.set_env("TRIBUNAL_GENERAL__ACTOR_ID", "mem-a3f8b2c1");

        let config = TribunalConfig::load().expect("config loads");
        assert!(config.database.is_in_memory());
        assert_eq!(config.database.retry_attempts, 7);
        assert!(config.trail.enabled);
        assert_eq!(config.general.actor(), Some("mem-a3f8b2c1"));
        Ok(())
    });
}

#[test]
fn env_beats_project_toml() {
    Jail::expect_with(|jail| {
        jail.create_dir(".tribunal")?;
        jail.create_file(
            ".tribunal/config.toml",
            r#"
[database]
path = "from-toml.db"
"#,
        )?;
        jail.set_env("TRIBUNAL_DATABASE__PATH", "from-env.db");

        let config = TribunalConfig::load().expect("config loads");
        assert_eq!(config.database.path, "from-env.db");
        Ok(())
    });
}

#[test]
fn invalid_env_value_is_rejected() {
    Jail::expect_with(|jail| {
        jail.set_env("TRIBUNAL_DATABASE__RETRY_ATTEMPTS", "0");
        assert!(TribunalConfig::load().is_err());
        Ok(())
    });
}
