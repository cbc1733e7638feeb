use serial_test::serial;

use super::*;

#[test]
fn cli_overrides_take_highest_precedence() {
    let mut raw = RawSettings::default();
    raw.server.port = Some(4000);
    raw.logging.level = Some("info".to_string());

    let overrides = ServeOverrides {
        server_port: Some(4321),
        log_level: Some("debug".to_string()),
        ..Default::default()
    };

    raw.apply_serve_overrides(&overrides);
    let settings = Settings::from_raw(raw).expect("valid settings");

    assert_eq!(settings.server.addr.port(), 4321);
    assert_eq!(settings.logging.level, LevelFilter::DEBUG);
}

#[test]
fn cli_json_logging_enforces_format() {
    let mut raw = RawSettings::default();
    let overrides = ServeOverrides {
        log_json: Some(true),
        ..Default::default()
    };

    raw.apply_serve_overrides(&overrides);
    let settings = Settings::from_raw(raw).expect("valid settings");

    assert!(matches!(settings.logging.format, LogFormat::Json));
}

#[test]
fn defaults_are_valid() {
    let settings = Settings::from_raw(RawSettings::default()).expect("valid settings");

    assert_eq!(settings.server.addr.port(), DEFAULT_PORT);
    assert_eq!(settings.site.title, DEFAULT_SITE_TITLE);
    assert!(settings.admin.key.is_none());
    assert!(settings.database.url.is_none());
    assert_eq!(settings.schema, DraftSchema::default());
}

#[test]
fn zero_port_is_rejected() {
    let mut raw = RawSettings::default();
    raw.server.port = Some(0);

    let err = Settings::from_raw(raw).expect_err("port zero");
    assert!(matches!(
        err,
        LoadError::Invalid {
            key: "server.port",
            ..
        }
    ));
}

#[test]
fn blank_admin_key_disables_creation() {
    let mut raw = RawSettings::default();
    raw.admin.key = Some("   ".to_string());

    let settings = Settings::from_raw(raw).expect("valid settings");
    assert!(settings.admin.key.is_none());
}

#[test]
fn admin_key_is_redacted_in_debug_output() {
    let mut raw = RawSettings::default();
    raw.admin.key = Some("hunter2".to_string());

    let settings = Settings::from_raw(raw).expect("valid settings");
    let rendered = format!("{settings:?}");
    assert!(!rendered.contains("hunter2"));
    assert!(rendered.contains("<redacted>"));
}

#[test]
fn schema_override_replaces_only_named_field() {
    let mut raw = RawSettings::default();
    raw.schema.title = Some(RawFieldConstraint {
        min_len: Some(3),
        max_len: Some(40),
        trim: Some(true),
        ..Default::default()
    });

    let settings = Settings::from_raw(raw).expect("valid settings");
    let title = settings
        .schema
        .constraint(DraftField::Title)
        .expect("title constraint");

    assert!(title.required);
    assert!(title.trim);
    assert_eq!(title.min_len, Some(3));
    assert_eq!(title.max_len, Some(40));
    assert_eq!(
        settings.schema.constraint(DraftField::Preview),
        DraftSchema::default().constraint(DraftField::Preview)
    );
}

#[test]
fn inverted_schema_bounds_are_rejected() {
    let mut raw = RawSettings::default();
    raw.schema.content = Some(RawFieldConstraint {
        min_len: Some(10),
        max_len: Some(5),
        ..Default::default()
    });

    let err = Settings::from_raw(raw).expect_err("inverted bounds");
    assert!(matches!(err, LoadError::Invalid { key: "schema", .. }));
}

#[test]
fn default_to_serve_command() {
    let args = CliArgs::parse_from(["penstroke"]);
    let command = args
        .command
        .unwrap_or(Command::Serve(Box::<ServeArgs>::default()));
    assert!(matches!(command, Command::Serve(_)));
}

#[test]
fn parse_serve_arguments() {
    let args = CliArgs::parse_from([
        "penstroke",
        "serve",
        "--database-url",
        "postgres://example",
        "--site-title",
        "turker.dev",
    ]);

    match args.command.expect("serve command") {
        Command::Serve(serve) => {
            assert_eq!(
                serve.overrides.database_url.as_deref(),
                Some("postgres://example")
            );
            assert_eq!(serve.overrides.site_title.as_deref(), Some("turker.dev"));
        }
    }
}

#[test]
#[serial]
fn environment_layer_is_applied() {
    // SAFETY: serialized with every other test that touches the environment.
    unsafe {
        std::env::set_var("PENSTROKE__SITE__TITLE", "from-env");
        std::env::set_var("PENSTROKE__ADMIN__KEY", "env-key");
    }

    let settings = load(&CliArgs::parse_from(["penstroke"]));

    unsafe {
        std::env::remove_var("PENSTROKE__SITE__TITLE");
        std::env::remove_var("PENSTROKE__ADMIN__KEY");
    }

    let settings = settings.expect("valid settings");
    assert_eq!(settings.site.title, "from-env");
    assert_eq!(settings.admin.key.as_deref(), Some("env-key"));
}

#[test]
#[serial]
fn cli_beats_environment() {
    unsafe {
        std::env::set_var("PENSTROKE__SITE__TITLE", "from-env");
    }

    let settings = load(&CliArgs::parse_from([
        "penstroke",
        "serve",
        "--site-title",
        "from-cli",
    ]));

    unsafe {
        std::env::remove_var("PENSTROKE__SITE__TITLE");
    }

    assert_eq!(settings.expect("valid settings").site.title, "from-cli");
}
