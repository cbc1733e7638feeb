use penstroke_api_types::{DraftField, DraftSchema};
use reqwest::Url;
use serde::Serialize;

use crate::client::CliError;
use crate::composer::Composer;
use crate::notify::Notification;

pub fn print_json<T: Serialize>(value: &T) -> Result<(), CliError> {
    let out = serde_json::to_string_pretty(value)
        .map_err(|e| CliError::Server(format!("failed to render output: {e}")))?;
    println!("{out}");
    Ok(())
}

pub fn print_schema(schema: &DraftSchema) -> Result<(), CliError> {
    let out = toml::to_string(schema)
        .map_err(|e| CliError::InvalidInput(format!("failed to render schema: {e}")))?;
    print!("{out}");
    Ok(())
}

/// Field errors, one `• message` line per error under its field name.
pub fn print_field_errors(composer: &Composer) {
    for field in DraftField::ALL {
        let lines = composer.error_lines(field);
        if lines.is_empty() {
            continue;
        }
        eprintln!("{field}:");
        for line in lines {
            eprintln!("  {line}");
        }
    }
}

/// Print the notification; a success also prints where activating it leads.
pub fn print_notification(notification: &Notification, base: &Url) {
    if notification.is_success() {
        println!("{}", notification.message);
    } else {
        eprintln!("{}", notification.message);
    }

    if let Some(action) = notification.activate() {
        match base.join(action.route().trim_start_matches('/')) {
            Ok(url) => println!("{url}"),
            Err(_) => println!("{}", action.route()),
        }
    }
}
