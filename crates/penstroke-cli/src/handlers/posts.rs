#![deny(clippy::all, clippy::pedantic)]

use std::path::PathBuf;
use std::sync::Arc;

use penstroke_api_types::PostSummaryView;
use reqwest::Method;

use crate::args::{Cli, PostsCmd};
use crate::client::{CliError, Ctx, build_ctx_from_cli, resolve_admin_key};
use crate::composer::{Composer, EditableField};
use crate::io::{load_schema, read_opt_value};
use crate::print::{print_field_errors, print_json, print_notification, print_schema};
use crate::submit::{SubmissionClient, SubmissionOutcome};

pub struct PostCreateInput {
    pub title: Option<String>,
    pub preview: Option<String>,
    pub preview_file: Option<PathBuf>,
    pub content: Option<String>,
    pub content_file: Option<PathBuf>,
    pub schema_file: Option<PathBuf>,
}

pub async fn handle(cli: &Cli, cmd: &PostsCmd) -> Result<(), CliError> {
    match cmd {
        PostsCmd::List => {
            let ctx = build_ctx_from_cli(cli)?;
            list(&ctx).await
        }
        PostsCmd::Create {
            title,
            preview,
            preview_file,
            content,
            content_file,
            schema_file,
        } => {
            let ctx = build_ctx_from_cli(cli)?;
            let key = resolve_admin_key(cli)?;
            let input = PostCreateInput {
                title: title.clone(),
                preview: preview.clone(),
                preview_file: preview_file.clone(),
                content: content.clone(),
                content_file: content_file.clone(),
                schema_file: schema_file.clone(),
            };
            create(ctx, key, input).await
        }
        PostsCmd::Schema { schema_file } => {
            let schema = load_schema(schema_file.as_deref())?;
            print_schema(&schema)
        }
    }
}

pub async fn list(ctx: &Ctx) -> Result<(), CliError> {
    let posts: Vec<PostSummaryView> = ctx.request(Method::GET, "api/posts", None).await?;
    print_json(&posts)
}

/// Fill a composer from the input. Absent fields stay unset.
pub fn compose(key: String, input: PostCreateInput) -> Result<Composer, CliError> {
    let schema = load_schema(input.schema_file.as_deref())?;
    let mut composer = Composer::new(key, schema);

    let updates = [
        (EditableField::Title, input.title),
        (
            EditableField::Preview,
            read_opt_value(input.preview, input.preview_file)?,
        ),
        (
            EditableField::Content,
            read_opt_value(input.content, input.content_file)?,
        ),
    ];
    for (field, value) in updates {
        if let Some(value) = value {
            composer.update_field(field, value);
        }
    }

    Ok(composer)
}

pub async fn create(ctx: Ctx, key: String, input: PostCreateInput) -> Result<(), CliError> {
    let composer = compose(key, input)?;
    if let Some(errors) = composer.errors() {
        print_field_errors(&composer);
        return Err(CliError::InvalidDraft(errors.clone()));
    }

    let base = ctx.base.clone();
    let timeout = ctx.timeout;
    let client = SubmissionClient::with_timeout(Arc::new(ctx), timeout);
    let Some(pending) = client.try_submit(&composer) else {
        return Err(CliError::InvalidInput(
            "draft could not be submitted".to_string(),
        ));
    };

    let outcome = pending.outcome().await;
    print_notification(&outcome.notification(), &base);
    match outcome {
        SubmissionOutcome::Succeeded(_) => Ok(()),
        SubmissionOutcome::Failed(err) => {
            eprintln!("{err}");
            Err(CliError::SubmissionFailed)
        }
    }
}
