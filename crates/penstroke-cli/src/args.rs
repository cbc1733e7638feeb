//! Command-line surface for `penstroke-cli`.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(name = "penstroke-cli", version, about = "penstroke blog client", long_about = None)]
pub struct Cli {
    /// Site base URL, e.g. <https://example.com>
    #[arg(long, env = "PENSTROKE_SITE_URL")]
    pub site: Option<String>,

    /// Path to file containing the admin key (takes precedence over env)
    #[arg(long, env = "PENSTROKE_ADMIN_KEY_FILE")]
    pub key_file: Option<PathBuf>,

    /// Admin key from env (no CLI flag, to keep it out of shell history)
    #[arg(hide = true, env = "PENSTROKE_ADMIN_KEY")]
    pub admin_key_env: Option<String>,

    /// Seconds to wait for the server before giving up on a request
    #[arg(long = "timeout-seconds", default_value_t = 30)]
    pub timeout_seconds: u64,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Post listing and publishing
    Posts(PostsArgs),
}

#[derive(Parser, Debug)]
pub struct PostsArgs {
    #[command(subcommand)]
    pub action: PostsCmd,
}

#[derive(Subcommand, Debug)]
pub enum PostsCmd {
    /// List posts, newest first
    List,
    /// Compose a post and publish it
    Create {
        #[arg(long)]
        title: Option<String>,
        #[arg(long)]
        preview: Option<String>,
        #[arg(long = "preview-file")]
        preview_file: Option<PathBuf>,
        #[arg(long)]
        content: Option<String>,
        #[arg(long = "content-file")]
        content_file: Option<PathBuf>,
        /// TOML file overriding draft schema constraints
        #[arg(long = "schema-file")]
        schema_file: Option<PathBuf>,
    },
    /// Print the effective draft schema as TOML
    Schema {
        #[arg(long = "schema-file")]
        schema_file: Option<PathBuf>,
    },
}
