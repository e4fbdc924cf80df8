use std::path::PathBuf;

use clap::{Parser, ValueEnum};

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Mode {
    /// Standalone HTML page with theme toggle and sync script.
    Page,
    /// Only the comment embed markup, for inclusion in another page.
    Fragment,
}

#[derive(Debug, Parser)]
#[command(author, version, about)]
pub struct Args {
    /// Widget configuration JSON (repo, repo_id, category_id, mapping, ...).
    #[arg(long)]
    pub config: PathBuf,

    /// Output file. Defaults to `comments.html`.
    #[arg(long)]
    pub out: Option<PathBuf>,

    /// Output mode: `page` (full HTML document) or `fragment` (embed markup only).
    #[arg(long, value_enum, default_value = "page")]
    pub mode: Mode,

    /// Root element attribute that carries the page theme.
    #[arg(long, default_value = "data-theme")]
    pub theme_attribute: String,

    /// Value of the theme attribute when the page loads. Unset means `light`.
    #[arg(long)]
    pub initial_theme: Option<String>,

    /// Page title for `page` mode.
    #[arg(long, default_value = "Comments")]
    pub title: String,

    /// Read attribute mutations from stdin and rewrite the output on every theme change.
    ///
    /// One command per line: `set <attr> <value>`, `remove <attr>`,
    /// `child <tag> <attr> <value>`, or `quit`.
    #[arg(long)]
    pub watch: bool,
}
