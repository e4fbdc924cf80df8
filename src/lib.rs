mod builtin;
mod cli;
pub mod config;
pub mod dom;
mod html;
mod inspect;
pub mod observe;
pub mod theme;
mod watch;
pub mod widget;

use std::cell::RefCell;
use std::path::{Path, PathBuf};
use std::rc::Rc;

use anyhow::Context as _;
use tokio::io::{AsyncBufRead, AsyncBufReadExt as _};

pub use cli::{Args as CliArgs, Mode};
pub use config::WidgetConfig;
pub use dom::{Document, Element, MutationRecord, ObserveOptions};
pub use html::{PageContext, build_fragment, build_page, render_embed};
pub use inspect::EmbedSnapshot;
pub use observe::{AttributeSource, Subscription};
pub use theme::Theme;
pub use widget::{RenderedEmbed, ThemeSyncedCommentWidget};

/// Outcome of a [`run_with_input`] call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunSummary {
    pub out: PathBuf,
    pub renders: usize,
    pub writes: usize,
    pub theme: Theme,
}

pub async fn run(args: CliArgs) -> anyhow::Result<()> {
    let stdin = tokio::io::BufReader::new(tokio::io::stdin());
    let summary = run_with_input(args, stdin).await?;
    tracing::info!(
        out = %summary.out.display(),
        renders = summary.renders,
        writes = summary.writes,
        theme = %summary.theme,
        "done"
    );
    Ok(())
}

/// Renders the widget once and, with `--watch`, keeps applying mutation
/// commands read from `input` until `quit` or end of input.
pub async fn run_with_input<R>(args: CliArgs, input: R) -> anyhow::Result<RunSummary>
where
    R: AsyncBufRead + Unpin,
{
    html::check_attribute_name(&args.theme_attribute)?;
    let config = Rc::new(WidgetConfig::load(&args.config)?);
    let out = args
        .out
        .clone()
        .unwrap_or_else(|| PathBuf::from("comments.html"));

    let document = Document::new();
    let root = document.document_element()?;
    if let Some(initial) = &args.initial_theme {
        root.set_attribute(&args.theme_attribute, initial);
    }

    let latest: Rc<RefCell<Option<RenderedEmbed>>> = Rc::new(RefCell::new(None));
    let sink = latest.clone();
    let widget = ThemeSyncedCommentWidget::mount_on(
        &document,
        &args.theme_attribute,
        config.clone(),
        move |rendered| *sink.borrow_mut() = Some(rendered.clone()),
    )?;

    let mut writes = 0usize;
    let mut written_revision = 0usize;
    let initial = latest.borrow().clone();
    if let Some(rendered) = initial {
        write_output(&args, &config, &out, &rendered).await?;
        writes += 1;
        written_revision = rendered.revision;
    }

    if args.watch {
        tracing::info!(attribute = %args.theme_attribute, "watching for theme changes");
        let mut lines = input.lines();
        while let Some(line) = lines.next_line().await.context("read watch input")? {
            let cmd = match watch::parse_line(&line) {
                Ok(Some(cmd)) => cmd,
                Ok(None) => continue,
                Err(err) => {
                    tracing::warn!(line = %line.trim(), error = %err, "ignoring watch line");
                    continue;
                }
            };
            if cmd == watch::Command::Quit {
                break;
            }
            watch::apply(&root, &cmd);
            let batches = document.flush();
            tracing::debug!(?cmd, batches, "applied mutation");

            let pending = latest
                .borrow()
                .clone()
                .filter(|rendered| rendered.revision > written_revision);
            if let Some(rendered) = pending {
                write_output(&args, &config, &out, &rendered).await?;
                writes += 1;
                written_revision = rendered.revision;
            }
        }
    }

    let summary = RunSummary {
        out,
        renders: widget.render_count(),
        writes,
        theme: widget.theme(),
    };
    widget.unmount();
    Ok(summary)
}

async fn write_output(
    args: &CliArgs,
    config: &WidgetConfig,
    out: &Path,
    rendered: &RenderedEmbed,
) -> anyhow::Result<()> {
    let html = match args.mode {
        Mode::Page => build_page(
            &PageContext {
                title: &args.title,
                theme_attribute: &args.theme_attribute,
            },
            config,
            &rendered.theme,
            &rendered.markup,
        )?,
        Mode::Fragment => build_fragment(&rendered.markup),
    };
    verify_embed(&html, config, &rendered.theme)?;

    if let Some(parent) = out.parent() {
        if !parent.as_os_str().is_empty() {
            tokio::fs::create_dir_all(parent)
                .await
                .with_context(|| format!("create {}", parent.display()))?;
        }
    }
    tokio::fs::write(out, html)
        .await
        .with_context(|| format!("write {}", out.display()))?;
    tracing::info!(
        path = %out.display(),
        revision = rendered.revision,
        theme = %rendered.theme,
        "wrote comments"
    );
    Ok(())
}

fn verify_embed(html: &str, config: &WidgetConfig, theme: &Theme) -> anyhow::Result<()> {
    let snapshot = EmbedSnapshot::parse(html).context("verify rendered embed")?;
    if snapshot.script_src != config.client_url.as_str() {
        anyhow::bail!(
            "rendered embed loads {} instead of {}",
            snapshot.script_src,
            config.client_url
        );
    }
    if snapshot.container_id.as_deref() != Some(config.element_id.as_str()) {
        anyhow::bail!(
            "rendered embed container has id {:?}, expected {}",
            snapshot.container_id,
            config.element_id
        );
    }
    if snapshot.get("repo") != Some(config.repo.as_str()) {
        anyhow::bail!("rendered embed is missing data-repo={}", config.repo);
    }
    if snapshot.theme() != Some(theme.as_str()) {
        anyhow::bail!(
            "rendered embed has theme {:?}, expected {}",
            snapshot.theme(),
            theme
        );
    }
    Ok(())
}
