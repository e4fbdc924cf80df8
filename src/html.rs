use maud::{DOCTYPE, Markup, PreEscaped, html};

use crate::builtin;
use crate::config::WidgetConfig;
use crate::theme::Theme;

pub struct PageContext<'a> {
    pub title: &'a str,
    pub theme_attribute: &'a str,
}

/// The giscus container plus its loader script. The theme is the only value
/// that varies between renders.
pub fn render_embed(config: &WidgetConfig, theme: &Theme) -> Markup {
    html! {
        div id=(config.element_id) class="giscus" {}
        script
            src=(config.client_url.as_str())
            data-repo=(config.repo)
            data-repo-id=(config.repo_id)
            data-category=[config.category.as_deref()]
            data-category-id=(config.category_id)
            data-mapping=(config.mapping.as_str())
            data-term=[config.term.as_deref()]
            data-strict=(flag(config.strict))
            data-reactions-enabled=(flag(config.reactions_enabled))
            data-emit-metadata=(flag(config.emit_metadata))
            data-input-position=(config.input_position.as_str())
            data-theme=(theme.as_str())
            data-lang=(config.lang)
            data-loading=(config.loading.as_str())
            crossorigin="anonymous"
            async {}
    }
}

pub fn build_fragment(embed: &str) -> String {
    html! {
        div class="tc-comments" {
            (PreEscaped(embed))
        }
    }
    .into_string()
}

/// Full page around an already rendered embed. The theme attribute is written
/// on `<html>` so the served markup agrees with the embed before any script
/// runs.
pub fn build_page(
    ctx: &PageContext<'_>,
    config: &WidgetConfig,
    theme: &Theme,
    embed: &str,
) -> anyhow::Result<String> {
    check_attribute_name(ctx.theme_attribute)?;
    let css = builtin::page_css(ctx.theme_attribute);
    let init = builtin::theme_init_script(ctx.theme_attribute, theme.as_str());
    let sync = builtin::theme_sync_script(ctx.theme_attribute, &widget_origin(config));

    let document: Markup = html! {
        head {
            meta charset="utf-8";
            meta name="viewport" content="width=device-width, initial-scale=1";
            meta name="color-scheme" content="light dark";
            title { (ctx.title) }
            script { (PreEscaped(init)) }
            style { (PreEscaped(css)) }
        }
        body class="tc" {
            header class="tc-topbar" {
                div class="tc-container tc-topbar-inner" {
                    h1 { (ctx.title) }
                    button type="button" id="tc-theme-toggle" class="tc-btn" { "Theme" }
                }
            }
            main class="tc-container tc-main" {
                section class="tc-comments" {
                    (PreEscaped(embed))
                }
            }
            footer class="tc-footer" {
                div class="tc-container" {
                    "Comments powered by giscus"
                }
            }
            script { (PreEscaped(sync)) }
        }
    };

    // maud only takes literal attribute names, so the root tag is built by hand.
    let root_open = format!(
        r#"<html lang="{}" {}="{}">"#,
        escape(&config.lang),
        ctx.theme_attribute,
        escape(theme.as_str())
    );
    let markup: Markup = html! {
        (DOCTYPE)
        (PreEscaped(root_open))
        (document)
        (PreEscaped("</html>"))
    };
    Ok(markup.into_string())
}

/// Accepts lowercase attribute names such as `data-theme`.
pub fn check_attribute_name(name: &str) -> anyhow::Result<()> {
    let re = regex::Regex::new(r"^[a-z][a-z0-9-]*$").expect("attribute name regex");
    if !re.is_match(name) {
        anyhow::bail!("invalid theme attribute name {:?}", name);
    }
    Ok(())
}

fn escape(value: &str) -> String {
    html! { (value) }.into_string()
}

fn flag(on: bool) -> &'static str {
    if on { "1" } else { "0" }
}

fn widget_origin(config: &WidgetConfig) -> String {
    config.client_url.origin().ascii_serialization()
}
