use std::path::{Path, PathBuf};

use tempfile::tempdir;
use themed_comments::{CliArgs, EmbedSnapshot, Mode, Theme, WidgetConfig, render_embed};

fn write_config(dir: &Path) -> PathBuf {
    let path = dir.join("giscus.json");
    std::fs::write(
        &path,
        r#"{
  "repo": "binghuis/blog",
  "repo_id": "R_kgDOMsge8Q",
  "category": "Announcements",
  "category_id": "DIC_kwDOMsge8c4CiTTf",
  "mapping": "specific",
  "term": "Welcome to Binghui's blog!",
  "reactions_enabled": true,
  "emit_metadata": false,
  "input_position": "top",
  "lang": "zh-CN",
  "loading": "lazy"
}"#,
    )
    .unwrap();
    path
}

fn args(config: PathBuf, out: PathBuf) -> CliArgs {
    CliArgs {
        config,
        out: Some(out),
        mode: Mode::Page,
        theme_attribute: "data-theme".to_string(),
        initial_theme: None,
        title: "Comments".to_string(),
        watch: false,
    }
}

fn snapshot(path: &Path) -> EmbedSnapshot {
    EmbedSnapshot::parse(&std::fs::read_to_string(path).unwrap()).unwrap()
}

#[tokio::test]
async fn renders_page_with_static_config() {
    let tmp = tempdir().unwrap();
    let config = write_config(tmp.path());
    let out = tmp.path().join("site/comments.html");

    let summary = themed_comments::run_with_input(args(config, out.clone()), &b""[..])
        .await
        .unwrap();
    assert_eq!(summary.writes, 1);
    assert_eq!(summary.renders, 1);
    assert_eq!(summary.theme, Theme::Light);

    let html = std::fs::read_to_string(&out).unwrap();
    assert!(html.starts_with("<!DOCTYPE html>"));
    assert!(html.contains(r#"<html lang="zh-CN" data-theme="light">"#));
    assert!(html.contains("MutationObserver"));

    let embed = snapshot(&out);
    assert_eq!(embed.container_id.as_deref(), Some("comments"));
    assert_eq!(embed.get("repo"), Some("binghuis/blog"));
    assert_eq!(embed.get("repo-id"), Some("R_kgDOMsge8Q"));
    assert_eq!(embed.get("category-id"), Some("DIC_kwDOMsge8c4CiTTf"));
    assert_eq!(embed.get("mapping"), Some("specific"));
    assert_eq!(embed.get("term"), Some("Welcome to Binghui's blog!"));
    assert_eq!(embed.get("reactions-enabled"), Some("1"));
    assert_eq!(embed.get("emit-metadata"), Some("0"));
    assert_eq!(embed.get("input-position"), Some("top"));
    assert_eq!(embed.get("lang"), Some("zh-CN"));
    assert_eq!(embed.get("loading"), Some("lazy"));
    assert_eq!(embed.theme(), Some("light"));
}

#[tokio::test]
async fn fragment_mode_uses_initial_theme() {
    let tmp = tempdir().unwrap();
    let config = write_config(tmp.path());
    let out = tmp.path().join("fragment.html");

    let mut a = args(config.clone(), out.clone());
    a.mode = Mode::Fragment;
    a.initial_theme = Some("dark".to_string());
    themed_comments::run_with_input(a, &b""[..]).await.unwrap();

    let html = std::fs::read_to_string(&out).unwrap();
    assert!(!html.contains("<!DOCTYPE"));
    assert_eq!(snapshot(&out).theme(), Some("dark"));

    // The file carries exactly the markup the widget rendered.
    let widget_config = WidgetConfig::load(&config).unwrap();
    let embed = render_embed(&widget_config, &Theme::Dark).into_string();
    assert_eq!(html, format!(r#"<div class="tc-comments">{embed}</div>"#));
}

#[tokio::test]
async fn watch_rewrites_output_only_on_theme_change() {
    let tmp = tempdir().unwrap();
    let config = write_config(tmp.path());
    let out = tmp.path().join("comments.html");

    let mut a = args(config, out.clone());
    a.watch = true;
    let input = b"# host page mutations
set data-theme dark
set data-theme dark
set class wide
child body data-theme light
bogus line
remove data-theme
set data-theme dark
quit
set data-theme light
";
    let summary = themed_comments::run_with_input(a, &input[..]).await.unwrap();

    // light (mount) -> dark -> light (removed) -> dark
    assert_eq!(summary.renders, 4);
    assert_eq!(summary.writes, 4);
    assert_eq!(summary.theme, Theme::Dark);
    assert_eq!(snapshot(&out).theme(), Some("dark"));
    let html = std::fs::read_to_string(&out).unwrap();
    assert!(html.contains(r#"<html lang="zh-CN" data-theme="dark">"#));
}

#[tokio::test]
async fn custom_attribute_name_is_watched() {
    let tmp = tempdir().unwrap();
    let config = write_config(tmp.path());
    let out = tmp.path().join("comments.html");

    let mut a = args(config, out.clone());
    a.theme_attribute = "data-mode".to_string();
    a.watch = true;
    let input = b"set data-theme dark\nset data-mode dark\n";
    let summary = themed_comments::run_with_input(a, &input[..]).await.unwrap();
    assert_eq!(summary.renders, 2);
    assert_eq!(summary.theme, Theme::Dark);

    let html = std::fs::read_to_string(&out).unwrap();
    assert!(html.contains(r#":root[data-mode="dark"]"#));
    assert!(html.contains(r#"<html lang="zh-CN" data-mode="dark">"#));
    assert!(!html.contains(r#"<html lang="zh-CN" data-theme"#));
}

#[tokio::test]
async fn rejects_invalid_inputs() {
    let tmp = tempdir().unwrap();
    let config = write_config(tmp.path());
    let out = tmp.path().join("comments.html");

    let mut a = args(config, out.clone());
    a.theme_attribute = "Data Theme".to_string();
    assert!(themed_comments::run_with_input(a, &b""[..]).await.is_err());

    let bad = tmp.path().join("bad.json");
    std::fs::write(&bad, r#"{"repo": "nope", "repo_id": "R", "category_id": "C"}"#).unwrap();
    let err = themed_comments::run_with_input(args(bad, out.clone()), &b""[..])
        .await
        .unwrap_err();
    assert!(format!("{err:#}").contains("owner/name"));
    assert!(!out.exists());
}
