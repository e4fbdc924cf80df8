pub const BUILTIN_CSS: &str = include_str!("builtin.css");

const STORAGE_KEY: &str = "tc-theme";

const THEME_INIT_JS: &str = r#"(function () {
  var root = document.documentElement;
  var saved = null;
  try {
    saved = localStorage.getItem(__KEY__);
  } catch (_) {
    saved = null;
  }
  root.setAttribute(__ATTR__, saved === "light" || saved === "dark" ? saved : __THEME__);
})();"#;

const THEME_SYNC_JS: &str = r#"(function () {
  var attr = __ATTR__;
  var origin = __ORIGIN__;
  var storageKey = __KEY__;
  var root = document.documentElement;
  var button = document.getElementById("tc-theme-toggle");
  // Theme last accepted by the giscus iframe; null until it has loaded.
  var sent = null;

  function currentTheme() {
    return root.getAttribute(attr) || "light";
  }

  function updateButton() {
    if (!button) return;
    var next = currentTheme() === "dark" ? "light" : "dark";
    button.textContent = next === "dark" ? "Dark" : "Light";
    button.setAttribute("aria-label", "Switch to " + next + " theme");
    button.setAttribute("title", "Switch to " + next + " theme");
  }

  function forward(theme) {
    var frame = document.querySelector("iframe.giscus-frame");
    if (!frame || !frame.contentWindow) return false;
    frame.contentWindow.postMessage({ giscus: { setConfig: { theme: theme } } }, origin);
    return true;
  }

  function sync() {
    var theme = currentTheme();
    if (theme === sent) return;
    if (forward(theme)) sent = theme;
  }

  window.addEventListener("message", function (event) {
    if (event.origin !== origin) return;
    if (!event.data || typeof event.data !== "object" || !("giscus" in event.data)) return;
    sync();
  });

  new MutationObserver(function () {
    updateButton();
    sync();
  }).observe(root, { attributes: true, attributeFilter: [attr] });

  updateButton();
  sync();

  if (button) {
    button.addEventListener("click", function () {
      var next = currentTheme() === "dark" ? "light" : "dark";
      try {
        localStorage.setItem(storageKey, next);
      } catch (_) {}
      root.setAttribute(attr, next);
    });
  }
})();"#;

/// Page CSS with its theme selectors keyed on `attribute`.
pub fn page_css(attribute: &str) -> String {
    BUILTIN_CSS.replace("data-theme", attribute)
}

/// Runs in `<head>`: restores a saved light/dark choice on the root element,
/// falling back to the server-rendered `theme`.
pub fn theme_init_script(attribute: &str, theme: &str) -> String {
    THEME_INIT_JS
        .replace("__KEY__", &js_string(STORAGE_KEY))
        .replace("__ATTR__", &js_string(attribute))
        .replace("__THEME__", &js_string(theme))
}

/// Browser-side counterpart of the widget: watches `attribute` on the root
/// element and forwards it to the giscus iframe, once the iframe reports in
/// and on every later change.
pub fn theme_sync_script(attribute: &str, widget_origin: &str) -> String {
    THEME_SYNC_JS
        .replace("__KEY__", &js_string(STORAGE_KEY))
        .replace("__ATTR__", &js_string(attribute))
        .replace("__ORIGIN__", &js_string(widget_origin))
}

fn js_string(s: &str) -> String {
    serde_json::Value::from(s).to_string().replace("</", "<\\/")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn css_follows_attribute_name() {
        let css = page_css("data-mode");
        assert!(css.contains(r#":root[data-mode="dark"]"#));
        assert!(!css.contains("data-theme"));
    }

    #[test]
    fn init_restores_saved_theme_before_fallback() {
        let init = theme_init_script("data-theme", "</script><b>");
        assert!(init.contains(r#"localStorage.getItem("tc-theme")"#));
        assert!(init.contains(
            r#"root.setAttribute("data-theme", saved === "light" || saved === "dark" ? saved : "<\/script><b>");"#
        ));
        assert!(!init.contains("__"));
    }

    #[test]
    fn sync_forwards_once_giscus_reports_in() {
        let sync = theme_sync_script("data-theme", "https://giscus.app");
        assert!(sync.contains(r#"var attr = "data-theme";"#));
        assert!(sync.contains(r#"var origin = "https://giscus.app";"#));
        assert!(sync.contains(r#"var storageKey = "tc-theme";"#));
        assert!(sync.contains(r#"window.addEventListener("message""#));
        assert!(sync.contains("if (event.origin !== origin) return;"));
        assert!(sync.contains(r#"!("giscus" in event.data)"#));
        // Only a successful post advances the forwarded theme.
        assert!(sync.contains("if (forward(theme)) sent = theme;"));
        assert!(!sync.contains("__"));
    }
}
