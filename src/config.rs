use std::path::Path;

use anyhow::Context as _;
use serde::Deserialize;
use url::Url;

pub const DEFAULT_CLIENT_URL: &str = "https://giscus.app/client.js";

/// Static configuration handed to the giscus widget unchanged.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct WidgetConfig {
    pub repo: String,
    pub repo_id: String,
    #[serde(default)]
    pub category: Option<String>,
    pub category_id: String,
    #[serde(default)]
    pub mapping: Mapping,
    #[serde(default)]
    pub term: Option<String>,
    #[serde(default)]
    pub strict: bool,
    #[serde(default = "default_true")]
    pub reactions_enabled: bool,
    #[serde(default)]
    pub emit_metadata: bool,
    #[serde(default)]
    pub input_position: InputPosition,
    #[serde(default = "default_lang")]
    pub lang: String,
    #[serde(default)]
    pub loading: Loading,
    #[serde(default = "default_element_id")]
    pub element_id: String,
    #[serde(default = "default_client_url")]
    pub client_url: Url,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Mapping {
    #[default]
    Pathname,
    Url,
    Title,
    #[serde(rename = "og:title")]
    OgTitle,
    Specific,
    Number,
}

impl Mapping {
    pub fn as_str(self) -> &'static str {
        match self {
            Mapping::Pathname => "pathname",
            Mapping::Url => "url",
            Mapping::Title => "title",
            Mapping::OgTitle => "og:title",
            Mapping::Specific => "specific",
            Mapping::Number => "number",
        }
    }

    fn requires_term(self) -> bool {
        matches!(self, Mapping::Specific | Mapping::Number)
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InputPosition {
    #[default]
    Bottom,
    Top,
}

impl InputPosition {
    pub fn as_str(self) -> &'static str {
        match self {
            InputPosition::Bottom => "bottom",
            InputPosition::Top => "top",
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Loading {
    #[default]
    Lazy,
    Eager,
}

impl Loading {
    pub fn as_str(self) -> &'static str {
        match self {
            Loading::Lazy => "lazy",
            Loading::Eager => "eager",
        }
    }
}

fn default_true() -> bool {
    true
}

fn default_lang() -> String {
    "en".to_string()
}

fn default_element_id() -> String {
    "comments".to_string()
}

fn default_client_url() -> Url {
    Url::parse(DEFAULT_CLIENT_URL).expect("default client url")
}

impl WidgetConfig {
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let bytes = std::fs::read(path).with_context(|| format!("read {}", path.display()))?;
        Self::from_json(&bytes).with_context(|| format!("load {}", path.display()))
    }

    pub fn from_json(bytes: &[u8]) -> anyhow::Result<Self> {
        let config: WidgetConfig = serde_json::from_slice(bytes).context("parse widget config")?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> anyhow::Result<()> {
        let repo_re = regex::Regex::new(r"^[A-Za-z0-9-]+/[A-Za-z0-9._-]+$").expect("repo regex");
        if !repo_re.is_match(&self.repo) {
            anyhow::bail!("repo must look like `owner/name`, got {:?}", self.repo);
        }
        if self.repo_id.trim().is_empty() {
            anyhow::bail!("repo_id must not be empty");
        }
        if self.category_id.trim().is_empty() {
            anyhow::bail!("category_id must not be empty");
        }
        if self.mapping.requires_term()
            && self.term.as_deref().map(str::trim).unwrap_or("").is_empty()
        {
            anyhow::bail!("mapping `{}` requires a term", self.mapping.as_str());
        }
        if self.mapping == Mapping::Number {
            let term = self.term.as_deref().unwrap_or("");
            if term.trim().parse::<u64>().is_err() {
                anyhow::bail!("mapping `number` requires a numeric term, got {:?}", term);
            }
        }
        if !matches!(self.client_url.scheme(), "https" | "http") {
            anyhow::bail!("client_url must be http(s), got {}", self.client_url);
        }
        if self.element_id.trim().is_empty() || self.element_id.contains(char::is_whitespace) {
            anyhow::bail!("element_id must be a single non-empty token");
        }
        if self.lang.trim().is_empty() {
            anyhow::bail!("lang must not be empty");
        }
        Ok(())
    }
}
