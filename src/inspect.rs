use std::collections::BTreeMap;

use kuchiki::traits::TendrilSink as _;

/// What a rendered page actually hands to giscus, read back from the HTML.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmbedSnapshot {
    pub script_src: String,
    pub container_id: Option<String>,
    /// `data-*` attributes of the loader script, keyed without the prefix.
    pub data: BTreeMap<String, String>,
}

impl EmbedSnapshot {
    pub fn parse(html: &str) -> anyhow::Result<Self> {
        let doc = kuchiki::parse_html().one(html);

        let mut scripts = Vec::new();
        if let Ok(nodes) = doc.select("script[src][data-repo]") {
            scripts.extend(nodes);
        }
        let script = match scripts.as_slice() {
            [] => anyhow::bail!("no giscus loader script found"),
            [one] => one,
            many => anyhow::bail!("expected one giscus loader script, found {}", many.len()),
        };

        let attrs = script.attributes.borrow();
        let script_src = attrs.get("src").unwrap_or_default().to_string();
        let data = attrs
            .map
            .iter()
            .filter_map(|(name, value)| {
                let local: &str = &name.local;
                local
                    .strip_prefix("data-")
                    .map(|key| (key.to_string(), value.value.clone()))
            })
            .collect();

        let container_id = doc
            .select_first(".giscus")
            .ok()
            .and_then(|node| node.attributes.borrow().get("id").map(|s| s.to_string()));

        Ok(Self {
            script_src,
            container_id,
            data,
        })
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.data.get(key).map(String::as_str)
    }

    pub fn theme(&self) -> Option<&str> {
        self.get("theme")
    }
}
