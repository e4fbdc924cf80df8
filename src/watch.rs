use crate::dom::Element;

/// One line of watch input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Set { attribute: String, value: String },
    Remove { attribute: String },
    Child { tag: String, attribute: String, value: String },
    Quit,
}

/// Parses a watch line. Blank lines and `#` comments yield `None`.
pub fn parse_line(line: &str) -> anyhow::Result<Option<Command>> {
    let line = line.trim();
    if line.is_empty() || line.starts_with('#') {
        return Ok(None);
    }

    let (verb, rest) = line.split_once(char::is_whitespace).unwrap_or((line, ""));
    let rest = rest.trim();
    let cmd = match verb {
        "set" => {
            let (attribute, value) = split_word(rest, "set <attr> <value>")?;
            Command::Set {
                attribute,
                value: value.to_string(),
            }
        }
        "remove" => {
            if rest.is_empty() || rest.contains(char::is_whitespace) {
                anyhow::bail!("usage: remove <attr>");
            }
            Command::Remove {
                attribute: rest.to_string(),
            }
        }
        "child" => {
            let (tag, rest) = split_word(rest, "child <tag> <attr> <value>")?;
            let (attribute, value) = split_word(rest, "child <tag> <attr> <value>")?;
            Command::Child {
                tag,
                attribute,
                value: value.to_string(),
            }
        }
        "quit" => Command::Quit,
        other => anyhow::bail!("unknown command {:?}", other),
    };
    Ok(Some(cmd))
}

fn split_word<'a>(s: &'a str, usage: &str) -> anyhow::Result<(String, &'a str)> {
    match s.split_once(char::is_whitespace) {
        Some((word, rest)) if !rest.trim().is_empty() => Ok((word.to_string(), rest.trim())),
        _ => anyhow::bail!("usage: {}", usage),
    }
}

/// Applies a mutation to the host document rooted at `root`.
pub fn apply(root: &Element, cmd: &Command) {
    match cmd {
        Command::Set { attribute, value } => root.set_attribute(attribute, value),
        Command::Remove { attribute } => root.remove_attribute(attribute),
        Command::Child {
            tag,
            attribute,
            value,
        } => {
            let child = root
                .children()
                .into_iter()
                .find(|c| c.tag_name() == tag)
                .unwrap_or_else(|| root.append_child(tag));
            child.set_attribute(attribute, value);
        }
        Command::Quit => {}
    }
}
