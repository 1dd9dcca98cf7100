use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// The closed set of block kinds the parser can emit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BlockKind {
    Title,
    Header,
    Paragraph,
    Code,
    Table,
    BulletList,
    NumberedList,
    Blockquote,
    HorizontalRule,
    TaskList,
}

impl BlockKind {
    /// Every kind, in declaration order.
    pub const ALL: [BlockKind; 10] = [
        BlockKind::Title,
        BlockKind::Header,
        BlockKind::Paragraph,
        BlockKind::Code,
        BlockKind::Table,
        BlockKind::BulletList,
        BlockKind::NumberedList,
        BlockKind::Blockquote,
        BlockKind::HorizontalRule,
        BlockKind::TaskList,
    ];

    /// The wire name of this kind (`"bullet_list"`, `"code"`, ...).
    pub fn as_str(self) -> &'static str {
        match self {
            BlockKind::Title => "title",
            BlockKind::Header => "header",
            BlockKind::Paragraph => "paragraph",
            BlockKind::Code => "code",
            BlockKind::Table => "table",
            BlockKind::BulletList => "bullet_list",
            BlockKind::NumberedList => "numbered_list",
            BlockKind::Blockquote => "blockquote",
            BlockKind::HorizontalRule => "horizontal_rule",
            BlockKind::TaskList => "task_list",
        }
    }
}

impl fmt::Display for BlockKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Returned when a string does not name a [`BlockKind`].
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown block kind '{0}'")]
pub struct UnknownBlockKind(pub String);

impl FromStr for BlockKind {
    type Err = UnknownBlockKind;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        BlockKind::ALL
            .into_iter()
            .find(|kind| kind.as_str() == s)
            .ok_or_else(|| UnknownBlockKind(s.to_string()))
    }
}

/// A classified unit of Markdown content.
///
/// The payload encoding depends on `kind`:
/// - `code`: the raw lines including both fences, joined by `\n`
/// - `table`: the raw pipe rows, joined by `\n`
/// - `bullet_list` / `numbered_list` / `blockquote`: one item per line
/// - `task_list`: `checked:<text>` or `unchecked:<text>` per line
/// - `horizontal_rule`: always `---`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TextBlock {
    pub kind: BlockKind,
    pub data: String,
    /// Nested blocks. The parser never fills this in.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<TextBlock>,
}

impl TextBlock {
    pub fn new(kind: BlockKind, data: impl Into<String>) -> Self {
        Self {
            kind,
            data: data.into(),
            children: Vec::new(),
        }
    }

    pub fn add_child(&mut self, child: TextBlock) {
        self.children.push(child);
    }

    pub fn is_title(&self) -> bool {
        self.kind == BlockKind::Title
    }
}

impl fmt::Display for TextBlock {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {:?}", self.kind, self.data)?;
        if !self.children.is_empty() {
            write!(f, " ({} children)", self.children.len())?;
        }
        Ok(())
    }
}

/// One entry of a task list payload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskItem {
    pub checked: bool,
    pub text: String,
}

impl TaskItem {
    /// Encode as a `task_list` payload line.
    pub fn encode(&self) -> String {
        let state = if self.checked { "checked" } else { "unchecked" };
        format!("{state}:{}", self.text)
    }

    /// Decode a `task_list` payload line. Lines without a known state prefix
    /// are read as unchecked items.
    pub fn decode(line: &str) -> TaskItem {
        if let Some(text) = line.strip_prefix("checked:") {
            TaskItem {
                checked: true,
                text: text.to_string(),
            }
        } else if let Some(text) = line.strip_prefix("unchecked:") {
            TaskItem {
                checked: false,
                text: text.to_string(),
            }
        } else {
            TaskItem {
                checked: false,
                text: line.to_string(),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn kind_names_round_trip_through_from_str() {
        for kind in BlockKind::ALL {
            assert_eq!(kind.as_str().parse::<BlockKind>(), Ok(kind));
        }
        assert!("bullet".parse::<BlockKind>().is_err());
    }

    #[test]
    fn kind_serializes_as_snake_case() {
        let json = serde_json::to_string(&BlockKind::HorizontalRule).unwrap();
        assert_eq!(json, "\"horizontal_rule\"");
    }

    #[test]
    fn block_equality_includes_children() {
        let mut parent = TextBlock::new(BlockKind::BulletList, "a");
        assert_eq!(parent, TextBlock::new(BlockKind::BulletList, "a"));
        parent.add_child(TextBlock::new(BlockKind::Paragraph, "nested"));
        assert_ne!(parent, TextBlock::new(BlockKind::BulletList, "a"));
    }

    #[test]
    fn task_item_decode_handles_both_states() {
        assert_eq!(
            TaskItem::decode("checked:Done"),
            TaskItem {
                checked: true,
                text: "Done".into()
            }
        );
        assert_eq!(
            TaskItem::decode("unchecked:Todo"),
            TaskItem {
                checked: false,
                text: "Todo".into()
            }
        );
        assert!(!TaskItem::decode("no prefix").checked);
    }
}
