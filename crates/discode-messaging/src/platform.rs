//! Per-platform message-length limits and chunk splitting, used by the
//! streaming updater to decide when to roll a long assistant reply into a
//! continuation message instead of one giant edit.

/// Chat platform a channel lives on. Selects the splitter a `Messaging`
/// implementation (and the streaming updater upstream of it) should use.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Platform {
    Slack,
    Discord,
}

impl Platform {
    /// Conservative single-message character budget, comfortably under
    /// each platform's hard limit (Discord: 2000, Slack: ~4000) so an edit
    /// never gets rejected mid-turn.
    pub fn max_message_len(self) -> usize {
        match self {
            Platform::Discord => 1950,
            Platform::Slack => 3500,
        }
    }

    /// Split `text` into chunks no longer than `max_message_len()`,
    /// preferring to break on a newline or space boundary near the limit
    /// so words and lines don't get torn in half.
    pub fn split_chunks(self, text: &str) -> Vec<String> {
        split_chunks(text, self.max_message_len())
    }
}

pub fn split_chunks(text: &str, limit: usize) -> Vec<String> {
    if text.len() <= limit {
        return vec![text.to_string()];
    }

    let mut chunks = Vec::new();
    let mut rest = text;
    while rest.len() > limit {
        let window = &rest[..limit];
        let split_at = window
            .rfind('\n')
            .or_else(|| window.rfind(' '))
            .unwrap_or(limit);
        let (head, tail) = rest.split_at(split_at.max(1));
        chunks.push(head.trim_end().to_string());
        rest = tail.trim_start_matches(['\n', ' ']);
    }
    if !rest.is_empty() {
        chunks.push(rest.to_string());
    }
    chunks
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn short_text_is_a_single_chunk() {
        let chunks = Platform::Discord.split_chunks("hello");
        assert_eq!(chunks, vec!["hello".to_string()]);
    }

    #[test]
    fn long_text_splits_on_newline_boundary() {
        let line = "x".repeat(10);
        let text = (0..400).map(|_| line.clone()).collect::<Vec<_>>().join("\n");
        let chunks = Platform::Discord.split_chunks(&text);
        assert!(chunks.len() > 1);
        for chunk in &chunks {
            assert!(chunk.len() <= Platform::Discord.max_message_len());
        }
        assert_eq!(chunks.concat().replace('\n', ""), text.replace('\n', ""));
    }
}
