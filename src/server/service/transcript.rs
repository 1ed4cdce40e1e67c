//! Channel transcript export.
//!
//! Fetches the most recent messages of a text channel, renders them into a
//! single self-contained HTML document and persists it under the
//! static-served transcripts directory. Files are collected again by the
//! retention sweep after seven days.

use capability::{ChannelInfo, ChannelKind, DiscordApi, MessageRecord};

use crate::server::{
    error::AppError,
    service::artifact::{ArtifactKind, ArtifactStore},
};

/// Upper bound on exported messages per transcript.
pub const TRANSCRIPT_MESSAGE_LIMIT: usize = 200;

pub struct TranscriptService<'a> {
    discord: &'a dyn DiscordApi,
    artifacts: &'a ArtifactStore,
}

impl<'a> TranscriptService<'a> {
    pub fn new(discord: &'a dyn DiscordApi, artifacts: &'a ArtifactStore) -> Self {
        Self { discord, artifacts }
    }

    /// Exports a channel transcript and returns its public URL.
    ///
    /// The channel must be a guild text channel; anything else fails with a
    /// 400 before any message is fetched or any file written.
    pub async fn export(&self, token: &str, channel_id: u64) -> Result<String, AppError> {
        let channel = self.discord.fetch_channel(token, channel_id).await?;
        if channel.kind != ChannelKind::Text {
            return Err(AppError::BadRequest(
                "Channel must be a text-based channel".to_string(),
            ));
        }

        let messages = self
            .discord
            .fetch_messages(token, channel_id, TRANSCRIPT_MESSAGE_LIMIT)
            .await?;

        let html = render_transcript(&channel, &messages);
        let filename = format!("transcript-{}.html", channel_id);
        let url = self
            .artifacts
            .store(ArtifactKind::Transcript, &filename, html.as_bytes())
            .await?;

        tracing::info!(
            "Exported transcript of channel {} ({} messages)",
            channel_id,
            messages.len()
        );
        Ok(url)
    }
}

/// Renders messages into a self-contained HTML document, oldest first.
fn render_transcript(channel: &ChannelInfo, messages: &[MessageRecord]) -> String {
    let mut html = String::with_capacity(4096);

    html.push_str("<!DOCTYPE html>\n<html>\n<head>\n<meta charset=\"utf-8\">\n");
    html.push_str(&format!(
        "<title>#{} transcript</title>\n",
        escape_html(&channel.name)
    ));
    html.push_str(
        "<style>\n\
         body { background: #313338; color: #dbdee1; font-family: sans-serif; margin: 0; }\n\
         .header { padding: 16px 24px; background: #1e1f22; font-size: 1.2em; }\n\
         .message { display: flex; padding: 8px 24px; }\n\
         .avatar { width: 40px; height: 40px; border-radius: 50%; margin-right: 16px; }\n\
         .author { font-weight: 600; color: #f2f3f5; margin-right: 8px; }\n\
         .bot-tag { background: #5865f2; color: #fff; border-radius: 3px; \
         font-size: 0.7em; padding: 1px 4px; margin-right: 8px; }\n\
         .timestamp { color: #949ba4; font-size: 0.8em; }\n\
         .content { margin-top: 2px; white-space: pre-wrap; }\n\
         .attachment { display: block; color: #00a8fc; }\n\
         .footer { padding: 16px 24px; color: #949ba4; font-size: 0.85em; }\n\
         </style>\n</head>\n<body>\n",
    );
    html.push_str(&format!(
        "<div class=\"header\">#{}</div>\n",
        escape_html(&channel.name)
    ));

    for message in messages {
        html.push_str("<div class=\"message\">\n");
        if let Some(avatar) = &message.author_avatar_url {
            html.push_str(&format!(
                "<img class=\"avatar\" src=\"{}\" alt=\"\">\n",
                escape_html(avatar)
            ));
        }
        html.push_str("<div>\n<div>");
        html.push_str(&format!(
            "<span class=\"author\">{}</span>",
            escape_html(&message.author_name)
        ));
        if message.author_bot {
            html.push_str("<span class=\"bot-tag\">BOT</span>");
        }
        html.push_str(&format!(
            "<span class=\"timestamp\">{}</span>",
            message.timestamp.format("%Y-%m-%d %H:%M:%S UTC")
        ));
        html.push_str("</div>\n");
        html.push_str(&format!(
            "<div class=\"content\">{}</div>\n",
            escape_html(&message.content)
        ));
        for attachment in &message.attachments {
            html.push_str(&format!(
                "<a class=\"attachment\" href=\"{}\">{}</a>\n",
                escape_html(&attachment.url),
                escape_html(&attachment.filename)
            ));
        }
        html.push_str("</div>\n</div>\n");
    }

    html.push_str(&format!(
        "<div class=\"footer\">Exported {} message{}</div>\n</body>\n</html>\n",
        messages.len(),
        if messages.len() == 1 { "" } else { "s" }
    ));

    html
}

fn escape_html(input: &str) -> String {
    let mut escaped = String::with_capacity(input.len());
    for c in input.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            _ => escaped.push(c),
        }
    }
    escaped
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use test_utils::mock::MockDiscordApi;
    use tokio::fs;

    fn temp_store() -> ArtifactStore {
        let root = std::env::temp_dir().join(format!(
            "botbridge-transcripts-{}",
            ArtifactStore::timestamped_name("test", "d")
        ));
        ArtifactStore::new(root, "http://localhost:3000")
    }

    fn message(id: u64, author: &str, content: &str) -> MessageRecord {
        MessageRecord {
            id,
            author_id: id,
            author_name: author.to_string(),
            author_avatar_url: None,
            author_bot: false,
            content: content.to_string(),
            timestamp: Utc.with_ymd_and_hms(2024, 3, 1, 12, 0, 0).unwrap(),
            attachments: Vec::new(),
        }
    }

    /// Tests exporting a text channel transcript end to end.
    ///
    /// Expected: Ok with deterministic URL, file on disk containing the
    /// escaped message content
    #[tokio::test]
    async fn exports_text_channel_transcript() {
        let discord = MockDiscordApi::new()
            .with_channel(5, "general", ChannelKind::Text)
            .with_messages(5, vec![message(1, "alice", "hello <world> & friends")]);
        let store = temp_store();
        store.ensure_layout().await.unwrap();

        let url = TranscriptService::new(&discord, &store)
            .export("token", 5)
            .await
            .unwrap();

        assert_eq!(url, "http://localhost:3000/transcripts/transcript-5.html");

        let html = fs::read_to_string(
            store
                .dir_path(ArtifactKind::Transcript)
                .join("transcript-5.html"),
        )
        .await
        .unwrap();
        assert!(html.contains("hello &lt;world&gt; &amp; friends"));
        assert!(html.contains("alice"));
        assert!(html.contains("Exported 1 message"));
    }

    /// Tests that a non-text channel is rejected before messages are
    /// fetched or any file is written.
    ///
    /// Expected: Err(BadRequest), zero message fetches, empty directory
    #[tokio::test]
    async fn rejects_non_text_channel_without_side_effects() {
        let discord =
            MockDiscordApi::new().with_channel(5, "Voice Lounge", ChannelKind::Voice);
        let store = temp_store();
        store.ensure_layout().await.unwrap();

        let result = TranscriptService::new(&discord, &store)
            .export("token", 5)
            .await;

        assert!(matches!(result, Err(AppError::BadRequest(_))));
        assert_eq!(discord.counts().fetch_messages, 0);

        let mut entries = fs::read_dir(store.dir_path(ArtifactKind::Transcript))
            .await
            .unwrap();
        assert!(entries.next_entry().await.unwrap().is_none());
    }

    /// Tests that an unknown channel surfaces the upstream not-found error.
    ///
    /// Expected: Err(UpstreamErr NotFound)
    #[tokio::test]
    async fn unknown_channel_is_not_found() {
        let discord = MockDiscordApi::new();
        let store = temp_store();
        store.ensure_layout().await.unwrap();

        let result = TranscriptService::new(&discord, &store)
            .export("token", 5)
            .await;

        assert!(matches!(
            result,
            Err(AppError::UpstreamErr(capability::UpstreamError::NotFound { .. }))
        ));
    }

    /// Tests HTML escaping of every special character.
    ///
    /// Expected: all five specials replaced by entities
    #[test]
    fn escapes_html_special_characters() {
        assert_eq!(
            escape_html(r#"<a href="x">&'</a>"#),
            "&lt;a href=&quot;x&quot;&gt;&amp;&#39;&lt;/a&gt;"
        );
    }
}
