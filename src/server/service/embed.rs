use capability::DiscordApi;

use crate::{
    model::embed::EmbedBuilderRequestDto,
    server::{error::AppError, util::color::parse_hex_u32},
};

pub struct EmbedService<'a> {
    discord: &'a dyn DiscordApi,
}

impl<'a> EmbedService<'a> {
    pub fn new(discord: &'a dyn DiscordApi) -> Self {
        Self { discord }
    }

    /// Posts an embed to a channel through the bot.
    ///
    /// The embed must carry visible content (title, description or at least
    /// one field) and any color must be a valid hex value; both checks run
    /// before the platform is called.
    ///
    /// # Returns
    /// - `Ok(u64)`: Id of the created message
    /// - `Err(AppError)`: Validation failure, channel absent, or rejection
    pub async fn send(
        &self,
        token: &str,
        channel_id: u64,
        request: EmbedBuilderRequestDto,
    ) -> Result<u64, AppError> {
        let has_content = request
            .title
            .as_deref()
            .is_some_and(|t| !t.trim().is_empty())
            || request
                .description
                .as_deref()
                .is_some_and(|d| !d.trim().is_empty())
            || !request.fields.is_empty();
        if !has_content {
            return Err(AppError::BadRequest(
                "Embed must include a title, description, or at least one field".to_string(),
            ));
        }

        let color = match request.color.as_deref() {
            Some(raw) => Some(parse_hex_u32(raw).ok_or_else(|| {
                AppError::BadRequest("Invalid value for parameter: color".to_string())
            })?),
            None => None,
        };

        let spec = request.into_spec(color);
        let message_id = self.discord.send_embed(token, channel_id, &spec).await?;
        Ok(message_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use capability::{ChannelKind, UpstreamError};
    use test_utils::mock::MockDiscordApi;

    fn titled_embed() -> EmbedBuilderRequestDto {
        EmbedBuilderRequestDto {
            title: Some("Release 1.4".to_string()),
            description: Some("Changelog below".to_string()),
            color: Some("#5865F2".to_string()),
            ..Default::default()
        }
    }

    /// Tests that an embed without any content is rejected before the
    /// platform is called.
    ///
    /// Expected: Err(BadRequest), zero send calls
    #[tokio::test]
    async fn rejects_empty_embed() {
        let discord = MockDiscordApi::new().with_channel(9, "news", ChannelKind::Text);

        let result = EmbedService::new(&discord)
            .send("token", 9, EmbedBuilderRequestDto::default())
            .await;

        assert!(matches!(result, Err(AppError::BadRequest(_))));
        assert_eq!(discord.counts().send_embed, 0);
    }

    /// Tests that a malformed color is rejected before the platform is
    /// called.
    ///
    /// Expected: Err naming color, zero send calls
    #[tokio::test]
    async fn rejects_invalid_color() {
        let discord = MockDiscordApi::new().with_channel(9, "news", ChannelKind::Text);

        let request = EmbedBuilderRequestDto {
            title: Some("Hello".to_string()),
            color: Some("chartreuse".to_string()),
            ..Default::default()
        };
        let err = EmbedService::new(&discord)
            .send("token", 9, request)
            .await
            .unwrap_err();

        assert!(err.to_string().contains("color"));
        assert_eq!(discord.counts().send_embed, 0);
    }

    /// Tests sending a complete embed.
    ///
    /// Expected: Ok with message id, embed recorded with parsed color
    #[tokio::test]
    async fn sends_embed_with_parsed_color() {
        let discord = MockDiscordApi::new().with_channel(9, "news", ChannelKind::Text);

        let message_id = EmbedService::new(&discord)
            .send("token", 9, titled_embed())
            .await
            .unwrap();

        assert_eq!(message_id, 1);
        let sent = discord.sent_embeds();
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].0, 9);
        assert_eq!(sent[0].1.color, Some(0x5865F2));
        assert_eq!(sent[0].1.title.as_deref(), Some("Release 1.4"));
    }

    /// Tests that an unknown channel surfaces the upstream not-found error.
    ///
    /// Expected: Err(UpstreamErr NotFound)
    #[tokio::test]
    async fn unknown_channel_is_not_found() {
        let discord = MockDiscordApi::new();

        let result = EmbedService::new(&discord)
            .send("token", 9, titled_embed())
            .await;

        assert!(matches!(
            result,
            Err(AppError::UpstreamErr(UpstreamError::NotFound { .. }))
        ));
    }
}
