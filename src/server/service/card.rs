//! Profile and rank card generation.
//!
//! Validates the request options, resolves the subject user through the
//! Discord capability, hands compositing to the card renderer and persists
//! the PNG under the static-served cards directory.

use capability::{CardOptions, CardRenderer, CardSubject, DiscordApi, RankData};

use crate::{
    model::card::{ProfileCardRequestDto, RankCardRequestDto},
    server::{
        error::AppError,
        service::artifact::{ArtifactKind, ArtifactStore},
    },
};

pub struct CardService<'a> {
    discord: &'a dyn DiscordApi,
    renderer: &'a dyn CardRenderer,
    artifacts: &'a ArtifactStore,
}

impl<'a> CardService<'a> {
    pub fn new(
        discord: &'a dyn DiscordApi,
        renderer: &'a dyn CardRenderer,
        artifacts: &'a ArtifactStore,
    ) -> Self {
        Self {
            discord,
            renderer,
            artifacts,
        }
    }

    /// Renders a profile card and returns the public image URL.
    pub async fn render_profile_card(
        &self,
        token: &str,
        user_id: u64,
        request: ProfileCardRequestDto,
    ) -> Result<String, AppError> {
        let options = validate_options(request)?;
        let subject = self.resolve_subject(token, user_id).await?;

        let bytes = self.renderer.render_profile(&subject, &options).await?;
        self.persist(bytes, "profile").await
    }

    /// Renders a rank card and returns the public image URL.
    pub async fn render_rank_card(
        &self,
        token: &str,
        user_id: u64,
        request: RankCardRequestDto,
    ) -> Result<String, AppError> {
        let rank = validate_rank(&request)?;
        let options = validate_options(request.card)?;
        let subject = self.resolve_subject(token, user_id).await?;

        let bytes = self.renderer.render_rank(&subject, &options, &rank).await?;
        self.persist(bytes, "rank").await
    }

    async fn resolve_subject(&self, token: &str, user_id: u64) -> Result<CardSubject, AppError> {
        let user = self.discord.fetch_user(token, user_id).await?;
        Ok(CardSubject {
            user_id,
            username: user.username,
            avatar_url: user.avatar_url,
        })
    }

    async fn persist(&self, bytes: Vec<u8>, prefix: &str) -> Result<String, AppError> {
        let filename = ArtifactStore::timestamped_name(prefix, "png");
        let url = self
            .artifacts
            .store(ArtifactKind::Card, &filename, &bytes)
            .await?;
        Ok(url)
    }
}

fn missing(name: &str) -> AppError {
    AppError::BadRequest(format!("Missing required parameter: {}", name))
}

/// Checks the required card options. Both border colors must be present and
/// non-empty; everything else is optional.
fn validate_options(request: ProfileCardRequestDto) -> Result<CardOptions, AppError> {
    if request
        .border_color
        .as_deref()
        .is_none_or(|c| c.trim().is_empty())
    {
        return Err(missing("borderColor"));
    }
    if request
        .border_color_2
        .as_deref()
        .is_none_or(|c| c.trim().is_empty())
    {
        return Err(missing("borderColor_2"));
    }
    Ok(request.into_options())
}

/// Checks the rank-specific fields and assembles the rank inputs.
fn validate_rank(request: &RankCardRequestDto) -> Result<RankData, AppError> {
    let bar_color = match request.bar_color.as_deref() {
        Some(c) if !c.trim().is_empty() => c.to_string(),
        _ => return Err(missing("barColor")),
    };
    let level_color = match request.level_color.as_deref() {
        Some(c) if !c.trim().is_empty() => c.to_string(),
        _ => return Err(missing("levelColor")),
    };
    let rank = request.rank.ok_or_else(|| missing("rank"))?;
    let current_xp = request.current_xp.ok_or_else(|| missing("currentXp"))?;
    let required_xp = request.required_xp.ok_or_else(|| missing("requiredXp"))?;
    let level = request.level.ok_or_else(|| missing("level"))?;

    Ok(RankData {
        current_xp,
        required_xp,
        level,
        rank,
        bar_color,
        level_color,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use capability::UserProfile;
    use test_utils::mock::{MockCardRenderer, MockDiscordApi};

    fn temp_store() -> ArtifactStore {
        let root = std::env::temp_dir().join(format!(
            "botbridge-cards-{}",
            ArtifactStore::timestamped_name("test", "d")
        ));
        ArtifactStore::new(root, "http://localhost:3000")
    }

    fn card_request() -> ProfileCardRequestDto {
        ProfileCardRequestDto {
            border_color: Some("#ff0000".to_string()),
            border_color_2: Some("#0000ff".to_string()),
            ..Default::default()
        }
    }

    fn subject_user() -> UserProfile {
        UserProfile {
            id: 7,
            username: "alice".to_string(),
            avatar_url: None,
            bot: false,
        }
    }

    /// Tests that a request without borderColor fails before any external
    /// call is made.
    ///
    /// Expected: Err naming borderColor, zero renderer and Discord calls
    #[tokio::test]
    async fn missing_border_color_performs_no_external_calls() {
        let discord = MockDiscordApi::new();
        let renderer = MockCardRenderer::new();
        let store = temp_store();
        store.ensure_layout().await.unwrap();
        let service = CardService::new(&discord, &renderer, &store);

        let result = service
            .render_profile_card("token", 7, ProfileCardRequestDto::default())
            .await;

        let err = result.unwrap_err();
        assert!(matches!(err, AppError::BadRequest(_)));
        assert!(err.to_string().contains("borderColor"));
        assert_eq!(renderer.render_calls(), 0);
        assert_eq!(discord.counts().total(), 0);
    }

    /// Tests that the second border color is validated once the first is
    /// present.
    ///
    /// Expected: Err naming borderColor_2, zero external calls
    #[tokio::test]
    async fn missing_second_border_color_is_reported() {
        let discord = MockDiscordApi::new();
        let renderer = MockCardRenderer::new();
        let store = temp_store();
        store.ensure_layout().await.unwrap();
        let service = CardService::new(&discord, &renderer, &store);

        let request = ProfileCardRequestDto {
            border_color: Some("#ff0000".to_string()),
            ..Default::default()
        };
        let err = service
            .render_profile_card("token", 7, request)
            .await
            .unwrap_err();

        assert!(err.to_string().contains("borderColor_2"));
        assert_eq!(renderer.render_calls(), 0);
        assert_eq!(discord.counts().total(), 0);
    }

    /// Tests that a rank card request missing barColor fails first.
    ///
    /// Expected: Err naming barColor, zero external calls
    #[tokio::test]
    async fn rank_card_requires_bar_color() {
        let discord = MockDiscordApi::new();
        let renderer = MockCardRenderer::new();
        let store = temp_store();
        store.ensure_layout().await.unwrap();
        let service = CardService::new(&discord, &renderer, &store);

        let request = RankCardRequestDto {
            card: card_request(),
            ..Default::default()
        };
        let err = service
            .render_rank_card("token", 7, request)
            .await
            .unwrap_err();

        assert!(err.to_string().contains("barColor"));
        assert_eq!(renderer.render_calls(), 0);
        assert_eq!(discord.counts().total(), 0);
    }

    /// Tests rendering a profile card end to end with mocks.
    ///
    /// Expected: Ok with a cards URL, one render call, one user fetch
    #[tokio::test]
    async fn renders_and_persists_profile_card() {
        let discord = MockDiscordApi::new().with_user(subject_user());
        let renderer = MockCardRenderer::new();
        let store = temp_store();
        store.ensure_layout().await.unwrap();
        let service = CardService::new(&discord, &renderer, &store);

        let url = service
            .render_profile_card("token", 7, card_request())
            .await
            .unwrap();

        assert!(url.starts_with("http://localhost:3000/cards/profile-"));
        assert!(url.ends_with(".png"));
        assert_eq!(renderer.render_calls(), 1);
        assert_eq!(discord.counts().fetch_user, 1);
    }

    /// Tests rendering a rank card with all required fields present.
    ///
    /// Expected: Ok with a rank-prefixed cards URL and one render call
    #[tokio::test]
    async fn renders_rank_card_with_complete_request() {
        let discord = MockDiscordApi::new().with_user(subject_user());
        let renderer = MockCardRenderer::new();
        let store = temp_store();
        store.ensure_layout().await.unwrap();
        let service = CardService::new(&discord, &renderer, &store);

        let request = RankCardRequestDto {
            card: card_request(),
            current_xp: Some(300),
            required_xp: Some(1000),
            level: Some(4),
            rank: Some(12),
            bar_color: Some("#00ff00".to_string()),
            level_color: Some("#ffffff".to_string()),
        };
        let url = service.render_rank_card("token", 7, request).await.unwrap();

        assert!(url.starts_with("http://localhost:3000/cards/rank-"));
        assert_eq!(renderer.render_calls(), 1);
    }

    /// Tests that an unknown subject user surfaces the upstream not-found
    /// error without rendering.
    ///
    /// Expected: Err(UpstreamErr NotFound), zero render calls
    #[tokio::test]
    async fn unknown_user_is_not_found() {
        let discord = MockDiscordApi::new();
        let renderer = MockCardRenderer::new();
        let store = temp_store();
        store.ensure_layout().await.unwrap();
        let service = CardService::new(&discord, &renderer, &store);

        let result = service.render_profile_card("token", 7, card_request()).await;

        assert!(matches!(
            result,
            Err(AppError::UpstreamErr(capability::UpstreamError::NotFound { .. }))
        ));
        assert_eq!(renderer.render_calls(), 0);
    }
}
