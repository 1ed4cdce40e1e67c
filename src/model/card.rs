use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use capability::CardOptions;

/// Options shared by the profile and rank card endpoints.
///
/// `borderColor` and `borderColor_2` are required; everything else falls back
/// to renderer defaults. Key spelling matches the historical wire format.
#[derive(Deserialize, Default, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ProfileCardRequestDto {
    pub border_color: Option<String>,
    #[serde(rename = "borderColor_2")]
    pub border_color_2: Option<String>,
    pub username_color: Option<String>,
    pub tag_color: Option<String>,
    pub presence_status: Option<String>,
    pub custom_background: Option<String>,
    pub background_brightness: Option<u8>,
    pub more_background_blur: Option<bool>,
    pub square_avatar: Option<bool>,
    pub remove_border: Option<bool>,
    pub custom_date: Option<String>,
}

impl ProfileCardRequestDto {
    /// Converts into renderer options; both border colors must already be
    /// validated present.
    pub fn into_options(self) -> CardOptions {
        CardOptions {
            border_color: self.border_color.unwrap_or_default(),
            border_color_2: self.border_color_2.unwrap_or_default(),
            username_color: self.username_color,
            tag_color: self.tag_color,
            presence_status: self.presence_status,
            custom_background: self.custom_background,
            background_brightness: self.background_brightness,
            more_background_blur: self.more_background_blur.unwrap_or(false),
            square_avatar: self.square_avatar.unwrap_or(false),
            remove_border: self.remove_border.unwrap_or(false),
            custom_date: self.custom_date,
        }
    }
}

#[derive(Deserialize, Default, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RankCardRequestDto {
    #[serde(flatten)]
    pub card: ProfileCardRequestDto,
    pub current_xp: Option<u64>,
    pub required_xp: Option<u64>,
    pub level: Option<u32>,
    pub rank: Option<u32>,
    pub bar_color: Option<String>,
    pub level_color: Option<String>,
}

#[derive(Serialize, Deserialize, ToSchema)]
pub struct CardResponseDto {
    #[serde(rename = "imageUrl")]
    pub image_url: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Tests that request deserialization accepts the historical key
    /// spellings, including the odd `borderColor_2`.
    ///
    /// Expected: all renamed keys land in the right fields
    #[test]
    fn deserializes_historical_key_spellings() {
        let request: RankCardRequestDto = serde_json::from_value(serde_json::json!({
            "borderColor": "#ff0000",
            "borderColor_2": "#0000ff",
            "usernameColor": "#ffffff",
            "squareAvatar": true,
            "currentXp": 300,
            "requiredXp": 1000,
            "level": 4,
            "rank": 12,
            "barColor": "#00ff00",
            "levelColor": "#ffff00"
        }))
        .unwrap();

        assert_eq!(request.card.border_color.as_deref(), Some("#ff0000"));
        assert_eq!(request.card.border_color_2.as_deref(), Some("#0000ff"));
        assert_eq!(request.card.username_color.as_deref(), Some("#ffffff"));
        assert_eq!(request.card.square_avatar, Some(true));
        assert_eq!(request.current_xp, Some(300));
        assert_eq!(request.bar_color.as_deref(), Some("#00ff00"));
    }

    /// Tests the response key spelling.
    ///
    /// Expected: serialized as `imageUrl`
    #[test]
    fn serializes_image_url_key() {
        let response = CardResponseDto {
            image_url: "http://localhost:3000/cards/profile-1.png".to_string(),
        };
        let json = serde_json::to_value(&response).unwrap();

        assert_eq!(
            json,
            serde_json::json!({ "imageUrl": "http://localhost:3000/cards/profile-1.png" })
        );
    }
}
