use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use capability::{EmbedField, EmbedSpec};

#[derive(Deserialize, Default, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct EmbedFieldDto {
    pub name: String,
    pub value: String,
    #[serde(default)]
    pub inline: bool,
}

/// Embed payload to post through the bot. At least one of `title`,
/// `description` or `fields` must be present.
#[derive(Deserialize, Default, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct EmbedBuilderRequestDto {
    pub title: Option<String>,
    pub description: Option<String>,
    /// Hex color, `#RRGGBB` or `RRGGBB`.
    pub color: Option<String>,
    pub url: Option<String>,
    pub footer: Option<String>,
    pub image: Option<String>,
    pub thumbnail: Option<String>,
    pub author: Option<String>,
    pub author_icon: Option<String>,
    #[serde(default)]
    pub fields: Vec<EmbedFieldDto>,
}

impl EmbedBuilderRequestDto {
    /// Converts into the capability embed shape; `color` must already be
    /// parsed by the caller.
    pub fn into_spec(self, color: Option<u32>) -> EmbedSpec {
        EmbedSpec {
            title: self.title,
            description: self.description,
            color,
            url: self.url,
            fields: self
                .fields
                .into_iter()
                .map(|f| EmbedField {
                    name: f.name,
                    value: f.value,
                    inline: f.inline,
                })
                .collect(),
            footer_text: self.footer,
            image_url: self.image,
            thumbnail_url: self.thumbnail,
            author_name: self.author,
            author_icon_url: self.author_icon,
        }
    }
}

#[derive(Serialize, Deserialize, ToSchema)]
pub struct EmbedSentDto {
    pub message_id: String,
    pub channel_id: String,
}
