use capability::DiscordApi;

use crate::{
    model::presence::{PresenceBucketDto, PresenceUserDto, ServerPresenceDto},
    server::error::AppError,
};

pub struct PresenceService<'a> {
    discord: &'a dyn DiscordApi,
}

impl<'a> PresenceService<'a> {
    pub fn new(discord: &'a dyn DiscordApi) -> Self {
        Self { discord }
    }

    /// Buckets all members of a guild into online and offline groups.
    ///
    /// Only the `online` status counts as online; idle, do-not-disturb and
    /// offline members all land in the offline bucket.
    ///
    /// # Arguments
    /// - `token`: Caller-supplied bot token
    /// - `guild_id`: Discord guild ID
    ///
    /// # Returns
    /// - `Ok(ServerPresenceDto)`: Both buckets with their totals
    /// - `Err(AppError)`: Guild absent or platform rejection
    pub async fn summarize(
        &self,
        token: &str,
        guild_id: u64,
    ) -> Result<ServerPresenceDto, AppError> {
        let members = self.discord.fetch_members(token, guild_id).await?;

        let mut online = Vec::new();
        let mut offline = Vec::new();
        for member in members {
            let user = PresenceUserDto {
                userid: member.user_id.to_string(),
                username: member.username,
            };
            if member.online {
                online.push(user);
            } else {
                offline.push(user);
            }
        }

        Ok(ServerPresenceDto {
            online: PresenceBucketDto {
                total: online.len(),
                users: online,
            },
            offline: PresenceBucketDto {
                total: offline.len(),
                users: offline,
            },
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use capability::{MemberPresence, UpstreamError};
    use test_utils::mock::MockDiscordApi;

    fn member(user_id: u64, username: &str, online: bool) -> MemberPresence {
        MemberPresence {
            user_id,
            username: username.to_string(),
            online,
        }
    }

    /// Tests that members are bucketed by the online flag with totals.
    ///
    /// Expected: Ok with 1 online and 2 offline members, one capability call
    #[tokio::test]
    async fn buckets_members_by_presence() {
        let discord = MockDiscordApi::new().with_members(
            10,
            vec![
                member(1, "alice", true),
                member(2, "bob", false),
                member(3, "carol", false),
            ],
        );

        let summary = PresenceService::new(&discord)
            .summarize("token", 10)
            .await
            .unwrap();

        assert_eq!(summary.online.total, 1);
        assert_eq!(summary.online.users[0].userid, "1");
        assert_eq!(summary.online.users[0].username, "alice");
        assert_eq!(summary.offline.total, 2);
        assert_eq!(discord.counts().fetch_members, 1);
    }

    /// Tests that an unknown guild surfaces the upstream not-found error.
    ///
    /// Expected: Err(UpstreamErr NotFound)
    #[tokio::test]
    async fn unknown_guild_is_not_found() {
        let discord = MockDiscordApi::new();

        let result = PresenceService::new(&discord).summarize("token", 10).await;

        assert!(matches!(
            result,
            Err(AppError::UpstreamErr(UpstreamError::NotFound { .. }))
        ));
    }
}
