use std::path::PathBuf;
use std::sync::Arc;

use clap::Parser;
use fitshare_core::auth::data_dir;
use fitshare_core::{FileTokenSource, StaticToken, TokenSource, User};
use fitshare_media::MediaConfig;

use crate::sync::SyncPolicy;

#[derive(Debug, Clone, Parser)]
#[command(name = "fitshare", about = "Share meal plans and workout stories")]
pub struct ClientConfig {
    /// API root of the backend
    #[arg(long, env = "FITSHARE_API_URL", default_value = "http://localhost:8080/api")]
    pub api_url: String,

    /// Bearer token; takes precedence over the token file
    #[arg(long, env = "FITSHARE_TOKEN", hide_env_values = true)]
    pub token: Option<String>,

    /// File holding the persisted access token, re-read on every request
    #[arg(long, env = "FITSHARE_TOKEN_FILE")]
    pub token_file: Option<PathBuf>,

    /// Store uploads in this directory instead of sending them to the backend
    #[arg(long, env = "FITSHARE_MEDIA_DIR")]
    pub media_dir: Option<String>,

    /// Id of the signed-in user; without it the feed is read-only
    #[arg(long, env = "FITSHARE_USER_ID")]
    pub user_id: Option<String>,

    #[arg(long, env = "FITSHARE_USERNAME", default_value = "")]
    pub username: String,

    /// Avatar URL of the signed-in user
    #[arg(long, env = "FITSHARE_AVATAR")]
    pub avatar: Option<String>,

    /// How the feed catches up after a change
    #[arg(long, env = "FITSHARE_SYNC_POLICY", value_enum, default_value_t = SyncPolicy::Refetch)]
    pub sync_policy: SyncPolicy,

    /// Log file (the terminal is taken by the UI)
    #[arg(long)]
    pub log_file: Option<PathBuf>,
}

impl ClientConfig {
    pub fn token_source(&self) -> Arc<dyn TokenSource> {
        match &self.token {
            Some(token) if !token.is_empty() => Arc::new(StaticToken::new(token.clone())),
            _ => Arc::new(FileTokenSource::new(self.token_file_path())),
        }
    }

    pub fn token_file_path(&self) -> PathBuf {
        self.token_file
            .clone()
            .unwrap_or_else(|| data_dir().join("access_token"))
    }

    pub fn user(&self) -> Option<User> {
        let uid = self.user_id.as_deref().map(str::trim).filter(|u| !u.is_empty())?;
        Some(User {
            uid: uid.to_string(),
            username: self.username.clone(),
            image: self.avatar.clone(),
        })
    }

    /// Uploads go to the backend unless a local media directory is set.
    pub fn media_config(&self) -> MediaConfig {
        MediaConfig {
            endpoint_url: match self.media_dir {
                Some(_) => None,
                None => Some(self.api_url.clone()),
            },
            local_data_dir: self.media_dir.clone(),
        }
    }

    pub fn log_path(&self) -> PathBuf {
        self.log_file
            .clone()
            .unwrap_or_else(|| data_dir().join("fitshare.log"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> ClientConfig {
        let mut argv = vec!["fitshare"];
        argv.extend_from_slice(args);
        ClientConfig::try_parse_from(argv).unwrap()
    }

    #[test]
    fn no_user_id_means_signed_out() {
        let config = parse(&["--username", "sam"]);
        assert!(config.user().is_none());
    }

    #[test]
    fn user_from_flags() {
        let config = parse(&["--user-id", "u1", "--username", "sam"]);
        let user = config.user().unwrap();
        assert_eq!(user.uid, "u1");
        assert_eq!(user.display_name(), "sam");
    }

    #[test]
    fn explicit_token_wins_over_file() {
        let config = parse(&["--token", "abc", "--token-file", "/nonexistent"]);
        assert_eq!(config.token_source().token().as_deref(), Some("abc"));
    }

    #[test]
    fn media_dir_switches_to_local_uploads() {
        let config = parse(&["--media-dir", "/tmp/fitshare-media"]);
        assert!(!config.media_config().is_remote());

        let config = parse(&["--api-url", "http://api.test/api"]);
        assert_eq!(
            config.media_config().endpoint_url.as_deref(),
            Some("http://api.test/api")
        );
    }

    #[test]
    fn sync_policy_parses_kebab_case() {
        let config = parse(&["--sync-policy", "apply-diff"]);
        assert_eq!(config.sync_policy, SyncPolicy::ApplyDiff);
    }
}
