use fitshare_core::User;

use crate::state::Action;

/// The "share something" banner at the top of the feed.
#[derive(Debug, Clone, Copy, Default)]
pub struct QuickPost;

impl QuickPost {
    pub fn placeholder(user: Option<&User>) -> String {
        let name = user.map(User::display_name).unwrap_or("User");
        format!("What skill are you sharing today, {name}?")
    }

    pub fn activate(&self) -> Action {
        Action::OpenCreateStory
    }
}
