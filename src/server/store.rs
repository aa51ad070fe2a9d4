//! Backend data: accounts, sessions, the post feed, chat and scores.
//!
//! Everything lives in one JSON document that is rewritten after every
//! mutation. Reads never touch the disk.

use super::auth;
use super::error::ApiError;
use crate::constants::{CHAT_HISTORY_LIMIT, LEADERBOARD_SIZE};
use crate::utils::persistence;
use chrono::Utc;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::PathBuf;

/// A registered account as stored on disk.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: u64,
    pub username: String,
    pub salt: String,
    pub hash: String,
}

impl User {
    pub fn public(&self) -> PublicUser {
        PublicUser {
            id: self.id,
            username: self.username.clone(),
        }
    }
}

/// The part of an account that is safe to send to clients.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PublicUser {
    pub id: u64,
    pub username: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Post {
    pub id: u64,
    pub text: String,
    /// Creation time, Unix milliseconds.
    pub t: u64,
    #[serde(default)]
    pub likes: u64,
    #[serde(rename = "userId", default, skip_serializing_if = "Option::is_none")]
    pub user_id: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub id: u64,
    pub text: String,
    pub t: u64,
    #[serde(rename = "userId", default, skip_serializing_if = "Option::is_none")]
    pub user_id: Option<u64>,
    pub username: String,
}

/// One submitted score. Anonymous submissions have no user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScoreEntry {
    #[serde(rename = "userId")]
    pub user_id: Option<u64>,
    pub username: Option<String>,
    pub score: u64,
    pub t: u64,
}

/// The whole data file.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Data {
    pub posts: Vec<Post>,
    pub highscore: u64,
    pub users: Vec<User>,
    /// Session token -> user id.
    pub tokens: HashMap<String, u64>,
    pub scores: Vec<ScoreEntry>,
    pub chats: Vec<ChatMessage>,
}

pub struct Store {
    /// Where to persist; `None` keeps everything in memory.
    path: Option<PathBuf>,
    data: Data,
    last_id: u64,
}

impl Store {
    /// Load the data file, starting empty if it is missing or unreadable.
    pub fn open(path: PathBuf) -> Self {
        let data: Data = persistence::load_json_or_default(&path);
        log::info!(
            "loaded {} users, {} posts, {} scores from {}",
            data.users.len(),
            data.posts.len(),
            data.scores.len(),
            path.display()
        );
        Self::from_data(Some(path), data)
    }

    pub fn in_memory() -> Self {
        Self::from_data(None, Data::default())
    }

    fn from_data(path: Option<PathBuf>, data: Data) -> Self {
        let last_id = data
            .users
            .iter()
            .map(|u| u.id)
            .chain(data.posts.iter().map(|p| p.id))
            .chain(data.chats.iter().map(|c| c.id))
            .max()
            .unwrap_or(0);
        Self {
            path,
            data,
            last_id,
        }
    }

    pub fn data(&self) -> &Data {
        &self.data
    }

    /// Write `staged` to disk and only then make it the live data, so a
    /// failed write leaves the store exactly as it was.
    fn commit(&mut self, staged: Data) -> Result<(), ApiError> {
        if let Some(path) = &self.path {
            persistence::save_json(path, &staged).map_err(|e| {
                log::error!("failed to write {}: {}", path.display(), e);
                ApiError::Storage(e)
            })?;
        }
        self.data = staged;
        Ok(())
    }

    fn now_millis() -> u64 {
        Utc::now().timestamp_millis().max(0) as u64
    }

    /// Millisecond timestamp ids, bumped so two records never share one.
    fn next_id(&mut self) -> u64 {
        let id = Self::now_millis().max(self.last_id + 1);
        self.last_id = id;
        id
    }

    // ── Accounts ────────────────────────────────────────────────

    pub fn register(&mut self, username: &str, password: &str) -> Result<PublicUser, ApiError> {
        if username.is_empty() || password.is_empty() {
            return Err(ApiError::BadRequest(
                "username and password required".to_string(),
            ));
        }
        if self.data.users.iter().any(|u| u.username == username) {
            return Err(ApiError::Conflict("username taken".to_string()));
        }

        let salt = auth::generate_salt();
        let user = User {
            id: self.next_id(),
            username: username.to_string(),
            hash: auth::hash_password(password, &salt),
            salt,
        };
        let public = user.public();
        let mut staged = self.data.clone();
        staged.users.push(user);
        self.commit(staged)?;
        log::info!("registered user {}", public.username);
        Ok(public)
    }

    /// Check credentials and open a session. Returns the new token.
    pub fn login(
        &mut self,
        username: &str,
        password: &str,
    ) -> Result<(String, PublicUser), ApiError> {
        if username.is_empty() || password.is_empty() {
            return Err(ApiError::BadRequest(
                "username and password required".to_string(),
            ));
        }
        let invalid = || ApiError::Unauthorized("invalid credentials".to_string());
        let user = self
            .data
            .users
            .iter()
            .find(|u| u.username == username)
            .ok_or_else(invalid)?;
        if !auth::verify_password(password, &user.salt, &user.hash) {
            return Err(invalid());
        }

        let public = user.public();
        let token = auth::generate_token();
        let mut staged = self.data.clone();
        staged.tokens.insert(token.clone(), public.id);
        self.commit(staged)?;
        Ok((token, public))
    }

    /// Revoke a session token. Unknown tokens are ignored.
    pub fn logout(&mut self, token: &str) -> Result<(), ApiError> {
        if !self.data.tokens.contains_key(token) {
            return Ok(());
        }
        let mut staged = self.data.clone();
        staged.tokens.remove(token);
        self.commit(staged)
    }

    pub fn user_for_token(&self, token: &str) -> Option<PublicUser> {
        let user_id = self.data.tokens.get(token)?;
        self.data
            .users
            .iter()
            .find(|u| u.id == *user_id)
            .map(User::public)
    }

    // ── Feed ────────────────────────────────────────────────────

    /// A post with its author's current username filled in.
    fn resolve_post(&self, post: &Post) -> Post {
        let current = post
            .user_id
            .and_then(|id| self.data.users.iter().find(|u| u.id == id))
            .map(|u| u.username.clone());
        let username = current
            .or_else(|| post.username.clone())
            .unwrap_or_else(|| "anonymous".to_string());
        Post {
            username: Some(username),
            ..post.clone()
        }
    }

    pub fn posts(&self) -> Vec<Post> {
        self.data
            .posts
            .iter()
            .map(|p| self.resolve_post(p))
            .collect()
    }

    pub fn create_post(
        &mut self,
        text: &str,
        author: Option<&PublicUser>,
    ) -> Result<Post, ApiError> {
        if text.trim().is_empty() {
            return Err(ApiError::BadRequest("text required".to_string()));
        }
        let id = self.next_id();
        let post = Post {
            id,
            text: text.to_string(),
            t: id,
            likes: 0,
            user_id: author.map(|u| u.id),
            username: author.map(|u| u.username.clone()),
        };
        let mut staged = self.data.clone();
        staged.posts.push(post.clone());
        self.commit(staged)?;
        Ok(post)
    }

    pub fn like_post(&mut self, id: u64) -> Result<Post, ApiError> {
        let mut staged = self.data.clone();
        let post = staged
            .posts
            .iter_mut()
            .find(|p| p.id == id)
            .ok_or_else(ApiError::not_found)?;
        post.likes += 1;
        let post = post.clone();
        self.commit(staged)?;
        Ok(self.resolve_post(&post))
    }

    /// Delete a post. Posts with an author can only be deleted by that
    /// author; anonymous posts can be deleted by anyone.
    pub fn delete_post(&mut self, id: u64, caller: Option<&PublicUser>) -> Result<Post, ApiError> {
        let idx = self
            .data
            .posts
            .iter()
            .position(|p| p.id == id)
            .ok_or_else(ApiError::not_found)?;
        if let Some(owner) = self.data.posts[idx].user_id {
            if caller.map(|u| u.id) != Some(owner) {
                return Err(ApiError::Forbidden("forbidden".to_string()));
            }
        }
        let mut staged = self.data.clone();
        let removed = staged.posts.remove(idx);
        self.commit(staged)?;
        Ok(removed)
    }

    // ── Scores ──────────────────────────────────────────────────

    pub fn highscore(&self) -> u64 {
        self.data.highscore
    }

    /// Record a finished round. The global highscore only ever increases;
    /// every submission gets a leaderboard entry. Returns the highscore.
    pub fn submit_score(
        &mut self,
        score: u64,
        player: Option<&PublicUser>,
    ) -> Result<u64, ApiError> {
        let mut staged = self.data.clone();
        staged.highscore = staged.highscore.max(score);
        staged.scores.push(ScoreEntry {
            user_id: player.map(|u| u.id),
            username: player.map(|u| u.username.clone()),
            score,
            t: Self::now_millis(),
        });
        self.commit(staged)?;
        Ok(self.data.highscore)
    }

    /// Best entries first; equal scores keep submission order.
    pub fn leaderboard(&self) -> Vec<ScoreEntry> {
        let mut entries = self.data.scores.clone();
        entries.sort_by(|a, b| b.score.cmp(&a.score).then(a.t.cmp(&b.t)));
        entries.truncate(LEADERBOARD_SIZE);
        entries
    }

    pub fn clear_leaderboard(&mut self) -> Result<(), ApiError> {
        let mut staged = self.data.clone();
        staged.scores.clear();
        self.commit(staged)
    }

    // ── Chat ────────────────────────────────────────────────────

    pub fn chats(&self) -> Vec<ChatMessage> {
        let skip = self.data.chats.len().saturating_sub(CHAT_HISTORY_LIMIT);
        self.data.chats[skip..].to_vec()
    }

    pub fn post_chat(
        &mut self,
        text: &str,
        author: Option<&PublicUser>,
    ) -> Result<ChatMessage, ApiError> {
        if text.trim().is_empty() {
            return Err(ApiError::BadRequest("text required".to_string()));
        }
        let id = self.next_id();
        let message = ChatMessage {
            id,
            text: text.to_string(),
            t: id,
            user_id: author.map(|u| u.id),
            username: author
                .map(|u| u.username.clone())
                .unwrap_or_else(|| "anonymous".to_string()),
        };
        let mut staged = self.data.clone();
        staged.chats.push(message.clone());
        self.commit(staged)?;
        Ok(message)
    }
}
