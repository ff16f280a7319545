//! Built-in offline catalog.
//!
//! A handful of seeded posts and users, enough for the feed and login screens
//! to render while the backend is away. Posts created offline are kept in
//! memory for the lifetime of the source.

use std::sync::{Arc, Mutex};
use std::time::{Duration, SystemTime, UNIX_EPOCH};

use async_trait::async_trait;
use serde_json::{json, Value};
use uuid::Uuid;

use crate::substitute::{required_str, SubstituteError, SubstituteResult, SubstituteSource};

const OTP_LENGTH: usize = 6;

/// In-memory substitute data source.
#[derive(Debug, Clone)]
pub struct LocalDataSource {
    /// Posts created while offline, newest first.
    created: Arc<Mutex<Vec<Value>>>,
    max_latency: Duration,
}

impl Default for LocalDataSource {
    fn default() -> Self {
        Self::new()
    }
}

impl LocalDataSource {
    pub fn new() -> Self {
        Self {
            created: Arc::new(Mutex::new(Vec::new())),
            max_latency: Duration::ZERO,
        }
    }

    /// Add a random delay of up to `max` to every operation.
    pub fn with_simulated_latency(mut self, max: Duration) -> Self {
        self.max_latency = max;
        self
    }

    async fn pause(&self) {
        let max_ms = self.max_latency.as_millis() as u64;
        if max_ms > 0 {
            tokio::time::sleep(Duration::from_millis(fastrand::u64(0..=max_ms))).await;
        }
    }

    fn created_posts(&self) -> Vec<Value> {
        self.created
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }

    fn session_for(email: &str) -> Value {
        json!({
            "token": format!("offline-{}", Uuid::new_v4()),
            "user": user_for(email),
        })
    }
}

fn user_for(email: &str) -> Value {
    seeded_users()
        .into_iter()
        .find(|u| u["email"] == email)
        .unwrap_or_else(|| {
            let name = email.split('@').next().unwrap_or(email);
            json!({
                "_id": format!("offline-{name}"),
                "name": name,
                "email": email,
                "branch": "Other",
                "year": 1,
            })
        })
}

fn seeded_users() -> Vec<Value> {
    vec![
        json!({
            "_id": "u-1001",
            "name": "Aarav Mishra",
            "email": "aarav@kiit.ac.in",
            "branch": "Computer Science Engineering",
            "year": 3,
        }),
        json!({
            "_id": "u-1002",
            "name": "Isha Patnaik",
            "email": "isha@kiit.ac.in",
            "branch": "Electronics and Communication",
            "year": 2,
        }),
    ]
}

fn seeded_posts() -> Vec<Value> {
    vec![
        json!({
            "_id": "p-2001",
            "title": "Welcome to the offline feed",
            "content": "The campus server is unreachable. You are browsing cached posts.",
            "category": "General",
            "tags": ["campus"],
            "isAnonymous": false,
            "author": { "_id": "u-1001", "name": "Aarav Mishra" },
            "likes": 12,
            "comments": [],
            "createdAt": "2024-01-15T09:30:00.000Z",
        }),
        json!({
            "_id": "p-2002",
            "title": "Mid-sem timetable is out",
            "content": "Check the academic portal for your section's schedule.",
            "category": "Academics",
            "tags": ["kiit", "engineering"],
            "isAnonymous": false,
            "author": { "_id": "u-1002", "name": "Isha Patnaik" },
            "likes": 34,
            "comments": [],
            "createdAt": "2024-01-14T16:05:00.000Z",
        }),
        json!({
            "_id": "p-2003",
            "title": "Anyone selling a drafter?",
            "content": "First year, need one before Monday's ED lab.",
            "category": "Bookies",
            "tags": ["tech"],
            "isAnonymous": true,
            "likes": 3,
            "comments": [],
            "createdAt": "2024-01-13T11:45:00.000Z",
        }),
    ]
}

fn now_millis() -> u128 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_millis()
}

#[async_trait]
impl SubstituteSource for LocalDataSource {
    async fn authenticate(&self, credentials: Value) -> SubstituteResult<Value> {
        self.pause().await;
        let email = required_str(&credentials, "email")?;
        required_str(&credentials, "password")?;
        Ok(Self::session_for(email))
    }

    async fn register(&self, new_user: Value) -> SubstituteResult<Value> {
        self.pause().await;
        let email = required_str(&new_user, "email")?;
        required_str(&new_user, "password")?;
        Ok(json!({
            "message": format!("OTP sent to {email} (Offline Mode)"),
            "email": email,
        }))
    }

    async fn verify_one_time_code(&self, payload: Value) -> SubstituteResult<Value> {
        self.pause().await;
        let email = required_str(&payload, "email")?;
        let otp = required_str(&payload, "otp")?;
        if otp.len() != OTP_LENGTH || !otp.chars().all(|c| c.is_ascii_digit()) {
            return Err(SubstituteError::Rejected(format!(
                "one-time code must be {OTP_LENGTH} digits"
            )));
        }
        Ok(Self::session_for(email))
    }

    async fn list_posts(&self) -> SubstituteResult<Value> {
        self.pause().await;
        let mut posts = self.created_posts();
        posts.extend(seeded_posts());
        Ok(json!({
            "posts": posts,
            "totalPages": 1,
            "currentPage": 1,
        }))
    }

    async fn list_event_posts(&self) -> SubstituteResult<Value> {
        self.pause().await;
        Ok(json!([]))
    }

    async fn list_user_suggestions(&self) -> SubstituteResult<Value> {
        self.pause().await;
        Ok(json!([]))
    }

    async fn create_post(&self, post: Value) -> SubstituteResult<Value> {
        self.pause().await;
        let title = required_str(&post, "title")?;
        let content = required_str(&post, "content")?;
        let created = json!({
            "_id": format!("offline-{}", Uuid::new_v4()),
            "title": title,
            "content": content,
            "category": post.get("category").cloned().unwrap_or(Value::Null),
            "tags": post.get("tags").cloned().unwrap_or(Value::Null),
            "isAnonymous": post.get("isAnonymous").and_then(Value::as_bool).unwrap_or(false),
            "likes": 0,
            "comments": [],
            "createdAtMillis": now_millis().to_string(),
        });

        self.created
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .insert(0, created.clone());
        Ok(created)
    }
}
