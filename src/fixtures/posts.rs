use bson::oid::ObjectId;
use bson::DateTime;

use crate::models::{Post, PostStatus};

/// A post waiting for its author's id.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PostFixture {
    /// Username of the author.
    pub author: &'static str,
    pub title: &'static str,
    pub content: &'static str,
    pub status: PostStatus,
    pub tags: &'static [&'static str],
}

impl PostFixture {
    /// Materialize the post for the resolved author id.
    pub fn into_post(self, user_id: ObjectId, now: DateTime) -> Post {
        Post {
            id: ObjectId::new(),
            user_id,
            title: self.title.to_string(),
            content: self.content.to_string(),
            status: self.status,
            tags: self.tags.iter().map(|t| t.to_string()).collect(),
            created_at: now,
            updated_at: now,
        }
    }
}

const POSTS: [PostFixture; 3] = [
    PostFixture {
        author: "john_doe",
        title: "My First Post",
        content: "This is my first blog post!",
        status: PostStatus::Published,
        tags: &["blog", "first"],
    },
    PostFixture {
        author: "jane_smith",
        title: "Learning MongoDB",
        content: "MongoDB is a powerful NoSQL database.",
        status: PostStatus::Published,
        tags: &["mongodb", "database"],
    },
    PostFixture {
        author: "john_doe",
        title: "Draft Post",
        content: "This is a draft post.",
        status: PostStatus::Draft,
        tags: &["draft"],
    },
];

/// Demo posts.
pub fn posts() -> Vec<PostFixture> {
    POSTS.to_vec()
}
