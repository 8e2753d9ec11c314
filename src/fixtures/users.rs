use bson::oid::ObjectId;
use bson::DateTime;

use crate::models::User;

/// (username, email, first name, last name)
const USERS: [(&str, &str, &str, &str); 3] = [
    ("john_doe", "john@example.com", "John", "Doe"),
    ("jane_smith", "jane@example.com", "Jane", "Smith"),
    ("bob_wilson", "bob@example.com", "Bob", "Wilson"),
];

/// Demo users, each with a fresh id and `now` as both timestamps.
pub fn users(now: DateTime) -> Vec<User> {
    USERS
        .iter()
        .map(|&(username, email, first_name, last_name)| User {
            id: ObjectId::new(),
            username: username.to_string(),
            email: email.to_string(),
            first_name: first_name.to_string(),
            last_name: last_name.to_string(),
            created_at: now,
            updated_at: now,
        })
        .collect()
}
