//! Scenario data: the test parametrization surface.
//!
//! Each scenario is a structured record `{case_id, description, input,
//! expected}` loaded from JSON. Suites iterate the records and drive page
//! flows with `input`, asserting against `expected`.

use std::path::Path;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::pages::Category;
use crate::result::ForoResult;

/// One parametrized test case
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Scenario<I> {
    /// Stable case identifier, e.g. `register_invalid_password_no_digit`
    pub case_id: String,
    /// Human-readable description
    #[serde(default)]
    pub description: String,
    /// Flow input
    pub input: I,
    /// Expected outcome
    pub expected: Expected,
}

/// Expected outcome of a scenario
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Expected {
    /// Whether the flow should succeed
    pub success: bool,
    /// Substring the toast must contain (None = no toast asserted)
    pub toast_message: Option<String>,
    /// Whether a redirect to the forum root is expected
    pub redirect_to_home: bool,
    /// Whether a redirect to the created thread is expected
    pub redirect_to_thread: bool,
    /// Expected like state after the flow
    pub like_status: Option<bool>,
    /// Expected toggle-button label after the flow
    pub button_text: Option<String>,
}

/// Registration form input
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegisterInput {
    /// Username
    pub username: String,
    /// Password
    pub password: String,
    /// Password confirmation
    pub repeat_password: String,
    /// Nickname
    pub nickname: String,
}

/// New-thread form input
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PostInput {
    /// Thread title
    pub title: String,
    /// Thread body
    pub content: String,
    /// Category label as shown in the UI
    pub category: String,
}

impl PostInput {
    /// Map the UI category label onto the page enum
    #[must_use]
    pub fn category(&self) -> Category {
        if self.category == "其他分类" {
            Category::Other
        } else {
            Category::Default
        }
    }
}

/// Comment input
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CommentInput {
    /// Target thread
    pub thread_id: u64,
    /// Comment content (empty content is a valid negative case)
    pub content: String,
}

/// Like-toggle input
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LikeInput {
    /// Target thread
    pub thread_id: u64,
}

/// Follow-toggle input
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FollowInput {
    /// Target user
    pub user_id: u64,
}

/// Block-toggle input
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BlockInput {
    /// Target user
    pub user_id: u64,
}

/// Private-message input
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MessageInput {
    /// Recipient user id
    pub user_id: u64,
    /// Recipient nickname (part of the chat URL)
    pub nickname: String,
    /// Message content
    pub content: String,
}

/// The forum suite's grouped scenario file
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ForumCases {
    /// Posting scenarios
    pub post_tests: Vec<Scenario<PostInput>>,
    /// Like/unlike scenarios
    pub like_tests: Vec<Scenario<LikeInput>>,
    /// Comment scenarios
    pub comment_tests: Vec<Scenario<CommentInput>>,
    /// Follow/unfollow scenarios
    pub follow_tests: Vec<Scenario<FollowInput>>,
    /// Block/unblock scenarios
    pub block_tests: Vec<Scenario<BlockInput>>,
    /// Private-message scenarios
    pub message_tests: Vec<Scenario<MessageInput>>,
}

/// Load the register suite (a flat array of scenarios)
pub fn load_register_cases(path: impl AsRef<Path>) -> ForoResult<Vec<Scenario<RegisterInput>>> {
    load_json(path)
}

/// Load the grouped forum suite
pub fn load_forum_cases(path: impl AsRef<Path>) -> ForoResult<ForumCases> {
    load_json(path)
}

fn load_json<T: DeserializeOwned>(path: impl AsRef<Path>) -> ForoResult<T> {
    let raw = std::fs::read_to_string(path.as_ref())?;
    Ok(serde_json::from_str(&raw)?)
}

/// Find a scenario by case id
#[must_use]
pub fn find_case<'a, I>(cases: &'a [Scenario<I>], case_id: &str) -> Option<&'a Scenario<I>> {
    cases.iter().find(|c| c.case_id == case_id)
}

#[cfg(test)]
mod tests {
    use super::*;

    const REGISTER_JSON: &str = r#"[
        {
            "case_id": "register_valid_1",
            "description": "digit-bearing 8-char password with matching repeat",
            "input": {
                "username": "e2e_user_1",
                "password": "abc12345",
                "repeat_password": "abc12345",
                "nickname": "e2e昵称一"
            },
            "expected": {"success": true, "toast_message": null, "redirect_to_home": true}
        },
        {
            "case_id": "register_invalid_password_no_digit",
            "input": {
                "username": "e2e_user_2",
                "password": "abcdefgh",
                "repeat_password": "abcdefgh",
                "nickname": "e2e昵称二"
            },
            "expected": {"success": false, "toast_message": "必须包含数字"}
        }
    ]"#;

    const FORUM_JSON: &str = r#"{
        "post_tests": [
            {
                "case_id": "post_valid_other_category",
                "input": {"title": "测试帖", "content": "内容", "category": "其他分类"},
                "expected": {"success": true, "redirect_to_thread": true}
            }
        ],
        "comment_tests": [
            {
                "case_id": "comment_invalid_empty",
                "input": {"thread_id": 1, "content": ""},
                "expected": {"success": false, "toast_message": "请输入内容"}
            }
        ],
        "follow_tests": [
            {
                "case_id": "follow_user",
                "input": {"user_id": 2},
                "expected": {"success": true, "button_text": "已关注"}
            }
        ]
    }"#;

    #[test]
    fn test_register_cases_parse() {
        let cases: Vec<Scenario<RegisterInput>> = serde_json::from_str(REGISTER_JSON).unwrap();
        assert_eq!(cases.len(), 2);

        let valid = find_case(&cases, "register_valid_1").unwrap();
        assert_eq!(valid.input.password, "abc12345");
        assert!(valid.expected.success);
        assert!(valid.expected.redirect_to_home);
        assert!(valid.expected.toast_message.is_none());

        let no_digit = find_case(&cases, "register_invalid_password_no_digit").unwrap();
        assert!(!no_digit.expected.success);
        assert_eq!(no_digit.expected.toast_message.as_deref(), Some("必须包含数字"));
        // unlisted expectation keys default off
        assert!(!no_digit.expected.redirect_to_home);
    }

    #[test]
    fn test_forum_cases_parse_with_missing_groups() {
        let cases: ForumCases = serde_json::from_str(FORUM_JSON).unwrap();
        assert_eq!(cases.post_tests.len(), 1);
        assert_eq!(cases.comment_tests.len(), 1);
        assert!(cases.like_tests.is_empty());
        assert!(cases.message_tests.is_empty());

        let empty_comment = find_case(&cases.comment_tests, "comment_invalid_empty").unwrap();
        assert_eq!(empty_comment.input.content, "");
        assert_eq!(
            empty_comment.expected.toast_message.as_deref(),
            Some("请输入内容")
        );
    }

    #[test]
    fn test_category_label_mapping() {
        let other = PostInput {
            title: String::new(),
            content: String::new(),
            category: "其他分类".into(),
        };
        assert_eq!(other.category(), Category::Other);

        let default = PostInput {
            title: String::new(),
            content: String::new(),
            category: "默认分类".into(),
        };
        assert_eq!(default.category(), Category::Default);
    }

    #[test]
    fn test_load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("register_cases.json");
        std::fs::write(&path, REGISTER_JSON).unwrap();
        let cases = load_register_cases(&path).unwrap();
        assert_eq!(cases.len(), 2);
    }

    #[test]
    fn test_find_case_miss() {
        let cases: Vec<Scenario<RegisterInput>> = serde_json::from_str(REGISTER_JSON).unwrap();
        assert!(find_case(&cases, "nonexistent").is_none());
    }
}
