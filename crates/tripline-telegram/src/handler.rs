// SPDX-FileCopyrightText: 2026 Tripline Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Message routing, chat authorization, and mention handling.
//!
//! Decides whether an incoming Telegram message should be processed and
//! turns it into a channel-agnostic [`InboundEvent`].

use teloxide::prelude::*;
use teloxide::types::ChatKind;

use tripline_core::types::InboundEvent;

/// Checks whether the message arrived in an allowed chat.
///
/// The allow-list holds chat ids (groups or DMs). An empty list rejects
/// everything.
pub fn is_allowed_chat(msg: &Message, allowed_chats: &[i64]) -> bool {
    if allowed_chats.is_empty() {
        return false;
    }
    allowed_chats.contains(&msg.chat.id.0)
}

/// Checks whether the message is from a private (DM) chat.
pub fn is_dm(msg: &Message) -> bool {
    matches!(msg.chat.kind, ChatKind::Private(_))
}

/// The processable text of a message, if any.
///
/// Non-text messages yield `None`. DM text passes through trimmed. Group
/// text must mention the bot; the mention (any casing, anywhere in the
/// text, including a `/cmd@botname` command suffix) is stripped before the
/// text is returned.
pub fn relevant_text(msg: &Message, bot_username: &str) -> Option<String> {
    let text = msg.text()?;
    if is_dm(msg) {
        return Some(text.trim().to_string());
    }

    let mention = format!("@{bot_username}");
    find_ignore_ascii_case(text, &mention)?;
    Some(strip_mention(text, &mention).trim().to_string())
}

/// Converts an accepted message into an [`InboundEvent`].
pub fn to_inbound_event(msg: &Message, text: String) -> InboundEvent {
    InboundEvent {
        chat_id: msg.chat.id.0,
        sender_id: msg.from.as_ref().map(|user| user.id.0 as i64),
        text,
    }
}

/// Removes every (ASCII-case-insensitive) occurrence of `mention`.
fn strip_mention(text: &str, mention: &str) -> String {
    let mut remaining = text;
    let mut result = String::with_capacity(text.len());
    while let Some(pos) = find_ignore_ascii_case(remaining, mention) {
        result.push_str(&remaining[..pos]);
        remaining = &remaining[pos + mention.len()..];
    }
    result.push_str(remaining);
    result
}

/// Byte offset of the first ASCII-case-insensitive occurrence of `needle`.
fn find_ignore_ascii_case(haystack: &str, needle: &str) -> Option<usize> {
    if needle.is_empty() || haystack.len() < needle.len() {
        return None;
    }
    (0..=haystack.len() - needle.len())
        .filter(|&i| haystack.is_char_boundary(i) && haystack.is_char_boundary(i + needle.len()))
        .find(|&i| haystack[i..i + needle.len()].eq_ignore_ascii_case(needle))
}
