// SPDX-FileCopyrightText: 2026 Tripline Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Multi-turn slot-filling dialogue.
//!
//! One [`DialogueEngine`] serves every chat. Idle messages go through
//! intent extraction; requests still missing a period or area slot are
//! parked per chat and completed from the next reply. Parked
//! conversations expire after an idle timeout, and `/cancel` drops them
//! explicitly. Complete requests hand off to the report orchestrator.

use std::collections::HashMap;
use std::sync::{Arc, LazyLock};
use std::time::Duration;

use chrono::Utc;
use chrono_tz::Tz;
use regex::Regex;
use strum::Display;
use tokio::time::Instant;
use tracing::{debug, error, warn};
use tripline_core::error::TriplineError;
use tripline_core::traits::ReportChannel;
use tripline_core::types::{ALL_SENTINEL, InboundEvent, Intent};
use tripline_extract::{IntentExtractor, PeriodResolver};

use crate::orchestrator::ReportOrchestrator;

/// Matches a reply that asks for every area.
static ALL_AREAS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\ball\s+areas?\b|\ball\b").unwrap());

/// Captures the numeric part of an `Area-7` / `area 7` style reference.
static AREA_NUMBER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)area\s*-?\s*(\d+)").unwrap());

/// The slot a parked conversation is waiting for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
pub enum SlotState {
    #[strum(serialize = "awaiting period")]
    AwaitingPeriod,
    #[strum(serialize = "awaiting area")]
    AwaitingArea,
}

/// A partially-filled request, parked until the user supplies the
/// missing slot. The timestamp refreshes on every park, so the idle
/// timeout is measured from the last exchange.
#[derive(Debug, Clone)]
struct Conversation {
    intent: Intent,
    waiting: SlotState,
    started: Instant,
}

impl Conversation {
    fn new(intent: Intent, waiting: SlotState) -> Self {
        Self {
            intent,
            waiting,
            started: Instant::now(),
        }
    }
}

/// Per-chat dialogue state machine in front of the report pipeline.
pub struct DialogueEngine {
    extractor: IntentExtractor,
    resolver: PeriodResolver,
    orchestrator: ReportOrchestrator,
    channel: Arc<dyn ReportChannel>,
    categories: Vec<String>,
    areas: Vec<String>,
    timeout: Duration,
    tz: Tz,
    conversations: HashMap<i64, Conversation>,
}

impl DialogueEngine {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        extractor: IntentExtractor,
        resolver: PeriodResolver,
        orchestrator: ReportOrchestrator,
        channel: Arc<dyn ReportChannel>,
        categories: Vec<String>,
        areas: Vec<String>,
        timeout: Duration,
        tz: Tz,
    ) -> Self {
        Self {
            extractor,
            resolver,
            orchestrator,
            channel,
            categories,
            areas,
            timeout,
            tz,
            conversations: HashMap::new(),
        }
    }

    /// The slot a chat's parked conversation is waiting on, if any.
    pub fn waiting_for(&self, chat_id: i64) -> Option<SlotState> {
        self.conversations.get(&chat_id).map(|c| c.waiting)
    }

    /// Routes one inbound message.
    ///
    /// Bot mentions are already stripped at the channel boundary, so
    /// commands arrive bare. An error here means a send failed; dialogue
    /// state stays consistent either way.
    pub async fn handle(&mut self, event: InboundEvent) -> Result<(), TriplineError> {
        self.evict_stale();
        let chat_id = event.chat_id;
        let text = event.text.trim();

        if text.eq_ignore_ascii_case("/cancel") {
            if self.conversations.remove(&chat_id).is_some() {
                debug!(chat_id, "conversation cancelled");
            }
            return self.channel.send_text(chat_id, "Operation cancelled.").await;
        }
        if text.eq_ignore_ascii_case("/start") {
            // A parked conversation survives /start; only /cancel or the
            // idle timeout clears it.
            return self.channel.send_text(chat_id, &self.welcome()).await;
        }

        // The entry comes out of the map before handling; reply handlers
        // re-park it when the slot is still unresolved.
        match self.conversations.remove(&chat_id) {
            None => self.handle_idle(chat_id, text).await,
            Some(conversation) => {
                debug!(chat_id, state = %conversation.waiting, "resuming conversation");
                match conversation.waiting {
                    SlotState::AwaitingPeriod => {
                        self.handle_period_reply(chat_id, conversation.intent, text).await
                    }
                    SlotState::AwaitingArea => {
                        self.handle_area_reply(chat_id, conversation.intent, text).await
                    }
                }
            }
        }
    }

    /// Handles a message from a chat with no conversation in flight.
    async fn handle_idle(&mut self, chat_id: i64, text: &str) -> Result<(), TriplineError> {
        let intent = self.extractor.extract(text).await;

        if intent.categories.is_empty() && !intent.all_categories {
            debug!(chat_id, "no category in request, asking for one");
            return self.channel.send_text(chat_id, &self.category_guidance()).await;
        }

        if !intent.has_period {
            self.channel.send_text(chat_id, &period_question(&intent)).await?;
            self.conversations
                .insert(chat_id, Conversation::new(intent, SlotState::AwaitingPeriod));
            return Ok(());
        }

        if !intent.has_area {
            let question = format!(
                "Got it! Categories: {categories}\nPeriod: {period}\n\n{tail}",
                categories = categories_display(&intent),
                period = intent.period_text.as_deref().unwrap_or(""),
                tail = self.area_prompt_tail(),
            );
            self.channel.send_text(chat_id, &question).await?;
            self.conversations
                .insert(chat_id, Conversation::new(intent, SlotState::AwaitingArea));
            return Ok(());
        }

        self.execute(chat_id, intent).await
    }

    /// Completes the period slot from a reply.
    ///
    /// The reply is stored verbatim as the period phrase; it resolves to
    /// dates only at execution time.
    async fn handle_period_reply(
        &mut self,
        chat_id: i64,
        mut intent: Intent,
        reply: &str,
    ) -> Result<(), TriplineError> {
        intent.period_text = Some(reply.to_string());
        intent.has_period = true;

        if !intent.has_area {
            let question = format!(
                "✅ Period: {reply}\nCategories: {categories}\n\n{tail}",
                categories = categories_display(&intent),
                tail = self.area_prompt_tail(),
            );
            self.channel.send_text(chat_id, &question).await?;
            self.conversations
                .insert(chat_id, Conversation::new(intent, SlotState::AwaitingArea));
            return Ok(());
        }

        self.execute(chat_id, intent).await
    }

    /// Completes the area slot from a reply.
    ///
    /// Resolution order: literal all-areas phrasing, then extraction,
    /// then local matching against the configured names. A reply that
    /// resolves no area re-parks the conversation.
    async fn handle_area_reply(
        &mut self,
        chat_id: i64,
        mut intent: Intent,
        reply: &str,
    ) -> Result<(), TriplineError> {
        if ALL_AREAS.is_match(reply) {
            intent.areas = vec![ALL_SENTINEL.to_string()];
            intent.all_areas = true;
        } else {
            let parsed = self.extractor.extract(reply).await;
            if parsed.all_areas || !parsed.areas.is_empty() {
                intent.areas = parsed.areas;
                intent.all_areas = parsed.all_areas;
            } else {
                let matched = match_areas(reply, &self.areas);
                if matched.is_empty() {
                    debug!(chat_id, "area reply did not resolve, asking again");
                    let message = format!(
                        "❌ Could not identify the area(s) '{reply}'. Please specify:\n\
• Single area: 'Area-1', 'Area 1', or full name\n\
• Multiple areas: 'Area 1 and Area 2', 'Area-1, Area-2'\n\
• All areas: 'all areas' or 'all'"
                    );
                    self.channel.send_text(chat_id, &message).await?;
                    self.conversations
                        .insert(chat_id, Conversation::new(intent, SlotState::AwaitingArea));
                    return Ok(());
                }
                intent.areas = matched;
                intent.all_areas = false;
            }
        }
        intent.has_area = true;

        self.execute(chat_id, intent).await
    }

    /// Runs a complete request: acknowledge, resolve the period, then
    /// generate and deliver the reports.
    async fn execute(&mut self, chat_id: i64, intent: Intent) -> Result<(), TriplineError> {
        let period_text = intent.period_text.clone().unwrap_or_default();

        let acknowledgement = format!(
            "✅ Processing your request...\n\n\
Categories: {categories}\n\
Areas: {areas}\n\
Period: {period}\n\n\
⏳ Please wait while I generate the Excel file(s)...",
            categories = categories_display(&intent),
            areas = areas_display(&intent),
            period = period_text,
        );
        self.channel.send_text(chat_id, &acknowledgement).await?;

        let now = Utc::now().with_timezone(&self.tz);
        let period = match self.resolver.resolve(&period_text, now).await {
            Ok(period) => period,
            Err(err) => {
                warn!(chat_id, period = %period_text, error = %err, "period did not resolve");
                let message = format!(
                    "❌ Could not parse the period '{period_text}'. Please provide a valid date/period:\n\
• 'Jan 2025', 'January 2025'\n\
• 'Jun 2024 to Aug 2024'\n\
• '2025' (full year)\n\
• 'August' (month only - last occurrence)"
                );
                return self.channel.send_text(chat_id, &message).await;
            }
        };

        match self.orchestrator.run(chat_id, &intent, &period).await {
            Ok(summary) => {
                debug!(chat_id, files = summary.files, trips = summary.trips, "request completed");
                Ok(())
            }
            Err(err) => {
                error!(chat_id, error = %err, "report run failed");
                let message = format!(
                    "❌ An error occurred while processing your query: {err}\n\n\
Please try again or contact support."
                );
                self.channel.send_text(chat_id, &message).await
            }
        }
    }

    /// Drops conversations idle past the timeout.
    fn evict_stale(&mut self) {
        let timeout = self.timeout;
        self.conversations.retain(|chat_id, conversation| {
            let live = conversation.started.elapsed() < timeout;
            if !live {
                debug!(chat_id = *chat_id, "evicting stale conversation");
            }
            live
        });
    }

    fn welcome(&self) -> String {
        format!(
            "👋 Welcome to the Trip Report Bot!\n\n\
I can generate Excel files for trip data. Just ask me naturally!\n\n\
📝 Examples:\n\
• 'Give me Excel file for PS trips for Area -1 for Jun 2024'\n\
• 'PS and MC trips Area 1 Jun 2024 to Aug 2024'\n\
• 'All categories Area 1 Jun 2024'\n\
• 'August trips' (all categories, last August)\n\
• 'MC trips Area 5 for June 2023'\n\n\
✨ I can handle:\n\
✅ Multiple categories: 'PS and MC trips'\n\
✅ Multiple areas: 'Area 1 and Area 2'\n\
✅ All areas: 'all areas'\n\
✅ Date ranges: 'Jun 2024 to Aug 2024'\n\
✅ Month-only: 'August' (finds last occurrence)\n\
✅ All categories: 'all categories' or 'all trips'\n\n\
Available Categories: {categories}\n\n\
💡 Tip: Tag me in a group or send me a message directly!",
            categories = self.categories.join(", ")
        )
    }

    fn category_guidance(&self) -> String {
        format!(
            "I couldn't find the trip category in your query. Please specify one or more of: {categories}\n\
You can also say 'all categories' or 'all trips'.\n\n\
Examples:\n\
• 'Give me Excel file for PS trips for Area -1 for Jan 2025'\n\
• 'PS and MC trips Area 1 Jun 2024'\n\
• 'All categories Area 1 Jun 2024 to Aug 2024'\n\
• 'August trips' (all categories, last August)",
            categories = self.categories.join(", ")
        )
    }

    /// The area question shared by both paths that ask for one; callers
    /// prepend a header recapping what is already filled.
    fn area_prompt_tail(&self) -> String {
        let listing = self
            .areas
            .iter()
            .map(|area| format!("• {area}"))
            .collect::<Vec<_>>()
            .join("\n");
        format!(
            "❓ For which area(s) would you like the Excel file?\n\
Please specify:\n\
• Single area: 'Area-1', 'Area 1', or full name\n\
• Multiple areas: 'Area 1 and Area 2', 'Area-1, Area-2'\n\
• All areas: 'all areas' or 'all'\n\n\
Available areas:\n{listing}"
        )
    }
}

/// The period question, recapping the slots filled so far.
fn period_question(intent: &Intent) -> String {
    let area_line = match intent.areas.first() {
        Some(area) => format!("Area: {area}"),
        None => "Area: Not specified".to_string(),
    };
    format!(
        "Got it! Categories: {categories}\n\
{area_line}\n\n\
❓ For what period would you like the Excel file?\n\
Please provide:\n\
• Month and year (e.g., 'Jan 2025', 'January 2025')\n\
• Date range (e.g., 'Jun 2024 to Aug 2024')\n\
• Year only (e.g., '2025')\n\
• Month only (e.g., 'August' - will use last occurrence)",
        categories = categories_display(intent),
    )
}

fn categories_display(intent: &Intent) -> String {
    if intent.all_categories {
        "All categories".to_string()
    } else if intent.categories.is_empty() {
        "Unknown".to_string()
    } else {
        intent.categories.join(", ")
    }
}

fn areas_display(intent: &Intent) -> String {
    if intent.all_areas {
        "All areas".to_string()
    } else if intent.areas.is_empty() {
        "Unknown".to_string()
    } else {
        intent.areas.join(", ")
    }
}

/// Resolves an area reply against the configured names without the
/// extraction backend: numbered references first (the Nth configured
/// area), then containment against the full names.
fn match_areas(reply: &str, configured: &[String]) -> Vec<String> {
    let mut matched: Vec<String> = Vec::new();
    for caps in AREA_NUMBER.captures_iter(reply) {
        let Ok(number) = caps[1].parse::<usize>() else {
            continue;
        };
        if number >= 1 && number <= configured.len() {
            let area = &configured[number - 1];
            if !matched.contains(area) {
                matched.push(area.clone());
            }
        }
    }
    if !matched.is_empty() {
        return matched;
    }

    let reply_lower = reply.to_lowercase();
    for area in configured {
        let area_lower = area.to_lowercase();
        if area_lower.contains(&reply_lower) || reply_lower.contains(&area_lower) {
            matched.push(area.clone());
            break;
        }
    }
    matched
}

#[cfg(test)]
mod tests {
    use super::*;

    use tempfile::TempDir;
    use tripline_report::ReportEngine;
    use tripline_test_utils::{MockBackend, MockChannel, MockStore};

    fn categories() -> Vec<String> {
        vec!["MC".into(), "JR".into(), "PS".into(), "DFW".into()]
    }

    fn area_names() -> Vec<String> {
        vec![
            "01-Thiruvottiyur(Area-1)".into(),
            "02-Manali(Area-2)".into(),
            "03-Madhavaram(Area-3)".into(),
        ]
    }

    struct Rig {
        channel: Arc<MockChannel>,
        backend: Arc<MockBackend>,
        engine: DialogueEngine,
        _output_dir: TempDir,
    }

    fn rig(responses: &[&str]) -> Rig {
        rig_with_timeout(responses, Duration::from_secs(600))
    }

    fn rig_with_timeout(responses: &[&str], timeout: Duration) -> Rig {
        let channel = Arc::new(MockChannel::new());
        let backend = Arc::new(MockBackend::with_responses(responses));
        let store = Arc::new(MockStore::new());
        let output_dir = TempDir::new().unwrap();
        let tz: Tz = "Asia/Kolkata".parse().unwrap();

        let extractor = IntentExtractor::new(backend.clone(), &categories(), &area_names());
        let resolver = PeriodResolver::new(backend.clone(), tz);
        let orchestrator = ReportOrchestrator::new(
            ReportEngine::new(store, 2),
            channel.clone(),
            categories(),
            area_names(),
            output_dir.path().to_path_buf(),
        );
        let engine = DialogueEngine::new(
            extractor,
            resolver,
            orchestrator,
            channel.clone(),
            categories(),
            area_names(),
            timeout,
            tz,
        );
        Rig {
            channel,
            backend,
            engine,
            _output_dir: output_dir,
        }
    }

    async fn send(rig: &mut Rig, chat_id: i64, text: &str) {
        rig.engine
            .handle(InboundEvent {
                chat_id,
                sender_id: Some(7),
                text: text.to_string(),
            })
            .await
            .unwrap();
    }

    async fn texts(rig: &Rig) -> Vec<String> {
        rig.channel
            .texts()
            .await
            .into_iter()
            .map(|(_, text)| text)
            .collect()
    }

    #[test]
    fn slot_state_display() {
        assert_eq!(SlotState::AwaitingPeriod.to_string(), "awaiting period");
        assert_eq!(SlotState::AwaitingArea.to_string(), "awaiting area");
    }

    #[test]
    fn match_areas_resolves_numbered_references() {
        assert_eq!(
            match_areas("Area-2 and Area 3", &area_names()),
            vec!["02-Manali(Area-2)", "03-Madhavaram(Area-3)"]
        );
    }

    #[test]
    fn match_areas_ignores_out_of_range_numbers() {
        assert!(match_areas("Area 0 and Area 99", &area_names()).is_empty());
    }

    #[test]
    fn match_areas_dedups_repeated_references() {
        assert_eq!(
            match_areas("Area 2, area-2", &area_names()),
            vec!["02-Manali(Area-2)"]
        );
    }

    #[test]
    fn match_areas_falls_back_to_name_containment() {
        assert_eq!(match_areas("manali", &area_names()), vec!["02-Manali(Area-2)"]);
        assert!(match_areas("atlantis", &area_names()).is_empty());
    }

    #[test]
    fn displays_cover_all_unknown_and_lists() {
        let empty = Intent::default();
        assert_eq!(categories_display(&empty), "Unknown");
        assert_eq!(areas_display(&empty), "Unknown");

        let all = Intent {
            all_categories: true,
            all_areas: true,
            ..Intent::default()
        };
        assert_eq!(categories_display(&all), "All categories");
        assert_eq!(areas_display(&all), "All areas");

        let listed = Intent {
            categories: vec!["MC".into(), "PS".into()],
            areas: vec!["01-Thiruvottiyur(Area-1)".into()],
            ..Intent::default()
        };
        assert_eq!(categories_display(&listed), "MC, PS");
        assert_eq!(areas_display(&listed), "01-Thiruvottiyur(Area-1)");
    }

    #[test]
    fn period_question_names_the_first_area() {
        let intent = Intent {
            categories: vec!["MC".into()],
            areas: vec!["02-Manali(Area-2)".into()],
            has_area: true,
            ..Intent::default()
        };
        let question = period_question(&intent);
        assert!(question.contains("Categories: MC"));
        assert!(question.contains("Area: 02-Manali(Area-2)"));
        assert!(question.contains("For what period"));

        let bare = Intent {
            categories: vec!["MC".into()],
            ..Intent::default()
        };
        assert!(period_question(&bare).contains("Area: Not specified"));
    }

    #[tokio::test]
    async fn start_command_sends_the_welcome() {
        let mut rig = rig(&[]);
        send(&mut rig, 1, "/start").await;

        let replies = texts(&rig).await;
        assert_eq!(replies.len(), 1);
        assert!(replies[0].contains("Welcome to the Trip Report Bot"));
        assert!(replies[0].contains("Available Categories: MC, JR, PS, DFW"));
        assert_eq!(rig.backend.call_count(), 0);
    }

    #[tokio::test]
    async fn start_leaves_a_parked_conversation_alone() {
        let mut rig = rig(&[r#"{"categories": ["MC"]}"#]);
        send(&mut rig, 1, "MC trips").await;
        assert_eq!(rig.engine.waiting_for(1), Some(SlotState::AwaitingPeriod));

        send(&mut rig, 1, "/start").await;
        assert_eq!(rig.engine.waiting_for(1), Some(SlotState::AwaitingPeriod));
    }

    #[tokio::test]
    async fn cancel_acknowledges_without_a_conversation() {
        let mut rig = rig(&[]);
        send(&mut rig, 5, "/cancel").await;
        assert_eq!(texts(&rig).await, vec!["Operation cancelled."]);
    }

    #[tokio::test]
    async fn cancel_drops_a_parked_conversation() {
        let mut rig = rig(&[r#"{"categories": ["MC"]}"#]);
        send(&mut rig, 5, "MC trips").await;
        assert_eq!(rig.engine.waiting_for(5), Some(SlotState::AwaitingPeriod));

        send(&mut rig, 5, "/cancel").await;
        assert_eq!(rig.engine.waiting_for(5), None);
        assert_eq!(
            texts(&rig).await.last().map(String::as_str),
            Some("Operation cancelled.")
        );
    }

    #[tokio::test]
    async fn request_without_categories_gets_guidance() {
        let mut rig = rig(&["{}"]);
        send(&mut rig, 1, "hello there").await;

        let replies = texts(&rig).await;
        assert_eq!(replies.len(), 1);
        assert!(replies[0].contains("couldn't find the trip category"));
        assert!(replies[0].contains("MC, JR, PS, DFW"));
        assert_eq!(rig.engine.waiting_for(1), None);
    }

    #[tokio::test]
    async fn missing_period_parks_the_conversation() {
        let mut rig = rig(&[
            r#"{"categories": ["PS"], "areas": ["01-Thiruvottiyur(Area-1)"], "has_area": true}"#,
        ]);
        send(&mut rig, 1, "PS trips for area 1").await;

        assert_eq!(rig.engine.waiting_for(1), Some(SlotState::AwaitingPeriod));
        let replies = texts(&rig).await;
        assert!(replies[0].contains("Got it! Categories: PS"));
        assert!(replies[0].contains("Area: 01-Thiruvottiyur(Area-1)"));
        assert!(replies[0].contains("For what period"));
    }

    #[tokio::test]
    async fn period_reply_is_stored_verbatim() {
        let mut rig = rig(&[r#"{"categories": ["MC"]}"#]);
        send(&mut rig, 1, "MC trips").await;
        send(&mut rig, 1, "August").await;

        // The period reply never goes back through extraction.
        assert_eq!(rig.backend.call_count(), 1);
        assert_eq!(rig.engine.waiting_for(1), Some(SlotState::AwaitingArea));
        let replies = texts(&rig).await;
        assert!(replies[1].starts_with("✅ Period: August\nCategories: MC"));
        assert!(replies[1].contains("For which area(s)"));
        assert!(replies[1].contains("• 02-Manali(Area-2)"));
    }

    #[tokio::test]
    async fn all_areas_reply_skips_extraction() {
        let mut rig = rig(&[
            r#"{"categories": ["MC"], "has_period": true, "period_text": "Jun 2024"}"#,
            r#"{"start_date": "2024-06-01", "end_date": "2024-06-01"}"#,
        ]);
        send(&mut rig, 1, "MC trips Jun 2024").await;
        assert_eq!(rig.engine.waiting_for(1), Some(SlotState::AwaitingArea));

        send(&mut rig, 1, "all areas").await;
        // One intent extraction, one period resolution, no area re-extraction.
        assert_eq!(rig.backend.call_count(), 2);
        let replies = texts(&rig).await;
        assert!(replies[1].contains("Areas: All areas"));
        assert!(replies.last().unwrap().contains("No trip data found"));
    }

    #[tokio::test]
    async fn numbered_area_reply_matches_locally() {
        let mut rig = rig(&[
            r#"{"categories": ["PS"], "has_period": true, "period_text": "2024-06-01"}"#,
            "{}",
            r#"{"start_date": "2024-06-01", "end_date": "2024-06-01"}"#,
        ]);
        send(&mut rig, 1, "PS trips 2024-06-01").await;
        send(&mut rig, 1, "Area-2 and Area 3").await;

        assert_eq!(rig.backend.call_count(), 3);
        let replies = texts(&rig).await;
        assert!(replies[1].contains("Areas: 02-Manali(Area-2), 03-Madhavaram(Area-3)"));
    }

    #[tokio::test]
    async fn unidentified_area_reply_keeps_waiting() {
        let mut rig = rig(&[
            r#"{"categories": ["PS"], "has_period": true, "period_text": "Jun 2024"}"#,
            "{}",
        ]);
        send(&mut rig, 1, "PS trips Jun 2024").await;
        send(&mut rig, 1, "atlantis").await;

        assert_eq!(rig.engine.waiting_for(1), Some(SlotState::AwaitingArea));
        let replies = texts(&rig).await;
        assert!(replies[1].contains("Could not identify the area(s) 'atlantis'"));
    }

    #[tokio::test(start_paused = true)]
    async fn stale_conversations_are_evicted() {
        let mut rig = rig_with_timeout(
            &[r#"{"categories": ["MC"]}"#, "{}"],
            Duration::from_secs(600),
        );
        send(&mut rig, 1, "MC trips").await;
        assert_eq!(rig.engine.waiting_for(1), Some(SlotState::AwaitingPeriod));

        tokio::time::advance(Duration::from_secs(601)).await;
        // The reply arrived too late: it is handled as a fresh request.
        send(&mut rig, 1, "June 2024").await;
        assert_eq!(rig.engine.waiting_for(1), None);
        assert!(texts(&rig).await[1].contains("couldn't find the trip category"));
    }

    #[tokio::test]
    async fn unresolvable_period_reports_the_failure() {
        let mut rig = rig(&[
            r#"{"categories": ["MC"], "areas": ["02-Manali(Area-2)"], "has_area": true, "has_period": true, "period_text": "sometime nice"}"#,
            "not json",
        ]);
        send(&mut rig, 1, "MC trips for Manali sometime nice").await;

        let replies = texts(&rig).await;
        assert!(replies[0].contains("Processing your request"));
        assert!(replies[1].contains("Could not parse the period 'sometime nice'"));
        assert_eq!(rig.engine.waiting_for(1), None);
    }
}
