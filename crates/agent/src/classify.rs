use stockwise_core::domain::conversation::ConversationTurn;
use stockwise_core::domain::region::Region;
use stockwise_core::intent::{resolve_candidates, Classification, Intent, IntentCandidate, QuerySlots};

/// Prompt sent to the advisory model for intent classification. The
/// label set is closed; anything else the model invents is rejected at
/// parse time.
pub fn build_classification_prompt(query: &str, history: &[ConversationTurn]) -> String {
    let mut prompt = String::new();

    if !history.is_empty() {
        prompt.push_str("Recent conversation:\n");
        for turn in history {
            prompt.push_str(&format!("user: {}\n", turn.user_message));
            prompt.push_str(&format!("assistant: {}\n", turn.assistant_message));
        }
        prompt.push('\n');
    }

    prompt.push_str(&format!(
        r#"Analyze this query and classify the intent:

Query: "{query}"

Intents:
- inventory_status: current stock levels and low-stock alerts
- sales_analysis: sales patterns and trends
- reorder_recommendation: restocking suggestions
- ticket_status: open restocking tickets
- financial_summary: revenue, spend, and profit
- vendor_optimization: vendor selection and ranking
- general_query: greetings or anything else

Extract: region (north/south/east/west/central), category, sku (use "none" when absent).

Format:
intent: <label, or comma-separated candidates each followed by (confidence)>
region: <value_or_none>
category: <value_or_none>
sku: <value_or_none>"#
    ));

    prompt
}

/// Line-oriented parse of the classifier response. Tolerant of noise:
/// unknown labels are dropped, missing fields default, and a response
/// with no usable candidate resolves to the degraded fallback.
pub fn classification_from_response(content: &str) -> Classification {
    let mut candidates: Vec<IntentCandidate> = Vec::new();
    let mut slots = QuerySlots::default();

    for line in content.lines() {
        let Some((key, value)) = line.split_once(':') else {
            continue;
        };
        let key = key.trim().to_ascii_lowercase();
        let value = value.trim();

        match key.as_str() {
            "intent" => {
                candidates.extend(value.split(',').filter_map(parse_candidate));
            }
            "region" => {
                slots.region = Region::parse(value);
            }
            "category" => {
                slots.category = slot_value(value);
            }
            "sku" => {
                slots.sku = slot_value(value);
            }
            _ => {}
        }
    }

    if candidates.is_empty() {
        let mut fallback = Classification::fallback();
        // Slots can still be useful even when the label was garbage.
        fallback.slots = slots;
        return fallback;
    }

    Classification { intent: resolve_candidates(&candidates), slots, degraded: false }
}

fn slot_value(value: &str) -> Option<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() || trimmed.eq_ignore_ascii_case("none") {
        None
    } else {
        Some(trimmed.to_string())
    }
}

/// Accepts `label` or `label (0.8)`.
fn parse_candidate(token: &str) -> Option<IntentCandidate> {
    let token = token.trim();
    let (label, confidence) = match token.split_once('(') {
        Some((label, rest)) => {
            let confidence = rest.trim_end_matches(')').trim().parse::<f64>().ok();
            (label.trim(), confidence)
        }
        None => (token, None),
    };

    Intent::parse_label(label).map(|intent| IntentCandidate { intent, confidence })
}
