//! Post-action verification (§4.4): collects the network/focus/scroll
//! effects of a recorded action and marks it `verified`.

use browzer_types::{ActionEffects, FocusEffect, NetworkEffect, RecordedAction, ScrollEffect};
use chrono::{DateTime, Utc};

use crate::classify::is_significant_request;
use crate::ingest::RawPreState;

const VERIFICATION_WINDOW_MS: i64 = 1500;
const SCROLL_THRESHOLD_PX: f64 = 200.0;
const FOCUSABLE_TAGS: &[&str] = &["INPUT", "TEXTAREA", "SELECT", "BUTTON"];

#[derive(Clone, Debug)]
pub struct ObservedRequest {
    pub url: String,
    pub method: String,
    pub resource_type: String,
    pub timestamp: DateTime<Utc>,
}

#[derive(Clone, Debug)]
pub struct PostActionState {
    pub url: String,
    pub scroll_x: f64,
    pub scroll_y: f64,
    pub active_tag: Option<String>,
    pub modal_count: usize,
}

/// Computes the effects of an action given its pre-state, a post-state
/// sample, and the network requests observed since the action fired.
pub fn compute_effects(
    action_ts: DateTime<Utc>,
    pre: Option<&RawPreState>,
    post: &PostActionState,
    requests: &[ObservedRequest],
) -> ActionEffects {
    let window_end = action_ts + chrono::Duration::milliseconds(VERIFICATION_WINDOW_MS);
    let significant: Vec<&ObservedRequest> = requests
        .iter()
        .filter(|r| r.timestamp >= action_ts && r.timestamp <= window_end)
        .filter(|r| is_significant_request(&r.resource_type, &r.url, &r.method))
        .collect();

    let network = if significant.is_empty() {
        None
    } else {
        Some(NetworkEffect {
            request_count: significant.len(),
            urls: significant.iter().map(|r| r.url.clone()).collect(),
        })
    };

    let focus = post.active_tag.as_deref().and_then(|tag| {
        let moved = pre.and_then(|p| p.active_tag.as_deref()) != Some(tag);
        if moved && FOCUSABLE_TAGS.contains(&tag) {
            Some(FocusEffect {
                new_focus_tag_name: tag.to_string(),
            })
        } else {
            None
        }
    });

    let scroll = pre.and_then(|pre| {
        let dx = post.scroll_x - pre.scroll_x;
        let dy = post.scroll_y - pre.scroll_y;
        if dx.hypot(dy) > SCROLL_THRESHOLD_PX {
            Some(ScrollEffect { delta_x: dx, delta_y: dy })
        } else {
            None
        }
    });

    let mut summary_parts = Vec::new();
    if let Some(net) = &network {
        summary_parts.push(format!("{} network request(s)", net.request_count));
    }
    if let Some(focus) = &focus {
        summary_parts.push(format!("focus moved to {}", focus.new_focus_tag_name));
    }
    if let Some(scroll) = &scroll {
        summary_parts.push(format!("scrolled by ({:.0}, {:.0})", scroll.delta_x, scroll.delta_y));
    }

    let summary = if summary_parts.is_empty() {
        ActionEffects::NO_SIGNIFICANT_EFFECTS.to_string()
    } else {
        summary_parts.join(", ")
    };

    ActionEffects {
        summary,
        network,
        focus,
        scroll,
    }
}

pub fn finalize(action: &mut RecordedAction, effects: ActionEffects, verification_time_ms: u64) {
    action.effects = Some(effects);
    action.verified = true;
    action.verification_time_ms = Some(verification_time_ms);
}

#[cfg(test)]
mod tests {
    use super::*;

    fn state(active_tag: Option<&str>, sx: f64, sy: f64) -> PostActionState {
        PostActionState {
            url: "https://example.com".into(),
            scroll_x: sx,
            scroll_y: sy,
            active_tag: active_tag.map(str::to_string),
            modal_count: 0,
        }
    }

    fn pre(active_tag: Option<&str>) -> RawPreState {
        RawPreState {
            url: "https://example.com".into(),
            scroll_x: 0.0,
            scroll_y: 0.0,
            active_tag: active_tag.map(str::to_string),
            modal_count: 0,
        }
    }

    #[test]
    fn no_effects_yields_default_summary() {
        let ts = Utc::now();
        let effects = compute_effects(ts, Some(&pre(None)), &state(None, 0.0, 0.0), &[]);
        assert_eq!(effects.summary, ActionEffects::NO_SIGNIFICANT_EFFECTS);
    }

    #[test]
    fn focus_change_only_counts_for_focusable_tags() {
        let ts = Utc::now();
        let effects = compute_effects(ts, Some(&pre(None)), &state(Some("INPUT"), 0.0, 0.0), &[]);
        assert!(effects.focus.is_some());

        let effects_div = compute_effects(ts, Some(&pre(None)), &state(Some("DIV"), 0.0, 0.0), &[]);
        assert!(effects_div.focus.is_none());
    }

    #[test]
    fn scroll_below_threshold_is_ignored() {
        let ts = Utc::now();
        let effects = compute_effects(ts, Some(&pre(None)), &state(None, 50.0, 50.0), &[]);
        assert!(effects.scroll.is_none());

        let effects_big = compute_effects(ts, Some(&pre(None)), &state(None, 0.0, 300.0), &[]);
        assert!(effects_big.scroll.is_some());
    }

    #[test]
    fn significant_requests_in_window_are_counted() {
        let ts = Utc::now();
        let requests = vec![ObservedRequest {
            url: "https://example.com/api/submit".into(),
            method: "POST".into(),
            resource_type: "XHR".into(),
            timestamp: ts + chrono::Duration::milliseconds(100),
        }];
        let effects = compute_effects(ts, Some(&pre(None)), &state(None, 0.0, 0.0), &requests);
        assert_eq!(effects.network.unwrap().request_count, 1);
    }
}
