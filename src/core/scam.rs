use std::sync::LazyLock;

use regex::Regex;
use serde::Serialize;

pub const KEYWORD_WEIGHT: u32 = 10;
pub const SUSPICIOUS_EMAIL_WEIGHT: u32 = 5;
pub const URL_WEIGHT: u32 = 5;
pub const URGENCY_WEIGHT: u32 = 15;
pub const PROMISE_WEIGHT: u32 = 20;
pub const MAX_RISK_SCORE: u8 = 100;

pub const SCAM_KEYWORDS: [&str; 37] = [
    "urgent",
    "immediate action",
    "act now",
    "limited time",
    "exclusive deal",
    "guaranteed return",
    "risk-free investment",
    "double your money",
    "secret",
    "hidden",
    "they don't want you to know",
    "insider",
    "lottery",
    "winner",
    "prize",
    "inheritance",
    "unclaimed",
    "nigerian prince",
    "foreign official",
    "overseas",
    "verify your account",
    "update your information",
    "suspicious activity",
    "cryptocurrency",
    "bitcoin",
    "investment opportunity",
    "social security number",
    "password",
    "pin",
    "account number",
    "wire transfer",
    "western union",
    "money order",
    "irs",
    "tax",
    "refund",
    "government",
];

/// Free-mail providers are listed alongside known abuse hosts. Official
/// institutions rarely write from them, so a hit is a weak signal only.
pub const SUSPICIOUS_DOMAINS: [&str; 7] = [
    "gmail.com",
    "yahoo.com",
    "hotmail.com",
    "outlook.com",
    "mail.ru",
    "protonmail.com",
    "yandex.ru",
];

pub const URGENCY_PHRASES: [&str; 7] = [
    "urgent",
    "immediately",
    "today",
    "now",
    "hurry",
    "limited time",
    "expires",
];

pub const PROMISE_PHRASES: [&str; 8] = [
    "guarantee",
    "guaranteed",
    "100%",
    "risk-free",
    "no risk",
    "double",
    "triple",
    "return",
];

static EMAIL_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"[a-z0-9._%+-]+@([a-z0-9.-]+\.[a-z]{2,})").expect("valid email pattern")
});

static URL_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"https?://\S+").expect("valid url pattern"));

#[derive(Copy, Clone, Debug, Eq, PartialEq, Ord, PartialOrd, Serialize)]
pub enum RiskLevel {
    Low,
    Medium,
    High,
}

impl RiskLevel {
    pub fn from_score(score: u8) -> Self {
        if score < 20 {
            RiskLevel::Low
        } else if score < 50 {
            RiskLevel::Medium
        } else {
            RiskLevel::High
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            RiskLevel::Low => "Low",
            RiskLevel::Medium => "Medium",
            RiskLevel::High => "High",
        }
    }

    pub fn advisory(self) -> &'static str {
        match self {
            RiskLevel::Low => {
                "Few scam indicators were found. Stay cautious with unsolicited financial messages."
            }
            RiskLevel::Medium => {
                "Several scam indicators were found. Verify the sender through an official channel before acting."
            }
            RiskLevel::High => {
                "Many scam indicators were found. Do not reply, click links, or send money or personal details."
            }
        }
    }
}

impl std::fmt::Display for RiskLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ScamScanResult {
    pub risk_score: u8,
    pub risk_level: RiskLevel,
    pub matched_keywords: Vec<&'static str>,
    pub matched_emails: Vec<String>,
    pub matched_urls: Vec<String>,
    pub urgency_hits: Vec<&'static str>,
    pub promise_hits: Vec<&'static str>,
}

impl ScamScanResult {
    pub fn has_signals(&self) -> bool {
        !(self.matched_keywords.is_empty()
            && self.matched_emails.is_empty()
            && self.matched_urls.is_empty()
            && self.urgency_hits.is_empty()
            && self.promise_hits.is_empty())
    }
}

/// Scores free text for common financial-scam markers. Matching is plain
/// substring containment on the lower-cased text, so short terms such as
/// "pin" or "now" also fire inside longer words.
pub fn scan_for_scam_signals(text: &str) -> ScamScanResult {
    let text = text.to_lowercase();

    let matched_keywords = phrases_in(&text, &SCAM_KEYWORDS);
    let matched_emails = suspicious_emails(&text);
    let matched_urls: Vec<String> = URL_PATTERN
        .find_iter(&text)
        .map(|m| m.as_str().to_string())
        .collect();
    let urgency_hits = phrases_in(&text, &URGENCY_PHRASES);
    let promise_hits = phrases_in(&text, &PROMISE_PHRASES);

    let mut score = KEYWORD_WEIGHT * matched_keywords.len() as u32
        + SUSPICIOUS_EMAIL_WEIGHT * matched_emails.len() as u32;
    if !matched_urls.is_empty() {
        score += URL_WEIGHT;
    }
    if !urgency_hits.is_empty() {
        score += URGENCY_WEIGHT;
    }
    if !promise_hits.is_empty() {
        score += PROMISE_WEIGHT;
    }
    let risk_score = score.min(MAX_RISK_SCORE as u32) as u8;

    ScamScanResult {
        risk_score,
        risk_level: RiskLevel::from_score(risk_score),
        matched_keywords,
        matched_emails,
        matched_urls,
        urgency_hits,
        promise_hits,
    }
}

fn phrases_in(text: &str, phrases: &[&'static str]) -> Vec<&'static str> {
    phrases
        .iter()
        .copied()
        .filter(|phrase| text.contains(phrase))
        .collect()
}

fn suspicious_emails(text: &str) -> Vec<String> {
    let mut found: Vec<String> = Vec::new();
    for caps in EMAIL_PATTERN.captures_iter(text) {
        let (Some(email), Some(domain)) = (caps.get(0), caps.get(1)) else {
            continue;
        };
        if !SUSPICIOUS_DOMAINS.contains(&domain.as_str()) {
            continue;
        }
        let email = email.as_str();
        if !found.iter().any(|seen| seen == email) {
            found.push(email.to_string());
        }
    }
    found
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::{prop_assert, prop_assert_eq, proptest};
    use proptest::sample::select;

    #[test]
    fn empty_text_has_no_signals() {
        let result = scan_for_scam_signals("");
        assert_eq!(result.risk_score, 0);
        assert_eq!(result.risk_level, RiskLevel::Low);
        assert!(!result.has_signals());
    }

    #[test]
    fn innocuous_text_scores_low() {
        let result = scan_for_scam_signals("Lunch at noon on Friday? Bring the slides.");
        assert_eq!(result.risk_score, 0);
        assert_eq!(result.risk_level, RiskLevel::Low);
    }

    #[test]
    fn urgent_wire_transfer_promise() {
        let result =
            scan_for_scam_signals("URGENT: guaranteed risk-free investment, wire transfer now");

        assert_eq!(
            result.matched_keywords,
            vec!["urgent", "risk-free investment", "wire transfer"]
        );
        assert_eq!(result.urgency_hits, vec!["urgent", "now"]);
        assert_eq!(
            result.promise_hits,
            vec!["guarantee", "guaranteed", "risk-free"]
        );
        assert!(result.matched_emails.is_empty());
        assert!(result.matched_urls.is_empty());
        assert_eq!(result.risk_score, 65);
        assert_eq!(result.risk_level, RiskLevel::High);
    }

    #[test]
    fn urgency_and_promises_are_flat_bonuses() {
        let one = scan_for_scam_signals("hurry");
        let many = scan_for_scam_signals("hurry hurry, expires immediately");
        assert_eq!(one.risk_score, URGENCY_WEIGHT as u8);
        assert_eq!(many.risk_score, URGENCY_WEIGHT as u8);
        assert_eq!(many.urgency_hits, vec!["immediately", "hurry", "expires"]);

        let promises = scan_for_scam_signals("triple or 100% no risk");
        assert_eq!(promises.promise_hits, vec!["100%", "no risk", "triple"]);
        assert_eq!(promises.risk_score, PROMISE_WEIGHT as u8);
    }

    #[test]
    fn urls_add_once_and_keep_order() {
        let result = scan_for_scam_signals(
            "see https://claim.example/a and http://claim.example/b and https://claim.example/a",
        );
        assert_eq!(
            result.matched_urls,
            vec![
                "https://claim.example/a",
                "http://claim.example/b",
                "https://claim.example/a",
            ]
        );
        assert_eq!(result.risk_score, URL_WEIGHT as u8);
        assert_eq!(result.risk_level, RiskLevel::Low);
    }

    #[test]
    fn free_mail_senders_are_weak_signals() {
        let result = scan_for_scam_signals(
            "Contact Agent.Smith@GMAIL.com or billing@corp.example or agent.smith@gmail.com, cc x@mail.ru",
        );
        assert_eq!(
            result.matched_emails,
            vec!["agent.smith@gmail.com", "x@mail.ru"]
        );
        assert_eq!(result.risk_score, 2 * SUSPICIOUS_EMAIL_WEIGHT as u8);
    }

    #[test]
    fn substring_matches_fire_inside_words() {
        let result = scan_for_scam_signals("shopping");
        assert_eq!(result.matched_keywords, vec!["pin"]);
        assert_eq!(result.risk_score, 10);
    }

    #[test]
    fn score_is_clamped_at_maximum() {
        let text = SCAM_KEYWORDS.join(" ");
        let result = scan_for_scam_signals(&text);
        assert_eq!(result.matched_keywords.len(), SCAM_KEYWORDS.len());
        assert_eq!(result.risk_score, MAX_RISK_SCORE);
        assert_eq!(result.risk_level, RiskLevel::High);
    }

    #[test]
    fn risk_level_thresholds() {
        assert_eq!(RiskLevel::from_score(0), RiskLevel::Low);
        assert_eq!(RiskLevel::from_score(19), RiskLevel::Low);
        assert_eq!(RiskLevel::from_score(20), RiskLevel::Medium);
        assert_eq!(RiskLevel::from_score(49), RiskLevel::Medium);
        assert_eq!(RiskLevel::from_score(50), RiskLevel::High);
        assert_eq!(RiskLevel::from_score(100), RiskLevel::High);
    }

    #[test]
    fn result_serializes_with_camel_case_keys() {
        let result = scan_for_scam_signals("act now");
        let json = serde_json::to_value(&result).expect("serializable");
        assert_eq!(json["riskLevel"], "Medium");
        assert_eq!(json["riskScore"], 25);
        assert_eq!(json["matchedKeywords"][0], "act now");
        assert!(json["urgencyHits"].is_array());
    }

    fn signal_phrase() -> impl proptest::strategy::Strategy<Value = &'static str> {
        let mut phrases: Vec<&'static str> = Vec::new();
        phrases.extend(SCAM_KEYWORDS);
        phrases.extend(URGENCY_PHRASES);
        phrases.extend(PROMISE_PHRASES);
        phrases.extend(["reply to help@yahoo.com", "https://prize.example/claim"]);
        select(phrases)
    }

    proptest! {
        #![proptest_config(proptest::test_runner::Config::with_cases(128))]

        #[test]
        fn prop_adding_a_signal_never_lowers_score(
            base in "[ -~]{0,80}",
            phrase in signal_phrase()
        ) {
            let before = scan_for_scam_signals(&base);
            let after = scan_for_scam_signals(&format!("{base} {phrase}"));
            prop_assert!(after.risk_score >= before.risk_score);
            prop_assert!(after.risk_level >= before.risk_level);
            prop_assert!(after.risk_score <= MAX_RISK_SCORE);
        }

        #[test]
        fn prop_scan_ignores_case(text in "[ -~]{0,80}") {
            let lower = scan_for_scam_signals(&text.to_lowercase());
            let upper = scan_for_scam_signals(&text.to_uppercase());
            prop_assert_eq!(lower, upper);
        }
    }
}
