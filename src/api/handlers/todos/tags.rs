//! Keyword-based auto-tagging for todo titles and descriptions.
//!
//! Tags are derived, never client-supplied: category names whose keyword set
//! intersects the text come first (in the fixed order below), then remaining
//! significant words in sorted order, capped at five.

use std::collections::BTreeSet;

const STOP_WORDS: &[&str] = &[
    "a", "an", "the", "and", "or", "but", "in", "on", "at", "to", "for", "of", "with", "by",
    "from", "is", "it", "this", "that", "are", "was", "be", "have", "has", "had", "do", "does",
    "did", "will", "would", "could", "should", "may", "might", "can", "shall", "not", "no", "so",
    "if", "then", "than", "too", "very", "just", "about", "up", "out", "all", "also", "as",
    "into", "some", "my", "your", "our", "their", "its", "been", "being", "get", "got", "make",
    "need", "want", "know", "take", "come", "going", "thing", "things", "like", "more", "only",
    "over", "such", "after", "before", "between", "each", "every", "own", "same", "other",
    "which", "when", "where", "what", "who", "how", "new", "now", "way", "still", "use", "here",
    "there",
];

const CATEGORIES: &[(&str, &[&str])] = &[
    (
        "work",
        &[
            "meeting", "project", "deadline", "client", "presentation", "report", "office",
            "team", "manager", "colleague", "email", "review", "sprint", "standup",
            "stakeholder", "deliverable", "proposal", "contract", "invoice", "milestone",
        ],
    ),
    (
        "personal",
        &[
            "family", "friend", "birthday", "gift", "hobby", "vacation", "travel", "home",
            "house", "apartment", "pet", "dog", "cat", "party", "wedding", "anniversary",
            "dinner", "lunch",
        ],
    ),
    (
        "finance",
        &[
            "budget", "payment", "invoice", "tax", "salary", "expense", "invest", "investment",
            "bank", "loan", "mortgage", "insurance", "bill", "receipt", "savings", "financial",
            "accounting", "refund",
        ],
    ),
    (
        "health",
        &[
            "doctor", "appointment", "exercise", "gym", "workout", "run", "yoga", "meditation",
            "diet", "nutrition", "medicine", "prescription", "hospital", "dentist", "therapy",
            "mental", "sleep", "wellness", "checkup", "vitamin",
        ],
    ),
    (
        "learning",
        &[
            "study", "course", "book", "read", "reading", "learn", "training", "tutorial",
            "lecture", "exam", "test", "homework", "assignment", "research", "certificate",
            "class", "workshop", "seminar", "practice", "skill",
        ],
    ),
    (
        "tech",
        &[
            "code", "coding", "programming", "deploy", "deployment", "server", "database",
            "api", "bug", "fix", "debug", "update", "upgrade", "install", "configure", "setup",
            "backup", "security", "test", "testing", "release", "feature", "software", "app",
            "website",
        ],
    ),
    (
        "urgent",
        &[
            "urgent", "asap", "immediately", "critical", "emergency", "important", "priority",
            "rush", "hurry", "overdue",
        ],
    ),
    (
        "shopping",
        &[
            "buy", "purchase", "order", "shop", "shopping", "grocery", "groceries", "store",
            "amazon", "delivery",
        ],
    ),
    (
        "errands",
        &[
            "pickup", "dropoff", "return", "mail", "post", "laundry", "clean", "cleaning",
            "repair", "maintenance", "renew",
        ],
    ),
];

pub(super) const MAX_TAGS: usize = 5;

fn is_stop_word(word: &str) -> bool {
    STOP_WORDS.contains(&word)
}

/// Extract up to [`MAX_TAGS`] tags from a title and optional description.
#[must_use]
pub(super) fn extract_tags(title: &str, description: Option<&str>) -> Vec<String> {
    let mut text = title.to_lowercase();
    if let Some(description) = description {
        text.push(' ');
        text.push_str(&description.to_lowercase());
    }

    // Tokenize on whitespace, strip non-alphanumeric characters, drop stop
    // words. BTreeSet keeps later iteration sorted and deterministic.
    let mut words: BTreeSet<String> = BTreeSet::new();
    for word in text.split_whitespace() {
        let cleaned: String = word.chars().filter(|c| c.is_alphanumeric()).collect();
        if !cleaned.is_empty() && !is_stop_word(&cleaned) {
            words.insert(cleaned);
        }
    }

    let matched: Vec<&str> = CATEGORIES
        .iter()
        .filter(|(_, keywords)| keywords.iter().any(|keyword| words.contains(*keyword)))
        .map(|(category, _)| *category)
        .collect();

    let mut tags: Vec<String> = matched.iter().map(|category| (*category).to_string()).collect();

    for word in words.iter().filter(|word| word.chars().count() >= 4) {
        if tags.len() >= MAX_TAGS {
            break;
        }
        let shadows_category = matched.iter().any(|category| category.contains(word.as_str()));
        if !tags.contains(word) && !shadows_category {
            tags.push(word.clone());
        }
    }

    tags.truncate(MAX_TAGS);
    tags
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn matches_categories_from_title() {
        let tags = extract_tags("Prepare sprint review with the team", None);
        assert!(tags.contains(&"work".to_string()));
    }

    #[test]
    fn description_contributes_keywords() {
        let tags = extract_tags("Errand", Some("pay the electricity bill at the bank"));
        assert!(tags.contains(&"finance".to_string()));
    }

    #[test]
    fn stop_words_never_become_tags() {
        let tags = extract_tags("the and with from this that", None);
        assert!(tags.is_empty());
    }

    #[test]
    fn significant_words_fill_after_categories() {
        let tags = extract_tags("Water the ferns", None);
        // "water" and "ferns" are significant non-category words, sorted.
        assert_eq!(tags, vec!["ferns".to_string(), "water".to_string()]);
    }

    #[test]
    fn never_more_than_five_tags() {
        let tags = extract_tags(
            "meeting birthday budget doctor study deploy urgent grocery pickup",
            Some("alpha bravo charlie delta echo foxtrot"),
        );
        assert_eq!(tags.len(), MAX_TAGS);
    }

    #[test]
    fn categories_keep_fixed_order() {
        let tags = extract_tags("grocery meeting", None);
        // "work" is declared before "shopping".
        let work = tags.iter().position(|tag| tag == "work").expect("work");
        let shopping = tags
            .iter()
            .position(|tag| tag == "shopping")
            .expect("shopping");
        assert!(work < shopping);
    }

    #[test]
    fn punctuation_is_stripped() {
        let tags = extract_tags("Deploy! the (server)...", None);
        assert!(tags.contains(&"tech".to_string()));
    }

    #[test]
    fn deterministic_for_same_input() {
        let first = extract_tags("Plan vacation budget with family", None);
        let second = extract_tags("Plan vacation budget with family", None);
        assert_eq!(first, second);
    }
}
