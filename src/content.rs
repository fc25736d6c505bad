//! Static bot content
//!
//! Canned FAQ entries, help topics and marketing copy. The copy itself is
//! owned by the platform team; the tables here exist so the help and FAQ
//! routers have a closed set of keys to dispatch on.

/// A canned FAQ entry
#[derive(Debug, Clone, Copy)]
pub struct FaqEntry {
    pub key: &'static str,
    pub question: &'static str,
    pub answer: &'static str,
}

pub const FAQS: &[FaqEntry] = &[
    FaqEntry {
        key: "what_is_ethereal",
        question: "What is Ethereal?",
        answer: "Ethereal is a platform where you earn money by completing tasks like reading posts, playing games, sending Snapchat streaks, and inviting friends.",
    },
    FaqEntry {
        key: "payment_methods",
        question: "What payment methods are available?",
        answer: "Payments can be made via bank transfer, mobile money, or Zelle, depending on your country. Check the 'How to Pay' guide in the Help menu.",
    },
    FaqEntry {
        key: "task_rewards",
        question: "How are task rewards calculated?",
        answer: "Rewards vary by task type. For example, reading posts earns $2.5 per 10 words, Candy Crush tasks earn $5 daily, and Snapchat streaks can earn up to $20.",
    },
];

pub fn faq(key: &str) -> Option<&'static FaqEntry> {
    FAQS.iter().find(|entry| entry.key == key)
}

/// How a help topic behaves when opened
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HelpTopicKind {
    /// Show static text
    Text,
    /// Link out to a video guide
    Video,
    /// Open the daily-reminder toggle
    Toggle,
    /// Alias into the FAQ browser
    Faq,
    /// Prompt for free-form input (password recovery)
    Input,
}

/// A help menu topic
#[derive(Debug, Clone, Copy)]
pub struct HelpTopic {
    pub key: &'static str,
    pub label: &'static str,
    pub kind: HelpTopicKind,
    /// Text body, video URL or input prompt depending on kind
    pub body: &'static str,
}

pub const HELP_TOPICS: &[HelpTopic] = &[
    HelpTopic {
        key: "how_to_pay",
        label: "How to Pay",
        kind: HelpTopicKind::Video,
        body: "https://youtu.be/YourPaymentGuide",
    },
    HelpTopic {
        key: "register",
        label: "Registration Process",
        kind: HelpTopicKind::Text,
        body: "1. Once you have clicked start \u{2192} choose package\n2. Select your coach\n3. Pay via your selected country account \u{2192} upload screenshot\n4. Wait for approval, then send details\n5. Join the group and start earning! \u{1F389}",
    },
    HelpTopic {
        key: "daily_tasks",
        label: "Daily Tasks",
        kind: HelpTopicKind::Video,
        body: "https://youtu.be/YourTasksGuide",
    },
    HelpTopic {
        key: "reminder",
        label: "Toggle Reminder",
        kind: HelpTopicKind::Toggle,
        body: "Toggle your daily reminder:",
    },
    HelpTopic {
        key: "faq",
        label: "FAQs",
        kind: HelpTopicKind::Faq,
        body: "",
    },
    HelpTopic {
        key: "password_recovery",
        label: "Password Recovery",
        kind: HelpTopicKind::Input,
        body: "Please provide your registered email to request password recovery:",
    },
    HelpTopic {
        key: "apply_coach",
        label: "Apply to be a Coach",
        kind: HelpTopicKind::Text,
        body: "To apply to be a coach, use the /coach command. An admin will contact you.",
    },
];

pub fn help_topic(key: &str) -> Option<&'static HelpTopic> {
    HELP_TOPICS.iter().find(|topic| topic.key == key)
}

/// Welcome copy sent on /start
pub fn welcome_text(referral_link: &str) -> String {
    format!(
        "Welcome to Ethereal!\n\nGet paid for working with AI and doing what you love most.\n\
         \u{2022} Read posts \u{279C} earn $2.5/10 words\n\u{2022} Play Candy Crush daily \u{279C} earn $5\n\
         \u{2022} Send Snapchat streaks \u{279C} earn up to $20\n\u{2022} Invite friends and more!\n\n\
         Your referral link: {referral_link}\n\
         Choose your package and start earning today.\nClick below to get started."
    )
}

/// Package comparison copy behind the How-It-Works button
pub const HOW_IT_WORKS: &str = "\u{1F516} How Ethereal\u{1F49A} Works\n\
Ethereal rewards you for everyday activities \u{2014} like reading posts, playing games (e.g., Candy Crush), sending Snapchat streaks, and clicking links.\n\
\u{2014} \u{2014} \u{2014}\n\
\u{1F4CD} ETHEREAL STANDARD \u{2014} \u{20A6}9,000\n\
\u{2022} Instant \u{20A6}8,000 cashback\n\
\u{2022} Free up to 3GB data on signup\n\
\u{2022} Earn up to $1 per link\n\
\u{2022} Earn up to \u{20A6}2,500 for every 10 words read\n\
\u{2022} Up to \u{20A6}5,000 daily from Candy Crush\n\
\u{2022} Earn up to $20 sending Snapchat streaks\n\
\u{2022} Valid for 5 months (renewal fee required)\n\n\
\u{2014} \u{2014} \u{2014}\n\n\
\u{1F4CD} ETHEREAL-X \u{2014} \u{20A6}14,000\n\
\u{2022} Instant \u{20A6}12,000 cashback\n\
\u{2022} Free up to 5GB data on signup\n\
\u{2022} Earn up to $2 per link\n\
\u{2022} Earn up to \u{20A6}3,500 per 10 words (no cap)\n\
\u{2022} Earn up to $50 sending Snapchat streaks\n\
\u{2022} Valid for 1 year (no renewal fee)\n\
\u{2022} Includes personal AI-assisted earnings";

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_faq_lookup() {
        assert!(faq("what_is_ethereal").is_some());
        assert!(faq("nonexistent").is_none());
    }

    #[test]
    fn test_help_topic_lookup() {
        let topic = help_topic("password_recovery").unwrap();
        assert_eq!(topic.kind, HelpTopicKind::Input);
        assert!(help_topic("nonexistent").is_none());
    }

    #[test]
    fn test_topic_keys_are_unique() {
        for (i, a) in HELP_TOPICS.iter().enumerate() {
            for b in HELP_TOPICS.iter().skip(i + 1) {
                assert_ne!(a.key, b.key);
            }
        }
    }
}
