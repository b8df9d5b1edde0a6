//! Static coach and mentor dialogue tables.
//!
//! Questions are matched on a normalised key, and every table carries an
//! explicit fallback entry so a lookup never comes back empty.

use std::collections::HashMap;

use serde::Serialize;

#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CoachReply {
    pub content: String,
    pub recommendation: String,
    pub why: Vec<String>,
    pub if_follow: String,
    pub if_ignore: String,
}

pub const QUICK_SUGGESTIONS: [&str; 4] = [
    "Can I afford a week off?",
    "How much should my buffer be?",
    "What's my income trend?",
    "Tips to increase earnings?",
];

/// Lowercases, collapses whitespace and drops trailing question marks.
pub fn pattern_key(question: &str) -> String {
    let collapsed = question
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase();
    collapsed.trim_end_matches('?').trim_end().to_string()
}

fn reply(
    content: &str,
    recommendation: &str,
    why: [&str; 3],
    if_follow: &str,
    if_ignore: &str,
) -> CoachReply {
    CoachReply {
        content: content.to_string(),
        recommendation: recommendation.to_string(),
        why: why.iter().map(|s| s.to_string()).collect(),
        if_follow: if_follow.to_string(),
        if_ignore: if_ignore.to_string(),
    }
}

#[derive(Clone, Debug)]
pub struct CoachBook {
    entries: HashMap<String, CoachReply>,
    fallback: CoachReply,
}

impl Default for CoachBook {
    fn default() -> Self {
        let mut book = CoachBook::new(reply(
            "That's a great question! Based on your financial profile, here's what I think...",
            "Break this into smaller action steps.",
            [
                "Clearer action steps are easier to follow",
                "Small wins build momentum and confidence",
                "Progress is measurable and motivating",
            ],
            "You'll make steady progress and feel in control of your finances.",
            "Big goals can feel overwhelming and you might not take action.",
        ));
        book.insert(
            "Can I afford a week off?",
            reply(
                "Let me analyze your income patterns and buffer situation for a week off.",
                "You can take a week off, but plan it strategically for low-income seasons.",
                [
                    "Your current buffer covers ~45 days of expenses",
                    "A week off typically means losing ₹8,000–₹9,000 in income",
                    "Best taken after a high-earning month (like festival seasons)",
                ],
                "You'll maintain a healthy buffer and return refreshed with better earning focus.",
                "Your buffer could drop below safe levels, creating financial stress.",
            ),
        );
        book.insert(
            "How much should my buffer be?",
            reply(
                "A good emergency buffer depends on your expenses and income variability.",
                "Target 60 days of expenses as your buffer goal.",
                [
                    "You have high income variability, so more buffer = more security",
                    "60 days = ~2 months of expenses, enough for most emergencies",
                    "Gives you time to find new income if current source drops",
                ],
                "You'll handle emergencies without panic or taking bad loans.",
                "A sudden loss of income could force you into debt or crisis mode.",
            ),
        );
        book
    }
}

impl CoachBook {
    pub fn new(fallback: CoachReply) -> Self {
        Self {
            entries: HashMap::new(),
            fallback,
        }
    }

    pub fn insert(&mut self, question: &str, reply: CoachReply) {
        self.entries.insert(pattern_key(question), reply);
    }

    pub fn reply(&self, question: &str) -> &CoachReply {
        self.entries
            .get(&pattern_key(question))
            .unwrap_or(&self.fallback)
    }

    pub fn greeting(&self, name: &str) -> CoachReply {
        reply(
            &format!(
                "Hi {name}! I'm your financial coach. I'm here to help you understand your income \
                 patterns, make smarter spending decisions, and build financial confidence. What \
                 would you like to talk about today?"
            ),
            "Start by understanding your baseline",
            [
                "Knowing your typical income and expenses is the foundation",
                "It helps predict future patterns and opportunities",
                "Creates a baseline to measure progress",
            ],
            "You'll have clarity on your financial position and can plan with confidence.",
            "You may make decisions without understanding their real impact on your buffer and \
             stability.",
        )
    }
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Mentor {
    pub id: &'static str,
    pub name: &'static str,
    pub title: &'static str,
    pub expertise: &'static str,
    pub bio: &'static str,
    pub specialties: [&'static str; 4],
    #[serde(skip)]
    reply: &'static str,
}

pub const MENTOR_FALLBACK_REPLY: &str = "Thanks for that. Here's what I think...";

pub const MENTORS: [Mentor; 6] = [
    Mentor {
        id: "1",
        name: "Dr. Ravi Sharma",
        title: "RBI Economist",
        expertise: "Monetary Policy & Economic Trends",
        bio: "Former RBI advisor with 20+ years in economic policy. Specializes in irregular income patterns.",
        specialties: ["Interest Rates", "Economic Trends", "Policy Impact", "Buffer Planning"],
        reply: "That's a great question about your financial planning. Based on your recent income data...",
    },
    Mentor {
        id: "2",
        name: "Priya Mehta",
        title: "Gig Finance Specialist",
        expertise: "Gig Worker Income Optimization",
        bio: "Works with 10,000+ gig workers. Expert in earnings optimization and seasonal planning.",
        specialties: ["Income Growth", "Seasonal Planning", "Earnings Optimization", "Surge Timing"],
        reply: "I've analyzed your earning patterns. Here's what I recommend for maximizing your income...",
    },
    Mentor {
        id: "3",
        name: "Anil Gupta",
        title: "Debt Restructuring Expert",
        expertise: "Loan & EMI Management",
        bio: "Helped thousands restructure debt. Specializes in EMI optimization for irregular earners.",
        specialties: ["EMI Planning", "Loan Restructuring", "Interest Negotiation", "Debt Freedom"],
        reply: "Your EMI situation looks manageable. Let me suggest a restructuring plan...",
    },
    Mentor {
        id: "4",
        name: "Meera Singh",
        title: "Investment Coach",
        expertise: "Investment & Wealth Building",
        bio: "Demystifies investing for everyday earners. Builds investment portfolios for small budgets.",
        specialties: ["Mutual Funds", "SIPs", "Savings Plans", "Long-term Wealth"],
        reply: "For wealth building with irregular income, SIPs are your best friend...",
    },
    Mentor {
        id: "5",
        name: "Vikram Rao",
        title: "Risk Management",
        expertise: "Financial Risk & Insurance",
        bio: "Expert in identifying financial risks. Recommends insurance & safety nets for irregular earners.",
        specialties: ["Risk Assessment", "Insurance", "Emergency Fund", "Crisis Planning"],
        reply: "Your buffer is critical. Let me help you create a comprehensive risk plan...",
    },
    Mentor {
        id: "6",
        name: "Sunita Desai",
        title: "Financial Literacy Educator",
        expertise: "Money Basics & Financial Education",
        bio: "Makes finance simple. Breaks down complex concepts for gig workers and informal sector.",
        specialties: ["Money Basics", "Financial Jargon", "Budgeting", "Financial Planning"],
        reply: "Let me explain this concept in simple terms...",
    },
];

pub fn find_mentor(id: &str) -> Option<&'static Mentor> {
    MENTORS.iter().find(|m| m.id == id)
}

impl Mentor {
    pub fn greeting(&self) -> String {
        format!(
            "Hi! I'm {}. {}. How can I help you today?",
            self.name, self.expertise
        )
    }
}

/// Canned mentor answer; unknown mentors get the generic reply.
pub fn mentor_reply(id: &str) -> &'static str {
    find_mentor(id).map_or(MENTOR_FALLBACK_REPLY, |m| m.reply)
}
