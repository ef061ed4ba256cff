//! Well-known categories and the subscription service catalog.

pub const BILL_PAYMENT: &str = "Bill Payment";
pub const SUBSCRIPTIONS: &str = "Subscriptions";
pub const SAVING_BOX_DEPOSIT: &str = "Saving Box Deposit";
pub const SAVING_BOX_WITHDRAWAL: &str = "Saving Box Withdrawal";

pub const INCOME_CATEGORIES: &[&str] = &[
    "Salary",
    "Freelance",
    "Investments",
    "Gift",
    SAVING_BOX_WITHDRAWAL,
    "Other",
];

pub const EXPENSE_CATEGORIES: &[&str] = &[
    SUBSCRIPTIONS,
    "Food",
    "Transport",
    "Fuel",
    "Housing",
    "Health",
    "Education",
    "Leisure",
    "Shopping",
    "Utilities",
    BILL_PAYMENT,
    SAVING_BOX_DEPOSIT,
    "Other",
];

/// A subscription service with its logo.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SubscriptionService {
    pub name: &'static str,
    pub logo: &'static str,
}

pub const SUBSCRIPTION_SERVICES: &[SubscriptionService] = &[
    SubscriptionService {
        name: "GPT Plus",
        logo: "https://upload.wikimedia.org/wikipedia/commons/0/04/ChatGPT_logo.svg",
    },
    SubscriptionService {
        name: "iCloud+",
        logo: "https://upload.wikimedia.org/wikipedia/commons/1/1c/ICloud_logo.svg",
    },
    SubscriptionService {
        name: "Netflix",
        logo: "https://upload.wikimedia.org/wikipedia/commons/0/08/Netflix_2015_logo.svg",
    },
    SubscriptionService {
        name: "Microsoft",
        logo: "https://upload.wikimedia.org/wikipedia/commons/9/96/Microsoft_logo_%282012%29.svg",
    },
    SubscriptionService {
        name: "Cursor",
        logo: "https://commons.wikimedia.org/wiki/File:Cursorr-logo.svg",
    },
    SubscriptionService {
        name: "Spotify",
        logo: "https://upload.wikimedia.org/wikipedia/commons/1/19/Spotify_logo_without_text.svg",
    },
    SubscriptionService {
        name: "YouTube Premium",
        logo: "https://upload.wikimedia.org/wikipedia/commons/0/09/YouTube_full-color_icon_%282017%29.svg",
    },
    SubscriptionService {
        name: "Disney+",
        logo: "https://upload.wikimedia.org/wikipedia/commons/3/3e/Disney%2B_logo.svg",
    },
    SubscriptionService {
        name: "Crunchyroll",
        logo: "https://upload.wikimedia.org/wikipedia/commons/f/f6/Crunchyroll_Logo.svg",
    },
    SubscriptionService {
        name: "SmartFit",
        logo: "https://upload.wikimedia.org/wikipedia/commons/0/01/Smart_Fit_logo.svg",
    },
    SubscriptionService {
        name: "Amazon Prime",
        logo: "https://upload.wikimedia.org/wikipedia/commons/1/11/Amazon_Prime_Video_logo.svg",
    },
];

/// Looks up a subscription service by name, ignoring case.
pub fn subscription_service(name: &str) -> Option<&'static SubscriptionService> {
    let needle = name.trim();
    SUBSCRIPTION_SERVICES
        .iter()
        .find(|service| service.name.eq_ignore_ascii_case(needle))
}
