use regex::Regex;
use std::sync::LazyLock;

use karmanator_core::{Award, AwardKind};

static QUERY_ONE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^!karma ([A-Za-z0-9]+)$").expect("hardcoded regex"));

static AWARD_TOKEN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^([A-Za-z0-9]+)(\+\+|\+-|--)$").expect("hardcoded regex"));

const QUERY_TOP: &str = "!topkarma";

/// What a chat message asks the bot to do.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Classification {
    /// `!karma <name>`
    QueryOne(String),
    /// `!topkarma`
    QueryTop,
    /// One or more `name++` / `name--` / `name+-` tokens, in message order.
    Awards(Vec<Award>),
    /// Nothing for the bot.
    Unmatched,
}

/// Classify one message. Total over all inputs: anything that is not a
/// query or does not contain an award token is `Unmatched`.
///
/// Queries must be the whole (trimmed) message and take precedence; award
/// tokens are only scanned when the message is not a query.
pub fn classify(text: &str) -> Classification {
    let trimmed = text.trim();

    if let Some(caps) = QUERY_ONE.captures(trimmed) {
        return Classification::QueryOne(caps[1].to_string());
    }
    if trimmed == QUERY_TOP {
        return Classification::QueryTop;
    }

    let awards: Vec<Award> = trimmed.split_whitespace().filter_map(parse_award).collect();
    if awards.is_empty() {
        Classification::Unmatched
    } else {
        Classification::Awards(awards)
    }
}

/// A whole token of the form `<alphanumerics><suffix>`, nothing more.
fn parse_award(token: &str) -> Option<Award> {
    let caps = AWARD_TOKEN.captures(token)?;
    let kind = AwardKind::from_suffix(&caps[2])?;
    Some(Award::new(&caps[1], kind))
}
