//! Recipient roles and the to/cc/bcc partition shared by every provider.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::Recipient;

/// How a recipient receives the message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase", from = "String")]
pub enum RecipientRole {
    /// Primary recipient.
    #[default]
    To,
    /// Carbon copy.
    Cc,
    /// Blind carbon copy.
    Bcc,
}

impl RecipientRole {
    /// Resolve a role tag. Anything that is not `cc` or `bcc`, including a
    /// missing tag, is a primary recipient.
    pub fn from_tag(tag: Option<&str>) -> Self {
        match tag.map(|t| t.trim().to_ascii_lowercase()).as_deref() {
            Some("cc") => Self::Cc,
            Some("bcc") => Self::Bcc,
            _ => Self::To,
        }
    }

    /// Wire name of the role.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::To => "to",
            Self::Cc => "cc",
            Self::Bcc => "bcc",
        }
    }
}

impl fmt::Display for RecipientRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<&str> for RecipientRole {
    fn from(tag: &str) -> Self {
        Self::from_tag(Some(tag))
    }
}

impl From<String> for RecipientRole {
    fn from(tag: String) -> Self {
        Self::from_tag(Some(&tag))
    }
}

/// Recipients split by role.
///
/// Each group keeps the relative order the recipients had in the message.
/// Groups borrow from the message and are rebuilt for every payload.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RecipientGroups<'a> {
    /// Primary recipients.
    pub to: Vec<&'a Recipient>,
    /// Carbon-copy recipients.
    pub cc: Vec<&'a Recipient>,
    /// Blind carbon-copy recipients.
    pub bcc: Vec<&'a Recipient>,
}

impl<'a> RecipientGroups<'a> {
    /// Stable partition of `recipients` into to/cc/bcc.
    pub fn partition(recipients: &'a [Recipient]) -> Self {
        let mut groups = Self::default();

        for recipient in recipients {
            match recipient.role {
                RecipientRole::To => groups.to.push(recipient),
                RecipientRole::Cc => groups.cc.push(recipient),
                RecipientRole::Bcc => groups.bcc.push(recipient),
            }
        }

        groups
    }

    /// Whether any cc or bcc recipient is present.
    pub fn has_copies(&self) -> bool {
        !self.cc.is_empty() || !self.bcc.is_empty()
    }

    /// Total number of recipients across all groups.
    pub fn len(&self) -> usize {
        self.to.len() + self.cc.len() + self.bcc.len()
    }

    /// Whether there are no recipients at all.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn recipient(email: &str, role: RecipientRole) -> Recipient {
        Recipient::new(email, "", role).unwrap()
    }

    #[test]
    fn test_role_defaults_to_primary() {
        assert_eq!(RecipientRole::from_tag(None), RecipientRole::To);
        assert_eq!(RecipientRole::from("to"), RecipientRole::To);
        assert_eq!(RecipientRole::from("reply-to"), RecipientRole::To);
        assert_eq!(RecipientRole::from(""), RecipientRole::To);
        assert_eq!(RecipientRole::from(" CC "), RecipientRole::Cc);
        assert_eq!(RecipientRole::from("Bcc"), RecipientRole::Bcc);
    }

    #[test]
    fn test_role_deserializes_unknown_as_primary() {
        let role: RecipientRole = serde_json::from_str("\"bcc\"").unwrap();
        assert_eq!(role, RecipientRole::Bcc);

        let role: RecipientRole = serde_json::from_str("\"whatever\"").unwrap();
        assert_eq!(role, RecipientRole::To);

        assert_eq!(serde_json::to_string(&RecipientRole::Cc).unwrap(), "\"cc\"");
    }

    #[test]
    fn test_partition_is_stable() {
        let recipients = vec![
            recipient("a@example.com", RecipientRole::Cc),
            recipient("b@example.com", RecipientRole::To),
            recipient("c@example.com", RecipientRole::Bcc),
            recipient("d@example.com", RecipientRole::Cc),
            recipient("e@example.com", RecipientRole::To),
            recipient("f@example.com", RecipientRole::Bcc),
        ];

        let groups = RecipientGroups::partition(&recipients);
        let emails = |group: &[&Recipient]| {
            group.iter().map(|r| r.email().to_string()).collect::<Vec<_>>()
        };

        assert_eq!(emails(&groups.to), ["b@example.com", "e@example.com"]);
        assert_eq!(emails(&groups.cc), ["a@example.com", "d@example.com"]);
        assert_eq!(emails(&groups.bcc), ["c@example.com", "f@example.com"]);
        assert!(groups.has_copies());
    }

    #[test]
    fn test_partition_is_lossless() {
        let recipients = vec![
            recipient("same@example.com", RecipientRole::To),
            recipient("same@example.com", RecipientRole::To),
            recipient("same@example.com", RecipientRole::Bcc),
            recipient("other@example.com", RecipientRole::Cc),
        ];

        let groups = RecipientGroups::partition(&recipients);
        assert_eq!(groups.len(), recipients.len());

        let mut rejoined: Vec<&Recipient> = groups
            .to
            .iter()
            .chain(&groups.cc)
            .chain(&groups.bcc)
            .copied()
            .collect();
        let mut original: Vec<&Recipient> = recipients.iter().collect();
        let key = |r: &&Recipient| (r.email().to_string(), r.role.as_str());
        rejoined.sort_by_key(key);
        original.sort_by_key(key);
        assert_eq!(rejoined, original);
    }

    #[test]
    fn test_partition_empty() {
        let groups = RecipientGroups::partition(&[]);
        assert!(groups.is_empty());
        assert!(!groups.has_copies());
    }
}
