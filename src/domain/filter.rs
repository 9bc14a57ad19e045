use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::app::{EddyError, Result};
use crate::domain::FeedItem;

/// Which flag a filtered folder selects on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum FilterType {
    Read,
    Unread,
    Favorites,
    Tags,
}

impl FilterType {
    pub const ALL: [FilterType; 4] = [
        FilterType::Read,
        FilterType::Unread,
        FilterType::Favorites,
        FilterType::Tags,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            FilterType::Read => "READ",
            FilterType::Unread => "UNREAD",
            FilterType::Favorites => "FAVORITES",
            FilterType::Tags => "TAGS",
        }
    }
}

impl fmt::Display for FilterType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for FilterType {
    type Err = EddyError;

    fn from_str(s: &str) -> Result<Self> {
        let wanted = s.trim().replace('-', "_").to_uppercase();
        Self::ALL
            .into_iter()
            .find(|kind| kind.as_str() == wanted)
            .ok_or_else(|| {
                EddyError::InvalidFilter(format!(
                    "unknown filter type {:?} (expected READ, UNREAD, FAVORITES or TAGS)",
                    s
                ))
            })
    }
}

/// Ordering applied to a filtered folder's items.
///
/// Stored settings may carry an order this build does not know; it loads as
/// [`SortOrder::Unsorted`] and leaves matches in corpus order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SortOrder {
    AlphabetNormal,
    AlphabetInverted,
    DateNewest,
    DateOldest,
    Unsorted,
}

impl SortOrder {
    pub const KNOWN: [SortOrder; 4] = [
        SortOrder::AlphabetNormal,
        SortOrder::AlphabetInverted,
        SortOrder::DateNewest,
        SortOrder::DateOldest,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            SortOrder::AlphabetNormal => "ALPHABET_NORMAL",
            SortOrder::AlphabetInverted => "ALPHABET_INVERTED",
            SortOrder::DateNewest => "DATE_NEWEST",
            SortOrder::DateOldest => "DATE_OLDEST",
            SortOrder::Unsorted => "UNSORTED",
        }
    }

    fn from_persisted(s: &str) -> Self {
        Self::KNOWN
            .into_iter()
            .find(|order| order.as_str() == s)
            .unwrap_or(SortOrder::Unsorted)
    }
}

impl fmt::Display for SortOrder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Strict parse for user input. Only the four real orders are accepted.
impl FromStr for SortOrder {
    type Err = EddyError;

    fn from_str(s: &str) -> Result<Self> {
        let wanted = s.trim().replace('-', "_").to_uppercase();
        Self::KNOWN
            .into_iter()
            .find(|order| order.as_str() == wanted)
            .ok_or_else(|| {
                EddyError::InvalidFilter(format!(
                    "unknown sort order {:?} (expected ALPHABET_NORMAL, ALPHABET_INVERTED, DATE_NEWEST or DATE_OLDEST)",
                    s
                ))
            })
    }
}

impl Serialize for SortOrder {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for SortOrder {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        Ok(Self::from_persisted(&raw))
    }
}

/// A saved, named view over all items.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FilterDefinition {
    pub name: String,
    pub filter_type: FilterType,
    /// Comma-separated folder names, or tag names for [`FilterType::Tags`].
    #[serde(default)]
    pub filter_content: String,
    pub sort_order: SortOrder,
}

impl FilterDefinition {
    pub fn new(
        name: impl Into<String>,
        filter_type: FilterType,
        filter_content: impl Into<String>,
        sort_order: SortOrder,
    ) -> Self {
        Self {
            name: name.into(),
            filter_type,
            filter_content: filter_content.into(),
            sort_order,
        }
    }

    /// Checks run when a definition is created or edited.
    pub fn validate(&self) -> Result<()> {
        if self.name.trim().is_empty() {
            return Err(EddyError::InvalidFilter("name must not be empty".into()));
        }
        if self.sort_order == SortOrder::Unsorted {
            return Err(EddyError::InvalidFilter(format!(
                "{} has no recognised sort order",
                self.name
            )));
        }
        if self.filter_type == FilterType::Tags && self.content_list().is_empty() {
            return Err(EddyError::InvalidFilter(format!(
                "{} filters on tags but lists none",
                self.name
            )));
        }
        Ok(())
    }

    /// Entries of `filter_content`, trimmed, empties dropped.
    pub fn content_list(&self) -> Vec<&str> {
        self.filter_content
            .split(',')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .collect()
    }
}

/// A filter definition paired with the items it currently selects.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FilteredFolderContent {
    pub filter: FilterDefinition,
    pub items: Vec<FeedItem>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_filter_type_from_str() {
        assert_eq!("READ".parse::<FilterType>().unwrap(), FilterType::Read);
        assert_eq!("favorites".parse::<FilterType>().unwrap(), FilterType::Favorites);
        assert!(matches!(
            "STARRED".parse::<FilterType>(),
            Err(EddyError::InvalidFilter(_))
        ));
    }

    #[test]
    fn test_sort_order_from_str_is_strict() {
        assert_eq!(
            "date-newest".parse::<SortOrder>().unwrap(),
            SortOrder::DateNewest
        );
        assert!("UNSORTED".parse::<SortOrder>().is_err());
        assert!("RANDOM".parse::<SortOrder>().is_err());
    }

    #[test]
    fn test_persisted_shape() {
        let def = FilterDefinition::new("Tech", FilterType::Unread, "Tech,News", SortOrder::DateOldest);
        let json = serde_json::to_value(&def).unwrap();
        assert_eq!(json["filterType"], "UNREAD");
        assert_eq!(json["filterContent"], "Tech,News");
        assert_eq!(json["sortOrder"], "DATE_OLDEST");

        let back: FilterDefinition = serde_json::from_value(json).unwrap();
        assert_eq!(back, def);
    }

    #[test]
    fn test_unknown_persisted_sort_order_loads_unsorted() {
        let json = r#"{"name": "x", "filterType": "READ", "filterContent": "", "sortOrder": "SHUFFLE"}"#;
        let def: FilterDefinition = serde_json::from_str(json).unwrap();
        assert_eq!(def.sort_order, SortOrder::Unsorted);
    }

    #[test]
    fn test_unknown_persisted_filter_type_fails() {
        let json = r#"{"name": "x", "filterType": "STARRED", "filterContent": "", "sortOrder": "DATE_NEWEST"}"#;
        assert!(serde_json::from_str::<FilterDefinition>(json).is_err());
    }

    #[test]
    fn test_content_list_tolerates_empty_and_spaces() {
        let def = FilterDefinition::new("x", FilterType::Read, "", SortOrder::DateNewest);
        assert!(def.content_list().is_empty());

        let def = FilterDefinition::new("x", FilterType::Read, " Tech , ,News", SortOrder::DateNewest);
        assert_eq!(def.content_list(), vec!["Tech", "News"]);
    }

    #[test]
    fn test_validate() {
        let ok = FilterDefinition::new("x", FilterType::Read, "", SortOrder::DateNewest);
        assert!(ok.validate().is_ok());

        let unnamed = FilterDefinition::new(" ", FilterType::Read, "", SortOrder::DateNewest);
        assert!(unnamed.validate().is_err());

        let no_tags = FilterDefinition::new("x", FilterType::Tags, "", SortOrder::DateNewest);
        assert!(no_tags.validate().is_err());

        let unsorted = FilterDefinition::new("x", FilterType::Read, "", SortOrder::Unsorted);
        assert!(unsorted.validate().is_err());
    }
}
