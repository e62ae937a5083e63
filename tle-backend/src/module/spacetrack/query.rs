//! Space-Track query path builder
//!
//! The query DSL is positional: `/class/<name>/<FIELD>/<value>/.../format/json`.
//! Segment order per class is fixed and optional segments are simply left
//! out. Escaping is deliberately inconsistent because the service is:
//! spaces become `%20` in time expressions and `orderby`, but `>` is only
//! percent-encoded in the decay filter. `CREATED/>` and `EPOCH/>` stay literal.

use serde::{Deserialize, Serialize};
use thiserror::Error;

pub const QUERY_ROOT: &str = "/basicspacedata/query/class";
pub const FORMAT_SEGMENT: &str = "format/json";

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum QueryError {
    #[error("query name {0:?} must be non-empty and use only letters, digits, '-' or '_'")]
    InvalidName(String),

    #[error("{class} query requires {field}")]
    MissingField {
        class: &'static str,
        field: &'static str,
    },
}

fn default_ordinal() -> i64 {
    1
}

fn default_norad_filter() -> String {
    ">0".to_string()
}

fn default_decay_since() -> String {
    "now-5 years".to_string()
}

fn default_cdm_since() -> String {
    "now-30 days".to_string()
}

fn default_orderby() -> String {
    "EPOCH desc".to_string()
}

/// One archive query, tagged by resource class
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "class", rename_all = "snake_case")]
pub enum ArchiveQuery {
    /// Satellite catalog metadata
    Satcat {
        #[serde(default, rename = "where")]
        where_clause: Option<String>,
        #[serde(default)]
        limit: Option<u32>,
    },
    /// Newest element sets (ORDINAL 1 = latest per object)
    TleLatest {
        #[serde(default = "default_ordinal")]
        ordinal: i64,
        #[serde(default = "default_norad_filter")]
        norad_filter: String,
        #[serde(default, rename = "where")]
        where_clause: Option<String>,
        #[serde(default)]
        limit: Option<u32>,
    },
    /// Decay / reentry records since a relative time
    Decay {
        #[serde(default = "default_decay_since")]
        epoch_since: String,
        #[serde(default, rename = "where")]
        where_clause: Option<String>,
        #[serde(default)]
        limit: Option<u32>,
    },
    /// Public conjunction data messages
    CdmPublic {
        #[serde(default = "default_cdm_since")]
        created_since: String,
        #[serde(default, rename = "where")]
        where_clause: Option<String>,
        #[serde(default)]
        limit: Option<u32>,
    },
    /// Historical element sets for one object, optionally bounded by epoch
    Tle {
        norad_cat_id: u32,
        #[serde(default)]
        epoch_start: Option<String>,
        #[serde(default)]
        epoch_end: Option<String>,
        #[serde(default = "default_orderby")]
        orderby: String,
        #[serde(default)]
        limit: Option<u32>,
    },
}

impl ArchiveQuery {
    pub fn satcat() -> Self {
        ArchiveQuery::Satcat {
            where_clause: None,
            limit: None,
        }
    }

    pub fn tle_latest() -> Self {
        ArchiveQuery::TleLatest {
            ordinal: default_ordinal(),
            norad_filter: default_norad_filter(),
            where_clause: None,
            limit: None,
        }
    }

    pub fn decay(epoch_since: impl Into<String>) -> Self {
        ArchiveQuery::Decay {
            epoch_since: epoch_since.into(),
            where_clause: None,
            limit: None,
        }
    }

    pub fn cdm_public(created_since: impl Into<String>) -> Self {
        ArchiveQuery::CdmPublic {
            created_since: created_since.into(),
            where_clause: None,
            limit: None,
        }
    }

    pub fn tle(norad_cat_id: u32) -> Self {
        ArchiveQuery::Tle {
            norad_cat_id,
            epoch_start: None,
            epoch_end: None,
            orderby: default_orderby(),
            limit: None,
        }
    }

    /// Set the row limit on any class
    pub fn with_limit(mut self, value: u32) -> Self {
        match &mut self {
            ArchiveQuery::Satcat { limit, .. }
            | ArchiveQuery::TleLatest { limit, .. }
            | ArchiveQuery::Decay { limit, .. }
            | ArchiveQuery::CdmPublic { limit, .. }
            | ArchiveQuery::Tle { limit, .. } => *limit = Some(value),
        }
        self
    }

    /// Set a raw predicate; ignored by the `tle` class, which has no free filter
    pub fn with_where(mut self, predicate: impl Into<String>) -> Self {
        match &mut self {
            ArchiveQuery::Satcat { where_clause, .. }
            | ArchiveQuery::TleLatest { where_clause, .. }
            | ArchiveQuery::Decay { where_clause, .. }
            | ArchiveQuery::CdmPublic { where_clause, .. } => {
                *where_clause = Some(predicate.into())
            }
            ArchiveQuery::Tle { .. } => {}
        }
        self
    }

    /// Bound a `tle` query by epoch; ignored by other classes
    pub fn with_epoch_range(mut self, start: Option<String>, end: Option<String>) -> Self {
        if let ArchiveQuery::Tle {
            epoch_start,
            epoch_end,
            ..
        } = &mut self
        {
            *epoch_start = start;
            *epoch_end = end;
        }
        self
    }

    pub fn class(&self) -> &'static str {
        match self {
            ArchiveQuery::Satcat { .. } => "satcat",
            ArchiveQuery::TleLatest { .. } => "tle_latest",
            ArchiveQuery::Decay { .. } => "decay",
            ArchiveQuery::CdmPublic { .. } => "cdm_public",
            ArchiveQuery::Tle { .. } => "tle",
        }
    }

    /// True for classes whose rows carry TLE line fields
    pub fn is_tle_class(&self) -> bool {
        matches!(self, ArchiveQuery::TleLatest { .. } | ArchiveQuery::Tle { .. })
    }

    /// Filter segments between the class name and the format segment
    pub fn segments(&self) -> Vec<String> {
        let mut parts = Vec::new();

        match self {
            ArchiveQuery::Satcat {
                where_clause,
                limit,
            } => {
                push_where(&mut parts, where_clause);
                push_limit(&mut parts, *limit);
            }
            ArchiveQuery::TleLatest {
                ordinal,
                norad_filter,
                where_clause,
                limit,
            } => {
                parts.push(format!("ORDINAL/{}", ordinal));
                parts.push(format!("NORAD_CAT_ID/{}", norad_filter));
                push_where(&mut parts, where_clause);
                push_limit(&mut parts, *limit);
            }
            ArchiveQuery::Decay {
                epoch_since,
                where_clause,
                limit,
            } => {
                parts.push(format!("DECAY/%3E{}", encode_spaces(epoch_since)));
                push_where(&mut parts, where_clause);
                push_limit(&mut parts, *limit);
            }
            ArchiveQuery::CdmPublic {
                created_since,
                where_clause,
                limit,
            } => {
                parts.push(format!("CREATED/>{}", encode_spaces(created_since)));
                push_where(&mut parts, where_clause);
                push_limit(&mut parts, *limit);
            }
            ArchiveQuery::Tle {
                norad_cat_id,
                epoch_start,
                epoch_end,
                orderby,
                limit,
            } => {
                parts.push(format!("NORAD_CAT_ID/{}", norad_cat_id));
                if let Some(epoch) = epoch_segment(epoch_start.as_deref(), epoch_end.as_deref()) {
                    parts.push(epoch);
                }
                parts.push(format!("orderby/{}", encode_spaces(orderby)));
                push_limit(&mut parts, *limit);
            }
        }

        parts
    }

    /// Full request path, to be appended to the service base URL
    pub fn path(&self) -> String {
        let mut parts = vec![format!("{}/{}", QUERY_ROOT, self.class())];
        parts.extend(self.segments());
        parts.push(FORMAT_SEGMENT.to_string());
        parts.join("/")
    }
}

/// Encode spaces only; every other character is passed through
pub fn encode_spaces(value: &str) -> String {
    value.replace(' ', "%20")
}

/// `EPOCH/<start>--<end>`, `EPOCH/><start>` or `EPOCH/<<end>`
pub fn epoch_segment(start: Option<&str>, end: Option<&str>) -> Option<String> {
    let start = start.filter(|s| !s.is_empty());
    let end = end.filter(|s| !s.is_empty());

    match (start, end) {
        (Some(start), Some(end)) => Some(format!("EPOCH/{}--{}", start, end)),
        (Some(start), None) => Some(format!("EPOCH/>{}", start)),
        (None, Some(end)) => Some(format!("EPOCH/<{}", end)),
        (None, None) => None,
    }
}

fn push_where(parts: &mut Vec<String>, where_clause: &Option<String>) {
    if let Some(predicate) = where_clause.as_deref().filter(|p| !p.is_empty()) {
        parts.push(predicate.to_string());
    }
}

fn push_limit(parts: &mut Vec<String>, limit: Option<u32>) {
    if let Some(limit) = limit {
        parts.push(format!("limit/{}", limit));
    }
}

/// A configured query with the name used for its output file
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NamedQuery {
    pub name: String,
    #[serde(flatten)]
    pub query: ArchiveQuery,
}

impl NamedQuery {
    pub fn new(name: impl Into<String>, query: ArchiveQuery) -> Result<Self, QueryError> {
        let named = Self {
            name: name.into(),
            query,
        };
        named.validate()?;
        Ok(named)
    }

    pub fn validate(&self) -> Result<(), QueryError> {
        let valid = !self.name.is_empty()
            && self
                .name
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_');
        if valid {
            Ok(())
        } else {
            Err(QueryError::InvalidName(self.name.clone()))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decay_encodes_gt_and_spaces() {
        let query = ArchiveQuery::decay("now-5 years");
        assert_eq!(query.segments(), vec!["DECAY/%3Enow-5%20years".to_string()]);
        assert_eq!(
            query.path(),
            "/basicspacedata/query/class/decay/DECAY/%3Enow-5%20years/format/json"
        );
    }

    #[test]
    fn test_tle_epoch_range() {
        let query = ArchiveQuery::tle(58074).with_epoch_range(
            Some("2025-08-01".to_string()),
            Some("2025-08-31".to_string()),
        );
        assert_eq!(
            query.path(),
            "/basicspacedata/query/class/tle/NORAD_CAT_ID/58074/EPOCH/2025-08-01--2025-08-31/orderby/EPOCH%20desc/format/json"
        );
    }

    #[test]
    fn test_epoch_segment_variants() {
        assert_eq!(epoch_segment(Some("2025-08-16"), None).unwrap(), "EPOCH/>2025-08-16");
        assert_eq!(epoch_segment(None, Some("2025-08-18")).unwrap(), "EPOCH/<2025-08-18");
        assert_eq!(epoch_segment(None, None), None);
        assert_eq!(epoch_segment(Some(""), Some("")), None);
    }

    #[test]
    fn test_tle_without_epoch_and_with_limit() {
        let query = ArchiveQuery::tle(25544).with_limit(5);
        assert_eq!(
            query.path(),
            "/basicspacedata/query/class/tle/NORAD_CAT_ID/25544/orderby/EPOCH%20desc/limit/5/format/json"
        );
    }

    #[test]
    fn test_satcat_optional_segments() {
        assert_eq!(
            ArchiveQuery::satcat().path(),
            "/basicspacedata/query/class/satcat/format/json"
        );
        let query = ArchiveQuery::satcat()
            .with_where("OBJECT_TYPE/DEBRIS")
            .with_limit(20000);
        assert_eq!(
            query.path(),
            "/basicspacedata/query/class/satcat/OBJECT_TYPE/DEBRIS/limit/20000/format/json"
        );
    }

    #[test]
    fn test_tle_latest_keeps_gt_literal() {
        let query = ArchiveQuery::tle_latest().with_limit(20000);
        assert_eq!(
            query.path(),
            "/basicspacedata/query/class/tle_latest/ORDINAL/1/NORAD_CAT_ID/>0/limit/20000/format/json"
        );
    }

    #[test]
    fn test_cdm_public_keeps_gt_literal() {
        let query = ArchiveQuery::cdm_public("now-100 days");
        assert_eq!(query.segments(), vec!["CREATED/>now-100%20days".to_string()]);
    }

    #[test]
    fn test_where_is_not_encoded_and_ignored_for_tle() {
        let query = ArchiveQuery::decay("now-1 year").with_where("OBJECT_NAME/~~COSMOS 2251");
        assert_eq!(query.segments()[1], "OBJECT_NAME/~~COSMOS 2251");

        let tle = ArchiveQuery::tle(1).with_where("ignored");
        assert!(!tle.path().contains("ignored"));
    }

    #[test]
    fn test_named_query_from_toml() {
        #[derive(Deserialize)]
        struct Wrapper {
            queries: Vec<NamedQuery>,
        }

        let toml_str = r#"
            [[queries]]
            name = "decay_5y"
            class = "decay"

            [[queries]]
            name = "iss_history"
            class = "tle"
            norad_cat_id = 25544
            epoch_start = "2025-08-16"
            limit = 10

            [[queries]]
            name = "latest"
            class = "tle_latest"
            where = "OBJECT_TYPE/DEBRIS"
        "#;
        let wrapper: Wrapper = toml::from_str(toml_str).unwrap();

        assert_eq!(wrapper.queries.len(), 3);
        assert_eq!(wrapper.queries[0].query, ArchiveQuery::decay("now-5 years"));
        assert_eq!(
            wrapper.queries[1].query,
            ArchiveQuery::tle(25544)
                .with_epoch_range(Some("2025-08-16".to_string()), None)
                .with_limit(10)
        );
        assert!(wrapper.queries[2].query.is_tle_class());
        assert_eq!(
            wrapper.queries[2].query,
            ArchiveQuery::tle_latest().with_where("OBJECT_TYPE/DEBRIS")
        );
    }

    #[test]
    fn test_named_query_validation() {
        assert!(NamedQuery::new("decay_5y", ArchiveQuery::satcat()).is_ok());
        assert_eq!(
            NamedQuery::new("../escape", ArchiveQuery::satcat()),
            Err(QueryError::InvalidName("../escape".to_string()))
        );
        assert!(NamedQuery::new("", ArchiveQuery::satcat()).is_err());
    }
}
