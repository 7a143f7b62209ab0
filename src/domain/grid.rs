//! Server side of the data-grid protocol.
//!
//! A [`GridRequest`] is read from decoded request parameters and turned into a
//! storage-agnostic [`QueryPlan`]. The database adapter translates the plan; this
//! module never sees SQL.

use crate::domain::message::Message;
use crate::domain::params::ParamValue;
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use time::format_description::well_known::Rfc3339;

/// Persisted fields a client may name in `columns[i][data]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MessageField {
    Id,
    Author,
    Message,
    Created,
    Updated,
}

impl MessageField {
    /// Fields exported in grid rows. `deleted` is internal and never listed.
    pub const PROJECTED: [Self; 5] = [Self::Id, Self::Author, Self::Message, Self::Created, Self::Updated];

    #[must_use]
    pub fn parse(name: &str) -> Option<Self> {
        Self::PROJECTED.into_iter().find(|field| field.name() == name)
    }

    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Id => "id",
            Self::Author => "author",
            Self::Message => "message",
            Self::Created => "created",
            Self::Updated => "updated",
        }
    }

    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Id => "Id",
            Self::Author => "Author",
            Self::Message => "Message",
            Self::Created => "Created",
            Self::Updated => "Updated",
        }
    }

    fn render(self, message: &Message) -> String {
        match self {
            Self::Id => message.id.to_string(),
            Self::Author => message.author.clone(),
            Self::Message => message.message.clone(),
            Self::Created => message.created.format(&Rfc3339).unwrap_or_default(),
            Self::Updated => message.updated.format(&Rfc3339).unwrap_or_default(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortDirection {
    #[default]
    Asc,
    Desc,
}

impl SortDirection {
    /// Anything but `desc` sorts ascending.
    #[must_use]
    pub fn parse(dir: &str) -> Self {
        if dir == "desc" { Self::Desc } else { Self::Asc }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ColumnSpec {
    pub data: Option<String>,
    pub searchable: bool,
}

/// One `order[j]` entry: client column id plus direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SortDirective {
    pub column: usize,
    pub direction: SortDirection,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GridRequest {
    pub draw: String,
    pub columns: BTreeMap<usize, ColumnSpec>,
    pub order: Vec<SortDirective>,
    pub search: Option<String>,
    pub start: u64,
    pub length: u64,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Search {
    pub fields: Vec<MessageField>,
    pub needle: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SortKey {
    pub field: MessageField,
    pub direction: SortDirection,
}

/// What the storage layer has to fetch. Live rows only; `deleted` is not expressible here.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct QueryPlan {
    pub search: Option<Search>,
    pub sort: Vec<SortKey>,
    pub offset: u64,
    /// `None` means an unbounded page.
    pub limit: Option<u64>,
}

/// Counts and rows for one grid page.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct GridPage {
    pub total: u64,
    pub filtered: u64,
    pub rows: Vec<Map<String, Value>>,
}

/// Offsets are bound as SQLite integers; anything larger is past every page anyway.
const MAX_START: u64 = i64::MAX.unsigned_abs();

fn parse_count(raw: Option<&str>) -> Option<u64> {
    raw.filter(|s| !s.is_empty() && s.bytes().all(|b| b.is_ascii_digit())).and_then(|s| s.parse().ok())
}

impl GridRequest {
    /// Reads the grid protocol fields. Returns `None` unless a non-empty `draw` is present.
    ///
    /// Malformed numbers fall back to defaults; malformed `order` entries are dropped.
    #[must_use]
    pub fn from_params(params: &ParamValue, default_length: u64) -> Option<Self> {
        let draw = params.str_at("draw").filter(|d| !d.is_empty())?.to_owned();
        let start = parse_count(params.str_at("start")).unwrap_or(0).min(MAX_START);
        let length = parse_count(params.str_at("length")).unwrap_or(default_length);

        let columns: BTreeMap<usize, ColumnSpec> = params
            .get("columns")
            .map(|columns| {
                columns
                    .indexed()
                    .into_iter()
                    .map(|(i, column)| {
                        let spec = ColumnSpec {
                            data: column.str_at("data").map(ToOwned::to_owned),
                            searchable: column.str_at("searchable") == Some("true"),
                        };
                        (i, spec)
                    })
                    .collect()
            })
            .unwrap_or_default();

        // Directive ids only fix the order of application, so they collapse to positions.
        let order: Vec<SortDirective> = params
            .get("order")
            .cloned()
            .map(ParamValue::into_list)
            .map(|order| {
                order
                    .items()
                    .iter()
                    .filter_map(|directive| {
                        let column = parse_count(directive.str_at("column"))?;
                        let column = usize::try_from(column).ok()?;
                        let direction = SortDirection::parse(directive.str_at("dir").unwrap_or_default());
                        Some(SortDirective { column, direction })
                    })
                    .collect()
            })
            .unwrap_or_default();

        let search = params.get("search").and_then(|s| s.str_at("value")).map(ToOwned::to_owned);

        Some(Self { draw, columns, order, search, start, length })
    }

    fn field_of(&self, column: usize) -> Option<MessageField> {
        self.columns.get(&column).and_then(|c| c.data.as_deref()).and_then(MessageField::parse)
    }

    /// The substring filter, if any. A term with no searchable column does not filter.
    #[must_use]
    pub fn search_filter(&self) -> Option<Search> {
        let needle = self.search.as_deref().filter(|s| !s.is_empty())?;
        let fields: Vec<MessageField> = self
            .columns
            .iter()
            .filter(|(_, column)| column.searchable)
            .filter_map(|(i, _)| self.field_of(*i))
            .collect();
        if fields.is_empty() {
            return None;
        }
        Some(Search { fields, needle: needle.to_owned() })
    }

    /// Sort keys in directive order. Column ids that do not resolve to a known field are skipped.
    #[must_use]
    pub fn sort_keys(&self) -> Vec<SortKey> {
        self.order
            .iter()
            .filter_map(|d| self.field_of(d.column).map(|field| SortKey { field, direction: d.direction }))
            .collect()
    }

    /// Builds the page query once the filtered count is known.
    ///
    /// An offset at or past `filtered` is dropped. A zero length means no limit.
    #[must_use]
    pub fn plan(&self, filtered: u64) -> QueryPlan {
        QueryPlan {
            search: self.search_filter(),
            sort: self.sort_keys(),
            offset: if self.start > 0 && self.start < filtered { self.start } else { 0 },
            limit: (self.length > 0).then_some(self.length),
        }
    }
}

/// Display-safe projection of every exported field.
#[must_use]
pub fn project_fields(message: &Message) -> Map<String, Value> {
    MessageField::PROJECTED
        .into_iter()
        .map(|field| (field.name().to_owned(), Value::String(escape_html(&field.render(message)))))
        .collect()
}

/// [`project_fields`] plus `_seq`, the 1-based position across pages.
#[must_use]
pub fn project_row(message: &Message, seq: u64) -> Map<String, Value> {
    let mut row = project_fields(message);
    row.insert("_seq".to_owned(), Value::from(seq));
    row
}

#[must_use]
pub fn escape_html(raw: &str) -> String {
    let mut escaped = String::with_capacity(raw.len());
    for c in raw.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&#34;"),
            '\'' => escaped.push_str("&#39;"),
            _ => escaped.push(c),
        }
    }
    escaped
}
