//! Translates the optional filter/sort/pagination parameters of a video
//! listing into an ordered sequence of query stages.
//!
//! The stage list is the contract: the database implementation renders it
//! into whatever query language it speaks, but the order and content of the
//! stages is decided here, deterministically, from the criteria alone.

use thiserror::Error;

use crate::PrimaryKey;

pub const DEFAULT_PAGE: i64 = 1;
pub const DEFAULT_LIMIT: i64 = 10;

pub type ListingResult<T> = std::result::Result<T, ListingError>;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ListingError {
    #[error("Unknown sort field: {0}")]
    UnknownSortField(String),
}

/// Page and limit as they arrive from the caller, before clamping.
#[derive(Debug, Clone, Copy, Default)]
pub struct PageParams {
    pub page: Option<i64>,
    pub limit: Option<i64>,
}

impl PageParams {
    pub fn new(page: Option<i64>, limit: Option<i64>) -> Self {
        Self { page, limit }
    }

    /// The effective page, defaulting to 1 when absent or non-positive
    pub fn page(&self) -> i64 {
        self.page.filter(|p| *p >= 1).unwrap_or(DEFAULT_PAGE)
    }

    /// The effective limit, defaulting to 10 when absent or non-positive
    pub fn limit(&self) -> i64 {
        self.limit.filter(|l| *l >= 1).unwrap_or(DEFAULT_LIMIT)
    }

    pub fn offset(&self) -> i64 {
        (self.page() - 1) * self.limit()
    }
}

/// A page of results along with the pre-pagination total,
/// so clients can render page controls.
#[derive(Debug, Clone)]
pub struct Paginated<T> {
    pub items: Vec<T>,
    pub page: i64,
    pub limit: i64,
    pub total: i64,
}

impl<T> Paginated<T> {
    pub fn new(items: Vec<T>, params: &PageParams, total: i64) -> Self {
        Self {
            items,
            page: params.page(),
            limit: params.limit(),
            total,
        }
    }

    pub fn total_pages(&self) -> i64 {
        (self.total + self.limit - 1) / self.limit
    }

    pub fn map<O, F>(self, f: F) -> Paginated<O>
    where
        F: FnMut(T) -> O,
    {
        Paginated {
            items: self.items.into_iter().map(f).collect(),
            page: self.page,
            limit: self.limit,
            total: self.total,
        }
    }
}

/// A field of the video collection that listings may sort by.
/// Anything outside this closed set is rejected before it can reach a query.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortField {
    Title,
    Duration,
    Views,
    CreatedAt,
}

impl SortField {
    pub fn parse(raw: &str) -> ListingResult<Self> {
        match raw {
            "title" => Ok(Self::Title),
            "duration" => Ok(Self::Duration),
            "views" => Ok(Self::Views),
            "createdAt" | "created_at" => Ok(Self::CreatedAt),
            other => Err(ListingError::UnknownSortField(other.to_string())),
        }
    }

    /// The column this field maps to
    pub fn column(&self) -> &'static str {
        match self {
            Self::Title => "title",
            Self::Duration => "duration",
            Self::Views => "views",
            Self::CreatedAt => "created_at",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortDirection {
    #[default]
    Ascending,
    Descending,
}

impl SortDirection {
    /// Parses a direction, falling back to ascending when
    /// the value is unrecognized or absent.
    pub fn parse(raw: Option<&str>) -> Self {
        match raw {
            Some("desc") => Self::Descending,
            _ => Self::Ascending,
        }
    }

    pub fn sql(&self) -> &'static str {
        match self {
            Self::Ascending => "ASC",
            Self::Descending => "DESC",
        }
    }
}

/// One stage of the listing query plan
#[derive(Debug, Clone, PartialEq)]
pub enum Stage {
    /// Restrict to videos owned by this user
    MatchOwner(PrimaryKey),
    /// Case-insensitive substring match against title or description
    MatchText(String),
    Sort {
        field: SortField,
        direction: SortDirection,
    },
    /// Left-join the owning user, projecting username, email and avatar
    JoinOwner,
    Paginate {
        offset: i64,
        limit: i64,
    },
}

/// The validated criteria of a video listing request
#[derive(Debug, Clone)]
pub struct VideoListing {
    pub owner_id: PrimaryKey,
    pub text_query: Option<String>,
    pub sort: Option<(SortField, SortDirection)>,
    pub params: PageParams,
}

impl VideoListing {
    /// Builds a listing from raw query parameters. Fails when the sort
    /// field is not one of the known video fields.
    pub fn from_raw(
        owner_id: PrimaryKey,
        text_query: Option<String>,
        sort_by: Option<String>,
        sort_type: Option<String>,
        params: PageParams,
    ) -> ListingResult<Self> {
        let sort = sort_by
            .as_deref()
            .map(SortField::parse)
            .transpose()?
            .map(|field| (field, SortDirection::parse(sort_type.as_deref())));

        Ok(Self {
            owner_id,
            text_query: text_query.filter(|q| !q.is_empty()),
            sort,
            params,
        })
    }

    /// Expands the criteria into the ordered stage list.
    /// The order is fixed: filter, text match, sort, owner join, paginate.
    pub fn stages(&self) -> Vec<Stage> {
        let mut stages = vec![Stage::MatchOwner(self.owner_id)];

        if let Some(query) = &self.text_query {
            stages.push(Stage::MatchText(query.clone()));
        }

        if let Some((field, direction)) = self.sort {
            stages.push(Stage::Sort { field, direction });
        }

        stages.push(Stage::JoinOwner);
        stages.push(Stage::Paginate {
            offset: self.params.offset(),
            limit: self.params.limit(),
        });

        stages
    }
}

/// Escapes LIKE wildcards in a text query so it matches literally
pub fn escape_like(query: &str) -> String {
    query
        .replace('\\', "\\\\")
        .replace('%', "\\%")
        .replace('_', "\\_")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn listing(
        query: Option<&str>,
        sort_by: Option<&str>,
        sort_type: Option<&str>,
    ) -> VideoListing {
        VideoListing::from_raw(
            7,
            query.map(str::to_string),
            sort_by.map(str::to_string),
            sort_type.map(str::to_string),
            PageParams::new(Some(2), Some(5)),
        )
        .expect("listing is valid")
    }

    #[test]
    fn stage_order_is_fixed() {
        let stages = listing(Some("cat"), Some("views"), Some("desc")).stages();

        assert_eq!(
            stages,
            vec![
                Stage::MatchOwner(7),
                Stage::MatchText("cat".to_string()),
                Stage::Sort {
                    field: SortField::Views,
                    direction: SortDirection::Descending,
                },
                Stage::JoinOwner,
                Stage::Paginate {
                    offset: 5,
                    limit: 5,
                },
            ]
        );
    }

    #[test]
    fn owner_join_is_always_emitted() {
        for query in [None, Some("cat")] {
            let stages = listing(query, None, None).stages();
            assert!(stages.contains(&Stage::JoinOwner));
        }
    }

    #[test]
    fn optional_stages_are_omitted() {
        let stages = listing(None, None, None).stages();

        assert_eq!(
            stages,
            vec![
                Stage::MatchOwner(7),
                Stage::JoinOwner,
                Stage::Paginate {
                    offset: 5,
                    limit: 5,
                },
            ]
        );
    }

    #[test]
    fn empty_text_query_is_ignored() {
        let stages = listing(Some(""), None, None).stages();
        assert!(!matches!(stages[1], Stage::MatchText(_)));
    }

    #[test]
    fn unknown_sort_field_is_rejected() {
        let result = VideoListing::from_raw(
            1,
            None,
            Some("password".to_string()),
            None,
            PageParams::default(),
        );

        assert_eq!(
            result.unwrap_err(),
            ListingError::UnknownSortField("password".to_string())
        );
    }

    #[test]
    fn unknown_sort_direction_defaults_to_ascending() {
        let listing = listing(None, Some("title"), Some("sideways"));
        assert_eq!(
            listing.sort,
            Some((SortField::Title, SortDirection::Ascending))
        );
    }

    #[test]
    fn page_and_limit_are_clamped() {
        assert_eq!(PageParams::new(None, None).page(), 1);
        assert_eq!(PageParams::new(None, None).limit(), 10);
        assert_eq!(PageParams::new(Some(0), Some(-3)).page(), 1);
        assert_eq!(PageParams::new(Some(0), Some(-3)).limit(), 10);
        assert_eq!(PageParams::new(Some(3), Some(20)).offset(), 40);
    }

    #[test]
    fn total_pages_rounds_up() {
        let params = PageParams::new(Some(1), Some(10));
        let page = Paginated::new(Vec::<i32>::new(), &params, 31);
        assert_eq!(page.total_pages(), 4);
    }

    #[test]
    fn like_wildcards_are_escaped() {
        assert_eq!(escape_like("100%_cat\\"), "100\\%\\_cat\\\\");
    }
}
