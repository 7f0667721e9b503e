mod models;
pub mod query;

pub use models::{
    Comment, CommentCriteria, CommentRelationships, NewComment, ResourceType, UnknownVariant,
    User, Vote, VoteType, Voter,
};
pub use query::{
    FilterMap, FilterValue, ListParams, OrderBy, OrderSpec, Paginated, Pagination, PaginationMeta,
};
