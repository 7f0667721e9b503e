// 列表查询参数解析：排序、过滤条件与分页。
// 不在白名单内的字段直接丢弃，无效的值回落到默认值，不会返回错误。

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashSet};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Direction {
    Asc,
    Desc,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderBy {
    pub field: String,
    pub direction: Direction,
}

impl OrderBy {
    pub fn asc(field: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            direction: Direction::Asc,
        }
    }

    pub fn desc(field: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            direction: Direction::Desc,
        }
    }
}

pub type OrderSpec = Vec<OrderBy>;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FilterValue {
    Bool(bool),
    Int(i64),
    Text(String),
}

impl FilterValue {
    // 查询串里的值都是文本，"5" 也算 5
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            FilterValue::Int(v) => Some(*v),
            FilterValue::Text(s) => s.trim().parse().ok(),
            FilterValue::Bool(_) => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            FilterValue::Bool(v) => Some(*v),
            FilterValue::Int(v) => Some(*v != 0),
            FilterValue::Text(s) => match s.trim() {
                "1" | "true" => Some(true),
                "0" | "false" => Some(false),
                _ => None,
            },
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            FilterValue::Text(s) => Some(s.as_str()),
            _ => None,
        }
    }
}

impl fmt::Display for FilterValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FilterValue::Bool(v) => write!(f, "{}", v),
            FilterValue::Int(v) => write!(f, "{}", v),
            FilterValue::Text(s) => f.write_str(s),
        }
    }
}

impl From<bool> for FilterValue {
    fn from(v: bool) -> Self {
        FilterValue::Bool(v)
    }
}

impl From<i64> for FilterValue {
    fn from(v: i64) -> Self {
        FilterValue::Int(v)
    }
}

impl From<String> for FilterValue {
    fn from(v: String) -> Self {
        FilterValue::Text(v)
    }
}

impl From<&str> for FilterValue {
    fn from(v: &str) -> Self {
        FilterValue::Text(v.to_string())
    }
}

impl From<&String> for FilterValue {
    fn from(v: &String) -> Self {
        FilterValue::Text(v.clone())
    }
}

pub type FilterMap = BTreeMap<String, FilterValue>;

// 允许排序、过滤的字段白名单
#[derive(Debug, Clone, Copy)]
pub struct ResourceFields {
    pub order: &'static [&'static str],
    pub filter: &'static [&'static str],
}

pub const COMMENT_FIELDS: ResourceFields = ResourceFields {
    order: &["created_at", "updated_at", "deleted_at", "vote_count"],
    filter: &["comment_id", "user_id", "resource_type", "resource_id"],
};

/// `order=field` 表示 field ASC，`order=-field` 表示 field DESC。
/// 字段不在白名单内时原样返回 `default`。
pub fn resolve_order(raw: Option<&str>, allowed: &[&str], default: OrderSpec) -> OrderSpec {
    let raw = match raw.map(str::trim) {
        Some(s) if !s.is_empty() => s,
        _ => return default,
    };

    let order = match raw.strip_prefix('-') {
        Some(field) => OrderBy::desc(field),
        None => OrderBy::asc(raw),
    };

    if allowed.contains(&order.field.as_str()) {
        vec![order]
    } else {
        default
    }
}

// 与默认条件同名的键会覆盖默认条件
pub fn resolve_filter<I, K, V>(raw: I, allowed: &[&str], default: FilterMap) -> FilterMap
where
    I: IntoIterator<Item = (K, V)>,
    K: AsRef<str>,
    V: Into<FilterValue>,
{
    let mut result = default;
    for (key, value) in raw {
        let key = key.as_ref();
        if allowed.contains(&key) {
            result.insert(key.to_string(), value.into());
        }
    }
    result
}

// "1,2,3" -> [1, 2, 3]，跳过无效值和重复值，最多保留 limit 个
pub fn parse_id_list(raw: Option<&str>, limit: usize) -> Vec<i64> {
    let mut seen = HashSet::new();
    raw.unwrap_or_default()
        .split(',')
        .filter_map(|s| s.trim().parse::<i64>().ok())
        .filter(|id| seen.insert(*id))
        .take(limit)
        .collect()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pagination {
    pub page: u32,
    pub per_page: u32,
}

impl Pagination {
    pub fn bounded(page: Option<u32>, per_page: Option<u32>, default: u32, max: u32) -> Self {
        let max = max.max(1);
        Self {
            page: page.filter(|p| *p > 0).unwrap_or(1),
            per_page: per_page.filter(|p| *p > 0).unwrap_or(default).clamp(1, max),
        }
    }

    pub fn limit(&self) -> i64 {
        i64::from(self.per_page)
    }

    pub fn offset(&self) -> i64 {
        i64::from(self.page - 1) * i64::from(self.per_page)
    }

    pub fn meta(&self, total: i64) -> PaginationMeta {
        let per_page = i64::from(self.per_page);
        let pages = (total + per_page - 1) / per_page;
        let page = i64::from(self.page);
        PaginationMeta {
            page: self.page,
            per_page: self.per_page,
            total,
            pages,
            previous: (page > 1).then(|| page - 1),
            next: (page < pages).then(|| page + 1),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaginationMeta {
    pub page: u32,
    pub per_page: u32,
    pub total: i64,
    pub pages: i64,
    pub previous: Option<i64>,
    pub next: Option<i64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Paginated<T> {
    pub data: Vec<T>,
    pub pagination: PaginationMeta,
}

#[derive(Debug, Clone, Default)]
pub struct ListParams {
    pub page: Option<u32>,
    pub per_page: Option<u32>,
    pub order: Option<String>,
    pub filters: Vec<(String, String)>,
}

impl ListParams {
    pub fn from_query<I>(query: I) -> Self
    where
        I: IntoIterator<Item = (String, String)>,
    {
        let mut params = ListParams::default();
        for (key, value) in query {
            match key.as_str() {
                "page" => params.page = value.trim().parse().ok(),
                "per_page" => params.per_page = value.trim().parse().ok(),
                "order" => params.order = Some(value),
                _ => params.filters.push((key, value)),
            }
        }
        params
    }

    pub fn pagination(&self, default: u32, max: u32) -> Pagination {
        Pagination::bounded(self.page, self.per_page, default, max)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ALLOWED: &[&str] = &["created_at", "vote_count"];

    #[test]
    fn descending_prefix_is_parsed() {
        let order = resolve_order(Some("-created_at"), ALLOWED, vec![]);
        assert_eq!(order, vec![OrderBy::desc("created_at")]);

        let order = resolve_order(Some("vote_count"), ALLOWED, vec![]);
        assert_eq!(order, vec![OrderBy::asc("vote_count")]);
    }

    #[test]
    fn unknown_or_missing_order_falls_back_to_default() {
        let default = vec![OrderBy::desc("created_at"), OrderBy::asc("vote_count")];

        let cases = [
            None,
            Some(""),
            Some("-"),
            Some("password"),
            Some("-user_id"),
        ];
        for raw in cases {
            assert_eq!(resolve_order(raw, ALLOWED, default.clone()), default);
        }
    }

    #[test]
    fn filter_drops_unlisted_keys_and_keeps_defaults() {
        let mut default = FilterMap::new();
        default.insert("is_deleted".into(), false.into());

        let raw = vec![
            ("user_id", FilterValue::Int(5)),
            ("foo", FilterValue::Int(1)),
        ];
        let result = resolve_filter(raw, &["user_id"], default);

        let mut expected = FilterMap::new();
        expected.insert("is_deleted".into(), FilterValue::Bool(false));
        expected.insert("user_id".into(), FilterValue::Int(5));
        assert_eq!(result, expected);
    }

    #[test]
    fn query_filter_overrides_default() {
        let mut default = FilterMap::new();
        default.insert("user_id".into(), 1i64.into());

        let raw = vec![("user_id".to_string(), "7".to_string())];
        let result = resolve_filter(raw, COMMENT_FIELDS.filter, default);

        assert_eq!(result.get("user_id").and_then(FilterValue::as_i64), Some(7));
    }

    #[test]
    fn id_list_is_deduplicated_and_capped() {
        assert_eq!(parse_id_list(Some("3, 1,x,3,,2"), 100), vec![3, 1, 2]);
        assert_eq!(parse_id_list(Some("1,2,3,4"), 2), vec![1, 2]);
        assert!(parse_id_list(None, 100).is_empty());
    }

    #[test]
    fn pagination_is_bounded() {
        let p = Pagination::bounded(Some(0), Some(500), 15, 100);
        assert_eq!((p.page, p.per_page), (1, 100));

        let p = Pagination::bounded(None, None, 15, 100);
        assert_eq!((p.page, p.per_page), (1, 15));

        let p = Pagination::bounded(Some(3), Some(10), 15, 100);
        assert_eq!(p.offset(), 20);
    }

    #[test]
    fn pagination_meta_links() {
        let meta = Pagination::bounded(Some(2), Some(10), 15, 100).meta(25);
        assert_eq!(meta.pages, 3);
        assert_eq!(meta.previous, Some(1));
        assert_eq!(meta.next, Some(3));

        let meta = Pagination::bounded(Some(1), Some(10), 15, 100).meta(0);
        assert_eq!(meta.pages, 0);
        assert_eq!(meta.previous, None);
        assert_eq!(meta.next, None);
    }

    #[test]
    fn list_params_split_reserved_keys() {
        let query = vec![
            ("page".to_string(), "2".to_string()),
            ("order".to_string(), "-vote_count".to_string()),
            ("user_id".to_string(), "4".to_string()),
        ];
        let params = ListParams::from_query(query);
        assert_eq!(params.page, Some(2));
        assert_eq!(params.order.as_deref(), Some("-vote_count"));
        let expected = vec![("user_id".to_string(), "4".to_string())];
        assert_eq!(params.filters, expected);
    }
}
