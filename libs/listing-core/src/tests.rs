use serde_json::{json, Value};

use crate::{
    Error, ErrorKind, ExtraContext, FieldSet, FilterSpec, FilterValue, JsonParamsAdapter, Page,
    PageRequest, PaginationRequest, ParamsAdapter, RequestParams, SortSpec, SortType,
};

fn adapter(pairs: &[(&str, &str)]) -> JsonParamsAdapter {
    JsonParamsAdapter::new(pairs.iter().copied().collect())
}

#[test]
fn absent_params_decode_to_empty() {
    let a = adapter(&[]);
    assert!(a.filters().unwrap().is_empty());
    assert!(a.sorts().unwrap().is_empty());
    assert!(a.pagination().unwrap().is_none());
}

#[test]
fn blank_param_is_treated_as_absent() {
    let a = adapter(&[("filter", "  "), ("pagination", "")]);
    assert!(a.filters().unwrap().is_empty());
    assert!(a.pagination().unwrap().is_none());
}

#[test]
fn filters_decode_search_range_and_list_payloads() {
    let a = adapter(&[(
        "filter",
        r#"[{"field":"gdr","value":{"search":"M"}},
            {"field":"hd","value":{"start":1,"end":2}},
            {"field":"emp","value":{"list":[1,2,3]}},
            {"field":"grp"}]"#,
    )]);
    let filters = a.filters().unwrap();
    assert_eq!(filters.len(), 4);
    assert_eq!(filters[0], FilterSpec::new("gdr", FilterValue::search("M")));
    assert_eq!(filters[1].value, Some(FilterValue::range(1, 2)));
    assert_eq!(filters[2].value, Some(FilterValue::list([1, 2, 3])));
    assert_eq!(filters[3].value, None);
}

#[test]
fn percent_encoded_params_are_unquoted() {
    let a = adapter(&[(
        "sort",
        "%5B%7B%22field%22%3A%22id%22%2C%22type%22%3A%22asc%22%7D%5D",
    )]);
    assert_eq!(a.sorts().unwrap(), vec![SortSpec::new("id", SortType::Asc)]);
}

#[test]
fn malformed_filter_json_is_a_client_error() {
    let err = adapter(&[("filter", "[{")]).filters().unwrap_err();
    assert_eq!(err.to_string(), "filter param is not a valid json!");
    assert_eq!(err.kind(), ErrorKind::Client);
    assert_eq!(err.status(), 422);
}

#[test]
fn wrong_shape_is_reported_against_the_param() {
    let err = adapter(&[("sort", r#"{"field":"id"}"#)]).sorts().unwrap_err();
    assert!(matches!(err, Error::InvalidParamJson { param: "sort", .. }));
}

#[test]
fn sort_type_is_kept_raw() {
    let a = adapter(&[("sort", r#"[{"field":"id","type":"bogus"}]"#)]);
    let sorts = a.sorts().unwrap();
    assert_eq!(sorts[0].sort_type, "bogus");
    assert_eq!(SortType::parse(&sorts[0].sort_type), None);
    assert_eq!(SortType::parse("dsc"), Some(SortType::Dsc));
}

#[test]
fn pagination_validates_positive_integers() {
    let p = PaginationRequest::from_json(&json!({"page": 3, "pageSize": 25}));
    assert_eq!(
        p.validate(),
        PageRequest {
            page: 3,
            page_size: 25
        }
    );

    let p = PaginationRequest::from_json(&json!({"page": 2.0, "pageSize": 5.0}));
    assert_eq!(
        p.validate(),
        PageRequest {
            page: 2,
            page_size: 5
        }
    );
}

#[test]
fn invalid_pagination_falls_back() {
    for raw in [
        json!({"page": 0, "pageSize": -1}),
        json!({"page": "x", "pageSize": 10}),
        json!({"page": 1.5, "pageSize": 10}),
        json!({"page": 1}),
        json!([1, 2]),
    ] {
        assert_eq!(
            PaginationRequest::from_json(&raw).validate(),
            PageRequest::FALLBACK,
            "{raw}"
        );
    }
}

#[test]
fn pagination_beyond_signed_range_falls_back() {
    for raw in [
        json!({"page": 18446744073709551615u64, "pageSize": 5}),
        json!({"page": 1, "pageSize": 9223372036854775808u64}),
        json!({"page": 1e19, "pageSize": 5}),
    ] {
        assert_eq!(
            PaginationRequest::from_json(&raw).validate(),
            PageRequest::FALLBACK,
            "{raw}"
        );
    }

    let p = PaginationRequest::from_json(&json!({"page": 9223372036854775807u64, "pageSize": 1}));
    assert_eq!(p.validate().page, i64::MAX as u64);
}

#[test]
fn offset_saturates_at_signed_max() {
    let page = PageRequest {
        page: i64::MAX as u64,
        page_size: i64::MAX as u64,
    };
    assert_eq!(page.offset(), i64::MAX as u64);
}

#[test]
fn explicit_null_search_is_kept() {
    let filters = adapter(&[("filter", r#"[{"field":"gdr","value":{"search":null}}]"#)])
        .filters()
        .unwrap();
    assert_eq!(filters[0].value, Some(FilterValue::search(Value::Null)));

    let filters = adapter(&[("filter", r#"[{"field":"gdr","value":{}}]"#)])
        .filters()
        .unwrap();
    assert_eq!(filters[0].value, Some(FilterValue::default()));
    assert!(filters[0].value.as_ref().is_some_and(FilterValue::is_empty));
}

#[test]
fn clamp_only_touches_valid_oversized_page_sizes() {
    let mut p = PaginationRequest::new(1, 500);
    assert_eq!(p.clamp_page_size(50), Some(500));
    assert_eq!(p.validate().page_size, 50);

    let mut p = PaginationRequest::new(1, 20);
    assert_eq!(p.clamp_page_size(50), None);
    assert_eq!(p.validate().page_size, 20);

    let mut p = PaginationRequest::from_json(&json!({"page": 1, "pageSize": "big"}));
    assert_eq!(p.clamp_page_size(50), None);
}

#[test]
fn page_offset_is_zero_based() {
    assert_eq!(PageRequest::FALLBACK.offset(), 0);
    assert_eq!(
        PageRequest {
            page: 3,
            page_size: 10
        }
        .offset(),
        20
    );
}

#[test]
fn field_set_renders_sorted_quoted_aliases() {
    let set: FieldSet = ["zzz", "aaa"].into_iter().collect();
    assert_eq!(set.to_string(), "{'aaa', 'zzz'}");

    let err = Error::FiltersNotRegistered(["zzz"].into_iter().collect());
    assert_eq!(
        err.to_string(),
        "Filter(s) not registered with listing: {'zzz'}, Did you forget to do it?"
    );
    assert_eq!(err.status(), 409);
}

#[test]
fn error_kinds_classify_defects() {
    assert_eq!(
        Error::InvalidSortType("bogus".into()).kind(),
        ErrorKind::Contract
    );
    assert_eq!(Error::EmptyQuery.status(), 500);
    assert_eq!(
        Error::not_registered("query strategy", "nope").kind(),
        ErrorKind::Config
    );
    assert!(!Error::database("boom").is_client_error());
}

#[test]
fn extra_context_output_fields() {
    let mut ctx = ExtraContext::new().with("tenant", "acme");
    ctx.set_output_fields(&["id".to_owned(), "name".to_owned()], true);
    assert_eq!(ctx.field_list(), vec!["id", "name"]);
    assert!(ctx.custom_fields());
    assert!(!ctx.flag("tenant"));
    assert_eq!(ctx.get("tenant"), Some(&json!("acme")));
}

#[test]
fn page_omits_total_count_when_countless() {
    let page = Page::countless(vec![1, 2], 1, 2, true);
    let v = serde_json::to_value(&page).unwrap();
    assert_eq!(
        v,
        json!({"data": [1, 2], "currentPageNumber": 1, "currentPageSize": 2, "hasNext": true})
    );

    let page = Page::counted(vec![1], 2, 1, false, 2);
    let v = serde_json::to_value(&page).unwrap();
    assert_eq!(v["totalCount"], json!(2));
}

#[test]
fn page_try_map_items_preserves_envelope() {
    let page = Page::counted(vec!["1", "2"], 1, 2, true, 9);
    let mapped = page.try_map_items(|s| s.parse::<u32>()).unwrap();
    assert_eq!(mapped.data, vec![1, 2]);
    assert_eq!(mapped.total_count, Some(9));

    let bad = Page::countless(vec!["x"], 1, 1, false).try_map_items(|s| s.parse::<u32>());
    assert!(bad.is_err());
}

#[test]
fn request_params_collects_pairs() {
    let params: RequestParams = [("filter", "[]")].into_iter().collect();
    assert_eq!(params.get("filter"), Some("[]"));
    assert_eq!(params.get("sort"), None);
}
