#![allow(clippy::unwrap_used, clippy::expect_used)]
//! Group facet provider integration tests.
//!
//! Runs the real provider against the in-memory catalogue from the test
//! utilities crate.

use std::sync::Arc;

use geonode_facets::FacetError;
use geonode_facets::facets::{
    FacetItem, FacetKey, FacetProvider, FacetRegistry, FacetRequest, FacetType,
    GroupFacetProvider, ResourceQuery,
};
use geonode_facets::models::UserContext;
use geonode_facets_test_utils::{MemoryCatalogue, matches_query, test_group, test_resource};

const MEMBER: i64 = 10;
const OUTSIDER: i64 = 11;

/// Groups 1, 2 and 4 are public, 3 is private with one member. Group 4
/// has no resources; resources 10 and 11 have no group.
fn catalogue() -> Arc<MemoryCatalogue> {
    Arc::new(
        MemoryCatalogue::new()
            .with_group(test_group(1, "Hydrology"))
            .with_group(test_group(2, "Transport"))
            .with_group(test_group(3, "Secret Ops").private().with_member(MEMBER))
            .with_group(test_group(4, "Empty Group"))
            .with_resource(test_resource(1, "Rivers").in_group(1))
            .with_resource(test_resource(2, "Lakes").in_group(1))
            .with_resource(test_resource(3, "Flood map").in_group(1).of_type("map"))
            .with_resource(test_resource(4, "Roads").in_group(2))
            .with_resource(test_resource(5, "Rail").in_group(2).of_type("map"))
            .with_resource(test_resource(6, "Op A").in_group(3))
            .with_resource(test_resource(7, "Op B").in_group(3))
            .with_resource(test_resource(8, "Op C").in_group(3))
            .with_resource(test_resource(9, "Op D").in_group(3))
            .with_resource(test_resource(10, "Orphan"))
            .with_resource(test_resource(11, "Orphan map").of_type("map"))
            .with_resource(test_resource(12, "Draft wells").in_group(1).unpublished()),
    )
}

fn provider(catalogue: &Arc<MemoryCatalogue>) -> GroupFacetProvider {
    GroupFacetProvider::new(catalogue.clone(), catalogue.clone())
}

fn item(key: i64, label: &str, count: u64) -> FacetItem {
    FacetItem {
        key: FacetKey::Int(key),
        label: label.to_string(),
        count,
    }
}

#[test]
fn info_is_fixed_for_every_language() {
    let catalogue = catalogue();
    let provider = provider(&catalogue);

    assert_eq!(provider.name(), "group");
    for lang in ["en", "it", "fr", ""] {
        let info = provider.get_info(lang);
        assert_eq!(info.name, "group");
        assert_eq!(info.filter, "filter{group.in}");
        assert_eq!(info.label, "Group");
        assert_eq!(info.facet_type, FacetType::Category);
    }
}

#[tokio::test]
async fn missing_user_is_an_error() {
    let catalogue = catalogue();
    let provider = provider(&catalogue);

    let err = provider
        .get_facet_items(&ResourceQuery::all(), &FacetRequest::default())
        .await
        .unwrap_err();

    assert!(matches!(err, FacetError::MissingUser));
    assert_eq!(catalogue.count_queries(), 0);
    assert_eq!(catalogue.page_queries(), 0);
}

#[tokio::test]
async fn counts_visible_groups_for_anonymous() {
    let catalogue = catalogue();
    let provider = provider(&catalogue);

    let page = provider
        .get_facet_items(
            &ResourceQuery::all(),
            &FacetRequest::for_user(UserContext::anonymous()),
        )
        .await
        .unwrap();

    // Private group 3 is hidden; empty group 4 has nothing to count.
    assert_eq!(page.count, 2);
    assert_eq!(
        page.items,
        vec![item(1, "Hydrology", 4), item(2, "Transport", 2)]
    );
}

#[tokio::test]
async fn members_see_their_private_groups() {
    let catalogue = catalogue();
    let provider = provider(&catalogue);

    let member = provider
        .get_facet_items(
            &ResourceQuery::all(),
            &FacetRequest::for_user(UserContext::authenticated(MEMBER)),
        )
        .await
        .unwrap();
    assert_eq!(member.count, 3);
    // Ties on count are broken by group id.
    assert_eq!(
        member.items,
        vec![
            item(1, "Hydrology", 4),
            item(3, "Secret Ops", 4),
            item(2, "Transport", 2),
        ]
    );

    let outsider = provider
        .get_facet_items(
            &ResourceQuery::all(),
            &FacetRequest::for_user(UserContext::authenticated(OUTSIDER)),
        )
        .await
        .unwrap();
    assert_eq!(outsider.count, 2);
    assert!(outsider.items.iter().all(|i| i.key != FacetKey::Int(3)));

    let admin = provider
        .get_facet_items(
            &ResourceQuery::all(),
            &FacetRequest::for_user(UserContext::superuser(1)),
        )
        .await
        .unwrap();
    assert_eq!(admin.count, 3);
}

#[tokio::test]
async fn page_never_exceeds_requested_size() {
    let catalogue = catalogue();
    let provider = provider(&catalogue);
    let user = UserContext::superuser(1);

    for n in 0..5 {
        let page = provider
            .get_facet_items(
                &ResourceQuery::all(),
                &FacetRequest::for_user(user.clone()).with_range(0, n),
            )
            .await
            .unwrap();
        assert!(page.items.len() as u64 <= n, "n={n}: {:?}", page.items);
        assert_eq!(page.count, 3, "count ignores the window");
    }
}

#[tokio::test]
async fn full_traversal_counts_every_visible_resource() {
    let catalogue = catalogue();
    let provider = provider(&catalogue);
    let base = ResourceQuery::all().published(true);

    for user in [
        UserContext::anonymous(),
        UserContext::authenticated(MEMBER),
        UserContext::superuser(1),
    ] {
        let mut total = 0;
        let mut seen = Vec::new();
        let mut start = 0;
        loop {
            let page = provider
                .get_facet_items(
                    &base,
                    &FacetRequest::for_user(user.clone()).with_range(start, start + 1),
                )
                .await
                .unwrap();
            if page.items.is_empty() {
                assert_eq!(seen.len() as u64, page.count);
                break;
            }
            for i in page.items {
                total += i.count;
                seen.push(i.key);
            }
            start += 1;
        }

        let visible: Vec<i64> = if user.id.is_none() {
            vec![1, 2, 4]
        } else {
            vec![1, 2, 3, 4]
        };
        let expected = catalogue
            .resources()
            .iter()
            .filter(|r| matches_query(&base, r))
            .filter(|r| r.group_id.is_some_and(|g| visible.contains(&g)))
            .count() as u64;

        assert_eq!(total, expected, "user {:?}", user.id);
    }
}

#[tokio::test]
async fn base_query_narrows_counts() {
    let catalogue = catalogue();
    let provider = provider(&catalogue);

    let page = provider
        .get_facet_items(
            &ResourceQuery::all().resource_types(["map"]),
            &FacetRequest::for_user(UserContext::anonymous()),
        )
        .await
        .unwrap();

    assert_eq!(page.count, 2);
    assert_eq!(
        page.items,
        vec![item(1, "Hydrology", 1), item(2, "Transport", 1)]
    );
}

#[tokio::test]
async fn topic_contains_filters_group_names() {
    let catalogue = catalogue();
    let provider = provider(&catalogue);

    let request = FacetRequest {
        topic_contains: Some("HYDRO".to_string()),
        ..FacetRequest::for_user(UserContext::anonymous())
    };
    let page = provider
        .get_facet_items(&ResourceQuery::all(), &request)
        .await
        .unwrap();

    assert_eq!(page.count, 1);
    assert_eq!(page.items, vec![item(1, "Hydrology", 4)]);
}

#[tokio::test]
async fn keys_restrict_groups() {
    let catalogue = catalogue();
    let provider = provider(&catalogue);

    let request = FacetRequest {
        keys: vec![FacetKey::Int(2), FacetKey::from("3")],
        ..FacetRequest::for_user(UserContext::anonymous())
    };
    let page = provider
        .get_facet_items(&ResourceQuery::all(), &request)
        .await
        .unwrap();

    // Key 3 is private and stays hidden even when asked for.
    assert_eq!(page.count, 1);
    assert_eq!(page.items, vec![item(2, "Transport", 2)]);
}

#[tokio::test]
async fn non_numeric_keys_are_rejected() {
    let catalogue = catalogue();
    let provider = provider(&catalogue);

    let request = FacetRequest {
        keys: vec![FacetKey::from("hydrology")],
        ..FacetRequest::for_user(UserContext::anonymous())
    };
    let err = provider
        .get_facet_items(&ResourceQuery::all(), &request)
        .await
        .unwrap_err();

    assert!(matches!(err, FacetError::InvalidKey { ref key, .. } if key == "hydrology"));
}

#[tokio::test]
async fn inverted_range_is_rejected() {
    let catalogue = catalogue();
    let provider = provider(&catalogue);

    let err = provider
        .get_facet_items(
            &ResourceQuery::all(),
            &FacetRequest::for_user(UserContext::anonymous()).with_range(5, 2),
        )
        .await
        .unwrap_err();

    assert!(matches!(err, FacetError::InvalidPage { start: 5, end: 2 }));
}

#[tokio::test]
async fn count_and_page_run_as_separate_queries() {
    let catalogue = catalogue();
    let provider = provider(&catalogue);

    provider
        .get_facet_items(
            &ResourceQuery::all(),
            &FacetRequest::for_user(UserContext::anonymous()),
        )
        .await
        .unwrap();
    assert_eq!(catalogue.count_queries(), 1);
    assert_eq!(catalogue.page_queries(), 1);

    // A window past the last facet value only needs the count.
    let page = provider
        .get_facet_items(
            &ResourceQuery::all(),
            &FacetRequest::for_user(UserContext::anonymous()).with_range(10, 20),
        )
        .await
        .unwrap();
    assert_eq!(page.count, 2);
    assert!(page.items.is_empty());
    assert_eq!(catalogue.count_queries(), 2);
    assert_eq!(catalogue.page_queries(), 1);
}

#[tokio::test]
async fn topics_resolve_visible_keys() {
    let catalogue = catalogue();
    let provider = provider(&catalogue);

    let keys = vec![FacetKey::Int(2), FacetKey::Int(1), FacetKey::Int(3), FacetKey::Int(99)];

    let anon = provider
        .get_topics(&keys, "en", Some(&UserContext::anonymous()))
        .await
        .unwrap();
    let labels: Vec<&str> = anon.iter().map(|t| t.label.as_str()).collect();
    assert_eq!(labels, vec!["Hydrology", "Transport"]);
    assert_eq!(anon[0].key, FacetKey::Int(1));

    let member = provider
        .get_topics(&keys, "en", Some(&UserContext::authenticated(MEMBER)))
        .await
        .unwrap();
    let labels: Vec<&str> = member.iter().map(|t| t.label.as_str()).collect();
    assert_eq!(labels, vec!["Hydrology", "Secret Ops", "Transport"]);
}

#[tokio::test]
async fn topics_need_a_user() {
    let catalogue = catalogue();
    let provider = provider(&catalogue);

    let err = provider
        .get_topics(&[FacetKey::Int(1)], "en", None)
        .await
        .unwrap_err();
    assert!(matches!(err, FacetError::MissingUser));

    let empty = provider
        .get_topics(&[], "en", Some(&UserContext::anonymous()))
        .await
        .unwrap();
    assert!(empty.is_empty());
}

#[test]
fn register_adds_one_provider_per_call() {
    let catalogue = catalogue();
    let mut registry = FacetRegistry::new();

    let registered =
        GroupFacetProvider::register(&mut registry, catalogue.clone(), catalogue.clone(), false);
    assert_eq!(registry.len(), 1);
    assert_eq!(registered.name(), "group");

    let provider = registry.get_provider("group").unwrap();
    assert_eq!(provider.get_info("en").filter, "filter{group.in}");

    // Registering again replaces the existing "group" entry.
    GroupFacetProvider::register(&mut registry, catalogue.clone(), catalogue, true);
    assert_eq!(registry.len(), 1);
}
