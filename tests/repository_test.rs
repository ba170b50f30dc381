mod common;

use artfolio::domain::catalog::{ArtworkFilter, CatalogOrder, CatalogQuery};
use artfolio::domain::pagination::PageRequest;
use artfolio::domain::size::SizeBucket;
use artfolio::domain::{DomainError, ImageUpdate, NewImage, PostListQuery};
use artfolio::models::{ArtworkStatus, PostStatus};
use common::{artwork, collection, post, setup};

fn query(filter: ArtworkFilter) -> CatalogQuery {
    CatalogQuery {
        text: None,
        filter,
        order: CatalogOrder::TitleAsc,
        page: PageRequest::new(1000, None),
    }
}

fn image(path: &str, order: i32, is_primary: bool) -> NewImage {
    NewImage {
        path: path.to_string(),
        order,
        is_primary,
    }
}

#[tokio::test]
async fn test_slug_collisions_get_numeric_suffix() {
    let app = setup().await;
    let repo = &app.state.artwork_repo;

    let first = repo.create(artwork("Sunset", 30, 30)).await.unwrap();
    let second = repo.create(artwork("Sunset", 30, 30)).await.unwrap();
    let third = repo.create(artwork("Sunset!", 30, 30)).await.unwrap();

    assert_eq!(first.card.slug, "sunset");
    assert_eq!(second.card.slug, "sunset-1");
    assert_eq!(third.card.slug, "sunset-2");
}

#[tokio::test]
async fn test_slug_transliterates_and_falls_back() {
    let app = setup().await;
    let repo = &app.state.artwork_repo;

    let cyrillic = repo.create(artwork("Спящий дракон", 30, 30)).await.unwrap();
    assert!(cyrillic.card.slug.is_ascii());
    assert!(cyrillic.card.slug.ends_with("-drakon"), "{}", cyrillic.card.slug);

    let punctuation = repo.create(artwork("!!!", 30, 30)).await.unwrap();
    assert_eq!(punctuation.card.slug, "artwork");
}

#[tokio::test]
async fn test_slug_is_stable_and_explicit_collision_conflicts() {
    let app = setup().await;
    let repo = &app.state.artwork_repo;

    let a = repo.create(artwork("Sunset", 30, 30)).await.unwrap();
    let b = repo.create(artwork("Dawn", 30, 30)).await.unwrap();

    // renaming keeps the slug
    let renamed = repo.update(a.card.id, artwork("Evening", 30, 30)).await.unwrap();
    assert_eq!(renamed.card.slug, "sunset");

    let mut taken = artwork("Dawn", 30, 30);
    taken.slug = Some("sunset".into());
    let err = repo.update(b.card.id, taken).await.unwrap_err();
    assert!(matches!(err, DomainError::Conflict(_)));
}

#[tokio::test]
async fn test_invalid_artwork_is_rejected() {
    let app = setup().await;
    let repo = &app.state.artwork_repo;

    for (w, h, year) in [(0, 10, 2024), (10, 501, 2024), (10, 10, 1899), (10, 10, 2201)] {
        let mut input = artwork("Bad", w, h);
        input.created_year = year;
        assert!(matches!(
            repo.create(input).await.unwrap_err(),
            DomainError::Validation(_)
        ));
    }

    let mut negative = artwork("Bad", 10, 10);
    negative.price = Some(-1);
    assert!(matches!(
        repo.create(negative).await.unwrap_err(),
        DomainError::Validation(_)
    ));
}

#[tokio::test]
async fn test_primary_image_invariant() {
    let app = setup().await;
    let repo = &app.state.artwork_repo;
    let id = repo.create(artwork("Pictured", 30, 30)).await.unwrap().card.id;

    let first = repo.add_image(id, image("a.jpg", 0, false)).await.unwrap();
    assert!(first.is_primary, "first image becomes primary");

    let second = repo.add_image(id, image("b.jpg", 1, false)).await.unwrap();
    assert!(!second.is_primary);

    let third = repo.add_image(id, image("c.jpg", 2, true)).await.unwrap();
    assert!(third.is_primary);
    let primaries: Vec<_> = repo
        .images(id)
        .await
        .unwrap()
        .into_iter()
        .filter(|i| i.is_primary)
        .collect();
    assert_eq!(primaries.len(), 1);
    assert_eq!(primaries[0].id, third.id);

    // clearing the flag on the current primary is ignored
    let kept = repo
        .update_image(
            third.id,
            ImageUpdate {
                order: Some(5),
                is_primary: Some(false),
            },
        )
        .await
        .unwrap();
    assert!(kept.is_primary);
    assert_eq!(kept.order, 5);

    // promoting another image moves the flag
    repo.update_image(
        first.id,
        ImageUpdate {
            order: None,
            is_primary: Some(true),
        },
    )
    .await
    .unwrap();
    let detail = repo.find_by_id(id).await.unwrap().unwrap();
    assert_eq!(detail.card.primary_image.unwrap().id, first.id);

    // deleting the primary promotes the next by (order, id)
    let path = repo.delete_image(first.id).await.unwrap();
    assert_eq!(path, "a.jpg");
    let images = repo.images(id).await.unwrap();
    assert_eq!(images.iter().filter(|i| i.is_primary).count(), 1);
    assert!(images.iter().find(|i| i.id == second.id).unwrap().is_primary);
}

#[tokio::test]
async fn test_deleting_artwork_returns_image_paths() {
    let app = setup().await;
    let repo = &app.state.artwork_repo;
    let id = repo.create(artwork("Pictured", 30, 30)).await.unwrap().card.id;
    repo.add_image(id, image("a.jpg", 0, false)).await.unwrap();
    repo.add_image(id, image("b.jpg", 1, false)).await.unwrap();

    let mut paths = repo.delete(id).await.unwrap();
    paths.sort();
    assert_eq!(paths, vec!["a.jpg".to_string(), "b.jpg".to_string()]);
    assert!(repo.find_by_id(id).await.unwrap().is_none());
    assert!(repo.images(id).await.unwrap().is_empty());
}

#[tokio::test]
async fn test_deleting_category_keeps_artworks() {
    let app = setup().await;
    let taxonomy = &app.state.taxonomy_repo;
    let repo = &app.state.artwork_repo;

    let oil = taxonomy.create_category("Масло".into()).await.unwrap();
    let mut input = artwork("Oil work", 30, 30);
    input.category_id = Some(oil.id);
    let created = repo.create(input).await.unwrap();
    assert_eq!(created.card.category.as_ref().unwrap().name, "Масло");

    taxonomy.delete_category(oil.id).await.unwrap();

    let reloaded = repo.find_by_id(created.card.id).await.unwrap().unwrap();
    assert!(reloaded.card.category.is_none());
    assert!(taxonomy.list_categories().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_deleting_collection_detaches_artworks() {
    let app = setup().await;
    let collections = &app.state.collection_repo;
    let repo = &app.state.artwork_repo;

    let dragons = collections.create(collection("Драконы")).await.unwrap();
    let mut input = artwork("Dragon", 30, 30);
    input.collection_id = Some(dragons.id);
    let created = repo.create(input).await.unwrap();

    collections.delete(dragons.id).await.unwrap();
    let reloaded = repo.find_by_id(created.card.id).await.unwrap().unwrap();
    assert!(reloaded.card.collection.is_none());
}

#[tokio::test]
async fn test_size_filter_agrees_with_classifier() {
    let app = setup().await;
    let repo = &app.state.artwork_repo;

    let edges = [1, 24, 25, 26, 39, 40, 41, 59, 60, 61, 100, 500];
    for w in edges {
        for h in edges {
            repo.create(artwork(&format!("w{} h{}", w, h), w, h)).await.unwrap();
        }
    }

    let mut seen = 0;
    for bucket in SizeBucket::ALL {
        let result = repo
            .catalog(&query(ArtworkFilter {
                sizes: vec![bucket],
                ..Default::default()
            }))
            .await
            .unwrap();

        let expected = edges
            .iter()
            .flat_map(|w| edges.iter().map(move |h| (*w, *h)))
            .filter(|(w, h)| SizeBucket::classify(*w, *h) == bucket)
            .count() as u64;
        assert_eq!(result.filtered_count, expected, "bucket {:?}", bucket);
        for card in &result.page.items {
            assert_eq!(card.size_category, bucket);
        }
        seen += result.filtered_count;
    }
    assert_eq!(seen, (edges.len() * edges.len()) as u64);
}

#[tokio::test]
async fn test_catalog_filters_compose() {
    let app = setup().await;
    let taxonomy = &app.state.taxonomy_repo;
    let repo = &app.state.artwork_repo;

    let oil = taxonomy.create_category("Масло".into()).await.unwrap();
    let pastel = taxonomy.create_category("Пастель".into()).await.unwrap();
    let dragons = app
        .state
        .collection_repo
        .create(collection("Драконы"))
        .await
        .unwrap();

    let mut small_oil = artwork("Small dragon", 20, 20);
    small_oil.category_id = Some(oil.id);
    small_oil.collection_id = Some(dragons.id);
    small_oil.tags = "dragon".into();
    repo.create(small_oil).await.unwrap();

    let mut loose_oil = artwork("Tiny dragon", 15, 15);
    loose_oil.category_id = Some(oil.id);
    repo.create(loose_oil).await.unwrap();

    let mut big_oil = artwork("Big dragon", 100, 100);
    big_oil.category_id = Some(oil.id);
    repo.create(big_oil).await.unwrap();

    let mut small_pastel = artwork("Pastel dragon", 20, 20);
    small_pastel.category_id = Some(pastel.id);
    repo.create(small_pastel).await.unwrap();

    repo.create(artwork("Sunflowers", 20, 20)).await.unwrap();

    let mut filtered = CatalogQuery {
        text: Some("DRAGON".into()),
        ..query(ArtworkFilter {
            category_ids: vec![oil.id],
            sizes: vec![SizeBucket::Small],
            ..Default::default()
        })
    };
    let result = repo.catalog(&filtered).await.unwrap();

    // total_count covers the text search only
    assert_eq!(result.total_count, 4);
    assert_eq!(result.filtered_count, 2);

    filtered.filter.collection_ids = vec![dragons.id];
    let result = repo.catalog(&filtered).await.unwrap();
    assert_eq!(result.total_count, 4);
    assert_eq!(result.filtered_count, 1);
    assert_eq!(result.page.items[0].title, "Small dragon");
}

#[tokio::test]
async fn test_catalog_price_status_and_ordering() {
    let app = setup().await;
    let repo = &app.state.artwork_repo;

    for (title, price, status) in [
        ("Cheap", Some(1000), ArtworkStatus::Available),
        ("Mid", Some(5000), ArtworkStatus::Available),
        ("Dear", Some(9000), ArtworkStatus::Sold),
        ("Unpriced", None, ArtworkStatus::Available),
    ] {
        let mut input = artwork(title, 30, 30);
        input.price = price;
        input.status = status;
        repo.create(input).await.unwrap();
    }

    let mut priced = query(ArtworkFilter {
        price_min: Some(1000),
        price_max: Some(9000),
        ..Default::default()
    });
    priced.order = CatalogOrder::PriceDesc;
    let titles: Vec<String> = repo
        .catalog(&priced)
        .await
        .unwrap()
        .page
        .items
        .into_iter()
        .map(|c| c.title)
        .collect();
    assert_eq!(titles, vec!["Dear", "Mid", "Cheap"]);

    let available = repo
        .catalog(&query(ArtworkFilter {
            statuses: vec![ArtworkStatus::Available],
            price_min: Some(2000),
            ..Default::default()
        }))
        .await
        .unwrap();
    assert_eq!(available.filtered_count, 1);
    assert_eq!(available.page.items[0].title, "Mid");
}

#[tokio::test]
async fn test_search_treats_wildcards_literally() {
    let app = setup().await;
    let repo = &app.state.artwork_repo;
    repo.create(artwork("Sale 100% off", 30, 30)).await.unwrap();
    repo.create(artwork("Plain", 30, 30)).await.unwrap();

    let mut text = query(ArtworkFilter::default());
    text.text = Some("%".into());
    assert_eq!(repo.catalog(&text).await.unwrap().filtered_count, 1);

    text.text = Some("_".into());
    assert_eq!(repo.catalog(&text).await.unwrap().filtered_count, 0);
}

#[tokio::test]
async fn test_similar_prefers_theme_then_category() {
    let app = setup().await;
    let taxonomy = &app.state.taxonomy_repo;
    let repo = &app.state.artwork_repo;

    let fantasy = taxonomy.create_theme("Фэнтези".into()).await.unwrap();
    let landscape = taxonomy.create_theme("Пейзаж".into()).await.unwrap();

    let mut base = artwork("Base", 30, 30);
    base.theme_id = Some(fantasy.id);
    let base = repo.create(base).await.unwrap();

    for (title, theme, status) in [
        ("Same theme", fantasy.id, ArtworkStatus::Available),
        ("Same theme sold", fantasy.id, ArtworkStatus::Sold),
        ("Other theme", landscape.id, ArtworkStatus::Available),
    ] {
        let mut input = artwork(title, 30, 30);
        input.theme_id = Some(theme);
        input.status = status;
        repo.create(input).await.unwrap();
    }

    let similar = repo.similar(&base, 4).await.unwrap();
    let titles: Vec<&str> = similar.iter().map(|c| c.title.as_str()).collect();
    assert_eq!(titles, vec!["Same theme"]);
}

#[tokio::test]
async fn test_view_counter_increments_atomically() {
    let app = setup().await;
    let repo = &app.state.artwork_repo;
    let id = repo.create(artwork("Viewed", 30, 30)).await.unwrap().card.id;

    repo.increment_views(id).await.unwrap();
    repo.increment_views(id).await.unwrap();
    assert_eq!(repo.find_by_id(id).await.unwrap().unwrap().card.views, 2);

    assert!(matches!(
        repo.increment_views(9999).await.unwrap_err(),
        DomainError::NotFound
    ));
}

#[tokio::test]
async fn test_collection_page_counts_and_carousel() {
    let app = setup().await;
    let collections = &app.state.collection_repo;
    let repo = &app.state.artwork_repo;

    let seasons = collections.create(collection("Времена года")).await.unwrap();
    assert_eq!(seasons.slug, "vremena-goda");
    collections.create(collection("Драконы")).await.unwrap();

    for (title, status) in [
        ("Winter", ArtworkStatus::Available),
        ("Spring", ArtworkStatus::Sold),
        ("Summer", ArtworkStatus::Available),
    ] {
        let mut input = artwork(title, 30, 30);
        input.collection_id = Some(seasons.id);
        input.status = status;
        let created = repo.create(input).await.unwrap();
        if title == "Winter" {
            repo.add_image(created.card.id, image("winter.jpg", 0, false))
                .await
                .unwrap();
        }
    }

    let page = collections
        .page_by_slug("vremena-goda", &PageRequest::new(12, Some("7".into())))
        .await
        .unwrap()
        .unwrap();
    assert_eq!(page.artworks.number, 1);
    assert_eq!(page.artworks.total_items, 3);
    assert_eq!(page.available_count, 2);
    assert_eq!(page.sold_count, 1);
    assert_eq!(page.carousel_images.len(), 1);
    assert_eq!(page.carousel_images[0].url, "/media/winter.jpg");
    assert_eq!(page.other_collections.len(), 1);

    let overview = collections.overview().await.unwrap();
    assert_eq!(overview.total_artworks, 3);
    assert_eq!(overview.available_artworks, 2);
    assert_eq!(overview.collections[0].name, "Времена года");
    assert_eq!(overview.collections[0].artwork_count, 3);

    assert!(collections
        .page_by_slug("missing", &PageRequest::default())
        .await
        .unwrap()
        .is_none());
}

#[tokio::test]
async fn test_post_defaults_on_create() {
    let app = setup().await;
    let posts = &app.state.post_repo;

    let draft = posts
        .create(post("Draft", "", PostStatus::Draft))
        .await
        .unwrap();
    assert!(draft.card.published_at.is_none());
    assert_eq!(draft.card.excerpt, "Draft...");

    let published = posts
        .create(post("Hello", "news", PostStatus::Published))
        .await
        .unwrap();
    let stamped = published.card.published_at.clone().unwrap();

    // later saves keep the first publication time
    let updated = posts
        .update(published.card.id, post("Hello again", "news", PostStatus::Published))
        .await
        .unwrap();
    assert_eq!(updated.card.published_at.unwrap(), stamped);
    assert_eq!(updated.card.slug, "hello");

    // drafts are not public
    assert!(posts.find_published_by_slug("draft").await.unwrap().is_none());
    assert!(posts.find_published_by_slug("hello").await.unwrap().is_some());
}

#[tokio::test]
async fn test_blog_tag_search_and_sidebar() {
    let app = setup().await;
    let posts = &app.state.post_repo;

    posts.create(post("Dragons", "дракон, процесс", PostStatus::Published)).await.unwrap();
    posts.create(post("Autumn", "пейзаж, процесс", PostStatus::Published)).await.unwrap();
    posts.create(post("Secret", "дракон", PostStatus::Draft)).await.unwrap();

    let tagged = posts
        .list_published(&PostListQuery {
            tag: Some("дракон".into()),
            page: PageRequest::new(10, None),
            ..Default::default()
        })
        .await
        .unwrap();
    assert_eq!(tagged.total_items, 1);
    assert_eq!(tagged.items[0].title, "Dragons");

    let tags = posts.top_tags(10).await.unwrap();
    assert_eq!(tags[0].name, "процесс");
    assert_eq!(tags[0].count, 2);
    assert_eq!(tags.len(), 3);

    let dragons = posts.find_published_by_slug("dragons").await.unwrap().unwrap();
    let similar = posts.similar(&dragons, 4).await.unwrap();
    assert_eq!(similar.len(), 1);
    assert_eq!(similar[0].title, "Autumn");
}

#[tokio::test]
async fn test_untagged_post_gets_random_published_sample() {
    let app = setup().await;
    let posts = &app.state.post_repo;

    for i in 0..6 {
        posts
            .create(post(&format!("Story {}", i), "news", PostStatus::Published))
            .await
            .unwrap();
    }
    posts.create(post("Hidden", "", PostStatus::Draft)).await.unwrap();
    let untagged = posts
        .create(post("Untagged", "", PostStatus::Published))
        .await
        .unwrap();

    for _ in 0..5 {
        let similar = posts.similar(&untagged, 4).await.unwrap();
        assert_eq!(similar.len(), 4);
        for card in &similar {
            assert_ne!(card.id, untagged.card.id);
            assert_eq!(card.status, PostStatus::Published);
            assert_ne!(card.title, "Hidden");
        }
    }
}
