use sea_orm::sea_query::OnConflict;
use sea_orm::*;

use crate::domain::{ArtworkInput, CollectionInput, DomainError, PostInput};
use crate::infrastructure::AppState;
use crate::infrastructure::auth::{ADMIN_ROLE, hash_password};
use crate::models::{ArtworkStatus, PostStatus, category, user};

struct DemoArtwork {
    title: &'static str,
    tags: &'static str,
    category: usize,
    theme: usize,
    collection: Option<usize>,
    status: ArtworkStatus,
    price: Option<i64>,
    size: (i32, i32),
    year: i32,
    short_description: &'static str,
}

const DEMO_ARTWORKS: &[DemoArtwork] = &[
    DemoArtwork {
        title: "Спящий дракон",
        tags: "дракон, фэнтези, горы",
        category: 0,
        theme: 1,
        collection: Some(0),
        status: ArtworkStatus::Available,
        price: Some(45000),
        size: (50, 70),
        year: 2023,
        short_description: "Дракон дремлет над горным ущельем.",
    },
    DemoArtwork {
        title: "Дракончик",
        tags: "дракон, миниатюра",
        category: 1,
        theme: 1,
        collection: Some(0),
        status: ArtworkStatus::Available,
        price: Some(8000),
        size: (20, 20),
        year: 2024,
        short_description: "Маленький дракон на пастельной бумаге.",
    },
    DemoArtwork {
        title: "Осенний лес",
        tags: "осень, лес, пейзаж",
        category: 0,
        theme: 0,
        collection: Some(1),
        status: ArtworkStatus::Sold,
        price: Some(30000),
        size: (40, 50),
        year: 2022,
        short_description: "Золотая осень в сосновом бору.",
    },
    DemoArtwork {
        title: "Зимнее утро",
        tags: "зима, пейзаж",
        category: 1,
        theme: 0,
        collection: Some(1),
        status: ArtworkStatus::Available,
        price: None,
        size: (30, 40),
        year: 2024,
        short_description: "Иней на окне и первые лучи солнца.",
    },
    DemoArtwork {
        title: "Подсолнухи",
        tags: "цветы, натюрморт",
        category: 2,
        theme: 2,
        collection: None,
        status: ArtworkStatus::Available,
        price: Some(125000),
        size: (80, 100),
        year: 2021,
        short_description: "Букет подсолнухов в глиняном кувшине.",
    },
];

/// Fills an empty database with demo content; does nothing if categories exist
pub async fn seed_demo_data(state: &AppState) -> Result<(), DomainError> {
    let db = state.db();
    if category::Entity::find().count(db).await? > 0 {
        tracing::info!("Database already has content, skipping demo seed");
        return Ok(());
    }

    let password = std::env::var("SEED_ADMIN_PASSWORD").unwrap_or_else(|_| "admin".to_owned());
    let now = chrono::Utc::now().to_rfc3339();
    let admin = user::ActiveModel {
        username: Set("admin".to_owned()),
        password_hash: Set(hash_password(&password).map_err(DomainError::Internal)?),
        role: Set(ADMIN_ROLE.to_owned()),
        created_at: Set(now.clone()),
        updated_at: Set(now),
        ..Default::default()
    };
    user::Entity::insert(admin)
        .on_conflict(OnConflict::column(user::Column::Username).do_nothing().to_owned())
        .exec_without_returning(db)
        .await?;
    let admin_id = user::Entity::find()
        .filter(user::Column::Username.eq("admin"))
        .one(db)
        .await?
        .map(|u| u.id);

    // ids 1 and 2 are the home page's oil and pastel picks
    let mut categories = Vec::new();
    for name in ["Масло", "Пастель", "Акварель"] {
        categories.push(state.taxonomy_repo.create_category(name.to_owned()).await?.id);
    }
    let mut themes = Vec::new();
    for name in ["Пейзаж", "Фэнтези", "Натюрморт"] {
        themes.push(state.taxonomy_repo.create_theme(name.to_owned()).await?.id);
    }

    let mut collections = Vec::new();
    for (name, description) in [
        ("Драконы", "Серия работ о драконах и их мире."),
        ("Времена года", "Пейзажи четырёх сезонов."),
    ] {
        let collection = state
            .collection_repo
            .create(CollectionInput {
                name: name.to_owned(),
                slug: None,
                description: description.to_owned(),
            })
            .await?;
        collections.push(collection.id);
    }

    for demo in DEMO_ARTWORKS {
        state
            .artwork_repo
            .create(ArtworkInput {
                title: demo.title.to_owned(),
                slug: None,
                tags: demo.tags.to_owned(),
                category_id: Some(categories[demo.category]),
                theme_id: Some(themes[demo.theme]),
                collection_id: demo.collection.map(|i| collections[i]),
                status: demo.status,
                price: demo.price,
                purchase_url: String::new(),
                width_cm: demo.size.0,
                height_cm: demo.size.1,
                created_year: demo.year,
                short_description: demo.short_description.to_owned(),
                description: format!("<p>{}</p>", demo.short_description),
            })
            .await?;
    }

    for (title, tags, content) in [
        (
            "Как я пишу драконов",
            "дракон, процесс",
            "<p>Сначала эскиз углём, затем подмалёвок и лессировки.</p>",
        ),
        (
            "Выставка этой осенью",
            "выставка, новости",
            "<p>Приглашаю всех на осеннюю выставку пейзажей.</p>",
        ),
    ] {
        state
            .post_repo
            .create(PostInput {
                title: title.to_owned(),
                slug: None,
                tags: tags.to_owned(),
                content: content.to_owned(),
                status: PostStatus::Published,
                published_at: None,
                excerpt: String::new(),
                author_id: admin_id,
            })
            .await?;
    }

    tracing::info!("Seeded {} demo artworks", DEMO_ARTWORKS.len());
    Ok(())
}
