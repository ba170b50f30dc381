use sea_orm::{ConnectOptions, ConnectionTrait, Database, DatabaseConnection, DbErr, Statement};

pub async fn init_db(database_url: &str) -> Result<DatabaseConnection, DbErr> {
    let mut options = ConnectOptions::new(database_url.to_owned());
    options.sqlx_logging(false);
    if database_url.contains(":memory:") {
        // every pooled connection would otherwise open its own empty database
        options.max_connections(1).min_connections(1);
    }

    let db = Database::connect(options).await?;

    // Run migrations manually (simple SQL)
    run_migrations(&db).await?;

    Ok(db)
}

async fn execute(db: &DatabaseConnection, sql: &str) -> Result<(), DbErr> {
    db.execute(Statement::from_string(db.get_database_backend(), sql.to_owned()))
        .await
        .map(|_| ())
}

async fn run_migrations(db: &DatabaseConnection) -> Result<(), DbErr> {
    execute(db, "PRAGMA foreign_keys = ON").await?;

    execute(
        db,
        r#"
        CREATE TABLE IF NOT EXISTS users (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            username TEXT NOT NULL UNIQUE,
            password_hash TEXT NOT NULL,
            role TEXT NOT NULL DEFAULT 'editor',
            created_at TEXT NOT NULL,
            updated_at TEXT NOT NULL
        )
        "#,
    )
    .await?;

    execute(
        db,
        r#"
        CREATE TABLE IF NOT EXISTS categories (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            name TEXT NOT NULL
        )
        "#,
    )
    .await?;

    execute(
        db,
        r#"
        CREATE TABLE IF NOT EXISTS themes (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            name TEXT NOT NULL
        )
        "#,
    )
    .await?;

    execute(
        db,
        r#"
        CREATE TABLE IF NOT EXISTS collections (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            name TEXT NOT NULL,
            slug TEXT NOT NULL UNIQUE,
            description TEXT NOT NULL DEFAULT '',
            image TEXT,
            created_at TEXT NOT NULL,
            updated_at TEXT NOT NULL
        )
        "#,
    )
    .await?;

    execute(
        db,
        r#"
        CREATE TABLE IF NOT EXISTS artworks (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            title TEXT NOT NULL,
            slug TEXT NOT NULL UNIQUE,
            tags TEXT NOT NULL DEFAULT '',
            category_id INTEGER REFERENCES categories(id) ON DELETE SET NULL,
            theme_id INTEGER REFERENCES themes(id) ON DELETE SET NULL,
            collection_id INTEGER REFERENCES collections(id) ON DELETE SET NULL,
            status TEXT NOT NULL DEFAULT 'available',
            price INTEGER CHECK (price IS NULL OR price >= 0),
            purchase_url TEXT NOT NULL DEFAULT '',
            width_cm INTEGER NOT NULL CHECK (width_cm BETWEEN 1 AND 500),
            height_cm INTEGER NOT NULL CHECK (height_cm BETWEEN 1 AND 500),
            created_year INTEGER NOT NULL CHECK (created_year BETWEEN 1900 AND 2200),
            short_description TEXT NOT NULL DEFAULT '',
            description TEXT NOT NULL DEFAULT '',
            views INTEGER NOT NULL DEFAULT 0,
            created_at TEXT NOT NULL,
            updated_at TEXT NOT NULL
        )
        "#,
    )
    .await?;

    for index in [
        "CREATE INDEX IF NOT EXISTS idx_artworks_category ON artworks(category_id)",
        "CREATE INDEX IF NOT EXISTS idx_artworks_theme ON artworks(theme_id)",
        "CREATE INDEX IF NOT EXISTS idx_artworks_collection ON artworks(collection_id)",
        "CREATE INDEX IF NOT EXISTS idx_artworks_created_year ON artworks(created_year)",
        "CREATE INDEX IF NOT EXISTS idx_artworks_price ON artworks(price)",
    ] {
        execute(db, index).await?;
    }

    execute(
        db,
        r#"
        CREATE TABLE IF NOT EXISTS artwork_images (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            artwork_id INTEGER NOT NULL REFERENCES artworks(id) ON DELETE CASCADE,
            image TEXT NOT NULL,
            sort_order INTEGER NOT NULL DEFAULT 0,
            is_primary BOOLEAN NOT NULL DEFAULT 0,
            created_at TEXT NOT NULL
        )
        "#,
    )
    .await?;

    execute(
        db,
        "CREATE INDEX IF NOT EXISTS idx_artwork_images_artwork ON artwork_images(artwork_id, sort_order)",
    )
    .await?;

    execute(
        db,
        r#"
        CREATE TABLE IF NOT EXISTS blog_posts (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            title TEXT NOT NULL,
            slug TEXT NOT NULL UNIQUE,
            author_id INTEGER REFERENCES users(id) ON DELETE SET NULL,
            tags TEXT NOT NULL DEFAULT '',
            content TEXT NOT NULL DEFAULT '',
            views INTEGER NOT NULL DEFAULT 0,
            status TEXT NOT NULL DEFAULT 'draft',
            created_at TEXT NOT NULL,
            updated_at TEXT NOT NULL,
            published_at TEXT,
            preview_image TEXT,
            excerpt TEXT NOT NULL DEFAULT ''
        )
        "#,
    )
    .await?;

    for index in [
        "CREATE INDEX IF NOT EXISTS idx_blog_posts_status ON blog_posts(status)",
        "CREATE INDEX IF NOT EXISTS idx_blog_posts_author ON blog_posts(author_id)",
        "CREATE INDEX IF NOT EXISTS idx_blog_posts_created_at ON blog_posts(created_at)",
    ] {
        execute(db, index).await?;
    }

    Ok(())
}
