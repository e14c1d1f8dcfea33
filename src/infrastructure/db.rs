use sea_orm::{ConnectionTrait, Database, DatabaseConnection, DbErr, Statement};

pub async fn init_db(database_url: &str) -> Result<DatabaseConnection, DbErr> {
    let db = Database::connect(database_url).await?;

    // Run migrations manually (simple SQL)
    run_migrations(&db).await?;

    Ok(db)
}

async fn execute(db: &DatabaseConnection, sql: &str) -> Result<(), DbErr> {
    db.execute(Statement::from_string(
        db.get_database_backend(),
        sql.to_owned(),
    ))
    .await?;
    Ok(())
}

async fn run_migrations(db: &DatabaseConnection) -> Result<(), DbErr> {
    execute(
        db,
        r#"
        CREATE TABLE IF NOT EXISTS users (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            username TEXT NOT NULL UNIQUE,
            password_hash TEXT NOT NULL,
            role TEXT NOT NULL DEFAULT 'admin',
            created_at TEXT NOT NULL,
            updated_at TEXT NOT NULL
        )
        "#,
    )
    .await?;

    execute(
        db,
        r#"
        CREATE TABLE IF NOT EXISTS blogs (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            title TEXT NOT NULL,
            slug TEXT NOT NULL UNIQUE,
            excerpt TEXT,
            content TEXT NOT NULL,
            cover_image_url TEXT,
            tags TEXT NOT NULL DEFAULT '[]',
            status TEXT NOT NULL DEFAULT 'draft',
            scheduled_at TEXT,
            published_at TEXT,
            reading_minutes INTEGER NOT NULL DEFAULT 1,
            view_count INTEGER NOT NULL DEFAULT 0,
            meta_title TEXT,
            meta_description TEXT,
            created_at TEXT NOT NULL,
            updated_at TEXT NOT NULL
        )
        "#,
    )
    .await?;

    execute(
        db,
        "CREATE INDEX IF NOT EXISTS idx_blogs_status_published ON blogs (status, published_at)",
    )
    .await?;

    execute(
        db,
        r#"
        CREATE TABLE IF NOT EXISTS subscribers (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            email TEXT NOT NULL UNIQUE,
            name TEXT,
            status TEXT NOT NULL DEFAULT 'active',
            source TEXT,
            unsubscribe_token TEXT NOT NULL UNIQUE,
            sender_synced BOOLEAN NOT NULL DEFAULT 0,
            created_at TEXT NOT NULL,
            updated_at TEXT NOT NULL
        )
        "#,
    )
    .await?;

    execute(
        db,
        r#"
        CREATE TABLE IF NOT EXISTS campaigns (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            subject TEXT NOT NULL,
            preheader TEXT,
            content_html TEXT NOT NULL,
            status TEXT NOT NULL DEFAULT 'draft',
            scheduled_at TEXT,
            sent_at TEXT,
            sender_campaign_id TEXT,
            error_message TEXT,
            created_at TEXT NOT NULL,
            updated_at TEXT NOT NULL
        )
        "#,
    )
    .await?;

    execute(
        db,
        r#"
        CREATE TABLE IF NOT EXISTS social_accounts (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            platform TEXT NOT NULL UNIQUE,
            external_id TEXT NOT NULL,
            display_name TEXT,
            access_token TEXT NOT NULL,
            refresh_token TEXT,
            token_expires_at TEXT,
            scopes TEXT,
            created_at TEXT NOT NULL,
            updated_at TEXT NOT NULL
        )
        "#,
    )
    .await?;

    execute(
        db,
        r#"
        CREATE TABLE IF NOT EXISTS social_posts (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            platform TEXT NOT NULL,
            content TEXT NOT NULL,
            media_urls TEXT NOT NULL DEFAULT '[]',
            link_url TEXT,
            status TEXT NOT NULL DEFAULT 'draft',
            scheduled_at TEXT,
            published_at TEXT,
            external_post_id TEXT,
            external_url TEXT,
            error_message TEXT,
            attempts INTEGER NOT NULL DEFAULT 0,
            blog_id INTEGER REFERENCES blogs(id) ON DELETE SET NULL,
            created_at TEXT NOT NULL,
            updated_at TEXT NOT NULL
        )
        "#,
    )
    .await?;

    execute(
        db,
        "CREATE INDEX IF NOT EXISTS idx_social_posts_due ON social_posts (status, scheduled_at)",
    )
    .await?;

    execute(
        db,
        r#"
        CREATE TABLE IF NOT EXISTS emails (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            gmail_message_id TEXT NOT NULL UNIQUE,
            thread_id TEXT,
            from_address TEXT NOT NULL,
            subject TEXT NOT NULL,
            snippet TEXT,
            received_at TEXT NOT NULL,
            is_read BOOLEAN NOT NULL DEFAULT 0,
            created_at TEXT NOT NULL
        )
        "#,
    )
    .await?;

    execute(
        db,
        r#"
        CREATE TABLE IF NOT EXISTS email_tasks (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            email_id INTEGER REFERENCES emails(id) ON DELETE SET NULL,
            title TEXT NOT NULL,
            notes TEXT,
            status TEXT NOT NULL DEFAULT 'open',
            priority TEXT NOT NULL DEFAULT 'normal',
            due_date TEXT,
            created_at TEXT NOT NULL,
            updated_at TEXT NOT NULL
        )
        "#,
    )
    .await?;

    execute(
        db,
        r#"
        CREATE TABLE IF NOT EXISTS ai_integrations (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            name TEXT NOT NULL,
            provider TEXT NOT NULL,
            api_key TEXT NOT NULL,
            model_name TEXT NOT NULL,
            is_default BOOLEAN NOT NULL DEFAULT 0,
            created_at TEXT NOT NULL,
            updated_at TEXT NOT NULL
        )
        "#,
    )
    .await?;

    execute(
        db,
        r#"
        CREATE TABLE IF NOT EXISTS podcast_applications (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            name TEXT NOT NULL,
            email TEXT NOT NULL,
            website TEXT,
            topic TEXT NOT NULL,
            pitch TEXT NOT NULL,
            social_links TEXT,
            status TEXT NOT NULL DEFAULT 'new',
            admin_notes TEXT,
            created_at TEXT NOT NULL,
            updated_at TEXT NOT NULL
        )
        "#,
    )
    .await?;

    execute(
        db,
        r#"
        CREATE TABLE IF NOT EXISTS contact_messages (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            name TEXT NOT NULL,
            email TEXT NOT NULL,
            subject TEXT,
            message TEXT NOT NULL,
            status TEXT NOT NULL DEFAULT 'new',
            created_at TEXT NOT NULL,
            updated_at TEXT NOT NULL
        )
        "#,
    )
    .await?;

    execute(
        db,
        r#"
        CREATE TABLE IF NOT EXISTS media_items (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            kind TEXT NOT NULL,
            title TEXT NOT NULL,
            outlet TEXT,
            url TEXT NOT NULL,
            thumbnail_url TEXT,
            description TEXT,
            published_on TEXT,
            featured BOOLEAN NOT NULL DEFAULT 0,
            position INTEGER NOT NULL DEFAULT 0,
            created_at TEXT NOT NULL,
            updated_at TEXT NOT NULL
        )
        "#,
    )
    .await?;

    execute(
        db,
        r#"
        CREATE TABLE IF NOT EXISTS scheduler_jobs (
            name TEXT PRIMARY KEY NOT NULL,
            enabled BOOLEAN NOT NULL DEFAULT 1,
            interval_secs INTEGER NOT NULL,
            last_run_at TEXT,
            last_status TEXT,
            last_message TEXT
        )
        "#,
    )
    .await?;

    // Default job rows; existing rows keep their admin-edited settings
    execute(
        db,
        r#"
        INSERT OR IGNORE INTO scheduler_jobs (name, enabled, interval_secs) VALUES
            ('publish_social', 1, 60),
            ('publish_blogs', 1, 60),
            ('send_campaigns', 1, 60),
            ('sync_inbox', 1, 900),
            ('refresh_tokens', 1, 3600)
        "#,
    )
    .await?;

    // Migration 002: SEO fields on blogs
    // Columns may already exist on fresh installs, so errors are ignored
    let _ = execute(db, "ALTER TABLE blogs ADD COLUMN meta_title TEXT").await;
    let _ = execute(db, "ALTER TABLE blogs ADD COLUMN meta_description TEXT").await;

    // Migration 003: attempts counter on social posts
    let _ = execute(
        db,
        "ALTER TABLE social_posts ADD COLUMN attempts INTEGER NOT NULL DEFAULT 0",
    )
    .await;

    Ok(())
}
