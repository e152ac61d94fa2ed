use sqlx::MySqlPool;

/// Create and seed a small demo schema exercising the column types the
/// explorer cares about: enums, tinyint(1) flags, color columns, times,
/// decimals, and foreign keys.
pub async fn setup(pool: &MySqlPool) -> Result<(), sqlx::Error> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS demo_users (
            id BIGINT UNSIGNED NOT NULL AUTO_INCREMENT PRIMARY KEY,
            name VARCHAR(191) NOT NULL,
            email VARCHAR(191) NOT NULL UNIQUE,
            bio TEXT NULL,
            favorite_color VARCHAR(7) NULL,
            is_active TINYINT(1) NOT NULL DEFAULT 1,
            login_count INT UNSIGNED NOT NULL DEFAULT 0,
            created_at DATETIME DEFAULT CURRENT_TIMESTAMP
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS demo_posts (
            id BIGINT UNSIGNED NOT NULL AUTO_INCREMENT PRIMARY KEY,
            author_id BIGINT UNSIGNED NOT NULL,
            title VARCHAR(191) NOT NULL,
            body MEDIUMTEXT NULL,
            status ENUM('draft','published','archived') NOT NULL DEFAULT 'draft',
            rating DECIMAL(3,1) NULL,
            publish_time TIME NULL,
            published_on DATE NULL,
            created_at TIMESTAMP NULL DEFAULT CURRENT_TIMESTAMP,
            CONSTRAINT demo_posts_author_fk FOREIGN KEY (author_id) REFERENCES demo_users (id)
        )
        "#,
    )
    .execute(pool)
    .await?;

    let user_count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM demo_users")
        .fetch_one(pool)
        .await?;
    if user_count > 0 {
        return Ok(());
    }

    sqlx::query(
        r#"
        INSERT INTO demo_users (name, email, bio, favorite_color, is_active, login_count) VALUES
            ('Ada Lovelace', 'ada@example.com', 'Wrote the first program.', '#4f46e5', 1, 42),
            ('Grace Hopper', 'grace@example.com', 'Invented the compiler.', '#10b981', 1, 17),
            ('Alan Turing', 'alan@example.com', NULL, NULL, 0, 3)
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        r#"
        INSERT INTO demo_posts (author_id, title, body, status, rating, publish_time, published_on) VALUES
            (1, 'Notes on the Analytical Engine', 'A very long body...', 'published', 4.5, '09:30:00', '2026-01-15'),
            (2, 'Debugging in practice', NULL, 'draft', NULL, NULL, NULL),
            (3, 'On computable numbers', 'Another long body...', 'archived', 5.0, '14:00:00', '2026-03-02')
        "#,
    )
    .execute(pool)
    .await?;

    Ok(())
}
