use sea_orm::*;
use sea_orm::sea_query::OnConflict;

use crate::infrastructure::auth::hash_password;
use crate::models::{blog, media_item, user};
use crate::utils::text::{reading_minutes, to_json_list};
use crate::utils::time::now_ts;

const DEMO_POSTS: [(&str, &str, &str, &[&str]); 3] = [
    (
        "Why I write in public",
        "why-i-write-in-public",
        "Writing in public turns half-formed ideas into conversations. Every post here started as a note I was not sure about.",
        &["writing", "craft"],
    ),
    (
        "Notes from my first podcast season",
        "notes-from-my-first-podcast-season",
        "Twelve episodes, three microphones and one lesson: guests remember how you made them feel, not the questions you asked.",
        &["podcast"],
    ),
    (
        "A simple weekly publishing system",
        "a-simple-weekly-publishing-system",
        "One long piece on Monday, three social threads during the week and a newsletter on Friday. The rest is batching.",
        &["workflow", "writing"],
    ),
];

/// Demo admin (`admin` / `admin`), published posts and media items
pub async fn seed_demo_data(db: &DatabaseConnection) -> Result<(), DbErr> {
    let now = now_ts();

    let admin_password = hash_password("admin").map_err(DbErr::Custom)?;
    let admin = user::ActiveModel {
        username: Set("admin".to_owned()),
        password_hash: Set(admin_password),
        role: Set("admin".to_owned()),
        created_at: Set(now.clone()),
        updated_at: Set(now.clone()),
        ..Default::default()
    };
    user::Entity::insert(admin)
        .on_conflict(OnConflict::column(user::Column::Username).do_nothing().to_owned())
        .do_nothing()
        .exec(db)
        .await?;

    for (title, slug, body, tags) in DEMO_POSTS {
        let tags: Vec<String> = tags.iter().map(|t| t.to_string()).collect();
        let post = blog::ActiveModel {
            title: Set(title.to_owned()),
            slug: Set(slug.to_owned()),
            excerpt: Set(Some(body.to_owned())),
            content: Set(body.to_owned()),
            tags: Set(to_json_list(&tags)),
            status: Set(blog::STATUS_PUBLISHED.to_owned()),
            published_at: Set(Some(now.clone())),
            reading_minutes: Set(reading_minutes(body)),
            view_count: Set(0),
            created_at: Set(now.clone()),
            updated_at: Set(now.clone()),
            ..Default::default()
        };
        blog::Entity::insert(post)
            .on_conflict(OnConflict::column(blog::Column::Slug).do_nothing().to_owned())
            .do_nothing()
            .exec(db)
            .await?;
    }

    if media_item::Entity::find().count(db).await? == 0 {
        let items = [
            ("podcast", "Building an audience from zero", "The Creator Hour", true),
            ("talk", "Publishing systems for solo creators", "IndieConf", false),
        ];
        for (position, (kind, title, outlet, featured)) in items.into_iter().enumerate() {
            media_item::ActiveModel {
                kind: Set(kind.to_owned()),
                title: Set(title.to_owned()),
                outlet: Set(Some(outlet.to_owned())),
                url: Set("https://example.com/media".to_owned()),
                featured: Set(featured),
                position: Set(position as i32),
                created_at: Set(now.clone()),
                updated_at: Set(now.clone()),
                ..Default::default()
            }
            .insert(db)
            .await?;
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::db::init_db;

    #[tokio::test]
    async fn test_seed_is_idempotent() {
        let db = init_db("sqlite::memory:").await.unwrap();
        seed_demo_data(&db).await.unwrap();
        seed_demo_data(&db).await.unwrap();

        assert_eq!(user::Entity::find().count(&db).await.unwrap(), 1);
        assert_eq!(blog::Entity::find().count(&db).await.unwrap(), 3);
        assert_eq!(media_item::Entity::find().count(&db).await.unwrap(), 2);
    }
}
