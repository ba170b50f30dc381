//! SeaORM implementation of PostRepository

use async_trait::async_trait;
use sea_orm::sea_query::{Expr, Order};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, ConnectionTrait, DatabaseConnection, DbErr,
    EntityTrait, PaginatorTrait, QueryFilter, QueryOrder, QuerySelect, Select, Set,
    TransactionTrait,
};
use std::collections::HashMap;

use super::slug::resolve_slug;
use super::{contains_ci, now};
use crate::domain::pagination::Page;
use crate::domain::{
    AuthorRef, DomainError, PostCard, PostDetail, PostInput, PostListQuery, PostRepository,
    TagCount, media_url,
};
use crate::models::{PostStatus, blog_post, user};
use crate::utils::text::{generate_excerpt, split_tags, strip_tags};

/// SeaORM-based implementation of PostRepository
pub struct SeaOrmPostRepository {
    db: DatabaseConnection,
}

impl SeaOrmPostRepository {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}

fn published() -> Select<blog_post::Entity> {
    blog_post::Entity::find().filter(blog_post::Column::Status.eq(PostStatus::Published.as_str()))
}

fn newest_first(select: Select<blog_post::Entity>) -> Select<blog_post::Entity> {
    select
        .order_by_desc(blog_post::Column::PublishedAt)
        .order_by_desc(blog_post::Column::CreatedAt)
        .order_by_desc(blog_post::Column::Id)
}

fn text_condition(text: &str) -> Condition {
    Condition::any()
        .add(contains_ci(blog_post::Column::Title, text))
        .add(contains_ci(blog_post::Column::Tags, text))
        .add(contains_ci(blog_post::Column::Content, text))
        .add(contains_ci(blog_post::Column::Excerpt, text))
}

fn card(model: blog_post::Model, author: Option<AuthorRef>) -> PostCard {
    PostCard {
        id: model.id,
        url: format!("/blog/{}", model.slug),
        tags: model.tags_list(),
        preview_image_url: model.preview_image.as_deref().map(media_url),
        title: model.title,
        slug: model.slug,
        excerpt: model.excerpt,
        views: model.views,
        status: model.status,
        author,
        published_at: model.published_at,
        created_at: model.created_at,
    }
}

async fn decorate_cards<C: ConnectionTrait>(
    conn: &C,
    models: Vec<blog_post::Model>,
) -> Result<Vec<PostCard>, DbErr> {
    let mut author_ids: Vec<i32> = models.iter().filter_map(|m| m.author_id).collect();
    author_ids.sort_unstable();
    author_ids.dedup();

    let authors: HashMap<i32, AuthorRef> = if author_ids.is_empty() {
        HashMap::new()
    } else {
        user::Entity::find()
            .filter(user::Column::Id.is_in(author_ids))
            .all(conn)
            .await?
            .into_iter()
            .map(|u| {
                (
                    u.id,
                    AuthorRef {
                        id: u.id,
                        username: u.username,
                    },
                )
            })
            .collect()
    };

    Ok(models
        .into_iter()
        .map(|m| {
            let author = m.author_id.and_then(|id| authors.get(&id).cloned());
            card(m, author)
        })
        .collect())
}

async fn detail<C: ConnectionTrait>(conn: &C, model: blog_post::Model) -> Result<PostDetail, DbErr> {
    let content = model.content.clone();
    let updated_at = model.updated_at.clone();
    let card = decorate_cards(conn, vec![model])
        .await?
        .pop()
        .ok_or_else(|| DbErr::RecordNotFound("blog post".into()))?;

    Ok(PostDetail {
        card,
        content,
        updated_at,
    })
}

/// Tag occurrences, most frequent first; ties keep first-seen order
pub(crate) fn count_tags<'a>(tag_fields: impl Iterator<Item = &'a str>, limit: usize) -> Vec<TagCount> {
    let mut counts: Vec<TagCount> = Vec::new();
    for field in tag_fields {
        for tag in split_tags(field) {
            match counts.iter_mut().find(|t| t.name == tag) {
                Some(existing) => existing.count += 1,
                None => counts.push(TagCount { name: tag, count: 1 }),
            }
        }
    }
    // stable sort keeps first-seen order among equal counts
    counts.sort_by(|a, b| b.count.cmp(&a.count));
    counts.truncate(limit);
    counts
}

/// published_at is stamped on the first transition to published and kept
/// afterwards unless given explicitly.
fn resolve_published_at(
    requested: Option<String>,
    previous: Option<String>,
    status: PostStatus,
) -> Option<String> {
    requested.or(previous).or_else(|| {
        if status == PostStatus::Published {
            Some(now())
        } else {
            None
        }
    })
}

fn resolve_excerpt(excerpt: &str, content: &str) -> String {
    if !excerpt.trim().is_empty() {
        excerpt.trim().to_string()
    } else if strip_tags(content).trim().is_empty() {
        String::new()
    } else {
        generate_excerpt(content)
    }
}

async fn check_author<C: ConnectionTrait>(conn: &C, author_id: Option<i32>) -> Result<(), DomainError> {
    if let Some(id) = author_id
        && user::Entity::find_by_id(id).one(conn).await?.is_none()
    {
        return Err(DomainError::Validation(format!("unknown author {}", id)));
    }
    Ok(())
}

impl SeaOrmPostRepository {
    async fn cards(&self, select: Select<blog_post::Entity>) -> Result<Vec<PostCard>, DomainError> {
        let models = select.all(&self.db).await?;
        Ok(decorate_cards(&self.db, models).await?)
    }
}

#[async_trait]
impl PostRepository for SeaOrmPostRepository {
    async fn list_published(&self, query: &PostListQuery) -> Result<Page<PostCard>, DomainError> {
        let mut select = published();
        if let Some(text) = &query.text {
            select = select.filter(text_condition(text));
        }
        if let Some(tag) = &query.tag {
            select = select.filter(contains_ci(blog_post::Column::Tags, tag));
        }

        let total = select.clone().count(&self.db).await?;
        let per_page = query.page.per_page;
        let number = query.page.resolve(total);
        let items = self
            .cards(
                newest_first(select)
                    .offset((number - 1) * per_page)
                    .limit(per_page),
            )
            .await?;

        Ok(Page::new(items, number, per_page, total))
    }

    async fn find_published_by_slug(&self, slug: &str) -> Result<Option<PostDetail>, DomainError> {
        let model = published()
            .filter(blog_post::Column::Slug.eq(slug))
            .one(&self.db)
            .await?;
        match model {
            Some(model) => Ok(Some(detail(&self.db, model).await?)),
            None => Ok(None),
        }
    }

    async fn find_by_id(&self, id: i32) -> Result<Option<PostDetail>, DomainError> {
        match blog_post::Entity::find_by_id(id).one(&self.db).await? {
            Some(model) => Ok(Some(detail(&self.db, model).await?)),
            None => Ok(None),
        }
    }

    async fn similar(&self, post: &PostDetail, limit: u64) -> Result<Vec<PostCard>, DomainError> {
        let select = published().filter(blog_post::Column::Id.ne(post.card.id));

        let select = if post.card.tags.is_empty() {
            select.order_by(Expr::cust("RANDOM()"), Order::Asc)
        } else {
            let any_tag = post
                .card
                .tags
                .iter()
                .fold(Condition::any(), |any, tag| {
                    any.add(contains_ci(blog_post::Column::Tags, tag))
                });
            newest_first(select.filter(any_tag))
        };

        self.cards(select.limit(limit)).await
    }

    async fn latest_published(&self, limit: u64) -> Result<Vec<PostCard>, DomainError> {
        self.cards(newest_first(published()).limit(limit)).await
    }

    async fn latest_created(&self, limit: u64) -> Result<Vec<PostCard>, DomainError> {
        let select = published()
            .order_by_desc(blog_post::Column::CreatedAt)
            .order_by_desc(blog_post::Column::Id)
            .limit(limit);
        self.cards(select).await
    }

    async fn most_viewed(&self, limit: u64) -> Result<Vec<PostCard>, DomainError> {
        let select = published()
            .order_by_desc(blog_post::Column::Views)
            .order_by_asc(blog_post::Column::Id)
            .limit(limit);
        self.cards(select).await
    }

    async fn top_tags(&self, limit: usize) -> Result<Vec<TagCount>, DomainError> {
        let tag_fields: Vec<String> = published()
            .select_only()
            .column(blog_post::Column::Tags)
            .order_by_asc(blog_post::Column::Id)
            .into_tuple()
            .all(&self.db)
            .await?;

        Ok(count_tags(tag_fields.iter().map(String::as_str), limit))
    }

    async fn search(&self, text: &str, limit: u64) -> Result<Vec<PostCard>, DomainError> {
        self.cards(newest_first(published().filter(text_condition(text))).limit(limit))
            .await
    }

    async fn count_published(&self) -> Result<u64, DomainError> {
        Ok(published().count(&self.db).await?)
    }

    async fn increment_views(&self, id: i32) -> Result<(), DomainError> {
        let result = blog_post::Entity::update_many()
            .col_expr(
                blog_post::Column::Views,
                Expr::col(blog_post::Column::Views).add(1),
            )
            .filter(blog_post::Column::Id.eq(id))
            .exec(&self.db)
            .await?;

        if result.rows_affected == 0 {
            return Err(DomainError::NotFound);
        }
        Ok(())
    }

    async fn create(&self, input: PostInput) -> Result<PostDetail, DomainError> {
        input.validate()?;

        let txn = self.db.begin().await?;
        check_author(&txn, input.author_id).await?;

        let slug = resolve_slug::<blog_post::Entity, _>(
            &txn,
            blog_post::Column::Slug,
            blog_post::Column::Id,
            input.slug.as_deref(),
            &input.title,
            "post",
            None,
        )
        .await?;

        let timestamp = now();
        let model = blog_post::ActiveModel {
            title: Set(input.title.trim().to_string()),
            slug: Set(slug),
            author_id: Set(input.author_id),
            tags: Set(input.tags.trim().to_string()),
            excerpt: Set(resolve_excerpt(&input.excerpt, &input.content)),
            content: Set(input.content),
            views: Set(0),
            published_at: Set(resolve_published_at(input.published_at, None, input.status)),
            status: Set(input.status),
            preview_image: Set(None),
            created_at: Set(timestamp.clone()),
            updated_at: Set(timestamp),
            ..Default::default()
        }
        .insert(&txn)
        .await?;
        let created = detail(&txn, model).await?;

        txn.commit().await?;
        tracing::info!("Created blog post {} ({})", created.card.id, created.card.slug);
        Ok(created)
    }

    async fn update(&self, id: i32, input: PostInput) -> Result<PostDetail, DomainError> {
        input.validate()?;

        let txn = self.db.begin().await?;
        let existing = blog_post::Entity::find_by_id(id)
            .one(&txn)
            .await?
            .ok_or(DomainError::NotFound)?;
        check_author(&txn, input.author_id).await?;

        let slug = match input.slug.as_deref().map(str::trim).filter(|s| !s.is_empty()) {
            Some(requested) if requested != existing.slug => Some(
                resolve_slug::<blog_post::Entity, _>(
                    &txn,
                    blog_post::Column::Slug,
                    blog_post::Column::Id,
                    Some(requested),
                    &input.title,
                    "post",
                    Some(id),
                )
                .await?,
            ),
            _ => None,
        };

        let published_at =
            resolve_published_at(input.published_at, existing.published_at.clone(), input.status);
        let author_id = input.author_id.or(existing.author_id);

        let mut active: blog_post::ActiveModel = existing.into();
        if let Some(slug) = slug {
            active.slug = Set(slug);
        }
        active.title = Set(input.title.trim().to_string());
        active.author_id = Set(author_id);
        active.tags = Set(input.tags.trim().to_string());
        active.excerpt = Set(resolve_excerpt(&input.excerpt, &input.content));
        active.content = Set(input.content);
        active.status = Set(input.status);
        active.published_at = Set(published_at);
        active.updated_at = Set(now());
        let model = active.update(&txn).await?;
        let updated = detail(&txn, model).await?;

        txn.commit().await?;
        Ok(updated)
    }

    async fn delete(&self, id: i32) -> Result<Option<String>, DomainError> {
        let existing = blog_post::Entity::find_by_id(id)
            .one(&self.db)
            .await?
            .ok_or(DomainError::NotFound)?;
        blog_post::Entity::delete_by_id(id).exec(&self.db).await?;

        tracing::info!("Deleted blog post {}", id);
        Ok(existing.preview_image)
    }

    async fn set_preview(&self, id: i32, path: String) -> Result<Option<String>, DomainError> {
        let existing = blog_post::Entity::find_by_id(id)
            .one(&self.db)
            .await?
            .ok_or(DomainError::NotFound)?;
        let previous = existing.preview_image.clone();

        let mut active: blog_post::ActiveModel = existing.into();
        active.preview_image = Set(Some(path));
        active.updated_at = Set(now());
        active.update(&self.db).await?;

        Ok(previous)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tags_are_counted_most_frequent_first() {
        let fields = ["акварель, пейзаж", "пейзаж,дракон", "", "дракон, пейзаж,,"];
        let tags = count_tags(fields.into_iter(), 10);
        assert_eq!(tags[0], TagCount { name: "пейзаж".into(), count: 3 });
        assert_eq!(tags[1], TagCount { name: "дракон".into(), count: 2 });
        assert_eq!(tags[2], TagCount { name: "акварель".into(), count: 1 });
        assert_eq!(count_tags(fields.into_iter(), 1).len(), 1);
    }

    #[test]
    fn ties_keep_first_seen_order() {
        let tags = count_tags(["b, a", "a, b"].into_iter(), 10);
        assert_eq!(tags[0].name, "b");
        assert_eq!(tags[1].name, "a");
    }

    #[test]
    fn published_at_is_stamped_once() {
        assert!(resolve_published_at(None, None, PostStatus::Draft).is_none());
        assert!(resolve_published_at(None, None, PostStatus::Published).is_some());

        let earlier = Some("2024-01-01T00:00:00+00:00".to_string());
        assert_eq!(
            resolve_published_at(None, earlier.clone(), PostStatus::Published),
            earlier
        );
    }

    #[test]
    fn blank_excerpt_is_generated_from_content() {
        assert_eq!(resolve_excerpt("  ", "<p>Привет</p>"), "Привет...");
        assert_eq!(resolve_excerpt("Своё", "<p>Привет</p>"), "Своё");
    }
}
