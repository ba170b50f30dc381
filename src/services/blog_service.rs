//! Blog list and post pages

use serde::{Deserialize, Serialize};

use crate::domain::pagination::{Page, PageRequest, last_value};
use crate::domain::{DomainError, PostCard, PostDetail, PostListQuery, TagCount};
use crate::infrastructure::AppState;
use crate::infrastructure::session::ViewedKind;

pub const POSTS_PER_PAGE: u64 = 10;
pub const SIDEBAR_POSTS: u64 = 5;
pub const SIDEBAR_TAGS: usize = 10;
pub const SIMILAR_POSTS: u64 = 4;

/// Repeated keys are tolerated; the last value is used
#[derive(Debug, Clone, Default, Deserialize)]
pub struct BlogListParams {
    #[serde(default)]
    pub q: Vec<String>,
    #[serde(default)]
    pub tag: Vec<String>,
    #[serde(default)]
    pub page: Vec<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct BlogSidebar {
    pub popular_posts: Vec<PostCard>,
    pub recent_posts: Vec<PostCard>,
    pub tags: Vec<TagCount>,
}

#[derive(Debug, Clone, Serialize)]
pub struct BlogListPage {
    pub posts: Page<PostCard>,
    pub query: String,
    pub tag: String,
    pub sidebar: BlogSidebar,
}

#[derive(Debug, Clone, Serialize)]
pub struct PostPage {
    pub post: PostDetail,
    pub similar_posts: Vec<PostCard>,
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

pub async fn sidebar(state: &AppState) -> Result<BlogSidebar, DomainError> {
    Ok(BlogSidebar {
        popular_posts: state.post_repo.most_viewed(SIDEBAR_POSTS).await?,
        recent_posts: state.post_repo.latest_published(SIDEBAR_POSTS).await?,
        tags: state.post_repo.top_tags(SIDEBAR_TAGS).await?,
    })
}

pub async fn blog_list(state: &AppState, params: BlogListParams) -> Result<BlogListPage, DomainError> {
    let query = PostListQuery {
        text: non_blank(last_value(params.q)),
        tag: non_blank(last_value(params.tag)),
        page: PageRequest::new(POSTS_PER_PAGE, last_value(params.page)),
    };
    let posts = state.post_repo.list_published(&query).await?;

    Ok(BlogListPage {
        posts,
        query: query.text.unwrap_or_default(),
        tag: query.tag.unwrap_or_default(),
        sidebar: sidebar(state).await?,
    })
}

/// Published posts only; a view is counted once per session
pub async fn post_page(state: &AppState, session_id: &str, slug: &str) -> Result<PostPage, DomainError> {
    let mut post = state
        .post_repo
        .find_published_by_slug(slug)
        .await?
        .ok_or(DomainError::NotFound)?;

    if state.views.record(session_id, ViewedKind::Post, post.card.id) {
        match state.post_repo.increment_views(post.card.id).await {
            Ok(()) => post.card.views += 1,
            Err(e) => {
                state.views.forget(session_id, ViewedKind::Post, post.card.id);
                tracing::warn!("Could not count view of post {}: {}", post.card.id, e);
            }
        }
    }

    let similar_posts = state.post_repo.similar(&post, SIMILAR_POSTS).await?;

    Ok(PostPage { post, similar_posts })
}
