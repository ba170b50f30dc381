pub mod artwork;
pub mod artwork_image;
pub mod blog_post;
pub mod category;
pub mod collection;
pub mod theme;
pub mod user;

pub use artwork::ArtworkStatus;
pub use blog_post::PostStatus;
