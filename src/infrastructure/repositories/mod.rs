//! Repository implementations using SeaORM

pub mod blog_repository;
pub mod social_post_repository;
pub mod subscriber_repository;

pub use blog_repository::SeaOrmBlogRepository;
pub use social_post_repository::SeaOrmSocialPostRepository;
pub use subscriber_repository::SeaOrmSubscriberRepository;
