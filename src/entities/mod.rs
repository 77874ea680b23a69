//! Entity module - Contains all SeaORM entity definitions for the database.
//! These entities represent the database tables and their relationships.
//! Each entity has a Model struct for data and an Entity struct for operations.

pub mod article;
pub mod page;
pub mod page_block;
pub mod variation_combination;

// Re-export specific types to avoid conflicts
pub use article::{Column as ArticleColumn, Entity as Article, Model as ArticleModel};
pub use page::{Column as PageColumn, Entity as Page, Model as PageModel};
pub use page_block::{Column as PageBlockColumn, Entity as PageBlock, Model as PageBlockModel};
pub use variation_combination::{
    Column as VariationCombinationColumn, Entity as VariationCombination,
    Model as VariationCombinationModel,
};
